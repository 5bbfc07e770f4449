//! End-to-end tests for the devkit binary

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn devkit(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("devkit").unwrap();
    cmd.current_dir(dir).env_remove("DEVKIT_CONFIG").arg("--no-color");
    cmd
}

/// A workspace whose programs are stand-ins that always succeed
fn stub_workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::write(
        root.join("Devkit.toml"),
        r#"
[project]
projects = ["lib"]

[programs.cmake_release]
name = "true"
[programs.cmake_develop]
name = "true"
[programs.clang_format]
name = "true"
[programs.cmake_format]
name = "true"
[programs.clang_tidy]
name = "true"

[ignore.format]
directories = ["lib/vendor"]
"#,
    )
    .unwrap();

    fs::create_dir_all(root.join("lib/src")).unwrap();
    fs::create_dir_all(root.join("lib/vendor")).unwrap();
    fs::write(root.join("lib/src/a.cpp"), "int a();\n").unwrap();
    fs::write(root.join("lib/src/a.hpp"), "int a();\n").unwrap();
    fs::write(root.join("lib/CMakeLists.txt"), "project(lib)\n").unwrap();
    fs::write(root.join("lib/vendor/v.cpp"), "int v();\n").unwrap();
    fs::write(root.join("CMakeLists.txt"), "add_subdirectory(lib)\n").unwrap();
    temp
}

#[test]
fn test_help_lists_commands() {
    let temp = TempDir::new().unwrap();
    devkit(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("clang"))
        .stdout(predicate::str::contains("package"));
}

#[test]
fn test_missing_subcommand_fails() {
    let temp = TempDir::new().unwrap();
    devkit(temp.path())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_clang_without_action_fails() {
    let temp = TempDir::new().unwrap();
    devkit(temp.path()).arg("clang").assert().failure();
}

#[test]
#[cfg(target_os = "linux")]
fn test_missing_config_points_at_init() {
    let temp = TempDir::new().unwrap();
    devkit(temp.path())
        .args(["build", "--release"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Devkit.toml"))
        .stderr(predicate::str::contains("devkit init"));
}

#[test]
fn test_init_writes_default_config() {
    let temp = TempDir::new().unwrap();
    devkit(temp.path()).arg("init").assert().success();

    let written = fs::read_to_string(temp.path().join("Devkit.toml")).unwrap();
    assert!(written.contains("[programs.clang_tidy]"));

    devkit(temp.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
    devkit(temp.path()).args(["init", "--force"]).assert().success();
}

#[test]
fn test_invalid_config_is_rejected() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("Devkit.toml"), "[project]\nbiuld_dir = \"out\"\n").unwrap();
    devkit(temp.path())
        .args(["clang", "--format"])
        .assert()
        .failure()
        .code(1);
}

#[test]
#[cfg(target_os = "linux")]
fn test_clang_format_with_stub_programs() {
    let temp = stub_workspace();
    devkit(temp.path())
        .args(["clang", "--format"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Formatted [4] file(s)"))
        .stderr(predicate::str::contains("Ignored: [1] file(s) in [1] directory(s)"));
}

#[test]
#[cfg(target_os = "linux")]
fn test_clang_tidy_with_stub_programs() {
    let temp = stub_workspace();
    devkit(temp.path())
        .args(["clang", "--tidy"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Statically analyzed [3] file(s)"));
}

#[test]
#[cfg(target_os = "linux")]
fn test_config_flag_from_another_directory() {
    let temp = stub_workspace();
    let elsewhere = TempDir::new().unwrap();
    devkit(elsewhere.path())
        .arg("--config")
        .arg(temp.path().join("Devkit.toml"))
        .args(["clang", "-f"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Formatted [4] file(s)"));
}

#[test]
#[cfg(target_os = "linux")]
fn test_build_fails_when_program_is_missing() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("Devkit.toml"),
        "[programs.cmake_release]\nname = \"devkit-no-such-cmake\"\n",
    )
    .unwrap();
    devkit(temp.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("devkit-no-such-cmake"));
}

#[test]
#[cfg(target_os = "linux")]
fn test_misspelled_project_root_warns_and_succeeds() {
    let temp = stub_workspace();
    let config = temp.path().join("Devkit.toml");
    let content = fs::read_to_string(&config)
        .unwrap()
        .replace(r#"projects = ["lib"]"#, r#"projects = ["lib", "lbi"]"#);
    fs::write(&config, content).unwrap();

    devkit(temp.path())
        .args(["clang", "--format"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Formatted [4] file(s)"))
        .stderr(predicate::str::contains("Project root"))
        .stderr(predicate::str::contains("lbi does not exist"));
}

#[test]
#[cfg(target_os = "linux")]
fn test_verbose_format_names_the_ignored_directory() {
    let temp = stub_workspace();
    devkit(temp.path())
        .args(["--verbose", "clang", "--format"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v.cpp (under "));
}
