//! Debian, Slackware and RPM packages from a CMake build directory
//!
//! checkinstall does the heavy lifting; this module validates the build
//! directory, picks up the package metadata and assembles the command line.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::config::PackageConfig;
use crate::error::{hints, DevkitError};
use crate::exec::{Output, Shell, ShellCommand};
use crate::utils::terminal::{print_error, print_info, print_running, print_success};
use crate::utils::tools::{command_exists, get_tool_hint};

const OS_RELEASE: &str = "/etc/os-release";

/// Packaging system handed to checkinstall's `--type`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum PackageKind {
    #[default]
    Debian,
    Slackware,
    Rpm,
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageKind::Debian => write!(f, "debian"),
            PackageKind::Slackware => write!(f, "slackware"),
            PackageKind::Rpm => write!(f, "rpm"),
        }
    }
}

/// Package metadata after defaults have been filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub kind: PackageKind,
    pub release: String,
    pub license: String,
    pub maintainer: String,
    pub requires: String,
}

impl PackageMetadata {
    pub fn new(name: &str, version: &str, kind: PackageKind, config: &PackageConfig) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            kind,
            release: config.release.clone().unwrap_or_else(default_release),
            license: config.license.clone(),
            maintainer: config.maintainer.clone(),
            requires: config.requires.clone(),
        }
    }
}

/// Wraps checkinstall to build a package from a CMake build directory
#[derive(Debug)]
pub struct Packager {
    backend: String,
    build_dir: PathBuf,
    metadata: PackageMetadata,
    sudo: bool,
    shell: Shell,
}

impl Packager {
    /// Validate the build directory and backend, then resolve where the
    /// CMake build actually lives.
    pub fn new(
        build_dir: &Path,
        metadata: PackageMetadata,
        backend: &str,
        shell: Shell,
    ) -> Result<Self> {
        if !build_dir.is_dir() {
            return Err(DevkitError::project_structure_error(
                "Build directory does not exist, aborting...",
                Some(build_dir.to_path_buf()),
                hints::build_dir_missing(),
            )
            .into());
        }

        if !command_exists(backend) {
            return Err(DevkitError::missing_tool(
                backend,
                "building packages",
                get_tool_hint(backend),
            )
            .into());
        }

        let build_dir = match resolve_build_dir(build_dir)? {
            Some(dir) => dir,
            None => {
                print_error(&format!(
                    "{} is an invalid build directory",
                    build_dir.display()
                ));
                build_dir.to_path_buf()
            }
        };
        print_info(&format!("Build directory resolved => {}", build_dir.display()));

        Ok(Self {
            backend: backend.to_string(),
            build_dir,
            metadata,
            sudo: needs_sudo(std::env::var("USER").ok().as_deref()),
            shell,
        })
    }

    /// The checkinstall invocation, run from the build directory
    pub fn command(&self) -> ShellCommand {
        let m = &self.metadata;
        let sudo = if self.sudo { "sudo " } else { "" };
        let line = format!(
            "{}{} -y --pkgname={} --pkgrelease={} --pkgversion={} --pkglicense={} \
             --requires={} --maintainer={} --type={} --install=no",
            sudo,
            self.backend,
            shell_word(&m.name),
            shell_word(&m.release),
            shell_word(&m.version),
            shell_word(&m.license),
            shell_word(&m.requires),
            shell_word(&m.maintainer),
            m.kind,
        );
        ShellCommand::new(line).current_dir(&self.build_dir)
    }

    /// Build the package
    pub fn build_pkg(&self) -> Result<()> {
        let command = self.command();
        print_running(&command.to_string());

        let result = self.shell.run(&command, Output::Inherit)?;
        if !result.success {
            return Err(DevkitError::command_failed(command.line(), result.exit_code).into());
        }

        print_success(&format!(
            "Built {} package {}-{}",
            self.metadata.kind, self.metadata.name, self.metadata.version
        ));
        Ok(())
    }
}

/// Containers often run as root without `$USER`; only a named non-root user needs sudo
fn needs_sudo(user: Option<&str>) -> bool {
    matches!(user, Some(user) if !user.is_empty() && user != "root")
}

/// The CMake build directory: `dir` itself when its name mentions "build",
/// otherwise the first child directory (by name) that does.
fn resolve_build_dir(dir: &Path) -> Result<Option<PathBuf>> {
    let is_build = |p: &Path| {
        p.file_name()
            .map(|name| name.to_string_lossy().contains("build"))
            .unwrap_or(false)
    };

    if is_build(dir) {
        return Ok(Some(dir.to_path_buf()));
    }

    let mut children: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read {}", dir.display()))?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    children.sort();

    Ok(children.into_iter().find(|path| is_build(path.as_path())))
}

/// `<codename>-<version>` of the running distribution
fn default_release() -> String {
    fs::read_to_string(OS_RELEASE)
        .ok()
        .and_then(|content| release_from_os_release(&content))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Parse `VERSION_CODENAME` and `VERSION_ID` out of an os-release file
fn release_from_os_release(content: &str) -> Option<String> {
    let mut codename = None;
    let mut version = None;

    for line in content.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        match key.trim() {
            "VERSION_CODENAME" if !value.is_empty() => codename = Some(value.to_string()),
            "VERSION_ID" if !value.is_empty() => version = Some(value.to_string()),
            _ => {}
        }
    }

    match (codename, version) {
        (Some(codename), Some(version)) => Some(format!("{}-{}", codename, version)),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}

/// Quote a value for the shell unless it is a plain word
fn shell_word(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_.,+:/@=".contains(c));
    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn metadata() -> PackageMetadata {
        PackageMetadata {
            name: "etl".to_string(),
            version: "0.9.0".to_string(),
            kind: PackageKind::Debian,
            release: "bookworm-12".to_string(),
            license: "GPL-3.0".to_string(),
            maintainer: "thebashpotato".to_string(),
            requires: String::new(),
        }
    }

    #[test]
    fn test_build_dir_named_build_is_used_as_is() {
        let temp = TempDir::new().unwrap();
        let build = temp.path().join("cmake-build-release");
        fs::create_dir(&build).unwrap();
        assert_eq!(resolve_build_dir(&build).unwrap(), Some(build));
    }

    #[test]
    fn test_build_dir_found_one_level_down() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        fs::create_dir_all(project.join("src")).unwrap();
        fs::create_dir(project.join("zz-build")).unwrap();
        fs::create_dir(project.join("build")).unwrap();
        fs::write(project.join("build.log"), "").unwrap();

        assert_eq!(resolve_build_dir(&project).unwrap(), Some(project.join("build")));
    }

    #[test]
    fn test_build_dir_without_candidates() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("project");
        fs::create_dir_all(project.join("src")).unwrap();

        assert_eq!(resolve_build_dir(&project).unwrap(), None);
    }

    #[test]
    fn test_os_release_parsing() {
        let debian = "PRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\n\
                      NAME=\"Debian GNU/Linux\"\n\
                      VERSION_ID=\"12\"\n\
                      VERSION_CODENAME=bookworm\n\
                      ID=debian\n";
        assert_eq!(release_from_os_release(debian).as_deref(), Some("bookworm-12"));

        let rolling = "NAME=\"Arch Linux\"\nID=arch\nVERSION_ID=\"\"\n";
        assert_eq!(release_from_os_release(rolling), None);

        let fedora = "NAME=Fedora\nVERSION_ID=40\n";
        assert_eq!(release_from_os_release(fedora).as_deref(), Some("40"));
    }

    #[test]
    fn test_needs_sudo() {
        assert!(needs_sudo(Some("matt")));
        assert!(!needs_sudo(Some("root")));
        assert!(!needs_sudo(Some("")));
        assert!(!needs_sudo(None));
    }

    #[test]
    fn test_command_line() {
        let temp = TempDir::new().unwrap();
        let packager = Packager {
            backend: "checkinstall".to_string(),
            build_dir: temp.path().to_path_buf(),
            metadata: PackageMetadata {
                maintainer: "Matt Williams".to_string(),
                ..metadata()
            },
            sudo: true,
            shell: Shell::detect(),
        };

        assert_eq!(
            packager.command().line(),
            "sudo checkinstall -y --pkgname=etl --pkgrelease=bookworm-12 --pkgversion=0.9.0 \
             --pkglicense=GPL-3.0 --requires='' --maintainer='Matt Williams' --type=debian --install=no"
        );
    }

    #[test]
    fn test_missing_build_dir_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = Packager::new(&temp.path().join("nope"), metadata(), "sh", Shell::detect())
            .unwrap_err();
        let devkit_err = err.downcast_ref::<DevkitError>().unwrap();
        assert!(matches!(devkit_err, DevkitError::ProjectStructure { .. }));
    }

    #[test]
    fn test_missing_backend_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = Packager::new(temp.path(), metadata(), "devkit-no-such-backend", Shell::detect())
            .unwrap_err();
        let devkit_err = err.downcast_ref::<DevkitError>().unwrap();
        assert!(matches!(devkit_err, DevkitError::MissingTool { .. }));
    }

    #[test]
    fn test_build_pkg_runs_in_build_dir() {
        let temp = TempDir::new().unwrap();
        let build = temp.path().join("build");
        fs::create_dir(&build).unwrap();
        let packager = Packager {
            // Writes every argument to a file in the working directory.
            backend: "printf '%s\\n' >> args.txt".to_string(),
            build_dir: build.clone(),
            metadata: metadata(),
            sudo: false,
            shell: Shell::detect(),
        };

        packager.build_pkg().unwrap();
        let args = fs::read_to_string(build.join("args.txt")).unwrap();
        let args: Vec<&str> = args.lines().collect();
        assert_eq!(args[0], "-y");
        assert!(args.contains(&"--type=debian"));
        assert!(args.contains(&"--install=no"));
    }
}
