//! Check command implementation
//!
//! Reports whether every program configured in Devkit.toml is installed,
//! with versions, so a broken environment shows up before a long build.

use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;
use regex::Regex;

use crate::config::Settings;
use crate::exec::Shell;
use crate::utils::tools::{check_tool, ensure_linux, executable, get_tool_hint};

/// Minimum CMake version the generated projects expect
const MIN_CMAKE: (u32, u32) = (3, 20);

/// Check that the configured programs are installed
#[derive(Args, Debug)]
pub struct CheckCommand {}

impl CheckCommand {
    /// Execute the check command
    pub fn execute(self, verbose: bool, config: Option<&Path>) -> Result<()> {
        ensure_linux()?;
        let settings = Settings::discover(config)?;

        println!("🔍 Checking devkit environment...\n");
        let mut checker = EnvironmentChecker::new(verbose);

        checker.print_section("Workspace");
        checker.print_info(&format!("Root: {}", settings.root.display()));
        checker.print_info(&format!("Build directory: {}", settings.build_dir.display()));
        for root in &settings.layout.project_roots {
            if root.is_dir() {
                checker.print_ok(&format!("Project: {}", root.display()));
            } else {
                checker.print_warning(&format!("Project: {} does not exist", root.display()));
            }
        }
        checker.print_info(&format!("Shell: {}", Shell::detect().program().display()));

        checker.print_section("Programs");
        for (key, program) in settings.programs.entries() {
            let exe = executable(program);
            if let Some(version) = checker.check_program(key, exe) {
                if exe == "cmake" {
                    checker.check_cmake_version(&version);
                }
            }
        }

        checker.print_section("Packaging");
        let backend = settings.package.backend.as_str();
        if check_tool(backend).is_some() {
            checker.print_ok(&format!("{}: Found", backend));
        } else {
            // Only `devkit package` needs it.
            checker.print_warning(&format!("{}: Not found", backend));
            if verbose {
                checker.print_info(get_tool_hint(backend));
            }
        }

        checker.print_summary();

        if !checker.errors.is_empty() {
            bail!("{} required program(s) missing", checker.errors.len());
        }

        Ok(())
    }
}

/// Environment checker
struct EnvironmentChecker {
    verbose: bool,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl EnvironmentChecker {
    fn new(verbose: bool) -> Self {
        Self {
            verbose,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Look a program up; returns its version line when found
    fn check_program(&mut self, key: &str, exe: &str) -> Option<String> {
        match check_tool(exe) {
            Some(info) => {
                let version = info.version.unwrap_or_default();
                if version.is_empty() {
                    self.print_ok(&format!("{} ({}): Found", key, exe));
                } else {
                    self.print_ok(&format!("{} ({}): Found {}", key, exe, version));
                }
                if self.verbose {
                    self.print_info(&format!("  {} at {}", info.name, info.path.display()));
                }
                Some(version)
            }
            None => {
                self.print_error(&format!("{} ({}): Not found", key, exe));
                if self.verbose {
                    self.print_info(get_tool_hint(exe));
                }
                None
            }
        }
    }

    /// Warn about CMake releases older than [`MIN_CMAKE`]
    fn check_cmake_version(&mut self, version: &str) {
        if let Some((major, minor)) = parse_major_minor(version) {
            if (major, minor) < MIN_CMAKE {
                self.print_warning(&format!(
                    "CMake version {}.{} is old. Recommended: {}.{}+",
                    major, minor, MIN_CMAKE.0, MIN_CMAKE.1
                ));
            }
        }
    }

    fn print_ok(&self, msg: &str) {
        println!("  ✅ {}", msg);
    }

    fn print_error(&mut self, msg: &str) {
        println!("  ❌ {}", msg);
        self.errors.push(msg.to_string());
    }

    fn print_warning(&mut self, msg: &str) {
        println!("  ⚠️  {}", msg);
        self.warnings.push(msg.to_string());
    }

    fn print_info(&self, msg: &str) {
        println!("  ℹ️  {}", msg);
    }

    fn print_section(&self, title: &str) {
        println!("\n{}", "=".repeat(60));
        println!("  {}", title);
        println!("{}", "=".repeat(60));
    }

    fn print_summary(&self) {
        self.print_section("Summary");

        let status = if !self.errors.is_empty() {
            "❌ NOT READY"
        } else if !self.warnings.is_empty() {
            "⚠️  PARTIAL"
        } else {
            "✅ READY"
        };
        println!("  {}", status);
        println!("  Errors: {}", self.errors.len());
        println!("  Warnings: {}", self.warnings.len());
        println!();
    }
}

/// First `X.Y` in a version line
fn parse_major_minor(version: &str) -> Option<(u32, u32)> {
    let re = Regex::new(r"(\d+)\.(\d+)").ok()?;
    let caps = re.captures(version)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    Some((major, minor))
}
