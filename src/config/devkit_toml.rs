//! Devkit.toml configuration parsing
//!
//! The file lives at the root of the repository and describes where the C++
//! projects are, which programs to drive and what the clang tooling skips.
//! Every key is optional; an empty file yields the defaults below.
//!
//! ```toml
//! [project]
//! build_dir = "build"
//! projects = ["etl"]
//!
//! [package]
//! backend = "checkinstall"
//! license = "GPL-3.0"
//! maintainer = "thebashpotato"
//!
//! [programs.clang_tidy]
//! name = "clang-tidy"
//! flags = "-p {build_dir} -header-filter=.* --config-file={root}/.clang-tidy"
//!
//! [ignore.tidy]
//! directories = ["etl/tests", "etl/examples"]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::{hints, DevkitError};
use crate::tooling::{IgnoreConfig, IgnoreSet, ScanLayout};
use crate::utils::paths::{find_config_file, normalize_path, resolve_against};

/// File name devkit looks for
pub const CONFIG_FILE_NAME: &str = "Devkit.toml";

/// Root configuration from Devkit.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DevkitConfig {
    /// Project layout
    #[serde(default)]
    pub project: ProjectConfig,

    /// Packaging metadata
    #[serde(default)]
    pub package: PackageConfig,

    /// External programs and their flags
    #[serde(default)]
    pub programs: ProgramsConfig,

    /// Ignore lists for the clang tooling
    #[serde(default)]
    pub ignore: IgnoreSection,
}

/// Project layout from [project] section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// CMake build directory, relative to the workspace root
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// C++ project roots scanned by the clang tooling
    #[serde(default = "default_projects")]
    pub projects: Vec<PathBuf>,
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_projects() -> Vec<PathBuf> {
    vec![PathBuf::from("etl")]
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            build_dir: default_build_dir(),
            projects: default_projects(),
        }
    }
}

/// Packaging metadata from [package] section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageConfig {
    /// Packaging backend program
    #[serde(default = "default_backend")]
    pub backend: String,

    #[serde(default = "default_license")]
    pub license: String,

    #[serde(default = "default_maintainer")]
    pub maintainer: String,

    /// Comma separated runtime requirements
    #[serde(default)]
    pub requires: String,

    /// Package release; derived from /etc/os-release when absent
    pub release: Option<String>,
}

fn default_backend() -> String {
    "checkinstall".to_string()
}

fn default_license() -> String {
    "GPL-3.0".to_string()
}

fn default_maintainer() -> String {
    "thebashpotato".to_string()
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            license: default_license(),
            maintainer: default_maintainer(),
            requires: String::new(),
            release: None,
        }
    }
}

/// A program name with the flags passed on every invocation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Program {
    pub name: String,
    #[serde(default)]
    pub flags: String,
}

impl Program {
    pub fn new(name: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: flags.into(),
        }
    }

    /// `name flags`, ready to be handed to the shell
    pub fn command_line(&self) -> String {
        let flags = self.flags.trim();
        if flags.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, flags)
        }
    }
}

/// External programs from [programs] section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramsConfig {
    #[serde(default = "default_cmake_release")]
    pub cmake_release: Program,

    #[serde(default = "default_cmake_develop")]
    pub cmake_develop: Program,

    #[serde(default = "default_clang_format")]
    pub clang_format: Program,

    #[serde(default = "default_cmake_format")]
    pub cmake_format: Program,

    #[serde(default = "default_clang_tidy")]
    pub clang_tidy: Program,
}

fn default_cmake_release() -> Program {
    Program::new("cmake", "-D ETL_DEV_MODE=OFF -D CMAKE_CXX_COMPILER=clang++")
}

fn default_cmake_develop() -> Program {
    Program::new("cmake", "-D ETL_DEV_MODE=ON -D CMAKE_CXX_COMPILER=clang++")
}

fn default_clang_format() -> Program {
    Program::new("clang-format", "-i")
}

fn default_cmake_format() -> Program {
    Program::new("cmake-format", "-i")
}

fn default_clang_tidy() -> Program {
    Program::new(
        "clang-tidy",
        "-p {build_dir} -header-filter=.* --config-file={root}/.clang-tidy",
    )
}

impl Default for ProgramsConfig {
    fn default() -> Self {
        Self {
            cmake_release: default_cmake_release(),
            cmake_develop: default_cmake_develop(),
            clang_format: default_clang_format(),
            cmake_format: default_cmake_format(),
            clang_tidy: default_clang_tidy(),
        }
    }
}

impl ProgramsConfig {
    /// Every configured program keyed by its Devkit.toml entry
    pub fn entries(&self) -> [(&'static str, &Program); 5] {
        [
            ("cmake_release", &self.cmake_release),
            ("cmake_develop", &self.cmake_develop),
            ("clang_format", &self.clang_format),
            ("cmake_format", &self.cmake_format),
            ("clang_tidy", &self.clang_tidy),
        ]
    }
}

/// Ignore lists from [ignore] section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IgnoreSection {
    /// Skipped by clang-format
    #[serde(default)]
    pub format: IgnoreEntries,

    /// Skipped by clang-tidy
    #[serde(default = "default_tidy_ignore")]
    pub tidy: IgnoreEntries,
}

fn default_tidy_ignore() -> IgnoreEntries {
    IgnoreEntries {
        files: Vec::new(),
        directories: vec![PathBuf::from("etl/tests"), PathBuf::from("etl/examples")],
    }
}

impl Default for IgnoreSection {
    fn default() -> Self {
        Self {
            format: IgnoreEntries::default(),
            tidy: default_tidy_ignore(),
        }
    }
}

/// Raw ignore entries, relative to the workspace root
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IgnoreEntries {
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Useful for bundled third party code, unit tests and example code
    #[serde(default)]
    pub directories: Vec<PathBuf>,
}

impl IgnoreEntries {
    fn resolve(&self, root: &Path) -> IgnoreSet {
        IgnoreSet::new(
            self.files.iter().map(|p| resolve_against(root, p)),
            self.directories.iter().map(|p| resolve_against(root, p)),
        )
    }
}

impl DevkitConfig {
    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            DevkitError::config_error_with_hint(
                format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e.message()),
                Some(e.into()),
                hints::invalid_config(),
            )
        })?;

        for (key, program) in config.programs.entries() {
            if program.name.trim().is_empty() {
                return Err(DevkitError::config_error_with_hint(
                    format!("Value for programs.{} is empty", key),
                    None,
                    hints::invalid_config(),
                )
                .into());
            }
        }

        Ok(config)
    }

    /// Resolve every path against `root` and expand flag placeholders
    pub fn resolve(self, root: &Path) -> Settings {
        let root = normalize_path(root);
        let build_dir = resolve_against(&root, &self.project.build_dir);

        let expand = |program: Program| Program {
            flags: expand_placeholders(&program.flags, &root, &build_dir),
            name: program.name,
        };

        let programs = ProgramsConfig {
            cmake_release: expand(self.programs.cmake_release),
            cmake_develop: expand(self.programs.cmake_develop),
            clang_format: expand(self.programs.clang_format),
            cmake_format: expand(self.programs.cmake_format),
            clang_tidy: expand(self.programs.clang_tidy),
        };

        let layout = ScanLayout {
            workspace_root: root.clone(),
            project_roots: self
                .project
                .projects
                .iter()
                .map(|p| resolve_against(&root, p))
                .collect(),
            ignore: IgnoreConfig {
                format: self.ignore.format.resolve(&root),
                lint: self.ignore.tidy.resolve(&root),
            },
        };

        Settings {
            root,
            build_dir,
            package: self.package,
            programs,
            layout,
        }
    }
}

/// Replace `{root}` and `{build_dir}` in a flag string
fn expand_placeholders(flags: &str, root: &Path, build_dir: &Path) -> String {
    flags
        .replace("{root}", &root.display().to_string())
        .replace("{build_dir}", &build_dir.display().to_string())
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding Devkit.toml
    pub root: PathBuf,
    /// Absolute CMake build directory
    pub build_dir: PathBuf,
    pub package: PackageConfig,
    /// Programs with placeholders expanded
    pub programs: ProgramsConfig,
    /// Project roots and ignore lists for the clang tooling
    pub layout: ScanLayout,
}

impl Settings {
    /// Load the given Devkit.toml, or the nearest one above the current directory
    pub fn discover(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load(path),
            None => Self::load(&find_config_file()?),
        }
    }

    /// Load and resolve a Devkit.toml; relative paths resolve against its directory
    pub fn load(config_path: &Path) -> Result<Self> {
        let config = DevkitConfig::load_from_path(config_path)?;
        let absolute = if config_path.is_absolute() {
            config_path.to_path_buf()
        } else {
            std::env::current_dir()
                .context("Failed to get current directory")?
                .join(config_path)
        };
        let root = absolute
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        Ok(config.resolve(&root))
    }
}

/// Default Devkit.toml written by `devkit init`
pub const DEFAULT_CONFIG: &str = r#"# devkit configuration
#
# Paths are relative to the directory holding this file.

[project]
build_dir = "build"
# All C++ projects must be added to this list
projects = ["etl"]

# Used for building a debian, slackware, or rpm package
[package]
backend = "checkinstall"
license = "GPL-3.0"
maintainer = "thebashpotato"
requires = ""
# release = "bookworm-12"  # defaults to <codename>-<version> from /etc/os-release

# {root} and {build_dir} expand to absolute paths
[programs.cmake_release]
name = "cmake"
flags = "-D ETL_DEV_MODE=OFF -D CMAKE_CXX_COMPILER=clang++"

[programs.cmake_develop]
name = "cmake"
flags = "-D ETL_DEV_MODE=ON -D CMAKE_CXX_COMPILER=clang++"

[programs.clang_format]
name = "clang-format"
flags = "-i"

[programs.cmake_format]
name = "cmake-format"
flags = "-i"

[programs.clang_tidy]
name = "clang-tidy"
flags = "-p {build_dir} -header-filter=.* --config-file={root}/.clang-tidy"

[ignore.format]
files = []
directories = []

[ignore.tidy]
files = []
directories = ["etl/tests", "etl/examples"]
"#;
