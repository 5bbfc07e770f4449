//! Package command implementation

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::config::Settings;
use crate::exec::Shell;
use crate::packager::{PackageKind, PackageMetadata, Packager};
use crate::utils::paths::resolve_against;
use crate::utils::tools::ensure_linux;

/// Build a debian, slackware, or rpm package for software built with CMake
#[derive(Args, Debug)]
pub struct PackageCommand {
    /// The name of the software you are packaging
    #[arg(short, long)]
    pub name: String,

    /// The current version of the software you are packaging
    #[arg(short = 'v', long = "version", value_name = "VERSION")]
    pub pkg_version: String,

    /// The packaging system
    #[arg(short = 't', long = "type", value_enum, default_value_t = PackageKind::Debian)]
    pub kind: PackageKind,

    /// Path to the CMake build directory (defaults to [project].build_dir)
    #[arg(short, long)]
    pub build_dir: Option<PathBuf>,
}

impl PackageCommand {
    /// Execute the package command
    pub fn execute(self, _verbose: bool, config: Option<&Path>) -> Result<()> {
        ensure_linux()?;
        let settings = Settings::discover(config)?;

        let build_dir = match &self.build_dir {
            Some(dir) => {
                let cwd = std::env::current_dir().context("Failed to get current directory")?;
                resolve_against(&cwd, dir)
            }
            None => settings.build_dir.clone(),
        };

        let metadata = PackageMetadata::new(&self.name, &self.pkg_version, self.kind, &settings.package);
        let packager = Packager::new(&build_dir, metadata, &settings.package.backend, Shell::detect())?;
        packager.build_pkg()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        package: PackageCommand,
    }

    #[test]
    fn test_parse_short_flags() {
        let h = Harness::try_parse_from(["devkit", "-n", "etl", "-v", "0.9.0", "-t", "rpm"]).unwrap();
        assert_eq!(h.package.name, "etl");
        assert_eq!(h.package.pkg_version, "0.9.0");
        assert_eq!(h.package.kind, PackageKind::Rpm);
        assert!(h.package.build_dir.is_none());
    }

    #[test]
    fn test_type_defaults_to_debian() {
        let h = Harness::try_parse_from(["devkit", "--name", "etl", "--version", "1.0"]).unwrap();
        assert_eq!(h.package.kind, PackageKind::Debian);
    }

    #[test]
    fn test_name_and_version_are_required() {
        assert!(Harness::try_parse_from(["devkit", "--name", "etl"]).is_err());
        assert!(Harness::try_parse_from(["devkit", "--version", "1.0"]).is_err());
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        assert!(Harness::try_parse_from(["devkit", "-n", "etl", "-v", "1.0", "-t", "flatpak"]).is_err());
    }
}
