//! CLI argument parsing using clap derive macros

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};

use crate::commands::{
    build::BuildCommand, check::CheckCommand, clang::ClangCommand, init::InitCommand,
    package::PackageCommand,
};

/// Devkit - C++ project development kit
///
/// Formats, lints, builds, and packages CMake based C++ projects.
#[derive(Parser, Debug)]
#[command(name = "devkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to Devkit.toml (defaults to the nearest one above the current directory)
    #[arg(long, global = true, value_name = "FILE", env = "DEVKIT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lint and statically analyze the projects with clang tooling
    Clang(ClangCommand),

    /// Compile the project with CMake
    Build(BuildCommand),

    /// Build a distribution package from the CMake build directory
    Package(PackageCommand),

    /// Check that the configured programs are installed
    Check(CheckCommand),

    /// Write a default Devkit.toml in the current directory
    Init(InitCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        if self.no_color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        let config = self.config.as_deref();
        match self.command {
            Some(Commands::Clang(cmd)) => cmd.execute(self.verbose, config),
            Some(Commands::Build(cmd)) => cmd.execute(self.verbose, config),
            Some(Commands::Package(cmd)) => cmd.execute(self.verbose, config),
            Some(Commands::Check(cmd)) => cmd.execute(self.verbose, config),
            Some(Commands::Init(cmd)) => cmd.execute(self.verbose),
            None => {
                Cli::command().print_help()?;
                std::process::exit(1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["devkit", "check", "--verbose", "--config", "x/Devkit.toml"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x/Devkit.toml")));
        assert!(matches!(cli.command, Some(Commands::Check(_))));
    }

    #[test]
    fn test_clang_requires_an_action() {
        assert!(Cli::try_parse_from(["devkit", "clang"]).is_err());
        let cli = Cli::try_parse_from(["devkit", "clang", "-f", "-t"]).unwrap();
        match cli.command {
            Some(Commands::Clang(cmd)) => assert!(cmd.format && cmd.tidy),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_config_from_environment() {
        std::env::set_var("DEVKIT_CONFIG", "/srv/etl/Devkit.toml");
        let cli = Cli::try_parse_from(["devkit", "check"]);
        std::env::remove_var("DEVKIT_CONFIG");
        assert_eq!(cli.unwrap().config, Some(PathBuf::from("/srv/etl/Devkit.toml")));
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["devkit"]).unwrap();
        assert!(cli.command.is_none());
    }
}
