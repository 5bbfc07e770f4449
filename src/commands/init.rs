//! Init command implementation

use std::fs;

use anyhow::{Context, Result};
use clap::Args;

use crate::config::{CONFIG_FILE_NAME, DEFAULT_CONFIG};
use crate::error::DevkitError;
use crate::utils::terminal::{print_info, print_success};

/// Write a Devkit.toml with the default settings in the current directory
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Overwrite an existing Devkit.toml
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(self, _verbose: bool) -> Result<()> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        let path = cwd.join(CONFIG_FILE_NAME);

        if path.exists() && !self.force {
            return Err(DevkitError::config_error_with_hint(
                format!("{} already exists", path.display()),
                None,
                "Pass --force to overwrite it",
            )
            .into());
        }

        fs::write(&path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        print_success(&format!("Created {}", path.display()));
        print_info("Add your C++ projects to [project].projects, then run: devkit check");
        Ok(())
    }
}
