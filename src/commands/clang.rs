//! Clang tooling command implementation

use std::path::Path;

use anyhow::Result;
use clap::{ArgGroup, Args};

use crate::config::Settings;
use crate::exec::Shell;
use crate::tooling::ClangTooling;
use crate::utils::tools::preflight;

/// Lint and statically analyze with clang tooling
#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .multiple(true)
        .args(["format", "tidy"])
))]
pub struct ClangCommand {
    /// Format the configured projects recursively via clang-format and
    /// cmake-format (ignore lists live in Devkit.toml under [ignore.format])
    #[arg(short, long)]
    pub format: bool,

    /// Statically analyze the configured projects via clang-tidy (ignore
    /// lists live in Devkit.toml under [ignore.tidy])
    #[arg(short, long)]
    pub tidy: bool,
}

impl ClangCommand {
    /// Execute the clang command
    pub fn execute(self, verbose: bool, config: Option<&Path>) -> Result<()> {
        let settings = Settings::discover(config)?;
        let programs = &settings.programs;

        let mut required = Vec::new();
        if self.format {
            required.push(("clang_format", &programs.clang_format));
            required.push(("cmake_format", &programs.cmake_format));
        }
        if self.tidy {
            required.push(("clang_tidy", &programs.clang_tidy));
        }
        preflight(&required, "devkit clang")?;

        let tooling = ClangTooling::new(
            programs.clang_format.clone(),
            programs.cmake_format.clone(),
            programs.clang_tidy.clone(),
            Shell::detect(),
            verbose,
        );

        if self.format {
            tooling.format(&settings.layout)?;
        }
        if self.tidy {
            tooling.tidy(&settings.layout)?;
        }

        Ok(())
    }
}
