//! Build command implementation

use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::build::{BuildMode, Compiler};
use crate::config::Settings;
use crate::exec::Shell;
use crate::utils::terminal::print_success;
use crate::utils::tools::preflight;

/// Compile the project with the CMake settings from Devkit.toml
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Build in release mode (no tests and no examples), the default
    #[arg(long, conflicts_with = "develop")]
    pub release: bool,

    /// Build in develop mode with debug flags (tests and examples are turned on)
    #[arg(long)]
    pub develop: bool,

    /// Number of parallel jobs (defaults to the number of CPUs)
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

impl BuildCommand {
    pub fn mode(&self) -> BuildMode {
        if self.develop {
            BuildMode::Develop
        } else {
            BuildMode::Release
        }
    }

    /// Execute the build command
    pub fn execute(self, verbose: bool, config: Option<&Path>) -> Result<()> {
        let settings = Settings::discover(config)?;
        let mode = self.mode();
        let (key, cmake) = match mode {
            BuildMode::Release => ("cmake_release", &settings.programs.cmake_release),
            BuildMode::Develop => ("cmake_develop", &settings.programs.cmake_develop),
        };
        preflight(&[(key, cmake)], "devkit build")?;

        let mut compiler = Compiler::new(
            cmake.clone(),
            settings.root.clone(),
            settings.build_dir.clone(),
            Shell::detect(),
        )
        .verbose(verbose);
        if let Some(jobs) = self.jobs {
            compiler = compiler.jobs(jobs);
        }

        compiler.compile()?;
        print_success(&format!("Compiled the project in {} mode", mode));
        Ok(())
    }
}
