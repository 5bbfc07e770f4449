//! CMake configuration and execution
//!
//! This module handles invoking CMake for the configure and build steps.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::Program;
use crate::error::DevkitError;
use crate::exec::{Output, Shell, ShellCommand};
use crate::utils::terminal::{print_info, print_running, print_warning};

/// Which set of CMake flags to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// No tests and no examples
    #[default]
    Release,
    /// Debug flags, tests and examples enabled
    Develop,
}

impl std::fmt::Display for BuildMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildMode::Release => write!(f, "release"),
            BuildMode::Develop => write!(f, "develop"),
        }
    }
}

/// Light wrapper around CMake's configure + build steps
#[derive(Debug)]
pub struct Compiler {
    /// CMake program and the flags passed at configure time
    cmake: Program,
    /// Source directory (where the root CMakeLists.txt is located)
    source_dir: PathBuf,
    build_dir: PathBuf,
    jobs: usize,
    shell: Shell,
    verbose: bool,
}

impl Compiler {
    pub fn new(cmake: Program, source_dir: PathBuf, build_dir: PathBuf, shell: Shell) -> Self {
        Self {
            cmake,
            source_dir,
            build_dir,
            jobs: num_cpus(),
            shell,
            verbose: false,
        }
    }

    /// Set number of parallel jobs
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Report timings
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// `cmake -S <source> -B <build> <flags>`
    pub fn configure_command(&self) -> ShellCommand {
        let line = format!(
            "{} -S {} -B {} {}",
            self.cmake.name,
            quote(&self.source_dir),
            quote(&self.build_dir),
            self.cmake.flags
        );
        ShellCommand::new(line.trim_end()).current_dir(&self.source_dir)
    }

    /// `cmake --build <build> -- -j<jobs>`
    pub fn build_command(&self) -> ShellCommand {
        ShellCommand::new(format!(
            "{} --build {} -- -j{}",
            self.cmake.name,
            quote(&self.build_dir),
            self.jobs
        ))
        .current_dir(&self.source_dir)
    }

    /// Configure when the build directory is new, then compile.
    ///
    /// An existing build directory is recompiled with the settings it was
    /// configured with.
    pub fn compile(&self) -> Result<()> {
        print_info("Configuring the project..");

        if self.build_dir.exists() {
            print_warning(&format!(
                "{} already exists, re-compiling with existing settings",
                self.build_dir.display()
            ));
        } else {
            self.run_step(&self.configure_command())?;
        }

        self.run_step(&self.build_command())
    }

    fn run_step(&self, command: &ShellCommand) -> Result<()> {
        print_running(command.line());
        let result = self.shell.run(command, Output::Inherit)?;

        if self.verbose {
            print_info(&format!("Finished in {:.2?}", result.duration));
        }

        if !result.success {
            return Err(DevkitError::command_failed(command.line(), result.exit_code).into());
        }

        Ok(())
    }
}

/// Single-quote a path for the shell
fn quote(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', r"'\''"))
}

/// Get number of CPUs for parallel builds
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}
