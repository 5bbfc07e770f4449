//! Devkit - a development kit for CMake based C++ projects
//!
//! ## Architecture
//!
//! ```text
//! cli → commands/ → tooling/ | build/ | packager → exec::Shell → clang-format, cmake, checkinstall
//! ```

mod build;
mod cli;
mod commands;
mod config;
mod error;
mod exec;
mod packager;
mod tooling;
mod utils;

use clap::Parser;

use cli::Cli;
use error::DevkitError;
use utils::terminal::print_error;

fn main() {
    let cli = Cli::parse();
    if let Err(err) = cli.execute() {
        match err.downcast_ref::<DevkitError>() {
            Some(devkit_err) => devkit_err.display_with_hints(),
            None => print_error(&format!("{:#}", err)),
        }
        std::process::exit(1);
    }
}
