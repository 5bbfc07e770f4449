//! Command implementations
//!
//! Each command module provides a clap-derived struct and execute method.

pub mod build;
pub mod check;
pub mod clang;
pub mod init;
pub mod package;
