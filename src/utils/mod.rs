//! Shared helpers: terminal output, paths, tool detection

pub mod paths;
pub mod terminal;
pub mod tools;
