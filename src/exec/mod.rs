//! External process execution

pub mod shell;

pub use shell::{Output, Shell, ShellCommand};
