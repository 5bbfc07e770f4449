//! Clang tooling: file aggregation and formatter/linter invocation

pub mod aggregate;
pub mod clang;

pub use aggregate::{IgnoreConfig, IgnoreSet, ScanLayout};
pub use clang::ClangTooling;
