//! Native build orchestration
//!
//! ```text
//! devkit build → build/cmake.rs → cmake (configure, build)
//! ```

pub mod cmake;

pub use cmake::{BuildMode, Compiler};
