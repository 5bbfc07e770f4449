//! Devkit.toml configuration

pub mod devkit_toml;

pub use devkit_toml::{PackageConfig, Program, Settings, CONFIG_FILE_NAME, DEFAULT_CONFIG};
