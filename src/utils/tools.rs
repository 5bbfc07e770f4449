//! Tool detection and validation
//!
//! This module provides utilities for detecting the external programs devkit
//! drives and providing helpful error messages when they are missing.

use std::path::PathBuf;
use std::process::Command;

use anyhow::Result;
use which::which;

use crate::config::Program;
use crate::error::{hints, DevkitError};

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Tool name
    pub name: String,
    /// Path to the tool executable
    pub path: PathBuf,
    /// Tool version string (if available)
    pub version: Option<String>,
}

/// Check if a command exists in PATH
pub fn command_exists(program: &str) -> bool {
    which(program).is_ok()
}

/// Check if a tool exists and return its information
pub fn check_tool(tool_name: &str) -> Option<ToolInfo> {
    match which(tool_name) {
        Ok(path) => {
            let version = get_tool_version(tool_name);
            Some(ToolInfo {
                name: tool_name.to_string(),
                path,
                version,
            })
        }
        Err(_) => None,
    }
}

/// Get tool version by running `tool --version`
fn get_tool_version(tool_name: &str) -> Option<String> {
    for flag in ["--version", "-version"] {
        if let Ok(output) = Command::new(tool_name).arg(flag).output() {
            if output.status.success() {
                let version = String::from_utf8_lossy(&output.stdout);
                let first = version.lines().next().unwrap_or("").trim().to_string();
                if !first.is_empty() {
                    return Some(first);
                }
            }
        }
    }

    None
}

/// Require a tool to exist, return error with hint if missing
pub fn require_tool(tool_name: &str, required_for: &str) -> Result<ToolInfo> {
    match check_tool(tool_name) {
        Some(info) => Ok(info),
        None => Err(DevkitError::missing_tool(tool_name, required_for, get_tool_hint(tool_name)).into()),
    }
}

/// Get installation hint for a tool
pub fn get_tool_hint(tool_name: &str) -> &'static str {
    match tool_name {
        "cmake" => hints::cmake(),
        "clang-format" | "clang-tidy" => hints::clang_tools(),
        "cmake-format" => hints::cmake_format(),
        "checkinstall" => hints::checkinstall(),
        _ => "Install this tool and ensure it's in your PATH, or point Devkit.toml at another program",
    }
}

/// Fail unless running on Linux
pub fn ensure_linux() -> Result<()> {
    if cfg!(target_os = "linux") {
        Ok(())
    } else {
        Err(DevkitError::UnsupportedPlatform {
            platform: std::env::consts::OS.to_string(),
        }
        .into())
    }
}

/// The executable a program entry launches (its first word)
pub fn executable(program: &Program) -> &str {
    program.name.split_whitespace().next().unwrap_or("")
}

/// Checks run before a subcommand: Linux host, and every program it drives
/// is named and installed.
pub fn preflight(programs: &[(&str, &Program)], required_for: &str) -> Result<()> {
    ensure_linux()?;

    for (key, program) in programs {
        let exe = executable(program);
        if exe.is_empty() {
            return Err(DevkitError::config_error_with_hint(
                format!("Value for programs.{} is empty", key),
                None,
                hints::invalid_config(),
            )
            .into());
        }
        require_tool(exe, required_for)?;
    }

    Ok(())
}
