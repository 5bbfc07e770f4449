//! Error types and helpers for user-friendly error messages
//!
//! Every variant carries a hint so the user knows what to change, usually a
//! key in Devkit.toml or a package to install.

use std::path::PathBuf;

use thiserror::Error;

/// Custom error types with helpful context and suggestions
#[derive(Error, Debug)]
pub enum DevkitError {
    /// Configuration file errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },

    /// Tool/executable not found or misconfigured
    #[error("Missing tool: {tool} (required for {required_for})")]
    MissingTool {
        tool: String,
        required_for: String,
        hint: String,
    },

    /// Invalid project structure (e.g. a build directory that does not exist)
    #[error("Invalid project structure: {message}")]
    ProjectStructure {
        message: String,
        path: Option<PathBuf>,
        hint: String,
    },

    /// An external program ran but exited unsuccessfully
    #[error("Command failed with exit code {exit_code}: {command}")]
    CommandFailed {
        command: String,
        exit_code: i32,
        hint: Option<String>,
    },

    /// devkit only drives Linux toolchains
    #[error("{platform} is currently not supported")]
    UnsupportedPlatform { platform: String },
}

impl DevkitError {
    /// Create a configuration error with source and hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        source: Option<anyhow::Error>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source,
            hint: Some(hint.into()),
        }
    }

    /// Create a missing tool error
    pub fn missing_tool(
        tool: impl Into<String>,
        required_for: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::MissingTool {
            tool: tool.into(),
            required_for: required_for.into(),
            hint: hint.into(),
        }
    }

    /// Create a project structure error
    pub fn project_structure_error(
        message: impl Into<String>,
        path: Option<PathBuf>,
        hint: impl Into<String>,
    ) -> Self {
        Self::ProjectStructure {
            message: message.into(),
            path,
            hint: hint.into(),
        }
    }

    /// Create a command failure error
    pub fn command_failed(command: impl Into<String>, exit_code: i32) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
            hint: None,
        }
    }

    /// Create a command failure error with a hint
    pub fn command_failed_with_hint(
        command: impl Into<String>,
        exit_code: i32,
        hint: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            exit_code,
            hint: Some(hint.into()),
        }
    }

    /// The hint attached to this error, if any
    pub fn hint(&self) -> Option<&str> {
        match self {
            DevkitError::Config { hint, .. } | DevkitError::CommandFailed { hint, .. } => {
                hint.as_deref()
            }
            DevkitError::MissingTool { hint, .. } | DevkitError::ProjectStructure { hint, .. } => {
                Some(hint)
            }
            DevkitError::UnsupportedPlatform { .. } => Some(hints::unsupported_platform()),
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        if let DevkitError::ProjectStructure { path: Some(path), .. } = self {
            eprintln!("\n{} {}", style("PATH:").cyan().bold(), path.display());
        }

        if let Some(hint) = self.hint() {
            eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
        }

        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    /// Get hint for missing CMake
    pub fn cmake() -> &'static str {
        "Install CMake from https://cmake.org/ or use your package manager:\n\
         • Debian/Ubuntu: sudo apt install cmake\n\
         • Fedora: sudo dnf install cmake\n\
         • Arch: sudo pacman -S cmake"
    }

    /// Get hint for missing clang-format/clang-tidy
    pub fn clang_tools() -> &'static str {
        "Install the clang tooling with your package manager:\n\
         • Debian/Ubuntu: sudo apt install clang-format clang-tidy\n\
         • Fedora: sudo dnf install clang-tools-extra\n\
         • Arch: sudo pacman -S clang"
    }

    /// Get hint for missing cmake-format
    pub fn cmake_format() -> &'static str {
        "Install cmake-format (part of cmakelang):\n\
         • pip3 install cmakelang"
    }

    /// Get hint for missing checkinstall
    pub fn checkinstall() -> &'static str {
        "Install the packaging backend:\n\
         • Debian/Ubuntu: sudo apt install checkinstall\n\
         \n\
         Or set [package].backend in Devkit.toml to another program."
    }

    /// Get hint for Devkit.toml not found
    pub fn config_not_found() -> &'static str {
        "Could not find Devkit.toml in the current directory or any parent directory.\n\
         \n\
         To create one with the default settings:\n\
         • Run: devkit init\n\
         \n\
         Or pass an explicit file with --config <FILE>."
    }

    /// Get hint for invalid Devkit.toml
    pub fn invalid_config() -> &'static str {
        "Devkit.toml is invalid. Common issues:\n\
         • Misspelled section or key (unknown keys are rejected)\n\
         • Invalid TOML syntax (check quotes, brackets, commas)\n\
         • A program entry with an empty name"
    }

    /// Get hint for a missing build directory
    pub fn build_dir_missing() -> &'static str {
        "Compile the project first:\n\
         • Run: devkit build\n\
         \n\
         Or pass the CMake build directory with --build-dir <DIR>."
    }

    /// Get hint for running on a non-Linux host
    pub fn unsupported_platform() -> &'static str {
        "devkit drives Linux toolchains (CMake, clang tooling, checkinstall) and only runs on Linux."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_message() {
        let err = DevkitError::missing_tool("clang-tidy", "clang --tidy", hints::clang_tools());
        assert_eq!(
            err.to_string(),
            "Missing tool: clang-tidy (required for clang --tidy)"
        );
        assert!(err.hint().unwrap().contains("clang-tidy"));
    }

    #[test]
    fn test_command_failed_message() {
        let err = DevkitError::command_failed("cmake --build build", 2);
        assert_eq!(
            err.to_string(),
            "Command failed with exit code 2: cmake --build build"
        );
        assert!(err.hint().is_none());
    }

    #[test]
    fn test_config_error_keeps_source() {
        let source = anyhow::anyhow!("expected `=`");
        let err = DevkitError::config_error_with_hint(
            "Failed to parse Devkit.toml",
            Some(source),
            hints::invalid_config(),
        );
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.hint().is_some());
    }

    #[test]
    fn test_unsupported_platform_has_hint() {
        let err = DevkitError::UnsupportedPlatform {
            platform: "macos".to_string(),
        };
        assert_eq!(err.to_string(), "macos is currently not supported");
        assert!(err.hint().is_some());
    }
}
