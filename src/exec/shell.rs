//! Shell command execution
//!
//! Command lines come from Devkit.toml (`name` + `flags`) and are run through
//! the user's shell so flags are expanded the way they would be at a prompt.
//! File arguments are never spliced into the line; they are handed to the
//! shell as positional parameters and appended with `"$@"`.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// `$0` of the spawned shell, shown in its own error messages
const SHELL_ARG0: &str = "devkit";

/// Result of a command execution
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit code, -1 when killed by a signal
    pub exit_code: i32,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Execution duration
    pub duration: Duration,
}

impl CommandResult {
    /// Create a CommandResult from an exit status
    pub fn from_status(status: ExitStatus, stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            success: status.success(),
            exit_code: status.code().unwrap_or(-1),
            stdout,
            stderr,
            duration,
        }
    }
}

/// Where the child's output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Share the terminal with the child
    Inherit,
    /// Collect stdout/stderr into the CommandResult
    Capture,
}

/// A shell command line plus file arguments
#[derive(Debug, Clone, Default)]
pub struct ShellCommand {
    line: String,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl ShellCommand {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            ..Default::default()
        }
    }

    /// Append one argument, passed verbatim
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments, passed verbatim
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run from this directory
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    /// The script given to `sh -c`
    fn script(&self) -> String {
        if self.args.is_empty() {
            self.line.clone()
        } else {
            format!("{} \"$@\"", self.line)
        }
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dir) = &self.current_dir {
            write!(f, "(in {}) ", dir.display())?;
        }
        write!(f, "{}", self.line)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// The shell used to run command lines
#[derive(Debug, Clone)]
pub struct Shell {
    program: PathBuf,
}

impl Shell {
    /// Prefer bash, fall back to the POSIX shell
    pub fn detect() -> Self {
        let program = which::which("bash")
            .or_else(|_| which::which("sh"))
            .unwrap_or_else(|_| PathBuf::from("/bin/sh"));
        Self { program }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run a command line and wait for it
    ///
    /// A non-zero exit is not an error here; check `CommandResult::success`.
    pub fn run(&self, command: &ShellCommand, output: Output) -> Result<CommandResult> {
        let start = Instant::now();

        let mut cmd = Command::new(&self.program);
        cmd.arg("-c").arg(command.script()).arg(SHELL_ARG0);
        cmd.args(&command.args);
        if let Some(dir) = &command.current_dir {
            cmd.current_dir(dir);
        }

        match output {
            Output::Inherit => {
                cmd.stdin(Stdio::inherit());
                cmd.stdout(Stdio::inherit());
                cmd.stderr(Stdio::inherit());

                let status = cmd
                    .status()
                    .with_context(|| format!("Failed to execute {}", command.line()))?;

                Ok(CommandResult::from_status(
                    status,
                    String::new(),
                    String::new(),
                    start.elapsed(),
                ))
            }
            Output::Capture => {
                cmd.stdin(Stdio::null());
                let output = cmd
                    .output()
                    .with_context(|| format!("Failed to execute {}", command.line()))?;

                let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();

                Ok(CommandResult::from_status(
                    output.status,
                    stdout,
                    stderr,
                    start.elapsed(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_capture_stdout() {
        let shell = Shell::detect();
        let result = shell
            .run(&ShellCommand::new("echo hello"), Output::Capture)
            .unwrap();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "hello");
    }

    #[test]
    fn test_non_zero_exit_is_not_an_error() {
        let shell = Shell::detect();
        let result = shell
            .run(&ShellCommand::new("exit 3"), Output::Capture)
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, 3);
    }

    #[test]
    fn test_args_are_passed_verbatim() {
        let shell = Shell::detect();
        let command = ShellCommand::new("printf '%s|'")
            .arg("with space.cpp")
            .arg("$HOME;rm.hpp");
        let result = shell.run(&command, Output::Capture).unwrap();
        assert_eq!(result.stdout, "with space.cpp|$HOME;rm.hpp|");
    }

    #[test]
    fn test_flags_are_shell_expanded() {
        let shell = Shell::detect();
        let result = shell
            .run(&ShellCommand::new("echo a   b"), Output::Capture)
            .unwrap();
        assert_eq!(result.stdout, "a b");
    }

    #[test]
    fn test_current_dir() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "").unwrap();
        let shell = Shell::detect();
        let result = shell
            .run(&ShellCommand::new("ls").current_dir(temp.path()), Output::Capture)
            .unwrap();
        assert_eq!(result.stdout, "marker.txt");
    }

    #[test]
    fn test_display_includes_args() {
        let command = ShellCommand::new("clang-format -i").arg("src/a.cpp");
        assert_eq!(command.to_string(), "clang-format -i src/a.cpp");
    }
}
