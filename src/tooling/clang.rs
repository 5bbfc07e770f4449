//! clang-format / cmake-format / clang-tidy invocation

use anyhow::Result;

use super::aggregate::{
    aggregate, IgnoreKind, IgnoreReason, IgnoredFile, ScanLayout, ScanResult, ScanSummary,
};
use crate::config::Program;
use crate::error::DevkitError;
use crate::exec::{Output, Shell, ShellCommand};
use crate::utils::terminal::{
    create_progress_bar, print_error, print_info, print_running, print_success, print_warning,
};

/// Drives the clang tooling over the files of a [`ScanLayout`]
pub struct ClangTooling {
    cxx_formatter: Program,
    cmake_formatter: Program,
    linter: Program,
    shell: Shell,
    verbose: bool,
}

impl ClangTooling {
    pub fn new(
        cxx_formatter: Program,
        cmake_formatter: Program,
        linter: Program,
        shell: Shell,
        verbose: bool,
    ) -> Self {
        Self {
            cxx_formatter,
            cmake_formatter,
            linter,
            shell,
            verbose,
        }
    }

    /// Format every included source with the C++ formatter and every CMake
    /// file with the CMake formatter. All files are attempted; the run fails
    /// afterwards if any of them did.
    pub fn format(&self, layout: &ScanLayout) -> Result<ScanSummary> {
        let scan = aggregate(layout, IgnoreKind::Format);
        warn_missing_roots(&scan);
        if self.verbose {
            scan.ignored.iter().for_each(print_skipped);
        }
        if scan.is_empty() {
            print_warning("No files found under the configured projects");
        }

        let jobs: Vec<ShellCommand> = scan
            .sources
            .iter()
            .map(|file| ShellCommand::new(self.cxx_formatter.command_line()).arg(file))
            .chain(
                scan.build_configs
                    .iter()
                    .map(|file| ShellCommand::new(self.cmake_formatter.command_line()).arg(file)),
            )
            .collect();

        let pb = create_progress_bar(jobs.len() as u64, "Formatting");
        let mut failed = 0usize;
        for command in &jobs {
            if self.verbose {
                pb.suspend(|| print_running(&command.to_string()));
            }

            let result = self.shell.run(command, Output::Capture)?;
            if !result.success {
                failed += 1;
                pb.suspend(|| {
                    print_error(&format!("{} (exit code {})", command, result.exit_code));
                    for stream in [&result.stdout, &result.stderr] {
                        if !stream.is_empty() {
                            eprintln!("{}", stream);
                        }
                    }
                });
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        let summary = scan.summary(layout.ignore.for_kind(IgnoreKind::Format));
        println!();
        print_success(&format!("Formatted [{}] file(s)", summary.included - failed));
        print_ignored(&summary);

        if failed > 0 {
            return Err(DevkitError::command_failed_with_hint(
                format!("{} file(s) could not be formatted", failed),
                1,
                "Run with --verbose to see every formatter invocation",
            )
            .into());
        }

        Ok(summary)
    }

    /// Statically analyze every included source with a single linter run
    pub fn tidy(&self, layout: &ScanLayout) -> Result<ScanSummary> {
        let scan = aggregate(layout, IgnoreKind::Lint);
        warn_missing_roots(&scan);
        if self.verbose {
            scan.ignored.iter().for_each(print_skipped);
        }

        // Build configs are formatter input only.
        let summary = ScanSummary {
            included: scan.sources.len(),
            ..scan.summary(layout.ignore.for_kind(IgnoreKind::Lint))
        };

        if scan.sources.is_empty() {
            print_warning("No source files to analyze");
            print_ignored(&summary);
            return Ok(summary);
        }

        let command = ShellCommand::new(self.linter.command_line()).args(&scan.sources);
        print_running(&command.to_string());
        let result = self.shell.run(&command, Output::Inherit)?;

        println!();
        if !result.success {
            return Err(DevkitError::command_failed(self.linter.command_line(), result.exit_code).into());
        }

        print_success(&format!("Statically analyzed [{}] file(s)", summary.included));
        print_ignored(&summary);
        Ok(summary)
    }
}

fn warn_missing_roots(scan: &ScanResult) {
    for root in &scan.missing_roots {
        print_warning(&format!(
            "Project root {} does not exist, nothing to scan there",
            root.display()
        ));
    }
}

fn print_skipped(file: &IgnoredFile) {
    print_info(&skip_message(file));
}

fn skip_message(file: &IgnoredFile) -> String {
    match &file.reason {
        IgnoreReason::File => format!("Skipping {} (listed file)", file.path.display()),
        IgnoreReason::Directory(dir) => {
            format!("Skipping {} (under {})", file.path.display(), dir.display())
        }
    }
}

fn print_ignored(summary: &ScanSummary) {
    print_warning(&format!(
        "Ignored: [{}] file(s) in [{}] directory(s)",
        summary.ignored, summary.ignored_directories
    ));
}
