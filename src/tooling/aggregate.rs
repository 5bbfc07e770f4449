//! File aggregation for the clang tooling
//!
//! Walks every configured project root, collects C++ sources/headers and CMake
//! files, and classifies each source as included or ignored for one tool.
//!
//! Source files are checked against two ignore lists per tool:
//!
//! - an exact file list, and
//! - a directory list, matched by climbing from the file's directory up to and
//!   including the project root and comparing each ancestor for equality.
//!
//! Each source is classified once, against the innermost configured root that
//! contains it, so overlapping or repeated roots never list a file twice.
//!
//! CMake files are never filtered. The aggregator does not fail: a missing
//! project root simply contributes nothing and is reported back to the caller.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

/// File name patterns for C++ sources and headers
pub const SOURCE_PATTERNS: [&str; 2] = ["*.cpp", "*.hpp"];

/// File name pattern for per-project CMake files
pub const BUILD_CONFIG_PATTERN: &str = "CMakeLists.txt";

/// Root-level CMake file
pub const ROOT_BUILD_CONFIG: &str = "CMakeLists.txt";

/// Root-level directory of CMake modules
pub const ROOT_CMAKE_MODULE_DIR: &str = "cmake";

/// File name pattern for CMake modules
pub const CMAKE_MODULE_PATTERN: &str = "*.cmake";

/// Which tool's ignore lists apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IgnoreKind {
    /// clang-format / cmake-format
    Format,
    /// clang-tidy
    Lint,
}

/// Exact file paths and directory paths excluded from one tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    pub files: HashSet<PathBuf>,
    pub directories: HashSet<PathBuf>,
}

impl IgnoreSet {
    pub fn new(
        files: impl IntoIterator<Item = PathBuf>,
        directories: impl IntoIterator<Item = PathBuf>,
    ) -> Self {
        Self {
            files: files.into_iter().collect(),
            directories: directories.into_iter().collect(),
        }
    }

    /// Whether the exact file path is listed
    pub fn is_file_ignored(&self, file: &Path) -> bool {
        self.files.contains(file)
    }

    /// The first listed directory found between the file's parent and
    /// `project_root` (both inclusive), if any.
    ///
    /// Comparison is whole-path equality, so `tests` never matches
    /// `tests-extra`. The climb stops at `project_root` and never inspects
    /// directories above it.
    pub fn ignored_ancestor<'a>(&'a self, file: &Path, project_root: &Path) -> Option<&'a Path> {
        if self.directories.is_empty() {
            return None;
        }

        let mut dir = file.parent();
        while let Some(current) = dir {
            if let Some(listed) = self.directories.get(current) {
                return Some(listed.as_path());
            }
            if current == project_root {
                break;
            }
            dir = current.parent();
        }

        None
    }

    /// Classify one source file found under `project_root`
    pub fn classify(&self, file: &Path, project_root: &Path) -> Classification {
        if self.is_file_ignored(file) {
            return Classification::Ignored(IgnoreReason::File);
        }

        match self.ignored_ancestor(file, project_root) {
            Some(dir) => Classification::Ignored(IgnoreReason::Directory(dir.to_path_buf())),
            None => Classification::Included,
        }
    }
}

/// Ignore lists for both tools; the two are independent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreConfig {
    pub format: IgnoreSet,
    pub lint: IgnoreSet,
}

impl IgnoreConfig {
    pub fn for_kind(&self, kind: IgnoreKind) -> &IgnoreSet {
        match kind {
            IgnoreKind::Format => &self.format,
            IgnoreKind::Lint => &self.lint,
        }
    }
}

/// Why a file was ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Listed in the file-ignore set
    File,
    /// Under this listed directory
    Directory(PathBuf),
}

/// Outcome for one discovered source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Included,
    Ignored(IgnoreReason),
}

/// A source excluded by an ignore list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredFile {
    pub path: PathBuf,
    pub reason: IgnoreReason,
}

/// Everything the aggregator needs to know about the repository
#[derive(Debug, Clone, Default)]
pub struct ScanLayout {
    /// Directory holding the root CMakeLists.txt and cmake/ modules
    pub workspace_root: PathBuf,
    /// Project roots, scanned in order
    pub project_roots: Vec<PathBuf>,
    pub ignore: IgnoreConfig,
}

/// Files collected for one tool run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Included C++ sources and headers, in scan order
    pub sources: Vec<PathBuf>,
    /// CMake files, in scan order
    pub build_configs: Vec<PathBuf>,
    /// Sources excluded by an ignore list
    pub ignored: Vec<IgnoredFile>,
    /// Configured project roots that do not exist
    pub missing_roots: Vec<PathBuf>,
}

/// Counts reported after a tool run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub included: usize,
    pub ignored: usize,
    pub ignored_directories: usize,
}

impl ScanResult {
    pub fn ignored_count(&self) -> usize {
        self.ignored.len()
    }

    pub fn ignored_paths(&self) -> Vec<PathBuf> {
        self.ignored.iter().map(|f| f.path.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.build_configs.is_empty() && self.ignored.is_empty()
    }

    /// Counts for reporting; `ignore` supplies the configured directory count
    pub fn summary(&self, ignore: &IgnoreSet) -> ScanSummary {
        ScanSummary {
            included: self.sources.len() + self.build_configs.len(),
            ignored: self.ignored_count(),
            ignored_directories: ignore.directories.len(),
        }
    }
}

/// Compiled file name patterns
struct Matchers {
    sources: Vec<Pattern>,
    build_configs: Vec<Pattern>,
    cmake_modules: Vec<Pattern>,
}

impl Matchers {
    fn new() -> Self {
        Self {
            sources: compile(&SOURCE_PATTERNS),
            build_configs: compile(&[BUILD_CONFIG_PATTERN]),
            cmake_modules: compile(&[CMAKE_MODULE_PATTERN]),
        }
    }

    fn is_source(&self, name: &str) -> bool {
        self.sources.iter().any(|p| p.matches(name))
    }

    fn is_build_config(&self, name: &str) -> bool {
        self.build_configs.iter().any(|p| p.matches(name))
    }

    fn is_cmake_module(&self, name: &str) -> bool {
        self.cmake_modules.iter().any(|p| p.matches(name))
    }
}

fn compile(patterns: &[&str]) -> Vec<Pattern> {
    patterns.iter().filter_map(|p| Pattern::new(p).ok()).collect()
}

/// Sorted regular files under `root`; unreadable entries are skipped
fn walk_files(root: &Path) -> impl Iterator<Item = walkdir::DirEntry> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
}

/// Collect and classify the files relevant to one tool
pub fn aggregate(layout: &ScanLayout, kind: IgnoreKind) -> ScanResult {
    let ignore = layout.ignore.for_kind(kind);
    let matchers = Matchers::new();
    let mut result = ScanResult::default();
    let mut seen_configs = HashSet::new();
    let mut seen_sources = HashSet::new();

    let mut roots: Vec<&Path> = Vec::new();
    for root in &layout.project_roots {
        if root.is_dir() {
            if !roots.contains(&root.as_path()) {
                roots.push(root);
            }
        } else if !result.missing_roots.contains(root) {
            result.missing_roots.push(root.clone());
        }
    }

    for &root in &roots {
        for entry in walk_files(root) {
            let (is_source, is_build_config) = {
                let name = entry.file_name().to_string_lossy();
                (matchers.is_source(&name), matchers.is_build_config(&name))
            };

            if is_source {
                let path = entry.into_path();
                if !seen_sources.insert(path.clone()) {
                    continue;
                }
                let owner = innermost_root(&path, &roots).unwrap_or(root);
                match ignore.classify(&path, owner) {
                    Classification::Included => result.sources.push(path),
                    Classification::Ignored(reason) => {
                        result.ignored.push(IgnoredFile { path, reason })
                    }
                }
            } else if is_build_config {
                let path = entry.into_path();
                if seen_configs.insert(path.clone()) {
                    result.build_configs.push(path);
                }
            }
        }
    }

    for path in root_build_configs(&layout.workspace_root, &matchers) {
        if seen_configs.insert(path.clone()) {
            result.build_configs.push(path);
        }
    }

    result
}

/// The deepest root that contains `file`
fn innermost_root<'a>(file: &Path, roots: &[&'a Path]) -> Option<&'a Path> {
    roots
        .iter()
        .copied()
        .filter(|root| file.starts_with(root))
        .max_by_key(|root| root.components().count())
}

/// The root CMakeLists.txt and every module under the root cmake/ directory
fn root_build_configs(workspace_root: &Path, matchers: &Matchers) -> Vec<PathBuf> {
    let mut configs = Vec::new();

    let modules = workspace_root.join(ROOT_CMAKE_MODULE_DIR);
    if modules.is_dir() {
        configs.extend(
            walk_files(&modules)
                .filter(|e| matchers.is_cmake_module(&e.file_name().to_string_lossy()))
                .map(walkdir::DirEntry::into_path),
        );
    }

    let root_lists = workspace_root.join(ROOT_BUILD_CONFIG);
    if root_lists.is_file() {
        configs.push(root_lists);
    }

    configs
}
