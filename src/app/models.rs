use std::path::PathBuf;

/// Output prefix `go test` emits when a directory has no Go packages below it.
pub const NO_PACKAGES_PREFIX: &str = "pattern ./...: directory prefix";

/// Represents the validated configuration loaded from `config.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub base_path: PathBuf,
    pub directories_to_skip: Vec<PathBuf>,
    /// Negative values prune every directory, the root included.
    pub search_depth: i64,
    /// Program followed by its arguments.
    pub test_command: Vec<String>,
}

impl RunConfig {
    pub fn default_test_command() -> Vec<String> {
        ["go", "test", "-v", "./..."]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

/// Captured result of running the test command in one directory.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    pub output: Vec<u8>,
    pub exit_code: Option<i32>,
    /// Signal that terminated the process, when there is no exit code.
    pub signal: Option<i32>,
    pub success: bool,
}

/// Accumulator threaded through the traversal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkState {
    pub report_data: Vec<u8>,
    /// Starts at -1 so the root directory is not counted.
    pub dir_count: i64,
}

impl Default for WalkState {
    fn default() -> Self {
        Self {
            report_data: Vec::new(),
            dir_count: -1,
        }
    }
}

impl WalkState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one directory's output into the state.
    ///
    /// Returns `false` when the output was discarded because the directory
    /// holds no Go packages.
    pub fn record(&mut self, output: &[u8]) -> bool {
        if output.starts_with(NO_PACKAGES_PREFIX.as_bytes()) {
            return false;
        }
        self.report_data.extend_from_slice(output);
        self.dir_count += 1;
        true
    }
}
