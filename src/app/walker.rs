use crate::app::invoker::{exit_problem, TestInvoker};
use crate::app::models::{RunConfig, WalkState};
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Decides which entries are cut out of the traversal, subtree included.
#[derive(Debug, Clone)]
pub struct PruneRules {
    skip: Vec<PathBuf>,
    max_depth: i64,
}

impl PruneRules {
    pub fn new(config: &RunConfig) -> Self {
        Self {
            skip: config.directories_to_skip.clone(),
            max_depth: config.search_depth,
        }
    }

    pub fn prunes(&self, path: &Path, is_dir: bool) -> bool {
        if self.skip.iter().any(|skip| skip == path) {
            log::debug!("Skipping {} (listed in directoriesToSkip)", path.display());
            return true;
        }
        // Deeper packages are still reached through the `./...` pattern.
        if is_dir && separator_count(path) as i64 > self.max_depth {
            log::debug!("Pruning {} (deeper than searchDepth)", path.display());
            return true;
        }
        false
    }
}

pub fn separator_count(path: &Path) -> usize {
    path.as_os_str()
        .to_string_lossy()
        .matches(MAIN_SEPARATOR)
        .count()
}

/// Walks `config.base_path` in pre-order and runs the invoker in every
/// directory that survives pruning.
pub fn walk<I: TestInvoker>(config: &RunConfig, invoker: &mut I) -> Result<WalkState> {
    let mut state = WalkState::new();
    let rules = PruneRules::new(config);
    let root = config.base_path.as_path();

    // The walker never filters its root, so check it up front.
    if rules.prunes(root, root.is_dir()) {
        return Ok(state);
    }

    let filter_rules = rules.clone();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !filter_rules.prunes(entry.path(), is_dir)
        })
        .build();

    for result in walker {
        let entry = result.context("Failed to walk directory tree")?;
        if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }
        visit(entry.path(), invoker, &mut state);
    }

    Ok(state)
}

fn visit<I: TestInvoker>(dir: &Path, invoker: &mut I, state: &mut WalkState) {
    match invoker.invoke(dir) {
        Ok(invocation) => {
            if let Some(problem) = exit_problem(&invocation) {
                log::warn!("Test command in {} failed: {}", dir.display(), problem);
                println!("{}", problem);
            }
            if state.record(&invocation.output) {
                println!("{}", String::from_utf8_lossy(&invocation.output));
            } else {
                log::debug!("No Go packages under {}", dir.display());
            }
        }
        Err(err) => {
            log::warn!("Could not run tests in {}: {:#}", dir.display(), err);
            println!("{:#}", err);
            // A command that never started produced no output, which still counts.
            state.record(&[]);
        }
    }
    println!("Current directory:  {}", dir.display());
}
