//! Result file discovery
//!
//! Result files are found by matching file names in a directory against a
//! shell-style pattern, e.g. `*all_to_all_stats_target_*.pkl`.

use std::fs;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Default pattern for per-target statistics files
pub const RESULT_FILE_PATTERN: &str = "*all_to_all_stats_target_*.pkl";

/// A compiled shell-style file name pattern
///
/// Follows fnmatch: `*`, `?`, `[abc]`, `[a-z]`, negated `[!abc]`, and a `]`
/// right after the opening bracket is a member of the class.
#[derive(Debug, Clone)]
pub struct NamePattern {
    pattern: Pattern,
}

impl NamePattern {
    const OPTIONS: MatchOptions = MatchOptions {
        case_sensitive: true,
        require_literal_separator: false,
        require_literal_leading_dot: false,
    };

    pub fn new(pattern: &str) -> IoResult<Self> {
        let pattern = Pattern::new(pattern).map_err(|e| IoError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { pattern })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.pattern.matches_with(name, Self::OPTIONS)
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

/// List files in `dir` whose names match `pattern`
///
/// Files are ordered by `(name length, name)` so that `target_2` sorts
/// before `target_10`. `limit` keeps only the first `n` files.
pub fn discover_result_files(
    dir: &Path,
    pattern: &str,
    limit: Option<usize>,
) -> IoResult<Vec<PathBuf>> {
    let pattern = NamePattern::new(pattern)?;
    let entries = fs::read_dir(dir).map_err(|e| IoError::open(dir, e))?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if pattern.matches(name) {
            files.push(dir.join(name));
        }
    }

    files.sort_by(|a, b| {
        let a = a.to_string_lossy();
        let b = b.to_string_lossy();
        (a.len(), a.as_ref()).cmp(&(b.len(), b.as_ref()))
    });

    if let Some(limit) = limit {
        files.truncate(limit);
    }

    debug!(
        dir = %dir.display(),
        pattern = pattern.as_str(),
        count = files.len(),
        "discovered result files"
    );
    Ok(files)
}

/// Pattern matching the result file of a single target
pub fn target_file_pattern(target: &str) -> String {
    format!("*all_to_all_stats_target_{}.pkl", target)
}
