//! Glob expansion with negation patterns.
//!
//! Source selectors are ordered pattern lists where a leading `!` excludes
//! previously matched files, e.g. `["**/*.css", "!**/*.min.css"]`.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Expand an ordered pattern list against `base`, returning matched file
/// paths relative to `base`. Positive patterns append matches in pattern
/// order (first occurrence wins); `!` patterns remove earlier matches.
/// Directories are never returned.
pub fn expand(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut matched: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        if let Some(negated) = pattern.strip_prefix('!') {
            matched.retain(|path| !glob_match::glob_match(negated, &path.to_string_lossy()));
            continue;
        }

        let full_pattern = base.join(pattern);
        let entries = glob::glob(&full_pattern.to_string_lossy()).map_err(|e| {
            Error::config_invalid_value("src", Some(pattern.clone()), e.to_string())
        })?;

        for entry in entries {
            let path = entry.map_err(|e| {
                Error::internal_io(e.to_string(), Some(format!("glob {}", pattern)))
            })?;
            if path.is_dir() {
                continue;
            }
            let relative = path
                .strip_prefix(base)
                .unwrap_or(&path)
                .to_path_buf();
            if !matched.contains(&relative) {
                matched.push(relative);
            }
        }
    }

    Ok(matched)
}

/// Expand patterns and join the results back onto `base`, for callers that
/// need absolute paths rather than structure-preserving relative ones.
pub fn expand_absolute(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    Ok(expand(base, patterns)?
        .into_iter()
        .map(|rel| base.join(rel))
        .collect())
}
