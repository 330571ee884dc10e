//! Native filesystem tasks: output cleaning and structure-preserving copies.

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::task::TaskDefinition;
use crate::utils::globs;

use super::{ensure_parent_dir, io_error, require_dest};

/// Remove the listed output directories (or files). Missing targets are
/// fine; a clean tree is the goal, not a precondition.
pub(crate) fn clean(root: &Path, task: &TaskDefinition) -> Result<()> {
    for target in &task.src {
        let path = root.join(target);
        if !path.exists() {
            continue;
        }
        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| io_error(e, &path, "remove"))?;
        } else {
            fs::remove_file(&path).map_err(|e| io_error(e, &path, "remove"))?;
        }
    }
    Ok(())
}

/// Copy files matched by the src globs into the destination directory,
/// preserving their paths relative to the `cwd` option (default: the
/// project root). Re-running overwrites previous copies byte-for-byte.
pub(crate) fn copy(root: &Path, task: &TaskDefinition) -> Result<()> {
    let dest = require_dest(task)?;
    let base = match task.option_str("cwd") {
        Some(cwd) => root.join(cwd),
        None => root.to_path_buf(),
    };

    if !base.exists() {
        return Ok(());
    }

    let dest_root = root.join(dest);
    for relative in globs::expand(&base, &task.src)? {
        let from = base.join(&relative);
        let to = dest_root.join(&relative);
        ensure_parent_dir(&to)?;
        fs::copy(&from, &to).map_err(|e| io_error(e, &from, "copy"))?;
    }

    Ok(())
}
