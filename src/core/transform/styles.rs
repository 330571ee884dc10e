//! Stylesheet pipeline collaborators: LESS compiler, vendor prefixer, CSS
//! minifier, linter, formatter and the native banner stamp.
//!
//! Tool internals are opaque; each function only owns the argv contract and
//! the mapping of task options onto flags.

use std::fs;
use std::path::Path;

use crate::config::BrandkitConfig;
use crate::error::{Error, Result};
use crate::task::TaskDefinition;
use crate::utils::{command, globs};

use super::{check_tool, ensure_parent_dir, io_error, require_dest, unix_newlines};

/// Compile a brand's LESS entry point to CSS.
pub(crate) fn less(config: &BrandkitConfig, root: &Path, task: &TaskDefinition) -> Result<()> {
    let entry = task.src.first().ok_or_else(|| {
        Error::config_invalid_value(
            "src",
            None,
            format!("Task '{}' has no stylesheet entry", task.name),
        )
    })?;
    let dest = require_dest(task)?;
    ensure_parent_dir(&root.join(dest))?;

    let mut args: Vec<String> = Vec::new();
    if task.option_bool("strictMath").unwrap_or(false) {
        args.push("--strict-math=on".to_string());
    }
    if task.option_bool("sourceMap").unwrap_or(false) {
        match task.option_str("sourceMapFilename") {
            Some(filename) => args.push(format!("--source-map={}", filename)),
            None => args.push("--source-map".to_string()),
        }
        if let Some(url) = task.option_str("sourceMapURL") {
            args.push(format!("--source-map-url={}", url));
        }
        if task.option_bool("outputSourceFiles").unwrap_or(false) {
            args.push("--source-map-include-source".to_string());
        }
    }
    args.push(entry.clone());
    args.push(dest.to_string());

    let output = command::capture_in(root, &config.tools.lessc, &args, "less compile")?;
    check_tool(task, &config.tools.lessc, output)
}

/// Run the vendor prefixer in place over the compiled CSS.
pub(crate) fn autoprefixer(
    config: &BrandkitConfig,
    root: &Path,
    task: &TaskDefinition,
) -> Result<()> {
    let files = globs::expand(root, &task.src)?;
    if files.is_empty() {
        return Ok(());
    }

    let mut args: Vec<String> = vec![
        "--use".to_string(),
        "autoprefixer".to_string(),
        "--autoprefixer.browsers".to_string(),
        config.autoprefixer_browsers.join(", "),
        "--replace".to_string(),
    ];
    if task.option_bool("map").unwrap_or(false) {
        args.push("--map".to_string());
    }
    args.extend(files.iter().map(|f| f.to_string_lossy().to_string()));

    let output = command::capture_in(root, &config.tools.postcss, &args, "autoprefix")?;
    check_tool(task, &config.tools.postcss, output)
}

/// Minify one CSS file to its `.min.css` sibling.
pub(crate) fn cssmin(config: &BrandkitConfig, root: &Path, task: &TaskDefinition) -> Result<()> {
    let src = task.src.first().ok_or_else(|| {
        Error::config_invalid_value(
            "src",
            None,
            format!("Task '{}' has no source file", task.name),
        )
    })?;
    let dest = require_dest(task)?;
    ensure_parent_dir(&root.join(dest))?;

    let mut args: Vec<String> = Vec::new();
    if let Some(compat) = task.option_str("compatibility") {
        args.push("--compatibility".to_string());
        args.push(compat.to_string());
    }
    if task.option_bool("noAdvanced").unwrap_or(false) {
        args.push("--skip-advanced".to_string());
    }
    args.push("-o".to_string());
    args.push(dest.to_string());
    args.push(src.clone());

    let output = command::capture_in(root, &config.tools.cleancss, &args, "css minify")?;
    check_tool(task, &config.tools.cleancss, output)
}

pub(crate) fn csslint(config: &BrandkitConfig, root: &Path, task: &TaskDefinition) -> Result<()> {
    let files = globs::expand(root, &task.src)?;
    if files.is_empty() {
        return Ok(());
    }

    let mut args: Vec<String> = Vec::new();
    if let Some(rc) = task.option_str("csslintrc") {
        args.push(format!("--config={}", rc));
    }
    args.extend(files.iter().map(|f| f.to_string_lossy().to_string()));

    let output = command::capture_in(root, &config.tools.csslint, &args, "css lint")?;
    check_tool(task, &config.tools.csslint, output)
}

/// Reformat compiled CSS in place with the project comb configuration.
pub(crate) fn csscomb(config: &BrandkitConfig, root: &Path, task: &TaskDefinition) -> Result<()> {
    let base = match task.option_str("cwd") {
        Some(cwd) => root.join(cwd),
        None => root.to_path_buf(),
    };
    if !base.exists() {
        return Ok(());
    }
    let files = globs::expand(&base, &task.src)?;
    if files.is_empty() {
        return Ok(());
    }

    let mut args: Vec<String> = Vec::new();
    if let Some(config_path) = task.option_str("config") {
        args.push("--config".to_string());
        args.push(config_path.to_string());
    }
    args.extend(files.iter().map(|f| f.to_string_lossy().to_string()));

    let output = command::capture_in(&base, &config.tools.csscomb, &args, "css comb")?;
    check_tool(task, &config.tools.csscomb, output)
}

/// Stamp the distribution banner on top of every matched CSS file. Files
/// already carrying the banner are left untouched, so re-running the stage
/// is byte-stable.
pub(crate) fn usebanner(root: &Path, task: &TaskDefinition) -> Result<()> {
    let banner = task.option_str("banner").unwrap_or_default().to_string();
    if banner.is_empty() {
        return Ok(());
    }

    for relative in globs::expand(root, &task.src)? {
        let path = root.join(&relative);
        let content = fs::read_to_string(&path).map_err(|e| io_error(e, &path, "read"))?;
        if content.starts_with(&banner) {
            continue;
        }
        let stamped = unix_newlines(&format!("{}{}", banner, content));
        fs::write(&path, stamped).map_err(|e| io_error(e, &path, "write"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskKind;

    #[test]
    fn usebanner_prepends_once_and_stays_stable() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("dist/css/ksp")).unwrap();
        fs::write(dir.path().join("dist/css/ksp/bootstrap.css"), "body{}\n").unwrap();

        let task = TaskDefinition::new("usebanner", TaskKind::Usebanner)
            .src(["dist/css/**/*.css"])
            .option("banner", "/*! bootstrap v3.2.0 */\n");

        usebanner(dir.path(), &task).unwrap();
        let first = fs::read_to_string(dir.path().join("dist/css/ksp/bootstrap.css")).unwrap();
        assert_eq!(first, "/*! bootstrap v3.2.0 */\nbody{}\n");

        usebanner(dir.path(), &task).unwrap();
        let second = fs::read_to_string(dir.path().join("dist/css/ksp/bootstrap.css")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn usebanner_without_banner_option_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.css"), "p{}").unwrap();

        let task = TaskDefinition::new("usebanner", TaskKind::Usebanner).src(["*.css"]);
        usebanner(dir.path(), &task).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("a.css")).unwrap(), "p{}");
    }

    #[test]
    fn usebanner_normalizes_windows_newlines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.css"), "p{}\r\nbody{}\r\n").unwrap();

        let task = TaskDefinition::new("usebanner", TaskKind::Usebanner)
            .src(["*.css"])
            .option("banner", "/*! b */\n");
        usebanner(dir.path(), &task).unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("a.css")).unwrap(),
            "/*! b */\np{}\nbody{}\n"
        );
    }
}
