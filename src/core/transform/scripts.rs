//! Script pipeline collaborators: banner-headed concatenation, minifier,
//! linters and the unit-test runner.

use std::fs;
use std::path::Path;

use crate::config::BrandkitConfig;
use crate::error::{Error, Result};
use crate::task::TaskDefinition;
use crate::utils::{command, globs};

use super::{check_tool, ensure_parent_dir, io_error, require_dest, unix_newlines};

/// Concatenate the ordered script sources into one file, headed by the
/// rendered banner. Sources are explicit ordered paths; order is part of the
/// contract (plugins depend on earlier ones).
pub(crate) fn concat(root: &Path, task: &TaskDefinition) -> Result<()> {
    let dest = require_dest(task)?;
    let banner = task.option_str("banner").unwrap_or_default();

    let mut parts: Vec<String> = Vec::with_capacity(task.src.len());
    for source in &task.src {
        let path = root.join(source);
        let content = fs::read_to_string(&path).map_err(|e| io_error(e, &path, "read"))?;
        parts.push(unix_newlines(&content));
    }

    let mut combined = String::from(banner);
    combined.push_str(&parts.join("\n"));
    if !combined.ends_with('\n') {
        combined.push('\n');
    }

    let dest_path = root.join(dest);
    ensure_parent_dir(&dest_path)?;
    fs::write(&dest_path, unix_newlines(&combined)).map_err(|e| io_error(e, &dest_path, "write"))
}

/// Minify the concatenated bundle.
pub(crate) fn uglify(config: &BrandkitConfig, root: &Path, task: &TaskDefinition) -> Result<()> {
    let files = globs::expand(root, &task.src)?;
    if files.is_empty() {
        return Err(Error::config_invalid_value(
            "src",
            None,
            format!("Task '{}' matched no input scripts", task.name),
        ));
    }
    let dest = require_dest(task)?;
    ensure_parent_dir(&root.join(dest))?;

    let mut args: Vec<String> = files.iter().map(|f| f.to_string_lossy().to_string()).collect();
    args.push("-o".to_string());
    args.push(dest.to_string());
    if task.option_bool("compress").unwrap_or(false) {
        args.push("--compress".to_string());
    }
    if task.option_bool("mangle").unwrap_or(false) {
        args.push("--mangle".to_string());
    }
    if let Some(comments) = task.option_str("preserveComments") {
        args.push("--comments".to_string());
        args.push(comments.to_string());
    }

    let output = command::capture_in(root, &config.tools.uglifyjs, &args, "js minify")?;
    check_tool(task, &config.tools.uglifyjs, output)
}

pub(crate) fn jshint(config: &BrandkitConfig, root: &Path, task: &TaskDefinition) -> Result<()> {
    lint(root, task, &config.tools.jshint, "jshintrc", "js hint")
}

pub(crate) fn jscs(config: &BrandkitConfig, root: &Path, task: &TaskDefinition) -> Result<()> {
    lint(root, task, &config.tools.jscs, "jscsrc", "js style check")
}

fn lint(
    root: &Path,
    task: &TaskDefinition,
    program: &str,
    rc_option: &str,
    context: &str,
) -> Result<()> {
    let files = globs::expand(root, &task.src)?;
    if files.is_empty() {
        return Ok(());
    }

    let mut args: Vec<String> = Vec::new();
    if let Some(rc) = task.option_str(rc_option) {
        args.push("--config".to_string());
        args.push(rc.to_string());
    }
    args.extend(files.iter().map(|f| f.to_string_lossy().to_string()));

    let output = command::capture_in(root, program, &args, context)?;
    check_tool(task, program, output)
}

/// Run the configured unit-test command (a browser harness; its internals
/// are opaque, only the exit code matters).
pub(crate) fn qunit(config: &BrandkitConfig, root: &Path, task: &TaskDefinition) -> Result<()> {
    let (program, args) = config.tools.qunit.split_first().ok_or_else(|| {
        Error::config_invalid_value("tools.qunit", None, "Unit-test command is empty")
    })?;

    let output = command::capture_in(root, program, args, "unit tests")?;
    check_tool(task, program, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskKind;

    #[test]
    fn concat_joins_sources_in_declared_order_with_banner() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("js")).unwrap();
        fs::write(dir.path().join("js/alert.js"), "alert();\n").unwrap();
        fs::write(dir.path().join("js/modal.js"), "modal();\n").unwrap();

        let task = TaskDefinition::new("concat:scripts", TaskKind::Concat)
            .src(["js/alert.js", "js/modal.js"])
            .dest("dist/js/bootstrap.js")
            .option("banner", "/*! bundle */\n");
        concat(dir.path(), &task).unwrap();

        let bundle = fs::read_to_string(dir.path().join("dist/js/bootstrap.js")).unwrap();
        assert_eq!(bundle, "/*! bundle */\nalert();\n\nmodal();\n");
        let alert_pos = bundle.find("alert").unwrap();
        let modal_pos = bundle.find("modal").unwrap();
        assert!(alert_pos < modal_pos);
    }

    #[test]
    fn concat_is_byte_identical_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "a();").unwrap();

        let task = TaskDefinition::new("concat:scripts", TaskKind::Concat)
            .src(["a.js"])
            .dest("out.js");
        concat(dir.path(), &task).unwrap();
        let first = fs::read(dir.path().join("out.js")).unwrap();
        concat(dir.path(), &task).unwrap();
        let second = fs::read(dir.path().join("out.js")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn concat_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let task = TaskDefinition::new("concat:scripts", TaskKind::Concat)
            .src(["js/ghost.js"])
            .dest("out.js");
        assert!(concat(dir.path(), &task).is_err());
    }

    #[test]
    fn concat_forces_unix_newlines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "a();\r\nb();\r\n").unwrap();

        let task = TaskDefinition::new("concat:scripts", TaskKind::Concat)
            .src(["a.js"])
            .dest("out.js");
        concat(dir.path(), &task).unwrap();
        let bundle = fs::read_to_string(dir.path().join("out.js")).unwrap();
        assert!(!bundle.contains('\r'));
    }
}
