//! Documentation-site collaborators: site generator, customizer template
//! compiler and the HTML structure validator.

use std::path::Path;

use regex::Regex;

use crate::config::BrandkitConfig;
use crate::error::{Error, Result};
use crate::task::TaskDefinition;
use crate::utils::{command, globs};

use super::check_tool;

/// Build the documentation site (input to HTML validation).
pub(crate) fn jekyll(config: &BrandkitConfig, root: &Path, task: &TaskDefinition) -> Result<()> {
    let args = vec!["build".to_string()];
    let output = command::capture_in(root, &config.tools.jekyll, &args, "docs site build")?;
    check_tool(task, &config.tools.jekyll, output)
}

/// Compile the customizer documentation templates.
pub(crate) fn jade(config: &BrandkitConfig, root: &Path, task: &TaskDefinition) -> Result<()> {
    let files = globs::expand(root, &task.src)?;
    if files.is_empty() {
        return Ok(());
    }

    let mut args: Vec<String> = files.iter().map(|f| f.to_string_lossy().to_string()).collect();
    if let Some(dest) = task.dest.as_deref() {
        args.push("--out".to_string());
        args.push(dest.to_string());
    }
    if task.option_bool("pretty").unwrap_or(false) {
        args.push("--pretty".to_string());
    }

    let output = command::capture_in(root, &config.tools.jade, &args, "customizer build")?;
    check_tool(task, &config.tools.jade, output)
}

/// Validate the generated site's HTML structure. Tolerated warning patterns
/// are filtered out of the validator's report; any remaining violation fails
/// the task.
pub(crate) fn validation(
    config: &BrandkitConfig,
    root: &Path,
    task: &TaskDefinition,
) -> Result<()> {
    let files = globs::expand(root, &task.src)?;
    if files.is_empty() {
        return Ok(());
    }

    let (program, base_args) = config.tools.validator.split_first().ok_or_else(|| {
        Error::config_invalid_value("tools.validator", None, "Validator command is empty")
    })?;

    let mut args: Vec<String> = base_args.to_vec();
    args.extend(files.iter().map(|f| f.to_string_lossy().to_string()));

    let output = command::capture_in(root, program, &args, "html validation")?;

    let relax = compile_patterns(&task.option_str_list("relaxerror"))?;
    let report = format!("{}\n{}", output.stdout, output.stderr);
    let found = violations(&report, &relax);

    if !found.is_empty() {
        return Err(Error::validation_failed(task.name.clone(), found));
    }
    if !output.success {
        // The validator failed without a parseable violation line.
        return check_tool(task, program, output);
    }
    Ok(())
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| {
                Error::config_invalid_value("relaxerror", Some(p.clone()), e.to_string())
            })
        })
        .collect()
}

/// Extract violation lines from a validator report, dropping lines that
/// match a tolerated pattern.
fn violations(report: &str, relax: &[Regex]) -> Vec<String> {
    report
        .lines()
        .map(str::trim)
        .filter(|line| line.contains("error:"))
        .filter(|line| !relax.iter().any(|re| re.is_match(line)))
        .map(String::from)
        .collect()
}
