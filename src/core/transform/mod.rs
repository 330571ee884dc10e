//! Execution seam between the orchestrator and its external collaborators.
//!
//! The runner only sees [`TaskExecutor`]; [`ToolExecutor`] is the production
//! implementation that dispatches each task kind to its transformation:
//! native filesystem work for clean/copy/concat/usebanner, child processes
//! for the compilers/minifiers/linters, HTTP for the cloud test grid.

use std::path::{Path, PathBuf};
use std::process::Child;
use std::sync::Mutex;

use crate::config::BrandkitConfig;
use crate::error::{Error, Result, TransformFailedDetails};
use crate::signal::EnvSignal;
use crate::task::{TaskDefinition, TaskKind};
use crate::utils::command::CommandOutput;

mod docs;
mod files;
mod sauce;
mod scripts;
mod styles;

pub trait TaskExecutor: Send + Sync {
    fn execute(&self, task: &TaskDefinition) -> Result<()>;
}

pub struct ToolExecutor {
    config: BrandkitConfig,
    root: PathBuf,
    signal: EnvSignal,
    /// Static server spawned by `connect`, kept alive for the cloud test
    /// dispatch and killed when the run ends.
    serve: Mutex<Option<Child>>,
}

impl ToolExecutor {
    pub fn new(config: BrandkitConfig, root: PathBuf, signal: EnvSignal) -> Self {
        Self {
            config,
            root,
            signal,
            serve: Mutex::new(None),
        }
    }
}

impl TaskExecutor for ToolExecutor {
    fn execute(&self, task: &TaskDefinition) -> Result<()> {
        match task.kind {
            TaskKind::Clean => files::clean(&self.root, task),
            TaskKind::Copy => files::copy(&self.root, task),
            TaskKind::Less => styles::less(&self.config, &self.root, task),
            TaskKind::Autoprefixer => styles::autoprefixer(&self.config, &self.root, task),
            TaskKind::Cssmin => styles::cssmin(&self.config, &self.root, task),
            TaskKind::Csslint => styles::csslint(&self.config, &self.root, task),
            TaskKind::Csscomb => styles::csscomb(&self.config, &self.root, task),
            TaskKind::Usebanner => styles::usebanner(&self.root, task),
            TaskKind::Concat => scripts::concat(&self.root, task),
            TaskKind::Uglify => scripts::uglify(&self.config, &self.root, task),
            TaskKind::Jshint => scripts::jshint(&self.config, &self.root, task),
            TaskKind::Jscs => scripts::jscs(&self.config, &self.root, task),
            TaskKind::Qunit => scripts::qunit(&self.config, &self.root, task),
            TaskKind::Jekyll => docs::jekyll(&self.config, &self.root, task),
            TaskKind::Jade => docs::jade(&self.config, &self.root, task),
            TaskKind::Validation => docs::validation(&self.config, &self.root, task),
            TaskKind::Connect => {
                let child = sauce::connect(&self.config, &self.root, task)?;
                let mut slot = self
                    .serve
                    .lock()
                    .map_err(|_| Error::internal_unexpected("Failed to lock server handle"))?;
                if let Some(mut previous) = slot.replace(child) {
                    let _ = previous.kill();
                }
                Ok(())
            }
            TaskKind::Saucelabs => sauce::dispatch(&self.config, &self.root, &self.signal, task),
        }
    }
}

impl Drop for ToolExecutor {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.serve.lock() {
            if let Some(mut child) = slot.take() {
                let _ = child.kill();
                let _ = child.wait();
            }
        }
    }
}

// === Shared helpers for the transform modules ===

pub(crate) fn require_dest(task: &TaskDefinition) -> Result<&str> {
    task.dest.as_deref().ok_or_else(|| {
        Error::config_invalid_value(
            "dest",
            None,
            format!("Task '{}' has no destination configured", task.name),
        )
    })
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::internal_io(e.to_string(), Some(format!("create {}", parent.display())))
        })?;
    }
    Ok(())
}

pub(crate) fn io_error(err: std::io::Error, path: &Path, action: &str) -> Error {
    Error::internal_io(
        err.to_string(),
        Some(format!("{} {}", action, path.display())),
    )
}

/// Map a finished tool invocation onto the task result: success passes
/// through, a non-zero exit becomes a transformation failure carrying the
/// tool's exit code and output.
pub(crate) fn check_tool(
    task: &TaskDefinition,
    program: &str,
    output: CommandOutput,
) -> Result<()> {
    if output.success {
        return Ok(());
    }
    Err(Error::transform_failed(TransformFailedDetails {
        task: task.name.clone(),
        command: program.to_string(),
        exit_code: Some(output.exit_code),
        stdout: output.stdout,
        stderr: output.stderr,
    }))
}

/// Normalize generated text artifacts to Unix newlines.
pub(crate) fn unix_newlines(content: &str) -> String {
    content.replace("\r\n", "\n")
}
