//! Sequential task execution.
//!
//! One `run` resolves a task name to its flat plan and executes it strictly
//! in order: later stages consume the filesystem outputs of earlier ones, so
//! there is no intra-run parallelism. Execution is fail-fast; outputs of
//! completed steps stay on disk, and re-running after a fix overwrites them.

use std::time::Instant;

use serde::Serialize;

use crate::error::Result;
use crate::registry::TaskRegistry;
use crate::transform::TaskExecutor;

pub struct Runner<'a> {
    registry: &'a TaskRegistry,
    executor: &'a dyn TaskExecutor,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub task: String,
    pub executed: Vec<ExecutedTask>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecutedTask {
    pub name: String,
    pub kind: String,
    pub duration_ms: u64,
}

impl<'a> Runner<'a> {
    pub fn new(registry: &'a TaskRegistry, executor: &'a dyn TaskExecutor) -> Self {
        Self { registry, executor }
    }

    /// The flat execution plan for a task name, without executing anything.
    pub fn plan(&self, name: &str) -> Result<Vec<String>> {
        self.registry.resolve(name)
    }

    /// Resolve and execute. The first failing task aborts the remainder;
    /// its error is annotated with the task name and 1-based position in
    /// the resolved sequence.
    pub fn run(&self, name: &str) -> Result<RunReport> {
        let plan = self.plan(name)?;
        let total = plan.len();
        let mut executed = Vec::with_capacity(total);

        for (index, task_name) in plan.iter().enumerate() {
            let task = self.registry.get(task_name)?;
            let position = index + 1;
            crate::log_status!("run", "{} ({}/{})", task_name, position, total);

            let started = Instant::now();
            self.executor
                .execute(task)
                .map_err(|e| e.at_position(task_name, position, total))?;

            executed.push(ExecutedTask {
                name: task_name.clone(),
                kind: task.kind.as_str().to_string(),
                duration_ms: started.elapsed().as_millis() as u64,
            });
        }

        Ok(RunReport {
            task: name.to_string(),
            executed,
        })
    }
}
