use serde::Serialize;

use brandkit::assemble;
use brandkit::Result;

use crate::commands::Context;

#[derive(Debug, Serialize)]
pub struct PlanOutput {
    pub task: String,
    pub steps: Vec<String>,
}

/// Resolve a task to its flat execution plan without running anything.
pub fn run(ctx: &Context, task: Option<&str>) -> Result<PlanOutput> {
    let task = task.unwrap_or(assemble::DEFAULT_TASK);
    let registry = assemble::build_registry(&ctx.config, &ctx.signal)?;
    let steps = registry.resolve(task)?;

    Ok(PlanOutput {
        task: task.to_string(),
        steps,
    })
}
