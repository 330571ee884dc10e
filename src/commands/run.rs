use brandkit::assemble;
use brandkit::runner::{RunReport, Runner};
use brandkit::transform::ToolExecutor;
use brandkit::Result;

use crate::commands::Context;

pub fn run(ctx: &Context, task: Option<&str>) -> Result<RunReport> {
    let task = task.unwrap_or(assemble::DEFAULT_TASK);
    let registry = assemble::build_registry(&ctx.config, &ctx.signal)?;
    let executor = ToolExecutor::new(ctx.config.clone(), ctx.root.clone(), ctx.signal.clone());

    Runner::new(&registry, &executor).run(task)
}
