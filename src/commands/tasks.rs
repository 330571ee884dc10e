use serde::Serialize;

use brandkit::assemble;
use brandkit::Result;

use crate::commands::Context;

#[derive(Debug, Serialize)]
pub struct TaskListing {
    pub tasks: Vec<String>,
    pub composites: Vec<String>,
}

pub fn run(ctx: &Context) -> Result<TaskListing> {
    let registry = assemble::build_registry(&ctx.config, &ctx.signal)?;

    Ok(TaskListing {
        tasks: registry.task_names(),
        composites: registry.composite_names(),
    })
}
