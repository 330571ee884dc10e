use clap::Parser;

mod commands;
mod output;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "brandkit")]
#[command(version = VERSION)]
#[command(about = "CLI for multi-brand front-end asset pipeline builds")]
struct Cli {
    /// Task to run, atomic or composite (defaults to the "default" composite)
    task: Option<String>,

    /// List registered tasks and composites instead of running
    #[arg(long)]
    list: bool,

    /// Resolve and print the execution plan without running it
    #[arg(long)]
    dry_run: bool,

    /// Path to brandkit.json (defaults to ./brandkit.json)
    #[arg(long, value_name = "PATH")]
    config: Option<String>,
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let ctx = match commands::load_context(cli.config.as_deref()) {
        Ok(ctx) => ctx,
        Err(err) => {
            let code = output::print_result::<serde_json::Value>(Err(err));
            return std::process::ExitCode::from(exit_code_to_u8(code));
        }
    };

    let exit_code = if cli.list {
        output::print_result(commands::tasks::run(&ctx))
    } else if cli.dry_run {
        output::print_result(commands::plan::run(&ctx, cli.task.as_deref()))
    } else {
        output::print_result(commands::run::run(&ctx, cli.task.as_deref()))
    };

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
