//! toitnups CLI entrypoint.
//!
//! This binary registers .NET integrations for a Unity project, builds them,
//! copies their assemblies into `Assets`, and keeps `link.xml` up to date.

use clap::Parser;
use std::io::Write;
use toitnups_pusher::cli::{Cli, Command};
use toitnups_pusher::commands::{run_add, run_init, run_list, run_push, run_remove};
use toitnups_pusher::error::Result;
use toitnups_pusher::executor::SystemCommandExecutor;
use toitnups_pusher::output::write_stderr_line;
use toitnups_pusher::project::ProjectLayout;

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    let layout = ProjectLayout::resolve(cli.project.as_deref())?;
    let executor = SystemCommandExecutor;

    match &cli.command {
        Command::Init => run_init(&layout, cli.quiet, stderr),
        Command::Add(args) => run_add(&layout, &executor, args, cli.quiet, stderr),
        Command::Remove(args) => run_remove(&layout, args, cli.quiet, stderr),
        Command::Push(args) => run_push(&layout, &executor, args, cli.quiet, stderr),
        Command::List => run_list(&layout, cli.quiet, stdout, stderr),
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}
