//! cahier - specification folder tooling

mod deps_cli;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "cahier")]
#[command(about = "Specification folder tooling", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Module dependency graph
    #[command(subcommand)]
    Deps(deps_cli::DepsCommands),
}

fn main() -> anyhow::Result<()> {
    depgraph::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Deps(cmd) => deps_cli::run(cmd)?,
    }

    Ok(())
}
