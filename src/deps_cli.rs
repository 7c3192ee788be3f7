//! deps subcommand - module dependency graph

use clap::Subcommand;
use depgraph::{DependencyAnalyzer, DepgraphConfig, MermaidGenerator, SectionAction, UpdateOptions};
use std::path::{Path, PathBuf};

const DEFAULT_DIR: &str = "cahier-des-charges";

#[derive(Subcommand)]
pub enum DepsCommands {
    /// Update the dependency sections and the JSON data file
    Update {
        /// Specification directory
        #[arg(short, long, default_value = DEFAULT_DIR)]
        dir: PathBuf,
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Target document (default: <dir>/interdependances.md)
        #[arg(short, long)]
        target: Option<PathBuf>,
        /// Print the patched document instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Generate the Mermaid diagram only
    Diagram {
        /// Specification directory
        #[arg(short, long, default_value = DEFAULT_DIR)]
        dir: PathBuf,
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Flowchart direction
        #[arg(long, default_value = "TD", value_parser = ["TD", "TB", "BT", "LR", "RL"])]
        direction: String,
    },
    /// List detected dependencies
    Scan {
        /// Specification directory
        #[arg(short, long, default_value = DEFAULT_DIR)]
        dir: PathBuf,
        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// JSON output
        #[arg(long)]
        json: bool,
    },
}

pub fn run(cmd: DepsCommands) -> anyhow::Result<()> {
    match cmd {
        DepsCommands::Update { dir, config, target, dry_run } => {
            cmd_update(&dir, config.as_deref(), target, dry_run)
        }
        DepsCommands::Diagram {
            dir,
            config,
            output,
            direction,
        } => cmd_diagram(&dir, config.as_deref(), output.as_deref(), &direction),
        DepsCommands::Scan { dir, config, json } => cmd_scan(&dir, config.as_deref(), json),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DepgraphConfig> {
    match path {
        Some(p) => Ok(DepgraphConfig::load(p)?),
        None => Ok(DepgraphConfig::default()),
    }
}

fn cmd_update(dir: &Path, config: Option<&Path>, target: Option<PathBuf>, dry_run: bool) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let options = UpdateOptions { target, dry_run };

    let summary = depgraph::update(&config, dir, &options)?;

    if summary.is_empty() && summary.patch.is_none() {
        println!("No dependency detected in {}", dir.display());
        return Ok(());
    }

    if let Some(preview) = &summary.preview {
        println!("{}", preview);
        return Ok(());
    }

    println!(
        "{} module(s), {} dependency edge(s)",
        summary.graph.len(),
        summary.graph.edge_count()
    );

    if let Some(outcome) = &summary.patch {
        let action = |a: SectionAction| match a {
            SectionAction::Replaced => "replaced",
            SectionAction::Appended => "appended",
        };
        if outcome.changed {
            println!(
                "Updated: {} (diagram {}, details {})",
                summary.target.display(),
                action(outcome.diagram),
                action(outcome.details)
            );
        } else {
            println!("Up to date: {}", summary.target.display());
        }
    }
    if let Some(data_file) = &summary.data_file {
        println!("Data: {}", data_file.display());
    }

    Ok(())
}

fn cmd_diagram(dir: &Path, config: Option<&Path>, output: Option<&Path>, direction: &str) -> anyhow::Result<()> {
    let analyzer = DependencyAnalyzer::new(load_config(config)?)?;
    let graph = analyzer.build_graph(dir)?;

    let mermaid = MermaidGenerator::new().with_direction(direction).render(&graph);

    match output {
        Some(file) => {
            std::fs::write(file, format!("{}\n", mermaid))?;
            println!("Saved to: {}", file.display());
        }
        None => {
            println!("{}", mermaid);
        }
    }

    Ok(())
}

fn cmd_scan(dir: &Path, config: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let analyzer = DependencyAnalyzer::new(load_config(config)?)?;
    let graph = analyzer.build_graph(dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&graph)?);
        return Ok(());
    }

    println!("\nFound {} module(s) with dependencies:\n", graph.len());
    for record in &graph {
        println!("  {} ({})", record.module, record.source_file);
        for dep in &record.dependencies {
            println!("    -> {}", dep);
        }
        println!();
    }

    let dangling = graph.dangling_references();
    if !dangling.is_empty() {
        let names: Vec<_> = dangling.into_iter().collect();
        println!("Not scanned: {}", names.join(", "));
    }

    Ok(())
}
