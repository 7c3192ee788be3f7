//! depgraph CLI - 更新模块依赖图

use clap::Parser;
use depgraph::{DepgraphConfig, UpdateOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "depgraph")]
#[command(about = "模块依赖图生成工具", version)]
struct Cli {
    /// 规格文档目录
    #[arg(short, long, default_value = "cahier-des-charges")]
    dir: PathBuf,
    /// TOML 配置文件
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    depgraph::init_tracing();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DepgraphConfig::load(path)?,
        None => DepgraphConfig::default(),
    };

    let summary = depgraph::update(&config, &cli.dir, &UpdateOptions::default())?;

    if summary.is_empty() {
        println!("未检测到依赖");
    } else {
        println!(
            "{} 个模块, {} 条依赖 -> {}",
            summary.graph.len(),
            summary.graph.edge_count(),
            summary.target.display()
        );
    }

    Ok(())
}
