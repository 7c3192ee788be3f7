//! depgraph - 规格文档模块依赖图
//!
//! 从 Markdown 正文提取模块引用，生成 Mermaid 图并回写到文档

mod analyzer;
mod config;
mod details;
mod export;
mod extractor;
mod identifier;
mod mermaid;
mod patcher;
mod pipeline;
mod types;

pub use analyzer::DependencyAnalyzer;
pub use config::DepgraphConfig;
pub use details::format_details;
pub use export::write_json;
pub use extractor::ReferenceExtractor;
pub use identifier::ModuleIdentifier;
pub use mermaid::MermaidGenerator;
pub use patcher::{Boundary, PatchOutcome, Section, SectionAction, SectionPatcher};
pub use pipeline::{update, UpdateOptions, UpdateSummary};
pub use types::{DependencyGraph, DependencyRecord, DepgraphError, Result};

/// 初始化日志，默认级别 info，可用 `RUST_LOG` 覆盖
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
