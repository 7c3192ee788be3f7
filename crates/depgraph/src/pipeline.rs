//! 完整流程: 扫描 → 渲染 → 更新文档 → 导出 JSON

use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::analyzer::DependencyAnalyzer;
use crate::config::DepgraphConfig;
use crate::export::write_json;
use crate::mermaid::MermaidGenerator;
use crate::patcher::{PatchOutcome, SectionPatcher};
use crate::types::{DependencyGraph, DepgraphError, Result};

#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// 覆盖配置中的目标文档路径
    pub target: Option<PathBuf>,
    /// 只计算结果，不写文件
    pub dry_run: bool,
}

#[derive(Debug, Clone)]
pub struct UpdateSummary {
    pub graph: DependencyGraph,
    pub target: PathBuf,
    /// 图为空且目标不存在时为 None
    pub patch: Option<PatchOutcome>,
    pub data_file: Option<PathBuf>,
    /// dry-run 时的文档预览
    pub preview: Option<String>,
}

impl UpdateSummary {
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

/// 扫描目录并更新目标文档与 JSON 数据文件
pub fn update(config: &DepgraphConfig, dir: &Path, options: &UpdateOptions) -> Result<UpdateSummary> {
    if !dir.is_dir() {
        return Err(DepgraphError::ScanDirMissing(dir.to_path_buf()));
    }
    config.validate()?;

    let target = options
        .target
        .clone()
        .unwrap_or_else(|| dir.join(&config.target_file));

    info!("Scanning {}", dir.display());
    let analyzer = DependencyAnalyzer::new(config.clone())?.with_target(target.clone());
    let graph = analyzer.build_graph(dir)?;
    info!(
        "{} module(s) with dependencies, {} edge(s)",
        graph.len(),
        graph.edge_count()
    );

    for module in graph.duplicate_modules() {
        info!("Module `{}` is declared by several documents", module);
    }
    let dangling = graph.dangling_references();
    if !dangling.is_empty() {
        debug!(
            "References to unscanned modules: {}",
            dangling.into_iter().collect::<Vec<_>>().join(", ")
        );
    }

    let mut summary = UpdateSummary {
        graph,
        target,
        patch: None,
        data_file: None,
        preview: None,
    };

    // 图为空且目标文档不存在时无事可做；目标已存在则照常重写，清除旧的依赖
    if summary.graph.is_empty() && !summary.target.exists() {
        info!("No dependency detected, nothing to do");
        return Ok(summary);
    }

    let diagram = MermaidGenerator::new().render(&summary.graph);
    let patcher = SectionPatcher::new(config);

    if options.dry_run {
        let (text, outcome) = patcher.preview(&summary.target, &summary.graph, &diagram)?;
        summary.patch = Some(outcome);
        summary.preview = Some(text);
        return Ok(summary);
    }

    let outcome = patcher.patch(&summary.target, &summary.graph, &diagram)?;
    if outcome.changed {
        info!("Updated {}", summary.target.display());
    }
    summary.patch = Some(outcome);

    let data_file = write_json(dir, &config.data_file, &summary.graph)?;
    info!("Wrote {}", data_file.display());
    summary.data_file = Some(data_file);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_update_empty_dir_is_noop() {
        let dir = tempdir().unwrap();
        let summary = update(&DepgraphConfig::default(), dir.path(), &UpdateOptions::default()).unwrap();
        assert!(summary.is_empty());
        assert!(summary.patch.is_none());
        assert!(!dir.path().join("interdependances.md").exists());
        assert!(!dir.path().join("module-dependencies.json").exists());
    }

    #[test]
    fn test_update_dry_run_writes_nothing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("module-a.md"), "Dépend du module `b`.").unwrap();

        let options = UpdateOptions {
            dry_run: true,
            ..Default::default()
        };
        let summary = update(&DepgraphConfig::default(), dir.path(), &options).unwrap();
        assert!(summary.preview.unwrap().contains("    a --> b"));
        assert!(!dir.path().join("interdependances.md").exists());
        assert!(summary.data_file.is_none());
    }

    #[test]
    fn test_update_custom_target_not_scanned() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("module-a.md"), "Dépend du module `b`.").unwrap();
        let target = dir.path().join("module-graph.md");

        let options = UpdateOptions {
            target: Some(target.clone()),
            dry_run: false,
        };
        update(&DepgraphConfig::default(), dir.path(), &options).unwrap();
        let summary = update(&DepgraphConfig::default(), dir.path(), &options).unwrap();

        assert_eq!(summary.graph.len(), 1);
        assert!(!summary.patch.unwrap().changed);
        assert!(target.exists());
    }

    #[test]
    fn test_update_target_outside_dir_keeps_same_named_source() {
        let dir = tempdir().unwrap();
        let elsewhere = tempdir().unwrap();
        fs::write(dir.path().join("agent-billing.md"), "Dépend du module `auth`.").unwrap();

        let options = UpdateOptions {
            target: Some(elsewhere.path().join("agent-billing.md")),
            dry_run: true,
        };
        let summary = update(&DepgraphConfig::default(), dir.path(), &options).unwrap();
        assert_eq!(summary.graph.len(), 1);
    }

    #[test]
    fn test_update_dry_run_reports_unreadable_target() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("module-a.md"), "Dépend du module `b`.").unwrap();
        fs::create_dir(dir.path().join("interdependances.md")).unwrap();

        let options = UpdateOptions {
            dry_run: true,
            ..Default::default()
        };
        let err = update(&DepgraphConfig::default(), dir.path(), &options).unwrap_err();
        assert!(matches!(err, DepgraphError::Read { .. }));
    }

    #[test]
    fn test_update_clears_stale_sections_when_graph_empties() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("module-a.md");
        fs::write(&source, "Dépend du module `b`.").unwrap();
        update(&DepgraphConfig::default(), dir.path(), &UpdateOptions::default()).unwrap();

        fs::write(&source, "Plus aucune référence.").unwrap();
        let summary = update(&DepgraphConfig::default(), dir.path(), &UpdateOptions::default()).unwrap();

        assert!(summary.is_empty());
        let outcome = summary.patch.unwrap();
        assert!(outcome.changed);
        assert_eq!(outcome.diagram, crate::patcher::SectionAction::Replaced);

        let text = fs::read_to_string(dir.path().join("interdependances.md")).unwrap();
        assert!(!text.contains("a --> b"));
        assert!(text.contains("_Aucune dépendance détectée._"));
        assert_eq!(
            fs::read_to_string(dir.path().join("module-dependencies.json")).unwrap(),
            "[]\n"
        );
    }

    #[test]
    fn test_update_rejects_empty_marker() {
        let dir = tempdir().unwrap();
        let config = DepgraphConfig {
            diagram_marker: String::new(),
            ..Default::default()
        };
        let err = update(&config, dir.path(), &UpdateOptions::default()).unwrap_err();
        assert!(matches!(err, DepgraphError::InvalidConfig(_)));
    }

    #[test]
    fn test_update_missing_dir() {
        let err = update(
            &DepgraphConfig::default(),
            Path::new("/nonexistent/cahier-des-charges"),
            &UpdateOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DepgraphError::ScanDirMissing(_)));
    }
}
