use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::DepgraphConfig;
use crate::extractor::ReferenceExtractor;
use crate::identifier::ModuleIdentifier;
use crate::types::{DependencyGraph, DependencyRecord, DepgraphError, Result};

/// 依赖分析器
pub struct DependencyAnalyzer {
    extractor: ReferenceExtractor,
    identifier: ModuleIdentifier,
    config: DepgraphConfig,
    /// 不参与扫描的目标文档，缺省为 `dir/target_file`
    target: Option<PathBuf>,
}

impl DependencyAnalyzer {
    pub fn new(config: DepgraphConfig) -> Result<Self> {
        Ok(Self {
            extractor: ReferenceExtractor::new(&config.reference_patterns)?,
            identifier: ModuleIdentifier::new(&config.heading_labels)?,
            config,
            target: None,
        })
    }

    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn config(&self) -> &DepgraphConfig {
        &self.config
    }

    /// 分析单个文档，返回其依赖记录 (依赖可能为空)
    pub fn analyze_document(&self, text: &str, file_name: &str) -> DependencyRecord {
        DependencyRecord {
            module: self.identifier.identify(text, file_name),
            dependencies: self.extractor.extract(text),
            source_file: file_name.to_string(),
        }
    }

    /// 构建依赖图
    ///
    /// 只扫描目录第一层。单个文档读取失败时记录警告并跳过。
    pub fn build_graph(&self, dir: &Path) -> Result<DependencyGraph> {
        if !dir.is_dir() {
            return Err(DepgraphError::ScanDirMissing(dir.to_path_buf()));
        }

        let mut graph = DependencyGraph::new();

        for (path, file_name) in self.candidate_files(dir)? {
            let text = match std::fs::read_to_string(&path) {
                Ok(t) => t,
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            let record = self.analyze_document(&text, &file_name);
            debug!(
                "{} -> module `{}`, {} reference(s)",
                file_name,
                record.module,
                record.dependencies.len()
            );

            if !record.dependencies.is_empty() {
                graph.push(record);
            }
        }

        Ok(graph)
    }

    /// 候选文档，按文件名排序
    fn candidate_files(&self, dir: &Path) -> Result<Vec<(PathBuf, String)>> {
        let read_err = |source| DepgraphError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let target = self
            .target
            .clone()
            .unwrap_or_else(|| dir.join(&self.config.target_file));
        let target = normalize_path(&target);

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_err)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            // 非 UTF-8 文件名无法匹配关键字
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };

            if !self.config.is_candidate(&file_name) || normalize_path(&path) == target {
                continue;
            }

            files.push((path, file_name));
        }

        files.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(files)
    }
}

/// 规范化路径；目标文档可能尚不存在，此时规范化其父目录
fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(p) = path.canonicalize() {
        return p;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            parent
                .canonicalize()
                .map(|p| p.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn analyzer() -> DependencyAnalyzer {
        DependencyAnalyzer::new(DepgraphConfig::default()).unwrap()
    }

    #[test]
    fn test_analyze_document_example() {
        let record = analyzer().analyze_document(
            "# Module billing\n\nCe module dépend du module `auth`.\n",
            "agent-billing.md",
        );
        assert_eq!(
            record,
            DependencyRecord::new("billing", "agent-billing.md").with_dependency("auth")
        );
    }

    #[test]
    fn test_build_graph_filters_empty_records() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("agent-billing.md"),
            "# Module billing\n\nCe module dépend du module `auth`.\n",
        )
        .unwrap();
        fs::write(dir.path().join("service-auth.md"), "# Module auth\n\nAucune référence.\n").unwrap();

        let graph = analyzer().build_graph(dir.path()).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.records()[0].module, "billing");
    }

    #[test]
    fn test_build_graph_skips_non_candidates() {
        let dir = tempdir().unwrap();
        let text = "Dépend du module `auth`.";
        fs::write(dir.path().join("introduction.md"), text).unwrap();
        fs::write(dir.path().join("module-notes.txt"), text).unwrap();
        fs::write(dir.path().join("interdependances.md"), text).unwrap();
        fs::create_dir(dir.path().join("module-sub.md")).unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("module-deep.md"), text).unwrap();

        let graph = analyzer().build_graph(dir.path()).unwrap();
        assert!(graph.is_empty());
    }

    #[test]
    fn test_build_graph_excludes_target_in_dir() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("module-a.md"), "Dépend de b.").unwrap();
        fs::write(dir.path().join("module-graph.md"), "Dépend de c.").unwrap();

        let graph = analyzer()
            .with_target(dir.path().join("module-graph.md"))
            .build_graph(dir.path())
            .unwrap();
        let modules: Vec<_> = graph.iter().map(|r| r.module.as_str()).collect();
        assert_eq!(modules, vec!["a"]);
    }

    #[test]
    fn test_build_graph_target_outside_dir_keeps_same_named_source() {
        let dir = tempdir().unwrap();
        let elsewhere = tempdir().unwrap();
        fs::write(dir.path().join("agent-billing.md"), "Dépend du module `auth`.").unwrap();

        let graph = analyzer()
            .with_target(elsewhere.path().join("agent-billing.md"))
            .build_graph(dir.path())
            .unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.records()[0].module, "billing");
    }

    #[test]
    fn test_build_graph_order_by_file_name() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("module-c.md"), "Dépend de x.").unwrap();
        fs::write(dir.path().join("module-a.md"), "Dépend de y.").unwrap();
        fs::write(dir.path().join("module-b.md"), "Dépend de z.").unwrap();

        let graph = analyzer().build_graph(dir.path()).unwrap();
        let modules: Vec<_> = graph.iter().map(|r| r.module.as_str()).collect();
        assert_eq!(modules, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_build_graph_skips_unreadable_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("module-bad.md"), [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        fs::write(dir.path().join("module-good.md"), "Impacte le module `auth`.").unwrap();

        let graph = analyzer().build_graph(dir.path()).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.records()[0].module, "good");
    }

    #[test]
    fn test_build_graph_missing_dir() {
        let err = analyzer()
            .build_graph(Path::new("/nonexistent/cahier-des-charges"))
            .unwrap_err();
        assert!(matches!(err, DepgraphError::ScanDirMissing(_)));
    }
}
