//! JSON 导出与原子写入

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::types::{DependencyGraph, DepgraphError, Result};

/// 写入 `dir/file_name`，整体覆盖
pub fn write_json(dir: &Path, file_name: &str, graph: &DependencyGraph) -> Result<PathBuf> {
    let path = dir.join(file_name);
    let mut json = serde_json::to_string_pretty(graph)?;
    json.push('\n');
    write_atomic(&path, &json)?;
    Ok(path)
}

/// 先写同目录临时文件再重命名，外部看不到写了一半的文件
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let write_err = |source| DepgraphError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DependencyRecord;
    use tempfile::tempdir;

    #[test]
    fn test_write_json_overwrites() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("deps.json"), "stale content that is longer").unwrap();

        let graph: DependencyGraph = std::iter::once(
            DependencyRecord::new("billing", "agent-billing.md").with_dependency("auth"),
        )
        .collect();

        let path = write_json(dir.path(), "deps.json", &graph).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                { "module": "billing", "dependencies": ["auth"], "file": "agent-billing.md" }
            ])
        );
    }

    #[test]
    fn test_write_json_empty_graph() {
        let dir = tempdir().unwrap();
        let path = write_json(dir.path(), "deps.json", &DependencyGraph::new()).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]\n");
    }

    #[test]
    fn test_write_atomic_missing_dir() {
        let err = write_atomic(Path::new("/nonexistent/dir/out.md"), "x").unwrap_err();
        assert!(matches!(err, DepgraphError::Write { .. }));
    }
}
