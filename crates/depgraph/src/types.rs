use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DepgraphError {
    #[error("Scan directory does not exist: {0}")]
    ScanDirMissing(PathBuf),
    #[error("Cannot list directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Pattern `{0}` has no capture group for the module name")]
    MissingCapture(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DepgraphError>;

/// 依赖记录 - 一个文档对应一条
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// 模块名 (标题或文件名推导)
    pub module: String,
    /// 正文中引用的模块
    pub dependencies: BTreeSet<String>,
    /// 来源文件名
    #[serde(rename = "file")]
    pub source_file: String,
}

impl DependencyRecord {
    pub fn new(module: impl Into<String>, source_file: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            dependencies: BTreeSet::new(),
            source_file: source_file.into(),
        }
    }

    pub fn with_dependency(mut self, dep: impl Into<String>) -> Self {
        self.dependencies.insert(dep.into());
        self
    }
}

/// 依赖图 - 按扫描顺序排列的记录
///
/// 模块名不保证唯一，依赖也可能指向未扫描到的模块。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyGraph {
    records: Vec<DependencyRecord>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DependencyRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[DependencyRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DependencyRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 边数 = 所有依赖集合大小之和
    pub fn edge_count(&self) -> usize {
        self.records.iter().map(|r| r.dependencies.len()).sum()
    }

    /// 按模块名索引，同名时后出现的记录覆盖先出现的
    pub fn module_index(&self) -> HashMap<&str, &DependencyRecord> {
        self.records
            .iter()
            .map(|r| (r.module.as_str(), r))
            .collect()
    }

    /// 悬空引用: 被依赖但自身不是已扫描模块
    pub fn dangling_references(&self) -> BTreeSet<&str> {
        let declared: BTreeSet<&str> = self.records.iter().map(|r| r.module.as_str()).collect();
        self.records
            .iter()
            .flat_map(|r| r.dependencies.iter().map(String::as_str))
            .filter(|dep| !declared.contains(dep))
            .collect()
    }

    /// 被多个文档声明的模块名
    pub fn duplicate_modules(&self) -> BTreeSet<&str> {
        let mut seen = BTreeSet::new();
        self.records
            .iter()
            .map(|r| r.module.as_str())
            .filter(|m| !seen.insert(*m))
            .collect()
    }
}

impl<'a> IntoIterator for &'a DependencyGraph {
    type Item = &'a DependencyRecord;
    type IntoIter = std::slice::Iter<'a, DependencyRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<DependencyRecord> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = DependencyRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
