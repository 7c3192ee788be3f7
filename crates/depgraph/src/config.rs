//! 依赖扫描配置

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::{DepgraphError, Result};

/// 默认的引用模式，第一个捕获组为模块名
const DEFAULT_PATTERNS: [&str; 4] = [
    r"d[ée]pend(?:s|ent|ant)?\s+(?:de\s+l'\s*|d'\s*|(?:du|des|de\s+la|de)\s+)(?:(?:module|composant|service|agent)\s+)?`?([\w-]+)`?",
    r"interd[ée]pendances?\s+avec\s+(?:le\s+|la\s+|les\s+|l')?(?:(?:module|composant|service|agent)\s+)?`?([\w-]+)`?",
    r"impacte\w*\s+(?:le\s+|la\s+|les\s+|l')?(?:(?:module|composant|service|agent)\s+)?`?([\w-]+)`?",
    r"connexions?\s+avec\s+(?:le\s+|la\s+|les\s+|l')?(?:(?:module|composant|service|agent)\s+)?`?([\w-]+)`?",
];

/// 扫描配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepgraphConfig {
    /// 文档扩展名 (不含点)
    pub extension: String,
    /// 文件名关键字，不区分大小写
    pub keywords: Vec<String>,
    /// 引用模式 (按顺序全部执行)
    pub reference_patterns: Vec<String>,
    /// 标题前缀，如 `# Module billing`
    pub heading_labels: Vec<String>,
    /// 目标文档，相对于扫描目录
    pub target_file: String,
    /// JSON 数据文件，相对于扫描目录
    pub data_file: String,
    pub diagram_marker: String,
    pub details_marker: String,
    /// 新建目标文档时使用的标题
    pub boilerplate_title: String,
}

impl Default for DepgraphConfig {
    fn default() -> Self {
        Self {
            extension: "md".to_string(),
            keywords: ["module", "component", "service", "agent"]
                .map(String::from)
                .to_vec(),
            reference_patterns: DEFAULT_PATTERNS.map(String::from).to_vec(),
            heading_labels: ["Module", "Component", "Service"]
                .map(String::from)
                .to_vec(),
            target_file: "interdependances.md".to_string(),
            data_file: "module-dependencies.json".to_string(),
            diagram_marker: "## Graphe des dépendances".to_string(),
            details_marker: "## Détail des dépendances détectées".to_string(),
            boilerplate_title: "Interdépendances des modules".to_string(),
        }
    }
}

impl DepgraphConfig {
    /// 从 TOML 文件加载，缺省字段使用默认值
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DepgraphError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| DepgraphError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.check().map_err(|message| DepgraphError::Config {
            path: path.to_path_buf(),
            message,
        })?;
        Ok(config)
    }

    /// 校验段落标记：不能为空，也不能相同
    pub fn validate(&self) -> Result<()> {
        self.check().map_err(DepgraphError::InvalidConfig)
    }

    fn check(&self) -> std::result::Result<(), String> {
        if self.diagram_marker.trim().is_empty() {
            return Err("diagram_marker must not be empty".to_string());
        }
        if self.details_marker.trim().is_empty() {
            return Err("details_marker must not be empty".to_string());
        }
        if self.diagram_marker.trim() == self.details_marker.trim() {
            return Err("diagram_marker and details_marker must differ".to_string());
        }
        Ok(())
    }

    /// 文件名是否命中关键字和扩展名
    pub fn is_candidate(&self, file_name: &str) -> bool {
        let path = Path::new(file_name);
        let ext_ok = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.extension));
        if !ext_ok {
            return false;
        }

        let lower = file_name.to_lowercase();
        self.keywords
            .iter()
            .any(|k| lower.contains(&k.to_lowercase()))
    }
}
