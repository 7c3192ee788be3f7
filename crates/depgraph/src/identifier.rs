use regex::Regex;
use std::path::Path;

use crate::types::{DepgraphError, Result};

/// 模块识别器 - 标题优先，其次文件名
pub struct ModuleIdentifier {
    heading: Regex,
}

impl ModuleIdentifier {
    pub fn new<S: AsRef<str>>(labels: &[S]) -> Result<Self> {
        let labels: Vec<String> = labels
            .iter()
            .map(|l| regex::escape(l.as_ref()))
            .filter(|l| !l.is_empty())
            .collect();

        let pattern = if labels.is_empty() {
            r"(?m)^#[ \t]+(.+)$".to_string()
        } else {
            format!(
                r"(?m)^#[ \t]+(?:(?:{})\b[ \t]*:?[ \t]*)?(.+)$",
                labels.join("|")
            )
        };

        let heading = Regex::new(&pattern).map_err(|source| DepgraphError::Pattern {
            pattern,
            source,
        })?;
        Ok(Self { heading })
    }

    /// 识别文档描述的模块名
    pub fn identify(&self, text: &str, file_name: &str) -> String {
        self.heading
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Self::name_from_file(file_name))
    }

    /// 文件名推导: 去扩展名，按 `-` 分割取最后一段
    #[doc(hidden)]
    pub fn name_from_file(file_name: &str) -> String {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);

        stem.rsplit('-')
            .find(|segment| !segment.is_empty())
            .unwrap_or(stem)
            .to_string()
    }
}
