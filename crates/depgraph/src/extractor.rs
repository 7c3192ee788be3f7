use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;

use crate::types::{DepgraphError, Result};

/// 引用提取器
///
/// 每个模式独立匹配整段文本，第一个捕获组即被引用的模块名。
pub struct ReferenceExtractor {
    patterns: Vec<Regex>,
}

impl ReferenceExtractor {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| Self::compile(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    fn compile(pattern: &str) -> Result<Regex> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| DepgraphError::Pattern {
                pattern: pattern.to_string(),
                source,
            })?;

        // 捕获组 0 是整体匹配
        if regex.captures_len() < 2 {
            return Err(DepgraphError::MissingCapture(pattern.to_string()));
        }
        Ok(regex)
    }

    /// 提取文本中引用的全部模块名
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        self.patterns
            .iter()
            .flat_map(|re| re.captures_iter(text))
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}
