//! 目标文档的分段更新
//!
//! 每个生成段落由一行标记开头，结束位置由 [`Boundary`] 决定。
//! 标记存在时替换该段，不存在时追加到文末；段外内容逐字节保留。

use std::ops::Range;
use std::path::Path;
use tracing::debug;

use crate::config::DepgraphConfig;
use crate::details::format_details;
use crate::export::write_atomic;
use crate::types::{DependencyGraph, DepgraphError, Result};

/// 段落结束位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// 标记后第一个代码块的闭合围栏
    ClosingFence,
    /// 下一个同级或更高级标题
    NextHeading,
}

/// 生成段落
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub marker: String,
    pub boundary: Boundary,
}

impl Section {
    pub fn new(marker: impl Into<String>, boundary: Boundary) -> Self {
        Self {
            marker: marker.into(),
            boundary,
        }
    }

    /// 标记 + 空行 + 内容 (不含结尾换行)
    fn render(&self, content: &str) -> String {
        format!("{}\n\n{}", self.marker, content)
    }

    /// 定位段落在文本中的字节范围
    pub fn locate(&self, text: &str) -> Option<Range<usize>> {
        let start = self.find_marker(text)?;
        let after = start + self.marker.len();
        let level = heading_level(&self.marker).unwrap_or(6);

        let end = match self.boundary {
            Boundary::ClosingFence => closing_fence_end(text, after, level),
            Boundary::NextHeading => next_heading_start(text, after, level),
        }
        .unwrap_or(text.len());

        Some(start..end)
    }

    /// 标记必须位于行首且独占一行
    fn find_marker(&self, text: &str) -> Option<usize> {
        if self.marker.is_empty() {
            return None;
        }

        text.match_indices(self.marker.as_str())
            .map(|(idx, _)| idx)
            .find(|&idx| {
                let at_line_start = idx == 0 || text[..idx].ends_with('\n');
                let rest = &text[idx + self.marker.len()..];
                let line_rest = rest.split('\n').next().unwrap_or("");
                at_line_start && line_rest.trim().is_empty()
            })
    }
}

/// 段落处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionAction {
    Replaced,
    Appended,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    /// 目标文档原本不存在
    pub created: bool,
    pub diagram: SectionAction,
    pub details: SectionAction,
    /// 内容是否发生变化
    pub changed: bool,
}

/// 分段更新器
pub struct SectionPatcher {
    diagram: Section,
    details: Section,
    title: String,
}

impl SectionPatcher {
    pub fn new(config: &DepgraphConfig) -> Self {
        Self {
            diagram: Section::new(config.diagram_marker.clone(), Boundary::ClosingFence),
            details: Section::new(config.details_marker.clone(), Boundary::NextHeading),
            title: config.boilerplate_title.clone(),
        }
    }

    /// 新建目标文档时的默认内容
    pub fn boilerplate(&self) -> String {
        format!(
            "# {}\n\nCe document est mis à jour automatiquement à partir du cahier des charges.\n\
             Les sections générées sont remplacées à chaque exécution ; le reste du texte est conservé.\n",
            self.title
        )
    }

    /// 在内存中完成两段更新
    ///
    /// `existing` 为 `None` 表示目标文档不存在。
    pub fn render_patched(
        &self,
        existing: Option<&str>,
        diagram_block: &str,
        details: &str,
    ) -> (String, PatchOutcome) {
        let created = existing.is_none();
        let original = existing.map(str::to_string).unwrap_or_else(|| self.boilerplate());

        let mut text = original.clone();
        let diagram = apply_section(&mut text, &self.diagram, diagram_block);
        let details = apply_section(&mut text, &self.details, details);

        let outcome = PatchOutcome {
            created,
            diagram,
            details,
            changed: created || text != original,
        };
        (text, outcome)
    }

    /// 读取目标文档并计算更新结果，不写文件
    pub fn preview(
        &self,
        target: &Path,
        graph: &DependencyGraph,
        diagram_block: &str,
    ) -> Result<(String, PatchOutcome)> {
        let existing = read_target(target)?;
        Ok(self.render_patched(existing.as_deref(), diagram_block, &format_details(graph)))
    }

    /// 读取目标文档，更新两段后整体写回
    pub fn patch(
        &self,
        target: &Path,
        graph: &DependencyGraph,
        diagram_block: &str,
    ) -> Result<PatchOutcome> {
        let (text, outcome) = self.preview(target, graph, diagram_block)?;

        if outcome.changed {
            write_atomic(target, &text)?;
        } else {
            debug!("{} is up to date", target.display());
        }
        Ok(outcome)
    }
}

fn read_target(target: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(target) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(DepgraphError::Read {
            path: target.to_path_buf(),
            source,
        }),
    }
}

/// 定位 → 替换，或追加
fn apply_section(text: &mut String, section: &Section, content: &str) -> SectionAction {
    let rendered = section.render(content);

    match section.locate(text) {
        Some(range) => {
            let suffix = &text[range.end..];
            let separator = if suffix.is_empty() {
                "\n"
            } else if suffix.starts_with('\n') || suffix.starts_with("\r\n") {
                ""
            } else {
                "\n\n"
            };
            text.replace_range(range, &format!("{}{}", rendered, separator));
            SectionAction::Replaced
        }
        None => {
            if !text.is_empty() {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push('\n');
            }
            text.push_str(&rendered);
            text.push('\n');
            SectionAction::Appended
        }
    }
}

/// `## 标题` -> Some(2)
fn heading_level(line: &str) -> Option<usize> {
    let line = line.trim_end_matches(['\n', '\r']);
    let hashes = line.chars().take_while(|&c| c == '#').count();
    let rest = &line[hashes..];
    if hashes == 0 || hashes > 6 || !(rest.is_empty() || rest.starts_with([' ', '\t'])) {
        return None;
    }
    Some(hashes)
}

fn is_fence(line: &str) -> bool {
    line.trim_start().starts_with("```")
}

/// 从 `from` 所在行的下一行开始，逐行返回 (字节偏移, 行内容含换行)
fn lines_after(text: &str, from: usize) -> impl Iterator<Item = (usize, &str)> {
    let start = text[from..]
        .find('\n')
        .map(|i| from + i + 1)
        .unwrap_or(text.len());

    text[start..]
        .split_inclusive('\n')
        .scan(start, |offset, line| {
            let at = *offset;
            *offset += line.len();
            Some((at, line))
        })
}

/// 闭合围栏行尾 (不含换行)；在遇到开启围栏之前出现标题则停在标题处
fn closing_fence_end(text: &str, from: usize, level: usize) -> Option<usize> {
    let mut opened = false;
    for (at, line) in lines_after(text, from) {
        if opened {
            if is_fence(line) {
                return Some(at + line.trim_end_matches(['\n', '\r']).len());
            }
        } else if is_fence(line) {
            opened = true;
        } else if heading_level(line).is_some_and(|l| l <= level) {
            return Some(at);
        }
    }
    None
}

/// 下一个级别不低于 `level` 的标题行首，忽略代码块内的 `#`
fn next_heading_start(text: &str, from: usize, level: usize) -> Option<usize> {
    let mut in_fence = false;
    for (at, line) in lines_after(text, from) {
        if is_fence(line) {
            in_fence = !in_fence;
        } else if !in_fence && heading_level(line).is_some_and(|l| l <= level) {
            return Some(at);
        }
    }
    None
}
