use crate::types::DependencyGraph;

/// Mermaid 图生成器
pub struct MermaidGenerator {
    direction: String,
}

impl MermaidGenerator {
    pub fn new() -> Self {
        Self {
            direction: "TD".to_string(),
        }
    }

    pub fn with_direction(mut self, direction: &str) -> Self {
        self.direction = direction.to_string();
        self
    }

    /// 生成模块依赖图 (不含代码围栏)
    ///
    /// 模块名原样作为节点 id 和标签，不做转义或去重。
    pub fn generate_dependency_graph(&self, graph: &DependencyGraph) -> String {
        let mut lines = vec![format!("flowchart {}", self.direction)];

        // 生成节点
        for record in graph {
            lines.push(format!("    {}[{}]", record.module, record.module));
        }

        // 生成边
        for record in graph {
            for dep in &record.dependencies {
                lines.push(format!("    {} --> {}", record.module, dep));
            }
        }

        lines.join("\n")
    }

    /// 生成带 ```mermaid 围栏的代码块
    pub fn render(&self, graph: &DependencyGraph) -> String {
        Self::fenced(&self.generate_dependency_graph(graph))
    }

    #[doc(hidden)]
    pub fn fenced(body: &str) -> String {
        format!("```mermaid\n{}\n```", body)
    }
}

impl Default for MermaidGenerator {
    fn default() -> Self {
        Self::new()
    }
}
