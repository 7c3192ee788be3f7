use crate::types::{DependencyGraph, DependencyRecord};

/// 依赖明细 (Markdown 列表)
pub fn format_details(graph: &DependencyGraph) -> String {
    if graph.is_empty() {
        return "_Aucune dépendance détectée._".to_string();
    }

    graph
        .iter()
        .map(format_record)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_record(record: &DependencyRecord) -> String {
    let deps = if record.dependencies.is_empty() {
        "aucune dépendance détectée".to_string()
    } else {
        record
            .dependencies
            .iter()
            .map(|d| format!("`{}`", d))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!("- **{}** (`{}`) : {}", record.module, record.source_file, deps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_details() {
        let graph: DependencyGraph = [
            DependencyRecord::new("billing", "agent-billing.md")
                .with_dependency("users")
                .with_dependency("auth"),
            DependencyRecord::new("crm", "service-crm.md"),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            format_details(&graph),
            "- **billing** (`agent-billing.md`) : `auth`, `users`\n\
             - **crm** (`service-crm.md`) : aucune dépendance détectée"
        );
    }

    #[test]
    fn test_format_details_empty_graph() {
        assert_eq!(format_details(&DependencyGraph::new()), "_Aucune dépendance détectée._");
    }
}
