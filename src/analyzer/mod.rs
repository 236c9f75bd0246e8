//! Read-only analysis of a Next.js project

pub mod api;
pub mod component;
pub mod dependencies;
pub mod routes;

pub use api::{analyze_api_routes, ApiRoute, ApiRouteReport};
pub use component::{extract_props, ComponentAnalyzer};
pub use dependencies::{analyze_dependencies, rewrite_manifest, DependencyReport};
pub use routes::extract_routes;

use anyhow::Result;

use crate::models::{AnalyzedComponent, ComponentType, ComponentUsage, Project};
use crate::transformer::{RuleEngine, RuleStats};
use crate::utils::{is_markup_file, should_skip};

/// What the pipeline would do to one file, without doing it
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub path: String,
    pub component: Option<AnalyzedComponent>,
    /// Legacy components the file uses
    pub usages: Vec<(ComponentType, ComponentUsage)>,
    pub rule_stats: RuleStats,
}

/// Analyze every source file of a project. Fails only on unreadable files.
pub async fn analyze_project(project: &Project, engine: &RuleEngine) -> Result<Vec<FileAnalysis>> {
    let mut analyses = Vec::new();

    for file in project.files.iter().filter(|f| !should_skip(&f.path)) {
        let code = file.read().await?;

        let usages = if is_markup_file(&file.path) {
            ComponentType::ALL
                .iter()
                .map(|c| (*c, ComponentAnalyzer::analyze_component_usage(&code, *c)))
                .filter(|(_, usage)| usage.used)
                .collect()
        } else {
            Vec::new()
        };

        analyses.push(FileAnalysis {
            path: file.path.clone(),
            component: ComponentAnalyzer::analyze(&code),
            usages,
            rule_stats: engine.stats(&code),
        });
    }

    Ok(analyses)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_analyze_project() {
        let project = Project::from_sources([
            (
                "pages/index.tsx",
                "import Link from 'next/link';\nexport default function Home() { return <Link href=\"/\">x</Link>; }\n",
            ),
            ("lib/env.ts", "export const a = process.env.NEXT_PUBLIC_A;\n"),
            ("public/logo.svg", "<svg/>"),
        ]);
        let analyses = analyze_project(&project, &RuleEngine::next_to_vite()).await.unwrap();

        assert_eq!(analyses.len(), 2);
        assert_eq!(analyses[0].component.as_ref().map(|c| c.name.as_str()), Some("Home"));
        assert_eq!(analyses[0].usages.len(), 1);
        assert_eq!(analyses[0].usages[0].0, ComponentType::Link);
        assert!(analyses[0].usages.iter().all(|(_, u)| u.count == 1));
        assert!(analyses[1].component.is_none());
        assert_eq!(analyses[1].rule_stats.applied_rules, 1);
    }
}
