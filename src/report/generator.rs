//! Report generation

use crate::models::{ConversionResult, DependencyAction};
use crate::transformer::to_target_path;
use anyhow::Result;

pub fn generate_markdown_report(result: &ConversionResult) -> Result<String> {
    let mut report = String::new();

    report.push_str("# Next.js to Vite Conversion Report\n\n");

    // Summary
    report.push_str("## Summary\n\n");
    report.push_str(&format!(
        "- **Conversion Status**: {}\n",
        if result.success { "✅ Success" } else { "❌ Failed" }
    ));
    report.push_str(&format!("- **Total Files**: {}\n", result.stats.total_files));
    report.push_str(&format!(
        "- **Files Modified**: {} ({:.1}%)\n",
        result.stats.modified_files,
        result.stats.transformation_rate * 100.0
    ));
    report.push_str(&format!("- **Files Added**: {}\n", result.new_files.len()));
    report.push_str(&format!("- **Routes**: {}\n", result.stats.route_changes));
    report.push_str(&format!("- **Dependency Changes**: {}\n\n", result.stats.dependency_changes));

    if !result.routes.is_empty() {
        report.push_str("## Routes\n\n");
        report.push_str("| Next.js path | React Router path | File | Layout |\n");
        report.push_str("|---|---|---|---|\n");
        for route in &result.routes {
            report.push_str(&format!(
                "| `{}` | `{}` | `{}` | {} |\n",
                route.path,
                to_target_path(&route.path),
                route.file,
                route.layout.as_deref().map_or("-".to_string(), |l| format!("`{}`", l))
            ));
        }
        report.push('\n');
    }

    if !result.dependencies.is_empty() {
        report.push_str("## Dependencies\n\n");
        for change in &result.dependencies {
            let line = match change.action {
                DependencyAction::Add => format!(
                    "- Add `{}` {}{}",
                    change.name,
                    change.to_version.as_deref().unwrap_or_default(),
                    if change.dev { " (dev)" } else { "" }
                ),
                DependencyAction::Remove => format!("- Remove `{}`", change.name),
                DependencyAction::Update => format!(
                    "- Update `{}` {} → {}",
                    change.name,
                    change.from_version.as_deref().unwrap_or("?"),
                    change.to_version.as_deref().unwrap_or("?")
                ),
            };
            report.push_str(&line);
            report.push('\n');
        }
        report.push('\n');
    }

    if !result.transformed_files.is_empty() {
        report.push_str("## Transformed Files\n\n");
        for file in &result.transformed_files {
            report.push_str(&format!("- `{}`\n", file));
        }
        report.push('\n');
    }

    if !result.new_files.is_empty() {
        report.push_str("## Generated Files\n\n");
        for file in &result.new_files {
            report.push_str(&format!("- `{}`: {}\n", file.path, file.purpose));
        }
        report.push('\n');
    }

    if !result.errors.is_empty() {
        report.push_str("## ⛔ Errors\n\n");
        for error in &result.errors {
            report.push_str(&format!("- {}\n", error));
        }
        report.push('\n');
    }

    if !result.warnings.is_empty() {
        report.push_str("## ⚠️ Warnings\n\n");
        for warning in &result.warnings {
            report.push_str(&format!("- {}\n", warning));
        }
        report.push('\n');
    }

    // Next Steps
    report.push_str("## Next Steps\n\n");
    report.push_str("1. Run the installation commands and `npm install`\n");
    report.push_str("2. Add an `index.html` and a `src/main` entry that renders `<RouterProvider router={router} />`\n");
    report.push_str("3. Move data fetching out of the flagged `getStaticProps`/`getServerSideProps` functions\n");
    report.push_str("4. Address the warnings listed above\n\n");

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::extract_routes;
    use crate::models::DependencyChange;

    #[test]
    fn test_report_sections() {
        let mut result = ConversionResult::new(2);
        result.success = true;
        result.routes = extract_routes(&["pages/_layout.tsx", "pages/blog/[slug].tsx"]);
        result.dependencies.push(DependencyChange {
            name: "next".to_string(),
            action: DependencyAction::Remove,
            from_version: Some("14.0.0".to_string()),
            to_version: None,
            dev: false,
        });
        result.warnings.push("pages/a.tsx: check this".to_string());

        let report = generate_markdown_report(&result).unwrap();
        assert!(report.contains("✅ Success"));
        assert!(report.contains("| `/blog/[slug]` | `/blog/:slug` | `pages/blog/[slug].tsx` | `pages/_layout.tsx` |"));
        assert!(report.contains("- Remove `next`"));
        assert!(report.contains("## ⚠️ Warnings\n\n- pages/a.tsx: check this"));
        assert!(!report.contains("## ⛔ Errors"));
    }
}
