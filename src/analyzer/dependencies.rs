//! `package.json` dependency diff for the move off Next.js

use anyhow::{bail, Result};
use serde_json::{Map, Value};
use tracing::debug;

use crate::models::{DependencyAction, DependencyChange, TargetStack};

/// Packages that only make sense inside Next.js
const NEXT_ONLY: &[&str] = &[
    "next",
    "eslint-config-next",
    "@next/font",
    "@next/bundle-analyzer",
    "@next/eslint-plugin-next",
    "@next/mdx",
];

/// Next.js ecosystem packages with no drop-in client-side replacement
const INCOMPATIBLE: &[(&str, &str)] = &[
    ("next-auth", "authentication must move to a separate API or a client SDK"),
    ("next-i18next", "use i18next with react-i18next directly"),
    ("next-seo", "use react-helmet-async for meta tags"),
    ("next-sitemap", "generate the sitemap with a Vite plugin or a build script"),
    ("next-mdx-remote", "use @mdx-js/rollup"),
    ("@vercel/og", "image generation needs a server runtime"),
];

const REACT_VERSION: &str = "^18.2.0";

/// Outcome of the dependency stage
#[derive(Debug, Clone, Default)]
pub struct DependencyReport {
    pub changes: Vec<DependencyChange>,
    /// Compatibility issues, one message per package
    pub issues: Vec<String>,
    pub install_commands: String,
}

impl DependencyReport {
    pub fn compatible(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Packages the target stack needs: (name, version, dev)
fn target_packages(target: TargetStack) -> Vec<(&'static str, &'static str, bool)> {
    let mut packages = vec![
        ("react-router-dom", "^6.22.0", false),
        ("react-helmet-async", "^2.0.4", false),
        ("@unpic/react", "^0.1.14", false),
    ];
    match target {
        TargetStack::ReactVite => {
            packages.push(("vite", "^5.1.0", true));
            packages.push(("@vitejs/plugin-react", "^4.2.1", true));
        }
        TargetStack::ReactCra => packages.push(("react-scripts", "5.0.1", false)),
    }
    packages
}

fn section<'a>(manifest: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    manifest.get(key).and_then(Value::as_object)
}

fn installed_version(manifest: &Value, name: &str) -> Option<(String, bool)> {
    for (key, dev) in [("dependencies", false), ("devDependencies", true)] {
        if let Some(version) = section(manifest, key).and_then(|deps| deps.get(name)) {
            return Some((version.as_str().unwrap_or_default().to_string(), dev));
        }
    }
    None
}

/// Leading major version of a semver range such as `^17.0.2`
fn major_version(range: &str) -> Option<u64> {
    range
        .trim_start_matches(|c: char| !c.is_ascii_digit())
        .split('.')
        .next()
        .and_then(|major| major.parse().ok())
}

/// Diff a project's `package.json` against the target stack.
///
/// A missing manifest is treated as an empty one.
pub fn analyze_dependencies(manifest: Option<&Value>, target: TargetStack) -> Result<DependencyReport> {
    let empty = Value::Object(Map::new());
    let manifest = manifest.unwrap_or(&empty);
    if !manifest.is_object() {
        bail!("package.json is not a JSON object");
    }

    let mut report = DependencyReport::default();

    for (key, dev) in [("dependencies", false), ("devDependencies", true)] {
        let Some(deps) = section(manifest, key) else {
            continue;
        };
        for (name, version) in deps {
            if NEXT_ONLY.contains(&name.as_str()) || name.starts_with("@next/") {
                report.changes.push(DependencyChange {
                    name: name.clone(),
                    action: DependencyAction::Remove,
                    from_version: version.as_str().map(str::to_string),
                    to_version: None,
                    dev,
                });
            } else if let Some((_, hint)) = INCOMPATIBLE.iter().find(|(pkg, _)| pkg == name) {
                report.issues.push(format!("{} is not compatible with a client-only build: {}", name, hint));
            }
        }
    }

    for name in ["react", "react-dom"] {
        if let Some((version, dev)) = installed_version(manifest, name) {
            if major_version(&version).map_or(false, |major| major < 18) {
                report.changes.push(DependencyChange {
                    name: name.to_string(),
                    action: DependencyAction::Update,
                    from_version: Some(version),
                    to_version: Some(REACT_VERSION.to_string()),
                    dev,
                });
            }
        }
    }

    for (name, version, dev) in target_packages(target) {
        if installed_version(manifest, name).is_none() {
            report.changes.push(DependencyChange {
                name: name.to_string(),
                action: DependencyAction::Add,
                from_version: None,
                to_version: Some(version.to_string()),
                dev,
            });
        }
    }

    report.install_commands = install_commands(&report.changes);
    debug!("{} dependency changes, {} issues", report.changes.len(), report.issues.len());
    Ok(report)
}

fn install_commands(changes: &[DependencyChange]) -> String {
    let pick = |action: DependencyAction, dev: bool| -> Vec<String> {
        changes
            .iter()
            .filter(|c| c.action == action && (action == DependencyAction::Remove || c.dev == dev))
            .map(|c| match (&c.to_version, action) {
                (Some(version), DependencyAction::Add | DependencyAction::Update) => format!("{}@{}", c.name, version),
                _ => c.name.clone(),
            })
            .collect()
    };

    let mut lines = Vec::new();
    let removed = pick(DependencyAction::Remove, false);
    if !removed.is_empty() {
        lines.push(format!("npm uninstall {}", removed.join(" ")));
    }
    let mut runtime = pick(DependencyAction::Add, false);
    runtime.extend(pick(DependencyAction::Update, false));
    if !runtime.is_empty() {
        lines.push(format!("npm install {}", runtime.join(" ")));
    }
    let mut dev = pick(DependencyAction::Add, true);
    dev.extend(pick(DependencyAction::Update, true));
    if !dev.is_empty() {
        lines.push(format!("npm install -D {}", dev.join(" ")));
    }
    lines.join("\n")
}

/// Apply `changes` to a manifest and point its scripts at the target stack
pub fn rewrite_manifest(manifest: &Value, changes: &[DependencyChange], target: TargetStack) -> Value {
    let mut manifest = manifest.clone();
    let Some(root) = manifest.as_object_mut() else {
        return manifest;
    };

    for change in changes {
        let key = if change.dev { "devDependencies" } else { "dependencies" };
        match change.action {
            DependencyAction::Remove => {
                for key in ["dependencies", "devDependencies"] {
                    if let Some(deps) = root.get_mut(key).and_then(Value::as_object_mut) {
                        deps.remove(&change.name);
                    }
                }
            }
            DependencyAction::Add | DependencyAction::Update => {
                let deps = root
                    .entry(key)
                    .or_insert_with(|| Value::Object(Map::new()));
                if let (Some(deps), Some(version)) = (deps.as_object_mut(), &change.to_version) {
                    deps.insert(change.name.clone(), Value::String(version.clone()));
                }
            }
        }
    }

    let scripts = root
        .entry("scripts")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(scripts) = scripts.as_object_mut() {
        scripts.insert("dev".to_string(), Value::String(target.dev_command().to_string()));
        scripts.insert("build".to_string(), Value::String(target.build_command().to_string()));
        match target {
            TargetStack::ReactVite => {
                scripts.insert("preview".to_string(), Value::String("vite preview".to_string()));
                scripts.remove("start");
            }
            TargetStack::ReactCra => {
                scripts.insert("start".to_string(), Value::String(target.dev_command().to_string()));
            }
        }
        scripts.remove("export");
    }

    manifest
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn manifest() -> Value {
        json!({
            "name": "site",
            "scripts": { "dev": "next dev", "build": "next build", "start": "next start" },
            "dependencies": {
                "next": "13.4.0",
                "react": "^17.0.2",
                "react-dom": "^18.2.0",
                "next-auth": "^4.0.0"
            },
            "devDependencies": { "eslint-config-next": "13.4.0", "@next/bundle-analyzer": "13.4.0" }
        })
    }

    #[test]
    fn test_changes_for_vite() {
        let report = analyze_dependencies(Some(&manifest()), TargetStack::ReactVite).unwrap();

        let removed: Vec<_> = report
            .changes
            .iter()
            .filter(|c| c.action == DependencyAction::Remove)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(removed, vec!["next", "@next/bundle-analyzer", "eslint-config-next"]);

        let updated: Vec<_> = report
            .changes
            .iter()
            .filter(|c| c.action == DependencyAction::Update)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(updated, vec!["react"]);

        let vite = report.changes.iter().find(|c| c.name == "vite").unwrap();
        assert_eq!(vite.action, DependencyAction::Add);
        assert!(vite.dev);

        assert!(!report.compatible());
        assert!(report.issues[0].starts_with("next-auth"));
    }

    #[test]
    fn test_install_commands() {
        let report = analyze_dependencies(Some(&manifest()), TargetStack::ReactVite).unwrap();
        let lines: Vec<_> = report.install_commands.lines().collect();
        assert_eq!(lines[0], "npm uninstall next @next/bundle-analyzer eslint-config-next");
        assert!(lines[1].starts_with("npm install react-router-dom@^6.22.0"));
        assert!(lines[1].ends_with("react@^18.2.0"));
        assert_eq!(lines[2], "npm install -D vite@^5.1.0 @vitejs/plugin-react@^4.2.1");
    }

    #[test]
    fn test_missing_manifest_only_adds() {
        let report = analyze_dependencies(None, TargetStack::ReactCra).unwrap();
        assert!(report.changes.iter().all(|c| c.action == DependencyAction::Add));
        assert!(report.changes.iter().any(|c| c.name == "react-scripts"));
    }

    #[test]
    fn test_non_object_manifest_fails() {
        assert!(analyze_dependencies(Some(&json!([1, 2])), TargetStack::ReactVite).is_err());
    }

    #[test]
    fn test_rewrite_manifest() {
        let manifest = manifest();
        let report = analyze_dependencies(Some(&manifest), TargetStack::ReactVite).unwrap();
        let rewritten = rewrite_manifest(&manifest, &report.changes, TargetStack::ReactVite);

        assert!(rewritten["dependencies"].get("next").is_none());
        assert_eq!(rewritten["dependencies"]["react"], json!("^18.2.0"));
        assert_eq!(rewritten["devDependencies"]["vite"], json!("^5.1.0"));
        assert_eq!(rewritten["scripts"]["build"], json!("vite build"));
        assert!(rewritten["scripts"].get("start").is_none());
    }
}
