//! Conversion orchestrator
//!
//! Runs the stages in a fixed order, each gated by [`ConversionOptions`].
//! A failing stage becomes a warning and the next stage still runs.

use anyhow::{anyhow, Context, Result};
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{debug, info, warn};

use crate::analyzer::{analyze_api_routes, analyze_dependencies, extract_routes, rewrite_manifest};
use crate::models::{
    ConversionOptions, ConversionResult, ErrorCollector, ErrorRecord, ModifiedFile, Project,
    RewriteOptions, StageError,
};
use crate::transformer::deploy::generate_deploy_configs;
use crate::transformer::middleware::handle_middleware;
use crate::transformer::{convert_routes, render_router_module, FileTransformer, RuleEngine};

/// Progress callback: percentage (0-100) and a human-readable message
pub type ProgressFn<'a> = &'a (dyn Fn(u8, &str) + Send + Sync);

const TRANSFORM_START: u8 = 30;
const TRANSFORM_END: u8 = 75;

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Convert a project in memory. Never fails; problems end up in the
/// result's message lists.
pub async fn run(
    project: &Project,
    package_manifest: Option<&Value>,
    options: &ConversionOptions,
    on_progress: Option<ProgressFn<'_>>,
) -> ConversionResult {
    ConversionExecutor::new(project, package_manifest, options)
        .with_progress(on_progress)
        .execute()
        .await
}

pub struct ConversionExecutor<'a> {
    project: &'a Project,
    manifest: Option<&'a Value>,
    options: &'a ConversionOptions,
    rewrite_options: RewriteOptions,
    collector: ErrorCollector,
    progress: AtomicU8,
    on_progress: Option<ProgressFn<'a>>,
}

impl<'a> ConversionExecutor<'a> {
    pub fn new(project: &'a Project, manifest: Option<&'a Value>, options: &'a ConversionOptions) -> Self {
        Self {
            project,
            manifest,
            options,
            rewrite_options: RewriteOptions::default(),
            collector: ErrorCollector::new(),
            progress: AtomicU8::new(0),
            on_progress: None,
        }
    }

    pub fn with_progress(mut self, on_progress: Option<ProgressFn<'a>>) -> Self {
        self.on_progress = on_progress;
        self
    }

    pub fn with_rewrite_options(mut self, rewrite_options: RewriteOptions) -> Self {
        self.rewrite_options = rewrite_options;
        self
    }

    /// Report progress, never going backwards
    fn report(&self, percent: u8, message: &str) {
        let percent = percent.min(100);
        let previous = self.progress.fetch_max(percent, Ordering::SeqCst);
        if let Some(callback) = self.on_progress {
            callback(previous.max(percent), message);
        }
    }

    /// Turn a stage failure into a warning naming the stage
    fn settle<T>(&self, stage: &'static str, outcome: Result<T>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(source) => {
                let error = StageError { stage, source };
                warn!("{}", error);
                self.collector.add_error(ErrorRecord::warning(
                    "STAGE_FAILED",
                    format!("Error {}: {:#}", error.stage, error.source),
                ));
                None
            }
        }
    }

    /// Run one stage, settling both its error and a panic inside it
    async fn guarded<T, F>(&self, stage: &'static str, stage_future: F) -> Option<T>
    where
        F: Future<Output = Result<T>>,
    {
        let outcome = match AssertUnwindSafe(stage_future).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => Err(anyhow!("stage panicked: {}", panic_message(&*panic))),
        };
        self.settle(stage, outcome)
    }

    pub async fn execute(self) -> ConversionResult {
        let mut result = ConversionResult::new(self.project.len());

        let outcome = AssertUnwindSafe(self.execute_stages(&mut result)).catch_unwind().await;
        match outcome {
            Ok(()) => result.absorb(&self.collector),
            Err(panic) => {
                result.absorb(&self.collector);
                result.success = false;
                result.errors.push(format!("Unexpected error: {}", panic_message(&*panic)));
            }
        }

        self.report(100, "Conversion completed!");
        info!(
            "Conversion finished: {} files modified, {} warnings, {} errors",
            result.stats.modified_files,
            result.warnings.len(),
            result.errors.len()
        );
        result
    }

    async fn execute_stages(&self, result: &mut ConversionResult) {
        self.report(5, "Starting: analyzing project...");

        if self.options.update_dependencies {
            self.report(10, "Analyzing dependencies...");
            self.guarded("analyzing dependencies", async { self.dependencies(result) })
                .await;
        }

        if self.options.use_react_router {
            self.report(20, "Analyzing routes...");
            self.guarded("analyzing routes", async { self.routes(result) }).await;
        }

        self.report(TRANSFORM_START, "Transforming files...");
        let transformer = FileTransformer::new(RuleEngine::for_options(self.options), self.collector.clone())
            .with_batch_size(self.options.batch_size)
            .strip_comments(!self.options.preserve_comments);
        let transformed = self.guarded("transforming files", async {
            Ok(transformer
                .transform(self.project, |done, total| {
                    let span = (TRANSFORM_END - TRANSFORM_START) as usize;
                    let percent = TRANSFORM_START as usize + span * done / total.max(1);
                    self.report(percent as u8, &format!("Transformed {}/{} files", done, total));
                })
                .await)
        });
        let summary = transformed.await.unwrap_or_default();
        result.info.extend(summary.details);
        result.transformed_files = summary.transformed_files;
        let mut outputs = summary.outputs;

        if self.options.convert_api_routes {
            self.report(75, "Converting API routes...");
            let api = self.guarded("converting API routes", async {
                Ok(analyze_api_routes(self.project, &self.collector).await)
            });
            if let Some(report) = api.await {
                result.info.push(format!("{} API routes identified for conversion", report.count()));
            }
        }

        if self.options.replace_components {
            self.report(85, "Replacing Next.js components...");
            let replacing = self.guarded("replacing components", async {
                Ok(transformer
                    .replace_components(self.project, &mut outputs, &self.rewrite_options)
                    .await)
            });
            if let Some(replaced) = replacing.await {
                for replacement in &replaced {
                    if !result.transformed_files.contains(&replacement.file) {
                        result.transformed_files.push(replacement.file.clone());
                    }
                }
                result.info.push(format!(
                    "Component replacement completed: {} components replaced",
                    replaced.len()
                ));
            }
        }

        if self.options.handle_middleware {
            self.report(90, "Converting middleware...");
            let middleware = self.guarded(
                "handling middleware",
                handle_middleware(self.project, self.options.syntax, &self.collector),
            );
            if let Some(middleware) = middleware.await {
                for file in middleware.files {
                    result.transformed_files.push(file.path.clone());
                    result.new_files.push(file);
                }
            }
        }

        if self.options.generate_deploy_configs {
            self.report(95, "Generating CI/CD configurations...");
            let deploy = self.guarded("generating CI/CD files", async {
                generate_deploy_configs(self.options.target)
            });
            if let Some(templates) = deploy.await {
                for template in templates {
                    result.info.push(format!(
                        "{} configuration generated: {}",
                        template.platform.name(),
                        template.file.path
                    ));
                    result.new_files.push(template.file);
                }
            }
        }

        result.modified_files.extend(outputs);
        result.stats.modified_files = self
            .project
            .files
            .iter()
            .filter(|f| result.modified_files.iter().any(|m| m.path == f.path))
            .count();
        result.stats.transformation_rate = if self.project.is_empty() {
            0.0
        } else {
            result.stats.modified_files as f64 / self.project.len() as f64
        };
    }

    fn dependencies(&self, result: &mut ConversionResult) -> Result<()> {
        let report = analyze_dependencies(self.manifest, self.options.target)?;

        for issue in &report.issues {
            self.collector.add_error(ErrorRecord::warning("DEPENDENCY_INCOMPATIBLE", issue.clone()));
        }
        if !report.install_commands.is_empty() {
            result.info.push(format!("Installation commands:\n{}", report.install_commands));
        }

        if let Some(manifest) = self.manifest {
            let rewritten = rewrite_manifest(manifest, &report.changes, self.options.target);
            let content = serde_json::to_string_pretty(&rewritten).context("Failed to serialize package.json")?;
            result.modified_files.push(ModifiedFile {
                path: "package.json".to_string(),
                content: content + "\n",
                changes: report
                    .changes
                    .iter()
                    .map(|c| format!("{:?} {}", c.action, c.name))
                    .collect(),
            });
        }

        result.stats.dependency_changes = report.changes.len();
        result.dependencies = report.changes;
        Ok(())
    }

    fn routes(&self, result: &mut ConversionResult) -> Result<()> {
        let routes = extract_routes(&self.project.paths());
        debug!("Extracted {} routes", routes.len());

        let targets = convert_routes(&routes);
        if !targets.is_empty() {
            result.new_files.push(render_router_module(&targets, self.options.syntax));
        }

        result.stats.route_changes = routes.len();
        result.routes = routes;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn project() -> Project {
        Project::from_sources([
            ("pages/index.tsx", "export default function Home() { return <h1>{process.env.NEXT_PUBLIC_T}</h1>; }\n"),
            ("pages/blog/[slug].tsx", "export default function Post() { return null; }\n"),
            ("pages/_layout.tsx", "export default function Layout({ children }) { return children; }\n"),
        ])
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_ends_at_100() {
        let seen = Mutex::new(Vec::new());
        let callback = |percent: u8, _: &str| seen.lock().push(percent);
        let result = run(&project(), None, &ConversionOptions::default(), Some(&callback)).await;

        assert!(result.success);
        let seen = seen.into_inner();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&100));
    }

    #[tokio::test]
    async fn test_disabled_stages_still_reach_100() {
        let options = ConversionOptions {
            update_dependencies: false,
            use_react_router: false,
            convert_api_routes: false,
            replace_components: false,
            handle_middleware: false,
            generate_deploy_configs: false,
            ..Default::default()
        };
        let seen = Mutex::new(Vec::new());
        let callback = |percent: u8, _: &str| seen.lock().push(percent);
        let result = run(&project(), None, &options, Some(&callback)).await;

        assert!(result.routes.is_empty());
        assert!(result.dependencies.is_empty());
        assert!(result.new_files.is_empty());
        assert_eq!(seen.into_inner().last(), Some(&100));
    }

    #[tokio::test]
    async fn test_failed_stage_becomes_warning() {
        let manifest = json!("not an object");
        let result = run(&project(), Some(&manifest), &ConversionOptions::default(), None).await;

        assert!(result.success);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.starts_with("Error analyzing dependencies: package.json is not a JSON object")));
        assert_eq!(result.routes.len(), 2);
        assert_eq!(result.transformed_files, vec!["pages/index.tsx"]);
    }

    #[tokio::test]
    async fn test_result_contents() {
        let manifest = json!({ "dependencies": { "next": "14.0.0", "react": "^18.2.0" } });
        let result = run(&project(), Some(&manifest), &ConversionOptions::default(), None).await;

        assert_eq!(result.stats.total_files, 3);
        assert_eq!(result.stats.route_changes, 2);
        assert!(result.stats.dependency_changes > 0);
        assert!(result.info.iter().any(|i| i.starts_with("Installation commands:\nnpm uninstall next")));
        assert!(result.info.iter().any(|i| i == "0 API routes identified for conversion"));
        assert!(result.info.iter().any(|i| i == "vercel configuration generated: vercel.json"));

        let new_paths: Vec<_> = result.new_files.iter().map(|f| f.path.as_str()).collect();
        assert!(new_paths.contains(&"src/router.tsx"));
        assert!(result.modified_content("package.json").unwrap().contains("\"vite\""));
        assert_eq!(result.stats.modified_files, 1);
    }

    #[tokio::test]
    async fn test_panicking_stage_becomes_warning() {
        let project = project();
        let options = ConversionOptions::default();
        let executor = ConversionExecutor::new(&project, None, &options);

        let failed: Option<()> = executor
            .guarded("testing", async {
                if options.batch_size > 0 {
                    panic!("stage blew up");
                }
                Ok(())
            })
            .await;
        assert_eq!(failed, None);

        let next = executor.guarded("routing", async { Ok(7) }).await;
        assert_eq!(next, Some(7));

        let records = executor.collector.all_errors();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "Error testing: stage panicked: stage blew up");
    }
}
