//! Source transformation: rule engine, component rewriters and the
//! batched file transformer that drives them

pub mod ast;
pub mod rules;
pub mod components;
pub mod routes;
pub mod deploy;
pub mod middleware;

pub use rules::{Complexity, RuleCategory, RuleEngine, RuleOutcome, RuleStats, TransformationRule};
pub use components::{generate_import_statements, insert_imports, rewrite_by_tag, rewrite_component};
pub use routes::{convert_routes, render_router_module, to_target_path};

use anyhow::{anyhow, Result};
use futures::future::join_all;
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::analyzer::ComponentAnalyzer;
use crate::models::{
    ComponentReplacement, ComponentType, ErrorCollector, ErrorRecord, ModifiedFile, Project,
    ProjectFile, RewriteOptions, SourceFile,
};
use crate::utils::{is_markup_file, should_skip};
use ast::AstParser;

lazy_static! {
    static ref LINE_COMMENT: Regex = Regex::new(r"(?m)^[ \t]*//[^\n]*\n").unwrap();
}

/// Aggregate outcome of [`FileTransformer::transform`]
#[derive(Debug, Clone, Default)]
pub struct TransformSummary {
    /// Modified files, in input order
    pub transformed_files: Vec<String>,
    pub modified_count: usize,
    /// `modified_count / total files`
    pub modification_rate: f64,
    pub details: Vec<String>,
    pub outputs: Vec<ModifiedFile>,
}

/// Applies the rule engine across a project in fixed-size batches.
///
/// Files in a batch run concurrently; batches run one after another and
/// results keep the project's file order.
pub struct FileTransformer {
    engine: Arc<RuleEngine>,
    collector: ErrorCollector,
    batch_size: usize,
    preserve_comments: bool,
}

impl FileTransformer {
    pub fn new(engine: RuleEngine, collector: ErrorCollector) -> Self {
        Self {
            engine: Arc::new(engine),
            collector,
            batch_size: 5,
            preserve_comments: true,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Drop whole-line `//` comments from transformed files
    pub fn strip_comments(mut self, strip: bool) -> Self {
        self.preserve_comments = !strip;
        self
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Transform every file, calling `on_batch(done, total)` after each batch
    pub async fn transform<F>(&self, project: &Project, mut on_batch: F) -> TransformSummary
    where
        F: FnMut(usize, usize),
    {
        let total = project.len();
        let mut summary = TransformSummary::default();

        for (index, batch) in project.files.chunks(self.batch_size).enumerate() {
            debug!("Transforming batch {} ({} files)", index + 1, batch.len());
            for outcome in self.transform_batch(batch).await.into_iter().flatten() {
                if !outcome.is_modified() {
                    continue;
                }
                summary.details.push(format!(
                    "Transformations in file: {}\n{}",
                    outcome.path,
                    outcome.applied.join("\n")
                ));
                summary.transformed_files.push(outcome.path.clone());
                summary.outputs.push(ModifiedFile {
                    path: outcome.path,
                    content: outcome.content,
                    changes: outcome.applied,
                });
            }
            on_batch((index * self.batch_size + batch.len()).min(total), total);
        }

        summary.modified_count = summary.transformed_files.len();
        summary.modification_rate = if total == 0 {
            0.0
        } else {
            summary.modified_count as f64 / total as f64
        };
        summary
    }

    async fn transform_batch(&self, batch: &[ProjectFile]) -> Vec<Option<SourceFile>> {
        let handles: Vec<_> = batch
            .iter()
            .map(|file| {
                let file = file.clone();
                let engine = Arc::clone(&self.engine);
                let preserve_comments = self.preserve_comments;
                tokio::spawn(async move { transform_file(file, engine, preserve_comments).await })
            })
            .collect();

        join_all(handles)
            .await
            .into_iter()
            .zip(batch)
            .map(|(joined, file)| {
                let outcome = joined.map_err(|e| anyhow!("worker failed: {}", e)).and_then(|r| r);
                match outcome {
                    Ok(source) => source,
                    Err(e) => {
                        warn!("Failed to transform {}: {:#}", file.path, e);
                        self.collector.add_error(
                            ErrorRecord::warning("FILE_TRANSFORM_ERROR", format!("Failed to transform file: {:#}", e))
                                .in_file(file.path.clone()),
                        );
                        None
                    }
                }
            })
            .collect()
    }

    /// Rewrite legacy components in every markup file.
    ///
    /// Works on the rule engine's output when a file has one in `outputs`;
    /// rewritten text (with imports inserted) replaces or extends `outputs`.
    pub async fn replace_components(
        &self,
        project: &Project,
        outputs: &mut Vec<ModifiedFile>,
        options: &RewriteOptions,
    ) -> Vec<ComponentReplacement> {
        let mut replacements = Vec::new();

        for file in &project.files {
            if should_skip(&file.path) || !is_markup_file(&file.path) {
                continue;
            }

            let existing = outputs.iter().position(|o| o.path == file.path);
            let original = match existing {
                Some(i) => outputs[i].content.clone(),
                None => match file.read().await {
                    Ok(content) => content,
                    Err(e) => {
                        self.collector.add_error(
                            ErrorRecord::warning("FILE_TRANSFORM_ERROR", format!("Failed to read file: {:#}", e))
                                .in_file(file.path.clone()),
                        );
                        continue;
                    }
                },
            };

            let mut code = original.clone();
            let mut imports = Vec::new();
            let mut changes = Vec::new();

            for component in ComponentType::ALL {
                let usage = ComponentAnalyzer::analyze_component_usage(&code, component);
                if !usage.used {
                    continue;
                }
                let rewritten = rewrite_component(&code, component, options);
                if rewritten.code == code {
                    continue;
                }

                for warning in rewritten.warnings {
                    self.collector.add_error(
                        ErrorRecord::warning("COMPONENT_TRANSFORM_WARNING", warning).in_file(file.path.clone()),
                    );
                }
                changes.push(format!("Replaced {} component ({} usages)", component, usage.count));
                replacements.push(ComponentReplacement {
                    file: file.path.clone(),
                    component,
                    count: usage.count,
                });
                imports.extend(rewritten.imports);
                code = rewritten.code;
            }

            if code == original {
                continue;
            }
            let code = insert_imports(&code, &imports);
            match existing {
                Some(i) => {
                    outputs[i].content = code;
                    outputs[i].changes.extend(changes);
                }
                None => outputs.push(ModifiedFile {
                    path: file.path.clone(),
                    content: code,
                    changes,
                }),
            }
        }

        replacements
    }
}

/// Read, syntax-check and rewrite one file. `Ok(None)` for skipped files.
async fn transform_file(
    file: ProjectFile,
    engine: Arc<RuleEngine>,
    preserve_comments: bool,
) -> Result<Option<SourceFile>> {
    let Some(kind) = file.kind() else {
        return Ok(None);
    };
    if should_skip(&file.path) {
        return Ok(None);
    }

    let original = file.read().await?;
    let path = file.path;

    tokio::task::spawn_blocking(move || -> Result<Option<SourceFile>> {
        AstParser::new().parse_file(&original, &path)?;

        let outcome = engine.apply_all(&original);
        let mut source = SourceFile::new(path, kind, original);
        source.content = if preserve_comments || outcome.applied.is_empty() {
            outcome.code
        } else {
            LINE_COMMENT.replace_all(&outcome.code, "").into_owned()
        };
        source.applied = outcome.applied;
        Ok(Some(source))
    })
    .await?
}
