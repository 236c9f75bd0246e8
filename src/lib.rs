//! Next.js to Vite Project Converter
//!
//! A library for migrating Next.js (pages router) projects to Vite with
//! React Router. Handles route table extraction, rule-based source
//! rewriting, legacy component replacement and dependency updates.

pub mod models;
pub mod analyzer;
pub mod transformer;
pub mod executor;
pub mod packager;
pub mod report;
pub mod utils;

pub use models::{ConversionOptions, ConversionResult, Project, ProjectFile};
pub use analyzer::{analyze_project, extract_routes, ComponentAnalyzer};
pub use executor::run;
pub use transformer::{to_target_path, RuleEngine};

use anyhow::Result;
use std::path::Path;
use tracing::info;

/// Convert the project at `input_path` and write the result to `output_path`
pub async fn convert_project(
    input_path: &Path,
    output_path: &Path,
    options: &ConversionOptions,
    on_progress: Option<executor::ProgressFn<'_>>,
) -> Result<ConversionResult> {
    // 1. Load project
    let loaded = packager::load_project(input_path)?;
    info!("Loaded {} files from {}", loaded.project.len(), input_path.display());

    // 2. Run the pipeline
    let result = run(&loaded.project, loaded.manifest.as_ref(), options, on_progress).await;

    // 3. Write output
    let written = packager::write_output(&loaded.project, &result, output_path)?;
    info!("Wrote {} files to {}", written, output_path.display());

    Ok(result)
}
