//! Conversion options and results

use super::{ErrorCollector, Route};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetSyntax {
    Typescript,
    Javascript,
}

impl TargetSyntax {
    /// Extension used for generated component modules
    pub fn markup_extension(&self) -> &'static str {
        match self {
            TargetSyntax::Typescript => "tsx",
            TargetSyntax::Javascript => "jsx",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetStack {
    #[serde(rename = "react-vite")]
    ReactVite,
    #[serde(rename = "react-cra")]
    ReactCra,
}

impl TargetStack {
    pub fn build_command(&self) -> &'static str {
        match self {
            TargetStack::ReactVite => "vite build",
            TargetStack::ReactCra => "react-scripts build",
        }
    }

    pub fn dev_command(&self) -> &'static str {
        match self {
            TargetStack::ReactVite => "vite",
            TargetStack::ReactCra => "react-scripts start",
        }
    }

    pub fn output_dir(&self) -> &'static str {
        match self {
            TargetStack::ReactVite => "dist",
            TargetStack::ReactCra => "build",
        }
    }
}

/// Feature switches for one run. Read-only once the run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionOptions {
    pub syntax: TargetSyntax,
    pub use_react_router: bool,
    pub update_dependencies: bool,
    pub transform_data_fetching: bool,
    pub convert_api_routes: bool,
    pub replace_components: bool,
    pub handle_middleware: bool,
    pub generate_deploy_configs: bool,
    pub preserve_comments: bool,
    pub target: TargetStack,
    /// Files transformed concurrently per batch
    pub batch_size: usize,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            syntax: TargetSyntax::Typescript,
            use_react_router: true,
            update_dependencies: true,
            transform_data_fetching: true,
            convert_api_routes: true,
            replace_components: true,
            handle_middleware: true,
            generate_deploy_configs: true,
            preserve_comments: true,
            target: TargetStack::ReactVite,
            batch_size: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyAction {
    Add,
    Remove,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyChange {
    pub name: String,
    pub action: DependencyAction,
    pub from_version: Option<String>,
    pub to_version: Option<String>,
    pub dev: bool,
}

/// A file created by the run rather than rewritten from the input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewFile {
    pub path: String,
    #[serde(skip)]
    pub content: String,
    pub purpose: String,
}

/// Final text of an input file that the run changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedFile {
    pub path: String,
    pub content: String,
    pub changes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStats {
    pub total_files: usize,
    pub modified_files: usize,
    pub transformation_rate: f64,
    pub dependency_changes: usize,
    pub route_changes: usize,
}

/// Outcome of one run. Immutable once returned.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub success: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
    pub routes: Vec<Route>,
    pub dependencies: Vec<DependencyChange>,
    pub transformed_files: Vec<String>,
    pub stats: ConversionStats,
    #[serde(skip)]
    pub modified_files: Vec<ModifiedFile>,
    pub new_files: Vec<NewFile>,
}

impl ConversionResult {
    pub fn new(total_files: usize) -> Self {
        Self {
            stats: ConversionStats {
                total_files,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Move the collected records into the three message lists and settle `success`
    pub fn absorb(&mut self, collector: &ErrorCollector) {
        for record in collector.all_errors() {
            let message = match &record.file {
                Some(file) if !record.message.starts_with(file.as_str()) => {
                    format!("{}: {}", file, record.message)
                }
                _ => record.message.clone(),
            };
            match record.severity {
                super::Severity::Critical => self.errors.push(message),
                super::Severity::Warning => self.warnings.push(message),
                super::Severity::Info => self.info.push(message),
            }
        }
        self.success = self.errors.is_empty();
    }

    pub fn modified_content(&self, path: &str) -> Option<&str> {
        self.modified_files
            .iter()
            .find(|f| f.path == path)
            .map(|f| f.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorRecord;

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ConversionOptions =
            serde_json::from_str(r#"{ "useReactRouter": false, "target": "react-cra" }"#).unwrap();
        assert!(!options.use_react_router);
        assert!(options.replace_components);
        assert_eq!(options.target, TargetStack::ReactCra);
        assert_eq!(options.batch_size, 5);
    }

    #[test]
    fn test_absorb_partitions_records() {
        let collector = ErrorCollector::new();
        collector.add_error(ErrorRecord::warning("W", "unsupported prop").in_file("pages/a.tsx"));
        collector.add_error(ErrorRecord::info("I", "vercel.json generated"));

        let mut result = ConversionResult::new(1);
        result.absorb(&collector);

        assert!(result.success);
        assert_eq!(result.warnings, vec!["pages/a.tsx: unsupported prop".to_string()]);
        assert_eq!(result.info.len(), 1);

        collector.add_error(ErrorRecord::critical("C", "fatal"));
        let mut result = ConversionResult::new(1);
        result.absorb(&collector);
        assert!(!result.success);
    }
}
