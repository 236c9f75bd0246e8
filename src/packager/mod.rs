//! Project loading and output writing

pub mod extractor;
pub mod builder;

pub use builder::{create_zip_from_directory, write_output};
pub use extractor::LoadedProject;

use anyhow::Result;
use std::path::Path;

/// Load a project from a directory or a `.zip` archive
pub fn load_project(path: &Path) -> Result<LoadedProject> {
    if path.is_dir() {
        extractor::load_from_directory(path)
    } else if path.extension().and_then(|e| e.to_str()) == Some("zip") {
        extractor::load_from_archive(path)
    } else {
        anyhow::bail!("Unsupported input format. Expected a project directory or a .zip file")
    }
}
