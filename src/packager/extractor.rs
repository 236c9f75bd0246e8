//! Project loading from directories and archives

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::models::{Project, ProjectFile};
use crate::utils::IGNORED_DIRS;

/// A project plus its parsed `package.json`, if it has one
#[derive(Debug, Clone, Default)]
pub struct LoadedProject {
    pub project: Project,
    pub manifest: Option<Value>,
}

fn parse_manifest(content: &str) -> Result<Value> {
    serde_json::from_str(content).context("Failed to parse package.json")
}

/// Load a project directory. File contents stay on disk until read.
pub fn load_from_directory(dir: &Path) -> Result<LoadedProject> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir).into_iter().filter_entry(|entry| {
        entry.depth() == 0
            || !entry
                .file_name()
                .to_str()
                .map_or(false, |name| IGNORED_DIRS.contains(&name))
    });

    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .context("Failed to get relative path")?;
        let path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(ProjectFile::on_disk(path, entry.path().to_path_buf()));
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let manifest_path = dir.join("package.json");
    let manifest = if manifest_path.is_file() {
        let content = fs::read_to_string(&manifest_path).context("Failed to read package.json")?;
        Some(parse_manifest(&content)?)
    } else {
        debug!("No package.json in {}", dir.display());
        None
    };

    Ok(LoadedProject {
        project: Project::new(files),
        manifest,
    })
}

/// Load a project from a `.zip`. A single top-level folder wrapping the
/// project (as GitHub downloads have) is stripped.
pub fn load_from_archive(archive_path: &Path) -> Result<LoadedProject> {
    let file = fs::File::open(archive_path).context("Failed to open archive")?;
    let mut archive = ZipArchive::new(file).context("Failed to read ZIP archive")?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).context("Failed to read file from archive")?;
        if !entry.is_file() {
            continue;
        }
        let name = entry.name().replace('\\', "/");
        let mut bytes = Vec::new();
        entry
            .read_to_end(&mut bytes)
            .with_context(|| format!("Failed to read {} from archive", name))?;
        match String::from_utf8(bytes) {
            Ok(text) => entries.push((name, text)),
            Err(_) => warn!("Skipping binary file {}", name),
        }
    }

    let root = entries
        .iter()
        .filter(|(name, _)| name == "package.json" || name.ends_with("/package.json"))
        .map(|(name, _)| &name[..name.len() - "package.json".len()])
        .min_by_key(|prefix| prefix.len())
        .unwrap_or("")
        .to_string();

    let mut files = Vec::new();
    let mut manifest = None;
    for (name, text) in entries {
        let Some(path) = name.strip_prefix(root.as_str()) else {
            continue;
        };
        if path.split('/').any(|segment| IGNORED_DIRS.contains(&segment)) {
            continue;
        }
        if path == "package.json" {
            manifest = Some(parse_manifest(&text)?);
        }
        files.push(ProjectFile::in_memory(path, text));
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(LoadedProject {
        project: Project::new(files),
        manifest,
    })
}
