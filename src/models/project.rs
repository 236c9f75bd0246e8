//! Project representation: the ordered set of source files to migrate

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Language variant of a source file, derived from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// `.js`, `.mjs`, `.cjs`
    Script,
    /// `.ts`
    TypedScript,
    /// `.jsx`, `.tsx`
    Markup,
}

impl SourceKind {
    pub fn from_path(path: &str) -> Option<Self> {
        let ext = Path::new(path).extension().and_then(|e| e.to_str())?;
        match ext {
            "js" | "mjs" | "cjs" => Some(SourceKind::Script),
            "ts" | "mts" | "cts" => Some(SourceKind::TypedScript),
            "jsx" | "tsx" => Some(SourceKind::Markup),
            _ => None,
        }
    }

    pub fn has_markup(&self) -> bool {
        matches!(self, SourceKind::Markup)
    }
}

/// Where a file's text comes from. Disk-backed files are read lazily.
#[derive(Debug, Clone)]
pub enum FileSource {
    Memory(String),
    Disk(PathBuf),
}

/// One (path, content) entry of the input project
#[derive(Debug, Clone)]
pub struct ProjectFile {
    /// Project-relative path with `/` separators, e.g. `pages/blog/[slug].tsx`
    pub path: String,
    pub source: FileSource,
}

impl ProjectFile {
    pub fn in_memory(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: FileSource::Memory(content.into()),
        }
    }

    pub fn on_disk(path: impl Into<String>, location: PathBuf) -> Self {
        Self {
            path: path.into(),
            source: FileSource::Disk(location),
        }
    }

    pub fn kind(&self) -> Option<SourceKind> {
        SourceKind::from_path(&self.path)
    }

    /// Read the file's text
    pub async fn read(&self) -> Result<String> {
        match &self.source {
            FileSource::Memory(content) => Ok(content.clone()),
            FileSource::Disk(location) => tokio::fs::read_to_string(location)
                .await
                .with_context(|| format!("Failed to read {}", location.display())),
        }
    }

    /// Blocking variant of [`ProjectFile::read`] for non-async callers
    pub fn read_blocking(&self) -> Result<String> {
        match &self.source {
            FileSource::Memory(content) => Ok(content.clone()),
            FileSource::Disk(location) => std::fs::read_to_string(location)
                .with_context(|| format!("Failed to read {}", location.display())),
        }
    }
}

/// A source file after it has been through the pipeline
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub kind: SourceKind,
    pub original: String,
    pub content: String,
    pub applied: Vec<String>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, kind: SourceKind, original: String) -> Self {
        Self {
            path: path.into(),
            kind,
            content: original.clone(),
            original,
            applied: Vec::new(),
        }
    }

    /// Changed text that at least one rule accounts for
    pub fn is_modified(&self) -> bool {
        self.content != self.original && !self.applied.is_empty()
    }
}

/// The source project being migrated, in discovery order
#[derive(Debug, Clone, Default)]
pub struct Project {
    pub files: Vec<ProjectFile>,
}

impl Project {
    pub fn new(files: Vec<ProjectFile>) -> Self {
        Self { files }
    }

    /// Build an in-memory project from `(path, content)` pairs
    pub fn from_sources<P, C>(sources: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: Into<String>,
        C: Into<String>,
    {
        Self {
            files: sources
                .into_iter()
                .map(|(path, content)| ProjectFile::in_memory(path, content))
                .collect(),
        }
    }

    pub fn paths(&self) -> Vec<String> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    pub fn get(&self, path: &str) -> Option<&ProjectFile> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_from_path() {
        assert_eq!(SourceKind::from_path("pages/index.tsx"), Some(SourceKind::Markup));
        assert_eq!(SourceKind::from_path("lib/api.ts"), Some(SourceKind::TypedScript));
        assert_eq!(SourceKind::from_path("next.config.js"), Some(SourceKind::Script));
        assert_eq!(SourceKind::from_path("styles/main.css"), None);
    }

    #[test]
    fn test_read_in_memory_file() {
        let file = ProjectFile::in_memory("a.js", "const a = 1;");
        assert_eq!(file.read_blocking().unwrap(), "const a = 1;");
    }
}
