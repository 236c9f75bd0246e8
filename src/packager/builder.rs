//! Output writing

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::models::{ConversionResult, FileSource, Project};

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write the converted project: every input file (transformed text when
/// the run changed it) plus generated files. Returns the number of files written.
pub fn write_output(project: &Project, result: &ConversionResult, output_dir: &Path) -> Result<usize> {
    fs::create_dir_all(output_dir).context("Failed to create output directory")?;
    let mut written = 0;

    for file in &project.files {
        let target = output_dir.join(&file.path);
        match (result.modified_content(&file.path), &file.source) {
            (Some(content), _) => write_file(&target, content.as_bytes())?,
            (None, FileSource::Memory(content)) => write_file(&target, content.as_bytes())?,
            (None, FileSource::Disk(location)) => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(location, &target)
                    .with_context(|| format!("Failed to copy {}", location.display()))?;
            }
        }
        written += 1;
    }

    // Modified files with no input counterpart, e.g. a package.json passed separately
    for modified in result.modified_files.iter().filter(|m| project.get(&m.path).is_none()) {
        write_file(&output_dir.join(&modified.path), modified.content.as_bytes())?;
        written += 1;
    }

    for new_file in &result.new_files {
        write_file(&output_dir.join(&new_file.path), new_file.content.as_bytes())?;
        written += 1;
    }

    Ok(written)
}

/// Zip an output directory
pub fn create_zip_from_directory(source_dir: &Path, zip_path: &Path) -> Result<()> {
    let file = File::create(zip_path).context("Failed to create ZIP file")?;
    let mut zip = ZipWriter::new(file);

    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for entry in WalkDir::new(source_dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_file() {
            let relative_path = path.strip_prefix(source_dir).context("Failed to get relative path")?;
            let name = relative_path
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            zip.start_file(name, options)?;
            let content = fs::read(path)?;
            zip.write_all(&content)?;
        }
    }

    zip.finish()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModifiedFile, NewFile, ProjectFile};
    use tempfile::TempDir;

    #[test]
    fn test_write_output() {
        let input = TempDir::new().unwrap();
        fs::write(input.path().join("logo.svg"), "<svg/>").unwrap();

        let project = Project::new(vec![
            ProjectFile::in_memory("pages/index.tsx", "old"),
            ProjectFile::in_memory("lib/a.ts", "untouched"),
            ProjectFile::on_disk("public/logo.svg", input.path().join("logo.svg")),
        ]);
        let mut result = ConversionResult::new(3);
        result.modified_files.push(ModifiedFile {
            path: "pages/index.tsx".to_string(),
            content: "new".to_string(),
            changes: vec![],
        });
        result.new_files.push(NewFile {
            path: "src/router.tsx".to_string(),
            content: "router".to_string(),
            purpose: String::new(),
        });

        let out = TempDir::new().unwrap();
        let written = write_output(&project, &result, out.path()).unwrap();

        assert_eq!(written, 4);
        assert_eq!(fs::read_to_string(out.path().join("pages/index.tsx")).unwrap(), "new");
        assert_eq!(fs::read_to_string(out.path().join("lib/a.ts")).unwrap(), "untouched");
        assert_eq!(fs::read_to_string(out.path().join("public/logo.svg")).unwrap(), "<svg/>");
        assert_eq!(fs::read_to_string(out.path().join("src/router.tsx")).unwrap(), "router");
    }

    #[test]
    fn test_create_zip() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("site/src")).unwrap();
        fs::write(dir.path().join("site/src/main.tsx"), "x").unwrap();
        let zip_path = dir.path().join("site.zip");

        create_zip_from_directory(&dir.path().join("site"), &zip_path).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        assert_eq!(archive.by_index(0).unwrap().name(), "src/main.tsx");
    }
}
