//! Helper utility functions

use crate::models::SourceKind;

/// Directories never treated as project sources
pub const IGNORED_DIRS: &[&str] = &["node_modules", ".next", ".git", "dist", "out", "build"];

const LOCKFILES: &[&str] = &["package-lock.json", "yarn.lock", "pnpm-lock.yaml", "bun.lockb"];

/// Roots of the `pages/` routing convention, most specific first
pub const ROUTING_ROOTS: &[&str] = &["src/pages", "pages"];

/// Check whether any path segment is an ignored build/vendor directory
pub fn in_ignored_dir(path: &str) -> bool {
    path.split('/').any(|segment| IGNORED_DIRS.contains(&segment))
}

/// Files the transformer leaves alone: non-source files, build output,
/// lockfiles and type declaration files.
pub fn should_skip(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    if LOCKFILES.contains(&file_name) || file_name.ends_with(".d.ts") {
        return true;
    }
    in_ignored_dir(path) || SourceKind::from_path(path).is_none()
}

/// Check if a file may contain JSX markup
pub fn is_markup_file(path: &str) -> bool {
    SourceKind::from_path(path).map_or(false, |kind| kind.has_markup())
}

/// Split `pages/blog/[slug].tsx` into (`pages`, `blog/[slug].tsx`)
pub fn split_routing_root(path: &str) -> Option<(&'static str, &str)> {
    ROUTING_ROOTS.iter().find_map(|root| {
        path.strip_prefix(root)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(|rest| (*root, rest))
    })
}

/// Drop the final `.ext` from a file path
pub fn strip_extension(path: &str) -> &str {
    let file_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[file_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..file_start + dot],
        _ => path,
    }
}

/// Parent directory of a `/`-separated path, empty for top-level files
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}
