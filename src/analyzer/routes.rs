//! Route table extraction from the `pages/` directory convention

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

use crate::models::{Route, SourceKind};
use crate::utils::{parent_dir, split_routing_root, strip_extension};

lazy_static! {
    static ref LAYOUT_FILE: Regex = Regex::new(r"/_layout\.(tsx|jsx|js|ts)$").unwrap();
    static ref BRACKET_GROUP: Regex = Regex::new(r"\[+(?:\.\.\.)?([^\[\]]*)\]+").unwrap();
}

/// Build the route table for a project's file list.
///
/// Routes keep the order of `files`; nothing is re-sorted.
pub fn extract_routes<S: AsRef<str>>(files: &[S]) -> Vec<Route> {
    let mut layouts: HashMap<&str, &str> = HashMap::new();
    for file in files {
        let file = file.as_ref();
        if LAYOUT_FILE.is_match(file) {
            layouts.insert(parent_dir(file), file);
        }
    }

    files
        .iter()
        .filter_map(|file| route_for(file.as_ref(), &layouts))
        .collect()
}

fn route_for(file: &str, layouts: &HashMap<&str, &str>) -> Option<Route> {
    let (root, relative) = split_routing_root(file)?;
    if SourceKind::from_path(file).is_none() || relative.split('/').any(|s| s.starts_with('_')) {
        return None;
    }

    let stem = strip_extension(relative);
    let is_index = stem == "index" || stem.ends_with("/index");
    let path = if is_index {
        format!("/{}", &stem[..stem.len() - "index".len()])
    } else {
        format!("/{}", stem)
    };

    let is_optional_catch_all = path.contains("[[...");
    let is_catch_all = !is_optional_catch_all && path.contains("[...");
    let is_dynamic = path.contains('[') && path.contains(']');

    Some(Route {
        params: extract_params(&path),
        layout: nearest_layout(file, root, layouts),
        file: file.to_string(),
        path,
        is_dynamic,
        is_catch_all,
        is_optional_catch_all,
        is_index,
    })
}

/// Parameter names of every bracket group, left to right
pub fn extract_params(path: &str) -> Vec<String> {
    BRACKET_GROUP
        .captures_iter(path)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Walk from the file's directory up to the routing root, inclusive
fn nearest_layout(file: &str, root: &str, layouts: &HashMap<&str, &str>) -> Option<String> {
    let mut dir = parent_dir(file);
    loop {
        if let Some(layout) = layouts.get(dir) {
            return Some(layout.to_string());
        }
        if dir == root || dir.len() <= root.len() {
            return None;
        }
        dir = parent_dir(dir);
    }
}

/// Page files that live under `pages/api`
pub fn api_routes(routes: &[Route]) -> Vec<&Route> {
    routes
        .iter()
        .filter(|r| r.path == "/api" || r.path.starts_with("/api/"))
        .collect()
}
