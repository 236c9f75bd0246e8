//! Route table records

use serde::Serialize;

/// One page file mapped to its URL pattern in the legacy `pages/` convention
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// URL path in bracket syntax, e.g. `/blog/[slug]`
    pub path: String,
    /// Owning page file, e.g. `pages/blog/[slug].tsx`
    pub file: String,
    pub is_dynamic: bool,
    pub is_catch_all: bool,
    pub is_optional_catch_all: bool,
    pub params: Vec<String>,
    pub layout: Option<String>,
    pub is_index: bool,
}

/// A route rewritten for the target router
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRoute {
    pub path: String,
    pub component: String,
    pub file: String,
    pub original_path: String,
    pub params: Vec<String>,
    pub layout: Option<String>,
}
