//! API route discovery
//!
//! `pages/api/**` handlers have no client-side equivalent. They are counted
//! and reported so they can be moved to a standalone server.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

use crate::models::{ErrorCollector, ErrorRecord, Project};
use crate::utils::{should_skip, split_routing_root};

lazy_static! {
    static ref METHOD_CHECK: Regex =
        Regex::new(r#"\.method\s*===?\s*['"](GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS)['"]"#).unwrap();
    static ref METHOD_CASE: Regex =
        Regex::new(r#"case\s+['"](GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS)['"]"#).unwrap();
}

/// One API handler file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRoute {
    pub file: String,
    /// Endpoint path, e.g. `/api/users/[id]`
    pub endpoint: String,
    /// HTTP methods the handler branches on, sorted
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ApiRouteReport {
    pub routes: Vec<ApiRoute>,
}

impl ApiRouteReport {
    pub fn count(&self) -> usize {
        self.routes.len()
    }
}

fn is_api_file(path: &str) -> bool {
    split_routing_root(path).map_or(false, |(_, rest)| rest.starts_with("api/"))
}

/// HTTP methods a handler explicitly checks for
pub fn detect_methods(code: &str) -> Vec<String> {
    let methods: BTreeSet<String> = METHOD_CHECK
        .captures_iter(code)
        .chain(METHOD_CASE.captures_iter(code))
        .map(|caps| caps[1].to_string())
        .collect();
    methods.into_iter().collect()
}

/// Find API handlers and warn once per handler.
///
/// Unreadable handlers are still counted; their methods are left empty.
pub async fn analyze_api_routes(project: &Project, collector: &ErrorCollector) -> ApiRouteReport {
    let mut report = ApiRouteReport::default();

    for file in project.files.iter().filter(|f| is_api_file(&f.path) && !should_skip(&f.path)) {
        let methods = match file.read().await {
            Ok(code) => detect_methods(&code),
            Err(e) => {
                collector.add_error(
                    ErrorRecord::warning("API_ROUTE_READ_ERROR", format!("Failed to read API route: {:#}", e))
                        .in_file(file.path.clone()),
                );
                Vec::new()
            }
        };

        let relative = split_routing_root(&file.path).map_or(file.path.as_str(), |(_, rest)| rest);
        let endpoint = format!("/{}", crate::utils::strip_extension(relative))
            .trim_end_matches("/index")
            .to_string();

        let methods_note = if methods.is_empty() {
            String::new()
        } else {
            format!(" (methods: {})", methods.join(", "))
        };
        collector.add_error(
            ErrorRecord::warning(
                "API_ROUTE_NEEDS_SERVER",
                format!(
                    "API route {}{} needs a server runtime; move it to an Express or serverless handler",
                    endpoint, methods_note
                ),
            )
            .in_file(file.path.clone()),
        );

        report.routes.push(ApiRoute {
            file: file.path.clone(),
            endpoint,
            methods,
        });
    }

    report
}
