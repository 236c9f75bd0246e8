//! Route path conversion and React Router module generation

use inflector::Inflector;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::analyzer::routes::api_routes;
use crate::models::{NewFile, Route, TargetRoute, TargetSyntax};
use crate::utils::{parent_dir, split_routing_root, strip_extension};

lazy_static! {
    static ref CATCH_ALL: Regex = Regex::new(r"\[\[\.\.\.[^\]]*\]\]|\[\.\.\.[^\]]*\]").unwrap();
    static ref DYNAMIC: Regex = Regex::new(r"\[([^\]]+)\]").unwrap();
}

/// Rewrite bracket segments into React Router syntax.
///
/// Catch-all groups go first; otherwise `[...slug]` would be read as a
/// plain `[name]` group.
pub fn to_target_path(path: &str) -> String {
    let wildcarded = CATCH_ALL.replace_all(path, "*");
    DYNAMIC.replace_all(&wildcarded, ":$1").into_owned()
}

/// Map the route table onto target route records, skipping API handlers
pub fn convert_routes(routes: &[Route]) -> Vec<TargetRoute> {
    let api: HashSet<&str> = api_routes(routes).iter().map(|r| r.file.as_str()).collect();
    let mut used_names = HashSet::new();

    routes
        .iter()
        .filter(|r| !api.contains(r.file.as_str()))
        .map(|route| {
            let mut path = to_target_path(&route.path);
            if path.len() > 1 && path.ends_with('/') {
                path.pop();
            }
            TargetRoute {
                path,
                component: unique_name(page_component_name(&route.file), &mut used_names),
                file: route.file.clone(),
                original_path: route.path.clone(),
                params: route.params.clone(),
                layout: route.layout.clone(),
            }
        })
        .collect()
}

/// `pages/blog/[slug].tsx` → `BlogSlugPage`
pub fn page_component_name(file: &str) -> String {
    let relative = split_routing_root(file).map_or(file, |(_, rest)| rest);
    identifier(strip_extension(relative), "Page")
}

/// `pages/dashboard/_layout.tsx` → `DashboardLayout`, root layout → `RootLayout`
pub fn layout_component_name(file: &str) -> String {
    let dir = parent_dir(file);
    let relative = split_routing_root(&format!("{}/", dir))
        .map(|(_, rest)| rest.trim_end_matches('/').to_string())
        .unwrap_or_else(|| dir.to_string());
    if relative.is_empty() {
        "RootLayout".to_string()
    } else {
        identifier(&relative, "Layout")
    }
}

fn identifier(raw: &str, suffix: &str) -> String {
    let words: String = raw
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    let mut name = words.trim().to_pascal_case();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, suffix);
    }
    name.push_str(suffix);
    name
}

fn unique_name(base: String, used: &mut HashSet<String>) -> String {
    let mut name = base.clone();
    let mut n = 2;
    while !used.insert(name.clone()) {
        name = format!("{}{}", base, n);
        n += 1;
    }
    name
}

/// Import specifier for a project file as seen from `src/router.*`
fn import_path(file: &str) -> String {
    let stem = strip_extension(file);
    match stem.strip_prefix("src/") {
        Some(inside) => format!("./{}", inside),
        None => format!("../{}", stem),
    }
}

/// Render a `createBrowserRouter` module with lazily loaded pages
pub fn render_router_module(routes: &[TargetRoute], syntax: TargetSyntax) -> NewFile {
    let mut layouts: Vec<(String, String)> = Vec::new();
    for layout in routes.iter().filter_map(|r| r.layout.as_deref()) {
        if !layouts.iter().any(|(file, _)| file == layout) {
            layouts.push((layout.to_string(), layout_component_name(layout)));
        }
    }

    let mut out = String::new();
    out.push_str("import { lazy, Suspense } from 'react';\n");
    out.push_str("import { createBrowserRouter } from 'react-router-dom';\n\n");

    for (file, name) in &layouts {
        out.push_str(&format!("const {} = lazy(() => import('{}'));\n", name, import_path(file)));
    }
    for route in routes {
        out.push_str(&format!(
            "const {} = lazy(() => import('{}'));\n",
            route.component,
            import_path(&route.file)
        ));
    }

    out.push_str("\nexport const router = createBrowserRouter([\n");
    for route in routes {
        let page = format!("<{} />", route.component);
        let element = match route.layout.as_deref().and_then(|l| layouts.iter().find(|(f, _)| f == l)) {
            Some((_, layout)) => format!("<{0}>{1}</{0}>", layout, page),
            None => page,
        };
        out.push_str(&format!(
            "  {{ path: '{}', element: <Suspense fallback={{null}}>{}</Suspense> }},\n",
            route.path, element
        ));
    }
    out.push_str("]);\n");

    NewFile {
        path: format!("src/router.{}", syntax.markup_extension()),
        content: out,
        purpose: format!("React Router configuration for {} routes", routes.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::routes::extract_routes;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("/blog/[...slug]", "/blog/*" ; "catch-all")]
    #[test_case("/blog/[slug]", "/blog/:slug" ; "dynamic")]
    #[test_case("/blog/[id]/[comment]", "/blog/:id/:comment" ; "two params")]
    #[test_case("/docs/[[...slug]]", "/docs/*" ; "optional catch-all")]
    #[test_case("/[org]/files/[...path]", "/:org/files/*" ; "mixed")]
    #[test_case("/about", "/about" ; "static")]
    fn test_to_target_path(input: &str, expected: &str) {
        assert_eq!(to_target_path(input), expected);
    }

    #[test]
    fn test_component_names() {
        assert_eq!(page_component_name("pages/index.tsx"), "IndexPage");
        assert_eq!(page_component_name("pages/blog/[slug].tsx"), "BlogSlugPage");
        assert_eq!(page_component_name("src/pages/user-settings/[...rest].jsx"), "UserSettingsRestPage");
        assert_eq!(layout_component_name("pages/_layout.tsx"), "RootLayout");
        assert_eq!(layout_component_name("pages/dashboard/_layout.tsx"), "DashboardLayout");
    }

    #[test]
    fn test_convert_routes_skips_api_and_trims_index_slash() {
        let routes = extract_routes(&[
            "pages/index.tsx",
            "pages/blog/index.tsx",
            "pages/blog/[slug].tsx",
            "pages/api/hello.ts",
        ]);
        let converted = convert_routes(&routes);
        let paths: Vec<_> = converted.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/", "/blog", "/blog/:slug"]);
        assert_eq!(converted[1].component, "BlogIndexPage");
        assert_eq!(converted[2].original_path, "/blog/[slug]");
    }

    #[test]
    fn test_duplicate_names_get_suffix() {
        let routes = extract_routes(&["pages/blog-slug.tsx", "pages/blog/slug.tsx"]);
        let converted = convert_routes(&routes);
        assert_eq!(converted[0].component, "BlogSlugPage");
        assert_eq!(converted[1].component, "BlogSlugPage2");
    }

    #[test]
    fn test_render_router_module() {
        let routes = extract_routes(&["pages/_layout.tsx", "pages/index.tsx", "src/pages/x.tsx"]);
        let module = render_router_module(&convert_routes(&routes), TargetSyntax::Typescript);

        assert_eq!(module.path, "src/router.tsx");
        assert!(module.content.contains("const RootLayout = lazy(() => import('../pages/_layout'));"));
        assert!(module.content.contains("const IndexPage = lazy(() => import('../pages/index'));"));
        assert!(module.content.contains("const XPage = lazy(() => import('./pages/x'));"));
        assert!(module.content.contains(
            "{ path: '/', element: <Suspense fallback={null}><RootLayout><IndexPage /></RootLayout></Suspense> },"
        ));
        assert!(module.content.contains("{ path: '/x', element: <Suspense fallback={null}><XPage /></Suspense> },"));

        let js = render_router_module(&[], TargetSyntax::Javascript);
        assert_eq!(js.path, "src/router.jsx");
    }
}
