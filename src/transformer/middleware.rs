//! Edge middleware → client-side route guard stub

use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{ErrorCollector, ErrorRecord, NewFile, Project, TargetSyntax};

const MIDDLEWARE_FILES: &[&str] = &["middleware.ts", "middleware.js", "src/middleware.ts", "src/middleware.js"];

lazy_static! {
    static ref MATCHER: Regex = Regex::new(r#"matcher\s*:\s*(\[[^\]]*\]|'[^']*'|"[^"]*")"#).unwrap();
    static ref QUOTED: Regex = Regex::new(r#"['"]([^'"]+)['"]"#).unwrap();
    static ref MATCHER_PARAM: Regex = Regex::new(r":[A-Za-z_]\w*[*+?]?").unwrap();
}

#[derive(Debug, Clone, Default)]
pub struct MiddlewareOutcome {
    /// Middleware sources that were found
    pub sources: Vec<String>,
    pub files: Vec<NewFile>,
}

/// Paths listed in `export const config = { matcher: ... }`
pub fn extract_matchers(code: &str) -> Vec<String> {
    MATCHER
        .captures(code)
        .map(|caps| {
            QUOTED
                .captures_iter(&caps[1])
                .map(|q| q[1].to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Turn `/dashboard/:path*` into a prefix `/dashboard/` the guard can test
fn matcher_prefix(matcher: &str) -> String {
    let prefix = MATCHER_PARAM.replace_all(matcher, "");
    let prefix = prefix.split('(').next().unwrap_or_default();
    if prefix.is_empty() {
        "/".to_string()
    } else {
        prefix.to_string()
    }
}

fn render_guard(source: &str, matchers: &[String], syntax: TargetSyntax) -> String {
    let prefixes: Vec<String> = if matchers.is_empty() {
        vec!["'/'".to_string()]
    } else {
        matchers.iter().map(|m| format!("'{}'", matcher_prefix(m))).collect()
    };
    let props = match syntax {
        TargetSyntax::Typescript => "{ children }: { children: ReactNode }",
        TargetSyntax::Javascript => "{ children }",
    };
    let react_import = match syntax {
        TargetSyntax::Typescript => "import type { ReactNode } from 'react';\n",
        TargetSyntax::Javascript => "",
    };

    format!(
        r#"// Client-side replacement for {source}.
// Edge middleware ran on the server before each request; this guard runs
// after navigation in the browser. Port the checks from {source} below.
{react_import}import {{ useLocation }} from 'react-router-dom';

const GUARDED_PATHS = [{paths}];

export function RouteGuard({props}) {{
  const location = useLocation();
  const guarded = GUARDED_PATHS.some((prefix) => location.pathname.startsWith(prefix));

  if (guarded) {{
    // e.g. return <Navigate to="/login" replace /> when the check fails
  }}

  return children;
}}
"#,
        source = source,
        react_import = react_import,
        paths = prefixes.join(", "),
        props = props,
    )
}

/// Detect root middleware and emit a route guard for the first one found
pub async fn handle_middleware(
    project: &Project,
    syntax: TargetSyntax,
    collector: &ErrorCollector,
) -> Result<MiddlewareOutcome> {
    let mut outcome = MiddlewareOutcome::default();

    let Some(file) = MIDDLEWARE_FILES.iter().find_map(|path| project.get(path)) else {
        return Ok(outcome);
    };

    let code = file.read().await?;
    let matchers = extract_matchers(&code);

    collector.add_error(
        ErrorRecord::warning(
            "MIDDLEWARE_NOT_SUPPORTED",
            "Edge middleware has no client-side equivalent; a RouteGuard stub was generated",
        )
        .in_file(file.path.clone()),
    );

    outcome.files.push(NewFile {
        path: format!("src/components/RouteGuard.{}", syntax.markup_extension()),
        content: render_guard(&file.path, &matchers, syntax),
        purpose: format!("Client route guard replacing {}", file.path),
    });
    outcome.sources.push(file.path.clone());

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_matchers() {
        let code = "export const config = { matcher: ['/dashboard/:path*', \"/account\"] };";
        assert_eq!(extract_matchers(code), vec!["/dashboard/:path*", "/account"]);
        assert_eq!(extract_matchers("export const config = { matcher: '/about/:path*' }"), vec!["/about/:path*"]);
        assert!(extract_matchers("export function middleware() {}").is_empty());
    }

    #[test]
    fn test_matcher_prefix() {
        assert_eq!(matcher_prefix("/dashboard/:path*"), "/dashboard/");
        assert_eq!(matcher_prefix("/((?!api|_next).*)"), "/");
        assert_eq!(matcher_prefix("/account"), "/account");
    }

    #[tokio::test]
    async fn test_handle_middleware() {
        let project = Project::from_sources([
            ("middleware.ts", "export const config = { matcher: ['/admin/:path*'] };"),
            ("lib/middleware.ts", "export {}"),
        ]);
        let collector = ErrorCollector::new();
        let outcome = handle_middleware(&project, TargetSyntax::Typescript, &collector).await.unwrap();

        assert_eq!(outcome.sources, vec!["middleware.ts"]);
        assert_eq!(outcome.files[0].path, "src/components/RouteGuard.tsx");
        assert!(outcome.files[0].content.contains("const GUARDED_PATHS = ['/admin/'];"));
        assert!(outcome.files[0].content.contains("{ children }: { children: ReactNode }"));
        assert_eq!(collector.warnings().len(), 1);
    }

    #[tokio::test]
    async fn test_root_middleware_wins_over_src() {
        let project = Project::from_sources([
            ("src/middleware.ts", "export const config = { matcher: '/src-only' };"),
            ("middleware.js", "export const config = { matcher: '/root' };"),
        ]);
        let collector = ErrorCollector::new();
        let outcome = handle_middleware(&project, TargetSyntax::Typescript, &collector).await.unwrap();

        assert_eq!(outcome.sources, vec!["middleware.js"]);
        assert!(outcome.files[0].content.contains("'/root'"));
    }

    #[tokio::test]
    async fn test_no_middleware() {
        let project = Project::from_sources([("pages/index.jsx", "export default () => null;")]);
        let collector = ErrorCollector::new();
        let outcome = handle_middleware(&project, TargetSyntax::Javascript, &collector).await.unwrap();
        assert!(outcome.files.is_empty());
        assert!(collector.is_empty());
    }
}
