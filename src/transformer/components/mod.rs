//! Per-component rewriters for legacy Next.js components
//!
//! Each rewriter returns the rewritten code, the imports the caller must
//! add, and warnings. None of them touch shared state.

pub mod jsx;
pub mod image;
pub mod link;
pub mod head;
pub mod script;
pub mod dynamic;

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::{ComponentType, RewriteOptions, RewriteResult};

/// Rewrite usages of one legacy component
pub fn rewrite_component(code: &str, component: ComponentType, options: &RewriteOptions) -> RewriteResult {
    match component {
        ComponentType::Image => image::rewrite(code, options),
        ComponentType::Link => link::rewrite(code, options),
        ComponentType::Head => head::rewrite(code, options),
        ComponentType::Script => script::rewrite(code, options),
        ComponentType::Dynamic => dynamic::rewrite(code, options),
    }
}

/// [`rewrite_component`] keyed by a type tag; unknown tags leave the code as is
pub fn rewrite_by_tag(code: &str, tag: &str, options: &RewriteOptions) -> RewriteResult {
    match ComponentType::from_tag(tag) {
        Some(component) => rewrite_component(code, component, options),
        None => RewriteResult {
            code: code.to_string(),
            imports: Vec::new(),
            warnings: vec![format!("Unknown component type: {}", tag)],
        },
    }
}

/// De-duplicated import block for a set of replaced component types
pub fn generate_import_statements(components: &[ComponentType]) -> String {
    let mut lines: Vec<&str> = Vec::new();
    for component in components {
        let line = match component {
            ComponentType::Image => "import { Image } from '@unpic/react';",
            ComponentType::Link => "import { Link } from 'react-router-dom';",
            ComponentType::Head => "import { Helmet } from 'react-helmet-async';",
            ComponentType::Dynamic => "import { lazy, Suspense } from 'react';",
            ComponentType::Script => continue,
        };
        if !lines.contains(&line) {
            lines.push(line);
        }
    }
    lines.join("\n")
}

lazy_static! {
    static ref IMPORT_LINE: Regex = Regex::new(r#"(?m)^import\b[^;]*?from\s*['"][^'"]+['"];?[ \t]*$|^import\s*['"][^'"]+['"];?[ \t]*$"#).unwrap();
}

/// Insert import statements after the file's last top-level import,
/// skipping any already present.
pub fn insert_imports(code: &str, imports: &[String]) -> String {
    let mut missing: Vec<&str> = Vec::new();
    for import in imports {
        if !code.contains(import.as_str()) && !missing.contains(&import.as_str()) {
            missing.push(import);
        }
    }
    if missing.is_empty() {
        return code.to_string();
    }

    let block = missing.join("\n");
    match IMPORT_LINE.find_iter(code).last() {
        Some(last) => format!("{}\n{}{}", &code[..last.end()], block, &code[last.end()..]),
        None => format!("{}\n{}", block, code),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_type_returns_input_with_warning() {
        let result = rewrite_by_tag("<Font />", "font", &RewriteOptions::default());
        assert_eq!(result.code, "<Font />");
        assert!(result.imports.is_empty());
        assert_eq!(result.warnings, vec!["Unknown component type: font"]);
    }

    #[test]
    fn test_dispatch_is_case_insensitive() {
        let code = "import Link from 'next/link';\n<Link href=\"/\">Home</Link>";
        let result = rewrite_by_tag(code, "Link", &RewriteOptions::default());
        assert!(result.code.contains("to=\"/\""));
    }

    #[test]
    fn test_generate_import_statements_dedupes() {
        let block = generate_import_statements(&[
            ComponentType::Link,
            ComponentType::Script,
            ComponentType::Link,
            ComponentType::Dynamic,
        ]);
        assert_eq!(
            block,
            "import { Link } from 'react-router-dom';\nimport { lazy, Suspense } from 'react';"
        );
    }

    #[test]
    fn test_insert_imports_after_last_import() {
        let code = "import React from 'react';\nimport './styles.css';\n\nexport default function A() {}\n";
        let out = insert_imports(code, &["import { Link } from 'react-router-dom';".to_string()]);
        assert_eq!(
            out,
            "import React from 'react';\nimport './styles.css';\nimport { Link } from 'react-router-dom';\n\nexport default function A() {}\n"
        );
    }

    #[test]
    fn test_insert_imports_without_existing_imports() {
        let out = insert_imports("const a = 1;\n", &["import { lazy, Suspense } from 'react';".to_string()]);
        assert_eq!(out, "import { lazy, Suspense } from 'react';\nconst a = 1;\n");
    }

    #[test]
    fn test_insert_imports_skips_present() {
        let code = "import { Link } from 'react-router-dom';\n";
        assert_eq!(insert_imports(code, &["import { Link } from 'react-router-dom';".to_string()]), code);
    }
}
