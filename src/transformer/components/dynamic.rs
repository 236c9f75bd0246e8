//! `next/dynamic` → `React.lazy`

use std::ops::Range;

use swc_core::common::Spanned;
use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{Visit, VisitWith};

use super::jsx::{finish, parse_with_import, Edit, ParsedSource};
use crate::models::{ComponentType, RewriteOptions, RewriteResult};
use crate::transformer::ast::prop_key;

/// One `dynamic(loader, options)` call
struct DynamicCall {
    range: Range<usize>,
    loader: Option<String>,
    options: Vec<String>,
    opaque_options: bool,
}

struct DynamicCalls<'s, 'a> {
    source: &'s ParsedSource<'a>,
    local: &'s str,
    calls: Vec<DynamicCall>,
}

impl Visit for DynamicCalls<'_, '_> {
    fn visit_call_expr(&mut self, call: &CallExpr) {
        let Callee::Expr(callee) = &call.callee else {
            call.visit_children_with(self);
            return;
        };
        let Expr::Ident(ident) = &**callee else {
            call.visit_children_with(self);
            return;
        };
        if &*ident.sym != self.local {
            call.visit_children_with(self);
            return;
        }

        let loader = call
            .args
            .first()
            .filter(|arg| arg.spread.is_none())
            .map(|arg| self.source.text(arg.expr.span()).to_string());

        let mut options = Vec::new();
        let mut opaque_options = false;
        if let Some(arg) = call.args.get(1) {
            match &*arg.expr {
                Expr::Object(object) if arg.spread.is_none() => {
                    for prop in &object.props {
                        let key = match prop {
                            PropOrSpread::Prop(prop) => match &**prop {
                                Prop::KeyValue(kv) => prop_key(&kv.key),
                                Prop::Shorthand(ident) => Some(ident.sym.to_string()),
                                Prop::Method(method) => prop_key(&method.key),
                                _ => None,
                            },
                            PropOrSpread::Spread(_) => None,
                        };
                        match key {
                            Some(key) => options.push(key),
                            None => opaque_options = true,
                        }
                    }
                }
                _ => opaque_options = true,
            }
        }

        self.calls.push(DynamicCall {
            range: self.source.range(call.span),
            loader,
            options,
            opaque_options,
        });
    }
}

pub fn rewrite(code: &str, options: &RewriteOptions) -> RewriteResult {
    let Some((source, import)) = parse_with_import(code, ComponentType::Dynamic) else {
        return RewriteResult::unchanged(code);
    };

    let mut visitor = DynamicCalls {
        source: &source,
        local: &import.local,
        calls: Vec::new(),
    };
    source.module.visit_with(&mut visitor);
    let calls = visitor.calls;

    let mut warnings = Vec::new();
    let mut edits = Vec::new();
    let mut every_call_rewritten = true;

    for call in calls {
        let Some(loader) = call.loader else {
            every_call_rewritten = false;
            warnings.push(format!(
                "{}() call without a plain loader argument left unchanged; the next/dynamic import is kept",
                import.local
            ));
            continue;
        };

        if loader.contains(".then(") {
            warnings.push("lazy() needs a default export; check loaders that pick a named export".to_string());
        }
        if call.options.iter().any(|o| o == "ssr") {
            warnings.push("dynamic() `ssr` option dropped; everything renders on the client".to_string());
        }
        if call.options.iter().any(|o| o == "loading") {
            warnings.push(format!(
                "dynamic() `loading` option dropped; render the component inside <Suspense fallback={{{}}}>",
                options.lazy_fallback
            ));
        }
        if call.opaque_options {
            warnings.push("dynamic() options that are not a plain object were dropped".to_string());
        }

        edits.push(Edit::new(call.range, format!("lazy({})", loader)));
    }

    finish(
        code,
        import,
        edits,
        every_call_rewritten,
        vec!["import { lazy, Suspense } from 'react';".to_string()],
        warnings,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dynamic_becomes_lazy() {
        let code = "import dynamic from 'next/dynamic';\nconst Chart = dynamic(() => import('./Chart'), { ssr: false, loading: () => <p>Loading</p> });\n";
        let result = rewrite(code, &RewriteOptions::default());
        assert_eq!(result.code, "const Chart = lazy(() => import('./Chart'));\n");
        assert_eq!(result.imports, vec!["import { lazy, Suspense } from 'react';"]);
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[1].contains("fallback={null}"));
    }

    #[test]
    fn test_multiple_calls() {
        let code = "import load from 'next/dynamic';\nconst A = load(() => import('./A'));\nconst B = load(() => import('./B').then((m) => m.B));";
        let result = rewrite(code, &RewriteOptions::default());
        assert!(result.code.contains("const A = lazy(() => import('./A'));"));
        assert!(result.code.contains("const B = lazy(() => import('./B').then((m) => m.B));"));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_apostrophe_in_loading_markup() {
        let code = "import dynamic from 'next/dynamic';\nconst Map = dynamic(() => import('./Map'), { loading: () => <p>Map isn't ready</p> });\n";
        let result = rewrite(code, &RewriteOptions::default());
        assert_eq!(result.code, "const Map = lazy(() => import('./Map'));\n");
        assert!(!result.code.contains("dynamic("));
    }

    #[test]
    fn test_unrewritten_call_keeps_import() {
        let code = "import dynamic from 'next/dynamic';\nconst A = dynamic(() => import('./A'));\nconst B = dynamic(...args);\n";
        let result = rewrite(code, &RewriteOptions::default());
        assert_eq!(
            result.code,
            "import dynamic from 'next/dynamic';\nconst A = lazy(() => import('./A'));\nconst B = dynamic(...args);\n"
        );
        assert!(result.warnings.iter().any(|w| w.contains("left unchanged")));
    }

    #[test]
    fn test_repeated_warnings_reported_once() {
        let code = "import dynamic from 'next/dynamic';\nconst A = dynamic(() => import('./A'), { ssr: false });\nconst B = dynamic(() => import('./B'), { loading: () => null });\nconst C = dynamic(() => import('./C'), { ssr: false });\n";
        let result = rewrite(code, &RewriteOptions::default());
        assert_eq!(result.warnings.len(), 2);
        assert!(result.warnings[0].contains("`ssr`"));
        assert!(result.warnings[1].contains("`loading`"));
    }
}
