//! `next/head` → `react-helmet-async` `<Helmet>`

use super::jsx::{finish, parse_with_import, rewrite_tags};
use crate::models::{ComponentType, RewriteOptions, RewriteResult};

pub fn rewrite(code: &str, _options: &RewriteOptions) -> RewriteResult {
    let Some((source, import)) = parse_with_import(code, ComponentType::Head) else {
        return RewriteResult::unchanged(code);
    };

    let (edits, count) = rewrite_tags(&source, &import.local, "Helmet", |_| {});

    let mut warnings = Vec::new();
    if count > 0 {
        warnings.push("Helmet requires the app root to be wrapped in <HelmetProvider>".to_string());
    }

    finish(
        code,
        import,
        edits,
        true,
        vec!["import { Helmet } from 'react-helmet-async';".to_string()],
        warnings,
    )
}
