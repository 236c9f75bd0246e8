//! `next/script` → plain `<script>` elements

use super::jsx::{finish, parse_with_import, rewrite_tags, JsxAttr};
use crate::models::{ComponentType, RewriteOptions, RewriteResult};

pub fn rewrite(code: &str, _options: &RewriteOptions) -> RewriteResult {
    let Some((source, import)) = parse_with_import(code, ComponentType::Script) else {
        return RewriteResult::unchanged(code);
    };

    let mut warnings = Vec::new();
    let (edits, _) = rewrite_tags(&source, &import.local, "script", |tag| {
        if let Some(strategy) = tag.take_attr("strategy") {
            match strategy.string_value() {
                Some("beforeInteractive") => warnings.push(
                    "Script strategy=\"beforeInteractive\" should be moved into index.html".to_string(),
                ),
                Some("lazyOnload") => tag.attrs.push(JsxAttr::new("defer", None)),
                Some("worker") => {
                    warnings.push("Script strategy=\"worker\" has no equivalent; loaded with async".to_string());
                    tag.attrs.push(JsxAttr::new("async", None));
                }
                _ => tag.attrs.push(JsxAttr::new("async", None)),
            }
        } else if tag.attr("src").is_some() {
            tag.attrs.push(JsxAttr::new("async", None));
        }

        for handler in ["onLoad", "onReady", "onError"] {
            if tag.take_attr(handler).is_some() {
                warnings.push(format!("Script `{}` handler removed; run it from a useEffect instead", handler));
            }
        }
    });

    finish(code, import, edits, true, Vec::new(), warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strategies() {
        let code = "import Script from 'next/script';\n<><Script src=\"/a.js\" strategy=\"lazyOnload\" /><Script src=\"/b.js\" onLoad={() => init()} /></>";
        let result = rewrite(code, &RewriteOptions::default());
        assert_eq!(
            result.code,
            "<><script src=\"/a.js\" defer /><script src=\"/b.js\" async /></>"
        );
        assert!(result.imports.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_inline_script_closing_tag() {
        let code = "import Script from 'next/script';\n<Script id=\"ga\" strategy=\"afterInteractive\">{`gtag()`}</Script>";
        let result = rewrite(code, &RewriteOptions::default());
        assert_eq!(result.code, "<script id=\"ga\" async>{`gtag()`}</script>");
    }
}
