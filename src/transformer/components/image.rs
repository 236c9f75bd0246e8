//! `next/image` → `@unpic/react` `<Image>`

use super::jsx::{finish, parse_with_import, rewrite_tags, JsxAttr};
use crate::models::{ComponentType, RewriteOptions, RewriteResult};

/// Props with no counterpart that are dropped outright
const DROPPED_PROPS: &[&str] = &["quality", "loader", "unoptimized", "objectFit", "objectPosition", "lazyBoundary", "lazyRoot"];

pub fn rewrite(code: &str, options: &RewriteOptions) -> RewriteResult {
    let Some((source, import)) = parse_with_import(code, ComponentType::Image) else {
        return RewriteResult::unchanged(code);
    };

    let mut warnings = Vec::new();
    let (edits, _) = rewrite_tags(&source, &import.local, "Image", |tag| {
        if let Some(fill) = tag.take_attr("fill") {
            if fill.is_truthy_flag() {
                tag.attrs.push(JsxAttr::new("layout", Some("\"fullWidth\"")));
                warnings.push("Image prop `fill` approximated with layout=\"fullWidth\"".to_string());
            }
        }

        if let Some(layout) = tag.take_attr("layout") {
            let mapped = match layout.string_value() {
                Some("fill") | Some("fullWidth") => Some("fullWidth"),
                Some("responsive") | Some("intrinsic") | Some("constrained") => Some("constrained"),
                Some("fixed") => Some("fixed"),
                _ => None,
            };
            match mapped {
                Some(value) => {
                    if layout.string_value() != Some(value) {
                        warnings.push(format!(
                            "Image layout={} mapped to layout=\"{}\"",
                            layout.value.as_deref().unwrap_or_default(),
                            value
                        ));
                    }
                    tag.attrs.push(JsxAttr::new("layout", Some(&format!("\"{}\"", value))));
                }
                None => tag.attrs.push(layout),
            }
        }

        if tag.take_attr("placeholder").is_some() | tag.take_attr("blurDataURL").is_some() {
            warnings.push("Image blur placeholder is not supported; use the `background` prop instead".to_string());
        }

        for prop in DROPPED_PROPS {
            if tag.take_attr(prop).is_some() {
                warnings.push(format!("Image prop `{}` has no equivalent and was removed", prop));
            }
        }

        let sized = tag.attr("width").is_some() && tag.attr("height").is_some();
        let spread = tag.attrs.iter().any(JsxAttr::is_spread);
        if !sized && tag.attr("layout").is_none() && !spread {
            warnings.push("Image without width/height needs a `layout` prop".to_string());
        }
    });

    finish(
        code,
        import,
        edits,
        true,
        vec![format!("import {{ Image }} from '{}';", options.image_package)],
        warnings,
    )
}
