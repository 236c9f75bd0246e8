//! `next/link` → `react-router-dom` `<Link>`

use super::jsx::{finish, parse_with_import, rewrite_tags, JsxAttr};
use crate::models::{ComponentType, RewriteOptions, RewriteResult};

pub fn rewrite(code: &str, _options: &RewriteOptions) -> RewriteResult {
    let Some((source, import)) = parse_with_import(code, ComponentType::Link) else {
        return RewriteResult::unchanged(code);
    };

    let mut warnings = Vec::new();
    let (edits, _) = rewrite_tags(&source, &import.local, "Link", |tag| {
        if let Some(href) = tag.take_attr("href") {
            if href.value.as_deref().map_or(false, |v| v.starts_with("{{")) {
                warnings.push("Link with an object `href` must be converted to a path string by hand".to_string());
            }
            tag.attrs.insert(0, JsxAttr { name: "to".to_string(), value: href.value });
        }

        if tag.take_attr("as").is_some() {
            warnings.push("Link prop `as` was removed; `to` now holds the visible URL".to_string());
        }

        if let Some(scroll) = tag.take_attr("scroll") {
            if scroll.value.as_deref() == Some("{false}") {
                tag.attrs.push(JsxAttr::new("preventScrollReset", None));
            }
        }

        if tag.take_attr("legacyBehavior").is_some() {
            warnings.push("Link used legacyBehavior; move the child <a> props onto <Link>".to_string());
        }

        for prop in ["passHref", "prefetch", "shallow"] {
            tag.take_attr(prop);
        }

        if tag.take_attr("locale").is_some() {
            warnings.push("Link prop `locale` is not supported by react-router-dom".to_string());
        }
    });

    finish(
        code,
        import,
        edits,
        true,
        vec!["import { Link } from 'react-router-dom';".to_string()],
        warnings,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_href_becomes_to() {
        let code = "import Link from 'next/link';\nconst Nav = () => <Link href=\"/about\" prefetch={false} passHref>About</Link>;";
        let result = rewrite(code, &RewriteOptions::default());
        assert_eq!(result.code, "const Nav = () => <Link to=\"/about\">About</Link>;");
        assert_eq!(result.imports, vec!["import { Link } from 'react-router-dom';"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scroll_and_object_href() {
        let code = "import NextLink from 'next/link';\n<NextLink href={{ pathname: '/post', query: { id } }} scroll={false} locale=\"fr\">x</NextLink>";
        let result = rewrite(code, &RewriteOptions::default());
        assert!(result.code.starts_with("<Link to={{ pathname: '/post', query: { id } }} preventScrollReset>x</Link>"));
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_apostrophes_in_children() {
        let code = "import Link from 'next/link';\nconst Nav = () => <nav><Link href=\"/a\">Don't</Link><Link href=\"/b\">It's</Link></nav>;";
        let result = rewrite(code, &RewriteOptions::default());
        assert_eq!(
            result.code,
            "const Nav = () => <nav><Link to=\"/a\">Don't</Link><Link to=\"/b\">It's</Link></nav>;"
        );
    }
}
