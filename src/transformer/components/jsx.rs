//! Span-based editing helpers shared by the component rewriters
//!
//! Code is parsed once; nodes are located with SWC visitors and the edits
//! are spliced into the original text by byte offset, so everything the
//! rewriters do not touch is kept exactly as written.

use std::collections::HashSet;
use std::ops::Range;

use swc_core::common::{BytePos, Span, Spanned};
use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{Visit, VisitWith};
use tracing::debug;

use crate::models::{ComponentType, ParseError, RewriteResult};
use crate::transformer::ast::{string_literal, AstParser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsxAttr {
    /// Attribute name, or the whole `{...spread}` for spreads
    pub name: String,
    /// Raw value including its quotes or braces; `None` for bare flags
    pub value: Option<String>,
}

impl JsxAttr {
    pub fn new(name: &str, value: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            value: value.map(str::to_string),
        }
    }

    pub fn is_spread(&self) -> bool {
        self.name.starts_with('{')
    }

    /// Value without quotes when it is a plain string literal
    pub fn string_value(&self) -> Option<&str> {
        let value = self.value.as_deref()?;
        let bytes = value.as_bytes();
        if bytes.len() >= 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[bytes.len() - 1] == bytes[0] {
            Some(&value[1..value.len() - 1])
        } else {
            None
        }
    }

    /// `true` for `flag` and `flag={true}`
    pub fn is_truthy_flag(&self) -> bool {
        matches!(self.value.as_deref(), None | Some("{true}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningTag {
    pub start: usize,
    pub end: usize,
    pub attrs: Vec<JsxAttr>,
    pub self_closing: bool,
}

impl OpeningTag {
    pub fn attr(&self, name: &str) -> Option<&JsxAttr> {
        self.attrs.iter().find(|a| a.name == name)
    }

    pub fn take_attr(&mut self, name: &str) -> Option<JsxAttr> {
        let index = self.attrs.iter().position(|a| a.name == name)?;
        Some(self.attrs.remove(index))
    }

    pub fn render(&self, tag: &str) -> String {
        let mut out = format!("<{}", tag);
        for attr in &self.attrs {
            out.push(' ');
            out.push_str(&attr.name);
            if let Some(value) = &attr.value {
                out.push('=');
                out.push_str(value);
            }
        }
        out.push_str(if self.self_closing { " />" } else { ">" });
        out
    }
}

/// Replace `range` of the original text with `text`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub range: Range<usize>,
    pub text: String,
}

impl Edit {
    pub fn new(range: Range<usize>, text: impl Into<String>) -> Self {
        Self { range, text: text.into() }
    }
}

/// Apply non-overlapping edits; an edit overlapping an earlier one is dropped
pub fn apply_edits(code: &str, mut edits: Vec<Edit>) -> String {
    edits.sort_by_key(|e| (e.range.start, e.range.end));
    let mut out = String::with_capacity(code.len());
    let mut cursor = 0;
    for edit in edits {
        if edit.range.start < cursor || edit.range.end > code.len() {
            debug!("Dropping overlapping edit at {:?}", edit.range);
            continue;
        }
        out.push_str(&code[cursor..edit.range.start]);
        out.push_str(&edit.text);
        cursor = edit.range.end;
    }
    out.push_str(&code[cursor..]);
    out
}

/// A parsed module together with the text it came from
pub struct ParsedSource<'a> {
    pub code: &'a str,
    pub module: Module,
    base: BytePos,
}

impl<'a> ParsedSource<'a> {
    pub fn parse(code: &'a str) -> Result<Self, ParseError> {
        let (module, base) = AstParser::new().parse_spanned(code)?;
        Ok(Self { code, module, base })
    }

    /// Byte range of `span` in [`ParsedSource::code`]
    pub fn range(&self, span: Span) -> Range<usize> {
        let start = span.lo.0.saturating_sub(self.base.0) as usize;
        let end = span.hi.0.saturating_sub(self.base.0) as usize;
        start.min(self.code.len())..end.min(self.code.len())
    }

    pub fn text(&self, span: Span) -> &'a str {
        &self.code[self.range(span)]
    }

    /// `range` widened to its whole line when nothing else shares that line
    fn line_range(&self, range: Range<usize>) -> Range<usize> {
        let bytes = self.code.as_bytes();
        let mut start = range.start;
        while start > 0 && matches!(bytes[start - 1], b' ' | b'\t') {
            start -= 1;
        }
        let mut end = range.end;
        while end < bytes.len() && matches!(bytes[end], b' ' | b'\t') {
            end += 1;
        }

        let line_start = start == 0 || bytes[start - 1] == b'\n';
        let line_end = match bytes.get(end) {
            None => Some(end),
            Some(b'\n') => Some(end + 1),
            Some(b'\r') if bytes.get(end + 1) == Some(&b'\n') => Some(end + 2),
            _ => None,
        };
        match (line_start, line_end) {
            (true, Some(end)) => start..end,
            _ => range,
        }
    }

    /// The first default import of `module`
    pub fn default_import(&self, module: &str) -> Option<LegacyImport> {
        self.module.body.iter().find_map(|item| {
            let ModuleItem::ModuleDecl(ModuleDecl::Import(decl)) = item else {
                return None;
            };
            if string_literal(&decl.src) != module {
                return None;
            }
            let local = decl.specifiers.iter().find_map(|s| match s {
                ImportSpecifier::Default(default) => Some(default.local.sym.to_string()),
                _ => None,
            })?;

            let mut named = Vec::new();
            let mut namespace = None;
            for specifier in &decl.specifiers {
                match specifier {
                    ImportSpecifier::Default(_) => {}
                    ImportSpecifier::Named(_) => named.push(self.text(specifier.span()).to_string()),
                    ImportSpecifier::Namespace(_) => namespace = Some(self.text(specifier.span()).to_string()),
                }
            }

            let keyword = if decl.type_only { "import type" } else { "import" };
            let kept = match (namespace, named.is_empty()) {
                (Some(namespace), _) => Some(format!("{} {} from '{}';", keyword, namespace, module)),
                (None, false) => Some(format!("{} {{ {} }} from '{}';", keyword, named.join(", "), module)),
                (None, true) => None,
            };
            let removal = match &kept {
                Some(statement) => Edit::new(self.range(decl.span), statement.clone()),
                None => Edit::new(self.line_range(self.range(decl.span)), ""),
            };

            Some(LegacyImport {
                module: module.to_string(),
                local,
                kept,
                removal,
            })
        })
    }
}

/// The default import a rewriter replaces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyImport {
    pub module: String,
    /// Local name the default import binds
    pub local: String,
    /// Statement keeping the other specifiers of the same import
    pub kept: Option<String>,
    removal: Edit,
}

/// Parse `code` and find the default import of `component`'s legacy module.
/// `None` when the module is not imported that way or the code does not parse.
pub fn parse_with_import(code: &str, component: ComponentType) -> Option<(ParsedSource<'_>, LegacyImport)> {
    let module = component.legacy_import();
    if !code.contains(&module) {
        return None;
    }
    let source = match ParsedSource::parse(code) {
        Ok(source) => source,
        Err(e) => {
            debug!("Skipping {} rewrite: {}", component, e);
            return None;
        }
    };
    let import = source.default_import(&module)?;
    Some((source, import))
}

/// Apply `edits` and, when `remove_import` is set, drop the legacy default
/// import. Warnings are de-duplicated keeping their first occurrence.
pub fn finish(
    code: &str,
    import: LegacyImport,
    mut edits: Vec<Edit>,
    remove_import: bool,
    imports: Vec<String>,
    mut warnings: Vec<String>,
) -> RewriteResult {
    if remove_import {
        if let Some(kept) = &import.kept {
            warnings.push(format!(
                "Kept `{}`; these names still come from {} and need replacing by hand",
                kept, import.module
            ));
        }
        edits.push(import.removal);
    }

    let mut seen = HashSet::new();
    warnings.retain(|w| seen.insert(w.clone()));

    RewriteResult {
        code: apply_edits(code, edits),
        imports,
        warnings,
    }
}

struct TagCollector<'s, 'a> {
    source: &'s ParsedSource<'a>,
    name: &'s str,
    tags: Vec<OpeningTag>,
    closing: Vec<Range<usize>>,
}

impl TagCollector<'_, '_> {
    fn attr(&self, attr: &JSXAttrOrSpread) -> JsxAttr {
        match attr {
            JSXAttrOrSpread::JSXAttr(attr) => JsxAttr {
                name: self.source.text(attr.name.span()).to_string(),
                value: attr.value.as_ref().map(|v| self.source.text(v.span()).to_string()),
            },
            JSXAttrOrSpread::SpreadElement(spread) => {
                // The spread's span excludes its braces
                let code = self.source.code;
                let inner = self.source.range(spread.dot3_token.with_hi(spread.expr.span().hi));
                let start = code[..inner.start].rfind('{').unwrap_or(inner.start);
                let end = code[inner.end..].find('}').map_or(inner.end, |i| inner.end + i + 1);
                JsxAttr {
                    name: code[start..end].to_string(),
                    value: None,
                }
            }
        }
    }
}

impl Visit for TagCollector<'_, '_> {
    fn visit_jsx_element(&mut self, element: &JSXElement) {
        let matches = matches!(&element.opening.name, JSXElementName::Ident(ident) if &*ident.sym == self.name);
        if matches {
            let range = self.source.range(element.opening.span);
            self.tags.push(OpeningTag {
                start: range.start,
                end: range.end,
                attrs: element.opening.attrs.iter().map(|a| self.attr(a)).collect(),
                self_closing: element.opening.self_closing,
            });
            if let Some(closing) = &element.closing {
                self.closing.push(self.source.range(closing.span));
            }
        }
        element.visit_children_with(self);
    }
}

fn collect_tags(source: &ParsedSource<'_>, from: &str) -> (Vec<OpeningTag>, Vec<Range<usize>>) {
    let mut collector = TagCollector {
        source,
        name: from,
        tags: Vec::new(),
        closing: Vec::new(),
    };
    source.module.visit_with(&mut collector);
    (collector.tags, collector.closing)
}

/// Every `<from ...>` element in document order
pub fn find_opening_tags(source: &ParsedSource<'_>, from: &str) -> Vec<OpeningTag> {
    collect_tags(source, from).0
}

/// Edits renaming every `<from>` element to `to`, with each opening tag
/// passed through `edit` first. Also returns the number of elements.
pub fn rewrite_tags<F>(source: &ParsedSource<'_>, from: &str, to: &str, mut edit: F) -> (Vec<Edit>, usize)
where
    F: FnMut(&mut OpeningTag),
{
    let (tags, closing) = collect_tags(source, from);
    let count = tags.len();
    let mut edits = Vec::with_capacity(count + closing.len());
    for mut tag in tags {
        edit(&mut tag);
        edits.push(Edit::new(tag.start..tag.end, tag.render(to)));
    }
    for range in closing {
        edits.push(Edit::new(range, format!("</{}>", to)));
    }
    (edits, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_find_tags_with_arrow_attribute() {
        let code = r#"<Image src="/a.png" onLoad={() => setReady(x > 1)} priority />"#;
        let source = ParsedSource::parse(code).unwrap();
        let tags = find_opening_tags(&source, "Image");
        assert_eq!(tags.len(), 1);
        assert!(tags[0].self_closing);
        assert_eq!(tags[0].end, code.len());
        assert_eq!(
            tags[0].attrs,
            vec![
                JsxAttr::new("src", Some("\"/a.png\"")),
                JsxAttr::new("onLoad", Some("{() => setReady(x > 1)}")),
                JsxAttr::new("priority", None),
            ]
        );
    }

    #[test]
    fn test_find_tags_ignores_longer_names_and_keeps_spreads() {
        let code = "<><ImageGallery /><Image { ...props }>it's</Image></>";
        let source = ParsedSource::parse(code).unwrap();
        let tags = find_opening_tags(&source, "Image");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].attrs, vec![JsxAttr::new("{ ...props }", None)]);
        assert!(tags[0].attrs[0].is_spread());
        assert!(!tags[0].self_closing);
    }

    #[test]
    fn test_rewrite_tags_renames_closing_tags() {
        let code = "<NextLink href=\"/\">Don't <b>go</b></NextLink>";
        let source = ParsedSource::parse(code).unwrap();
        let (edits, count) = rewrite_tags(&source, "NextLink", "Link", |_| {});
        assert_eq!(apply_edits(code, edits), "<Link href=\"/\">Don't <b>go</b></Link>");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_default_import_removes_whole_line() {
        let code = "import React from 'react';\n  import Img from \"next/image\";\nconst a = 1;\n";
        let source = ParsedSource::parse(code).unwrap();
        let import = source.default_import("next/image").unwrap();
        assert_eq!(import.local, "Img");
        assert_eq!(import.kept, None);

        let result = finish(code, import, Vec::new(), true, Vec::new(), Vec::new());
        assert_eq!(result.code, "import React from 'react';\nconst a = 1;\n");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_default_import_keeps_named_specifiers() {
        let code = "import Image, { type ImageProps, getImageProps as props } from 'next/image';\nconst a = 1;\n";
        let source = ParsedSource::parse(code).unwrap();
        let import = source.default_import("next/image").unwrap();

        let result = finish(code, import, Vec::new(), true, Vec::new(), Vec::new());
        assert_eq!(
            result.code,
            "import { type ImageProps, getImageProps as props } from 'next/image';\nconst a = 1;\n"
        );
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("ImageProps"));
    }

    #[test]
    fn test_finish_dedupes_non_adjacent_warnings() {
        let code = "import Image from 'next/image';\n";
        let source = ParsedSource::parse(code).unwrap();
        let import = source.default_import("next/image").unwrap();
        let warnings = vec!["a".to_string(), "b".to_string(), "a".to_string(), "b".to_string()];

        let result = finish(code, import, Vec::new(), true, Vec::new(), warnings);
        assert_eq!(result.warnings, vec!["a", "b"]);
    }

    #[test]
    fn test_apply_edits_skips_overlaps() {
        let edits = vec![Edit::new(4..7, "X"), Edit::new(0..3, "abc"), Edit::new(5..6, "Y")];
        assert_eq!(apply_edits("012345678", edits), "abc3X78");
    }
}
