//! AST Parser for JavaScript and TypeScript
//!
//! Wraps the SWC parser. Input that only parses with recovered errors is
//! treated as malformed.

use std::path::Path;

use swc_core::common::{sync::Lrc, BytePos, FileName, FilePathMapping, SourceMap, GLOBALS};
use swc_core::ecma::ast::Module;
use swc_core::ecma::parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use crate::models::ParseError;

/// AST parser with TypeScript and JSX support
pub struct AstParser {
    source_map: Lrc<SourceMap>,
}

impl AstParser {
    pub fn new() -> Self {
        Self {
            source_map: Lrc::new(SourceMap::new(FilePathMapping::empty())),
        }
    }

    /// Parse a module with both markup and type-annotation syntax enabled
    pub fn parse(&self, code: &str) -> Result<Module, ParseError> {
        self.parse_with(code, "input.tsx", Self::markup_syntax(true))
            .map(|(module, _)| module)
    }

    /// Like [`AstParser::parse`], also returning the position of the first
    /// byte of `code`, so node spans can be mapped back to byte offsets.
    pub fn parse_spanned(&self, code: &str) -> Result<(Module, BytePos), ParseError> {
        self.parse_with(code, "input.tsx", Self::markup_syntax(true))
    }

    /// Parse a module, choosing the syntax from the file extension:
    /// - `.ts` → TypeScript
    /// - `.tsx` → TypeScript with JSX
    /// - `.js`, `.jsx` or other → JavaScript with JSX
    pub fn parse_file(&self, code: &str, path: &str) -> Result<Module, ParseError> {
        self.parse_with(code, path, self.detect_syntax(Path::new(path)))
            .map(|(module, _)| module)
    }

    fn parse_with(&self, code: &str, name: &str, syntax: Syntax) -> Result<(Module, BytePos), ParseError> {
        GLOBALS.set(&Default::default(), || {
            let source_file = self
                .source_map
                .new_source_file(FileName::Custom(name.to_string()).into(), code.to_string());

            let input = StringInput::from(&*source_file);
            let mut parser = Parser::new(syntax, input, None);

            let module = parser.parse_module().map_err(|e| ParseError {
                file: name.to_string(),
                reason: format!("{:?}", e.kind()),
            })?;

            if let Some(error) = parser.take_errors().into_iter().next() {
                return Err(ParseError {
                    file: name.to_string(),
                    reason: format!("{:?}", error.kind()),
                });
            }

            Ok((module, source_file.start_pos))
        })
    }

    fn markup_syntax(tsx: bool) -> Syntax {
        Syntax::Typescript(TsSyntax {
            tsx,
            decorators: true,
            no_early_errors: true,
            ..Default::default()
        })
    }

    /// Detect syntax mode based on file extension
    fn detect_syntax(&self, path: &Path) -> Syntax {
        match path.extension().and_then(|s| s.to_str()) {
            Some("ts") | Some("mts") | Some("cts") => Self::markup_syntax(false),
            Some("tsx") => Self::markup_syntax(true),
            _ => Syntax::Es(EsSyntax {
                jsx: true,
                export_default_from: true,
                import_attributes: true,
                ..Default::default()
            }),
        }
    }
}

impl Default for AstParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_markup_and_types() {
        let parser = AstParser::new();
        let code = "type Props = { title: string };\nexport const Card = ({ title }: Props) => <h1>{title}</h1>;";
        assert!(parser.parse(code).is_ok());
    }

    #[test]
    fn test_parse_failure_is_an_error() {
        let parser = AstParser::new();
        let result = parser.parse("export default function ( {");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_spanned_maps_back_to_offsets() {
        let parser = AstParser::new();
        parser.parse("const warmup = 1;").unwrap();

        let code = "import a from 'a';\nconst b = a;";
        let (module, base) = parser.parse_spanned(code).unwrap();
        let span = match &module.body[1] {
            swc_core::ecma::ast::ModuleItem::Stmt(stmt) => swc_core::common::Spanned::span(stmt),
            _ => panic!("Expected a statement"),
        };
        let start = (span.lo.0 - base.0) as usize;
        let end = (span.hi.0 - base.0) as usize;
        assert_eq!(&code[start..end], "const b = a;");
    }

    #[test]
    fn test_parse_file_uses_extension() {
        let parser = AstParser::new();
        // Generic arrow functions are only unambiguous without JSX
        assert!(parser.parse_file("const id = <T,>(x: T): T => x;", "util.ts").is_ok());
        assert!(parser.parse_file("const el = <div />;", "page.jsx").is_ok());
    }

    #[test]
    fn test_syntax_detection() {
        let parser = AstParser::new();

        match parser.detect_syntax(Path::new("test.ts")) {
            Syntax::Typescript(config) => assert!(!config.tsx),
            _ => panic!("Expected TypeScript syntax"),
        }

        match parser.detect_syntax(Path::new("test.tsx")) {
            Syntax::Typescript(config) => assert!(config.tsx),
            _ => panic!("Expected TypeScript with JSX syntax"),
        }

        match parser.detect_syntax(Path::new("test.js")) {
            Syntax::Es(config) => assert!(config.jsx),
            _ => panic!("Expected ES syntax"),
        }
    }
}
