//! SWC-backed parsing and syntax-tree helpers

pub mod parser;

pub use parser::AstParser;

use swc_core::ecma::ast::{PropName, Str};

/// Text of a string literal as written, without its quotes
pub(crate) fn string_literal(lit: &Str) -> String {
    match lit.raw.as_deref() {
        Some(raw) if raw.len() >= 2 => raw[1..raw.len() - 1].to_string(),
        _ => String::new(),
    }
}

/// Name of an object key written as an identifier or a string
pub(crate) fn prop_key(key: &PropName) -> Option<String> {
    match key {
        PropName::Ident(ident) => Some(ident.sym.to_string()),
        PropName::Str(lit) => Some(string_literal(lit)),
        _ => None,
    }
}
