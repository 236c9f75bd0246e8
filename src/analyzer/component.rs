//! Component detection and legacy-component usage analysis
//!
//! Declarations are reduced to a [`Candidate`] at the tree-walk boundary, so
//! the detection rules only ever look at one well-typed shape.

use swc_core::ecma::ast::*;
use swc_core::ecma::visit::{Visit, VisitWith};
use tracing::debug;

use crate::models::{AnalyzedComponent, ComponentKind, ComponentType, ComponentUsage, LEGACY_NAMESPACE};
use crate::transformer::ast::{prop_key, string_literal, AstParser};

/// A declaration that could be the file's primary component
#[derive(Debug, Clone, Copy)]
enum Candidate<'a> {
    /// Function declaration, or variable bound to an arrow / function expression
    Function { name: &'a str, param: Option<&'a Pat> },
    /// Class extending `Component` or `React.Component`
    Class { name: &'a str },
}

impl<'a> Candidate<'a> {
    fn from_fn_decl(decl: &'a FnDecl) -> Option<Self> {
        let name = &*decl.ident.sym;
        is_component_name(name).then(|| Candidate::Function {
            name,
            param: decl.function.params.first().map(|p| &p.pat),
        })
    }

    fn from_var_declarator(decl: &'a VarDeclarator) -> Option<Self> {
        let Pat::Ident(binding) = &decl.name else {
            return None;
        };
        let name = &*binding.id.sym;
        if !is_component_name(name) {
            return None;
        }
        let param = match decl.init.as_deref()? {
            Expr::Arrow(arrow) => arrow.params.first(),
            Expr::Fn(func) => func.function.params.first().map(|p| &p.pat),
            _ => return None,
        };
        Some(Candidate::Function { name, param })
    }

    fn from_class(ident: Option<&'a Ident>, class: &'a Class) -> Option<Self> {
        let name = &*ident?.sym;
        extends_base_component(class.super_class.as_deref()).then_some(Candidate::Class { name })
    }

    fn from_default_export(decl: &'a ExportDefaultDecl) -> Option<Self> {
        match &decl.decl {
            DefaultDecl::Fn(func) => {
                let name = &*func.ident.as_ref()?.sym;
                is_component_name(name).then(|| Candidate::Function {
                    name,
                    param: func.function.params.first().map(|p| &p.pat),
                })
            }
            DefaultDecl::Class(class) => Self::from_class(class.ident.as_ref(), &class.class),
            _ => None,
        }
    }
}

fn is_component_name(name: &str) -> bool {
    name.chars().next().map_or(false, |c| c.is_uppercase())
}

fn extends_base_component(super_class: Option<&Expr>) -> bool {
    match super_class {
        Some(Expr::Ident(ident)) => &*ident.sym == "Component",
        Some(Expr::Member(member)) => {
            let namespace_matches = matches!(&*member.obj, Expr::Ident(obj) if &*obj.sym == "React");
            let property_matches = matches!(&member.prop, MemberProp::Ident(prop) if &*prop.sym == "Component");
            namespace_matches && property_matches
        }
        _ => false,
    }
}

/// Prop names declared by a component's first parameter.
///
/// `props` yields `["props"]`, `{ a, b, ...rest }` yields `["a", "b", "...rest"]`,
/// any other parameter shape yields nothing.
pub fn extract_props(param: &Pat) -> Vec<String> {
    match param {
        Pat::Ident(binding) => vec![binding.id.sym.to_string()],
        Pat::Object(object) => object
            .props
            .iter()
            .filter_map(|prop| match prop {
                ObjectPatProp::KeyValue(kv) => prop_key(&kv.key),
                ObjectPatProp::Assign(assign) => Some(assign.key.sym.to_string()),
                ObjectPatProp::Rest(rest) => match &*rest.arg {
                    Pat::Ident(binding) => Some(format!("...{}", binding.id.sym)),
                    _ => None,
                },
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[derive(Default)]
struct ImportCollector {
    sources: Vec<String>,
}

impl Visit for ImportCollector {
    fn visit_import_decl(&mut self, decl: &ImportDecl) {
        self.sources.push(string_literal(&decl.src));
    }
}

/// Records the first candidate in traversal order; later ones are ignored
#[derive(Default)]
struct ComponentVisitor {
    name: Option<String>,
    kind: Option<ComponentKind>,
    props: Vec<String>,
}

impl ComponentVisitor {
    fn offer(&mut self, candidate: Option<Candidate<'_>>) {
        if self.name.is_some() {
            return;
        }
        match candidate {
            Some(Candidate::Function { name, param }) => {
                self.name = Some(name.to_string());
                self.kind = Some(ComponentKind::Functional);
                self.props = param.map(extract_props).unwrap_or_default();
            }
            Some(Candidate::Class { name }) => {
                self.name = Some(name.to_string());
                self.kind = Some(ComponentKind::Class);
            }
            None => {}
        }
    }
}

impl Visit for ComponentVisitor {
    fn visit_fn_decl(&mut self, decl: &FnDecl) {
        self.offer(Candidate::from_fn_decl(decl));
        decl.visit_children_with(self);
    }

    fn visit_var_declarator(&mut self, decl: &VarDeclarator) {
        self.offer(Candidate::from_var_declarator(decl));
        decl.visit_children_with(self);
    }

    fn visit_class_decl(&mut self, decl: &ClassDecl) {
        self.offer(Candidate::from_class(Some(&decl.ident), &decl.class));
        decl.visit_children_with(self);
    }

    fn visit_export_default_decl(&mut self, decl: &ExportDefaultDecl) {
        self.offer(Candidate::from_default_export(decl));
        decl.visit_children_with(self);
    }
}

/// Local names bound by imports of one legacy module
struct LegacyImportVisitor {
    source: String,
    imports: Vec<String>,
    locals: Vec<String>,
}

impl Visit for LegacyImportVisitor {
    fn visit_import_decl(&mut self, decl: &ImportDecl) {
        let source = string_literal(&decl.src);
        if source != self.source {
            return;
        }
        for specifier in &decl.specifiers {
            let local = match specifier {
                ImportSpecifier::Default(s) => &s.local,
                ImportSpecifier::Named(s) => &s.local,
                ImportSpecifier::Namespace(s) => &s.local,
            };
            self.locals.push(local.sym.to_string());
        }
        self.imports.push(source);
    }
}

/// Counts markup elements (and, for `dynamic`, calls) naming the component
struct UsageCounter<'a> {
    names: Vec<&'a str>,
    count_calls: bool,
    count: usize,
}

impl UsageCounter<'_> {
    fn is_tracked(&self, name: &str) -> bool {
        self.names.iter().any(|n| *n == name)
    }
}

impl Visit for UsageCounter<'_> {
    fn visit_jsx_opening_element(&mut self, element: &JSXOpeningElement) {
        if let JSXElementName::Ident(ident) = &element.name {
            if self.is_tracked(&ident.sym) {
                self.count += 1;
            }
        }
        element.visit_children_with(self);
    }

    fn visit_call_expr(&mut self, call: &CallExpr) {
        if self.count_calls {
            if let Callee::Expr(callee) = &call.callee {
                if let Expr::Ident(ident) = &**callee {
                    if self.is_tracked(&ident.sym) {
                        self.count += 1;
                    }
                }
            }
        }
        call.visit_children_with(self);
    }
}

/// Analyzes one file's primary component and its legacy-component usage
pub struct ComponentAnalyzer;

impl ComponentAnalyzer {
    /// Classify the file's primary component, or `None` when there is none
    /// or the file does not parse.
    pub fn analyze(code: &str) -> Option<AnalyzedComponent> {
        let module = match AstParser::new().parse(code) {
            Ok(module) => module,
            Err(e) => {
                debug!("Skipping component analysis: {}", e);
                return None;
            }
        };

        let mut result = AnalyzedComponent::empty();

        let mut imports = ImportCollector::default();
        module.visit_with(&mut imports);
        let legacy_prefix = format!("{}/", LEGACY_NAMESPACE);
        result.legacy_imports = imports
            .sources
            .iter()
            .filter(|s| s.starts_with(&legacy_prefix))
            .cloned()
            .collect();
        result.imports = imports.sources;

        let mut visitor = ComponentVisitor::default();
        module.visit_with(&mut visitor);

        result.name = visitor.name?;
        result.kind = visitor.kind.unwrap_or(ComponentKind::Unknown);
        result.props = visitor.props;
        Some(result)
    }

    /// How `component` is used in `code`. Parse failures and unknown
    /// components report "unused".
    pub fn analyze_component_usage(code: &str, component: ComponentType) -> ComponentUsage {
        let legacy_import = component.legacy_import();
        if !code.contains(&legacy_import) {
            return ComponentUsage::default();
        }

        let module = match AstParser::new().parse(code) {
            Ok(module) => module,
            Err(e) => {
                debug!("Skipping {} usage analysis: {}", component, e);
                return ComponentUsage::default();
            }
        };

        let mut imports = LegacyImportVisitor {
            source: legacy_import,
            imports: Vec::new(),
            locals: Vec::new(),
        };
        module.visit_with(&mut imports);

        if imports.imports.is_empty() {
            return ComponentUsage::default();
        }

        let mut names: Vec<&str> = component.aliases().to_vec();
        names.extend(imports.locals.iter().map(String::as_str));
        let mut counter = UsageCounter {
            names,
            count_calls: component == ComponentType::Dynamic,
            count: 0,
        };
        module.visit_with(&mut counter);

        ComponentUsage {
            used: true,
            count: counter.count,
            imports: imports.imports,
        }
    }

    /// [`ComponentAnalyzer::analyze_component_usage`] keyed by a type tag
    pub fn analyze_usage_by_tag(code: &str, tag: &str) -> ComponentUsage {
        match ComponentType::from_tag(tag) {
            Some(component) => Self::analyze_component_usage(code, component),
            None => ComponentUsage::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn first_param(code: &str) -> Vec<String> {
        let module = AstParser::new().parse(code).unwrap();
        let mut visitor = ComponentVisitor::default();
        module.visit_with(&mut visitor);
        visitor.props
    }

    #[test]
    fn test_function_component_with_identifier_props() {
        let analyzed = ComponentAnalyzer::analyze(
            "import Link from 'next/link';\nimport React from 'react';\nexport default function Home(props) { return <div />; }",
        )
        .unwrap();
        assert_eq!(analyzed.name, "Home");
        assert_eq!(analyzed.kind, ComponentKind::Functional);
        assert_eq!(analyzed.props, vec!["props"]);
        assert_eq!(analyzed.imports, vec!["next/link", "react"]);
        assert_eq!(analyzed.legacy_imports, vec!["next/link"]);
    }

    #[test]
    fn test_arrow_component_with_destructured_props() {
        let props = first_param("const Card = ({ a, b, ...rest }) => <div {...rest}>{a}{b}</div>;");
        assert_eq!(props, vec!["a", "b", "...rest"]);
    }

    #[test]
    fn test_typed_destructured_props_with_defaults() {
        let analyzed = ComponentAnalyzer::analyze(
            "type P = { title: string; size?: number };\nexport const Button = function ({ title, size = 2 }: P) { return null; };",
        )
        .unwrap();
        assert_eq!(analyzed.name, "Button");
        assert_eq!(analyzed.props, vec!["title", "size"]);
    }

    #[test]
    fn test_unsupported_param_shape_yields_no_props() {
        let props = first_param("function List([first, second]) { return null; }");
        assert!(props.is_empty());
    }

    #[test]
    fn test_class_component() {
        let analyzed = ComponentAnalyzer::analyze(
            "import React from 'react';\nclass Counter extends React.Component { render() { return null; } }",
        )
        .unwrap();
        assert_eq!(analyzed.name, "Counter");
        assert_eq!(analyzed.kind, ComponentKind::Class);
        assert!(analyzed.props.is_empty());
    }

    #[test]
    fn test_class_not_extending_component_is_ignored() {
        assert!(ComponentAnalyzer::analyze("class Store extends Base {}").is_none());
    }

    #[test]
    fn test_first_match_wins() {
        let analyzed = ComponentAnalyzer::analyze(
            "function Header({ title }) { return null; }\nexport default function Page(props) { return null; }",
        )
        .unwrap();
        assert_eq!(analyzed.name, "Header");
        assert_eq!(analyzed.props, vec!["title"]);
    }

    #[test]
    fn test_no_component_found() {
        assert!(ComponentAnalyzer::analyze("export function helper() { return 1; }\nconst value = 2;").is_none());
    }

    #[test]
    fn test_parse_failure_returns_none() {
        assert!(ComponentAnalyzer::analyze("export default function Broken( {").is_none());
    }

    #[test]
    fn test_usage_counts_markup_elements() {
        let code = r#"
import Image from 'next/image';
export default function Gallery() {
  return <div><Image src="/a.png" /><Image src="/b.png" /><img src="/c.png" /></div>;
}
"#;
        let usage = ComponentAnalyzer::analyze_component_usage(code, ComponentType::Image);
        assert!(usage.used);
        assert_eq!(usage.count, 2);
        assert_eq!(usage.imports, vec!["next/image"]);
    }

    #[test]
    fn test_usage_follows_renamed_import() {
        let code = "import NextLink from 'next/link';\nexport const Nav = () => <NextLink href=\"/\">Home</NextLink>;";
        let usage = ComponentAnalyzer::analyze_component_usage(code, ComponentType::Link);
        assert_eq!(usage.count, 1);
    }

    #[test]
    fn test_usage_skips_parse_without_legacy_import() {
        let usage = ComponentAnalyzer::analyze_component_usage("this is not { valid code", ComponentType::Head);
        assert_eq!(usage, ComponentUsage::default());
    }

    #[test]
    fn test_usage_requires_exact_import_path() {
        let code = "import Image from 'next/image-loader';\nconst A = () => <Image />;";
        let usage = ComponentAnalyzer::analyze_component_usage(code, ComponentType::Image);
        assert!(!usage.used);
        assert_eq!(usage.count, 0);
    }

    #[test]
    fn test_dynamic_usage_counts_calls() {
        let code = "import dynamic from 'next/dynamic';\nconst Chart = dynamic(() => import('./Chart'));\nconst Map = dynamic(() => import('./Map'), { ssr: false });";
        let usage = ComponentAnalyzer::analyze_component_usage(code, ComponentType::Dynamic);
        assert!(usage.used);
        assert_eq!(usage.count, 2);
    }

    #[test]
    fn test_usage_parse_failure_is_unused() {
        let code = "import Head from 'next/head';\nexport default function ( {";
        assert!(!ComponentAnalyzer::analyze_component_usage(code, ComponentType::Head).used);
    }

    #[test]
    fn test_unknown_tag_is_unused() {
        let usage = ComponentAnalyzer::analyze_usage_by_tag("import X from 'next/font';", "font");
        assert!(!usage.used);
    }
}
