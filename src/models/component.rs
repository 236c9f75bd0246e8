//! Component analysis and rewrite records

use serde::Serialize;

/// Namespace prefix of the legacy framework's imports
pub const LEGACY_NAMESPACE: &str = "next";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Functional,
    Class,
    Unknown,
}

/// Summary of the primary component declared in one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedComponent {
    pub name: String,
    pub kind: ComponentKind,
    pub imports: Vec<String>,
    pub legacy_imports: Vec<String>,
    pub props: Vec<String>,
}

impl AnalyzedComponent {
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            kind: ComponentKind::Unknown,
            imports: Vec::new(),
            legacy_imports: Vec::new(),
            props: Vec::new(),
        }
    }
}

/// Legacy framework components that have a dedicated rewriter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Image,
    Link,
    Head,
    Script,
    Dynamic,
}

impl ComponentType {
    pub const ALL: [ComponentType; 5] = [
        ComponentType::Image,
        ComponentType::Link,
        ComponentType::Head,
        ComponentType::Script,
        ComponentType::Dynamic,
    ];

    /// Look up a component type by its tag, case-insensitively
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "image" => Some(ComponentType::Image),
            "link" => Some(ComponentType::Link),
            "head" => Some(ComponentType::Head),
            "script" => Some(ComponentType::Script),
            "dynamic" => Some(ComponentType::Dynamic),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ComponentType::Image => "image",
            ComponentType::Link => "link",
            ComponentType::Head => "head",
            ComponentType::Script => "script",
            ComponentType::Dynamic => "dynamic",
        }
    }

    /// Import path of the legacy module, e.g. `next/image`
    pub fn legacy_import(&self) -> String {
        format!("{}/{}", LEGACY_NAMESPACE, self.tag())
    }

    /// Markup tag names recognised as usages of this component
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            ComponentType::Image => &["Image", "NextImage", "LegacyImage"],
            ComponentType::Link => &["Link", "NextLink"],
            ComponentType::Head => &["Head", "NextHead"],
            ComponentType::Script => &["Script", "NextScript"],
            ComponentType::Dynamic => &["dynamic"],
        }
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// How one legacy component is used in one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentUsage {
    pub used: bool,
    pub count: usize,
    pub imports: Vec<String>,
}

/// Output of a component rewriter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    pub code: String,
    /// Import statements the caller must insert
    pub imports: Vec<String>,
    pub warnings: Vec<String>,
}

impl RewriteResult {
    pub fn unchanged(code: &str) -> Self {
        Self {
            code: code.to_string(),
            imports: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Settings for the component rewriters
#[derive(Debug, Clone)]
pub struct RewriteOptions {
    /// Package providing the replacement `<Image>` component
    pub image_package: String,
    /// Markup rendered while a lazily loaded component resolves
    pub lazy_fallback: String,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            image_package: "@unpic/react".to_string(),
            lazy_fallback: "null".to_string(),
        }
    }
}

/// A legacy component replaced in one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentReplacement {
    pub file: String,
    pub component: ComponentType,
    pub count: usize,
}
