//! Ordered text-rewrite rules for Next.js → Vite migration
//!
//! Rules are chained: each rule is tested against the output of the rules
//! before it, so list order is part of the rule set's meaning.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::models::ConversionOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    pub const ALL: [Complexity; 3] = [Complexity::Simple, Complexity::Medium, Complexity::Complex];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    Component,
    Routing,
    DataFetching,
    Api,
    Config,
    General,
}

impl RuleCategory {
    pub const ALL: [RuleCategory; 6] = [
        RuleCategory::Component,
        RuleCategory::Routing,
        RuleCategory::DataFetching,
        RuleCategory::Api,
        RuleCategory::Config,
        RuleCategory::General,
    ];
}

pub type ReplaceFn = Arc<dyn Fn(&Captures) -> String + Send + Sync>;

/// Replacement text for a rule's matches
#[derive(Clone)]
pub enum Replacement {
    /// Template text; `$1` / `${name}` expand to capture groups
    Literal(String),
    /// Computed per match
    Computed(ReplaceFn),
}

impl std::fmt::Debug for Replacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Replacement::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Replacement::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformationRule {
    pub pattern: Regex,
    pub replacement: Replacement,
    pub description: String,
    pub complexity: Complexity,
    pub category: RuleCategory,
}

impl TransformationRule {
    pub fn literal(
        pattern: &str,
        replacement: &str,
        description: &str,
        complexity: Complexity,
        category: RuleCategory,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: Replacement::Literal(replacement.to_string()),
            description: description.to_string(),
            complexity,
            category,
        })
    }

    pub fn computed<F>(
        pattern: &str,
        replacement: F,
        description: &str,
        complexity: Complexity,
        category: RuleCategory,
    ) -> Result<Self, regex::Error>
    where
        F: Fn(&Captures) -> String + Send + Sync + 'static,
    {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: Replacement::Computed(Arc::new(replacement)),
            description: description.to_string(),
            complexity,
            category,
        })
    }

    pub fn matches(&self, code: &str) -> bool {
        self.pattern.is_match(code)
    }

    /// Substitute every match. `None` when the pattern does not match.
    fn apply(&self, code: &str) -> Option<String> {
        if !self.pattern.is_match(code) {
            return None;
        }
        let replaced = match &self.replacement {
            Replacement::Literal(template) => self.pattern.replace_all(code, template.as_str()),
            Replacement::Computed(f) => self.pattern.replace_all(code, |caps: &Captures| f(caps)),
        };
        Some(replaced.into_owned())
    }
}

/// Result of running the whole rule list over one text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub code: String,
    pub applied: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleStats {
    pub total_rules: usize,
    pub applied_rules: usize,
    pub modification_rate: f64,
    pub complexity: BTreeMap<Complexity, usize>,
    pub categories: BTreeMap<RuleCategory, usize>,
}

/// Fixed, ordered rule list shared read-only across every file of a run
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<TransformationRule>,
}

impl RuleEngine {
    pub fn new(rules: Vec<TransformationRule>) -> Self {
        Self { rules }
    }

    /// The built-in Next.js → Vite rule set
    pub fn next_to_vite() -> Self {
        Self::new(NEXT_TO_VITE_RULES.clone())
    }

    /// Built-in rules minus the categories switched off in `options`
    pub fn for_options(options: &ConversionOptions) -> Self {
        let rules = NEXT_TO_VITE_RULES
            .iter()
            .filter(|rule| options.transform_data_fetching || rule.category != RuleCategory::DataFetching)
            .filter(|rule| options.use_react_router || rule.category != RuleCategory::Routing)
            .cloned()
            .collect();
        Self::new(rules)
    }

    pub fn rules(&self) -> &[TransformationRule] {
        &self.rules
    }

    /// Run every rule once, in order, each against the current text
    pub fn apply_all(&self, source: &str) -> RuleOutcome {
        let mut code = source.to_string();
        let mut applied = Vec::new();

        for rule in &self.rules {
            if let Some(next) = rule.apply(&code) {
                code = next;
                applied.push(rule.description.clone());
            }
        }

        RuleOutcome { code, applied }
    }

    pub fn by_complexity(&self, complexity: Complexity) -> Vec<&TransformationRule> {
        self.rules.iter().filter(|r| r.complexity == complexity).collect()
    }

    pub fn by_category(&self, category: RuleCategory) -> Vec<&TransformationRule> {
        self.rules.iter().filter(|r| r.category == category).collect()
    }

    /// Count which rules match `source` without applying any of them
    pub fn stats(&self, source: &str) -> RuleStats {
        let mut complexity: BTreeMap<Complexity, usize> =
            Complexity::ALL.iter().map(|c| (*c, 0)).collect();
        let mut categories: BTreeMap<RuleCategory, usize> =
            RuleCategory::ALL.iter().map(|c| (*c, 0)).collect();
        let mut applied_rules = 0;

        for rule in self.rules.iter().filter(|r| r.matches(source)) {
            applied_rules += 1;
            *complexity.entry(rule.complexity).or_default() += 1;
            *categories.entry(rule.category).or_default() += 1;
        }

        let total_rules = self.rules.len();
        RuleStats {
            total_rules,
            applied_rules,
            modification_rate: if total_rules == 0 {
                0.0
            } else {
                applied_rules as f64 / total_rules as f64
            },
            complexity,
            categories,
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::next_to_vite()
    }
}

/// `next/navigation` hook names mapped to their React Router equivalents
fn navigation_import(caps: &Captures) -> String {
    let mut names: Vec<&str> = Vec::new();
    for name in caps[1].split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let mapped = match name {
            "useRouter" => "useNavigate",
            "usePathname" => "useLocation",
            "useSearchParams" => "useSearchParams",
            "useParams" => "useParams",
            "redirect" | "notFound" => "useNavigate",
            _ => continue,
        };
        if !names.contains(&mapped) {
            names.push(mapped);
        }
    }
    if names.is_empty() {
        return String::new();
    }
    format!("import {{ {} }} from 'react-router-dom';", names.join(", "))
}

fn data_fetching_export(caps: &Captures) -> String {
    let asyncness = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    format!(
        "/* next2vite: {} runs at build/request time in Next.js; load this data client-side */\n{}function {}",
        &caps[2], asyncness, &caps[2]
    )
}

lazy_static! {
    static ref NEXT_TO_VITE_RULES: Vec<TransformationRule> = build_rules();
}

fn build_rules() -> Vec<TransformationRule> {
    use Complexity::*;
    use RuleCategory::*;

    let rules = [
        TransformationRule::literal(
            r#"(?m)^[ \t]*['"]use (?:client|server)['"];?[ \t]*\r?\n?"#,
            "",
            "Removed 'use client' / 'use server' directive",
            Simple,
            General,
        ),
        TransformationRule::literal(
            r#"import\s*\{\s*useRouter\s*\}\s*from\s*['"]next/router['"];?"#,
            "import { useNavigate, useParams, useLocation } from 'react-router-dom';",
            "Replaced next/router import with react-router-dom hooks",
            Medium,
            Routing,
        ),
        TransformationRule::computed(
            r#"import\s*\{([^}]*)\}\s*from\s*['"]next/navigation['"];?"#,
            navigation_import,
            "Replaced next/navigation import with react-router-dom hooks",
            Medium,
            Routing,
        ),
        TransformationRule::literal(
            r"const\s+router\s*=\s*useRouter\(\)",
            "const navigate = useNavigate()",
            "Converted useRouter() to useNavigate()",
            Medium,
            Routing,
        ),
        TransformationRule::literal(
            r"\brouter\.push\(",
            "navigate(",
            "Converted router.push() to navigate()",
            Simple,
            Routing,
        ),
        TransformationRule::literal(
            r"\brouter\.replace\(([^()]*)\)",
            "navigate(${1}, { replace: true })",
            "Converted router.replace() to navigate(..., { replace: true })",
            Medium,
            Routing,
        ),
        TransformationRule::literal(
            r"\brouter\.back\(\)",
            "navigate(-1)",
            "Converted router.back() to navigate(-1)",
            Simple,
            Routing,
        ),
        TransformationRule::literal(
            r"=\s*router\.query\b",
            "= useParams()",
            "Converted router.query to useParams()",
            Medium,
            Routing,
        ),
        TransformationRule::literal(
            r"\brouter\.(?:pathname|asPath)\b",
            "useLocation().pathname",
            "Converted router.pathname to useLocation().pathname",
            Medium,
            Routing,
        ),
        TransformationRule::literal(
            r"\busePathname\(\)",
            "useLocation().pathname",
            "Converted usePathname() to useLocation().pathname",
            Simple,
            Routing,
        ),
        TransformationRule::literal(
            r"process\.env\.NEXT_PUBLIC_(\w+)",
            "import.meta.env.VITE_${1}",
            "Converted NEXT_PUBLIC_ environment variables to import.meta.env.VITE_",
            Simple,
            Config,
        ),
        TransformationRule::literal(
            r#"import\s+getConfig\s+from\s*['"]next/config['"];?"#,
            "// runtime config now comes from import.meta.env",
            "Removed next/config import",
            Medium,
            Config,
        ),
        TransformationRule::literal(
            r"getConfig\(\)\.(?:publicRuntimeConfig|serverRuntimeConfig)",
            "import.meta.env",
            "Converted getConfig() runtime config to import.meta.env",
            Medium,
            Config,
        ),
        TransformationRule::computed(
            r"export\s+(async\s+)?function\s+(getStaticProps|getServerSideProps|getStaticPaths)\b",
            data_fetching_export,
            "Unexported Next.js data-fetching function for client-side loading",
            Complex,
            DataFetching,
        ),
        TransformationRule::literal(
            r"export\s+const\s+(getStaticProps|getServerSideProps|getStaticPaths)\b",
            "/* next2vite: ${1} must be replaced with client-side data loading */\nconst ${1}",
            "Unexported Next.js data-fetching constant for client-side loading",
            Complex,
            DataFetching,
        ),
        TransformationRule::literal(
            r#"import\s+(?:type\s+)?\{\s*NextApiRequest\s*,\s*NextApiResponse\s*\}\s*from\s*['"]next['"];?"#,
            "import type { Request, Response } from 'express';",
            "Replaced Next.js API types import with express types",
            Medium,
            Api,
        ),
        TransformationRule::literal(
            r"\bNextApiRequest\b",
            "Request",
            "Renamed NextApiRequest to Request",
            Simple,
            Api,
        ),
        TransformationRule::literal(
            r"\bNextApiResponse\b",
            "Response",
            "Renamed NextApiResponse to Response",
            Simple,
            Api,
        ),
        TransformationRule::literal(
            r#"import\s+(?:type\s+)?\{\s*NextPage\s*\}\s*from\s*['"]next['"];?"#,
            "import type { FC } from 'react';",
            "Replaced NextPage import with React FC",
            Simple,
            Component,
        ),
        TransformationRule::literal(
            r"\bNextPage\b",
            "FC",
            "Renamed NextPage to FC",
            Simple,
            Component,
        ),
        TransformationRule::literal(
            r#"import\s+(?:type\s+)?\{\s*AppProps\s*\}\s*from\s*['"]next/app['"];?"#,
            "import type { ComponentType } from 'react';\ntype AppProps = { Component: ComponentType<any>; pageProps: any };",
            "Replaced next/app AppProps with a local type",
            Medium,
            Component,
        ),
        TransformationRule::literal(
            r#"import\s+\{[^}]*\}\s+from\s*['"]next/font/(google|local)['"];?"#,
            "/* next/font/${1} removed: load fonts with a stylesheet or @fontsource */",
            "Removed next/font import",
            Medium,
            General,
        ),
    ];

    rules
        .into_iter()
        .map(|rule| rule.expect("built-in rule patterns are valid"))
        .collect()
}
