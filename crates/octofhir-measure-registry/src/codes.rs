//! Code sets

use octofhir_measure_model::normalize_code;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A set of normalized clinical codes with optional prefix matches
///
/// Prefixes cover code families such as ICD-10 `C18` (all colon cancer
/// codes). Codes not in the set never match and never raise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "CodeSetDef", into = "CodeSetDef")]
pub struct CodeSet {
    codes: BTreeSet<String>,
    prefixes: Vec<String>,
}

impl CodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from exact codes
    pub fn from_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            codes: codes.into_iter().filter_map(|c| normalize_code(c.as_ref())).collect(),
            prefixes: Vec::new(),
        }
    }

    /// Add prefix matches
    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.prefixes
            .extend(prefixes.into_iter().filter_map(|p| normalize_code(p.as_ref())));
        self.prefixes.sort();
        self.prefixes.dedup();
        self
    }

    /// Test an already-normalized code
    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code) || self.prefixes.iter().any(|p| code.starts_with(p.as_str()))
    }

    /// Test an optional record code
    pub fn matches(&self, code: Option<&str>) -> bool {
        code.is_some_and(|c| self.contains(c))
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty() && self.prefixes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.codes.len() + self.prefixes.len()
    }
}

/// Wire form: a bare list of codes or `{codes, prefixes}`
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum CodeSetDef {
    List(Vec<String>),
    Full {
        #[serde(default)]
        codes: Vec<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        prefixes: Vec<String>,
    },
}

impl From<CodeSetDef> for CodeSet {
    fn from(def: CodeSetDef) -> Self {
        match def {
            CodeSetDef::List(codes) => CodeSet::from_codes(codes),
            CodeSetDef::Full { codes, prefixes } => CodeSet::from_codes(codes).with_prefixes(prefixes),
        }
    }
}

impl From<CodeSet> for CodeSetDef {
    fn from(set: CodeSet) -> Self {
        CodeSetDef::Full {
            codes: set.codes.into_iter().collect(),
            prefixes: set.prefixes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn colorectal() -> CodeSet {
        CodeSet::from_codes(["Z90.49"]).with_prefixes(["C18", "C19", "C20", "C21"])
    }

    #[rstest]
    #[case("Z9049", true)]
    #[case("C189", true)]
    #[case("C20", true)]
    #[case("C17", false)]
    #[case("Z904", false)]
    fn test_contains(#[case] code: &str, #[case] expected: bool) {
        assert_eq!(colorectal().contains(code), expected);
    }

    #[test]
    fn test_matches_none() {
        assert!(!colorectal().matches(None));
    }

    #[test]
    fn test_deserialize_list_and_object() {
        let list: CodeSet = serde_json::from_str(r#"["77067", "77065"]"#).unwrap();
        assert!(list.contains("77067"));
        assert_eq!(list.len(), 2);

        let full: CodeSet =
            serde_json::from_str(r#"{"codes": ["k70.3"], "prefixes": ["K74"]}"#).unwrap();
        assert!(full.contains("K703"));
        assert!(full.contains("K7460"));
    }
}
