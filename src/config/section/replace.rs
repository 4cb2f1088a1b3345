//! `[[replace]]` entries: literal substitutions applied to a served file.
//!
//! # Example
//!
//! ```toml
//! [[replace]]
//! file = "config.json"
//! items = { "127.0.0.1" = "api.example.com" }
//! ```
//!
//! Items of one entry are replaced in a single pass, so one item's output is
//! never matched by another. When the same file appears in several entries,
//! the last one wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplaceItem {
    /// Asset path relative to the root, e.g. `config.json`.
    pub file: String,

    /// `from = "to"` pairs.
    #[serde(default)]
    pub items: BTreeMap<String, String>,
}

impl ReplaceItem {
    pub const FILE: FieldPath = FieldPath::new("replace.file");
    pub const ITEMS: FieldPath = FieldPath::new("replace.items");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.file.trim_matches('/').is_empty() {
            diag.error(Self::FILE, "file must not be empty");
        }
        if self.items.keys().any(String::is_empty) {
            diag.error(
                Self::ITEMS,
                format!("`{}`: cannot replace an empty string", self.file),
            );
        }
        if self.items.is_empty() {
            diag.warn(Self::ITEMS, format!("`{}` has no items", self.file));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_parse_replace_entries() {
        let config = test_parse_config(
            "[[replace]]\nfile = \"config.json\"\nitems = { \"127.0.0.1\" = \"api.example.com\" }\n\n[[replace]]\nfile = \"env.js\"\n[replace.items]\n__ENV__ = \"prod\"",
        );

        assert_eq!(config.replace.len(), 2);
        assert_eq!(config.replace[0].file, "config.json");
        assert_eq!(
            config.replace[0].items.get("127.0.0.1").map(String::as_str),
            Some("api.example.com")
        );
        assert_eq!(config.replace[1].items["__ENV__"], "prod");
    }

    #[test]
    fn test_validate_replace() {
        let mut diag = ConfigDiagnostics::new();
        let item = ReplaceItem {
            file: "/".into(),
            items: BTreeMap::from([(String::new(), "x".into())]),
        };
        item.validate(&mut diag);
        assert_eq!(diag.len(), 2);

        let mut diag = ConfigDiagnostics::new();
        ReplaceItem {
            file: "a.js".into(),
            items: BTreeMap::new(),
        }
        .validate(&mut diag);
        assert!(diag.is_empty());
        assert_eq!(diag.warnings().len(), 1);
    }
}
