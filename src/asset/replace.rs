//! Per-file content substitution applied before a body is sent.
//!
//! Rules never affect content identities: etags are computed from the
//! bytes on disk (or in the bundle), not from the transformed output.

use std::fmt;
use std::sync::Arc;

use aho_corasick::{AhoCorasickBuilder, BuildError, MatchKind};
use rustc_hash::FxHashMap;

use crate::config::ReplaceItem;

/// Pure byte transform attached to one path.
#[derive(Clone)]
pub struct ReplacementRule {
    transform: Arc<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>,
}

impl ReplacementRule {
    pub fn new(transform: impl Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static) -> Self {
        Self {
            transform: Arc::new(transform),
        }
    }

    /// Literal substitutions applied in a single pass over the body.
    ///
    /// Patterns are matched leftmost-longest and replaced simultaneously, so
    /// text inserted by one substitution is never matched by another.
    pub fn substitutions<F, T>(
        pairs: impl IntoIterator<Item = (F, T)>,
    ) -> Result<Self, BuildError>
    where
        F: Into<Vec<u8>>,
        T: Into<Vec<u8>>,
    {
        let (from, to): (Vec<Vec<u8>>, Vec<Vec<u8>>) = pairs
            .into_iter()
            .map(|(from, to)| (from.into(), to.into()))
            .filter(|(from, _)| !from.is_empty())
            .unzip();

        if from.is_empty() {
            return Ok(Self::new(<[u8]>::to_vec));
        }

        let matcher = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostLongest)
            .build(&from)?;
        Ok(Self::new(move |input| matcher.replace_all_bytes(input, &to)))
    }

    pub fn apply(&self, input: &[u8]) -> Vec<u8> {
        (self.transform)(input)
    }
}

impl fmt::Debug for ReplacementRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ReplacementRule(..)")
    }
}

/// Rules keyed by asset path (`config.json`, `js/env.js`).
#[derive(Debug, Clone, Default)]
pub struct ReplacementRules {
    rules: FxHashMap<String, ReplacementRule>,
}

impl ReplacementRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build rules from `[[replace]]` config entries. A file listed twice
    /// keeps only its last entry.
    pub fn from_config(items: &[ReplaceItem]) -> Result<Self, BuildError> {
        let mut rules = Self::new();
        for item in items {
            let pairs = item
                .items
                .iter()
                .map(|(from, to)| (from.as_bytes().to_vec(), to.as_bytes().to_vec()));
            rules.insert(&item.file, ReplacementRule::substitutions(pairs)?);
        }
        Ok(rules)
    }

    /// Register a rule; replaces any rule already registered for `path`.
    pub fn insert(&mut self, path: &str, rule: ReplacementRule) {
        self.rules.insert(normalize_key(path), rule);
    }

    pub fn get(&self, path: &str) -> Option<&ReplacementRule> {
        self.rules.get(path)
    }

    /// Pass `body` through the rule for `path`, if any.
    pub fn apply(&self, path: &str, body: Vec<u8>) -> Vec<u8> {
        match self.rules.get(path) {
            Some(rule) => rule.apply(&body),
            None => body,
        }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn normalize_key(path: &str) -> String {
    path.replace('\\', "/").trim_matches('/').to_string()
}
