use std::collections::{HashMap, HashSet};

/// Prefix of every canonical variable name.
pub const CANONICAL_PREFIX: &str = "VAR";

/// Replacement text for abstracted literals.
pub const LITERAL_SENTINEL: &str = "LITERAL";

/// Mapping from original identifier text to canonical names `VAR0`, `VAR1`, ...
///
/// Names are handed out in first-seen order. A map seeded from an earlier
/// traversal keeps its assignments and continues the counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableNameMap {
    names: HashMap<String, String>,
    canonical: HashSet<String>,
}

impl VariableNameMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, original: &str) -> Option<&str> {
        self.names.get(original).map(String::as_str)
    }

    /// Canonical name for `original`, assigning the next free one if unseen.
    pub fn assign(&mut self, original: &str) -> &str {
        if !self.names.contains_key(original) {
            let name = format!("{CANONICAL_PREFIX}{}", self.names.len());
            self.canonical.insert(name.clone());
            self.names.insert(original.to_string(), name);
        }
        &self.names[original]
    }

    /// Whether `name` is one of the canonical names handed out by this map.
    #[must_use]
    pub fn is_canonical(&self, name: &str) -> bool {
        self.canonical.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `(original, canonical)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `(original, canonical)` pairs ordered by canonical index.
    #[must_use]
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_by_key(|(_, canonical)| canonical_index(canonical));
        pairs
    }

    #[must_use]
    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.names
    }
}

/// Numeric suffix of a canonical name (`VAR12` → 12).
#[must_use]
pub fn canonical_index(name: &str) -> Option<usize> {
    name.strip_prefix(CANONICAL_PREFIX)?.parse().ok()
}

/// Whether `name` has the shape of a canonical name, regardless of any map.
#[must_use]
pub fn looks_canonical(name: &str) -> bool {
    canonical_index(name).is_some()
}
