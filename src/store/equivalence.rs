use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::KeyValueStore;
use crate::error::CollationError;
use crate::types::AlignmentColumn;

pub const EQUIVALENCE_PREFIX: &str = "equivalence/";

/// An unordered pair of tokens a curator declared interchangeable.
///
/// Both sides are lowercased and stored in sorted order, so `(a, b)` and
/// `(b, a)` are the same equivalence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Equivalence {
    pub left: String,
    pub right: String,
}

impl Equivalence {
    pub fn new(a: &str, b: &str) -> Self {
        let a = a.to_lowercase();
        let b = b.to_lowercase();
        if a <= b {
            Self { left: a, right: b }
        } else {
            Self { left: b, right: a }
        }
    }

    fn key(&self) -> String {
        format!("{EQUIVALENCE_PREFIX}{}|{}", self.left, self.right)
    }
}

/// Read-only snapshot of the declared equivalences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquivalenceSet {
    pairs: BTreeSet<Equivalence>,
}

impl EquivalenceSet {
    pub fn insert(&mut self, a: &str, b: &str) -> bool {
        self.pairs.insert(Equivalence::new(a, b))
    }

    /// Equal tokens are always equivalent.
    pub fn are_equivalent(&self, a: &str, b: &str) -> bool {
        a.to_lowercase() == b.to_lowercase() || self.pairs.contains(&Equivalence::new(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Equivalence> {
        self.pairs.iter()
    }

    /// A variant column is explained when every witness has a word and all
    /// of their normalized forms are pairwise equivalent.
    pub fn explains(&self, column: &AlignmentColumn) -> bool {
        if !column.has_variant || column.words.iter().any(|w| w.missing) {
            return false;
        }
        column.words.iter().enumerate().all(|(i, left)| {
            column.words[i + 1..]
                .iter()
                .all(|right| self.are_equivalent(&left.normalized, &right.normalized))
        })
    }
}

impl FromIterator<Equivalence> for EquivalenceSet {
    fn from_iter<I: IntoIterator<Item = Equivalence>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// Equivalences persisted in a [`KeyValueStore`].
pub struct EquivalenceRegistry {
    store: Arc<dyn KeyValueStore>,
}

impl EquivalenceRegistry {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn add(&self, a: &str, b: &str) -> Result<Equivalence, CollationError> {
        let equivalence = Equivalence::new(a, b);
        let value = serde_json::to_value(&equivalence)
            .map_err(|e| CollationError::json("encode equivalence", e))?;
        self.store.put(&equivalence.key(), value)?;
        tracing::debug!(
            left = equivalence.left.as_str(),
            right = equivalence.right.as_str(),
            "equivalence: added"
        );
        Ok(equivalence)
    }

    pub fn remove(&self, a: &str, b: &str) -> Result<bool, CollationError> {
        self.store.delete(&Equivalence::new(a, b).key())
    }

    pub fn are_equivalent(&self, a: &str, b: &str) -> Result<bool, CollationError> {
        if a.to_lowercase() == b.to_lowercase() {
            return Ok(true);
        }
        Ok(self.store.get(&Equivalence::new(a, b).key())?.is_some())
    }

    pub fn list(&self) -> Result<Vec<Equivalence>, CollationError> {
        self.store
            .list_prefix(EQUIVALENCE_PREFIX)?
            .into_iter()
            .map(|(_, value)| {
                serde_json::from_value(value)
                    .map_err(|e| CollationError::json("decode equivalence", e))
            })
            .collect()
    }

    pub fn snapshot(&self) -> Result<EquivalenceSet, CollationError> {
        Ok(self.list()?.into_iter().collect())
    }
}
