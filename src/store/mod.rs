//! Curator state consumed around the collation core.
//!
//! The core never reads this state while aligning. Equivalences feed chapter
//! statistics; decisions are overlaid onto finished results by the caller.
//! Both sit on an injected [`KeyValueStore`], so they can be exercised without
//! touching the file system.

pub mod decisions;
pub mod equivalence;
mod memory;

use serde_json::Value;

use crate::error::CollationError;

pub use decisions::{
    apply_overlay, ChapterDecisions, DecisionRepository, DecisionStatistics, VerseDecision,
    WordAction, WordDecision,
};
pub use equivalence::{Equivalence, EquivalenceRegistry, EquivalenceSet};
pub use memory::InMemoryStore;

/// Key-value repository with prefix listing. Keys are `/`-separated paths.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, CollationError>;

    fn put(&self, key: &str, value: Value) -> Result<(), CollationError>;

    /// Returns whether a value was removed.
    fn delete(&self, key: &str) -> Result<bool, CollationError>;

    /// Entries whose key starts with `prefix`, in ascending key order.
    fn list_prefix(&self, prefix: &str) -> Result<Vec<(String, Value)>, CollationError>;
}
