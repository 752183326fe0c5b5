//! Curator decisions on verses and on individual aligned words.
//!
//! Decisions are keyed by `(work, chapter, verse[, position])` and refer to
//! columns by position, so they stay valid only while the column layout of a
//! verse is unchanged.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::KeyValueStore;
use crate::error::CollationError;
use crate::types::ChapterCollationResult;

const DECISION_PREFIX: &str = "decisions";
const UNQUALIFIED: &str = "unqualified";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseDecision {
    pub verse_number: usize,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub notes: String,
    /// Witness pairs the curator judged equivalent, as `"1-2"` style labels.
    #[serde(default)]
    pub equivalences: Vec<String>,
    #[serde(default)]
    pub selected_reading: Option<String>,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordAction {
    #[default]
    #[serde(alias = "conserver")]
    Keep,
    #[serde(alias = "ignorer")]
    Ignore,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordDecision {
    pub verse_number: usize,
    /// Column index within the verse alignment.
    pub position: usize,
    #[serde(default)]
    pub action: WordAction,
    #[serde(default, alias = "explication")]
    pub explanation: Option<String>,
    #[serde(default)]
    pub words: Vec<String>,
    /// Page reference per witness name.
    #[serde(default)]
    pub pages: BTreeMap<String, String>,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterDecisions {
    pub work_id: String,
    pub chapter_index: usize,
    pub verses: Vec<VerseDecision>,
    pub words: Vec<WordDecision>,
    pub last_modified: Option<String>,
}

impl ChapterDecisions {
    pub fn verse(&self, verse_number: usize) -> Option<&VerseDecision> {
        self.verses.iter().find(|d| d.verse_number == verse_number)
    }

    pub fn word(&self, verse_number: usize, position: usize) -> Option<&WordDecision> {
        self.words
            .iter()
            .find(|d| d.verse_number == verse_number && d.position == position)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionStatistics {
    pub total_decisions: usize,
    /// Verse decisions per qualification; a missing one counts as `unqualified`.
    pub qualifications: BTreeMap<String, usize>,
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ChapterMeta {
    last_modified: Option<String>,
}

type ChapterKey = (String, usize);

/// Decisions persisted in a [`KeyValueStore`].
///
/// Writes for one `(work, chapter)` are serialized by a per-chapter lock so a
/// decision save and its chapter bookkeeping cannot interleave with another
/// save on the same chapter. A lock lives only while some write on its chapter
/// is running or waiting.
pub struct DecisionRepository {
    store: Arc<dyn KeyValueStore>,
    chapter_locks: Mutex<HashMap<ChapterKey, Arc<Mutex<()>>>>,
}

impl DecisionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            chapter_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn save_verse_decision(
        &self,
        work_id: &str,
        chapter: usize,
        mut decision: VerseDecision,
    ) -> Result<DecisionStatistics, CollationError> {
        if decision.verse_number == 0 {
            return Err(CollationError::invalid_input("verse numbers start at 1"));
        }
        let now = timestamp();
        decision.timestamp = now.clone();
        self.with_chapter(work_id, chapter, || {
            let key = verse_key(work_id, chapter, decision.verse_number);
            self.store.put(&key, encode(&decision, "encode verse decision")?)?;
            self.touch(work_id, chapter, now)?;
            self.statistics_unlocked(work_id, chapter)
        })
    }

    pub fn delete_verse_decision(
        &self,
        work_id: &str,
        chapter: usize,
        verse_number: usize,
    ) -> Result<bool, CollationError> {
        self.with_chapter(work_id, chapter, || {
            let removed = self
                .store
                .delete(&verse_key(work_id, chapter, verse_number))?;
            if removed {
                self.touch(work_id, chapter, timestamp())?;
            }
            Ok(removed)
        })
    }

    pub fn verse_decision(
        &self,
        work_id: &str,
        chapter: usize,
        verse_number: usize,
    ) -> Result<Option<VerseDecision>, CollationError> {
        self.store
            .get(&verse_key(work_id, chapter, verse_number))?
            .map(|value| decode(value, "decode verse decision"))
            .transpose()
    }

    pub fn save_word_decision(
        &self,
        work_id: &str,
        chapter: usize,
        mut decision: WordDecision,
    ) -> Result<(), CollationError> {
        if decision.verse_number == 0 {
            return Err(CollationError::invalid_input("verse numbers start at 1"));
        }
        let now = timestamp();
        decision.timestamp = now.clone();
        self.with_chapter(work_id, chapter, || {
            let key = word_key(work_id, chapter, decision.verse_number, decision.position);
            self.store.put(&key, encode(&decision, "encode word decision")?)?;
            self.touch(work_id, chapter, now)
        })
    }

    pub fn delete_word_decision(
        &self,
        work_id: &str,
        chapter: usize,
        verse_number: usize,
        position: usize,
    ) -> Result<bool, CollationError> {
        self.with_chapter(work_id, chapter, || {
            let removed = self
                .store
                .delete(&word_key(work_id, chapter, verse_number, position))?;
            if removed {
                self.touch(work_id, chapter, timestamp())?;
            }
            Ok(removed)
        })
    }

    pub fn load_chapter(
        &self,
        work_id: &str,
        chapter: usize,
    ) -> Result<ChapterDecisions, CollationError> {
        self.with_chapter(work_id, chapter, || self.load_unlocked(work_id, chapter))
    }

    pub fn statistics(
        &self,
        work_id: &str,
        chapter: usize,
    ) -> Result<DecisionStatistics, CollationError> {
        self.with_chapter(work_id, chapter, || {
            self.statistics_unlocked(work_id, chapter)
        })
    }

    fn with_chapter<T>(
        &self,
        work_id: &str,
        chapter: usize,
        f: impl FnOnce() -> Result<T, CollationError>,
    ) -> Result<T, CollationError> {
        let key = (work_id.to_string(), chapter);
        let lock = {
            let mut locks = self.chapter_locks.lock().map_err(CollationError::store)?;
            locks.entry(key.clone()).or_default().clone()
        };
        let result = {
            let _guard = lock.lock().map_err(CollationError::store)?;
            f()
        };

        // Clones are only taken under the map lock, so a count of two means
        // no other caller holds or waits on this chapter.
        let mut locks = self.chapter_locks.lock().map_err(CollationError::store)?;
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&key);
        }
        result
    }

    fn touch(&self, work_id: &str, chapter: usize, now: String) -> Result<(), CollationError> {
        let meta = ChapterMeta {
            last_modified: Some(now),
        };
        self.store
            .put(&meta_key(work_id, chapter), encode(&meta, "encode chapter meta")?)
    }

    fn load_unlocked(
        &self,
        work_id: &str,
        chapter: usize,
    ) -> Result<ChapterDecisions, CollationError> {
        let verses = self
            .store
            .list_prefix(&format!("{}/verse/", chapter_prefix(work_id, chapter)))?
            .into_iter()
            .map(|(_, value)| decode(value, "decode verse decision"))
            .collect::<Result<Vec<VerseDecision>, _>>()?;
        let words = self
            .store
            .list_prefix(&format!("{}/word/", chapter_prefix(work_id, chapter)))?
            .into_iter()
            .map(|(_, value)| decode(value, "decode word decision"))
            .collect::<Result<Vec<WordDecision>, _>>()?;
        let meta: ChapterMeta = self
            .store
            .get(&meta_key(work_id, chapter))?
            .map(|value| decode(value, "decode chapter meta"))
            .transpose()?
            .unwrap_or_default();
        Ok(ChapterDecisions {
            work_id: work_id.to_string(),
            chapter_index: chapter,
            verses,
            words,
            last_modified: meta.last_modified,
        })
    }

    fn statistics_unlocked(
        &self,
        work_id: &str,
        chapter: usize,
    ) -> Result<DecisionStatistics, CollationError> {
        let decisions = self.load_unlocked(work_id, chapter)?;
        let mut qualifications = BTreeMap::new();
        for decision in &decisions.verses {
            let label = decision
                .qualification
                .as_deref()
                .filter(|q| !q.is_empty())
                .unwrap_or(UNQUALIFIED);
            *qualifications.entry(label.to_string()).or_insert(0) += 1;
        }
        Ok(DecisionStatistics {
            total_decisions: decisions.verses.len(),
            qualifications,
            last_modified: decisions.last_modified,
        })
    }
}

/// Attaches stored decisions to a collation result by verse number and
/// column position. Existing overlays are replaced.
pub fn apply_overlay(result: &mut ChapterCollationResult, decisions: &ChapterDecisions) {
    for verse in &mut result.verses {
        verse.user_decision = decisions.verse(verse.verse_number).cloned();
        for column in &mut verse.word_alignment {
            column.word_decision = decisions.word(verse.verse_number, column.index).cloned();
        }
    }
}

fn chapter_prefix(work_id: &str, chapter: usize) -> String {
    format!("{DECISION_PREFIX}/{work_id}/{chapter}")
}

fn verse_key(work_id: &str, chapter: usize, verse_number: usize) -> String {
    format!("{}/verse/{verse_number:06}", chapter_prefix(work_id, chapter))
}

fn word_key(work_id: &str, chapter: usize, verse_number: usize, position: usize) -> String {
    format!(
        "{}/word/{verse_number:06}/{position:06}",
        chapter_prefix(work_id, chapter)
    )
}

fn meta_key(work_id: &str, chapter: usize) -> String {
    format!("{}/meta", chapter_prefix(work_id, chapter))
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn encode<T: Serialize>(value: &T, context: &'static str) -> Result<Value, CollationError> {
    serde_json::to_value(value).map_err(|e| CollationError::json(context, e))
}

fn decode<T: for<'de> Deserialize<'de>>(
    value: Value,
    context: &'static str,
) -> Result<T, CollationError> {
    serde_json::from_value(value).map_err(|e| CollationError::json(context, e))
}
