use std::path::Path;

use serde_json::Value;

use crate::config::CollatorConfig;
use crate::error::CollationError;
use crate::types::VerseRecord;

/// A witness transcription: a list of chapters, each a list of verses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WitnessDocument {
    name: String,
    chapters: Vec<Vec<VerseRecord>>,
}

impl WitnessDocument {
    pub fn new(name: impl Into<String>, chapters: Vec<Vec<VerseRecord>>) -> Self {
        Self {
            name: name.into(),
            chapters,
        }
    }

    pub fn load(name: impl Into<String>, path: &Path) -> Result<Self, CollationError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| CollationError::io("read witness file", e))?;
        Self::from_json_str(name, &data)
    }

    /// Items that are not objects with a string `text` are skipped.
    pub fn from_json_str(name: impl Into<String>, data: &str) -> Result<Self, CollationError> {
        let name = name.into();
        let raw: Vec<Vec<Value>> =
            serde_json::from_str(data).map_err(|e| CollationError::json("parse witness file", e))?;

        let chapters = raw
            .into_iter()
            .enumerate()
            .map(|(chapter, items)| {
                items
                    .into_iter()
                    .enumerate()
                    .filter_map(|(item, value)| {
                        let has_text = value.get("text").is_some_and(Value::is_string);
                        let parsed = if has_text {
                            serde_json::from_value::<VerseRecord>(value).ok()
                        } else {
                            None
                        };
                        if parsed.is_none() {
                            tracing::warn!(
                                witness = %name,
                                chapter,
                                item,
                                "skipping witness item without verse text"
                            );
                        }
                        parsed
                    })
                    .collect()
            })
            .collect();

        Ok(Self { name, chapters })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    /// Verses of the 0-based chapter `index`.
    pub fn chapter(&self, index: usize) -> Result<&[VerseRecord], CollationError> {
        self.chapters
            .get(index)
            .map(Vec::as_slice)
            .ok_or_else(|| CollationError::ChapterNotFound {
                witness: self.name.clone(),
                chapter: index,
                available: self.chapters.len(),
            })
    }

    /// Chapter `index` restricted to the regions the config allows.
    pub fn filtered_chapter(
        &self,
        index: usize,
        config: &CollatorConfig,
    ) -> Result<Vec<VerseRecord>, CollationError> {
        Ok(self
            .chapter(index)?
            .iter()
            .filter(|verse| config.region_allowed(&verse.metadata.region))
            .cloned()
            .collect())
    }
}
