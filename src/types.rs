use serde::{Deserialize, Deserializer, Serialize};

use crate::store::decisions::{VerseDecision, WordDecision};

/// Number of witnesses compared by one collation.
pub const WITNESS_COUNT: usize = 3;

/// Word-level unit of a verse.
///
/// `display` is the literal substring of the witness text; `normalized` is the
/// comparison key produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub display: String,
    pub normalized: String,
}

/// Pass-through metadata attached to a verse by the transcription.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseMetadata {
    #[serde(default)]
    pub region: String,
    #[serde(default, alias = "alto_id")]
    pub source_id: String,
    #[serde(default, alias = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub page: String,
}

/// One verse of one witness as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseRecord {
    pub text: String,
    #[serde(flatten)]
    pub metadata: VerseMetadata,
}

impl VerseRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            metadata: VerseMetadata::default(),
        }
    }
}

/// One witness slot of an [`AlignmentColumn`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCell {
    pub witness_index: usize,
    pub text: String,
    pub normalized: String,
    pub missing: bool,
}

impl WordCell {
    pub fn present(witness_index: usize, token: &Token) -> Self {
        Self {
            witness_index,
            text: token.display.clone(),
            normalized: token.normalized.clone(),
            missing: false,
        }
    }

    pub fn gap(witness_index: usize) -> Self {
        Self {
            witness_index,
            text: String::new(),
            normalized: String::new(),
            missing: true,
        }
    }
}

/// One aligned position across the three witnesses.
///
/// `words` always holds exactly one cell per witness, in witness order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentColumn {
    pub index: usize,
    pub words: [WordCell; WITNESS_COUNT],
    pub has_variant: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_decision: Option<WordDecision>,
}

impl AlignmentColumn {
    pub fn new(index: usize, slots: [Option<&Token>; WITNESS_COUNT]) -> Self {
        let words = [0, 1, 2].map(|witness_index| match slots[witness_index] {
            Some(token) => WordCell::present(witness_index, token),
            None => WordCell::gap(witness_index),
        });
        let has_variant = column_has_variant(&words);
        Self {
            index,
            words,
            has_variant,
            word_decision: None,
        }
    }

    pub fn missing_count(&self) -> usize {
        self.words.iter().filter(|w| w.missing).count()
    }
}

/// A gap counts as its own reading, so a witness lacking the word disagrees
/// with the others, even one whose word normalizes to nothing.
fn column_has_variant(words: &[WordCell; WITNESS_COUNT]) -> bool {
    fn reading(w: &WordCell) -> (bool, &str) {
        (w.missing, w.normalized.as_str())
    }
    let first = reading(&words[0]);
    words.iter().skip(1).any(|w| reading(w) != first)
}

/// How the columns of a verse were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentMethod {
    /// All normalized witness texts were equal; no alignment was needed.
    Identical,
    /// Progressive pairwise dynamic-programming alignment.
    Progressive,
    /// Naive index zipping after an alignment failure. Low confidence.
    Positional,
}

impl AlignmentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Identical => "identical",
            Self::Progressive => "progressive",
            Self::Positional => "positional",
        }
    }

    pub fn is_naive(self) -> bool {
        self == Self::Positional
    }
}

/// A witness's verse as it appears in the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessReading {
    pub name: String,
    pub text: String,
    pub text_normalized: String,
    pub metadata: VerseMetadata,
    /// The witness has no verse at this index.
    pub missing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairSimilarity {
    pub left: usize,
    pub right: usize,
    pub score: f64,
}

impl PairSimilarity {
    pub fn label(&self) -> String {
        format!("{}-{}", self.left, self.right)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerseCollationResult {
    /// 1-based verse number within the chapter.
    pub verse_number: usize,
    pub witnesses: [WitnessReading; WITNESS_COUNT],
    pub is_identical: bool,
    pub has_variants: bool,
    pub similarities: Vec<PairSimilarity>,
    pub word_alignment: Vec<AlignmentColumn>,
    pub variant_word_count: usize,
    pub alignment_method: AlignmentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_decision: Option<VerseDecision>,
}

impl VerseCollationResult {
    pub fn similarity(&self, left: usize, right: usize) -> Option<f64> {
        self.similarities
            .iter()
            .find(|s| s.left == left && s.right == right)
            .map(|s| s.score)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterCollationResult {
    pub witnesses: [String; WITNESS_COUNT],
    pub chapter: usize,
    pub total_verses: usize,
    pub verses: Vec<VerseCollationResult>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}
