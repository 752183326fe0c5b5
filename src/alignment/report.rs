use serde::{Deserialize, Serialize};

use crate::store::equivalence::EquivalenceSet;
use crate::types::{ChapterCollationResult, WITNESS_COUNT};

pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Witness pairs in scoring order.
pub const WITNESS_PAIRS: [(usize, usize); 3] = [(0, 1), (0, 2), (1, 2)];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollationReport {
    pub schema_version: u32,
    pub meta: Meta,
    pub chapters: Vec<ChapterCollationResult>,
    pub statistics: Vec<ChapterStatistics>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub generated_at: String,
    pub witnesses: [String; WITNESS_COUNT],
    pub chapter_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterStatistics {
    pub chapter: usize,
    pub total_verses: usize,
    pub identical_verses: usize,
    pub verses_with_variants: usize,
    pub variant_columns: usize,
    /// Variant columns whose readings are all declared equivalent.
    pub equivalent_columns: usize,
    /// Verses that fell back to positional zipping.
    pub naive_alignments: usize,
    pub mean_similarity: Vec<PairMean>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairMean {
    pub left: usize,
    pub right: usize,
    /// Number of verses scored for this pair.
    pub scored_verses: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
}

pub fn compute_chapter_statistics(
    result: &ChapterCollationResult,
    equivalences: &EquivalenceSet,
) -> ChapterStatistics {
    let verses = &result.verses;
    let identical_verses = verses.iter().filter(|v| v.is_identical).count();
    let verses_with_variants = verses.iter().filter(|v| v.has_variants).count();
    let variant_columns = verses.iter().map(|v| v.variant_word_count).sum();
    let equivalent_columns = verses
        .iter()
        .flat_map(|v| v.word_alignment.iter())
        .filter(|c| equivalences.explains(c))
        .count();
    let naive_alignments = verses
        .iter()
        .filter(|v| v.alignment_method.is_naive())
        .count();

    let mean_similarity = WITNESS_PAIRS
        .iter()
        .map(|&(left, right)| {
            let scores: Vec<f64> = verses
                .iter()
                .filter_map(|v| v.similarity(left, right))
                .collect();
            let mean = if scores.is_empty() {
                None
            } else {
                Some(round3(scores.iter().sum::<f64>() / scores.len() as f64))
            };
            PairMean {
                left,
                right,
                scored_verses: scores.len(),
                mean,
            }
        })
        .collect();

    ChapterStatistics {
        chapter: result.chapter,
        total_verses: verses.len(),
        identical_verses,
        verses_with_variants,
        variant_columns,
        equivalent_columns,
        naive_alignments,
        mean_similarity,
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
