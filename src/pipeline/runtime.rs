use crate::alignment::positional::zip_positional;
use crate::alignment::report::WITNESS_PAIRS;
use crate::config::CollatorConfig;
use crate::error::CollationError;
use crate::pipeline::traits::{SequenceAligner, SimilarityScorer, TextNormalizer, Tokenizer};
use crate::types::{
    AlignmentMethod, ChapterCollationResult, PairSimilarity, VerseCollationResult, VerseMetadata,
    VerseRecord, WitnessReading, WITNESS_COUNT,
};
use crate::witness::WitnessDocument;

/// Collates the three witnesses of a verse or a chapter.
///
/// Holds no per-request state; one instance can serve any number of
/// chapters, from any number of threads.
pub struct VerseCollator {
    config: CollatorConfig,
    normalizer: Box<dyn TextNormalizer>,
    tokenizer: Box<dyn Tokenizer>,
    sequence_aligner: Box<dyn SequenceAligner>,
    similarity_scorer: Box<dyn SimilarityScorer>,
}

pub(crate) struct VerseCollatorParts {
    pub config: CollatorConfig,
    pub normalizer: Box<dyn TextNormalizer>,
    pub tokenizer: Box<dyn Tokenizer>,
    pub sequence_aligner: Box<dyn SequenceAligner>,
    pub similarity_scorer: Box<dyn SimilarityScorer>,
}

impl VerseCollator {
    pub(crate) fn from_parts(parts: VerseCollatorParts) -> Self {
        Self {
            config: parts.config,
            normalizer: parts.normalizer,
            tokenizer: parts.tokenizer,
            sequence_aligner: parts.sequence_aligner,
            similarity_scorer: parts.similarity_scorer,
        }
    }

    pub fn config(&self) -> &CollatorConfig {
        &self.config
    }

    /// Collates one verse. `None` marks a witness with no verse at this index;
    /// it is read as empty text.
    pub fn collate_verse(
        &self,
        verse_number: usize,
        verses: [Option<&VerseRecord>; WITNESS_COUNT],
    ) -> VerseCollationResult {
        let witnesses: [WitnessReading; WITNESS_COUNT] = std::array::from_fn(|slot| {
            let name = self.config.witness_names[slot].clone();
            match verses[slot] {
                Some(verse) => WitnessReading {
                    name,
                    text: verse.text.clone(),
                    text_normalized: self.normalizer.normalize(&verse.text),
                    metadata: verse.metadata.clone(),
                    missing: false,
                },
                None => WitnessReading {
                    name,
                    text: String::new(),
                    text_normalized: String::new(),
                    metadata: VerseMetadata::default(),
                    missing: true,
                },
            }
        });

        let first = witnesses[0].text_normalized.as_str();
        let is_identical = witnesses.iter().all(|w| w.text_normalized == first);

        let token_lists = witnesses
            .each_ref()
            .map(|w| self.tokenizer.tokenize(&w.text, self.normalizer.as_ref()));

        let (word_alignment, alignment_method) = if is_identical {
            (zip_positional(&token_lists), AlignmentMethod::Identical)
        } else {
            match self.sequence_aligner.align(&token_lists) {
                Ok(columns) => (columns, AlignmentMethod::Progressive),
                Err(err) => {
                    tracing::warn!(
                        verse_number,
                        error = %err,
                        "word alignment failed; falling back to positional zipping"
                    );
                    (zip_positional(&token_lists), AlignmentMethod::Positional)
                }
            }
        };

        let similarities = WITNESS_PAIRS
            .iter()
            .filter_map(|&(left, right)| {
                let a = witnesses[left].text_normalized.as_str();
                let b = witnesses[right].text_normalized.as_str();
                if a.is_empty() || b.is_empty() {
                    return None;
                }
                Some(PairSimilarity {
                    left,
                    right,
                    score: self.similarity_scorer.score(a, b),
                })
            })
            .collect();

        let variant_word_count = word_alignment.iter().filter(|c| c.has_variant).count();

        tracing::debug!(
            verse_number,
            method = alignment_method.as_str(),
            columns = word_alignment.len(),
            variant_word_count,
            "collated verse"
        );

        VerseCollationResult {
            verse_number,
            witnesses,
            is_identical,
            has_variants: !is_identical,
            similarities,
            word_alignment,
            variant_word_count,
            alignment_method,
            user_decision: None,
        }
    }

    /// Collates a chapter given the verses of each witness, in witness order.
    ///
    /// The verse count is the longest witness; shorter witnesses read as
    /// missing past their end. Output order always follows verse order.
    pub fn collate_chapter(
        &self,
        chapter: usize,
        witness_verses: &[Vec<VerseRecord>],
    ) -> Result<ChapterCollationResult, CollationError> {
        if witness_verses.len() != WITNESS_COUNT {
            return Err(CollationError::invalid_input(format!(
                "collation needs exactly {WITNESS_COUNT} witnesses, got {}",
                witness_verses.len()
            )));
        }

        let total_verses = witness_verses.iter().map(Vec::len).max().unwrap_or(0);
        let collate_at = |index: usize| {
            let slots = std::array::from_fn(|slot| witness_verses[slot].get(index));
            self.collate_verse(index + 1, slots)
        };

        let verses = if self.runs_parallel() {
            collate_parallel(total_verses, collate_at)
        } else {
            (0..total_verses).map(collate_at).collect()
        };

        let result = ChapterCollationResult {
            witnesses: self.config.witness_names.clone(),
            chapter,
            total_verses,
            verses,
        };
        tracing::info!(
            chapter,
            total_verses,
            identical = result.verses.iter().filter(|v| v.is_identical).count(),
            naive = result
                .verses
                .iter()
                .filter(|v| v.alignment_method.is_naive())
                .count(),
            "collated chapter"
        );
        Ok(result)
    }

    /// Resolves `chapter` in each document, keeps the configured regions and
    /// collates the result.
    pub fn collate_documents(
        &self,
        documents: &[WitnessDocument],
        chapter: usize,
    ) -> Result<ChapterCollationResult, CollationError> {
        if documents.len() != WITNESS_COUNT {
            return Err(CollationError::invalid_input(format!(
                "collation needs exactly {WITNESS_COUNT} witnesses, got {}",
                documents.len()
            )));
        }
        let witness_verses = documents
            .iter()
            .map(|doc| doc.filtered_chapter(chapter, &self.config))
            .collect::<Result<Vec<_>, _>>()?;
        self.collate_chapter(chapter, &witness_verses)
    }

    fn runs_parallel(&self) -> bool {
        cfg!(feature = "parallel") && self.config.parallel
    }
}

#[cfg(feature = "parallel")]
fn collate_parallel<F>(total_verses: usize, collate_at: F) -> Vec<VerseCollationResult>
where
    F: Fn(usize) -> VerseCollationResult + Sync + Send,
{
    use rayon::prelude::*;

    (0..total_verses).into_par_iter().map(collate_at).collect()
}

#[cfg(not(feature = "parallel"))]
fn collate_parallel<F>(total_verses: usize, collate_at: F) -> Vec<VerseCollationResult>
where
    F: Fn(usize) -> VerseCollationResult,
{
    (0..total_verses).map(collate_at).collect()
}
