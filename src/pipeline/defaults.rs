use crate::alignment::normalization::normalize;
use crate::alignment::progressive::align_progressive;
use crate::alignment::similarity::similarity;
use crate::alignment::tokenization::build_tokens;
use crate::config::CollatorConfig;
use crate::error::CollationError;
use crate::pipeline::traits::{SequenceAligner, SimilarityScorer, TextNormalizer, Tokenizer};
use crate::types::{AlignmentColumn, Token, WITNESS_COUNT};

pub struct HistoricalNormalizer;

impl TextNormalizer for HistoricalNormalizer {
    fn normalize(&self, text: &str) -> String {
        normalize(text)
    }
}

pub struct WordTokenizer;

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, verse_text: &str, normalizer: &dyn TextNormalizer) -> Vec<Token> {
        build_tokens(verse_text, |word| normalizer.normalize(word))
    }
}

pub struct ProgressiveAligner {
    max_cells: usize,
}

impl ProgressiveAligner {
    pub fn new(max_cells: usize) -> Self {
        Self { max_cells }
    }
}

impl Default for ProgressiveAligner {
    fn default() -> Self {
        Self::new(CollatorConfig::DEFAULT_MAX_ALIGNMENT_CELLS)
    }
}

impl SequenceAligner for ProgressiveAligner {
    fn align(
        &self,
        token_lists: &[Vec<Token>; WITNESS_COUNT],
    ) -> Result<Vec<AlignmentColumn>, CollationError> {
        align_progressive(token_lists, self.max_cells)
    }
}

pub struct LevenshteinRatioScorer;

impl SimilarityScorer for LevenshteinRatioScorer {
    fn score(&self, a: &str, b: &str) -> f64 {
        similarity(a, b)
    }
}
