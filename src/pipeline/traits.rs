use crate::error::CollationError;
use crate::types::{AlignmentColumn, Token, WITNESS_COUNT};

pub trait TextNormalizer: Send + Sync {
    fn normalize(&self, text: &str) -> String;
}

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, verse_text: &str, normalizer: &dyn TextNormalizer) -> Vec<Token>;
}

pub trait SequenceAligner: Send + Sync {
    /// Aligns the three token sequences into columns. An error makes the
    /// caller fall back to positional zipping.
    fn align(
        &self,
        token_lists: &[Vec<Token>; WITNESS_COUNT],
    ) -> Result<Vec<AlignmentColumn>, CollationError>;
}

pub trait SimilarityScorer: Send + Sync {
    /// Symmetric score in `[0, 1]`; `score(x, x) == 1.0`.
    fn score(&self, a: &str, b: &str) -> f64;
}
