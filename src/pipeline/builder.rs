use crate::config::CollatorConfig;
use crate::error::CollationError;
use crate::pipeline::defaults::{
    HistoricalNormalizer, LevenshteinRatioScorer, ProgressiveAligner, WordTokenizer,
};
use crate::pipeline::runtime::{VerseCollator, VerseCollatorParts};
use crate::pipeline::traits::{SequenceAligner, SimilarityScorer, TextNormalizer, Tokenizer};

pub struct VerseCollatorBuilder {
    config: CollatorConfig,
    normalizer: Option<Box<dyn TextNormalizer>>,
    tokenizer: Option<Box<dyn Tokenizer>>,
    sequence_aligner: Option<Box<dyn SequenceAligner>>,
    similarity_scorer: Option<Box<dyn SimilarityScorer>>,
}

impl VerseCollatorBuilder {
    pub fn new(config: CollatorConfig) -> Self {
        Self {
            config,
            normalizer: None,
            tokenizer: None,
            sequence_aligner: None,
            similarity_scorer: None,
        }
    }

    pub fn with_normalizer(mut self, normalizer: Box<dyn TextNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn with_sequence_aligner(mut self, sequence_aligner: Box<dyn SequenceAligner>) -> Self {
        self.sequence_aligner = Some(sequence_aligner);
        self
    }

    pub fn with_similarity_scorer(mut self, similarity_scorer: Box<dyn SimilarityScorer>) -> Self {
        self.similarity_scorer = Some(similarity_scorer);
        self
    }

    pub fn build(self) -> Result<VerseCollator, CollationError> {
        if let Some(slot) = self
            .config
            .witness_names
            .iter()
            .position(|name| name.trim().is_empty())
        {
            return Err(CollationError::invalid_input(format!(
                "witness name for slot {slot} is empty"
            )));
        }

        let max_alignment_cells = if self.config.max_alignment_cells == 0 {
            CollatorConfig::DEFAULT_MAX_ALIGNMENT_CELLS
        } else {
            self.config.max_alignment_cells
        };

        Ok(VerseCollator::from_parts(VerseCollatorParts {
            normalizer: self
                .normalizer
                .unwrap_or_else(|| Box::new(HistoricalNormalizer)),
            tokenizer: self.tokenizer.unwrap_or_else(|| Box::new(WordTokenizer)),
            sequence_aligner: self
                .sequence_aligner
                .unwrap_or_else(|| Box::new(ProgressiveAligner::new(max_alignment_cells))),
            similarity_scorer: self
                .similarity_scorer
                .unwrap_or_else(|| Box::new(LevenshteinRatioScorer)),
            config: CollatorConfig {
                max_alignment_cells,
                ..self.config
            },
        }))
    }
}
