pub mod alignment;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod types;
pub mod witness;

pub use alignment::normalization::normalize;
pub use alignment::report::{compute_chapter_statistics, ChapterStatistics, CollationReport};
pub use alignment::similarity::similarity;
pub use config::CollatorConfig;
pub use error::CollationError;
pub use pipeline::builder::VerseCollatorBuilder;
pub use pipeline::runtime::VerseCollator;
pub use pipeline::traits::{SequenceAligner, SimilarityScorer, TextNormalizer, Tokenizer};
pub use store::{
    apply_overlay, DecisionRepository, EquivalenceRegistry, EquivalenceSet, InMemoryStore,
    KeyValueStore,
};
pub use types::{
    AlignmentColumn, AlignmentMethod, ChapterCollationResult, Token, VerseCollationResult,
    VerseMetadata, VerseRecord, WitnessReading, WordCell, WITNESS_COUNT,
};
pub use witness::WitnessDocument;
