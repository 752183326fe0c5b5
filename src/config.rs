use std::path::Path;

use serde::Deserialize;

use crate::error::CollationError;
use crate::types::WITNESS_COUNT;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CollatorConfig {
    /// Result labels for witness slots 0, 1 and 2. Never used for alignment.
    pub witness_names: [String; WITNESS_COUNT],
    /// Regions kept before collation; empty keeps every verse.
    pub allowed_regions: Vec<String>,
    /// Collate the verses of a chapter on the rayon pool.
    pub parallel: bool,
    /// Largest score table the aligner may allocate before falling back to
    /// positional zipping.
    pub max_alignment_cells: usize,
}

impl CollatorConfig {
    pub const DEFAULT_MAX_ALIGNMENT_CELLS: usize = 4_000_000;
    pub const STANDARD_REGIONS: [&'static str; 3] = ["MainZone", "Rubric", "Chapter"];

    pub fn load(path: &Path) -> Result<Self, CollationError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| CollationError::io("read collator config", e))?;
        serde_json::from_str(&data).map_err(|e| CollationError::json("parse collator config", e))
    }

    pub fn with_standard_regions(mut self) -> Self {
        self.allowed_regions = Self::STANDARD_REGIONS.map(str::to_string).to_vec();
        self
    }

    pub fn region_allowed(&self, region: &str) -> bool {
        self.allowed_regions.is_empty() || self.allowed_regions.iter().any(|r| r == region)
    }
}

impl Default for CollatorConfig {
    fn default() -> Self {
        Self {
            witness_names: ["A", "B", "C"].map(str::to_string),
            allowed_regions: Vec::new(),
            parallel: true,
            max_alignment_cells: Self::DEFAULT_MAX_ALIGNMENT_CELLS,
        }
    }
}
