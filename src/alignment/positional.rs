use crate::types::{AlignmentColumn, Token, WITNESS_COUNT};

/// Pairs tokens purely by index, padding shorter witnesses with trailing gaps.
///
/// Used when the real aligner cannot produce a result; callers must report the
/// verse as naively aligned.
pub fn zip_positional(token_lists: &[Vec<Token>; WITNESS_COUNT]) -> Vec<AlignmentColumn> {
    let width = token_lists.iter().map(Vec::len).max().unwrap_or(0);
    (0..width)
        .map(|index| {
            let slots = [0, 1, 2].map(|w| token_lists[w].get(index));
            AlignmentColumn::new(index, slots)
        })
        .collect()
}
