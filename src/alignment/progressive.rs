//! Three-witness alignment by progressive pairwise merge.
//!
//! Witnesses 0 and 1 are aligned first. Each of their aligned cells then
//! becomes one "profile" position whose key is the shared normalized form when
//! both witnesses carry the same word, and an unmatchable key otherwise. The
//! profile is aligned against witness 2 with the same cost model, and every
//! profile position expands back into its original pair of cells. Where the
//! second pass gaps the profile, both witness 0 and witness 1 get a gap.

use crate::alignment::pairwise::{align_pair, PairStep};
use crate::error::CollationError;
use crate::types::{AlignmentColumn, Token, WITNESS_COUNT};

pub fn align_progressive(
    token_lists: &[Vec<Token>; WITNESS_COUNT],
    max_cells: usize,
) -> Result<Vec<AlignmentColumn>, CollationError> {
    let [first, second, third] = token_lists;

    let first_keys = token_keys(first);
    let second_keys = token_keys(second);
    let pair_path = align_pair(&first_keys, &second_keys, max_cells)?;

    let profile: Vec<Option<&str>> = pair_path
        .iter()
        .map(|&step| match step {
            (Some(a), Some(b)) if first[a].normalized == second[b].normalized => {
                Some(first[a].normalized.as_str())
            }
            _ => None,
        })
        .collect();

    let third_keys = token_keys(third);
    let merged_path = align_pair(&profile, &third_keys, max_cells)?;

    let rows: Vec<[Option<usize>; WITNESS_COUNT]> = merged_path
        .iter()
        .map(|&(profile_idx, c)| {
            let (a, b): PairStep = profile_idx.map_or((None, None), |p| pair_path[p]);
            [a, b, c]
        })
        .collect();

    check_rows(&rows, token_lists)?;

    Ok(rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let slots = [0, 1, 2].map(|w| row[w].map(|i| &token_lists[w][i]));
            AlignmentColumn::new(index, slots)
        })
        .collect())
}

fn token_keys(tokens: &[Token]) -> Vec<Option<&str>> {
    tokens.iter().map(|t| Some(t.normalized.as_str())).collect()
}

/// Every token of every witness must appear exactly once, in order, and no
/// column may be empty.
fn check_rows(
    rows: &[[Option<usize>; WITNESS_COUNT]],
    token_lists: &[Vec<Token>; WITNESS_COUNT],
) -> Result<(), CollationError> {
    if let Some(pos) = rows.iter().position(|row| row.iter().all(Option::is_none)) {
        return Err(CollationError::alignment(format!(
            "column {pos} has no token in any witness"
        )));
    }
    for (witness, tokens) in token_lists.iter().enumerate() {
        let seen: Vec<usize> = rows.iter().filter_map(|row| row[witness]).collect();
        if !seen.iter().copied().eq(0..tokens.len()) {
            return Err(CollationError::alignment(format!(
                "witness {witness}: aligned {} of {} tokens out of order or duplicated",
                seen.len(),
                tokens.len()
            )));
        }
    }
    Ok(())
}
