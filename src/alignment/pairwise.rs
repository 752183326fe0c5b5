//! Global alignment of two key sequences (Needleman-Wunsch with unit costs).
//!
//! Keys are `Option<&str>`; `None` never matches anything, not even another
//! `None`, so it can only be substituted or gapped.
//!
//! Costs: match 0, substitution 1, insertion/deletion 1. Among paths of equal
//! cost the one with fewer gaps wins; remaining ties pair tokens as early as
//! possible. The table is filled over suffixes and traced forward from the
//! start, so the earliest optimal pairing is chosen greedily at each step:
//! diagonal first, then a gap on the right side, then a gap on the left side.

use crate::error::CollationError;

pub const MATCH_COST: u32 = 0;
pub const SUBSTITUTION_COST: u32 = 1;
pub const GAP_COST: u32 = 1;

/// One aligned position: an index into each side, or `None` for a gap.
pub type PairStep = (Option<usize>, Option<usize>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Score {
    cost: u32,
    gaps: u32,
}

impl Score {
    const ZERO: Score = Score { cost: 0, gaps: 0 };

    #[inline(always)]
    fn step(self, cost: u32, gap: bool) -> Score {
        Score {
            cost: self.cost + cost,
            gaps: self.gaps + u32::from(gap),
        }
    }
}

#[inline(always)]
fn keys_match(left: Option<&str>, right: Option<&str>) -> bool {
    matches!((left, right), (Some(l), Some(r)) if l == r)
}

/// Aligns `left` against `right`.
///
/// Fails with [`CollationError::AlignmentFailure`] when the score table would
/// need more than `max_cells` entries.
pub fn align_pair(
    left: &[Option<&str>],
    right: &[Option<&str>],
    max_cells: usize,
) -> Result<Vec<PairStep>, CollationError> {
    let n = left.len();
    let m = right.len();
    let width = m + 1;
    let cells = (n + 1)
        .checked_mul(width)
        .filter(|&cells| cells <= max_cells)
        .ok_or_else(|| {
            CollationError::alignment(format!(
                "score table for {n}x{m} tokens exceeds the {max_cells} cell limit"
            ))
        })?;

    // suffix[i * width + j] = best score aligning left[i..] with right[j..]
    let mut suffix = vec![Score::ZERO; cells];
    for i in (0..=n).rev() {
        for j in (0..=m).rev() {
            if i == n && j == m {
                continue;
            }
            let mut best: Option<Score> = None;
            if i < n && j < m {
                let cost = if keys_match(left[i], right[j]) {
                    MATCH_COST
                } else {
                    SUBSTITUTION_COST
                };
                best = Some(suffix[(i + 1) * width + j + 1].step(cost, false));
            }
            if i < n {
                let cand = suffix[(i + 1) * width + j].step(GAP_COST, true);
                best = Some(best.map_or(cand, |b| b.min(cand)));
            }
            if j < m {
                let cand = suffix[i * width + j + 1].step(GAP_COST, true);
                best = Some(best.map_or(cand, |b| b.min(cand)));
            }
            if let Some(best) = best {
                suffix[i * width + j] = best;
            }
        }
    }

    let mut path = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (0usize, 0usize);
    while i < n || j < m {
        let here = suffix[i * width + j];
        if i < n && j < m {
            let cost = if keys_match(left[i], right[j]) {
                MATCH_COST
            } else {
                SUBSTITUTION_COST
            };
            if suffix[(i + 1) * width + j + 1].step(cost, false) == here {
                path.push((Some(i), Some(j)));
                i += 1;
                j += 1;
                continue;
            }
        }
        if i < n && suffix[(i + 1) * width + j].step(GAP_COST, true) == here {
            path.push((Some(i), None));
            i += 1;
            continue;
        }
        if j < m && suffix[i * width + j + 1].step(GAP_COST, true) == here {
            path.push((None, Some(j)));
            j += 1;
            continue;
        }
        return Err(CollationError::alignment(format!(
            "traceback stalled at ({i}, {j})"
        )));
    }
    Ok(path)
}
