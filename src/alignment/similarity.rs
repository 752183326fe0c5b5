/// Levenshtein-ratio similarity in `[0, 1]`, rounded to three decimals.
///
/// `1 - indel(a, b) / (len(a) + len(b))`, where `indel` is the edit distance
/// with insertions and deletions only (a substitution counts as two edits).
/// Lengths are in characters. Two empty strings score `1.0`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    let distance = indel_distance(&a, &b);
    round3(1.0 - distance as f64 / total.max(1) as f64)
}

/// `len(a) + len(b) - 2 * lcs(a, b)`, computed with two rolling rows.
pub fn indel_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return a.len() + b.len();
    }
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    let mut prev = vec![0usize; short.len() + 1];
    let mut curr = vec![0usize; short.len() + 1];
    for &lc in long {
        for (j, &sc) in short.iter().enumerate() {
            curr[j + 1] = if lc == sc {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    let lcs = prev[short.len()];
    a.len() + b.len() - 2 * lcs
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(similarity("il est ainsi", "il est ainsi"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert_eq!(similarity("abc", ""), 0.0);
    }

    #[test]
    fn known_ratios() {
        // lcs("fais", "faits") = 4 -> 8 / 9
        assert_eq!(similarity("fais", "faits"), 0.889);
        // lcs("kitten", "sitting") = 4 -> 8 / 13
        assert_eq!(similarity("kitten", "sitting"), 0.615);
    }

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(similarity("abé", "abe"), 0.667);
    }

    #[test]
    fn indel_distance_counts_substitution_twice() {
        let a: Vec<char> = "a".chars().collect();
        let b: Vec<char> = "b".chars().collect();
        assert_eq!(indel_distance(&a, &b), 2);
    }

    #[test]
    fn symmetric_and_bounded_on_random_pairs() {
        let mut rng = StdRng::seed_from_u64(7);
        let alphabet = ['a', 'b', 'e', 'i', 's', 't', ' ', 'é'];
        for _ in 0..1_000 {
            let word = |rng: &mut StdRng| -> String {
                let len = rng.gen_range(0..12);
                (0..len).map(|_| alphabet[rng.gen_range(0..alphabet.len())]).collect()
            };
            let a = word(&mut rng);
            let b = word(&mut rng);
            let ab = similarity(&a, &b);
            assert_eq!(ab, similarity(&b, &a), "{a:?} vs {b:?}");
            assert!((0.0..=1.0).contains(&ab));
            assert_eq!(similarity(&a, &a), 1.0);
        }
    }
}
