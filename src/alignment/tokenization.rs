use unicode_normalization::char::is_combining_mark;

use crate::alignment::normalization::is_word_char;
use crate::types::Token;

/// Splits a verse into word tokens.
///
/// A word is a run of [`is_word_char`] characters; combining marks continue a
/// word that has already started but never start one. Everything else
/// separates words and is not emitted. `normalize` produces each token's
/// comparison key from its literal display form.
pub fn build_tokens<F>(verse_text: &str, normalize: F) -> Vec<Token>
where
    F: Fn(&str) -> String,
{
    word_spans(verse_text)
        .into_iter()
        .map(|(start, end)| {
            let display = &verse_text[start..end];
            Token {
                display: display.to_string(),
                normalized: normalize(display),
            }
        })
        .collect()
}

fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for (idx, c) in text.char_indices() {
        let continues = is_word_char(c) || (start.is_some() && is_combining_mark(c));
        match (start, continues) {
            (None, true) => start = Some(idx),
            (Some(s), false) => {
                spans.push((s, idx));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}
