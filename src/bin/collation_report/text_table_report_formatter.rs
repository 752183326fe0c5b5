use std::fmt::Write;

use collation_rs::alignment::report::{ChapterStatistics, PairMean};
use collation_rs::{AlignmentColumn, CollationReport, VerseCollationResult, WITNESS_COUNT};

const GAP_MARKER: &str = "-";

/// Renders chapter statistics followed by the word table of every verse
/// with variants. Identical verses are summarized, not printed.
pub fn render_report(report: &CollationReport) -> String {
    let mut out = String::new();
    let names = &report.meta.witnesses;
    for (chapter, stats) in report.chapters.iter().zip(&report.statistics) {
        render_statistics(&mut out, stats, names);
        for verse in chapter.verses.iter().filter(|v| v.has_variants) {
            render_verse(&mut out, verse, names);
        }
        out.push('\n');
    }
    out
}

fn render_statistics(out: &mut String, stats: &ChapterStatistics, names: &[String; WITNESS_COUNT]) {
    let _ = writeln!(
        out,
        "== chapter {}: {} verses, {} identical, {} with variants, {} variant words ({} equivalent), {} naive alignments",
        stats.chapter,
        stats.total_verses,
        stats.identical_verses,
        stats.verses_with_variants,
        stats.variant_columns,
        stats.equivalent_columns,
        stats.naive_alignments,
    );
    for pair in &stats.mean_similarity {
        let _ = writeln!(out, "   {}", format_pair_mean(pair, names));
    }
}

fn format_pair_mean(pair: &PairMean, names: &[String; WITNESS_COUNT]) -> String {
    let mean = pair
        .mean
        .map(|value| format!("{value:.3}"))
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "{} / {}: mean similarity {mean} over {} verses",
        names[pair.left], names[pair.right], pair.scored_verses
    )
}

fn render_verse(out: &mut String, verse: &VerseCollationResult, names: &[String; WITNESS_COUNT]) {
    let scores = verse
        .similarities
        .iter()
        .map(|s| format!("{}={:.3}", s.label(), s.score))
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(
        out,
        "-- verse {} [{}] {} variant words {}",
        verse.verse_number,
        verse.alignment_method.as_str(),
        verse.variant_word_count,
        scores
    );

    let widths = column_widths(&verse.word_alignment);
    let name_width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0);
    for (slot, name) in names.iter().enumerate() {
        let _ = write!(out, "   {name:<name_width$} |");
        for (column, &width) in verse.word_alignment.iter().zip(&widths) {
            let _ = write!(out, " {:<width$}", cell_text(column, slot));
        }
        out.push('\n');
    }
    let _ = write!(out, "   {:<name_width$} |", "");
    for (column, &width) in verse.word_alignment.iter().zip(&widths) {
        let marker = if column.has_variant { "^" } else { "" };
        let _ = write!(out, " {marker:<width$}");
    }
    out.push('\n');
}

fn cell_text(column: &AlignmentColumn, slot: usize) -> &str {
    let cell = &column.words[slot];
    if cell.missing {
        GAP_MARKER
    } else {
        &cell.text
    }
}

fn column_widths(columns: &[AlignmentColumn]) -> Vec<usize> {
    columns
        .iter()
        .map(|column| {
            (0..WITNESS_COUNT)
                .map(|slot| cell_text(column, slot).chars().count())
                .max()
                .unwrap_or(1)
        })
        .collect()
}
