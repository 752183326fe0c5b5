use std::sync::Arc;

use collation_rs::store::{VerseDecision, WordAction, WordDecision};
use collation_rs::{
    apply_overlay, normalize, AlignmentColumn, AlignmentMethod, CollationError, CollatorConfig,
    DecisionRepository, InMemoryStore, SequenceAligner, Token, VerseCollationResult,
    VerseCollator, VerseCollatorBuilder, VerseRecord, WitnessDocument, WITNESS_COUNT,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct AlwaysFailingAligner;

impl SequenceAligner for AlwaysFailingAligner {
    fn align(
        &self,
        _token_lists: &[Vec<Token>; WITNESS_COUNT],
    ) -> Result<Vec<AlignmentColumn>, CollationError> {
        Err(CollationError::AlignmentFailure {
            message: "malformed token stream".to_string(),
        })
    }
}

fn collator() -> VerseCollator {
    VerseCollatorBuilder::new(CollatorConfig::default())
        .build()
        .expect("default collator")
}

fn collate(collator: &VerseCollator, texts: [&str; 3]) -> VerseCollationResult {
    let verses = texts.map(VerseRecord::new);
    collator.collate_verse(1, [Some(&verses[0]), Some(&verses[1]), Some(&verses[2])])
}

fn layout(result: &VerseCollationResult) -> Vec<String> {
    result
        .word_alignment
        .iter()
        .map(|col| {
            col.words
                .iter()
                .map(|w| if w.missing { "-" } else { w.text.as_str() })
                .collect::<Vec<_>>()
                .join("|")
        })
        .collect()
}

fn assert_column_invariant(result: &VerseCollationResult) {
    for (index, column) in result.word_alignment.iter().enumerate() {
        assert_eq!(column.index, index);
        let order: Vec<usize> = column.words.iter().map(|w| w.witness_index).collect();
        assert_eq!(order, [0, 1, 2]);
    }
}

#[test]
fn scenario_a_same_spelling_is_identical() {
    let result = collate(&collator(), ["roy", "roy", "roy"]);
    assert!(result.witnesses.iter().all(|w| w.text_normalized == "roi"));
    assert!(result.is_identical);
    assert!(!result.has_variants);
    assert_eq!(result.variant_word_count, 0);
    assert_eq!(result.alignment_method, AlignmentMethod::Identical);
}

#[test]
fn scenario_b_follows_the_rule_set() {
    let result = collate(&collator(), ["faictz", "fais", "faits"]);
    let normalized: Vec<&str> = result
        .witnesses
        .iter()
        .map(|w| w.text_normalized.as_str())
        .collect();
    assert_eq!(normalized, ["faits", "fais", "faits"]);
    assert!(!result.is_identical);
    assert_eq!(layout(&result), ["faictz|fais|faits"]);
    assert_eq!(result.variant_word_count, 1);
    assert_eq!(result.similarity(0, 2), Some(1.0));
    assert_eq!(result.similarity(0, 1), Some(0.889));
}

#[test]
fn scenario_c_doubled_letters_collapse() {
    let result = collate(&collator(), ["abbatue", "abatue", "abatue"]);
    assert!(result.witnesses.iter().all(|w| w.text_normalized == "abatue"));
    assert!(result.is_identical);
    assert_eq!(layout(&result), ["abbatue|abatue|abatue"]);
    assert_eq!(result.variant_word_count, 0);
}

#[test]
fn scenario_d_empty_third_witness() {
    let result = collate(&collator(), ["le roi dist", "le roy dit", ""]);
    assert_column_invariant(&result);
    assert_eq!(layout(&result), ["le|le|-", "roi|roy|-", "dist|dit|-"]);
    assert!(result.word_alignment.iter().all(|c| c.words[2].missing));
    assert!(result.word_alignment.iter().all(|c| c.has_variant));
    assert_eq!(result.variant_word_count, 3);
    assert_eq!(result.similarities.len(), 1);
    assert_eq!(result.similarities[0].label(), "0-1");
    assert_eq!(result.similarity(0, 1), Some(1.0));
    assert!(!result.witnesses[2].missing);
}

#[test]
fn scenario_e_disjoint_words_share_one_column() {
    let collator = collator();
    let result = collate(&collator, ["alpha", "beta", "gamma"]);
    assert_eq!(layout(&result), ["alpha|beta|gamma"]);
    assert!(result.word_alignment[0].has_variant);
    assert_eq!(result.variant_word_count, 1);
    assert_eq!(result.alignment_method, AlignmentMethod::Progressive);
    assert_eq!(collate(&collator, ["alpha", "beta", "gamma"]), result);
}

#[test]
fn verse_against_its_own_normalization_has_no_variant() {
    let collator = collator();
    let verses = [
        "\u{93F} s'ta",
        "\u{345} ǅtİ\u{93F}a",
        "\u{93F},'i",
        "\u{345}. cǅǅ",
        "\u{93F},y\u{93F}c",
        "Le Roy dist: « ainsy soit il »",
    ];
    for verse in verses {
        let key = normalize(verse);
        let result = collate(&collator, [verse, &key, &key]);
        assert!(result.is_identical, "verse {verse:?}");
        assert_eq!(result.variant_word_count, 0, "verse {verse:?}");
        assert!(result
            .word_alignment
            .iter()
            .all(|c| c.words.iter().all(|w| !w.missing && !w.normalized.is_empty())));
    }
}

#[test]
fn identical_verses_never_report_variant_columns() {
    const ALPHABET: &[char] = &[
        'a', 'c', 'i', 's', 't', 'y', 'z', 'İ', 'ǅ', 'é', ' ', ',', '\'', '.', '\u{301}',
        '\u{345}', '\u{93F}',
    ];
    let collator = collator();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let len = rng.gen_range(0..12);
        let verse: String = (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
            .collect();
        let key = normalize(&verse);
        let result = collate(&collator, [verse.as_str(), &key, &key]);
        assert!(result.is_identical, "verse {verse:?}");
        assert_eq!(result.variant_word_count, 0, "verse {verse:?}");
    }
}

#[test]
fn alignment_is_deterministic() {
    let collator = collator();
    let texts = [
        "Et quant le roy ot ce oy si fut moult dolent",
        "Et quant li rois ot ce oi si fu mout dolans",
        "quant le roy ot oy ce si fut moult dolent et iré",
    ];
    let first = serde_json::to_string(&collate(&collator, texts)).unwrap();
    let second = serde_json::to_string(&collate(&collator, texts)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn aligner_failure_falls_back_to_positional() {
    let collator = VerseCollatorBuilder::new(CollatorConfig::default())
        .with_sequence_aligner(Box::new(AlwaysFailingAligner))
        .build()
        .unwrap();
    let result = collate(&collator, ["le bon roi", "le roi", "roi"]);
    assert_eq!(result.alignment_method, AlignmentMethod::Positional);
    assert!(result.alignment_method.is_naive());
    assert_eq!(layout(&result), ["le|le|roi", "bon|roi|-", "roi|-|-"]);
    assert_eq!(result.variant_word_count, 3);
    assert_column_invariant(&result);

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["alignment_method"], "positional");
}

#[test]
fn identical_verses_skip_the_aligner() {
    let collator = VerseCollatorBuilder::new(CollatorConfig::default())
        .with_sequence_aligner(Box::new(AlwaysFailingAligner))
        .build()
        .unwrap();
    let result = collate(&collator, ["Le roy", "le Roi", "le roy."]);
    assert_eq!(result.alignment_method, AlignmentMethod::Identical);
    assert_eq!(result.variant_word_count, 0);
}

#[test]
fn oversized_verse_falls_back_to_positional() {
    let config = CollatorConfig {
        max_alignment_cells: 4,
        ..CollatorConfig::default()
    };
    let collator = VerseCollatorBuilder::new(config).build().unwrap();
    let result = collate(&collator, ["a b", "a c", "a b"]);
    assert_eq!(result.alignment_method, AlignmentMethod::Positional);
    assert_eq!(layout(&result), ["a|a|a", "b|c|b"]);
}

#[test]
fn chapter_with_uneven_witnesses_is_returned_in_full() {
    let witness_verses = vec![
        vec![VerseRecord::new("Cy commence"), VerseRecord::new("le roy dist")],
        vec![VerseRecord::new("Cy commence")],
        vec![
            VerseRecord::new("Ci commence"),
            VerseRecord::new("le roi dit"),
            VerseRecord::new("amen"),
        ],
    ];
    let result = collator().collate_chapter(0, &witness_verses).unwrap();
    assert_eq!(result.total_verses, 3);
    assert_eq!(result.witnesses, ["A", "B", "C"]);
    assert!(result.verses[0].is_identical);
    assert!(result.verses[1].witnesses[1].missing);
    assert_eq!(result.verses[1].similarities.len(), 1);
    assert_eq!(result.verses[1].similarity(0, 2), Some(1.0));
    assert!(result.verses[2].witnesses[0].missing);
    assert!(result.verses[2].similarities.is_empty());
    for verse in &result.verses {
        assert_column_invariant(verse);
    }
}

#[test]
fn fewer_than_three_witnesses_is_input_error() {
    let err = collator()
        .collate_chapter(0, &[vec![VerseRecord::new("a")]])
        .unwrap_err();
    assert!(matches!(err, CollationError::InvalidInput { .. }));
}

#[test]
fn missing_chapter_is_input_error() {
    let docs = [
        WitnessDocument::new("A", vec![vec![VerseRecord::new("a")], vec![]]),
        WitnessDocument::new("B", vec![vec![VerseRecord::new("a")]]),
        WitnessDocument::new("C", vec![vec![VerseRecord::new("a")], vec![]]),
    ];
    let err = collator().collate_documents(&docs, 1).unwrap_err();
    match err {
        CollationError::ChapterNotFound {
            witness,
            chapter,
            available,
        } => {
            assert_eq!(witness, "B");
            assert_eq!(chapter, 1);
            assert_eq!(available, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn region_filter_applies_before_collation() {
    let verse = |text: &str, region: &str| {
        let mut record = VerseRecord::new(text);
        record.metadata.region = region.to_string();
        record
    };
    let doc = |name: &str| {
        WitnessDocument::new(
            name,
            vec![vec![
                verse("fol. 12", "NumberingZone"),
                verse("Cy commence", "Rubric"),
            ]],
        )
    };
    let docs = [doc("A"), doc("B"), doc("C")];
    let collator = VerseCollatorBuilder::new(CollatorConfig::default().with_standard_regions())
        .build()
        .unwrap();
    let result = collator.collate_documents(&docs, 0).unwrap();
    assert_eq!(result.total_verses, 1);
    assert_eq!(result.verses[0].witnesses[0].text, "Cy commence");
    assert_eq!(result.verses[0].witnesses[0].metadata.region, "Rubric");
}

#[test]
fn stored_decisions_overlay_the_result() {
    let repository = DecisionRepository::new(Arc::new(InMemoryStore::new()));
    let stats = repository
        .save_verse_decision(
            "lancelot",
            0,
            VerseDecision {
                verse_number: 1,
                qualification: Some("graphical".to_string()),
                ..VerseDecision::default()
            },
        )
        .unwrap();
    assert_eq!(stats.total_decisions, 1);
    repository
        .save_word_decision(
            "lancelot",
            0,
            WordDecision {
                verse_number: 1,
                position: 1,
                action: WordAction::Ignore,
                ..WordDecision::default()
            },
        )
        .unwrap();

    let witness_verses = vec![
        vec![VerseRecord::new("le roy dist")],
        vec![VerseRecord::new("le roi dist")],
        vec![VerseRecord::new("le rois dist")],
    ];
    let mut result = collator().collate_chapter(0, &witness_verses).unwrap();
    let decisions = repository.load_chapter("lancelot", 0).unwrap();
    apply_overlay(&mut result, &decisions);

    let verse = &result.verses[0];
    let decision = verse.user_decision.as_ref().expect("verse decision");
    assert_eq!(decision.qualification.as_deref(), Some("graphical"));
    assert!(verse.word_alignment[0].word_decision.is_none());
    let word = verse.word_alignment[1]
        .word_decision
        .as_ref()
        .expect("word decision");
    assert_eq!(word.action, WordAction::Ignore);

    let json = serde_json::to_value(verse).unwrap();
    assert_eq!(json["user_decision"]["qualification"], "graphical");
    assert_eq!(json["word_alignment"][1]["word_decision"]["action"], "ignore");
    assert!(json["word_alignment"][0].get("word_decision").is_none());
}
