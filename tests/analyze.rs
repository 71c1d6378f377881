//! End-to-end coverage of the invariants and scenarios from SPEC_FULL.md's
//! "Testable properties" section, run against small synthetic dictionaries
//! rather than a bundled linguistic corpus (see SPEC_FULL.md's Non-goals on
//! storage format / corpus data).

use std::collections::HashSet;
use std::fs;

use kiwi_core::{KiwiBuilder, MatchOptions, PosTag};

fn rule_file_path(tag: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("kiwi-core-test-{}-{}.rule", tag, std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

/// Invariant 2: offsets cover the input, in order, with no gaps or overlaps.
#[test]
fn offsets_cover_the_whole_input() {
    let mut builder = KiwiBuilder::new();
    builder.add_word("나무", PosTag::NNG, -1.0);
    builder.add_word("늘", PosTag::MAG, -1.0);
    let kiwi = builder.build().unwrap();

    let text = "나무늘보";
    let analyses = kiwi.analyze(text, 1, MatchOptions::all(), &HashSet::new(), &[]);
    let best = &analyses[0];

    let mut cursor = 0;
    for tok in &best.tokens {
        assert!(tok.position >= cursor, "token {:?} starts before the previous one ends", tok.surface_string);
        cursor = tok.position + tok.length;
    }
    assert_eq!(cursor, text.len());
}

/// Invariant 8: the same build, run twice on the same input, is bit-for-bit
/// identical (no hidden nondeterminism from hashing or thread scheduling).
#[test]
fn analyze_is_deterministic() {
    let mut builder = KiwiBuilder::new();
    builder.add_word("나무", PosTag::NNG, -1.0);
    builder.add_word("바람", PosTag::NNG, -1.0);
    let kiwi = builder.build().unwrap();

    let a = kiwi.analyze("나무바람", 3, MatchOptions::all(), &HashSet::new(), &[]);
    let b = kiwi.analyze("나무바람", 3, MatchOptions::all(), &HashSet::new(), &[]);
    assert_eq!(format!("{:?}", a), format!("{:?}", b));
}

/// S6-style scenario: blocking a morpheme id removes it from every
/// returned path, forcing the decoder onto a shorter-but-legal alternative.
/// Both halves are tagged `NNG` so the split stays POS-bigram legal (§4.7)
/// without needing a real verb-ending dictionary.
#[test]
fn block_list_forces_an_alternate_segmentation() {
    let mut builder = KiwiBuilder::new();
    let blocked = builder.add_word("좋아하", PosTag::NNG, -1.0);
    builder.add_word("좋", PosTag::NNG, -1.0);
    builder.add_word("아하", PosTag::NNG, -3.0);
    let kiwi = builder.build().unwrap();

    let mut blocked_set = HashSet::new();
    blocked_set.insert(blocked);

    let analyses = kiwi.analyze("좋아하다", 1, MatchOptions::all(), &blocked_set, &[]);
    let best = &analyses[0];
    assert!(!best.tokens.iter().any(|t| t.surface_string == "좋아하"));
}

/// S2-style scenario: `Kiwi::new_joiner` applies a loaded combining rule
/// across the whole public surface (builder -> joiner), not just within
/// `kiwi-automata`'s own unit tests. Allomorph *table* substitution itself
/// is covered at the `joiner` module's unit-test level, since `KiwiBuilder`
/// has no public way to register custom allomorphs.
#[test]
fn joiner_applies_a_loaded_combining_rule() {
    let mut builder = KiwiBuilder::new();
    let rules = rule_file_path("join-nng-jko", "NNG\tJKO\n^\t.*\t\\1\\2\t\n");
    builder.load_rule_file(&rules).unwrap();
    fs::remove_file(&rules).ok();

    let kiwi = builder.build().unwrap();
    let mut joiner = kiwi.new_joiner(false);
    joiner.add(&kiwi_hangul::normalize_str("시동"), PosTag::NNG);
    joiner.add(&kiwi_hangul::normalize_str("를"), PosTag::JKO);
    assert_eq!(joiner.join(), "시동를");
}

/// §4.3a: a combining-rule replacement carrying literal `(`/`)` markers
/// strips them from the combined surface and reports them back as
/// `leftEnd`/`rightBegin` offsets, rather than leaking the parens into the
/// joined form.
#[test]
fn combining_rule_marker_offsets_are_reported() {
    use kiwi_automata::CombiningRules;
    use kiwi_dict::parse_rule_file;

    let src = "VV\tEC\n가$\t.*\t(\\1)\\2\t\n";
    let file = parse_rule_file(src).unwrap();
    let rules = CombiningRules::compile(&file).unwrap();

    let left = kiwi_hangul::normalize_str("가");
    let right = kiwi_hangul::normalize_str("고");
    let results = rules.combine(&left, PosTag::VV, false, &right, PosTag::EC);
    assert_eq!(results.len(), 1);

    let mut expected_surface = left.clone();
    expected_surface.extend_from_slice(&right);
    assert_eq!(results[0].form, expected_surface, "markers must not appear as literal parens in the output");
    assert_eq!(results[0].right_begin, 0);
    assert_eq!(results[0].left_end, left.len());
}

/// Invariant 7: sentence spans partition the input, non-overlapping and in
/// order, modulo the whitespace between them.
#[test]
fn sentence_spans_are_ordered_and_non_overlapping() {
    let mut builder = KiwiBuilder::new();
    builder.add_word("오늘", PosTag::NNG, -1.0);
    builder.add_word("날씨", PosTag::NNG, -1.0);
    builder.add_word("좋", PosTag::VA, -1.0);
    builder.add_word("다", PosTag::EF, -1.0);
    builder.add_word(".", PosTag::SF, -1.0);
    let kiwi = builder.build().unwrap();

    let text = "오늘 날씨 좋다. 오늘 좋다.";
    let spans = kiwi.split_into_sents(text, MatchOptions::all());

    assert!(spans.len() >= 1);
    let mut prev_end = 0;
    for span in &spans {
        assert!(span.start >= prev_end);
        assert!(span.end <= text.len());
        assert!(span.start < span.end);
        prev_end = span.end;
    }
}
