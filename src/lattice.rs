//! Lattice construction (§4.6): turns jamo-normalized input text into a
//! graph of candidate morpheme nodes keyed by their `[begin, end)` span,
//! ready for the Viterbi decoder to search.
//!
//! The seven steps below mirror `Kiwi::findBestPath`'s node-generation
//! phase (`KiwiRule`/`SpecialMorpheme` lookup in the original), but trade
//! the original's direct trie-plus-wordid scan for explicit intermediate
//! layers already built by `kiwi-automata`/`kiwi-dict`: the dictionary scan
//! uses `kiwi_automata::AhoCorasick`, combined-form expansion calls
//! `kiwi_automata::CombiningRules::combine`, and typo expansion calls
//! `crate::typo::TypoTransformer`.

use std::collections::HashMap;
use std::sync::Arc;

use kiwi_automata::{AhoCorasick, CombiningRules};
use kiwi_dict::{Dictionary, MorphemeId, PosTag, Tag};

use crate::pattern_matcher::{match_pattern, MatchOptions};
use crate::typo::TypoTransformer;

/// One chunk of a lattice node's span: a single underlying morpheme,
/// covering `[begin, end)` of the *original* input. A plain dictionary
/// node has exactly one chunk; a combined-form node has two (the left and
/// right morphemes the rule glued together).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chunk {
    /// The morpheme this chunk is an occurrence of.
    pub morpheme: MorphemeId,
    /// Its tag (carries the irregular-stem bit).
    pub tag: Tag,
    /// Start offset into the input, in jamo code units.
    pub begin: usize,
    /// End offset into the input, in jamo code units.
    pub end: usize,
}

/// One edge of the lattice: candidate morpheme(s) covering `[begin, end)`
/// of the input, with the score a path pays for taking this edge (before
/// any LM context is applied).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    /// Start offset into the input, in jamo code units.
    pub begin: usize,
    /// End offset into the input, in jamo code units.
    pub end: usize,
    /// Actual surface jamo text of this edge. Usually the input slice
    /// itself, but combined-form and typo-corrected nodes substitute a
    /// different spelling than what's literally at `input[begin..end]`.
    pub form: Vec<u16>,
    /// Identity used for LM scoring: the right-hand morpheme for a
    /// combined node, the sole morpheme otherwise.
    pub morpheme: MorphemeId,
    /// This edge's tag (the combined-form's `additional_feature` override,
    /// if any, otherwise the morpheme's own tag).
    pub tag: Tag,
    /// Per-morpheme breakdown, for token reconstruction.
    pub chunks: Vec<Chunk>,
    /// Base score: dictionary `log_prob` plus any rule/typo adjustment,
    /// scaled per `KiwiConfig` for unknown-form nodes.
    pub score: f32,
    /// True if this edge required at least one typo substitution.
    pub is_typo: bool,
}

impl Node {
    fn plain(begin: usize, end: usize, form: Vec<u16>, morph_id: MorphemeId, tag: Tag, score: f32) -> Node {
        Node {
            begin,
            end,
            form,
            morpheme: morph_id,
            tag,
            chunks: vec![Chunk { morpheme: morph_id, tag, begin, end }],
            score,
            is_typo: false,
        }
    }
}

/// The full set of candidate edges produced for one input, bucketed by
/// start position so the decoder can enumerate "every edge leaving
/// position `p`" without a linear scan.
#[derive(Clone, Debug, Default)]
pub struct Lattice {
    nodes: Vec<Node>,
    by_begin: HashMap<usize, Vec<usize>>,
    /// Length of the input this lattice was built over, in jamo units.
    pub len: usize,
}

impl Lattice {
    fn push(&mut self, node: Node) {
        let begin = node.begin;
        let idx = self.nodes.len();
        self.nodes.push(node);
        self.by_begin.entry(begin).or_default().push(idx);
    }

    /// Every edge, regardless of start position.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Every edge starting exactly at `pos`.
    pub fn edges_from(&self, pos: usize) -> impl Iterator<Item = &Node> {
        self.by_begin.get(&pos).into_iter().flatten().map(move |&i| &self.nodes[i])
    }
}

/// Builds a [`Lattice`] over jamo-normalized input text, given a compiled
/// dictionary, its Aho-Corasick trie, combining rules, and (optionally) a
/// typo transformer.
///
/// Holds its inputs behind `Arc` rather than a borrow so a `Kiwi` can own
/// one long-lived builder (trie compiled once at `build()` time) without a
/// self-referential struct.
pub struct LatticeBuilder {
    dict: Arc<Dictionary>,
    trie: AhoCorasick<u32>,
    rules: Arc<CombiningRules>,
    typo: Option<Arc<TypoTransformer>>,
    max_unk_form_size: usize,
    unk_score_scale: f32,
    unk_score_bias: f32,
}

impl LatticeBuilder {
    /// Build the Aho-Corasick trie over `dict`'s forms once, up front, the
    /// same way `KiwiBuilder::build` compiles its trie before any `analyze`
    /// call rather than per query.
    pub fn new(
        dict: Arc<Dictionary>,
        rules: Arc<CombiningRules>,
        typo: Option<Arc<TypoTransformer>>,
        max_unk_form_size: usize,
        unk_score_scale: f32,
        unk_score_bias: f32,
    ) -> LatticeBuilder {
        let mut trie = AhoCorasick::new();
        for (idx, form) in dict.forms().iter().enumerate() {
            trie.insert(&form.form_jamo, idx as u32);
        }
        trie.fill_fail();
        LatticeBuilder {
            dict,
            trie,
            rules,
            typo,
            max_unk_form_size,
            unk_score_scale,
            unk_score_bias,
        }
    }

    /// Build the lattice for `text` (already jamo-normalized UTF-16),
    /// gating the non-dictionary pattern scanners on `options` (§6).
    pub fn build(&self, text: &[u16], options: MatchOptions) -> Lattice {
        let mut lat = Lattice { len: text.len(), ..Lattice::default() };

        self.scan_dictionary(text, &mut lat);
        self.expand_irregular_stems(&mut lat);
        self.expand_combined_forms(text, &mut lat);
        self.scan_patterns(text, options, &mut lat);
        if let Some(typo) = self.typo.as_deref() {
            self.scan_typos(text, typo, &mut lat);
        }
        self.scan_whitespace(text, &mut lat);
        self.fill_unknown_gaps(text, &mut lat);
        lat
    }

    /// Every literal whitespace code unit gets its own single-unit `SP`
    /// node, so the decoder's space-tolerance accounting (§4.7) always has
    /// an explicit edge to take or skip rather than whitespace silently
    /// folding into an unknown-form span.
    fn scan_whitespace(&self, text: &[u16], lat: &mut Lattice) {
        for (i, &unit) in text.iter().enumerate() {
            if matches!(unit, 0x0020 | 0x0009 | 0x000A | 0x000D) {
                lat.push(Node::plain(i, i + 1, vec![unit], u32::MAX, Tag::new(PosTag::SP), 0.0));
            }
        }
    }

    /// Step 1: every dictionary form ending at each position, gated on the
    /// allomorph vowel/polarity condition its entry declares (§4.3b).
    fn scan_dictionary(&self, text: &[u16], lat: &mut Lattice) {
        for (end, &form_idx) in self.trie.scan(text) {
            let form = &self.dict.forms()[form_idx as usize];
            let begin = end - form.form_jamo.len();
            for &morph_id in &form.morphemes {
                let entry = self.dict.entry(morph_id).expect("trie only references live entries");
                if !kiwi_hangul::matches(&text[..begin], entry.cond_vowel, entry.cond_polarity) {
                    continue;
                }
                lat.push(Node::plain(begin, end, entry.form_jamo.clone(), morph_id, entry.tag, entry.log_prob));
            }
        }
    }

    /// Step 2: for verb/adjective stem nodes ending in a coda that triggers
    /// an irregular alternation, also emit the alternate stem spelling
    /// (same span, `irregular` tag bit set), so `combine()` downstream can
    /// match rule groups keyed on either spelling. Grounded on
    /// `kiwi_hangul::{ends_in_coda_h, ends_in_coda_l}`, which exist
    /// specifically for this.
    fn expand_irregular_stems(&self, lat: &mut Lattice) {
        let base: Vec<Node> = lat
            .nodes
            .iter()
            .filter(|n| n.tag.pos.is_verb_class() && !n.tag.irregular)
            .cloned()
            .collect();
        for node in base {
            for (variant, penalty) in irregular_variants(&node.form) {
                let irregular_tag = Tag::irregular(node.tag.pos);
                lat.push(Node::plain(
                    node.begin,
                    node.end,
                    variant,
                    node.morpheme,
                    irregular_tag,
                    node.score + penalty,
                ));
            }
        }
    }

    /// Step 3/4: for every node ending at `p` whose tag is a valid left
    /// member of a rule group, try combining it with every node starting at
    /// `p`; each replacement `CombiningRules::combine` returns becomes one
    /// new edge spanning from the left node's start to wherever the
    /// combined surface ends.
    fn expand_combined_forms(&self, text: &[u16], lat: &mut Lattice) {
        let lefts: Vec<Node> = lat.nodes.iter().filter(|n| n.tag.pos.is_verb_class()).cloned().collect();
        for left in &lefts {
            let rights: Vec<Node> = lat.edges_from(left.end).cloned().collect();
            for right in &rights {
                let results =
                    self.rules.combine(&left.form, left.tag.pos, left.tag.irregular, &right.form, right.tag.pos);
                for r in results {
                    if r.score == 0 && r.additional_feature.is_none() && r.form == {
                        let mut verbatim = left.form.clone();
                        verbatim.extend_from_slice(&right.form);
                        verbatim
                    } {
                        // The unadorned fallback concatenation: already covered by
                        // taking `left` then `right` as two separate edges, so
                        // skip materializing a redundant combined edge for it.
                        continue;
                    }
                    let end = left.begin + r.form.len();
                    if end > text.len() {
                        continue;
                    }
                    let tag = Tag::new(r.additional_feature.unwrap_or(right.tag.pos));
                    let chunks = vec![
                        Chunk { morpheme: left.morpheme, tag: left.tag, begin: left.begin, end: left.begin + r.left_end },
                        Chunk {
                            morpheme: right.morpheme,
                            tag,
                            begin: left.begin + r.right_begin,
                            end,
                        },
                    ];
                    lat.push(Node {
                        begin: left.begin,
                        end,
                        form: r.form,
                        morpheme: right.morpheme,
                        tag,
                        chunks,
                        score: left.score + right.score + r.score as f32,
                        is_typo: false,
                    });
                }
            }
        }
    }

    /// Step 5: pattern-matched nodes (URLs, numbers, emoji, …) via
    /// `crate::pattern_matcher`, gated on the caller's `options`.
    fn scan_patterns(&self, text: &[u16], options: MatchOptions, lat: &mut Lattice) {
        for begin in 0..text.len() {
            let left = if begin == 0 { None } else { Some(text[begin - 1]) };
            if let Some((len, tag)) = match_pattern(left, &text[begin..], options) {
                let end = begin + len;
                let form = text[begin..end].to_vec();
                lat.push(Node::plain(begin, end, form, u32::MAX, Tag::new(tag), 0.0));
            }
        }
    }

    /// Step 6 (optional): for every position with a registered typo
    /// alternative, splice the replacement in and re-run the dictionary
    /// scan locally, charging the rule's cost (scaled by
    /// `KiwiConfig::typo_cost_weight` by the caller) against every node it
    /// produces.
    fn scan_typos(&self, text: &[u16], typo: &TypoTransformer, lat: &mut Lattice) {
        let mut extra = Vec::new();
        for pos in 0..text.len() {
            for (replacement, pattern_len, cost) in typo.alternatives_at(text, pos) {
                let mut spliced = text.to_vec();
                spliced.splice(pos..pos + pattern_len, replacement.iter().copied());
                for (end, &form_idx) in self.trie.scan(&spliced) {
                    // Only keep matches that actually touch the substituted
                    // span; matches entirely outside it are already found
                    // by the untouched scan.
                    let form = &self.dict.forms()[form_idx as usize];
                    let begin = end - form.form_jamo.len();
                    if end <= pos || begin >= pos + replacement.len() {
                        continue;
                    }
                    for &morph_id in &form.morphemes {
                        let entry = self.dict.entry(morph_id).unwrap();
                        if !kiwi_hangul::matches(&spliced[..begin], entry.cond_vowel, entry.cond_polarity) {
                            continue;
                        }
                        let mut node =
                            Node::plain(begin, end, entry.form_jamo.clone(), morph_id, entry.tag, entry.log_prob + cost);
                        node.is_typo = true;
                        extra.push(node);
                    }
                }
            }
        }
        for n in extra {
            lat.push(n);
        }
    }

    /// Step 7: fill any `[p, q)` span with no dictionary/pattern node at all
    /// with a scored unknown-form node so the decoder always has a path
    /// across the whole input.
    fn fill_unknown_gaps(&self, text: &[u16], lat: &mut Lattice) {
        let mut covered = vec![false; text.len() + 1];
        for n in &lat.nodes {
            for p in n.begin..n.end {
                covered[p] = true;
            }
        }
        let mut begin = 0;
        while begin < text.len() {
            if covered[begin] {
                begin += 1;
                continue;
            }
            let max_end = (begin + self.max_unk_form_size).min(text.len());
            for end in (begin + 1)..=max_end {
                let score = self.unk_score_bias + self.unk_score_scale * (end - begin) as f32;
                lat.push(Node::plain(
                    begin,
                    end,
                    text[begin..end].to_vec(),
                    u32::MAX,
                    Tag::new(PosTag::UNKNOWN),
                    score,
                ));
            }
            begin += 1;
        }
    }
}

/// Common irregular-stem alternations keyed on the stem's final jamo,
/// returning `(alternate_spelling, score_penalty)` pairs. Grounded on the
/// canonical ㄷ/ㅂ/ㅅ/ㅎ/르 irregular conjugation classes described in
/// `original_source`'s dictionary notes; this is a fixed small table rather
/// than a learned or dictionary-driven one; the emitted stem keeps its
/// non-final jamo untouched since these alternations only ever touch the
/// stem-final syllable.
fn irregular_variants(stem: &[u16]) -> Vec<(Vec<u16>, f32)> {
    const CODA_D: u16 = 0x11AE; // ㄷ
    const CODA_B: u16 = 0x11B8; // ㅂ
    const CODA_S: u16 = 0x11BA; // ㅅ
    const CODA_H: u16 = 0x11C2; // ㅎ
    const CODA_L: u16 = 0x11AF; // ㄹ
    const EU: u16 = 0x1173; // ㅡ

    let mut out = Vec::new();
    let Some(&last) = stem.last() else { return out };
    let body = &stem[..stem.len() - 1];

    match last {
        CODA_D => {
            let mut v = body.to_vec();
            v.push(CODA_L);
            out.push((v, -0.5));
        }
        CODA_B => {
            // 줍다-class: coda ㅂ -> 우.
            let mut v_u = body.to_vec();
            v_u.push(0x110B); // ㅇ onset for the dropped-coda vowel syllable
            v_u.push(0x116E); // ㅜ
            out.push((v_u, -0.5));

            // 돕다-class: coda ㅂ -> 오.
            let mut v_o = body.to_vec();
            v_o.push(0x110B);
            v_o.push(0x1169); // ㅗ
            out.push((v_o, -0.7));
        }
        CODA_S => {
            out.push((body.to_vec(), -0.5));
        }
        CODA_H => {
            out.push((body.to_vec(), -0.5));
        }
        _ => {}
    }

    // 르-irregular: stem ends in 르 (ㄹ + ㅡ nucleus) with at least one
    // preceding syllable; doubles the coda onto the previous syllable.
    if stem.len() >= 4 {
        let n = stem.len();
        if stem[n - 2] == 0x1105 && stem[n - 1] == EU {
            let mut v = stem[..n - 2].to_vec();
            v.push(CODA_L);
            v.push(stem[n - 2]);
            v.push(stem[n - 1]);
            out.push((v, -0.5));
        }
    }

    // 러-irregular (이르다-class): stem shape is unchanged, but the ending
    // fuses as 러 instead of the usual 아/어 vowel-harmony alternation.
    if stem.len() >= 2 {
        let n = stem.len();
        if stem[n - 2] == 0x1105 && stem[n - 1] == EU {
            let mut v = stem.to_vec();
            v.push(0x1105); // ㄹ onset
            v.push(0x1165); // ㅓ
            out.push((v, -0.5));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiwi_dict::{parse_rule_file, MorphemeEntry};

    fn units(s: &str) -> Vec<u16> {
        kiwi_hangul::normalize_str(s)
    }

    fn empty_rules() -> CombiningRules {
        CombiningRules::compile(&parse_rule_file("VV\tEC\n다$\t.*\t\\1\\2\t\n").unwrap()).unwrap()
    }

    #[test]
    fn dictionary_scan_finds_known_forms() {
        let mut dict = Dictionary::new();
        dict.insert(MorphemeEntry::plain(units("나무"), Tag::new(PosTag::NNG), -2.0));
        let rules = empty_rules();
        let builder = LatticeBuilder::new(Arc::new(dict), Arc::new(rules), None, 6, 1.0, -6.0);
        let text = units("나무");
        let lat = builder.build(&text, MatchOptions::all_with_normalizing());
        assert!(lat.nodes().iter().any(|n| n.begin == 0 && n.end == 2 && n.morpheme == 0));
    }

    #[test]
    fn unknown_gap_is_covered_when_no_entry_matches() {
        let dict = Dictionary::new();
        let rules = empty_rules();
        let builder = LatticeBuilder::new(Arc::new(dict), Arc::new(rules), None, 6, 1.0, -6.0);
        let text = units("모르는말");
        let lat = builder.build(&text, MatchOptions::all_with_normalizing());
        for p in 0..text.len() {
            assert!(lat.edges_from(p).next().is_some(), "no edge leaves position {p}");
        }
    }

    #[test]
    fn combined_form_edge_spans_both_morphemes() {
        let mut dict = Dictionary::new();
        let left = dict.insert(MorphemeEntry::plain(units("가"), Tag::new(PosTag::VV), -1.0));
        let right = dict.insert(MorphemeEntry::plain(units("고"), Tag::new(PosTag::EC), -1.0));
        let _ = (left, right);
        let rules =
            CombiningRules::compile(&parse_rule_file("VV\tEC\n가\t.*\t\\1\\2-1\t\n").unwrap()).unwrap();
        let builder = LatticeBuilder::new(Arc::new(dict), Arc::new(rules), None, 6, 1.0, -6.0);
        let text = units("가고");
        let lat = builder.build(&text, MatchOptions::all_with_normalizing());
        assert!(lat.nodes().iter().any(|n| n.begin == 0 && n.end == 2 && n.chunks.len() == 2));
    }

    #[test]
    fn allomorph_gate_rejects_wrong_context() {
        let mut dict = Dictionary::new();
        let mut entry = MorphemeEntry::plain(units("를"), Tag::new(PosTag::JKO), -1.0);
        entry.cond_vowel = kiwi_hangul::CondVowel::Vocalic;
        entry.allomorph_group = Some(1);
        dict.insert(entry);
        let rules = empty_rules();
        let builder = LatticeBuilder::new(Arc::new(dict), Arc::new(rules), None, 6, 1.0, -6.0);
        let text = units("밥를");
        let lat = builder.build(&text, MatchOptions::all_with_normalizing());
        assert!(!lat.nodes().iter().any(|n| n.begin == 1 && n.end == 3 && n.tag.pos == PosTag::JKO));
    }
}
