//! k-best Viterbi decoder over a [`crate::lattice::Lattice`] (§4.7).
//!
//! Runs a standard left-to-right dynamic program, keeping a bounded,
//! cost-sorted beam of partial paths at every jamo position rather than a
//! single best-so-far, so the final top-N extraction at the end position
//! is just "take the first N entries of the last beam".
//!
//! Two constraints from §4.11/§6 are enforced here rather than upstream in
//! `Lattice`, since both depend on *sequences* of edges, not individual
//! ones: pre-tokenized span alignment and the block list.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::rc::Rc;

use kiwi_dict::{MorphemeId, PosTag, Tag};

use crate::config::KiwiConfig;
use crate::language_model::LanguageModel;
use crate::lattice::{Chunk, Lattice, Node};
use crate::tag_rules::{is_allowed_seq, is_space_insertable};

/// A caller-pinned span forcing decoder boundaries to align with it.
/// Offsets are jamo units, matching `Lattice`'s coordinate space.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PretokenizedSpan {
    /// Start offset, in jamo units.
    pub begin: usize,
    /// End offset, in jamo units.
    pub end: usize,
    /// If set, pins which morphemes may occur inside the span. A single
    /// edge spanning the whole range is accepted only when it names the
    /// sole pinned morpheme; a multi-morpheme pin is otherwise enforced by
    /// restricting edges inside the span to the pinned set, not by
    /// pinning their exact order (full chain pinning is not implemented).
    pub subtokens: Option<Vec<MorphemeId>>,
}

/// One complete decoded path.
#[derive(Clone, Debug)]
pub struct DecodeResult {
    /// Morpheme chunks covering the whole input, in left-to-right order.
    pub steps: Vec<Chunk>,
    /// Total path cost (lower is better).
    pub cost: f32,
}

struct PathNode<S> {
    prev: Option<Rc<PathNode<S>>>,
    chunks: Vec<Chunk>,
    edge_morpheme: MorphemeId,
    tag: Option<PosTag>,
    cost: f32,
    lm_state: S,
    space_violations: u32,
}

fn cmp_path<S>(a: &PathNode<S>, b: &PathNode<S>) -> Ordering {
    match a.cost.partial_cmp(&b.cost) {
        Some(Ordering::Equal) | None => {}
        Some(o) => return o,
    }
    match a.edge_morpheme.cmp(&b.edge_morpheme) {
        Ordering::Equal => {}
        o => return o,
    }
    match (&a.prev, &b.prev) {
        (Some(ap), Some(bp)) => cmp_path(ap, bp),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

fn insert_bounded<S>(beam: &mut Vec<Rc<PathNode<S>>>, candidate: Rc<PathNode<S>>, width: usize) {
    let pos = beam.partition_point(|e| cmp_path(e, &candidate) != Ordering::Greater);
    beam.insert(pos, candidate);
    beam.truncate(width);
}

fn pretok_allows(edge: &Node, spans: &[PretokenizedSpan]) -> bool {
    for span in spans {
        let overlaps = edge.begin < span.end && edge.end > span.begin;
        if !overlaps {
            continue;
        }
        let aligned = edge.begin >= span.begin && edge.end <= span.end;
        if !aligned {
            return false;
        }
        if let Some(subtokens) = &span.subtokens {
            if edge.begin == span.begin && edge.end == span.end {
                if subtokens.len() != 1 || edge.morpheme != subtokens[0] {
                    return false;
                }
            } else if !edge.chunks.iter().all(|c| subtokens.contains(&c.morpheme)) {
                return false;
            }
        }
    }
    true
}

const BOUNDARY_PROPER_NOUN_PENALTY: f32 = 0.3;
const BOUNDARY_AFFIX_PENALTY: f32 = 0.5;

fn boundary_penalty(at_left_edge: bool, at_right_edge: bool, tag: PosTag) -> f32 {
    let mut penalty = 0.0;
    if at_left_edge && matches!(tag, PosTag::NNP | PosTag::NP) {
        penalty += BOUNDARY_PROPER_NOUN_PENALTY;
    }
    if (at_left_edge || at_right_edge) && (tag.is_e_class() || tag.is_j_class() || tag.is_suffix()) {
        penalty += BOUNDARY_AFFIX_PENALTY;
    }
    penalty
}

/// Decode `lat` with `lm`, returning up to `top_n` complete paths sorted
/// ascending by cost.
pub fn decode<L: LanguageModel>(
    lat: &Lattice,
    lm: &L,
    cfg: &KiwiConfig,
    top_n: usize,
    block_list: &HashSet<MorphemeId>,
    pretokenized: &[PretokenizedSpan],
) -> Vec<DecodeResult> {
    let beam_width = top_n.max(8);
    let mut beams: Vec<Vec<Rc<PathNode<L::State>>>> = vec![Vec::new(); lat.len + 1];
    beams[0].push(Rc::new(PathNode {
        prev: None,
        chunks: Vec::new(),
        edge_morpheme: 0,
        tag: None,
        cost: 0.0,
        lm_state: lm.initial_state(),
        space_violations: 0,
    }));

    for p in 0..lat.len {
        if beams[p].is_empty() {
            continue;
        }
        let entries = beams[p].clone();
        for entry in &entries {
            for edge in lat.edges_from(p) {
                if edge.chunks.iter().any(|c| block_list.contains(&c.morpheme)) {
                    continue;
                }
                if !pretok_allows(edge, pretokenized) {
                    continue;
                }
                if let Some(prev_tag) = entry.tag {
                    if !is_allowed_seq(prev_tag, edge.tag.pos) {
                        continue;
                    }
                }

                let mut violations = entry.space_violations;
                if edge.tag.pos != PosTag::SP {
                    if let Some(prev_tag) = entry.tag {
                        if prev_tag != PosTag::SP && is_space_insertable(prev_tag, edge.tag.pos) {
                            violations += 1;
                        }
                    }
                }
                if violations > cfg.space_tolerance {
                    continue;
                }

                let (logp, next_state) = lm.score_next(&entry.lm_state, edge.morpheme);
                let space_cost = (violations - entry.space_violations) as f32 * cfg.space_penalty;
                let at_left = entry.prev.is_none();
                let at_right = edge.end == lat.len;
                let cost = entry.cost - logp - edge.score + space_cost
                    + boundary_penalty(at_left, at_right, edge.tag.pos);

                let candidate = Rc::new(PathNode {
                    prev: Some(entry.clone()),
                    chunks: edge.chunks.clone(),
                    edge_morpheme: edge.morpheme,
                    tag: Some(edge.tag.pos),
                    cost,
                    lm_state: next_state,
                    space_violations: violations,
                });
                insert_bounded(&mut beams[edge.end], candidate, beam_width);
            }
        }
    }

    beams[lat.len]
        .iter()
        .take(top_n)
        .map(|entry| {
            let mut steps = Vec::new();
            let mut cur = Some(entry.clone());
            while let Some(node) = cur {
                let mut chunks = node.chunks.clone();
                chunks.reverse();
                steps.extend(chunks);
                cur = node.prev.clone();
            }
            steps.reverse();
            DecodeResult { steps, cost: entry.cost }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::language_model::TableLanguageModel;
    use crate::lattice::LatticeBuilder;
    use crate::pattern_matcher::MatchOptions;
    use kiwi_automata::CombiningRules;
    use kiwi_dict::{parse_rule_file, Dictionary, MorphemeEntry};

    fn units(s: &str) -> Vec<u16> {
        kiwi_hangul::normalize_str(s)
    }

    #[test]
    fn decode_picks_dictionary_path_over_unknown() {
        let mut dict = Dictionary::new();
        dict.insert(MorphemeEntry::plain(units("나무"), Tag::new(PosTag::NNG), -1.0));
        let rules = CombiningRules::compile(&parse_rule_file("VV\tEC\n다$\t.*\t\\1\\2\t\n").unwrap()).unwrap();
        let builder = LatticeBuilder::new(Arc::new(dict), Arc::new(rules), None, 6, 1.0, -6.0);
        let text = units("나무");
        let lat = builder.build(&text, MatchOptions::all_with_normalizing());
        let lm = TableLanguageModel::new(-10.0);
        let cfg = KiwiConfig::default();
        let results = decode(&lat, &lm, &cfg, 3, &HashSet::new(), &[]);
        assert!(!results.is_empty());
        let best = &results[0];
        assert_eq!(best.steps.len(), 1);
        assert_eq!(best.steps[0].tag.pos, PosTag::NNG);
    }

    #[test]
    fn block_list_excludes_blocked_morpheme() {
        let mut dict = Dictionary::new();
        let id = dict.insert(MorphemeEntry::plain(units("나무"), Tag::new(PosTag::NNG), -1.0));
        dict.insert(MorphemeEntry::plain(units("나"), Tag::new(PosTag::NP), -2.0));
        dict.insert(MorphemeEntry::plain(units("무"), Tag::new(PosTag::NNG), -2.0));
        let rules = CombiningRules::compile(&parse_rule_file("VV\tEC\n다$\t.*\t\\1\\2\t\n").unwrap()).unwrap();
        let builder = LatticeBuilder::new(Arc::new(dict), Arc::new(rules), None, 6, 1.0, -6.0);
        let text = units("나무");
        let lat = builder.build(&text, MatchOptions::all_with_normalizing());
        let lm = TableLanguageModel::new(-10.0);
        let cfg = KiwiConfig::default();
        let mut blocked = HashSet::new();
        blocked.insert(id);
        let results = decode(&lat, &lm, &cfg, 3, &blocked, &[]);
        assert!(!results[0].steps.iter().any(|c| c.morpheme == id));
    }
}
