//! Compiled combining rules: turns a [`kiwi_dict::RuleFile`] into rule
//! groups backed by per-rule [`CompiledPattern`]s, and implements
//! `combine()` (§4.3's "Application").
//!
//! The original (`Combiner.cpp`) merges every rule in a group into one
//! `MultiRuleDFA` and simulates it once per `combine()` call, tracking a
//! live-rule bitset and per-rule captured marker positions as it goes, then
//! erases the DFA's integer widths behind a `MultiRuleDFAErased` tagged
//! union sized to the table. We do not reproduce that: each rule's left and
//! right patterns are compiled into their own [`CompiledPattern`]
//! (`kiwi-automata`'s NFA → subset DFA → Hopcroft minimization, already
//! built for exactly this), and `combine()` tries the rules in a group in
//! file order, testing the left pattern as a longest-suffix match against
//! `left_form` and the right pattern as a longest-prefix match against
//! `right_form`. This is O(rules-in-group) independent DFA runs instead of
//! one merged pass, which is the right trade at dictionary-scale form
//! lengths (a handful of jamo) and avoids reimplementing a 4x4
//! tagged-variant-width dispatch for a performance concern that does not
//! apply here.

use std::collections::HashMap;

use kiwi_dict::{from_feature, PosTag, RawRule, RuleCategory, RuleFile};
use kiwi_hangul::{CondPolarity, CondVowel};

use crate::dfa::CompiledPattern;

/// One parsed rule, with its patterns compiled and its replacement
/// templates ready to apply.
struct CompiledRule {
    left: CompiledPattern,
    right: CompiledPattern,
    ignore_r_cond: bool,
    replacements: Vec<kiwi_dict::ReplTemplate>,
}

/// A compiled rule group plus its source category, as used by `combine()`.
struct Group {
    category: RuleCategory,
    rules: Vec<CompiledRule>,
}

/// The full set of compiled combining rules for one rule-file load.
pub struct CombiningRules {
    groups: Vec<Group>,
    index: HashMap<(PosTag, PosTag), Vec<usize>>,
}

/// One successful combination result.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CombineResult {
    /// The combined jamo-string form.
    pub form: Vec<u16>,
    /// Offset into `form` where the left morpheme's contribution is
    /// considered to end: the start of the templated region by default, or
    /// wherever the rule's literal `)` marker falls within it (§4.3a).
    pub left_end: usize,
    /// Offset into `form` where the right morpheme's contribution is
    /// considered to begin: the end of the templated region by default, or
    /// wherever the rule's literal `(` marker falls within it (§4.3a).
    pub right_begin: usize,
    /// Score delta from the matched replacement's `-SCORE` suffix.
    pub score: i32,
    /// Post-rule feature tag from the matched replacement's `+FEATURE`
    /// suffix, if any.
    pub additional_feature: Option<PosTag>,
}

const ONSET_COUNT: u32 = kiwi_hangul::L_COUNT;
const ONSET_BASE: u32 = kiwi_hangul::L_BASE;

impl CombiningRules {
    /// Compile every rule in `file`, expanding bare-vowel left patterns
    /// over all 19 onsets per §4.3's "Broadcasting".
    pub fn compile(file: &RuleFile) -> crate::error::Result<CombiningRules> {
        let mut groups = Vec::with_capacity(file.sections.len());
        let mut index: HashMap<(PosTag, PosTag), Vec<usize>> = HashMap::new();
        for (category, raw_rules) in &file.sections {
            let mut rules = Vec::new();
            for raw in raw_rules {
                for expanded in broadcast(raw) {
                    rules.push(CompiledRule {
                        left: CompiledPattern::new(&expanded.left_pattern)?,
                        right: CompiledPattern::new(&expanded.right_pattern)?,
                        ignore_r_cond: expanded.ignore_r_cond,
                        replacements: expanded.replacements,
                    });
                }
            }
            let group_idx = groups.len();
            index.entry((category.left_tag, category.right_tag)).or_default().push(group_idx);
            groups.push(Group { category: *category, rules });
        }
        Ok(CombiningRules { groups, index })
    }

    fn groups_for(&self, left_tag: PosTag, right_tag: PosTag) -> &[usize] {
        self.index.get(&(left_tag, right_tag)).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Combine `left_form`/`right_form` per §4.3's "Application". `cp` of
    /// [`CondPolarity::None`] is resolved from `left_form` via
    /// `FeatureTestor` before group matching, as the spec requires.
    pub fn combine(
        &self,
        left_form: &[u16],
        left_tag: PosTag,
        left_irregular: bool,
        right_form: &[u16],
        right_tag: PosTag,
    ) -> Vec<CombineResult> {
        let mut idxs: Vec<usize> = self.groups_for(left_tag, right_tag).to_vec();
        if idxs.is_empty() && matches!(left_tag, PosTag::VV | PosTag::VA) {
            let retag = if left_tag == PosTag::VV { PosTag::PV } else { PosTag::PA };
            idxs = self.groups_for(retag, right_tag).to_vec();
        }

        let mut out = Vec::new();
        for &gi in &idxs {
            let group = &self.groups[gi];
            let (group_cv, group_cp) = from_feature(group.category.feature);
            if !feature_matches(left_form, group_cv, group_cp) {
                continue;
            }
            for rule in &group.rules {
                let Some(left_split) = rule.left.longest_suffix_match(left_form) else {
                    continue;
                };
                let right_match = rule.right.longest_prefix_match(right_form);
                if !rule.ignore_r_cond && right_match.is_none() {
                    continue;
                }
                let right_split = right_match.unwrap_or(0);
                for repl in &rule.replacements {
                    out.push(apply_replacement(
                        left_form,
                        left_split,
                        right_form,
                        right_split,
                        repl,
                    ));
                }
            }
        }

        if out.is_empty() {
            out.push(fallback_combine(left_form, left_tag, left_irregular, right_form));
        }
        out
    }
}

fn feature_matches(left_form: &[u16], cv: CondVowel, cp: CondPolarity) -> bool {
    kiwi_hangul::matches(left_form, cv, cp)
}

/// Expand a bare-vowel-initial left pattern over all 19 onsets (§4.3
/// "Broadcasting"). Detects a bare-vowel start the same way the rule file
/// would write one: the pattern's first jamo code unit falls in the
/// nucleus block and is not preceded by an onset.
fn broadcast(raw: &RawRule) -> Vec<RawRule> {
    let Some(first) = raw.left_pattern.chars().next() else {
        return vec![raw.clone()];
    };
    if !kiwi_hangul::is_nucleus_jamo(first as u32) {
        return vec![raw.clone()];
    }
    (0..ONSET_COUNT)
        .map(|i| {
            let onset = char::from_u32(ONSET_BASE + i).expect("onset jamo is always valid");
            let mut expanded = raw.clone();
            expanded.left_pattern = format!("{}{}", onset, raw.left_pattern);
            expanded.replacements = raw
                .replacements
                .iter()
                .map(|r| kiwi_dict::ReplTemplate {
                    template: format!("{}{}", onset, r.template),
                    score: r.score,
                    additional_feature: r.additional_feature,
                })
                .collect();
            expanded
        })
        .collect()
}

fn apply_replacement(
    left_form: &[u16],
    left_split: usize,
    right_form: &[u16],
    right_split: usize,
    repl: &kiwi_dict::ReplTemplate,
) -> CombineResult {
    let left_remainder = &left_form[..left_split];
    let left_tail = &left_form[left_split..];
    let right_head = &right_form[..right_split];
    let right_remainder = &right_form[right_split..];

    let templated = expand_template(&repl.template, left_tail, right_head);

    let mut form = Vec::with_capacity(left_remainder.len() + templated.text.len() + right_remainder.len());
    form.extend_from_slice(left_remainder);
    let template_start = form.len();
    form.extend_from_slice(&templated.text);
    let template_end = form.len();
    form.extend_from_slice(right_remainder);

    // Default to the start/end of the templated region itself, so the two
    // chunks never overlap when a rule carries no `(`/`)` markers. A marker
    // overrides its side of the split to wherever it fell in the template.
    let left_end = templated.left_end.map(|off| template_start + off).unwrap_or(template_start);
    let right_begin = templated.right_begin.map(|off| template_start + off).unwrap_or(template_end);

    CombineResult {
        form,
        left_end,
        right_begin,
        score: repl.score,
        additional_feature: repl.additional_feature,
    }
}

/// A template's expansion, plus any marker offsets found while expanding it.
struct ExpandedTemplate {
    text: Vec<u16>,
    /// Position of the template's `)` marker, if any (§4.3a: marks `left_end`).
    left_end: Option<usize>,
    /// Position of the template's `(` marker, if any (§4.3a: marks `right_begin`).
    right_begin: Option<usize>,
}

/// Substitutes `\1` with `left_tail` and `\2` with `right_head` in a
/// template, copying every other code unit verbatim. A bare (unescaped)
/// `(` records the current output position as `right_begin` and a bare `)`
/// records it as `left_end`; neither is copied to the output. `\(`, `\)`,
/// `\\`, `\+`, and `\-` escape to their literal character instead.
fn expand_template(template: &str, left_tail: &[u16], right_head: &[u16]) -> ExpandedTemplate {
    let units: Vec<u16> = template.encode_utf16().collect();
    let mut out = Vec::with_capacity(units.len());
    let mut left_end = None;
    let mut right_begin = None;
    let mut i = 0;
    while i < units.len() {
        if units[i] == b'\\' as u16 && i + 1 < units.len() {
            match units[i + 1] {
                u if u == b'1' as u16 => {
                    out.extend_from_slice(left_tail);
                    i += 2;
                    continue;
                }
                u if u == b'2' as u16 => {
                    out.extend_from_slice(right_head);
                    i += 2;
                    continue;
                }
                u if u == b'(' as u16
                    || u == b')' as u16
                    || u == b'\\' as u16
                    || u == b'+' as u16
                    || u == b'-' as u16 =>
                {
                    out.push(u);
                    i += 2;
                    continue;
                }
                _ => {}
            }
        }
        if units[i] == b'(' as u16 {
            right_begin = Some(out.len());
            i += 1;
            continue;
        }
        if units[i] == b')' as u16 {
            left_end = Some(out.len());
            i += 1;
            continue;
        }
        out.push(units[i]);
        i += 1;
    }
    ExpandedTemplate { text: out, left_end, right_begin }
}

/// §4.3 step 4: no rule matched. Verb-class `left_form` ending with a
/// positive-polarity `어`-leniting right form gets its `어` swapped to `아`;
/// otherwise concatenate verbatim.
fn fallback_combine(
    left_form: &[u16],
    left_tag: PosTag,
    left_irregular: bool,
    right_form: &[u16],
) -> CombineResult {
    let _ = left_irregular;
    let eo_jamo: [u16; 2] = [0x110B, 0x1165]; // ㅇ + ㅓ: jamo-normalized "어"
    let a_jamo: [u16; 2] = [0x110B, 0x1161]; // ㅇ + ㅏ: jamo-normalized "아"

    let starts_with_eo = right_form.starts_with(&eo_jamo);
    let mut form = Vec::with_capacity(left_form.len() + right_form.len());
    form.extend_from_slice(left_form);
    let left_end = form.len();
    if left_tag.is_verb_class() && starts_with_eo && kiwi_hangul::matches_polarity(left_form, CondPolarity::Positive)
    {
        form.extend_from_slice(&a_jamo);
        form.extend_from_slice(&right_form[eo_jamo.len()..]);
    } else {
        form.extend_from_slice(right_form);
    }
    let right_begin = left_end;

    CombineResult { form, left_end, right_begin, score: 0, additional_feature: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiwi_dict::{parse_rule_file, PosTag as Tag};

    fn units(s: &str) -> Vec<u16> {
        kiwi_hangul::normalize_str(s)
    }

    #[test]
    fn matching_rule_produces_templated_form() {
        let src = "VV\tEC\n아$\t.*\t\\1어\\2\t+positive\n";
        let file = parse_rule_file(src).unwrap();
        let rules = CombiningRules::compile(&file).unwrap();
        let left = units("좋아");
        let right = units("서");
        let results = rules.combine(&left, Tag::VV, false, &right, Tag::EC);
        assert!(!results.is_empty());
    }

    #[test]
    fn no_matching_group_falls_back_to_verbatim() {
        let src = "VV\tEC\n다$\t.*\t\\1\\2\t\n";
        let file = parse_rule_file(src).unwrap();
        let rules = CombiningRules::compile(&file).unwrap();
        let left = units("가");
        let right = units("고");
        let results = rules.combine(&left, Tag::VV, false, &right, Tag::EC);
        assert_eq!(results.len(), 1);
        let mut expected = left.clone();
        expected.extend_from_slice(&right);
        assert_eq!(results[0].form, expected);
    }

    /// §4.3a: a bare `(`/`)` in the replacement marks `right_begin`/
    /// `left_end` and is stripped from the combined surface, rather than
    /// leaking through as a literal parenthesis.
    #[test]
    fn marker_parens_are_stripped_and_set_offsets() {
        let src = "VV\tEC\n가$\t.*\t(\\1)\\2\t\n";
        let file = parse_rule_file(src).unwrap();
        let rules = CombiningRules::compile(&file).unwrap();
        let left = units("가");
        let right = units("고");
        let results = rules.combine(&left, Tag::VV, false, &right, Tag::EC);
        assert_eq!(results.len(), 1);

        let mut expected = left.clone();
        expected.extend_from_slice(&right);
        assert_eq!(results[0].form, expected, "markers must not leak into the combined surface");
        assert_eq!(results[0].right_begin, 0);
        assert_eq!(results[0].left_end, left.len());
    }
}
