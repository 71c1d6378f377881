//! `AutoJoiner` (§4.9): composes a sequence of `(form, tag)` morphemes back
//! into a surface string by applying combining rules pairwise, left to
//! right, exactly as `Joiner.cpp::add` does against its `stack` buffer and
//! `activeStart` cursor.

use kiwi_automata::CombiningRules;
use kiwi_dict::{AllomorphTable, PosTag};

use crate::tag_rules::is_space_insertable;

const EO: [u16; 2] = [0x110B, 0x1165]; // 어
const A: [u16; 2] = [0x110B, 0x1161]; // 아
const SPACE: u16 = 0x0020;

/// Joins `(form, tag)` morphemes into a single surface string.
///
/// `lm_search` scoring, when present, is consulted only when a combining
/// rule yields more than one replacement candidate, to pick the surface
/// the language model finds most plausible rather than always taking the
/// first rule in file order.
pub struct AutoJoiner<'a> {
    rules: &'a CombiningRules,
    allomorphs: &'a AllomorphTable,
    lm_scorer: Option<Box<dyn Fn(&[u16]) -> f32 + 'a>>,
    buffer: Vec<u16>,
    active_start: usize,
    last_tag: Option<PosTag>,
}

impl<'a> AutoJoiner<'a> {
    /// A fresh joiner with an empty buffer. `lm_scorer`, if given, scores
    /// a full candidate surface (higher is better) for `lm_search` mode.
    pub fn new(
        rules: &'a CombiningRules,
        allomorphs: &'a AllomorphTable,
        lm_scorer: Option<Box<dyn Fn(&[u16]) -> f32 + 'a>>,
    ) -> AutoJoiner<'a> {
        AutoJoiner { rules, allomorphs, lm_scorer, buffer: Vec::new(), active_start: 0, last_tag: None }
    }

    /// Append one morpheme, combining it with whatever's already buffered.
    pub fn add(&mut self, form: &[u16], tag: PosTag) -> &mut Self {
        let Some(prev_tag) = self.last_tag else {
            self.active_start = 0;
            self.buffer.extend_from_slice(form);
            self.last_tag = Some(tag);
            return self;
        };

        if is_space_insertable(prev_tag, tag) {
            self.buffer.push(SPACE);
            self.active_start = self.buffer.len();
            self.buffer.extend_from_slice(form);
            self.last_tag = Some(tag);
            return self;
        }

        let mut incoming = self.select_allomorph(form, tag);
        if tag.is_e_class() && incoming.starts_with(&A) {
            incoming.splice(0..A.len(), EO.iter().copied());
        }

        let left_suffix = self.buffer[self.active_start..].to_vec();
        let candidates = self.rules.combine(&left_suffix, prev_tag, false, &incoming, tag);
        let chosen = self.pick(&left_suffix, &candidates);

        self.buffer.truncate(self.active_start);
        self.buffer.extend_from_slice(&chosen.form);
        self.active_start += chosen.left_end;
        self.last_tag = Some(chosen.additional_feature.unwrap_or(tag));
        self
    }

    fn select_allomorph(&self, form: &[u16], tag: PosTag) -> Vec<u16> {
        if !(tag.is_j_class() || tag.is_e_class()) {
            return form.to_vec();
        }
        let last_cvocalic = kiwi_hangul::matches_vowel(&self.buffer, kiwi_hangul::CondVowel::Vocalic);
        let raw_vowel = if kiwi_hangul::matches_vowel(&self.buffer, kiwi_hangul::CondVowel::Vowel) {
            kiwi_hangul::CondVowel::Vowel
        } else {
            kiwi_hangul::CondVowel::NonVowel
        };
        match self.allomorphs.select(tag, form, last_cvocalic, raw_vowel) {
            Some(allomorph) => allomorph.form.clone(),
            None => form.to_vec(),
        }
    }

    fn pick<'r>(
        &self,
        left_suffix: &[u16],
        candidates: &'r [kiwi_automata::CombineResult],
    ) -> &'r kiwi_automata::CombineResult {
        if candidates.len() == 1 {
            return &candidates[0];
        }
        match &self.lm_scorer {
            Some(scorer) => candidates
                .iter()
                .max_by(|a, b| {
                    let sa = scorer(&full_candidate(&self.buffer, self.active_start, &a.form));
                    let sb = scorer(&full_candidate(&self.buffer, self.active_start, &b.form));
                    sa.partial_cmp(&sb).unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(&candidates[0]),
            None => {
                let _ = left_suffix;
                &candidates[0]
            }
        }
    }

    /// The composed surface string (via the Hangul codec's `join`).
    pub fn join(&self) -> String {
        kiwi_hangul::join_to_string(&self.buffer)
    }

    /// The composed surface string's raw jamo buffer, for callers that
    /// want to keep working in jamo form.
    pub fn jamo(&self) -> &[u16] {
        &self.buffer
    }
}

fn full_candidate(buffer: &[u16], active_start: usize, replacement: &[u16]) -> Vec<u16> {
    let mut out = buffer[..active_start].to_vec();
    out.extend_from_slice(replacement);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiwi_dict::parse_rule_file;
    use kiwi_dict::PosTag as Tag;

    fn units(s: &str) -> Vec<u16> {
        kiwi_hangul::normalize_str(s)
    }

    #[test]
    fn space_insertable_pair_gets_a_space() {
        let rules = CombiningRules::compile(&parse_rule_file("VV\tEC\n다$\t.*\t\\1\\2\t\n").unwrap()).unwrap();
        let allomorphs = AllomorphTable::new();
        let mut j = AutoJoiner::new(&rules, &allomorphs, None);
        j.add(&units("나"), Tag::NP);
        j.add(&units("오늘"), Tag::NNG);
        assert_eq!(j.join(), "나 오늘");
    }

    #[test]
    fn no_rule_group_falls_back_to_verbatim_concat() {
        let rules = CombiningRules::compile(&parse_rule_file("VV\tEC\n다$\t.*\t\\1\\2\t\n").unwrap()).unwrap();
        let allomorphs = AllomorphTable::new();
        let mut j = AutoJoiner::new(&rules, &allomorphs, None);
        j.add(&units("가"), Tag::VV);
        j.add(&units("고"), Tag::EC);
        assert_eq!(j.join(), "가고");
    }

    #[test]
    fn allomorph_group_substitutes_vowel_final_variant() {
        let rules = CombiningRules::compile(&parse_rule_file("NNG\tJKO\n^\t.*\t\\1\\2\t\n").unwrap()).unwrap();
        let mut allomorphs = AllomorphTable::new();
        allomorphs.register(
            Tag::JKO,
            units("을"),
            vec![
                kiwi_dict::Allomorph {
                    form: units("를"),
                    cond_vowel: kiwi_hangul::CondVowel::Vocalic,
                    priority: 0,
                },
                kiwi_dict::Allomorph {
                    form: units("을"),
                    cond_vowel: kiwi_hangul::CondVowel::NonVowel,
                    priority: 0,
                },
            ],
        );
        let mut j = AutoJoiner::new(&rules, &allomorphs, None);
        j.add(&units("시동"), Tag::NNG);
        j.add(&units("을"), Tag::JKO);
        assert_eq!(j.join(), "시동을");
    }
}
