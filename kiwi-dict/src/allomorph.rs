//! Allomorph registration table (§4.3b), grounded on
//! `CompiledRule::addAllomorph`/`allomorphPtrMap`.

use std::collections::HashMap;

use kiwi_hangul::CondVowel;

use crate::tag::PosTag;

/// One registered allomorph variant: a surface form plus the vowel context
/// it requires and a tie-break priority.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Allomorph {
    /// Jamo-normalized surface form of this variant.
    pub form: Vec<u16>,
    /// Vowel context this variant is selected under.
    pub cond_vowel: CondVowel,
    /// Higher wins when multiple variants share `cond_vowel = Vocalic`.
    pub priority: u8,
}

/// Maps `(tag, lemma key)` to its registered allomorph variants, e.g. the
/// `{을, 를}` group for `JKO`.
#[derive(Clone, Debug, Default)]
pub struct AllomorphTable {
    groups: HashMap<(PosTag, Vec<u16>), Vec<Allomorph>>,
}

impl AllomorphTable {
    /// A table with no groups registered.
    pub fn new() -> AllomorphTable {
        AllomorphTable::default()
    }

    /// Register a group of allomorphs sharing `(tag, key)`. `key` is the
    /// canonical lemma form used to look the group back up (e.g. the
    /// vowel-final member's jamo, by convention).
    pub fn register(&mut self, tag: PosTag, key: Vec<u16>, forms: Vec<Allomorph>) {
        self.groups.entry((tag, key)).or_default().extend(forms);
    }

    /// Resolve the allomorph group registered for `(tag, key)`, if any.
    pub fn group(&self, tag: PosTag, key: &[u16]) -> Option<&[Allomorph]> {
        self.groups.get(&(tag, key.to_vec())).map(|v| v.as_slice())
    }

    /// Select the form to use given the preceding context: `last_cvocalic`
    /// is whether the immediately preceding jamo makes the stem "vocalic"
    /// (ends in a vowel or coda-ㄹ); `raw_vowel` is the strict
    /// vowel/non-vowel reading of that same jamo, used when no entry
    /// declares `Vocalic`.
    ///
    /// Matches among entries with `cond_vowel == Vocalic` break by
    /// descending `priority`; registration order is otherwise irrelevant.
    pub fn select(
        &self,
        tag: PosTag,
        key: &[u16],
        last_cvocalic: bool,
        raw_vowel: CondVowel,
    ) -> Option<&Allomorph> {
        let group = self.group(tag, key)?;
        if last_cvocalic {
            if let Some(best) =
                group.iter().filter(|a| a.cond_vowel == CondVowel::Vocalic).max_by_key(|a| a.priority)
            {
                return Some(best);
            }
        }
        group.iter().find(|a| a.cond_vowel == raw_vowel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_vocalic_variant_for_vowel_final_stem() {
        let mut table = AllomorphTable::new();
        table.register(
            PosTag::JKO,
            vec![0x1169], // 오 key, arbitrary
            vec![
                Allomorph { form: vec![0x1105], cond_vowel: CondVowel::Vocalic, priority: 1 },
                Allomorph { form: vec![0x110b, 0x1173, 0x11af], cond_vowel: CondVowel::NonVowel, priority: 0 },
            ],
        );
        let picked = table
            .select(PosTag::JKO, &[0x1169], true, CondVowel::Vowel)
            .unwrap();
        assert_eq!(picked.cond_vowel, CondVowel::Vocalic);
    }

    #[test]
    fn ties_break_by_descending_priority() {
        let mut table = AllomorphTable::new();
        table.register(
            PosTag::JX,
            vec![0x1161],
            vec![
                Allomorph { form: vec![1], cond_vowel: CondVowel::Vocalic, priority: 5 },
                Allomorph { form: vec![2], cond_vowel: CondVowel::Vocalic, priority: 9 },
            ],
        );
        let picked = table.select(PosTag::JX, &[0x1161], true, CondVowel::Vowel).unwrap();
        assert_eq!(picked.priority, 9);
    }
}
