//! Morpheme entries and the forms that index them.

use kiwi_hangul::{CondPolarity, CondVowel};

use crate::tag::Tag;

/// Identifies a morpheme entry within a [`Dictionary`](crate::Dictionary)'s
/// entry table.
pub type MorphemeId = u32;

/// A back-pointer pair recording which two base morphemes a combined entry
/// was produced from, plus the chunk tags spanning the replacement.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CombinedFrom {
    /// The left base morpheme.
    pub left: MorphemeId,
    /// The right base morpheme.
    pub right: MorphemeId,
    /// Tags for each chunk of the combined surface, in order.
    pub chunk_tags: Vec<Tag>,
}

/// A single morpheme entry: `(form_jamo, tag, sense_id, log_prob, cond_vowel,
/// cond_polarity, combined?, allomorph_group)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MorphemeEntry {
    /// Surface form, in jamo-normalized code units.
    pub form_jamo: Vec<u16>,
    /// Part-of-speech tag (plus irregular flag).
    pub tag: Tag,
    /// Disambiguates homographs sharing `(form_jamo, tag)`.
    pub sense_id: u32,
    /// Base-e log probability contributed by this entry alone (before LM
    /// context is applied).
    pub log_prob: f32,
    /// Vowel condition this entry requires of whatever precedes it, or
    /// `None` if this entry is not itself an allomorph.
    pub cond_vowel: CondVowel,
    /// Polarity condition this entry requires of whatever precedes it.
    pub cond_polarity: CondPolarity,
    /// Present iff this entry was produced by applying a combining rule to
    /// two base entries.
    pub combined_from: Option<CombinedFrom>,
    /// Key shared by every allomorph of this entry's lemma, or `None`.
    pub allomorph_group: Option<u32>,
}

impl MorphemeEntry {
    /// A plain (non-combined, non-allomorph) entry.
    pub fn plain(form_jamo: Vec<u16>, tag: Tag, log_prob: f32) -> MorphemeEntry {
        MorphemeEntry {
            form_jamo,
            tag,
            sense_id: 0,
            log_prob,
            cond_vowel: CondVowel::None,
            cond_polarity: CondPolarity::None,
            combined_from: None,
            allomorph_group: None,
        }
    }

    /// True if this entry is the product of a combining rule rather than a
    /// plain dictionary lookup.
    pub fn is_combined(&self) -> bool {
        self.combined_from.is_some()
    }
}

/// A surface (jamo) string mapping to a non-empty set of morpheme entries;
/// the trie's value type.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Form {
    /// The jamo-normalized surface string this form indexes.
    pub form_jamo: Vec<u16>,
    /// Every morpheme entry sharing this surface string.
    pub morphemes: Vec<MorphemeId>,
}

impl Form {
    /// A new form with no attached morphemes yet.
    pub fn new(form_jamo: Vec<u16>) -> Form {
        Form { form_jamo, morphemes: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::PosTag;

    #[test]
    fn plain_entry_is_not_combined() {
        let e = MorphemeEntry::plain(vec![0x1100, 0x1161], Tag::new(PosTag::NNG), -3.0);
        assert!(!e.is_combined());
    }
}
