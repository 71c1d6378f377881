//! Hangul syllable/jamo codec and phonological feature tests.
//!
//! This crate is the foundation layer of the kiwi morphological analyzer: it
//! knows nothing about morphemes, tags, or dictionaries, only about how
//! Hangul text decomposes into onset/nucleus/coda jamo and which tail
//! patterns satisfy the vowel/polarity conditions that drive allomorph and
//! irregular-conjugation selection further up the stack.

#![deny(missing_docs)]

mod cond;
mod codec;
mod feature;

pub use cond::{CondPolarity, CondVowel};
pub use codec::{
    decompose, is_coda, is_coda_jamo, is_nucleus_jamo, is_onset_jamo, is_syllable, is_vowel_jamo,
    join, join_onset_vowel, join_to_string, nucleus_of, normalize, normalize_str, onset_of,
    L_BASE, L_COUNT, N_COUNT, S_BASE, S_LAST, T_BASE, T_COUNT, V_BASE, V_COUNT,
};
pub use feature::{
    ends_in_coda_h, ends_in_coda_l, matches, matches_approx, matches_polarity,
    matches_polarity_approx, matches_vowel,
};
