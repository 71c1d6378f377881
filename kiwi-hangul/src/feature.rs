//! `FeatureTestor`: O(1)-ish phonological condition tests against the tail
//! of a jamo (or, for polarity, possibly still-precomposed) string.
//!
//! Grounded on `FeatureTestor.cpp`: the vowel tests look only at the very
//! last code unit; the polarity test walks backward over trailing coda jamo
//! until it finds a nucleus.

use crate::codec::{is_coda_jamo, is_syllable, S_BASE, T_COUNT, V_COUNT};
use crate::cond::{CondPolarity, CondVowel};

const CODA_H: u32 = 0x11C2;
const CODA_L: u32 = 0x11AF;

fn is_applosive_coda(c: u32) -> bool {
    matches!(
        c,
        0x11A8 | 0x11A9 | 0x11AA | 0x11AE | 0x11B8 | 0x11B9 | 0x11BA | 0x11BB | 0x11BD | 0x11BE
            | 0x11BF | 0x11C0 | 0x11C1
    )
}

/// `CondVowel` test against the last code unit of `s`.
pub fn matches_vowel(s: &[u16], vowel: CondVowel) -> bool {
    if vowel == CondVowel::None {
        return true;
    }
    if s.is_empty() {
        return false;
    }
    if vowel == CondVowel::Any {
        return true;
    }
    let last = *s.last().unwrap() as u32;

    if vowel == CondVowel::Applosive {
        return is_applosive_coda(last);
    }

    let is_syllable_or_coda = is_syllable(last) || (0x11A8..=0x11C2).contains(&last);
    if !is_syllable_or_coda {
        return true;
    }

    match vowel {
        CondVowel::VocalicH => {
            if last == CODA_H {
                return true;
            }
            matches_vowel(s, CondVowel::Vocalic)
        }
        CondVowel::Vocalic => {
            if last == CODA_L {
                return true;
            }
            matches_vowel(s, CondVowel::Vowel)
        }
        CondVowel::Vowel => !(0x11A8..=0x11C2).contains(&last),
        CondVowel::NonVocalicH => {
            if last == CODA_H {
                return false;
            }
            matches_vowel(s, CondVowel::NonVocalic)
        }
        CondVowel::NonVocalic => {
            if last == CODA_L {
                return false;
            }
            matches_vowel(s, CondVowel::NonVowel)
        }
        CondVowel::NonVowel => !is_syllable(last),
        CondVowel::None | CondVowel::Any | CondVowel::Applosive => unreachable!(),
    }
}

fn precomposed_vowel_index(cp: u32) -> u32 {
    ((cp - S_BASE) / T_COUNT) % V_COUNT
}

const POSITIVE_PRECOMPOSED_INDICES: [u32; 4] = [0, 2, 8, 12];

/// `CondPolarity` test, scanning from the end of `s` past trailing coda
/// jamo until a nucleus (decomposed or still-precomposed) is found.
pub fn matches_polarity(s: &[u16], polar: CondPolarity) -> bool {
    if polar == CondPolarity::None || polar == CondPolarity::NonAdj {
        return true;
    }
    if s.is_empty() {
        return true;
    }
    let n = s.len();
    for i in (0..n).rev() {
        let c = s[i] as u32;
        if is_coda_jamo(c) {
            continue;
        }
        if matches!(c, 0x1161 | 0x1163 | 0x1169 | 0x116D | 0x119E) {
            return polar == CondPolarity::Positive;
        }
        if !is_syllable(c) {
            break;
        }
        let v = precomposed_vowel_index(c);
        if POSITIVE_PRECOMPOSED_INDICES.contains(&v) {
            return polar == CondPolarity::Positive;
        }
        // ㅡ (index 18) at the very last position is ambiguous (e.g. the
        // dropped stem vowel of 르-irregular verbs); look further left.
        if v == 18 && i == n - 1 {
            continue;
        }
        return polar == CondPolarity::Negative;
    }
    polar == CondPolarity::Negative
}

/// As [`matches_polarity`], but treats a trailing precomposed ㅡ-final
/// syllable as matching either polarity rather than only continuing the
/// scan when it is the very last character.
pub fn matches_polarity_approx(s: &[u16], polar: CondPolarity) -> bool {
    if polar == CondPolarity::None {
        return true;
    }
    if s.is_empty() {
        return true;
    }
    for i in (0..s.len()).rev() {
        let c = s[i] as u32;
        if is_coda_jamo(c) {
            continue;
        }
        if matches!(c, 0x1161 | 0x1163 | 0x1169 | 0x116D | 0x119E) {
            return polar == CondPolarity::Positive;
        }
        if !is_syllable(c) {
            break;
        }
        let v = precomposed_vowel_index(c);
        if POSITIVE_PRECOMPOSED_INDICES.contains(&v) {
            return polar == CondPolarity::Positive;
        }
        if v == 18 {
            return true;
        }
        return polar == CondPolarity::Negative;
    }
    polar == CondPolarity::Negative
}

/// Combined vowel+polarity test.
pub fn matches(s: &[u16], vowel: CondVowel, polar: CondPolarity) -> bool {
    matches_vowel(s, vowel) && matches_polarity(s, polar)
}

/// Combined vowel+approx-polarity test.
pub fn matches_approx(s: &[u16], vowel: CondVowel, polar: CondPolarity) -> bool {
    matches_vowel(s, vowel) && matches_polarity_approx(s, polar)
}

/// True if the jamo codepoint terminating `s` is a coda-ㅎ, used by the
/// lattice builder's ㅎ-irregular stem expansion.
pub fn ends_in_coda_h(s: &[u16]) -> bool {
    s.last().is_some_and(|&c| c as u32 == CODA_H)
}

/// True if the jamo codepoint terminating `s` is a coda-ㄹ, used by the
/// lattice builder's ㄹ-irregular stem expansion.
pub fn ends_in_coda_l(s: &[u16]) -> bool {
    s.last().is_some_and(|&c| c as u32 == CODA_L)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::normalize_str;

    #[test]
    fn vowel_suffix_after_coda() {
        let s = normalize_str("손");
        assert!(matches_vowel(&s, CondVowel::NonVowel));
        assert!(!matches_vowel(&s, CondVowel::Vowel));
    }

    #[test]
    fn vowel_suffix_after_open_syllable() {
        let s = normalize_str("나");
        assert!(matches_vowel(&s, CondVowel::Vowel));
        assert!(!matches_vowel(&s, CondVowel::NonVowel));
    }

    #[test]
    fn vocalic_includes_coda_rieul() {
        let s = normalize_str("갈");
        assert!(matches_vowel(&s, CondVowel::Vocalic));
        assert!(!matches_vowel(&s, CondVowel::Vowel));
    }

    #[test]
    fn vocalic_h_includes_coda_hieut() {
        let s = normalize_str("좋");
        assert!(matches_vowel(&s, CondVowel::VocalicH));
        assert!(!matches_vowel(&s, CondVowel::Vocalic));
    }

    #[test]
    fn applosive_coda() {
        let s = normalize_str("밥");
        assert!(matches_vowel(&s, CondVowel::Applosive));
    }

    #[test]
    fn positive_polarity() {
        let s = normalize_str("좋");
        assert!(matches_polarity(&s, CondPolarity::Positive));
    }

    #[test]
    fn negative_polarity() {
        let s = normalize_str("먹");
        assert!(matches_polarity(&s, CondPolarity::Negative));
    }

    #[test]
    fn eu_irregular_looks_further_left() {
        // 따르 (stem of 따르다, 르-irregular): trailing ㅡ defers to the
        // preceding syllable's ㅏ, which is positive.
        let s = normalize_str("따르");
        assert!(matches_polarity(&s, CondPolarity::Positive));
    }
}
