//! Hangul syllable <-> jamo codec.
//!
//! This implements the algorithms described in Unicode 3.12 / 4.8 for
//! decomposing a precomposed Hangul syllable (`U+AC00..U+D7A3`) into its
//! onset/nucleus/(optional) coda jamo, and recomposing them. Corresponds to
//! `hangul_full_canonical_decomposition` in `ucd-util`, generalized here to
//! operate over whole strings rather than a single codepoint, and to run the
//! inverse (composition) direction as well.

/// First precomposed Hangul syllable codepoint.
pub const S_BASE: u32 = 0xAC00;
/// Last precomposed Hangul syllable codepoint (inclusive).
pub const S_LAST: u32 = 0xD7A3;
/// First modern onset (leading consonant) jamo codepoint.
pub const L_BASE: u32 = 0x1100;
/// Number of onset jamo.
pub const L_COUNT: u32 = 19;
/// First modern nucleus (vowel) jamo codepoint.
pub const V_BASE: u32 = 0x1161;
/// Number of nucleus jamo.
pub const V_COUNT: u32 = 21;
/// One before the first modern coda jamo codepoint; `T_BASE + 0` means "no
/// coda", so valid coda jamo start at `T_BASE + 1`.
pub const T_BASE: u32 = 0x11A7;
/// Number of coda slots, including the "no coda" slot at index 0.
pub const T_COUNT: u32 = 28;
/// Number of syllables sharing one onset (`V_COUNT * T_COUNT`).
pub const N_COUNT: u32 = V_COUNT * T_COUNT;

/// Returns true if `cp` is a precomposed Hangul syllable.
#[inline]
pub fn is_syllable(cp: u32) -> bool {
    (S_BASE..=S_LAST).contains(&cp)
}

/// Returns true if `cp` is a modern onset (leading consonant) jamo.
#[inline]
pub fn is_onset_jamo(cp: u32) -> bool {
    (L_BASE..L_BASE + L_COUNT).contains(&cp)
}

/// Returns true if `cp` is a modern nucleus (vowel) jamo.
#[inline]
pub fn is_nucleus_jamo(cp: u32) -> bool {
    (V_BASE..V_BASE + V_COUNT).contains(&cp)
}

/// Alias for [`is_nucleus_jamo`], named after the operation in the spec.
#[inline]
pub fn is_vowel_jamo(cp: u32) -> bool {
    is_nucleus_jamo(cp)
}

/// Returns true if `cp` is a modern coda (trailing consonant) jamo. The
/// "no coda" sentinel (`T_BASE`) is not itself a coda jamo.
#[inline]
pub fn is_coda_jamo(cp: u32) -> bool {
    (T_BASE + 1..T_BASE + T_COUNT).contains(&cp)
}

/// Alias for [`is_coda_jamo`], named after the operation in the spec.
#[inline]
pub fn is_coda(cp: u32) -> bool {
    is_coda_jamo(cp)
}

/// Returns the onset jamo codepoint for onset index `0..L_COUNT`.
#[inline]
pub fn onset_of(index: u32) -> u32 {
    L_BASE + index
}

/// Returns the nucleus jamo codepoint for nucleus index `0..V_COUNT`.
#[inline]
pub fn nucleus_of(index: u32) -> u32 {
    V_BASE + index
}

/// Composes a bare onset+nucleus pair (no coda) into a syllable, as used by
/// rule broadcasting (vowel-initial rules expanded across all 19 onsets).
#[inline]
pub fn join_onset_vowel(onset_idx: u32, nucleus_idx: u32) -> u32 {
    S_BASE + (onset_idx * N_COUNT) + (nucleus_idx * T_COUNT)
}

/// The full canonical decomposition of a precomposed syllable codepoint,
/// returning `(onset, nucleus, coda)` with `coda` absent when there is none.
pub fn decompose(cp: u32) -> Option<(u32, u32, Option<u32>)> {
    if !is_syllable(cp) {
        return None;
    }
    let s_index = cp - S_BASE;
    let l_index = s_index / N_COUNT;
    let v_index = (s_index % N_COUNT) / T_COUNT;
    let t_index = s_index % T_COUNT;
    let coda = if t_index == 0 { None } else { Some(T_BASE + t_index) };
    Some((L_BASE + l_index, V_BASE + v_index, coda))
}

/// Normalizes a UTF-16 code unit sequence into jamo form: every precomposed
/// Hangul syllable is expanded into its onset/nucleus/(coda) jamo; every
/// other code unit (including compatibility jamo in the `U+3131..` block)
/// passes through unchanged.
///
/// `join(normalize(x)) == x` for any `x` whose Hangul subsequences are
/// well-formed (see [`join`]).
pub fn normalize(input: &[u16]) -> Vec<u16> {
    let mut out = Vec::with_capacity(input.len() + input.len() / 2);
    for &unit in input {
        match decompose(unit as u32) {
            Some((onset, nucleus, coda)) => {
                out.push(onset as u16);
                out.push(nucleus as u16);
                if let Some(c) = coda {
                    out.push(c as u16);
                }
            }
            None => out.push(unit),
        }
    }
    out
}

/// Recomposes a jamo sequence back into precomposed Hangul syllables where
/// possible. A bare onset jamo followed by a nucleus jamo forms a syllable;
/// if a coda jamo immediately follows, it is absorbed too. Code units that
/// do not fit this pattern (dangling jamo, non-Hangul) pass through
/// unchanged. This is the exact inverse of [`normalize`] on well-formed
/// input because the onset/nucleus/coda jamo blocks are disjoint, so there
/// is never an ambiguity between "this trailing consonant is a coda" and
/// "this trailing consonant starts the next syllable" (unlike ambiguities
/// that can arise when jamo blocks overlap).
pub fn join(jamo: &[u16]) -> Vec<u16> {
    let mut out = Vec::with_capacity(jamo.len());
    let mut i = 0;
    while i < jamo.len() {
        let c = jamo[i] as u32;
        if is_onset_jamo(c) && i + 1 < jamo.len() && is_nucleus_jamo(jamo[i + 1] as u32) {
            let l_index = c - L_BASE;
            let v_index = jamo[i + 1] as u32 - V_BASE;
            let (t_index, consumed) = if i + 2 < jamo.len() && is_coda_jamo(jamo[i + 2] as u32) {
                (jamo[i + 2] as u32 - T_BASE, 3)
            } else {
                (0, 2)
            };
            let syllable = S_BASE + l_index * N_COUNT + v_index * T_COUNT + t_index;
            out.push(syllable as u16);
            i += consumed;
        } else {
            out.push(jamo[i]);
            i += 1;
        }
    }
    out
}

/// Convenience wrapper over [`normalize`] for a Rust `&str` (UTF-8) input,
/// returning the jamo-normalized UTF-16 buffer.
pub fn normalize_str(input: &str) -> Vec<u16> {
    let utf16: Vec<u16> = input.encode_utf16().collect();
    normalize(&utf16)
}

/// Convenience wrapper over [`join`] that returns a Rust `String`, replacing
/// any ill-formed UTF-16 produced by dangling jamo with the replacement
/// character.
pub fn join_to_string(jamo: &[u16]) -> String {
    String::from_utf16_lossy(&join(jamo))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decompose_known() {
        // 쀍 = U+D4DB decomposes to (ㅃ, ㅢ, ㅀ) per Unicode 4.8 worked example.
        assert_eq!(decompose(0xD4DB), Some((0x1111, 0x1171, Some(0x11B6))));
    }

    #[test]
    fn decompose_non_hangul() {
        assert!(decompose(0x0041).is_none());
        assert!(decompose(0x3131).is_none());
    }

    #[test]
    fn round_trip_mixed_text() {
        let text = "다녀온 후기 abc123 ㅎㅅㅎ";
        let jamo = normalize_str(text);
        assert_eq!(join_to_string(&jamo), text);
    }

    #[test]
    fn round_trip_no_coda() {
        let text = "가나다라마바사";
        let jamo = normalize_str(text);
        assert_eq!(join_to_string(&jamo), text);
    }

    #[test]
    fn round_trip_with_codas() {
        let text = "한글은 아름답습니다";
        let jamo = normalize_str(text);
        assert_eq!(join_to_string(&jamo), text);
    }

    #[test]
    fn dangling_jamo_passes_through_join() {
        let jamo: Vec<u16> = vec![L_BASE as u16];
        assert_eq!(join(&jamo), jamo);
    }

    #[test]
    fn onset_and_nucleus_roundtrip_join_onset_vowel() {
        // onset idx 0 (ㄱ), nucleus idx 0 (ㅏ) => 가
        let syllable = join_onset_vowel(0, 0);
        assert_eq!(char::from_u32(syllable), Some('가'));
    }
}
