//! Left-anchored, longest-match hand-written scanners for the non-dictionary
//! token classes (§4.4), translated line-for-line from `PatternMatcher.cpp`
//! into safe Rust over `&[u16]` index ranges instead of raw `char16_t*`
//! pointer pairs.

use bitflags::bitflags;
use kiwi_dict::PosTag;

bitflags! {
    /// Which pattern-matcher sub-scanners are active for a call, mirroring
    /// the source's `Match` bit flags (§6).
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
    pub struct MatchOptions: u32 {
        /// URL scanner.
        const URL = 1 << 0;
        /// Email-address scanner.
        const EMAIL = 1 << 1;
        /// `@mention` scanner.
        const MENTION = 1 << 2;
        /// `#hashtag` scanner.
        const HASHTAG = 1 << 3;
        /// Serial-number / time / date scanner.
        const SERIAL = 1 << 4;
        /// Emoji scanner.
        const EMOJI = 1 << 5;
        /// Normalize word-final codas that carry no phonological weight.
        const NORMALIZE_CODA = 1 << 6;
        /// Split complex nouns into their constituent morphemes.
        const SPLIT_COMPLEX = 1 << 7;
        /// Recognize ZWJ emoji sequences and stray codas together.
        const ZWJ_ZCODA = 1 << 8;
        /// Join a noun prefix onto the following noun in the joiner.
        const JOIN_NOUN_PREFIX = 1 << 9;
        /// Join a noun suffix onto the preceding noun in the joiner.
        const JOIN_NOUN_SUFFIX = 1 << 10;
        /// Join an adjective-deriving suffix in the joiner.
        const JOIN_ADJ_SUFFIX = 1 << 11;
        /// Join a verb-deriving suffix in the joiner.
        const JOIN_VERB_SUFFIX = 1 << 12;
    }
}

impl MatchOptions {
    /// `url|email|mention|hashtag|serial|emoji`.
    pub fn all() -> MatchOptions {
        MatchOptions::URL
            | MatchOptions::EMAIL
            | MatchOptions::MENTION
            | MatchOptions::HASHTAG
            | MatchOptions::SERIAL
            | MatchOptions::EMOJI
    }

    /// `all | normalize_coda`.
    pub fn all_with_normalizing() -> MatchOptions {
        MatchOptions::all() | MatchOptions::NORMALIZE_CODA
    }

    /// `join_noun_prefix|join_noun_suffix|join_adj_suffix|join_verb_suffix`.
    pub fn join_affix() -> MatchOptions {
        MatchOptions::JOIN_NOUN_PREFIX
            | MatchOptions::JOIN_NOUN_SUFFIX
            | MatchOptions::JOIN_ADJ_SUFFIX
            | MatchOptions::JOIN_VERB_SUFFIX
    }
}

fn is_alpha(c: u16) -> bool {
    (b'A' as u16..=b'Z' as u16).contains(&c) || (b'a' as u16..=b'z' as u16).contains(&c)
}

fn is_upper_alpha(c: u16) -> bool {
    (b'A' as u16..=b'Z' as u16).contains(&c)
}

fn is_digit(c: u16) -> bool {
    (b'0' as u16..=b'9' as u16).contains(&c) || (0xff10..=0xff19).contains(&c)
}

fn is_space(c: u16) -> bool {
    matches!(c, 0x09 | 0x0a | 0x0d | 0x0b | 0x0c | 0x20)
}

fn is_domain_char(c: u16) -> bool {
    is_alpha(c) || is_digit(c) || "-@:%._+~#=".encode_utf16().any(|u| u == c)
}

fn is_path_char(c: u16) -> bool {
    is_alpha(c) || is_digit(c) || "-()@:%_+.~#!?&/=".encode_utf16().any(|u| u == c)
}

fn is_email_account_char(c: u16) -> bool {
    is_alpha(c) || is_digit(c) || "-._%+".encode_utf16().any(|u| u == c)
}

fn is_alnum_dot_dash(c: u16) -> bool {
    is_alpha(c) || is_digit(c) || c == b'.' as u16 || c == b'-' as u16
}

fn is_hashtag_char(c: u16) -> bool {
    !is_space(c) && !matches!(c, 0x23 /* # */) && !".,()[]<>{}".encode_utf16().any(|u| u == c)
}

/// `https?://domain(:port)?(/path)?`, left-anchored.
fn test_url(s: &[u16]) -> usize {
    let https: Vec<u16> = "https://".encode_utf16().collect();
    let http: Vec<u16> = "http://".encode_utf16().collect();
    let mut b = if s.starts_with(&https) {
        https.len()
    } else if s.starts_with(&http) {
        http.len()
    } else {
        return 0;
    };

    let start = b;
    if b >= s.len() || !is_domain_char(s[b]) {
        return 0;
    }
    b += 1;
    let mut state = 0;
    let mut last_matched = start;
    while b < s.len() && is_domain_char(s[b]) {
        if s[b] == b'.' as u16 {
            state = 1;
        } else if is_alpha(s[b]) {
            if state > 0 {
                state += 1;
            }
            if state >= 3 {
                last_matched = b + 1;
            }
        } else {
            state = 0;
        }
        b += 1;
    }
    if last_matched == start {
        return 0;
    }
    b = last_matched;

    if b < s.len() && s[b] == b':' as u16 {
        b += 1;
        if b >= s.len() || !is_digit(s[b]) {
            return 0;
        }
        while b < s.len() && is_digit(s[b]) {
            b += 1;
        }
    }

    if b < s.len() && s[b] == b'/' as u16 {
        b += 1;
        while b < s.len() && is_path_char(s[b]) {
            b += 1;
        }
    } else if b < s.len() && !is_space(s[b]) {
        return 0;
    }

    if b > 0 && (s[b - 1] == b'.' as u16 || s[b - 1] == b':' as u16) {
        b -= 1;
    }
    b
}

fn test_email(s: &[u16]) -> usize {
    let mut b = 0;
    if s.is_empty() || !is_email_account_char(s[0]) {
        return 0;
    }
    b += 1;
    while b < s.len() && is_email_account_char(s[b]) {
        b += 1;
    }
    if b >= s.len() || s[b] != b'@' as u16 {
        return 0;
    }
    b += 1;

    let mut state = 0;
    let mut last_matched = 0;
    if b >= s.len() || !is_alnum_dot_dash(s[b]) {
        return 0;
    }
    b += 1;
    while b < s.len() && is_alnum_dot_dash(s[b]) {
        if s[b] == b'.' as u16 {
            state = 1;
        } else if is_alpha(s[b]) {
            if state > 0 {
                state += 1;
            }
            if state >= 3 {
                last_matched = b + 1;
            }
        } else {
            state = 0;
        }
        b += 1;
    }
    last_matched
}

fn test_mention(s: &[u16]) -> usize {
    if s.is_empty() || s[0] != b'@' as u16 {
        return 0;
    }
    let mut b = 1;
    if b >= s.len() || !is_alpha(s[b]) {
        return 0;
    }
    b += 1;
    while b < s.len() && is_email_account_char(s[b]) {
        b += 1;
    }
    if b > 0 && matches!(s[b - 1], c if c == b'.' as u16 || c == b'%' as u16 || c == b'+' as u16 || c == b'-' as u16)
    {
        b -= 1;
    }
    if b <= 3 {
        return 0;
    }
    b
}

fn test_hashtag(s: &[u16]) -> usize {
    if s.is_empty() || s[0] != b'#' as u16 {
        return 0;
    }
    let mut b = 1;
    if b >= s.len() || !is_hashtag_char(s[b]) {
        return 0;
    }
    b += 1;
    while b < s.len() && is_hashtag_char(s[b]) {
        b += 1;
    }
    b
}

/// The source tests the raw UTF-16 stream for a precomposed syllable
/// block code point; `kiwi-core` instead scans the already
/// jamo-normalized internal representation (§6), where a Hangul syllable
/// begins with an onset jamo rather than occupying one precomposed code
/// unit, so that's the equivalent test here.
fn is_hangul_syllable(c: u16) -> bool {
    kiwi_hangul::is_onset_jamo(c as u32)
}

fn test_numeric(left: Option<u16>, s: &[u16]) -> usize {
    let mut b = 0;
    if s.is_empty() || !is_digit(s[0]) {
        return 0;
    }
    while b < s.len() && is_digit(s[b]) {
        b += 1;
    }
    let mut has_comma = false;
    while b < s.len() && s[b] == b',' as u16 {
        if b + 3 >= s.len() || !is_digit(s[b + 1]) || !is_digit(s[b + 2]) || !is_digit(s[b + 3]) {
            return b;
        }
        b += 4;
        has_comma = true;
    }

    if b >= s.len() || is_space(s[b]) || is_hangul_syllable(s[b]) {
        return b;
    }

    if s[b] == b'.' as u16 {
        let dot = b;
        b += 1;
        let left_is_alnum = left.map(is_alnum_dot_dash).unwrap_or(false);
        if !has_comma && !left_is_alnum && (b >= s.len() || !is_alnum_dot_dash(s[b])) {
            return dot;
        }
        if b >= s.len() || !is_digit(s[b]) {
            return dot;
        }
        while b < s.len() && is_digit(s[b]) {
            b += 1;
        }
    }

    if b >= s.len() || s[b] != b'.' as u16 {
        b
    } else {
        0
    }
}

fn test_serial(s: &[u16]) -> usize {
    let mut b = 0;
    if s.is_empty() || !is_digit(s[0]) {
        return 0;
    }
    while b < s.len() && is_digit(s[b]) {
        b += 1;
    }
    if b >= s.len() {
        return 0;
    }
    let sep = s[b];
    if !matches!(sep, c if c == b':' as u16 || c == b'.' as u16 || c == b'-' as u16 || c == b'/' as u16) {
        return 0;
    }
    b += 1;
    if b < s.len() && s[b] == b' ' as u16 {
        b += 1;
    }
    if b >= s.len() || !is_digit(s[b]) {
        return 0;
    }
    b += 1;
    while b < s.len() && is_digit(s[b]) {
        b += 1;
    }

    if sep == b'.' as u16 && (b >= s.len() || s[b] != sep) {
        return 0;
    }

    while b < s.len() && s[b] == sep {
        b += 1;
        if b < s.len() && s[b] == b' ' as u16 {
            b += 1;
        }
        if b >= s.len() || !is_digit(s[b]) {
            if b > 0 && s[b - 1] == b' ' as u16 {
                b -= 1;
            }
            return b;
        }
        b += 1;
        while b < s.len() && is_digit(s[b]) {
            b += 1;
        }
    }
    if b > 0 && s[b - 1] == b' ' as u16 {
        b -= 1;
    }
    b
}

fn test_abbr(s: &[u16]) -> usize {
    let mut b = 0;
    if s.is_empty() || !is_alpha(s[0]) {
        return 0;
    }
    let mut l = 0;
    while b < s.len() && is_alpha(s[b]) {
        b += 1;
        l += 1;
    }
    if b >= s.len() {
        return 0;
    }
    if s[b] == b'.' as u16 {
        b += 1;
    } else {
        return 0;
    }
    if b < s.len() && s[b] == b' ' as u16 {
        if l > if is_upper_alpha(s[0]) { 5 } else { 3 } {
            return 0;
        }
        return b;
    } else if l > 5 {
        return 0;
    }

    while b < s.len() && is_alpha(s[b]) {
        l = 0;
        while b < s.len() && is_alpha(s[b]) {
            b += 1;
            l += 1;
        }
        if l > 5 {
            return 0;
        }
        if b < s.len() && s[b] == b'.' as u16 {
            b += 1;
        } else {
            return b;
        }
    }
    if b > 0 && s[b - 1] == b' ' as u16 {
        b -= 1;
    }
    b
}

fn is_high_surrogate(c: u16) -> bool {
    (0xd800..=0xdbff).contains(&c)
}

fn merge_surrogate(hi: u16, lo: u16) -> u32 {
    0x10000 + ((hi as u32 - 0xd800) << 10) + (lo as u32 - 0xdc00)
}

/// Returns 1 if only the first code point is emoji, 2 if the pair together
/// form one emoji (ZWJ-joined base+modifier handled by the caller loop), 0
/// otherwise. A deliberately small emoji range table, not the full Unicode
/// emoji data set: §4.4 only asks that common pictographs, symbol emoji,
/// and the dingbat range be recognized.
fn is_emoji(c0: u32, c1: u32) -> u8 {
    let is_emoji_cp = |c: u32| {
        (0x1f300..=0x1faff).contains(&c)
            || (0x2600..=0x27bf).contains(&c)
            || (0x1f000..=0x1f0ff).contains(&c)
            || matches!(c, 0x203c | 0x2049 | 0x2122 | 0x2139)
            || (0x2190..=0x21ff).contains(&c)
    };
    if is_emoji_cp(c0) {
        1
    } else if is_emoji_cp(c1) {
        2
    } else {
        0
    }
}

fn test_emoji(s: &[u16]) -> usize {
    let mut b = 0usize;
    loop {
        if b + 1 >= s.len() {
            break;
        }
        let (c0, mut b1) = if is_high_surrogate(s[b]) && b + 1 < s.len() {
            (merge_surrogate(s[b], s[b + 1]), b + 2)
        } else {
            (s[b] as u32, b + 1)
        };
        let (c1, b2) = if b1 < s.len() {
            if is_high_surrogate(s[b1]) && b1 + 1 < s.len() {
                (merge_surrogate(s[b1], s[b1 + 1]), b1 + 2)
            } else {
                (s[b1] as u32, b1 + 1)
            }
        } else {
            (0, b1)
        };

        let r = is_emoji(c0, c1);
        if r == 1 {
            // keep b1 as-is
        } else if r == 2 {
            b1 = b2;
        } else {
            break;
        }
        b = b1;

        if b == s.len() {
            return b;
        }
        if (0xfe00..=0xfe0f).contains(&s[b]) {
            b += 1;
            if b == s.len() {
                return b;
            }
        } else if b + 1 < s.len() && is_high_surrogate(s[b]) {
            let modifier = merge_surrogate(s[b], s[b + 1]);
            if (0x1f3fb..=0x1f3ff).contains(&modifier) {
                b += 2;
                if b == s.len() {
                    return b;
                }
            }
        }

        if s[b] == 0x200d {
            b += 1;
            continue;
        }
        break;
    }
    b
}

/// Run every enabled sub-matcher at `s[0..]` in priority order, returning
/// the first non-empty `(length, tag)`.
pub fn match_pattern(left: Option<u16>, s: &[u16], options: MatchOptions) -> Option<(usize, PosTag)> {
    if options.contains(MatchOptions::SERIAL) {
        let n = test_serial(s);
        if n > 0 {
            return Some((n, PosTag::W_SERIAL));
        }
    }
    let n = test_numeric(left, s);
    if n > 0 {
        return Some((n, PosTag::SN));
    }
    if options.contains(MatchOptions::HASHTAG) {
        let n = test_hashtag(s);
        if n > 0 {
            return Some((n, PosTag::W_HASHTAG));
        }
    }
    if options.contains(MatchOptions::EMAIL) {
        let n = test_email(s);
        if n > 0 {
            return Some((n, PosTag::W_EMAIL));
        }
    }
    if options.contains(MatchOptions::MENTION) {
        let n = test_mention(s);
        if n > 0 {
            return Some((n, PosTag::W_MENTION));
        }
    }
    if options.contains(MatchOptions::URL) {
        let n = test_url(s);
        if n > 0 {
            return Some((n, PosTag::W_URL));
        }
    }
    if options.contains(MatchOptions::EMOJI) {
        let n = test_emoji(s);
        if n > 0 {
            return Some((n, PosTag::W_EMOJI));
        }
    }
    let n = test_abbr(s);
    if n > 0 {
        return Some((n, PosTag::SL));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u(s: &str) -> Vec<u16> {
        kiwi_hangul::normalize_str(s)
    }

    #[test]
    fn matches_serial_time() {
        let s = u("12:34에");
        let (len, tag) = match_pattern(None, &s, MatchOptions::all()).unwrap();
        assert_eq!(tag, PosTag::W_SERIAL);
        assert_eq!(len, 5);
    }

    #[test]
    fn matches_numeric_percent() {
        let s = u("1.2%");
        let (len, tag) = match_pattern(None, &s, MatchOptions::all()).unwrap();
        assert_eq!(tag, PosTag::SN);
        assert_eq!(&s[..len], &u("1.2")[..]);
    }

    #[test]
    fn matches_url_with_path() {
        let s = u("https://example.com/a/b 이후");
        let (len, tag) = match_pattern(None, &s, MatchOptions::all()).unwrap();
        assert_eq!(tag, PosTag::W_URL);
        assert_eq!(&s[..len], &u("https://example.com/a/b")[..]);
    }

    #[test]
    fn matches_hashtag() {
        let s = u("#kiwi_test 뒤");
        let (len, tag) = match_pattern(None, &s, MatchOptions::all()).unwrap();
        assert_eq!(tag, PosTag::W_HASHTAG);
        assert_eq!(&s[..len], &u("#kiwi_test")[..]);
    }

    #[test]
    fn matches_mention_requires_min_length() {
        let s = u("@ab");
        assert!(match_pattern(None, &s, MatchOptions::all()).is_none() || {
            let (_, tag) = match_pattern(None, &s, MatchOptions::all()).unwrap();
            tag != PosTag::W_MENTION
        });
    }

    #[test]
    fn no_pattern_matches_plain_hangul() {
        let s = u("안녕하세요");
        assert!(match_pattern(None, &s, MatchOptions::all()).is_none());
    }
}
