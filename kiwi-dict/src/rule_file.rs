//! Parser for combining-rule source files (§4.3/§4.3a).
//!
//! This module only recognizes the file's line grammar and produces
//! [`RuleCategory`]/[`RawRule`] values holding *unparsed* pattern strings;
//! compiling those mini-regex patterns into an NFA/DFA is `kiwi-automata`'s
//! job (this crate has no notion of finite-state machines).

use std::str::FromStr;

use kiwi_hangul::{CondPolarity, CondVowel};

use crate::error::Error;
use crate::tag::PosTag;

/// A regional dialect bit flag. `STANDARD` is always enabled.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Dialect(pub u32);

impl Dialect {
    /// The default (standard) dialect, bit 0.
    pub const STANDARD: Dialect = Dialect(1);

    fn from_name(name: &str) -> Dialect {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" | "" => Dialect::STANDARD,
            "gyeongsang" => Dialect(1 << 1),
            "jeolla" => Dialect(1 << 2),
            "chungcheong" => Dialect(1 << 3),
            "jeju" => Dialect(1 << 4),
            "hamgyeong" => Dialect(1 << 5),
            "pyeongan" => Dialect(1 << 6),
            other => Dialect(1 << (7 + (other.len() as u32 % 24))),
        }
    }

    /// Parse a comma-separated list of dialect names into a combined flag.
    pub fn parse_list(s: &str) -> Dialect {
        let mut bits = 0u32;
        for part in s.split(',') {
            if part.trim().is_empty() {
                continue;
            }
            bits |= Dialect::from_name(part).0;
        }
        if bits == 0 {
            Dialect::STANDARD
        } else {
            Dialect(bits)
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::STANDARD
    }
}

/// `(left_tag, right_tag, feature, dialect)`, keying a rule group.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct RuleCategory {
    /// Tag of the left-hand morpheme this rule group applies to.
    pub left_tag: PosTag,
    /// Tag of the right-hand morpheme.
    pub right_tag: PosTag,
    /// Packed `CondVowel`/`CondPolarity` of the left form, per `toFeature`.
    pub feature: u8,
    /// Which dialects this group is active under.
    pub dialect: Dialect,
}

/// Packs `(cond_vowel, cond_polarity)` into the one-byte feature code used
/// to key rule groups, mirroring `CompiledRule::toFeature`.
pub fn to_feature(cv: CondVowel, cp: CondPolarity) -> u8 {
    (cv as u8) | ((cp as u8) << 4)
}

/// Unpacks a feature byte back into its `(CondVowel, CondPolarity)` parts.
pub fn from_feature(feature: u8) -> (CondVowel, CondPolarity) {
    let cv = match feature & 0x0f {
        0 => CondVowel::None,
        1 => CondVowel::Any,
        2 => CondVowel::Vowel,
        3 => CondVowel::NonVowel,
        4 => CondVowel::Vocalic,
        5 => CondVowel::NonVocalic,
        6 => CondVowel::VocalicH,
        7 => CondVowel::NonVocalicH,
        _ => CondVowel::Applosive,
    };
    let cp = match (feature >> 4) & 0x0f {
        1 => CondPolarity::Positive,
        2 => CondPolarity::Negative,
        3 => CondPolarity::NonAdj,
        _ => CondPolarity::None,
    };
    (cv, cp)
}

/// One `\1`/`\2`-templated replacement candidate (source form, before
/// marker-position resolution, which happens in `kiwi-automata`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplTemplate {
    /// Raw template text, still containing `\1`, `\2`, and literal
    /// `(`/`)` markers.
    pub template: String,
    /// Score penalty/bonus parsed from a trailing `-SCORE` suffix (0 if
    /// absent).
    pub score: i32,
    /// Post-rule feature tag parsed from a trailing `+FEATURE` suffix.
    pub additional_feature: Option<PosTag>,
}

impl ReplTemplate {
    fn parse(raw: &str) -> ReplTemplate {
        let mut rest = raw;
        let mut score = 0i32;
        let mut additional_feature = None;

        if let Some(idx) = rest.rfind('+') {
            if let Ok(tag) = rest[idx + 1..].parse::<PosTag>() {
                additional_feature = Some(tag);
                rest = &rest[..idx];
            }
        }
        if let Some(idx) = rest.rfind('-') {
            if let Ok(n) = rest[idx + 1..].parse::<i32>() {
                score = -n;
                rest = &rest[..idx];
            }
        }
        ReplTemplate { template: rest.to_string(), score, additional_feature }
    }
}

/// One rule line within a section: `(left_pattern, right_pattern,
/// replacements, ignore_r_cond)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawRule {
    /// Mini-regex over jamo matched against the left form's tail.
    pub left_pattern: String,
    /// Mini-regex matched against the right form's head.
    pub right_pattern: String,
    /// Candidate replacement templates, tried in file order.
    pub replacements: Vec<ReplTemplate>,
    /// Set by a `+ignorercond` feature token: skip the right-pattern DFA
    /// entirely and accept on the left match alone.
    pub ignore_r_cond: bool,
    /// 1-based source line number, for diagnostics.
    pub line_no: u64,
}

/// A fully parsed rule source file: an ordered list of sections, each a
/// category plus its rule lines.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RuleFile {
    /// Sections in file order.
    pub sections: Vec<(RuleCategory, Vec<RawRule>)>,
}

fn parse_feature_tokens(tokens: &str) -> (u8, bool) {
    let mut cv = CondVowel::None;
    let mut cp = CondPolarity::None;
    let mut ignore_r_cond = false;
    for tok in tokens.split(',') {
        match tok.trim().to_ascii_lowercase().as_str() {
            "+positive" => cp = CondPolarity::Positive,
            "-positive" => cp = CondPolarity::Negative,
            "+coda" => cv = CondVowel::NonVowel,
            "-coda" => cv = CondVowel::Vowel,
            "+ignorercond" => ignore_r_cond = true,
            "" => {}
            _ => {}
        }
    }
    (to_feature(cv, cp), ignore_r_cond)
}

/// Parse a complete rule source file's contents.
pub fn parse_rule_file(contents: &str) -> Result<RuleFile, Error> {
    let mut file = RuleFile::default();
    let mut current: Option<(RuleCategory, Vec<RawRule>)> = None;

    for (i, raw_line) in contents.lines().enumerate() {
        let line_no = (i + 1) as u64;
        let line = match raw_line.find('#') {
            Some(idx) => &raw_line[..idx],
            None => raw_line,
        };
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        match fields.len() {
            2 | 3 => {
                if let Some(section) = current.take() {
                    file.sections.push(section);
                }
                let left_tag: PosTag = fields[0]
                    .parse()
                    .map_err(|e: Error| e.with_line(line_no))?;
                let right_tag: PosTag = fields[1]
                    .parse()
                    .map_err(|e: Error| e.with_line(line_no))?;
                let dialect =
                    if fields.len() == 3 { Dialect::parse_list(fields[2]) } else { Dialect::STANDARD };
                current = Some((
                    RuleCategory { left_tag, right_tag, feature: 0, dialect },
                    Vec::new(),
                ));
            }
            4 => {
                let (category, rules) = current.as_mut().ok_or_else(|| {
                    Error::format("rule line appears before any section header").with_line(line_no)
                })?;
                let (feature, ignore_r_cond) = parse_feature_tokens(fields[3]);
                category.feature = feature;
                let replacements =
                    fields[2].split(',').map(ReplTemplate::parse).collect();
                rules.push(RawRule {
                    left_pattern: fields[0].to_string(),
                    right_pattern: fields[1].to_string(),
                    replacements,
                    ignore_r_cond,
                    line_no,
                });
            }
            _ => {
                return Err(Error::format(format!(
                    "expected 2-3 fields (section header) or 4 fields (rule), found {}",
                    fields.len()
                ))
                .with_line(line_no));
            }
        }
    }
    if let Some(section) = current.take() {
        file.sections.push(section);
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_section_and_rule() {
        let src = "VV\tEC\n아\t.*\t\\1어\\2\t+positive\n";
        let file = parse_rule_file(src).unwrap();
        assert_eq!(file.sections.len(), 1);
        let (cat, rules) = &file.sections[0];
        assert_eq!(cat.left_tag, PosTag::VV);
        assert_eq!(cat.right_tag, PosTag::EC);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].left_pattern, "아");
    }

    #[test]
    fn rejects_rule_before_section() {
        let src = "아\t어\t\\1\\2\t+positive\n";
        assert!(parse_rule_file(src).is_err());
    }

    #[test]
    fn feature_tokens_pack_into_category() {
        let (feature, ignore) = parse_feature_tokens("+positive,+ignorercond");
        let (cv, cp) = from_feature(feature);
        assert_eq!(cv, CondVowel::None);
        assert_eq!(cp, CondPolarity::Positive);
        assert!(ignore);
    }

    #[test]
    fn replacement_template_parses_score_and_feature() {
        let r = ReplTemplate::parse("\\1\\2-3");
        assert_eq!(r.template, "\\1\\2");
        assert_eq!(r.score, -3);
    }
}
