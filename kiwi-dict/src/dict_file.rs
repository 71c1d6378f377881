//! Parser for dictionary source files: one morpheme entry per line.
//!
//! Grammar (tab-separated, `#` starts a comment, blank lines ignored):
//! `form<TAB>tag[+irr]<TAB>log_prob[<TAB>sense_id]`.

use std::path::Path;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use kiwi_hangul::normalize_str;

use crate::error::Error;
use crate::tag::{PosTag, Tag};

/// A single parsed row of a dictionary source file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DictLine {
    /// Surface form, already jamo-normalized.
    pub form_jamo: Vec<u16>,
    /// Parsed tag, including the irregular flag if `+irr` was present.
    pub tag: Tag,
    /// Log-probability in thousandths (kept as an integer so `Eq` holds;
    /// callers divide by 1000.0 to get the `f32` used by [`MorphemeEntry`]).
    ///
    /// [`MorphemeEntry`]: crate::morpheme::MorphemeEntry
    pub log_prob_milli: i64,
    /// Explicit sense disambiguator, defaulting to 0.
    pub sense_id: u32,
}

impl FromStr for DictLine {
    type Err = Error;

    fn from_str(line: &str) -> Result<DictLine, Error> {
        static PARTS: Lazy<Regex> = Lazy::new(|| {
            Regex::new(
                r"(?x)
                ^
                (?P<form>\S+) \t
                (?P<tag>[A-Za-z_]+)(?P<irr>\+irr)? \t
                (?P<logprob>-?[0-9]+(?:\.[0-9]+)?)
                (?:\t(?P<sense>[0-9]+))?
                \s*$
                ",
            )
            .unwrap()
        });
        let caps = match PARTS.captures(line) {
            Some(caps) => caps,
            None => return Err(Error::format(format!("malformed dictionary line: {:?}", line))),
        };

        let tag: PosTag = caps["tag"].parse()?;
        let irregular = caps.name("irr").is_some();
        let log_prob: f64 = caps["logprob"]
            .parse()
            .map_err(|_| Error::format(format!("invalid log-probability in: {:?}", line)))?;
        let sense_id = caps
            .name("sense")
            .map(|m| m.as_str().parse().unwrap_or(0))
            .unwrap_or(0);

        Ok(DictLine {
            form_jamo: normalize_str(&caps["form"]),
            tag: Tag { pos: tag, irregular },
            log_prob_milli: (log_prob * 1000.0).round() as i64,
            sense_id,
        })
    }
}

/// Parse a complete dictionary source file's contents, reporting the first
/// offending line (1-based) on failure.
pub fn parse_dict_file(contents: &str, path: Option<&Path>) -> Result<Vec<DictLine>, Error> {
    let mut out = Vec::new();
    for (i, raw) in contents.lines().enumerate() {
        let line = match raw.find('#') {
            Some(idx) => &raw[..idx],
            None => raw,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed: DictLine = line.parse().map_err(|e: Error| {
            let e = e.with_line((i + 1) as u64);
            match path {
                Some(p) => e.with_path(p),
                None => e,
            }
        })?;
        out.push(parsed);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_plain_noun() {
        let line = "물\tNNG\t-3.21";
        let d: DictLine = line.parse().unwrap();
        assert_eq!(d.tag.pos, PosTag::NNG);
        assert!(!d.tag.irregular);
        assert_eq!(d.log_prob_milli, -3210);
        assert_eq!(d.sense_id, 0);
    }

    #[test]
    fn parse_irregular_verb_with_sense() {
        let line = "듣\tVV+irr\t-5.0\t2";
        let d: DictLine = line.parse().unwrap();
        assert_eq!(d.tag.pos, PosTag::VV);
        assert!(d.tag.irregular);
        assert_eq!(d.sense_id, 2);
    }

    #[test]
    fn comment_and_blank_lines_are_skipped() {
        let contents = "# header comment\n\n물\tNNG\t-3.21\n";
        let lines = parse_dict_file(contents, None).unwrap();
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn format_error_carries_line_number() {
        let contents = "물\tNNG\t-3.21\nnot a valid line\n";
        let err = parse_dict_file(contents, None).unwrap_err();
        assert_eq!(err.line(), Some(2));
    }
}
