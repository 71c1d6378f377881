//! Sentence splitter (§4.10/§4.10a): partitions a decoded token stream into
//! sentence spans, tracking bracket/quote nesting across the *whole*
//! stream so quoted-clause depth is never reset per candidate sentence.

use kiwi_dict::PosTag;

/// One token of the decoded stream, reduced to what the splitter needs:
/// its tag, its `(start, end)` offsets in the caller's original encoding,
/// and its surface text (to recognize bracket/quote characters).
#[derive(Clone, Debug)]
pub struct SplitToken {
    /// This token's part-of-speech tag.
    pub tag: PosTag,
    /// Start offset, in the caller's original encoding's code units.
    pub start: usize,
    /// End offset (exclusive), same units as `start`.
    pub end: usize,
    /// Surface text of this token.
    pub surface: String,
}

/// A `[start, end)` half-open range over the caller's original encoding.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SentenceSpan {
    /// Start offset, inclusive.
    pub start: usize,
    /// End offset, exclusive.
    pub end: usize,
}

const BRACKET_PAIRS: &[(char, char)] = &[('<', '>'), ('(', ')'), ('[', ']'), ('{', '}'), ('「', '」')];
const QUOTE_CHARS: &[char] = &['"', '\''];

#[derive(Default)]
struct BracketStack {
    stack: Vec<char>,
}

impl BracketStack {
    fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Feed one token's surface text through the stack, updating it in
    /// place. Unmatched closers are ignored rather than going negative.
    fn consume(&mut self, surface: &str) {
        for c in surface.chars() {
            if let Some(&(open, _)) = BRACKET_PAIRS.iter().find(|&&(o, _)| o == c) {
                self.stack.push(open);
                continue;
            }
            if let Some(&(open, _)) = BRACKET_PAIRS.iter().find(|&&(_, close)| close == c) {
                if self.stack.last() == Some(&open) {
                    self.stack.pop();
                }
                continue;
            }
            if QUOTE_CHARS.contains(&c) {
                if self.stack.last() == Some(&c) {
                    self.stack.pop();
                } else {
                    self.stack.push(c);
                }
            }
        }
    }
}

fn is_sentence_ending(tag: PosTag) -> bool {
    matches!(tag, PosTag::SF | PosTag::SE | PosTag::SSC)
}

/// Split `tokens` into sentence spans, and report each token's
/// quoted-clause nesting depth (`sub_sent_position`'s source signal)
/// alongside it. `tokens` must be in stream order and non-empty ranges
/// must not overlap.
pub fn split_into_sents(tokens: &[SplitToken]) -> (Vec<SentenceSpan>, Vec<u32>) {
    let mut spans = Vec::new();
    let mut depths = Vec::with_capacity(tokens.len());
    let mut brackets = BracketStack::default();
    let mut sent_start: Option<usize> = None;
    let mut boundary_pending = false;
    let mut boundary_context_tag: Option<PosTag> = None;
    let mut boundary_end: usize = 0;
    let mut last_real_tag: Option<PosTag> = None;

    for tok in tokens.iter() {
        if tok.tag != PosTag::SP && sent_start.is_none() {
            sent_start = Some(tok.start);
        }

        brackets.consume(&tok.surface);
        depths.push(brackets.depth() as u32);

        if boundary_pending && tok.tag != PosTag::SP {
            let guard_ec_ef = matches!(tok.tag, PosTag::EF | PosTag::EC);
            let guard_va_etm = boundary_context_tag == Some(PosTag::VA) && tok.tag == PosTag::ETM;
            let guard_numeral_list =
                boundary_context_tag == Some(PosTag::SN) && matches!(tok.tag, PosTag::NNB | PosTag::MM);
            if !guard_ec_ef && !guard_va_etm && !guard_numeral_list {
                if let Some(start) = sent_start {
                    if start < boundary_end {
                        spans.push(SentenceSpan { start, end: boundary_end });
                    }
                }
                sent_start = Some(tok.start);
            }
            boundary_pending = false;
        }

        if tok.tag == PosTag::SP && tok.surface.contains('\n') && brackets.depth() == 0 {
            if let Some(start) = sent_start {
                if start < tok.start {
                    spans.push(SentenceSpan { start, end: tok.start });
                }
            }
            sent_start = None;
        } else if is_sentence_ending(tok.tag) && brackets.depth() == 0 {
            boundary_pending = true;
            boundary_context_tag = last_real_tag;
            boundary_end = tok.end;
        }

        if tok.tag != PosTag::SP && !is_sentence_ending(tok.tag) {
            last_real_tag = Some(tok.tag);
        }
    }

    if let (Some(start), Some(last)) = (sent_start, tokens.last()) {
        if start < last.end {
            spans.push(SentenceSpan { start, end: last.end });
        }
    }

    (spans, depths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(tag: PosTag, start: usize, end: usize, surface: &str) -> SplitToken {
        SplitToken { tag, start, end, surface: surface.to_string() }
    }

    #[test]
    fn splits_on_sentence_final_mark() {
        let tokens = vec![
            tok(PosTag::NNG, 0, 2, "날씨"),
            tok(PosTag::VCP, 2, 3, "가"),
            tok(PosTag::EF, 3, 5, "좋다"),
            tok(PosTag::SF, 5, 6, "."),
            tok(PosTag::SP, 6, 7, " "),
            tok(PosTag::NNG, 7, 9, "오늘"),
            tok(PosTag::EF, 9, 10, "도"),
            tok(PosTag::SF, 10, 11, "."),
        ];
        let (spans, _) = split_into_sents(&tokens);
        assert_eq!(spans, vec![SentenceSpan { start: 0, end: 6 }, SentenceSpan { start: 7, end: 11 }]);
    }

    #[test]
    fn quoted_period_does_not_split() {
        let tokens = vec![
            tok(PosTag::SS, 0, 1, "\""),
            tok(PosTag::NNG, 1, 3, "안녕"),
            tok(PosTag::SF, 3, 4, "."),
            tok(PosTag::SS, 4, 5, "\""),
            tok(PosTag::VV, 5, 7, "라고"),
            tok(PosTag::EF, 7, 8, "요"),
            tok(PosTag::SF, 8, 9, "."),
        ];
        let (spans, depths) = split_into_sents(&tokens);
        assert_eq!(spans.len(), 1);
        assert_eq!(depths[2], 1);
    }

    #[test]
    fn va_etm_boundary_is_suppressed() {
        let tokens = vec![
            tok(PosTag::VA, 0, 2, "싶"),
            tok(PosTag::SF, 2, 3, "."),
            tok(PosTag::ETM, 3, 4, "은"),
            tok(PosTag::NNB, 4, 5, "것"),
            tok(PosTag::SF, 5, 6, "."),
        ];
        let (spans, _) = split_into_sents(&tokens);
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn numeral_list_marker_does_not_split() {
        let tokens = vec![
            tok(PosTag::SN, 0, 1, "1"),
            tok(PosTag::SF, 1, 2, "."),
            tok(PosTag::NNB, 2, 3, "번"),
            tok(PosTag::EF, 3, 4, "째"),
            tok(PosTag::SF, 4, 5, "."),
        ];
        let (spans, _) = split_into_sents(&tokens);
        assert_eq!(spans.len(), 1);
    }

    #[test]
    fn line_break_outside_brackets_splits() {
        let tokens = vec![
            tok(PosTag::NNG, 0, 2, "안녕"),
            tok(PosTag::SP, 2, 3, "\n"),
            tok(PosTag::NNG, 3, 5, "반가워"),
        ];
        let (spans, _) = split_into_sents(&tokens);
        assert_eq!(spans, vec![SentenceSpan { start: 0, end: 2 }, SentenceSpan { start: 3, end: 5 }]);
    }
}
