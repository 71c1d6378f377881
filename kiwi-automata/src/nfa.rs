//! Thompson construction of an NFA over a code-point alphabet.
//!
//! Adapted from `dfa.rs`'s `NFA`/`ThompsonRef`/compile_* family. The
//! teacher builds its NFA over raw UTF-8 bytes (alphabet size 256) because
//! it compiles Unicode *property* patterns meant to run directly against
//! UTF-8 text. Rule patterns here run against already jamo-normalized code
//! unit sequences, so there is no UTF-8 byte-sequence expansion step
//! (`utf8_ranges::Utf8Sequences`): each `Hir` character class range is
//! compiled directly into one `Range` edge over code points.

use regex_syntax::hir::{self, Hir, HirKind};
use regex_syntax::Parser;

use crate::error::{Error, Result};

pub type NfaStateId = u32;

#[derive(Debug)]
pub enum NfaState {
    Empty { next: NfaStateId },
    Range { start: u32, end: u32, next: NfaStateId },
    Union { alternates: Vec<NfaStateId>, reverse: bool },
    Match,
}

impl NfaState {
    fn is_epsilon(&self) -> bool {
        matches!(self, NfaState::Empty { .. } | NfaState::Union { .. })
    }
}

struct ThompsonRef {
    start: NfaStateId,
    end: NfaStateId,
}

/// A Thompson-constructed NFA with a single designated start state (`0`)
/// and a single `Match` state reachable from it.
#[derive(Debug)]
pub struct Nfa {
    pub(crate) states: Vec<NfaState>,
    pub(crate) start: NfaStateId,
}

impl Nfa {
    /// Parse `pattern` as a standard regex (the mini-regex grammar — jamo
    /// literals, `[...]` classes, `(...)`, `|`, `?`, `*`, `+`, `.`,
    /// anchors — is a subset of what `regex-syntax` already accepts) and
    /// compile it into an NFA.
    pub fn from_pattern(pattern: &str) -> Result<Nfa> {
        let hir = Parser::new().parse(pattern)?;
        Nfa::from_hir(&hir)
    }

    fn from_hir(expr: &Hir) -> Result<Nfa> {
        let mut nfa = Nfa { states: Vec::new(), start: 0 };
        let start = nfa.add_empty();
        let compiled = nfa.compile(expr)?;
        let match_id = nfa.add_match();
        nfa.patch(start, compiled.start);
        nfa.patch(compiled.end, match_id);
        nfa.start = start;
        Ok(nfa)
    }

    fn compile(&mut self, expr: &Hir) -> Result<ThompsonRef> {
        match expr.kind() {
            HirKind::Empty => {
                let id = self.add_empty();
                Ok(ThompsonRef { start: id, end: id })
            }
            HirKind::Literal(hir::Literal::Unicode(ch)) => {
                Ok(self.compile_range(*ch as u32, *ch as u32))
            }
            HirKind::Literal(hir::Literal::Byte(b)) => Ok(self.compile_range(*b as u32, *b as u32)),
            HirKind::Class(hir::Class::Unicode(cls)) => {
                let ranges: Vec<ThompsonRef> =
                    cls.iter().map(|r| self.compile_range(r.start() as u32, r.end() as u32)).collect();
                self.compile_alternation(ranges.into_iter().map(Ok))
            }
            HirKind::Class(hir::Class::Bytes(cls)) => {
                let ranges: Vec<ThompsonRef> =
                    cls.iter().map(|r| self.compile_range(r.start() as u32, r.end() as u32)).collect();
                self.compile_alternation(ranges.into_iter().map(Ok))
            }
            HirKind::Repetition(rep) => self.compile_repetition(rep),
            HirKind::Group(group) => self.compile(&group.hir),
            HirKind::Concat(exprs) => {
                let mut parts = Vec::with_capacity(exprs.len());
                for e in exprs {
                    parts.push(self.compile(e)?);
                }
                self.compile_concat(parts.into_iter().map(Ok))
            }
            HirKind::Alternation(exprs) => {
                let mut parts = Vec::with_capacity(exprs.len());
                for e in exprs {
                    parts.push(self.compile(e)?);
                }
                self.compile_alternation(parts.into_iter().map(Ok))
            }
            HirKind::Anchor(_) => Ok(self.compile_empty()),
            HirKind::WordBoundary(_) => Err(Error::new("word boundaries are not supported")),
        }
    }

    fn compile_concat<I>(&mut self, mut it: I) -> Result<ThompsonRef>
    where
        I: Iterator<Item = Result<ThompsonRef>>,
    {
        let ThompsonRef { start, mut end } = match it.next() {
            Some(r) => r?,
            None => return Ok(self.compile_empty()),
        };
        for r in it {
            let compiled = r?;
            self.patch(end, compiled.start);
            end = compiled.end;
        }
        Ok(ThompsonRef { start, end })
    }

    fn compile_alternation<I>(&mut self, it: I) -> Result<ThompsonRef>
    where
        I: Iterator<Item = Result<ThompsonRef>>,
    {
        let union = self.add_union();
        let mut ends = Vec::new();
        for r in it {
            let compiled = r?;
            self.patch(union, compiled.start);
            ends.push(compiled.end);
        }
        if ends.is_empty() {
            return Ok(self.compile_empty());
        }
        let empty = self.add_empty();
        for id in ends {
            self.patch(id, empty);
        }
        Ok(ThompsonRef { start: union, end: empty })
    }

    fn compile_repetition(&mut self, rep: &hir::Repetition) -> Result<ThompsonRef> {
        match rep.kind {
            hir::RepetitionKind::ZeroOrOne => self.compile_zero_or_one(&rep.hir, rep.greedy),
            hir::RepetitionKind::ZeroOrMore => self.compile_at_least(&rep.hir, rep.greedy, 0),
            hir::RepetitionKind::OneOrMore => self.compile_at_least(&rep.hir, rep.greedy, 1),
            hir::RepetitionKind::Range(ref rng) => match *rng {
                hir::RepetitionRange::Exactly(n) => self.compile_exactly(&rep.hir, n),
                hir::RepetitionRange::AtLeast(m) => self.compile_at_least(&rep.hir, rep.greedy, m),
                hir::RepetitionRange::Bounded(min, max) => {
                    self.compile_bounded(&rep.hir, rep.greedy, min, max)
                }
            },
        }
    }

    fn compile_bounded(&mut self, expr: &Hir, greedy: bool, min: u32, max: u32) -> Result<ThompsonRef> {
        let prefix = self.compile_exactly(expr, min)?;
        if min == max {
            return Ok(prefix);
        }
        let mut optionals = Vec::new();
        for _ in min..max {
            optionals.push(self.compile_zero_or_one(expr, greedy)?);
        }
        let suffix = self.compile_concat(optionals.into_iter().map(Ok))?;
        self.patch(prefix.end, suffix.start);
        Ok(ThompsonRef { start: prefix.start, end: suffix.end })
    }

    fn compile_at_least(&mut self, expr: &Hir, greedy: bool, n: u32) -> Result<ThompsonRef> {
        if n == 0 {
            let union = if greedy { self.add_union() } else { self.add_reverse_union() };
            let compiled = self.compile(expr)?;
            self.patch(union, compiled.start);
            self.patch(compiled.end, union);
            Ok(ThompsonRef { start: union, end: union })
        } else if n == 1 {
            let compiled = self.compile(expr)?;
            let union = if greedy { self.add_union() } else { self.add_reverse_union() };
            self.patch(compiled.end, union);
            self.patch(union, compiled.start);
            Ok(ThompsonRef { start: compiled.start, end: union })
        } else {
            let prefix = self.compile_exactly(expr, n - 1)?;
            let last = self.compile(expr)?;
            let union = if greedy { self.add_union() } else { self.add_reverse_union() };
            self.patch(prefix.end, last.start);
            self.patch(last.end, union);
            self.patch(union, last.start);
            Ok(ThompsonRef { start: prefix.start, end: union })
        }
    }

    fn compile_zero_or_one(&mut self, expr: &Hir, greedy: bool) -> Result<ThompsonRef> {
        let union = if greedy { self.add_union() } else { self.add_reverse_union() };
        let compiled = self.compile(expr)?;
        let empty = self.add_empty();
        self.patch(union, compiled.start);
        self.patch(union, empty);
        self.patch(compiled.end, empty);
        Ok(ThompsonRef { start: union, end: empty })
    }

    fn compile_exactly(&mut self, expr: &Hir, n: u32) -> Result<ThompsonRef> {
        let mut parts = Vec::with_capacity(n as usize);
        for _ in 0..n {
            parts.push(self.compile(expr)?);
        }
        self.compile_concat(parts.into_iter().map(Ok))
    }

    fn compile_range(&mut self, start: u32, end: u32) -> ThompsonRef {
        let id = self.add_range(start, end);
        ThompsonRef { start: id, end: id }
    }

    fn compile_empty(&mut self) -> ThompsonRef {
        let id = self.add_empty();
        ThompsonRef { start: id, end: id }
    }

    fn patch(&mut self, from: NfaStateId, to: NfaStateId) {
        match self.states[from as usize] {
            NfaState::Empty { ref mut next } => *next = to,
            NfaState::Range { ref mut next, .. } => *next = to,
            NfaState::Union { ref mut alternates, reverse: false } => alternates.push(to),
            NfaState::Union { ref mut alternates, reverse: true } => alternates.insert(0, to),
            NfaState::Match => {}
        }
    }

    fn add_empty(&mut self) -> NfaStateId {
        let id = self.states.len() as NfaStateId;
        self.states.push(NfaState::Empty { next: 0 });
        id
    }

    fn add_range(&mut self, start: u32, end: u32) -> NfaStateId {
        let id = self.states.len() as NfaStateId;
        self.states.push(NfaState::Range { start, end, next: 0 });
        id
    }

    fn add_union(&mut self) -> NfaStateId {
        let id = self.states.len() as NfaStateId;
        self.states.push(NfaState::Union { alternates: Vec::new(), reverse: false });
        id
    }

    fn add_reverse_union(&mut self) -> NfaStateId {
        let id = self.states.len() as NfaStateId;
        self.states.push(NfaState::Union { alternates: Vec::new(), reverse: true });
        id
    }

    fn add_match(&mut self) -> NfaStateId {
        let id = self.states.len() as NfaStateId;
        self.states.push(NfaState::Match);
        id
    }

    /// Every `Range` boundary appearing in this NFA (both endpoints, the
    /// second one-past-the-end), used to build a compressed vocabulary.
    pub(crate) fn boundaries(&self) -> Vec<u32> {
        let mut bs = Vec::new();
        for s in &self.states {
            if let NfaState::Range { start, end, .. } = s {
                bs.push(*start);
                if *end < u32::MAX {
                    bs.push(*end + 1);
                }
            }
        }
        bs
    }
}

pub(crate) fn is_epsilon(s: &NfaState) -> bool {
    s.is_epsilon()
}
