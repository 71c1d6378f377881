//! `kiwi-core`: a Korean morphological analyzer (§1 OVERVIEW).
//!
//! Wires together the lower layers (`kiwi-hangul`'s Hangul codec,
//! `kiwi-dict`'s dictionary/rule-file data model, `kiwi-automata`'s
//! Aho-Corasick trie and combining-rule engine) into a lattice-and-Viterbi
//! analyzer with typo correction, auto-joining, and sentence splitting.
//!
//! Callers start with [`analyzer::KiwiBuilder`], load a dictionary and rule
//! file, and `build()` into an immutable [`analyzer::Kiwi`] to call
//! [`analyzer::Kiwi::analyze`] on.

#![deny(missing_docs)]

mod analyzer;
mod config;
mod error;
mod joiner;
mod language_model;
mod lattice;
mod pattern_matcher;
mod splitter;
mod tag_rules;
mod typo;
mod viterbi;

pub use analyzer::{Analysis, AnalysisFuture, Kiwi, KiwiBuilder, Script, Token};
pub use config::{BuildOptions, Dialects, KiwiConfig};
pub use error::{KiwiError, Result};
pub use joiner::AutoJoiner;
pub use language_model::{LanguageModel, LmState, TableLanguageModel, TableLmState};
pub use pattern_matcher::{match_pattern, MatchOptions};
pub use splitter::{split_into_sents, SentenceSpan, SplitToken};
pub use typo::{basic_typo_set, continual_typo_set, TypoRule, TypoTransformer};
pub use viterbi::PretokenizedSpan;

pub use kiwi_dict::{PosTag, Tag};
