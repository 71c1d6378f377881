//! Finite-state machinery for the kiwi morphological analyzer: an NFA/DFA
//! builder over a jamo/code-point alphabet, an Aho-Corasick trie for
//! multi-pattern dictionary lookups, and the compiled combining-rule
//! engine that applies `kiwi-dict`'s rule files.
//!
//! Layered the way `ucd-generate` sits above `ucd-parse`: this crate knows
//! nothing about file formats, only about the automata built from the
//! typed values `kiwi-dict` parses out of them.

#![deny(missing_docs)]

mod combining;
mod dfa;
mod error;
mod nfa;
mod sparse_set;
mod trie;

pub use combining::{CombineResult, CombiningRules};
pub use dfa::CompiledPattern;
pub use error::Error;
pub use nfa::Nfa;
pub use trie::AhoCorasick;
