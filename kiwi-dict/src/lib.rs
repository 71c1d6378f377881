//! POS tags, the morpheme/dictionary data model, and line-oriented parsers
//! for dictionary and combining-rule source files.
//!
//! This crate has no notion of finite-state machines (tries, NFAs, DFAs);
//! it produces the typed data those structures are built over, the way
//! `ucd-parse` produces typed rows that `ucd-generate` compiles into
//! tables.

#![deny(missing_docs)]

mod allomorph;
mod dict_file;
mod dictionary;
mod error;
mod morpheme;
mod rule_file;
mod tag;

pub use allomorph::{Allomorph, AllomorphTable};
pub use dict_file::{parse_dict_file, DictLine};
pub use dictionary::Dictionary;
pub use error::{Error, ErrorKind};
pub use morpheme::{CombinedFrom, Form, MorphemeEntry, MorphemeId};
pub use rule_file::{
    from_feature, parse_rule_file, to_feature, Dialect, RawRule, ReplTemplate, RuleCategory,
    RuleFile,
};
pub use tag::{PosTag, Tag};
