//! The unified error type surfaced by the `kiwi-core` public API (§7).
//!
//! Lower crates (`kiwi-dict`, `kiwi-automata`) each carry their own small
//! `Error`/`ErrorKind` pair, in the `ucd_parse::Error` style. This crate is
//! the top of the stack, so it converges all of those into one taxonomy
//! callers actually match on, using `thiserror` the way a binary-facing
//! crate typically does rather than hand-rolling `Display`/`From` again.

use std::path::PathBuf;

use thiserror::Error;

/// Every error `kiwi-core` can surface, per §7's taxonomy.
#[derive(Debug, Error)]
pub enum KiwiError {
    /// A model or dictionary file could not be read.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// The path that failed to open or read.
        path: PathBuf,
        /// The underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A rule file, dictionary line, or model file was malformed.
    #[error("format error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    Format {
        /// Human-readable description of what was wrong.
        message: String,
        /// 1-based source line, if known.
        line: Option<u64>,
    },

    /// An unrecognized POS tag, unknown config key, or out-of-range index.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A pre-analyzed word referenced a morpheme the dictionary doesn't
    /// contain.
    #[error("unknown morpheme: {form} ({tag})")]
    UnknownMorpheme {
        /// The surface form that was looked up.
        form: String,
        /// The tag under which it was looked up.
        tag: String,
    },

    /// A rule replacement referenced a nucleus-bare syllable that has
    /// nothing to broadcast onto (§4.3 "Broadcasting" requires a bare
    /// vowel jamo, not an empty or malformed sequence).
    #[error("invalid Hangul composition: {0}")]
    InvalidHangulComposition(String),
}

impl From<kiwi_dict::Error> for KiwiError {
    fn from(e: kiwi_dict::Error) -> KiwiError {
        match e.kind() {
            kiwi_dict::ErrorKind::Io(_) => KiwiError::Format { message: e.to_string(), line: e.line() },
            kiwi_dict::ErrorKind::Format(msg) => {
                KiwiError::Format { message: msg.clone(), line: e.line() }
            }
            kiwi_dict::ErrorKind::InvalidArgument(msg) => KiwiError::InvalidArgument(msg.clone()),
        }
    }
}

impl From<kiwi_automata::Error> for KiwiError {
    fn from(e: kiwi_automata::Error) -> KiwiError {
        KiwiError::Format { message: e.to_string(), line: None }
    }
}

/// The result type returned throughout `kiwi-core`.
pub type Result<T> = std::result::Result<T, KiwiError>;
