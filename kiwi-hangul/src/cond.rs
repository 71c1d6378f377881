//! Phonological condition enumerations shared by the combining-rule engine,
//! the dictionary data model, and the lattice builder.

/// A vowel/coda condition tested against the tail of a jamo string.
///
/// `vocalic = vowel ∨ coda-ㄹ`; `vocalic_h = vocalic ∨ coda-ㅎ`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub enum CondVowel {
    #[default]
    None,
    Any,
    Vowel,
    NonVowel,
    Vocalic,
    NonVocalic,
    VocalicH,
    NonVocalicH,
    Applosive,
}

/// A positive/negative (yang/yin) vowel-harmony condition.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub enum CondPolarity {
    #[default]
    None,
    Positive,
    Negative,
    NonAdj,
}
