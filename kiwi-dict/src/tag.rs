//! The closed part-of-speech tag enumeration and its classification
//! predicates, grounded on `TagUtils.cpp`.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A part-of-speech tag.
///
/// `irregular` is an orthogonal flag on [`Tag`], not a distinct enum
/// variant: the tag of an irregular verb stem is still `VV`, just with
/// the bit set.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[allow(non_camel_case_types, missing_docs)]
pub enum PosTag {
    NNG,
    NNP,
    NNB,
    NR,
    NP,
    VV,
    VA,
    /// Root-paradigm alias of `VV` used to key a second combining-rule
    /// lookup when no group matches under the literal `VV` tag.
    PV,
    /// Root-paradigm alias of `VA`, analogous to `PV`.
    PA,
    VX,
    VCP,
    VCN,
    MAG,
    MAJ,
    MM,
    IC,
    EP,
    EF,
    EC,
    ETN,
    ETM,
    JKS,
    JKO,
    JKB,
    JKG,
    JKV,
    JKQ,
    JKC,
    JX,
    JC,
    XPN,
    XSN,
    XSV,
    XSA,
    XSAI,
    XR,
    SF,
    SP,
    SS,
    SSO,
    SSC,
    SE,
    SO,
    SW,
    SL,
    SH,
    SN,
    W_URL,
    W_EMAIL,
    W_MENTION,
    W_HASHTAG,
    W_SERIAL,
    W_EMOJI,
    UNKNOWN,
}

impl PosTag {
    /// All tags, in declaration order; used to build lookup tables.
    pub const ALL: &'static [PosTag] = &[
        PosTag::NNG, PosTag::NNP, PosTag::NNB, PosTag::NR, PosTag::NP,
        PosTag::VV, PosTag::VA, PosTag::PV, PosTag::PA, PosTag::VX, PosTag::VCP, PosTag::VCN,
        PosTag::MAG, PosTag::MAJ, PosTag::MM, PosTag::IC,
        PosTag::EP, PosTag::EF, PosTag::EC, PosTag::ETN, PosTag::ETM,
        PosTag::JKS, PosTag::JKO, PosTag::JKB, PosTag::JKG, PosTag::JKV,
        PosTag::JKQ, PosTag::JKC, PosTag::JX, PosTag::JC,
        PosTag::XPN, PosTag::XSN, PosTag::XSV, PosTag::XSA, PosTag::XSAI, PosTag::XR,
        PosTag::SF, PosTag::SP, PosTag::SS, PosTag::SSO, PosTag::SSC, PosTag::SE,
        PosTag::SO, PosTag::SW, PosTag::SL, PosTag::SH, PosTag::SN,
        PosTag::W_URL, PosTag::W_EMAIL, PosTag::W_MENTION, PosTag::W_HASHTAG,
        PosTag::W_SERIAL, PosTag::W_EMOJI, PosTag::UNKNOWN,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            PosTag::NNG => "NNG",
            PosTag::NNP => "NNP",
            PosTag::NNB => "NNB",
            PosTag::NR => "NR",
            PosTag::NP => "NP",
            PosTag::VV => "VV",
            PosTag::VA => "VA",
            PosTag::PV => "PV",
            PosTag::PA => "PA",
            PosTag::VX => "VX",
            PosTag::VCP => "VCP",
            PosTag::VCN => "VCN",
            PosTag::MAG => "MAG",
            PosTag::MAJ => "MAJ",
            PosTag::MM => "MM",
            PosTag::IC => "IC",
            PosTag::EP => "EP",
            PosTag::EF => "EF",
            PosTag::EC => "EC",
            PosTag::ETN => "ETN",
            PosTag::ETM => "ETM",
            PosTag::JKS => "JKS",
            PosTag::JKO => "JKO",
            PosTag::JKB => "JKB",
            PosTag::JKG => "JKG",
            PosTag::JKV => "JKV",
            PosTag::JKQ => "JKQ",
            PosTag::JKC => "JKC",
            PosTag::JX => "JX",
            PosTag::JC => "JC",
            PosTag::XPN => "XPN",
            PosTag::XSN => "XSN",
            PosTag::XSV => "XSV",
            PosTag::XSA => "XSA",
            PosTag::XSAI => "XSAI",
            PosTag::XR => "XR",
            PosTag::SF => "SF",
            PosTag::SP => "SP",
            PosTag::SS => "SS",
            PosTag::SSO => "SSO",
            PosTag::SSC => "SSC",
            PosTag::SE => "SE",
            PosTag::SO => "SO",
            PosTag::SW => "SW",
            PosTag::SL => "SL",
            PosTag::SH => "SH",
            PosTag::SN => "SN",
            PosTag::W_URL => "W_URL",
            PosTag::W_EMAIL => "W_EMAIL",
            PosTag::W_MENTION => "W_MENTION",
            PosTag::W_HASHTAG => "W_HASHTAG",
            PosTag::W_SERIAL => "W_SERIAL",
            PosTag::W_EMOJI => "W_EMOJI",
            PosTag::UNKNOWN => "UNKNOWN",
        }
    }

    /// True for noun-like categories, including symbol/web tags that behave
    /// like nouns for bigram legality and space-insertion purposes.
    pub fn is_noun_class(&self) -> bool {
        matches!(
            self,
            PosTag::NNG
                | PosTag::NNP
                | PosTag::NNB
                | PosTag::NR
                | PosTag::NP
                | PosTag::XSN
                | PosTag::XR
                | PosTag::SL
                | PosTag::SH
                | PosTag::SN
                | PosTag::W_URL
                | PosTag::W_EMAIL
                | PosTag::W_MENTION
                | PosTag::W_HASHTAG
                | PosTag::ETN
        )
    }

    /// True for verb/adjective/copula categories.
    pub fn is_verb_class(&self) -> bool {
        matches!(
            self,
            PosTag::VV
                | PosTag::VA
                | PosTag::PV
                | PosTag::PA
                | PosTag::VX
                | PosTag::XSV
                | PosTag::XSA
                | PosTag::VCP
                | PosTag::VCN
        )
    }

    /// True for ending categories (`EP..ETM`).
    pub fn is_e_class(&self) -> bool {
        matches!(self, PosTag::EP | PosTag::EF | PosTag::EC | PosTag::ETN | PosTag::ETM)
    }

    /// True for particle categories (`JKS..JC`).
    pub fn is_j_class(&self) -> bool {
        matches!(
            self,
            PosTag::JKS
                | PosTag::JKO
                | PosTag::JKB
                | PosTag::JKG
                | PosTag::JKV
                | PosTag::JKQ
                | PosTag::JKC
                | PosTag::JX
                | PosTag::JC
        )
    }

    /// True for suffix categories (`XSN..XSA`, including `XSAI`).
    pub fn is_suffix(&self) -> bool {
        matches!(self, PosTag::XSN | PosTag::XSV | PosTag::XSA | PosTag::XSAI)
    }
}

impl fmt::Display for PosTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PosTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<PosTag, Error> {
        let upper = s.to_ascii_uppercase();
        PosTag::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| Error::invalid_argument(format!("unrecognized POS tag: {}", s)))
    }
}

impl Default for PosTag {
    fn default() -> Self {
        PosTag::UNKNOWN
    }
}

/// A [`PosTag`] plus the orthogonal "irregular stem" flag.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Default)]
pub struct Tag {
    /// The POS category.
    pub pos: PosTag,
    /// Set when the morpheme is an irregular-conjugation stem variant
    /// (see §4.6.2 irregular-stem expansion).
    pub irregular: bool,
}

impl Tag {
    /// Construct a regular (non-irregular) tag.
    pub fn new(pos: PosTag) -> Tag {
        Tag { pos, irregular: false }
    }

    /// Construct an irregular-stem tag.
    pub fn irregular(pos: PosTag) -> Tag {
        Tag { pos, irregular: true }
    }

    /// The underlying POS category, ignoring the irregular flag.
    pub fn pos(&self) -> PosTag {
        self.pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_display_parse() {
        for &tag in PosTag::ALL {
            let s = tag.to_string();
            assert_eq!(s.parse::<PosTag>().unwrap(), tag);
        }
    }

    #[test]
    fn noun_class_excludes_verbs() {
        assert!(PosTag::NNG.is_noun_class());
        assert!(!PosTag::VV.is_noun_class());
    }

    #[test]
    fn bigram_class_predicates_partition_relevant_tags() {
        assert!(PosTag::EC.is_e_class());
        assert!(!PosTag::EC.is_verb_class());
        assert!(PosTag::VCP.is_verb_class());
    }

    #[test]
    fn unrecognized_tag_is_invalid_argument() {
        assert!("NOPE".parse::<PosTag>().is_err());
    }
}
