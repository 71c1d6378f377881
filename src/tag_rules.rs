//! Pure POS-pair predicates shared by the decoder and the joiner: which
//! adjacent-tag pairs are grammatically legal (§4.7a, `TagUtils.cpp`'s
//! `isAllowedSeq`) and which conventionally take a space between them
//! (§4.9a, `Joiner.cpp`'s `isSpaceInsertable`).

use kiwi_dict::PosTag;

/// POS-bigram legality: reject `left -> right` transitions the grammar
/// never produces, independent of any specific dictionary content.
pub fn is_allowed_seq(left: PosTag, right: PosTag) -> bool {
    if left.is_noun_class() && right.is_e_class() {
        return false;
    }
    if (left.is_verb_class() || left.is_e_class()) && right == PosTag::VCP {
        return false;
    }
    if left.is_verb_class() && !right.is_e_class() {
        return false;
    }
    if !left.is_verb_class() && !left.is_e_class() && right.is_e_class() {
        return false;
    }
    true
}

/// True if a space conventionally separates a `left`-tagged token from an
/// immediately following `right`-tagged one.
pub fn is_space_insertable(left: PosTag, right: PosTag) -> bool {
    if matches!(right, PosTag::VCP | PosTag::XSA | PosTag::XSAI | PosTag::XSV | PosTag::XSN) {
        return false;
    }
    if matches!(left, PosTag::XPN | PosTag::SO | PosTag::SS | PosTag::SW) {
        return false;
    }
    if left == PosTag::SN && right == PosTag::NNB {
        return false;
    }
    if !matches!(left, PosTag::SN | PosTag::SP | PosTag::SF | PosTag::SL) && matches!(right, PosTag::SL | PosTag::SN) {
        return true;
    }
    matches!(
        right,
        PosTag::NNG
            | PosTag::NNP
            | PosTag::NNB
            | PosTag::NP
            | PosTag::NR
            | PosTag::MAG
            | PosTag::MAJ
            | PosTag::MM
            | PosTag::IC
            | PosTag::VV
            | PosTag::VA
            | PosTag::VX
            | PosTag::VCN
            | PosTag::XPN
            | PosTag::XR
            | PosTag::SW
            | PosTag::SH
            | PosTag::W_EMAIL
            | PosTag::W_HASHTAG
            | PosTag::W_URL
            | PosTag::W_MENTION
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noun_to_ending_is_illegal() {
        assert!(!is_allowed_seq(PosTag::NNG, PosTag::EC));
    }

    #[test]
    fn verb_to_ending_is_legal() {
        assert!(is_allowed_seq(PosTag::VV, PosTag::EC));
    }

    #[test]
    fn verb_to_non_ending_is_illegal() {
        assert!(!is_allowed_seq(PosTag::VV, PosTag::NNG));
    }

    #[test]
    fn ending_to_vcp_is_illegal() {
        assert!(!is_allowed_seq(PosTag::EC, PosTag::VCP));
    }

    #[test]
    fn particle_to_noun_is_legal() {
        assert!(is_allowed_seq(PosTag::JKO, PosTag::NNG));
    }

    #[test]
    fn suffix_never_wants_a_leading_space() {
        assert!(!is_space_insertable(PosTag::NNG, PosTag::XSN));
    }

    #[test]
    fn noun_before_noun_wants_a_space() {
        assert!(is_space_insertable(PosTag::NNG, PosTag::NNG));
    }

    #[test]
    fn opening_bracket_does_not_want_a_trailing_space() {
        assert!(!is_space_insertable(PosTag::SS, PosTag::NNG));
    }
}
