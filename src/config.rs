//! `KiwiConfig` and the `build()`-time option/dialect bit flags (§6, §9
//! "Global mutable configuration").
//!
//! `KiwiConfig` is a plain value type copied into each `Kiwi` at `build()`;
//! nothing in the analysis path reads process-global state.

use bitflags::bitflags;

bitflags! {
    /// Flags controlling what `KiwiBuilder::build` loads and how it wires
    /// allomorphs into the language model.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
    pub struct BuildOptions: u32 {
        /// Collapse allomorph variants onto one LM form id.
        const INTEGRATE_ALLOMORPH = 1 << 0;
        /// Load the bundled default dictionary.
        const LOAD_DEFAULT_DICT = 1 << 1;
        /// Load the bundled typo-correction dictionary.
        const LOAD_TYPO_DICT = 1 << 2;
        /// Load all bundled dialect dictionaries, not just `standard`.
        const LOAD_MULTI_DICT = 1 << 3;
    }
}

bitflags! {
    /// Regional dialect selector, parsed from comma-separated names
    /// (`kiwi_dict::Dialect::parse_list`) and threaded through to rule
    /// group selection.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct Dialects: u32 {
        /// Always enabled.
        const STANDARD = 1 << 0;
        /// 경상 dialect.
        const GYEONGSANG = 1 << 1;
        /// 전라 dialect.
        const JEOLLA = 1 << 2;
        /// 충청 dialect.
        const CHUNGCHEONG = 1 << 3;
        /// 제주 dialect.
        const JEJU = 1 << 4;
        /// 함경 dialect.
        const HAMGYEONG = 1 << 5;
        /// 평안 dialect.
        const PYEONGAN = 1 << 6;
    }
}

impl Default for Dialects {
    fn default() -> Dialects {
        Dialects::STANDARD
    }
}

/// Runtime-settable analysis parameters (§6 "Config keys").
#[derive(Clone, Copy, Debug)]
pub struct KiwiConfig {
    /// Collapse allomorph variants onto one LM form id during analysis.
    pub integrate_allomorph: bool,
    /// Paths whose cost exceeds the best path's cost by more than this
    /// threshold are pruned from the k-best search.
    pub cut_off_threshold: f32,
    /// Multiplicative scale applied to an unknown-form node's base score.
    pub unk_form_score_scale: f32,
    /// Additive bias applied to an unknown-form node's score.
    pub unk_form_score_bias: f32,
    /// Cost added per implicit space insertion/elision.
    pub space_penalty: f32,
    /// Weight applied to a typo alternative's intrinsic cost.
    pub typo_cost_weight: f32,
    /// Maximum jamo length of a single unknown-form node.
    pub max_unk_form_size: usize,
    /// Maximum number of implicit space violations tolerated on one path.
    pub space_tolerance: u32,
}

impl Default for KiwiConfig {
    fn default() -> KiwiConfig {
        KiwiConfig {
            integrate_allomorph: true,
            cut_off_threshold: 8.0,
            unk_form_score_scale: 1.0,
            unk_form_score_bias: -6.0,
            space_penalty: 2.5,
            typo_cost_weight: 1.0,
            max_unk_form_size: 6,
            space_tolerance: 0,
        }
    }
}

impl KiwiConfig {
    /// Look up a config value by its string key, for callers that load
    /// configuration from an external source. Unknown keys are an
    /// `InvalidArgument` error per §7.
    pub fn set(&mut self, key: &str, value: f32) -> crate::error::Result<()> {
        match key {
            "integrateAllomorph" => self.integrate_allomorph = value != 0.0,
            "cutOffThreshold" => self.cut_off_threshold = value,
            "unkFormScoreScale" => self.unk_form_score_scale = value,
            "unkFormScoreBias" => self.unk_form_score_bias = value,
            "spacePenalty" => self.space_penalty = value,
            "typoCostWeight" => self.typo_cost_weight = value,
            "maxUnkFormSize" => self.max_unk_form_size = value.max(0.0) as usize,
            "spaceTolerance" => self.space_tolerance = value.max(0.0) as u32,
            other => {
                return Err(crate::error::KiwiError::InvalidArgument(format!(
                    "unknown config key: {}",
                    other
                )))
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_key_is_rejected() {
        let mut cfg = KiwiConfig::default();
        assert!(cfg.set("bogus", 1.0).is_err());
    }

    #[test]
    fn known_key_updates_field() {
        let mut cfg = KiwiConfig::default();
        cfg.set("spaceTolerance", 2.0).unwrap();
        assert_eq!(cfg.space_tolerance, 2);
    }
}
