//! Typo transformer (§4.8): a compiled map from jamo substring to
//! candidate replacements, each with a cost and an optional guard
//! condition on the surrounding context.

use kiwi_hangul::CondVowel;

/// One registered substitution: `pattern -> replacement` at cost `cost`,
/// gated by `guard` against the jamo immediately preceding the match.
#[derive(Clone, Debug)]
pub struct TypoRule {
    /// Jamo sequence this rule looks for.
    pub pattern: Vec<u16>,
    /// Jamo sequence to substitute in its place.
    pub replacement: Vec<u16>,
    /// Cost added to any path that takes this substitution.
    pub cost: f32,
    /// If set, the rule only applies when the jamo immediately before the
    /// match satisfies this vowel condition (used by `continual_typo_set`
    /// to restrict consonant doubling to vowel-final syllables).
    pub guard: Option<CondVowel>,
}

/// A compiled set of typo rules, queried lazily by position during lattice
/// construction rather than eagerly expanding every combination up front.
#[derive(Clone, Debug, Default)]
pub struct TypoTransformer {
    rules: Vec<TypoRule>,
}

impl TypoTransformer {
    /// An empty rule set.
    pub fn new() -> TypoTransformer {
        TypoTransformer { rules: Vec::new() }
    }

    /// Register one rule.
    pub fn add_rule(&mut self, rule: TypoRule) {
        self.rules.push(rule);
    }

    /// Combine two rule sets (e.g. `basic_typo_set().compose(continual_typo_set())`).
    pub fn compose(mut self, other: TypoTransformer) -> TypoTransformer {
        self.rules.extend(other.rules);
        self
    }

    /// Every `(replacement, pattern_len, cost)` reachable by applying
    /// exactly one registered rule starting at `text[pos..]`, honoring each
    /// rule's guard against `text[..pos]`'s tail. `pattern_len` is how many
    /// code units of `text` the replacement consumes, so the lattice
    /// builder knows where to resume scanning after splicing it in.
    pub fn alternatives_at(&self, text: &[u16], pos: usize) -> Vec<(Vec<u16>, usize, f32)> {
        let mut out = Vec::new();
        let tail = &text[..pos];
        for rule in &self.rules {
            if pos + rule.pattern.len() > text.len() {
                continue;
            }
            if text[pos..pos + rule.pattern.len()] != rule.pattern[..] {
                continue;
            }
            if let Some(cond) = rule.guard {
                if !kiwi_hangul::matches_vowel(tail, cond) {
                    continue;
                }
            }
            out.push((rule.replacement.clone(), rule.pattern.len(), rule.cost));
        }
        out
    }

    /// Every string reachable from `input` by applying at most one
    /// registered replacement at each non-overlapping position, paired
    /// with the summed cost of the replacements it used. Always includes
    /// `(input, 0.0)` itself (applying zero replacements).
    pub fn generate(&self, input: &[u16]) -> Vec<(Vec<u16>, f32)> {
        let mut out = vec![(input.to_vec(), 0.0f32)];
        for pos in 0..input.len() {
            for rule in &self.rules {
                if pos + rule.pattern.len() > input.len() {
                    continue;
                }
                if input[pos..pos + rule.pattern.len()] != rule.pattern[..] {
                    continue;
                }
                let tail = &input[..pos];
                if let Some(cond) = rule.guard {
                    if !kiwi_hangul::matches_vowel(tail, cond) {
                        continue;
                    }
                }
                let mut variant = input[..pos].to_vec();
                variant.extend_from_slice(&rule.replacement);
                variant.extend_from_slice(&input[pos + rule.pattern.len()..]);
                out.push((variant, rule.cost));
            }
        }
        out
    }
}

fn units(s: &str) -> Vec<u16> {
    kiwi_hangul::normalize_str(s)
}

/// Common spelling-error substitutions (되/돼, 안/않, 됀/된 and similar
/// confusions), grounded on the same phonological mergers `kiwi-hangul`'s
/// `FeatureTestor` exists to model.
pub fn basic_typo_set() -> TypoTransformer {
    let mut t = TypoTransformer::new();
    let pairs: &[(&str, &str, f32)] =
        &[("됀", "된", -1.0), ("안되", "안돼", -1.0), ("왜", "외", -0.5), ("외", "왜", -0.5)];
    for &(pat, repl, cost) in pairs {
        t.add_rule(TypoRule { pattern: units(pat), replacement: units(repl), cost, guard: None });
    }
    t
}

/// Consonant doubling across a syllable boundary (e.g. "안되요" vs
/// "안됬요"-style slips), gated on the preceding syllable ending in a
/// vowel so the doubling only fires where it phonologically could.
pub fn continual_typo_set() -> TypoTransformer {
    let mut t = TypoTransformer::new();
    t.add_rule(TypoRule {
        pattern: units("씨"),
        replacement: units("시"),
        cost: -0.8,
        guard: Some(CondVowel::Vowel),
    });
    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_includes_original_and_variants() {
        let t = basic_typo_set();
        let input = units("외않됀데");
        let variants = t.generate(&input);
        assert!(variants.iter().any(|(v, _)| *v == input));
        assert!(variants.len() > 1);
    }

    #[test]
    fn guarded_rule_only_fires_after_vowel() {
        let t = continual_typo_set();
        let after_vowel = units("아씨");
        let alts = t.alternatives_at(&after_vowel, 1);
        assert!(!alts.is_empty());
    }

    #[test]
    fn alternatives_report_pattern_length() {
        let t = basic_typo_set();
        let text = units("됀데");
        let alts = t.alternatives_at(&text, 0);
        let (_, pattern_len, _) = alts.into_iter().find(|(r, _, _)| *r == units("된")).unwrap();
        assert_eq!(pattern_len, units("됀").len());
    }
}
