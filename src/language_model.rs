//! The language-model seam (§4.7): the decoder scores transitions through
//! `score_next` without caring whether the implementation is an n-gram
//! model, a skip-bigram model, or (for tests) a small in-memory table.

use std::collections::HashMap;

use kiwi_dict::MorphemeId;

/// Opaque per-path history state threaded through the decoder.
pub trait LmState: Clone {}
impl<T: Clone> LmState for T {}

/// A scoring backend for the Viterbi decoder.
///
/// `State` is whatever the implementation needs to remember about history
/// (an n-gram's trailing context, a skip-bigram's sparse window, …); the
/// decoder only ever clones it and passes it back.
pub trait LanguageModel {
    /// The per-path history state type.
    type State: LmState;

    /// The state a path begins in, before any morpheme has been scored.
    fn initial_state(&self) -> Self::State;

    /// Score `morpheme` as the next step from `state`, returning its log
    /// probability and the state to carry forward.
    fn score_next(&self, state: &Self::State, morpheme: MorphemeId) -> (f32, Self::State);
}

/// A minimal in-memory bigram-ish model for tests and small deployments:
/// scores are looked up from an explicit `(history, next) -> logp` table,
/// falling back to a flat unigram floor for unseen pairs. Not meant to
/// compete with a trained n-gram model; it exists so `kiwi-core`'s decoder
/// can be exercised without bundling an actual trained LM file.
#[derive(Debug, Default)]
pub struct TableLanguageModel {
    bigram: HashMap<(MorphemeId, MorphemeId), f32>,
    unigram: HashMap<MorphemeId, f32>,
    floor: f32,
}

impl TableLanguageModel {
    /// An empty model where every morpheme scores `floor`.
    pub fn new(floor: f32) -> TableLanguageModel {
        TableLanguageModel { bigram: HashMap::new(), unigram: HashMap::new(), floor }
    }

    /// Set the unigram log-probability for `id`.
    pub fn set_unigram(&mut self, id: MorphemeId, logp: f32) {
        self.unigram.insert(id, logp);
    }

    /// Set the bigram log-probability for `prev -> next`.
    pub fn set_bigram(&mut self, prev: MorphemeId, next: MorphemeId, logp: f32) {
        self.bigram.insert((prev, next), logp);
    }
}

/// History state for [`TableLanguageModel`]: just the previous morpheme,
/// or `None` at the start of a path.
#[derive(Clone, Copy, Debug, Default)]
pub struct TableLmState(Option<MorphemeId>);

impl LanguageModel for TableLanguageModel {
    type State = TableLmState;

    fn initial_state(&self) -> TableLmState {
        TableLmState(None)
    }

    fn score_next(&self, state: &TableLmState, morpheme: MorphemeId) -> (f32, TableLmState) {
        let logp = match state.0 {
            Some(prev) => self
                .bigram
                .get(&(prev, morpheme))
                .copied()
                .or_else(|| self.unigram.get(&morpheme).copied())
                .unwrap_or(self.floor),
            None => self.unigram.get(&morpheme).copied().unwrap_or(self.floor),
        };
        (logp, TableLmState(Some(morpheme)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_pair_falls_back_to_unigram_then_floor() {
        let mut lm = TableLanguageModel::new(-10.0);
        lm.set_unigram(1, -2.0);
        let s0 = lm.initial_state();
        let (p, s1) = lm.score_next(&s0, 1);
        assert_eq!(p, -2.0);
        let (p2, _) = lm.score_next(&s1, 2);
        assert_eq!(p2, -10.0);
    }

    #[test]
    fn bigram_overrides_unigram() {
        let mut lm = TableLanguageModel::new(-10.0);
        lm.set_unigram(2, -5.0);
        lm.set_bigram(1, 2, -0.5);
        let s0 = lm.initial_state();
        let (_, s1) = lm.score_next(&s0, 1);
        let (p, _) = lm.score_next(&s1, 2);
        assert_eq!(p, -0.5);
    }
}
