//! Subset (powerset) construction of a DFA from an [`Nfa`], over a
//! vocabulary-compressed code-point alphabet, plus Hopcroft minimization.
//!
//! Adapted from `dfa.rs`'s `DFABuilder`/`Minimizer`. The teacher iterates
//! the fixed byte alphabet `0..=255` at every step; we instead compute a
//! *vocabulary* once per pattern — the minimal set of representative code
//! points such that every `Range` edge used by the NFA is a union of whole
//! vocabulary intervals (exactly the "vocabulary" construction described
//! for the combining-rule DFA) — and iterate that instead. This keeps the
//! per-state transition table small regardless of how sparse the jamo
//! alphabet is.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::nfa::{is_epsilon, Nfa, NfaState, NfaStateId};
use crate::sparse_set::SparseSet;

pub type DfaStateId = u32;
const DFA_DEAD: DfaStateId = 0;

/// A minimized DFA over a compressed code-point vocabulary.
#[derive(Debug)]
pub struct CompiledPattern {
    states: Vec<DfaState>,
    start: DfaStateId,
    /// Sorted interval starts; `vocab[i]..vocab[i+1]` (or `..=u32::MAX` for
    /// the last) is one symbol class, found by `partition_point`.
    vocab: Vec<u32>,
}

#[derive(Debug)]
struct DfaState {
    is_match: bool,
    transitions: Box<[DfaStateId]>,
}

impl CompiledPattern {
    /// Compile a pattern string directly.
    pub fn new(pattern: &str) -> crate::error::Result<CompiledPattern> {
        let nfa = Nfa::from_pattern(pattern)?;
        Ok(CompiledPattern::from_nfa(&nfa))
    }

    fn from_nfa(nfa: &Nfa) -> CompiledPattern {
        let mut bounds = nfa.boundaries();
        bounds.sort_unstable();
        bounds.dedup();
        if bounds.is_empty() {
            bounds.push(0);
        }
        let mut dfa = DfaBuilder::new(nfa, bounds).build();
        Minimizer::new(&mut dfa).run();
        dfa
    }

    fn symbol_of(&self, cp: u32) -> usize {
        match self.vocab.binary_search(&cp) {
            Ok(i) => i,
            Err(0) => 0,
            Err(i) => i - 1,
        }
    }

    /// Longest-prefix match length of `haystack` starting at offset 0 (like
    /// `dfa.rs`'s `DFA::find`, generalized to jamo code units). `None` if
    /// no prefix, including the empty one, matches.
    pub fn longest_prefix_match(&self, haystack: &[u16]) -> Option<usize> {
        let mut state = self.start;
        let mut last_match = if self.states[state as usize].is_match { Some(0) } else { None };
        for (i, &unit) in haystack.iter().enumerate() {
            let sym = self.symbol_of(unit as u32);
            state = self.states[state as usize].transitions[sym];
            if state == DFA_DEAD {
                return last_match;
            }
            if self.states[state as usize].is_match {
                last_match = Some(i + 1);
            }
        }
        last_match
    }

    /// Longest-suffix match ending exactly at `haystack`'s end: the
    /// smallest start offset `s` such that `haystack[s..]` is fully
    /// accepted. Used for left-pattern matching, since combining-rule left
    /// patterns describe a condition on the *tail* of the left form.
    pub fn longest_suffix_match(&self, haystack: &[u16]) -> Option<usize> {
        for start in 0..=haystack.len() {
            if self.accepts_exactly(&haystack[start..]) {
                return Some(start);
            }
        }
        None
    }

    fn accepts_exactly(&self, s: &[u16]) -> bool {
        let mut state = self.start;
        for &unit in s {
            let sym = self.symbol_of(unit as u32);
            state = self.states[state as usize].transitions[sym];
            if state == DFA_DEAD {
                return false;
            }
        }
        self.states[state as usize].is_match
    }
}

struct DfaBuilder<'a> {
    nfa: &'a Nfa,
    vocab: Vec<u32>,
    dfa_states: Vec<DfaState>,
    builder_states: Vec<Rc<BuilderState>>,
    cache: HashMap<Rc<BuilderState>, DfaStateId>,
    stack: Vec<NfaStateId>,
    start: DfaStateId,
}

#[derive(Debug, Eq, Hash, PartialEq)]
struct BuilderState {
    is_match: bool,
    nfa_states: Vec<NfaStateId>,
}

impl<'a> DfaBuilder<'a> {
    fn new(nfa: &'a Nfa, vocab: Vec<u32>) -> DfaBuilder<'a> {
        let dead = Rc::new(BuilderState { is_match: false, nfa_states: Vec::new() });
        let mut cache = HashMap::new();
        cache.insert(dead.clone(), DFA_DEAD);
        DfaBuilder {
            nfa,
            vocab,
            dfa_states: vec![DfaState { is_match: false, transitions: Self::dead_row(0) }],
            builder_states: vec![dead],
            cache,
            stack: Vec::new(),
            start: DFA_DEAD,
        }
    }

    fn dead_row(len: usize) -> Box<[DfaStateId]> {
        vec![DFA_DEAD; len].into_boxed_slice()
    }

    fn build(mut self) -> CompiledPattern {
        let vocab_len = self.vocab.len();
        self.dfa_states[0].transitions = Self::dead_row(vocab_len);

        let mut sparse = SparseSet::new(self.nfa.states.len());
        let start_id = self.add_start(&mut sparse);
        self.start = start_id;

        let mut uncompiled = vec![start_id];
        let mut queued: HashSet<DfaStateId> = HashSet::new();
        queued.insert(start_id);
        while let Some(id) = uncompiled.pop() {
            let mut row = Self::dead_row(vocab_len).into_vec();
            for sym in 0..vocab_len {
                let rep = self.vocab[sym];
                sparse.clear();
                self.step(id, rep, &mut sparse);
                let next_id = self.intern(&sparse);
                row[sym] = next_id;
                if queued.insert(next_id) {
                    uncompiled.push(next_id);
                }
            }
            self.dfa_states[id as usize].transitions = row.into_boxed_slice();
        }

        CompiledPattern { states: self.dfa_states, start: self.start, vocab: self.vocab }
    }

    fn step(&mut self, dfa_id: DfaStateId, symbol_rep: u32, out: &mut SparseSet) {
        out.clear();
        for i in 0..self.builder_states[dfa_id as usize].nfa_states.len() {
            let nfa_id = self.builder_states[dfa_id as usize].nfa_states[i];
            if let NfaState::Range { start, end, next } = self.nfa.states[nfa_id as usize] {
                if start <= symbol_rep && symbol_rep <= end {
                    self.epsilon_closure(next, out);
                }
            }
        }
    }

    fn epsilon_closure(&mut self, start: NfaStateId, set: &mut SparseSet) {
        if !is_epsilon(&self.nfa.states[start as usize]) {
            set.insert(start);
            return;
        }
        self.stack.push(start);
        while let Some(mut id) = self.stack.pop() {
            loop {
                if set.contains(id) {
                    break;
                }
                set.insert(id);
                match self.nfa.states[id as usize] {
                    NfaState::Empty { next } => id = next,
                    NfaState::Union { ref alternates, .. } => {
                        id = match alternates.first() {
                            None => break,
                            Some(&id) => id,
                        };
                        self.stack.extend(alternates[1..].iter().rev());
                    }
                    NfaState::Range { .. } | NfaState::Match => break,
                }
            }
        }
    }

    fn add_start(&mut self, sparse: &mut SparseSet) -> DfaStateId {
        sparse.clear();
        self.epsilon_closure(self.nfa.start, sparse);
        self.intern(sparse)
    }

    fn intern(&mut self, set: &SparseSet) -> DfaStateId {
        let mut is_match = false;
        let mut nfa_states: Vec<NfaStateId> = Vec::new();
        for &id in set {
            match self.nfa.states[id as usize] {
                NfaState::Range { .. } => nfa_states.push(id),
                NfaState::Match => is_match = true,
                NfaState::Empty { .. } | NfaState::Union { .. } => {}
            }
        }
        let key = BuilderState { is_match, nfa_states };
        if let Some(&id) = self.cache.get(&key) {
            return id;
        }
        let id = self.dfa_states.len() as DfaStateId;
        self.dfa_states.push(DfaState { is_match: key.is_match, transitions: Self::dead_row(0) });
        let rc = Rc::new(key);
        self.builder_states.push(rc.clone());
        self.cache.insert(rc, id);
        id
    }
}

/// Hopcroft partition-refinement minimization, generalized from
/// `dfa.rs`'s `Minimizer` to iterate the compressed vocabulary instead of
/// `0..=255`.
struct Minimizer<'a> {
    dfa: &'a mut CompiledPattern,
    incoming: Vec<Vec<Vec<DfaStateId>>>,
    partitions: Vec<Vec<DfaStateId>>,
    waiting: Vec<Vec<DfaStateId>>,
}

impl<'a> Minimizer<'a> {
    fn new(dfa: &'a mut CompiledPattern) -> Minimizer<'a> {
        let incoming = Self::incoming_transitions(dfa);
        let partitions = Self::initial_partitions(dfa);
        let waiting = vec![partitions[0].clone()];
        Minimizer { dfa, incoming, partitions, waiting }
    }

    fn incoming_transitions(dfa: &CompiledPattern) -> Vec<Vec<Vec<DfaStateId>>> {
        let vocab_len = dfa.vocab.len().max(1);
        let mut incoming = vec![vec![Vec::new(); vocab_len]; dfa.states.len()];
        for (i, state) in dfa.states.iter().enumerate() {
            for (sym, &next) in state.transitions.iter().enumerate() {
                incoming[next as usize][sym].push(i as DfaStateId);
            }
        }
        incoming
    }

    fn initial_partitions(dfa: &CompiledPattern) -> Vec<Vec<DfaStateId>> {
        let mut is_match = Vec::new();
        let mut no_match = Vec::new();
        for (i, state) in dfa.states.iter().enumerate() {
            if state.is_match {
                is_match.push(i as DfaStateId);
            } else {
                no_match.push(i as DfaStateId);
            }
        }
        let mut sets = vec![is_match];
        if !no_match.is_empty() {
            sets.push(no_match);
        }
        sets.sort_by_key(|s| s.len());
        if sets.is_empty() || sets[0].is_empty() {
            // No state accepts anything (an always-dead pattern); keep a
            // single trivial partition so `run` has something to consume.
            sets = vec![(0..dfa.states.len() as DfaStateId).collect()];
        }
        sets
    }

    fn run(mut self) {
        let vocab_len = self.dfa.vocab.len().max(1);
        while let Some(set) = self.waiting.pop() {
            for sym in 0..vocab_len {
                let mut incoming: Vec<DfaStateId> = Vec::new();
                for &id in &set {
                    incoming.extend(self.incoming[id as usize][sym].iter().copied());
                }
                incoming.sort_unstable();
                incoming.dedup();
                if incoming.is_empty() {
                    continue;
                }

                let mut new_partitions = Vec::with_capacity(self.partitions.len());
                for part in &self.partitions {
                    let (x, y): (Vec<DfaStateId>, Vec<DfaStateId>) =
                        part.iter().copied().partition(|id| incoming.binary_search(id).is_ok());
                    if x.is_empty() || y.is_empty() {
                        new_partitions.push(part.clone());
                        continue;
                    }
                    new_partitions.push(x.clone());
                    new_partitions.push(y.clone());
                    match self.waiting.iter().position(|w| w == part) {
                        Some(i) => {
                            self.waiting[i] = x;
                            self.waiting.push(y);
                        }
                        None => {
                            if x.len() <= y.len() {
                                self.waiting.push(x);
                            } else {
                                self.waiting.push(y);
                            }
                        }
                    }
                }
                self.partitions = new_partitions;
            }
        }

        let mut state_to_part = vec![DFA_DEAD; self.dfa.states.len()];
        for part in &self.partitions {
            let rep = part[0];
            for &id in part {
                state_to_part[id as usize] = rep;
            }
        }

        let mut minimal_ids = vec![DFA_DEAD; self.dfa.states.len()];
        let mut new_id = 0;
        for (id, _) in self.dfa.states.iter().enumerate() {
            if state_to_part[id] == id as DfaStateId {
                minimal_ids[id] = new_id;
                new_id += 1;
            }
        }
        let minimal_count = new_id as usize;

        for id in 0..self.dfa.states.len() {
            if state_to_part[id] != id as DfaStateId {
                continue;
            }
            for next in self.dfa.states[id].transitions.iter_mut() {
                *next = minimal_ids[state_to_part[*next as usize] as usize];
            }
            self.dfa.states.swap(id, minimal_ids[id] as usize);
        }
        self.dfa.start = minimal_ids[state_to_part[self.dfa.start as usize] as usize];
        self.dfa.states.truncate(minimal_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_literal() {
        let dfa = CompiledPattern::new("아").unwrap();
        let s: Vec<u16> = vec![0xC544]; // 아
        assert_eq!(dfa.longest_prefix_match(&s), Some(1));
    }

    #[test]
    fn rejects_non_match() {
        let dfa = CompiledPattern::new("아").unwrap();
        let s: Vec<u16> = vec![0xC5B4]; // 어
        assert_eq!(dfa.longest_prefix_match(&s), None);
    }

    #[test]
    fn star_matches_empty_and_repeats() {
        let dfa = CompiledPattern::new("가*").unwrap();
        assert_eq!(dfa.longest_prefix_match(&[]), Some(0));
        let s: Vec<u16> = vec![0xAC00, 0xAC00, 0xAC01];
        assert_eq!(dfa.longest_prefix_match(&s), Some(2));
    }

    #[test]
    fn suffix_match_finds_minimal_start() {
        let dfa = CompiledPattern::new("어$|아$").unwrap();
        let s: Vec<u16> = vec![0xC88B, 0xC544]; // 좋아
        assert_eq!(dfa.longest_suffix_match(&s), Some(1));
    }

    #[test]
    fn alternation_and_class() {
        let dfa = CompiledPattern::new("[가-힣]+").unwrap();
        let s: Vec<u16> = vec![0xAC00, 0xD7A3];
        assert_eq!(dfa.longest_prefix_match(&s), Some(2));
    }
}
