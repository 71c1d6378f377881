//! Aho-Corasick trie over jamo code units, with failure links.
//!
//! Adapted from `KiwiLibrary/Trie.hpp`'s `Trie<Key, Value>` template. The
//! original stores each node's `next`/`fail` as pointer offsets into a flat
//! arena (`(Trie*)this + next[i]`); we keep the same flat-arena idea but
//! address nodes by plain `u32` index into a `Vec`, which is the ordinary
//! Rust way to build a graph of nodes that must reference each other.

use std::collections::HashMap;

type NodeId = u32;
const ROOT: NodeId = 0;

#[derive(Debug)]
struct Node<V> {
    children: HashMap<u16, NodeId>,
    fail: NodeId,
    value: Option<V>,
    /// Set during `fill_fail` when some node reachable via this node's
    /// fail chain carries a value, mirroring the original's `val = -1`
    /// sentinel used to short-circuit "does any suffix of me match".
    has_suffix_match: bool,
}

impl<V> Node<V> {
    fn empty() -> Node<V> {
        Node { children: HashMap::new(), fail: ROOT, value: None, has_suffix_match: false }
    }
}

/// A multi-pattern matcher over `u16` jamo code units: insert any number of
/// keyed patterns, call [`AhoCorasick::fill_fail`] once after the last
/// insert, then scan haystacks for every pattern ending at each position.
#[derive(Debug)]
pub struct AhoCorasick<V> {
    nodes: Vec<Node<V>>,
    built: bool,
}

impl<V> Default for AhoCorasick<V> {
    fn default() -> Self {
        AhoCorasick::new()
    }
}

impl<V> AhoCorasick<V> {
    /// An empty trie containing only the root.
    pub fn new() -> AhoCorasick<V> {
        AhoCorasick { nodes: vec![Node::empty()], built: false }
    }

    /// Insert `key` with `value`. Must be called before [`Self::fill_fail`];
    /// inserting after it would leave fail links stale.
    pub fn insert(&mut self, key: &[u16], value: V) {
        assert!(!self.built, "cannot insert into an AhoCorasick trie after fill_fail");
        let mut cur = ROOT;
        for &unit in key {
            cur = match self.nodes[cur as usize].children.get(&unit) {
                Some(&next) => next,
                None => {
                    let id = self.nodes.len() as NodeId;
                    self.nodes.push(Node::empty());
                    self.nodes[cur as usize].children.insert(unit, id);
                    id
                }
            };
        }
        self.nodes[cur as usize].value = Some(value);
    }

    /// Compute failure links by BFS over the trie, per `Trie::fillFail`.
    pub fn fill_fail(&mut self) {
        let mut queue: std::collections::VecDeque<NodeId> = std::collections::VecDeque::new();
        queue.push_back(ROOT);
        while let Some(parent) = queue.pop_front() {
            let edges: Vec<(u16, NodeId)> =
                self.nodes[parent as usize].children.iter().map(|(&k, &v)| (k, v)).collect();
            for (unit, child) in edges {
                let fail = if parent == ROOT { ROOT } else { self.find_fail(parent, unit) };
                self.nodes[child as usize].fail = fail;
                self.nodes[child as usize].has_suffix_match =
                    self.nodes[fail as usize].value.is_some()
                        || self.nodes[fail as usize].has_suffix_match;
                queue.push_back(child);
            }
        }
        self.built = true;
    }

    fn find_fail(&self, node: NodeId, unit: u16) -> NodeId {
        let mut n = node;
        loop {
            if n == ROOT {
                return self.nodes[ROOT as usize].children.get(&unit).copied().unwrap_or(ROOT);
            }
            let fail = self.nodes[n as usize].fail;
            if let Some(&next) = self.nodes[fail as usize].children.get(&unit) {
                return next;
            }
            n = fail;
        }
    }

    /// The longest prefix of `haystack` that is a registered key, per
    /// `Trie::findMaximumMatch`.
    pub fn longest_prefix_match(&self, haystack: &[u16]) -> Option<(&V, usize)> {
        let mut cur = ROOT;
        let mut best: Option<(&V, usize)> = self.nodes[ROOT as usize].value.as_ref().map(|v| (v, 0));
        for (i, &unit) in haystack.iter().enumerate() {
            match self.nodes[cur as usize].children.get(&unit) {
                Some(&next) => {
                    cur = next;
                    if let Some(v) = self.nodes[cur as usize].value.as_ref() {
                        best = Some((v, i + 1));
                    }
                }
                None => break,
            }
        }
        best
    }

    /// Scan `haystack` left to right, reporting every registered pattern
    /// that ends at each position (standard Aho-Corasick multi-match).
    pub fn scan(&self, haystack: &[u16]) -> Vec<(usize, &V)> {
        assert!(self.built, "call fill_fail before scan");
        let mut out = Vec::new();
        let mut cur = ROOT;
        for (i, &unit) in haystack.iter().enumerate() {
            loop {
                if let Some(&next) = self.nodes[cur as usize].children.get(&unit) {
                    cur = next;
                    break;
                }
                if cur == ROOT {
                    break;
                }
                cur = self.nodes[cur as usize].fail;
            }
            let mut n = cur;
            loop {
                if let Some(v) = self.nodes[n as usize].value.as_ref() {
                    out.push((i + 1, v));
                }
                if n == ROOT || !self.nodes[n as usize].has_suffix_match {
                    break;
                }
                n = self.nodes[n as usize].fail;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(s: &str) -> Vec<u16> {
        s.encode_utf16().collect()
    }

    #[test]
    fn longest_prefix_picks_longest_registered_key() {
        let mut t = AhoCorasick::new();
        t.insert(&units("가"), 1u32);
        t.insert(&units("가나"), 2u32);
        t.fill_fail();
        let (v, len) = t.longest_prefix_match(&units("가나다")).unwrap();
        assert_eq!(*v, 2);
        assert_eq!(len, 2);
    }

    #[test]
    fn scan_reports_overlapping_matches() {
        let mut t = AhoCorasick::new();
        t.insert(&units("he"), "he");
        t.insert(&units("she"), "she");
        t.insert(&units("his"), "his");
        t.insert(&units("hers"), "hers");
        t.fill_fail();
        let hay = units("ushers");
        let mut hits: Vec<(usize, &str)> = t.scan(&hay);
        hits.sort();
        assert!(hits.contains(&(3, "she")));
        assert!(hits.contains(&(3, "he")));
        assert!(hits.contains(&(6, "hers")));
    }

    #[test]
    fn no_match_returns_empty() {
        let mut t: AhoCorasick<u8> = AhoCorasick::new();
        t.insert(&units("abc"), 1);
        t.fill_fail();
        assert!(t.scan(&units("xyz")).is_empty());
    }
}
