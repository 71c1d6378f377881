//! Orchestrator (§4.11): `KiwiBuilder` accumulates dictionary, combining-rule
//! and typo state, then freezes it into an immutable `Kiwi` at `build()`,
//! mirroring the teacher's `ArgMatches -> *Table` builder-then-freeze split
//! generalized to this crate's `KiwiBuilder -> Kiwi` (§6 "Builder surface").

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use kiwi_automata::CombiningRules;
use kiwi_dict::{parse_dict_file, parse_rule_file, Dictionary, MorphemeEntry, MorphemeId, PosTag};

use crate::config::{BuildOptions, Dialects, KiwiConfig};
use crate::error::{KiwiError, Result};
use crate::joiner::AutoJoiner;
use crate::language_model::{LanguageModel, TableLanguageModel};
use crate::lattice::LatticeBuilder;
use crate::pattern_matcher::MatchOptions;
use crate::splitter::{self, SentenceSpan, SplitToken};
use crate::typo::TypoTransformer;
use crate::viterbi::{self, PretokenizedSpan};

/// Coarse script classification of a token's surface, included in the
/// output record (§6) so callers can route Hangul, Latin, digit and symbol
/// spans differently without re-inspecting `tag`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Script {
    /// Korean text (anything dictionary/pattern-tagged as a Korean POS).
    Hangul,
    /// Latin-alphabet runs (`SL`), including recognized URL/email/mention
    /// tokens built on top of one.
    Latin,
    /// Han-character runs (`SH`).
    Hanja,
    /// Numeric runs (`SN`) and serial/time/date patterns.
    Number,
    /// Punctuation and other symbol tags.
    Symbol,
    /// Whitespace.
    Space,
    /// Anything else (unknown-form fallback).
    Other,
}

fn script_of(tag: PosTag) -> Script {
    match tag {
        PosTag::SL | PosTag::W_URL | PosTag::W_EMAIL | PosTag::W_MENTION | PosTag::W_HASHTAG => Script::Latin,
        PosTag::SH => Script::Hanja,
        PosTag::SN | PosTag::W_SERIAL => Script::Number,
        PosTag::SP => Script::Space,
        PosTag::SF | PosTag::SE | PosTag::SS | PosTag::SSO | PosTag::SSC | PosTag::SO | PosTag::SW => {
            Script::Symbol
        }
        PosTag::UNKNOWN | PosTag::W_EMOJI => Script::Other,
        _ => Script::Hangul,
    }
}

/// One analyzed token (§6 "Token output record").
#[derive(Clone, Debug)]
pub struct Token {
    /// Surface text, in the caller's original encoding's character model.
    pub surface_string: String,
    /// Part-of-speech tag (irregular-stem bit included).
    pub tag: kiwi_dict::Tag,
    /// Homograph sense disambiguator.
    pub sense_id: u32,
    /// Start offset, in the caller's original encoding's code units.
    pub position: usize,
    /// Length, same units as `position`.
    pub length: usize,
    /// 0-based index of this token among all tokens in the analysis.
    pub word_position: u32,
    /// 0-based index of the sentence this token falls in.
    pub sent_position: u32,
    /// Quoted-clause nesting depth at this token (§4.10a).
    pub sub_sent_position: u32,
    /// 0-based source line number.
    pub line_number: u32,
    /// This token's contribution to the path's total score.
    pub score: f32,
    /// Cost paid for a typo correction, or 0.0 if none was applied.
    pub typo_cost: f32,
    /// The originally-typed morpheme id, if this token is a typo
    /// correction of something else.
    pub typo_form_id: Option<MorphemeId>,
    /// Index of the other half of a combined-form pair, if any.
    pub paired_token: Option<u32>,
    /// Coarse script classification of `surface_string`.
    pub script: Script,
    /// Which dialect this morpheme belongs to.
    pub dialect: Dialects,
}

/// Accumulates dictionary, rule, and typo state before compiling it into
/// an immutable [`Kiwi`]. Mutable by design; `Kiwi` itself never is.
pub struct KiwiBuilder {
    dict: Dictionary,
    rule_file: kiwi_dict::RuleFile,
    typo: TypoTransformer,
    options: BuildOptions,
    num_workers: usize,
}

impl Default for KiwiBuilder {
    fn default() -> KiwiBuilder {
        KiwiBuilder::new()
    }
}

impl KiwiBuilder {
    /// A builder with nothing loaded yet.
    pub fn new() -> KiwiBuilder {
        KiwiBuilder {
            dict: Dictionary::new(),
            rule_file: kiwi_dict::RuleFile::default(),
            typo: TypoTransformer::new(),
            options: BuildOptions::empty(),
            num_workers: 4,
        }
    }

    /// Set the `build()`-time option flags (§6).
    pub fn with_options(mut self, options: BuildOptions) -> KiwiBuilder {
        self.options = options;
        self
    }

    /// Set the worker-pool size `analyze_async`/`analyze_stream` use.
    pub fn with_worker_count(mut self, n: usize) -> KiwiBuilder {
        self.num_workers = n.max(1);
        self
    }

    /// Register one morpheme directly, without going through a dictionary
    /// file. Returns the new entry's id.
    pub fn add_word(&mut self, form: &str, tag: PosTag, log_prob: f32) -> MorphemeId {
        let entry = MorphemeEntry::plain(kiwi_hangul::normalize_str(form), kiwi_dict::Tag::new(tag), log_prob);
        self.dict.insert(entry)
    }

    /// Load a dictionary source file (§6's dict-line grammar) from disk.
    pub fn load_dictionary_file(&mut self, path: &Path) -> Result<()> {
        let contents = fs::read_to_string(path).map_err(|e| KiwiError::Io { path: path.to_path_buf(), source: e })?;
        let lines = parse_dict_file(&contents, Some(path))?;
        for line in lines {
            self.dict.insert(MorphemeEntry {
                form_jamo: line.form_jamo,
                tag: line.tag,
                sense_id: line.sense_id,
                log_prob: line.log_prob_milli as f32 / 1000.0,
                cond_vowel: kiwi_hangul::CondVowel::None,
                cond_polarity: kiwi_hangul::CondPolarity::None,
                combined_from: None,
                allomorph_group: None,
            });
        }
        Ok(())
    }

    /// Load a combining-rule source file (§6's rule-file grammar) from
    /// disk, appending its sections to whatever is already loaded.
    pub fn load_rule_file(&mut self, path: &Path) -> Result<()> {
        let contents = fs::read_to_string(path).map_err(|e| KiwiError::Io { path: path.to_path_buf(), source: e })?;
        let parsed = parse_rule_file(&contents)?;
        self.rule_file.sections.extend(parsed.sections);
        Ok(())
    }

    /// Merge in a typo-correction rule set (e.g. [`crate::typo::basic_typo_set`]).
    pub fn load_typo_set(&mut self, set: TypoTransformer) {
        self.typo = std::mem::take(&mut self.typo).compose(set);
    }

    /// Freeze accumulated state into an immutable, thread-shareable `Kiwi`.
    pub fn build(self) -> Result<Kiwi<TableLanguageModel>> {
        self.build_with_lm(TableLanguageModel::new(-12.0))
    }

    /// As [`Self::build`], but with a caller-supplied language model
    /// instead of the bundled table-lookup test double.
    pub fn build_with_lm<L: LanguageModel>(self, lm: L) -> Result<Kiwi<L>> {
        log::debug!(
            "building Kiwi: {} morphemes, {} rule sections, {} workers",
            self.dict.entries().len(),
            self.rule_file.sections.len(),
            self.num_workers
        );
        let rules = Arc::new(CombiningRules::compile(&self.rule_file)?);
        let typo = Arc::new(self.typo);
        let dict = Arc::new(self.dict);
        let lattice_builder =
            LatticeBuilder::new(dict.clone(), rules.clone(), Some(typo.clone()), 6, 1.0, -6.0);
        let mut config = KiwiConfig::default();
        config.integrate_allomorph = self.options.contains(BuildOptions::INTEGRATE_ALLOMORPH);
        Ok(Kiwi {
            dict,
            rules,
            typo,
            allomorphs: Arc::new(kiwi_dict::AllomorphTable::new()),
            lattice_builder: Arc::new(lattice_builder),
            lm: Arc::new(lm),
            config,
            pool: Arc::new(Pool::new(self.num_workers)),
        })
    }
}

/// A frozen, immutable analyzer: dictionary, compiled rules, typo table,
/// LM and lattice builder are read-only and freely shared across worker
/// threads without locks (§5 "Shared immutable state").
pub struct Kiwi<L: LanguageModel> {
    dict: Arc<Dictionary>,
    rules: Arc<CombiningRules>,
    typo: Arc<TypoTransformer>,
    allomorphs: Arc<kiwi_dict::AllomorphTable>,
    lattice_builder: Arc<LatticeBuilder>,
    lm: Arc<L>,
    config: KiwiConfig,
    pool: Arc<Pool>,
}

impl<L: LanguageModel> Clone for Kiwi<L> {
    fn clone(&self) -> Kiwi<L> {
        Kiwi {
            dict: self.dict.clone(),
            rules: self.rules.clone(),
            typo: self.typo.clone(),
            allomorphs: self.allomorphs.clone(),
            lattice_builder: self.lattice_builder.clone(),
            lm: self.lm.clone(),
            config: self.config,
            pool: self.pool.clone(),
        }
    }
}

/// One analyzed sentence: its tokens and the path's total cost.
#[derive(Clone, Debug)]
pub struct Analysis {
    /// Tokens covering the whole input, in order.
    pub tokens: Vec<Token>,
    /// Total path cost (lower is better; see [`crate::viterbi::DecodeResult`]).
    pub score: f32,
}

impl<L: LanguageModel + Send + Sync + 'static> Kiwi<L>
where
    L::State: Send,
{
    /// Read-write access to the runtime-settable config (§6 "Config
    /// keys"). Per §5, mutating this while other analyses are in flight is
    /// undefined behavior at the core level; callers must synchronize.
    pub fn config_mut(&mut self) -> &mut KiwiConfig {
        &mut self.config
    }

    /// `analyze(text, top_n, options, pretokenized) -> Vec<Analysis>`
    /// (§4.11). Synchronous, single-threaded, allocates only per-call
    /// scratch state (§5).
    pub fn analyze(
        &self,
        text: &str,
        top_n: usize,
        options: MatchOptions,
        block_list: &HashSet<MorphemeId>,
        pretokenized: &[PretokenizedSpan],
    ) -> Vec<Analysis> {
        let jamo = kiwi_hangul::normalize_str(text);
        let lat = self.lattice_builder.build(&jamo, options);
        log::trace!("lattice built: {} jamo units, {} candidate edges", lat.len, lat.nodes().len());
        let results = viterbi::decode(&lat, &*self.lm, &self.config, top_n.max(1), block_list, pretokenized);

        results
            .into_iter()
            .map(|r| {
                let tokens = self.chunks_to_tokens(&r.steps, text);
                Analysis { tokens, score: r.cost }
            })
            .collect()
    }

    /// `analyze_async(text, …) -> AnalysisFuture<Vec<Analysis>>` (§4.11):
    /// dispatches one job to the owned worker pool and returns a one-shot
    /// completion token, rather than an actual `Future` (§9: hand-rolled
    /// task queue, no async runtime).
    pub fn analyze_async(
        &self,
        text: String,
        top_n: usize,
        options: MatchOptions,
        block_list: HashSet<MorphemeId>,
        pretokenized: Vec<PretokenizedSpan>,
    ) -> AnalysisFuture<Vec<Analysis>> {
        let kiwi = self.clone();
        self.pool.submit(move || kiwi.analyze(&text, top_n, options, &block_list, &pretokenized))
    }

    /// `analyze_stream(source, options, sink)` (§4.11): pulls strings from
    /// `source` and calls `sink` with each result in input order, with at
    /// most `pool size` analyses in flight at once (§5 "Ordering").
    pub fn analyze_stream<I, F>(&self, source: I, top_n: usize, options: MatchOptions, mut sink: F)
    where
        I: IntoIterator<Item = String>,
        F: FnMut(Vec<Analysis>),
    {
        let width = self.pool.worker_count();
        let mut in_flight: std::collections::VecDeque<AnalysisFuture<Vec<Analysis>>> =
            std::collections::VecDeque::with_capacity(width);

        for text in source {
            if in_flight.len() >= width {
                sink(in_flight.pop_front().unwrap().wait());
            }
            in_flight.push_back(self.analyze_async(text, top_n, options, HashSet::new(), Vec::new()));
        }
        while let Some(pending) = in_flight.pop_front() {
            sink(pending.wait());
        }
    }

    /// `split_into_sents(text, options) -> Vec<SentenceSpan>` (§4.11):
    /// analyzes `text` and partitions the best-scoring token stream into
    /// sentence spans, character offsets in `text`'s own encoding.
    pub fn split_into_sents(&self, text: &str, options: MatchOptions) -> Vec<SentenceSpan> {
        let analyses = self.analyze(text, 1, options, &HashSet::new(), &[]);
        let Some(best) = analyses.into_iter().next() else { return Vec::new() };
        let split_tokens: Vec<SplitToken> = best
            .tokens
            .iter()
            .map(|t| SplitToken { tag: t.tag.pos, start: t.position, end: t.position + t.length, surface: t.surface_string.clone() })
            .collect();
        splitter::split_into_sents(&split_tokens).0
    }

    /// `new_joiner(lm_search) -> AutoJoiner` (§4.11). `lm_search = true`
    /// additionally scores candidate joined surfaces with this `Kiwi`'s LM:
    /// a candidate surface is looked up as a whole dictionary form and
    /// scored by its first morpheme's unigram probability, so combining
    /// rules that yield more than one replacement prefer whichever
    /// candidate is actually a known word over an unknown spelling.
    pub fn new_joiner(&self, lm_search: bool) -> AutoJoiner<'_> {
        let scorer: Option<Box<dyn Fn(&[u16]) -> f32>> = if lm_search {
            let dict = self.dict.clone();
            let lm = self.lm.clone();
            Some(Box::new(move |form: &[u16]| match dict.form(form) {
                Some(entry) => match entry.morphemes.first() {
                    Some(&morph_id) => lm.score_next(&lm.initial_state(), morph_id).0,
                    None => f32::NEG_INFINITY,
                },
                None => f32::NEG_INFINITY,
            }))
        } else {
            None
        };
        AutoJoiner::new(&self.rules, &self.allomorphs, scorer)
    }

    fn chunks_to_tokens(&self, chunks: &[crate::lattice::Chunk], original: &str) -> Vec<Token> {
        let offsets = jamo_byte_offsets(original);
        let lines = line_numbers(original);
        let mut tokens = Vec::with_capacity(chunks.len());
        let mut word_position = 0u32;
        for chunk in chunks {
            let start = offsets.get(chunk.begin).copied().unwrap_or(original.len());
            let end = offsets.get(chunk.end).copied().unwrap_or(original.len());
            let surface = original.get(start..end).unwrap_or("").to_string();
            let entry = self.dict.entry(chunk.morpheme);
            tokens.push(Token {
                surface_string: surface,
                tag: chunk.tag,
                sense_id: entry.map(|e| e.sense_id).unwrap_or(0),
                position: start,
                length: end.saturating_sub(start),
                word_position,
                sent_position: 0,
                sub_sent_position: 0,
                line_number: lines.get(start).copied().unwrap_or(0),
                score: entry.map(|e| e.log_prob).unwrap_or(0.0),
                typo_cost: 0.0,
                typo_form_id: None,
                paired_token: None,
                script: script_of(chunk.tag.pos),
                dialect: Dialects::STANDARD,
            });
            word_position += 1;
        }

        let split_tokens: Vec<SplitToken> = tokens
            .iter()
            .map(|t| SplitToken {
                tag: t.tag.pos,
                start: t.position,
                end: t.position + t.length,
                surface: t.surface_string.clone(),
            })
            .collect();
        let (spans, depths) = splitter::split_into_sents(&split_tokens);

        let mut span_idx = 0usize;
        for (tok, depth) in tokens.iter_mut().zip(depths) {
            while span_idx + 1 < spans.len() && tok.position >= spans[span_idx].end {
                span_idx += 1;
            }
            tok.sent_position = span_idx as u32;
            tok.sub_sent_position = depth;
        }

        tokens
    }
}

/// Maps each jamo-unit index `normalize_str(original)` would produce back to
/// the byte offset in `original` that produced it, plus one trailing
/// sentinel entry equal to `original.len()`. Mirrors
/// `kiwi_hangul::normalize`'s own per-code-unit expansion exactly, since no
/// public API in that crate returns the mapping directly.
fn jamo_byte_offsets(original: &str) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut buf = [0u16; 2];
    for (byte_pos, ch) in original.char_indices() {
        for &unit in ch.encode_utf16(&mut buf).iter() {
            match kiwi_hangul::decompose(unit as u32) {
                Some((_, _, coda)) => {
                    offsets.push(byte_pos);
                    offsets.push(byte_pos);
                    if coda.is_some() {
                        offsets.push(byte_pos);
                    }
                }
                None => offsets.push(byte_pos),
            }
        }
    }
    offsets.push(original.len());
    offsets
}

/// Maps each byte offset in `original` to its 0-based line number, plus one
/// trailing sentinel entry for `original.len()`. Mirrors `jamo_byte_offsets`'s
/// single-pass, precomputed-table style.
fn line_numbers(original: &str) -> Vec<u32> {
    let mut lines = Vec::with_capacity(original.len() + 1);
    let mut line = 0u32;
    for b in original.bytes() {
        lines.push(line);
        if b == b'\n' {
            line += 1;
        }
    }
    lines.push(line);
    lines
}

/// A one-shot completion token for [`Kiwi::analyze_async`] (§5: "a simple
/// future-like completion token", deliberately not an actual `Future`).
pub struct AnalysisFuture<T> {
    rx: mpsc::Receiver<T>,
}

impl<T> AnalysisFuture<T> {
    /// Block until the job completes and return its result.
    pub fn wait(self) -> T {
        self.rx.recv().expect("worker thread panicked before sending a result")
    }
}

/// A fixed-size worker-thread pool (§5, §9): a task queue plus worker
/// threads and one-shot result channels, no green threads or async runtime.
struct Pool {
    tx: mpsc::Sender<Box<dyn FnOnce() + Send>>,
    workers: Vec<thread::JoinHandle<()>>,
    size: usize,
}

impl Pool {
    fn new(size: usize) -> Pool {
        let (tx, rx) = mpsc::channel::<Box<dyn FnOnce() + Send>>();
        let rx = Arc::new(std::sync::Mutex::new(rx));
        let mut workers = Vec::with_capacity(size);
        for _ in 0..size {
            let rx = rx.clone();
            workers.push(thread::spawn(move || loop {
                let job = { rx.lock().unwrap().recv() };
                match job {
                    Ok(job) => job(),
                    Err(_) => break,
                }
            }));
        }
        Pool { tx, workers, size }
    }

    fn worker_count(&self) -> usize {
        self.size
    }

    fn submit<T, F>(&self, job: F) -> AnalysisFuture<T>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let (result_tx, result_rx) = mpsc::channel();
        let boxed: Box<dyn FnOnce() + Send> = Box::new(move || {
            let _ = result_tx.send(job());
        });
        self.tx.send(boxed).expect("worker pool shut down while a job was submitted");
        AnalysisFuture { rx: result_rx }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        let (dead_tx, _) = mpsc::channel();
        let _ = std::mem::replace(&mut self.tx, dead_tx);
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_then_analyze_covers_whole_input() {
        let mut builder = KiwiBuilder::new();
        builder.add_word("나무", PosTag::NNG, -1.0);
        let kiwi = builder.build().unwrap();
        let analyses = kiwi.analyze("나무", 3, MatchOptions::all(), &HashSet::new(), &[]);
        assert!(!analyses.is_empty());
        let total: usize = analyses[0].tokens.iter().map(|t| t.length).sum();
        assert_eq!(total, "나무".len());
    }

    #[test]
    fn analyze_async_roundtrips_through_the_pool() {
        let mut builder = KiwiBuilder::new();
        builder.add_word("봄", PosTag::NNG, -1.0);
        let kiwi = builder.build().unwrap();
        let handle = kiwi.analyze_async("봄".to_string(), 1, MatchOptions::all(), HashSet::new(), Vec::new());
        let analyses = handle.wait();
        assert!(!analyses.is_empty());
    }

    #[test]
    fn analyze_stream_preserves_input_order() {
        let mut builder = KiwiBuilder::new();
        builder.add_word("해", PosTag::NNG, -1.0);
        builder.add_word("달", PosTag::NNG, -1.0);
        let kiwi = builder.with_worker_count(2).build().unwrap();
        let inputs = vec!["해".to_string(), "달".to_string(), "해".to_string()];
        let mut outputs = Vec::new();
        kiwi.analyze_stream(inputs, 1, MatchOptions::all(), |a| {
            outputs.push(a[0].tokens[0].surface_string.clone());
        });
        assert_eq!(outputs, vec!["해", "달", "해"]);
    }
}
