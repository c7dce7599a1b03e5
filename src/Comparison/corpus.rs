//! # Corpus Module
//!
//! ## Aim
//! Holds an indexed collection of documents (patents, one per line of the input file) and
//! drives the comparison of chemical mentions across them.
//!
//! ## Main Data Structures and Logic
//! - `CorpusBuilder` collects documents while loading; `finish()` gives an immutable `Corpus`.
//!   A failed load returns `CorpusError`, there is no half-loaded corpus
//! - `ComparedPairSet`: unordered document pairs already compared, stored as `(min, max)`
//! - `PairwiseAnalysis`: one analysis run. Owns the compared pairs, the cluster builder shared
//!   by all pairs and a cache of resolved mentions per document
//! - `Corpus::analyze_all_pairs()`: every unordered pair of documents with different texts is
//!   compared once, clusters of all pairs accumulate in one collection
//! - `Corpus::find_documents_matching()`: indices of documents mentioning a substance similar
//!   to the query formula
//!
//! Resolver failures are logged and treated as documents without mentions.
use super::clustering::{ClusterBuilder, ClusterCollection, cluster_into};
use super::resolver::{MentionResolver, ResolvedMention};
use super::similarity::{exceeds_threshold, score};
use crate::Utils::load_from_file::{load_corpus_lines, split_documents};
use crate::settings::AnalysisSettings;
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("cannot read corpus file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("corpus file '{path}' is not valid UTF-8")]
    Decode { path: String },
    #[error("document {0} is not in the corpus")]
    UnknownDocument(usize),
}

/// Unordered pairs of document indices; {i, j} and {j, i} are the same entry
#[derive(Debug, Clone, Default)]
pub struct ComparedPairSet {
    pairs: HashSet<(usize, usize)>,
}

impl ComparedPairSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(i: usize, j: usize) -> (usize, usize) {
        (i.min(j), i.max(j))
    }

    /// returns false if the pair was already there
    pub fn insert(&mut self, i: usize, j: usize) -> bool {
        self.pairs.insert(Self::key(i, j))
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        self.pairs.contains(&Self::key(i, j))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Corpus under construction
#[derive(Debug, Clone, Default)]
pub struct CorpusBuilder {
    documents: Vec<String>,
}

impl CorpusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// appends a document, returns its index
    pub fn push_document(&mut self, text: impl Into<String>) -> usize {
        self.documents.push(text.into());
        self.documents.len() - 1
    }

    pub fn finish(self) -> Corpus {
        Corpus {
            documents: self.documents,
        }
    }
}

/// Immutable indexed collection of documents, indices start at 0 in load order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<String>,
}

/// What happened to a pair offered to `PairwiseAnalysis::compare_pair`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    Compared,
    AlreadyCompared,
    /// the two documents have the same text (this includes a document paired with itself)
    IdenticalText,
}

impl Corpus {
    pub fn from_documents<S: Into<String>>(documents: impl IntoIterator<Item = S>) -> Self {
        let mut builder = CorpusBuilder::new();
        for document in documents {
            builder.push_document(document);
        }
        builder.finish()
    }

    pub fn from_text(text: &str) -> Self {
        Self::from_documents(split_documents(text))
    }

    pub fn from_file(file_name: &str) -> Result<Self, CorpusError> {
        let lines = load_corpus_lines(file_name)?;
        Ok(Self::from_documents(lines))
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.documents.get(idx).map(|d| d.as_str())
    }

    pub fn document(&self, idx: usize) -> Result<&str, CorpusError> {
        self.get(idx).ok_or(CorpusError::UnknownDocument(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.documents.iter().map(|d| d.as_str()).enumerate()
    }

    /// Compares all unordered pairs of documents and returns the clusters of similar mentions
    pub fn analyze_all_pairs<R: MentionResolver + ?Sized>(
        &self,
        resolver: &R,
        settings: &AnalysisSettings,
    ) -> ClusterCollection {
        let mut analysis = PairwiseAnalysis::new(self, resolver, settings);
        analysis.run_all();
        analysis.finish()
    }

    /// True when a mention of `formula` is similar to a mention of document `idx`. Pairs
    /// where a mention has no structure are not compared.
    pub fn document_matches<R: MentionResolver + ?Sized>(
        &self,
        formula: &str,
        idx: usize,
        threshold: f64,
        resolver: &R,
    ) -> Result<bool, CorpusError> {
        let text = self.document(idx)?;
        let query = resolve_or_empty(resolver, formula, "query");
        let mentions = resolve_or_empty(resolver, text, &format!("document {}", idx));
        Ok(mentions_match(&query, &mentions, threshold))
    }

    /// Indices of all documents matching `formula`, ascending. The query is resolved once.
    pub fn find_documents_matching<R: MentionResolver + ?Sized>(
        &self,
        formula: &str,
        threshold: f64,
        resolver: &R,
    ) -> Vec<usize> {
        let query = resolve_or_empty(resolver, formula, "query");
        if query.iter().all(|m| m.structure.is_none()) {
            warn!("query '{}' has no resolvable structure", formula);
            return Vec::new();
        }
        let found: Vec<usize> = self
            .iter()
            .filter(|(idx, text)| {
                let mentions = resolve_or_empty(resolver, text, &format!("document {}", idx));
                mentions_match(&query, &mentions, threshold)
            })
            .map(|(idx, _)| idx)
            .collect();
        info!(
            "formula '{}' matched {} of {} documents",
            formula,
            found.len(),
            self.len()
        );
        found
    }
}

fn resolve_or_empty<R: MentionResolver + ?Sized>(
    resolver: &R,
    text: &str,
    what: &str,
) -> Vec<ResolvedMention> {
    match resolver.resolve(text) {
        Ok(mentions) => mentions,
        Err(e) => {
            warn!("resolver failed on {}: {}", what, e);
            Vec::new()
        }
    }
}

// first pair above the threshold decides
fn mentions_match(query: &[ResolvedMention], mentions: &[ResolvedMention], threshold: f64) -> bool {
    query.iter().any(|first| {
        mentions.iter().any(|second| match (&first.structure, &second.structure) {
            (Some(a), Some(b)) => exceeds_threshold(score(a, b), threshold),
            _ => false,
        })
    })
}

/// One run over a corpus: compared pairs, accumulated clusters, resolved mentions
pub struct PairwiseAnalysis<'a, R: MentionResolver + ?Sized> {
    corpus: &'a Corpus,
    resolver: &'a R,
    settings: &'a AnalysisSettings,
    compared: ComparedPairSet,
    clusters: ClusterBuilder,
    mentions: HashMap<usize, Vec<ResolvedMention>>,
}

impl<'a, R: MentionResolver + ?Sized> PairwiseAnalysis<'a, R> {
    pub fn new(corpus: &'a Corpus, resolver: &'a R, settings: &'a AnalysisSettings) -> Self {
        Self {
            corpus,
            resolver,
            settings,
            compared: ComparedPairSet::new(),
            clusters: ClusterBuilder::new(),
            mentions: HashMap::new(),
        }
    }

    pub fn compared_pairs(&self) -> &ComparedPairSet {
        &self.compared
    }

    fn ensure_resolved(&mut self, idx: usize, text: &str) {
        if !self.mentions.contains_key(&idx) {
            let mentions = resolve_or_empty(self.resolver, text, &format!("document {}", idx));
            debug!("document {} has {} mentions", idx, mentions.len());
            self.mentions.insert(idx, mentions);
        }
    }

    /// Compares documents `i` and `j` unless the pair was already compared or their texts
    /// are equal. Mentions of `i` are the first side of every mention pair.
    pub fn compare_pair(&mut self, i: usize, j: usize) -> Result<PairOutcome, CorpusError> {
        let corpus = self.corpus;
        let text_i = corpus.document(i)?;
        let text_j = corpus.document(j)?;
        if self.compared.contains(i, j) {
            return Ok(PairOutcome::AlreadyCompared);
        }
        if text_i == text_j {
            debug!("documents {} and {} have the same text, skipped", i, j);
            return Ok(PairOutcome::IdenticalText);
        }
        self.ensure_resolved(i, text_i);
        self.ensure_resolved(j, text_j);
        let empty = Vec::new();
        let mentions_i = self.mentions.get(&i).unwrap_or(&empty);
        let mentions_j = self.mentions.get(&j).unwrap_or(&empty);
        cluster_into(
            &mut self.clusters,
            mentions_i,
            mentions_j,
            self.settings.similarity_threshold,
            self.settings.missing_structure,
        );
        self.compared.insert(i, j);
        debug!("documents {} and {} compared", i, j);
        Ok(PairOutcome::Compared)
    }

    /// Visits every unordered pair of the corpus once
    pub fn run_all(&mut self) {
        let n = self.corpus.len();
        let mut compared = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                // indices come from the corpus itself
                if let Ok(PairOutcome::Compared) = self.compare_pair(i, j) {
                    compared += 1;
                }
            }
        }
        info!(
            "compared {} document pairs of {} documents",
            compared, n
        );
    }

    pub fn snapshot(&mut self) -> ClusterCollection {
        self.clusters.snapshot()
    }

    pub fn finish(self) -> ClusterCollection {
        self.clusters.finish()
    }
}
