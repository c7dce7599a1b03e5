//! # Mention Clustering Module
//!
//! ## Aim
//! Groups the surface strings of chemical mentions from two documents into clusters of
//! similar substances. Every mention of the first document is compared with every mention
//! of the second one; pairs with a similarity coefficient above the threshold are joined.
//!
//! ## Main Data Structures and Logic
//! - `ClusterBuilder`: disjoint-set forest keyed by surface string (path compression, union
//!   by rank). Two surfaces that are already clustered apart get their clusters merged.
//!   Clusters are numbered in the order they were created, a merged cluster keeps the
//!   smaller number
//! - `ClusterCollection`: immutable snapshot of the builder, clusters in creation order,
//!   members sorted
//! - `MissingStructurePolicy`: what to do with a pair where a mention has no structure.
//!   `Skip` ignores the pair, `ReuseLast` applies the coefficient of the previous pair of the
//!   same call (0.0 at the start of the call)
use super::brutto_parser::CanonicalStructure;
use super::resolver::ResolvedMention;
use super::similarity::{exceeds_threshold, score};
use log::debug;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingStructurePolicy {
    /// pairs with a mention lacking a structure are not compared
    #[default]
    Skip,
    /// the coefficient of the previous pair is applied to the pair
    ReuseLast,
}

/// Set of surface strings considered mutually similar
pub type SimilarityCluster = BTreeSet<String>;

/// Clusters in order of discovery
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClusterCollection {
    pub clusters: Vec<SimilarityCluster>,
}

impl ClusterCollection {
    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SimilarityCluster> {
        self.clusters.iter()
    }

    /// index of the cluster containing the surface
    pub fn position(&self, surface: &str) -> Option<usize> {
        self.clusters
            .iter()
            .position(|cluster| cluster.contains(surface))
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.add_row(Row::new(vec![
            Cell::new("cluster"),
            Cell::new("size"),
            Cell::new("mentions"),
        ]));
        for (i, cluster) in self.clusters.iter().enumerate() {
            let members = cluster.iter().cloned().collect::<Vec<_>>().join(", ");
            table.add_row(Row::new(vec![
                Cell::new(&i.to_string()),
                Cell::new(&cluster.len().to_string()),
                Cell::new(&members),
            ]));
        }
        table
    }

    pub fn pretty_print(&self) {
        if self.clusters.is_empty() {
            println!("no similar substances found");
            return;
        }
        self.to_table().printstd();
    }
}

/// Growing set of clusters, disjoint-set forest over surface strings
#[derive(Debug, Clone, Default)]
pub struct ClusterBuilder {
    index_of: HashMap<String, usize>,
    surfaces: Vec<String>,
    parent: Vec<usize>,
    rank: Vec<u8>,
    // creation number of the cluster, meaningful for roots only
    birth: Vec<usize>,
    clusters_created: usize,
}

impl ClusterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }

    fn find(&mut self, mut node: usize) -> usize {
        let mut root = node;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn add_node(&mut self, surface: &str, birth: usize) -> usize {
        let node = self.surfaces.len();
        self.surfaces.push(surface.to_string());
        self.parent.push(node);
        self.rank.push(0);
        self.birth.push(birth);
        self.index_of.insert(surface.to_string(), node);
        node
    }

    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return;
        }
        let birth = self.birth[root_a].min(self.birth[root_b]);
        let root = match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => {
                self.parent[root_a] = root_b;
                root_b
            }
            std::cmp::Ordering::Greater => {
                self.parent[root_b] = root_a;
                root_a
            }
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
                root_a
            }
        };
        self.birth[root] = birth;
    }

    /// cluster number of the surface, None if it has not been clustered yet
    pub fn cluster_of(&mut self, surface: &str) -> Option<usize> {
        let node = *self.index_of.get(surface)?;
        let root = self.find(node);
        Some(self.birth[root])
    }

    /// Records that two surfaces are similar: a new cluster when neither is known, the
    /// unknown one joins the cluster of the other, or the two clusters are merged
    pub fn join(&mut self, first: &str, second: &str) {
        let known_first = self.index_of.get(first).copied();
        let known_second = self.index_of.get(second).copied();
        match (known_first, known_second) {
            (None, None) => {
                let birth = self.clusters_created;
                self.clusters_created += 1;
                let a = self.add_node(first, birth);
                if first != second {
                    let b = self.add_node(second, birth);
                    self.union(a, b);
                }
                debug!("new cluster {} for '{}' and '{}'", birth, first, second);
            }
            (Some(a), None) => {
                let b = self.add_node(second, usize::MAX);
                self.union(a, b);
                debug!("'{}' joins the cluster of '{}'", second, first);
            }
            (None, Some(b)) => {
                let a = self.add_node(first, usize::MAX);
                self.union(a, b);
                debug!("'{}' joins the cluster of '{}'", first, second);
            }
            (Some(a), Some(b)) => {
                if self.find(a) != self.find(b) {
                    debug!("merging clusters of '{}' and '{}'", first, second);
                }
                self.union(a, b);
            }
        }
    }

    pub fn snapshot(&mut self) -> ClusterCollection {
        let mut by_birth: HashMap<usize, SimilarityCluster> = HashMap::new();
        for node in 0..self.surfaces.len() {
            let root = self.find(node);
            by_birth
                .entry(self.birth[root])
                .or_default()
                .insert(self.surfaces[node].clone());
        }
        let mut births: Vec<usize> = by_birth.keys().copied().collect();
        births.sort_unstable();
        let clusters = births
            .into_iter()
            .filter_map(|birth| by_birth.remove(&birth))
            .collect();
        ClusterCollection { clusters }
    }

    pub fn finish(mut self) -> ClusterCollection {
        self.snapshot()
    }
}

fn structures<'m>(
    first: &'m ResolvedMention,
    second: &'m ResolvedMention,
) -> Option<(&'m CanonicalStructure, &'m CanonicalStructure)> {
    first.structure.as_ref().zip(second.structure.as_ref())
}

/// Compares every mention of the first document with every mention of the second one and
/// joins the similar ones in `builder`
pub fn cluster_into(
    builder: &mut ClusterBuilder,
    mentions_a: &[ResolvedMention],
    mentions_b: &[ResolvedMention],
    threshold: f64,
    policy: MissingStructurePolicy,
) {
    let mut coeff = 0.0;
    for first in mentions_a {
        for second in mentions_b {
            match (structures(first, second), policy) {
                (Some((a, b)), _) => coeff = score(a, b),
                (None, MissingStructurePolicy::Skip) => continue,
                (None, MissingStructurePolicy::ReuseLast) => {}
            }
            if exceeds_threshold(coeff, threshold) {
                builder.join(&first.surface, &second.surface);
            }
        }
    }
}

/// Clusters the mentions of a single pair of documents
pub fn cluster_across_documents(
    mentions_a: &[ResolvedMention],
    mentions_b: &[ResolvedMention],
    threshold: f64,
    policy: MissingStructurePolicy,
) -> ClusterCollection {
    let mut builder = ClusterBuilder::new();
    cluster_into(&mut builder, mentions_a, mentions_b, threshold, policy);
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Comparison::similarity::DEFAULT_THRESHOLD;

    fn mention(surface: &str, formula: Option<&str>) -> ResolvedMention {
        ResolvedMention {
            surface: surface.to_string(),
            structure: formula.map(|f| CanonicalStructure::new(format!("InChI=1S/{}/c1", f))),
        }
    }

    fn cluster(members: &[&str]) -> SimilarityCluster {
        members.iter().map(|m| m.to_string()).collect()
    }

    #[test]
    fn test_similar_pair_creates_cluster() {
        let doc_a = vec![mention("glucose", Some("C6H12O6")), mention("water", Some("H2O"))];
        let doc_b = vec![mention("dextrose", Some("C6H12O6")), mention("ammonia", Some("NH3"))];
        let clusters =
            cluster_across_documents(&doc_a, &doc_b, DEFAULT_THRESHOLD, MissingStructurePolicy::Skip);
        assert_eq!(clusters.clusters, vec![cluster(&["glucose", "dextrose"])]);
        assert_eq!(clusters.position("dextrose"), Some(0));
        assert_eq!(clusters.position("water"), None);
    }

    #[test]
    fn test_third_member_joins_existing_cluster() {
        let doc_a = vec![mention("glucose", Some("C6H12O6"))];
        let doc_b = vec![
            mention("dextrose", Some("C6H12O6")),
            mention("gluconic lactone", Some("C6H12O7")),
        ];
        let clusters =
            cluster_across_documents(&doc_a, &doc_b, DEFAULT_THRESHOLD, MissingStructurePolicy::Skip);
        assert_eq!(
            clusters.clusters,
            vec![cluster(&["glucose", "dextrose", "gluconic lactone"])]
        );
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // C1 vs C3: 1/(0.2*2+1) = 0.714..., passes 0.7 but not 0.72
        let doc_a = vec![mention("a", Some("C1"))];
        let doc_b = vec![mention("b", Some("C3"))];
        let passed = cluster_across_documents(&doc_a, &doc_b, 0.7, MissingStructurePolicy::Skip);
        assert_eq!(passed.len(), 1);
        let blocked = cluster_across_documents(&doc_a, &doc_b, 0.72, MissingStructurePolicy::Skip);
        assert!(blocked.is_empty());
        // identical formulas score exactly 1.0, a threshold of 1.0 blocks them
        let doc_c = vec![mention("c", Some("C1"))];
        let exact = cluster_across_documents(&doc_a, &doc_c, 1.0, MissingStructurePolicy::Skip);
        assert!(exact.is_empty());
    }

    #[test]
    fn test_missing_structure_skip() {
        let doc_a = vec![mention("glucose", Some("C6H12O6")), mention("sugar", None)];
        let doc_b = vec![mention("dextrose", Some("C6H12O6"))];
        let clusters =
            cluster_across_documents(&doc_a, &doc_b, DEFAULT_THRESHOLD, MissingStructurePolicy::Skip);
        assert_eq!(clusters.clusters, vec![cluster(&["glucose", "dextrose"])]);
    }

    #[test]
    fn test_missing_structure_reuse_last() {
        // the pair (sugar, dextrose) inherits the 1.0 of (glucose, dextrose)
        let doc_a = vec![mention("glucose", Some("C6H12O6")), mention("sugar", None)];
        let doc_b = vec![mention("dextrose", Some("C6H12O6"))];
        let clusters = cluster_across_documents(
            &doc_a,
            &doc_b,
            DEFAULT_THRESHOLD,
            MissingStructurePolicy::ReuseLast,
        );
        assert_eq!(
            clusters.clusters,
            vec![cluster(&["glucose", "dextrose", "sugar"])]
        );

        // the coefficient starts at zero for every call
        let lone = cluster_across_documents(
            &[mention("sugar", None)],
            &doc_b,
            DEFAULT_THRESHOLD,
            MissingStructurePolicy::ReuseLast,
        );
        assert!(lone.is_empty());
    }

    #[test]
    fn test_clusters_merge_when_both_known() {
        let mut builder = ClusterBuilder::new();
        builder.join("a", "b");
        builder.join("c", "d");
        builder.join("e", "f");
        assert_ne!(builder.cluster_of("b"), builder.cluster_of("d"));
        builder.join("d", "b");
        assert_eq!(builder.cluster_of("b"), builder.cluster_of("d"));
        assert_eq!(builder.cluster_of("x"), None);
        let clusters = builder.finish();
        assert_eq!(
            clusters.clusters,
            vec![cluster(&["a", "b", "c", "d"]), cluster(&["e", "f"])]
        );
    }

    #[test]
    fn test_same_surface_in_both_documents() {
        let doc = vec![mention("water", Some("H2O"))];
        let clusters =
            cluster_across_documents(&doc, &doc, DEFAULT_THRESHOLD, MissingStructurePolicy::Skip);
        assert_eq!(clusters.clusters, vec![cluster(&["water"])]);
    }

    #[test]
    fn test_builder_accumulates_across_calls() {
        let mut builder = ClusterBuilder::new();
        let doc_a = vec![mention("glucose", Some("C6H12O6"))];
        let doc_b = vec![mention("dextrose", Some("C6H12O6"))];
        let doc_c = vec![mention("ethanol", Some("C2H6O")), mention("grape sugar", Some("C6H12O6"))];
        let doc_d = vec![mention("alcohol", Some("C2H6O"))];
        cluster_into(&mut builder, &doc_a, &doc_b, 0.7, MissingStructurePolicy::Skip);
        cluster_into(&mut builder, &doc_c, &doc_d, 0.7, MissingStructurePolicy::Skip);
        cluster_into(&mut builder, &doc_b, &doc_c, 0.7, MissingStructurePolicy::Skip);
        let clusters = builder.snapshot();
        assert_eq!(
            clusters.clusters,
            vec![
                cluster(&["glucose", "dextrose", "grape sugar"]),
                cluster(&["ethanol", "alcohol"])
            ]
        );
        assert_eq!(clusters.to_table().len(), 3);
    }

    #[test]
    fn test_empty_inputs() {
        let clusters = cluster_across_documents(&[], &[], 0.7, MissingStructurePolicy::ReuseLast);
        assert!(clusters.is_empty());
    }
}
