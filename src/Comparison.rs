/// eng
/// Extraction of the brutto formula from a canonical structure identifier (InChI-like string)
/// and its decomposition into the string of element letters and the list of atom counts.
///
/// # Examples
/// ```
/// use bruttosim::Comparison::brutto_parser::extract_formula;
/// let glucose = "InChI=1S/C6H12O6/c7-1-2-3(9)-4(10)-5(11)-6(12)-8/h1,3-6,8-12H,2H2";
/// let formula = extract_formula(glucose).unwrap();
/// assert_eq!(formula.elements, "CHO");
/// assert_eq!(formula.counts, vec![6, 12, 6]);
/// ```
pub mod brutto_parser;
/// Similarity coefficient of two substances computed from their brutto formulae
///
/// # Examples
/// ```
/// use bruttosim::Comparison::brutto_parser::CanonicalStructure;
/// use bruttosim::Comparison::similarity::score;
/// let a = CanonicalStructure::from("InChI=1S/C6H12O6/c1");
/// let b = CanonicalStructure::from("InChI=1S/C6H12O7/c1");
/// let coeff = score(&a, &b);
/// assert!((coeff - 0.9444).abs() < 1e-4);
/// ```
pub mod similarity;
/// Chemical mentions in text: the resolver trait and the formula/dictionary backends
pub mod resolver;
/// Clusters of similar mentions found across two documents
///
/// # Examples
/// ```
/// use bruttosim::Comparison::clustering::{cluster_across_documents, MissingStructurePolicy};
/// use bruttosim::Comparison::resolver::ResolvedMention;
/// let doc_a = vec![ResolvedMention::new("glucose", Some("InChI=1S/C6H12O6/c1"))];
/// let doc_b = vec![ResolvedMention::new("dextrose", Some("InChI=1S/C6H12O6/c1"))];
/// let clusters = cluster_across_documents(&doc_a, &doc_b, 0.7, MissingStructurePolicy::Skip);
/// assert_eq!(clusters.len(), 1);
/// ```
pub mod clustering;
/// Document corpus: all-pairs clustering and formula search
///
/// # Examples
/// ```
/// use bruttosim::Comparison::corpus::Corpus;
/// use bruttosim::Comparison::resolver::FormulaResolver;
/// use bruttosim::settings::AnalysisSettings;
/// let corpus = Corpus::from_text("glucose C6H12O6 syrup\nwater H2O and C6H12O6\nsalt NaCl");
/// let resolver = FormulaResolver::new();
/// let clusters = corpus.analyze_all_pairs(&resolver, &AnalysisSettings::default());
/// assert_eq!(clusters.len(), 1);
/// let found = corpus.find_documents_matching("C6H12O7", 0.7, &resolver);
/// assert_eq!(found, vec![0, 1]);
/// ```
pub mod corpus;
