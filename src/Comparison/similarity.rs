//! # Formula Similarity Module
//!
//! ## Aim
//! Computes the similarity coefficient of two substances from their brutto formulae.
//!
//! ## Logic
//! - formulas with different element strings (composition or order) are not similar: 0.0
//! - atom count lists are right-padded with zeros to the same length n
//! - two element-only formulas with equal elements are identical: 1.0
//! - every position contributes 1.0 for equal counts and 1/(0.2*|Δ| + 1) otherwise
//! - the coefficient is 2*crossing/(n + n), Sørensen-like but softened so that close counts
//!   score better than distant ones
//!
//! The coefficient lies in [0, 1] and equals 1.0 only when all counts coincide.
use super::brutto_parser::{CanonicalStructure, DecomposedFormula, extract_formula};
use log::{debug, warn};

/// decay of the per-position contribution with the count difference
pub const COUNT_DECAY: f64 = 0.2;
/// default value of "similar enough" for clustering and formula search
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Threshold check used everywhere: strictly greater, a coefficient equal to the threshold
/// does not count as similar
pub fn exceeds_threshold(coeff: f64, threshold: f64) -> bool {
    coeff > threshold
}

/// Contribution of one position of the count lists
pub fn position_contribution(count_a: u64, count_b: u64) -> f64 {
    if count_a == count_b {
        1.0
    } else {
        let delta = count_a.abs_diff(count_b) as f64;
        1.0 / (COUNT_DECAY * delta + 1.0)
    }
}

fn padded(counts: &[u64], n: usize) -> Vec<u64> {
    let mut counts = counts.to_vec();
    counts.resize(n, 0);
    counts
}

/// Similarity of two already decomposed formulas
pub fn score_formulas(a: &DecomposedFormula, b: &DecomposedFormula) -> f64 {
    if a.elements != b.elements {
        return 0.0;
    }
    let n = a.counts.len().max(b.counts.len());
    if n == 0 {
        return 1.0;
    }
    let counts_a = padded(&a.counts, n);
    let counts_b = padded(&b.counts, n);

    let crossing: f64 = counts_a
        .iter()
        .zip(counts_b.iter())
        .map(|(&x, &y)| position_contribution(x, y))
        .sum();
    2.0 * crossing / (counts_a.len() + counts_b.len()) as f64
}

/// Similarity of two canonical structures. Identifiers without a recognizable brutto
/// formula are logged and scored 0.0.
pub fn score(a: &CanonicalStructure, b: &CanonicalStructure) -> f64 {
    let (formula_a, formula_b) = match (extract_formula(a.as_str()), extract_formula(b.as_str())) {
        (Ok(formula_a), Ok(formula_b)) => (formula_a, formula_b),
        (Err(e), _) | (_, Err(e)) => {
            warn!("cannot compare {} and {}: {}", a, b, e);
            return 0.0;
        }
    };
    let coeff = score_formulas(&formula_a, &formula_b);
    debug!("similarity of {} and {} is {:.4}", a, b, coeff);
    coeff
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn inchi(formula: &str) -> CanonicalStructure {
        CanonicalStructure::new(format!("InChI=1S/{}/c1", formula))
    }

    #[test]
    fn test_self_identity() {
        for formula in ["C6H12O6", "H2O", "NaCl", "CH4", "C2H5OH"] {
            assert_eq!(score(&inchi(formula), &inchi(formula)), 1.0);
        }
    }

    #[test]
    fn test_one_count_differs() {
        let coeff = score(&inchi("C6H12O6"), &inchi("C6H12O7"));
        let crossing = 2.0 + 1.0 / 1.2;
        assert_relative_eq!(coeff, 2.0 * crossing / 6.0, epsilon = 1e-12);
        assert_relative_eq!(coeff, 0.9444, epsilon = 1e-4);
    }

    #[test]
    fn test_different_elements() {
        assert_eq!(score(&inchi("C6H12O6"), &inchi("N2O")), 0.0);
        // same composition but different order
        assert_eq!(score(&inchi("C6H12O6"), &inchi("H12C6O6")), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let formulas = ["C6H12O6", "C6H12O7", "C6H10O5", "C2H6O", "C3H8O", "CHO"];
        for a in formulas {
            for b in formulas {
                assert_eq!(score(&inchi(a), &inchi(b)), score(&inchi(b), &inchi(a)));
            }
        }
    }

    #[test]
    fn test_monotonic_decay() {
        let mut previous = position_contribution(10, 10);
        for other in 11..40 {
            let current = position_contribution(10, other);
            assert!(current <= previous);
            assert!(current > 0.0);
            previous = current;
        }
        assert_eq!(position_contribution(3, 8), position_contribution(8, 3));
    }

    #[test]
    fn test_zero_padding() {
        // CH vs CH4: counts [] vs [4] padded to [0] vs [4]
        let a = DecomposedFormula {
            elements: "CH".to_string(),
            counts: vec![],
        };
        let b = DecomposedFormula {
            elements: "CH".to_string(),
            counts: vec![4],
        };
        assert_relative_eq!(score_formulas(&a, &b), 1.0 / 1.8, epsilon = 1e-12);

        // explicit trailing zero gives the same result as implicit padding
        let short = DecomposedFormula {
            elements: "CHO".to_string(),
            counts: vec![2, 6],
        };
        let explicit = DecomposedFormula {
            elements: "CHO".to_string(),
            counts: vec![2, 6, 0],
        };
        let long = DecomposedFormula {
            elements: "CHO".to_string(),
            counts: vec![2, 6, 1],
        };
        assert_eq!(score_formulas(&short, &long), score_formulas(&explicit, &long));
    }

    #[test]
    fn test_element_only_formulas() {
        assert_eq!(score(&inchi("NaCl"), &inchi("NaCl")), 1.0);
        assert_eq!(score(&inchi("NaCl"), &inchi("KCl")), 0.0);
    }

    #[test]
    fn test_unparsable_structure() {
        let broken = CanonicalStructure::new("no formula here");
        assert_eq!(score(&broken, &inchi("H2O")), 0.0);
        assert_eq!(score(&inchi("H2O"), &broken), 0.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        assert!(!exceeds_threshold(0.7, DEFAULT_THRESHOLD));
        assert!(exceeds_threshold(0.70000001, DEFAULT_THRESHOLD));
        assert!(!exceeds_threshold(0.0, DEFAULT_THRESHOLD));
    }

    #[test]
    fn test_range() {
        let coeff = score(&inchi("C1H1O1"), &inchi("C100H200O300"));
        assert!(coeff > 0.0 && coeff < 1.0);
    }
}
