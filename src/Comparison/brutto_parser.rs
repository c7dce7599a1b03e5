//! # Brutto Formula Parser Module
//!
//! ## Aim
//! Extracts the brutto formula token from a canonical structure identifier (InChI-like
//! string, e.g. `InChI=1S/C6H12O6/c7-1-2-3(9)...`) and decomposes it into the string of
//! element letters and the list of atom counts.
//!
//! ## Logic
//! 1) the token is the first run of word characters following a `/`
//! 2) the leading word run of that token is kept, trailing annotations are dropped
//! 3) all digit runs of the token become `counts`, left to right
//! 4) all letter runs of the token are concatenated into `elements`, left to right
//!
//! The element order is kept exactly as it appears in the identifier: `C6H12O6` and
//! `H12C6O6` give different `elements` strings.
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

// ASCII classes: canonical identifiers are ASCII and unicode word classes would let
// non-latin letters into the element string
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/[A-Za-z0-9_]+/?").expect("valid token regex"));
static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_]+").expect("valid word regex"));
static DIGITS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digits regex"));
static LETTERS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z]+").expect("valid letters regex"));

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no brutto formula token found in '{0}'")]
    NoFormulaToken(String),
    #[error("brutto formula token '{0}' has neither elements nor atom counts")]
    EmptyFormula(String),
    #[error("atom count in '{0}' does not fit into an integer")]
    CountOverflow(String),
}

/// Canonical structure identifier as returned by a resolver (InChI-like string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalStructure(pub String);

impl CanonicalStructure {
    pub fn new(id: impl Into<String>) -> Self {
        CanonicalStructure(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn decompose(&self) -> Result<DecomposedFormula, ParseError> {
        extract_formula(&self.0)
    }
}

impl fmt::Display for CanonicalStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CanonicalStructure {
    fn from(id: &str) -> Self {
        CanonicalStructure(id.to_string())
    }
}

/// Brutto formula split into element letters and atom counts, both in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecomposedFormula {
    /// concatenated letter runs, e.g. "CHO" for C6H12O6
    pub elements: String,
    /// all digit runs, e.g. [6, 12, 6] for C6H12O6
    pub counts: Vec<u64>,
}

/// Returns the trimmed brutto formula token of a structure identifier, e.g. "C6H12O6"
pub fn formula_token(structure_id: &str) -> Result<&str, ParseError> {
    let raw = TOKEN_RE
        .find(structure_id)
        .ok_or_else(|| ParseError::NoFormulaToken(structure_id.to_string()))?
        .as_str();
    let token = WORD_RE
        .find(raw)
        .ok_or_else(|| ParseError::NoFormulaToken(structure_id.to_string()))?
        .as_str();
    Ok(token)
}

pub fn extract_formula(structure_id: &str) -> Result<DecomposedFormula, ParseError> {
    let token = formula_token(structure_id)?;

    let mut counts = Vec::new();
    for digits in DIGITS_RE.find_iter(token) {
        let count: u64 = digits
            .as_str()
            .parse()
            .map_err(|_| ParseError::CountOverflow(token.to_string()))?;
        counts.push(count);
    }
    let elements: String = LETTERS_RE
        .find_iter(token)
        .map(|letters| letters.as_str())
        .collect();

    // a token made only of underscores carries no formula at all
    if counts.is_empty() && elements.is_empty() {
        return Err(ParseError::EmptyFormula(token.to_string()));
    }
    Ok(DecomposedFormula { elements, counts })
}
