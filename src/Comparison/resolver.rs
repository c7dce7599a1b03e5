//! # Mention Resolver Module
//!
//! ## Aim
//! Finds chemical mentions in free text and attaches a canonical structure identifier to
//! each one, when it is known. The rest of the crate only sees the `MentionResolver` trait,
//! so any named entity recognition engine can be plugged in.
//!
//! ## Backends
//! - `FormulaResolver`: literal brutto formulae in text (`C6H12O6`, `H2O`, `NaCl`...) are
//!   turned into the synthetic identifier `InChI=1S/<formula>`
//! - `DictionaryResolver`: names from a JSON dictionary `{"glucose": "InChI=1S/C6H12O6/...",
//!   "humic acid": null}`, matched as whole words regardless of case. Names mapped to null
//!   are reported without a structure
//! - `CombinedResolver`: dictionary first, then formulae
//!
//! `ResolverKind` dispatches between the backends without boxing.
use super::brutto_parser::CanonicalStructure;
use crate::Utils::load_from_file::load_dictionary;
use enum_dispatch::enum_dispatch;
use log::{debug, info};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

static FORMULA_CANDIDATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:[A-Z][a-z]?[0-9]*)+\b").expect("valid formula candidate regex")
});
static ELEMENT_GROUP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z][a-z]?)([0-9]*)").expect("valid element group regex"));

const ELEMENT_SYMBOLS: &[&str] = &[
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr",
];

/// error types of the resolver backends
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Dictionary error: {0}")]
    Dictionary(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A chemical mention found in text, with its structure if the resolver knows one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMention {
    pub surface: String,
    pub structure: Option<CanonicalStructure>,
}

impl ResolvedMention {
    pub fn new(surface: &str, structure: Option<&str>) -> Self {
        Self {
            surface: surface.to_string(),
            structure: structure.map(CanonicalStructure::from),
        }
    }
}

#[enum_dispatch]
pub trait MentionResolver {
    /// all chemical mentions of the text in the order the backend finds them
    fn resolve(&self, text: &str) -> Result<Vec<ResolvedMention>, ResolveError>;
}

/// Recognizes literal brutto formulae written in the text
#[derive(Debug, Clone, Default)]
pub struct FormulaResolver;

impl FormulaResolver {
    pub fn new() -> Self {
        FormulaResolver
    }

    /// a candidate is a formula when every group is a real element symbol and it either has
    /// a count (`I2`, `C6H12O6`) or pairs a two-letter symbol with another element (`NaCl`).
    /// Capitals without digits ("C", "NO", "US", "IN") are taken for prose or acronyms
    fn is_formula(candidate: &str) -> bool {
        let mut groups = 0;
        let mut has_count = false;
        let mut has_two_letter_symbol = false;
        for cap in ELEMENT_GROUP_RE.captures_iter(candidate) {
            if !ELEMENT_SYMBOLS.contains(&&cap[1]) {
                return false;
            }
            has_count |= !cap[2].is_empty();
            has_two_letter_symbol |= cap[1].len() == 2;
            groups += 1;
        }
        groups > 0 && (has_count || (groups >= 2 && has_two_letter_symbol))
    }
}

impl MentionResolver for FormulaResolver {
    fn resolve(&self, text: &str) -> Result<Vec<ResolvedMention>, ResolveError> {
        let mentions: Vec<ResolvedMention> = FORMULA_CANDIDATE_RE
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|candidate| Self::is_formula(candidate))
            .map(|formula| ResolvedMention {
                surface: formula.to_string(),
                structure: Some(CanonicalStructure::new(format!("InChI=1S/{}", formula))),
            })
            .collect();
        debug!("formula resolver found {} mentions", mentions.len());
        Ok(mentions)
    }
}

/// Resolves compound names from a name -> structure identifier dictionary
#[derive(Debug, Clone)]
pub struct DictionaryResolver {
    entries: HashMap<String, Option<String>>,
    matcher: Option<Regex>,
}

impl DictionaryResolver {
    /// Names are matched regardless of case, so two names equal up to case must not map
    /// to different identifiers.
    pub fn new(raw_entries: HashMap<String, Option<String>>) -> Result<Self, ResolveError> {
        let mut entries: HashMap<String, Option<String>> = HashMap::new();
        for (name, id) in raw_entries {
            let key = name.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            let id = id.filter(|id| !id.trim().is_empty());
            match entries.get(&key) {
                Some(known) if *known != id => {
                    return Err(ResolveError::Dictionary(format!(
                        "name '{}' collides with another spelling of '{}' mapped to a different identifier",
                        name, key
                    )));
                }
                Some(_) => continue,
                None => {
                    entries.insert(key, id);
                }
            }
        }
        if entries.is_empty() {
            return Ok(Self {
                entries,
                matcher: None,
            });
        }
        // longest names first, so "acetic acid" wins over "acetic"
        let mut names: Vec<&String> = entries.keys().collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let alternation = names
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let matcher = RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
            .case_insensitive(true)
            .build()
            .map_err(|e| ResolveError::Dictionary(e.to_string()))?;
        Ok(Self {
            entries,
            matcher: Some(matcher),
        })
    }

    pub fn from_file(file_name: &str) -> Result<Self, ResolveError> {
        let entries = load_dictionary(file_name)?;
        info!(
            "dictionary resolver loaded {} names from '{}'",
            entries.len(),
            file_name
        );
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MentionResolver for DictionaryResolver {
    fn resolve(&self, text: &str) -> Result<Vec<ResolvedMention>, ResolveError> {
        let Some(matcher) = &self.matcher else {
            return Ok(Vec::new());
        };
        let mentions = matcher
            .find_iter(text)
            .map(|m| {
                let structure = self
                    .entries
                    .get(&m.as_str().to_lowercase())
                    .cloned()
                    .flatten()
                    .map(CanonicalStructure::new);
                ResolvedMention {
                    surface: m.as_str().to_string(),
                    structure,
                }
            })
            .collect();
        Ok(mentions)
    }
}

/// Dictionary names first, then literal formulae
#[derive(Debug, Clone)]
pub struct CombinedResolver {
    pub dictionary: DictionaryResolver,
    pub formulas: FormulaResolver,
}

impl MentionResolver for CombinedResolver {
    fn resolve(&self, text: &str) -> Result<Vec<ResolvedMention>, ResolveError> {
        let mut mentions = self.dictionary.resolve(text)?;
        mentions.extend(self.formulas.resolve(text)?);
        Ok(mentions)
    }
}

#[derive(Debug, Clone)]
#[enum_dispatch(MentionResolver)]
pub enum ResolverKind {
    Formula(FormulaResolver),
    Dictionary(DictionaryResolver),
    Combined(CombinedResolver),
}

/// Formula recognition alone, or together with the dictionary when a path is given
pub fn create_resolver(dictionary: Option<&str>) -> Result<ResolverKind, ResolveError> {
    match dictionary {
        None => Ok(ResolverKind::Formula(FormulaResolver::new())),
        Some(file_name) => Ok(ResolverKind::Combined(CombinedResolver {
            dictionary: DictionaryResolver::from_file(file_name)?,
            formulas: FormulaResolver::new(),
        })),
    }
}
