//! Command line commands: analysis of a corpus, formula search and scoring of two
//! structure identifiers.
use crate::Comparison::brutto_parser::{CanonicalStructure, ParseError, extract_formula};
use crate::Comparison::clustering::ClusterCollection;
use crate::Comparison::corpus::{Corpus, CorpusError};
use crate::Comparison::resolver::{ResolveError, create_resolver};
use crate::Comparison::similarity::score;
use crate::settings::{AnalysisSettings, DEFAULT_SETTINGS_FILE, SettingsError};
use prettytable::{Table, row};
use serde::Serialize;
use thiserror::Error;

pub const USAGE: &str = "\
usage:
  bruttosim analyze <corpus.txt> [--config settings.json] [--json]
  bruttosim search <corpus.txt> <formula> [--config settings.json] [--json]
  bruttosim score <structure-id> <structure-id>
  bruttosim            (interactive menu)";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}\n{usage}", usage = USAGE)]
    Usage(String),
    #[error(transparent)]
    Corpus(#[from] CorpusError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Analyze {
        corpus: String,
        config: Option<String>,
        json: bool,
    },
    Search {
        corpus: String,
        formula: String,
        config: Option<String>,
        json: bool,
    },
    Score {
        first: String,
        second: String,
    },
    Interactive,
    Help,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    pub formula: String,
    pub threshold: f64,
    pub documents: Vec<usize>,
}

/// Parses the arguments following the program name
pub fn parse_args(args: &[String]) -> Result<Command, CliError> {
    let Some((name, rest)) = args.split_first() else {
        return Ok(Command::Interactive);
    };
    let mut positional = Vec::new();
    let mut config = None;
    let mut json = false;
    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--config" => match iter.next() {
                Some(path) => config = Some(path.clone()),
                None => return Err(CliError::Usage("--config needs a file name".to_string())),
            },
            flag if flag.starts_with("--") => {
                return Err(CliError::Usage(format!("unknown option '{}'", flag)));
            }
            value => positional.push(value.to_string()),
        }
    }

    match (name.as_str(), positional.as_slice()) {
        ("analyze", [corpus]) => Ok(Command::Analyze {
            corpus: corpus.clone(),
            config,
            json,
        }),
        ("search", [corpus, formula]) => Ok(Command::Search {
            corpus: corpus.clone(),
            formula: formula.clone(),
            config,
            json,
        }),
        ("score", [first, second]) => Ok(Command::Score {
            first: first.clone(),
            second: second.clone(),
        }),
        ("help" | "--help" | "-h", _) => Ok(Command::Help),
        ("analyze" | "search" | "score", _) => Err(CliError::Usage(format!(
            "wrong number of arguments for '{}'",
            name
        ))),
        _ => Err(CliError::Usage(format!("unknown command '{}'", name))),
    }
}

/// Settings for the command. Only `analyze` and `search` read a settings file: the given
/// one, or the default file when it exists. Other commands run with the defaults.
pub fn settings_for(command: &Command) -> Result<AnalysisSettings, CliError> {
    settings_with_default_file(command, DEFAULT_SETTINGS_FILE)
}

fn settings_with_default_file(
    command: &Command,
    default_file: &str,
) -> Result<AnalysisSettings, CliError> {
    let settings = match command {
        Command::Analyze { config, .. } | Command::Search { config, .. } => match config {
            Some(file_name) => AnalysisSettings::from_file(file_name)?,
            None => AnalysisSettings::load_or_default(default_file)?,
        },
        _ => AnalysisSettings::default(),
    };
    Ok(settings)
}

/// Clusters of similar mentions over all document pairs of a corpus file
pub fn analyze_report(
    corpus: &str,
    settings: &AnalysisSettings,
) -> Result<ClusterCollection, CliError> {
    let corpus = Corpus::from_file(corpus)?;
    let resolver = create_resolver(settings.dictionary.as_deref())?;
    Ok(corpus.analyze_all_pairs(&resolver, settings))
}

pub fn analyze(corpus: &str, settings: &AnalysisSettings, json: bool) -> Result<(), CliError> {
    let clusters = analyze_report(corpus, settings)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&clusters)?);
    } else {
        clusters.pretty_print();
    }
    Ok(())
}

/// Documents of a corpus file matching the formula, with the texts of the found documents
pub fn search_report(
    corpus: &str,
    formula: &str,
    settings: &AnalysisSettings,
) -> Result<(SearchReport, Corpus), CliError> {
    let corpus = Corpus::from_file(corpus)?;
    let resolver = create_resolver(settings.dictionary.as_deref())?;
    let documents = corpus.find_documents_matching(formula, settings.query_threshold, &resolver);
    let report = SearchReport {
        formula: formula.to_string(),
        threshold: settings.query_threshold,
        documents,
    };
    Ok((report, corpus))
}

pub fn search(
    corpus: &str,
    formula: &str,
    settings: &AnalysisSettings,
    json: bool,
) -> Result<(), CliError> {
    let (report, corpus) = search_report(corpus, formula, settings)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.documents.is_empty() {
        println!("no documents mention a substance similar to {}", formula);
    } else {
        let mut table = Table::new();
        table.add_row(row!["document", "text"]);
        for &idx in &report.documents {
            table.add_row(row![idx, corpus.get(idx).unwrap_or_default()]);
        }
        table.printstd();
    }
    Ok(())
}

/// Scores two identifiers; unlike the scorer itself, a bad identifier is reported
pub fn score_pair(first: &str, second: &str) -> Result<f64, CliError> {
    extract_formula(first)?;
    extract_formula(second)?;
    Ok(score(
        &CanonicalStructure::from(first),
        &CanonicalStructure::from(second),
    ))
}

pub fn run_command(command: Command, settings: &AnalysisSettings) -> Result<(), CliError> {
    match command {
        Command::Analyze { corpus, json, .. } => analyze(&corpus, settings, json),
        Command::Search {
            corpus,
            formula,
            json,
            ..
        } => search(&corpus, &formula, settings, json),
        Command::Score { first, second } => {
            let coeff = score_pair(&first, &second)?;
            println!("{:.4}", coeff);
            Ok(())
        }
        Command::Interactive => {
            super::cli_main::run_interactive_menu();
            Ok(())
        }
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
    }
}
