use crate::Comparison::corpus::CorpusError;
use crate::Comparison::resolver::ResolveError;
use log::{error, info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Splits newline-delimited text into documents: one line is one document, blank lines are
/// empty documents, a final newline does not open a new document
pub fn split_documents(text: &str) -> Vec<String> {
    text.lines().map(|line| line.to_string()).collect()
}

/// Reads a corpus file: UTF-8 text, one document per line, no header
pub fn load_corpus_lines(file_name: &str) -> Result<Vec<String>, CorpusError> {
    let bytes = fs::read(file_name).map_err(|source| {
        error!("Failed to open corpus file '{}': {}", file_name, source);
        CorpusError::Io {
            path: file_name.to_string(),
            source,
        }
    })?;
    let text = String::from_utf8(bytes).map_err(|e| {
        error!(
            "Corpus file '{}' is not valid UTF-8 (byte {})",
            file_name,
            e.utf8_error().valid_up_to()
        );
        CorpusError::Decode {
            path: file_name.to_string(),
        }
    })?;
    let documents = split_documents(&text);
    if documents.is_empty() {
        warn!("Corpus file '{}' contains no documents", file_name);
    }
    info!(
        "Loaded {} documents from file '{}'",
        documents.len(),
        file_name
    );
    Ok(documents)
}

/// Reads a JSON object mapping compound names to structure identifiers (or null).
pub fn load_dictionary(file_name: &str) -> Result<HashMap<String, Option<String>>, ResolveError> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(ResolveError::Dictionary(format!(
            "File '{}' does not exist",
            file_name
        )));
    }
    let content = fs::read_to_string(path)?;

    match serde_json::from_str::<HashMap<String, Option<String>>>(&content) {
        Ok(entries) => {
            if entries.is_empty() {
                warn!("Dictionary file '{}' is empty", file_name);
            }
            Ok(entries)
        }
        Err(e) => {
            let (line, column) = (e.line(), e.column());
            error!(
                "Error parsing dictionary '{}' at line {}, column {}: {}",
                file_name, line, column, e
            );
            if let Some(problem_line) = content.lines().nth(line.saturating_sub(1)) {
                error!("Problematic line: {}", problem_line);
                if column >= 1 && column <= problem_line.len() {
                    error!("{}^", " ".repeat(column - 1));
                }
            }
            Err(e.into())
        }
    }
}
