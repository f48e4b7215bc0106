//! Document ingestion and best-effort annotation.
//!
//! Extraction walks an ordered strategy chain and fails only when every
//! strategy produces no usable text.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::ExtractionError;
use crate::types::{DocMetadata, Issue, RawDocument};

const TITLE_MAX_CHARS: usize = 120;
const REVIEW_HEADER: &str = "--- REVIEW COMMENTS ---";

type StrategyFn = fn(&Path, &[u8]) -> Option<String>;

fn strategies() -> Vec<(&'static str, StrategyFn)> {
    let mut chain: Vec<(&'static str, StrategyFn)> = vec![("utf8", extract_utf8)];
    #[cfg(feature = "pdf")]
    chain.push(("pdf", extract_pdf));
    chain.push(("utf8_lossy", extract_utf8_lossy));
    chain
}

fn extract_utf8(_path: &Path, bytes: &[u8]) -> Option<String> {
    String::from_utf8(bytes.to_vec()).ok()
}

#[cfg(feature = "pdf")]
fn extract_pdf(path: &Path, _bytes: &[u8]) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some("pdf") {
        return None;
    }
    match pdf_extract::extract_text(path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::warn!("pdf extraction failed for {}: {e}", path.display());
            None
        }
    }
}

fn extract_utf8_lossy(_path: &Path, bytes: &[u8]) -> Option<String> {
    Some(String::from_utf8_lossy(bytes).into_owned())
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DocumentAdapter;

impl DocumentAdapter {
    /// Extract text and metadata from a file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::Io`] when the file cannot be read and
    /// [`ExtractionError::NoText`] when no strategy yields usable text.
    pub fn extract(path: &Path) -> Result<RawDocument, ExtractionError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        for (name, strategy) in strategies() {
            let Some(text) = strategy(path, &bytes) else {
                continue;
            };
            if text.trim().is_empty() {
                tracing::debug!("strategy {name} produced empty text for {}", path.display());
                continue;
            }

            let metadata = extract_metadata(path, &text);
            let file_name = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

            return Ok(RawDocument {
                path: path.to_path_buf(),
                name: file_name,
                text,
                metadata,
            });
        }

        Err(ExtractionError::NoText {
            path: path.to_path_buf(),
        })
    }

    /// Write a reviewed copy of the document with issue comments appended.
    ///
    /// Annotation is best effort: any failure is logged and the original
    /// path is returned unchanged. No issues means no copy.
    #[must_use]
    pub fn annotate(path: &Path, issues: &[Issue]) -> PathBuf {
        if issues.is_empty() {
            return path.to_path_buf();
        }

        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!("cannot annotate {}: {e}", path.display());
                return path.to_path_buf();
            }
        };

        let mut annotated = text;
        if !annotated.ends_with('\n') {
            annotated.push('\n');
        }
        annotated.push('\n');
        annotated.push_str(REVIEW_HEADER);
        annotated.push('\n');
        for issue in issues {
            annotated.push_str(&format_comment(issue));
            annotated.push('\n');
        }

        let file_name = path
            .file_name()
            .map_or_else(|| "document".to_owned(), |n| n.to_string_lossy().into_owned());
        let reviewed = path.with_file_name(format!("reviewed_{file_name}"));

        match std::fs::write(&reviewed, annotated) {
            Ok(()) => reviewed,
            Err(e) => {
                tracing::warn!("failed to write {}: {e}", reviewed.display());
                path.to_path_buf()
            }
        }
    }
}

fn format_comment(issue: &Issue) -> String {
    let mut parts = vec![
        format!("ISSUE: {}", issue.issue),
        format!("SEVERITY: {}", issue.severity),
    ];
    if !issue.citations.is_empty() {
        parts.push(format!("REFERENCE: {}", issue.citations.join(", ")));
    }
    if !issue.suggestion.is_empty() {
        parts.push(format!("SUGGESTION: {}", issue.suggestion));
    }
    parts.join(" | ")
}

fn extract_metadata(path: &Path, text: &str) -> DocMetadata {
    let title = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .filter(|l| l.chars().count() <= TITLE_MAX_CHARS)
        .map(str::to_owned);

    let blocks: Vec<&str> = text
        .split("\n\n")
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect();
    let tables = blocks
        .iter()
        .filter(|b| b.lines().any(|l| l.matches('|').count() >= 2))
        .count();

    let created = std::fs::metadata(path)
        .and_then(|m| m.created())
        .ok()
        .map(DateTime::<Utc>::from);

    DocMetadata {
        title,
        // None of the current strategies reads format-level properties;
        // backends that do (e.g. office documents) fill this in.
        author: None,
        paragraphs: blocks.len(),
        tables,
        created,
    }
}
