//! The batch driver: validates the row set, resolves each row's document,
//! runs the mapper, and hands outputs to the sink.

use crate::core::compass::Direction;
use crate::core::mapper::apply_row;
use crate::core::normalize::normalize_orientation;
use crate::errors::BatchError;
use crate::output_writer::DocumentSink;
use crate::schedule::PlotRow;
use crate::xml_doc::XmlDocument;
use anyhow::Context;
use indexmap::IndexMap;
use itertools::Itertools;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};
use walkdir::WalkDir;

/// The filename→document-bytes lookup the driver resolves rows against.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: IndexMap<String, Vec<u8>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds a store from every file under `path`, keyed by the path
    /// relative to `path` (forward slashes, as schedule filenames use).
    pub fn from_directory(path: &Path) -> anyhow::Result<Self> {
        let mut store = Self::new();
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let key = entry
                .path()
                .strip_prefix(path)
                .unwrap_or(entry.path())
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .join("/");
            let bytes = fs::read(entry.path())
                .with_context(|| format!("reading {}", entry.path().display()))?;
            store.insert(key, bytes);
        }
        Ok(store)
    }

    pub fn insert(&mut self, filename: impl Into<String>, bytes: Vec<u8>) {
        self.documents.insert(filename.into(), bytes);
    }

    pub fn get(&self, filename: &str) -> Option<&[u8]> {
        self.documents.get(filename).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// What a completed batch produced: output names in processing order, plus
/// the filenames of rows that were skipped because their document was absent.
#[derive(Debug, Default, PartialEq)]
pub struct BatchOutcome {
    pub written: Vec<String>,
    pub skipped_missing: Vec<String>,
}

/// Runs one batch: filter, duplicate check, then per-row transform. The
/// duplicate check runs before any document is parsed or mutated, so a
/// failed batch produces no output at all.
pub fn process_batch(
    rows: Vec<PlotRow>,
    store: &DocumentStore,
    sink: &mut dyn DocumentSink,
) -> Result<BatchOutcome, BatchError> {
    let rows = validated_rows(rows);
    check_duplicate_references(&rows)?;

    let mut outcome = BatchOutcome::default();
    for row in &rows {
        let filename = resolve_filename(&row.xml_filename);
        let Some(bytes) = store.get(&filename) else {
            debug!(
                filename = %filename,
                plot = %row.plot_reference,
                "document not found, skipping row"
            );
            outcome.skipped_missing.push(filename);
            continue;
        };

        let mut document = XmlDocument::parse(bytes).map_err(|source| BatchError::Document {
            filename: filename.clone(),
            source,
        })?;
        apply_row(row, &mut document);

        let output_name = format!("{}.xml", row.plot_reference);
        let bytes = document
            .to_bytes()
            .map_err(|source| BatchError::Serialize {
                plot_reference: row.plot_reference.clone(),
                source,
            })?;
        sink.accept(&output_name, &bytes)
            .map_err(|source| BatchError::Sink {
                output_name: output_name.clone(),
                source,
            })?;
        outcome.written.push(output_name);
    }

    info!(
        written = outcome.written.len(),
        skipped = outcome.skipped_missing.len(),
        "batch complete"
    );
    Ok(outcome)
}

/// Keeps only rows that can actually be processed: a filename to resolve and
/// a dwelling orientation that maps onto the compass grid.
pub fn validated_rows(rows: Vec<PlotRow>) -> Vec<PlotRow> {
    rows.into_iter()
        .filter(|row| {
            !row.xml_filename.is_empty()
                && Direction::from_str(&normalize_orientation(Some(
                    row.dwelling_orientation.as_str(),
                )))
                .is_ok()
        })
        .collect()
}

fn check_duplicate_references(rows: &[PlotRow]) -> Result<(), BatchError> {
    let references: Vec<String> = rows
        .iter()
        .map(|row| row.plot_reference.clone())
        .duplicates()
        .collect();
    if references.is_empty() {
        Ok(())
    } else {
        Err(BatchError::DuplicatePlotReferences { references })
    }
}

fn resolve_filename(filename: &str) -> String {
    if filename.to_ascii_lowercase().ends_with(".xml") {
        filename.to_string()
    } else {
        format!("{filename}.xml")
    }
}
