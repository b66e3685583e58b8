//! Batch re-orientation of SAP dwelling assessment XML.
//!
//! A plot schedule spreadsheet says, for each plot on a site, which house
//! type XML it is built from, which way the dwelling actually faces, and a
//! handful of identifying fields. This crate rewrites each matched XML so
//! its dwelling orientation, opening orientations, PV panel fields and
//! labels agree with the schedule, emitting one corrected document per plot.

pub mod batch;
pub mod core;
pub mod errors;
pub mod output_writer;
pub mod schedule;
pub mod xml_doc;

pub use crate::batch::{process_batch, BatchOutcome, DocumentStore};
pub use crate::errors::BatchError;
pub use crate::output_writer::{DocumentSink, FileDocumentSink, MemoryDocumentSink};
pub use crate::schedule::PlotRow;

use std::path::Path;

/// Runs one whole batch from files on disk: reads the schedule at
/// `schedule_path` (worksheet `sheet`, or the first one), loads every
/// document under `xml_dir`, and hands corrected documents to `sink`.
pub fn run_batch(
    schedule_path: &Path,
    sheet: Option<&str>,
    xml_dir: &Path,
    sink: &mut dyn DocumentSink,
) -> Result<BatchOutcome, BatchError> {
    let rows = schedule::read_schedule(schedule_path, sheet)?;
    let store = DocumentStore::from_directory(xml_dir).map_err(BatchError::InputDocuments)?;
    process_batch(rows, &store, sink)
}
