use crate::schedule::ScheduleError;
use crate::xml_doc::XmlError;
use itertools::Itertools;
use thiserror::Error;

/// The batch-fatal error taxonomy. Row-level degradation (a missing XML
/// file) and field-level degradation (an unparsable cell) never surface
/// here; they are absorbed as skip/leave-unchanged by the driver and mapper.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("duplicate plot references detected: {}", references.iter().join(", "))]
    DuplicatePlotReferences { references: Vec<String> },
    #[error("failed to read plot schedule: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("failed to load input documents: {0}")]
    InputDocuments(#[source] anyhow::Error),
    #[error("failed to parse assessment XML `{filename}`: {source}")]
    Document { filename: String, source: XmlError },
    #[error("failed to serialize output for plot `{plot_reference}`: {source}")]
    Serialize {
        plot_reference: String,
        source: XmlError,
    },
    #[error("failed to write output document `{output_name}`: {source}")]
    Sink {
        output_name: String,
        source: anyhow::Error,
    },
}
