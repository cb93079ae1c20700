use thiserror::Error;

/// Errors surfaced by the scan pipeline.
///
/// Per-row malformed CSV data is not an error (bad rows are dropped), and
/// downsampling an empty series is not an error (empty in, empty out).
/// Everything here is recoverable at the ingestion boundary: the monitor
/// converts failures into a chart phase instead of letting them propagate
/// to the consumer.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("snapshot feed failed: {0}")]
    Feed(String),
    #[error("failed to fetch scan data: {0}")]
    Fetch(String),
    #[error("failed to read scan data body: {0}")]
    Decode(String),
    #[error("failed to parse scan document: {0}")]
    Parse(String),
}
