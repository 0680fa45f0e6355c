use thiserror::Error;

/// Referential-integrity failures (§4.A, §7). Fatal at ingest time, and also surfaced by
/// the What-If mutations when a mutation itself would dangle a reference.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("duplicate {label} id: {id}")]
    Duplicate { label: &'static str, id: String },

    #[error("unknown {label} id: {id}")]
    UnknownNode { label: &'static str, id: String },
}
