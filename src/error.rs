use thiserror::Error;

/// Errors raised by the cs-tag grammar engine and the cluster pipeline.
///
/// All three kinds are recoverable at per-record or per-cluster granularity:
/// the pipeline excludes the failing cluster, counts it, and keeps going.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CsvTagError {
    #[error("malformed cs tag {tag:?}: unrecognized token at byte {position}")]
    MalformedTag { tag: String, position: usize },

    #[error("unknown nucleotide {base:?} in cs tag")]
    UnknownBase { base: char },

    #[error("inconsistent cluster {key}: {reason}")]
    InconsistentCluster { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CsvTagError>;
