//! csvtag-rs: call annotated difference strings (CSVTAG) from cs-tagged
//! SAM alignments.
//!
//! A CSVTAG is a long-form cs tag whose case encodes strand (lowercase =
//! reverse-complemented, i.e. inverted, segment) and which may be a
//! composite of several alignment segments of one read. The library
//! exposes the pure grammar engine ([`split_by_tag`], [`revcomp`],
//! [`to_sequence`], ...) and the cluster caller that merges a read's
//! segments into final CSVTAGs.
//!
//! # Library usage
//!
//! ```no_run
//! use csvtag_rs::{CallerConfig, QualityMode, call_csvtag};
//!
//! let config = CallerConfig {
//!     distance_threshold: 50,
//!     quality_mode: QualityMode::Lenient,
//! };
//! let results = call_csvtag("alignments.sam", &config)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

// Internal modules — not part of the public API.
pub(crate) mod caller;
pub(crate) mod microhomology;
pub(crate) mod overlap;
pub(crate) mod pipeline;
pub(crate) mod record;
pub(crate) mod sam_input;
pub(crate) mod types;

// Public modules — stable API surface.
pub mod error;
pub mod tag;

// Flat re-exports for the most commonly used public items.
pub use api::{call_csvtag, call_csvtag_from_records};
pub use caller::{CallerConfig, CsvTagResult, DEFAULT_DISTANCE_THRESHOLD};
pub use error::CsvTagError;
pub use microhomology::QualityMode;
pub use record::{AlignmentRecord, aligned_reference_length, softclip_lengths};
pub use tag::{
    combine_splitted_tags, revcomp, split_by_inversion, split_by_nucleotide, split_by_tag,
    to_sequence,
};

// Re-exports needed by integration tests in tests/.
#[doc(hidden)]
pub use caller::{Side, pad_n, process_cluster};
#[doc(hidden)]
pub use microhomology::{microhomology_length, remove_microhomology};
#[doc(hidden)]
pub use overlap::remove_overlapped_alignments;
#[doc(hidden)]
pub use pipeline::{Stats, group_into_clusters, run as run_pipeline};

mod api;
