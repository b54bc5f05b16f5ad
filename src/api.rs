//! Public library API for calling CSVTAGs from cs-tagged alignments.
//!
//! # Example
//!
//! ```no_run
//! use csvtag_rs::{CallerConfig, call_csvtag};
//!
//! let config = CallerConfig::default();
//! let results = call_csvtag("alignments.sam", &config)?;
//! for result in &results {
//!     println!("{}\t{}\t{}\t{}", result.read_id, result.reference_id, result.position, result.csvtag);
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::caller::{CallerConfig, CsvTagResult};
use crate::pipeline::{self, Stats};
use crate::record::AlignmentRecord;
use crate::sam_input;
use anyhow::Result;
use std::path::Path;

/// Call CSVTAGs for every read of a cs-tagged SAM file.
///
/// Results are ordered by `(read_id, reference_id)` cluster and by
/// ascending `position` within a cluster. Clusters with malformed tags are
/// excluded from the output (and logged), not fatal.
pub fn call_csvtag<P: AsRef<Path>>(path: P, config: &CallerConfig) -> Result<Vec<CsvTagResult>> {
    let (records, _ingest) = sam_input::read_alignments(path.as_ref())?;
    let mut stats = Stats::default();
    pipeline::run(records, config, 1, &mut stats)
}

/// Call CSVTAGs from alignment records built by some other source
/// (a BAM reader, an aligner binding, a test).
pub fn call_csvtag_from_records(
    records: Vec<AlignmentRecord>,
    config: &CallerConfig,
) -> Vec<CsvTagResult> {
    let mut stats = Stats::default();
    let clusters = pipeline::group_into_clusters(records);
    stats.clusters = clusters.len() as u64;
    pipeline::run_serial(clusters, config, &mut stats)
}
