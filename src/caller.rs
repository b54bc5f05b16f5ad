use crate::error::{CsvTagError, Result};
use crate::microhomology::{QualityMode, remove_microhomology};
use crate::overlap::remove_overlapped_alignments;
use crate::record::AlignmentRecord;
use crate::tag::{revcomp, split_by_tag};
use crate::types::{HashSet, HashSetExt};

/// Default maximum genomic gap between neighboring segments of an
/// inversion triple.
pub const DEFAULT_DISTANCE_THRESHOLD: u32 = 50;

/// One called CSVTAG: the annotated difference string for a read (or for
/// one standalone segment of it), anchored at a 1-based reference position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CsvTagResult {
    pub read_id: String,
    pub reference_id: String,
    pub position: u32,
    pub csvtag: String,
}

/// Options consumed by the caller.
#[derive(Debug, Clone, Copy)]
pub struct CallerConfig {
    /// Maximum genomic gap between neighboring segments of an inversion
    /// triple.
    pub distance_threshold: u32,
    /// Whether microhomology sizing requires per-base quality agreement.
    pub quality_mode: QualityMode,
}

impl Default for CallerConfig {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            quality_mode: QualityMode::default(),
        }
    }
}

/// Every record of a cluster must carry a non-empty, well-formed cs tag.
fn validate_tags(cluster: &[AlignmentRecord]) -> Result<()> {
    for record in cluster {
        if record.cs_tag.is_empty() {
            return Err(CsvTagError::InconsistentCluster {
                key: format!("{}:{}", record.read_id, record.reference_id),
                reason: "empty cs tag".to_string(),
            });
        }
        split_by_tag(&record.cs_tag)?;
    }
    Ok(())
}

/// Process one cluster of same-read, same-reference segments (sorted by
/// `position`) into its final CSVTAG results.
pub fn process_cluster(
    cluster: &[AlignmentRecord],
    config: &CallerConfig,
) -> Result<Vec<CsvTagResult>> {
    validate_tags(cluster)?;
    if let Some(pair) = cluster.windows(2).find(|pair| pair[0].position > pair[1].position) {
        return Err(CsvTagError::InconsistentCluster {
            key: format!("{}:{}", pair[0].read_id, pair[0].reference_id),
            reason: format!(
                "positions not sorted: {} before {}",
                pair[0].position, pair[1].position
            ),
        });
    }

    let mut segments = remove_overlapped_alignments(cluster);
    remove_microhomology(&mut segments, config.quality_mode)?;
    assemble(&segments, config.distance_threshold)
}

/// Genomic gap between two position-sorted segments, in 0-based span
/// coordinates. Zero means adjacency; negative means overlap.
fn gap(curr: &AlignmentRecord, next: &AlignmentRecord) -> i64 {
    next.ref_span().0 as i64 - curr.ref_span().1 as i64
}

fn is_inversion_triple(
    first: &AlignmentRecord,
    second: &AlignmentRecord,
    third: &AlignmentRecord,
    threshold: u32,
) -> bool {
    let strand_flips = first.is_forward() == third.is_forward()
        && first.is_forward() != second.is_forward();
    strand_flips && gap(first, second) <= threshold as i64 && gap(second, third) <= threshold as i64
}

/// Slide a window of three over the sorted segments, collapsing each
/// detected inversion triple into one composite CSVTAG; everything else is
/// emitted standalone. Identical results are deduplicated, keeping first
/// occurrences in order.
fn assemble(segments: &[AlignmentRecord], threshold: u32) -> Result<Vec<CsvTagResult>> {
    let mut results = Vec::new();
    let n = segments.len();

    if n <= 2 {
        for segment in segments {
            results.push(standalone(segment)?);
        }
    } else {
        let mut consumed = vec![false; n];
        for i in 0..n - 2 {
            let (first, second, third) = (&segments[i], &segments[i + 1], &segments[i + 2]);
            if is_inversion_triple(first, second, third, threshold) {
                results.push(assemble_triple(first, second, third)?);
                consumed[i] = true;
                consumed[i + 1] = true;
                consumed[i + 2] = true;
            } else if !consumed[i] {
                results.push(standalone(first)?);
                consumed[i] = true;
            }
        }
        for i in n - 2..n {
            if !consumed[i] {
                results.push(standalone(&segments[i])?);
            }
        }
    }

    let mut seen: HashSet<CsvTagResult> = HashSet::with_capacity(results.len());
    results.retain(|result| seen.insert(result.clone()));
    Ok(results)
}

/// Emit one segment on the reference's plus strand: reverse-complemented
/// first when it mapped to the reverse strand, then uppercased.
fn standalone(segment: &AlignmentRecord) -> Result<CsvTagResult> {
    let tag = if segment.is_forward() {
        segment.cs_tag.clone()
    } else {
        revcomp(&segment.cs_tag)?
    };
    Ok(CsvTagResult {
        read_id: segment.read_id.clone(),
        reference_id: segment.reference_id.clone(),
        position: segment.position,
        csvtag: tag.to_uppercase(),
    })
}

/// Collapse an inversion triple into one composite CSVTAG anchored at the
/// first segment's position. The middle segment is reverse-complemented
/// and lowercased to mark the inversion; strictly positive gaps are padded
/// with `N` runs sized to the gap.
fn assemble_triple(
    first: &AlignmentRecord,
    second: &AlignmentRecord,
    third: &AlignmentRecord,
) -> Result<CsvTagResult> {
    let pieces = [
        first.cs_tag.to_uppercase(),
        revcomp(&second.cs_tag)?.to_lowercase(),
        third.cs_tag.to_uppercase(),
    ];
    let gaps = [gap(first, second), gap(second, third)];
    let csvtag = join_with_padding(&pieces, &gaps)?;
    Ok(CsvTagResult {
        read_id: first.read_id.clone(),
        reference_id: first.reference_id.clone(),
        position: first.position,
        csvtag,
    })
}

/// Which end of a tag an `N` run is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Pad a csv tag with an `N` run of `n_length` bases, merging into an
/// abutting uppercase `=` run when one is present.
pub fn pad_n(csv_tag: &str, n_length: u32, side: Side) -> Result<String> {
    if n_length == 0 {
        return Ok(csv_tag.to_string());
    }
    let pad: String = "N".repeat(n_length as usize);
    Ok(match side {
        Side::Left => {
            if csv_tag.starts_with('=') && !starts_lowercase(&csv_tag[1..]) {
                format!("={pad}{}", &csv_tag[1..])
            } else {
                format!("={pad}{csv_tag}")
            }
        }
        Side::Right => {
            let merge = split_by_tag(csv_tag)?
                .last()
                .is_some_and(|last| last.starts_with('=') && !starts_lowercase(&last[1..]));
            if merge {
                format!("{csv_tag}{pad}")
            } else {
                format!("{csv_tag}={pad}")
            }
        }
    })
}

fn starts_lowercase(s: &str) -> bool {
    s.starts_with(|c: char| c.is_ascii_lowercase())
}

fn is_inverted_piece(piece: &str) -> bool {
    piece
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .is_some_and(|c| c.is_ascii_lowercase())
}

/// Join neighboring csv tag pieces, padding each strictly positive gap with
/// an `N` run attached to the uppercase neighbor of that gap.
///
/// # Panics
///
/// `gaps` must hold exactly one entry per adjacent pair of `pieces`;
/// anything else is a programmer error.
fn join_with_padding(pieces: &[String], gaps: &[i64]) -> Result<String> {
    assert_eq!(
        pieces.len(),
        gaps.len() + 1,
        "join_with_padding: one gap per adjacent pair of tags"
    );

    let mut padded: Vec<String> = pieces.to_vec();
    for (i, &gap) in gaps.iter().enumerate() {
        if gap <= 0 {
            continue;
        }
        let n_length = gap as u32;
        if is_inverted_piece(&padded[i + 1]) {
            padded[i] = pad_n(&padded[i], n_length, Side::Right)?;
        } else {
            padded[i + 1] = pad_n(&padded[i + 1], n_length, Side::Left)?;
        }
    }
    Ok(padded.concat())
}
