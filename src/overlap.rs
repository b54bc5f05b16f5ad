use crate::record::AlignmentRecord;
use crate::types::{HashSet, HashSetExt};

/// Remove re-sequencing artifacts from a cluster: segments whose reference
/// span is fully contained in a neighbor's span.
///
/// The cluster must be sorted by `position`. Each survivor is compared
/// against the next record in one left-to-right pass; when one span fully
/// contains the other the shorter-span record is dropped (equal spans keep
/// the earlier one). Partial overlap without containment is left for the
/// microhomology trimmer. Exactly-equal records are deduplicated at the
/// end, keeping first occurrences in their original relative order.
pub fn remove_overlapped_alignments(cluster: &[AlignmentRecord]) -> Vec<AlignmentRecord> {
    let mut kept: Vec<AlignmentRecord> = Vec::with_capacity(cluster.len());
    for next in cluster {
        let Some(curr) = kept.last() else {
            kept.push(next.clone());
            continue;
        };
        let (curr_start, curr_end) = curr.ref_span();
        let (next_start, next_end) = next.ref_span();
        if curr_start <= next_start && curr_end >= next_end {
            // next is contained in curr (or spans are equal): drop next.
        } else if next_start <= curr_start && next_end >= curr_end {
            // curr is contained in next: the longer span wins.
            kept.pop();
            kept.push(next.clone());
        } else {
            kept.push(next.clone());
        }
    }

    let mut seen: HashSet<AlignmentRecord> = HashSet::with_capacity(kept.len());
    kept.retain(|record| seen.insert(record.clone()));
    kept
}
