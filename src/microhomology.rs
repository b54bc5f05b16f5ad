use crate::error::Result;
use crate::record::AlignmentRecord;
use crate::tag::{combine_splitted_tags, split_by_nucleotide, to_sequence};

/// How microhomology length is established between two adjacent segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityMode {
    /// Require per-base quality agreement across the homologous window.
    Strict,
    /// Sequence agreement alone.
    #[default]
    Lenient,
}

/// Greatest `k` for which the last `k` query bases of `curr` equal the
/// first `k` of `next`. Strict mode additionally requires the
/// corresponding quality windows to agree position for position at the
/// same `k`.
pub fn microhomology_length(
    curr_sequence: &str,
    next_sequence: &str,
    curr_qualities: &[u8],
    next_qualities: &[u8],
    mode: QualityMode,
) -> usize {
    let min_length = curr_sequence.len().min(next_sequence.len());
    let mut length = 0;
    for i in 1..=min_length {
        if curr_sequence[curr_sequence.len() - i..] != next_sequence[..i] {
            continue;
        }
        if mode == QualityMode::Strict
            && qual_suffix(curr_qualities, i) != qual_prefix(next_qualities, i)
        {
            continue;
        }
        length = i;
    }
    length
}

fn qual_suffix(qualities: &[u8], len: usize) -> &[u8] {
    &qualities[qualities.len().saturating_sub(len)..]
}

fn qual_prefix(qualities: &[u8], len: usize) -> &[u8] {
    &qualities[..len.min(qualities.len())]
}

/// Trim redundant homologous bases shared at adjacent-segment boundaries.
///
/// The cluster must be sorted by `position`. For each adjacent pair the
/// homologous window is sized on the reconstructed query sequences
/// (uppercased), then the side whose window carries strictly fewer exact,
/// non-`N` matches is trimmed at nucleotide granularity and recombined;
/// a tie trims the right side. One left-to-right sweep, not iterated to a
/// fixpoint. A side whose tag is consumed entirely is a whole-tag homolog
/// and is dropped from the cluster.
pub fn remove_microhomology(cluster: &mut Vec<AlignmentRecord>, mode: QualityMode) -> Result<()> {
    if cluster.len() < 2 {
        return Ok(());
    }

    let mut removed = vec![false; cluster.len()];
    for idx in 0..cluster.len() - 1 {
        if removed[idx] {
            continue;
        }

        let curr_sequence = to_sequence(&cluster[idx].cs_tag.to_uppercase())?;
        let next_sequence = to_sequence(&cluster[idx + 1].cs_tag.to_uppercase())?;
        let len_microhomology = microhomology_length(
            &curr_sequence,
            &next_sequence,
            &cluster[idx].query_qualities,
            &cluster[idx + 1].query_qualities,
            mode,
        );
        if len_microhomology == 0 {
            continue;
        }

        let curr_split = split_by_nucleotide(&cluster[idx].cs_tag)?;
        let next_split = split_by_nucleotide(&cluster[idx + 1].cs_tag)?;

        let curr_window = &curr_split[curr_split.len().saturating_sub(len_microhomology)..];
        let next_window = &next_split[..len_microhomology.min(next_split.len())];
        let is_match = |cs: &str| cs.starts_with('=') && cs != "=N";
        let matches_in_curr = curr_window.iter().filter(|cs| is_match(cs.as_str())).count();
        let matches_in_next = next_window.iter().filter(|cs| is_match(cs.as_str())).count();

        // The side with fewer exact matches is the more heavily mutated
        // copy of the shared region; trim that one.
        if matches_in_curr >= matches_in_next {
            if len_microhomology >= next_split.len() {
                removed[idx + 1] = true;
            } else {
                cluster[idx + 1].cs_tag = combine_splitted_tags(&next_split[len_microhomology..]);
            }
        } else if len_microhomology >= curr_split.len() {
            removed[idx] = true;
        } else {
            cluster[idx].cs_tag =
                combine_splitted_tags(&curr_split[..curr_split.len() - len_microhomology]);
        }
    }

    if removed.iter().any(|&r| r) {
        let mut flags = removed.into_iter();
        cluster.retain(|_| !flags.next().unwrap());
    }
    Ok(())
}
