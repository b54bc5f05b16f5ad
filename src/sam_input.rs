use crate::record::AlignmentRecord;
use anyhow::{Context, Result, anyhow};
use noodles::sam;
use noodles::sam::alignment::record::cigar::op::Kind as CigarKind;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record_buf::data::field::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Default)]
pub struct IngestStats {
    pub total_records: u64,
    pub unmapped_records: u64,
    pub missing_cs_records: u64,
    pub missing_seq_records: u64,
}

/// Read a cs-tagged SAM file into typed alignment records.
///
/// Header lines, unmapped segments, records without a sequence and records
/// lacking a `cs:Z:` tag are filtered out here, so the pipeline only ever
/// sees well-populated records.
pub fn read_alignments(path: &Path) -> Result<(Vec<AlignmentRecord>, IngestStats)> {
    let file = File::open(path).with_context(|| format!("open SAM file {}", path.display()))?;
    let mut reader = sam::io::Reader::new(BufReader::new(file));
    let header = reader.read_header().context("read SAM header")?;

    let cs_tag = Tag::new(b'c', b's');
    let mut records = Vec::new();
    let mut stats = IngestStats::default();

    for result in reader.record_bufs(&header) {
        let record = result?;
        stats.total_records += 1;

        if record.flags().is_unmapped() {
            stats.unmapped_records += 1;
            continue;
        }
        let Some(reference_sequence_id) = record.reference_sequence_id() else {
            stats.unmapped_records += 1;
            continue;
        };
        let Some(alignment_start) = record.alignment_start() else {
            stats.unmapped_records += 1;
            continue;
        };
        if record.sequence().as_ref().is_empty() {
            stats.missing_seq_records += 1;
            continue;
        }
        let cs = match record.data().get(&cs_tag) {
            Some(Value::String(s)) => String::from_utf8_lossy(s.as_ref()).into_owned(),
            _ => {
                stats.missing_cs_records += 1;
                continue;
            }
        };

        let reference_id = header
            .reference_sequences()
            .get_index(reference_sequence_id)
            .map(|(name, _)| String::from_utf8_lossy(name.as_ref()).into_owned())
            .ok_or_else(|| anyhow!("reference id {reference_sequence_id} not in header"))?;

        let read_id = record
            .name()
            .map(|n| n.to_string())
            .unwrap_or_default()
            .replace(',', "_");

        let ops = record.cigar().as_ref();
        let mut ref_len = 0u32;
        for op in ops.iter() {
            match op.kind() {
                CigarKind::Match
                | CigarKind::Deletion
                | CigarKind::Skip
                | CigarKind::SequenceMatch
                | CigarKind::SequenceMismatch => ref_len += op.len() as u32,
                // Non-reference-consuming: Ins, SoftClip, HardClip, Pad
                _ => {}
            }
        }

        // SEQ/QUAL cover soft-clipped bases; the cs tag does not. Trim the
        // clipped qualities so they stay index-aligned with the tag.
        let mut query_qualities: Vec<u8> = record.quality_scores().as_ref().to_vec();
        let (leading, trailing) = softclips(ops);
        if trailing > 0 && trailing <= query_qualities.len() {
            query_qualities.truncate(query_qualities.len() - trailing);
        }
        if leading > 0 && leading <= query_qualities.len() {
            query_qualities.drain(..leading);
        }

        records.push(AlignmentRecord {
            read_id,
            flags: record.flags().bits(),
            reference_id,
            position: alignment_start.get() as u32,
            ref_len,
            query_qualities,
            cs_tag: cs,
        });
    }

    Ok((records, stats))
}

fn softclips(ops: &[sam::alignment::record::cigar::Op]) -> (usize, usize) {
    let mut leading = 0usize;
    for op in ops.iter() {
        match op.kind() {
            CigarKind::HardClip => continue,
            CigarKind::SoftClip => leading = op.len(),
            _ => {}
        }
        break;
    }
    let mut trailing = 0usize;
    for op in ops.iter().rev() {
        match op.kind() {
            CigarKind::HardClip => continue,
            CigarKind::SoftClip => trailing = op.len(),
            _ => {}
        }
        break;
    }
    (leading, trailing)
}
