use csvtag_rs::{
    AlignmentRecord, aligned_reference_length, remove_overlapped_alignments, softclip_lengths,
};

fn rec(pos: u32, cigar: &str, cs_tag: &str) -> AlignmentRecord {
    AlignmentRecord {
        read_id: "read1".to_string(),
        flags: 0,
        reference_id: "chr1".to_string(),
        position: pos,
        ref_len: aligned_reference_length(cigar),
        query_qualities: Vec::new(),
        cs_tag: cs_tag.to_string(),
    }
}

fn tags(records: &[AlignmentRecord]) -> Vec<&str> {
    records.iter().map(|r| r.cs_tag.as_str()).collect()
}

#[test]
fn aligned_reference_length_counts_reference_consuming_ops() {
    assert_eq!(aligned_reference_length("10M"), 10);
    assert_eq!(aligned_reference_length("10M5I10M"), 20);
    assert_eq!(aligned_reference_length("5M3D2M"), 10);
    assert_eq!(aligned_reference_length("5S10M4S"), 10);
    assert_eq!(aligned_reference_length("2M5N2M"), 9);
}

#[test]
fn softclip_lengths_cases() {
    assert_eq!(softclip_lengths("2S7M"), (2, 0));
    assert_eq!(softclip_lengths("7M2S"), (0, 2));
    assert_eq!(softclip_lengths("2S5M2S"), (2, 2));
    assert_eq!(softclip_lengths("9M"), (0, 0));
    assert_eq!(softclip_lengths("1S8M"), (1, 0));
    assert_eq!(softclip_lengths("3H2S5M"), (2, 0));
    assert_eq!(softclip_lengths("5M2S3H"), (0, 2));
}

#[test]
fn contained_next_is_dropped() {
    // 10M at 1 spans [0, 10); 5M at 1 spans [0, 5): fully contained.
    let cluster = vec![rec(1, "10M", "=ACTGACTGAC"), rec(1, "5M", "=ACTGA")];
    assert_eq!(tags(&remove_overlapped_alignments(&cluster)), ["=ACTGACTGAC"]);
}

#[test]
fn contained_at_tail_is_dropped() {
    // 5M at 6 spans [5, 10), inside [0, 10).
    let cluster = vec![rec(1, "10M", "=ACTGACTGAC"), rec(6, "5M", "=CTGAC")];
    assert_eq!(tags(&remove_overlapped_alignments(&cluster)), ["=ACTGACTGAC"]);
}

#[test]
fn partial_overlap_is_kept() {
    // 5M at 7 spans [6, 11): pokes one base past [0, 10).
    let cluster = vec![rec(1, "10M", "=ACTGACTGAC"), rec(7, "5M", "=TGACT")];
    assert_eq!(
        tags(&remove_overlapped_alignments(&cluster)),
        ["=ACTGACTGAC", "=TGACT"]
    );
}

#[test]
fn containment_in_either_direction_keeps_the_longer_span() {
    // The shorter record comes first; the longer one must still win.
    let cluster = vec![rec(1, "5M", "=ACTGA"), rec(1, "10M", "=ACTGACTGAC")];
    assert_eq!(tags(&remove_overlapped_alignments(&cluster)), ["=ACTGACTGAC"]);
}

#[test]
fn equal_spans_keep_the_earlier_record() {
    let cluster = vec![rec(1, "10M", "=ACTGACTGAC"), rec(1, "10M", "=TGCATGCATG")];
    assert_eq!(tags(&remove_overlapped_alignments(&cluster)), ["=ACTGACTGAC"]);
}

#[test]
fn insertion_does_not_extend_the_reference_span() {
    // 10M5I10M spans [0, 20); 5M at 11 spans [10, 15): contained.
    let cluster = vec![rec(1, "10M5I10M", "=ACTGACTGACACTGACTGAC"), rec(11, "5M", "=ACTGA")];
    assert_eq!(
        tags(&remove_overlapped_alignments(&cluster)),
        ["=ACTGACTGACACTGACTGAC"]
    );

    // 15M at 11 spans [10, 25): reaches past [0, 20), both kept.
    let cluster = vec![
        rec(1, "10M5I10M", "=ACTGACTGACACTGACTGAC"),
        rec(11, "15M", "=ACTGACTGACACTGA"),
    ];
    assert_eq!(remove_overlapped_alignments(&cluster).len(), 2);
}

#[test]
fn exact_duplicates_are_removed() {
    let cluster = vec![rec(1, "5M", "=ACTGA"), rec(1, "5M", "=ACTGA")];
    assert_eq!(tags(&remove_overlapped_alignments(&cluster)), ["=ACTGA"]);
}

#[test]
fn microhomologic_neighbors_are_untouched() {
    // Partial overlap without containment is the trimmer's business.
    let cluster = vec![rec(1, "5M", "=ACTGA"), rec(3, "5M", "=GACCT")];
    assert_eq!(remove_overlapped_alignments(&cluster).len(), 2);
}
