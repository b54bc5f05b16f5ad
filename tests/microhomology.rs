use csvtag_rs::{
    AlignmentRecord, QualityMode, aligned_reference_length, microhomology_length,
    remove_microhomology, to_sequence,
};

fn rec(pos: u32, cigar: &str, cs_tag: &str, qualities: &[u8]) -> AlignmentRecord {
    AlignmentRecord {
        read_id: "read1".to_string(),
        flags: 0,
        reference_id: "chr1".to_string(),
        position: pos,
        ref_len: aligned_reference_length(cigar),
        query_qualities: qualities.to_vec(),
        cs_tag: cs_tag.to_string(),
    }
}

fn tags(records: &[AlignmentRecord]) -> Vec<&str> {
    records.iter().map(|r| r.cs_tag.as_str()).collect()
}

// ── microhomology_length ─────────────────────────────────────────────────────

#[test]
fn microhomology_length_strict_cases() {
    let cases: &[(&str, &str, &[u8], &[u8], usize)] = &[
        ("AAAA", "GGGG", b"!!!!", b"!!!!", 0),
        ("AAGG", "GGCC", b"!!!!", b"!!!!", 2),
        ("AGCT", "AGCT", b"!!!!", b"!!!!", 4),
        ("TAGCT", "AGCT", b"!!!!!", b"!!!!", 4),
        ("TAGCT", "AGCTA", b"!!!!!", b"!!!!!", 4),
        // Sequence agrees but the qualities do not.
        ("AAAA", "AAAA", b"!!!!", b"@@@@", 0),
        ("AAAA", "AAAA", b"!!!!", b"!!@@", 2),
    ];
    for &(curr, next, curr_qual, next_qual, expected) in cases {
        assert_eq!(
            microhomology_length(curr, next, curr_qual, next_qual, QualityMode::Strict),
            expected,
            "strict microhomology of {curr:?} / {next:?}"
        );
    }
}

#[test]
fn microhomology_length_lenient_ignores_qualities() {
    assert_eq!(
        microhomology_length("AAAA", "AAAA", b"!!!!", b"@@@@", QualityMode::Lenient),
        4
    );
}

// ── remove_microhomology ─────────────────────────────────────────────────────

#[test]
fn trims_shared_boundary_from_the_next_segment() {
    let mut cluster = vec![
        rec(1, "6M", "=AAATTT", b"IIIIII"),
        rec(4, "6M", "=TTTCCC", b"IIIIII"),
    ];
    remove_microhomology(&mut cluster, QualityMode::Lenient).unwrap();
    assert_eq!(tags(&cluster), ["=AAATTT", "=CCC"]);
}

#[test]
fn trims_with_unequal_segment_lengths() {
    let mut cluster = vec![
        rec(1, "9M", "=AAATTTGGG", b"IIIIIIIII"),
        rec(7, "6M", "=GGGCCC", b"IIIIII"),
    ];
    remove_microhomology(&mut cluster, QualityMode::Lenient).unwrap();
    assert_eq!(tags(&cluster), ["=AAATTTGGG", "=CCC"]);
}

#[test]
fn no_shared_boundary_means_no_trim() {
    let mut cluster = vec![
        rec(1, "6M", "=AAATTT", b"IIIIII"),
        rec(7, "6M", "=CCCGGG", b"IIIIII"),
    ];
    remove_microhomology(&mut cluster, QualityMode::Lenient).unwrap();
    assert_eq!(tags(&cluster), ["=AAATTT", "=CCCGGG"]);
}

#[test]
fn the_more_mutated_side_is_trimmed() {
    // Shared query suffix/prefix "TTT": the left copy carries a
    // substitution in the window, the right copy is all exact matches,
    // so the left side loses its three boundary tokens.
    let mut cluster = vec![
        rec(1, "6M", "=AAAT*CT=T", b"IIIIII"),
        rec(4, "6M", "=TTTCCC", b"IIIIII"),
    ];
    remove_microhomology(&mut cluster, QualityMode::Lenient).unwrap();
    assert_eq!(tags(&cluster), ["=AAA", "=TTTCCC"]);
}

#[test]
fn strict_mode_blocks_a_trim_when_qualities_disagree() {
    let mut lenient = vec![
        rec(1, "4M", "=AAAA", b"IIII"),
        rec(5, "4M", "=AAAA", b"!!!!"),
    ];
    remove_microhomology(&mut lenient, QualityMode::Lenient).unwrap();
    // Whole-tag homology: the right copy is consumed entirely.
    assert_eq!(tags(&lenient), ["=AAAA"]);

    let mut strict = vec![
        rec(1, "4M", "=AAAA", b"IIII"),
        rec(5, "4M", "=AAAA", b"!!!!"),
    ];
    remove_microhomology(&mut strict, QualityMode::Strict).unwrap();
    assert_eq!(tags(&strict), ["=AAAA", "=AAAA"]);
}

#[test]
fn trimming_shortens_the_trimmed_side_by_the_overlap() {
    let mut cluster = vec![
        rec(1, "6M", "=AAATTT", b"IIIIII"),
        rec(4, "6M", "=TTTCCC", b"IIIIII"),
    ];
    let curr_len = to_sequence("=AAATTT").unwrap().len();
    let next_len = to_sequence("=TTTCCC").unwrap().len();
    remove_microhomology(&mut cluster, QualityMode::Lenient).unwrap();

    let trimmed_len = to_sequence(&cluster[1].cs_tag).unwrap().len();
    let k = next_len - trimmed_len;
    assert_eq!(k, 3);
    assert!(k <= curr_len.min(next_len));
    // The untrimmed side is untouched.
    assert_eq!(to_sequence(&cluster[0].cs_tag).unwrap().len(), curr_len);
}

#[test]
fn single_segment_clusters_are_untouched() {
    let mut cluster = vec![rec(1, "6M", "=AAATTT", b"IIIIII")];
    remove_microhomology(&mut cluster, QualityMode::Lenient).unwrap();
    assert_eq!(tags(&cluster), ["=AAATTT"]);
}
