//! The cs-tag grammar engine.
//!
//! A long-form cs tag encodes how an aligned read differs from the reference
//! as a run of operator-prefixed tokens: `=SEQ` (match), `:N` (match with
//! bases elided), `*ab` (substitution, reference then query base), `+SEQ`
//! (insertion), `-SEQ` (deletion) and `~ab N cd` (splice: two 2-base anchors
//! flanking a reference skip of N bases). On top of the base grammar this
//! engine uses lowercase runs (`=aa`, `*ga`, ...) to mark segments that have
//! been reverse-complemented to express an inversion.
//!
//! Everything in this module is pure and stateless; grammar patterns are
//! compiled once into process-wide constants.

use crate::error::{CsvTagError, Result};
use regex::Regex;
use std::sync::LazyLock;

// One alternative per grammar token. Uppercase variants first, then the
// lowercase (inversion-marked) variants. Tokenization demands that matches
// tile the whole input; any gap is a malformed tag.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"=[ACGTN]+|:[0-9]+|\*[ACGTN][ACGTN]|\+[ACGTN]+|-[ACGTN]+|~[ACGTN]{2}[0-9]+[ACGTN]{2}|~[acgtn]{2}[0-9]+[acgtn]{2}|\*[acgtn][acgtn]|[=+-][acgtn]+",
    )
    .unwrap()
});

/// One parsed grammar token. Borrowed views into the tag string; produced
/// and consumed only inside this module.
enum CsToken<'a> {
    Match(&'a str),
    GapMatch(u32),
    Substitution(u8, u8),
    Insertion(&'a str),
    Deletion(&'a str),
    Splice {
        left: &'a str,
        skip: u32,
        right: &'a str,
    },
}

fn malformed(tag: &str, position: usize) -> CsvTagError {
    CsvTagError::MalformedTag {
        tag: tag.to_string(),
        position,
    }
}

fn parse_token<'a>(token: &'a str) -> Result<CsToken<'a>> {
    let bytes = token.as_bytes();
    match bytes.first() {
        Some(b'=') => Ok(CsToken::Match(&token[1..])),
        Some(b':') => {
            let count: u32 = token[1..].parse().map_err(|_| malformed(token, 1))?;
            Ok(CsToken::GapMatch(count))
        }
        Some(b'*') if bytes.len() == 3 => Ok(CsToken::Substitution(bytes[1], bytes[2])),
        Some(b'+') => Ok(CsToken::Insertion(&token[1..])),
        Some(b'-') => Ok(CsToken::Deletion(&token[1..])),
        Some(b'~') if bytes.len() >= 6 => {
            let skip: u32 = token[3..token.len() - 2]
                .parse()
                .map_err(|_| malformed(token, 3))?;
            Ok(CsToken::Splice {
                left: &token[1..3],
                skip,
                right: &token[token.len() - 2..],
            })
        }
        _ => Err(malformed(token, 0)),
    }
}

fn complement(base: u8) -> Result<u8> {
    Ok(match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        b'N' => b'N',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' => b'a',
        b'n' => b'n',
        other => return Err(CsvTagError::UnknownBase { base: other as char }),
    })
}

/// Complement every base of `seq` and reverse the result into `out`.
fn push_revcomp_bases(out: &mut String, seq: &str) -> Result<()> {
    for &base in seq.as_bytes().iter().rev() {
        out.push(complement(base)? as char);
    }
    Ok(())
}

/// Split a cs tag into its maximal grammar tokens.
///
/// Fails with [`CsvTagError::MalformedTag`] when any input byte is not
/// consumed by a token.
///
/// # Examples
///
/// ```
/// let tokens = csvtag_rs::split_by_tag(":4*AG:3").unwrap();
/// assert_eq!(tokens, vec![":4", "*AG", ":3"]);
/// ```
pub fn split_by_tag(csv_tag: &str) -> Result<Vec<&str>> {
    let mut tokens = Vec::new();
    let mut last_end = 0;
    for found in TOKEN_PATTERN.find_iter(csv_tag) {
        if found.start() != last_end {
            return Err(malformed(csv_tag, last_end));
        }
        tokens.push(found.as_str());
        last_end = found.end();
    }
    if last_end != csv_tag.len() {
        return Err(malformed(csv_tag, last_end));
    }
    Ok(tokens)
}

/// Split a cs tag into alternating plus-strand and inverted pieces.
///
/// Consecutive lowercase (inverted) tokens are joined into a single piece:
///
/// ```
/// let pieces = csvtag_rs::split_by_inversion("=AA=aa*ga=a=TT").unwrap();
/// assert_eq!(pieces, vec!["=AA", "=aa*ga=a", "=TT"]);
/// ```
pub fn split_by_inversion(csv_tag: &str) -> Result<Vec<String>> {
    let mut pieces = Vec::new();
    let mut inversion_run = String::new();
    for token in split_by_tag(csv_tag)? {
        if token.ends_with(|c: char| c.is_ascii_lowercase()) {
            inversion_run.push_str(token);
        } else {
            if !inversion_run.is_empty() {
                pieces.push(std::mem::take(&mut inversion_run));
            }
            pieces.push(token.to_string());
        }
    }
    if !inversion_run.is_empty() {
        pieces.push(inversion_run);
    }
    Ok(pieces)
}

/// Expand one token into single-reference-base units.
///
/// Substitutions stay whole; elided matches and splice skips become `=N`
/// placeholders, one per skipped reference base.
fn expand_single(token: &str) -> Result<Vec<String>> {
    Ok(match parse_token(token)? {
        CsToken::Substitution(..) => vec![token.to_string()],
        CsToken::Match(seq) => seq.chars().map(|c| format!("={c}")).collect(),
        CsToken::Deletion(seq) => seq.chars().map(|c| format!("-{c}")).collect(),
        CsToken::Insertion(seq) => seq.chars().map(|c| format!("+{c}")).collect(),
        CsToken::GapMatch(count) => vec!["=N".to_string(); count as usize],
        CsToken::Splice { skip, .. } => vec!["=N".to_string(); skip as usize],
    })
}

/// Normalize a long-form cs tag to single-reference-base granularity.
///
/// Multi-base tokens expand to one token per reference base. An insertion
/// run is expanded into `+c` units and fused with the first unit of the
/// following token, joined by `|` separators; the following token's
/// remaining units keep their own slots.
///
/// ```
/// let split = csvtag_rs::split_by_nucleotide("=A+TTT=CC-AA=T*AG=T").unwrap();
/// assert_eq!(
///     split,
///     vec!["=A", "+T|+T|+T|=C", "=C", "-A", "-A", "=T", "*AG", "=T"],
/// );
/// ```
pub fn split_by_nucleotide(csv_tag: &str) -> Result<Vec<String>> {
    let tokens = split_by_tag(csv_tag)?;
    let mut out: Vec<String> = Vec::new();
    let mut idx = 0;
    while idx < tokens.len() {
        let token = tokens[idx];
        match parse_token(token)? {
            CsToken::Substitution(..) => out.push(token.to_string()),
            CsToken::Insertion(seq) => {
                let mut fused: Vec<String> = seq.chars().map(|c| format!("+{c}")).collect();
                idx += 1;
                if idx < tokens.len() {
                    let mut expansion = expand_single(tokens[idx])?;
                    if !expansion.is_empty() {
                        fused.push(expansion.remove(0));
                    }
                    out.push(fused.join("|"));
                    out.append(&mut expansion);
                } else {
                    // Trailing insertion: nothing to fuse with.
                    out.push(fused.join("|"));
                }
            }
            _ => out.append(&mut expand_single(token)?),
        }
        idx += 1;
    }
    Ok(out)
}

/// Case class of a token's payload; uppercase and lowercase runs must not
/// merge into one token, or the result would no longer tokenize.
fn is_lowercase_unit(unit: &str) -> bool {
    unit.chars()
        .find(|c| c.is_ascii_alphabetic())
        .is_some_and(|c| c.is_ascii_lowercase())
}

/// Recombine single-base tokens into a long-form cs tag.
///
/// Strict inverse of [`split_by_nucleotide`] for long-form tags: `|`-joined
/// insertion fusions are taken apart first, then consecutive tokens sharing
/// a `=`/`-`/`+` operator and case merge into one run. Substitutions are
/// never merged; each keeps its own two-character literal.
///
/// ```
/// let parts = ["=A", "+T|+T|+T|=C", "=C", "-A", "-A", "=T", "*AG", "=T", "=T"];
/// assert_eq!(csvtag_rs::combine_splitted_tags(parts), "=A+TTT=CC-AA=T*AG=TT");
/// ```
///
/// # Panics
///
/// Passing an empty token sequence (or an empty token) is a programmer
/// error and panics.
pub fn combine_splitted_tags<I, S>(splitted: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut units: Vec<String> = Vec::new();
    for part in splitted {
        let part = part.as_ref();
        assert!(!part.is_empty(), "combine_splitted_tags: empty token");
        if part.starts_with('+') {
            units.extend(part.split('|').map(str::to_string));
        } else {
            units.push(part.to_string());
        }
    }
    assert!(!units.is_empty(), "combine_splitted_tags: no tokens");

    let mut combined = String::new();
    let mut prev_prefix = units[0].as_bytes()[0];
    let mut prev_lower = is_lowercase_unit(&units[0]);
    let mut run = units[0][1..].to_string();
    for unit in &units[1..] {
        let prefix = unit.as_bytes()[0];
        let lower = is_lowercase_unit(unit);
        let mergeable = matches!(prefix, b'=' | b'-' | b'+');
        if prefix == prev_prefix && mergeable && lower == prev_lower {
            run.push_str(&unit[1..]);
        } else if prefix == prev_prefix && !mergeable {
            // Substitutions (and `:`/`~` tokens) sit side by side, operator kept.
            run.push_str(unit);
        } else {
            combined.push(prev_prefix as char);
            combined.push_str(&run);
            prev_prefix = prefix;
            prev_lower = lower;
            run = unit[1..].to_string();
        }
    }
    combined.push(prev_prefix as char);
    combined.push_str(&run);
    combined
}

/// Reverse-complement a cs tag.
///
/// Token order is reversed; match/insertion/deletion runs are complemented
/// base by base and reversed; a substitution complements both of its bases
/// in place; a splice keeps its skip length while its anchors swap sides,
/// each complemented and reversed. Case is preserved.
///
/// ```
/// assert_eq!(csvtag_rs::revcomp("=AA=aa*ga=a=AA").unwrap(), "=TT=t*ct=tt=TT");
/// ```
pub fn revcomp(csv_tag: &str) -> Result<String> {
    let tokens = split_by_tag(csv_tag)?;
    let mut out = String::with_capacity(csv_tag.len());
    for token in tokens.iter().rev() {
        match parse_token(token)? {
            CsToken::GapMatch(_) => out.push_str(token),
            CsToken::Substitution(reference, query) => {
                out.push('*');
                out.push(complement(reference)? as char);
                out.push(complement(query)? as char);
            }
            CsToken::Splice { left, skip, right } => {
                out.push('~');
                push_revcomp_bases(&mut out, right)?;
                out.push_str(&skip.to_string());
                push_revcomp_bases(&mut out, left)?;
            }
            CsToken::Match(seq) | CsToken::Insertion(seq) | CsToken::Deletion(seq) => {
                out.push(token.as_bytes()[0] as char);
                push_revcomp_bases(&mut out, seq)?;
            }
        }
    }
    Ok(out)
}

/// Reconstruct the query-consuming sequence encoded by a cs tag.
///
/// Lowercase (inverted) runs are reverse-complemented back to read
/// orientation first, so the result is the bases actually present in the
/// read. Matches and insertions contribute their literal bases, a
/// substitution contributes its query base; deletions, splices and elided
/// matches contribute nothing.
///
/// ```
/// assert_eq!(csvtag_rs::to_sequence("=AA=aa*ga=a=AA").unwrap(), "AAttttAA");
/// ```
pub fn to_sequence(csv_tag: &str) -> Result<String> {
    let mut corrected = String::with_capacity(csv_tag.len());
    for piece in split_by_inversion(csv_tag)? {
        if piece.ends_with(|c: char| c.is_ascii_lowercase()) {
            corrected.push_str(&revcomp(&piece)?);
        } else {
            corrected.push_str(&piece);
        }
    }

    let mut sequence = String::new();
    for token in split_by_tag(&corrected)? {
        match parse_token(token)? {
            CsToken::Match(seq) | CsToken::Insertion(seq) => sequence.push_str(seq),
            CsToken::Substitution(_, query) => sequence.push(query as char),
            _ => {}
        }
    }
    Ok(sequence)
}
