use std::io::BufRead;
use std::path::Path;

use log::{debug, warn};

use trace_core::errors::{Result, TraceError};
use trace_core::models::{EvidenceSource, HitEntry, RawHit, identity_from_name};
use trace_core::utils::get_dynamic_reader;

const CONTEXT: &str = "intersect";

/// chrom, start, end, name of the projected interval
const QUERY_COLUMNS: usize = 4;
/// chrom, start, end, name, family, strand, rep_start, rep_end, id of the repeat track
const TRACK_COLUMNS: usize = 9;

///
/// Convert one `bedtools intersect -wa -wb` row into an interval overlap hit.
/// A trailing overlap length column (`-wo`) is accepted and ignored.
///
/// # Arguments
/// - line: the raw, tab separated row
/// - line_number: 1-based line number used in diagnostics
///
pub fn parse_intersect_line(line: &str, line_number: usize) -> Result<RawHit> {
    let fields: Vec<&str> = line.trim_end_matches(['\n', '\r']).split('\t').collect();
    let expected = QUERY_COLUMNS + TRACK_COLUMNS;
    if fields.len() != expected && fields.len() != expected + 1 {
        return Err(TraceError::parse(
            CONTEXT,
            line_number,
            format!("expected {} or {} columns, found {}", expected, expected + 1, fields.len()),
        ));
    }

    let number = |idx: usize, name: &str| {
        fields[idx].parse::<u64>().map_err(|_| {
            TraceError::parse(
                CONTEXT,
                line_number,
                format!("invalid {} '{}'", name, fields[idx]),
            )
        })
    };

    let track = QUERY_COLUMNS;
    let entry = HitEntry {
        chrom: Some(fields[track].to_string()),
        start: number(track + 1, "repeat start coordinate")?,
        end: number(track + 2, "repeat end coordinate")?,
        repeat_name: fields[track + 3].to_string(),
        repeat_family: fields[track + 4].to_string(),
        strand: fields[track + 5].to_string(),
        rep_start: fields[track + 6].to_string(),
        rep_end: fields[track + 7].to_string(),
        rank: number(track + 8, "rank")?,
    };
    entry
        .validate()
        .map_err(|e| TraceError::parse(CONTEXT, line_number, e))?;

    let variant_id = identity_from_name(fields[3]);
    if variant_id.is_empty() {
        return Err(TraceError::parse(CONTEXT, line_number, "empty interval name"));
    }

    Ok(RawHit {
        source: EvidenceSource::IntervalOverlap,
        variant_id: variant_id.to_string(),
        entry,
    })
}

///
/// Read every hit of a bedtools intersect output. `#` header lines (from
/// `-header`) and blank lines are skipped; malformed rows are logged and skipped.
///
pub fn read_intersect<R: BufRead>(reader: R) -> Result<Vec<RawHit>> {
    let mut hits = Vec::new();
    let mut skipped = 0;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_intersect_line(&line, i + 1) {
            Ok(hit) => hits.push(hit),
            Err(e) => {
                warn!("{}; row skipped", e);
                skipped += 1;
            }
        }
    }

    debug!("Read {} intersect hits ({} rows skipped)", hits.len(), skipped);

    Ok(hits)
}

pub fn read_intersect_from_path(path: &Path) -> Result<Vec<RawHit>> {
    let reader = get_dynamic_reader(path)?;
    read_intersect(reader)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::Cursor;

    #[rstest]
    #[case("chr1\t0\t2500\tsv1#span\tchr1\t1000\t2000\tL1HS\tLINE/L1\t+\t1\t500\t2")]
    #[case("chr1\t0\t2500\tsv1#span\tchr1\t1000\t2000\tL1HS\tLINE/L1\t+\t1\t500\t2\t1000")]
    fn test_row_with_and_without_overlap(#[case] line: &str) {
        let hit = parse_intersect_line(line, 1).unwrap();

        assert_eq!(hit.variant_id, "sv1");
        assert_eq!(hit.source, EvidenceSource::IntervalOverlap);
        assert_eq!(hit.entry.to_string(), "chr1,1000,2000,L1HS,LINE/L1,+,1,500,2");
    }

    #[rstest]
    fn test_identity_recovered_from_breakend_tag() {
        let line = "chr2\t499\t500\tbnd#3#mate:FF\tchr2\t400\t700\tL2a\tLINE/L2\t-\t1\t300\t9";
        let hit = parse_intersect_line(line, 1).unwrap();
        assert_eq!(hit.variant_id, "bnd#3");
    }

    #[rstest]
    #[case("chr1\t0\t2500\tsv1#span\tchr1\t1000\t2000\tL1HS\tLINE/L1\t+\t1\t500")]
    #[case("chr1\t0\t2500\tsv1#span\tchr1\tx\t2000\tL1HS\tLINE/L1\t+\t1\t500\t2")]
    #[case("chr1\t0\t2500\tsv1#span\tchr1\t1000\t2000\tL1HS\tLINE/L1\t+\t1\t500\tfirst")]
    #[case("chr1\t0\t2500\tsv1#span\tchr1\t1000\t2000\tL1,HS\tLINE/L1\t+\t1\t500\t2")]
    fn test_malformed_rows(#[case] line: &str) {
        assert!(parse_intersect_line(line, 3).is_err());
    }

    #[rstest]
    fn test_read_skips_header() {
        let text = "#chrom\tstart\tend\tname\n\
                    chr1\t0\t2500\tsv1#span\tchr1\t1000\t2000\tL1HS\tLINE/L1\t+\t1\t500\t2\n\
                    short\trow\n";
        let hits = read_intersect(Cursor::new(text)).unwrap();
        assert_eq!(hits.len(), 1);
    }
}
