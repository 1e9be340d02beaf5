use std::io::BufRead;
use std::path::Path;

use log::{debug, warn};

use trace_core::errors::{Result, TraceError};
use trace_core::models::{EvidenceSource, HitEntry, RawHit};
use trace_core::utils::get_dynamic_reader;

const CONTEXT: &str = "RepeatMasker";
const MIN_COLUMNS: usize = 15;

fn is_header(parts: &[&str]) -> bool {
    matches!(parts.first(), Some(&"SW") | Some(&"score"))
}

///
/// Convert one data row of a RepeatMasker `.out` table into a homology hit.
///
/// # Arguments
/// - line: the raw row
/// - line_number: 1-based line number used in diagnostics
///
pub fn parse_out_line(line: &str, line_number: usize) -> Result<RawHit> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < MIN_COLUMNS {
        return Err(TraceError::parse(
            CONTEXT,
            line_number,
            format!("expected at least {} columns, found {}", MIN_COLUMNS, parts.len()),
        ));
    }

    let number = |idx: usize, name: &str| {
        parts[idx].parse::<u64>().map_err(|_| {
            TraceError::parse(
                CONTEXT,
                line_number,
                format!("invalid {} '{}'", name, parts[idx]),
            )
        })
    };

    let query_begin = number(5, "query begin")?;
    let query_end = number(6, "query end")?;
    let rank = number(14, "ID")?;

    // complement rows list (left), end, begin in the repeat coordinate columns
    let (strand, rep_start, rep_end) = match parts[8] {
        "+" => ("+", parts[11], parts[12]),
        "C" | "-" => ("-", parts[12], parts[13]),
        other => {
            return Err(TraceError::parse(
                CONTEXT,
                line_number,
                format!("invalid strand '{}'", other),
            ));
        }
    };
    let strip = |s: &str| s.trim_start_matches('(').trim_end_matches(')').to_string();

    let entry = HitEntry {
        chrom: None,
        start: query_begin.saturating_sub(1),
        end: query_end,
        repeat_name: parts[9].to_string(),
        repeat_family: parts[10].to_string(),
        strand: strand.to_string(),
        rep_start: strip(rep_start),
        rep_end: strip(rep_end),
        rank,
    };
    entry
        .validate()
        .map_err(|e| TraceError::parse(CONTEXT, line_number, e))?;

    Ok(RawHit {
        source: EvidenceSource::SequenceHomology,
        variant_id: parts[4].to_string(),
        entry,
    })
}

///
/// Read every hit of a RepeatMasker `.out` table. Header rows, blank rows and
/// the "no repetitive sequences" notice are skipped; malformed rows are
/// logged and skipped.
///
pub fn read_out<R: BufRead>(reader: R) -> Result<Vec<RawHit>> {
    let mut hits = Vec::new();
    let mut skipped = 0;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() || is_header(&parts) || line.contains("no repetitive sequences") {
            continue;
        }

        match parse_out_line(&line, i + 1) {
            Ok(hit) => hits.push(hit),
            Err(e) => {
                warn!("{}; row skipped", e);
                skipped += 1;
            }
        }
    }

    debug!("Read {} RepeatMasker hits ({} rows skipped)", hits.len(), skipped);

    Ok(hits)
}

pub fn read_out_from_path(path: &Path) -> Result<Vec<RawHit>> {
    let reader = get_dynamic_reader(path)?;
    read_out(reader)
}
