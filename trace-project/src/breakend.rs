use regex::Regex;

use trace_core::errors::{Result, TraceError};
use trace_core::models::BreakendOrientation;

///
/// Mate coordinates recovered from a breakend ALT allele.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Breakend {
    pub mate_chrom: String,
    /// 1-based mate position, as written in the allele
    pub mate_pos: u64,
    pub orientation: BreakendOrientation,
}

///
/// Parser for the four bracketed mate notations of VCF breakends:
/// `t[p[`, `t]p]`, `]p]t` and `[p[t`.
///
#[derive(Debug, Clone)]
pub struct BreakendParser {
    /// sequence first, brackets after: `t[p[` and `t]p]`
    trailing: Regex,
    /// brackets first, sequence after: `]p]t` and `[p[t`
    leading: Regex,
}

impl BreakendParser {
    pub fn new() -> Result<Self> {
        let trailing = Regex::new(
            r"^(?P<seq>[ACGTNacgtn.]+)(?P<open>[\[\]])(?P<chrom>[^:\[\]]+):(?P<pos>\d+)(?P<close>[\[\]])$",
        )
        .map_err(|e| TraceError::Regex(e.to_string()))?;
        let leading = Regex::new(
            r"^(?P<open>[\[\]])(?P<chrom>[^:\[\]]+):(?P<pos>\d+)(?P<close>[\[\]])(?P<seq>[ACGTNacgtn.]+)$",
        )
        .map_err(|e| TraceError::Regex(e.to_string()))?;

        Ok(BreakendParser { trailing, leading })
    }

    ///
    /// Parse a breakend allele. Returns `None` when the allele matches none of
    /// the four grammars, including mismatched bracket pairs.
    ///
    pub fn parse(&self, alt: &str) -> Option<Breakend> {
        let (caps, sequence_first) = match self.trailing.captures(alt) {
            Some(caps) => (caps, true),
            None => (self.leading.captures(alt)?, false),
        };

        let bracket = &caps["open"];
        if bracket != &caps["close"] {
            return None;
        }

        let orientation = match (sequence_first, bracket) {
            (true, "[") => BreakendOrientation::ForwardForward,
            (true, _) => BreakendOrientation::ForwardReverse,
            (false, "]") => BreakendOrientation::ReverseForward,
            (false, _) => BreakendOrientation::ReverseReverse,
        };

        Some(Breakend {
            mate_chrom: caps["chrom"].to_string(),
            mate_pos: caps["pos"].parse().ok()?,
            orientation,
        })
    }
}
