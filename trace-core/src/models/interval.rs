use std::fmt::{self, Display};
use std::str::FromStr;

use crate::consts::NAME_TAG_SEP;

///
/// Join orientation of a breakend, named after the two strands being joined.
///
/// | ALT        | orientation |
/// |------------|-------------|
/// | `t[p[`     | FF          |
/// | `t]p]`     | FR          |
/// | `]p]t`     | RF          |
/// | `[p[t`     | RR          |
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BreakendOrientation {
    ForwardForward,
    ForwardReverse,
    ReverseForward,
    ReverseReverse,
}

impl BreakendOrientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakendOrientation::ForwardForward => "FF",
            BreakendOrientation::ForwardReverse => "FR",
            BreakendOrientation::ReverseForward => "RF",
            BreakendOrientation::ReverseReverse => "RR",
        }
    }
}

impl FromStr for BreakendOrientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FF" => Ok(BreakendOrientation::ForwardForward),
            "FR" => Ok(BreakendOrientation::ForwardReverse),
            "RF" => Ok(BreakendOrientation::ReverseForward),
            "RR" => Ok(BreakendOrientation::ReverseReverse),
            _ => Err(format!("Unknown breakend orientation: {}", s)),
        }
    }
}

impl Display for BreakendOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

///
/// What part of a variant a projected interval stands for.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntervalTag {
    /// the whole deleted span
    Span,
    LeftJunction,
    RightJunction,
    LocalBreakend(BreakendOrientation),
    MateBreakend(BreakendOrientation),
}

impl Display for IntervalTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntervalTag::Span => write!(f, "span"),
            IntervalTag::LeftJunction => write!(f, "left"),
            IntervalTag::RightJunction => write!(f, "right"),
            IntervalTag::LocalBreakend(o) => write!(f, "local:{}", o),
            IntervalTag::MateBreakend(o) => write!(f, "mate:{}", o),
        }
    }
}

impl FromStr for IntervalTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("local", o)) => Ok(IntervalTag::LocalBreakend(o.parse()?)),
            Some(("mate", o)) => Ok(IntervalTag::MateBreakend(o.parse()?)),
            None if s == "span" => Ok(IntervalTag::Span),
            None if s == "left" => Ok(IntervalTag::LeftJunction),
            None if s == "right" => Ok(IntervalTag::RightJunction),
            _ => Err(format!("Unknown interval tag: {}", s)),
        }
    }
}

///
/// A 0-based, half-open query region projected from one variant.
///
/// `variant_id` is only a join key back to the owning record.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub tag: IntervalTag,
    pub variant_id: String,
}

impl Interval {
    pub fn width(&self) -> u64 {
        self.end - self.start
    }

    ///
    /// BED name column: `<id>#<tag>`
    ///
    pub fn name(&self) -> String {
        format!("{}{}{}", self.variant_id, NAME_TAG_SEP, self.tag)
    }

    ///
    /// Get the four column BED line of the interval
    ///
    pub fn as_bed_line(&self) -> String {
        format!("{}\t{}\t{}\t{}", self.chrom, self.start, self.end, self.name())
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_bed_line())
    }
}

///
/// Recover the variant identity from a BED name column. Names without a tag
/// are returned whole.
///
pub fn identity_from_name(name: &str) -> &str {
    match name.rsplit_once(NAME_TAG_SEP) {
        Some((id, tag)) if IntervalTag::from_str(tag).is_ok() => id,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(IntervalTag::Span)]
    #[case(IntervalTag::RightJunction)]
    #[case(IntervalTag::MateBreakend(BreakendOrientation::ReverseForward))]
    fn test_tag_text_parses_back(#[case] tag: IntervalTag) {
        assert_eq!(tag.to_string().parse::<IntervalTag>().unwrap(), tag);
    }

    #[rstest]
    fn test_bed_line() {
        let interval = Interval {
            chrom: "chr2".to_string(),
            start: 499,
            end: 500,
            tag: IntervalTag::MateBreakend(BreakendOrientation::ForwardForward),
            variant_id: "bnd_1".to_string(),
        };
        assert_eq!(interval.as_bed_line(), "chr2\t499\t500\tbnd_1#mate:FF");
        assert_eq!(interval.width(), 1);
    }

    #[rstest]
    #[case("sv1#span", "sv1")]
    #[case("sv1#local:RR", "sv1")]
    #[case("Sniffles2.DEL.3", "Sniffles2.DEL.3")]
    #[case("odd#name#left", "odd#name")]
    #[case("plain#hash", "plain#hash")]
    fn test_identity_from_name(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(identity_from_name(name), expected);
    }
}
