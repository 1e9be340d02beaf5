use clap::{Arg, Command};

use crate::common::{config_arg, output_arg};

pub const SQUASH_CMD: &str = "squash";

pub const HOMOLOGY: &str = "homology";
pub const INTERSECT: &str = "intersect";

pub fn create_squash_cli() -> Command {
    Command::new(SQUASH_CMD)
        .about("Consolidate raw repeat hits into one value per variant.")
        .arg_required_else_help(true)
        .arg(
            Arg::new("source")
                .required(true)
                .value_parser([HOMOLOGY, INTERSECT])
                .help("homology: RepeatMasker .out, intersect: bedtools intersect output"),
        )
        .arg(
            Arg::new("input")
                .required(true)
                .help("Raw hits, or an already consolidated table"),
        )
        .arg(output_arg("Output TSV [default: <input stem>_squashed.tsv]"))
        .arg(
            Arg::new("vcf")
                .long("vcf")
                .value_name("VCF")
                .help("Give zero-hit variants routed to this source a sentinel row and reject unknown identities"),
        )
        .arg(config_arg())
}
