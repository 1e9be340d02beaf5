use clap::{Arg, Command, value_parser};

use crate::common::{config_arg, output_arg};

pub const EXTRACT_CMD: &str = "extract";

pub fn create_extract_cli() -> Command {
    Command::new(EXTRACT_CMD)
        .about("Write the inserted sequence of insertion records to FASTA.")
        .arg_required_else_help(true)
        .arg(Arg::new("vcf").required(true).help("Input VCF (plain or gzipped)"))
        .arg(output_arg("Output FASTA [default: <vcf stem>_INS.fasta]"))
        .arg(config_arg())
        .arg(
            Arg::new("min-length")
                .long("min-length")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Skip sequences shorter than this"),
        )
        .arg(
            Arg::new("max-length")
                .long("max-length")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Skip sequences longer than this"),
        )
}
