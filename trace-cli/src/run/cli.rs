use clap::{Arg, ArgAction, Command, value_parser};

use crate::common::{config_arg, output_arg};

pub const RUN_CMD: &str = "run";

pub fn create_run_cli() -> Command {
    Command::new(RUN_CMD)
        .about("Run extraction, RepeatMasker, projection, bedtools intersect, consolidation and annotation.")
        .arg_required_else_help(true)
        .arg(Arg::new("vcf").required(true).help("Input VCF (plain or gzipped)"))
        .arg(
            Arg::new("intersect")
                .long("intersect")
                .value_name("TRACK")
                .required(true)
                .help("Repeat track BED to intersect breakpoint windows with"),
        )
        .arg(
            Arg::new("lib")
                .long("lib")
                .value_name("LIB")
                .required(true)
                .help("RepeatMasker repeat library"),
        )
        .arg(output_arg("Output VCF [default: <vcf stem>_annotated.vcf]"))
        .arg(config_arg())
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Worker threads, also passed to RepeatMasker"),
        )
        .arg(
            Arg::new("keep-intermediates")
                .long("keep-intermediates")
                .action(ArgAction::SetTrue)
                .help("Keep the work directory after the run"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECS")
                .value_parser(value_parser!(u64))
                .help("Timeout for each external tool call, 0 disables it"),
        )
        .arg(
            Arg::new("retries")
                .long("retries")
                .value_name("N")
                .value_parser(value_parser!(u32))
                .help("Extra attempts for a failed external tool call"),
        )
        .arg(
            Arg::new("overwrite")
                .long("overwrite")
                .action(ArgAction::SetTrue)
                .help("Replace an existing output file"),
        )
        .arg(
            Arg::new("no-bnd-parse")
                .long("no-bnd-parse")
                .action(ArgAction::SetTrue)
                .help("Only project the local breakpoint of breakends, ignoring their mate"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .help("Also append the run log to this file"),
        )
}
