use clap::{Arg, ArgAction, Command, value_parser};

use crate::common::{config_arg, output_arg};

pub const PROJECT_CMD: &str = "project";

pub fn create_project_cli() -> Command {
    Command::new(PROJECT_CMD)
        .about("Project structural variant breakpoints into BED query windows.")
        .arg_required_else_help(true)
        .arg(Arg::new("vcf").required(true).help("Input VCF (plain or gzipped)"))
        .arg(output_arg("Output BED [default: <vcf stem>_processed.bed]"))
        .arg(config_arg())
        .arg(
            Arg::new("del-flank")
                .long("del-flank")
                .value_name("N")
                .value_parser(value_parser!(u64))
                .help("Flank added on both sides of a deletion span"),
        )
        .arg(
            Arg::new("flank-size")
                .long("flank-size")
                .value_name("N")
                .value_parser(value_parser!(u64))
                .help("Flank around each duplication and inversion breakpoint"),
        )
        .arg(
            Arg::new("bnd-flank")
                .long("bnd-flank")
                .value_name("N")
                .value_parser(value_parser!(u64))
                .help("Flank around both ends of a breakend"),
        )
        .arg(
            Arg::new("no-bnd-parse")
                .long("no-bnd-parse")
                .action(ArgAction::SetTrue)
                .help("Only project the local breakpoint of breakends, ignoring their mate"),
        )
}
