use clap::{Arg, ArgAction, Command};

use crate::common::{config_arg, output_arg};

pub const ANNOTATE_CMD: &str = "annotate";

pub fn create_annotate_cli() -> Command {
    Command::new(ANNOTATE_CMD)
        .about("Merge consolidated tables into the VCF INFO column.")
        .arg_required_else_help(true)
        .arg(Arg::new("vcf").required(true).help("Input VCF (plain or gzipped)"))
        .arg(
            Arg::new("homology")
                .long("homology")
                .value_name("TSV")
                .required(true)
                .help("Consolidated RepeatMasker table"),
        )
        .arg(
            Arg::new("intersect")
                .long("intersect")
                .value_name("TSV")
                .required(true)
                .help("Consolidated intersect table"),
        )
        .arg(output_arg("Output VCF [default: <vcf stem>_annotated.vcf]").conflicts_with("stdout"))
        .arg(
            Arg::new("stdout")
                .long("stdout")
                .action(ArgAction::SetTrue)
                .help("Write the annotated VCF to stdout"),
        )
        .arg(
            Arg::new("overwrite")
                .long("overwrite")
                .action(ArgAction::SetTrue)
                .help("Replace an existing output file"),
        )
        .arg(config_arg())
        .arg(
            Arg::new("column-name")
                .long("column-name")
                .value_name("TAG")
                .help("INFO key receiving the annotation"),
        )
}
