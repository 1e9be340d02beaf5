mod annotate;
mod common;
mod extract;
mod logging;
mod project;
mod run;
mod squash;

use anyhow::Result;
use clap::{Arg, ArgAction, Command};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "trace";
    pub const BIN_NAME: &str = "trace";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .about("Annotate structural variant calls with transposable element evidence from RepeatMasker and repeat track intersections.")
        .subcommand_required(true)
        .arg(
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log per-record detail"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .global(true)
                .action(ArgAction::SetTrue)
                .conflicts_with("debug")
                .help("Only log warnings and errors"),
        )
        .subcommand(project::cli::create_project_cli())
        .subcommand(extract::cli::create_extract_cli())
        .subcommand(squash::cli::create_squash_cli())
        .subcommand(annotate::cli::create_annotate_cli())
        .subcommand(run::cli::create_run_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    logging::init_logging(&matches)?;

    match matches.subcommand() {
        //
        // PROJECT
        //
        Some((project::cli::PROJECT_CMD, matches)) => {
            project::handlers::run_project(matches)?;
        }

        //
        // EXTRACT
        //
        Some((extract::cli::EXTRACT_CMD, matches)) => {
            extract::handlers::run_extract(matches)?;
        }

        //
        // SQUASH
        //
        Some((squash::cli::SQUASH_CMD, matches)) => {
            squash::handlers::run_squash(matches)?;
        }

        //
        // ANNOTATE
        //
        Some((annotate::cli::ANNOTATE_CMD, matches)) => {
            annotate::handlers::run_annotate(matches)?;
        }

        //
        // RUN
        //
        Some((run::cli::RUN_CMD, matches)) => {
            run::handlers::run_pipeline(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_parser_is_consistent() {
        build_parser().debug_assert();
    }

    #[rstest]
    fn test_global_flags_after_subcommand() {
        let matches = build_parser()
            .try_get_matches_from(["trace", "project", "in.vcf", "--debug"])
            .unwrap();
        assert!(matches.get_flag("debug"));
        assert_eq!(matches.subcommand_name(), Some(project::cli::PROJECT_CMD));
    }

    #[rstest]
    fn test_debug_and_quiet_conflict() {
        assert!(
            build_parser()
                .try_get_matches_from(["trace", "--debug", "--quiet", "project", "in.vcf"])
                .is_err()
        );
    }
}
