mod classify;
mod coverage;
mod regioncount;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "trax";
    pub const BIN_NAME: &str = "trax";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Batch utilities for genomic alignment post-processing: coverage tracks, feature-type classification, and region-level read counts.")
        .subcommand_required(true)
        .subcommand(coverage::cli::create_coverage_cli())
        .subcommand(classify::cli::create_classify_cli())
        .subcommand(regioncount::cli::create_regioncount_cli())
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // COVERAGE
        //
        Some((coverage::cli::COVERAGE_CMD, matches)) => {
            coverage::handlers::run_coverage(matches)?;
        }

        //
        // CLASSIFY
        //
        Some((classify::cli::CLASSIFY_CMD, matches)) => {
            classify::handlers::run_classify(matches)?;
        }

        //
        // REGION COUNTS
        //
        Some((regioncount::cli::REGIONCOUNT_CMD, matches)) => {
            regioncount::handlers::run_regioncount(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
