use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::ArgMatches;

use trax_core::policy::{StrandFilter, WeightSource};
use trax_core::utils::FileType;
use trax_coverage::{CoverageConfig, OutputFormat, coverage_main};

/// Matches items from CLAP args before running coverage_main
pub fn run_coverage(matches: &ArgMatches) -> Result<()> {
    let filepath = matches
        .get_one::<String>("file")
        .expect("file path is required");

    let filetype = matches
        .get_one::<String>("filetype")
        .expect("file type is required");
    let input_format = FileType::from_str(filetype).unwrap_or(FileType::Unknown);

    let chromref = matches.get_one::<String>("chromref");

    let fileheader = matches
        .get_one::<String>("fileheader")
        .expect("fileheader is required");

    let output_type = matches
        .get_one::<String>("outputtype")
        .expect("output type is required");
    let output_format = OutputFormat::from_str(output_type).map_err(anyhow::Error::msg)?;

    let stepsize = matches
        .get_one::<u32>("stepsize")
        .expect("requires integer value");

    let min_mapq = matches
        .get_one::<u8>("min-mapq")
        .expect("requires integer value");

    let strand = StrandFilter::from_str(
        matches
            .get_one::<String>("strand")
            .expect("strand is required"),
    )?;

    let weight_source = WeightSource::from_str(
        matches
            .get_one::<String>("weight")
            .expect("weight is required"),
    )?;

    let config = CoverageConfig {
        input: PathBuf::from(filepath),
        input_format,
        chrom_sizes: chromref.map(PathBuf::from),
        output_prefix: fileheader.clone(),
        output_format,
        step: *stepsize,
        keep_uncovered: matches.get_flag("keep-uncovered"),
        rpm: matches.get_flag("rpm"),
        count_soft_clip: matches.get_flag("count-soft-clip"),
        min_mapq: *min_mapq,
        strand,
        weight_source,
        strict_bounds: matches.get_flag("strict-bounds"),
        regions: matches.get_one::<String>("regions").map(PathBuf::from),
        stats_out: matches.get_one::<String>("stats").map(PathBuf::from),
    };

    coverage_main(&config)
}
