use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use anyhow::{Result, bail};
use clap::ArgMatches;
use fxhash::FxHashMap;
use indicatif::ProgressBar;

use trax_core::models::{WalkPolicy, optimize_intervals};
use trax_core::policy::{BoundsPolicy, StrandFilter, WeightSource};
use trax_core::utils::{FileType, read_chrom_sizes};
use trax_coverage::accumulator::PositionalAccumulator;
use trax_coverage::reading::{
    DecodeOptions, read_bam_chrom_sizes, read_bed_regions,
};
use trax_coverage::{accumulate_bam, accumulate_bed};

/// Matches items from CLAP args, accumulates coverage, and reports one row
/// per merged region.
pub fn run_regioncount(matches: &ArgMatches) -> Result<()> {
    let filepath = matches
        .get_one::<String>("file")
        .expect("file path is required");

    let filetype = matches
        .get_one::<String>("filetype")
        .expect("file type is required");
    let input_format = FileType::from_str(filetype).unwrap_or(FileType::Unknown);

    let regions_path = matches
        .get_one::<String>("regions")
        .expect("regions path is required");

    let output = matches
        .get_one::<String>("output")
        .expect("output path is required");

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

    let chrom_sizes: FxHashMap<String, u32> = match matches.get_one::<String>("chromref") {
        Some(path) => read_chrom_sizes(Path::new(path))?,
        None => match input_format {
            FileType::Bam => read_bam_chrom_sizes(Path::new(filepath))?,
            _ => bail!("A chromosome sizes file is required for non-BAM input"),
        },
    };

    let bounds = if matches.get_flag("strict-bounds") {
        BoundsPolicy::Ignore
    } else {
        BoundsPolicy::Clamp
    };
    let mut acc = PositionalAccumulator::with_bounds(&chrom_sizes, bounds);

    let bar = ProgressBar::new_spinner();
    match input_format {
        FileType::Bed => {
            accumulate_bed(Path::new(filepath), strand, weight_source, &mut acc, &bar)?;
        }
        FileType::Bam => {
            let opts = DecodeOptions {
                min_mapq: *min_mapq,
                strand,
                weight_source,
            };
            let walk = WalkPolicy {
                count_soft_clip: matches.get_flag("count-soft-clip"),
            };
            accumulate_bam(Path::new(filepath), &opts, walk, &mut acc, &bar)?;
        }
        FileType::Unknown => bail!("Unknown file type provided"),
    }
    bar.finish_and_clear();

    let regions = optimize_intervals(read_bed_regions(Path::new(regions_path))?);
    let scale = if matches.get_flag("rpm") {
        acc.rpm_factor()
    } else {
        1.0
    };

    let mut writer = BufWriter::new(File::create(output)?);
    for region in regions.iter() {
        // regions on undeclared chromosomes are skipped, matching the
        // accumulation-side policy for partial inputs
        if acc.chrom_len(&region.chr).is_none() {
            continue;
        }

        let sum = acc.sum(&region.chr, region.start, region.end + 1);
        let mean = acc.mean(&region.chr, region.start, region.end + 1);
        writeln!(
            &mut writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            region.chr,
            region.start - 1,
            region.end,
            region.width(),
            sum * scale,
            mean * scale,
        )?;
    }
    writer.flush()?;

    Ok(())
}
