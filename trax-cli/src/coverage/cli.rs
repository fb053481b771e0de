use clap::{Arg, ArgAction, Command};

pub const COVERAGE_CMD: &str = "coverage";

/// Creates the coverage CLI Command object
pub fn create_coverage_cli() -> Command {
    Command::new(COVERAGE_CMD)
        .author("Databio")
        .about("Compute a per-base coverage track from a BED or BAM file")
        .arg(
            Arg::new("file")
                .long("file")
                .short('f')
                .help("Path to the input BED or BAM file")
                .required(true),
        )
        .arg(
            Arg::new("filetype")
                .long("filetype")
                .short('t')
                .help("Input file type: bed or bam")
                .required(true),
        )
        .arg(
            Arg::new("chromref")
                .long("chromref")
                .short('c')
                .help("Path to the chromosome sizes file (optional for bam input, where the header is used)"),
        )
        .arg(
            Arg::new("fileheader")
                .long("fileheader")
                .short('l')
                .help("Output file prefix")
                .required(true),
        )
        .arg(
            Arg::new("outputtype")
                .long("outputtype")
                .short('y')
                .default_value("bedgraph")
                .help("Output as wig or bedgraph"),
        )
        .arg(
            Arg::new("stepsize")
                .long("stepsize")
                .short('s')
                .value_parser(clap::value_parser!(u32))
                .default_value("1")
                .help("Fixed step for windowed mean reporting"),
        )
        .arg(
            Arg::new("keep-uncovered")
                .long("keep-uncovered")
                .action(ArgAction::SetTrue)
                .help("Report zero-coverage windows instead of suppressing them"),
        )
        .arg(
            Arg::new("rpm")
                .long("rpm")
                .action(ArgAction::SetTrue)
                .help("Scale reported values to reads per million"),
        )
        .arg(
            Arg::new("count-soft-clip")
                .long("count-soft-clip")
                .action(ArgAction::SetTrue)
                .help("Count soft-clipped bases as covered"),
        )
        .arg(
            Arg::new("min-mapq")
                .long("min-mapq")
                .value_parser(clap::value_parser!(u8))
                .default_value("0")
                .help("Skip BAM records below this mapping quality"),
        )
        .arg(
            Arg::new("strand")
                .long("strand")
                .default_value("both")
                .help("Restrict counting to one strand: both, forward, or reverse"),
        )
        .arg(
            Arg::new("weight")
                .long("weight")
                .default_value("uniform")
                .help("Record weight source: uniform, clone, or mapq"),
        )
        .arg(
            Arg::new("strict-bounds")
                .long("strict-bounds")
                .action(ArgAction::SetTrue)
                .help("Drop out-of-range positions instead of clamping them to the chromosome"),
        )
        .arg(
            Arg::new("regions")
                .long("regions")
                .help("BED of regions of interest; overlapping regions are merged before reporting"),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Write a run-summary JSON to this path"),
        )
}
