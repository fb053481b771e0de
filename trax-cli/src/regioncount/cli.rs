use clap::{Arg, ArgAction, Command};

pub const REGIONCOUNT_CMD: &str = "regioncount";

/// Creates the regioncount CLI Command object
pub fn create_regioncount_cli() -> Command {
    Command::new(REGIONCOUNT_CMD)
        .author("Databio")
        .about("Compute read counts and mean coverage over a merged set of regions")
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
                .help("Path to the chromosome sizes file (optional for bam input)"),
        )
        .arg(
            Arg::new("regions")
                .long("regions")
                .short('r')
                .help("BED of regions to count over; overlapping regions are merged first")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Path for the per-region TSV output")
                .required(true),
        )
        .arg(
            Arg::new("rpm")
                .long("rpm")
                .action(ArgAction::SetTrue)
                .help("Scale reported values to reads per million"),
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
            Arg::new("count-soft-clip")
                .long("count-soft-clip")
                .action(ArgAction::SetTrue)
                .help("Count soft-clipped bases as covered"),
        )
        .arg(
            Arg::new("strict-bounds")
                .long("strict-bounds")
                .action(ArgAction::SetTrue)
                .help("Drop out-of-range positions instead of clamping them to the chromosome"),
        )
}
