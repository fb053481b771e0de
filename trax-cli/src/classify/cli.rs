use clap::{Arg, ArgAction, Command};

pub const CLASSIFY_CMD: &str = "classify";
pub const DEFAULT_MODE: &str = "set";

/// Creates the classify CLI Command object
pub fn create_classify_cli() -> Command {
    Command::new(CLASSIFY_CMD)
        .author("Databio")
        .about("Label each BAM alignment with the annotation feature types it overlaps")
        .arg(
            Arg::new("file")
                .long("file")
                .short('f')
                .help("Path to the input BAM file")
                .required(true),
        )
        .arg(
            Arg::new("annotation")
                .long("annotation")
                .short('a')
                .help("Path to the GFF/GTF annotation file")
                .required(true),
        )
        .arg(
            Arg::new("chromref")
                .long("chromref")
                .short('c')
                .help("Path to the chromosome sizes file (defaults to the BAM header)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Path for the per-read TSV output")
                .required(true),
        )
        .arg(
            Arg::new("attribute")
                .long("attribute")
                .help("Use this annotation attribute's value as the label instead of the feature column"),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .default_value(DEFAULT_MODE)
                .help("Label reporting mode: set, sum, or fraction"),
        )
        .arg(
            Arg::new("min-mapq")
                .long("min-mapq")
                .value_parser(clap::value_parser!(u8))
                .default_value("0")
                .help("Skip records below this mapping quality"),
        )
        .arg(
            Arg::new("strand")
                .long("strand")
                .default_value("both")
                .help("Restrict classification to one strand: both, forward, or reverse"),
        )
        .arg(
            Arg::new("count-soft-clip")
                .long("count-soft-clip")
                .action(ArgAction::SetTrue)
                .help("Include soft-clipped bases in the overlap"),
        )
}
