use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use clap::ArgMatches;
use fxhash::FxHashMap;
use indicatif::ProgressBar;

use trax_classify::{
    AttributionMode, LabelBitIndex, LabelSource, UNCLASSIFIED_LABEL, label_counts_for_blocks,
    label_fractions_for_blocks, labels_for_blocks, load_annotations,
};
use trax_core::models::{WalkPolicy, reference_blocks};
use trax_core::policy::StrandFilter;
use trax_core::utils::read_chrom_sizes;
use trax_coverage::reading::{DecodeOptions, for_each_bam_record, read_bam_chrom_sizes};

/// Matches items from CLAP args, builds the label index, and streams the BAM
/// through it.
pub fn run_classify(matches: &ArgMatches) -> Result<()> {
    let filepath = matches
        .get_one::<String>("file")
        .expect("file path is required");

    let annotation = matches
        .get_one::<String>("annotation")
        .expect("annotation path is required");

    let output = matches
        .get_one::<String>("output")
        .expect("output path is required");

    let mode = AttributionMode::from_str(
        matches.get_one::<String>("mode").expect("mode is required"),
    )?;

    let label_source = match matches.get_one::<String>("attribute") {
        Some(key) => LabelSource::Attribute(key.clone()),
        None => LabelSource::Feature,
    };

    let min_mapq = matches
        .get_one::<u8>("min-mapq")
        .expect("requires integer value");

    let strand = StrandFilter::from_str(
        matches
            .get_one::<String>("strand")
            .expect("strand is required"),
    )?;

    let chrom_sizes: FxHashMap<String, u32> = match matches.get_one::<String>("chromref") {
        Some(path) => read_chrom_sizes(Path::new(path))?,
        None => read_bam_chrom_sizes(Path::new(filepath))?,
    };

    let mut index = LabelBitIndex::new();
    for (chrom, len) in chrom_sizes.iter() {
        index.add_chr(chrom, *len);
    }
    load_annotations(Path::new(annotation), &label_source, &mut index)?;

    let opts = DecodeOptions {
        min_mapq: *min_mapq,
        strand,
        ..Default::default()
    };
    let walk = WalkPolicy {
        count_soft_clip: matches.get_flag("count-soft-clip"),
    };

    let mut writer = BufWriter::new(File::create(output)?);
    let bar = ProgressBar::new_spinner();

    let mut write_err: Option<std::io::Error> = None;
    for_each_bam_record(Path::new(filepath), &opts, |record| {
        if write_err.is_some() {
            return;
        }
        bar.inc(1);

        let blocks = reference_blocks(record.start, &record.ops, walk);
        let summary = summarize(&index, &record.chr, &blocks, mode);

        if let Err(err) = writeln!(
            &mut writer,
            "{}\t{}\t{}\t{}",
            record.name, record.chr, record.start, summary
        ) {
            write_err = Some(err);
        }
    })?;
    bar.finish_and_clear();

    if let Some(err) = write_err {
        return Err(err.into());
    }
    writer.flush()?;

    Ok(())
}

/// Render one alignment's label summary for the chosen attribution mode.
/// Alignments touching no masked region get the unclassified fallback.
fn summarize(
    index: &LabelBitIndex,
    chr: &str,
    blocks: &[(u32, u32)],
    mode: AttributionMode,
) -> String {
    match mode {
        AttributionMode::Set => {
            let labels = labels_for_blocks(index, chr, blocks);
            if labels.is_empty() {
                UNCLASSIFIED_LABEL.to_string()
            } else {
                labels.into_iter().collect::<Vec<_>>().join(";")
            }
        }
        AttributionMode::Sum => {
            let counts = label_counts_for_blocks(index, chr, blocks);
            if counts.is_empty() {
                UNCLASSIFIED_LABEL.to_string()
            } else {
                counts
                    .into_iter()
                    .map(|(label, count)| format!("{}:{}", label, count))
                    .collect::<Vec<_>>()
                    .join(";")
            }
        }
        AttributionMode::Fraction => {
            let fractions = label_fractions_for_blocks(index, chr, blocks);
            if fractions.is_empty() {
                UNCLASSIFIED_LABEL.to_string()
            } else {
                fractions
                    .into_iter()
                    .map(|(label, fraction)| format!("{}:{:.4}", label, fraction))
                    .collect::<Vec<_>>()
                    .join(";")
            }
        }
    }
}
