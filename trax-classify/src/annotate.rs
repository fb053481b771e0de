use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;

use trax_core::errors::TraxError;
use trax_core::utils::get_dynamic_reader;

use crate::bitmask::LabelBitIndex;

/// Fallback label for alignments overlapping no masked region.
pub const UNCLASSIFIED_LABEL: &str = "unclassified";

/// Where an annotation record's label comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelSource {
    /// The feature type column (column 3 of GFF/GTF).
    Feature,
    /// The value of an attribute key (e.g. `gene_biotype`).
    Attribute(String),
}

/// How a tool reports multiple overlapping labels per alignment. Picking a
/// single "primary" label is deliberately not the index's job; these are the
/// caller-side policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributionMode {
    /// The set of overlapping labels.
    Set,
    /// Overlapping bases per label.
    Sum,
    /// Overlapping bases per label divided by the alignment's aligned bases.
    Fraction,
}

impl FromStr for AttributionMode {
    type Err = TraxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "set" => Ok(AttributionMode::Set),
            "sum" => Ok(AttributionMode::Sum),
            "fraction" => Ok(AttributionMode::Fraction),
            _ => Err(TraxError::UnknownOptionValue(s.to_string())),
        }
    }
}

/// Extract an attribute value from a GFF/GTF attributes column. Handles both
/// the GFF3 `key=value` and the GTF `key "value"` styles.
pub fn attribute_value(attributes: &str, key: &str) -> Option<String> {
    for field in attributes.split(';') {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }

        if let Some((k, v)) = field.split_once('=') {
            if k.trim() == key {
                return Some(v.trim().trim_matches('"').to_string());
            }
            continue;
        }

        if let Some((k, v)) = field.split_once(char::is_whitespace) {
            if k == key {
                return Some(v.trim().trim_matches('"').to_string());
            }
        }
    }

    None
}

/// Stream a GFF/GTF-like annotation file into the index.
///
/// Coordinates are 1-based inclusive in the file and are converted to the
/// index's 0-based half-open convention here. Records whose label source
/// yields nothing (missing attribute key) are skipped; records on unindexed
/// chromosomes are dropped by the index itself. Returns the number of
/// records masked.
pub fn load_annotations(
    path: &Path,
    label_source: &LabelSource,
    index: &mut LabelBitIndex,
) -> Result<u64> {
    let reader = get_dynamic_reader(path)?;

    let mut masked: u64 = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 5 {
            return Err(TraxError::AnnotationParseError(line).into());
        }

        let chr = fields[0];
        let feature = fields[2];
        let start: u32 = fields[3]
            .parse()
            .map_err(|_| TraxError::AnnotationParseError(line.clone()))?;
        let end: u32 = fields[4]
            .parse()
            .map_err(|_| TraxError::AnnotationParseError(line.clone()))?;
        if start < 1 || end < start {
            return Err(TraxError::AnnotationParseError(line.clone()).into());
        }

        let label = match label_source {
            LabelSource::Feature => Some(feature.to_string()),
            LabelSource::Attribute(key) => fields
                .get(8)
                .and_then(|attributes| attribute_value(attributes, key)),
        };
        let Some(label) = label else {
            continue;
        };

        index.mask_region(chr, start - 1, end, &label);
        masked += 1;
    }

    Ok(masked)
}

/// Union of labels overlapping the walker's 1-based half-open blocks.
pub fn labels_for_blocks(
    index: &LabelBitIndex,
    chr: &str,
    blocks: &[(u32, u32)],
) -> BTreeSet<String> {
    let mut labels = BTreeSet::new();
    for &(start, end) in blocks {
        labels.append(&mut index.unmask(chr, start - 1, end - 1));
    }
    labels
}

/// Per-label overlapping-base totals across the blocks.
pub fn label_counts_for_blocks(
    index: &LabelBitIndex,
    chr: &str,
    blocks: &[(u32, u32)],
) -> BTreeMap<String, u64> {
    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    for &(start, end) in blocks {
        for (label, count) in index.unmask_sum(chr, start - 1, end - 1) {
            *totals.entry(label).or_insert(0) += count as u64;
        }
    }
    totals
}

/// Proportional attribution: overlapping bases per label over the total
/// aligned bases of the blocks.
pub fn label_fractions_for_blocks(
    index: &LabelBitIndex,
    chr: &str,
    blocks: &[(u32, u32)],
) -> Vec<(String, f64)> {
    let aligned: u64 = blocks.iter().map(|&(s, e)| (e - s) as u64).sum();
    if aligned == 0 {
        return Vec::new();
    }

    label_counts_for_blocks(index, chr, blocks)
        .into_iter()
        .map(|(label, count)| (label, count as f64 / aligned as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[rstest]
    #[case("gene_id \"ABC\"; gene_biotype \"protein_coding\";", "gene_biotype", Some("protein_coding"))]
    #[case("ID=gene42;biotype=lncRNA", "biotype", Some("lncRNA"))]
    #[case("gene_id \"ABC\";", "transcript_id", None)]
    #[case("gene_id2 \"ABC\";", "gene_id", None)]
    fn test_attribute_value(
        #[case] attributes: &str,
        #[case] key: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(
            attribute_value(attributes, key),
            expected.map(|s| s.to_string())
        );
    }

    #[fixture]
    fn index() -> LabelBitIndex {
        let mut index = LabelBitIndex::new();
        index.add_chr("chr1", 1000);
        index
    }

    #[rstest]
    fn test_load_annotations_by_feature(mut index: LabelBitIndex) {
        let mut file = tempfile::Builder::new().suffix(".gtf").tempfile().unwrap();
        writeln!(file, "#!genome-build test").unwrap();
        writeln!(
            file,
            "chr1\thavana\texon\t11\t20\t.\t+\t.\tgene_id \"g1\";"
        )
        .unwrap();
        writeln!(
            file,
            "chr1\thavana\tgene\t1\t100\t.\t+\t.\tgene_id \"g1\";"
        )
        .unwrap();
        // unindexed contig, silently dropped by the index
        writeln!(
            file,
            "chrUn\thavana\texon\t1\t50\t.\t+\t.\tgene_id \"g2\";"
        )
        .unwrap();

        let masked = load_annotations(file.path(), &LabelSource::Feature, &mut index).unwrap();
        assert_eq!(masked, 3);

        // 1-based inclusive 11-20 became 0-based bits 10..20
        assert_eq!(index.unmask("chr1", 10, 11).contains("exon"), true);
        assert_eq!(index.unmask("chr1", 9, 10).contains("exon"), false);
        assert_eq!(index.unmask_sum("chr1", 0, 1000)["gene"], 100);
    }

    #[rstest]
    fn test_load_annotations_by_attribute(mut index: LabelBitIndex) {
        let mut file = tempfile::Builder::new().suffix(".gtf").tempfile().unwrap();
        writeln!(
            file,
            "chr1\tensembl\tgene\t1\t100\t.\t+\t.\tgene_biotype \"lncRNA\";"
        )
        .unwrap();
        // no biotype attribute: skipped
        writeln!(file, "chr1\tensembl\tgene\t200\t300\t.\t+\t.\tgene_id \"g\";").unwrap();

        let masked = load_annotations(
            file.path(),
            &LabelSource::Attribute("gene_biotype".to_string()),
            &mut index,
        )
        .unwrap();
        assert_eq!(masked, 1);
        assert_eq!(index.unmask("chr1", 0, 1000), ["lncRNA".to_string()].into());
    }

    #[rstest]
    fn test_load_annotations_rejects_inverted_coordinates(mut index: LabelBitIndex) {
        let mut file = tempfile::Builder::new().suffix(".gff").tempfile().unwrap();
        writeln!(file, "chr1\tsrc\tgene\t100\t50\t.\t+\t.\tID=g").unwrap();

        assert!(load_annotations(file.path(), &LabelSource::Feature, &mut index).is_err());
    }

    #[rstest]
    fn test_block_summaries(mut index: LabelBitIndex) {
        // exon covers bits 0..10, intron bits 10..30
        index.mask_region("chr1", 0, 10, "exon");
        index.mask_region("chr1", 10, 30, "intron");

        // an alignment covering 1-based positions 6..10 and 21..25
        let blocks = vec![(6, 11), (21, 26)];

        let labels = labels_for_blocks(&index, "chr1", &blocks);
        assert_eq!(labels, ["exon".to_string(), "intron".to_string()].into());

        let counts = label_counts_for_blocks(&index, "chr1", &blocks);
        assert_eq!(counts["exon"], 5);
        assert_eq!(counts["intron"], 5);

        let fractions = label_fractions_for_blocks(&index, "chr1", &blocks);
        assert_eq!(
            fractions,
            vec![("exon".to_string(), 0.5), ("intron".to_string(), 0.5)]
        );
    }

    #[rstest]
    fn test_unmatched_blocks_have_no_labels(index: LabelBitIndex) {
        let labels = labels_for_blocks(&index, "chr1", &[(500, 510)]);
        assert!(labels.is_empty());
    }
}
