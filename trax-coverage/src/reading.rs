use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use fxhash::FxHashMap;
use noodles::bam;
use noodles::sam::alignment::record::cigar::op::Kind;

use trax_core::models::{AlnOp, AlnOpKind, AlnRecord, GenomeInterval, Strand};
use trax_core::policy::{StrandFilter, WeightSource};
use trax_core::stats::phred_to_error_prob;
use trax_core::utils::{
    clone_count_from_name, get_dynamic_reader, is_bed_header_line, parse_bedlike_line,
};

/// Record-level filters and weighting applied while decoding a BAM stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeOptions {
    pub min_mapq: u8,
    pub strand: StrandFilter,
    pub weight_source: WeightSource,
}

/// Read BED regions as 1-based closed [`GenomeInterval`]s.
///
/// BED coordinates are 0-based half-open; the +1 start shift happens here so
/// the core only ever sees its own convention. Header/comment lines are
/// skipped; a malformed coordinate line or an inverted interval fails the
/// run (configuration error, not data noise).
pub fn read_bed_regions(path: &Path) -> Result<Vec<GenomeInterval>> {
    let reader = get_dynamic_reader(path)?;

    let mut regions: Vec<GenomeInterval> = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() || is_bed_header_line(&line) {
            continue;
        }

        let (chr, start, end) = parse_bedlike_line(&line)
            .with_context(|| format!("Malformed BED line: {}", line))?;
        regions.push(GenomeInterval::new(chr, start + 1, end)?);
    }

    Ok(regions)
}

/// Pull (name, length) pairs out of a BAM header — the chromosome-length
/// table supplier for workflows without a separate sizes file.
pub fn read_bam_chrom_sizes(path: &Path) -> Result<FxHashMap<String, u32>> {
    let mut reader = bam::io::reader::Builder
        .build_from_path(path)
        .with_context(|| format!("Failed to open BAM file: {:?}", path))?;
    let header = reader.read_header()?;

    let mut chrom_sizes: FxHashMap<String, u32> = FxHashMap::default();
    for (name, map) in header.reference_sequences() {
        let chrom = String::from_utf8_lossy(name.as_ref()).to_string();
        chrom_sizes.insert(chrom, usize::from(map.length()) as u32);
    }

    Ok(chrom_sizes)
}

/// Stream a BAM file, decode each mapped record into an [`AlnRecord`], and
/// hand it to `f`. Returns the number of records that passed the filters.
///
/// Unmapped records and records failing the mapq/strand filters are skipped.
/// The start handed to the walker is the unclipped start: leading soft/hard
/// clip lengths are subtracted from the reported alignment start (truncating
/// clip ops that would fall before position 1) so clipped bases land on
/// their original reference positions.
pub fn for_each_bam_record(
    path: &Path,
    opts: &DecodeOptions,
    mut f: impl FnMut(AlnRecord),
) -> Result<u64> {
    let mut reader = bam::io::reader::Builder
        .build_from_path(path)
        .with_context(|| format!("Failed to open BAM file: {:?}", path))?;
    let header = reader.read_header()?;

    let ref_names: Vec<String> = header
        .reference_sequences()
        .keys()
        .map(|name| String::from_utf8_lossy(name.as_ref()).to_string())
        .collect();

    let mut passed: u64 = 0;
    for result in reader.records() {
        let record = result?;
        if record.flags().is_unmapped() {
            continue;
        }

        let Some(Ok(ref_id)) = record.reference_sequence_id() else {
            continue;
        };
        let Some(chr) = ref_names.get(ref_id) else {
            continue;
        };

        let Some(Ok(position)) = record.alignment_start() else {
            continue;
        };
        let start = position.get() as u32;

        let mapq = record
            .mapping_quality()
            .map(|q| q.get())
            .unwrap_or(u8::MAX);
        if mapq < opts.min_mapq {
            continue;
        }

        let strand = if record.flags().is_reverse_complemented() {
            Strand::Reverse
        } else {
            Strand::Forward
        };
        match (opts.strand, strand) {
            (StrandFilter::Forward, Strand::Reverse) => continue,
            (StrandFilter::Reverse, Strand::Forward) => continue,
            _ => {}
        }

        let mut ops: Vec<AlnOp> = Vec::new();
        for op in record.cigar().iter() {
            let op = op?;
            let kind = match op.kind() {
                Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch => AlnOpKind::Aligned,
                Kind::Insertion => AlnOpKind::Insertion,
                Kind::Deletion => AlnOpKind::Deletion,
                Kind::Skip => AlnOpKind::Skip,
                Kind::SoftClip => AlnOpKind::SoftClip,
                Kind::HardClip => AlnOpKind::HardClip,
                Kind::Pad => AlnOpKind::Pad,
            };
            ops.push(AlnOp::new(kind, op.len() as u32));
        }

        let start = unclip_start(start, &mut ops);

        let name = record.name().map(|n| n.to_string()).unwrap_or_default();
        let weight = match opts.weight_source {
            WeightSource::Uniform => 1.0,
            WeightSource::CloneCount => clone_count_from_name(&name).unwrap_or(1) as f64,
            WeightSource::MappingQuality => {
                if mapq == u8::MAX {
                    1.0
                } else {
                    1.0 - phred_to_error_prob(mapq as f64)
                }
            }
        };

        passed += 1;
        f(AlnRecord {
            name,
            chr: chr.clone(),
            start,
            ops,
            strand,
            weight,
        });
    }

    Ok(passed)
}

/// Shift `start` left over leading clip ops. Clip bases that would land
/// before position 1 are trimmed off the ops so the walk still reaches the
/// reported alignment start exactly.
fn unclip_start(start: u32, ops: &mut [AlnOp]) -> u32 {
    let mut lead: u32 = 0;
    for op in ops.iter() {
        match op.kind {
            AlnOpKind::SoftClip | AlnOpKind::HardClip => lead += op.len,
            _ => break,
        }
    }

    let shift = lead.min(start.saturating_sub(1));
    let mut overflow = lead - shift;
    if overflow > 0 {
        for op in ops.iter_mut() {
            if !matches!(op.kind, AlnOpKind::SoftClip | AlnOpKind::HardClip) {
                break;
            }
            let take = op.len.min(overflow);
            op.len -= take;
            overflow -= take;
            if overflow == 0 {
                break;
            }
        }
    }

    start - shift
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    fn test_read_bed_regions_shifts_to_one_based() {
        let mut file = tempfile::Builder::new().suffix(".bed").tempfile().unwrap();
        writeln!(file, "track name=\"peaks\"").unwrap();
        writeln!(file, "chr1\t0\t10").unwrap();
        writeln!(file, "chr2\t99\t200\tname\t0\t-").unwrap();

        let regions = read_bed_regions(file.path()).unwrap();
        assert_eq!(
            regions,
            vec![
                GenomeInterval::new("chr1", 1, 10).unwrap(),
                GenomeInterval::new("chr2", 100, 200).unwrap(),
            ]
        );
    }

    #[rstest]
    fn test_read_bed_regions_rejects_malformed_line() {
        let mut file = tempfile::Builder::new().suffix(".bed").tempfile().unwrap();
        writeln!(file, "chr1\tten\ttwenty").unwrap();

        assert!(read_bed_regions(file.path()).is_err());
    }

    #[rstest]
    fn test_unclip_start_shifts_over_leading_clips() {
        let mut ops = vec![
            AlnOp::new(AlnOpKind::SoftClip, 4),
            AlnOp::new(AlnOpKind::Aligned, 10),
        ];
        assert_eq!(unclip_start(100, &mut ops), 96);
        assert_eq!(ops[0].len, 4);
    }

    #[rstest]
    fn test_unclip_start_trims_clip_past_origin() {
        let mut ops = vec![
            AlnOp::new(AlnOpKind::SoftClip, 5),
            AlnOp::new(AlnOpKind::Aligned, 10),
        ];
        // only 2 clipped bases fit before position 3
        assert_eq!(unclip_start(3, &mut ops), 1);
        assert_eq!(ops[0].len, 2);
    }

    #[rstest]
    fn test_unclip_start_without_clips() {
        let mut ops = vec![AlnOp::new(AlnOpKind::Aligned, 10)];
        assert_eq!(unclip_start(7, &mut ops), 7);
    }
}
