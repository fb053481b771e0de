pub mod accumulator;
pub mod reading;
pub mod windows;
pub mod writing;

use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use fxhash::FxHashMap;
use indicatif::ProgressBar;

use trax_core::models::{GenomeInterval, Strand, WalkPolicy, optimize_intervals, reference_blocks};
use trax_core::policy::{BoundsPolicy, StrandFilter, WeightSource};
use trax_core::utils::{
    FileType, clone_count_from_name, get_dynamic_reader, is_bed_header_line, read_chrom_sizes,
};

use self::accumulator::PositionalAccumulator;
use self::reading::{DecodeOptions, for_each_bam_record, read_bam_chrom_sizes, read_bed_regions};
use self::windows::{WindowOptions, chrom_windows, range_windows};
use self::writing::{RunStats, write_stats_json, write_to_bed_graph_file, write_to_wig_file};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Wig,
    BedGraph,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wig" => Ok(OutputFormat::Wig),
            "bedgraph" => Ok(OutputFormat::BedGraph),
            _ => Err(format!("Invalid output type: {}", s)),
        }
    }
}

impl OutputFormat {
    fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Wig => "wig",
            OutputFormat::BedGraph => "bedGraph",
        }
    }
}

/// Everything one coverage run needs, built by the CLI from its flags.
#[derive(Debug, Clone)]
pub struct CoverageConfig {
    pub input: PathBuf,
    pub input_format: FileType,
    /// Chromosome sizes file; optional for BAM input, where the header is
    /// used instead.
    pub chrom_sizes: Option<PathBuf>,
    pub output_prefix: String,
    pub output_format: OutputFormat,
    pub step: u32,
    pub keep_uncovered: bool,
    /// Scale reported values to reads-per-million.
    pub rpm: bool,
    pub count_soft_clip: bool,
    pub min_mapq: u8,
    pub strand: StrandFilter,
    pub weight_source: WeightSource,
    /// Drop out-of-range positions instead of clamping them.
    pub strict_bounds: bool,
    /// Optional BED of regions of interest; collapsed before reporting.
    pub regions: Option<PathBuf>,
    /// Optional path for the run-summary JSON.
    pub stats_out: Option<PathBuf>,
}

/// Main entry: accumulate coverage from the configured input and emit one
/// wiggle/bedGraph file, chromosomes in sorted order.
pub fn coverage_main(config: &CoverageConfig) -> Result<()> {
    let chrom_sizes = load_chrom_sizes(config)?;

    let bounds = if config.strict_bounds {
        BoundsPolicy::Ignore
    } else {
        BoundsPolicy::Clamp
    };
    let mut acc = PositionalAccumulator::with_bounds(&chrom_sizes, bounds);

    let bar = ProgressBar::new_spinner();
    let records = match config.input_format {
        FileType::Bed => accumulate_bed(
            &config.input,
            config.strand,
            config.weight_source,
            &mut acc,
            &bar,
        )?,
        FileType::Bam => {
            let opts = DecodeOptions {
                min_mapq: config.min_mapq,
                strand: config.strand,
                weight_source: config.weight_source,
            };
            let walk = WalkPolicy {
                count_soft_clip: config.count_soft_clip,
            };
            accumulate_bam(&config.input, &opts, walk, &mut acc, &bar)?
        }
        FileType::Unknown => bail!("Unknown file type provided"),
    };
    bar.finish_and_clear();

    let regions = match &config.regions {
        Some(path) => Some(optimize_intervals(read_bed_regions(path)?)),
        None => None,
    };

    let scale = if config.rpm { acc.rpm_factor() } else { 1.0 };
    write_tracks(config, &acc, regions.as_deref(), scale)?;

    if let Some(stats_path) = &config.stats_out {
        write_stats_json(
            stats_path,
            &RunStats {
                records,
                total_weight: acc.total_weight(),
                rpm_factor: acc.rpm_factor(),
            },
        )?;
    }

    Ok(())
}

fn load_chrom_sizes(config: &CoverageConfig) -> Result<FxHashMap<String, u32>> {
    match &config.chrom_sizes {
        Some(path) => Ok(read_chrom_sizes(path)?),
        None => match config.input_format {
            FileType::Bam => read_bam_chrom_sizes(&config.input),
            _ => bail!("A chromosome sizes file is required for non-BAM input"),
        },
    }
}

/// Accumulate BED records: each one covers its full closed span with a fixed
/// clone weight. Strand filtering uses column 6 when present (records
/// without one are treated as forward); clone counts come from the name in
/// column 4; mapping-quality weighting has no meaning here and falls back
/// to 1.
pub fn accumulate_bed(
    input: &Path,
    strand_filter: StrandFilter,
    weight_source: WeightSource,
    acc: &mut PositionalAccumulator,
    bar: &ProgressBar,
) -> Result<u64> {
    let reader = get_dynamic_reader(input)?;

    let mut records: u64 = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() || is_bed_header_line(&line) {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 3 {
            bail!("Malformed BED line: {}", line);
        }
        let chr = fields[0].trim();
        let start: u32 = fields[1]
            .parse()
            .with_context(|| format!("Malformed BED line: {}", line))?;
        let end: u32 = fields[2]
            .parse()
            .with_context(|| format!("Malformed BED line: {}", line))?;

        let strand = match fields.get(5).copied() {
            Some("-") => Strand::Reverse,
            _ => Strand::Forward,
        };
        match (strand_filter, strand) {
            (StrandFilter::Forward, Strand::Reverse) => continue,
            (StrandFilter::Reverse, Strand::Forward) => continue,
            _ => {}
        }

        let weight = match weight_source {
            WeightSource::CloneCount => fields
                .get(3)
                .and_then(|name| clone_count_from_name(name))
                .unwrap_or(1) as f64,
            _ => 1.0,
        };

        // BED starts are 0-based; the accumulator is 1-based closed.
        acc.add_region(chr, start + 1, end, weight);
        records += 1;
        bar.inc(1);
    }

    Ok(records)
}

pub fn accumulate_bam(
    input: &Path,
    opts: &DecodeOptions,
    walk: WalkPolicy,
    acc: &mut PositionalAccumulator,
    bar: &ProgressBar,
) -> Result<u64> {
    for_each_bam_record(input, opts, |record| {
        let blocks = reference_blocks(record.start, &record.ops, walk);
        acc.add_blocks(&record.chr, &blocks, record.weight);
        bar.inc(1);
    })
}

fn write_tracks(
    config: &CoverageConfig,
    acc: &PositionalAccumulator,
    regions: Option<&[GenomeInterval]>,
    scale: f64,
) -> Result<()> {
    let file_name = format!("{}.{}", config.output_prefix, config.output_format.extension());
    remove_stale_output(&file_name)?;

    // fixedStep wiggle cannot skip positions, so suppression only applies to
    // bedGraph output.
    let opts = WindowOptions {
        step: config.step.max(1),
        keep_uncovered: config.keep_uncovered || config.output_format == OutputFormat::Wig,
        scale,
    };

    for chrom in acc.chrom_names() {
        match regions {
            Some(regions) => {
                for region in regions.iter().filter(|r| r.chr == *chrom) {
                    let windows = range_windows(acc, chrom, region.start, region.end, &opts);
                    write_windows(config, &file_name, chrom, region.start, &windows)?;
                }
            }
            None => {
                let windows = chrom_windows(acc, chrom, &opts);
                write_windows(config, &file_name, chrom, 1, &windows)?;
            }
        }
    }

    Ok(())
}

fn write_windows(
    config: &CoverageConfig,
    file_name: &str,
    chrom: &str,
    start: u32,
    windows: &[windows::Window],
) -> Result<()> {
    if windows.is_empty() {
        return Ok(());
    }
    match config.output_format {
        OutputFormat::Wig => write_to_wig_file(windows, file_name, chrom, start, config.step.max(1)),
        OutputFormat::BedGraph => write_to_bed_graph_file(windows, file_name, chrom),
    }
}

/// The writers append so that chromosomes accumulate into one file; a
/// leftover file from a previous run would get appended to as well.
fn remove_stale_output(file_name: &str) -> Result<()> {
    let path = Path::new(file_name);
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::read_to_string;
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn chrom_sizes_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chr1\t20").unwrap();
        writeln!(file, "chr2\t10").unwrap();
        file
    }

    #[fixture]
    fn bed_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".bed").tempfile().unwrap();
        writeln!(file, "chr1\t0\t10\tread1_x3\t0\t+").unwrap();
        writeln!(file, "chr2\t2\t6\tread2\t0\t-").unwrap();
        file
    }

    fn base_config(
        bed_file: &tempfile::NamedTempFile,
        chrom_sizes_file: &tempfile::NamedTempFile,
        prefix: String,
    ) -> CoverageConfig {
        CoverageConfig {
            input: bed_file.path().to_path_buf(),
            input_format: FileType::Bed,
            chrom_sizes: Some(chrom_sizes_file.path().to_path_buf()),
            output_prefix: prefix,
            output_format: OutputFormat::BedGraph,
            step: 5,
            keep_uncovered: false,
            rpm: false,
            count_soft_clip: false,
            min_mapq: 0,
            strand: StrandFilter::Both,
            weight_source: WeightSource::Uniform,
            strict_bounds: false,
            regions: None,
            stats_out: None,
        }
    }

    #[rstest]
    fn test_coverage_main_bedgraph(
        bed_file: tempfile::NamedTempFile,
        chrom_sizes_file: tempfile::NamedTempFile,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("out").to_str().unwrap().to_string();
        let config = base_config(&bed_file, &chrom_sizes_file, prefix.clone());

        coverage_main(&config).unwrap();

        let contents = read_to_string(format!("{}.bedGraph", prefix)).unwrap();
        // chr1 1..10 covered; zero windows suppressed
        assert_eq!(contents, "chr1\t0\t5\t1\nchr1\t5\t10\t1\nchr2\t0\t5\t0.6\nchr2\t5\t10\t0.2\n");
    }

    #[rstest]
    fn test_coverage_main_strand_filter(
        bed_file: tempfile::NamedTempFile,
        chrom_sizes_file: tempfile::NamedTempFile,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("fwd").to_str().unwrap().to_string();
        let mut config = base_config(&bed_file, &chrom_sizes_file, prefix.clone());
        config.strand = StrandFilter::Forward;

        coverage_main(&config).unwrap();

        let contents = read_to_string(format!("{}.bedGraph", prefix)).unwrap();
        assert!(!contents.contains("chr2"));
    }

    #[rstest]
    fn test_coverage_main_clone_weights_and_stats(
        bed_file: tempfile::NamedTempFile,
        chrom_sizes_file: tempfile::NamedTempFile,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("clone").to_str().unwrap().to_string();
        let mut config = base_config(&bed_file, &chrom_sizes_file, prefix.clone());
        config.weight_source = WeightSource::CloneCount;
        config.stats_out = Some(dir.path().join("stats.json"));

        coverage_main(&config).unwrap();

        let contents = read_to_string(format!("{}.bedGraph", prefix)).unwrap();
        assert!(contents.starts_with("chr1\t0\t5\t3\n"));

        let stats = read_to_string(dir.path().join("stats.json")).unwrap();
        assert!(stats.contains("\"total_weight\": 4.0"));
    }

    #[rstest]
    fn test_coverage_main_wig_keeps_zero_windows(
        bed_file: tempfile::NamedTempFile,
        chrom_sizes_file: tempfile::NamedTempFile,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("wig").to_str().unwrap().to_string();
        let mut config = base_config(&bed_file, &chrom_sizes_file, prefix.clone());
        config.output_format = OutputFormat::Wig;

        coverage_main(&config).unwrap();

        let contents = read_to_string(format!("{}.wig", prefix)).unwrap();
        let expected = "fixedStep chrom=chr1 start=1 step=5\n1\n1\n0\n0\n\
                        fixedStep chrom=chr2 start=1 step=5\n0.6\n0.2\n";
        assert_eq!(contents, expected);
    }

    #[rstest]
    fn test_coverage_main_region_restriction(
        bed_file: tempfile::NamedTempFile,
        chrom_sizes_file: tempfile::NamedTempFile,
    ) {
        let mut regions = tempfile::Builder::new().suffix(".bed").tempfile().unwrap();
        // overlapping query regions collapse to chr1:3-12 (1-based)
        writeln!(regions, "chr1\t2\t8").unwrap();
        writeln!(regions, "chr1\t5\t12").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("roi").to_str().unwrap().to_string();
        let mut config = base_config(&bed_file, &chrom_sizes_file, prefix.clone());
        config.step = 100;
        config.regions = Some(regions.path().to_path_buf());

        coverage_main(&config).unwrap();

        let contents = read_to_string(format!("{}.bedGraph", prefix)).unwrap();
        // one window per merged region: chr1 cells 3..12, of which 3..10 hold 1.0
        assert_eq!(contents, "chr1\t2\t12\t0.8\n");
    }
}
