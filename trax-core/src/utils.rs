use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use fxhash::FxHashMap;

use crate::errors::TraxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Bed,
    Bam,
    Unknown,
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bed" => Ok(FileType::Bed),
            "bam" => Ok(FileType::Bam),
            _ => Ok(FileType::Unknown),
        }
    }
}

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension().is_some_and(|ext| ext == "gz");
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// Read a chromosome sizes table: one `name<ws>length` pair per line, blank
/// lines skipped. A malformed line fails the whole run.
pub fn read_chrom_sizes(path: &Path) -> Result<FxHashMap<String, u32>, TraxError> {
    let reader = BufReader::new(
        File::open(path).map_err(|_| TraxError::FileReadError(path.display().to_string()))?,
    );

    let mut chrom_sizes: FxHashMap<String, u32> = FxHashMap::default();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let name = fields
            .next()
            .ok_or_else(|| TraxError::ChromSizesParseError(line.clone()))?;
        let size = fields
            .next()
            .and_then(|s| s.parse::<u32>().ok())
            .ok_or_else(|| TraxError::ChromSizesParseError(line.clone()))?;

        chrom_sizes.insert(name.to_string(), size);
    }

    Ok(chrom_sizes)
}

/// Parse one BED-like line into (chrom, start, end), ignoring any further
/// columns. Returns None for malformed coordinate fields.
pub fn parse_bedlike_line(line: &str) -> Option<(String, u32, u32)> {
    let mut fields = line.split('\t');
    let ctg = fields.next()?;
    let st = fields.next().and_then(|s| s.parse::<u32>().ok())?;
    let en = fields.next().and_then(|s| s.parse::<u32>().ok())?;

    Some((ctg.trim().to_string(), st, en))
}

/// True for BED header/comment lines that carry no interval.
pub fn is_bed_header_line(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
}

/// Parse a clone multiplicity from a collapsed-read name.
///
/// Recognizes the `..._x<N>` suffix convention (e.g. `read17_x42` carries 42
/// collapsed clones). Names without the suffix get None; callers fall back to
/// a weight of 1.
pub fn clone_count_from_name(name: &str) -> Option<u32> {
    let (_, suffix) = name.rsplit_once("_x")?;
    if suffix.is_empty() {
        return None;
    }
    suffix.parse::<u32>().ok()
}
