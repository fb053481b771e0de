use std::fs::{File, OpenOptions, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::windows::Window;

/// Totals reported after a full accumulation pass.
#[derive(Debug, Serialize)]
pub struct RunStats {
    pub records: u64,
    pub total_weight: f64,
    pub rpm_factor: f64,
}

fn open_append(filename: &str) -> Result<File> {
    if let Some(parent) = Path::new(filename).parent() {
        create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(filename)?;
    Ok(file)
}

/// Write one block of windows as a fixedStep wiggle section.
///
/// fixedStep has no way to skip positions, so callers must pass the full
/// (unsuppressed) window list for the section, starting at `start_position`.
pub fn write_to_wig_file(
    windows: &[Window],
    filename: &str,
    chromname: &str,
    start_position: u32,
    stepsize: u32,
) -> Result<()> {
    let file = open_append(filename)?;
    let mut buf = BufWriter::new(file);

    writeln!(
        &mut buf,
        "fixedStep chrom={} start={} step={}",
        chromname, start_position, stepsize
    )?;
    for (_, _, value) in windows.iter() {
        writeln!(&mut buf, "{}", value)?;
    }
    buf.flush()?;

    Ok(())
}

/// Write one chromosome's windows as bedGraph rows (0-based half-open).
pub fn write_to_bed_graph_file(windows: &[Window], filename: &str, chromname: &str) -> Result<()> {
    let file = open_append(filename)?;
    let mut buf = BufWriter::new(file);

    for (start, end, value) in windows.iter() {
        writeln!(&mut buf, "{}\t{}\t{}\t{}", chromname, start - 1, end - 1, value)?;
    }
    buf.flush()?;

    Ok(())
}

/// Write the run summary as pretty JSON.
pub fn write_stats_json(path: &Path, stats: &RunStats) -> Result<()> {
    let json_string = serde_json::to_string_pretty(stats)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;

    Ok(())
}
