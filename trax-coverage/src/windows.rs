use crate::accumulator::PositionalAccumulator;

/// Fixed-step downsampling options.
#[derive(Debug, Clone, Copy)]
pub struct WindowOptions {
    pub step: u32,
    /// Emit zero-valued windows instead of suppressing them.
    pub keep_uncovered: bool,
    /// Multiplier applied to every reported value (1.0, or the RPM factor).
    pub scale: f64,
}

impl Default for WindowOptions {
    fn default() -> Self {
        WindowOptions {
            step: 1,
            keep_uncovered: false,
            scale: 1.0,
        }
    }
}

/// One reported window: 1-based half-open `[start, end)` and its value.
pub type Window = (u32, u32, f64);

/// Windowed means over a whole chromosome.
///
/// Walks `start` from 1 in `step` increments; each window reports
/// `mean(start, min(start + step, len + 1))` so the final base is included
/// despite the half-open query. Zero windows are dropped unless
/// `keep_uncovered` is set.
pub fn chrom_windows(
    acc: &PositionalAccumulator,
    chr: &str,
    opts: &WindowOptions,
) -> Vec<Window> {
    match acc.chrom_len(chr) {
        Some(len) => range_windows(acc, chr, 1, len, opts),
        None => Vec::new(),
    }
}

/// Windowed means restricted to the closed 1-based `[from, to]` range —
/// used when an optimized region list limits the scan.
pub fn range_windows(
    acc: &PositionalAccumulator,
    chr: &str,
    from: u32,
    to: u32,
    opts: &WindowOptions,
) -> Vec<Window> {
    let step = opts.step.max(1);
    let mut windows: Vec<Window> = Vec::new();

    let mut start = from;
    while start <= to {
        let end = (start + step).min(to + 1);
        let value = acc.mean(chr, start, end);
        if value.is_nan() {
            break;
        }

        if value != 0.0 || opts.keep_uncovered {
            windows.push((start, end, value * opts.scale));
        }
        start += step;
    }

    windows
}

#[cfg(test)]
mod tests {
    use super::*;

    use fxhash::FxHashMap;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn acc() -> PositionalAccumulator {
        let sizes: FxHashMap<String, u32> = [("chr1".to_string(), 10)].into_iter().collect();
        let mut acc = PositionalAccumulator::new(&sizes);
        acc.add_region("chr1", 1, 4, 2.0);
        acc
    }

    #[rstest]
    fn test_windows_cover_whole_chromosome(acc: PositionalAccumulator) {
        let windows = chrom_windows(
            &acc,
            "chr1",
            &WindowOptions {
                step: 5,
                keep_uncovered: true,
                scale: 1.0,
            },
        );
        assert_eq!(windows, vec![(1, 6, 1.6), (6, 11, 0.0)]);
    }

    #[rstest]
    fn test_zero_windows_suppressed_by_default(acc: PositionalAccumulator) {
        let windows = chrom_windows(
            &acc,
            "chr1",
            &WindowOptions {
                step: 5,
                ..Default::default()
            },
        );
        assert_eq!(windows, vec![(1, 6, 1.6)]);
    }

    #[rstest]
    fn test_scale_is_applied(acc: PositionalAccumulator) {
        let windows = chrom_windows(
            &acc,
            "chr1",
            &WindowOptions {
                step: 5,
                keep_uncovered: false,
                scale: 10.0,
            },
        );
        assert_eq!(windows, vec![(1, 6, 16.0)]);
    }

    #[rstest]
    fn test_unknown_chromosome_yields_nothing(acc: PositionalAccumulator) {
        let windows = chrom_windows(&acc, "chrUn", &WindowOptions::default());
        assert!(windows.is_empty());
    }

    #[rstest]
    fn test_range_windows_respect_bounds(acc: PositionalAccumulator) {
        let windows = range_windows(
            &acc,
            "chr1",
            3,
            8,
            &WindowOptions {
                step: 3,
                keep_uncovered: true,
                scale: 1.0,
            },
        );
        // [3,6) covers cells 3..5 of which 3,4 hold 2.0
        assert_eq!(windows, vec![(3, 6, 4.0 / 3.0), (6, 9, 0.0)]);
    }
}
