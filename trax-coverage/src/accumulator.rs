use fxhash::FxHashMap;

use trax_core::policy::BoundsPolicy;
use trax_core::stats;

/// Per-chromosome dense coverage accumulator.
///
/// One `f64` cell per base position, 1-based; cell 0 is reserved and never
/// written. Arrays are sized once from the chromosome-length table and never
/// resized. Records referencing chromosomes absent from the table are
/// skipped silently (region-restricted inputs are expected to touch only a
/// subset of chromosomes); positions outside a declared chromosome follow
/// the configured [`BoundsPolicy`].
pub struct PositionalAccumulator {
    tracks: FxHashMap<String, Vec<f64>>,
    bounds: BoundsPolicy,
    total_weight: f64,
}

impl PositionalAccumulator {
    /// Allocate a zeroed track per chromosome, clamping out-of-range
    /// positions to the chromosome bounds.
    pub fn new(chrom_sizes: &FxHashMap<String, u32>) -> Self {
        Self::with_bounds(chrom_sizes, BoundsPolicy::Clamp)
    }

    pub fn with_bounds(chrom_sizes: &FxHashMap<String, u32>, bounds: BoundsPolicy) -> Self {
        let mut tracks: FxHashMap<String, Vec<f64>> = FxHashMap::default();
        for (chrom, len) in chrom_sizes.iter() {
            tracks.insert(chrom.clone(), vec![0.0; *len as usize + 1]);
        }

        PositionalAccumulator {
            tracks,
            bounds,
            total_weight: 0.0,
        }
    }

    /// Chromosome names, sorted for deterministic output order.
    pub fn chrom_names(&self) -> Vec<&String> {
        let mut names: Vec<&String> = self.tracks.keys().collect();
        names.sort();
        names
    }

    pub fn chrom_len(&self, chr: &str) -> Option<u32> {
        self.tracks.get(chr).map(|track| track.len() as u32 - 1)
    }

    /// Add `weight` to every position of the closed 1-based `[start, end]`
    /// range. Used by the region-driven tools where each BED record covers
    /// its full span.
    pub fn add_region(&mut self, chr: &str, start: u32, end: u32, weight: f64) {
        let bounds = self.bounds;
        let Some(track) = self.tracks.get_mut(chr) else {
            return;
        };

        let len = track.len() as u32 - 1;
        let (start, end) = match bounds {
            BoundsPolicy::Clamp => (start.max(1), end.min(len)),
            BoundsPolicy::Ignore => {
                if start < 1 || end > len {
                    return;
                }
                (start, end)
            }
        };
        if start > end {
            return;
        }

        for cell in &mut track[start as usize..=end as usize] {
            *cell += weight;
        }
        self.total_weight += weight;
    }

    /// Add `weight` to every position covered by the walker's 1-based,
    /// half-open `(start, end)` blocks. The record's weight counts once
    /// toward the normalization total no matter how many blocks it spans.
    pub fn add_blocks(&mut self, chr: &str, blocks: &[(u32, u32)], weight: f64) {
        let bounds = self.bounds;
        let Some(track) = self.tracks.get_mut(chr) else {
            return;
        };

        let len = track.len() as u32 - 1;
        for &(start, end) in blocks {
            let (start, end) = match bounds {
                BoundsPolicy::Clamp => (start.max(1), end.min(len + 1)),
                BoundsPolicy::Ignore => {
                    if start < 1 || end > len + 1 {
                        continue;
                    }
                    (start, end)
                }
            };
            if start >= end {
                continue;
            }

            for cell in &mut track[start as usize..end as usize] {
                *cell += weight;
            }
        }
        self.total_weight += weight;
    }

    /// Arithmetic mean of the cells in the half-open 1-based `[start, end)`
    /// range. NaN for an unknown chromosome or an empty range. Note the
    /// asymmetry with the closed accumulation ranges above; the step/window
    /// reporting depends on this query being half-open.
    pub fn mean(&self, chr: &str, start: u32, end: u32) -> f64 {
        match self.tracks.get(chr) {
            None => f64::NAN,
            Some(track) => stats::window_mean(track, start as usize, end as usize),
        }
    }

    /// Sum of the cells in the half-open 1-based `[start, end)` range;
    /// 0.0 for an unknown chromosome.
    pub fn sum(&self, chr: &str, start: u32, end: u32) -> f64 {
        match self.tracks.get(chr) {
            None => 0.0,
            Some(track) => {
                let end = (end as usize).min(track.len());
                let start = (start as usize).min(end);
                track[start..end].iter().sum()
            }
        }
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Reads-per-million scale factor, computed from the accumulated total.
    /// Call after the full accumulation pass; 1.0 when nothing was added.
    pub fn rpm_factor(&self) -> f64 {
        if self.total_weight > 0.0 {
            1e6 / self.total_weight
        } else {
            1.0
        }
    }
}
