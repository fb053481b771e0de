use std::collections::{BTreeMap, BTreeSet};

use bitvec::prelude::*;
use fxhash::FxHashMap;

use trax_core::policy::BoundsPolicy;

/// Per-chromosome collection of named bit-vectors, one bit per 0-based
/// position. A label's vector is created lazily on its first mask and its
/// length is fixed to the chromosome length.
pub struct BitMask {
    len: usize,
    masks: FxHashMap<String, BitVec<u64, Lsb0>>,
}

impl BitMask {
    fn new(len: usize) -> Self {
        BitMask {
            len,
            masks: FxHashMap::default(),
        }
    }

    fn mask(&mut self, start: usize, end: usize, label: &str, bounds: BoundsPolicy) {
        let (start, end) = match bounds {
            BoundsPolicy::Clamp => (start.min(self.len), end.min(self.len)),
            BoundsPolicy::Ignore => {
                if start > end || end > self.len {
                    return;
                }
                (start, end)
            }
        };
        if start >= end {
            return;
        }

        let len = self.len;
        let bits = self
            .masks
            .entry(label.to_string())
            .or_insert_with(|| bitvec![u64, Lsb0; 0; len]);
        bits[start..end].fill(true);
    }

    fn labels_in(&self, start: usize, end: usize) -> BTreeSet<String> {
        let end = end.min(self.len);
        let start = start.min(end);

        let mut labels = BTreeSet::new();
        for (label, bits) in self.masks.iter() {
            if bits[start..end].any() {
                labels.insert(label.clone());
            }
        }
        labels
    }

    fn counts_in(&self, start: usize, end: usize) -> BTreeMap<String, u32> {
        let end = end.min(self.len);
        let start = start.min(end);

        let mut counts = BTreeMap::new();
        for (label, bits) in self.masks.iter() {
            let ones = bits[start..end].count_ones();
            if ones > 0 {
                counts.insert(label.clone(), ones as u32);
            }
        }
        counts
    }
}

/// Genome-wide label index: chromosome name -> [`BitMask`].
///
/// Chromosomes must be registered through [`LabelBitIndex::add_chr`] before
/// masking; masks against unregistered chromosomes are dropped silently so
/// annotations on unindexed contigs cannot abort a run. Queries scan every
/// stored label over the requested range — label cardinality per chromosome
/// is expected to stay in the tens.
pub struct LabelBitIndex {
    chroms: FxHashMap<String, BitMask>,
    bounds: BoundsPolicy,
}

impl Default for LabelBitIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelBitIndex {
    /// An index that silently ignores out-of-range masks (the historical
    /// behavior for annotations running past declared chromosome ends).
    pub fn new() -> Self {
        Self::with_bounds(BoundsPolicy::Ignore)
    }

    pub fn with_bounds(bounds: BoundsPolicy) -> Self {
        LabelBitIndex {
            chroms: FxHashMap::default(),
            bounds,
        }
    }

    /// Register a chromosome's length. Required before any masking on it.
    pub fn add_chr(&mut self, chr: &str, len: u32) {
        self.chroms
            .insert(chr.to_string(), BitMask::new(len as usize));
    }

    pub fn has_chr(&self, chr: &str) -> bool {
        self.chroms.contains_key(chr)
    }

    /// Set bits `[start, end)` (0-based) for `label` on `chr`. Unknown
    /// chromosomes and, per the bounds policy, out-of-range requests are
    /// ignored without error.
    pub fn mask_region(&mut self, chr: &str, start: u32, end: u32, label: &str) {
        let bounds = self.bounds;
        if let Some(mask) = self.chroms.get_mut(chr) {
            mask.mask(start as usize, end as usize, label, bounds);
        }
    }

    /// Labels with at least one set bit anywhere in `[start, end)`. Empty
    /// for unknown chromosomes; the query range is clamped.
    pub fn unmask(&self, chr: &str, start: u32, end: u32) -> BTreeSet<String> {
        match self.chroms.get(chr) {
            Some(mask) => mask.labels_in(start as usize, end as usize),
            None => BTreeSet::new(),
        }
    }

    /// Per-label count of set bits in `[start, end)` — an overlap length,
    /// not a presence flag. Labels without overlap are absent from the map.
    pub fn unmask_sum(&self, chr: &str, start: u32, end: u32) -> BTreeMap<String, u32> {
        match self.chroms.get(chr) {
            Some(mask) => mask.counts_in(start as usize, end as usize),
            None => BTreeMap::new(),
        }
    }
}
