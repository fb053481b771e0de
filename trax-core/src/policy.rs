use std::str::FromStr;

use crate::errors::TraxError;

/// How positions outside a declared chromosome's bounds are handled.
///
/// The original tool family made this choice ad hoc per call site; here it is
/// a single explicit knob. Accumulation defaults to [`BoundsPolicy::Clamp`],
/// masking defaults to [`BoundsPolicy::Ignore`]. References to chromosomes
/// that were never declared are always skipped silently, independent of this
/// policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsPolicy {
    /// Truncate the out-of-range part of the request to the chromosome bounds.
    Clamp,
    /// Drop the whole request without error.
    Ignore,
}

/// Which strand of records participate in accumulation/classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrandFilter {
    #[default]
    Both,
    Forward,
    Reverse,
}

impl FromStr for StrandFilter {
    type Err = TraxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "both" => Ok(StrandFilter::Both),
            "+" | "forward" => Ok(StrandFilter::Forward),
            "-" | "reverse" => Ok(StrandFilter::Reverse),
            _ => Err(TraxError::UnknownOptionValue(s.to_string())),
        }
    }
}

/// Where a record's accumulation weight comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeightSource {
    /// Every record counts 1.
    #[default]
    Uniform,
    /// Multiplicity parsed from the read name (`..._x<N>` suffix), 1 when absent.
    CloneCount,
    /// Alignment probability derived from the phred-scaled mapping quality.
    MappingQuality,
}

impl FromStr for WeightSource {
    type Err = TraxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uniform" => Ok(WeightSource::Uniform),
            "clone" => Ok(WeightSource::CloneCount),
            "mapq" => Ok(WeightSource::MappingQuality),
            _ => Err(TraxError::UnknownOptionValue(s.to_string())),
        }
    }
}
