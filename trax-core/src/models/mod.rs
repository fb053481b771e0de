pub mod alignment;
pub mod genome_interval;

// re-export for cleaner imports
pub use self::alignment::{AlnOp, AlnOpKind, AlnRecord, Strand, WalkPolicy, reference_blocks};
pub use self::genome_interval::{GenomeInterval, optimize_intervals};
