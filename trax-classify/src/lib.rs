pub mod annotate;
pub mod bitmask;

// re-exports
pub use annotate::{
    AttributionMode, LabelSource, UNCLASSIFIED_LABEL, attribute_value, label_counts_for_blocks,
    label_fractions_for_blocks, labels_for_blocks, load_annotations,
};
pub use bitmask::{BitMask, LabelBitIndex};
