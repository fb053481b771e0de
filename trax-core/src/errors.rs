use thiserror::Error;

#[derive(Error, Debug)]
pub enum TraxError {
    #[error("Can't read file: {0}")]
    FileReadError(String),

    #[error("Malformed chrom sizes line: {0}")]
    ChromSizesParseError(String),

    #[error("Error parsing region: {0}")]
    RegionParseError(String),

    #[error("Inverted interval (start > end): {0}:{1}-{2}")]
    InvertedInterval(String, u32, u32),

    #[error("Error parsing annotation line: {0}")]
    AnnotationParseError(String),

    #[error("Unknown option value: {0}")]
    UnknownOptionValue(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
