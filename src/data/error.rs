use thiserror::Error;

/// Structural problems with an input file. Row-level oddities (bad numbers,
/// missing magnitudes) are not errors; they degrade to `NaN`.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("required column '{0}' is missing")]
    MissingColumn(&'static str),

    #[error("expected a top-level JSON array of records")]
    NotAnArray,

    #[error("record {0} is not a JSON object")]
    NotAnObject(usize),
}
