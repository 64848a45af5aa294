use std::error::Error;
use std::fmt;

/// Error type shared by every lodestone crate.
#[derive(Debug)]
pub enum LodestoneError {
    /// Malformed input: bad blockstate syntax, an inverted version range,
    /// an unsupported binary format tag, a wrong long array length and
    /// similar. Raised at the point of detection, never corrected.
    InvalidArgument(String),
    /// A chunk component was accessed before its data was populated.
    NotLoaded(String),
    /// A palette or section array lookup by an absent key or index.
    NotFound(String),
    /// Fatal decode error, e.g. a chunk coordinate mismatch or a palette
    /// index overflow. Aborts decoding of the chunk entirely.
    Corruption(String),
    /// An explicitly unimplemented format branch.
    Unsupported(String),
}

impl fmt::Display for LodestoneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LodestoneError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            LodestoneError::NotLoaded(msg) => write!(f, "Not loaded: {}", msg),
            LodestoneError::NotFound(msg) => write!(f, "Not found: {}", msg),
            LodestoneError::Corruption(msg) => write!(f, "Corrupted data: {}", msg),
            LodestoneError::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
        }
    }
}

impl Error for LodestoneError {}

pub type Result<T> = std::result::Result<T, LodestoneError>;
