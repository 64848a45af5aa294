pub mod binary;
pub mod error;

pub use binary::{BinaryReader, BinaryWriter, Serializable};
pub use error::{LodestoneError, Result};
