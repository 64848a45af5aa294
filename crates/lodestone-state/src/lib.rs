//! Version-qualified block and biome state types and their textual formats.

mod biome;
mod block;
mod blockstate;
mod property;

pub use biome::Biome;
pub use block::{Block, BlockProperties, BlockStack};
pub use property::PropertyValue;
