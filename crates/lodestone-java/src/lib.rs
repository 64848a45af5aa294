//! Java edition chunk types and the decoder turning raw chunk NBT into
//! them.

mod chunk;
mod components;
mod decode;
pub mod long_array;

pub use chunk::{
    register_chunk_types, unregister_chunk_types, JavaChunk0, JavaChunk1444, JavaChunk1466,
    JavaChunk2203, JavaChunkNa, BIOME_SECTION_SHAPE, SECTION_SHAPE,
};
pub use components::{DataVersionComponent, RawChunkComponent};
pub use decode::{decode_chunk, Dimension, GameTranslator, Waterloggable};
