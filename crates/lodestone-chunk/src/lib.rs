//! Chunks as bags of independently loadable components, plus the section
//! storage they are built from.

mod biome_component;
mod block_component;
mod component;
mod registry;
mod section;

pub use biome_component::{Biome3dComponent, Biome3dComponentData};
pub use block_component::{BlockComponent, BlockComponentData};
pub use component::{Chunk, Component};
pub use registry::{
    construct_null_chunk, is_chunk_constructor_registered, register_chunk_constructor,
    unregister_chunk_constructor, ChunkConstructor,
};
pub use section::{IndexArray3D, SectionArrayMap, SectionDefault};

// Re-exported for the chunk_components macro.
#[doc(hidden)]
pub use bytes::Bytes;
#[doc(hidden)]
pub use lodestone_common::error::{LodestoneError, Result};
