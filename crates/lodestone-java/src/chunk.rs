//! Java edition chunk types, one per era of the storage format.
//!
//! The eras are split on the data versions that changed the chunk layout:
//! 1444 introduced paletted block storage, 1466 restructured the chunk root
//! and 2203 added three dimensional biomes.

use std::collections::HashMap;

use fastnbt::Value;

use lodestone_chunk::{
    chunk_components, is_chunk_constructor_registered, register_chunk_constructor,
    unregister_chunk_constructor, Biome3dComponent, Biome3dComponentData, BlockComponent,
    BlockComponentData, Chunk, ChunkConstructor,
};
use lodestone_common::error::{LodestoneError, Result};
use lodestone_state::{Biome, BlockStack};
use lodestone_version::{VersionNumber, VersionRange};

use crate::components::{DataVersionComponent, RawChunkComponent};

/// The edge length of a block section.
pub const SECTION_SHAPE: (u16, u16, u16) = (16, 16, 16);

/// The shape of a three dimensional biome section. Biomes are stored at a
/// quarter of block resolution.
pub const BIOME_SECTION_SHAPE: (u16, u16, u16) = (4, 4, 4);

chunk_components! {
    /// A chunk from before the data version field existed.
    pub struct JavaChunkNa("java_chunk_na") {
        data_version: DataVersionComponent,
        raw_chunk: RawChunkComponent,
        blocks: BlockComponent,
    }
}

chunk_components! {
    /// A chunk from data versions 0 through 1443, with numerical block ids.
    pub struct JavaChunk0("java_chunk_0") {
        data_version: DataVersionComponent,
        raw_chunk: RawChunkComponent,
        blocks: BlockComponent,
    }
}

chunk_components! {
    /// A chunk from data versions 1444 through 1465, the first paletted era.
    pub struct JavaChunk1444("java_chunk_1444") {
        data_version: DataVersionComponent,
        raw_chunk: RawChunkComponent,
        blocks: BlockComponent,
    }
}

chunk_components! {
    /// A chunk from data versions 1466 through 2202.
    pub struct JavaChunk1466("java_chunk_1466") {
        data_version: DataVersionComponent,
        raw_chunk: RawChunkComponent,
        blocks: BlockComponent,
    }
}

chunk_components! {
    /// A chunk from data version 2203 onwards, with 3d biomes.
    pub struct JavaChunk2203("java_chunk_2203") {
        data_version: DataVersionComponent,
        raw_chunk: RawChunkComponent,
        blocks: BlockComponent,
        biomes: Biome3dComponent,
    }
}

fn check_data_version(data_version: i64, min: i64, max: i64) -> Result<()> {
    if !(min..=max).contains(&data_version) {
        return Err(LodestoneError::InvalidArgument(format!(
            "data version {} is outside {}..={}",
            data_version, min, max
        )));
    }
    Ok(())
}

fn single_version_range(data_version: i64) -> Result<VersionRange> {
    let version = VersionNumber::from([data_version]);
    VersionRange::new("java", version.clone(), version)
}

fn empty_compound() -> Value {
    Value::Compound(HashMap::new())
}

impl JavaChunkNa {
    pub fn new(default_block: BlockStack) -> Result<Self> {
        let mut chunk = Self::default();
        chunk.data_version.load(-1);
        chunk.raw_chunk.load(empty_compound());
        chunk.blocks.load(BlockComponentData::new(
            single_version_range(-1)?,
            SECTION_SHAPE,
            default_block,
        )?);
        Ok(chunk)
    }
}

impl JavaChunk0 {
    pub fn new(data_version: i64, default_block: BlockStack) -> Result<Self> {
        check_data_version(data_version, 0, 1443)?;
        let mut chunk = Self::default();
        chunk.data_version.load(data_version);
        chunk.raw_chunk.load(empty_compound());
        chunk.blocks.load(BlockComponentData::new(
            single_version_range(data_version)?,
            SECTION_SHAPE,
            default_block,
        )?);
        Ok(chunk)
    }
}

impl JavaChunk1444 {
    pub fn new(data_version: i64, default_block: BlockStack) -> Result<Self> {
        check_data_version(data_version, 1444, 1465)?;
        let mut chunk = Self::default();
        chunk.data_version.load(data_version);
        chunk.raw_chunk.load(empty_compound());
        chunk.blocks.load(BlockComponentData::new(
            single_version_range(data_version)?,
            SECTION_SHAPE,
            default_block,
        )?);
        Ok(chunk)
    }
}

impl JavaChunk1466 {
    pub fn new(data_version: i64, default_block: BlockStack) -> Result<Self> {
        check_data_version(data_version, 1466, 2202)?;
        let mut chunk = Self::default();
        chunk.data_version.load(data_version);
        chunk.raw_chunk.load(empty_compound());
        chunk.blocks.load(BlockComponentData::new(
            single_version_range(data_version)?,
            SECTION_SHAPE,
            default_block,
        )?);
        Ok(chunk)
    }
}

impl JavaChunk2203 {
    pub fn new(
        data_version: i64,
        default_block: BlockStack,
        default_biome: Biome,
    ) -> Result<Self> {
        check_data_version(data_version, 2203, i64::MAX)?;
        let mut chunk = Self::default();
        chunk.data_version.load(data_version);
        chunk.raw_chunk.load(empty_compound());
        chunk.blocks.load(BlockComponentData::new(
            single_version_range(data_version)?,
            SECTION_SHAPE,
            default_block,
        )?);
        chunk.biomes.load(Biome3dComponentData::new(
            single_version_range(data_version)?,
            BIOME_SECTION_SHAPE,
            default_biome,
        )?);
        Ok(chunk)
    }
}

const CHUNK_TYPES: &[(&str, ChunkConstructor)] = &[
    ("java_chunk_na", construct_na),
    ("java_chunk_0", construct_0),
    ("java_chunk_1444", construct_1444),
    ("java_chunk_1466", construct_1466),
    ("java_chunk_2203", construct_2203),
];

fn construct_na() -> Box<dyn Chunk> {
    Box::new(JavaChunkNa::default())
}

fn construct_0() -> Box<dyn Chunk> {
    Box::new(JavaChunk0::default())
}

fn construct_1444() -> Box<dyn Chunk> {
    Box::new(JavaChunk1444::default())
}

fn construct_1466() -> Box<dyn Chunk> {
    Box::new(JavaChunk1466::default())
}

fn construct_2203() -> Box<dyn Chunk> {
    Box::new(JavaChunk2203::default())
}

/// Register constructors for every Java chunk type. Already registered
/// types are left untouched, so this is safe to call more than once.
pub fn register_chunk_types() -> Result<()> {
    for (chunk_id, constructor) in CHUNK_TYPES {
        if !is_chunk_constructor_registered(chunk_id) {
            register_chunk_constructor(*chunk_id, *constructor)?;
        }
    }
    Ok(())
}

/// Remove the constructors added by [`register_chunk_types`].
pub fn unregister_chunk_types() {
    for (chunk_id, _) in CHUNK_TYPES {
        if is_chunk_constructor_registered(chunk_id) {
            let _ = unregister_chunk_constructor(chunk_id);
        }
    }
}
