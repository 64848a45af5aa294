//! Decoding raw chunk NBT into chunk objects.
//!
//! Block data is only decoded from the paletted storage introduced in data
//! version 1444; older chunks load with default components and fail only if
//! legacy numerical block arrays are present. Callers supply the two
//! collaborators the decoder cannot know itself: the [`Dimension`]
//! providing default cell values and the [`GameTranslator`] mapping stored
//! states to their versioned form.

use std::collections::HashMap;

use fastnbt::Value;
use log::{debug, warn};

use lodestone_chunk::{Biome3dComponentData, BlockComponentData, Chunk, IndexArray3D};
use lodestone_common::error::{LodestoneError, Result};
use lodestone_state::{Biome, Block, BlockProperties, BlockStack, PropertyValue};
use lodestone_version::{VersionNumber, VersionRange};

use crate::chunk::{
    JavaChunk0, JavaChunk1444, JavaChunk1466, JavaChunk2203, JavaChunkNa, BIOME_SECTION_SHAPE,
    SECTION_SHAPE,
};
use crate::long_array::{decode_long_array, required_bits};

const PLATFORM: &str = "java";

/// Whether a block can hold water in the same cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waterloggable {
    /// The block never holds water.
    No,
    /// The block carries a `waterlogged` property declaring whether it does.
    Yes,
    /// The block always holds water and carries no property saying so.
    Always,
}

/// The dimension a chunk belongs to, as far as decoding is concerned.
pub trait Dimension {
    /// The block filling cells no stored section covers.
    fn default_block(&self) -> BlockStack;

    /// The biome filling cells no stored section covers.
    fn default_biome(&self) -> Biome;
}

/// Maps stored states to the form the target version expects.
pub trait GameTranslator {
    /// Translate a block to the target platform and version. `Ok(None)`
    /// means the block has no counterpart there and is dropped.
    fn translate_block(
        &self,
        platform: &str,
        version: &VersionNumber,
        block: &Block,
    ) -> Result<Option<Block>>;

    fn translate_biome(
        &self,
        platform: &str,
        version: &VersionNumber,
        biome: &Biome,
    ) -> Result<Biome>;

    fn waterloggable(&self, block: &Block) -> Waterloggable;
}

/// Decode a raw chunk into a chunk object.
///
/// `cx` and `cz` are the coordinates the chunk was read from; a chunk
/// claiming different coordinates is reported as corrupt.
pub fn decode_chunk(
    raw_chunk: &Value,
    dimension: &dyn Dimension,
    translator: &dyn GameTranslator,
    cx: i64,
    cz: i64,
) -> Result<Box<dyn Chunk>> {
    let root = as_compound(raw_chunk)
        .ok_or_else(|| corruption(cx, cz, "chunk root is not a compound"))?;
    let data_version = match root.get("DataVersion") {
        Some(Value::Int(v)) => *v as i64,
        Some(_) => return Err(corruption(cx, cz, "DataVersion is not an int")),
        None => -1,
    };
    let level = if data_version >= 2844 {
        root
    } else {
        get_compound(root, "Level")
            .ok_or_else(|| corruption(cx, cz, "missing Level compound"))?
    };

    let x_pos = level.get("xPos").and_then(as_i64);
    let z_pos = level.get("zPos").and_then(as_i64);
    if x_pos != Some(cx) || z_pos != Some(cz) {
        return Err(corruption(
            cx,
            cz,
            format!("chunk claims coordinates {:?},{:?}", x_pos, z_pos),
        ));
    }

    let sections_key = if data_version >= 2844 { "sections" } else { "Sections" };
    let sections: &[Value] = match level.get(sections_key) {
        Some(Value::List(list)) => list,
        None => &[],
        Some(_) => return Err(corruption(cx, cz, "section list is not a list")),
    };

    let version = VersionNumber::from([data_version]);
    let mut decoder = Decoder {
        dimension,
        translator,
        version: version.clone(),
        data_version,
        cx,
        cz,
        water: None,
    };

    if data_version < 1444 {
        let legacy_blocks = level.contains_key("Blocks")
            || sections.iter().any(|section| {
                as_compound(section).map_or(false, |section| section.contains_key("Blocks"))
            });
        if legacy_blocks {
            return Err(LodestoneError::Unsupported(format!(
                "numerical block storage (data version {}) is not supported",
                data_version
            )));
        }
        debug!(
            "chunk {},{}: data version {} predates paletted storage, loading default components",
            cx, cz, data_version
        );
        let blocks = BlockComponentData::new(
            single_version_range(&version)?,
            SECTION_SHAPE,
            decoder.default_block()?,
        )?;
        let raw = raw_chunk.clone();
        return if data_version < 0 {
            let mut chunk = JavaChunkNa::default();
            chunk.data_version.load(data_version);
            chunk.raw_chunk.load(raw);
            chunk.blocks.load(blocks);
            Ok(Box::new(chunk))
        } else {
            let mut chunk = JavaChunk0::default();
            chunk.data_version.load(data_version);
            chunk.raw_chunk.load(raw);
            chunk.blocks.load(blocks);
            Ok(Box::new(chunk))
        };
    }

    let mut blocks = BlockComponentData::new(
        single_version_range(&version)?,
        SECTION_SHAPE,
        decoder.default_block()?,
    )?;
    for section in sections {
        let section = as_compound(section)
            .ok_or_else(|| corruption(cx, cz, "section is not a compound"))?;
        let cy = section
            .get("Y")
            .and_then(as_i64)
            .ok_or_else(|| corruption(cx, cz, "section has no Y coordinate"))?;
        decoder.decode_section_blocks(section, cy, &mut blocks)?;
    }

    let raw = raw_chunk.clone();
    if data_version >= 2203 {
        let mut biomes = Biome3dComponentData::new(
            single_version_range(&version)?,
            BIOME_SECTION_SHAPE,
            decoder.default_biome()?,
        )?;
        if data_version >= 2836 {
            for section in sections {
                let section = as_compound(section)
                    .ok_or_else(|| corruption(cx, cz, "section is not a compound"))?;
                let cy = section
                    .get("Y")
                    .and_then(as_i64)
                    .ok_or_else(|| corruption(cx, cz, "section has no Y coordinate"))?;
                decoder.decode_section_biomes(section, cy, &mut biomes)?;
            }
        } else {
            debug!(
                "chunk {},{}: int array biomes in data version {} are not decoded",
                cx, cz, data_version
            );
        }
        let mut chunk = JavaChunk2203::default();
        chunk.data_version.load(data_version);
        chunk.raw_chunk.load(raw);
        chunk.blocks.load(blocks);
        chunk.biomes.load(biomes);
        Ok(Box::new(chunk))
    } else if data_version >= 1466 {
        let mut chunk = JavaChunk1466::default();
        chunk.data_version.load(data_version);
        chunk.raw_chunk.load(raw);
        chunk.blocks.load(blocks);
        Ok(Box::new(chunk))
    } else {
        let mut chunk = JavaChunk1444::default();
        chunk.data_version.load(data_version);
        chunk.raw_chunk.load(raw);
        chunk.blocks.load(blocks);
        Ok(Box::new(chunk))
    }
}

struct Decoder<'a> {
    dimension: &'a dyn Dimension,
    translator: &'a dyn GameTranslator,
    version: VersionNumber,
    data_version: i64,
    cx: i64,
    cz: i64,
    water: Option<Block>,
}

impl Decoder<'_> {
    /// The dimension default translated to the chunk version. Blocks
    /// already at the chunk version pass through untranslated; if every
    /// block is dropped by translation air stands in.
    fn default_block(&mut self) -> Result<BlockStack> {
        let range = single_version_range(&self.version)?;
        let mut blocks = Vec::new();
        for block in self.dimension.default_block().iter() {
            if range.contains(block.platform(), block.version()) {
                blocks.push(block.clone());
            } else if let Some(block) =
                self.translator
                    .translate_block(PLATFORM, &self.version, block)?
            {
                blocks.push(block);
            }
        }
        if blocks.is_empty() {
            warn!(
                "chunk {},{}: the default block has no blocks at data version {}, using air",
                self.cx, self.cz, self.data_version
            );
            blocks.push(Block::new(
                PLATFORM,
                self.version.clone(),
                "minecraft",
                "air",
            ));
        }
        BlockStack::new(blocks)
    }

    fn default_biome(&mut self) -> Result<Biome> {
        self.translator
            .translate_biome(PLATFORM, &self.version, &self.dimension.default_biome())
    }

    /// The water block appended to waterlogged cells, translated once per
    /// decode.
    fn water(&mut self) -> Result<Block> {
        if let Some(water) = &self.water {
            return Ok(water.clone());
        }
        let source = Block::with_properties(
            PLATFORM,
            VersionNumber::from([1, 20, 5]),
            "minecraft",
            "water",
            BlockProperties::from([(
                "level".to_string(),
                PropertyValue::String("0".to_string()),
            )]),
        );
        let water = self
            .translator
            .translate_block(PLATFORM, &self.version, &source)?
            .unwrap_or_else(|| {
                Block::with_properties(
                    PLATFORM,
                    self.version.clone(),
                    "minecraft",
                    "water",
                    BlockProperties::from([(
                        "level".to_string(),
                        PropertyValue::String("0".to_string()),
                    )]),
                )
            });
        self.water = Some(water.clone());
        Ok(water)
    }

    /// Translate a stored block and expand waterlogging into a block stack.
    fn block_stack(&mut self, block: Block) -> Result<BlockStack> {
        let block = match self
            .translator
            .translate_block(PLATFORM, &self.version, &block)?
        {
            Some(block) => block,
            None => {
                debug!(
                    "chunk {},{}: block {} was dropped by translation, using air",
                    self.cx, self.cz, block
                );
                Block::new(PLATFORM, self.version.clone(), "minecraft", "air")
            }
        };
        match self.translator.waterloggable(&block) {
            Waterloggable::No => Ok(BlockStack::single(block)),
            Waterloggable::Yes => {
                let mut properties = block.properties().clone();
                let waterlogged = matches!(
                    properties.remove("waterlogged"),
                    Some(PropertyValue::String(v)) if v == "true"
                );
                let block = Block::with_properties(
                    block.platform(),
                    block.version().clone(),
                    block.namespace(),
                    block.base_name(),
                    properties,
                );
                if waterlogged {
                    let water = self.water()?;
                    BlockStack::new(vec![block, water])
                } else {
                    Ok(BlockStack::single(block))
                }
            }
            Waterloggable::Always => {
                let water = self.water()?;
                BlockStack::new(vec![block, water])
            }
        }
    }

    fn decode_section_blocks(
        &mut self,
        section: &HashMap<String, Value>,
        cy: i64,
        blocks: &mut BlockComponentData,
    ) -> Result<()> {
        let (palette_nbt, data_nbt) = if self.data_version >= 2836 {
            match get_compound(section, "block_states") {
                Some(block_states) => (block_states.get("palette"), block_states.get("data")),
                None => (None, None),
            }
        } else {
            (section.get("Palette"), section.get("BlockStates"))
        };
        let palette_nbt = match palette_nbt {
            Some(palette_nbt) => palette_nbt,
            None => {
                debug!(
                    "chunk {},{}: section {} has no block palette",
                    self.cx, self.cz, cy
                );
                return Ok(());
            }
        };
        let palette = match palette_nbt {
            Value::List(list) if !list.is_empty() => list,
            _ => return Err(self.corrupt(format!("section {} has an empty block palette", cy))),
        };

        let mut lut = Vec::with_capacity(palette.len());
        for entry in palette {
            let entry = as_compound(entry)
                .ok_or_else(|| self.corrupt("block palette entry is not a compound"))?;
            let name = match entry.get("Name") {
                Some(Value::String(name)) => name,
                _ => return Err(self.corrupt("block palette entry has no Name")),
            };
            let (namespace, base_name) = match name.split_once(':') {
                Some((namespace, base_name)) => (namespace, base_name),
                None => ("minecraft", name.as_str()),
            };
            let mut properties = BlockProperties::new();
            if let Some(nbt_properties) = get_compound(entry, "Properties") {
                for (key, value) in nbt_properties {
                    match value {
                        Value::String(value) => {
                            properties.insert(
                                key.clone(),
                                PropertyValue::String(value.clone()),
                            );
                        }
                        _ => {
                            return Err(self.corrupt(format!(
                                "block property {} is not a string",
                                key
                            )))
                        }
                    }
                }
            }
            let stack = self.block_stack(Block::with_properties(
                PLATFORM,
                self.version.clone(),
                namespace,
                base_name,
                properties,
            ))?;
            lut.push(blocks.palette_mut().block_stack_to_index(stack)? as u32);
        }

        let array = match data_nbt {
            None => {
                debug!(
                    "chunk {},{}: section {} has no block data, filling with its first palette entry",
                    self.cx, self.cz, cy
                );
                IndexArray3D::new(SECTION_SHAPE, lut[0])
            }
            Some(Value::LongArray(data)) => {
                let bits = required_bits(lut.len() as u64 - 1, 4);
                let dense = self.data_version <= 2529;
                let local = decode_long_array(data, 4096, bits, dense)
                    .map_err(|e| self.corrupt(format!("section {}: {}", cy, e)))?;
                let mut array = IndexArray3D::new(SECTION_SHAPE, 0);
                // Stored order is y, z, x; the array is x major.
                for x in 0..16 {
                    for y in 0..16 {
                        for z in 0..16 {
                            let index = local[(y * 16 + z) * 16 + x] as usize;
                            let global = *lut.get(index).ok_or_else(|| {
                                self.corrupt(format!(
                                    "block index {} out of palette bounds in section {}",
                                    index, cy
                                ))
                            })?;
                            array.set(x, y, z, global);
                        }
                    }
                }
                array
            }
            Some(_) => {
                return Err(self.corrupt(format!("section {} block data is not a long array", cy)))
            }
        };
        blocks.sections_mut().set_section(cy, array)?;
        Ok(())
    }

    fn decode_section_biomes(
        &mut self,
        section: &HashMap<String, Value>,
        cy: i64,
        biomes: &mut Biome3dComponentData,
    ) -> Result<()> {
        let biomes_nbt = match get_compound(section, "biomes") {
            Some(biomes_nbt) => biomes_nbt,
            None => {
                debug!(
                    "chunk {},{}: section {} has no biome data",
                    self.cx, self.cz, cy
                );
                return Ok(());
            }
        };
        let palette = match biomes_nbt.get("palette") {
            Some(Value::List(list)) if !list.is_empty() => list,
            _ => return Err(self.corrupt(format!("section {} has an empty biome palette", cy))),
        };

        let mut lut = Vec::with_capacity(palette.len());
        for entry in palette {
            let name = match entry {
                Value::String(name) => name,
                _ => return Err(self.corrupt("biome palette entry is not a string")),
            };
            let (namespace, base_name) = match name.split_once(':') {
                Some((namespace, base_name)) => (namespace, base_name),
                None => ("minecraft", name.as_str()),
            };
            let biome = self.translator.translate_biome(
                PLATFORM,
                &self.version,
                &Biome::new(PLATFORM, self.version.clone(), namespace, base_name),
            )?;
            lut.push(biomes.palette_mut().biome_to_index(biome)? as u32);
        }

        let array = match biomes_nbt.get("data") {
            None => {
                debug!(
                    "chunk {},{}: section {} has no biome data, filling with its first palette entry",
                    self.cx, self.cz, cy
                );
                IndexArray3D::new(BIOME_SECTION_SHAPE, lut[0])
            }
            Some(Value::LongArray(data)) => {
                let bits = required_bits(lut.len() as u64 - 1, 1);
                let local = decode_long_array(data, 64, bits, false)
                    .map_err(|e| self.corrupt(format!("section {}: {}", cy, e)))?;
                let mut array = IndexArray3D::new(BIOME_SECTION_SHAPE, 0);
                for x in 0..4 {
                    for y in 0..4 {
                        for z in 0..4 {
                            let index = local[(y * 4 + z) * 4 + x] as usize;
                            let global = *lut.get(index).ok_or_else(|| {
                                self.corrupt(format!(
                                    "biome index {} out of palette bounds in section {}",
                                    index, cy
                                ))
                            })?;
                            array.set(x, y, z, global);
                        }
                    }
                }
                array
            }
            Some(_) => {
                return Err(self.corrupt(format!("section {} biome data is not a long array", cy)))
            }
        };
        biomes.sections_mut().set_section(cy, array)?;
        Ok(())
    }

    fn corrupt(&self, message: impl std::fmt::Display) -> LodestoneError {
        corruption(self.cx, self.cz, message)
    }
}

fn corruption(cx: i64, cz: i64, message: impl std::fmt::Display) -> LodestoneError {
    LodestoneError::Corruption(format!("chunk {},{}: {}", cx, cz, message))
}

fn single_version_range(version: &VersionNumber) -> Result<VersionRange> {
    VersionRange::new(PLATFORM, version.clone(), version.clone())
}

fn as_compound(value: &Value) -> Option<&HashMap<String, Value>> {
    match value {
        Value::Compound(map) => Some(map),
        _ => None,
    }
}

fn get_compound<'a>(
    map: &'a HashMap<String, Value>,
    key: &str,
) -> Option<&'a HashMap<String, Value>> {
    map.get(key).and_then(as_compound)
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Byte(v) => Some(*v as i64),
        Value::Short(v) => Some(*v as i64),
        Value::Int(v) => Some(*v as i64),
        Value::Long(v) => Some(*v),
        _ => None,
    }
}
