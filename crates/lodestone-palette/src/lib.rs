//! Append-only deduplicating palettes mapping indices to block stacks and
//! biomes.
//!
//! A palette is created with a version range and refuses entries outside it.
//! Once an entry is assigned an index that index never changes, so arrays of
//! palette indices stay valid for the life of the palette.

use std::collections::HashMap;

use lodestone_common::binary::{check_format_version, BinaryReader, BinaryWriter, Serializable};
use lodestone_common::error::{LodestoneError, Result};
use lodestone_state::{Biome, BlockStack};
use lodestone_version::VersionRange;

/// A palette of [`BlockStack`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPalette {
    version_range: VersionRange,
    entries: Vec<BlockStack>,
    indices: HashMap<BlockStack, usize>,
}

impl BlockPalette {
    pub fn new(version_range: VersionRange) -> Self {
        Self {
            version_range,
            entries: Vec::new(),
            indices: HashMap::new(),
        }
    }

    pub fn version_range(&self) -> &VersionRange {
        &self.version_range
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, stack: &BlockStack) -> bool {
        self.indices.contains_key(stack)
    }

    /// The index of `stack`, inserting it if absent.
    ///
    /// Fails if any block in the stack falls outside the palette's version
    /// range. Re-inserting an existing stack returns its original index.
    pub fn block_stack_to_index(&mut self, stack: BlockStack) -> Result<usize> {
        if let Some(&index) = self.indices.get(&stack) {
            return Ok(index);
        }
        for block in stack.iter() {
            if !self
                .version_range
                .contains(block.platform(), block.version())
            {
                return Err(LodestoneError::InvalidArgument(format!(
                    "block {} is incompatible with {}",
                    block, self.version_range
                )));
            }
        }
        let index = self.entries.len();
        self.entries.push(stack.clone());
        self.indices.insert(stack, index);
        Ok(index)
    }

    /// The stack stored at `index`.
    pub fn index_to_block_stack(&self, index: usize) -> Result<&BlockStack> {
        self.entries.get(index).ok_or_else(|| {
            LodestoneError::NotFound(format!("no block palette entry at index {}", index))
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BlockStack> {
        self.entries.iter()
    }
}

impl Serializable for BlockPalette {
    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u8(1);
        self.version_range.write(writer);
        writer.write_u64(self.entries.len() as u64);
        for stack in &self.entries {
            stack.write(writer);
        }
    }

    fn read(reader: &mut BinaryReader) -> Result<Self> {
        check_format_version("BlockPalette", reader.read_u8()?, 1)?;
        let version_range = VersionRange::read(reader)?;
        let count = reader.read_u64()?;
        let mut palette = BlockPalette::new(version_range);
        for _ in 0..count {
            palette.block_stack_to_index(BlockStack::read(reader)?)?;
        }
        Ok(palette)
    }
}

/// A palette of [`Biome`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiomePalette {
    version_range: VersionRange,
    entries: Vec<Biome>,
    indices: HashMap<Biome, usize>,
}

impl BiomePalette {
    pub fn new(version_range: VersionRange) -> Self {
        Self {
            version_range,
            entries: Vec::new(),
            indices: HashMap::new(),
        }
    }

    pub fn version_range(&self) -> &VersionRange {
        &self.version_range
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, biome: &Biome) -> bool {
        self.indices.contains_key(biome)
    }

    /// The index of `biome`, inserting it if absent.
    pub fn biome_to_index(&mut self, biome: Biome) -> Result<usize> {
        if let Some(&index) = self.indices.get(&biome) {
            return Ok(index);
        }
        if !self
            .version_range
            .contains(biome.platform(), biome.version())
        {
            return Err(LodestoneError::InvalidArgument(format!(
                "biome {} is incompatible with {}",
                biome, self.version_range
            )));
        }
        let index = self.entries.len();
        self.entries.push(biome.clone());
        self.indices.insert(biome, index);
        Ok(index)
    }

    /// The biome stored at `index`.
    pub fn index_to_biome(&self, index: usize) -> Result<&Biome> {
        self.entries.get(index).ok_or_else(|| {
            LodestoneError::NotFound(format!("no biome palette entry at index {}", index))
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Biome> {
        self.entries.iter()
    }
}

impl Serializable for BiomePalette {
    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u8(1);
        self.version_range.write(writer);
        writer.write_u64(self.entries.len() as u64);
        for biome in &self.entries {
            biome.write(writer);
        }
    }

    fn read(reader: &mut BinaryReader) -> Result<Self> {
        check_format_version("BiomePalette", reader.read_u8()?, 1)?;
        let version_range = VersionRange::read(reader)?;
        let count = reader.read_u64()?;
        let mut palette = BiomePalette::new(version_range);
        for _ in 0..count {
            palette.biome_to_index(Biome::read(reader)?)?;
        }
        Ok(palette)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use lodestone_state::Block;
    use lodestone_version::VersionNumber;

    fn range() -> VersionRange {
        VersionRange::new(
            "java",
            VersionNumber::from([1, 0]),
            VersionNumber::from([2, 0]),
        )
        .unwrap()
    }

    fn stone() -> BlockStack {
        BlockStack::single(Block::new(
            "java",
            VersionNumber::from([1, 5]),
            "minecraft",
            "stone",
        ))
    }

    #[test]
    fn test_insert_deduplicates() {
        let mut palette = BlockPalette::new(range());
        assert_eq!(palette.block_stack_to_index(stone()).unwrap(), 0);
        assert_eq!(palette.block_stack_to_index(stone()).unwrap(), 0);
        assert_eq!(palette.len(), 1);
        assert!(palette.contains(&stone()));
    }

    #[test]
    fn test_indices_are_stable() {
        let mut palette = BlockPalette::new(range());
        let dirt = BlockStack::single(Block::new(
            "java",
            VersionNumber::from([1, 5]),
            "minecraft",
            "dirt",
        ));
        assert_eq!(palette.block_stack_to_index(stone()).unwrap(), 0);
        assert_eq!(palette.block_stack_to_index(dirt.clone()).unwrap(), 1);
        assert_eq!(palette.index_to_block_stack(0).unwrap(), &stone());
        assert_eq!(palette.index_to_block_stack(1).unwrap(), &dirt);
    }

    #[test]
    fn test_out_of_range_block_rejected() {
        let mut palette = BlockPalette::new(range());
        let future = BlockStack::single(Block::new(
            "java",
            VersionNumber::from([3, 0]),
            "minecraft",
            "stone",
        ));
        assert_matches!(
            palette.block_stack_to_index(future),
            Err(LodestoneError::InvalidArgument(_))
        );
        assert!(palette.is_empty());
    }

    #[test]
    fn test_every_block_in_stack_is_validated() {
        let mut palette = BlockPalette::new(range());
        let stack = BlockStack::new(vec![
            Block::new("java", VersionNumber::from([1, 5]), "minecraft", "kelp"),
            Block::new("bedrock", VersionNumber::from([1, 5]), "minecraft", "water"),
        ])
        .unwrap();
        assert_matches!(
            palette.block_stack_to_index(stack),
            Err(LodestoneError::InvalidArgument(_))
        );
    }

    #[test]
    fn test_missing_index_fails() {
        let palette = BlockPalette::new(range());
        assert_matches!(
            palette.index_to_block_stack(0),
            Err(LodestoneError::NotFound(_))
        );
    }

    #[test]
    fn test_biome_palette() {
        let mut palette = BiomePalette::new(range());
        let plains = Biome::new("java", VersionNumber::from([1, 5]), "minecraft", "plains");
        assert_eq!(palette.biome_to_index(plains.clone()).unwrap(), 0);
        assert_eq!(palette.biome_to_index(plains.clone()).unwrap(), 0);
        assert_eq!(palette.index_to_biome(0).unwrap(), &plains);

        let alien = Biome::new("bedrock", VersionNumber::from([1, 5]), "minecraft", "plains");
        assert_matches!(
            palette.biome_to_index(alien),
            Err(LodestoneError::InvalidArgument(_))
        );
    }

    #[test]
    fn test_serialization_round_trip() {
        use lodestone_common::binary::{from_bytes, to_bytes};
        let mut palette = BlockPalette::new(range());
        palette.block_stack_to_index(stone()).unwrap();
        palette
            .block_stack_to_index(BlockStack::single(Block::new(
                "java",
                VersionNumber::from([1, 5]),
                "minecraft",
                "dirt",
            )))
            .unwrap();
        let read: BlockPalette = from_bytes(&to_bytes(&palette)).unwrap();
        assert_eq!(read, palette);
    }
}
