//! The immutable block state model.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use lodestone_common::binary::{check_format_version, BinaryReader, BinaryWriter, Serializable};
use lodestone_common::error::{LodestoneError, Result};
use lodestone_version::{PlatformVersionContainer, VersionNumber};

use crate::property::PropertyValue;

/// The property map of a block. Keys iterate in lexicographic order.
pub type BlockProperties = BTreeMap<String, PropertyValue>;

/// A version-qualified block state: namespace, base name and a typed
/// property map. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Block {
    platform_version: PlatformVersionContainer,
    namespace: String,
    base_name: String,
    properties: BlockProperties,
}

impl Block {
    pub fn new(
        platform: impl Into<String>,
        version: VersionNumber,
        namespace: impl Into<String>,
        base_name: impl Into<String>,
    ) -> Self {
        Self::with_properties(platform, version, namespace, base_name, BlockProperties::new())
    }

    pub fn with_properties(
        platform: impl Into<String>,
        version: VersionNumber,
        namespace: impl Into<String>,
        base_name: impl Into<String>,
        properties: BlockProperties,
    ) -> Self {
        Self {
            platform_version: PlatformVersionContainer::new(platform, version),
            namespace: namespace.into(),
            base_name: base_name.into(),
            properties,
        }
    }

    pub fn platform(&self) -> &str {
        self.platform_version.platform()
    }

    pub fn version(&self) -> &VersionNumber {
        self.platform_version.version()
    }

    pub fn platform_version(&self) -> &PlatformVersionContainer {
        &self.platform_version
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// The `namespace:base_name` pair without properties.
    pub fn namespaced_name(&self) -> String {
        format!("{}:{}", self.namespace, self.base_name)
    }

    pub fn properties(&self) -> &BlockProperties {
        &self.properties
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.namespaced_name())
    }
}

impl Serializable for Block {
    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u8(1);
        self.platform_version.write(writer);
        writer.write_string(&self.namespace);
        writer.write_string(&self.base_name);
        writer.write_u64(self.properties.len() as u64);
        for (name, value) in &self.properties {
            writer.write_string(name);
            value.write(writer);
        }
    }

    fn read(reader: &mut BinaryReader) -> Result<Self> {
        check_format_version("Block", reader.read_u8()?, 1)?;
        let platform_version = PlatformVersionContainer::read(reader)?;
        let namespace = reader.read_string()?;
        let base_name = reader.read_string()?;
        let count = reader.read_u64()?;
        let mut properties = BlockProperties::new();
        for _ in 0..count {
            let name = reader.read_string()?;
            let value = PropertyValue::read(reader)?;
            properties.insert(name, value);
        }
        Ok(Block {
            platform_version,
            namespace,
            base_name,
            properties,
        })
    }
}

/// A non-empty ordered list of blocks occupying one cell.
///
/// Index 0 is the base block; any further entries are extra layered blocks,
/// most commonly the water block of a waterlogged cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockStack {
    blocks: Vec<Block>,
}

impl BlockStack {
    /// Fails if `blocks` is empty.
    pub fn new(blocks: Vec<Block>) -> Result<Self> {
        if blocks.is_empty() {
            return Err(LodestoneError::InvalidArgument(
                "a BlockStack must contain at least one block".to_string(),
            ));
        }
        Ok(Self { blocks })
    }

    /// A stack of a single block.
    pub fn single(block: Block) -> Self {
        Self {
            blocks: vec![block],
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn base_block(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn extra_blocks(&self) -> &[Block] {
        &self.blocks[1..]
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }
}

impl PartialOrd for BlockStack {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BlockStack {
    // Shorter stacks order first; equal-length stacks compare element-wise.
    fn cmp(&self, other: &Self) -> Ordering {
        self.len()
            .cmp(&other.len())
            .then_with(|| self.blocks.cmp(&other.blocks))
    }
}

impl Serializable for BlockStack {
    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u8(1);
        writer.write_u64(self.blocks.len() as u64);
        for block in &self.blocks {
            block.write(writer);
        }
    }

    fn read(reader: &mut BinaryReader) -> Result<Self> {
        check_format_version("BlockStack", reader.read_u8()?, 1)?;
        let count = reader.read_u64()?;
        let mut blocks = Vec::new();
        for _ in 0..count {
            blocks.push(Block::read(reader)?);
        }
        BlockStack::new(blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use lodestone_common::binary::{from_bytes, to_bytes};

    fn test_block() -> Block {
        Block::with_properties(
            "java",
            VersionNumber::from([3578]),
            "namespace",
            "basename",
            BlockProperties::from([
                ("byte".to_string(), PropertyValue::Byte(1)),
                ("short".to_string(), PropertyValue::Short(2)),
                ("int".to_string(), PropertyValue::Int(4)),
                ("long".to_string(), PropertyValue::Long(8)),
                ("string".to_string(), PropertyValue::String("hi".to_string())),
            ]),
        )
    }

    #[test]
    fn test_equality_is_structural() {
        assert_eq!(test_block(), test_block());

        let other_version = Block::with_properties(
            "java",
            VersionNumber::from([3579]),
            "namespace",
            "basename",
            test_block().properties().clone(),
        );
        assert_ne!(test_block(), other_version);

        let other_property = Block::with_properties(
            "java",
            VersionNumber::from([3578]),
            "namespace",
            "basename",
            BlockProperties::from([("byte".to_string(), PropertyValue::Byte(2))]),
        );
        assert_ne!(test_block(), other_property);
    }

    #[test]
    fn test_padded_version_equality() {
        let a = Block::new("java", VersionNumber::from([1, 0]), "minecraft", "stone");
        let b = Block::new("java", VersionNumber::from([1, 0, 0]), "minecraft", "stone");
        assert_eq!(a, b);
    }

    #[test]
    fn test_block_stack_must_not_be_empty() {
        assert_matches!(
            BlockStack::new(vec![]),
            Err(LodestoneError::InvalidArgument(_))
        );
    }

    #[test]
    fn test_block_stack_accessors() {
        let base = Block::new("java", VersionNumber::from([3578]), "minecraft", "kelp");
        let water = Block::new("java", VersionNumber::from([3578]), "minecraft", "water");
        let stack = BlockStack::new(vec![base.clone(), water.clone()]).unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.base_block(), &base);
        assert_eq!(stack.extra_blocks(), &[water]);
    }

    #[test]
    fn test_block_stack_orders_by_length_first() {
        let a = Block::new("java", VersionNumber::from([1]), "minecraft", "zzz");
        let b = Block::new("java", VersionNumber::from([1]), "minecraft", "aaa");
        let short = BlockStack::single(a);
        let long = BlockStack::new(vec![b.clone(), b]).unwrap();
        assert!(short < long);
    }

    #[test]
    fn test_serialization_round_trip() {
        let block = test_block();
        let read: Block = from_bytes(&to_bytes(&block)).unwrap();
        assert_eq!(read, block);

        let stack = BlockStack::new(vec![test_block(), test_block()]).unwrap();
        let read: BlockStack = from_bytes(&to_bytes(&stack)).unwrap();
        assert_eq!(read, stack);
    }
}
