//! The block component: a block palette plus per-section index arrays.

use bytes::Bytes;

use lodestone_common::binary::{
    check_format_version, from_bytes, to_bytes, BinaryReader, BinaryWriter, Serializable,
};
use lodestone_common::error::{LodestoneError, Result};
use lodestone_palette::BlockPalette;
use lodestone_state::BlockStack;
use lodestone_version::VersionRange;

use crate::component::Component;
use crate::section::{SectionArrayMap, SectionDefault};

/// The loaded state of a [`BlockComponent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockComponentData {
    palette: BlockPalette,
    sections: SectionArrayMap,
}

impl BlockComponentData {
    /// Create empty block data. The default block becomes palette entry 0
    /// and fills any section materialized without explicit data.
    pub fn new(
        version_range: VersionRange,
        array_shape: (u16, u16, u16),
        default_block: BlockStack,
    ) -> Result<Self> {
        let mut palette = BlockPalette::new(version_range);
        let default_index = palette.block_stack_to_index(default_block)? as u32;
        Ok(Self {
            palette,
            sections: SectionArrayMap::new(array_shape, SectionDefault::Uniform(default_index))?,
        })
    }

    pub fn palette(&self) -> &BlockPalette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut BlockPalette {
        &mut self.palette
    }

    pub fn sections(&self) -> &SectionArrayMap {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut SectionArrayMap {
        &mut self.sections
    }
}

impl Serializable for BlockComponentData {
    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u8(1);
        self.palette.write(writer);
        self.sections.write(writer);
    }

    fn read(reader: &mut BinaryReader) -> Result<Self> {
        check_format_version("BlockComponentData", reader.read_u8()?, 1)?;
        let palette = BlockPalette::read(reader)?;
        let sections = SectionArrayMap::read(reader)?;
        Ok(Self { palette, sections })
    }
}

/// The chunk component holding block data. Starts unloaded.
#[derive(Debug, Default)]
pub struct BlockComponent {
    data: Option<BlockComponentData>,
}

impl BlockComponent {
    pub const COMPONENT_ID: &'static str = "lodestone:block_component";

    pub fn load(&mut self, data: BlockComponentData) {
        self.data = Some(data);
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    pub fn get(&self) -> Result<&BlockComponentData> {
        self.data.as_ref().ok_or_else(not_loaded)
    }

    pub fn get_mut(&mut self) -> Result<&mut BlockComponentData> {
        self.data.as_mut().ok_or_else(not_loaded)
    }

    /// Replace the loaded data. The replacement must keep the section shape
    /// and the palette's version range of the current data.
    pub fn set(&mut self, data: BlockComponentData) -> Result<()> {
        let current = self.data.as_ref().ok_or_else(not_loaded)?;
        if data.sections.array_shape() != current.sections.array_shape() {
            return Err(LodestoneError::InvalidArgument(format!(
                "section shape {:?} does not match {:?}",
                data.sections.array_shape(),
                current.sections.array_shape()
            )));
        }
        if data.palette.version_range() != current.palette.version_range() {
            return Err(LodestoneError::InvalidArgument(
                "palette version range does not match".to_string(),
            ));
        }
        self.data = Some(data);
        Ok(())
    }
}

fn not_loaded() -> LodestoneError {
    LodestoneError::NotLoaded("the block component has not been loaded".to_string())
}

impl Component for BlockComponent {
    fn component_id(&self) -> &'static str {
        Self::COMPONENT_ID
    }

    fn serialize(&self) -> Result<Option<Bytes>> {
        Ok(self.data.as_ref().map(|data| Bytes::from(to_bytes(data))))
    }

    fn reconstruct(&mut self, data: Option<Bytes>) -> Result<()> {
        self.data = match data {
            Some(bytes) => Some(from_bytes(&bytes)?),
            None => None,
        };
        Ok(())
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

    fn air() -> BlockStack {
        BlockStack::single(Block::new(
            "java",
            VersionNumber::from([1, 5]),
            "minecraft",
            "air",
        ))
    }

    #[test]
    fn test_default_block_is_entry_zero() {
        let data = BlockComponentData::new(range(), (16, 16, 16), air()).unwrap();
        assert_eq!(data.palette().len(), 1);
        assert_eq!(data.palette().index_to_block_stack(0).unwrap(), &air());
        assert_matches!(data.sections().default(), SectionDefault::Uniform(0));
    }

    #[test]
    fn test_unloaded_access_fails() {
        let mut component = BlockComponent::default();
        assert!(!component.is_loaded());
        assert_matches!(component.get(), Err(LodestoneError::NotLoaded(_)));
        assert_matches!(component.get_mut(), Err(LodestoneError::NotLoaded(_)));
        assert_matches!(
            component.set(BlockComponentData::new(range(), (16, 16, 16), air()).unwrap()),
            Err(LodestoneError::NotLoaded(_))
        );
    }

    #[test]
    fn test_set_validates_shape_and_version_range() {
        let mut component = BlockComponent::default();
        component.load(BlockComponentData::new(range(), (16, 16, 16), air()).unwrap());

        assert_matches!(
            component.set(BlockComponentData::new(range(), (4, 4, 4), air()).unwrap()),
            Err(LodestoneError::InvalidArgument(_))
        );

        let other_range = VersionRange::new(
            "java",
            VersionNumber::from([1, 0]),
            VersionNumber::from([3, 0]),
        )
        .unwrap();
        assert_matches!(
            component.set(BlockComponentData::new(other_range, (16, 16, 16), air()).unwrap()),
            Err(LodestoneError::InvalidArgument(_))
        );

        component
            .set(BlockComponentData::new(range(), (16, 16, 16), air()).unwrap())
            .unwrap();
    }

    #[test]
    fn test_component_round_trip() {
        let mut component = BlockComponent::default();
        let mut data = BlockComponentData::new(range(), (2, 2, 2), air()).unwrap();
        let stone = BlockStack::single(Block::new(
            "java",
            VersionNumber::from([1, 5]),
            "minecraft",
            "stone",
        ));
        let stone_index = data.palette_mut().block_stack_to_index(stone).unwrap() as u32;
        data.sections_mut().populate_section(0).set(1, 1, 1, stone_index);
        component.load(data.clone());

        let bytes = component.serialize().unwrap();
        assert!(bytes.is_some());

        let mut restored = BlockComponent::default();
        restored.reconstruct(bytes).unwrap();
        assert_eq!(restored.get().unwrap(), &data);

        restored.reconstruct(None).unwrap();
        assert!(!restored.is_loaded());
    }
}
