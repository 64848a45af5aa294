//! The three dimensional biome component.

use bytes::Bytes;

use lodestone_common::binary::{
    check_format_version, from_bytes, to_bytes, BinaryReader, BinaryWriter, Serializable,
};
use lodestone_common::error::{LodestoneError, Result};
use lodestone_palette::BiomePalette;
use lodestone_state::Biome;
use lodestone_version::VersionRange;

use crate::component::Component;
use crate::section::{SectionArrayMap, SectionDefault};

/// The loaded state of a [`Biome3dComponent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Biome3dComponentData {
    palette: BiomePalette,
    sections: SectionArrayMap,
}

impl Biome3dComponentData {
    /// Create empty biome data. The default biome becomes palette entry 0.
    pub fn new(
        version_range: VersionRange,
        array_shape: (u16, u16, u16),
        default_biome: Biome,
    ) -> Result<Self> {
        let mut palette = BiomePalette::new(version_range);
        let default_index = palette.biome_to_index(default_biome)? as u32;
        Ok(Self {
            palette,
            sections: SectionArrayMap::new(array_shape, SectionDefault::Uniform(default_index))?,
        })
    }

    pub fn palette(&self) -> &BiomePalette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut BiomePalette {
        &mut self.palette
    }

    pub fn sections(&self) -> &SectionArrayMap {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut SectionArrayMap {
        &mut self.sections
    }
}

impl Serializable for Biome3dComponentData {
    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u8(1);
        self.palette.write(writer);
        self.sections.write(writer);
    }

    fn read(reader: &mut BinaryReader) -> Result<Self> {
        check_format_version("Biome3dComponentData", reader.read_u8()?, 1)?;
        let palette = BiomePalette::read(reader)?;
        let sections = SectionArrayMap::read(reader)?;
        Ok(Self { palette, sections })
    }
}

/// The chunk component holding 3d biome data. Starts unloaded.
#[derive(Debug, Default)]
pub struct Biome3dComponent {
    data: Option<Biome3dComponentData>,
}

impl Biome3dComponent {
    pub const COMPONENT_ID: &'static str = "lodestone:biome_3d_component";

    pub fn load(&mut self, data: Biome3dComponentData) {
        self.data = Some(data);
    }

    pub fn is_loaded(&self) -> bool {
        self.data.is_some()
    }

    pub fn get(&self) -> Result<&Biome3dComponentData> {
        self.data.as_ref().ok_or_else(not_loaded)
    }

    pub fn get_mut(&mut self) -> Result<&mut Biome3dComponentData> {
        self.data.as_mut().ok_or_else(not_loaded)
    }

    /// Replace the loaded data, keeping the section shape and version range.
    pub fn set(&mut self, data: Biome3dComponentData) -> Result<()> {
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
    LodestoneError::NotLoaded("the biome component has not been loaded".to_string())
}

impl Component for Biome3dComponent {
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
