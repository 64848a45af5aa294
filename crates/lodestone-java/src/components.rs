//! Components specific to Java edition chunks.

use bytes::Bytes;
use fastnbt::Value;

use lodestone_chunk::Component;
use lodestone_common::binary::{check_format_version, BinaryReader, BinaryWriter};
use lodestone_common::error::{LodestoneError, Result};

/// The data version the chunk was saved with. `-1` for saves predating the
/// data version field.
#[derive(Debug, Default)]
pub struct DataVersionComponent {
    data_version: Option<i64>,
}

impl DataVersionComponent {
    pub const COMPONENT_ID: &'static str = "lodestone:data_version_component";

    pub fn load(&mut self, data_version: i64) {
        self.data_version = Some(data_version);
    }

    pub fn is_loaded(&self) -> bool {
        self.data_version.is_some()
    }

    pub fn get(&self) -> Result<i64> {
        self.data_version.ok_or_else(|| {
            LodestoneError::NotLoaded("the data version component has not been loaded".to_string())
        })
    }
}

impl Component for DataVersionComponent {
    fn component_id(&self) -> &'static str {
        Self::COMPONENT_ID
    }

    fn serialize(&self) -> Result<Option<Bytes>> {
        Ok(self.data_version.map(|data_version| {
            let mut writer = BinaryWriter::new();
            writer.write_u8(1);
            writer.write_i64(data_version);
            Bytes::from(writer.into_bytes())
        }))
    }

    fn reconstruct(&mut self, data: Option<Bytes>) -> Result<()> {
        self.data_version = match data {
            Some(bytes) => {
                let mut reader = BinaryReader::new(&bytes);
                check_format_version("DataVersionComponent", reader.read_u8()?, 1)?;
                Some(reader.read_i64()?)
            }
            None => None,
        };
        Ok(())
    }
}

/// The chunk's NBT data as it was read from storage, kept so fields this
/// library does not model survive a load and save cycle.
#[derive(Debug, Default)]
pub struct RawChunkComponent {
    raw_chunk: Option<Value>,
}

impl RawChunkComponent {
    pub const COMPONENT_ID: &'static str = "lodestone:raw_chunk_component";

    pub fn load(&mut self, raw_chunk: Value) {
        self.raw_chunk = Some(raw_chunk);
    }

    pub fn is_loaded(&self) -> bool {
        self.raw_chunk.is_some()
    }

    pub fn get(&self) -> Result<&Value> {
        self.raw_chunk.as_ref().ok_or_else(|| {
            LodestoneError::NotLoaded("the raw chunk component has not been loaded".to_string())
        })
    }
}

impl Component for RawChunkComponent {
    fn component_id(&self) -> &'static str {
        Self::COMPONENT_ID
    }

    fn serialize(&self) -> Result<Option<Bytes>> {
        match &self.raw_chunk {
            Some(raw_chunk) => {
                let bytes = fastnbt::to_bytes(raw_chunk).map_err(|e| {
                    LodestoneError::InvalidArgument(format!(
                        "failed to serialize raw chunk data: {}",
                        e
                    ))
                })?;
                Ok(Some(Bytes::from(bytes)))
            }
            None => Ok(None),
        }
    }

    fn reconstruct(&mut self, data: Option<Bytes>) -> Result<()> {
        self.raw_chunk = match data {
            Some(bytes) => Some(fastnbt::from_bytes(&bytes).map_err(|e| {
                LodestoneError::InvalidArgument(format!(
                    "failed to deserialize raw chunk data: {}",
                    e
                ))
            })?),
            None => None,
        };
        Ok(())
    }
}
