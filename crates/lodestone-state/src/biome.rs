//! The immutable biome model.

use std::fmt;

use lodestone_common::binary::{check_format_version, BinaryReader, BinaryWriter, Serializable};
use lodestone_common::error::Result;
use lodestone_version::{PlatformVersionContainer, VersionNumber};

/// A version-qualified biome: namespace and base name, no properties.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Biome {
    platform_version: PlatformVersionContainer,
    namespace: String,
    base_name: String,
}

impl Biome {
    pub fn new(
        platform: impl Into<String>,
        version: VersionNumber,
        namespace: impl Into<String>,
        base_name: impl Into<String>,
    ) -> Self {
        Self {
            platform_version: PlatformVersionContainer::new(platform, version),
            namespace: namespace.into(),
            base_name: base_name.into(),
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

    pub fn namespaced_name(&self) -> String {
        format!("{}:{}", self.namespace, self.base_name)
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.namespaced_name())
    }
}

impl Serializable for Biome {
    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u8(1);
        self.platform_version.write(writer);
        writer.write_string(&self.namespace);
        writer.write_string(&self.base_name);
    }

    fn read(reader: &mut BinaryReader) -> Result<Self> {
        check_format_version("Biome", reader.read_u8()?, 1)?;
        let platform_version = PlatformVersionContainer::read(reader)?;
        let namespace = reader.read_string()?;
        let base_name = reader.read_string()?;
        Ok(Biome {
            platform_version,
            namespace,
            base_name,
        })
    }
}
