//! Ordered version numbers, platform tags and version ranges.
//!
//! Every versioned value in lodestone (blocks, biomes, palettes) is gated on
//! these types. Version numbers compare as if right-padded with zeros to the
//! longer length, so `1.0` and `1.0.0` are equal.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use lodestone_common::binary::{check_format_version, BinaryReader, BinaryWriter, Serializable};
use lodestone_common::error::{LodestoneError, Result};

/// The string tag identifying a game platform, e.g. `"java"` or `"bedrock"`.
pub type PlatformType = String;

/// An ordered sequence of signed version components.
///
/// This stores semantic versions (`1.20.5`) as well as single-number data
/// versions (`3578`). Indexing past the stored length yields zero.
#[derive(Debug, Clone, Default)]
pub struct VersionNumber {
    components: Vec<i64>,
}

impl VersionNumber {
    pub fn new(components: Vec<i64>) -> Self {
        Self { components }
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The component at `index`, or zero past the stored length.
    pub fn get(&self, index: usize) -> i64 {
        self.components.get(index).copied().unwrap_or(0)
    }

    pub fn components(&self) -> &[i64] {
        &self.components
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.components.iter().copied()
    }

    /// The version number with trailing zeros cut off.
    pub fn cropped(&self) -> VersionNumber {
        let mut end = self.components.len();
        while end > 0 && self.components[end - 1] == 0 {
            end -= 1;
        }
        VersionNumber::new(self.components[..end].to_vec())
    }

    /// The version number padded with zeros to the given length.
    pub fn padded(&self, len: usize) -> VersionNumber {
        VersionNumber::new((0..len).map(|i| self.get(i)).collect())
    }
}

impl From<&[i64]> for VersionNumber {
    fn from(components: &[i64]) -> Self {
        VersionNumber::new(components.to_vec())
    }
}

impl<const N: usize> From<[i64; N]> for VersionNumber {
    fn from(components: [i64; N]) -> Self {
        VersionNumber::new(components.to_vec())
    }
}

impl PartialEq for VersionNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionNumber {}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        let max_len = self.len().max(other.len());
        for i in 0..max_len {
            match self.get(i).cmp(&other.get(i)) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        Ordering::Equal
    }
}

impl Hash for VersionNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Hash the cropped form so equal values hash equally.
        self.cropped().components.hash(state);
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", component)?;
        }
        Ok(())
    }
}

impl Serializable for VersionNumber {
    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u8(1);
        writer.write_u64(self.components.len() as u64);
        for component in &self.components {
            writer.write_i64(*component);
        }
    }

    fn read(reader: &mut BinaryReader) -> Result<Self> {
        check_format_version("VersionNumber", reader.read_u8()?, 1)?;
        let count = reader.read_u64()? as usize;
        let mut components = Vec::with_capacity(count);
        for _ in 0..count {
            components.push(reader.read_i64()?);
        }
        Ok(VersionNumber::new(components))
    }
}

/// A version number qualified by the platform it belongs to.
///
/// Ordering is lexicographic over (platform, version).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlatformVersionContainer {
    platform: PlatformType,
    version: VersionNumber,
}

impl PlatformVersionContainer {
    pub fn new(platform: impl Into<PlatformType>, version: VersionNumber) -> Self {
        Self {
            platform: platform.into(),
            version,
        }
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn version(&self) -> &VersionNumber {
        &self.version
    }
}

impl Serializable for PlatformVersionContainer {
    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u8(1);
        writer.write_string(&self.platform);
        self.version.write(writer);
    }

    fn read(reader: &mut BinaryReader) -> Result<Self> {
        check_format_version("PlatformVersionContainer", reader.read_u8()?, 1)?;
        let platform = reader.read_string()?;
        let version = VersionNumber::read(reader)?;
        Ok(PlatformVersionContainer::new(platform, version))
    }
}

/// An inclusive range of versions on a single platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    platform: PlatformType,
    min_version: VersionNumber,
    max_version: VersionNumber,
}

impl VersionRange {
    /// Fails if `min_version` is greater than `max_version`.
    pub fn new(
        platform: impl Into<PlatformType>,
        min_version: VersionNumber,
        max_version: VersionNumber,
    ) -> Result<Self> {
        if min_version > max_version {
            return Err(LodestoneError::InvalidArgument(format!(
                "min_version {} must be less than or equal to max_version {}",
                min_version, max_version
            )));
        }
        Ok(Self {
            platform: platform.into(),
            min_version,
            max_version,
        })
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn min_version(&self) -> &VersionNumber {
        &self.min_version
    }

    pub fn max_version(&self) -> &VersionNumber {
        &self.max_version
    }

    /// Whether the platform matches and the version falls within the
    /// inclusive bounds.
    pub fn contains(&self, platform: &str, version: &VersionNumber) -> bool {
        self.platform == platform && self.min_version <= *version && *version <= self.max_version
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "VersionRange(\"{}\", {}, {})",
            self.platform, self.min_version, self.max_version
        )
    }
}

impl Serializable for VersionRange {
    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u8(1);
        writer.write_string(&self.platform);
        self.min_version.write(writer);
        self.max_version.write(writer);
    }

    fn read(reader: &mut BinaryReader) -> Result<Self> {
        check_format_version("VersionRange", reader.read_u8()?, 1)?;
        let platform = reader.read_string()?;
        let min_version = VersionNumber::read(reader)?;
        let max_version = VersionNumber::read(reader)?;
        VersionRange::new(platform, min_version, max_version)
    }
}
