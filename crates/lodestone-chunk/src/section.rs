//! Dense palette-index arrays and the per-section map holding them.

use std::collections::HashMap;
use std::sync::Arc;

use lodestone_common::binary::{check_format_version, BinaryReader, BinaryWriter, Serializable};
use lodestone_common::error::{LodestoneError, Result};

/// A dense three dimensional array of palette indices.
///
/// Storage is row major with x as the slowest axis, so the flat index of
/// `(x, y, z)` is `(x * size_y + y) * size_z + z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexArray3D {
    shape: (u16, u16, u16),
    data: Box<[u32]>,
}

impl IndexArray3D {
    /// An array of the given shape with every element set to `fill`.
    pub fn new(shape: (u16, u16, u16), fill: u32) -> Self {
        Self {
            shape,
            data: vec![fill; volume(shape)].into_boxed_slice(),
        }
    }

    /// Wrap an existing flat buffer. Fails if the buffer length does not
    /// match the shape's volume.
    pub fn from_data(shape: (u16, u16, u16), data: Vec<u32>) -> Result<Self> {
        if data.len() != volume(shape) {
            return Err(LodestoneError::InvalidArgument(format!(
                "buffer of length {} does not match shape {:?}",
                data.len(),
                shape
            )));
        }
        Ok(Self {
            shape,
            data: data.into_boxed_slice(),
        })
    }

    pub fn shape(&self) -> (u16, u16, u16) {
        self.shape
    }

    pub fn volume(&self) -> usize {
        self.data.len()
    }

    pub fn get(&self, x: usize, y: usize, z: usize) -> u32 {
        self.data[self.flat_index(x, y, z)]
    }

    pub fn set(&mut self, x: usize, y: usize, z: usize, value: u32) {
        let index = self.flat_index(x, y, z);
        self.data[index] = value;
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u32] {
        &mut self.data
    }

    fn flat_index(&self, x: usize, y: usize, z: usize) -> usize {
        let (sx, sy, sz) = self.shape;
        debug_assert!(x < sx as usize && y < sy as usize && z < sz as usize);
        (x * sy as usize + y) * sz as usize + z
    }
}

fn volume(shape: (u16, u16, u16)) -> usize {
    shape.0 as usize * shape.1 as usize * shape.2 as usize
}

/// The value a [`SectionArrayMap`] materializes absent sections from.
#[derive(Debug, Clone)]
pub enum SectionDefault {
    /// Fill new sections with a single palette index.
    Uniform(u32),
    /// Copy new sections from a template array.
    Array(Arc<IndexArray3D>),
}

/// A map from section y coordinate to a palette-index array.
///
/// Every stored array shares one shape. Sections that have never been
/// written are absent from the map; [`SectionArrayMap::populate_section`]
/// materializes them from the default on first mutable access.
#[derive(Debug, Clone)]
pub struct SectionArrayMap {
    array_shape: (u16, u16, u16),
    default: SectionDefault,
    sections: HashMap<i64, IndexArray3D>,
}

impl SectionArrayMap {
    pub fn new(array_shape: (u16, u16, u16), default: SectionDefault) -> Result<Self> {
        if let SectionDefault::Array(array) = &default {
            if array.shape() != array_shape {
                return Err(LodestoneError::InvalidArgument(format!(
                    "default array shape {:?} does not match section shape {:?}",
                    array.shape(),
                    array_shape
                )));
            }
        }
        Ok(Self {
            array_shape,
            default,
            sections: HashMap::new(),
        })
    }

    pub fn array_shape(&self) -> (u16, u16, u16) {
        self.array_shape
    }

    pub fn default(&self) -> &SectionDefault {
        &self.default
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn contains_section(&self, cy: i64) -> bool {
        self.sections.contains_key(&cy)
    }

    pub fn get_section(&self, cy: i64) -> Option<&IndexArray3D> {
        self.sections.get(&cy)
    }

    pub fn get_section_mut(&mut self, cy: i64) -> Option<&mut IndexArray3D> {
        self.sections.get_mut(&cy)
    }

    /// Store an array at `cy`, replacing any existing one. Fails if the
    /// array's shape differs from the map's shape.
    pub fn set_section(&mut self, cy: i64, array: IndexArray3D) -> Result<()> {
        if array.shape() != self.array_shape {
            return Err(LodestoneError::InvalidArgument(format!(
                "array shape {:?} does not match section shape {:?}",
                array.shape(),
                self.array_shape
            )));
        }
        self.sections.insert(cy, array);
        Ok(())
    }

    /// The array at `cy`, materialized from the default if absent.
    pub fn populate_section(&mut self, cy: i64) -> &mut IndexArray3D {
        let array_shape = self.array_shape;
        let default = &self.default;
        self.sections.entry(cy).or_insert_with(|| match default {
            SectionDefault::Uniform(fill) => IndexArray3D::new(array_shape, *fill),
            SectionDefault::Array(array) => IndexArray3D::clone(array),
        })
    }

    pub fn remove_section(&mut self, cy: i64) -> Option<IndexArray3D> {
        self.sections.remove(&cy)
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &IndexArray3D)> {
        self.sections.iter().map(|(&cy, array)| (cy, array))
    }

    pub fn section_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.sections.keys().copied()
    }
}

impl PartialEq for SectionArrayMap {
    fn eq(&self, other: &Self) -> bool {
        let default_eq = match (&self.default, &other.default) {
            (SectionDefault::Uniform(a), SectionDefault::Uniform(b)) => a == b,
            (SectionDefault::Array(a), SectionDefault::Array(b)) => a == b,
            _ => false,
        };
        default_eq && self.array_shape == other.array_shape && self.sections == other.sections
    }
}

impl Eq for SectionArrayMap {}

fn write_array_data(writer: &mut BinaryWriter, array: &IndexArray3D) {
    for value in array.data() {
        writer.write_u32(*value);
    }
}

fn read_array_data(
    reader: &mut BinaryReader,
    shape: (u16, u16, u16),
) -> Result<IndexArray3D> {
    let mut data = Vec::with_capacity(volume(shape));
    for _ in 0..volume(shape) {
        data.push(reader.read_u32()?);
    }
    IndexArray3D::from_data(shape, data)
}

impl Serializable for SectionArrayMap {
    fn write(&self, writer: &mut BinaryWriter) {
        writer.write_u8(1);
        writer.write_u16(self.array_shape.0);
        writer.write_u16(self.array_shape.1);
        writer.write_u16(self.array_shape.2);
        match &self.default {
            SectionDefault::Uniform(fill) => {
                writer.write_u8(0);
                writer.write_u32(*fill);
            }
            SectionDefault::Array(array) => {
                writer.write_u8(1);
                write_array_data(writer, array);
            }
        }
        writer.write_u64(self.sections.len() as u64);
        for (cy, array) in &self.sections {
            writer.write_i64(*cy);
            write_array_data(writer, array);
        }
    }

    fn read(reader: &mut BinaryReader) -> Result<Self> {
        check_format_version("SectionArrayMap", reader.read_u8()?, 1)?;
        let array_shape = (reader.read_u16()?, reader.read_u16()?, reader.read_u16()?);
        let default = match reader.read_u8()? {
            0 => SectionDefault::Uniform(reader.read_u32()?),
            1 => SectionDefault::Array(Arc::new(read_array_data(reader, array_shape)?)),
            state => {
                return Err(LodestoneError::InvalidArgument(format!(
                    "invalid section default state {}",
                    state
                )))
            }
        };
        let mut map = SectionArrayMap::new(array_shape, default)?;
        let count = reader.read_u64()?;
        for _ in 0..count {
            let cy = reader.read_i64()?;
            map.set_section(cy, read_array_data(reader, array_shape)?)?;
        }
        Ok(map)
    }
}
