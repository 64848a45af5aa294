//! The process-wide chunk constructor registry.
//!
//! Serialized chunks carry their chunk id; the registry maps that id back to
//! a constructor producing an all-unloaded chunk ready for
//! [`Chunk::reconstruct_components`].

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;

use lodestone_common::error::{LodestoneError, Result};

use crate::component::Chunk;

/// Constructs a chunk with every component unloaded.
pub type ChunkConstructor = fn() -> Box<dyn Chunk>;

static CHUNK_CONSTRUCTORS: Lazy<Mutex<HashMap<String, ChunkConstructor>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn constructors() -> std::sync::MutexGuard<'static, HashMap<String, ChunkConstructor>> {
    CHUNK_CONSTRUCTORS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Register a constructor for `chunk_id`. Fails if the id is taken.
pub fn register_chunk_constructor(
    chunk_id: impl Into<String>,
    constructor: ChunkConstructor,
) -> Result<()> {
    let chunk_id = chunk_id.into();
    let mut map = constructors();
    if map.contains_key(&chunk_id) {
        return Err(LodestoneError::InvalidArgument(format!(
            "a chunk constructor is already registered for {:?}",
            chunk_id
        )));
    }
    map.insert(chunk_id, constructor);
    Ok(())
}

/// Remove the constructor for `chunk_id`. Fails if none is registered.
pub fn unregister_chunk_constructor(chunk_id: &str) -> Result<()> {
    if constructors().remove(chunk_id).is_none() {
        return Err(LodestoneError::NotFound(format!(
            "no chunk constructor registered for {:?}",
            chunk_id
        )));
    }
    Ok(())
}

pub fn is_chunk_constructor_registered(chunk_id: &str) -> bool {
    constructors().contains_key(chunk_id)
}

/// Construct an all-unloaded chunk of the registered type `chunk_id`.
pub fn construct_null_chunk(chunk_id: &str) -> Result<Box<dyn Chunk>> {
    let constructor = constructors().get(chunk_id).copied().ok_or_else(|| {
        LodestoneError::NotFound(format!(
            "no chunk constructor registered for {:?}",
            chunk_id
        ))
    })?;
    Ok(constructor())
}
