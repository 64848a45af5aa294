//! The chunk component framework.
//!
//! A chunk is a bag of components. Each component either holds loaded data
//! or is unloaded; accessing an unloaded component is an error rather than a
//! silent default. Components serialize independently so a chunk can round
//! trip through storage without loading every component.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use bytes::Bytes;

use lodestone_common::error::Result;

/// One independently loadable and serializable piece of chunk data.
pub trait Component {
    /// A stable identifier, unique across all component types.
    fn component_id(&self) -> &'static str;

    /// The serialized form of the loaded data, or `None` if unloaded.
    fn serialize(&self) -> Result<Option<Bytes>>;

    /// Replace the component state. `None` makes the component unloaded.
    fn reconstruct(&mut self, data: Option<Bytes>) -> Result<()>;
}

/// A chunk: a named, fixed set of components.
pub trait Chunk: Any + Send + fmt::Debug {
    /// A stable identifier, unique across all chunk types.
    fn chunk_id(&self) -> &'static str;

    fn component_ids(&self) -> Vec<&'static str>;

    /// Serialize every component, keyed by component id.
    fn serialize_components(&self) -> Result<HashMap<String, Option<Bytes>>>;

    /// Restore components from a serialized map. Components the map does
    /// not mention become unloaded, so a subset map loads just the parts it
    /// names. Keys naming no component of this chunk are rejected.
    fn reconstruct_components(&mut self, components: HashMap<String, Option<Bytes>>)
        -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Define a chunk type as a fixed set of components.
///
/// Generates the struct, a `Default` derive for the all-unloaded state and
/// the [`Chunk`] implementation.
#[macro_export]
macro_rules! chunk_components {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($chunk_id:expr) {
            $($field:ident: $component:ty),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Default)]
        $vis struct $name {
            $(pub $field: $component),+
        }

        impl $crate::Chunk for $name {
            fn chunk_id(&self) -> &'static str {
                $chunk_id
            }

            fn component_ids(&self) -> ::std::vec::Vec<&'static str> {
                vec![$($crate::Component::component_id(&self.$field)),+]
            }

            fn serialize_components(
                &self,
            ) -> $crate::Result<
                ::std::collections::HashMap<
                    ::std::string::String,
                    ::std::option::Option<$crate::Bytes>,
                >,
            > {
                let mut components = ::std::collections::HashMap::new();
                $(
                    components.insert(
                        $crate::Component::component_id(&self.$field).to_string(),
                        $crate::Component::serialize(&self.$field)?,
                    );
                )+
                Ok(components)
            }

            fn reconstruct_components(
                &mut self,
                mut components: ::std::collections::HashMap<
                    ::std::string::String,
                    ::std::option::Option<$crate::Bytes>,
                >,
            ) -> $crate::Result<()> {
                $(
                    {
                        let component_id = $crate::Component::component_id(&self.$field);
                        // An absent key unloads the component.
                        let data = components.remove(component_id).unwrap_or(None);
                        $crate::Component::reconstruct(&mut self.$field, data)?;
                    }
                )+
                if let ::std::option::Option::Some(component_id) = components.keys().next() {
                    return Err($crate::LodestoneError::InvalidArgument(format!(
                        "unknown component {} for chunk {}",
                        component_id, $chunk_id
                    )));
                }
                Ok(())
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }
    };
}
