//! Asset access for the scene layer
//!
//! Only declarative descriptions (scene lists and scene documents) are handled
//! here; meshes, textures and clips are referenced by name and resolved by the
//! renderer and audio backends.

mod resource_manager;

pub use resource_manager::{ResourceManager, ResourceHandle, ResourceError};
