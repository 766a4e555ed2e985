//! Scenes: declarative load, per-frame drive and switching
//!
//! A [`Scene`] owns a [`World`](crate::ecs::World) populated from a JSON
//! description; the [`SceneManager`] keeps the roster of loadable scenes and
//! the single active one.

mod description;
mod prefab;
mod scene;
mod scene_manager;

pub use prefab::Prefab;
pub use scene::{Scene, SceneStats};
pub use scene_manager::SceneManager;

use crate::assets::ResourceError;
use crate::foundation::guid::Guid;
use thiserror::Error;

/// Fatal scene load and lookup errors.
///
/// Recoverable problems (bad spatial fields, unknown component types) are
/// logged during parsing and never surface here.
#[derive(Debug, Error)]
pub enum SceneError {
    /// A required identity field is absent or has the wrong type
    #[error("{context}: missing required field '{field}'")]
    MissingField {
        /// Where the field was expected
        context: String,
        /// Field name
        field: &'static str,
    },

    /// A Guid string could not be parsed
    #[error("{context}: invalid GUID '{value}'")]
    InvalidGuid {
        /// Where the Guid appeared
        context: String,
        /// Offending text
        value: String,
    },

    /// An object's Guid is not listed in the scene's roster
    #[error("GameObject '{name}' ({guid}) is not listed in GUIDs")]
    NotInRoster {
        /// Object name
        name: String,
        /// Object Guid
        guid: Guid,
    },

    /// Two objects in one description share a Guid
    #[error("Duplicate GameObject GUID {0}")]
    DuplicateGuid(Guid),

    /// No scene with this name is registered
    #[error("Unknown scene '{0}'")]
    UnknownScene(String),

    /// No prefab with this name exists in the scene
    #[error("Unknown prefab '{0}'")]
    UnknownPrefab(String),

    /// The master scene list is not an array of file names
    #[error("Invalid scene list: {0}")]
    InvalidSceneList(String),

    /// Loading a description failed
    #[error(transparent)]
    Resource(#[from] ResourceError),
}
