//! Transform with cached local/world matrices
//!
//! Local state (position, XYZ Euler rotation in radians, scale) is the only
//! thing callers write. The local matrix, world matrix and the derived world
//! basis are cached behind two dirty flags and recomputed lazily on read.
//!
//! A transform does not know its parent. Objects living in a
//! [`World`](crate::ecs::World) are mutated through
//! [`TransformMut`](crate::ecs::TransformMut), which forwards the dirty flag
//! down the object hierarchy; world-space reads go through the world so the
//! parent chain is resolved first.

use crate::foundation::math::{
    matrix_axis, matrix_translation, normalize_or_keep, trs_matrix, utils, Mat4, Vec3,
};
use serde::{Deserialize, Serialize};

/// Per-object spatial state
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,

    local_matrix: Mat4,
    world_matrix: Mat4,
    world_position: Vec3,
    forward: Vec3,
    up: Vec3,
    right: Vec3,

    local_dirty: bool,
    world_dirty: bool,
}

/// Serializable local state of a transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TransformData {
    /// Local position
    pub position: Vec3,
    /// Local rotation (XYZ Euler, radians)
    pub rotation: Vec3,
    /// Local scale
    pub scale: Vec3,
}

impl Default for TransformData {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::from_data(TransformData::default())
    }
}

impl Transform {
    /// Identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create from explicit local state
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self::from_data(TransformData { position, rotation, scale })
    }

    /// Create from serialized local state
    pub fn from_data(data: TransformData) -> Self {
        Self {
            position: data.position,
            rotation: data.rotation,
            scale: data.scale,
            local_matrix: Mat4::identity(),
            world_matrix: Mat4::identity(),
            world_position: Vec3::zeros(),
            forward: Vec3::z(),
            up: Vec3::y(),
            right: Vec3::x(),
            local_dirty: true,
            world_dirty: true,
        }
    }

    /// Snapshot of the local state
    pub fn data(&self) -> TransformData {
        TransformData {
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    // ------------------------------------------------------------------
    // Dirty tracking
    // ------------------------------------------------------------------

    /// Mark both caches stale.
    ///
    /// Returns `true` when the world cache was clean before the call, meaning
    /// descendants still have to be told; `false` when it was already dirty
    /// and the walk can stop here.
    pub fn set_dirty(&mut self) -> bool {
        self.local_dirty = true;
        if self.world_dirty {
            return false;
        }
        self.world_dirty = true;
        true
    }

    /// Whether the local matrix needs recomputation
    pub fn is_local_dirty(&self) -> bool {
        self.local_dirty
    }

    /// Whether the world matrix needs recomputation
    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty
    }

    // ------------------------------------------------------------------
    // Local mutators. Each returns whether descendants must be dirtied.
    // ------------------------------------------------------------------

    /// Move by `delta` in local space
    pub fn translate(&mut self, delta: Vec3) -> bool {
        self.position += delta;
        self.set_dirty()
    }

    /// Move along X
    pub fn translate_x(&mut self, delta: f32) -> bool {
        self.translate(Vec3::new(delta, 0.0, 0.0))
    }

    /// Move along Y
    pub fn translate_y(&mut self, delta: f32) -> bool {
        self.translate(Vec3::new(0.0, delta, 0.0))
    }

    /// Move along Z
    pub fn translate_z(&mut self, delta: f32) -> bool {
        self.translate(Vec3::new(0.0, 0.0, delta))
    }

    /// Add Euler angles (radians)
    pub fn rotate(&mut self, delta: Vec3) -> bool {
        self.rotation += delta;
        self.set_dirty()
    }

    /// Rotate around X (radians)
    pub fn rotate_x(&mut self, delta: f32) -> bool {
        self.rotate(Vec3::new(delta, 0.0, 0.0))
    }

    /// Rotate around Y (radians)
    pub fn rotate_y(&mut self, delta: f32) -> bool {
        self.rotate(Vec3::new(0.0, delta, 0.0))
    }

    /// Rotate around Z (radians)
    pub fn rotate_z(&mut self, delta: f32) -> bool {
        self.rotate(Vec3::new(0.0, 0.0, delta))
    }

    /// Replace the local position
    pub fn set_position(&mut self, position: Vec3) -> bool {
        self.position = position;
        self.set_dirty()
    }

    /// Replace the local rotation (radians)
    pub fn set_rotation(&mut self, rotation: Vec3) -> bool {
        self.rotation = rotation;
        self.set_dirty()
    }

    /// Replace the local rotation, given in degrees
    pub fn set_rotation_degrees(&mut self, degrees: Vec3) -> bool {
        self.set_rotation(degrees.map(utils::deg_to_rad))
    }

    /// Replace the local scale
    pub fn set_scale(&mut self, scale: Vec3) -> bool {
        self.scale = scale;
        self.set_dirty()
    }

    // ------------------------------------------------------------------
    // Local reads. These never touch the matrix caches and may be stale
    // relative to a pending world recompute.
    // ------------------------------------------------------------------

    /// Local position
    pub fn local_position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation (radians)
    pub fn local_rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Local scale
    pub fn local_scale(&self) -> Vec3 {
        self.scale
    }

    /// Local position X
    pub fn x(&self) -> f32 {
        self.position.x
    }

    /// Local position Y
    pub fn y(&self) -> f32 {
        self.position.y
    }

    /// Local position Z
    pub fn z(&self) -> f32 {
        self.position.z
    }

    /// Local rotation around X
    pub fn rot_x(&self) -> f32 {
        self.rotation.x
    }

    /// Local rotation around Y
    pub fn rot_y(&self) -> f32 {
        self.rotation.y
    }

    /// Local rotation around Z
    pub fn rot_z(&self) -> f32 {
        self.rotation.z
    }

    /// Local scale X
    pub fn scale_x(&self) -> f32 {
        self.scale.x
    }

    /// Local scale Y
    pub fn scale_y(&self) -> f32 {
        self.scale.y
    }

    /// Local scale Z
    pub fn scale_z(&self) -> f32 {
        self.scale.z
    }

    // ------------------------------------------------------------------
    // Cached matrices
    // ------------------------------------------------------------------

    /// Local matrix `T * R * S`, recomputed if stale
    pub fn local_matrix(&mut self) -> Mat4 {
        if self.local_dirty {
            self.local_matrix = trs_matrix(&self.position, &self.rotation, &self.scale);
            self.local_dirty = false;
        }
        self.local_matrix
    }

    /// World matrix, recomputed if stale.
    ///
    /// `parent_world` is the parent's current world matrix, or `None` for a
    /// root. It is only consulted when the cache is stale.
    pub fn world_matrix(&mut self, parent_world: Option<&Mat4>) -> Mat4 {
        if self.world_dirty || self.local_dirty {
            let local = self.local_matrix();
            self.world_matrix = match parent_world {
                Some(parent) => parent * local,
                None => local,
            };
            self.forward = normalize_or_keep(matrix_axis(&self.world_matrix, 2));
            self.up = normalize_or_keep(matrix_axis(&self.world_matrix, 1));
            self.right = self.up.cross(&self.forward);
            self.world_position = matrix_translation(&self.world_matrix);
            self.world_dirty = false;
        }
        self.world_matrix
    }

    /// Cached world position as of the last world recompute
    pub(crate) fn cached_position(&self) -> Vec3 {
        self.world_position
    }

    /// Cached world forward axis as of the last world recompute
    pub(crate) fn cached_forward(&self) -> Vec3 {
        self.forward
    }

    /// Cached world up axis as of the last world recompute
    pub(crate) fn cached_up(&self) -> Vec3 {
        self.up
    }

    /// Cached world right axis as of the last world recompute
    pub(crate) fn cached_right(&self) -> Vec3 {
        self.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::constants::HALF_PI;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_world_matrix_is_identity() {
        let mut transform = Transform::identity();
        assert_eq!(transform.world_matrix(None), Mat4::identity());
    }

    #[test]
    fn test_root_world_equals_local_after_mutations() {
        let mut transform = Transform::identity();
        transform.translate(Vec3::new(1.0, -2.0, 3.5));
        transform.rotate_y(0.4);
        transform.rotate_x(-1.3);
        transform.set_scale(Vec3::new(2.0, 0.5, 3.0));
        transform.translate_z(7.0);

        let world = transform.world_matrix(None);
        assert_eq!(world, transform.local_matrix());
    }

    #[test]
    fn test_set_dirty_reports_propagation_once() {
        let mut transform = Transform::identity();
        transform.world_matrix(None);
        assert!(!transform.is_world_dirty());

        assert!(transform.translate_x(1.0));
        // Already dirty: no need to walk children again
        assert!(!transform.translate_x(1.0));
        assert!(transform.is_local_dirty());
        assert!(transform.is_world_dirty());
    }

    #[test]
    fn test_local_dirty_is_set_even_when_world_already_dirty() {
        let mut transform = Transform::identity();
        transform.local_matrix();
        assert!(!transform.is_local_dirty());
        assert!(transform.is_world_dirty());

        transform.set_position(Vec3::new(4.0, 0.0, 0.0));
        assert!(transform.is_local_dirty());
        assert_relative_eq!(transform.local_matrix().m14, 4.0);
    }

    #[test]
    fn test_parent_matrix_is_applied_first() {
        let parent = Mat4::new_translation(&Vec3::new(10.0, 0.0, 0.0));
        let mut child = Transform::new(Vec3::new(1.0, 0.0, 0.0), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));
        let world = child.world_matrix(Some(&parent));
        assert_relative_eq!(matrix_translation(&world), Vec3::new(11.0, 0.0, 0.0));
        assert_relative_eq!(child.cached_position(), Vec3::new(11.0, 0.0, 0.0));
    }

    #[test]
    fn test_derived_basis() {
        let mut transform = Transform::identity();
        transform.set_rotation(Vec3::new(0.0, HALF_PI, 0.0));
        transform.set_scale(Vec3::new(3.0, 3.0, 3.0));
        transform.world_matrix(None);

        assert_relative_eq!(transform.cached_forward(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(transform.cached_up(), Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(transform.cached_right(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_scalar_accessors_read_local_state() {
        let mut transform = Transform::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.1, 0.2, 0.3), Vec3::new(4.0, 5.0, 6.0));
        transform.translate_y(1.0);
        // No matrix read happened; scalar reads still see the new value
        assert!(transform.is_world_dirty());
        assert_eq!((transform.x(), transform.y(), transform.z()), (1.0, 3.0, 3.0));
        assert_eq!((transform.rot_x(), transform.rot_y(), transform.rot_z()), (0.1, 0.2, 0.3));
        assert_eq!((transform.scale_x(), transform.scale_y(), transform.scale_z()), (4.0, 5.0, 6.0));
    }

    #[test]
    fn test_rotation_degrees() {
        let mut transform = Transform::identity();
        transform.set_rotation_degrees(Vec3::new(180.0, 0.0, 90.0));
        assert_relative_eq!(transform.rot_x(), std::f32::consts::PI, epsilon = 1e-6);
        assert_relative_eq!(transform.rot_z(), HALF_PI, epsilon = 1e-6);
    }
}
