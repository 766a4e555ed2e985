//! Math utilities and types
//!
//! Provides fundamental math types for 3D scene graphs. Matrices follow the
//! nalgebra column-vector convention: a point is transformed as `M * p`, so a
//! local matrix is `T * R * S` (scale applied first) and a world matrix is
//! `parent_world * local`.

pub use nalgebra::{Matrix4, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Build a rotation matrix from Euler angles in radians, applied X then Y then Z.
pub fn rotation_xyz(rotation: &Vec3) -> Mat4 {
    // from_euler_angles(roll, pitch, yaw) == Rz(yaw) * Ry(pitch) * Rx(roll)
    Mat4::from_euler_angles(rotation.x, rotation.y, rotation.z)
}

/// Compose a translation, XYZ Euler rotation and non-uniform scale.
pub fn trs_matrix(position: &Vec3, rotation: &Vec3, scale: &Vec3) -> Mat4 {
    Mat4::new_translation(position) * rotation_xyz(rotation) * Mat4::new_nonuniform_scaling(scale)
}

/// Extract the translation column of an affine matrix.
pub fn matrix_translation(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix.m14, matrix.m24, matrix.m34)
}

/// Extract a basis column (0 = X, 1 = Y, 2 = Z) of an affine matrix.
pub fn matrix_axis(matrix: &Mat4, column: usize) -> Vec3 {
    Vec3::new(matrix[(0, column)], matrix[(1, column)], matrix[(2, column)])
}

/// Normalize a vector, returning it unchanged when its length is zero.
pub fn normalize_or_keep(v: Vec3) -> Vec3 {
    v.try_normalize(f32::EPSILON).unwrap_or(v)
}

/// Read a `[x, y, z]` JSON array. Anything else yields `None`.
pub fn vec3_from_json(value: &serde_json::Value) -> Option<Vec3> {
    match value.as_array()?.as_slice() {
        [x, y, z] => Some(Vec3::new(x.as_f64()? as f32, y.as_f64()? as f32, z.as_f64()? as f32)),
        _ => None,
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// 2 * Pi
    pub const TAU: f32 = 2.0 * PI;

    /// Pi / 2
    pub const HALF_PI: f32 = PI * 0.5;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Component-wise linear interpolation of two vectors
    pub fn lerp_vec3(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
        a + (b - a) * t
    }
}
