//! Rigid transform type shared by the registry and the resolver.
//!
//! A transform is a translation plus a unit quaternion, the "child pose
//! expressed in parent" convention. Composition and inversion are routed
//! through 4x4 homogeneous matrices so rotation/translation ordering is
//! handled in one place.

use glam::{DMat4, DQuat, DVec3};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A rigid transform: rotation then translation, no scale or shear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform {
    pub translation: DVec3,
    pub rotation: DQuat,
}

impl RigidTransform {
    pub const IDENTITY: Self = Self {
        translation: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
    };

    pub fn new(translation: DVec3, rotation: DQuat) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            translation,
            rotation: DQuat::IDENTITY,
        }
    }

    /// The homogeneous matrix form: rotation submatrix + translation column.
    pub fn to_mat4(&self) -> DMat4 {
        DMat4::from_rotation_translation(self.rotation, self.translation)
    }

    /// Decompose a homogeneous matrix back into translation + quaternion.
    ///
    /// The quaternion is renormalized: matrices composed along long frame
    /// chains accumulate drift, and the registry holds whatever comes out of
    /// here as the latest value.
    pub fn from_mat4(mat: &DMat4) -> Self {
        Self {
            translation: mat.w_axis.truncate(),
            rotation: DQuat::from_mat4(mat).normalize(),
        }
    }

    /// The inverse transform: R^T rotation, -R^T * t translation.
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.inverse();
        Self {
            translation: -(rotation * self.translation),
            rotation,
        }
    }

    /// Map a point expressed in the child frame into the parent frame.
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.rotation * point + self.translation
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for RigidTransform {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::from_mat4(&(self.to_mat4() * rhs.to_mat4()))
    }
}

impl Mul for &RigidTransform {
    type Output = RigidTransform;

    fn mul(self, rhs: Self) -> Self::Output {
        *self * *rhs
    }
}
