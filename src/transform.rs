// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row-major 4×4 affine transform.
//!
//! This type covers the transform algebra that layer-space resolution needs
//! (construction, composition, closed-form affine inversion, decomposition,
//! tolerance comparison) without pulling in a full linear-algebra crate.
//!
//! Every transform the tree engine composes is *affine*: its bottom row is
//! `(0, 0, 0, 1)`. Determinant and inversion are only defined for that case;
//! the general 4×4 path is deliberately unimplemented and reported as
//! [`SpaceError::Unsupported4x4`].
//!
//! # Storage order
//!
//! `m[row][col]`, row-major. Column-major consumers (GPU APIs, Core
//! Animation's `CATransform3D`) must transpose; [`to_cols_array_2d`] performs
//! exactly that transposition and is the one interop contract this crate
//! makes.
//!
//! [`to_cols_array_2d`]: Transform3d::to_cols_array_2d

use core::ops::{Mul, Neg};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::error::SpaceError;
use crate::vector::{Vec3, Vec4};

/// A row-major 4×4 affine transform stored as `[[f64; 4]; 4]`.
///
/// Each inner array is one *row* of the matrix. Derived equality is exact
/// per component; use [`approx_eq`](Self::approx_eq) for numerical
/// comparisons.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform3d {
    /// Four rows, each a 4-element array.
    pub m: [[f64; 4]; 4],
}

impl Transform3d {
    /// The 4×4 identity matrix.
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Creates a transform from four row arrays.
    #[inline]
    #[must_use]
    pub const fn from_rows(row0: [f64; 4], row1: [f64; 4], row2: [f64; 4], row3: [f64; 4]) -> Self {
        Self {
            m: [row0, row1, row2, row3],
        }
    }

    /// Creates a transform from a row-major 2-D array.
    #[inline]
    #[must_use]
    pub const fn from_rows_array_2d(m: [[f64; 4]; 4]) -> Self {
        Self { m }
    }

    /// Returns the rows as a 2-D array.
    #[inline]
    #[must_use]
    pub const fn to_rows_array_2d(self) -> [[f64; 4]; 4] {
        self.m
    }

    /// Returns the entries in column-major order, i.e. transposed.
    ///
    /// This is the layout expected by column-major native transform types:
    /// row `i`, column `j` of this matrix lands at column `i`, row `j` of the
    /// result. Adapters handing transforms to such a representation must use
    /// this (or an equivalent transpose) rather than the raw rows.
    #[inline]
    #[must_use]
    pub const fn to_cols_array_2d(self) -> [[f64; 4]; 4] {
        let m = &self.m;
        [
            [m[0][0], m[1][0], m[2][0], m[3][0]],
            [m[0][1], m[1][1], m[2][1], m[3][1]],
            [m[0][2], m[1][2], m[2][2], m[3][2]],
            [m[0][3], m[1][3], m[2][3], m[3][3]],
        ]
    }

    /// Returns row `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn row(self, i: usize) -> [f64; 4] {
        self.m[i]
    }

    /// Returns the upper three entries of column `i` (0-based).
    ///
    /// # Panics
    ///
    /// Panics if `i >= 4`.
    #[inline]
    #[must_use]
    pub const fn col3(self, i: usize) -> Vec3 {
        Vec3::new(self.m[0][i], self.m[1][i], self.m[2][i])
    }

    /// Creates a pure translation transform.
    #[inline]
    #[must_use]
    pub const fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self {
            m: [
                [1.0, 0.0, 0.0, x],
                [0.0, 1.0, 0.0, y],
                [0.0, 0.0, 1.0, z],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a non-uniform scale transform.
    #[inline]
    #[must_use]
    pub const fn from_scale(x: f64, y: f64, z: f64) -> Self {
        Self {
            m: [
                [x, 0.0, 0.0, 0.0],
                [0.0, y, 0.0, 0.0],
                [0.0, 0.0, z, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation of `angle` radians about `axis` (Rodrigues'
    /// formula; the axis is normalized first).
    ///
    /// The stored entries use the negated angle; combined with the transposed
    /// entry pattern below this yields the same sense of rotation as the
    /// per-axis constructors. Both conventions are kept as-is for
    /// compatibility with the matrices this crate has always produced.
    #[must_use]
    pub fn from_axis_angle(angle: f64, axis: Vec3) -> Self {
        let s = (-angle).sin();
        let c = (-angle).cos();
        let c1 = 1.0 - c;
        let v = axis.normalized();

        Self {
            m: [
                [
                    c + c1 * v.x * v.x,
                    c1 * v.x * v.y + v.z * s,
                    c1 * v.x * v.z - v.y * s,
                    0.0,
                ],
                [
                    c1 * v.x * v.y - v.z * s,
                    c + c1 * v.y * v.y,
                    c1 * v.y * v.z + v.x * s,
                    0.0,
                ],
                [
                    c1 * v.x * v.z + v.y * s,
                    c1 * v.y * v.z - v.x * s,
                    c + c1 * v.z * v.z,
                    0.0,
                ],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the X axis (radians).
    #[must_use]
    pub fn from_rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            m: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, c, -s, 0.0],
                [0.0, s, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Y axis (radians).
    #[must_use]
    pub fn from_rotation_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            m: [
                [c, 0.0, s, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [-s, 0.0, c, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Creates a rotation around the Z axis (radians).
    #[must_use]
    pub fn from_rotation_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self {
            m: [
                [c, -s, 0.0, 0.0],
                [s, c, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    /// Returns `self * translation(x, y, z)`.
    #[inline]
    #[must_use]
    pub fn translated_by(self, x: f64, y: f64, z: f64) -> Self {
        self * Self::from_translation(x, y, z)
    }

    /// Returns `self * rotation(angle, axis)`.
    #[inline]
    #[must_use]
    pub fn rotated_by(self, angle: f64, axis: Vec3) -> Self {
        self * Self::from_axis_angle(angle, axis)
    }

    /// Returns `self * scale(x, y, z)`.
    #[inline]
    #[must_use]
    pub fn scaled_by(self, x: f64, y: f64, z: f64) -> Self {
        self * Self::from_scale(x, y, z)
    }

    /// Is the bottom row `(0, 0, 0, 1)`?
    ///
    /// Affine transforms are the only ones [`determinant`](Self::determinant)
    /// and [`inverted`](Self::inverted) accept.
    #[inline]
    #[must_use]
    pub fn is_affine(&self) -> bool {
        self.m[3] == [0.0, 0.0, 0.0, 1.0]
    }

    /// Is this an affine transform that leaves the z axis untouched?
    ///
    /// True when [`is_affine`](Self::is_affine) holds, row 2 is
    /// `(0, 0, 1, 0)`, and `m[0][2]` and `m[1][2]` are zero. Such transforms
    /// invert on a cheaper 2×2 path.
    #[inline]
    #[must_use]
    pub fn is_affine_2d(&self) -> bool {
        self.is_affine()
            && self.m[2] == [0.0, 0.0, 1.0, 0.0]
            && self.m[0][2] == 0.0
            && self.m[1][2] == 0.0
    }

    /// Is every entry [finite](f64::is_finite)?
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.m
            .iter()
            .all(|row| row.iter().all(|entry| entry.is_finite()))
    }

    /// Returns the determinant.
    ///
    /// Only defined for affine transforms, where it equals the determinant
    /// of the upper-left 3×3 block. Returns
    /// [`SpaceError::Unsupported4x4`] for a non-affine matrix.
    pub fn determinant(&self) -> Result<f64, SpaceError> {
        if !self.is_affine() {
            return Err(SpaceError::Unsupported4x4);
        }
        let m = &self.m;
        Ok(m[0][0] * m[1][1] * m[2][2] + m[1][0] * m[2][1] * m[0][2] + m[2][0] * m[0][1] * m[1][2]
            - m[0][2] * m[1][1] * m[2][0]
            - m[1][2] * m[2][1] * m[0][0]
            - m[2][2] * m[0][1] * m[1][0])
    }

    /// Returns the inverse transform.
    ///
    /// Affine transforms invert in closed form: a 2×2 inverse plus
    /// translation back-substitution on the
    /// [2-D fast path](Self::is_affine_2d), a 3×3 cofactor inverse otherwise.
    /// Returns [`SpaceError::SingularTransform`] when the relevant
    /// determinant is exactly zero and [`SpaceError::Unsupported4x4`] for a
    /// non-affine matrix.
    pub fn inverted(&self) -> Result<Self, SpaceError> {
        if !self.is_affine() {
            return Err(SpaceError::Unsupported4x4);
        }
        let m = &self.m;

        if self.is_affine_2d() {
            let det = m[0][0] * m[1][1] - m[1][0] * m[0][1];
            if det == 0.0 {
                return Err(SpaceError::SingularTransform);
            }

            let recp_det = det.recip();
            let a = m[1][1] * recp_det;
            let b = -m[0][1] * recp_det;
            let c = -m[1][0] * recp_det;
            let d = m[0][0] * recp_det;

            return Ok(Self::from_rows(
                [a, b, 0.0, -(a * m[0][3] + b * m[1][3])],
                [c, d, 0.0, -(c * m[0][3] + d * m[1][3])],
                [0.0, 0.0, 1.0, -m[2][3]],
                [0.0, 0.0, 0.0, 1.0],
            ));
        }

        let det = self.determinant()?;
        if det == 0.0 {
            return Err(SpaceError::SingularTransform);
        }

        let recp_det = det.recip();
        let a = (m[1][1] * m[2][2] - m[2][1] * m[1][2]) * recp_det;
        let b = -(m[0][1] * m[2][2] - m[0][2] * m[2][1]) * recp_det;
        let c = (m[0][1] * m[1][2] - m[0][2] * m[1][1]) * recp_det;
        let d = -(m[1][0] * m[2][2] - m[1][2] * m[2][0]) * recp_det;
        let e = (m[0][0] * m[2][2] - m[0][2] * m[2][0]) * recp_det;
        let f = -(m[0][0] * m[1][2] - m[0][2] * m[1][0]) * recp_det;
        let g = (m[1][0] * m[2][1] - m[1][1] * m[2][0]) * recp_det;
        let h = -(m[0][0] * m[2][1] - m[0][1] * m[2][0]) * recp_det;
        let i = (m[0][0] * m[1][1] - m[0][1] * m[1][0]) * recp_det;

        let inverse3x3 = Self::from_rows(
            [a, b, c, 0.0],
            [d, e, f, 0.0],
            [g, h, i, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        );

        let translation = Vec3::new(m[0][3], m[1][3], m[2][3]);
        let inverse_translation = inverse3x3 * translation;

        Ok(Self::from_rows(
            [a, b, c, -inverse_translation.x],
            [d, e, f, -inverse_translation.y],
            [g, h, i, -inverse_translation.z],
            [0.0, 0.0, 0.0, 1.0],
        ))
    }

    /// Decomposes into (rotation, scale, translation).
    ///
    /// Scale is the column lengths of the 3×3 block; the rotation block is
    /// each column divided by its own length; translation is column 3. A
    /// zero axis scale produces non-finite results — callers that need a
    /// guarantee should check [`is_finite`](Self::is_finite) on the pieces.
    #[must_use]
    pub fn decompose(&self) -> (Self, Vec3, Vec3) {
        let m = &self.m;
        let translation = Vec3::new(m[0][3], m[1][3], m[2][3]);

        let sx = self.col3(0).length();
        let sy = self.col3(1).length();
        let sz = self.col3(2).length();
        let scale = Vec3::new(sx, sy, sz);

        let rsx = sx.recip();
        let rsy = sy.recip();
        let rsz = sz.recip();

        let rotation = Self::from_rows(
            [m[0][0] * rsx, m[0][1] * rsy, m[0][2] * rsz, 0.0],
            [m[1][0] * rsx, m[1][1] * rsy, m[1][2] * rsz, 0.0],
            [m[2][0] * rsx, m[2][1] * rsy, m[2][2] * rsz, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        );

        (rotation, scale, translation)
    }

    /// Returns the rotation angle about the x axis.
    ///
    /// Euler-angle extraction; only meaningful for pure rotation matrices.
    #[inline]
    #[must_use]
    pub fn x_angle(&self) -> f64 {
        self.m[2][1].atan2(self.m[2][2])
    }

    /// Returns the rotation angle about the y axis.
    ///
    /// Euler-angle extraction; only meaningful for pure rotation matrices.
    #[inline]
    #[must_use]
    pub fn y_angle(&self) -> f64 {
        let m = &self.m;
        (-m[2][0]).atan2((m[2][1] * m[2][1] + m[2][2] * m[2][2]).sqrt())
    }

    /// Returns the rotation angle about the z axis.
    ///
    /// Euler-angle extraction; only meaningful for pure rotation matrices.
    #[inline]
    #[must_use]
    pub fn z_angle(&self) -> f64 {
        self.m[1][0].atan2(self.m[0][0])
    }

    /// Returns the transpose.
    #[must_use]
    pub const fn transposed(&self) -> Self {
        Self {
            m: self.to_cols_array_2d(),
        }
    }

    /// Compares all 16 entries with `|a - b| < tolerance` (strict).
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        let mut i = 0;
        while i < 4 {
            let mut j = 0;
            while j < 4 {
                if (self.m[i][j] - other.m[i][j]).abs() >= tolerance {
                    return false;
                }
                j += 1;
            }
            i += 1;
        }
        true
    }
}

impl Default for Transform3d {
    #[inline]
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform3d {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let a = &self.m;
        let b = &rhs.m;
        let mut out = [[0.0_f64; 4]; 4];
        let mut i = 0;
        while i < 4 {
            let mut j = 0;
            while j < 4 {
                out[i][j] =
                    a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j] + a[i][3] * b[3][j];
                j += 1;
            }
            i += 1;
        }
        Self { m: out }
    }
}

impl Mul<f64> for Transform3d {
    type Output = Self;

    /// Scales all 16 entries, including the homogeneous row. The result of
    /// scaling an affine transform this way is no longer affine.
    fn mul(self, rhs: f64) -> Self {
        let mut out = self.m;
        for row in &mut out {
            for entry in row {
                *entry *= rhs;
            }
        }
        Self { m: out }
    }
}

impl Mul<Transform3d> for f64 {
    type Output = Transform3d;

    fn mul(self, rhs: Transform3d) -> Transform3d {
        rhs * self
    }
}

impl Neg for Transform3d {
    type Output = Self;

    /// Negates all 16 entries, including the homogeneous row.
    fn neg(self) -> Self {
        self * -1.0
    }
}

impl Mul<Vec4> for Transform3d {
    type Output = Vec4;

    fn mul(self, p: Vec4) -> Vec4 {
        let m = &self.m;
        Vec4::new(
            m[0][0] * p.x + m[0][1] * p.y + m[0][2] * p.z + m[0][3] * p.w,
            m[1][0] * p.x + m[1][1] * p.y + m[1][2] * p.z + m[1][3] * p.w,
            m[2][0] * p.x + m[2][1] * p.y + m[2][2] * p.z + m[2][3] * p.w,
            m[3][0] * p.x + m[3][1] * p.y + m[3][2] * p.z + m[3][3] * p.w,
        )
    }
}

impl Mul<Vec3> for Transform3d {
    type Output = Vec3;

    /// Applies the transform to a point: homogeneous lift with `w = 1`,
    /// multiply, then perspective-divide by the resulting `w`.
    fn mul(self, p: Vec3) -> Vec3 {
        let p4 = self * Vec4::new(p.x, p.y, p.z, 1.0);
        Vec3::new(p4.x, p4.y, p4.z) * p4.w.recip()
    }
}
