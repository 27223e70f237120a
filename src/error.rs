// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Failure kinds for transform resolution.
//!
//! Two classes share the enum. [`NoCommonAncestor`](SpaceError::NoCommonAncestor)
//! and [`SingularTransform`](SpaceError::SingularTransform) are ordinary
//! runtime outcomes of valid data (disjoint forests, zero-scale transforms).
//! The remaining variants surface API-contract violations as values rather
//! than aborting, so callers can propagate or log them.

use thiserror::Error;

/// An error resolving a transform or converting a point between layer spaces.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SpaceError {
    /// The two layers live in disjoint trees; no relationship exists.
    #[error("layers share no common ancestor")]
    NoCommonAncestor,

    /// The transform has a zero determinant and cannot be inverted.
    #[error("transform is singular and cannot be inverted")]
    SingularTransform,

    /// The claimed descendant is not reachable from the ancestor by walking
    /// parent links.
    #[error("layer is not a descendant of the given ancestor")]
    NotADescendant,

    /// A layer carries a non-affine transform where the composition engine
    /// requires an affine one.
    #[error("layer transform is not affine (bottom row must be (0, 0, 0, 1))")]
    NonAffineMatrix,

    /// Determinant or inversion was requested for a matrix whose bottom row
    /// is not `(0, 0, 0, 1)`; the general 4x4 path is not implemented.
    #[error("general 4x4 determinant/inverse is not supported")]
    Unsupported4x4,
}
