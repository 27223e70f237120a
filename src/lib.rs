// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer tree with cross-space coordinate transform resolution.
//!
//! `lamina` provides a retained tree of positioned, bounded, transformable
//! layers and the machinery to map geometry between any two of their
//! coordinate spaces. It is `no_std` compatible (with `alloc`) and uses
//! struct-of-arrays storage with index handles for cache-friendly traversal.
//!
//! # Architecture
//!
//! Resolution between two spaces runs through the lowest common ancestor:
//!
//! ```text
//!   layer A ──transform_to_ancestor──► shared ancestor
//!                                           │
//!                     transform_to_descendant
//!                                           ▼
//!                                        layer B
//! ```
//!
//! **[`transform`]** — [`Transform3d`](transform::Transform3d), a row-major
//! 4x4 matrix with constructors, composition, inversion (2-D and 3-D affine
//! paths), and decomposition. The homogeneous row is carried but treated as
//! opaque: determinant and inversion refuse non-affine matrices.
//!
//! **[`layer`]** — Struct-of-arrays layer tree with generational handles,
//! plus the [`LayerNode`](layer::LayerNode) capability trait whose provided
//! methods implement ancestor walks, lowest-common-ancestor search, and
//! point conversion for any conforming node type.
//!
//! **[`vector`]** — Small fixed-size vector types ([`Vec3`](vector::Vec3),
//! [`Vec4`](vector::Vec4)) used by the transform algebra.
//!
//! **[`error`]** — [`SpaceError`](error::SpaceError), the recoverable
//! failure modes of resolution: disjoint trees, singular or non-affine
//! transforms, and misdirected descendant walks.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `tracing` (disabled by default): Emits `tracing` events from the
//!   resolution engine.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod error;
pub mod layer;
pub mod transform;
pub mod vector;

mod log;
