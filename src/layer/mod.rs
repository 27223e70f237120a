// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer tree data model and coordinate-space resolution.
//!
//! A *layer* is a node in a presentation tree. Each layer has:
//!
//! - An identity ([`LayerId`]) — a generational handle that becomes stale
//!   when the layer is destroyed, preventing use-after-free bugs at the API
//!   level.
//! - Topology — parent, first-child, and sibling links forming an ordered
//!   tree.
//! - Geometry set by the caller: [`position`](LayerStore::set_position),
//!   [`bounds`](LayerStore::set_bounds),
//!   [`anchor_point`](LayerStore::set_anchor_point), and
//!   [`transform`](LayerStore::set_transform).
//!
//! Layers are stored in struct-of-arrays layout with index-based handles
//! for cache-friendly traversal.
//!
//! # Coordinate spaces
//!
//! Each layer defines its own coordinate space: the space of its bounds
//! rectangle, positioned in the parent's space by `position`, pivoted by
//! `anchor_point`, and warped by `transform`. The [`LayerNode`] trait in
//! [`space`](mod@space) resolves the transform between any two spaces that
//! share an ancestor; [`LayerStore::transform_between`] and
//! [`LayerStore::convert_point`] expose the same resolution over handles.

mod id;
mod store;
mod traverse;

pub mod space;

pub use id::{INVALID, LayerId};
pub use space::{LayerNode, LayerRef};
pub use store::LayerStore;
pub use traverse::{Ancestors, Children};
