// Copyright 2026 the Lamina Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cross-space transform resolution over the layer capability set.
//!
//! [`LayerNode`] is the capability a type needs for its coordinate space to
//! be resolved: position, bounds, anchor point, local transform, and an
//! optional parent. Everything else — ancestor walks, lowest-common-ancestor
//! search, ordered composition, point conversion — is provided on top of
//! those five accessors, so test doubles and non-rendering node types can
//! exercise the engine without a [`LayerStore`].
//!
//! # Composition order
//!
//! Transform composition is not commutative and the order here encodes the
//! tree's nesting. Walking *up*, each ancestor's local-to-parent transform is
//! pre-multiplied (applied after everything below it); walking *down*, each
//! parent-to-local transform is post-multiplied. Cross-branch resolution
//! composes the down leg after the up leg: `down * up`.
//!
//! # Identity
//!
//! All node comparisons go through [`LayerNode::same`], which is reference
//! identity. Two layers with equal position, bounds, and transform are still
//! different layers.

use kurbo::{Point, Size};

use crate::error::SpaceError;
use crate::log::{debug, trace};
use crate::transform::Transform3d;
use crate::vector::Vec3;

use super::id::LayerId;
use super::store::LayerStore;

/// The capability set required to resolve coordinate-space relationships.
///
/// Implementations are lightweight handles (a borrowed arena slot, a
/// reference-counted node); cloning one must alias the same underlying layer,
/// and [`same`](Self::same) must reflect that aliasing.
pub trait LayerNode: Clone {
    /// The layer's position in its parent's coordinate space.
    fn position(&self) -> Point;

    /// The size of the layer's bounds rectangle.
    fn bounds(&self) -> Size;

    /// The pivot location within [`bounds`](Self::bounds), as a unit-square
    /// fraction.
    fn anchor_point(&self) -> Point;

    /// The layer's local transform, applied about the anchor point.
    fn transform(&self) -> Transform3d;

    /// The parent layer, if any. A layer without a parent is a root.
    fn parent(&self) -> Option<Self>;

    /// Reference identity: do `self` and `other` alias the same layer?
    fn same(&self, other: &Self) -> bool;

    // -- Per-layer transforms --

    /// The transform from this layer's local space to its parent's space:
    /// `translate(position) * transform * translate(-anchor · bounds)`.
    ///
    /// Every higher-level resolution is built by composing these.
    fn transform_to_parent(&self) -> Transform3d {
        let position = self.position();
        let anchor = self.anchor_point();
        let bounds = self.bounds();

        let t1 = Transform3d::from_translation(position.x, position.y, 0.0);
        let t2 = Transform3d::from_translation(
            -anchor.x * bounds.width,
            -anchor.y * bounds.height,
            0.0,
        );

        t1 * self.transform() * t2
    }

    /// The transform from this layer's parent's space to its local space:
    /// `translate(anchor · bounds) * transform⁻¹ * translate(-position)`.
    ///
    /// # Errors
    ///
    /// [`SpaceError::NonAffineMatrix`] if the layer's transform is not
    /// affine, [`SpaceError::SingularTransform`] if it is not invertible.
    fn transform_from_parent(&self) -> Result<Transform3d, SpaceError> {
        let transform = self.transform();
        if !transform.is_affine() {
            return Err(SpaceError::NonAffineMatrix);
        }
        let inverse = transform.inverted()?;

        let position = self.position();
        let anchor = self.anchor_point();
        let bounds = self.bounds();

        let t1 =
            Transform3d::from_translation(anchor.x * bounds.width, anchor.y * bounds.height, 0.0);
        let t2 = Transform3d::from_translation(-position.x, -position.y, 0.0);

        Ok(t1 * inverse * t2)
    }

    // -- Chain composition --

    /// The transform from this layer's local space to `ancestor`'s space,
    /// composed by walking parent links upward.
    ///
    /// `None` means "walk to the root". An `ancestor` that is never reached
    /// is an argument error; the walk then degrades to the root transform
    /// rather than failing.
    fn transform_to_ancestor(&self, ancestor: Option<&Self>) -> Transform3d {
        let mut transform = self.transform_to_parent();
        let mut parent = self.parent();
        while let Some(p) = parent {
            if ancestor.is_some_and(|a| p.same(a)) {
                break;
            }
            transform = p.transform_to_parent() * transform;
            parent = p.parent();
        }
        transform
    }

    /// Inverse of [`transform_to_ancestor`](Self::transform_to_ancestor).
    ///
    /// # Errors
    ///
    /// [`SpaceError::SingularTransform`] if the composed chain is not
    /// invertible, [`SpaceError::Unsupported4x4`] if a layer on the chain
    /// carries a non-affine transform.
    fn transform_from_ancestor(&self, ancestor: Option<&Self>) -> Result<Transform3d, SpaceError> {
        self.transform_to_ancestor(ancestor).inverted()
    }

    /// The transform from this layer's space into `descendant`'s local
    /// space, composed by walking parent links upward from `descendant`.
    ///
    /// # Errors
    ///
    /// [`SpaceError::NotADescendant`] if `descendant` does not reach `self`
    /// by walking parent links; inversion errors as in
    /// [`transform_from_parent`](Self::transform_from_parent).
    fn transform_to_descendant(&self, descendant: &Self) -> Result<Transform3d, SpaceError> {
        let mut node = descendant.clone();
        let mut transform = node.transform_from_parent()?;
        while !node.same(self) {
            let Some(parent) = node.parent() else {
                return Err(SpaceError::NotADescendant);
            };
            node = parent;
            transform = transform * node.transform_from_parent()?;
        }
        Ok(transform)
    }

    /// Inverse of [`transform_to_descendant`](Self::transform_to_descendant).
    ///
    /// # Errors
    ///
    /// As for [`transform_to_descendant`](Self::transform_to_descendant),
    /// plus [`SpaceError::SingularTransform`] if the composed chain is not
    /// invertible.
    fn transform_from_descendant(&self, descendant: &Self) -> Result<Transform3d, SpaceError> {
        self.transform_to_descendant(descendant)?.inverted()
    }

    // -- Lowest common ancestor --

    /// Returns the lowest (deepest) common ancestor of `self` and `other`,
    /// or `None` when the two layers live in disjoint trees.
    ///
    /// A layer is its own ancestor here: `a.shared_ancestor(&a)` is `a`, and
    /// for a direct parent/child pair the parent is returned. The search is
    /// O(depth²) by nested ancestor walks, with no auxiliary bookkeeping;
    /// layer trees are shallow enough that this beats building a side table.
    fn shared_ancestor(&self, other: &Self) -> Option<Self> {
        if self.same(other) {
            return Some(self.clone());
        }

        if let Some(parent) = other.parent() {
            if self.same(&parent) {
                return Some(parent);
            }
        }

        if let Some(parent) = self.parent() {
            if other.same(&parent) {
                return Some(parent);
            }
        }

        let mut outer = self.parent();
        while let Some(candidate) = outer {
            let mut inner = Some(other.clone());
            while let Some(node) = inner {
                if candidate.same(&node) {
                    trace!("shared ancestor found");
                    return Some(candidate);
                }
                inner = node.parent();
            }
            outer = candidate.parent();
        }

        debug!("layers share no ancestor");
        None
    }

    // -- General resolution --

    /// The transform from this layer's space into `other`'s space.
    ///
    /// `None` resolves relative to this layer's own root. Dispatches on the
    /// shared ancestor: identity when `self` and `other` are the same layer,
    /// a single up or down chain when one is the ancestor of the other, and
    /// the two-leg composition `down * up` when the layers diverge at an
    /// interior node.
    ///
    /// # Errors
    ///
    /// [`SpaceError::NoCommonAncestor`] when the layers live in disjoint
    /// trees; inversion errors from the downward leg.
    fn transform_to(&self, other: Option<&Self>) -> Result<Transform3d, SpaceError> {
        let Some(other) = other else {
            return Ok(self.transform_to_ancestor(None));
        };

        let ancestor = self
            .shared_ancestor(other)
            .ok_or(SpaceError::NoCommonAncestor)?;

        if self.same(&ancestor) {
            if self.same(other) {
                return Ok(Transform3d::IDENTITY);
            }
            return self.transform_to_descendant(other);
        }

        if other.same(&ancestor) {
            return Ok(self.transform_to_ancestor(Some(other)));
        }

        // The layers diverge at the ancestor: up from self, then down to
        // other.
        let up = self.transform_to_ancestor(Some(&ancestor));
        let down = ancestor.transform_to_descendant(other)?;
        Ok(down * up)
    }

    /// The transform from `other`'s space into this layer's space.
    ///
    /// Mirror of [`transform_to`](Self::transform_to); `None` resolves from
    /// this layer's own root.
    ///
    /// # Errors
    ///
    /// As for [`transform_to`](Self::transform_to).
    fn transform_from(&self, other: Option<&Self>) -> Result<Transform3d, SpaceError> {
        let Some(other) = other else {
            return self.transform_from_ancestor(None);
        };

        let ancestor = self
            .shared_ancestor(other)
            .ok_or(SpaceError::NoCommonAncestor)?;

        if self.same(&ancestor) {
            if self.same(other) {
                return Ok(Transform3d::IDENTITY);
            }
            return Ok(other.transform_to_ancestor(Some(self)));
        }

        if other.same(&ancestor) {
            return other.transform_from_descendant(self);
        }

        // The layers diverge at the ancestor: up from other, then down to
        // self.
        let up = other.transform_to_ancestor(Some(&ancestor));
        let down = ancestor.transform_to_descendant(self)?;
        Ok(down * up)
    }

    // -- Point conversion --

    /// Converts a point from this layer's space into `other`'s space.
    ///
    /// The 2-D point is lifted to homogeneous 3-D with `z = 0`, pushed
    /// through [`transform_to`](Self::transform_to), and projected back by
    /// dropping z.
    ///
    /// # Errors
    ///
    /// As for [`transform_to`](Self::transform_to).
    fn convert_to(&self, point: Point, other: &Self) -> Result<Point, SpaceError> {
        let transform = self.transform_to(Some(other))?;
        let p = transform * Vec3::new(point.x, point.y, 0.0);
        Ok(Point::new(p.x, p.y))
    }

    /// Converts a point from `other`'s space into this layer's space.
    ///
    /// # Errors
    ///
    /// As for [`transform_from`](Self::transform_from).
    fn convert_from(&self, point: Point, other: &Self) -> Result<Point, SpaceError> {
        let transform = self.transform_from(Some(other))?;
        let p = transform * Vec3::new(point.x, point.y, 0.0);
        Ok(Point::new(p.x, p.y))
    }
}

/// A borrowed view of one layer in a [`LayerStore`].
///
/// Created by [`LayerStore::layer_ref`]. Identity is the handle plus the
/// store it came from; refs into different stores are never the same layer.
#[derive(Clone, Copy, Debug)]
pub struct LayerRef<'a> {
    store: &'a LayerStore,
    id: LayerId,
}

impl<'a> LayerRef<'a> {
    pub(crate) fn new(store: &'a LayerStore, id: LayerId) -> Self {
        Self { store, id }
    }

    /// Returns the handle this ref points at.
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.id
    }
}

impl LayerNode for LayerRef<'_> {
    fn position(&self) -> Point {
        self.store.position(self.id)
    }

    fn bounds(&self) -> Size {
        self.store.bounds(self.id)
    }

    fn anchor_point(&self) -> Point {
        self.store.anchor_point(self.id)
    }

    fn transform(&self) -> Transform3d {
        self.store.transform(self.id)
    }

    fn parent(&self) -> Option<Self> {
        self.store
            .parent(self.id)
            .map(|id| Self::new(self.store, id))
    }

    fn same(&self, other: &Self) -> bool {
        core::ptr::eq(self.store, other.store) && self.id == other.id
    }
}

impl LayerStore {
    /// The transform mapping `from`'s local space into `to`'s local space.
    ///
    /// # Errors
    ///
    /// As for [`LayerNode::transform_to`].
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn transform_between(
        &self,
        from: LayerId,
        to: LayerId,
    ) -> Result<Transform3d, SpaceError> {
        let to_ref = self.layer_ref(to);
        self.layer_ref(from).transform_to(Some(&to_ref))
    }

    /// Converts a point in `from`'s space to `to`'s space.
    ///
    /// # Errors
    ///
    /// As for [`LayerNode::convert_to`].
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale.
    pub fn convert_point(
        &self,
        point: Point,
        from: LayerId,
        to: LayerId,
    ) -> Result<Point, SpaceError> {
        let to_ref = self.layer_ref(to);
        self.layer_ref(from).convert_to(point, &to_ref)
    }
}

#[cfg(test)]
mod tests {
    use alloc::rc::{Rc, Weak};
    use core::cell::RefCell;
    use core::f64::consts::FRAC_PI_2;

    use super::*;

    const EPS: f64 = 1e-9;

    /// A reference-counted test double with no store behind it.
    ///
    /// The parent link is weak, mirroring the non-owning relation the engine
    /// assumes; dropping all externally held nodes tears the tree down.
    struct Node {
        position: Point,
        bounds: Size,
        anchor_point: Point,
        transform: Transform3d,
        parent: RefCell<Weak<Node>>,
    }

    #[derive(Clone)]
    struct NodeRef(Rc<Node>);

    impl NodeRef {
        fn new(position: Point, bounds: Size) -> Self {
            Self::with_transform(position, bounds, Transform3d::IDENTITY)
        }

        fn with_transform(position: Point, bounds: Size, transform: Transform3d) -> Self {
            Self(Rc::new(Node {
                position,
                bounds,
                anchor_point: Point::new(0.5, 0.5),
                transform,
                parent: RefCell::new(Weak::new()),
            }))
        }

        fn root() -> Self {
            Self::new(Point::ZERO, Size::ZERO)
        }

        fn add_child(&self, child: &Self) {
            *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        }
    }

    impl LayerNode for NodeRef {
        fn position(&self) -> Point {
            self.0.position
        }

        fn bounds(&self) -> Size {
            self.0.bounds
        }

        fn anchor_point(&self) -> Point {
            self.0.anchor_point
        }

        fn transform(&self) -> Transform3d {
            self.0.transform
        }

        fn parent(&self) -> Option<Self> {
            self.0.parent.borrow().upgrade().map(Self)
        }

        fn same(&self, other: &Self) -> bool {
            Rc::ptr_eq(&self.0, &other.0)
        }
    }

    fn assert_point_near(actual: Point, expected: Point) {
        assert!(
            (actual.x - expected.x).abs() < EPS && (actual.y - expected.y).abs() < EPS,
            "expected {expected:?}, got {actual:?}"
        );
    }

    // -- shared_ancestor --

    #[test]
    fn shared_ancestor_of_a_layer_with_itself_is_itself() {
        let layer = NodeRef::root();
        let alias = layer.clone();
        let ancestor = layer.shared_ancestor(&alias).unwrap();
        assert!(ancestor.same(&layer));
    }

    #[test]
    fn shared_ancestor_of_unrelated_layers_is_none() {
        let a = NodeRef::root();
        let b = NodeRef::root();
        assert!(a.shared_ancestor(&b).is_none());
    }

    #[test]
    fn shared_ancestor_of_siblings_is_the_parent() {
        let parent = NodeRef::root();
        let a = NodeRef::root();
        let b = NodeRef::root();
        parent.add_child(&a);
        parent.add_child(&b);

        assert!(a.shared_ancestor(&b).unwrap().same(&parent));
        assert!(b.shared_ancestor(&a).unwrap().same(&parent));
    }

    #[test]
    fn shared_ancestor_of_parent_and_child_is_the_parent() {
        let parent = NodeRef::root();
        let child = NodeRef::root();
        parent.add_child(&child);

        assert!(parent.shared_ancestor(&child).unwrap().same(&parent));
        assert!(child.shared_ancestor(&parent).unwrap().same(&parent));
    }

    #[test]
    fn shared_ancestor_of_deep_branches_is_the_root() {
        let root = NodeRef::root();
        let a = NodeRef::root();
        let b = NodeRef::root();
        let c = NodeRef::root();
        let leaf1 = NodeRef::root();
        let leaf2 = NodeRef::root();

        root.add_child(&a);
        a.add_child(&b);
        b.add_child(&leaf1);
        root.add_child(&c);
        c.add_child(&leaf2);

        assert!(leaf1.shared_ancestor(&leaf2).unwrap().same(&root));
    }

    #[test]
    fn shared_ancestor_is_the_deepest_common_ancestor() {
        let root = NodeRef::root();
        let subroot = NodeRef::root();
        let a = NodeRef::root();
        let b = NodeRef::root();
        let c = NodeRef::root();
        let leaf1 = NodeRef::root();
        let leaf2 = NodeRef::root();

        subroot.add_child(&a);
        a.add_child(&b);
        b.add_child(&leaf1);
        subroot.add_child(&c);
        c.add_child(&leaf2);
        root.add_child(&subroot);

        // The deepest common ancestor, not merely root.
        assert!(leaf1.shared_ancestor(&leaf2).unwrap().same(&subroot));
    }

    #[test]
    fn shared_ancestor_of_deep_unrelated_hierarchies_is_none() {
        let a = NodeRef::root();
        let b = NodeRef::root();
        let c = NodeRef::root();
        let leaf1 = NodeRef::root();
        let leaf2 = NodeRef::root();

        a.add_child(&b);
        b.add_child(&leaf1);
        c.add_child(&leaf2);

        assert!(leaf1.shared_ancestor(&leaf2).is_none());
    }

    // -- per-layer transforms --

    #[test]
    fn transform_to_parent_offsets_by_position_and_anchor() {
        let layer = NodeRef::new(Point::new(100.0, 0.0), Size::new(50.0, 50.0));
        let t = layer.transform_to_parent();
        assert!(t.approx_eq(&Transform3d::from_translation(75.0, -25.0, 0.0), EPS));

        // The layer's own rect center lands at its position.
        let center = t * Vec3::new(25.0, 25.0, 0.0);
        assert!((center.x - 100.0).abs() < EPS);
        assert!(center.y.abs() < EPS);
    }

    #[test]
    fn transform_from_parent_inverts_transform_to_parent() {
        let layer = NodeRef::with_transform(
            Point::new(30.0, -10.0),
            Size::new(20.0, 40.0),
            Transform3d::from_rotation_z(FRAC_PI_2),
        );
        let round_trip = layer.transform_from_parent().unwrap() * layer.transform_to_parent();
        assert!(round_trip.approx_eq(&Transform3d::IDENTITY, EPS));
    }

    #[test]
    fn transform_from_parent_with_singular_transform_fails() {
        let layer = NodeRef::with_transform(
            Point::ZERO,
            Size::new(10.0, 10.0),
            Transform3d::from_scale(0.0, 1.0, 1.0),
        );
        assert_eq!(
            layer.transform_from_parent(),
            Err(SpaceError::SingularTransform)
        );
    }

    #[test]
    fn transform_from_parent_with_non_affine_transform_fails() {
        let mut perspective = Transform3d::IDENTITY;
        perspective.m[3][2] = -0.001;
        let layer = NodeRef::with_transform(Point::ZERO, Size::new(10.0, 10.0), perspective);
        assert_eq!(
            layer.transform_from_parent(),
            Err(SpaceError::NonAffineMatrix)
        );
    }

    // -- chain composition --

    #[test]
    fn transform_to_ancestor_composes_outward() {
        let root = NodeRef::root();
        let mid = NodeRef::new(Point::new(10.0, 0.0), Size::ZERO);
        let leaf = NodeRef::new(Point::new(0.0, 5.0), Size::ZERO);
        root.add_child(&mid);
        mid.add_child(&leaf);

        let t = leaf.transform_to_ancestor(Some(&root));
        assert!(t.approx_eq(&Transform3d::from_translation(10.0, 5.0, 0.0), EPS));

        // None walks to the root transform.
        let to_root = leaf.transform_to_ancestor(None);
        assert!(to_root.approx_eq(&t, EPS));
    }

    #[test]
    fn transform_to_ancestor_with_unreachable_ancestor_walks_to_root() {
        let root = NodeRef::root();
        let leaf = NodeRef::new(Point::new(3.0, 4.0), Size::ZERO);
        root.add_child(&leaf);

        let stranger = NodeRef::root();
        let t = leaf.transform_to_ancestor(Some(&stranger));
        assert!(t.approx_eq(&leaf.transform_to_ancestor(None), EPS));
    }

    #[test]
    fn transform_from_ancestor_is_the_inverse() {
        let root = NodeRef::root();
        let leaf = NodeRef::with_transform(
            Point::new(12.0, -8.0),
            Size::new(10.0, 10.0),
            Transform3d::from_rotation_z(0.3),
        );
        root.add_child(&leaf);

        let to = leaf.transform_to_ancestor(Some(&root));
        let from = leaf.transform_from_ancestor(Some(&root)).unwrap();
        assert!((to * from).approx_eq(&Transform3d::IDENTITY, EPS));
    }

    #[test]
    fn transform_to_descendant_not_a_descendant_fails() {
        let a = NodeRef::root();
        let b = NodeRef::root();
        assert_eq!(
            a.transform_to_descendant(&b).unwrap_err(),
            SpaceError::NotADescendant
        );

        // A sibling is not a descendant either.
        let parent = NodeRef::root();
        let c = NodeRef::root();
        parent.add_child(&a);
        parent.add_child(&c);
        assert_eq!(
            a.transform_to_descendant(&c).unwrap_err(),
            SpaceError::NotADescendant
        );
    }

    #[test]
    fn transform_to_descendant_round_trips_with_from_descendant() {
        let root = NodeRef::root();
        let mid = NodeRef::with_transform(
            Point::new(7.0, 7.0),
            Size::new(30.0, 30.0),
            Transform3d::from_scale(2.0, 2.0, 1.0),
        );
        let leaf = NodeRef::new(Point::new(-3.0, 2.0), Size::new(10.0, 10.0));
        root.add_child(&mid);
        mid.add_child(&leaf);

        let down = root.transform_to_descendant(&leaf).unwrap();
        let up = root.transform_from_descendant(&leaf).unwrap();
        assert!((down * up).approx_eq(&Transform3d::IDENTITY, EPS));
    }

    // -- general resolution --

    #[test]
    fn transform_to_self_is_identity() {
        let layer = NodeRef::new(Point::new(9.0, 9.0), Size::new(4.0, 4.0));
        let alias = layer.clone();
        assert_eq!(
            layer.transform_to(Some(&alias)).unwrap(),
            Transform3d::IDENTITY
        );
        assert_eq!(
            layer.transform_from(Some(&alias)).unwrap(),
            Transform3d::IDENTITY
        );
    }

    #[test]
    fn transform_between_disjoint_trees_fails() {
        let a = NodeRef::root();
        let b = NodeRef::root();
        assert_eq!(a.transform_to(Some(&b)), Err(SpaceError::NoCommonAncestor));
        assert_eq!(
            a.transform_from(Some(&b)),
            Err(SpaceError::NoCommonAncestor)
        );
        assert_eq!(
            a.convert_to(Point::ZERO, &b),
            Err(SpaceError::NoCommonAncestor)
        );
        assert_eq!(
            a.convert_from(Point::ZERO, &b),
            Err(SpaceError::NoCommonAncestor)
        );
    }

    #[test]
    fn transform_to_none_resolves_to_the_root() {
        let root = NodeRef::root();
        let leaf = NodeRef::new(Point::new(4.0, -6.0), Size::ZERO);
        root.add_child(&leaf);

        let t = leaf.transform_to(None).unwrap();
        assert!(t.approx_eq(&Transform3d::from_translation(4.0, -6.0, 0.0), EPS));

        let back = leaf.transform_from(None).unwrap();
        assert!((t * back).approx_eq(&Transform3d::IDENTITY, EPS));
    }

    #[test]
    fn sibling_resolution_goes_through_the_shared_root() {
        // a at (100, 0), b at (0, 100), both 50x50 with centered anchors
        // under a root at the origin.
        let root = NodeRef::root();
        let a = NodeRef::new(Point::new(100.0, 0.0), Size::new(50.0, 50.0));
        let b = NodeRef::new(Point::new(0.0, 100.0), Size::new(50.0, 50.0));
        root.add_child(&a);
        root.add_child(&b);

        let t = b.transform_from(Some(&a)).unwrap();
        assert!(t.approx_eq(&Transform3d::from_translation(100.0, -100.0, 0.0), EPS));
        assert!(
            a.transform_to(Some(&b))
                .unwrap()
                .approx_eq(&Transform3d::from_translation(100.0, -100.0, 0.0), EPS)
        );

        // a's rect center, carried into b's bounds coordinates.
        let p = b.convert_from(Point::new(25.0, 25.0), &a).unwrap();
        assert_point_near(p, Point::new(125.0, -75.0));
        let q = a.convert_to(Point::new(25.0, 25.0), &b).unwrap();
        assert_point_near(q, p);
    }

    #[test]
    fn cross_branch_to_and_from_are_mutual_inverses() {
        let root = NodeRef::root();
        let left = NodeRef::with_transform(
            Point::new(50.0, 20.0),
            Size::new(40.0, 40.0),
            Transform3d::from_rotation_z(FRAC_PI_2),
        );
        let right = NodeRef::with_transform(
            Point::new(-10.0, 0.0),
            Size::new(20.0, 60.0),
            Transform3d::from_scale(2.0, 0.5, 1.0),
        );
        let leaf1 = NodeRef::new(Point::new(5.0, 5.0), Size::new(10.0, 10.0));
        let leaf2 = NodeRef::new(Point::new(-5.0, 8.0), Size::new(16.0, 4.0));

        root.add_child(&left);
        root.add_child(&right);
        left.add_child(&leaf1);
        right.add_child(&leaf2);

        let to = leaf1.transform_to(Some(&leaf2)).unwrap();
        let from = leaf1.transform_from(Some(&leaf2)).unwrap();
        assert!((to * from).approx_eq(&Transform3d::IDENTITY, EPS));
        assert!((from * to).approx_eq(&Transform3d::IDENTITY, EPS));
        assert!(from.approx_eq(&to.inverted().unwrap(), EPS));
    }

    #[test]
    fn cross_branch_point_conversion_round_trips() {
        let root = NodeRef::root();
        let left = NodeRef::with_transform(
            Point::new(10.0, 10.0),
            Size::new(20.0, 20.0),
            Transform3d::from_rotation_z(0.7),
        );
        let right = NodeRef::new(Point::new(-30.0, 5.0), Size::new(50.0, 10.0));
        root.add_child(&left);
        root.add_child(&right);

        let p = Point::new(3.0, -4.0);
        let there = left.convert_to(p, &right).unwrap();
        let back = right.convert_to(there, &left).unwrap();
        assert_point_near(back, p);
    }

    #[test]
    fn resolution_to_a_descendant_uses_the_down_chain() {
        let root = NodeRef::root();
        let child = NodeRef::new(Point::new(10.0, 0.0), Size::ZERO);
        root.add_child(&child);

        // From the root's perspective, the child sits 10 to the right; a
        // root-space point comes back shifted by -10.
        let t = root.transform_to(Some(&child)).unwrap();
        let p = t * Vec3::new(10.0, 0.0, 0.0);
        assert!(p.x.abs() < EPS && p.y.abs() < EPS);

        let from_child = root.transform_from(Some(&child)).unwrap();
        assert!(from_child.approx_eq(&child.transform_to_ancestor(Some(&root)), EPS));
    }

    #[test]
    fn singular_layer_blocks_downward_resolution() {
        let root = NodeRef::root();
        let squashed = NodeRef::with_transform(
            Point::ZERO,
            Size::new(10.0, 10.0),
            Transform3d::from_scale(0.0, 1.0, 1.0),
        );
        root.add_child(&squashed);

        assert_eq!(
            root.transform_to(Some(&squashed)),
            Err(SpaceError::SingularTransform)
        );
        // The upward direction never inverts the squashed layer's transform.
        assert!(squashed.transform_to(Some(&root)).is_ok());
    }

    // -- LayerRef over a store --

    #[test]
    fn store_backed_resolution_matches_the_double() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        let a = store.create_layer();
        let b = store.create_layer();
        store.add_child(root, a);
        store.add_child(root, b);
        store.set_position(a, Point::new(100.0, 0.0));
        store.set_bounds(a, Size::new(50.0, 50.0));
        store.set_position(b, Point::new(0.0, 100.0));
        store.set_bounds(b, Size::new(50.0, 50.0));

        let t = store.transform_between(a, b).unwrap();
        assert!(t.approx_eq(&Transform3d::from_translation(100.0, -100.0, 0.0), EPS));

        let p = store.convert_point(Point::new(25.0, 25.0), a, b).unwrap();
        assert_point_near(p, Point::new(125.0, -75.0));
    }

    #[test]
    fn layer_refs_from_different_stores_are_unrelated() {
        let mut store1 = LayerStore::new();
        let mut store2 = LayerStore::new();
        let a = store1.create_layer();
        let b = store2.create_layer();

        let ref_a = store1.layer_ref(a);
        let ref_b = store2.layer_ref(b);
        assert!(!ref_a.same(&ref_b));
        assert!(ref_a.shared_ancestor(&ref_b).is_none());
        assert_eq!(
            ref_a.transform_to(Some(&ref_b)),
            Err(SpaceError::NoCommonAncestor)
        );
    }

    #[test]
    fn store_backed_shared_ancestor_via_ids() {
        let mut store = LayerStore::new();
        let root = store.create_layer();
        let subroot = store.create_layer();
        let x = store.create_layer();
        let y = store.create_layer();
        store.add_child(root, subroot);
        store.add_child(subroot, x);
        store.add_child(subroot, y);

        let rx = store.layer_ref(x);
        let ry = store.layer_ref(y);
        let ancestor = rx.shared_ancestor(&ry).unwrap();
        assert_eq!(ancestor.id(), subroot);
    }

    #[test]
    fn rotated_parent_rotates_child_space() {
        // A quarter turn on the parent maps the child's +x axis onto the
        // root's +y axis (z-rotation is counterclockwise with y up).
        let root = NodeRef::root();
        let spinner = NodeRef::with_transform(
            Point::ZERO,
            Size::ZERO,
            Transform3d::from_rotation_z(FRAC_PI_2),
        );
        root.add_child(&spinner);

        let t = spinner.transform_to(Some(&root)).unwrap();
        let p = t * Vec3::new(1.0, 0.0, 0.0);
        assert!(p.x.abs() < EPS);
        assert!((p.y - 1.0).abs() < EPS);
    }
}
