// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding-Rect Calculator (C2).

use kurbo::Rect;

use crate::ids::{NodeId, Slot};
use crate::store::NodeStore;

/// Engine-wide padding applied when inflating a sub-tree's bounding
/// rectangle (§4.2). Default `0.0`/`0.0` (tight layout).
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Spacing {
    pub horizontal: f64,
    pub vertical: f64,
}

impl Spacing {
    #[must_use]
    pub const fn new(horizontal: f64, vertical: f64) -> Self {
        Self { horizontal, vertical }
    }
}

fn inflate(rect: Rect, spacing: Spacing) -> Rect {
    Rect::new(
        rect.x0 - spacing.horizontal,
        rect.y0 - spacing.vertical,
        rect.x1 + spacing.horizontal,
        rect.y1 + spacing.vertical,
    )
}

/// Computes (and caches) the bounding rectangle of `id`'s sub-tree.
///
/// Returns `None` if `id` is unknown. A collapsed node, or a leaf,
/// contributes only its own node rectangle; otherwise the result is the
/// union of the node's own rectangle with every non-collapsed child's
/// bounding rectangle, inflated by `spacing`.
pub fn bounding_rect(store: &mut NodeStore, id: &NodeId, spacing: Spacing) -> Option<Rect> {
    let slot = store.slot_of(id)?;
    Some(bounding_rect_slot(store, slot, spacing))
}

pub(crate) fn bounding_rect_slot(store: &mut NodeStore, slot: Slot, spacing: Spacing) -> Rect {
    if !store.bbox_dirty(slot) {
        if let Some(cached) = store.cached_bbox(slot) {
            return cached;
        }
    }

    let node_rect = store.node_rect(slot);
    let rect = if store.is_collapsed_slot(slot) {
        inflate(node_rect, spacing)
    } else {
        let mut acc = node_rect;
        for child in store.children_slots(slot) {
            acc = acc.union(bounding_rect_slot(store, child, spacing));
        }
        inflate(acc, spacing)
    };

    store.set_cached_bbox(slot, rect);
    store.clear_bbox_dirty(slot);
    rect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeAttrs;

    fn sized(w: f64, h: f64) -> NodeAttrs {
        NodeAttrs { width: w, height: h, ..NodeAttrs::default() }
    }

    #[test]
    fn leaf_bbox_equals_node_rect_inflated() {
        let mut store = NodeStore::new();
        let a = store.insert(None, sized(10.0, 20.0)).unwrap();
        let spacing = Spacing::new(5.0, 2.0);
        let rect = bounding_rect(&mut store, &a, spacing).unwrap();
        assert_eq!(rect, Rect::new(-5.0, -2.0, 15.0, 22.0));
    }

    #[test]
    fn internal_bbox_contains_all_descendants() {
        let mut store = NodeStore::new();
        let a = store.insert(None, sized(10.0, 10.0)).unwrap();
        let b = store.insert(Some(&a), sized(10.0, 10.0)).unwrap();
        store.set_position_slot(store.slot_of(&b).unwrap(), 100.0, 100.0);
        let rect = bounding_rect(&mut store, &a, Spacing::default()).unwrap();
        assert!(rect.contains(kurbo::Point::new(100.0, 100.0)));
        assert!(rect.contains(kurbo::Point::new(0.0, 0.0)));
    }

    #[test]
    fn collapsed_node_ignores_children() {
        let mut store = NodeStore::new();
        let a = store.insert(None, sized(10.0, 10.0)).unwrap();
        let b = store.insert(Some(&a), sized(10.0, 10.0)).unwrap();
        store.set_position_slot(store.slot_of(&b).unwrap(), 500.0, 500.0);
        store
            .update(&a, crate::node::NodePatch { collapsed: Some(true), ..Default::default() })
            .unwrap();
        let rect = bounding_rect(&mut store, &a, Spacing::default()).unwrap();
        assert_eq!(rect, Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn cached_bbox_reused_until_invalidated() {
        let mut store = NodeStore::new();
        let a = store.insert(None, sized(10.0, 10.0)).unwrap();
        let first = bounding_rect(&mut store, &a, Spacing::default()).unwrap();
        let second = bounding_rect(&mut store, &a, Spacing::default()).unwrap();
        assert_eq!(first, second);
        store
            .update(&a, crate::node::NodePatch { width: Some(50.0), ..Default::default() })
            .unwrap();
        let third = bounding_rect(&mut store, &a, Spacing::default()).unwrap();
        assert_eq!(third, Rect::new(0.0, 0.0, 50.0, 10.0));
    }

    #[test]
    fn growing_child_grows_ancestor_bbox() {
        let mut store = NodeStore::new();
        let a = store.insert(None, sized(10.0, 10.0)).unwrap();
        let b = store.insert(Some(&a), sized(10.0, 10.0)).unwrap();
        let _ = bounding_rect(&mut store, &a, Spacing::default()).unwrap();
        store
            .update(&b, crate::node::NodePatch { width: Some(1000.0), ..Default::default() })
            .unwrap();
        let rect = bounding_rect(&mut store, &a, Spacing::default()).unwrap();
        assert_eq!(rect.width(), 1000.0);
    }
}
