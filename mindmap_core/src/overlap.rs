// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlap Resolver (C3): the hardest subsystem.
//!
//! Ensures forest invariants (4) and (5) hold after every mutation or drag:
//! no two sibling sub-trees overlap, and depth-1 children stay within their
//! `side`'s half-plane relative to the root.
//!
//! ## Algorithm
//!
//! A full pass walks a root sub-tree post-order: each internal node's
//! children are resolved first (deepest sub-trees settle before their
//! ancestors), then the node's own children are stacked against each other.
//! When the parent is a root, children are split into a left group and a
//! right group by `side` and each group is stacked with its own, separate
//! accumulator — §4.3's "vertical stacking occurs independently per side"
//! is enforced structurally rather than assumed from rectangle geometry,
//! since `enforce_side_half_plane` (the pass that actually separates the
//! two sides on the x axis) does not run until after this stacking pass,
//! and freshly inserted or imported depth-1 children commonly start out at
//! identical, overlapping positions. Within a group, each child after the
//! first is shifted by the minimum vertical displacement that clears any
//! overlap with the union of that group's already-placed siblings.
//!
//! A root's own sub-tree is given up to 10 full passes; a pass that shifts
//! nothing means the sub-tree has converged and the loop exits early. A
//! root that still needs shifts after 10 passes is reported back to the
//! caller as a non-fatal convergence warning — the layout is left in its
//! best-effort state, per §4.3.

use alloc::vec::Vec;

use crate::bbox::{self, Spacing};
use crate::flags::Side;
use crate::ids::{NodeId, Slot};
use crate::store::NodeStore;

/// Maximum number of full resolution passes per root sub-tree (§4.3).
pub const MAX_ITERATIONS: u32 = 10;

fn rects_overlap(a: kurbo::Rect, b: kurbo::Rect) -> bool {
    !a.intersect(b).is_empty()
}

/// Runs the global pass (§4.3) over every root sub-tree in `store`.
///
/// Returns the ids of roots that did not converge within
/// [`MAX_ITERATIONS`] passes (`ConvergenceWarning`, non-fatal).
pub fn global_resolve(store: &mut NodeStore, spacing: Spacing) -> Vec<NodeId> {
    let roots = store.root_slots();
    resolve_roots(store, &roots, spacing)
}

/// Runs the incremental pass (§4.3): restricts the global pass to the
/// distinct root sub-trees containing any of `dirty`.
///
/// A shift cannot propagate across root boundaries because roots are
/// placed independently by the caller, so resolving only the affected
/// roots is equivalent to a global pass restricted to those roots.
pub fn incremental_resolve(store: &mut NodeStore, dirty: &[NodeId], spacing: Spacing) -> Vec<NodeId> {
    let mut roots = Vec::new();
    for id in dirty {
        let Some(slot) = store.slot_of(id) else { continue };
        let mut cur = slot;
        while let Some(p) = store.parent_slot(cur) {
            cur = p;
        }
        if !roots.contains(&cur) {
            roots.push(cur);
        }
    }
    resolve_roots(store, &roots, spacing)
}

fn resolve_roots(store: &mut NodeStore, roots: &[Slot], spacing: Spacing) -> Vec<NodeId> {
    let mut warnings = Vec::new();
    for &root in roots {
        if !resolve_root(store, root, spacing) {
            if let Some(id) = store.id_of(root) {
                warnings.push(id);
            }
        }
        store.clear_pos_dirty_subtree(root);
    }
    warnings
}

/// Resolves a single root sub-tree to convergence or the iteration cap.
/// Returns `true` if it converged within [`MAX_ITERATIONS`] passes.
fn resolve_root(store: &mut NodeStore, root: Slot, spacing: Spacing) -> bool {
    for _ in 0..MAX_ITERATIONS {
        if !resolve_pass(store, root, spacing) {
            return true;
        }
    }
    false
}

/// One full post-order pass over `slot`'s sub-tree. Returns whether any
/// sibling was shifted.
fn resolve_pass(store: &mut NodeStore, slot: Slot, spacing: Spacing) -> bool {
    if store.is_collapsed_slot(slot) {
        return false;
    }
    let children = store.children_slots(slot);
    if children.is_empty() {
        return false;
    }

    let mut changed = false;
    for &child in &children {
        if resolve_pass(store, child, spacing) {
            changed = true;
        }
    }
    if stack_children(store, slot, &children, spacing) {
        changed = true;
    }
    if store.parent_slot(slot).is_none() && enforce_side_half_plane(store, slot, &children, spacing) {
        changed = true;
    }
    changed
}

/// Stacks `children` (already computed for `slot`) top-to-bottom, shifting
/// each one clear of the union of its already-placed predecessors.
///
/// When `slot` is a root, children are split by `side` into a left group
/// (a missing `side` is treated as left, matching `lod`'s grouping of
/// hidden-children badges) and a right group *before* stacking, and each
/// group gets its own accumulator via [`stack_in_order`] — the two sides
/// never compete for the same "already placed" union, regardless of
/// whether their rectangles happen to overlap at the start of this pass.
fn stack_children(store: &mut NodeStore, slot: Slot, children: &[Slot], spacing: Spacing) -> bool {
    if children.len() < 2 {
        return false;
    }
    if store.parent_slot(slot).is_none() {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for &child in children {
            match store.side_slot(child) {
                Some(Side::Right) => right.push(child),
                _ => left.push(child),
            }
        }
        let left_changed = stack_in_order(store, &left, spacing);
        let right_changed = stack_in_order(store, &right, spacing);
        left_changed || right_changed
    } else {
        stack_in_order(store, children, spacing)
    }
}

/// Stacks `ordered` top-to-bottom against a single accumulator, shifting
/// each child after the first clear of the union of its already-placed
/// predecessors within `ordered`.
fn stack_in_order(store: &mut NodeStore, ordered: &[Slot], spacing: Spacing) -> bool {
    if ordered.len() < 2 {
        return false;
    }
    let mut changed = false;
    let mut placed: Option<kurbo::Rect> = None;
    for &child in ordered {
        let mut rect = bbox::bounding_rect_slot(store, child, spacing);
        if let Some(acc) = placed {
            if rects_overlap(acc, rect) {
                let (dx, dy) = vertical_clearance(acc, rect);
                store.translate_subtree_slot(child, dx, dy);
                rect = kurbo::Rect::new(rect.x0 + dx, rect.y0 + dy, rect.x1 + dx, rect.y1 + dy);
                changed = true;
            }
            placed = Some(acc.union(rect));
        } else {
            placed = Some(rect);
        }
    }
    changed
}

/// Minimum `(dx, dy)` that clears `rect` of `acc` on the vertical axis,
/// preferring the smaller-magnitude shift; a tie is broken downward (§4.3).
fn vertical_clearance(acc: kurbo::Rect, rect: kurbo::Rect) -> (f64, f64) {
    let down = acc.y1 - rect.y0;
    let up = acc.y0 - rect.y1;
    let dy = if down.abs() <= up.abs() { down } else { up };
    (0.0, dy)
}

/// Keeps depth-1 children within their `side`'s half-plane (invariant 6)
/// by shifting horizontally away from the centerline when violated. This
/// is the "horizontal shift ... for depth-1 children whose side requires
/// it" case described in §4.3: ordinary sibling stacking is vertical, but
/// a side assignment can still be violated (e.g. by a drag that crossed
/// the centerline before `side` was reassigned) and is corrected here,
/// independently of the vertical stacking pass above.
fn enforce_side_half_plane(
    store: &mut NodeStore,
    root: Slot,
    children: &[Slot],
    spacing: Spacing,
) -> bool {
    let root_rect = store.node_rect(root);
    let mut changed = false;
    for &child in children {
        let Some(side) = store.side_slot(child) else { continue };
        let rect = bbox::bounding_rect_slot(store, child, spacing);
        let dx = match side {
            Side::Left if rect.x1 > root_rect.x0 => root_rect.x0 - rect.x1,
            Side::Right if rect.x0 < root_rect.x1 => root_rect.x1 - rect.x0,
            _ => 0.0,
        };
        if dx != 0.0 {
            store.translate_subtree_slot(child, dx, 0.0);
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeAttrs;

    fn sized(w: f64, h: f64) -> NodeAttrs {
        NodeAttrs { width: w, height: h, ..NodeAttrs::default() }
    }

    #[test]
    fn overlapping_siblings_stack_without_gap_or_overlap() {
        // S5: five equal children, each overlapping the next by 10 units.
        let mut store = NodeStore::new();
        let p = store.insert(None, sized(10.0, 10.0)).unwrap();
        let child_h = 40.0;
        let mut kids = Vec::new();
        for i in 0..5u32 {
            let c = store.insert(Some(&p), sized(100.0, child_h)).unwrap();
            let y = (i as f64) * (child_h - 10.0);
            store.set_position_slot(store.slot_of(&c).unwrap(), 0.0, y);
            kids.push(c);
        }
        let warnings = global_resolve(&mut store, Spacing::default());
        assert!(warnings.is_empty());

        let mut ys: Vec<f64> = kids.iter().map(|c| store.node(c).unwrap().y).collect();
        ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in ys.windows(2) {
            assert_eq!(pair[1] - pair[0], child_h, "children must be exactly adjacent");
        }
        let p_bbox = bbox::bounding_rect(&mut store, &p, Spacing::default()).unwrap();
        assert!(p_bbox.height() >= 5.0 * child_h);
    }

    #[test]
    fn incremental_resolve_does_not_touch_other_roots() {
        // S4: two independent roots; resolving one leaves the other's
        // positions bitwise unchanged.
        let mut store = NodeStore::new();
        let r1 = store.insert(None, sized(10.0, 10.0)).unwrap();
        let a = store.insert(Some(&r1), sized(50.0, 50.0)).unwrap();
        let b = store.insert(Some(&r1), sized(50.0, 50.0)).unwrap();
        store.set_position_slot(store.slot_of(&a).unwrap(), 0.0, 0.0);
        store.set_position_slot(store.slot_of(&b).unwrap(), 10.0, 10.0);

        let r2 = store.insert(None, sized(10.0, 10.0)).unwrap();
        store.set_position_slot(store.slot_of(&r2).unwrap(), 1000.0, 1000.0);
        let c = store.insert(Some(&r2), sized(30.0, 30.0)).unwrap();
        store.set_position_slot(store.slot_of(&c).unwrap(), 1000.0, 1000.0);
        let before = store.node(&c).unwrap();

        let warnings = incremental_resolve(&mut store, &[a, b], Spacing::default());
        assert!(warnings.is_empty());

        assert_eq!(store.node(&c).unwrap(), before);
        let _ = store.node(&r2).unwrap();
    }

    #[test]
    fn side_half_plane_violation_is_corrected() {
        let mut store = NodeStore::new();
        let r = store.insert(None, sized(100.0, 50.0)).unwrap();
        store.set_position_slot(store.slot_of(&r).unwrap(), 0.0, 0.0);
        let c = store
            .insert(
                Some(&r),
                NodeAttrs { width: 50.0, height: 50.0, side: Some(Side::Left), ..NodeAttrs::default() },
            )
            .unwrap();
        // Deliberately placed overlapping the root's own rectangle, as if a
        // drag crossed back without `side` reassignment.
        store.set_position_slot(store.slot_of(&c).unwrap(), 50.0, 0.0);

        global_resolve(&mut store, Spacing::default());
        let c_rect = store.node(&c).unwrap();
        assert!(c_rect.x + c_rect.width <= 0.0 + 1e-9);
    }

    #[test]
    fn opposite_side_children_stack_independently_despite_initial_overlap() {
        // Freshly inserted depth-1 children both default to (0, 0), so they
        // overlap each other's rect at the start of the pass even though
        // `side` already distinguishes them. A left/right child must never
        // shift the other vertically: only `enforce_side_half_plane`
        // (running after this pass) should move them apart, horizontally.
        let mut store = NodeStore::new();
        let r = store.insert(None, sized(100.0, 50.0)).unwrap();
        let c1 = store
            .insert(Some(&r), NodeAttrs { width: 60.0, height: 50.0, side: Some(Side::Left), ..NodeAttrs::default() })
            .unwrap();
        let c2 = store
            .insert(Some(&r), NodeAttrs { width: 60.0, height: 50.0, side: Some(Side::Right), ..NodeAttrs::default() })
            .unwrap();

        let warnings = global_resolve(&mut store, Spacing::default());
        assert!(warnings.is_empty());

        assert_eq!(store.node(&c1).unwrap().y, 0.0, "lone left child must not be shifted vertically");
        assert_eq!(store.node(&c2).unwrap().y, 0.0, "lone right child must not be shifted vertically by its left sibling");
    }

    #[test]
    fn converges_within_iteration_cap_for_simple_chains() {
        let mut store = NodeStore::new();
        let p = store.insert(None, sized(10.0, 10.0)).unwrap();
        for i in 0..10u32 {
            let c = store.insert(Some(&p), sized(20.0, 20.0)).unwrap();
            store.set_position_slot(store.slot_of(&c).unwrap(), 0.0, (i as f64) * 5.0);
        }
        let warnings = global_resolve(&mut store, Spacing::new(0.0, 2.0));
        assert!(warnings.is_empty());
    }
}
