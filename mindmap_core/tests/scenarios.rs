// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios exercising the bounding-rect calculator, overlap
//! resolver, and LOD filter together through the public `NodeStore` API.

use mindmap_core::bbox::Spacing;
use mindmap_core::lod::{self, LodConfig};
use mindmap_core::node::NodeAttrs;
use mindmap_core::overlap;
use mindmap_core::store::NodeStore;
use mindmap_core::NodeId;

fn sized(w: f64, h: f64) -> NodeAttrs {
    NodeAttrs { width: w, height: h, ..NodeAttrs::default() }
}

fn insert_balanced(store: &mut NodeStore, parent: Option<&NodeId>, remaining_depth: u32) {
    if remaining_depth == 0 {
        return;
    }
    for _ in 0..2 {
        let child = store.insert(parent, sized(20.0, 10.0)).unwrap();
        insert_balanced(store, Some(&child), remaining_depth - 1);
    }
}

/// S1 — LOD visibility at threshold boundaries.
///
/// Balanced binary tree of depth 4 rooted at `r` (31 nodes total),
/// thresholds `[10, 30, 50, 70]`. Checks the visible-set size and badge
/// count at zoom 9, 10, 30, and 70.
#[test]
fn s1_lod_visibility_at_threshold_boundaries() {
    let mut store = NodeStore::new();
    let root = store.insert(None, sized(20.0, 10.0)).unwrap();
    insert_balanced(&mut store, Some(&root), 4);
    assert_eq!(store.descendants(&root).len() + 1, 31);

    let spacing = Spacing::default();
    let mut config = LodConfig { thresholds: vec![10.0, 30.0, 50.0, 70.0], step: 20.0, enabled: true };

    let below_first = lod::compute(&mut store, spacing, &mut config, 9.0);
    assert_eq!(below_first.visible.len(), 1);
    assert_eq!(below_first.visible[0], root);

    let at_first = lod::compute(&mut store, spacing, &mut config, 10.0);
    assert_eq!(at_first.visible.len(), 3);
    assert_eq!(at_first.badges.len(), 2);

    let at_second = lod::compute(&mut store, spacing, &mut config, 30.0);
    assert_eq!(at_second.visible.len(), 7);
    assert_eq!(at_second.badges.len(), 4);

    let at_last = lod::compute(&mut store, spacing, &mut config, 70.0);
    assert_eq!(at_last.visible.len(), 31);
    assert!(at_last.badges.is_empty());
}

/// S5 — Overlap resolution convergence.
///
/// Five equal-size children of `p`, each overlapping the next by 10 units
/// vertically. After an incremental resolve with `vertical_spacing = 0`,
/// the children are adjacent, the total span equals `5 * child_height`,
/// and `p`'s bounding rect height is at least that span.
#[test]
fn s5_overlap_resolution_stacks_children_with_no_gap_or_overlap() {
    let mut store = NodeStore::new();
    let parent = store.insert(None, sized(40.0, 10.0)).unwrap();
    let child_height = 20.0;
    let mut children = Vec::new();
    for i in 0..5u32 {
        let child = store.insert(Some(&parent), sized(40.0, child_height)).unwrap();
        let y = f64::from(i) * (child_height - 10.0);
        let _ = store.set_position(&child, 0.0, y);
        children.push(child);
    }

    let spacing = Spacing::new(0.0, 0.0);
    let warnings = overlap::incremental_resolve(&mut store, &children, spacing);
    assert!(warnings.is_empty());

    let mut ys: Vec<f64> = children.iter().map(|id| store.position(id).unwrap().1).collect();
    ys.sort_by(|a, b| a.partial_cmp(b).unwrap());
    for pair in ys.windows(2) {
        assert!((pair[1] - pair[0] - child_height).abs() < 1e-9);
    }
    let span = ys.last().unwrap() + child_height - ys[0];
    assert!((span - 5.0 * child_height).abs() < 1e-9);

    let bbox = mindmap_core::bbox::bounding_rect(&mut store, &parent, spacing).unwrap();
    assert!(bbox.height() >= 5.0 * child_height);
}

/// S6 — Dynamic threshold extension.
///
/// Starting from the default five thresholds, a chain of insertions that
/// pushes tree depth to 7 extends the thresholds to length 7 and clamps
/// `max_zoom` to its ceiling of `2.0`.
#[test]
fn s6_dynamic_threshold_extension_on_deep_tree() {
    let mut store = NodeStore::new();
    let mut parent: Option<NodeId> = None;
    for _ in 0..8 {
        let id = store.insert(parent.as_ref(), sized(20.0, 10.0)).unwrap();
        parent = Some(id);
    }
    assert_eq!(store.max_depth(), 7);

    let mut config = LodConfig::default();
    assert_eq!(config.thresholds.len(), 5);
    config.ensure_depth(store.max_depth() + 1);

    assert_eq!(config.thresholds, vec![10.0, 30.0, 50.0, 70.0, 90.0, 110.0, 130.0]);
    assert!((config.max_zoom() - 2.0).abs() < 1e-9);
}
