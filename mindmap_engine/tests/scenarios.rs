// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenarios driving `Engine` through its public API only (no
//! direct `mindmap_core` access), the way a host embedding this crate
//! would.

use mindmap_engine::{Engine, EngineError, NodeAttrs, NodePatch};

fn sized(w: f64, h: f64) -> NodeAttrs {
    NodeAttrs { width: w, height: h, ..NodeAttrs::default() }
}

/// S2 — Cycle rejection.
///
/// Forest `a -> b -> c`. `move(a, c)` must fail with `CycleDetected`,
/// leave the forest unchanged, and emit nothing.
#[test]
fn s2_cycle_rejection_through_public_api() {
    let mut engine = Engine::new();
    let a = engine.insert(None, NodeAttrs::default(), "test").unwrap();
    let b = engine.insert(Some(&a), NodeAttrs::default(), "test").unwrap();
    let c = engine.insert(Some(&b), NodeAttrs::default(), "test").unwrap();

    let revision_before = engine.revision();
    let emitted = std::rc::Rc::new(std::cell::Cell::new(0u32));
    let counter = emitted.clone();
    engine.subscribe(move |_| counter.set(counter.get() + 1));

    let err = engine.move_node(&a, Some(&c), None, "test").unwrap_err();
    assert!(matches!(err, EngineError::CycleDetected { .. }));
    assert_eq!(engine.revision(), revision_before);
    assert_eq!(emitted.get(), 0);

    assert_eq!(engine.path_to_root(&c), vec![c.clone(), b.clone(), a.clone()]);
}

/// S3 — Side mirroring across centerline (public-API variant).
///
/// A depth-1 child dragged far enough to cross its root's centerline
/// flips from `left` to `right`; dragging it back the same distance
/// flips it back.
#[test]
fn s3_drag_across_centerline_flips_side_and_back() {
    let mut engine = Engine::new();
    let root = engine.insert(None, sized(100.0, 50.0), "test").unwrap();
    let child = engine
        .insert(
            Some(&root),
            NodeAttrs { side: Some(mindmap_engine::Side::Left), ..sized(60.0, 20.0) },
            "test",
        )
        .unwrap();

    engine.begin_drag(vec![child.clone()]);
    engine.drag_to(5000.0, 0.0, "test");
    engine.end_drag("test");

    let after = engine.node(&child).unwrap();
    assert_eq!(after.side, Some(mindmap_engine::Side::Right));

    engine.begin_drag(vec![child.clone()]);
    engine.drag_to(-5000.0, 0.0, "test");
    engine.end_drag("test");

    let back = engine.node(&child).unwrap();
    assert_eq!(back.side, Some(mindmap_engine::Side::Left));
}

/// Updating a node's geometry settles the operation and is reflected in
/// the next view model read.
#[test]
fn update_marks_dirty_and_is_visible_in_view_model() {
    let mut engine = Engine::new();
    let id = engine.insert(None, sized(100.0, 40.0), "test").unwrap();
    engine
        .update(&id, NodePatch { width: Some(200.0), ..NodePatch::default() }, "test")
        .unwrap();

    let vm = engine.get_view_model();
    let node = vm.nodes.iter().find(|n| n.id == id).expect("node visible at default zoom");
    assert_eq!(node.width, 200.0);
}

/// A document saved and reloaded through the public API preserves node
/// count and parent/child structure.
#[test]
fn document_save_and_reload_preserves_structure() {
    let mut engine = Engine::new();
    let root = engine.insert(None, sized(120.0, 40.0), "test").unwrap();
    let child = engine.insert(Some(&root), sized(60.0, 20.0), "test").unwrap();

    let doc = engine.to_document();
    let mut reloaded = Engine::new();
    reloaded.load_document(doc).unwrap();

    assert_eq!(reloaded.children(&root), vec![child]);
    assert!(reloaded.node(&root).is_some());
}
