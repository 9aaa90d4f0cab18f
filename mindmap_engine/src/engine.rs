// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Operation API, drag protocol, selection state, and the settle/commit
//! pipeline (C6) — the embeddable `Engine` a host actually holds.
//!
//! `mindmap_core` has no notion of a "settled operation": it applies
//! mutations and tracks dirty state, nothing more. This module is where a
//! mutation becomes an operation — resolving overlaps for the sub-trees it
//! touched, advancing the revision counter, and emitting the typed events
//! a host observes (§4.6, §5). Reads (`node`, `children`, …) pass straight
//! through to the node store; there is nothing to settle for those.

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use hashbrown::HashSet;

use mindmap_core::bbox::Spacing;
use mindmap_core::error::{EngineError, Invariant, Result};
use mindmap_core::ids::NodeId;
use mindmap_core::lod::{self, LodConfig};
use mindmap_core::node::{NodeAttrs, NodeImport, NodePatch, NodeSnapshot};
use mindmap_core::overlap;
use mindmap_core::store::NodeStore;
use mindmap_core::Side;

use crate::document::{Document, DocumentEdge, DocumentMetadata, EdgeKind, LayoutSettings, OrientationMode};
use crate::events::{EventBus, EventEnvelope, EventKind, Source, SubscriptionId};
use crate::view_model::{BadgeRecord, VisibleEdge, VisibleNode, ViewModel};
use crate::viewport::Viewport;

/// Snapshot of an in-progress drag (§4.6). Only the dragged ids themselves
/// are kept — rigid sub-tree translation already preserves each dragged
/// node's descendants' relative offsets, so there is nothing else to
/// remember between `begin_drag` and `end_drag`.
#[derive(Clone, Debug)]
struct DragSession {
    dragged: Vec<NodeId>,
}

/// The embeddable mindmap layout engine (C5 + C6).
///
/// Owns one document's forest ([`NodeStore`]), its LOD configuration and
/// spacing, the viewport, selection state, and the event bus. A host
/// embedding multiple documents creates one `Engine` per document (§9:
/// "the engine is instantiable").
#[derive(Debug)]
pub struct Engine {
    store: NodeStore,
    spacing: Spacing,
    lod: LodConfig,
    viewport: Viewport,
    events: EventBus,
    revision: u64,
    selection: Vec<NodeId>,
    drag: Option<DragSession>,
    metadata: DocumentMetadata,
    active_view: String,
    orientation_mode: OrientationMode,
    reference_edges: Vec<DocumentEdge>,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            store: NodeStore::new(),
            spacing: Spacing::default(),
            lod: LodConfig::default(),
            viewport: Viewport::default(),
            events: EventBus::new(),
            revision: 0,
            selection: Vec::new(),
            drag: None,
            metadata: DocumentMetadata::default(),
            active_view: String::from("mindmap"),
            orientation_mode: OrientationMode::default(),
            reference_edges: Vec::new(),
        }
    }
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ---- document load / save (§6) ------------------------------------

    /// Replaces the forest with `doc`. Nodes may arrive in any order; a
    /// node whose parent has not yet been seen is retried on a later pass,
    /// so only a genuinely missing parent or a cycle among the saved nodes
    /// fails the load. On `Err`, the engine's existing state is untouched
    /// (the new forest is built up separately and only swapped in once
    /// every node has been placed).
    pub fn load_document(&mut self, doc: Document) -> Result<()> {
        let mut store = NodeStore::new();
        let mut pending = doc.nodes;
        while !pending.is_empty() {
            let mut next_pending = Vec::with_capacity(pending.len());
            let mut progressed = false;
            for node in pending {
                let ready = node.parent_id.as_ref().is_none_or(|pid| store.contains(pid));
                if ready {
                    store.import_node(node)?;
                    progressed = true;
                } else {
                    next_pending.push(node);
                }
            }
            if !progressed {
                let stuck = next_pending.into_iter().next().expect("pending is non-empty");
                return Err(EngineError::InvariantViolation {
                    invariant: Invariant::Acyclic,
                    node: Some(stuck.id),
                });
            }
            pending = next_pending;
        }

        let spacing = Spacing::new(doc.layout.horizontal_spacing, doc.layout.vertical_spacing);
        // §4.3: "the global pass ... used after large-scale import or view
        // switch". A saved document's positions are trusted as-is, but may
        // have been produced under a different spacing or by a host that
        // never ran the resolver; settle the whole forest once up front so
        // every invariant holds before the engine reports the load as done.
        let warnings = overlap::global_resolve(&mut store, spacing);

        self.store = store;
        self.spacing = spacing;
        self.lod = LodConfig {
            thresholds: doc.layout.lod_thresholds,
            step: lod::DEFAULT_STEP,
            enabled: doc.layout.lod_enabled,
        };
        self.active_view = doc.layout.active_view;
        self.orientation_mode = doc.layout.orientation_mode;
        self.metadata = doc.metadata;
        self.reference_edges = doc
            .edges
            .into_iter()
            .filter(|e| matches!(e.kind, EdgeKind::Reference))
            .collect();
        self.selection.clear();
        self.drag = None;
        self.revision = 0;
        self.viewport = Viewport::default();
        if !warnings.is_empty() {
            self.emit(Source::default(), EventKind::ConvergenceWarning(warnings));
        }
        Ok(())
    }

    /// Exports the current forest as a serialization-neutral [`Document`]
    /// (§6). Hierarchy edges are re-derived from `parent_id` rather than
    /// carried from the last load, per §6: they are maintained by the
    /// engine, not the host.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut nodes = Vec::new();
        for root in self.store.roots() {
            Self::export_subtree(&self.store, &root, &mut nodes);
        }
        Document {
            metadata: self.metadata.clone(),
            layout: LayoutSettings {
                active_view: self.active_view.clone(),
                orientation_mode: self.orientation_mode,
                lod_enabled: self.lod.enabled,
                lod_thresholds: self.lod.thresholds.clone(),
                horizontal_spacing: self.spacing.horizontal,
                vertical_spacing: self.spacing.vertical,
            },
            nodes,
            edges: self.export_edges(),
        }
    }

    fn export_subtree(store: &NodeStore, id: &NodeId, out: &mut Vec<NodeImport>) {
        let snap = store.node(id).expect("id from roots()/children() is always live");
        out.push(NodeImport {
            id: snap.id,
            parent_id: snap.parent_id,
            title: snap.title,
            content: snap.content,
            width: snap.width,
            height: snap.height,
            x: snap.x,
            y: snap.y,
            collapsed: snap.collapsed,
            collapsed_left: snap.collapsed_left,
            collapsed_right: snap.collapsed_right,
            side: snap.side,
            is_dirty: snap.is_dirty,
            last_calculated_zoom: snap.last_calculated_zoom,
            views: snap.views,
        });
        for child in store.children(id) {
            Self::export_subtree(store, &child, out);
        }
    }

    fn export_edges(&self) -> Vec<DocumentEdge> {
        let mut edges = Vec::new();
        for id in self.store.all_ids() {
            if let Some(parent_id) = self.store.node(&id).and_then(|s| s.parent_id) {
                edges.push(DocumentEdge {
                    id: format!("hierarchy:{parent_id}:{id}"),
                    from: parent_id,
                    to: id,
                    kind: EdgeKind::Hierarchy,
                });
            }
        }
        edges.extend(self.reference_edges.iter().cloned());
        edges
    }

    // ---- read-only forest access (§4.1, passthrough) -------------------

    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<NodeSnapshot> {
        self.store.node(id)
    }

    #[must_use]
    pub fn children(&self, id: &NodeId) -> Vec<NodeId> {
        self.store.children(id)
    }

    #[must_use]
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        self.store.descendants(id)
    }

    #[must_use]
    pub fn path_to_root(&self, id: &NodeId) -> Vec<NodeId> {
        self.store.path_to_root(id)
    }

    #[must_use]
    pub fn depth(&self, id: &NodeId) -> Option<usize> {
        self.store.depth(id)
    }

    #[must_use]
    pub fn root_of(&self, id: &NodeId) -> Option<NodeId> {
        self.store.root_of(id)
    }

    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        self.store.roots()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The outline view's `expanded` flag for `id` (§9). Defaults to `true`
    /// for a node that has never been collapsed in that view.
    #[must_use]
    pub fn outline_expanded(&self, id: &NodeId) -> bool {
        self.store.outline_expanded(id)
    }

    /// Sets the outline view's `expanded` flag for `id`. Purely
    /// presentational: it does not touch geometry, does not mark `id`
    /// dirty, and does not advance the revision or emit any event, since
    /// mindmap layout has no notion of outline expansion.
    pub fn set_outline_expanded(&mut self, id: &NodeId, expanded: bool) -> Result<()> {
        self.store.set_outline_expanded(id, expanded)
    }

    // ---- mutating operations (§4.1, §4.6) ------------------------------

    /// Inserts a node and settles the operation: resolves overlaps in the
    /// affected root, advances the revision, and emits `node-created` then
    /// `view-model-updated`.
    pub fn insert(&mut self, parent_id: Option<&NodeId>, attrs: NodeAttrs, source: impl Into<Source>) -> Result<NodeId> {
        let id = self.store.insert(parent_id, attrs)?;
        self.settle(source.into(), &[id.clone()], vec![EventKind::NodeCreated(id.clone())]);
        Ok(id)
    }

    pub fn update(&mut self, id: &NodeId, patch: NodePatch, source: impl Into<Source>) -> Result<()> {
        self.store.update(id, patch)?;
        self.settle(source.into(), &[id.clone()], vec![EventKind::NodeUpdated(id.clone())]);
        Ok(())
    }

    /// Reparents and/or renumbers `id`. Emits `node-reparented` if the
    /// parent actually changed, `siblings-reordered` if only `order` did.
    pub fn move_node(
        &mut self,
        id: &NodeId,
        new_parent_id: Option<&NodeId>,
        new_order: Option<u32>,
        source: impl Into<Source>,
    ) -> Result<()> {
        let old_parent = self.store.node(id).and_then(|s| s.parent_id);
        self.store.move_node(id, new_parent_id, new_order)?;

        let reparented = match (&old_parent, new_parent_id) {
            (Some(old), Some(new)) => old != new,
            (None, None) => false,
            _ => true,
        };
        let event = if reparented {
            EventKind::NodeReparented {
                id: id.clone(),
                old_parent: old_parent.clone(),
                new_parent: new_parent_id.cloned(),
            }
        } else {
            EventKind::SiblingsReordered { parent_id: new_parent_id.cloned() }
        };

        let mut dirty = vec![id.clone()];
        dirty.extend(old_parent);
        dirty.extend(new_parent_id.cloned());
        self.settle(source.into(), &dirty, vec![event]);
        Ok(())
    }

    /// Deletes `id`, cascading its sub-tree if `cascade`, otherwise
    /// reparenting its children (§4.1). Also drops `id` from the selection.
    pub fn delete(&mut self, id: &NodeId, cascade: bool, source: impl Into<Source>) -> Result<()> {
        let parent = self.store.node(id).and_then(|s| s.parent_id);
        self.store.delete(id, cascade)?;
        self.selection.retain(|sel| sel != id);
        let dirty: Vec<NodeId> = parent.into_iter().collect();
        self.settle(source.into(), &dirty, vec![EventKind::NodeDeleted(id.clone())]);
        Ok(())
    }

    pub fn reorder_siblings(
        &mut self,
        parent_id: Option<&NodeId>,
        mapping: &[(NodeId, u32)],
        source: impl Into<Source>,
    ) -> Result<()> {
        self.store.reorder_siblings(parent_id, mapping)?;
        let dirty: Vec<NodeId> = match parent_id {
            Some(p) => vec![p.clone()],
            None => mapping.iter().map(|(id, _)| id.clone()).collect(),
        };
        self.settle(
            source.into(),
            &dirty,
            vec![EventKind::SiblingsReordered { parent_id: parent_id.cloned() }],
        );
        Ok(())
    }

    // ---- drag protocol (§4.6) ------------------------------------------

    /// Snapshots `ids` as the active drag set. Descendants move along with
    /// their dragged ancestor automatically (rigid sub-tree translation),
    /// so nothing beyond the ids themselves needs to be remembered here.
    pub fn begin_drag(&mut self, ids: Vec<NodeId>) {
        self.drag = Some(DragSession { dragged: ids });
    }

    /// Applies a mid-drag delta to every dragged sub-tree. Does not run the
    /// resolver (§4.6: "updates positions in memory without re-running the
    /// resolver"); emits a low-rate `node-moved` cursor event per dragged
    /// node for UI feedback at the current (not yet advanced) revision.
    pub fn drag_to(&mut self, dx: f64, dy: f64, source: impl Into<Source>) {
        let Some(session) = self.drag.clone() else { return };
        let source = source.into();
        for id in &session.dragged {
            if self.store.translate_subtree(id, dx, dy).is_ok() {
                self.maybe_flip_side(id);
                self.emit(source.clone(), EventKind::NodeMoved(id.clone()));
            }
        }
    }

    /// When a dragged depth-1 child's center has crossed the root's
    /// centerline, mirrors its descendants about its own x and reassigns
    /// `side` (§4.6). Applying this twice about the same x is the
    /// identity, so a drag that crosses and re-crosses restores the
    /// original child layout exactly.
    fn maybe_flip_side(&mut self, id: &NodeId) {
        let Some(snap) = self.store.node(id) else { return };
        let Some(old_side) = snap.side else { return };
        let Some(parent_id) = snap.parent_id.clone() else { return };
        if self.store.depth(id) != Some(1) {
            return;
        }
        let Some(root) = self.store.node(&parent_id) else { return };

        let centerline = root.x + root.width / 2.0;
        let node_center = snap.x + snap.width / 2.0;
        let new_side = if node_center < centerline { Side::Left } else { Side::Right };
        if new_side == old_side {
            return;
        }

        let _ = self.store.mirror_descendants_x(id);
        let _ = self.store.update(id, NodePatch { side: Some(new_side), ..NodePatch::default() });
        self.emit(Source::default(), EventKind::NodeSideChanged { id: id.clone(), side: new_side });
    }

    /// Settles the drag: runs the incremental resolver over the dragged
    /// sub-trees' root(s), advances the revision, and emits `node-moved`
    /// per dragged node followed by `view-model-updated` (§4.6).
    pub fn end_drag(&mut self, source: impl Into<Source>) {
        let Some(session) = self.drag.take() else { return };
        let source = source.into();
        let events = session.dragged.iter().cloned().map(EventKind::NodeMoved).collect();
        self.settle(source, &session.dragged, events);
    }

    // ---- selection (§4.6) -----------------------------------------------

    /// Replaces the selection set. Does not mutate the forest; still
    /// advances the revision and emits `view-model-updated` so the caller's
    /// `selected` flags stay in sync with the revision they were rendered
    /// at (§5).
    pub fn select(&mut self, ids: Vec<NodeId>, source: impl Into<Source>) {
        let source = source.into();
        self.selection = ids.clone();
        self.revision += 1;
        let kind = match <[NodeId; 1]>::try_from(ids.clone()) {
            Ok([only]) => EventKind::NodeSelected(only),
            Err(_) => EventKind::NodesSelected(ids),
        };
        self.emit(source.clone(), kind);
        let vm = self.build_view_model();
        self.emit(source, EventKind::ViewModelUpdated(vm));
    }

    /// Switches the document's active view (§6: `active_view` is a plain
    /// layout-settings field, not a per-node attribute). Per-node `views`
    /// maps are untouched; only observers are told which view is current.
    pub fn set_active_view(&mut self, view: impl Into<String>, source: impl Into<Source>) {
        let source = source.into();
        let view = view.into();
        self.active_view = view.clone();
        self.revision += 1;
        self.emit(source.clone(), EventKind::ViewChanged { view });
        let vm = self.build_view_model();
        self.emit(source, EventKind::ViewModelUpdated(vm));
    }

    // ---- LOD / spacing configuration (§4.4, §4.2) ----------------------

    /// Applies at the next commit, per §4.6: reconfiguring thresholds
    /// mid-gesture does not itself trigger recomputation.
    pub fn set_lod_enabled(&mut self, enabled: bool) {
        self.lod.enabled = enabled;
    }

    pub fn set_lod_thresholds(&mut self, thresholds: Vec<f64>) {
        self.lod.thresholds = thresholds;
    }

    /// Appends one more threshold following the configured arithmetic step.
    pub fn add_lod_level(&mut self) {
        let target = self.lod.thresholds.len() + 1;
        self.lod.ensure_depth(target);
    }

    pub fn reset_lod_levels(&mut self) {
        self.lod = LodConfig { enabled: self.lod.enabled, ..LodConfig::default() };
    }

    /// Changes engine-wide padding. Every cached bounding rectangle is
    /// invalidated and a full global resolve runs immediately, since a
    /// spacing change can introduce overlaps (or remove the slack that
    /// hid one) across every root at once — unlike a single mutation, this
    /// is not confined to one sub-tree.
    pub fn set_layout_spacing(&mut self, horizontal: f64, vertical: f64, source: impl Into<Source>) {
        let source = source.into();
        self.spacing = Spacing::new(horizontal, vertical);
        self.store.mark_all_dirty();
        let warnings = overlap::global_resolve(&mut self.store, self.spacing);
        self.revision += 1;
        if !warnings.is_empty() {
            self.emit(source.clone(), EventKind::ConvergenceWarning(warnings));
        }
        let vm = self.build_view_model();
        self.emit(source, EventKind::ViewModelUpdated(vm));
    }

    // ---- viewport (C5, §4.5) -------------------------------------------

    /// Mid-gesture zoom delta. Constant time; never triggers recomputation.
    pub fn zoom_delta(&mut self, delta: f64) {
        let ceiling = self.lod.max_zoom();
        self.viewport.zoom_delta(delta, ceiling);
    }

    /// Mid-gesture pan delta. Constant time; never triggers recomputation.
    pub fn pan_delta(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_delta(dx, dy);
    }

    /// Zoom-end commit (§4.5): if the zoom moved by more than `ZOOM_EPSILON`
    /// since the last commit, marks newly-visible nodes dirty, runs the
    /// incremental resolver over them, and settles.
    pub fn commit_zoom(&mut self, source: impl Into<Source>) {
        if !self.viewport.zoom_moved() {
            return;
        }
        let source = source.into();
        let zoom_pct = self.viewport.zoom * 100.0;
        let result = lod::compute(&mut self.store, self.spacing, &mut self.lod, zoom_pct);

        let mut touched = Vec::new();
        for id in &result.visible {
            if let Some(snap) = self.store.node(id) {
                if (snap.last_calculated_zoom - zoom_pct).abs() > f64::EPSILON {
                    let _ = self.store.touch_zoom(id, zoom_pct);
                    touched.push(id.clone());
                }
            }
        }
        self.viewport.last_commit_zoom = self.viewport.zoom;

        let warnings = overlap::incremental_resolve(&mut self.store, &touched, self.spacing);
        self.revision += 1;
        if !warnings.is_empty() {
            self.emit(source.clone(), EventKind::ConvergenceWarning(warnings));
        }
        let vm = self.build_view_model();
        self.emit(source, EventKind::ViewModelUpdated(vm));
    }

    /// Pan-end commit (§4.5): no re-layout, just a fresh view-model
    /// emission so observers see the panned viewport's revision.
    pub fn commit_pan(&mut self, source: impl Into<Source>) {
        let source = source.into();
        self.revision += 1;
        let vm = self.build_view_model();
        self.emit(source, EventKind::ViewModelUpdated(vm));
    }

    // ---- view model (§6) ------------------------------------------------

    /// Builds the current view model without advancing the revision or
    /// emitting events — a pure snapshot read (§8: "no events emitted on
    /// `get_view_model`").
    pub fn get_view_model(&mut self) -> ViewModel {
        self.build_view_model()
    }

    fn build_view_model(&mut self) -> ViewModel {
        let zoom_pct = self.viewport.zoom * 100.0;
        let result = lod::compute(&mut self.store, self.spacing, &mut self.lod, zoom_pct);

        let mut nodes = Vec::with_capacity(result.visible.len());
        for id in &result.visible {
            let Some(snap) = self.store.node(id) else { continue };
            nodes.push(VisibleNode {
                id: id.clone(),
                x: snap.x,
                y: snap.y,
                width: snap.width,
                height: snap.height,
                depth: self.store.depth(id).unwrap_or(0),
                side: snap.side,
                collapsed: snap.collapsed,
                collapsed_left: snap.collapsed_left,
                collapsed_right: snap.collapsed_right,
                selected: self.selection.contains(id),
            });
        }

        let badges = result
            .badges
            .into_iter()
            .map(|b| BadgeRecord {
                id: b.id,
                parent_id: b.parent_id,
                side: b.side,
                x: b.rect.x0,
                y: b.rect.y0,
                width: b.rect.width(),
                height: b.rect.height(),
                count: b.hidden_count,
            })
            .collect();

        let visible_ids: HashSet<NodeId> = result.visible.iter().cloned().collect();
        let mut edges = Vec::new();
        for id in &result.visible {
            if let Some(parent_id) = self.store.node(id).and_then(|s| s.parent_id) {
                if visible_ids.contains(&parent_id) {
                    edges.push(VisibleEdge {
                        id: format!("hierarchy:{parent_id}:{id}"),
                        from: parent_id,
                        to: id.clone(),
                        kind: EdgeKind::Hierarchy,
                    });
                }
            }
        }
        for e in &self.reference_edges {
            if visible_ids.contains(&e.from) && visible_ids.contains(&e.to) {
                edges.push(VisibleEdge { id: e.id.clone(), from: e.from.clone(), to: e.to.clone(), kind: EdgeKind::Reference });
            }
        }

        ViewModel { nodes, badges, edges, revision: self.revision, max_zoom: self.lod.max_zoom() }
    }

    // ---- events ----------------------------------------------------------

    pub fn subscribe(&mut self, observer: impl FnMut(&EventEnvelope) + 'static) -> SubscriptionId {
        self.events.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.events.unsubscribe(id);
    }

    fn emit(&mut self, source: Source, kind: EventKind) {
        self.events.emit(EventEnvelope { revision: self.revision, source, kind });
    }

    /// Runs the incremental resolver over the roots reachable from `dirty`,
    /// advances the revision, emits `primary` events, a `convergence-
    /// warning` if the resolver hit its iteration cap, and finally
    /// `view-model-updated` — the common tail of every settled operation
    /// (§4.3, §4.6, §5).
    fn settle(&mut self, source: Source, dirty: &[NodeId], primary: Vec<EventKind>) {
        let warnings = overlap::incremental_resolve(&mut self.store, dirty, self.spacing);
        self.revision += 1;
        for kind in primary {
            self.emit(source.clone(), kind);
        }
        if !warnings.is_empty() {
            self.emit(source.clone(), EventKind::ConvergenceWarning(warnings));
        }
        let vm = self.build_view_model();
        self.emit(source, EventKind::ViewModelUpdated(vm));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mindmap_core::node::NodeAttrs;

    fn sized(w: f64, h: f64) -> NodeAttrs {
        NodeAttrs { width: w, height: h, ..NodeAttrs::default() }
    }

    fn collect_kinds(engine: &mut Engine) -> alloc::rc::Rc<core::cell::RefCell<Vec<EventKind>>> {
        let log = alloc::rc::Rc::new(core::cell::RefCell::new(Vec::new()));
        let l = log.clone();
        engine.subscribe(move |env| l.borrow_mut().push(env.kind.clone()));
        log
    }

    #[test]
    fn insert_settles_and_emits_created_then_view_model() {
        let mut engine = Engine::new();
        let log = collect_kinds(&mut engine);
        let id = engine.insert(None, NodeAttrs::default(), "test").unwrap();
        assert_eq!(engine.revision(), 1);
        let events = log.borrow();
        assert!(matches!(events[0], EventKind::NodeCreated(ref created) if *created == id));
        assert!(matches!(events.last().unwrap(), EventKind::ViewModelUpdated(_)));
    }

    #[test]
    fn s2_cycle_move_leaves_revision_and_store_untouched() {
        let mut engine = Engine::new();
        let a = engine.insert(None, NodeAttrs::default(), "t").unwrap();
        let b = engine.insert(Some(&a), NodeAttrs::default(), "t").unwrap();
        let c = engine.insert(Some(&b), NodeAttrs::default(), "t").unwrap();
        let revision_before = engine.revision();
        let log = collect_kinds(&mut engine);

        let err = engine.move_node(&a, Some(&c), None, "t").unwrap_err();
        assert!(matches!(err, EngineError::CycleDetected { .. }));
        assert_eq!(engine.revision(), revision_before);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn revision_strictly_increases_across_commits() {
        let mut engine = Engine::new();
        let mut last = engine.revision();
        for _ in 0..5 {
            let _ = engine.insert(None, NodeAttrs::default(), "t").unwrap();
            assert!(engine.revision() > last);
            last = engine.revision();
        }
    }

    #[test]
    fn s3_drag_across_centerline_mirrors_side_and_children() {
        let mut engine = Engine::new();
        let root = engine.insert(None, sized(100.0, 50.0), "t").unwrap();
        let _ = engine.store.set_position(&root, 0.0, 0.0);

        let child = engine
            .insert(
                Some(&root),
                NodeAttrs { width: 100.0, height: 20.0, side: Some(Side::Left), ..NodeAttrs::default() },
                "t",
            )
            .unwrap();
        let _ = engine.store.set_position(&child, -200.0, 0.0);
        let grandchild = engine.insert(Some(&child), sized(20.0, 20.0), "t").unwrap();
        let _ = engine.store.set_position(&grandchild, -120.0, 30.0);

        engine.begin_drag(vec![child.clone()]);
        engine.drag_to(500.0, 0.0, "t");
        engine.end_drag("t");

        let child_snap = engine.node(&child).unwrap();
        assert_eq!(child_snap.side, Some(Side::Right));
        let grandchild_snap = engine.node(&grandchild).unwrap();
        // grandchild started 80 units to the right of child's local x; mirroring
        // about that x flips the offset to 80 units to the left.
        assert!((grandchild_snap.x - (child_snap.x - 80.0)).abs() < 1e-9);
    }

    #[test]
    fn zero_net_drag_restores_original_position() {
        let mut engine = Engine::new();
        let root = engine.insert(None, sized(100.0, 50.0), "t").unwrap();
        let child = engine.insert(Some(&root), sized(30.0, 30.0), "t").unwrap();
        let before = engine.node(&child).unwrap();

        engine.begin_drag(vec![child.clone()]);
        engine.drag_to(40.0, -15.0, "t");
        engine.drag_to(-40.0, 15.0, "t");
        engine.end_drag("t");

        let after = engine.node(&child).unwrap();
        assert_eq!(before.x, after.x);
        assert_eq!(before.y, after.y);
    }

    #[test]
    fn s4_incremental_settle_does_not_touch_other_root() {
        let mut engine = Engine::new();
        let r1 = engine.insert(None, sized(10.0, 10.0), "t").unwrap();
        let r2 = engine.insert(None, sized(10.0, 10.0), "t").unwrap();
        let c2 = engine.insert(Some(&r2), sized(20.0, 20.0), "t").unwrap();
        let before = engine.node(&c2).unwrap();

        let _ = engine.insert(Some(&r1), sized(20.0, 20.0), "t").unwrap();

        let after = engine.node(&c2).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn select_emits_single_vs_multi_event_kinds() {
        let mut engine = Engine::new();
        let a = engine.insert(None, NodeAttrs::default(), "t").unwrap();
        let b = engine.insert(None, NodeAttrs::default(), "t").unwrap();

        let log = collect_kinds(&mut engine);
        engine.select(vec![a.clone()], "t");
        assert!(matches!(log.borrow()[0], EventKind::NodeSelected(ref id) if *id == a));

        let log2 = collect_kinds(&mut engine);
        engine.select(vec![a.clone(), b.clone()], "t");
        assert!(matches!(log2.borrow()[0], EventKind::NodesSelected(_)));

        let vm = engine.get_view_model();
        let a_vm = vm.nodes.iter().find(|n| n.id == a).unwrap();
        assert!(a_vm.selected);
    }

    #[test]
    fn empty_forest_view_model_is_empty_and_read_only() {
        let mut engine = Engine::new();
        let revision_before = engine.revision();
        let vm = engine.get_view_model();
        assert!(vm.nodes.is_empty());
        assert!(vm.badges.is_empty());
        assert_eq!(engine.revision(), revision_before);
    }

    #[test]
    fn document_round_trips_through_load_and_save() {
        let mut engine = Engine::new();
        let root = engine.insert(None, sized(120.0, 40.0), "t").unwrap();
        let _ = engine.insert(Some(&root), sized(60.0, 20.0), "t").unwrap();
        let doc = engine.to_document();

        let mut reloaded = Engine::new();
        reloaded.load_document(doc.clone()).unwrap();
        let doc2 = reloaded.to_document();
        assert_eq!(doc.nodes.len(), doc2.nodes.len());
        assert_eq!(doc.layout, doc2.layout);
    }

    #[test]
    fn load_document_resolves_overlaps_left_in_the_saved_positions() {
        let mut engine = Engine::new();
        let doc = Document {
            nodes: alloc::vec![
                NodeImport {
                    id: NodeId::from("p"),
                    parent_id: None,
                    title: String::new(),
                    content: String::new(),
                    width: 10.0,
                    height: 10.0,
                    x: 0.0,
                    y: 0.0,
                    collapsed: false,
                    collapsed_left: false,
                    collapsed_right: false,
                    side: None,
                    is_dirty: false,
                    last_calculated_zoom: 0.0,
                    views: alloc::collections::BTreeMap::new(),
                },
                NodeImport {
                    id: NodeId::from("c0"),
                    parent_id: Some(NodeId::from("p")),
                    title: String::new(),
                    content: String::new(),
                    width: 20.0,
                    height: 20.0,
                    x: 0.0,
                    y: 0.0,
                    collapsed: false,
                    collapsed_left: false,
                    collapsed_right: false,
                    side: None,
                    is_dirty: false,
                    last_calculated_zoom: 0.0,
                    views: alloc::collections::BTreeMap::new(),
                },
                NodeImport {
                    id: NodeId::from("c1"),
                    parent_id: Some(NodeId::from("p")),
                    title: String::new(),
                    content: String::new(),
                    width: 20.0,
                    height: 20.0,
                    // Deliberately overlapping c0 by 10 units, as a host that
                    // never ran the resolver before saving might produce.
                    x: 0.0,
                    y: 10.0,
                    collapsed: false,
                    collapsed_left: false,
                    collapsed_right: false,
                    side: None,
                    is_dirty: false,
                    last_calculated_zoom: 0.0,
                    views: alloc::collections::BTreeMap::new(),
                },
            ],
            ..Document::default()
        };

        engine.load_document(doc).unwrap();
        let c0 = engine.node(&NodeId::from("c0")).unwrap();
        let c1 = engine.node(&NodeId::from("c1")).unwrap();
        assert!((c1.y - c0.y).abs() >= 20.0, "siblings must no longer overlap after load");
    }

    #[test]
    fn load_document_with_missing_parent_is_rejected() {
        let mut engine = Engine::new();
        let doc = Document {
            nodes: vec![NodeImport {
                id: NodeId::from("orphan"),
                parent_id: Some(NodeId::from("missing")),
                title: String::new(),
                content: String::new(),
                width: 150.0,
                height: 50.0,
                x: 0.0,
                y: 0.0,
                collapsed: false,
                collapsed_left: false,
                collapsed_right: false,
                side: None,
                is_dirty: false,
                last_calculated_zoom: 0.0,
                views: alloc::collections::BTreeMap::new(),
            }],
            ..Document::default()
        };
        assert!(engine.load_document(doc).is_err());
    }

    #[test]
    fn commit_zoom_below_epsilon_does_not_advance_revision() {
        let mut engine = Engine::new();
        let before = engine.revision();
        engine.zoom_delta(0.001);
        engine.commit_zoom("test");
        assert_eq!(engine.revision(), before);
    }

    #[test]
    fn commit_zoom_past_epsilon_advances_revision_and_emits_view_model() {
        let mut engine = Engine::new();
        let _ = engine.insert(None, NodeAttrs::default(), "t").unwrap();
        let log = collect_kinds(&mut engine);
        engine.zoom_delta(1.0);
        engine.commit_zoom("test");
        assert!(log.borrow().iter().any(|k| matches!(k, EventKind::ViewModelUpdated(_))));
    }

    #[test]
    fn delete_removes_from_selection() {
        let mut engine = Engine::new();
        let a = engine.insert(None, NodeAttrs::default(), "t").unwrap();
        engine.select(vec![a.clone()], "t");
        engine.delete(&a, true, "t").unwrap();
        assert!(engine.selection().is_empty());
    }

    #[test]
    fn outline_expanded_toggle_does_not_advance_revision() {
        let mut engine = Engine::new();
        let a = engine.insert(None, NodeAttrs::default(), "t").unwrap();
        assert!(engine.outline_expanded(&a));
        let before = engine.revision();
        engine.set_outline_expanded(&a, false).unwrap();
        assert!(!engine.outline_expanded(&a));
        assert_eq!(engine.revision(), before);
    }
}
