// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node Store (C1): the authoritative forest.
//!
//! Internally a generational slot array, the same shape this corpus's
//! box-tree uses for O(1) liveness checks and safe slot reuse after delete —
//! a freed-and-reallocated slot carries a bumped generation, so a stale
//! internal reference (e.g. sitting in a drag snapshot) can never silently
//! resolve to the wrong node. The *public* identifier remains a plain
//! string handle ([`NodeId`]); generations never leak past this module.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;
use kurbo::Rect;

use crate::error::{EngineError, Invariant, Result};
use crate::flags::{NodeState, Side};
use crate::ids::{NodeId, Slot};
use crate::node::{NodeAttrs, NodeImport, NodePatch, NodeSnapshot};
use crate::value::ViewValue;

#[derive(Clone, Debug)]
pub(crate) struct NodeRecord {
    id: NodeId,
    parent: Option<Slot>,
    children: Vec<Slot>,
    order: u32,
    title: String,
    content: String,
    width: f64,
    height: f64,
    side: Option<Side>,
    views: BTreeMap<String, ViewValue>,
    x: f64,
    y: f64,
    state: NodeState,
    last_calculated_zoom: f64,
    bbox_cache: Option<Rect>,
}

/// The forest of nodes (C1).
#[derive(Debug)]
pub struct NodeStore {
    slots: Vec<Option<NodeRecord>>,
    generations: Vec<u32>,
    free_list: Vec<u32>,
    by_id: HashMap<NodeId, Slot>,
    roots: Vec<Slot>,
    next_seq: u64,
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            by_id: HashMap::new(),
            roots: Vec::new(),
            next_seq: 0,
        }
    }

    fn alloc_slot(&mut self) -> Slot {
        if let Some(idx) = self.free_list.pop() {
            let gen = self.generations[idx as usize];
            Slot(idx, gen)
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(None);
            self.generations.push(0);
            Slot(idx, 0)
        }
    }

    fn record(&self, slot: Slot) -> Option<&NodeRecord> {
        if self.generations.get(slot.idx())? != &slot.1 {
            return None;
        }
        self.slots[slot.idx()].as_ref()
    }

    fn record_mut(&mut self, slot: Slot) -> Option<&mut NodeRecord> {
        if self.generations.get(slot.idx())? != &slot.1 {
            return None;
        }
        self.slots[slot.idx()].as_mut()
    }

    pub(crate) fn slot_of(&self, id: &NodeId) -> Option<Slot> {
        self.by_id.get(id.as_str()).copied()
    }

    fn require_slot(&self, id: &NodeId) -> Result<Slot> {
        self.slot_of(id)
            .ok_or_else(|| EngineError::NodeNotFound(id.clone()))
    }

    /// Whether `id` currently names a live node.
    #[must_use]
    pub fn contains(&self, id: &NodeId) -> bool {
        self.slot_of(id).is_some()
    }

    // ---- mutation ---------------------------------------------------

    /// Inserts a fresh node at the end of `parent_id`'s sibling list.
    ///
    /// Fails with `ParentNotFound` if `parent_id` is given but unknown. The
    /// new node and its new parent (if any) and all of the parent's
    /// ancestors are marked dirty.
    pub fn insert(&mut self, parent_id: Option<&NodeId>, attrs: NodeAttrs) -> Result<NodeId> {
        let parent_slot = match parent_id {
            Some(pid) => Some(
                self.slot_of(pid)
                    .ok_or_else(|| EngineError::ParentNotFound(pid.clone()))?,
            ),
            None => None,
        };

        let order = match parent_slot {
            Some(p) => self.record(p).map_or(0, |r| r.children.len() as u32),
            None => self.roots.len() as u32,
        };

        let id = NodeId::from_raw(alloc::format!("n{}", self.next_seq));
        self.next_seq += 1;

        let slot = self.alloc_slot();
        let record = NodeRecord {
            id: id.clone(),
            parent: parent_slot,
            children: Vec::new(),
            order,
            title: attrs.title,
            content: attrs.content,
            width: attrs.width,
            height: attrs.height,
            side: attrs.side,
            views: attrs.views,
            x: 0.0,
            y: 0.0,
            state: NodeState::default(),
            last_calculated_zoom: 0.0,
            bbox_cache: None,
        };
        self.slots[slot.idx()] = Some(record);
        self.by_id.insert(id.clone(), slot);

        match parent_slot {
            Some(p) => {
                if let Some(rec) = self.record_mut(p) {
                    rec.children.push(slot);
                }
                self.invalidate_ancestors(p);
            }
            None => self.roots.push(slot),
        }

        Ok(id)
    }

    /// Reconstructs a single node from a saved document (§6), preserving
    /// its id, position, and dirty/zoom bookkeeping exactly rather than
    /// re-deriving them. Callers must import a parent before any of its
    /// children (e.g. a root-first breadth-first order over the saved
    /// node list) so `node.parent_id` already resolves.
    ///
    /// Fails with `ParentNotFound` if `node.parent_id` is given but not
    /// yet imported.
    pub fn import_node(&mut self, node: NodeImport) -> Result<()> {
        let parent_slot = match &node.parent_id {
            Some(pid) => Some(
                self.slot_of(pid)
                    .ok_or_else(|| EngineError::ParentNotFound(pid.clone()))?,
            ),
            None => None,
        };
        let order = match parent_slot {
            Some(p) => self.record(p).map_or(0, |r| r.children.len() as u32),
            None => self.roots.len() as u32,
        };

        let mut state = NodeState::empty();
        state.set(NodeState::POS_DIRTY, node.is_dirty);
        state.set(NodeState::BBOX_DIRTY, node.is_dirty);
        state.set(NodeState::COLLAPSED, node.collapsed);
        state.set(NodeState::COLLAPSED_LEFT, node.collapsed_left);
        state.set(NodeState::COLLAPSED_RIGHT, node.collapsed_right);

        let slot = self.alloc_slot();
        let record = NodeRecord {
            id: node.id.clone(),
            parent: parent_slot,
            children: Vec::new(),
            order,
            title: node.title,
            content: node.content,
            width: node.width,
            height: node.height,
            side: node.side,
            views: node.views,
            x: node.x,
            y: node.y,
            state,
            last_calculated_zoom: node.last_calculated_zoom,
            bbox_cache: None,
        };
        self.slots[slot.idx()] = Some(record);
        self.by_id.insert(node.id.clone(), slot);

        match parent_slot {
            Some(p) => {
                if let Some(rec) = self.record_mut(p) {
                    rec.children.push(slot);
                }
            }
            None => self.roots.push(slot),
        }

        // Keep auto-minted ids from ever colliding with an imported one.
        if let Some(n) = node.id.as_str().strip_prefix('n') {
            if let Ok(num) = n.parse::<u64>() {
                self.next_seq = self.next_seq.max(num + 1);
            }
        }

        Ok(())
    }

    /// Applies a partial update; marks the node dirty if geometry changed.
    pub fn update(&mut self, id: &NodeId, patch: NodePatch) -> Result<()> {
        let slot = self.require_slot(id)?;
        let dirty = patch.touches_geometry();
        let parent = {
            let rec = self.record_mut(slot).expect("slot resolved above");
            if let Some(title) = patch.title {
                rec.title = title;
            }
            if let Some(content) = patch.content {
                rec.content = content;
            }
            if let Some(width) = patch.width {
                rec.width = width;
            }
            if let Some(height) = patch.height {
                rec.height = height;
            }
            if let Some(collapsed) = patch.collapsed {
                rec.state.set(NodeState::COLLAPSED, collapsed);
            }
            if let Some(collapsed_left) = patch.collapsed_left {
                rec.state.set(NodeState::COLLAPSED_LEFT, collapsed_left);
            }
            if let Some(collapsed_right) = patch.collapsed_right {
                rec.state.set(NodeState::COLLAPSED_RIGHT, collapsed_right);
            }
            if let Some(side) = patch.side {
                rec.side = Some(side);
            }
            if let Some((view, value)) = patch.view {
                rec.views.insert(view, value);
            }
            rec.parent
        };
        if dirty {
            self.mark_node_dirty(slot);
            if let Some(p) = parent {
                self.invalidate_ancestors(p);
            }
        }
        Ok(())
    }

    /// Reparents and/or renumbers a node. Fails with `CycleDetected` if
    /// `new_parent_id` is `id` itself or a descendant of `id`.
    pub fn move_node(
        &mut self,
        id: &NodeId,
        new_parent_id: Option<&NodeId>,
        new_order: Option<u32>,
    ) -> Result<()> {
        let slot = self.require_slot(id)?;
        let new_parent_slot = match new_parent_id {
            Some(pid) => Some(
                self.slot_of(pid)
                    .ok_or_else(|| EngineError::ParentNotFound(pid.clone()))?,
            ),
            None => None,
        };

        if let Some(p) = new_parent_slot {
            if p == slot || self.is_descendant(slot, p) {
                return Err(EngineError::CycleDetected {
                    id: id.clone(),
                    new_parent: new_parent_id
                        .cloned()
                        .expect("new_parent_slot implies new_parent_id"),
                });
            }
        }

        let old_parent = self.record(slot).and_then(|r| r.parent);
        self.unlink(slot, old_parent);

        let target_len = match new_parent_slot {
            Some(p) => self.record(p).map_or(0, |r| r.children.len()),
            None => self.roots.len(),
        };
        let at = new_order.map_or(target_len, |o| (o as usize).min(target_len));
        match new_parent_slot {
            Some(p) => {
                if let Some(rec) = self.record_mut(p) {
                    rec.children.insert(at, slot);
                }
            }
            None => self.roots.insert(at, slot),
        }
        self.renumber(new_parent_slot);
        if let Some(rec) = self.record_mut(slot) {
            rec.parent = new_parent_slot;
        }

        self.mark_node_dirty(slot);
        if let Some(p) = old_parent {
            self.invalidate_ancestors(p);
        }
        if let Some(p) = new_parent_slot {
            self.invalidate_ancestors(p);
        }

        Ok(())
    }

    /// Removes `id`. If `cascade`, the whole sub-tree is removed; otherwise
    /// `id`'s children are reparented to `id`'s parent, preserving their
    /// relative order at `id`'s former position.
    pub fn delete(&mut self, id: &NodeId, cascade: bool) -> Result<()> {
        let slot = self.require_slot(id)?;
        let parent = self.record(slot).and_then(|r| r.parent);

        if cascade {
            let doomed = self.subtree_slots(slot);
            self.unlink(slot, parent);
            for s in doomed {
                self.free_slot(s);
            }
        } else {
            let children = self.record(slot).map(|r| r.children.clone()).unwrap_or_default();
            let pos = self.position_in_parent(slot, parent);
            self.unlink(slot, parent);
            for (offset, child) in children.iter().enumerate() {
                if let Some(rec) = self.record_mut(*child) {
                    rec.parent = parent;
                }
                match parent {
                    Some(p) => {
                        if let Some(rec) = self.record_mut(p) {
                            rec.children.insert(pos + offset, *child);
                        }
                    }
                    None => self.roots.insert(pos + offset, *child),
                }
            }
            self.renumber(parent);
            self.free_slot(slot);
        }

        if let Some(p) = parent {
            self.invalidate_ancestors(p);
        }
        Ok(())
    }

    /// Atomically reassigns `order` for a set of siblings sharing
    /// `parent_id`. `mapping` must be a permutation of `0..m-1` (`m =
    /// mapping.len()`) over `m` of that parent's existing children — a
    /// contiguous prefix of the sibling list when `m` is less than the full
    /// sibling count. The `m` mapped children are placed first, in the
    /// order `mapping` assigns them; every other sibling keeps its existing
    /// relative order and is appended after them. Otherwise an
    /// `InvariantViolation` (`ContiguousOrder`) is returned and nothing is
    /// changed.
    pub fn reorder_siblings(
        &mut self,
        parent_id: Option<&NodeId>,
        mapping: &[(NodeId, u32)],
    ) -> Result<()> {
        let parent_slot = match parent_id {
            Some(pid) => Some(
                self.slot_of(pid)
                    .ok_or_else(|| EngineError::ParentNotFound(pid.clone()))?,
            ),
            None => None,
        };
        let siblings = match parent_slot {
            Some(p) => self.record(p).map(|r| r.children.clone()).unwrap_or_default(),
            None => self.roots.clone(),
        };

        let prefix_len = mapping.len();
        if prefix_len > siblings.len() {
            return Err(EngineError::InvariantViolation {
                invariant: Invariant::ContiguousOrder,
                node: parent_id.cloned(),
            });
        }
        let mut prefix: Vec<Option<Slot>> = alloc::vec![None; prefix_len];
        let mut mapped: Vec<Slot> = Vec::with_capacity(prefix_len);
        for (child_id, order) in mapping {
            let slot = self
                .slot_of(child_id)
                .ok_or_else(|| EngineError::NodeNotFound(child_id.clone()))?;
            if !siblings.contains(&slot) || mapped.contains(&slot) {
                return Err(EngineError::InvariantViolation {
                    invariant: Invariant::ContiguousOrder,
                    node: Some(child_id.clone()),
                });
            }
            let idx = *order as usize;
            if idx >= prefix_len || prefix[idx].is_some() {
                return Err(EngineError::InvariantViolation {
                    invariant: Invariant::ContiguousOrder,
                    node: Some(child_id.clone()),
                });
            }
            prefix[idx] = Some(slot);
            mapped.push(slot);
        }

        // `prefix_len` distinct slots were assigned `prefix_len` distinct
        // indices in `0..prefix_len`, so by pigeonhole every slot in
        // `prefix` is filled.
        let mut ordered: Vec<Slot> = prefix
            .into_iter()
            .map(|s| s.expect("mapping validated as a full permutation of 0..prefix_len"))
            .collect();
        for &slot in &siblings {
            if !mapped.contains(&slot) {
                ordered.push(slot);
            }
        }

        match parent_slot {
            Some(p) => {
                if let Some(rec) = self.record_mut(p) {
                    rec.children = ordered;
                }
            }
            None => self.roots = ordered,
        }
        self.renumber(parent_slot);
        if let Some(p) = parent_slot {
            self.invalidate_ancestors(p);
            self.mark_node_dirty(p);
        }
        Ok(())
    }

    // ---- internal tree surgery ---------------------------------------

    fn unlink(&mut self, slot: Slot, parent: Option<Slot>) {
        match parent {
            Some(p) => {
                if let Some(rec) = self.record_mut(p) {
                    rec.children.retain(|s| *s != slot);
                }
            }
            None => self.roots.retain(|s| *s != slot),
        }
        self.renumber(parent);
    }

    fn position_in_parent(&self, slot: Slot, parent: Option<Slot>) -> usize {
        let siblings = match parent {
            Some(p) => self.record(p).map(|r| r.children.as_slice()).unwrap_or(&[]),
            None => self.roots.as_slice(),
        };
        siblings.iter().position(|s| *s == slot).unwrap_or(siblings.len())
    }

    fn renumber(&mut self, parent: Option<Slot>) {
        let siblings = match parent {
            Some(p) => self.record(p).map(|r| r.children.clone()).unwrap_or_default(),
            None => self.roots.clone(),
        };
        for (order, slot) in siblings.into_iter().enumerate() {
            if let Some(rec) = self.record_mut(slot) {
                rec.order = order as u32;
            }
        }
    }

    pub(crate) fn subtree_slots(&self, root: Slot) -> Vec<Slot> {
        let mut out = Vec::new();
        let mut stack = alloc::vec![root];
        while let Some(s) = stack.pop() {
            out.push(s);
            if let Some(rec) = self.record(s) {
                stack.extend(rec.children.iter().copied());
            }
        }
        out
    }

    fn is_descendant(&self, ancestor: Slot, candidate: Slot) -> bool {
        let mut stack = self.record(ancestor).map(|r| r.children.clone()).unwrap_or_default();
        while let Some(s) = stack.pop() {
            if s == candidate {
                return true;
            }
            if let Some(rec) = self.record(s) {
                stack.extend(rec.children.iter().copied());
            }
        }
        false
    }

    fn free_slot(&mut self, slot: Slot) {
        if let Some(rec) = self.slots[slot.idx()].take() {
            self.by_id.remove(rec.id.as_str());
        }
        self.generations[slot.idx()] = self.generations[slot.idx()].wrapping_add(1);
        self.free_list.push(slot.0);
    }

    // ---- dirty / bbox bookkeeping (used by `bbox` and `overlap`) -----

    pub(crate) fn mark_node_dirty(&mut self, slot: Slot) {
        if let Some(rec) = self.record_mut(slot) {
            rec.state.insert(NodeState::POS_DIRTY | NodeState::BBOX_DIRTY);
        }
    }

    /// Propagates bbox-cache invalidation up the ancestor chain, stopping
    /// as soon as an already-dirty ancestor is reached (it has already
    /// propagated past this point).
    pub(crate) fn invalidate_ancestors(&mut self, start: Slot) {
        let mut cur = Some(start);
        while let Some(slot) = cur {
            let Some(rec) = self.record_mut(slot) else { break };
            if rec.state.contains(NodeState::BBOX_DIRTY) {
                break;
            }
            rec.state.insert(NodeState::BBOX_DIRTY);
            cur = rec.parent;
        }
    }

    pub(crate) fn bbox_dirty(&self, slot: Slot) -> bool {
        self.record(slot).is_some_and(|r| r.state.contains(NodeState::BBOX_DIRTY))
    }

    pub(crate) fn clear_bbox_dirty(&mut self, slot: Slot) {
        if let Some(rec) = self.record_mut(slot) {
            rec.state.remove(NodeState::BBOX_DIRTY);
        }
    }

    pub(crate) fn cached_bbox(&self, slot: Slot) -> Option<Rect> {
        self.record(slot).and_then(|r| r.bbox_cache)
    }

    pub(crate) fn set_cached_bbox(&mut self, slot: Slot, rect: Rect) {
        if let Some(rec) = self.record_mut(slot) {
            rec.bbox_cache = Some(rect);
        }
    }

    pub(crate) fn node_rect(&self, slot: Slot) -> Rect {
        self.record(slot)
            .map(|r| Rect::new(r.x, r.y, r.x + r.width, r.y + r.height))
            .unwrap_or_default()
    }

    pub(crate) fn is_collapsed_slot(&self, slot: Slot) -> bool {
        self.record(slot).is_some_and(|r| r.state.contains(NodeState::COLLAPSED))
    }

    pub(crate) fn side_slot(&self, slot: Slot) -> Option<Side> {
        self.record(slot).and_then(|r| r.side)
    }

    pub(crate) fn parent_slot(&self, slot: Slot) -> Option<Slot> {
        self.record(slot).and_then(|r| r.parent)
    }

    pub(crate) fn children_slots(&self, slot: Slot) -> Vec<Slot> {
        self.record(slot).map(|r| r.children.clone()).unwrap_or_default()
    }

    pub(crate) fn root_slots(&self) -> Vec<Slot> {
        self.roots.clone()
    }

    pub(crate) fn id_of(&self, slot: Slot) -> Option<NodeId> {
        self.record(slot).map(|r| r.id.clone())
    }

    pub(crate) fn position_slot(&self, slot: Slot) -> (f64, f64) {
        self.record(slot).map_or((0.0, 0.0), |r| (r.x, r.y))
    }

    pub(crate) fn set_position_slot(&mut self, slot: Slot, x: f64, y: f64) {
        if let Some(rec) = self.record_mut(slot) {
            rec.x = x;
            rec.y = y;
        }
    }

    /// Translates a node and its whole (non-collapsed-filtered) sub-tree by
    /// `(dx, dy)`.
    ///
    /// Every cached bbox within the sub-tree is shifted by the same
    /// `(dx, dy)` rather than invalidated: a rigid translation does not
    /// change any sub-tree's shape, only its absolute position, so the
    /// cached rectangles remain valid without a recompute. The caller is
    /// still responsible for invalidating ancestors above `root` itself,
    /// since `root`'s bounding rectangle now sits at a new place within its
    /// parent.
    pub(crate) fn translate_subtree_slot(&mut self, root: Slot, dx: f64, dy: f64) {
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        for s in self.subtree_slots(root) {
            if let Some(rec) = self.record_mut(s) {
                rec.x += dx;
                rec.y += dy;
                if let Some(bbox) = rec.bbox_cache {
                    rec.bbox_cache = Some(Rect::new(
                        bbox.x0 + dx,
                        bbox.y0 + dy,
                        bbox.x1 + dx,
                        bbox.y1 + dy,
                    ));
                }
            }
        }
    }

    /// Reads `id`'s current top-left position.
    #[must_use]
    pub fn position(&self, id: &NodeId) -> Option<(f64, f64)> {
        let slot = self.slot_of(id)?;
        Some(self.position_slot(slot))
    }

    /// The outline view's `expanded` flag (§9: alongside the mindmap view's
    /// `side`, the only other per-view attribute the engine gives semantic
    /// meaning to). Stored as an ordinary entry in `views["outline"]`;
    /// defaults to `true` (expanded) when absent, matching a freshly
    /// inserted node that has never been collapsed in the outline view.
    /// Purely a presentational flag for the outline view: it never touches
    /// geometry or marks the node dirty, since mindmap layout has no notion
    /// of outline expansion.
    #[must_use]
    pub fn outline_expanded(&self, id: &NodeId) -> bool {
        let Some(slot) = self.slot_of(id) else { return true };
        self.record(slot)
            .and_then(|r| r.views.get("outline"))
            .and_then(|v| match v {
                ViewValue::Map(m) => m.get("expanded"),
                _ => None,
            })
            .and_then(ViewValue::as_bool)
            .unwrap_or(true)
    }

    /// Sets the outline view's `expanded` flag for `id`, preserving any
    /// other entries already present in `views["outline"]`.
    pub fn set_outline_expanded(&mut self, id: &NodeId, expanded: bool) -> Result<()> {
        let slot = self.require_slot(id)?;
        let rec = self.record_mut(slot).expect("slot resolved above");
        match rec.views.entry(String::from("outline")).or_insert_with(|| ViewValue::Map(BTreeMap::new())) {
            ViewValue::Map(m) => {
                m.insert(String::from("expanded"), ViewValue::Bool(expanded));
            }
            other => *other = ViewValue::Map(BTreeMap::from([(String::from("expanded"), ViewValue::Bool(expanded))])),
        }
        Ok(())
    }

    /// Sets `id`'s absolute top-left position and marks it (and its
    /// ancestors) dirty. Unlike [`Self::translate_subtree`], this does not
    /// move `id`'s children along with it — callers that need a rigid
    /// sub-tree move want [`Self::translate_subtree`] instead.
    pub fn set_position(&mut self, id: &NodeId, x: f64, y: f64) -> Result<()> {
        let slot = self.require_slot(id)?;
        self.set_position_slot(slot, x, y);
        self.mark_node_dirty(slot);
        if let Some(p) = self.parent_slot(slot) {
            self.invalidate_ancestors(p);
        }
        Ok(())
    }

    /// Rigidly translates `id` and its whole sub-tree by `(dx, dy)`, e.g. for
    /// drag feedback (§4.6). Cached bounding rectangles inside the sub-tree
    /// are shifted rather than invalidated; ancestors above `id` are marked
    /// dirty since `id`'s rectangle now sits at a new place within them.
    pub fn translate_subtree(&mut self, id: &NodeId, dx: f64, dy: f64) -> Result<()> {
        let slot = self.require_slot(id)?;
        self.translate_subtree_slot(slot, dx, dy);
        if let Some(p) = self.parent_slot(slot) {
            self.invalidate_ancestors(p);
        }
        Ok(())
    }

    /// Mirrors every descendant of `id` horizontally about `id`'s own `x`
    /// (§4.6: a dragged depth-1 child crossing the root's centerline).
    /// `id` itself does not move. Applying this twice about the same `x` is
    /// the identity, so a drag that re-crosses the centerline and returns
    /// restores the original layout exactly.
    pub fn mirror_descendants_x(&mut self, id: &NodeId) -> Result<()> {
        let slot = self.require_slot(id)?;
        let (cx, _) = self.position_slot(slot);
        for descendant in self.subtree_slots(slot) {
            if descendant == slot {
                continue;
            }
            let (x, y) = self.position_slot(descendant);
            self.set_position_slot(descendant, 2.0 * cx - x, y);
        }
        self.mark_node_dirty(slot);
        if let Some(p) = self.parent_slot(slot) {
            self.invalidate_ancestors(p);
        }
        Ok(())
    }

    /// Records that `id`'s position was (re-)validated at `zoom` and marks it
    /// dirty so the incremental resolver picks it up (§4.5: zoom-end commit
    /// marks newly-visible nodes dirty because their `last_calculated_zoom`
    /// differs from the committed zoom).
    pub fn touch_zoom(&mut self, id: &NodeId, zoom: f64) -> Result<()> {
        let slot = self.require_slot(id)?;
        if let Some(rec) = self.record_mut(slot) {
            rec.last_calculated_zoom = zoom;
        }
        self.mark_node_dirty(slot);
        Ok(())
    }

    /// Marks every live node's bbox cache and position dirty, e.g. after a
    /// global spacing change (§4.2) that invalidates every cached rectangle
    /// at once.
    pub fn mark_all_dirty(&mut self) {
        for slot in 0..self.slots.len() {
            if self.slots[slot].is_some() {
                let s = Slot(slot as u32, self.generations[slot]);
                self.mark_node_dirty(s);
            }
        }
    }

    /// Every live node id, in internal slot order (not a traversal order).
    #[must_use]
    pub fn all_ids(&self) -> Vec<NodeId> {
        self.slots.iter().filter_map(|s| s.as_ref().map(|r| r.id.clone())).collect()
    }

    /// Clears `is_dirty` for `root` and every descendant; used by the
    /// resolver once a sub-tree's positions have settled.
    pub(crate) fn clear_pos_dirty_subtree(&mut self, root: Slot) {
        for s in self.subtree_slots(root) {
            self.clear_pos_dirty_slot(s);
        }
    }

    pub(crate) fn set_last_calculated_zoom_slot(&mut self, slot: Slot, zoom: f64) {
        if let Some(rec) = self.record_mut(slot) {
            rec.last_calculated_zoom = zoom;
        }
    }

    pub(crate) fn clear_pos_dirty_slot(&mut self, slot: Slot) {
        if let Some(rec) = self.record_mut(slot) {
            rec.state.remove(NodeState::POS_DIRTY);
        }
    }

    /// The deepest node's distance from its root, `0` for an empty forest.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        let mut max = 0usize;
        for root in &self.roots {
            let mut stack = alloc::vec![(*root, 0usize)];
            while let Some((slot, depth)) = stack.pop() {
                max = max.max(depth);
                for child in self.children_slots(slot) {
                    stack.push((child, depth + 1));
                }
            }
        }
        max
    }

    // ---- public read surface (§4.1) -----------------------------------

    /// A materialized snapshot of `id`'s public attributes.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<NodeSnapshot> {
        let slot = self.slot_of(id)?;
        let rec = self.record(slot)?;
        Some(NodeSnapshot {
            id: rec.id.clone(),
            parent_id: rec.parent.and_then(|p| self.id_of(p)),
            order: rec.order,
            title: rec.title.clone(),
            content: rec.content.clone(),
            width: rec.width,
            height: rec.height,
            x: rec.x,
            y: rec.y,
            collapsed: rec.state.contains(NodeState::COLLAPSED),
            collapsed_left: rec.state.contains(NodeState::COLLAPSED_LEFT),
            collapsed_right: rec.state.contains(NodeState::COLLAPSED_RIGHT),
            side: rec.side,
            is_dirty: rec.state.contains(NodeState::POS_DIRTY),
            last_calculated_zoom: rec.last_calculated_zoom,
            views: rec.views.clone(),
        })
    }

    #[must_use]
    pub fn children(&self, id: &NodeId) -> Vec<NodeId> {
        let Some(slot) = self.slot_of(id) else { return Vec::new() };
        self.children_slots(slot)
            .into_iter()
            .filter_map(|s| self.id_of(s))
            .collect()
    }

    #[must_use]
    pub fn descendants(&self, id: &NodeId) -> Vec<NodeId> {
        let Some(slot) = self.slot_of(id) else { return Vec::new() };
        let mut out = Vec::new();
        let mut stack = self.children_slots(slot);
        while let Some(s) = stack.pop() {
            out.push(self.id_of(s).expect("slot came from live children list"));
            stack.extend(self.children_slots(s));
        }
        out
    }

    #[must_use]
    pub fn path_to_root(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let Some(mut slot) = self.slot_of(id) else { return out };
        loop {
            out.push(self.id_of(slot).expect("slot is live"));
            match self.parent_slot(slot) {
                Some(p) => slot = p,
                None => break,
            }
        }
        out
    }

    #[must_use]
    pub fn depth(&self, id: &NodeId) -> Option<usize> {
        let mut slot = self.slot_of(id)?;
        let mut depth = 0;
        while let Some(p) = self.parent_slot(slot) {
            depth += 1;
            slot = p;
        }
        Some(depth)
    }

    #[must_use]
    pub fn root_of(&self, id: &NodeId) -> Option<NodeId> {
        let mut slot = self.slot_of(id)?;
        while let Some(p) = self.parent_slot(slot) {
            slot = p;
        }
        self.id_of(slot)
    }

    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        self.roots.iter().filter_map(|s| self.id_of(*s)).collect()
    }

    /// Distinct roots containing at least one node with `is_dirty` set.
    #[must_use]
    pub fn dirty_roots(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for root in &self.roots {
            let mut stack = alloc::vec![*root];
            let mut any_dirty = false;
            while let Some(s) = stack.pop() {
                if self.record(s).is_some_and(|r| r.state.contains(NodeState::POS_DIRTY)) {
                    any_dirty = true;
                    break;
                }
                stack.extend(self.children_slots(s));
            }
            if any_dirty {
                if let Some(id) = self.id_of(*root) {
                    out.push(id);
                }
            }
        }
        out
    }
}
