// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! LOD Filter & Badge Generator (C4).
//!
//! Given the settled forest and a zoom level, produces the set of visible
//! node ids plus synthetic badge placeholders for elided descendants
//! (§4.4). Badge rectangles and counts are computed against the real,
//! non-LOD-filtered forest: a node's own `collapsed*` state already hides
//! its descendants regardless of zoom, and this module does not second-
//! guess that — it only adds the zoom-indexed depth cutoff on top.

use alloc::vec::Vec;

use kurbo::Rect;

use crate::bbox::{self, Spacing};
use crate::flags::Side;
use crate::ids::{NodeId, Slot};
use crate::store::NodeStore;

/// Default zoom thresholds in percent (§3).
pub const DEFAULT_THRESHOLDS: [f64; 5] = [10.0, 30.0, 50.0, 70.0, 90.0];
/// Default arithmetic step used to extend thresholds for deep trees (§3).
pub const DEFAULT_STEP: f64 = 20.0;

/// Process-wide LOD configuration (§3: "LOD configuration").
#[derive(Clone, Debug, PartialEq)]
pub struct LodConfig {
    pub thresholds: Vec<f64>,
    pub step: f64,
    pub enabled: bool,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            step: DEFAULT_STEP,
            enabled: true,
        }
    }
}

impl LodConfig {
    /// Extends `self.thresholds` (never shrinking it) with the arithmetic
    /// progression `t1 + (i-1)*step` until it covers `min_len` entries
    /// (§3: "dynamic thresholds").
    pub fn ensure_depth(&mut self, min_len: usize) {
        let t1 = self.thresholds.first().copied().unwrap_or(self.step);
        while self.thresholds.len() < min_len {
            let i = self.thresholds.len() + 1;
            self.thresholds.push(t1 + ((i - 1) as f64) * self.step);
        }
    }

    /// The dynamic zoom ceiling exposed to the caller (§4.4).
    #[must_use]
    pub fn max_zoom(&self) -> f64 {
        let last = self.thresholds.last().copied().unwrap_or(0.0);
        ((last + self.step) / 100.0).clamp(2.0, 5.0)
    }
}

/// The visibility depth `d(z)` for a given zoom (§4.4).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VisibilityDepth {
    Bounded(usize),
    Unbounded,
}

impl VisibilityDepth {
    #[must_use]
    pub const fn allows(self, depth: usize) -> bool {
        match self {
            Self::Bounded(d) => depth <= d,
            Self::Unbounded => true,
        }
    }
}

/// Computes `d(z)` for thresholds `T = [t1, ..., tn]` (§4.4).
///
/// `d(z) = 0` when `z < t1`; `d(z) = ∞` when `z >= tn`; otherwise the
/// largest `k` with `z >= t_k`.
#[must_use]
pub fn visibility_depth(thresholds: &[f64], zoom: f64) -> VisibilityDepth {
    let Some(&first) = thresholds.first() else {
        return VisibilityDepth::Unbounded;
    };
    if zoom < first {
        return VisibilityDepth::Bounded(0);
    }
    let last = thresholds[thresholds.len() - 1];
    if zoom >= last {
        return VisibilityDepth::Unbounded;
    }
    let mut k = 0usize;
    for &t in thresholds {
        if zoom >= t {
            k += 1;
        } else {
            break;
        }
    }
    VisibilityDepth::Bounded(k)
}

/// A synthetic placeholder representing a contiguous group of hidden
/// children on one side of a visible node (§4.4).
#[derive(Clone, Debug, PartialEq)]
pub struct Badge {
    pub id: NodeId,
    pub parent_id: NodeId,
    /// `Some` only when `parent_id` is a root (left/right grouping);
    /// `None` for every other hidden-children group.
    pub side: Option<Side>,
    pub rect: Rect,
    /// Hidden descendants represented, including the hidden children
    /// themselves (§4.4: "count of hidden nodes, descendants included").
    pub hidden_count: usize,
}

/// The output of a single LOD pass: visible node ids plus badges.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LodResult {
    pub visible: Vec<NodeId>,
    pub badges: Vec<Badge>,
}

fn subtree_count(store: &NodeStore, slot: Slot) -> usize {
    let mut count = 1;
    for child in store.children_slots(slot) {
        count += subtree_count(store, child);
    }
    count
}

fn badge_id(parent: &NodeId, side: Option<Side>) -> NodeId {
    match side {
        Some(Side::Left) => NodeId::from_raw(alloc::format!("badge:{parent}:left")),
        Some(Side::Right) => NodeId::from_raw(alloc::format!("badge:{parent}:right")),
        None => NodeId::from_raw(alloc::format!("badge:{parent}")),
    }
}

/// Computes the visible set and badges for `zoom` against `store` (§4.4).
///
/// Extends `config.thresholds` in place first if the forest's depth now
/// exceeds its length (§3: "dynamic thresholds"), so the extension
/// persists across calls rather than being recomputed and discarded each
/// time. Otherwise mutates `store` only insofar as the bounding-rect
/// calculator caches recomputed rectangles for badge unions.
#[must_use]
pub fn compute(store: &mut NodeStore, spacing: Spacing, config: &mut LodConfig, zoom: f64) -> LodResult {
    config.ensure_depth(store.max_depth() + 1);
    let depth_limit = if config.enabled {
        visibility_depth(&config.thresholds, zoom)
    } else {
        VisibilityDepth::Unbounded
    };

    let mut result = LodResult::default();
    for root in store.root_slots() {
        visit(store, root, 0, depth_limit, spacing, &mut result);
    }
    result
}

fn visit(
    store: &mut NodeStore,
    slot: Slot,
    depth: usize,
    depth_limit: VisibilityDepth,
    spacing: Spacing,
    result: &mut LodResult,
) {
    let Some(id) = store.id_of(slot) else { return };
    result.visible.push(id.clone());

    let children = store.children_slots(slot);
    if children.is_empty() {
        return;
    }

    let is_root = store.parent_slot(slot).is_none();
    let snapshot = store.node(&id).expect("slot resolved from a live node");

    let groups: [(Option<Side>, Vec<Slot>); 2] = if is_root {
        let left = children
            .iter()
            .copied()
            .filter(|c| store.side_slot(*c) != Some(Side::Right))
            .collect();
        let right = children
            .iter()
            .copied()
            .filter(|c| store.side_slot(*c) == Some(Side::Right))
            .collect();
        [(Some(Side::Left), left), (Some(Side::Right), right)]
    } else {
        [(None, children.clone()), (None, Vec::new())]
    };

    for (side, group) in groups {
        if group.is_empty() {
            continue;
        }
        let hidden_by_collapse = if is_root {
            match side {
                Some(Side::Left) => snapshot.collapsed || snapshot.collapsed_left,
                Some(Side::Right) => snapshot.collapsed || snapshot.collapsed_right,
                _ => snapshot.collapsed,
            }
        } else {
            snapshot.collapsed
        };
        let hidden_by_lod = !depth_limit.allows(depth + 1);

        if hidden_by_collapse || hidden_by_lod {
            let mut rect: Option<Rect> = None;
            let mut count = 0usize;
            for &child in &group {
                let child_rect = bbox::bounding_rect_slot(store, child, spacing);
                rect = Some(match rect {
                    Some(acc) => acc.union(child_rect),
                    None => child_rect,
                });
                count += subtree_count(store, child);
            }
            if let Some(rect) = rect {
                result.badges.push(Badge {
                    id: badge_id(&id, side),
                    parent_id: id.clone(),
                    side,
                    rect,
                    hidden_count: count,
                });
            }
        } else {
            for &child in &group {
                visit(store, child, depth + 1, depth_limit, spacing, result);
            }
        }
    }
}
