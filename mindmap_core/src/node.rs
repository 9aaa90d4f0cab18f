// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The node data model (§3).

use alloc::collections::BTreeMap;
use alloc::string::String;

use crate::flags::Side;
use crate::ids::NodeId;
use crate::value::ViewValue;

/// Default node width in layout units (§3).
pub const DEFAULT_WIDTH: f64 = 150.0;
/// Default node height in layout units (§3).
pub const DEFAULT_HEIGHT: f64 = 50.0;

/// Caller-supplied attributes for a freshly inserted node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeAttrs {
    pub title: String,
    pub content: String,
    pub width: f64,
    pub height: f64,
    /// Only meaningful for depth-1 children; ignored (and later assigned by
    /// the engine) for every other node.
    pub side: Option<Side>,
    pub views: BTreeMap<String, ViewValue>,
}

impl Default for NodeAttrs {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            side: None,
            views: BTreeMap::new(),
        }
    }
}

/// A partial attribute update for `NodeStore::update` (§4.1).
///
/// Any field left `None` is left untouched. Touching `width`, `height`,
/// `collapsed`, `collapsed_left`, `collapsed_right`, or `side` marks the
/// node dirty, per §4.1's `update` contract.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub collapsed: Option<bool>,
    pub collapsed_left: Option<bool>,
    pub collapsed_right: Option<bool>,
    pub side: Option<Side>,
    /// Insert or replace a single entry in the node's per-view attribute map.
    pub view: Option<(String, ViewValue)>,
}

impl NodePatch {
    /// Whether this patch touches any geometry-affecting attribute (§4.1).
    #[must_use]
    pub(crate) fn touches_geometry(&self) -> bool {
        self.width.is_some()
            || self.height.is_some()
            || self.collapsed.is_some()
            || self.collapsed_left.is_some()
            || self.collapsed_right.is_some()
            || self.side.is_some()
    }
}

/// A fully-specified node used to reconstruct the forest from a
/// previously-saved document (§6: "the document value is serialization-
/// neutral").
///
/// Unlike [`NodeStore::insert`](crate::store::NodeStore::insert), which
/// always mints a fresh id, loading a document must preserve the exact
/// ids, positions, and dirty/zoom bookkeeping the host serialized, so
/// every field that would otherwise be engine-owned is supplied here.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeImport {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub title: String,
    pub content: String,
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
    pub collapsed: bool,
    pub collapsed_left: bool,
    pub collapsed_right: bool,
    pub side: Option<Side>,
    pub is_dirty: bool,
    pub last_calculated_zoom: f64,
    pub views: BTreeMap<String, ViewValue>,
}

/// A read-only, owned snapshot of a node's public attributes.
///
/// Returned by [`crate::store::NodeStore::node`] for callers that want a
/// materialized view rather than a series of narrow accessor calls.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSnapshot {
    pub id: NodeId,
    pub parent_id: Option<NodeId>,
    pub order: u32,
    pub title: String,
    pub content: String,
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
    pub collapsed: bool,
    pub collapsed_left: bool,
    pub collapsed_right: bool,
    pub side: Option<Side>,
    pub is_dirty: bool,
    pub last_calculated_zoom: f64,
    pub views: BTreeMap<String, ViewValue>,
}
