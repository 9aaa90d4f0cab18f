// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-node boolean state, packed the way this corpus's box-tree packs its
//! node flags.

use bitflags::bitflags;

bitflags! {
    /// Compact boolean state carried by every node record.
    ///
    /// `POS_DIRTY` is the publicly-observable `is_dirty` attribute (§3): the
    /// resolver clears it once a node's position has been settled.
    /// `BBOX_DIRTY` is a separate, purely internal bit for the bounding-rect
    /// cache (§4.2): the bbox calculator clears it on recompute. The two are
    /// always set together when geometry changes, but clear independently —
    /// a node can have a fresh position while an ancestor's cached bbox is
    /// still stale, and vice versa.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub(crate) struct NodeState: u16 {
        const POS_DIRTY        = 1 << 0;
        const BBOX_DIRTY       = 1 << 1;
        const COLLAPSED        = 1 << 2;
        const COLLAPSED_LEFT   = 1 << 3;
        const COLLAPSED_RIGHT  = 1 << 4;
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self::POS_DIRTY | Self::BBOX_DIRTY
    }
}

/// Which half of the root's canvas a depth-1 child occupies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}
