// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error kinds (§7).
//!
//! All failures are values, never panics or process termination. Mutation
//! operations are atomic: on `Err`, the node store is left exactly as it was
//! before the call.

use alloc::fmt;

use crate::ids::NodeId;

/// Which of the six §3 forest invariants was violated.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Invariant {
    /// (1) Exactly one parent per non-root.
    SingleParent,
    /// (2) No cycle: every node reaches a root in finitely many steps.
    Acyclic,
    /// (3) Sibling `order` values form a contiguous permutation of `0..k-1`.
    ContiguousOrder,
    /// (4) A non-collapsed internal node's rectangle contains every descendant.
    BoundingContainment,
    /// (5) Sibling sub-tree rectangles do not overlap.
    SiblingDisjoint,
    /// (6) Depth-1 children stay within their `side`'s half-plane.
    SideHalfPlane,
}

/// Error kinds returned by `mindmap_core` operations (§7).
#[derive(Clone, Debug, PartialEq)]
pub enum EngineError {
    /// `insert` or `move` referenced a `parent_id` that does not exist.
    ParentNotFound(NodeId),
    /// An operation referenced a node identifier that does not exist.
    NodeNotFound(NodeId),
    /// `move(id, new_parent_id)` where `new_parent_id` is a descendant of `id`.
    CycleDetected { id: NodeId, new_parent: NodeId },
    /// The document (or a requested mutation) violates a §3 invariant.
    InvariantViolation {
        invariant: Invariant,
        node: Option<NodeId>,
    },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParentNotFound(id) => write!(f, "parent node {id} not found"),
            Self::NodeNotFound(id) => write!(f, "node {id} not found"),
            Self::CycleDetected { id, new_parent } => {
                write!(f, "moving {id} under {new_parent} would create a cycle")
            }
            Self::InvariantViolation { invariant, node } => match node {
                Some(id) => write!(f, "invariant {invariant:?} violated at node {id}"),
                None => write!(f, "invariant {invariant:?} violated"),
            },
        }
    }
}

impl core::error::Error for EngineError {}

pub type Result<T> = core::result::Result<T, EngineError>;
