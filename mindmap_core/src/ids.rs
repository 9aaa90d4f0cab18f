// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stable node identifiers.

use alloc::borrow::ToOwned;
use alloc::fmt;
use alloc::string::String;
use alloc::sync::Arc;
use core::ops::Deref;

/// A stable identifier for a node, cheap to clone.
///
/// Ids are allocated by the node store on [`crate::store::NodeStore::insert`]
/// and never minted by callers. They are backed by an [`Arc<str>`] rather
/// than an owned [`String`] because the same id is copied into selection
/// sets, events, and view-model records far more often than it is created.
#[derive(Clone, Eq, Hash)]
pub struct NodeId(Arc<str>);

impl NodeId {
    pub(crate) fn from_raw(s: String) -> Self {
        Self(Arc::from(s))
    }

    /// Borrow the identifier as a plain string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for NodeId {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Deref for NodeId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(Arc::from(s.to_owned()))
    }
}

impl core::borrow::Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Generational slot handle, internal to the node store.
///
/// Mirrors the generational index used by this corpus's box-tree: a slot
/// index plus a generation counter so a freed-and-reused slot cannot be
/// confused with a stale reference, even though [`NodeId`] (the identifier
/// callers see) carries no generation of its own.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Slot(pub(crate) u32, pub(crate) u32);

impl Slot {
    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}
