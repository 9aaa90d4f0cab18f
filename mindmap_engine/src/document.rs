// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document input model (§6).
//!
//! A [`Document`] is the serialization-neutral value a host loads into an
//! [`crate::Engine`]: an ordered node list (reusing
//! [`mindmap_core::NodeImport`] so ids, positions, and dirty/zoom
//! bookkeeping survive a round trip verbatim), an ordered edge list, a
//! layout-settings block, and metadata. The engine does not pick a wire
//! format; it only defines the shape a host's (de)serializer produces.

use alloc::string::String;
use alloc::vec::Vec;

use mindmap_core::NodeImport;
use mindmap_core::lod::DEFAULT_THRESHOLDS;

/// Whether an edge is derived from the parent/child forest or is an opaque
/// host-defined cross-reference (§6).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EdgeKind {
    /// Derivable from `parent_id`; the engine recomputes these on load and
    /// ignores whatever a host supplied, per §6: "Hierarchy edges are
    /// derivable from `parent_id` and are maintained by the engine."
    Hierarchy,
    /// Opaque to the engine; carried through unchanged.
    Reference,
}

/// An edge as carried in a [`Document`] (§6).
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentEdge {
    pub id: String,
    pub from: mindmap_core::NodeId,
    pub to: mindmap_core::NodeId,
    pub kind: EdgeKind,
}

/// The four-value orientation enumeration the engine adopts (§9: the source
/// alternates between two vocabularies; `counter-clockwise` is a synonym of
/// `Anticlockwise`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum OrientationMode {
    Clockwise,
    Anticlockwise,
    #[default]
    LeftRight,
    RightLeft,
}

impl OrientationMode {
    /// Parses the document's `orientation_mode` string, accepting
    /// `counter-clockwise` as a synonym for `anticlockwise` (§9, Open
    /// Questions).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "clockwise" => Some(Self::Clockwise),
            "anticlockwise" | "counter-clockwise" => Some(Self::Anticlockwise),
            "left-right" => Some(Self::LeftRight),
            "right-left" => Some(Self::RightLeft),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clockwise => "clockwise",
            Self::Anticlockwise => "anticlockwise",
            Self::LeftRight => "left-right",
            Self::RightLeft => "right-left",
        }
    }
}

/// The layout-settings block of a [`Document`] (§6).
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutSettings {
    pub active_view: String,
    pub orientation_mode: OrientationMode,
    pub lod_enabled: bool,
    pub lod_thresholds: Vec<f64>,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            active_view: String::from("mindmap"),
            orientation_mode: OrientationMode::default(),
            lod_enabled: true,
            lod_thresholds: DEFAULT_THRESHOLDS.to_vec(),
            horizontal_spacing: 0.0,
            vertical_spacing: 0.0,
        }
    }
}

/// Document metadata (§6): `id`, `name`, timestamps, tags, and counts. The
/// engine does not interpret any of these; it stores and returns them
/// verbatim, the same way it treats per-view attributes (§9).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentMetadata {
    pub id: String,
    pub name: String,
    /// Host-supplied epoch-millisecond timestamp; the engine has no clock.
    pub created_at: i64,
    pub updated_at: i64,
    pub tags: Vec<String>,
}

/// The full document value a host loads into or saves from an [`Engine`]
/// (§6). All fields are plain data; the engine treats unknown keys in the
/// per-node `views` maps as opaque and preserves them verbatim.
///
/// [`Engine`]: crate::Engine
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub metadata: DocumentMetadata,
    pub layout: LayoutSettings,
    pub nodes: Vec<NodeImport>,
    pub edges: Vec<DocumentEdge>,
}
