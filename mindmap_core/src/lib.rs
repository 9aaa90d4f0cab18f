// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mindmap Core: the pure layout kernel of the mindmap layout engine.
//!
//! This crate owns the document model and the three algorithmic pieces
//! that make the layout invariants hold:
//!
//! - [`store`]: the node store (C1) — the authoritative forest, keyed by
//!   a stable string [`ids::NodeId`], with amortized-O(1) lookup and a
//!   generational internal slot array for safe delete/reinsert.
//! - [`bbox`]: the bounding-rect calculator (C2) — the recursive,
//!   cached, padding-aware rectangle union that every non-collapsed
//!   internal node's sub-tree must satisfy.
//! - [`overlap`]: the overlap resolver (C3) — global and incremental
//!   passes that shift sibling sub-trees apart until none overlap, and
//!   keep depth-1 children within their `side`'s half-plane.
//! - [`lod`]: the LOD filter & badge generator (C4) — the zoom-indexed
//!   depth cutoff and the synthetic badge placeholders it emits for
//!   elided descendants.
//!
//! There is no event bus, viewport, or drag protocol here — see
//! `mindmap_engine` for the embeddable surface built on top of this
//! crate. This crate is usable standalone for batch layout of an
//! imported document, fuzzing, or any host that wants direct control
//! over when the resolver and LOD filter run.
//!
//! This crate is `no_std` plus `alloc`: it owns no I/O, so there is no
//! reason to require `std`. Enable the `std` feature (on by default) to
//! forward to `kurbo`'s `std` feature, or `libm` on targets without a
//! native `libm`.

#![no_std]

extern crate alloc;

pub mod bbox;
pub mod error;
mod flags;
pub mod ids;
pub mod lod;
pub mod node;
pub mod overlap;
pub mod store;
pub mod value;

pub use bbox::Spacing;
pub use error::{EngineError, Invariant, Result};
pub use flags::Side;
pub use ids::NodeId;
pub use lod::{Badge, LodConfig, LodResult, VisibilityDepth};
pub use node::{NodeAttrs, NodeImport, NodePatch, NodeSnapshot, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use store::NodeStore;
pub use value::ViewValue;
