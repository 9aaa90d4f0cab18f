// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mindmap Engine: the embeddable layout engine built on `mindmap_core`.
//!
//! Where `mindmap_core` is a pure layout kernel — a forest plus the
//! algorithms that keep its invariants — this crate is the stateful object
//! a host actually holds: [`Engine`] wraps a [`mindmap_core::NodeStore`]
//! with a settle/revision/event pipeline (C6), a debounced viewport
//! controller (C5), a drag protocol, and the serialization-neutral
//! [`document::Document`] load/save boundary (§6).
//!
//! This crate is `no_std` plus `alloc`, matching `mindmap_core`; the event
//! bus uses `alloc::boxed::Box<dyn FnMut>` rather than threads or an async
//! runtime (§9: "event loop / async" is explicitly out of scope).

#![no_std]

extern crate alloc;

pub mod document;
mod engine;
pub mod events;
pub mod view_model;
pub mod viewport;

pub use document::{Document, DocumentEdge, DocumentMetadata, EdgeKind, LayoutSettings, OrientationMode};
pub use engine::Engine;
pub use events::{EventBus, EventEnvelope, EventKind, Source, SubscriptionId};
pub use mindmap_core::{EngineError, Invariant, NodeAttrs, NodeId, NodeImport, NodePatch, NodeSnapshot, Result, Side};
pub use view_model::{BadgeRecord, VisibleEdge, VisibleNode, ViewModel};
pub use viewport::Viewport;
