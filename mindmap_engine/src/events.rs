// Copyright 2026 the Mindmap Layout Engine Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Event taxonomy & bus (C6).
//!
//! Events are synchronous function calls to registered observers, invoked
//! in registration order — there is no microtask queue or callback
//! scheduling (§9: "event loop / async"). Every event carries the
//! `revision` counter of the operation that produced it and a `source` tag
//! (default `"engine"`) so observers can ignore echoes of their own inputs
//! (§4.6).

use alloc::boxed::Box;
use alloc::fmt;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use mindmap_core::{NodeId, Side};

use crate::view_model::ViewModel;

/// The caller-supplied tag carried on every emitted event (§4.6). Defaults
/// to `"engine"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Source(String);

impl Source {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Source {
    fn default() -> Self {
        Self(String::from("engine"))
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// The taxonomy of observable changes the engine emits (§4.6).
#[derive(Clone, Debug, PartialEq)]
pub enum EventKind {
    NodeCreated(NodeId),
    NodeUpdated(NodeId),
    /// Cursor feedback during a drag, or the final settled position after
    /// `end_drag` (§4.6: "`drag_to` ... does emit a low-rate cursor event").
    NodeMoved(NodeId),
    NodeDeleted(NodeId),
    NodeReparented {
        id: NodeId,
        old_parent: Option<NodeId>,
        new_parent: Option<NodeId>,
    },
    SiblingsReordered {
        parent_id: Option<NodeId>,
    },
    NodeSideChanged {
        id: NodeId,
        side: Side,
    },
    ViewChanged {
        view: String,
    },
    NodeSelected(NodeId),
    NodesSelected(Vec<NodeId>),
    /// Carries the post-commit view model; emitted once at the end of every
    /// settled operation (§4.5, §5).
    ViewModelUpdated(ViewModel),
    /// Resolver iteration cap hit for the listed root sub-trees; non-fatal
    /// (§4.3, §7).
    ConvergenceWarning(Vec<NodeId>),
}

/// A single emitted event: its `kind` plus the `revision` and `source` every
/// event carries (§4.6, §5).
#[derive(Clone, Debug, PartialEq)]
pub struct EventEnvelope {
    pub revision: u64,
    pub source: Source,
    pub kind: EventKind,
}

/// Opaque handle returned by [`EventBus::subscribe`], used to
/// [`EventBus::unsubscribe`] later.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Registered observers, invoked synchronously and in registration order on
/// every emitted event (§9).
pub struct EventBus {
    observers: Vec<(u64, Box<dyn FnMut(&EventEnvelope)>)>,
    next_id: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus").field("observer_count", &self.observers.len()).finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self { observers: Vec::new(), next_id: 0 }
    }

    /// Registers `observer`, called on every event from now on, in the
    /// order observers were registered.
    pub fn subscribe(&mut self, observer: impl FnMut(&EventEnvelope) + 'static) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        SubscriptionId(id)
    }

    /// Removes a previously registered observer; a no-op if already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.observers.retain(|(oid, _)| *oid != id.0);
    }

    pub(crate) fn emit(&mut self, event: EventEnvelope) {
        for (_, observer) in &mut self.observers {
            observer(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use core::cell::Cell;

    #[test]
    fn observers_fire_in_registration_order() {
        let mut bus = EventBus::new();
        let order = Rc::new(core::cell::RefCell::new(Vec::new()));
        let o1 = order.clone();
        bus.subscribe(move |_| o1.borrow_mut().push(1));
        let o2 = order.clone();
        bus.subscribe(move |_| o2.borrow_mut().push(2));
        bus.emit(EventEnvelope {
            revision: 1,
            source: Source::default(),
            kind: EventKind::NodeDeleted(NodeId::from("x")),
        });
        assert_eq!(*order.borrow(), alloc::vec![1, 2]);
    }

    #[test]
    fn unsubscribe_stops_future_delivery() {
        let mut bus = EventBus::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = bus.subscribe(move |_| c.set(c.get() + 1));
        bus.emit(EventEnvelope {
            revision: 1,
            source: Source::default(),
            kind: EventKind::NodeDeleted(NodeId::from("x")),
        });
        bus.unsubscribe(id);
        bus.emit(EventEnvelope {
            revision: 2,
            source: Source::default(),
            kind: EventKind::NodeDeleted(NodeId::from("x")),
        });
        assert_eq!(count.get(), 1);
    }
}
