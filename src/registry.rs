//! Registry Module - Native handles and the handle → key handler map
//!
//! Every native object (surface, screen, widget) is identified by an opaque
//! [`Handle`] allocated from a [`HandleTable`]. Handles are never reused, so
//! a stale handle can be detected instead of silently aliasing a newer
//! object.
//!
//! The [`ObjectRegistry`] maps a widget's handle to the [`KeyHandler`] that
//! should receive its per-keystroke hooks. It holds the handler weakly: the
//! widget owns its handler, the registry only finds it.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::key::Key;
use crate::types::ObjectType;

// =============================================================================
// HANDLES
// =============================================================================

/// Opaque identifier of a native object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of native object a handle names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Surface,
    Screen,
    Widget(ObjectType),
}

type DestroyCallback = Box<dyn FnOnce(Handle)>;

/// Allocation table for native handles.
///
/// Tracks which handles are live, their kind, and the callbacks to run when
/// each is released.
#[derive(Default)]
pub struct HandleTable {
    next: u64,
    live: HashMap<Handle, HandleKind>,
    destroy_callbacks: HashMap<Handle, Vec<DestroyCallback>>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh handle.
    pub fn allocate(&mut self, kind: HandleKind) -> Handle {
        self.next += 1;
        let handle = Handle(self.next);
        self.live.insert(handle, kind);
        handle
    }

    /// Mark a handle as released.
    ///
    /// Returns the destroy callbacks registered for it, which the caller
    /// runs once it no longer holds the table borrowed. Releasing an unknown
    /// or already released handle returns `None`.
    pub fn release(&mut self, handle: Handle) -> Option<Vec<DestroyCallback>> {
        self.live.remove(&handle)?;
        Some(self.destroy_callbacks.remove(&handle).unwrap_or_default())
    }

    pub fn is_live(&self, handle: Handle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn kind(&self, handle: Handle) -> Option<HandleKind> {
        self.live.get(&handle).copied()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Live handles in allocation order.
    pub fn live_handles(&self) -> Vec<Handle> {
        self.live.keys().copied().collect::<BTreeSet<_>>().into_iter().collect()
    }

    /// Register a callback to run when `handle` is released.
    ///
    /// Returns false (and drops the callback) when the handle is not live.
    pub fn on_destroy(&mut self, handle: Handle, callback: DestroyCallback) -> bool {
        if !self.is_live(handle) {
            return false;
        }
        self.destroy_callbacks.entry(handle).or_default().push(callback);
        true
    }
}

// =============================================================================
// KEY HANDLERS
// =============================================================================

/// Result of a per-keystroke hook.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Flow {
    /// Let the key through.
    #[default]
    Proceed,
    /// Drop the key (pre-process only; ignored after processing).
    Consume,
    /// Stop the activation loop with `ExitType::EarlyExit`.
    Exit,
}

/// Receiver of a widget's per-keystroke hooks.
///
/// Both hooks default to [`Flow::Proceed`].
pub trait KeyHandler {
    /// Called before the widget sees `key`.
    fn pre_process(&self, key: Key) -> Flow {
        let _ = key;
        Flow::Proceed
    }

    /// Called after the widget handled `key`.
    fn post_process(&self, key: Key) -> Flow {
        let _ = key;
        Flow::Proceed
    }
}

// =============================================================================
// OBJECT REGISTRY
// =============================================================================

/// Non-owning map from widget handle to key handler.
#[derive(Default)]
pub struct ObjectRegistry {
    entries: HashMap<Handle, Weak<dyn KeyHandler>>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `handle` with `handler`.
    ///
    /// An existing association for the same handle is overwritten; returns
    /// true in that case.
    pub fn register(&mut self, handle: Handle, handler: &Rc<dyn KeyHandler>) -> bool {
        self.entries.insert(handle, Rc::downgrade(handler)).is_some()
    }

    /// Remove the association for `handle`. No-op when absent.
    pub fn unregister(&mut self, handle: Handle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    /// Find the handler for `handle`, if it is registered and still alive.
    pub fn lookup(&self, handle: Handle) -> Option<Rc<dyn KeyHandler>> {
        self.entries.get(&handle)?.upgrade()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered handles, sorted.
    pub fn handles(&self) -> Vec<Handle> {
        let mut handles: Vec<Handle> = self.entries.keys().copied().collect();
        handles.sort();
        handles
    }
}

// =============================================================================
// TESTS
// =============================================================================
