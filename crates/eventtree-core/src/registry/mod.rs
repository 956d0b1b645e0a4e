//! # Eventtree Listener Registry
//!
//! Maps each event type to the ordered list of handlers subscribed to it.
//!
//! - [`ListenerRegistry`] validates candidate [`HandlerBinding`]s, deduplicates
//!   them per (handler id, event type) and keeps them in priority order once
//!   [`ListenerRegistry::sort_by_priority`] has run.
//! - [`SharedRegistry`] wraps the registry in an `RwLock` so registration and
//!   concurrent (asynchronous) delivery can coexist.
//! - [`RegistrySnapshot`] is a read-only copy for diagnostics.
pub mod descriptor;
pub mod priority;
pub mod snapshot;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, error, trace, warn};

use crate::event::{EventSystemError, EventType};

pub use descriptor::{
    Callable, HandlerBinding, HandlerDescriptor, HandlerError, HandlerResult, Listener,
    ListenerType, Registration,
};
pub use priority::Priority;
pub use snapshot::{DescriptorSummary, RegistrySnapshot};

/// Outcome of registering one or more listeners
#[derive(Debug, Default)]
pub struct RegistrationReport {
    /// Descriptors inserted
    pub registered: usize,
    /// Candidates already present for their event type
    pub duplicates: usize,
    /// Candidates that failed validation
    pub rejected: Vec<EventSystemError>,
}

impl RegistrationReport {
    pub fn merge(&mut self, other: RegistrationReport) {
        self.registered += other.registered;
        self.duplicates += other.duplicates;
        self.rejected.extend(other.rejected);
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Event type to ordered handler list
pub struct ListenerRegistry<L: ?Sized> {
    handlers: HashMap<EventType, Vec<Arc<HandlerDescriptor<L>>>>,
}

// Manual Debug implementation
impl<L: ?Sized> fmt::Debug for ListenerRegistry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let handler_count: usize = self.handlers.values().map(|v| v.len()).sum();
        f.debug_struct("ListenerRegistry")
            .field("event_types", &self.handlers.len())
            .field("handlers", &handler_count)
            .finish()
    }
}

impl<L: ?Sized> ListenerRegistry<L> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Insert one descriptor per valid candidate.
    ///
    /// Invalid candidates are logged and reported, never raised: the other
    /// candidates of the batch still get registered.
    pub fn register(
        &mut self,
        target: Listener<L>,
        candidates: Vec<HandlerBinding<L>>,
    ) -> RegistrationReport {
        let mut report = RegistrationReport::default();

        for binding in candidates {
            let event_type = binding.event_type();

            if event_type.is_root() {
                let err = EventSystemError::NotAnEventType {
                    handler: binding.id().to_string(),
                    declared: event_type.name().to_string(),
                };
                warn!("Skipping handler: {}", err);
                report.rejected.push(err);
                continue;
            }

            if target.is_type() && binding.callable().requires_instance() {
                let err = EventSystemError::InstanceRequired {
                    handler: binding.id().to_string(),
                    listener: target.type_name().to_string(),
                };
                error!(
                    "{}. Listeners registered as a type may only declare receiver-less handlers \
                     (HandlerBinding::function); register an instance to use HandlerBinding::method.",
                    err
                );
                report.rejected.push(err);
                continue;
            }

            let list = self.handlers.entry(event_type).or_default();
            if list.iter().any(|d| d.id() == binding.id()) {
                trace!("Handler '{}' already registered for {}", binding.id(), event_type);
                report.duplicates += 1;
                continue;
            }

            debug!(
                "Registered handler '{}' ({}) for {} on {:?}",
                binding.id(),
                binding.priority(),
                event_type,
                target
            );
            list.push(Arc::new(HandlerDescriptor::bind(binding, target.clone())));
            report.registered += 1;
        }

        report
    }

    /// Order every list Highest to Lowest, keeping registration order within
    /// a priority. Safe to call any number of times.
    pub fn sort_by_priority(&mut self) {
        for list in self.handlers.values_mut() {
            let mut sorted = Vec::with_capacity(list.len());
            for priority in Priority::ALL {
                sorted.extend(list.iter().filter(|d| d.priority() == priority).cloned());
            }
            *list = sorted;
        }
        trace!("Sorted {} handler lists by priority", self.handlers.len());
    }

    /// Drop every registration
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Handlers for exactly `event_type`, in their current order
    pub fn lookup(&self, event_type: EventType) -> Vec<Arc<HandlerDescriptor<L>>> {
        self.handlers.get(&event_type).cloned().unwrap_or_default()
    }

    /// Event types holding registered handlers
    pub fn event_types(&self) -> Vec<EventType> {
        self.handlers.keys().copied().collect()
    }

    /// Number of descriptors across all event types
    pub fn len(&self) -> usize {
        self.handlers.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot::capture(&self.handlers)
    }
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe shared registry
///
/// Lookups clone the handler list out of the lock, so handlers run without
/// holding it and may themselves register or clear.
pub struct SharedRegistry<L: ?Sized> {
    registry: Arc<RwLock<ListenerRegistry<L>>>,
}

impl<L: ?Sized> Clone for SharedRegistry<L> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

// Manual Debug impl for SharedRegistry
impl<L: ?Sized> fmt::Debug for SharedRegistry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedRegistry").finish_non_exhaustive()
    }
}

impl<L: ?Sized> SharedRegistry<L> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(ListenerRegistry::new())),
        }
    }

    pub fn register(
        &self,
        target: Listener<L>,
        candidates: Vec<HandlerBinding<L>>,
    ) -> Result<RegistrationReport, EventSystemError> {
        let mut registry = self.registry.write().map_err(|_| poisoned("register"))?;
        Ok(registry.register(target, candidates))
    }

    pub fn sort_by_priority(&self) -> Result<(), EventSystemError> {
        let mut registry = self.registry.write().map_err(|_| poisoned("sort"))?;
        registry.sort_by_priority();
        Ok(())
    }

    pub fn clear(&self) -> Result<(), EventSystemError> {
        let mut registry = self.registry.write().map_err(|_| poisoned("clear"))?;
        registry.clear();
        Ok(())
    }

    /// Never fails: a poisoned lock still holds consistent lists, since no
    /// handler code runs while it is held.
    pub fn lookup(&self, event_type: EventType) -> Vec<Arc<HandlerDescriptor<L>>> {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .lookup(event_type)
    }

    pub fn len(&self) -> usize {
        self.registry.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.read().unwrap_or_else(PoisonError::into_inner).snapshot()
    }
}

impl<L: ?Sized> Default for SharedRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(component: &str) -> EventSystemError {
    EventSystemError::RegistryPoisoned {
        component: component.to_string(),
    }
}
