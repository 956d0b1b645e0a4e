pub mod error;
pub mod state;

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

pub use error::EventSystemError;
pub use state::{Capabilities, EventState};

/// Identity of a concrete event type
///
/// Equality and hashing only look at the `TypeId`; the name is kept for logs
/// and the registry snapshot.
#[derive(Clone, Copy)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
}

impl EventType {
    /// Event type of `E`
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: short_type_name(std::any::type_name::<E>()),
        }
    }

    /// Runtime type of an event value
    pub fn of_val(event: &dyn Event) -> Self {
        Self {
            id: event.as_any().type_id(),
            name: event.name(),
        }
    }

    /// The universal root that every event shares. Never a registration key.
    pub fn root() -> Self {
        Self {
            id: TypeId::of::<dyn Event>(),
            name: "Event",
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == TypeId::of::<dyn Event>()
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EventType").field(&self.name).finish()
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Strip the module path from a type name, keeping generic arguments intact.
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

/// Core event trait
///
/// Every concrete event embeds one [`EventState`] (directly, or through the
/// ancestor value it extends) and exposes it through `state`/`state_mut`.
/// The flag accessors below all go through that state, so cancellation and
/// interruption honour the capabilities the state was created with.
pub trait Event: Any + fmt::Debug + Send + Sync {
    /// Get the name of this event
    fn name(&self) -> &'static str;

    fn state(&self) -> &EventState;

    fn state_mut(&mut self) -> &mut EventState;

    /// Declared supertypes, nearest first. The universal root is implied and
    /// should not be listed.
    fn supertypes(&self) -> Vec<EventType> {
        Vec::new()
    }

    /// View of this event as one of its declared supertypes.
    ///
    /// Events that embed their parent value return it here so handlers
    /// registered for the parent receive a typed view sharing the same state.
    /// Returning `None` hands the event itself to ancestor-level handlers.
    fn upcast_mut(&mut self, _ancestor: EventType) -> Option<&mut dyn Event> {
        None
    }

    /// Cast to Any for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Cast to mutable Any for downcasting
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn is_canceled(&self) -> bool {
        self.state().is_canceled()
    }

    /// No effect unless the event is cancelable
    fn set_canceled(&mut self, canceled: bool) {
        self.state_mut().set_canceled(canceled);
    }

    fn is_cancelable(&self) -> bool {
        self.state().capabilities().cancelable
    }

    fn is_asynchronous(&self) -> bool {
        self.state().is_asynchronous()
    }

    fn is_interrupted(&self) -> bool {
        self.state().is_interrupted()
    }

    /// Stop delivery of this event to any further handler.
    /// No effect unless the event is interruptible.
    fn interrupt(&mut self) {
        self.state_mut().interrupt();
    }

    fn is_interruptible(&self) -> bool {
        self.state().capabilities().interruptible
    }

    fn info(&self) -> Option<&str> {
        self.state().info()
    }

    fn has_info(&self) -> bool {
        self.state().info().is_some()
    }
}
