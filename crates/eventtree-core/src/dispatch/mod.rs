pub mod executor;

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use log::{error, trace};

use crate::event::{Event, EventSystemError, EventType};
use crate::registry::{HandlerDescriptor, Listener, SharedRegistry};

pub use executor::{
    AsyncExecutor, Job, ThreadExecutor, TokioExecutor, default_executor, executor_from_config,
};

/// Decides whether a listener currently wants events
///
/// Handlers flagged `call_always` run whatever the answer. A panic is logged
/// and counts as `false`.
pub trait CallPolicy<L: ?Sized>: Send + Sync {
    fn should_call(&self, listener: &Listener<L>, event: &dyn Event) -> bool;
}

impl<L: ?Sized, F> CallPolicy<L> for F
where
    F: Fn(&Listener<L>, &dyn Event) -> bool + Send + Sync,
{
    fn should_call(&self, listener: &Listener<L>, event: &dyn Event) -> bool {
        self(listener, event)
    }
}

/// Policy that calls every listener
#[derive(Debug, Clone, Copy, Default)]
pub struct CallAll;

impl<L: ?Sized> CallPolicy<L> for CallAll {
    fn should_call(&self, _listener: &Listener<L>, _event: &dyn Event) -> bool {
        true
    }
}

/// How a delivery ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// Every applicable handler was attempted
    Completed,
    /// A handler interrupted the event
    Interrupted,
}

/// Delivers events to the handlers found in a registry
pub struct Dispatcher<L: ?Sized> {
    registry: SharedRegistry<L>,
    policy: Arc<dyn CallPolicy<L>>,
}

impl<L: ?Sized> Clone for Dispatcher<L> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry.clone(),
            policy: Arc::clone(&self.policy),
        }
    }
}

impl<L: ?Sized> fmt::Debug for Dispatcher<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<L: ?Sized> Dispatcher<L> {
    pub fn new(registry: SharedRegistry<L>, policy: Arc<dyn CallPolicy<L>>) -> Self {
        Self { registry, policy }
    }

    pub fn registry(&self) -> &SharedRegistry<L> {
        &self.registry
    }

    /// Ask the policy about `listener`. A panicking policy is logged and
    /// treated as a refusal.
    pub fn should_call(&self, listener: &Listener<L>, event: &dyn Event) -> bool {
        match panic::catch_unwind(AssertUnwindSafe(|| self.policy.should_call(listener, event))) {
            Ok(wanted) => wanted,
            Err(payload) => {
                error!(
                    "Call policy panicked for {:?} on event '{}': {}",
                    listener,
                    event.name(),
                    panic_message(payload.as_ref())
                );
                false
            }
        }
    }

    /// Deliver `event` to the handlers of its exact type, then, when
    /// `allow_super` is set, to those of each declared supertype.
    ///
    /// Every ancestor level is visited even after an interruption; the
    /// per-handler check keeps those levels silent.
    pub fn deliver(&self, event: &mut dyn Event, allow_super: bool) -> DeliveryStatus {
        let exact = EventType::of_val(event);
        trace!("Delivering {} (super listeners: {})", exact, allow_super);

        self.deliver_level(exact, event);

        if allow_super {
            for ancestor in event.supertypes() {
                if ancestor.is_root() || ancestor == exact {
                    continue;
                }
                match event.upcast_mut(ancestor) {
                    Some(view) => self.deliver_level(ancestor, view),
                    None => self.deliver_level(ancestor, event),
                }
            }
        }

        if event.is_interrupted() {
            DeliveryStatus::Interrupted
        } else {
            DeliveryStatus::Completed
        }
    }

    fn deliver_level(&self, event_type: EventType, event: &mut dyn Event) {
        for descriptor in self.registry.lookup(event_type) {
            if event.is_interrupted() {
                trace!("{} interrupted, skipping remaining {} handlers", event.name(), event_type);
                break;
            }
            if self.should_call(descriptor.listener(), &*event) || descriptor.is_call_always() {
                self.invoke(&descriptor, event);
            }
        }
    }

    /// Run one handler, containing both returned errors and panics.
    fn invoke(&self, descriptor: &HandlerDescriptor<L>, event: &mut dyn Event) {
        let event_name = event.name();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| descriptor.invoke(event)));

        let reason = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err.to_string(),
            Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
        };
        let failure = EventSystemError::HandlerFailed {
            handler: descriptor.id().to_string(),
            event_name: event_name.to_string(),
            reason,
        };
        error!("{}", failure);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "unknown panic payload"
    }
}
