use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;

use crate::config::DispatchConfig;
use crate::dispatch::{
    AsyncExecutor, CallAll, CallPolicy, DeliveryStatus, Dispatcher, default_executor,
    executor_from_config,
};
use crate::error::Result;
use crate::event::Event;
use crate::registry::{Listener, Registration, RegistrationReport, RegistrySnapshot, SharedRegistry};

/// Type alias for boxed event
pub type BoxedEvent = Box<dyn Event>;

/// What `call` did with an event
///
/// Synchronous deliveries hand the event back so the producer can inspect
/// it (for example whether a handler canceled it).
#[derive(Debug)]
pub enum Delivery<E> {
    /// Every applicable handler was attempted
    Completed(E),
    /// A handler interrupted the event
    Interrupted(E),
    /// Handed to the executor; nothing comes back
    Spawned,
}

impl<E> Delivery<E> {
    pub fn status(&self) -> Option<DeliveryStatus> {
        match self {
            Delivery::Completed(_) => Some(DeliveryStatus::Completed),
            Delivery::Interrupted(_) => Some(DeliveryStatus::Interrupted),
            Delivery::Spawned => None,
        }
    }

    pub fn is_spawned(&self) -> bool {
        matches!(self, Delivery::Spawned)
    }

    pub fn event(&self) -> Option<&E> {
        match self {
            Delivery::Completed(event) | Delivery::Interrupted(event) => Some(event),
            Delivery::Spawned => None,
        }
    }

    pub fn into_event(self) -> Option<E> {
        match self {
            Delivery::Completed(event) | Delivery::Interrupted(event) => Some(event),
            Delivery::Spawned => None,
        }
    }
}

/// Composition root: registration, ordering and publishing
///
/// `L` is the listener type handed to the call policy; it may be a trait
/// object such as `dyn Module`.
pub struct EventManager<L: ?Sized> {
    registry: SharedRegistry<L>,
    dispatcher: Dispatcher<L>,
    executor: Arc<dyn AsyncExecutor>,
    allow_super_listeners: AtomicBool,
}

impl<L: ?Sized> fmt::Debug for EventManager<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventManager")
            .field("registry", &self.registry)
            .field("executor", &self.executor)
            .field("allow_super_listeners", &self.allow_super_listeners.load(Ordering::Relaxed))
            .finish()
    }
}

impl<L: ?Sized + Send + Sync + 'static> EventManager<L> {
    /// Manager gating listeners through `policy`
    pub fn new<P>(policy: P) -> Self
    where
        P: CallPolicy<L> + 'static,
    {
        Self::builder().policy(policy).build()
    }

    /// Manager configured from `config`, gating listeners through `policy`
    pub fn from_config<P>(config: &DispatchConfig, policy: P) -> Self
    where
        P: CallPolicy<L> + 'static,
    {
        Self::builder().config(config).policy(policy).build()
    }

    pub fn builder() -> EventManagerBuilder<L> {
        EventManagerBuilder::new()
    }

    /// Register a batch of listeners. Does not sort: call
    /// [`sort_events`](Self::sort_events) once registration is done.
    ///
    /// An empty batch registers nothing. Fails only on a poisoned registry;
    /// rejected handler candidates are logged and listed in the report.
    pub fn register_events<I>(&self, registrations: I) -> Result<RegistrationReport>
    where
        I: IntoIterator<Item = Registration<L>>,
    {
        let mut report = RegistrationReport::default();
        for Registration { target, handlers } in registrations {
            report.merge(self.registry.register(target, handlers)?);
        }
        debug!(
            "Registration finished: {} registered, {} duplicates, {} rejected",
            report.registered,
            report.duplicates,
            report.rejected.len()
        );
        Ok(report)
    }

    /// Register a single listener
    pub fn register_event(&self, registration: Registration<L>) -> Result<RegistrationReport> {
        self.register_events(std::iter::once(registration))
    }

    /// Order every handler list Highest to Lowest
    pub fn sort_events(&self) -> Result<()> {
        self.registry.sort_by_priority()?;
        Ok(())
    }

    /// Drop every registration
    pub fn unregister_all(&self) -> Result<()> {
        self.registry.clear()?;
        Ok(())
    }

    /// Publish an event.
    ///
    /// Asynchronous events are submitted to the executor and `Spawned` is
    /// returned at once. Everything else is delivered on the calling thread
    /// and handed back once every handler has been attempted.
    pub fn call<E: Event>(&self, event: E) -> Delivery<E> {
        self.route(event, |event| event as &mut dyn Event)
    }

    /// Like [`call`](Self::call) for type-erased events
    pub fn publish(&self, event: BoxedEvent) -> Delivery<BoxedEvent> {
        self.route(event, |event| &mut **event)
    }

    /// Deliver in place on the calling thread, ignoring the asynchronous flag
    pub fn dispatch(&self, event: &mut dyn Event) -> DeliveryStatus {
        self.dispatcher.deliver(event, self.is_allow_super_listeners())
    }

    fn route<T>(&self, mut event: T, view: fn(&mut T) -> &mut dyn Event) -> Delivery<T>
    where
        T: Send + 'static,
    {
        let allow_super = self.is_allow_super_listeners();

        if view(&mut event).is_asynchronous() {
            debug!("Submitting asynchronous delivery of {}", view(&mut event).name());
            let dispatcher = self.dispatcher.clone();
            self.executor.submit(Box::new(move || {
                let mut event = event;
                dispatcher.deliver(view(&mut event), allow_super);
            }));
            return Delivery::Spawned;
        }

        match self.dispatcher.deliver(view(&mut event), allow_super) {
            DeliveryStatus::Completed => Delivery::Completed(event),
            DeliveryStatus::Interrupted => Delivery::Interrupted(event),
        }
    }

    /// Whether the call policy currently wants `listener` to see `event`
    pub fn should_call_event(&self, listener: &Listener<L>, event: &dyn Event) -> bool {
        self.dispatcher.should_call(listener, event)
    }

    pub fn is_allow_super_listeners(&self) -> bool {
        self.allow_super_listeners.load(Ordering::Acquire)
    }

    /// Also deliver events to handlers of their supertypes
    pub fn set_allow_super_listeners(&self, allow: bool) {
        self.allow_super_listeners.store(allow, Ordering::Release);
    }

    pub fn registry(&self) -> &SharedRegistry<L> {
        &self.registry
    }

    pub fn executor(&self) -> &Arc<dyn AsyncExecutor> {
        &self.executor
    }

    /// Read-only view of the current registrations
    pub fn snapshot(&self) -> RegistrySnapshot {
        self.registry.snapshot()
    }
}

/// Builder for [`EventManager`]
pub struct EventManagerBuilder<L: ?Sized> {
    policy: Option<Arc<dyn CallPolicy<L>>>,
    executor: Option<Arc<dyn AsyncExecutor>>,
    allow_super_listeners: bool,
}

impl<L: ?Sized + Send + Sync + 'static> EventManagerBuilder<L> {
    pub fn new() -> Self {
        Self {
            policy: None,
            executor: None,
            allow_super_listeners: false,
        }
    }

    /// Defaults to [`CallAll`]
    pub fn policy<P>(mut self, policy: P) -> Self
    where
        P: CallPolicy<L> + 'static,
    {
        self.policy = Some(Arc::new(policy));
        self
    }

    /// Defaults to [`default_executor`]
    pub fn executor(mut self, executor: Arc<dyn AsyncExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn allow_super_listeners(mut self, allow: bool) -> Self {
        self.allow_super_listeners = allow;
        self
    }

    /// Apply a dispatch configuration (ancestor delivery and executor)
    pub fn config(mut self, config: &DispatchConfig) -> Self {
        self.allow_super_listeners = config.allow_super_listeners;
        self.executor = Some(executor_from_config(config));
        self
    }

    pub fn build(self) -> EventManager<L> {
        let registry = SharedRegistry::new();
        let policy = self.policy.unwrap_or_else(|| Arc::new(CallAll));
        EventManager {
            dispatcher: Dispatcher::new(registry.clone(), policy),
            registry,
            executor: self.executor.unwrap_or_else(default_executor),
            allow_super_listeners: AtomicBool::new(self.allow_super_listeners),
        }
    }
}

impl<L: ?Sized + Send + Sync + 'static> Default for EventManagerBuilder<L> {
    fn default() -> Self {
        Self::new()
    }
}
