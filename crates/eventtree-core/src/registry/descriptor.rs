use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use crate::event::{Event, EventSystemError, EventType};
use crate::event::short_type_name;
use crate::registry::Priority;

/// Error raised from inside a handler body
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Handlers report failures, never values
pub type HandlerResult = Result<(), HandlerError>;

type FunctionFn = dyn Fn(&mut dyn Event) -> HandlerResult + Send + Sync;
type MethodFn<L> = dyn Fn(&L, &mut dyn Event) -> HandlerResult + Send + Sync;

/// A registered callable
pub enum Callable<L: ?Sized> {
    /// Invoked without a receiver; valid for instance and type registrations
    Function(Arc<FunctionFn>),
    /// Invoked with the registered listener instance
    Method(Arc<MethodFn<L>>),
}

impl<L: ?Sized> Callable<L> {
    pub fn requires_instance(&self) -> bool {
        matches!(self, Callable::Method(_))
    }
}

impl<L: ?Sized> Clone for Callable<L> {
    fn clone(&self) -> Self {
        match self {
            Callable::Function(f) => Callable::Function(Arc::clone(f)),
            Callable::Method(f) => Callable::Method(Arc::clone(f)),
        }
    }
}

impl<L: ?Sized> fmt::Debug for Callable<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Function(_) => f.write_str("Callable::Function"),
            Callable::Method(_) => f.write_str("Callable::Method"),
        }
    }
}

/// Identity of a bare listener type
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerType {
    id: TypeId,
    name: &'static str,
}

impl ListenerType {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for ListenerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ListenerType").field(&self.name).finish()
    }
}

/// Registration target: a listener instance, or a bare type whose handlers
/// need no receiver
pub enum Listener<L: ?Sized> {
    Instance(Arc<L>),
    Type(ListenerType),
}

impl<L: ?Sized> Listener<L> {
    pub fn instance(listener: Arc<L>) -> Self {
        Listener::Instance(listener)
    }

    pub fn of_type<T: ?Sized + 'static>() -> Self {
        Listener::Type(ListenerType::of::<T>())
    }

    pub fn is_type(&self) -> bool {
        matches!(self, Listener::Type(_))
    }

    pub fn as_instance(&self) -> Option<&L> {
        match self {
            Listener::Instance(listener) => Some(&**listener),
            Listener::Type(_) => None,
        }
    }

    /// Short type name of the target
    pub fn type_name(&self) -> &'static str {
        match self {
            Listener::Instance(listener) => short_type_name(std::any::type_name_of_val(&**listener)),
            Listener::Type(ty) => ty.name(),
        }
    }
}

impl<L: ?Sized> Clone for Listener<L> {
    fn clone(&self) -> Self {
        match self {
            Listener::Instance(listener) => Listener::Instance(Arc::clone(listener)),
            Listener::Type(ty) => Listener::Type(*ty),
        }
    }
}

impl<L: ?Sized> fmt::Debug for Listener<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Listener::Instance(_) => write!(f, "{}()", self.type_name()),
            Listener::Type(ty) => write!(f, "{}.type", ty.name()),
        }
    }
}

/// A candidate handler handed over by the discovery collaborator
///
/// `id` names the callable and must be unique per callable, for example
/// `"ChatListener::on_chat"`. Registering the same id twice for one event
/// type keeps only the first descriptor.
pub struct HandlerBinding<L: ?Sized> {
    id: &'static str,
    event_type: EventType,
    priority: Priority,
    call_always: bool,
    callable: Callable<L>,
}

impl<L: ?Sized + Send + Sync + 'static> HandlerBinding<L> {
    /// Receiver-less handler for events of type `E`
    pub fn function<E, F>(id: &'static str, handler: F) -> Self
    where
        E: Event,
        F: Fn(&mut E) -> HandlerResult + Send + Sync + 'static,
    {
        let callable: Arc<FunctionFn> = Arc::new(move |event: &mut dyn Event| {
            let received = event.name();
            match event.as_any_mut().downcast_mut::<E>() {
                Some(event) => handler(event),
                None => Err(type_mismatch::<E>(id, received)),
            }
        });
        Self::erased(id, EventType::of::<E>(), Callable::Function(callable))
    }

    /// Handler invoked with the listener instance for events of type `E`
    pub fn method<E, F>(id: &'static str, handler: F) -> Self
    where
        E: Event,
        F: Fn(&L, &mut E) -> HandlerResult + Send + Sync + 'static,
    {
        let callable: Arc<MethodFn<L>> = Arc::new(move |listener: &L, event: &mut dyn Event| {
            let received = event.name();
            match event.as_any_mut().downcast_mut::<E>() {
                Some(event) => handler(listener, event),
                None => Err(type_mismatch::<E>(id, received)),
            }
        });
        Self::erased(id, EventType::of::<E>(), Callable::Method(callable))
    }
}

impl<L: ?Sized> HandlerBinding<L> {
    /// Binding over an already type-erased callable
    pub fn erased(id: &'static str, event_type: EventType, callable: Callable<L>) -> Self {
        Self {
            id,
            event_type,
            priority: Priority::default(),
            call_always: false,
            callable,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Invoke regardless of the call policy
    pub fn call_always(mut self) -> Self {
        self.call_always = true;
        self
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn is_call_always(&self) -> bool {
        self.call_always
    }

    pub fn callable(&self) -> &Callable<L> {
        &self.callable
    }
}

impl<L: ?Sized> fmt::Debug for HandlerBinding<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerBinding")
            .field("id", &self.id)
            .field("event_type", &self.event_type)
            .field("priority", &self.priority)
            .field("call_always", &self.call_always)
            .field("callable", &self.callable)
            .finish()
    }
}

fn type_mismatch<E: Event>(id: &'static str, received: &'static str) -> HandlerError {
    Box::new(EventSystemError::EventTypeMismatch {
        handler: id.to_string(),
        expected: EventType::of::<E>().name().to_string(),
        received: received.to_string(),
    })
}

/// One listener together with the handlers discovered on it
pub struct Registration<L: ?Sized> {
    pub target: Listener<L>,
    pub handlers: Vec<HandlerBinding<L>>,
}

impl<L: ?Sized> Registration<L> {
    pub fn new(target: Listener<L>, handlers: Vec<HandlerBinding<L>>) -> Self {
        Self { target, handlers }
    }

    pub fn instance(listener: Arc<L>, handlers: Vec<HandlerBinding<L>>) -> Self {
        Self::new(Listener::Instance(listener), handlers)
    }

    pub fn of_type<T: ?Sized + 'static>(handlers: Vec<HandlerBinding<L>>) -> Self {
        Self::new(Listener::of_type::<T>(), handlers)
    }
}

impl<L: ?Sized> fmt::Debug for Registration<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("target", &self.target)
            .field("handlers", &self.handlers)
            .finish()
    }
}

/// A registered subscription, owned by the registry
pub struct HandlerDescriptor<L: ?Sized> {
    id: &'static str,
    event_type: EventType,
    target: Listener<L>,
    priority: Priority,
    call_always: bool,
    callable: Callable<L>,
}

impl<L: ?Sized> HandlerDescriptor<L> {
    pub(crate) fn bind(binding: HandlerBinding<L>, target: Listener<L>) -> Self {
        Self {
            id: binding.id,
            event_type: binding.event_type,
            target,
            priority: binding.priority,
            call_always: binding.call_always,
            callable: binding.callable,
        }
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn listener(&self) -> &Listener<L> {
        &self.target
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn is_call_always(&self) -> bool {
        self.call_always
    }

    pub fn requires_instance(&self) -> bool {
        self.callable.requires_instance()
    }

    /// Run the handler body. Panics are not caught here.
    pub fn invoke(&self, event: &mut dyn Event) -> HandlerResult {
        match (&self.callable, &self.target) {
            (Callable::Function(f), _) => f(event),
            (Callable::Method(f), Listener::Instance(listener)) => f(&**listener, event),
            (Callable::Method(_), Listener::Type(ty)) => Err(Box::new(EventSystemError::InstanceRequired {
                handler: self.id.to_string(),
                listener: ty.name().to_string(),
            })),
        }
    }
}

impl<L: ?Sized> fmt::Debug for HandlerDescriptor<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("id", &self.id)
            .field("event_type", &self.event_type)
            .field("target", &self.target)
            .field("priority", &self.priority)
            .field("call_always", &self.call_always)
            .finish_non_exhaustive()
    }
}
