use std::any::Any;
use std::sync::{Arc, Mutex};

use crate::event::{Capabilities, Event, EventState, EventType};
use crate::registry::{HandlerBinding, Listener};

// ===== TEST EVENTS =====

/// Root of a small hierarchy; owns the shared state
#[derive(Debug, Clone)]
pub struct BaseEvent {
    state: EventState,
    pub origin: String,
}

impl BaseEvent {
    pub fn new(capabilities: Capabilities, origin: &str) -> Self {
        Self {
            state: EventState::new(capabilities),
            origin: origin.to_string(),
        }
    }
}

impl Event for BaseEvent {
    fn name(&self) -> &'static str {
        "BaseEvent"
    }

    fn state(&self) -> &EventState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EventState {
        &mut self.state
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Chat message extending `BaseEvent`; cancelable and interruptible
#[derive(Debug, Clone)]
pub struct ChatEvent {
    base: BaseEvent,
    pub sender: String,
    pub message: String,
}

impl ChatEvent {
    pub fn new(sender: &str, message: &str) -> Self {
        Self {
            base: BaseEvent::new(Capabilities::ALL, "chat"),
            sender: sender.to_string(),
            message: message.to_string(),
        }
    }
}

impl Event for ChatEvent {
    fn name(&self) -> &'static str {
        "ChatEvent"
    }

    fn state(&self) -> &EventState {
        &self.base.state
    }

    fn state_mut(&mut self) -> &mut EventState {
        &mut self.base.state
    }

    fn supertypes(&self) -> Vec<EventType> {
        vec![EventType::of::<BaseEvent>()]
    }

    fn upcast_mut(&mut self, ancestor: EventType) -> Option<&mut dyn Event> {
        if ancestor == EventType::of::<BaseEvent>() {
            Some(&mut self.base)
        } else {
            None
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Event without any capability
#[derive(Debug, Clone, Default)]
pub struct PlainEvent {
    state: EventState,
}

impl Event for PlainEvent {
    fn name(&self) -> &'static str {
        "PlainEvent"
    }

    fn state(&self) -> &EventState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EventState {
        &mut self.state
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Asynchronous, interruptible notification
#[derive(Debug, Clone)]
pub struct NoticeEvent {
    state: EventState,
    pub text: String,
}

impl NoticeEvent {
    pub fn asynchronous(text: &str) -> Self {
        Self {
            state: EventState::asynchronous(Capabilities::INTERRUPTIBLE)
                .expect("interruptible events may be asynchronous"),
            text: text.to_string(),
        }
    }

    pub fn synchronous(text: &str) -> Self {
        Self {
            state: EventState::new(Capabilities::INTERRUPTIBLE),
            text: text.to_string(),
        }
    }
}

impl Event for NoticeEvent {
    fn name(&self) -> &'static str {
        "NoticeEvent"
    }

    fn state(&self) -> &EventState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut EventState {
        &mut self.state
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ===== TEST LISTENERS =====

/// Listener whose `enabled` flag drives the test call policy
#[derive(Debug)]
pub struct TestListener {
    pub enabled: bool,
}

impl TestListener {
    pub fn enabled() -> Arc<Self> {
        Arc::new(Self { enabled: true })
    }

    pub fn disabled() -> Arc<Self> {
        Arc::new(Self { enabled: false })
    }
}

/// Call policy honouring `TestListener::enabled`; bare types are always called
pub fn enabled_policy(listener: &Listener<TestListener>, _event: &dyn Event) -> bool {
    listener.as_instance().map(|l| l.enabled).unwrap_or(true)
}

/// Call policy rejecting every listener
pub fn deny_all(_listener: &Listener<TestListener>, _event: &dyn Event) -> bool {
    false
}

// ===== CALL RECORDING =====

pub type Calls = Arc<Mutex<Vec<&'static str>>>;

pub fn calls() -> Calls {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn recorded(calls: &Calls) -> Vec<&'static str> {
    calls.lock().unwrap().clone()
}

/// Method handler for `E` that records its id
pub fn record<E: Event>(id: &'static str, calls: &Calls) -> HandlerBinding<TestListener> {
    let calls = Arc::clone(calls);
    HandlerBinding::method(id, move |_listener: &TestListener, _event: &mut E| {
        calls.lock().unwrap().push(id);
        Ok(())
    })
}

/// Receiver-less handler for `E` that records its id
pub fn record_fn<E: Event>(id: &'static str, calls: &Calls) -> HandlerBinding<TestListener> {
    let calls = Arc::clone(calls);
    HandlerBinding::function(id, move |_event: &mut E| {
        calls.lock().unwrap().push(id);
        Ok(())
    })
}
