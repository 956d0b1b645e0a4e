#![cfg(test)]

use std::any::Any;
use std::sync::Arc;

use crate::config::DispatchConfig;
use crate::event::{Event, EventState, EventType};
use crate::manager::{Delivery, EventManager};
use crate::registry::{HandlerBinding, Priority, Registration};
use crate::tests::common::{
    BaseEvent, ChatEvent, TestListener, calls, enabled_policy, record, record_fn, recorded,
};

// Third level: SystemChatEvent -> ChatEvent -> BaseEvent
#[derive(Debug)]
struct SystemChatEvent {
    chat: ChatEvent,
}

impl SystemChatEvent {
    fn new(message: &str) -> Self {
        Self {
            chat: ChatEvent::new("server", message),
        }
    }
}

impl Event for SystemChatEvent {
    fn name(&self) -> &'static str {
        "SystemChatEvent"
    }

    fn state(&self) -> &EventState {
        self.chat.state()
    }

    fn state_mut(&mut self) -> &mut EventState {
        self.chat.state_mut()
    }

    fn supertypes(&self) -> Vec<EventType> {
        let mut supertypes = vec![EventType::of::<ChatEvent>()];
        supertypes.extend(self.chat.supertypes());
        supertypes
    }

    fn upcast_mut(&mut self, ancestor: EventType) -> Option<&mut dyn Event> {
        if ancestor == EventType::of::<ChatEvent>() {
            Some(&mut self.chat)
        } else {
            self.chat.upcast_mut(ancestor)
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn super_manager() -> EventManager<TestListener> {
    let config = DispatchConfig {
        allow_super_listeners: true,
        ..DispatchConfig::default()
    };
    EventManager::from_config(&config, enabled_policy)
}

#[test]
fn test_chat_handlers_before_base_handlers() {
    let calls = calls();
    let manager = super_manager();
    manager
        .register_events(vec![
            Registration::instance(
                TestListener::enabled(),
                vec![record::<BaseEvent>("H3", &calls).with_priority(Priority::Highest)],
            ),
            Registration::instance(
                TestListener::enabled(),
                vec![
                    record::<ChatEvent>("H1", &calls).with_priority(Priority::High),
                    record::<ChatEvent>("H2", &calls).with_priority(Priority::Low),
                ],
            ),
        ])
        .expect("register");
    manager.sort_events().expect("sort");

    manager.call(ChatEvent::new("alice", "hi"));
    assert_eq!(recorded(&calls), vec!["H1", "H2", "H3"]);
}

#[test]
fn test_three_level_hierarchy_nearest_first() {
    let calls = calls();
    let manager = super_manager();
    manager
        .register_event(Registration::of_type::<TestListener>(vec![
            record_fn::<BaseEvent>("base", &calls),
            record_fn::<ChatEvent>("chat", &calls),
            record_fn::<SystemChatEvent>("system", &calls),
        ]))
        .expect("register");

    manager.call(SystemChatEvent::new("restarting"));
    assert_eq!(recorded(&calls), vec!["system", "chat", "base"]);
}

#[test]
fn test_ancestor_handler_sees_child_payload() {
    let manager = super_manager();
    manager
        .register_event(Registration::of_type::<TestListener>(vec![HandlerBinding::function(
            "mute_server",
            |event: &mut ChatEvent| {
                if event.sender == "server" {
                    event.set_canceled(true);
                }
                Ok(())
            },
        )]))
        .expect("register");

    let system = manager
        .call(SystemChatEvent::new("restarting"))
        .into_event()
        .expect("synchronous");
    assert!(system.is_canceled());
}

#[test]
fn test_interrupt_at_ancestor_level() {
    let calls = calls();
    let trace = Arc::clone(&calls);
    let manager = super_manager();
    manager
        .register_event(Registration::of_type::<TestListener>(vec![
            record_fn::<SystemChatEvent>("system", &calls),
            HandlerBinding::function("chat_stop", move |event: &mut ChatEvent| {
                trace.lock().unwrap().push("chat_stop");
                event.interrupt();
                Ok(())
            })
            .with_priority(Priority::High),
            record_fn::<ChatEvent>("chat_after", &calls).call_always(),
            record_fn::<BaseEvent>("base", &calls).call_always(),
        ]))
        .expect("register");
    manager.sort_events().expect("sort");

    let delivery = manager.call(SystemChatEvent::new("restarting"));
    assert!(matches!(delivery, Delivery::Interrupted(_)));
    assert_eq!(recorded(&calls), vec!["system", "chat_stop"]);
}

#[test]
fn test_disabling_super_listeners_at_runtime() {
    let calls = calls();
    let manager = super_manager();
    manager
        .register_event(Registration::of_type::<TestListener>(vec![
            record_fn::<BaseEvent>("base", &calls),
            record_fn::<ChatEvent>("chat", &calls),
        ]))
        .expect("register");

    manager.set_allow_super_listeners(false);
    manager.call(ChatEvent::new("alice", "hi"));
    assert_eq!(recorded(&calls), vec!["chat"]);
}
