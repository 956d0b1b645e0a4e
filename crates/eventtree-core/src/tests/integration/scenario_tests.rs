#![cfg(test)]

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::event::{Event, EventType};
use crate::manager::{Delivery, EventManager};
use crate::registry::{HandlerBinding, Listener, ListenerRegistry, Priority, Registration};
use crate::tests::common::{
    ChatEvent, NoticeEvent, PlainEvent, TestListener, calls, deny_all, enabled_policy, record,
    record_fn, recorded,
};

#[test]
fn test_gated_listener_only_runs_call_always() {
    let calls = calls();
    let manager: EventManager<TestListener> = EventManager::new(deny_all);
    manager
        .register_event(Registration::instance(
            TestListener::enabled(),
            vec![
                record::<ChatEvent>("H1", &calls).with_priority(Priority::Highest),
                record::<ChatEvent>("H2", &calls).call_always(),
            ],
        ))
        .expect("register");
    manager.sort_events().expect("sort");

    let delivery = manager.call(ChatEvent::new("alice", "hi"));
    assert!(matches!(delivery, Delivery::Completed(_)));
    assert_eq!(recorded(&calls), vec!["H2"]);
}

#[test]
fn test_high_before_low() {
    let calls = calls();
    let manager: EventManager<TestListener> = EventManager::new(enabled_policy);
    manager
        .register_event(Registration::instance(
            TestListener::enabled(),
            vec![
                record::<ChatEvent>("H1", &calls).with_priority(Priority::High),
                record::<ChatEvent>("H2", &calls).with_priority(Priority::Low),
            ],
        ))
        .expect("register");
    manager.sort_events().expect("sort");

    manager.call(ChatEvent::new("alice", "hi"));
    assert_eq!(recorded(&calls), vec!["H1", "H2"]);
}

#[test]
fn test_failing_handler_does_not_stop_publish() {
    let calls = calls();
    let manager: EventManager<TestListener> = EventManager::new(enabled_policy);
    manager
        .register_event(Registration::of_type::<TestListener>(vec![
            HandlerBinding::function("explodes", |event: &mut ChatEvent| {
                Err(format!("cannot handle message from {}", event.sender).into())
            }),
            record_fn::<ChatEvent>("second", &calls),
        ]))
        .expect("register");

    let chat = manager
        .call(ChatEvent::new("alice", "hi"))
        .into_event()
        .expect("synchronous delivery returns the event");
    assert!(!chat.is_canceled());
    assert_eq!(recorded(&calls), vec!["second"]);
}

#[test]
fn test_duplicate_registration_delivers_once() {
    let calls = calls();
    let listener = TestListener::enabled();
    let manager: EventManager<TestListener> = EventManager::new(enabled_policy);
    for _ in 0..2 {
        manager
            .register_event(Registration::instance(
                Arc::clone(&listener),
                vec![record::<ChatEvent>("ChatListener::on_chat", &calls)],
            ))
            .expect("register");
    }
    assert_eq!(manager.registry().len(), 1);

    manager.call(ChatEvent::new("alice", "hi"));
    assert_eq!(recorded(&calls), vec!["ChatListener::on_chat"]);
}

#[test]
fn test_interrupt_mid_list() {
    let calls = calls();
    let trace = Arc::clone(&calls);
    let manager: EventManager<TestListener> = EventManager::new(enabled_policy);
    manager
        .register_event(Registration::of_type::<TestListener>(vec![
            record_fn::<NoticeEvent>("first", &calls).with_priority(Priority::Highest),
            HandlerBinding::function("stopper", move |event: &mut NoticeEvent| {
                trace.lock().unwrap().push("stopper");
                event.interrupt();
                Ok(())
            }),
            record_fn::<NoticeEvent>("last", &calls).with_priority(Priority::Lowest),
        ]))
        .expect("register");
    manager.sort_events().expect("sort");

    let delivery = manager.call(NoticeEvent::synchronous("halt"));
    assert!(matches!(delivery, Delivery::Interrupted(_)));
    assert_eq!(recorded(&calls), vec!["first", "stopper"]);
}

#[test]
fn test_capabilityless_flags_stay_false_through_delivery() {
    let manager: EventManager<TestListener> = EventManager::new(enabled_policy);
    manager
        .register_event(Registration::of_type::<TestListener>(vec![HandlerBinding::function(
            "try_everything",
            |event: &mut PlainEvent| {
                event.set_canceled(true);
                event.interrupt();
                Ok(())
            },
        )]))
        .expect("register");

    let plain = manager.call(PlainEvent::default()).into_event().expect("synchronous");
    assert!(!plain.is_canceled());
    assert!(!plain.is_interrupted());
}

#[test]
fn test_sort_is_stable_for_random_registrations() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for round in 0..50 {
        let count = rng.gen_range(1..40);
        let mut registry: ListenerRegistry<TestListener> = ListenerRegistry::new();
        let mut expected: Vec<(Priority, usize)> = Vec::new();
        let mut bindings = Vec::new();

        for index in 0..count {
            let priority = Priority::ALL[rng.gen_range(0..Priority::ALL.len())];
            let id: &'static str = Box::leak(format!("r{round}-h{index}").into_boxed_str());
            bindings.push(HandlerBinding::function(id, |_event: &mut ChatEvent| Ok(())).with_priority(priority));
            expected.push((priority, index));
        }
        registry.register(Listener::of_type::<TestListener>(), bindings);
        registry.sort_by_priority();

        let sorted = registry.lookup(EventType::of::<ChatEvent>());
        assert_eq!(sorted.len(), count);

        // Registration index of each sorted handler, recovered from its id
        let order: Vec<(Priority, usize)> = sorted
            .iter()
            .map(|d| {
                let index = d.id().rsplit("-h").next().and_then(|n| n.parse().ok()).expect("index");
                (d.priority(), index)
            })
            .collect();

        expected.sort_by_key(|(priority, index)| (priority.rank(), *index));
        assert_eq!(order, expected, "round {} is not a stable priority sort", round);
    }
}
