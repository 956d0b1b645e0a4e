use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use eventtree_core::{
    Capabilities, Event, EventState, EventType, HandlerBinding, HandlerResult, Listener, Priority,
};
use log::info;

/// Something a player did
#[derive(Debug)]
pub struct PlayerEvent {
    state: EventState,
    player: String,
}

impl PlayerEvent {
    pub fn player(&self) -> &str {
        &self.player
    }
}

impl Event for PlayerEvent {
    fn name(&self) -> &'static str {
        "PlayerEvent"
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

/// A player wrote a chat message. Cancelable and interruptible.
#[derive(Debug)]
pub struct PlayerChatEvent {
    player: PlayerEvent,
    message: String,
}

impl PlayerChatEvent {
    pub fn new(sender: impl Into<String>, message: impl Into<String>) -> Self {
        let state = EventState::new(Capabilities::ALL)
            .with_info("Published whenever a player writes to the chat");
        Self {
            player: PlayerEvent {
                state,
                player: sender.into(),
            },
            message: message.into(),
        }
    }

    pub fn sender(&self) -> &str {
        self.player.player()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }
}

impl Event for PlayerChatEvent {
    fn name(&self) -> &'static str {
        "PlayerChatEvent"
    }

    fn state(&self) -> &EventState {
        &self.player.state
    }

    fn state_mut(&mut self) -> &mut EventState {
        &mut self.player.state
    }

    fn supertypes(&self) -> Vec<EventType> {
        vec![EventType::of::<PlayerEvent>()]
    }

    fn upcast_mut(&mut self, ancestor: EventType) -> Option<&mut dyn Event> {
        if ancestor == EventType::of::<PlayerEvent>() {
            Some(&mut self.player)
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

/// Sample listener: rewrites, filters and counts chat messages
#[derive(Debug)]
pub struct ChatListener {
    enabled: AtomicBool,
    seen: AtomicUsize,
}

impl ChatListener {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            seen: AtomicUsize::new(0),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Messages counted so far
    pub fn seen(&self) -> usize {
        self.seen.load(Ordering::Relaxed)
    }

    pub fn handlers() -> Vec<HandlerBinding<ChatListener>> {
        vec![
            HandlerBinding::function("ChatListener::on_chat", on_chat),
            HandlerBinding::function("ChatListener::audit", audit)
                .with_priority(Priority::High)
                .call_always(),
            HandlerBinding::method("ChatListener::count", ChatListener::count).with_priority(Priority::Low),
            HandlerBinding::function("ChatListener::on_player", on_player).with_priority(Priority::Lowest),
        ]
    }

    fn count(&self, _event: &mut PlayerChatEvent) -> HandlerResult {
        self.seen.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

fn on_chat(event: &mut PlayerChatEvent) -> HandlerResult {
    let message = event.message();
    if message.contains("windows") && message.contains("bad") {
        let rewritten = message.replace("bad", "good");
        event.set_message(rewritten);
    }
    if event.message().to_lowercase().contains("apple") {
        event.set_canceled(true);
    }
    Ok(())
}

fn audit(event: &mut PlayerChatEvent) -> HandlerResult {
    info!("{} wrote {} characters", event.sender(), event.message().chars().count());
    Ok(())
}

// Only reached when super listeners are enabled
fn on_player(event: &mut PlayerEvent) -> HandlerResult {
    println!("[activity] {}", event.player());
    Ok(())
}

/// Disabled listener instances only receive their call-always handlers
pub fn listener_enabled(listener: &Listener<ChatListener>, _event: &dyn Event) -> bool {
    listener.as_instance().map_or(true, ChatListener::is_enabled)
}
