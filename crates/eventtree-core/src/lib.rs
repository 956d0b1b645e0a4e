//! # eventtree-core
//!
//! In-process publish/subscribe dispatcher. Listeners register handlers for
//! concrete event types; [`EventManager`] delivers each published event to
//! them in priority order, honouring cancellation, interruption and
//! asynchronous delivery.
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod manager;
pub mod registry;

pub use config::{ConfigFormat, DispatchConfig, ExecutorKind};
pub use dispatch::{AsyncExecutor, CallAll, CallPolicy, DeliveryStatus, Dispatcher};
pub use error::{Error, Result};
pub use event::{Capabilities, Event, EventState, EventSystemError, EventType};
pub use manager::{BoxedEvent, Delivery, EventManager, EventManagerBuilder};
pub use registry::{
    HandlerBinding, HandlerResult, Listener, ListenerRegistry, Priority, Registration,
    RegistrationReport, RegistrySnapshot, SharedRegistry,
};
