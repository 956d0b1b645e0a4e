//! # Eventtree Event System Errors
//!
//! Defines error types specific to registration and dispatch.
//!
//! [`EventSystemError`] covers the conditions surfaced to callers (illegal
//! event configuration, a poisoned registry) as well as the
//! ones that are only logged: rejected handler candidates and failures raised
//! inside handler bodies.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventSystemError {
    #[error("Illegal event configuration: {reason}")]
    IllegalConfiguration { reason: String },

    #[error("Handler '{handler}' does not declare an event subtype (declared '{declared}')")]
    NotAnEventType {
        handler: String,
        declared: String,
    },

    /// A method handler was registered against a bare listener type.
    #[error("Handler '{handler}' needs a listener instance but '{listener}' was registered as a type")]
    InstanceRequired {
        handler: String,
        listener: String,
    },

    #[error("Handler '{handler}' expects '{expected}' but received '{received}'")]
    EventTypeMismatch {
        handler: String,
        expected: String,
        received: String,
    },

    #[error("Handler '{handler}' failed on event '{event_name}': {reason}")]
    HandlerFailed {
        handler: String,
        event_name: String,
        reason: String,
    },

    #[error("Attempted to operate on a poisoned registry component: {component}")]
    RegistryPoisoned {
        component: String, // e.g., "register", "sort"
    },
}
