//! # Eventtree Errors
//!
//! Crate-level [`Error`] wrapping the typed errors of each subsystem, and the
//! matching [`Result`] alias used by the public manager API.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::ConfigError;
use crate::event::EventSystemError;

#[derive(Debug, ThisError)]
pub enum Error {
    /// Registration or dispatch error
    #[error("Event system error: {0}")]
    EventSystem(#[from] EventSystemError),

    /// Dispatch configuration could not be loaded or written
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;
