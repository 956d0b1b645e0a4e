use crate::event::error::EventSystemError;

/// What an event variant allows handlers to do with it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// `set_canceled` takes effect
    pub cancelable: bool,
    /// `interrupt` takes effect
    pub interruptible: bool,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities { cancelable: false, interruptible: false };
    pub const CANCELABLE: Capabilities = Capabilities { cancelable: true, interruptible: false };
    pub const INTERRUPTIBLE: Capabilities = Capabilities { cancelable: false, interruptible: true };
    pub const ALL: Capabilities = Capabilities { cancelable: true, interruptible: true };
}

/// Mutable flags shared by every event
///
/// The capabilities are fixed when the state is created. Flags a variant does
/// not support stay `false` no matter what handlers request.
#[derive(Debug, Clone, Default)]
pub struct EventState {
    capabilities: Capabilities,
    canceled: bool,
    asynchronous: bool,
    interrupted: bool,
    info: Option<String>,
}

impl EventState {
    /// Synchronous event state with the given capabilities
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    /// Asynchronous event state. Fails for cancelable variants, since the
    /// producer could never observe the cancellation.
    pub fn asynchronous(capabilities: Capabilities) -> Result<Self, EventSystemError> {
        let mut state = Self::new(capabilities);
        state.set_asynchronous(true)?;
        Ok(state)
    }

    /// Attach a free-form description
    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = Some(info.into());
        self
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled
    }

    pub fn set_canceled(&mut self, canceled: bool) {
        if self.capabilities.cancelable {
            self.canceled = canceled;
        }
    }

    pub fn is_asynchronous(&self) -> bool {
        self.asynchronous
    }

    pub fn set_asynchronous(&mut self, asynchronous: bool) -> Result<(), EventSystemError> {
        if asynchronous && self.capabilities.cancelable {
            return Err(EventSystemError::IllegalConfiguration {
                reason: "an event cannot be both cancelable and asynchronous".to_string(),
            });
        }
        self.asynchronous = asynchronous;
        Ok(())
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    pub fn interrupt(&mut self) {
        if self.capabilities.interruptible {
            self.interrupted = true;
        }
    }

    pub fn info(&self) -> Option<&str> {
        self.info.as_deref()
    }

    pub fn set_info(&mut self, info: impl Into<String>) {
        self.info = Some(info.into());
    }
}
