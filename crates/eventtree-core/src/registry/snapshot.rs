use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::event::EventType;
use crate::registry::{HandlerDescriptor, Priority};

/// Printable view of one descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorSummary {
    pub id: &'static str,
    pub priority: Priority,
    pub call_always: bool,
    /// Method handler (needs the listener instance)
    pub method: bool,
    /// `Name()` for instances, `Name.type` for bare types
    pub target: String,
}

impl fmt::Display for DescriptorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.call_always {
            f.write_str("call_always ")?;
        }
        let kind = if self.method { "method" } else { "fn" };
        write!(f, "{} {} ({}): {}", kind, self.id, self.priority, self.target)
    }
}

/// Read-only copy of the registry contents, event types ordered by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    entries: Vec<(&'static str, Vec<DescriptorSummary>)>,
}

impl RegistrySnapshot {
    pub(crate) fn capture<L: ?Sized>(
        handlers: &HashMap<EventType, Vec<Arc<HandlerDescriptor<L>>>>,
    ) -> Self {
        let mut entries: Vec<_> = handlers
            .iter()
            .map(|(event_type, list)| {
                let summaries = list
                    .iter()
                    .map(|d| DescriptorSummary {
                        id: d.id(),
                        priority: d.priority(),
                        call_always: d.is_call_always(),
                        method: d.requires_instance(),
                        target: format!("{:?}", d.listener()),
                    })
                    .collect();
                (event_type.name(), summaries)
            })
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        Self { entries }
    }

    pub fn entries(&self) -> &[(&'static str, Vec<DescriptorSummary>)] {
        &self.entries
    }

    /// Descriptors registered for the event type with this short name
    pub fn handlers_for(&self, event_name: &str) -> Option<&[DescriptorSummary]> {
        self.entries
            .iter()
            .find(|(name, _)| *name == event_name)
            .map(|(_, list)| list.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for RegistrySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const TAB: &str = "    ";
        writeln!(f, "EventTree: {{")?;
        for (idx, (name, list)) in self.entries.iter().enumerate() {
            writeln!(f, "{TAB}{name}: {{")?;
            for (pos, summary) in list.iter().enumerate() {
                writeln!(f, "{TAB}{TAB}{summary}")?;
                if pos + 1 < list.len() {
                    writeln!(f)?;
                }
            }
            if idx + 1 < self.entries.len() {
                writeln!(f, "{TAB}}},")?;
            } else {
                writeln!(f, "{TAB}}}")?;
            }
        }
        write!(f, "}}")
    }
}
