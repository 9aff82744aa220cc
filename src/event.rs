//! Events and the dotted-prefix name matching rule used by transition
//! selection.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Where an event came from: `{ name, data, origin }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventOrigin {
    External,
    Internal,
    /// A `done.state.<id>` event synthesized by the step engine itself.
    Done,
}

/// Opaque event payload. The data model is out of scope, so
/// this crate never inspects it — it only carries it through the queues for
/// the host's executable-content callbacks to read back out.
#[derive(Clone)]
pub enum EventData {
    None,
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl fmt::Debug for EventData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventData::None => f.write_str("None"),
            EventData::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl PartialEq for EventData {
    fn eq(&self, other: &Self) -> bool {
        matches!((self, other), (EventData::None, EventData::None))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub name: String,
    pub data: EventData,
    pub origin: EventOrigin,
}

impl Event {
    pub fn external(name: impl Into<String>, data: EventData) -> Self {
        Self { name: name.into(), data, origin: EventOrigin::External }
    }

    pub fn internal(name: impl Into<String>, data: EventData) -> Self {
        Self { name: name.into(), data, origin: EventOrigin::Internal }
    }

    pub fn done(name: impl Into<String>) -> Self {
        Self { name: name.into(), data: EventData::None, origin: EventOrigin::Done }
    }

    /// A serializable snapshot for logging: `data` is opaque
    /// and so is dropped, mirroring `name`/`origin` only.
    pub fn snapshot(&self) -> EventSnapshot {
        EventSnapshot { name: self.name.clone(), origin: self.origin }
    }
}

/// Serde-friendly mirror of [`Event`] for logging, omitting the opaque `data`
/// payload.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventSnapshot {
    pub name: String,
    pub origin: EventOrigin,
}

/// Dotted-prefix match used by transition selection: a transition declared
/// for `pattern` matches any event whose name is exactly `pattern` or begins
/// with `pattern.`; `*` matches any event name. An absent pattern (`None`)
/// only ever matches the eventless selection pass, so it is not represented
/// here — callers skip this function entirely for eventless transitions.
pub fn event_name_matches(pattern: &str, event_name: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    event_name == pattern || event_name.starts_with(pattern) && event_name[pattern.len()..].starts_with('.')
}
