//! Engine-owned publish/subscribe hooks.
//!
//! Listeners run synchronously in registration order. The first listener
//! that fails stops the remaining ones and its error reaches the emitter.

use crate::error::{Error, Result};
use crate::resource::{DocSource, Document};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::{fmt, sync::Arc};

/// Named extension points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    BeforeDocParse,
    AfterDocParse,
    AfterBuild,
}

impl EventKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::BeforeDocParse => "beforeDocParse",
            Self::AfterDocParse => "afterDocParse",
            Self::AfterBuild => "afterBuild",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Payload handed to listeners.
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// Raw input of a document about to be parsed.
    BeforeDocParse { url: &'a str, source: &'a DocSource },
    /// A fully constructed document.
    AfterDocParse(&'a Document),
    AfterBuild,
}

impl Event<'_> {
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::BeforeDocParse { .. } => EventKind::BeforeDocParse,
            Self::AfterDocParse(_) => EventKind::AfterDocParse,
            Self::AfterBuild => EventKind::AfterBuild,
        }
    }
}

pub type Listener = Arc<dyn Fn(&Event<'_>) -> anyhow::Result<()> + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    listeners: RwLock<FxHashMap<EventKind, Vec<Listener>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(&Event<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .entry(kind)
            .or_default()
            .push(Arc::new(listener));
    }

    /// Invoke every listener of `event.kind()` in registration order.
    pub fn emit(&self, event: &Event<'_>) -> Result<()> {
        let kind = event.kind();
        // Snapshot so listeners may register further listeners.
        let listeners = self.listeners.read().get(&kind).cloned().unwrap_or_default();
        for listener in &listeners {
            listener(event).map_err(|err| Error::Listener(kind, err))?;
        }
        Ok(())
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.read().get(&kind).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read();
        f.debug_map()
            .entries(listeners.iter().map(|(kind, list)| (kind, list.len())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_emit_in_registration_order() {
        let bus = EventBus::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for id in 0..3 {
            let calls = calls.clone();
            bus.on(EventKind::AfterBuild, move |_| {
                calls.lock().push(id);
                Ok(())
            });
        }

        bus.emit(&Event::AfterBuild).unwrap();
        assert_eq!(*calls.lock(), vec![0, 1, 2]);
        assert_eq!(bus.listener_count(EventKind::AfterBuild), 3);
    }

    #[test]
    fn test_emit_only_matching_kind() {
        let bus = EventBus::new();
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        bus.on(EventKind::BeforeDocParse, move |_| {
            *counter.lock() += 1;
            Ok(())
        });

        bus.emit(&Event::AfterBuild).unwrap();
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_failing_listener_stops_the_rest() {
        let bus = EventBus::new();
        let reached = Arc::new(Mutex::new(false));

        bus.on(EventKind::AfterBuild, |_| anyhow::bail!("deploy hook failed"));
        let flag = reached.clone();
        bus.on(EventKind::AfterBuild, move |_| {
            *flag.lock() = true;
            Ok(())
        });

        let err = bus.emit(&Event::AfterBuild).unwrap_err();
        assert!(matches!(err, Error::Listener(EventKind::AfterBuild, _)));
        assert!(!*reached.lock());
    }

    #[test]
    fn test_listener_can_register_listener() {
        let bus = Arc::new(EventBus::new());
        let inner = bus.clone();
        bus.on(EventKind::AfterBuild, move |_| {
            inner.on(EventKind::AfterBuild, |_| Ok(()));
            Ok(())
        });

        bus.emit(&Event::AfterBuild).unwrap();
        assert_eq!(bus.listener_count(EventKind::AfterBuild), 2);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(EventKind::BeforeDocParse.to_string(), "beforeDocParse");
        assert_eq!(EventKind::AfterDocParse.to_string(), "afterDocParse");
        assert_eq!(Event::AfterBuild.kind(), EventKind::AfterBuild);
    }
}
