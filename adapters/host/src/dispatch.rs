use std::collections::HashMap;

use crate::events::{HostEvent, HostEventKind};

/// What a listener wants done with the event it just saw
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventResponse {
    Continue,
    /// Stop delivering the event, and have the host abandon the action it
    /// describes when it can be abandoned (a death)
    Cancel,
}

pub type Listener<E, W> = Box<dyn Fn(&mut W, &HostEvent<E>) -> EventResponse + Send + Sync>;

/// A host's event-dispatch mechanism, as seen by the adapter
pub trait EventDispatch<E, W> {
    fn add_listener(&mut self, kind: HostEventKind, listener: Listener<E, W>);
}

/// Minimal in-process dispatcher, for hosts without a bus of their own.
/// Listeners run in registration order.
pub struct EventBus<E, W> {
    listeners: HashMap<HostEventKind, Vec<Listener<E, W>>>,
}

impl<E, W> Default for EventBus<E, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, W> EventBus<E, W> {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }

    /// Delivers `event` to every listener of its kind, stopping at the first
    /// one that cancels it
    pub fn dispatch(&self, world: &mut W, event: &HostEvent<E>) -> EventResponse {
        let Some(listeners) = self.listeners.get(&event.kind()) else {
            return EventResponse::Continue;
        };
        for listener in listeners {
            if listener(world, event) == EventResponse::Cancel {
                return EventResponse::Cancel;
            }
        }
        EventResponse::Continue
    }

    pub fn listener_count(&self, kind: HostEventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }
}

impl<E, W> EventDispatch<E, W> for EventBus<E, W> {
    fn add_listener(&mut self, kind: HostEventKind, listener: Listener<E, W>) {
        self.listeners.entry(kind).or_default().push(listener);
    }
}
