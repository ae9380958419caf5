//! # Detangler Host
//! Thin adapter that registers the detangler's notification handlers against
//! a host simulation's event dispatch at startup.

mod dispatch;
mod events;
mod plugin;

pub use dispatch::{EventBus, EventDispatch, EventResponse, Listener};
pub use events::{HostEvent, HostEventKind};
pub use plugin::Plugin;
