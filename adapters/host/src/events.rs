use detangler_shared::{Identity, PartitionKey, Tick, TickPhase};

/// Lifecycle notifications a host delivers to its listeners
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent<E> {
    /// An object joined a partition of the world
    ObjectCreated {
        entity: E,
        partition: PartitionKey,
        tick: Tick,
    },
    /// An object is about to die. Cancelling hides the death from every
    /// later listener.
    ObjectDied { entity: E },
    /// A player got a fresh session object, after death or otherwise
    OwnerReassigned { owner: Identity, was_death: bool },
    /// A player logged out
    OwnerSessionEnded { owner: Identity },
    /// A player's revival context ended without a respawn
    RevivalEnded { owner: Identity },
    Tick { tick: Tick, phase: TickPhase },
    /// The host finished starting up
    Started,
    /// The host is stopping
    Shutdown,
}

impl<E> HostEvent<E> {
    pub fn kind(&self) -> HostEventKind {
        match self {
            HostEvent::ObjectCreated { .. } => HostEventKind::ObjectCreated,
            HostEvent::ObjectDied { .. } => HostEventKind::ObjectDied,
            HostEvent::OwnerReassigned { .. } => HostEventKind::OwnerReassigned,
            HostEvent::OwnerSessionEnded { .. } => HostEventKind::OwnerSessionEnded,
            HostEvent::RevivalEnded { .. } => HostEventKind::RevivalEnded,
            HostEvent::Tick { .. } => HostEventKind::Tick,
            HostEvent::Started => HostEventKind::Started,
            HostEvent::Shutdown => HostEventKind::Shutdown,
        }
    }
}

/// Discriminant of a [`HostEvent`], used to subscribe listeners
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostEventKind {
    ObjectCreated,
    ObjectDied,
    OwnerReassigned,
    OwnerSessionEnded,
    RevivalEnded,
    Tick,
    Started,
    Shutdown,
}

impl HostEventKind {
    pub const ALL: [HostEventKind; 8] = [
        HostEventKind::ObjectCreated,
        HostEventKind::ObjectDied,
        HostEventKind::OwnerReassigned,
        HostEventKind::OwnerSessionEnded,
        HostEventKind::RevivalEnded,
        HostEventKind::Tick,
        HostEventKind::Started,
        HostEventKind::Shutdown,
    ];
}
