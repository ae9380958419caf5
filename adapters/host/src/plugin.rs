use std::{fmt::Debug, hash::Hash, sync::Arc};

use log::info;

use detangler_server::{DeathDisposition, Detangler, DetanglerConfig};
use detangler_shared::WorldMutType;

use crate::{
    dispatch::{EventDispatch, EventResponse},
    events::{HostEvent, HostEventKind},
};

/// Wires a shared [`Detangler`] into a host's event dispatch
pub struct Plugin<E: Copy + Eq + Hash + Send + Sync + Debug> {
    detangler: Arc<Detangler<E>>,
}

impl<E: Copy + Eq + Hash + Send + Sync + Debug + 'static> Plugin<E> {
    pub fn new(config: DetanglerConfig) -> Self {
        Self::from_shared(Arc::new(Detangler::new(config)))
    }

    pub fn from_shared(detangler: Arc<Detangler<E>>) -> Self {
        Self { detangler }
    }

    pub fn detangler(&self) -> &Arc<Detangler<E>> {
        &self.detangler
    }

    /// Registers one listener per event kind
    pub fn build<W, D>(&self, dispatch: &mut D)
    where
        W: WorldMutType<E> + 'static,
        D: EventDispatch<E, W>,
    {
        for kind in HostEventKind::ALL {
            let detangler = self.detangler.clone();
            dispatch.add_listener(
                kind,
                Box::new(move |world: &mut W, event: &HostEvent<E>| {
                    handle_event(&detangler, world, event)
                }),
            );
        }

        if self.detangler.config().enable_log_notifications {
            info!("Detangler listeners registered");
        }
    }
}

fn handle_event<E, W>(detangler: &Detangler<E>, world: &mut W, event: &HostEvent<E>) -> EventResponse
where
    E: Copy + Eq + Hash + Send + Sync + Debug,
    W: WorldMutType<E>,
{
    match event {
        HostEvent::ObjectCreated {
            entity,
            partition,
            tick,
        } => {
            detangler.on_object_created(world, entity, partition, *tick);
        }
        HostEvent::ObjectDied { entity } => {
            if detangler.on_object_died(&*world, entity) == DeathDisposition::Suppress {
                return EventResponse::Cancel;
            }
        }
        HostEvent::OwnerReassigned { owner, was_death } => {
            detangler.on_owner_reassigned(world, owner, *was_death);
        }
        HostEvent::OwnerSessionEnded { owner } => {
            detangler.on_owner_session_ended(world, owner);
        }
        HostEvent::RevivalEnded { owner } => {
            detangler.on_revival_ended(owner);
        }
        HostEvent::Tick { tick, phase } => {
            detangler.on_tick(world, *tick, *phase);
        }
        HostEvent::Started => {
            detangler.start(world);
        }
        HostEvent::Shutdown => {
            detangler.on_shutdown();
        }
    }

    EventResponse::Continue
}
