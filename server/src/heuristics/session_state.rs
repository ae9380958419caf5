use std::collections::HashSet;

use detangler_shared::{Identity, WorldRefType};

/// Point-in-time copy of the host's active session list, captured once per
/// sweep or check so every candidate is judged against the same view
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    active: HashSet<Identity>,
}

impl SessionState {
    pub fn new(active: HashSet<Identity>) -> Self {
        Self { active }
    }

    pub fn capture<E, W: WorldRefType<E>>(world: &W) -> Self {
        Self::new(world.active_session_ids())
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.active.contains(identity)
    }
}
