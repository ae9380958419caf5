
pub use fixtures::{player_id, quiet_config, run_ticks, started, NETHER, OVERWORLD};
pub use object_builder::{TestObjectBuilder, PLAYER_KIND, ZOMBIE_KIND};
