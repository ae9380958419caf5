pub mod error;
pub mod world_type;
