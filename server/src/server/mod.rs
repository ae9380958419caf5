mod detangler;
pub use detangler::{DeathDisposition, Detangler};

mod server_config;
pub use server_config::{
    DetanglerConfig, DEFAULT_CLEAN_INTERVAL_TICKS, DEFAULT_HIGH_AGE_TICKS,
    DEFAULT_REGISTRY_CHECK_INTERVAL_TICKS,
};
