mod clone_registry;

pub use clone_registry::{CloneRegistry, TrackedClone};
