//! Signing key pool, generation and rotation

mod generator;
mod lifecycle;
mod rotation_store;


pub use generator::{EcdsaKeyGenerator, KeyGenerator};
pub use lifecycle::{KeyLifecycleService, RotationOutcome, ROTATION_TASK_NAME};
pub use rotation_store::{KeyPoolSnapshot, KeyRotationStore};
