//! Database module - repository implementations
//!
//! Only the in-memory backend exists today. It honours the same contracts
//! as a SQL backend would: soft-deleted keys stay stored, listing is cursor
//! based in descending id order.

pub mod memory;


// Re-export commonly used types
pub use memory::{InMemoryRefreshTokenRepository, InMemorySigningKeyRepository};
