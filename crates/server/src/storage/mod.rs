// Storage layer
// Decision: Support both PostgreSQL (production) and in-memory (dev mode)

pub mod backend;
pub mod memory;
pub mod models;
pub mod password;
pub mod repositories;

pub use backend::StorageBackend;
pub use memory::InMemoryDatabase;
pub use models::*;
pub use repositories::Database;

/// A write collided with an existing unique key (username, tag name on an article).
///
/// Backends return it inside `anyhow::Error`; the service layer downcasts it
/// into a conflict so racing writers see the same answer as a pre-check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct DuplicateKey(pub String);

pub(crate) fn duplicate_username() -> DuplicateKey {
    DuplicateKey("Username already taken".to_string())
}

pub(crate) fn duplicate_tag(name: &str) -> DuplicateKey {
    DuplicateKey(format!("Tag '{}' already exists on this news", name))
}
