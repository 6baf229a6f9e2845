// Funpage core types
//
// DB-agnostic domain types shared by the HTTP layer and storage:
// - Role and Identity describe who is acting
// - News, Tag and Comment are the content entities
// - The ownership policy decides who may mutate content
// - Telemetry wires up structured logging

pub mod identity;
pub mod news;
pub mod ownership;
pub mod role;
pub mod telemetry;

pub use identity::Identity;
pub use news::{Comment, News, Tag};
pub use ownership::{assert_owner, ensure_owner, Owned, OwnershipError};
pub use role::{Role, UnknownRole};
