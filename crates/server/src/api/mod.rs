// Public API: route handlers and their DTOs

pub mod comments;
pub mod common;
pub mod news;
pub mod tags;
pub mod validation;

pub use common::{ApiError, ApiResponse, ErrorResponse};
