// Identity bound to an authenticated request
//
// Produced by token verification and never persisted on its own.

use serde::{Deserialize, Serialize};

use crate::role::Role;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Authenticated identity: subject id, username and role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Identity {
    /// Subject (user ID).
    pub id: String,
    /// Account username. Compared against resource authors.
    pub username: String,
    /// Account role.
    #[serde(rename = "userType")]
    pub role: Role,
}

impl Identity {
    pub fn new(id: impl Into<String>, username: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            role,
        }
    }
}
