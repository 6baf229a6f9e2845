// Authentication: credentials, session tokens, the request gate and
// verification codes

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod routes;
pub mod verification;

pub use config::AuthConfig;
pub use jwt::{TokenError, TokenService};
pub use middleware::{require_auth, AuthState, AuthUser};
pub use routes::routes;
