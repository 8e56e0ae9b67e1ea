//! User registration, login and JWT verification.
//!
//! The pipeline core treats caller identity as opaque; this module is the
//! auth collaborator behind the gateway.

pub mod middleware;
pub mod service;

pub use middleware::jwt_auth_middleware;
pub use service::{AuthError, Claims, UserAuthService};
