mod helpers;
mod middleware;
mod token;

pub use helpers::{TokenValidationError, ValidatedToken, validate_token};
pub use middleware::{AuthError, RequireAdmin, RequireAuth};
pub use token::{TokenGenerator, parse_token};
