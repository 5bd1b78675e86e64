use chrono::Utc;

use super::{TokenGenerator, parse_token};
use crate::store::Store;
use crate::types::{Token, User};

#[derive(Debug)]
pub enum TokenValidationError {
    InvalidScheme,
    InvalidToken,
    TokenExpired,
    InternalError,
}

pub struct ValidatedToken {
    pub token: Token,
    pub user: User,
}

/// Validates a raw token string against the store.
/// Returns the validated token and the user it belongs to.
pub fn validate_token(
    store: &dyn Store,
    raw_token: &str,
) -> Result<ValidatedToken, TokenValidationError> {
    let (lookup, _secret) = parse_token(raw_token).map_err(|_| TokenValidationError::InvalidToken)?;

    let token = store
        .get_token_by_lookup(&lookup)
        .map_err(|_| TokenValidationError::InternalError)?
        .ok_or(TokenValidationError::InvalidToken)?;

    let generator = TokenGenerator::new();
    if !generator
        .verify(raw_token, &token.token_hash)
        .map_err(|_| TokenValidationError::InternalError)?
    {
        return Err(TokenValidationError::InvalidToken);
    }

    if let Some(expires_at) = &token.expires_at {
        if expires_at < &Utc::now() {
            return Err(TokenValidationError::TokenExpired);
        }
    }

    let user = store
        .get_user(token.user_id)
        .map_err(|_| TokenValidationError::InternalError)?
        .ok_or(TokenValidationError::InvalidToken)?;

    if let Err(e) = store.update_token_last_used(&token.id) {
        tracing::warn!("Failed to update token last_used_at: {e}");
    }

    Ok(ValidatedToken { token, user })
}

/// Extracts a bearer token from the Authorization header.
/// Returns None if no auth header is present.
/// Returns Err if the auth scheme is unsupported.
pub fn extract_token_from_header(
    auth_header: Option<&str>,
) -> Result<Option<String>, TokenValidationError> {
    match auth_header {
        Some(header) => header
            .strip_prefix("Bearer ")
            .map(|t| Some(t.trim().to_string()))
            .ok_or(TokenValidationError::InvalidScheme),
        None => Ok(None),
    }
}
