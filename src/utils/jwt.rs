// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError, models::user::Identity};

/// JWT Claims structure issued by the intranet session service.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    /// Facility the session belongs to.
    pub facility_id: i64,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    pub fn identity(&self) -> Result<Identity, AppError> {
        let user_id = self
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthenticated)?;
        Ok(Identity::new(user_id, self.facility_id))
    }
}

/// Signs a JWT for the given identity.
///
/// The feed never issues sessions itself; this exists for the session
/// service's tooling and for tests.
pub fn sign_jwt(
    identity: Identity,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Transient(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: identity.user_id.to_string(),
        facility_id: identity.facility_id,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Transient(e.to_string()))
}

/// Verifies and decodes a JWT string.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthenticated)?;

    Ok(token_data.claims)
}

/// Resolves `Authorization: Bearer <token>` into an `Identity`.
pub fn resolve_identity(auth_header: Option<&str>, secret: &str) -> Result<Identity, AppError> {
    let token = auth_header
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthenticated)?;

    verify_jwt(token, secret)?.identity()
}

/// Axum Middleware: Identity resolution.
///
/// Validates the bearer token once per request and injects the caller's
/// `Identity` into the request extensions for handlers to use.
/// Requests without a resolvable session get 401 "session not found".
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let identity = resolve_identity(auth_header, &config.jwt_secret)?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
