use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::{AppState, AuthSettings};

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

pub const ACCESS_TOKEN_TYPE: &str = "access";
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    /// "access" or "refresh"; each cookie only ever holds its own kind.
    #[serde(rename = "type")]
    pub token_type: String,
    pub jti: String,
    pub exp: usize,
}

pub fn issue_access_token(username: &str, auth: &AuthSettings) -> Result<String, AppError> {
    issue_token(
        username,
        ACCESS_TOKEN_TYPE,
        Duration::minutes(auth.access_token_minutes),
        auth,
    )
}

pub fn issue_refresh_token(username: &str, auth: &AuthSettings) -> Result<String, AppError> {
    issue_token(
        username,
        REFRESH_TOKEN_TYPE,
        Duration::days(auth.refresh_token_days),
        auth,
    )
}

fn issue_token(
    username: &str,
    token_type: &str,
    lifetime: Duration,
    auth: &AuthSettings,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: username.to_string(),
        token_type: token_type.to_string(),
        jti: Uuid::new_v4().to_string(),
        exp: (Utc::now() + lifetime).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::AuthenticationError("invalid or expired token".to_string()))
}

// ============================================================================
// Session Middleware
// ============================================================================

/// Validates the access-token cookie and injects the claims into request
/// extensions for handlers that want the caller identity.
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = jar
        .get(ACCESS_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| AppError::AuthenticationError("not authenticated".to_string()))?;

    let claims = decode_token(&token, &state.auth.secret)?;

    if claims.token_type != ACCESS_TOKEN_TYPE {
        return Err(AppError::AuthenticationError("invalid token".to_string()));
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AuthSettings {
        AuthSettings {
            secret: "unit-test-secret".to_string(),
            access_token_minutes: 480,
            refresh_token_days: 7,
            username: "operator".to_string(),
            password: "operator".to_string(),
        }
    }

    #[test]
    fn access_token_round_trips() {
        let auth = settings();
        let token = issue_access_token("operator", &auth).unwrap();
        let claims = decode_token(&token, &auth.secret).unwrap();

        assert_eq!(claims.sub, "operator");
        assert_eq!(claims.token_type, ACCESS_TOKEN_TYPE);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn refresh_token_is_typed_distinctly() {
        let auth = settings();
        let token = issue_refresh_token("operator", &auth).unwrap();
        let claims = decode_token(&token, &auth.secret).unwrap();

        assert_eq!(claims.token_type, REFRESH_TOKEN_TYPE);
        assert_ne!(claims.token_type, ACCESS_TOKEN_TYPE);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let auth = settings();
        let token = issue_access_token("operator", &auth).unwrap();
        assert!(decode_token(&token, "another-secret").is_err());
    }
}
