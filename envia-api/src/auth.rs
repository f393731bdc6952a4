use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;
use crate::middleware::auth::{
    decode_token, issue_access_token, issue_refresh_token, Claims, ACCESS_COOKIE,
    ACCESS_TOKEN_TYPE, REFRESH_COOKIE, REFRESH_TOKEN_TYPE,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    message: &'static str,
    username: String,
    token_type: &'static str,
}

/// Routes reachable without a session.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/check", get(check))
}

/// Routes that require a valid access-token cookie.
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

fn session_cookie(
    name: &'static str,
    value: String,
    max_age: time::Duration,
    path: &'static str,
) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path(path)
        .max_age(max_age)
        .build()
}

/// POST /auth/login
/// Issues access + refresh tokens as httpOnly cookies.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(credentials): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    if credentials.username != state.auth.username
        || credentials.password != state.auth.password
    {
        tracing::warn!(username = %credentials.username, "failed login attempt");
        return Err(AppError::AuthenticationError(
            "invalid username or password".to_string(),
        ));
    }

    let access = issue_access_token(&credentials.username, &state.auth)?;
    let refresh = issue_refresh_token(&credentials.username, &state.auth)?;

    let jar = jar
        .add(session_cookie(
            ACCESS_COOKIE,
            access,
            time::Duration::minutes(state.auth.access_token_minutes),
            "/",
        ))
        // The refresh token is only ever sent back to /auth/* routes.
        .add(session_cookie(
            REFRESH_COOKIE,
            refresh,
            time::Duration::days(state.auth.refresh_token_days),
            "/auth",
        ));

    tracing::info!(username = %credentials.username, "user logged in");

    Ok((
        jar,
        Json(LoginResponse {
            message: "login successful",
            username: credentials.username,
            token_type: "Bearer",
        }),
    ))
}

/// POST /auth/refresh
/// Exchanges a valid refresh-token cookie for a fresh access cookie.
async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>), AppError> {
    let token = jar
        .get(REFRESH_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| {
            AppError::AuthenticationError("no refresh token, log in again".to_string())
        })?;

    let claims = decode_token(&token, &state.auth.secret)?;
    if claims.token_type != REFRESH_TOKEN_TYPE {
        return Err(AppError::AuthenticationError("invalid token".to_string()));
    }

    let access = issue_access_token(&claims.sub, &state.auth)?;
    let jar = jar.add(session_cookie(
        ACCESS_COOKIE,
        access,
        time::Duration::minutes(state.auth.access_token_minutes),
        "/",
    ));

    tracing::info!(username = %claims.sub, "access token refreshed");

    Ok((
        jar,
        Json(json!({
            "message": "token refreshed",
            "username": claims.sub,
        })),
    ))
}

/// POST /auth/logout
async fn logout(
    Extension(claims): Extension<Claims>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    tracing::info!(username = %claims.sub, "user logging out");

    let jar = jar
        .remove(Cookie::build((ACCESS_COOKIE, "")).path("/").build())
        .remove(Cookie::build((REFRESH_COOKIE, "")).path("/auth").build());

    (jar, Json(json!({ "message": "session closed" })))
}

/// GET /auth/me
async fn me(Extension(claims): Extension<Claims>) -> Json<serde_json::Value> {
    Json(json!({
        "username": claims.sub,
        "authenticated": true,
    }))
}

/// GET /auth/check
/// Non-failing probe: reports whether the caller currently holds a valid
/// session, without ever rejecting the request.
async fn check(State(state): State<AppState>, jar: CookieJar) -> Json<serde_json::Value> {
    let authenticated = jar
        .get(ACCESS_COOKIE)
        .and_then(|cookie| decode_token(cookie.value(), &state.auth.secret).ok())
        .filter(|claims| claims.token_type == ACCESS_TOKEN_TYPE);

    match authenticated {
        Some(claims) => Json(json!({
            "authenticated": true,
            "username": claims.sub,
        })),
        None => Json(json!({
            "authenticated": false,
            "username": null,
        })),
    }
}
