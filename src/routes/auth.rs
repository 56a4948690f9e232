/// Authentication Routes
///
/// Login, refresh-token rotation, and logout.

use actix_web::{web, HttpResponse};
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::auth::{login as open_session, logout, refresh as rotate_session, TokenIssuer, UserView};
use crate::error::{AppError, ErrorContext};
use crate::middleware::BearerToken;
use crate::store::Store;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Requested access-token lifetime; capped at the configured default
    pub expires_in_seconds: Option<i64>,
}

#[derive(Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: UserView,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub token: String,
    pub refresh_token: String,
}

// Compared as raw seconds; client values can be far outside `Duration`'s range
fn requested_ttl(requested: Option<i64>, default: Duration) -> Option<Duration> {
    requested
        .filter(|seconds| *seconds > 0 && *seconds < default.num_seconds())
        .map(Duration::seconds)
}

/// POST /api/login
///
/// # Errors
/// - 401: unknown email or wrong password (same response for both)
pub async fn login(
    form: web::Json<LoginRequest>,
    store: web::Data<Store>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");
    let ttl = requested_ttl(form.expires_in_seconds, issuer.access_token_ttl());

    let outcome = open_session(store.get_ref(), issuer.get_ref(), &form.email, &form.password, ttl)
        .map_err(|e| context.log_error(e))?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        user: outcome.user,
        token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

/// POST /api/refresh
///
/// `Authorization: Bearer <refresh token>`. The presented token is retired
/// and a new pair is returned.
pub async fn refresh(
    token: BearerToken,
    store: web::Data<Store>,
    issuer: web::Data<TokenIssuer>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_refresh");

    let outcome = rotate_session(store.get_ref(), issuer.get_ref(), &token.0)
        .map_err(|e| context.log_error(e))?;

    Ok(HttpResponse::Ok().json(RefreshResponse {
        token: outcome.access_token,
        refresh_token: outcome.refresh_token,
    }))
}

/// DELETE /api/refresh
///
/// Revokes the presented refresh token. Unknown tokens succeed too.
pub async fn revoke(
    token: BearerToken,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("token_revocation");

    logout(store.get_ref(), &token.0).map_err(|e| context.log_error(e))?;

    Ok(HttpResponse::NoContent().finish())
}
