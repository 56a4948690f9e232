/// Authorization header extractors
///
/// Handlers name what they need in their signature:
/// - `AuthenticatedUser` for a verified access token (`Bearer <jwt>`)
/// - `BearerToken` for the raw bearer string, used with refresh tokens
/// - `PolkaApiKey` for the billing webhook (`ApiKey <key>`)

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::TokenIssuer;
use crate::configuration::PolkaSettings;
use crate::error::{AppError, AuthError};
use crate::store::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Bearer,
    ApiKey,
}

impl AuthScheme {
    fn as_str(self) -> &'static str {
        match self {
            AuthScheme::Bearer => "Bearer",
            AuthScheme::ApiKey => "ApiKey",
        }
    }
}

/// Pull the credential out of `Authorization: <scheme> <credential>`
pub fn extract_credential(req: &HttpRequest, scheme: AuthScheme) -> Result<String, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AuthError::MissingCredential)?;

    parse_authorization(value, scheme)
}

fn parse_authorization(value: &str, scheme: AuthScheme) -> Result<String, AuthError> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(found), Some(credential), None)
            if found == scheme.as_str() && !credential.is_empty() =>
        {
            Ok(credential.to_string())
        }
        _ => Err(AuthError::MissingCredential),
    }
}

/// The user behind a valid access token
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub UserId);

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| AppError::Internal("TokenIssuer is not registered".to_string()))?;

    let token = extract_credential(req, AuthScheme::Bearer)?;
    let user_id = issuer.verify_access_token(&token).map_err(|e| {
        tracing::warn!(error = %e, "Access token rejected");
        e
    })?;

    tracing::debug!(user_id = user_id, "Access token accepted");
    Ok(AuthenticatedUser(user_id))
}

/// Raw bearer credential, not interpreted
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl FromRequest for BearerToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            extract_credential(req, AuthScheme::Bearer)
                .map(BearerToken)
                .map_err(AppError::from),
        )
    }
}

/// Proof that the request carried the configured billing API key
#[derive(Debug, Clone, Copy)]
pub struct PolkaApiKey;

impl FromRequest for PolkaApiKey {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(check_api_key(req))
    }
}

fn check_api_key(req: &HttpRequest) -> Result<PolkaApiKey, AppError> {
    let settings = req
        .app_data::<web::Data<PolkaSettings>>()
        .ok_or_else(|| AppError::Internal("PolkaSettings is not registered".to_string()))?;

    let key = extract_credential(req, AuthScheme::ApiKey)?;
    if settings.api_key.is_empty() || key != settings.api_key {
        tracing::warn!("Billing webhook called with wrong API key");
        return Err(AuthError::InvalidApiKey.into());
    }
    Ok(PolkaApiKey)
}
