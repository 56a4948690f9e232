/// Token issuing and verification
///
/// `TokenIssuer` is built once from `JwtSettings` and shared by reference
/// with whatever needs to mint or check tokens.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::auth::refresh_token::generate_refresh_token;
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::store::UserId;

pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_token_ttl: Duration,
    session_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            access_token_ttl: Duration::seconds(config.access_token_expiry),
            session_ttl: Duration::seconds(config.refresh_token_expiry),
        }
    }

    /// Default lifetime of an access token
    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    /// Lifetime of a refresh-token session
    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    /// Sign an HS256 access token for `user_id`.
    ///
    /// `ttl` overrides the configured default lifetime.
    pub fn issue_access_token(
        &self,
        user_id: UserId,
        ttl: Option<Duration>,
    ) -> Result<String, AppError> {
        let claims = Claims::new(
            user_id,
            ttl.unwrap_or(self.access_token_ttl),
            &self.issuer,
        );

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }

    /// Check signature, issuer and expiry, and return the subject
    pub fn verify_access_token(&self, token: &str) -> Result<UserId, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                match e.kind() {
                    ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                    ErrorKind::ExpiredSignature => AuthError::Expired,
                    _ => AuthError::Malformed,
                }
            })?;

        claims.user_id()
    }

    pub fn issue_refresh_token(&self) -> String {
        generate_refresh_token()
    }
}
