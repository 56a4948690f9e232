/// Refresh-token sessions
///
/// A refresh token is Active while its session is present and unexpired.
/// Expired sessions are treated exactly like absent ones and are removed the
/// next time someone presents them. There is no background sweep.

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::auth::jwt::TokenIssuer;
use crate::auth::password::verify_password;
use crate::error::{AppError, AuthError};
use crate::store::{Session, Store, User, UserId};

/// User fields safe to hand back to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub email: String,
    #[serde(rename = "is_chirpy_red")]
    pub is_promoted: bool,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_promoted: user.is_promoted,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct RefreshOutcome {
    pub access_token: String,
    pub refresh_token: String,
}

/// Check a password and open a new session.
///
/// Unknown email and wrong password both fail with `InvalidCredentials`.
pub fn login(
    store: &Store,
    issuer: &TokenIssuer,
    email: &str,
    password: &str,
    access_ttl: Option<Duration>,
) -> Result<LoginOutcome, AppError> {
    // bcrypt is slow, so verify against a snapshot outside the lock
    let user = store
        .load()?
        .user_by_email(email.trim())
        .cloned()
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash) {
        tracing::warn!(user_id = %user.id, "Login with wrong password");
        return Err(AuthError::InvalidCredentials.into());
    }

    let refresh_token = issuer.issue_refresh_token();
    let session = Session {
        user_id: user.id,
        expires_at: Utc::now() + issuer.session_ttl(),
    };

    let user = store.transact(|tx| {
        let doc = tx.document_mut();
        // The user may have changed between the snapshot and now
        let current = doc
            .user(user.id)
            .filter(|current| current.password_hash == user.password_hash)
            .map(UserView::from)
            .ok_or(AuthError::InvalidCredentials)?;
        doc.insert_session(refresh_token.clone(), session)?;
        Ok(current)
    })?;

    let access_token = issuer.issue_access_token(user.id, access_ttl)?;

    tracing::info!(user_id = %user.id, "Session opened");

    Ok(LoginOutcome {
        access_token,
        refresh_token,
        user,
    })
}

/// Rotate an Active refresh token.
///
/// The old token is removed and a new one bound to the same user is stored
/// in the same write. Expired or unknown tokens fail with
/// `InvalidOrExpiredSession`; an expired one is removed on the way out.
pub fn refresh(
    store: &Store,
    issuer: &TokenIssuer,
    refresh_token: &str,
) -> Result<RefreshOutcome, AppError> {
    let now = Utc::now();

    let rotated = store.transact(|tx| {
        let doc = tx.document_mut();
        let session = match doc.session(refresh_token).cloned() {
            None => return Ok(None),
            Some(session) if session.is_expired_at(now) => {
                doc.remove_session(refresh_token);
                tracing::info!(user_id = %session.user_id, "Expired session removed");
                return Ok(None);
            }
            Some(session) => session,
        };

        let new_token = issuer.issue_refresh_token();
        doc.remove_session(refresh_token);
        doc.insert_session(
            new_token.clone(),
            Session {
                user_id: session.user_id,
                expires_at: now + issuer.session_ttl(),
            },
        )?;
        let access_token = issuer.issue_access_token(session.user_id, None)?;

        Ok(Some((session.user_id, new_token, access_token)))
    })?;

    match rotated {
        Some((user_id, refresh_token, access_token)) => {
            tracing::info!(user_id = %user_id, "Session rotated");
            Ok(RefreshOutcome {
                access_token,
                refresh_token,
            })
        }
        None => {
            tracing::warn!("Refresh attempted with unknown or expired token");
            Err(AuthError::InvalidOrExpiredSession.into())
        }
    }
}

/// Remove a session. Removing an absent token succeeds.
pub fn logout(store: &Store, refresh_token: &str) -> Result<(), AppError> {
    let removed = store.transact(|tx| Ok(tx.document_mut().remove_session(refresh_token)))?;

    if let Some(session) = removed {
        tracing::info!(user_id = %session.user_id, "Session closed");
    }
    Ok(())
}
