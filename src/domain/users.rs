/// User accounts
///
/// Registration assigns the next user id. Users can replace their own email
/// and password; an email already held by another user is refused.

use crate::auth::{hash_password, UserView};
use crate::error::AppError;
use crate::store::{Store, User, UserId};
use crate::validators::is_valid_email;

pub fn register_user(store: &Store, email: &str, password: &str) -> Result<UserView, AppError> {
    let email = is_valid_email(email)?;
    let password_hash = hash_password(password)?;

    let user = store.transact(|tx| {
        let user = User {
            id: tx.allocate_user_id(),
            email,
            password_hash,
            is_promoted: false,
        };
        let view = UserView::from(&user);
        tx.document_mut().insert_user(user)?;
        Ok(view)
    })?;

    tracing::info!(user_id = user.id, "User registered");
    Ok(user)
}

/// Replace the email and password of user `id`
pub fn update_credentials(
    store: &Store,
    id: UserId,
    email: &str,
    password: &str,
) -> Result<UserView, AppError> {
    let email = is_valid_email(email)?;
    let password_hash = hash_password(password)?;

    let user = store.transact(|tx| {
        tx.document_mut()
            .update_user_credentials(id, email, password_hash)
            .map(UserView::from)
    })?;

    tracing::info!(user_id = id, "User credentials updated");
    Ok(user)
}
