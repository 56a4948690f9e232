use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::domain::{register_user, update_credentials};
use crate::error::{AppError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::store::Store;

#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/users
///
/// # Errors
/// - 400: invalid email or password
/// - 409: email already registered
pub async fn create_user(
    form: web::Json<CredentialsRequest>,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let user = register_user(store.get_ref(), &form.email, &form.password)
        .map_err(|e| context.log_error(e))?;

    Ok(HttpResponse::Created().json(user))
}

/// PUT /api/users
///
/// Replaces the caller's own email and password.
pub async fn update_user(
    user: AuthenticatedUser,
    form: web::Json<CredentialsRequest>,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update").with_user_id(user.0);

    let updated = update_credentials(store.get_ref(), user.0, &form.email, &form.password)
        .map_err(|e| context.log_error(e))?;

    Ok(HttpResponse::Ok().json(updated))
}
