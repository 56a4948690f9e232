/// Post (chirp) routes

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::{create_post, delete_post, get_post, list_posts};
use crate::error::{AppError, ErrorContext};
use crate::middleware::AuthenticatedUser;
use crate::store::{Post, PostId, Store, UserId};

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Serialize)]
pub struct ChirpResponse {
    pub id: PostId,
    pub body: String,
    pub author_id: UserId,
}

impl From<Post> for ChirpResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            body: post.body,
            author_id: post.author_id,
        }
    }
}

/// POST /api/chirps
///
/// # Errors
/// - 400: body empty or over 140 characters
/// - 401: missing or invalid access token
pub async fn create_chirp(
    user: AuthenticatedUser,
    form: web::Json<CreateChirpRequest>,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_creation").with_user_id(user.0);

    let post = create_post(store.get_ref(), user.0, &form.body)
        .map_err(|e| context.log_error(e))?;

    Ok(HttpResponse::Created().json(ChirpResponse::from(post)))
}

/// GET /api/chirps
pub async fn list_chirps(store: web::Data<Store>) -> Result<HttpResponse, AppError> {
    let chirps: Vec<ChirpResponse> = list_posts(store.get_ref())?
        .into_iter()
        .map(ChirpResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(chirps))
}

/// GET /api/chirps/{id}
pub async fn get_chirp(
    path: web::Path<PostId>,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let post = get_post(store.get_ref(), path.into_inner())?;
    Ok(HttpResponse::Ok().json(ChirpResponse::from(post)))
}

/// DELETE /api/chirps/{id}
///
/// # Errors
/// - 403: the caller is not the author
/// - 404: no such chirp
pub async fn delete_chirp(
    user: AuthenticatedUser,
    path: web::Path<PostId>,
    store: web::Data<Store>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("chirp_deletion").with_user_id(user.0);

    delete_post(store.get_ref(), user.0, path.into_inner())
        .map_err(|e| context.log_error(e))?;

    Ok(HttpResponse::NoContent().finish())
}
