/// Post operations
///
/// Posts are created by an authenticated author, listed by full scan, and
/// deleted only by their author. They are never edited.

use crate::domain::profanity::mask_profanity;
use crate::error::AppError;
use crate::store::{Post, PostId, Store, UserId};
use crate::validators::is_valid_post_body;

pub fn create_post(store: &Store, author_id: UserId, body: &str) -> Result<Post, AppError> {
    let body = mask_profanity(is_valid_post_body(body)?);

    let post = store.transact(|tx| {
        if tx.document().user(author_id).is_none() {
            return Err(AppError::NotFound(format!("user {}", author_id)));
        }
        let post = Post {
            id: tx.allocate_post_id(),
            body,
            author_id,
        };
        tx.document_mut().insert_post(post.clone());
        Ok(post)
    })?;

    tracing::info!(post_id = post.id, user_id = author_id, "Post created");
    Ok(post)
}

/// Every post, ascending by id
pub fn list_posts(store: &Store) -> Result<Vec<Post>, AppError> {
    Ok(store.load()?.posts().cloned().collect())
}

pub fn get_post(store: &Store, id: PostId) -> Result<Post, AppError> {
    store
        .load()?
        .post(id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("post {}", id)))
}

/// Delete a post on behalf of `requester`, who must be its author
pub fn delete_post(store: &Store, requester: UserId, id: PostId) -> Result<(), AppError> {
    store.transact(|tx| {
        let doc = tx.document_mut();
        match doc.post(id).map(|post| post.author_id) {
            None => Err(AppError::NotFound(format!("post {}", id))),
            Some(author_id) if author_id != requester => Err(AppError::Forbidden(format!(
                "user {} is not the author of post {}",
                requester, id
            ))),
            Some(_) => {
                doc.remove_post(id);
                Ok(())
            }
        }
    })?;

    tracing::info!(post_id = id, user_id = requester, "Post deleted");
    Ok(())
}
