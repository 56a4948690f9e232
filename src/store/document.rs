/// Persisted data model
///
/// The `Document` is the single aggregate written to disk. Users live in one
/// arena keyed by id; the email map only holds ids, so a user record can never
/// be updated in one place and stale in the other.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub type PostId = u64;
pub type UserId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub body: String,
    pub author_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    /// bcrypt hash, never the plaintext
    pub password_hash: String,
    #[serde(default)]
    pub is_promoted: bool,
}

/// Server-side record behind a refresh token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    posts: BTreeMap<PostId, Post>,
    #[serde(default)]
    users_by_email: BTreeMap<String, UserId>,
    #[serde(default)]
    users_by_id: BTreeMap<UserId, User>,
    #[serde(default)]
    sessions: BTreeMap<String, Session>,
}

impl Document {
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
            && self.users_by_id.is_empty()
            && self.users_by_email.is_empty()
            && self.sessions.is_empty()
    }

    // ---- posts ----

    /// Full-collection scan in ascending id order
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.posts.values()
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.posts.get(&id)
    }

    pub fn insert_post(&mut self, post: Post) {
        self.posts.insert(post.id, post);
    }

    pub fn remove_post(&mut self, id: PostId) -> Option<Post> {
        self.posts.remove(&id)
    }

    pub fn max_post_id(&self) -> Option<PostId> {
        self.posts.keys().next_back().copied()
    }

    // ---- users ----

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users_by_id.get(&id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users_by_email
            .get(email)
            .and_then(|id| self.users_by_id.get(id))
    }

    pub fn max_user_id(&self) -> Option<UserId> {
        self.users_by_id.keys().next_back().copied()
    }

    /// Add a new user; fails with `Conflict` if the email or id is taken
    pub fn insert_user(&mut self, user: User) -> Result<(), AppError> {
        if self.users_by_email.contains_key(&user.email) {
            return Err(AppError::Conflict(format!(
                "email {} is already registered",
                user.email
            )));
        }
        if self.users_by_id.contains_key(&user.id) {
            return Err(AppError::Conflict(format!("user id {} is already in use", user.id)));
        }

        self.users_by_email.insert(user.email.clone(), user.id);
        self.users_by_id.insert(user.id, user);
        Ok(())
    }

    /// Replace a user's email and password hash, keeping the email index in
    /// step. Taking another user's email is rejected with `Conflict`.
    pub fn update_user_credentials(
        &mut self,
        id: UserId,
        email: String,
        password_hash: String,
    ) -> Result<&User, AppError> {
        let current_email = match self.users_by_id.get(&id) {
            Some(user) => user.email.clone(),
            None => return Err(AppError::NotFound(format!("user {}", id))),
        };

        if current_email != email {
            if self.users_by_email.contains_key(&email) {
                return Err(AppError::Conflict(format!(
                    "email {} is already registered",
                    email
                )));
            }
            self.users_by_email.remove(&current_email);
            self.users_by_email.insert(email.clone(), id);
        }

        let user = self
            .users_by_id
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;
        user.email = email;
        user.password_hash = password_hash;
        Ok(&*user)
    }

    pub fn promote_user(&mut self, id: UserId) -> Result<&User, AppError> {
        let user = self
            .users_by_id
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("user {}", id)))?;
        user.is_promoted = true;
        Ok(&*user)
    }

    // ---- sessions ----

    pub fn session(&self, refresh_token: &str) -> Option<&Session> {
        self.sessions.get(refresh_token)
    }

    /// Bind `refresh_token` to a live user
    pub fn insert_session(&mut self, refresh_token: String, session: Session) -> Result<(), AppError> {
        if !self.users_by_id.contains_key(&session.user_id) {
            return Err(AppError::NotFound(format!("user {}", session.user_id)));
        }
        self.sessions.insert(refresh_token, session);
        Ok(())
    }

    pub fn remove_session(&mut self, refresh_token: &str) -> Option<Session> {
        self.sessions.remove(refresh_token)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Check the cross-map invariants of a freshly decoded document
    pub fn verify_integrity(&self) -> Result<(), String> {
        if self.users_by_email.len() != self.users_by_id.len() {
            return Err(format!(
                "{} email entries for {} users",
                self.users_by_email.len(),
                self.users_by_id.len()
            ));
        }
        for (email, id) in &self.users_by_email {
            match self.users_by_id.get(id) {
                Some(user) if &user.email == email => {}
                _ => return Err(format!("email index entry {} does not match user {}", email, id)),
            }
        }
        for (id, user) in &self.users_by_id {
            if *id != user.id {
                return Err(format!("user stored under id {} claims id {}", id, user.id));
            }
        }
        for (id, post) in &self.posts {
            if *id != post.id {
                return Err(format!("post stored under id {} claims id {}", id, post.id));
            }
        }
        if let Some(session) = self
            .sessions
            .values()
            .find(|s| !self.users_by_id.contains_key(&s.user_id))
        {
            return Err(format!("session references unknown user {}", session.user_id));
        }
        Ok(())
    }
}
