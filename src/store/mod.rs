/// Record store
///
/// A single JSON document on disk, guarded by one mutex, holding posts,
/// users, and refresh-token sessions.

mod document;
mod record_store;

pub use document::{Document, Post, PostId, Session, User, UserId};
pub use record_store::{CounterAdvance, Store, Transaction};
