/// File-backed record store
///
/// Every read and write of the document file happens while holding the
/// store's mutex. The id counters live behind the same mutex and only move
/// forward after a write that used them has succeeded.
///
/// Two ways to mutate:
/// - `transact` holds the lock across load, mutate, persist and counter
///   advance. All service code goes through it.
/// - `load` followed later by `persist` takes the lock twice. Callers that
///   interleave between the two calls get last-writer-wins: two writers that
///   load the same snapshot both peek the same next id, and the second
///   persist overwrites the first one's addition.

use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{AppError, StoreError};
use crate::store::document::{Document, PostId, UserId};

/// Which id counter a successful `persist` should advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterAdvance {
    None,
    Post,
    User,
}

#[derive(Debug)]
struct Counters {
    next_post_id: PostId,
    next_user_id: UserId,
}

#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    counters: Mutex<Counters>,
}

/// A document loaded under the store lock, plus ids handed out against it
pub struct Transaction {
    document: Document,
    next_post_id: PostId,
    next_user_id: UserId,
    posts_allocated: u64,
    users_allocated: u64,
}

impl Transaction {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Reserve the next post id; the counter moves only if the write succeeds.
    ///
    /// Past the end of the id space the commit fails, so a saturated id is
    /// never written.
    pub fn allocate_post_id(&mut self) -> PostId {
        let id = self.next_post_id.saturating_add(self.posts_allocated);
        self.posts_allocated += 1;
        id
    }

    pub fn allocate_user_id(&mut self) -> UserId {
        let id = self.next_user_id.saturating_add(self.users_allocated);
        self.users_allocated += 1;
        id
    }
}

impl Store {
    /// Open the store at `path`, creating the file if it does not exist.
    ///
    /// With `reset` the file is truncated first. Counters resume after the
    /// highest id already on disk; the first id handed out is 1.
    pub fn open(path: impl Into<PathBuf>, reset: bool) -> Result<Self, StoreError> {
        let path = path.into();

        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(reset)
            .open(&path)
            .map_err(|e| {
                StoreError::IoFailure(format!("cannot open {}: {}", path.display(), e))
            })?;

        let document = read_document(&path)?;
        let counters = Counters {
            next_post_id: next_after(document.max_post_id(), "post")?,
            next_user_id: next_after(document.max_user_id(), "user")?,
        };

        tracing::info!(
            path = %path.display(),
            reset = reset,
            next_post_id = counters.next_post_id,
            next_user_id = counters.next_user_id,
            "Record store opened"
        );

        Ok(Self {
            path,
            counters: Mutex::new(counters),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // A panic while holding the lock cannot leave the counters half-updated,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the whole document under the lock
    pub fn load(&self) -> Result<Document, StoreError> {
        let _guard = self.lock();
        read_document(&self.path)
    }

    /// Overwrite the file with `doc`, then advance the requested counter.
    ///
    /// On failure nothing is advanced.
    pub fn persist(&self, doc: &Document, advance: CounterAdvance) -> Result<(), StoreError> {
        let mut counters = self.lock();
        let (next_post_id, next_user_id) = match advance {
            CounterAdvance::None => (counters.next_post_id, counters.next_user_id),
            CounterAdvance::Post => (
                advance_by(counters.next_post_id, 1, "post")?,
                counters.next_user_id,
            ),
            CounterAdvance::User => (
                counters.next_post_id,
                advance_by(counters.next_user_id, 1, "user")?,
            ),
        };

        write_document(&self.path, doc)?;
        counters.next_post_id = next_post_id;
        counters.next_user_id = next_user_id;
        Ok(())
    }

    /// Current next post id, without advancing it
    pub fn next_post_id(&self) -> PostId {
        self.lock().next_post_id
    }

    /// Current next user id, without advancing it
    pub fn next_user_id(&self) -> UserId {
        self.lock().next_user_id
    }

    /// Run a read-modify-write cycle as one critical section.
    ///
    /// If `f` returns `Err` nothing is written and no ids are consumed. If it
    /// returns `Ok` the document is persisted and the counters advance by the
    /// number of ids allocated from the transaction.
    pub fn transact<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Transaction) -> Result<T, AppError>,
    {
        let mut counters = self.lock();

        let mut tx = Transaction {
            document: read_document(&self.path)?,
            next_post_id: counters.next_post_id,
            next_user_id: counters.next_user_id,
            posts_allocated: 0,
            users_allocated: 0,
        };

        let value = f(&mut tx)?;
        let next_post_id = advance_by(counters.next_post_id, tx.posts_allocated, "post")?;
        let next_user_id = advance_by(counters.next_user_id, tx.users_allocated, "user")?;

        write_document(&self.path, &tx.document)?;
        counters.next_post_id = next_post_id;
        counters.next_user_id = next_user_id;

        Ok(value)
    }
}

/// First id to hand out after `max`; a file already holding `u64::MAX` is unusable
fn next_after(max: Option<u64>, kind: &str) -> Result<u64, StoreError> {
    match max {
        None => Ok(1),
        Some(id) => id.checked_add(1).ok_or_else(|| {
            StoreError::CorruptStore(format!("{} id {} leaves no room for new ids", kind, id))
        }),
    }
}

fn advance_by(next: u64, allocated: u64, kind: &str) -> Result<u64, StoreError> {
    next.checked_add(allocated).ok_or_else(|| {
        tracing::error!(kind = kind, next = next, "Id space exhausted");
        StoreError::IdsExhausted(kind.to_string())
    })
}

fn read_document(path: &Path) -> Result<Document, StoreError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Document::default()),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read store file");
            return Err(StoreError::IoFailure(e.to_string()));
        }
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::default());
    }

    let document: Document = serde_json::from_slice(&bytes).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Store file is not a valid document");
        StoreError::CorruptStore(e.to_string())
    })?;

    document.verify_integrity().map_err(|msg| {
        tracing::error!(path = %path.display(), error = %msg, "Store file violates invariants");
        StoreError::CorruptStore(msg)
    })?;

    Ok(document)
}

/// Write to a sibling temp file and rename it over the store file
fn write_document(path: &Path, doc: &Document) -> Result<(), StoreError> {
    let bytes =
        serde_json::to_vec(doc).map_err(|e| StoreError::Serialization(e.to_string()))?;

    let mut tmp: OsString = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, &bytes)
        .and_then(|_| fs::rename(&tmp, path))
        .map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to write store file");
            let _ = fs::remove_file(&tmp);
            StoreError::IoFailure(e.to_string())
        })
}
