//! # Storage Layer
//!
//! Card records live behind the [`CardStore`] trait so the manager never depends on a
//! particular persistence backend.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production storage, a single `cards.json` file holding every
//!   card record as a JSON array in insertion order. Writes go to a temporary file that
//!   is renamed over the previous file.
//! - [`memory::InMemoryStore`]: in-memory storage for tests, with write-failure
//!   simulation for exercising the error paths.
//!
//! ## Ordering Contract
//!
//! `fetch_all` returns records in insertion order. The manager stable-sorts that by
//! `created_at`, so cards sharing a timestamp stay in insertion order.
//!
//! The selection identifier is not a card record; it lives in the separate
//! [`kv::KeyValueStore`].

use crate::error::{Result, ScvError};
use crate::model::Card;
use std::path::Path;

pub mod fs;
pub mod kv;
pub mod memory;

/// Durable, ordered storage of card records.
///
/// Write methods either persist the change completely or return an error and leave the
/// stored records as they were.
pub trait CardStore {
    /// Add a new record. Fails if a record with the same storage id exists.
    fn insert(&mut self, card: &Card) -> Result<()>;

    /// Replace an existing record, matched by storage id.
    fn update(&mut self, card: &Card) -> Result<()>;

    /// Remove a record permanently, matched by storage id.
    fn delete(&mut self, card: &Card) -> Result<()>;

    /// Every record, in insertion order.
    fn fetch_all(&self) -> Result<Vec<Card>>;
}

impl<S: CardStore + ?Sized> CardStore for Box<S> {
    fn insert(&mut self, card: &Card) -> Result<()> {
        (**self).insert(card)
    }

    fn update(&mut self, card: &Card) -> Result<()> {
        (**self).update(card)
    }

    fn delete(&mut self, card: &Card) -> Result<()> {
        (**self).delete(card)
    }

    fn fetch_all(&self) -> Result<Vec<Card>> {
        (**self).fetch_all()
    }
}

/// Writes `content` next to `path` and renames it into place, so a failed write never
/// truncates the previous file.
pub(crate) fn write_atomic(
    dir: &Path,
    path: &Path,
    content: &str,
    operation: &'static str,
) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| ScvError::persistence(operation, e))?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    std::fs::write(&tmp, content).map_err(|e| ScvError::persistence(operation, e))?;
    std::fs::rename(&tmp, path).map_err(|e| ScvError::persistence(operation, e))?;
    Ok(())
}
