//! Store Access Facade
//!
//! One CRUD contract over a single logical collection of bookmarks keyed by
//! [`BookmarkId`]. Two interchangeable backends implement it:
//!
//! - [`MemoryStore`]: a process-local list, ids are random tokens, order is insertion order.
//! - [`crate::db::Database`]: a libsql table, ids are sequential keys, order is table order.
//!
//! The router only ever sees `Arc<dyn BookmarkStore>`, chosen from config at startup.

mod memory;

pub use memory::MemoryStore;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::{Backend, Config};
use crate::db::Database;
use crate::error::StoreError;
use crate::model::{Bookmark, BookmarkId, BookmarkPatch, NewBookmark};

#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// All bookmarks; an empty store yields an empty list.
    async fn list(&self) -> Result<Vec<Bookmark>, StoreError>;

    /// `Ok(None)` for an id that doesn't exist.
    async fn get_by_id(&self, id: &BookmarkId) -> Result<Option<Bookmark>, StoreError>;

    /// Assigns a fresh id and returns the stored record.
    async fn insert(&self, input: NewBookmark) -> Result<Bookmark, StoreError>;

    /// Merges only the fields present in `patch`. `StoreError::NotFound` for an unknown id.
    async fn update(&self, id: &BookmarkId, patch: BookmarkPatch) -> Result<(), StoreError>;

    /// `StoreError::NotFound` for an unknown id.
    async fn delete(&self, id: &BookmarkId) -> Result<(), StoreError>;
}

pub async fn open(cfg: &Config, data_dir: &Path) -> Result<Arc<dyn BookmarkStore>> {
    let store: Arc<dyn BookmarkStore> = match cfg.store.backend {
        Backend::Memory => {
            tracing::info!(seed = cfg.store.seed, "[store] using in-memory bookmarks");
            if cfg.store.seed {
                Arc::new(MemoryStore::seeded())
            } else {
                Arc::new(MemoryStore::new())
            }
        }
        Backend::Libsql => {
            tracing::info!(database = cfg.store.get_db(), "[store] using libsql bookmarks table");
            Arc::new(Database::new(&cfg.store, data_dir).await?)
        }
    };
    Ok(store)
}
