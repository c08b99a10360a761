use crate::config::Store;
use crate::error::StoreError;
use crate::model::{Bookmark, BookmarkId, BookmarkPatch, NewBookmark, Rating};
use crate::store::BookmarkStore;
use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use libsql::{Builder, Connection, Database as LibsqlDatabase, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SYSTEM_MIGRATIONS: &[(&str, &str)] =
    &[("system/000_migrations_table.sql", include_str!("migrations/system/000_migrations_table.sql"))];

const MIGRATIONS: &[(&str, &str)] = &[("001_bookmarks.sql", include_str!("migrations/001_bookmarks.sql"))];

const IN_MEMORY: &str = ":memory:";

/// Bookmarks kept in a libsql (SQLite) table. Every operation is a single
/// autocommitting statement.
pub struct Database {
    _db: LibsqlDatabase,
    conn: Connection,
}

impl Database {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn is_replica(turso_url: &Option<String>, turso_auth_token: &Option<String>) -> bool {
        turso_url.is_some() && turso_auth_token.is_some()
    }

    fn resolve_path(database: &str, data_dir: &Path) -> PathBuf {
        let path = Path::new(database);
        if database == IN_MEMORY || path.is_absolute() {
            path.to_path_buf()
        } else {
            data_dir.join(path)
        }
    }

    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool> {
        let query = "SELECT 1 FROM _migrations WHERE name = ?";
        match conn.query(query, libsql::params![name]).await {
            Ok(mut rows) => Ok(rows.next().await?.is_some()),
            Err(e) => {
                if e.to_string().contains("no such table") {
                    Ok(false)
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn record_migration(conn: &Connection, name: &str) -> Result<()> {
        let query = r#"
            INSERT INTO _migrations (name, applied_at)
            VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        "#;
        conn.execute(query, libsql::params![name]).await?;
        Ok(())
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql)
            .await
            .map_err(|e| anyhow!("failed to execute migration {name}: {e}"))?;

        Self::record_migration(conn, name).await?;
        Ok(())
    }

    pub async fn new(cfg: &Store, data_dir: &Path) -> Result<Self> {
        let path = Self::resolve_path(cfg.get_db(), data_dir);
        tracing::info!(
            path = ?path,
            replica = Self::is_replica(&cfg.turso_url, &cfg.turso_auth_token),
            "[db] opening bookmarks database"
        );

        let db = match (&cfg.turso_url, &cfg.turso_auth_token) {
            (Some(url), Some(token)) => {
                tracing::info!("[db] running in synced database mode (offline writes)");
                let sync_interval = Duration::from_secs(cfg.sync_interval_seconds);
                Builder::new_synced_database(&path, url.clone(), token.clone())
                    .sync_interval(sync_interval)
                    .build()
                    .await?
            }
            _ => Builder::new_local(&path).build().await?,
        };

        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        for (filename, sql) in SYSTEM_MIGRATIONS.iter().chain(MIGRATIONS) {
            Self::run_migration(&conn, filename, sql).await?;
        }

        Ok(Database { _db: db, conn })
    }

    /// Opens a private in-memory database with the schema applied.
    pub async fn in_memory() -> Result<Self> {
        Self::new(&Store::in_memory(), Path::new(".")).await
    }

    fn row_to_bookmark(row: &libsql::Row) -> Result<Bookmark> {
        Ok(Bookmark {
            id: BookmarkId::Key(row.get(0)?),
            title: row.get(1)?,
            url: row.get(2)?,
            rating: Self::rating_from(row.get_value(3)?)?,
            description: row.get(4)?,
        })
    }

    /// Older rows may carry the rating as text; whatever the storage class, it
    /// leaves here as a checked integer.
    fn rating_from(value: Value) -> Result<Rating> {
        let number = match value {
            Value::Integer(i) => i,
            Value::Text(s) => s.trim().parse::<i64>()?,
            Value::Real(f) if f.fract() == 0.0 => f as i64,
            other => bail!("unexpected rating value: {:?}", other),
        };
        Rating::new(number).ok_or_else(|| anyhow!("stored rating {} is out of range", number))
    }
}

#[async_trait]
impl BookmarkStore for Database {
    async fn list(&self) -> Result<Vec<Bookmark>, StoreError> {
        let query = r#"
            SELECT id, title, url, rating, description
            FROM bookmarks
            ORDER BY id
        "#;

        let mut rows = self.conn.query(query, ()).await?;
        let mut bookmarks = Vec::new();

        while let Some(row) = rows.next().await? {
            bookmarks.push(Self::row_to_bookmark(&row)?);
        }

        Ok(bookmarks)
    }

    async fn get_by_id(&self, id: &BookmarkId) -> Result<Option<Bookmark>, StoreError> {
        let Some(key) = id.as_key() else {
            return Ok(None);
        };

        let query = r#"
            SELECT id, title, url, rating, description
            FROM bookmarks WHERE id = ?
        "#;

        let mut rows = self.conn.query(query, libsql::params![key]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_bookmark(&row)?))
        } else {
            Ok(None)
        }
    }

    async fn insert(&self, input: NewBookmark) -> Result<Bookmark, StoreError> {
        let query = r#"
            INSERT INTO bookmarks (title, url, rating, description)
            VALUES (?, ?, ?, ?)
            RETURNING id, title, url, rating, description
        "#;

        let mut rows = self
            .conn
            .query(
                query,
                libsql::params![input.title, input.url, input.rating.get(), input.description],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Self::row_to_bookmark(&row)?)
        } else {
            Err(anyhow!("failed to create bookmark").into())
        }
    }

    async fn update(&self, id: &BookmarkId, patch: BookmarkPatch) -> Result<(), StoreError> {
        let key = id.as_key().ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let mut updates = Vec::new();
        let mut params: Vec<Value> = Vec::new();

        if let Some(title) = patch.title {
            updates.push("title = ?");
            params.push(title.into());
        }
        if let Some(url) = patch.url {
            updates.push("url = ?");
            params.push(url.into());
        }
        if let Some(rating) = patch.rating {
            updates.push("rating = ?");
            params.push(rating.get().into());
        }
        if let Some(description) = patch.description {
            updates.push("description = ?");
            params.push(description.into());
        }

        if updates.is_empty() {
            return match self.get_by_id(id).await? {
                Some(_) => Ok(()),
                None => Err(StoreError::NotFound(id.clone())),
            };
        }

        params.push(key.into());
        let query = format!("UPDATE bookmarks SET {} WHERE id = ?", updates.join(", "));

        let affected = self.conn.execute(&query, params).await?;
        if affected == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn delete(&self, id: &BookmarkId) -> Result<(), StoreError> {
        let key = id.as_key().ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let affected = self
            .conn
            .execute("DELETE FROM bookmarks WHERE id = ?", libsql::params![key])
            .await?;
        if affected == 0 {
            return Err(StoreError::NotFound(id.clone()));
        }
        Ok(())
    }
}
