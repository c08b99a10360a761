use async_trait::async_trait;
use tokio::sync::RwLock;

use super::BookmarkStore;
use crate::error::StoreError;
use crate::model::{Bookmark, BookmarkId, BookmarkPatch, NewBookmark, Rating};

/// Bookmarks held in process memory for the lifetime of the store handle.
#[derive(Debug, Default)]
pub struct MemoryStore {
    bookmarks: RwLock<Vec<Bookmark>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bookmarks(bookmarks: Vec<Bookmark>) -> Self {
        Self {
            bookmarks: RwLock::new(bookmarks),
        }
    }

    /// A store preloaded with a few well-known sites, handy for demos.
    pub fn seeded() -> Self {
        let demo = [
            ("Google", "http://www.google.com", 3, "Internet-related services and products."),
            (
                "Thinkful",
                "http://www.thinkful.com",
                5,
                "1-on-1 learning to accelerate your way to a new high-growth tech career!",
            ),
            (
                "Github",
                "http://www.github.com",
                4,
                "brings together the world's largest community of developers.",
            ),
        ];

        let bookmarks = demo
            .into_iter()
            .filter_map(|(title, url, rating, description)| {
                Some(Bookmark {
                    id: BookmarkId::generate(),
                    title: title.to_string(),
                    url: url.to_string(),
                    rating: Rating::new(rating)?,
                    description: Some(description.to_string()),
                })
            })
            .collect();

        Self::with_bookmarks(bookmarks)
    }
}

#[async_trait]
impl BookmarkStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Bookmark>, StoreError> {
        Ok(self.bookmarks.read().await.clone())
    }

    async fn get_by_id(&self, id: &BookmarkId) -> Result<Option<Bookmark>, StoreError> {
        let bookmarks = self.bookmarks.read().await;
        Ok(bookmarks.iter().find(|b| &b.id == id).cloned())
    }

    async fn insert(&self, input: NewBookmark) -> Result<Bookmark, StoreError> {
        let bookmark = input.with_id(BookmarkId::generate());
        self.bookmarks.write().await.push(bookmark.clone());
        Ok(bookmark)
    }

    async fn update(&self, id: &BookmarkId, patch: BookmarkPatch) -> Result<(), StoreError> {
        let mut bookmarks = self.bookmarks.write().await;
        let bookmark = bookmarks
            .iter_mut()
            .find(|b| &b.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        patch.apply_to(bookmark);
        Ok(())
    }

    async fn delete(&self, id: &BookmarkId) -> Result<(), StoreError> {
        let mut bookmarks = self.bookmarks.write().await;
        let index = bookmarks
            .iter()
            .position(|b| &b.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        bookmarks.remove(index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_bookmark(title: &str) -> NewBookmark {
        NewBookmark {
            title: title.to_string(),
            url: format!("https://{title}.example"),
            rating: Rating::new(3).unwrap(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_empty_store_lists_nothing() {
        let store = MemoryStore::new();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids_in_order() {
        let store = MemoryStore::new();
        let a = store.insert(new_bookmark("a")).await.unwrap();
        let b = store.insert(new_bookmark("b")).await.unwrap();
        assert_ne!(a.id, b.id);

        let titles: Vec<_> = store.list().await.unwrap().into_iter().map(|b| b.title).collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_get_by_id_matches_parsed_route_ids() {
        let store = MemoryStore::with_bookmarks(vec![new_bookmark("two").with_id(BookmarkId::Key(2))]);
        let found = store.get_by_id(&BookmarkId::parse("2")).await.unwrap();
        assert_eq!(found.map(|b| b.title), Some("two".to_string()));
        assert_eq!(store.get_by_id(&BookmarkId::parse("3")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = MemoryStore::new();
        let created = store.insert(new_bookmark("a")).await.unwrap();
        store
            .update(
                &created.id,
                BookmarkPatch {
                    rating: Rating::new(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let updated = store.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(updated.rating.get(), 5);
        assert_eq!(updated.title, "a");
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_id() {
        let store = MemoryStore::new();
        let missing = BookmarkId::parse("nope");
        assert!(matches!(
            store.update(&missing, BookmarkPatch::default()).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(store.delete(&missing).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let store = MemoryStore::new();
        let created = store.insert(new_bookmark("a")).await.unwrap();
        store.delete(&created.id).await.unwrap();
        assert!(matches!(store.delete(&created.id).await, Err(StoreError::NotFound(_))));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_seeded_store() {
        let store = MemoryStore::seeded();
        let bookmarks = store.list().await.unwrap();
        assert_eq!(bookmarks.len(), 3);
        assert_eq!(bookmarks[1].title, "Thinkful");
        assert_eq!(bookmarks[1].rating.get(), 5);
    }
}
