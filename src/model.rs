use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a stored bookmark.
///
/// Ids reach the service in two shapes: sequential integer keys handed out by the
/// relational store and opaque tokens handed out by the in-memory store. Route
/// parameters always arrive as text, so every id is normalized through
/// [`BookmarkId::parse`] before it is compared; `"2"` and `2` name the same bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookmarkId {
    Key(i64),
    Token(String),
}

impl BookmarkId {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(key) => BookmarkId::Key(key),
            Err(_) => BookmarkId::Token(raw.to_string()),
        }
    }

    pub fn generate() -> Self {
        BookmarkId::Token(Uuid::new_v4().to_string())
    }

    pub fn as_key(&self) -> Option<i64> {
        match self {
            BookmarkId::Key(key) => Some(*key),
            BookmarkId::Token(_) => None,
        }
    }
}

impl fmt::Display for BookmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkId::Key(key) => write!(f, "{}", key),
            BookmarkId::Token(token) => write!(f, "{}", token),
        }
    }
}

impl From<i64> for BookmarkId {
    fn from(key: i64) -> Self {
        BookmarkId::Key(key)
    }
}

/// A rating in the inclusive range 0..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MAX: i64 = 5;

    pub fn new(value: i64) -> Option<Self> {
        if (0..=Self::MAX).contains(&value) {
            Some(Rating(value as u8))
        } else {
            None
        }
    }

    pub fn get(self) -> i64 {
        self.0 as i64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bookmark {
    pub id: BookmarkId,
    pub title: String,
    pub url: String,
    pub rating: Rating,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBookmark {
    pub title: String,
    pub url: String,
    pub rating: Rating,
    pub description: Option<String>,
}

impl NewBookmark {
    pub fn with_id(self, id: BookmarkId) -> Bookmark {
        Bookmark {
            id,
            title: self.title,
            url: self.url,
            rating: self.rating,
            description: self.description,
        }
    }
}

/// The fields a partial update replaces. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub rating: Option<Rating>,
    pub description: Option<String>,
}

impl BookmarkPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.url.is_none() && self.rating.is_none() && self.description.is_none()
    }

    pub fn apply_to(self, bookmark: &mut Bookmark) {
        if let Some(title) = self.title {
            bookmark.title = title;
        }
        if let Some(url) = self.url {
            bookmark.url = url;
        }
        if let Some(rating) = self.rating {
            bookmark.rating = rating;
        }
        if let Some(description) = self.description {
            bookmark.description = Some(description);
        }
    }
}
