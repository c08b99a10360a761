use serde::{Deserialize, Serialize};

use crate::model::{Bookmark, BookmarkId};

/// Outbound shape of a bookmark. Built on every read path, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedBookmark {
    pub id: BookmarkId,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub rating: i64,
}

impl From<&Bookmark> for SerializedBookmark {
    fn from(bookmark: &Bookmark) -> Self {
        SerializedBookmark {
            id: bookmark.id.clone(),
            title: escape_markup(&bookmark.title),
            url: bookmark.url.clone(),
            description: bookmark.description.as_deref().map(escape_markup),
            rating: bookmark.rating.get(),
        }
    }
}

pub fn serialize_bookmark(bookmark: &Bookmark) -> SerializedBookmark {
    SerializedBookmark::from(bookmark)
}

pub fn serialize_all(bookmarks: &[Bookmark]) -> Vec<SerializedBookmark> {
    bookmarks.iter().map(SerializedBookmark::from).collect()
}

/// Escapes angle brackets so no tag in stored text can open in the client's
/// document. Everything else, quotes included, is left as typed: with no `<`
/// there is no attribute context for a quote to break out of.
pub fn escape_markup(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
