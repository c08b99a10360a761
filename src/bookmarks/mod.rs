//! Bookmarks Resource Router
//!
//! Maps the bookmark HTTP surface onto validator, store and serializer calls:
//!
//! | Verb   | Path             | Success                         |
//! |--------|------------------|---------------------------------|
//! | GET    | `/bookmarks`     | 200, list of bookmarks          |
//! | POST   | `/bookmarks`     | 201, `Location` + new bookmark  |
//! | GET    | `/bookmarks/:id` | 200, one bookmark               |
//! | PATCH  | `/bookmarks/:id` | 204                             |
//! | DELETE | `/bookmarks/:id` | 204                             |
//!
//! The bearer-token gate is applied by [`crate::app`] around the whole router,
//! so handlers here never see unauthenticated requests.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bookmarks::bookmarks;
//!
//! let app = Router::new()
//!     .nest("/api", bookmarks::routes())
//!     .with_state(app_state);
//! ```

mod handler;
mod routes;

pub use routes::routes;
