pub mod catalog;
pub mod cli;
pub mod config;
pub mod content;
pub mod editor;
pub mod error;
pub mod query;
pub mod service;
pub mod slug;
pub mod storage;
pub mod user;
pub mod warnings;

pub use catalog::Catalog;
pub use content::{ContentItem, ContentKind, ContentStatus};
pub use error::{GroveError, Result};
pub use query::{apply, filter, sort, QueryParams, SortBy};
pub use slug::generate_slug;
pub use storage::LoroStore;
