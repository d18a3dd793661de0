//! Document Store Module
//!
//! In-memory document collections and the query layer used to read them.

mod collection;
mod object_id;
mod query;

pub use collection::{Collection, Index, SharedCollection};
pub use object_id::ObjectId;
pub use query::{Criteria, Projection, Query, SortOrder, PUBLIC_ID_FIELD, SCORE_FIELD};

/// A stored JSON document.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Name of the collection holding movies
pub const MOVIES_COLLECTION: &str = "movies";

/// Internal identifier field of stored documents
pub const ID_FIELD: &str = "_id";
