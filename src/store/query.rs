//! Query Module
//!
//! Fluent builder to read documents out of a [`Collection`].
//!
//! ```ignore
//! let movies = Query::new(collection)
//!     .filter(Criteria::TitleSearch("copycat".into()))
//!     .select(Projection::include(["title", "release_year", "score"]))
//!     .sort(SortOrder::TextScore)
//!     .limit(20)
//!     .find()
//!     .await?;
//! ```
//!
//! Returned documents carry their identifier as `id` instead of `_id`.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde_json::{Number, Value};

use crate::error::StoreError;
use crate::store::{Collection, Document, Index, ObjectId, SharedCollection, ID_FIELD};

/// Public name of the identifier field
pub const PUBLIC_ID_FIELD: &str = "id";

/// Name of the text search relevance field
pub const SCORE_FIELD: &str = "score";

/// Field searched by [`Criteria::TitleSearch`]
const TITLE_FIELD: &str = "title";

/// Words ignored when scoring a text search
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "in", "is", "it", "of", "on",
    "or", "the", "to", "with",
];

// == Criteria ==
/// Condition a document must satisfy to be returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Criteria {
    /// Every document
    #[default]
    All,
    /// Document with the given id
    Id(ObjectId),
    /// Documents whose field equals the value
    Equals(String, Value),
    /// Title text search, falling back to a case-insensitive match of any word.
    /// Needs a text index on the title.
    TitleSearch(String),
}

impl Criteria {
    /// Returns the relevance of `document`, or None if it does not match.
    fn score(&self, document: &Document) -> Option<f64> {
        match self {
            Criteria::All => Some(0.0),
            Criteria::Id(id) => {
                let hex = id.to_hex();
                (document.get(ID_FIELD).and_then(Value::as_str) == Some(hex.as_str()))
                    .then_some(0.0)
            }
            Criteria::Equals(field, value) => (document.get(field) == Some(value)).then_some(0.0),
            Criteria::TitleSearch(text) => document
                .get(TITLE_FIELD)
                .and_then(Value::as_str)
                .and_then(|title| title_score(title, text)),
        }
    }
}

/// Scores a title against the words of `text`.
///
/// Each non stop word equal to a title word adds one point. A title that only
/// contains one of the words somewhere matches with a score of zero.
fn title_score(title: &str, text: &str) -> Option<f64> {
    let words: Vec<String> = text.split_whitespace().map(str::to_lowercase).collect();
    if words.is_empty() {
        return None;
    }

    let title = title.to_lowercase();
    let title_words: HashSet<&str> = title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let score = words
        .iter()
        .filter(|w| !STOP_WORDS.contains(&w.as_str()) && title_words.contains(w.as_str()))
        .count();

    if score > 0 {
        Some(score as f64)
    } else if words.iter().any(|w| title.contains(w.as_str())) {
        Some(0.0)
    } else {
        None
    }
}

// == Projection ==
/// Fields to keep in or drop from returned documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Keep only these fields plus the id
    Include(Vec<String>),
    /// Drop these fields
    Exclude(Vec<String>),
}

impl Projection {
    pub fn include<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Include(fields.into_iter().map(Into::into).collect())
    }

    pub fn exclude<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Exclude(fields.into_iter().map(Into::into).collect())
    }

    fn apply(&self, document: &mut Document) {
        match self {
            Projection::Include(fields) => {
                document.retain(|key, _| key == ID_FIELD || fields.iter().any(|f| f == key));
            }
            Projection::Exclude(fields) => {
                document.retain(|key, _| !fields.iter().any(|f| f == key));
            }
        }
    }
}

// == Sort Order ==
/// Ordering of returned documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOrder {
    Ascending(String),
    Descending(String),
    /// Most relevant text search results first
    TextScore,
}

impl SortOrder {
    fn compare(&self, a: &(f64, &Document), b: &(f64, &Document)) -> Ordering {
        match self {
            SortOrder::Ascending(field) => compare_values(a.1.get(field), b.1.get(field)),
            SortOrder::Descending(field) => compare_values(b.1.get(field), a.1.get(field)),
            SortOrder::TextScore => b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal),
        }
    }
}

/// Orders values as null < numbers < strings < objects < arrays < booleans.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Number(_)) => 1,
            Some(Value::String(_)) => 2,
            Some(Value::Object(_)) => 3,
            Some(Value::Array(_)) => 4,
            Some(Value::Bool(_)) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

// == Query ==
/// Builder for reads and writes against one collection.
#[derive(Debug)]
pub struct Query {
    collection: SharedCollection,
    criteria: Criteria,
    projection: Option<Projection>,
    sort: Option<SortOrder>,
    /// Maximum number of documents, 0 means unlimited
    limit: usize,
}

impl Query {
    // == Constructor ==
    /// Starts a query matching every document of `collection`.
    pub fn new(collection: SharedCollection) -> Self {
        Self {
            collection,
            criteria: Criteria::All,
            projection: None,
            sort: None,
            limit: 0,
        }
    }

    // == Builder Methods ==
    /// Sets the criteria documents must match.
    pub fn filter(mut self, criteria: Criteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// Sets the fields to retrieve or leave out.
    pub fn select(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn sort(mut self, order: SortOrder) -> Self {
        self.sort = Some(order);
        self
    }

    /// Sets the maximum number of documents to retrieve.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    // == Reads ==
    /// Retrieves the first matching document.
    pub async fn find_one(self) -> Result<Option<Document>, StoreError> {
        Ok(self.limit(1).find().await?.into_iter().next())
    }

    /// Retrieves all matching documents.
    ///
    /// A title search fails unless the collection has a text index on the
    /// title.
    pub async fn find(self) -> Result<Vec<Document>, StoreError> {
        let collection = self.collection.read().await;

        if matches!(self.criteria, Criteria::TitleSearch(_))
            && !collection.has_index(&Index::Text(TITLE_FIELD.to_string()))
        {
            return Err(StoreError::MissingTextIndex {
                collection: collection.name().to_string(),
                field: TITLE_FIELD.to_string(),
            });
        }

        let mut matches: Vec<(f64, &Document)> = collection
            .documents()
            .iter()
            .filter_map(|doc| self.criteria.score(doc).map(|score| (score, doc)))
            .collect();

        if let Some(order) = &self.sort {
            matches.sort_by(|a, b| order.compare(a, b));
        }

        let limit = if self.limit == 0 { usize::MAX } else { self.limit };
        Ok(matches
            .into_iter()
            .take(limit)
            .map(|(score, doc)| self.prepare_document(doc, score))
            .collect())
    }

    // == Writes ==
    /// Inserts documents in order, stopping at the first failure.
    pub async fn insert(self, documents: Vec<Document>) -> Result<Vec<ObjectId>, StoreError> {
        let mut collection = self.collection.write().await;
        documents
            .into_iter()
            .map(|document| collection.insert(document))
            .collect()
    }

    /// Creates the text and unique indexes on the title field.
    pub async fn ensure_indexes(self) {
        let mut collection = self.collection.write().await;
        ensure_title_indexes(&mut collection);
    }

    /// Copies a stored document into its public shape.
    fn prepare_document(&self, document: &Document, score: f64) -> Document {
        let mut document = document.clone();

        if matches!(self.criteria, Criteria::TitleSearch(_)) {
            if let Some(score) = Number::from_f64(score) {
                document.insert(SCORE_FIELD.to_string(), Value::Number(score));
            }
        }

        if let Some(projection) = &self.projection {
            projection.apply(&mut document);
        }

        if let Some(id) = document.remove(ID_FIELD) {
            document.insert(PUBLIC_ID_FIELD.to_string(), id);
        }
        document
    }
}

fn ensure_title_indexes(collection: &mut Collection) {
    collection.ensure_index(Index::Text(TITLE_FIELD.to_string()));
    collection.ensure_index(Index::Unique(TITLE_FIELD.to_string()));
}
