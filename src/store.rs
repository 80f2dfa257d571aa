//! Content retrieval over a document store.
//!
//! The site only ever reads: equality filters, one sort key and a limit.
//! Stores that need a composite index for "filter on one field, sort on
//! another" may refuse such queries; [`Library`] then reruns the query
//! unordered and sorts on the client.

use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::content::{Experience, Post, Project};

pub const POSTS: &str = "posts";
pub const PROJECTS: &str = "projects";
pub const EXPERIENCES: &str = "experiences";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Query on {collection} needs a composite index on {fields:?}")]
    MissingIndex {
        collection: String,
        fields: Vec<String>,
    },

    #[error("Unknown collection {0}")]
    UnknownCollection(String),

    #[error("Failed to read snapshot at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse snapshot at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to decode {collection} document {id}: {source}")]
    Decode {
        collection: String,
        id: String,
        source: serde_json::Error,
    },

    #[error("Failed to fetch {what}: {source}")]
    Query {
        what: String,
        source: Box<StoreError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push((field.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Fields a composite index must cover, or `None` when single-field
    /// indexes are enough.
    fn composite_fields(&self) -> Option<Vec<String>> {
        let (order_field, _) = self.order_by.as_ref()?;
        let mut fields: Vec<String> = self
            .filters
            .iter()
            .map(|(field, _)| field.clone())
            .filter(|field| field != order_field)
            .collect();
        if fields.is_empty() {
            return None;
        }
        fields.push(order_field.clone());
        fields.sort();
        fields.dedup();
        Some(fields)
    }

    fn matches(&self, fields: &Map<String, Value>) -> bool {
        self.filters
            .iter()
            .all(|(field, value)| fields.get(field) == Some(value))
    }
}

/// A stored record: its id plus whatever fields the store holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    fn decode<T: DeserializeOwned>(self, collection: &str) -> Result<T, StoreError> {
        let mut fields = self.fields;
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(fields)).map_err(|source| StoreError::Decode {
            collection: collection.to_string(),
            id: self.id,
            source,
        })
    }
}

pub trait DocumentSource {
    fn run(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Look a document up by id.
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self
            .run(collection, &Query::new())?
            .into_iter()
            .find(|doc| doc.id == id))
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct IndexSpec {
    pub collection: String,
    pub fields: Vec<String>,
}

/// An in-memory store loaded from a JSON export.
///
/// Every top-level array is a collection; other top-level keys (export
/// metadata and the like) are ignored, as are array entries that are not
/// objects. When `indexes` is present, ordered queries that filter on another
/// field fail unless a matching index is declared.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    indexes: Option<Vec<IndexSpec>>,
    #[serde(flatten)]
    collections: Map<String, Value>,
}

impl Snapshot {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn has_index(&self, collection: &str, fields: &[String]) -> bool {
        let Some(indexes) = &self.indexes else {
            return true;
        };
        indexes.iter().any(|index| {
            let mut declared = index.fields.clone();
            declared.sort();
            declared.dedup();
            index.collection == collection && declared == fields
        })
    }
}

impl DocumentSource for Snapshot {
    fn run(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let records = self
            .collections
            .get(collection)
            .and_then(Value::as_array)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        if let Some(fields) = query.composite_fields() {
            if !self.has_index(collection, &fields) {
                return Err(StoreError::MissingIndex {
                    collection: collection.to_string(),
                    fields,
                });
            }
        }

        let mut documents: Vec<Document> = records
            .iter()
            .enumerate()
            .filter_map(|(position, record)| Some((position, record.as_object()?)))
            .filter(|(_, fields)| query.matches(fields))
            .map(|(position, fields)| Document {
                id: fields
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{collection}-{position}")),
                fields: fields.clone(),
            })
            .collect();

        if let Some((field, direction)) = &query.order_by {
            // An ordered query only sees documents that have the sort field.
            documents.retain(|doc| doc.fields.get(field).is_some_and(|v| !v.is_null()));
            sort_documents(&mut documents, field, *direction);
        }
        if let Some(limit) = query.limit {
            documents.truncate(limit);
        }

        debug!(
            "snapshot query on {collection} returned {} documents",
            documents.len()
        );
        Ok(documents)
    }
}

/// Stable sort on one field. Documents without the field go last whatever
/// the direction.
pub fn sort_documents(documents: &mut [Document], field: &str, direction: Direction) {
    documents.sort_by(|a, b| {
        let left = a.fields.get(field).filter(|v| !v.is_null());
        let right = b.fields.get(field).filter(|v| !v.is_null());
        match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(left), Some(right)) => match direction {
                Direction::Ascending => compare_values(left, right),
                Direction::Descending => compare_values(right, left),
            },
        }
    });
}

fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::String(l), Value::String(r)) => l.cmp(r),
        (Value::Number(l), Value::Number(r)) => l
            .as_f64()
            .partial_cmp(&r.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
        _ => Ordering::Equal,
    }
}

/// The site's read queries over a document source.
pub struct Library<S> {
    source: S,
}

impl<S: DocumentSource> Library<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Published posts, newest first.
    pub fn published_posts(&self, limit: usize) -> Result<Vec<Post>, StoreError> {
        let query = Query::new()
            .where_eq("isPublished", true)
            .order_by("publishedAt", Direction::Descending)
            .limit(limit);
        self.fetch_all(POSTS, &query, "published posts")
    }

    pub fn post_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let query = Query::new()
            .where_eq("slug", slug)
            .where_eq("isPublished", true)
            .limit(1);
        Ok(self.fetch_all(POSTS, &query, "post")?.into_iter().next())
    }

    pub fn all_projects(&self) -> Result<Vec<Project>, StoreError> {
        let query = Query::new().order_by("createdAt", Direction::Descending);
        self.fetch_all(PROJECTS, &query, "projects")
    }

    pub fn published_projects(&self) -> Result<Vec<Project>, StoreError> {
        let query = Query::new()
            .where_eq("isPublished", true)
            .order_by("createdAt", Direction::Descending);
        self.fetch_all(PROJECTS, &query, "published projects")
    }

    pub fn featured_projects(&self) -> Result<Vec<Project>, StoreError> {
        let query = Query::new()
            .where_eq("isPublished", true)
            .where_eq("featured", true)
            .order_by("createdAt", Direction::Descending);
        self.fetch_all(PROJECTS, &query, "featured projects")
    }

    pub fn project_by_slug(&self, slug: &str) -> Result<Option<Project>, StoreError> {
        let query = Query::new()
            .where_eq("slug", slug)
            .where_eq("isPublished", true)
            .limit(1);
        Ok(self
            .fetch_all(PROJECTS, &query, "project")?
            .into_iter()
            .next())
    }

    /// Any project, published or not, by document id.
    pub fn project_by_id(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let document = self.source.get(PROJECTS, id).map_err(|source| StoreError::Query {
            what: format!("project {id}"),
            source: Box::new(source),
        })?;
        document.map(|doc| doc.decode(PROJECTS)).transpose()
    }

    /// Work history, most recent start first.
    pub fn all_experiences(&self) -> Result<Vec<Experience>, StoreError> {
        let query = Query::new().order_by("startDate", Direction::Descending);
        self.fetch_all(EXPERIENCES, &query, "experiences")
    }

    fn fetch_all<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &Query,
        what: &str,
    ) -> Result<Vec<T>, StoreError> {
        self.fetch(collection, query, what)?
            .into_iter()
            .map(|doc| doc.decode(collection))
            .collect()
    }

    fn fetch(
        &self,
        collection: &str,
        query: &Query,
        what: &str,
    ) -> Result<Vec<Document>, StoreError> {
        let wrap = |source: StoreError| StoreError::Query {
            what: what.to_string(),
            source: Box::new(source),
        };

        match self.source.run(collection, query) {
            Ok(documents) => Ok(documents),
            Err(err @ StoreError::MissingIndex { .. }) => {
                warn!("Index not available for {what}, using fallback query: {err}");
                let unordered = Query {
                    filters: query.filters.clone(),
                    order_by: None,
                    limit: None,
                };
                let mut documents = self.source.run(collection, &unordered).map_err(wrap)?;
                if let Some((field, direction)) = &query.order_by {
                    sort_documents(&mut documents, field, *direction);
                }
                if let Some(limit) = query.limit {
                    documents.truncate(limit);
                }
                Ok(documents)
            }
            Err(err) => Err(wrap(err)),
        }
    }
}
