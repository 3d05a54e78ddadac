//! Document store operations: keyed reads and writes plus live equality
//! queries.

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use shell::Subscription;

use super::ServiceError;

/// `collection/id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath {
    pub collection: String,
    pub id: String,
}

impl DocPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self { collection: collection.into(), id: id.into() }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Documents of one collection whose `field` equals `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub field: String,
    pub value: Value,
}

impl Query {
    pub fn where_eq(collection: impl Into<String>, field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { collection: collection.into(), field: field.into(), value: value.into() }
    }

    #[must_use]
    pub fn matches(&self, data: &Value) -> bool {
        data.get(&self.field) == Some(&self.value)
    }
}

/// One document in a query result.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub data: Value,
}

impl Record {
    /// Deserialize the document body.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] when the body does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ServiceError> {
        Ok(T::deserialize(&self.data)?)
    }
}

/// Query result at one point in time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub records: Vec<Record>,
}

impl Snapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub type SnapshotCallback = Rc<dyn Fn(&Snapshot)>;

#[async_trait(?Send)]
pub trait DocumentStore {
    /// Read one document. A missing document is `Ok(None)`.
    async fn get(&self, path: &DocPath) -> Result<Option<Value>, ServiceError>;

    /// Create or replace one document.
    async fn set(&self, path: &DocPath, data: Value) -> Result<(), ServiceError>;

    /// Live query: the callback gets the current result immediately, then a
    /// fresh result after every write to the collection.
    fn watch(&self, query: &Query, callback: SnapshotCallback) -> Subscription;
}
