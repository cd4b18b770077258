use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::skip_serializing_none;

use crate::config::ConnectionParams;
use crate::errors::{AdapterError, Lookup};
use crate::filtering::BULK_FETCH_LIMIT;

/// A backend record: field name to JSON value, passed through untouched
pub type Record = Map<String, Value>;

/// Optional query parameters for a list request
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListOptions {
    pub filter: Option<String>,
    pub sort: Option<String>,
}

impl ListOptions {
    /// Build options from a compiled filter, dropping it when empty
    pub fn filtered(filter: &str) -> Self {
        Self {
            filter: (!filter.is_empty()).then(|| filter.to_string()),
            sort: None,
        }
    }

    #[must_use]
    pub fn with_sort(mut self, sort: Option<String>) -> Self {
        self.sort = sort;
        self
    }
}

/// One page of a collection listing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult {
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub per_page: u64,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub items: Vec<Record>,
}

/// Extract a record's identifier
///
/// # Errors
///
/// Returns `AdapterError::MissingRecordId` if the record has no string `id`.
pub fn record_id<'a>(collection: &str, record: &'a Record) -> Result<&'a str, AdapterError> {
    record
        .get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| AdapterError::MissingRecordId {
            collection: collection.to_string(),
        })
}

/// Per-collection record operations the adapter needs from its backend.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create(&self, collection: &str, payload: &Record) -> Result<Record, AdapterError>;

    async fn get_list(
        &self,
        collection: &str,
        page: u64,
        per_page: u64,
        options: &ListOptions,
    ) -> Result<ListResult, AdapterError>;

    async fn update(&self, collection: &str, id: &str, payload: &Record) -> Result<Record, AdapterError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AdapterError>;

    /// First record matching `filter`. When several match, which one comes
    /// back is up to the backend's default ordering.
    async fn first_match(&self, collection: &str, filter: &str) -> Lookup<Record> {
        self.get_list(collection, 1, 1, &ListOptions::filtered(filter))
            .await
            .map(|listing| listing.items.into_iter().next())
            .into()
    }
}

/// Multi-record writes.
///
/// The default methods emulate bulk writes by fetching up to
/// [`BULK_FETCH_LIMIT`] matches in one page and issuing one call per record,
/// strictly sequentially. A backend with native bulk endpoints overrides them.
#[async_trait]
pub trait BulkRecordStore: RecordStore {
    /// Apply `patch` to every matching record, returning how many were updated.
    ///
    /// # Errors
    ///
    /// Fails without writing anything if the fetch fails. A per-record failure
    /// stops the loop with `AdapterError::PartialBulk`; earlier writes stay.
    async fn update_matching(&self, collection: &str, filter: &str, patch: &Record) -> Result<u64, AdapterError> {
        let listing = self
            .get_list(collection, 1, BULK_FETCH_LIMIT, &ListOptions::filtered(filter))
            .await?;
        let matched = listing.items.len() as u64;
        let mut completed = 0;
        for record in &listing.items {
            let outcome = match record_id(collection, record) {
                Ok(id) => self.update(collection, id, patch).await.map(drop),
                Err(err) => Err(err),
            };
            if let Err(source) = outcome {
                return Err(AdapterError::PartialBulk {
                    completed,
                    matched,
                    source: Box::new(source),
                });
            }
            completed += 1;
        }
        Ok(completed)
    }

    /// Delete every matching record, returning how many were deleted.
    ///
    /// # Errors
    ///
    /// Same contract as [`BulkRecordStore::update_matching`].
    async fn delete_matching(&self, collection: &str, filter: &str) -> Result<u64, AdapterError> {
        let listing = self
            .get_list(collection, 1, BULK_FETCH_LIMIT, &ListOptions::filtered(filter))
            .await?;
        let matched = listing.items.len() as u64;
        let mut completed = 0;
        for record in &listing.items {
            let outcome = match record_id(collection, record) {
                Ok(id) => self.delete(collection, id).await,
                Err(err) => Err(err),
            };
            if let Err(source) = outcome {
                return Err(AdapterError::PartialBulk {
                    completed,
                    matched,
                    source: Box::new(source),
                });
            }
            completed += 1;
        }
        Ok(completed)
    }
}

/// The authenticated session held by a backend handle.
#[async_trait]
pub trait AdminSession: Send + Sync {
    /// Currently stored token, `None` when there is none
    fn token(&self) -> Option<String>;

    /// Cheap local validity check; never performs a network call
    fn is_valid(&self) -> bool;

    fn save_token(&self, token: &str, record: Option<Record>);

    /// Privileged email/password login; on success the session is stored.
    async fn auth_with_password(&self, email: &str, password: &str) -> Result<(), AdapterError>;
}

/// Construct a backend handle from raw connection parameters
pub trait Connect: Sized {
    /// # Errors
    ///
    /// Returns an error if the parameters cannot produce a handle (e.g. a bad URL).
    fn connect(params: &ConnectionParams) -> Result<Self, AdapterError>;
}

/// Everything the adapter needs from a backend
pub trait Backend: BulkRecordStore + AdminSession {}

impl<T: BulkRecordStore + AdminSession> Backend for T {}
