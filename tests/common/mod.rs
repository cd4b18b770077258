#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use pbauth_adapter::{
    AdapterConfig, AdapterError, AdminSession, BulkRecordStore, Connect, ConnectionParams, HostContext, ListOptions,
    ListResult, PocketBaseAdapter, Record, RecordStore,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// A backend call as observed by [`MemoryBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create {
        collection: String,
    },
    List {
        collection: String,
        page: u64,
        per_page: u64,
        filter: Option<String>,
        sort: Option<String>,
    },
    Update {
        collection: String,
        id: String,
    },
    Delete {
        collection: String,
        id: String,
    },
    Login {
        email: String,
    },
}

/// In-memory stand-in for PocketBase.
///
/// Filters are recorded but not evaluated: every list call sees the whole
/// collection, so tests seed exactly the records they expect to match.
#[derive(Default)]
pub struct MemoryBackend {
    records: Mutex<HashMap<String, Vec<Record>>>,
    calls: Mutex<Vec<Call>>,
    token: Mutex<Option<String>>,
    session_valid: AtomicBool,
    next_id: AtomicU64,
    fail_create: AtomicBool,
    fail_list: AtomicBool,
    reject_login: AtomicBool,
    fail_update_for: Mutex<Option<String>>,
    fail_delete_for: Mutex<Option<String>>,
    server_fields: Mutex<Record>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert records directly, bypassing call recording
    pub fn seed(&self, collection: &str, records: Vec<Value>) {
        let mut store = self.records.lock();
        let entries = store.entry(collection.to_string()).or_default();
        for value in records {
            entries.push(to_record(value));
        }
    }

    pub fn records(&self, collection: &str) -> Vec<Record> {
        self.records.lock().get(collection).cloned().unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn list_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|call| matches!(call, Call::List { .. })).collect()
    }

    pub fn update_calls(&self) -> usize {
        self.calls().iter().filter(|call| matches!(call, Call::Update { .. })).count()
    }

    pub fn delete_calls(&self) -> usize {
        self.calls().iter().filter(|call| matches!(call, Call::Delete { .. })).count()
    }

    pub fn login_calls(&self) -> usize {
        self.calls().iter().filter(|call| matches!(call, Call::Login { .. })).count()
    }

    pub fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    pub fn fail_list(&self) {
        self.fail_list.store(true, Ordering::SeqCst);
    }

    pub fn reject_login(&self) {
        self.reject_login.store(true, Ordering::SeqCst);
    }

    pub fn fail_update_for(&self, id: &str) {
        *self.fail_update_for.lock() = Some(id.to_string());
    }

    pub fn fail_delete_for(&self, id: &str) {
        *self.fail_delete_for.lock() = Some(id.to_string());
    }

    /// Fields the "server" stamps onto every updated record
    pub fn stamp_on_update(&self, fields: Value) {
        *self.server_fields.lock() = to_record(fields);
    }

    /// Mark the stored session as expired without clearing the token
    pub fn expire_session(&self) {
        self.session_valid.store(false, Ordering::SeqCst);
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

impl Connect for MemoryBackend {
    fn connect(_params: &ConnectionParams) -> Result<Self, AdapterError> {
        Ok(Self::new())
    }
}

#[async_trait]
impl RecordStore for MemoryBackend {
    async fn create(&self, collection: &str, payload: &Record) -> Result<Record, AdapterError> {
        self.record(Call::Create {
            collection: collection.to_string(),
        });
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AdapterError::backend(400, "Failed to create record."));
        }
        let mut created = payload.clone();
        if !created.contains_key("id") {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            created.insert("id".into(), Value::String(format!("rec{id}")));
        }
        self.records
            .lock()
            .entry(collection.to_string())
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn get_list(
        &self,
        collection: &str,
        page: u64,
        per_page: u64,
        options: &ListOptions,
    ) -> Result<ListResult, AdapterError> {
        self.record(Call::List {
            collection: collection.to_string(),
            page,
            per_page,
            filter: options.filter.clone(),
            sort: options.sort.clone(),
        });
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(AdapterError::backend(503, "Service unavailable"));
        }
        let all = self.records(collection);
        let total_items = all.len() as u64;
        let skip = usize::try_from((page - 1) * per_page).unwrap_or(usize::MAX);
        let take = usize::try_from(per_page).unwrap_or(usize::MAX);
        Ok(ListResult {
            page,
            per_page,
            total_items,
            total_pages: total_items.div_ceil(per_page),
            items: all.into_iter().skip(skip).take(take).collect(),
        })
    }

    async fn update(&self, collection: &str, id: &str, payload: &Record) -> Result<Record, AdapterError> {
        self.record(Call::Update {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        if self.fail_update_for.lock().as_deref() == Some(id) {
            return Err(AdapterError::backend(500, "Something went wrong"));
        }
        let stamp = self.server_fields.lock().clone();
        let mut store = self.records.lock();
        let record = store
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|record| record["id"] == id))
            .ok_or_else(|| AdapterError::backend(404, "The requested resource wasn't found."))?;
        record.extend(payload.clone());
        let mut returned = record.clone();
        returned.extend(stamp);
        Ok(returned)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AdapterError> {
        self.record(Call::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        if self.fail_delete_for.lock().as_deref() == Some(id) {
            return Err(AdapterError::backend(500, "Something went wrong"));
        }
        let mut store = self.records.lock();
        let records = store.entry(collection.to_string()).or_default();
        let before = records.len();
        records.retain(|record| record["id"] != id);
        if records.len() == before {
            return Err(AdapterError::backend(404, "The requested resource wasn't found."));
        }
        Ok(())
    }
}

impl BulkRecordStore for MemoryBackend {}

#[async_trait]
impl AdminSession for MemoryBackend {
    fn token(&self) -> Option<String> {
        self.token.lock().clone()
    }

    fn is_valid(&self) -> bool {
        self.token.lock().is_some() && self.session_valid.load(Ordering::SeqCst)
    }

    fn save_token(&self, token: &str, _record: Option<Record>) {
        *self.token.lock() = Some(token.to_string());
        self.session_valid.store(true, Ordering::SeqCst);
    }

    async fn auth_with_password(&self, email: &str, _password: &str) -> Result<(), AdapterError> {
        self.record(Call::Login {
            email: email.to_string(),
        });
        if self.reject_login.load(Ordering::SeqCst) {
            return Err(AdapterError::Unauthenticated(
                "PocketBase responded with 400: Failed to authenticate.".into(),
            ));
        }
        self.save_token("admin-session-token", None);
        Ok(())
    }
}

/// Host context that keeps every debug line for inspection
#[derive(Default)]
pub struct RecordingHost {
    pub lines: Mutex<Vec<String>>,
}

impl HostContext for RecordingHost {
    fn debug_log(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }
}

pub fn to_record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Adapter over a caller-managed in-memory backend
pub fn setup_adapter() -> (PocketBaseAdapter<MemoryBackend>, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::new());
    let adapter = PocketBaseAdapter::new(AdapterConfig::from_client(Arc::clone(&backend)))
        .expect("in-memory adapter should build");
    (adapter, backend)
}

/// Adapter that builds its own backend from connection parameters
pub fn setup_bootstrapped_adapter(params: ConnectionParams) -> PocketBaseAdapter<MemoryBackend> {
    PocketBaseAdapter::new(AdapterConfig::from_params(params)).expect("in-memory adapter should build")
}
