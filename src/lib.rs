//! PocketBase adapter for an authentication framework's generic CRUD contract.
//!
//! The crate compiles structured where-clauses into PocketBase filter
//! expressions and maps create/find/update/delete/count onto PocketBase's
//! paginated record endpoints, bootstrapping an admin session as needed.

pub mod backend;
pub mod config;
pub mod core;
pub mod errors;
pub mod filtering;
pub mod operations;

pub use crate::backend::{AdminAuthEndpoint, AuthStore, PocketBaseClient};
pub use crate::config::{AdapterConfig, AdapterOptions, ConnectionParams, ConnectionSource};
pub use crate::core::{
    AdminSession, Backend, BulkRecordStore, Connect, DefaultHostContext, HostContext, ListOptions, ListResult, Record,
    RecordStore,
};
pub use crate::errors::{AdapterError, FilterError, Lookup};
pub use crate::filtering::{Condition, FilterOperator, SortBy, SortDirection, compile_where, try_compile_where};
pub use crate::operations::PocketBaseAdapter;
