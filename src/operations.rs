//! # Adapter Operations
//!
//! [`PocketBaseAdapter`] exposes the eight data-access operations the host
//! authentication framework calls: `create`, `find_one`, `find_many`,
//! `count`, `update`, `update_many`, `delete` and `delete_many`.
//!
//! Every operation resolves the model's collection name, compiles its
//! conditions and runs [`PocketBaseAdapter::ensure_authenticated`] before
//! touching the backend. Conditions that cannot be compiled safely fail the
//! operation without sending any request.
//!
//! ## Error policy
//!
//! `create` propagates backend errors. All other operations never fail:
//! they return `None`, an empty list or `0` instead, so "nothing matched"
//! and "the backend was unreachable" look the same to the caller.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pbauth_adapter::{AdapterConfig, ConnectionParams, Condition, PocketBaseAdapter, PocketBaseClient};
//!
//! let params = ConnectionParams::new("http://127.0.0.1:8090")
//!     .with_admin_credentials("root@example.com", "secret");
//! let adapter = PocketBaseAdapter::<PocketBaseClient>::new(AdapterConfig::from_params(params))?;
//!
//! let user = adapter.find_one("user", &[Condition::eq("email", "a@b.co")]).await;
//! ```

use std::sync::Arc;

use crate::config::{AdapterConfig, AdapterOptions, ConnectionParams, ConnectionSource};
use crate::core::{Backend, Connect, DefaultHostContext, HostContext, ListOptions, Record, record_id};
use crate::errors::{AdapterError, Lookup};
use crate::filtering::{Condition, SortBy, page_for, parse_sorting, try_compile_where};

/// Adapter identifier reported to the host framework
pub const ADAPTER_ID: &str = "pocketbase";

/// Human-readable adapter name
pub const ADAPTER_NAME: &str = "PocketBase Adapter";

/// How the admin session is obtained
#[derive(Debug)]
enum SessionSource {
    /// Caller-managed handle; never touched
    Managed,
    /// Token or admin credentials applied before each call
    Bootstrap(ConnectionParams),
}

/// CRUD façade over a PocketBase-like backend.
pub struct PocketBaseAdapter<B, H = DefaultHostContext> {
    backend: Arc<B>,
    session: SessionSource,
    options: AdapterOptions,
    host: H,
}

impl<B> PocketBaseAdapter<B>
where
    B: Backend + Connect,
{
    /// Build an adapter with the default host context.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be built from connection parameters.
    pub fn new(config: AdapterConfig<B>) -> Result<Self, AdapterError> {
        Self::with_host(config, DefaultHostContext)
    }
}

impl<B, H> PocketBaseAdapter<B, H>
where
    B: Backend + Connect,
    H: HostContext,
{
    /// Build an adapter using the host framework's naming and logging helpers.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be built from connection parameters.
    pub fn with_host(config: AdapterConfig<B>, host: H) -> Result<Self, AdapterError> {
        let (backend, session) = match config.connection {
            ConnectionSource::Client(client) => (client, SessionSource::Managed),
            ConnectionSource::Params(params) => (Arc::new(B::connect(&params)?), SessionSource::Bootstrap(params)),
        };
        Ok(Self {
            backend,
            session,
            options: config.options,
            host,
        })
    }
}

impl<B, H> PocketBaseAdapter<B, H>
where
    B: Backend,
    H: HostContext,
{
    #[must_use]
    pub fn id(&self) -> &'static str {
        ADAPTER_ID
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        ADAPTER_NAME
    }

    /// Options echoed back to the host framework
    #[must_use]
    pub fn options(&self) -> AdapterOptions {
        self.options
    }

    /// The backend handle this adapter talks to
    #[must_use]
    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Make sure the backend handle carries an admin session.
    ///
    /// - Caller-managed handles are left alone.
    /// - A configured token replaces a different stored token (no expiry check).
    /// - Otherwise admin credentials trigger a password login when the stored
    ///   session is not valid.
    /// - With neither, nothing happens and the backend's own authorization
    ///   errors surface on the next call.
    ///
    /// # Errors
    ///
    /// Returns the login error if the password login is rejected.
    pub async fn ensure_authenticated(&self) -> Result<(), AdapterError> {
        let SessionSource::Bootstrap(params) = &self.session else {
            return Ok(());
        };

        if let Some(token) = params.token() {
            if self.backend.token().as_deref() != Some(token) {
                tracing::debug!("Applying configured PocketBase token");
                self.backend.save_token(token, None);
            }
            return Ok(());
        }

        if let Some((email, password)) = params.admin_credentials()
            && !self.backend.is_valid()
        {
            tracing::debug!(email = %email, "Authenticating PocketBase admin");
            self.backend.auth_with_password(email, password).await?;
        }
        Ok(())
    }

    // ==========================================
    // CREATE
    // ==========================================

    /// Create a record, returning it as stored by the backend.
    ///
    /// # Errors
    ///
    /// Propagates authentication and backend failures.
    pub async fn create(&self, model: &str, data: Record) -> Result<Record, AdapterError> {
        self.ensure_authenticated().await?;
        let collection = self.collection(model);
        self.log_call("create", &collection, "");
        self.backend.create(&collection, &data).await.inspect_err(|err| {
            tracing::warn!(collection = %collection, error = %err, "PocketBase create failed");
        })
    }

    // ==========================================
    // READ
    // ==========================================

    /// First record matching `conditions`, or `None`.
    pub async fn find_one(&self, model: &str, conditions: &[Condition]) -> Option<Record> {
        self.lookup_one(model, conditions).await.found()
    }

    /// Internal form of [`Self::find_one`] that keeps failures visible
    async fn lookup_one(&self, model: &str, conditions: &[Condition]) -> Lookup<Record> {
        let collection = self.collection(model);
        let result: Result<_, AdapterError> = async {
            let filter = try_compile_where(conditions)?;
            self.ensure_authenticated().await?;
            self.log_call("findOne", &collection, &filter);
            self.backend.first_match(&collection, &filter).await.into_result()
        }
        .await;
        let lookup = Lookup::from(result);
        if let Lookup::Failed(err) = &lookup {
            self.report_failure("findOne", &collection, err);
        }
        lookup
    }

    /// One page of records matching `conditions`.
    ///
    /// `limit` defaults to 50; `offset` is floored onto the page grid.
    pub async fn find_many(
        &self,
        model: &str,
        conditions: &[Condition],
        limit: Option<u64>,
        offset: Option<u64>,
        sort_by: Option<&SortBy>,
    ) -> Vec<Record> {
        let collection = self.collection(model);
        let (page, per_page) = page_for(offset, limit);

        let result: Result<_, AdapterError> = async {
            let filter = try_compile_where(conditions)?;
            self.ensure_authenticated().await?;
            self.log_call("findMany", &collection, &filter);
            let options = ListOptions::filtered(&filter).with_sort(parse_sorting(sort_by));
            self.backend.get_list(&collection, page, per_page, &options).await
        }
        .await;
        match result {
            Ok(listing) => listing.items,
            Err(err) => {
                self.report_failure("findMany", &collection, &err);
                Vec::new()
            }
        }
    }

    /// Number of records matching `conditions`, as reported by the backend's
    /// total rather than by counting a page.
    pub async fn count(&self, model: &str, conditions: &[Condition]) -> u64 {
        let collection = self.collection(model);

        let result: Result<_, AdapterError> = async {
            let filter = try_compile_where(conditions)?;
            self.ensure_authenticated().await?;
            self.log_call("count", &collection, &filter);
            self.backend
                .get_list(&collection, 1, 1, &ListOptions::filtered(&filter))
                .await
        }
        .await;
        match result {
            Ok(listing) => listing.total_items,
            Err(err) => {
                self.report_failure("count", &collection, &err);
                0
            }
        }
    }

    // ==========================================
    // UPDATE
    // ==========================================

    /// Patch one matching record.
    ///
    /// If several records match, an arbitrary one is updated. Returns the
    /// backend's record with `patch` merged over it, or `None` when nothing
    /// matched or the call failed.
    pub async fn update(&self, model: &str, conditions: &[Condition], patch: Record) -> Option<Record> {
        let collection = self.collection(model);
        let record = self.lookup_one(model, conditions).await.found()?;

        let result: Result<_, AdapterError> = async {
            let id = record_id(&collection, &record)?;
            self.log_call("update", &collection, id);
            self.backend.update(&collection, id, &patch).await
        }
        .await;
        match result {
            Ok(mut updated) => {
                updated.extend(patch);
                Some(updated)
            }
            Err(err) => {
                self.report_failure("update", &collection, &err);
                None
            }
        }
    }

    /// Patch every matching record (at most 500), one call per record.
    ///
    /// Returns how many records were written. A failure part-way returns the
    /// number written before it; nothing is rolled back.
    pub async fn update_many(&self, model: &str, conditions: &[Condition], patch: Record) -> u64 {
        let collection = self.collection(model);

        let result: Result<_, AdapterError> = async {
            let filter = try_compile_where(conditions)?;
            self.ensure_authenticated().await?;
            self.log_call("updateMany", &collection, &filter);
            self.backend.update_matching(&collection, &filter, &patch).await
        }
        .await;
        self.settle_bulk("updateMany", &collection, result)
    }

    // ==========================================
    // DELETE
    // ==========================================

    /// Delete one matching record, if any. Failures are only logged.
    pub async fn delete(&self, model: &str, conditions: &[Condition]) {
        let collection = self.collection(model);
        let Some(record) = self.lookup_one(model, conditions).await.found() else {
            return;
        };

        let result: Result<_, AdapterError> = async {
            let id = record_id(&collection, &record)?;
            self.log_call("delete", &collection, id);
            self.backend.delete(&collection, id).await
        }
        .await;
        if let Err(err) = result {
            self.report_failure("delete", &collection, &err);
        }
    }

    /// Delete every matching record (at most 500), one call per record.
    ///
    /// Same partial-failure contract as [`Self::update_many`].
    pub async fn delete_many(&self, model: &str, conditions: &[Condition]) -> u64 {
        let collection = self.collection(model);

        let result: Result<_, AdapterError> = async {
            let filter = try_compile_where(conditions)?;
            self.ensure_authenticated().await?;
            self.log_call("deleteMany", &collection, &filter);
            self.backend.delete_matching(&collection, &filter).await
        }
        .await;
        self.settle_bulk("deleteMany", &collection, result)
    }

    // ==========================================
    // Internal helpers
    // ==========================================

    fn collection(&self, model: &str) -> String {
        self.host.model_name(model, self.options.use_plural)
    }

    fn settle_bulk(&self, operation: &str, collection: &str, result: Result<u64, AdapterError>) -> u64 {
        match result {
            Ok(count) => count,
            Err(AdapterError::PartialBulk {
                completed,
                matched,
                source,
            }) => {
                tracing::warn!(
                    operation,
                    collection,
                    completed,
                    matched,
                    error = %source,
                    "Bulk operation stopped part-way"
                );
                if self.options.debug_logs {
                    self.host.debug_log(&format!(
                        "[PocketBase] {operation} on {collection} stopped after {completed} of {matched} records: {source}"
                    ));
                }
                completed
            }
            Err(err) => {
                self.report_failure(operation, collection, &err);
                0
            }
        }
    }

    fn log_call(&self, operation: &str, collection: &str, detail: &str) {
        tracing::trace!(operation, collection, detail, "PocketBase call");
        if self.options.debug_logs {
            self.host
                .debug_log(&format!("[PocketBase] {operation} {collection} {detail}"));
        }
    }

    fn report_failure(&self, operation: &str, collection: &str, err: &AdapterError) {
        tracing::debug!(operation, collection, error = %err, "PocketBase call failed, returning default");
        if self.options.debug_logs {
            self.host
                .debug_log(&format!("[PocketBase] {operation} error on {collection}: {err}"));
        }
    }
}

