use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::skip_serializing_none;
use std::sync::Arc;
use url::Url;

use super::auth_store::AuthStore;
use crate::config::ConnectionParams;
use crate::core::{AdminSession, BulkRecordStore, Connect, ListOptions, ListResult, Record, RecordStore};
use crate::errors::AdapterError;

/// Which endpoint performs the privileged password login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminAuthEndpoint {
    /// `/api/collections/_superusers/auth-with-password` (PocketBase 0.23+)
    #[default]
    Superusers,
    /// `/api/admins/auth-with-password` (PocketBase before 0.23)
    LegacyAdmins,
}

impl AdminAuthEndpoint {
    fn path_segments(self) -> &'static [&'static str] {
        match self {
            Self::Superusers => &["api", "collections", "_superusers", "auth-with-password"],
            Self::LegacyAdmins => &["api", "admins", "auth-with-password"],
        }
    }
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    #[serde(default, alias = "admin")]
    record: Option<Record>,
}

#[skip_serializing_none]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery<'a> {
    page: u64,
    per_page: u64,
    filter: Option<&'a str>,
    sort: Option<&'a str>,
}

impl<'a> ListQuery<'a> {
    fn new(page: u64, per_page: u64, options: &'a ListOptions) -> Self {
        Self {
            page,
            per_page,
            filter: options.filter.as_deref(),
            sort: options.sort.as_deref(),
        }
    }
}

/// Minimal PocketBase REST client.
///
/// Clones share the HTTP connection pool and the [`AuthStore`].
#[derive(Debug, Clone)]
pub struct PocketBaseClient {
    http: reqwest::Client,
    base_url: Url,
    auth: Arc<AuthStore>,
    admin_endpoint: AdminAuthEndpoint,
}

impl PocketBaseClient {
    /// # Errors
    ///
    /// Returns `AdapterError::Url` if `base_url` does not parse.
    pub fn new(base_url: &str) -> Result<Self, AdapterError> {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    /// Build a client on top of a preconfigured `reqwest::Client`
    /// (timeouts, proxies and TLS settings are taken from it as-is).
    ///
    /// # Errors
    ///
    /// Returns `AdapterError::Url` if `base_url` does not parse.
    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self, AdapterError> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            auth: Arc::new(AuthStore::new()),
            admin_endpoint: AdminAuthEndpoint::default(),
        })
    }

    #[must_use]
    pub fn with_admin_endpoint(mut self, endpoint: AdminAuthEndpoint) -> Self {
        self.admin_endpoint = endpoint;
        self
    }

    #[must_use]
    pub fn auth_store(&self) -> &Arc<AuthStore> {
        &self.auth
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join path segments onto the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AdapterError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn records_url(&self, collection: &str) -> Result<Url, AdapterError> {
        self.endpoint(&["api", "collections", collection, "records"])
    }

    fn record_url(&self, collection: &str, id: &str) -> Result<Url, AdapterError> {
        self.endpoint(&["api", "collections", collection, "records", id])
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth.token() {
            Some(token) => request.header(reqwest::header::AUTHORIZATION, token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, AdapterError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), body = %body, "PocketBase request failed");
        Err(AdapterError::from_response_body(status.as_u16(), &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AdapterError> {
        let bytes = self.send(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl Connect for PocketBaseClient {
    fn connect(params: &ConnectionParams) -> Result<Self, AdapterError> {
        Self::new(&params.url)
    }
}

#[async_trait]
impl RecordStore for PocketBaseClient {
    async fn create(&self, collection: &str, payload: &Record) -> Result<Record, AdapterError> {
        let url = self.records_url(collection)?;
        self.send_json(self.http.post(url).json(payload)).await
    }

    async fn get_list(
        &self,
        collection: &str,
        page: u64,
        per_page: u64,
        options: &ListOptions,
    ) -> Result<ListResult, AdapterError> {
        let url = self.records_url(collection)?;
        let query = ListQuery::new(page, per_page, options);
        self.send_json(self.http.get(url).query(&query)).await
    }

    async fn update(&self, collection: &str, id: &str, payload: &Record) -> Result<Record, AdapterError> {
        let url = self.record_url(collection, id)?;
        self.send_json(self.http.patch(url).json(payload)).await
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), AdapterError> {
        let url = self.record_url(collection, id)?;
        self.send(self.http.delete(url)).await?;
        Ok(())
    }
}

// PocketBase has no multi-record write endpoint; use the sequential emulation.
impl BulkRecordStore for PocketBaseClient {}

#[async_trait]
impl AdminSession for PocketBaseClient {
    fn token(&self) -> Option<String> {
        self.auth.token()
    }

    fn is_valid(&self) -> bool {
        self.auth.is_valid()
    }

    fn save_token(&self, token: &str, record: Option<Record>) {
        self.auth.save(token, record);
    }

    async fn auth_with_password(&self, email: &str, password: &str) -> Result<(), AdapterError> {
        let url = self.endpoint(self.admin_endpoint.path_segments())?;
        let body = json!({ "identity": email, "password": password });
        // The login itself must not carry a stale token.
        let response = self.http.post(url).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = AdapterError::from_response_body(status.as_u16(), &text);
            tracing::warn!(email = %email, error = %err, "PocketBase admin login rejected");
            return Err(AdapterError::Unauthenticated(err.to_string()));
        }
        let auth: AuthResponse = serde_json::from_slice(&response.bytes().await?)?;
        self.auth.save(auth.token, auth.record);
        tracing::debug!(email = %email, "PocketBase admin session established");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joining() {
        let client = PocketBaseClient::new("http://127.0.0.1:8090").unwrap();
        assert_eq!(
            client.records_url("users").unwrap().as_str(),
            "http://127.0.0.1:8090/api/collections/users/records"
        );

        let nested = PocketBaseClient::new("https://example.com/pb/").unwrap();
        assert_eq!(
            nested.record_url("users", "abc123").unwrap().as_str(),
            "https://example.com/pb/api/collections/users/records/abc123"
        );
    }

    #[test]
    fn test_segments_are_encoded() {
        let client = PocketBaseClient::new("http://pb").unwrap();
        assert_eq!(
            client.record_url("users", "a/b").unwrap().as_str(),
            "http://pb/api/collections/users/records/a%2Fb"
        );
    }

    #[test]
    fn test_admin_endpoints() {
        let client = PocketBaseClient::new("http://pb").unwrap();
        let url = client.endpoint(client.admin_endpoint.path_segments()).unwrap();
        assert_eq!(url.path(), "/api/collections/_superusers/auth-with-password");

        let legacy = client.with_admin_endpoint(AdminAuthEndpoint::LegacyAdmins);
        let url = legacy.endpoint(legacy.admin_endpoint.path_segments()).unwrap();
        assert_eq!(url.path(), "/api/admins/auth-with-password");
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(PocketBaseClient::new("not a url"), Err(AdapterError::Url(_))));
    }

    #[test]
    fn test_list_query_serialization() {
        let options = ListOptions::filtered(r#"email = "a@b.co""#);
        let query = ListQuery::new(2, 10, &options);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            serde_json::json!({"page": 2, "perPage": 10, "filter": "email = \"a@b.co\""})
        );
    }
}
