//! API client for the data.stack REST endpoints
//!
//! Provides authenticated JSON and multipart requests against a single host.

use std::sync::Arc;

use datastack_domain::constants::JWT_SCHEME;
use datastack_domain::{DataStackError, Result};
use reqwest::multipart::Form;
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, instrument};

use super::auth::AccessTokenProvider;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Query parameters in the order they are sent
pub type Query = Vec<(&'static str, String)>;

enum Payload {
    Empty,
    Json(Value),
    Multipart(Form),
}

/// Authenticated client bound to one data.stack host
///
/// Cloning is cheap; clones share the HTTP connection pool and the token
/// provider.
#[derive(Clone)]
pub struct ApiClient {
    http: HttpClient,
    base_url: String,
    auth: Arc<dyn AccessTokenProvider>,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    ///
    /// * `http` - Transport shared with the authenticator
    /// * `base_url` - Host, e.g. `https://cloud.appveen.com`
    /// * `auth` - Token provider consulted on every call
    pub fn new(
        http: HttpClient,
        base_url: impl Into<String>,
        auth: Arc<dyn AccessTokenProvider>,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url, auth }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path such as `/api/a/rbac/app`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[instrument(skip(self, query), fields(path = %path))]
    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<R> {
        self.execute(Method::GET, path, query, Payload::Empty).await
    }

    #[instrument(skip(self, query, body), fields(path = %path))]
    pub async fn post<B, R>(&self, path: &str, query: &[(&str, String)], body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(Method::POST, path, query, Payload::Json(to_json(body)?)).await
    }

    #[instrument(skip(self, query, body), fields(path = %path))]
    pub async fn put<B, R>(&self, path: &str, query: &[(&str, String)], body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(Method::PUT, path, query, Payload::Json(to_json(body)?)).await
    }

    /// DELETE with an empty JSON object body, as the platform expects.
    #[instrument(skip(self, query), fields(path = %path))]
    pub async fn delete<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<R> {
        self.execute(Method::DELETE, path, query, Payload::Json(Value::Object(Default::default())))
            .await
    }

    #[instrument(skip(self, query, form), fields(path = %path))]
    pub async fn post_multipart<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        form: Form,
    ) -> Result<R> {
        self.execute(Method::POST, path, query, Payload::Multipart(form)).await
    }

    async fn execute<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        payload: Payload,
    ) -> Result<R> {
        // Fails fast without touching the network when no token is held
        let token = self.auth.access_token().await?;

        let url = self.url(path);
        debug!(%method, url = %url, "API request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(reqwest::header::AUTHORIZATION, format!("{JWT_SCHEME} {token}"));
        if !query.is_empty() {
            request = request.query(query);
        }
        request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(&body),
            Payload::Multipart(form) => request.multipart(form),
        };

        let result = match self.http.send(request).await {
            Ok(response) => decode_response(response).await,
            Err(err) => Err(err),
        };

        let value = result.map_err(|err| {
            error!(
                %method,
                path,
                status = ?err.status_code(),
                body = ?err.body(),
                "API request failed"
            );
            err
        })?;

        serde_json::from_value(value).map_err(|e| {
            error!(%method, path, error = %e, "API response has unexpected shape");
            DataStackError::transport(format!("Failed to parse response from {path}: {e}"))
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value> {
    serde_json::to_value(body)
        .map_err(|e| DataStackError::usage(format!("Failed to serialize body: {e}")))
}

/// Read a response into JSON, mapping non-2xx statuses to `Transport`.
///
/// Empty bodies (204, 205 or a zero-length 200) decode to `Value::Null`;
/// non-JSON bodies are kept as a JSON string.
pub async fn decode_response(response: Response) -> Result<Value> {
    let status = response.status();
    let mut url = response.url().clone();
    url.set_query(None);

    let text = response.text().await.map_err(|e| DataStackError::from(InfraError::from(e)))?;
    let body = parse_body(&text);

    if !status.is_success() {
        let detail = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(|m| format!(": {m}"))
            .unwrap_or_default();
        return Err(DataStackError::Transport {
            status_code: Some(status.as_u16()),
            body,
            message: format!("{url} returned status {status}{detail}"),
        });
    }

    Ok(body.unwrap_or(Value::Null))
}

fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}
