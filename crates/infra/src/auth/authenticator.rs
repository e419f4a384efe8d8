//! Login, token check and logout against `/api/a/rbac`
//!
//! A successful login or check overwrites the session and arms the
//! background routines the returned policy asks for.

use std::sync::Arc;

use datastack_domain::constants::JWT_SCHEME;
use datastack_domain::{Credentials, DataStackError, Result, SessionSnapshot, UserDetails};
use reqwest::header::AUTHORIZATION;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};
use url::Url;

use super::routines;
use super::session::SessionContext;
use crate::api::decode_response;
use crate::errors::InfraError;
use crate::http::HttpClient;

/// Authenticates a session and keeps it alive
#[derive(Clone)]
pub struct Authenticator {
    http: HttpClient,
    session: Arc<SessionContext>,
}

impl Authenticator {
    /// Authenticator for a fresh, empty session.
    ///
    /// # Errors
    /// Returns `DataStackError::Config` when the host is not a valid URL.
    pub fn new(credentials: Credentials, http: HttpClient) -> Result<Self> {
        Url::parse(credentials.base_url()).map_err(|e| DataStackError::from(InfraError::from(e)))?;
        Ok(Self { http, session: Arc::new(SessionContext::new(credentials)) })
    }

    pub(crate) fn from_parts(http: HttpClient, session: Arc<SessionContext>) -> Self {
        Self { http, session }
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub(crate) fn rbac_url(&self, path: &str) -> String {
        format!("{}/api/a/rbac{}", self.session.credentials().base_url(), path)
    }

    /// `POST /api/a/rbac/login` with username and password.
    ///
    /// # Errors
    /// `Usage` when the credentials carry no username/password; `Auth` for
    /// any failed or malformed response.
    #[instrument(skip(self), fields(host = %self.session.credentials().host))]
    pub async fn login(&self) -> Result<()> {
        self.login_as_of(self.session.logout_epoch()).await
    }

    /// Login that commits only if no logout happened since `epoch`.
    pub(crate) async fn login_as_of(&self, epoch: u64) -> Result<()> {
        let creds = self.session.credentials();
        let (Some(username), Some(password)) =
            (creds.username.as_deref(), creds.password.as_deref())
        else {
            return Err(DataStackError::usage("login requires a username and a password"));
        };

        if self.session.logout_epoch() != epoch {
            return Err(logged_out());
        }

        info!(username, "Authenticating");
        let request = self
            .http
            .request(Method::POST, self.rbac_url("/login"))
            .json(&json!({ "username": username, "password": password }));

        let details = self.call(request).await.map_err(|err| {
            error!(status = ?err.status_code(), body = ?err.body(), "Login failed");
            err
        })?;
        self.establish(details, None, epoch).await?;
        info!("Authentication successful");
        Ok(())
    }

    /// `GET /api/a/rbac/check` presenting the held token verbatim.
    ///
    /// # Errors
    /// `Usage` when no token was supplied; `Auth` when the server rejects it.
    #[instrument(skip(self), fields(host = %self.session.credentials().host))]
    pub async fn authenticate_by_token(&self) -> Result<()> {
        let epoch = self.session.logout_epoch();
        let Some(token) = self.session.credentials().token.clone().filter(|t| !t.is_empty()) else {
            return Err(DataStackError::usage("token authentication requires a token"));
        };

        let request =
            self.http.request(Method::GET, self.rbac_url("/check")).header(AUTHORIZATION, &token);

        let details = self.call(request).await.map_err(|err| {
            error!(status = ?err.status_code(), body = ?err.body(), "Token check failed");
            err
        })?;
        self.establish(details, Some(&token), epoch).await?;
        info!("Token accepted");
        Ok(())
    }

    /// `DELETE /api/a/rbac/logout`.
    ///
    /// The local session ends before the request is sent: routines are
    /// stopped and tokens cleared whatever the call returns, and a login
    /// still in flight from a routine is not committed.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let mut request = self.http.request(Method::DELETE, self.rbac_url("/logout"));
        if let Some(token) = self.session.end().await {
            request = request.header(AUTHORIZATION, format!("{JWT_SCHEME} {token}"));
        }

        match self.call_raw(request).await {
            Ok(_) => {
                info!("Logged out");
                Ok(())
            }
            Err(err) => {
                error!(status = ?err.status_code(), body = ?err.body(), "Logout failed");
                Err(err)
            }
        }
    }

    /// Populate the session from a login/check response and arm routines.
    async fn establish(
        &self,
        details: UserDetails,
        presented_token: Option<&str>,
        epoch: u64,
    ) -> Result<()> {
        let mut snapshot = SessionSnapshot::from_details(&details);
        if snapshot.access_token.is_none() {
            // A check response may omit the token it just validated
            snapshot.access_token = presented_token.map(strip_scheme).filter(|t| !t.is_empty());
        }
        if snapshot.access_token.is_none() {
            return Err(DataStackError::Auth {
                status_code: None,
                body: serde_json::to_value(&details).ok(),
                message: "authentication response carries no token".into(),
            });
        }

        if !self.session.replace_if_current(snapshot, epoch).await {
            warn!("Session logged out while authenticating; discarding result");
            return Err(logged_out());
        }
        routines::apply_policy(self, epoch).await;
        Ok(())
    }

    /// Send an rbac request and decode the user details it returns.
    pub(crate) async fn call(&self, request: reqwest::RequestBuilder) -> Result<UserDetails> {
        let body = self.call_raw(request).await?;
        match body {
            Value::Object(_) => {
                serde_json::from_value(body.clone()).map_err(|e| DataStackError::Auth {
                    status_code: None,
                    body: Some(body),
                    message: format!("malformed authentication response: {e}"),
                })
            }
            Value::Null => Ok(UserDetails::default()),
            other => Err(DataStackError::Auth {
                status_code: None,
                body: Some(other),
                message: "authentication response is not a JSON object".into(),
            }),
        }
    }

    async fn call_raw(&self, request: reqwest::RequestBuilder) -> Result<Value> {
        let response = self.http.send(request).await.map_err(DataStackError::into_auth)?;
        decode_response(response).await.map_err(DataStackError::into_auth)
    }
}

fn logged_out() -> DataStackError {
    DataStackError::auth("session was logged out while authenticating")
}

fn strip_scheme(token: &str) -> String {
    let trimmed = token.trim();
    trimmed
        .strip_prefix(JWT_SCHEME)
        .map(str::trim_start)
        .unwrap_or(trimmed)
        .to_string()
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator").field("session", &self.session).finish_non_exhaustive()
    }
}
