//! Root handle returned by authentication

use std::sync::Arc;

use datastack_domain::constants::COUNT_ALL;
use datastack_domain::{App, Config, Credentials, Result, SuccessResponse};
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::app::AppClient;
use crate::api::{AccessTokenProvider, ApiClient};
use crate::auth::{Authenticator, SessionContext};
use crate::http::HttpClient;
use crate::observability::init_tracing;

const APP_PATH: &str = "/api/a/rbac/app";

/// An authenticated connection to one data.stack host
///
/// Clones share the session, so a logout through any clone ends them all.
#[derive(Clone, Debug)]
pub struct DataStack {
    auth: Authenticator,
    api: ApiClient,
}

impl DataStack {
    /// Log in with username and password (or bot client id and API key).
    ///
    /// # Errors
    /// `Config` for an unusable host, `Usage` when no password is given and
    /// `Auth` when the platform rejects the login.
    pub async fn authenticate_by_credentials(credentials: Credentials) -> Result<Self> {
        if credentials.trace {
            init_tracing(true);
        }
        let auth = Authenticator::new(credentials, HttpClient::new()?)?;
        auth.login().await?;
        Ok(Self::from_authenticator(auth))
    }

    /// Adopt an existing token after checking it with the platform.
    ///
    /// # Errors
    /// `Config` for an unusable host, `Usage` when no token is given and
    /// `Auth` when the token is rejected.
    pub async fn authenticate_by_token(credentials: Credentials) -> Result<Self> {
        if credentials.trace {
            init_tracing(true);
        }
        let auth = Authenticator::new(credentials, HttpClient::new()?)?;
        auth.authenticate_by_token().await?;
        Ok(Self::from_authenticator(auth))
    }

    /// Connect using a loaded configuration.
    ///
    /// Password login is used when username and password are present,
    /// otherwise the token is checked.
    pub async fn connect(config: &Config) -> Result<Self> {
        config.validate()?;
        if config.credentials.trace {
            init_tracing(true);
        }

        let http = HttpClient::from_config(&config.http)?;
        let auth = Authenticator::new(config.credentials.clone(), http)?;
        if config.credentials.can_relogin() {
            auth.login().await?;
        } else {
            auth.authenticate_by_token().await?;
        }
        Ok(Self::from_authenticator(auth))
    }

    pub(crate) fn from_authenticator(auth: Authenticator) -> Self {
        let provider: Arc<dyn AccessTokenProvider> = auth.session().clone();
        let base_url = auth.session().credentials().base_url();
        let api = ApiClient::new(auth.http().clone(), base_url, provider);
        Self { auth, api }
    }

    /// Shared session state (tokens, policy, routine status).
    pub fn session(&self) -> &Arc<SessionContext> {
        self.auth.session()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[instrument(skip(self))]
    pub async fn list_apps(&self) -> Result<Vec<AppClient>> {
        let apps: Vec<App> = self.api.get(APP_PATH, &[("count", COUNT_ALL.to_string())]).await?;
        Ok(apps.into_iter().map(|app| AppClient::new(app, self.api.clone())).collect())
    }

    #[instrument(skip(self))]
    pub async fn app(&self, name: &str) -> Result<AppClient> {
        let app: App = self.api.get(&format!("{APP_PATH}/{name}"), &[]).await?;
        Ok(AppClient::new(app, self.api.clone()))
    }

    /// Create an app in the session's default timezone.
    #[instrument(skip(self))]
    pub async fn create_app(&self, name: &str) -> Result<AppClient> {
        let timezone = self.session().default_timezone().await;
        let body = json!({ "_id": name, "defaultTimezone": timezone });
        let app: App = self.api.post(APP_PATH, &[], &body).await?;
        info!(app = app.id(), "App created");
        Ok(AppClient::new(app, self.api.clone()))
    }

    #[instrument(skip(self))]
    pub async fn delete_app(&self, name: &str) -> Result<SuccessResponse> {
        let body: Value = self.api.delete(&format!("{APP_PATH}/{name}"), &[]).await?;
        info!(app = name, "App deleted");
        Ok(SuccessResponse::from_body(body))
    }

    /// End the session. Tokens are cleared and routines stopped even when
    /// the platform call fails.
    pub async fn logout(&self) -> Result<()> {
        self.auth.logout().await
    }
}
