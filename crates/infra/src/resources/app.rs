//! One app and the data services it owns

use datastack_domain::constants::{COUNT_ALL, DEFAULT_LIST_COUNT};
use datastack_domain::{
    App, DataService, DataStackError, Filter, ListOptions, Result, SuccessResponse,
};
use futures::future::try_join_all;
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::data_service::{DataServiceClient, ServiceAction};
use super::transactions::TransactionApi;
use super::{app_query, push_list_options};
use crate::api::ApiClient;

pub(crate) const SERVICE_PATH: &str = "/api/a/sm/service";

#[derive(Clone, Debug)]
pub struct AppClient {
    app: App,
    api: ApiClient,
}

impl AppClient {
    pub(crate) fn new(app: App, api: ApiClient) -> Self {
        Self { app, api }
    }

    pub fn id(&self) -> &str {
        self.app.id()
    }

    pub fn data(&self) -> &App {
        &self.app
    }

    /// Filter with this app's id set, as the service manager requires.
    fn scoped(&self, filter: Option<Filter>) -> Filter {
        filter.unwrap_or_default().with("app", self.id())
    }

    /// List data services of this app.
    ///
    /// Drafts are not fetched here; use [`Self::data_service`] or
    /// [`DataServiceClient::fetch_draft`].
    #[instrument(skip(self, options), fields(app = %self.id()))]
    pub async fn list_data_services(&self, options: ListOptions) -> Result<Vec<DataServiceClient>> {
        let mut query = app_query(self.id());
        query.push(("filter", self.scoped(options.filter.clone()).to_query_value()));

        let options = ListOptions {
            count: Some(options.count.unwrap_or(DEFAULT_LIST_COUNT)),
            filter: None,
            expand: false,
            ..options
        };
        push_list_options(&mut query, &options);

        let services: Vec<DataService> = self.api.get(SERVICE_PATH, &query).await?;
        Ok(services
            .into_iter()
            .map(|service| DataServiceClient::new(self.app.clone(), service, self.api.clone()))
            .collect())
    }

    /// Data service by name or id, with its draft when it has one.
    ///
    /// # Errors
    /// `Transport` with status 404 when no service matches.
    #[instrument(skip(self), fields(app = %self.id()))]
    pub async fn data_service(&self, name: &str) -> Result<DataServiceClient> {
        let filter = self.scoped(None).with("$or", json!([{ "name": name }, { "_id": name }]));
        let mut query = app_query(self.id());
        query.push(("filter", filter.to_query_value()));

        let body: Value = self.api.get(SERVICE_PATH, &query).await?;
        let found = match body {
            Value::Array(items) => items.into_iter().next(),
            Value::Null => None,
            other => Some(other),
        };
        let Some(found) = found else {
            return Err(DataStackError::Transport {
                status_code: Some(404),
                body: None,
                message: format!("data service '{name}' not found in app '{}'", self.id()),
            });
        };

        let service: DataService = serde_json::from_value(found)
            .map_err(|e| DataStackError::transport(format!("invalid data service: {e}")))?;
        DataServiceClient::load(self.app.clone(), service, self.api.clone()).await
    }

    #[instrument(skip(self, description), fields(app = %self.id()))]
    pub async fn create_data_service(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<DataServiceClient> {
        let body = json!({ "name": name, "description": description, "app": self.id() });
        let service: DataService = self.api.post(SERVICE_PATH, &app_query(self.id()), &body).await?;
        info!(service = service.id(), "Data service created");
        Ok(DataServiceClient::new(self.app.clone(), service, self.api.clone()))
    }

    pub async fn repair_all_data_services(
        &self,
        filter: Option<Filter>,
    ) -> Result<Vec<SuccessResponse>> {
        self.bulk(ServiceAction::Repair, filter).await
    }

    pub async fn start_all_data_services(
        &self,
        filter: Option<Filter>,
    ) -> Result<Vec<SuccessResponse>> {
        self.bulk(ServiceAction::Start, filter).await
    }

    pub async fn stop_all_data_services(
        &self,
        filter: Option<Filter>,
    ) -> Result<Vec<SuccessResponse>> {
        self.bulk(ServiceAction::Stop, filter).await
    }

    /// Run one lifecycle action on every matching service concurrently.
    #[instrument(skip(self, filter), fields(app = %self.id(), action = %action))]
    async fn bulk(
        &self,
        action: ServiceAction,
        filter: Option<Filter>,
    ) -> Result<Vec<SuccessResponse>> {
        let mut query = app_query(self.id());
        query.push(("filter", self.scoped(filter).to_query_value()));
        query.push(("count", COUNT_ALL.to_string()));

        let services: Vec<DataService> = self.api.get(SERVICE_PATH, &query).await?;
        if services.is_empty() {
            return Ok(Vec::new());
        }

        let app_query = app_query(self.id());
        let calls = services.iter().map(|service| {
            info!(service = service.id(), %action, "Applying action to data service");
            let path = format!("/api/a/sm/{}/{}", service.id(), action);
            let query = app_query.clone();
            async move {
                let body: Value = self.api.put(&path, &query, &json!({})).await?;
                Ok::<_, DataStackError>(SuccessResponse::from_body(body))
            }
        });
        try_join_all(calls).await
    }

    /// Empty transaction batch for this app.
    pub fn transaction_api(&self) -> TransactionApi {
        TransactionApi::new(self.app.clone(), self.api.clone())
    }
}
