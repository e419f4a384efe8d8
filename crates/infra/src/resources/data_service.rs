//! Management of a single data service
//!
//! Holds the published definition and, when one exists, the draft. Editors
//! returned by `roles()`, `integrations()` and `schema()` work on a copy of
//! the active definition; `set_*` merges the edit back and saves the service.

use datastack_domain::{
    impl_wire_name_conversions, App, DataService, DataStackError, IntegrationEditor, Result,
    RoleEditor, SchemaEditor, SuccessResponse,
};
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use super::app::{AppClient, SERVICE_PATH};
use super::app_query;
use super::documents::DataApi;
use super::workflow::WorkflowApi;
use crate::api::ApiClient;

/// Lifecycle actions exposed under `/api/a/sm/{id}/{action}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceAction {
    Start,
    Stop,
    Repair,
}

impl_wire_name_conversions!(ServiceAction {
    Start => "start",
    Stop => "stop",
    Repair => "repair",
});

#[derive(Clone, Debug)]
pub struct DataServiceClient {
    app: App,
    api: ApiClient,
    original: DataService,
    draft: Option<DataService>,
    is_draft: bool,
}

impl DataServiceClient {
    pub(crate) fn new(app: App, service: DataService, api: ApiClient) -> Self {
        Self { app, api, original: service, draft: None, is_draft: false }
    }

    /// Client with the draft already fetched when the service has one.
    pub(crate) async fn load(app: App, service: DataService, api: ApiClient) -> Result<Self> {
        let mut client = Self::new(app, service, api);
        if client.original.has_draft() {
            client.fetch_draft().await?;
        }
        Ok(client)
    }

    /// Definition currently being worked on (draft or published).
    pub fn data(&self) -> &DataService {
        match (&self.draft, self.is_draft) {
            (Some(draft), true) => draft,
            _ => &self.original,
        }
    }

    fn data_mut(&mut self) -> &mut DataService {
        match (&mut self.draft, self.is_draft) {
            (Some(draft), true) => draft,
            _ => &mut self.original,
        }
    }

    pub fn id(&self) -> &str {
        self.original.id()
    }

    pub fn app_id(&self) -> &str {
        self.app.id()
    }

    fn manage_path(&self, suffix: &str) -> String {
        format!("/api/a/sm/{}{}", self.id(), suffix)
    }

    fn service_path(&self) -> String {
        format!("{SERVICE_PATH}/{}", self.id())
    }

    pub fn has_draft(&self) -> bool {
        self.original.has_draft() || self.draft.is_some()
    }

    pub fn is_draft(&self) -> bool {
        self.is_draft
    }

    /// Work on the fetched draft. Without a fetched draft nothing changes.
    pub fn switch_to_draft(&mut self) -> &mut Self {
        if self.draft.is_some() {
            self.is_draft = true;
        } else {
            debug!(service = self.id(), "no draft fetched; staying on published definition");
        }
        self
    }

    pub fn switch_to_original(&mut self) -> &mut Self {
        self.is_draft = false;
        self
    }

    /// `GET service/{id}?draft=true`; the result replaces any held draft.
    #[instrument(skip(self), fields(service = %self.id()))]
    pub async fn fetch_draft(&mut self) -> Result<&mut Self> {
        let mut query = app_query(self.app_id());
        query.push(("draft", "true".to_string()));
        let draft: DataService = self.api.get(&self.service_path(), &query).await?;
        self.draft = Some(draft);
        Ok(self)
    }

    /// Delete the draft and return to the published definition.
    #[instrument(skip(self), fields(service = %self.id()))]
    pub async fn discard_draft(&mut self) -> Result<&mut Self> {
        let query = app_query(self.app_id());
        let _: Value = self.api.delete(&self.manage_path("/draftDelete"), &query).await?;
        let published: DataService = self.api.get(&self.service_path(), &query).await?;

        self.original = published;
        self.draft = None;
        self.is_draft = false;
        info!(service = self.id(), "Draft discarded");
        Ok(self)
    }

    pub async fn purge_all_data(&self) -> Result<SuccessResponse> {
        self.purge("all").await
    }

    pub async fn purge_api_logs(&self) -> Result<SuccessResponse> {
        self.purge("log").await
    }

    pub async fn purge_audit_logs(&self) -> Result<SuccessResponse> {
        self.purge("audit").await
    }

    #[instrument(skip(self), fields(service = %self.id()))]
    async fn purge(&self, what: &str) -> Result<SuccessResponse> {
        let body: Value = self
            .api
            .delete(&self.manage_path(&format!("/purge/{what}")), &app_query(self.app_id()))
            .await?;
        info!(service = self.id(), purge = what, "Purge requested");
        Ok(SuccessResponse::from_body(body))
    }

    /// Delete the service and hand back its app.
    #[instrument(skip(self), fields(service = %self.id()))]
    pub async fn delete(self) -> Result<AppClient> {
        let _: Value = self.api.delete(&self.service_path(), &app_query(self.app_id())).await?;
        info!(service = self.id(), "Data service deleted");
        Ok(AppClient::new(self.app, self.api))
    }

    pub async fn start(&self) -> Result<SuccessResponse> {
        self.lifecycle(ServiceAction::Start).await
    }

    pub async fn stop(&self) -> Result<SuccessResponse> {
        self.lifecycle(ServiceAction::Stop).await
    }

    /// Same call as [`Self::start`].
    pub async fn scale_up(&self) -> Result<SuccessResponse> {
        self.lifecycle(ServiceAction::Start).await
    }

    /// Same call as [`Self::stop`].
    pub async fn scale_down(&self) -> Result<SuccessResponse> {
        self.lifecycle(ServiceAction::Stop).await
    }

    pub async fn repair(&self) -> Result<SuccessResponse> {
        self.lifecycle(ServiceAction::Repair).await
    }

    #[instrument(skip(self), fields(service = %self.id()))]
    async fn lifecycle(&self, action: ServiceAction) -> Result<SuccessResponse> {
        let path = self.manage_path(&format!("/{action}"));
        let body: Value = self.api.put(&path, &app_query(self.app_id()), &json!({})).await?;
        Ok(SuccessResponse::from_body(body))
    }

    pub fn integrations(&self) -> IntegrationEditor {
        IntegrationEditor::from_service(self.data())
    }

    pub async fn set_integrations(&mut self, editor: IntegrationEditor) -> Result<&mut Self> {
        editor.apply_to(self.data_mut());
        self.save().await
    }

    pub fn roles(&self) -> RoleEditor {
        RoleEditor::from_service(self.data())
    }

    pub async fn set_roles(&mut self, editor: RoleEditor) -> Result<&mut Self> {
        editor.apply_to(self.data_mut());
        self.save().await
    }

    pub fn schema(&self) -> SchemaEditor {
        SchemaEditor::from_service(self.data())
    }

    pub async fn set_schema(&mut self, editor: SchemaEditor) -> Result<&mut Self> {
        editor.apply_to(self.data_mut());
        self.save().await
    }

    /// `PUT service/{id}` with the cleaned definition, merging the response.
    #[instrument(skip(self), fields(service = %self.id()))]
    async fn save(&mut self) -> Result<&mut Self> {
        let payload = self.data().to_update_payload()?;
        let query = app_query(self.app_id());
        let response: Value = self.api.put(&self.service_path(), &query, &payload).await?;
        if response.is_object() {
            self.data_mut().merge_response(response)?;
        }
        info!(service = self.id(), "Data service saved");
        Ok(self)
    }

    /// Document API of the active definition.
    ///
    /// # Errors
    /// `Usage` when the definition has no `api` path.
    pub fn data_api(&self) -> Result<DataApi> {
        Ok(DataApi::new(self.app.clone(), self.api_segment()?, self.api.clone()))
    }

    /// # Errors
    /// `Usage` when the definition has no `api` path.
    pub fn workflow_api(&self) -> Result<WorkflowApi> {
        Ok(WorkflowApi::new(self.app.clone(), self.api_segment()?, self.api.clone()))
    }

    fn api_segment(&self) -> Result<String> {
        let api = self.data().api();
        if api.is_empty() {
            let message = format!("data service '{}' has no api path", self.id());
            return Err(DataStackError::usage(message));
        }
        Ok(api.to_string())
    }
}
