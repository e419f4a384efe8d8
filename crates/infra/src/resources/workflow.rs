//! Workflow actions under `{records}/utils/workflow`

use datastack_domain::constants::COUNT_ALL;
use datastack_domain::{App, Filter, Result, WorkflowAction, WorkflowRespond};
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, instrument};

use super::app_query;
use crate::api::{ApiClient, Query};

#[derive(Deserialize)]
struct PendingItem {
    #[serde(rename = "_id")]
    id: String,
}

/// Approve, reject or send back records awaiting review
#[derive(Clone, Debug)]
pub struct WorkflowApi {
    app: App,
    path: String,
    api: ApiClient,
}

impl WorkflowApi {
    pub(crate) fn new(app: App, service_api: String, api: ApiClient) -> Self {
        let path = format!("/api/c/{}{}/utils/workflow/action", app.id(), service_api);
        Self { app, path, api }
    }

    fn query(&self) -> Query {
        app_query(self.app.id())
    }

    pub fn create_respond_data(&self) -> WorkflowRespond {
        WorkflowRespond::new()
    }

    pub async fn approve_records(
        &self,
        ids: &[String],
        respond: &WorkflowRespond,
    ) -> Result<Value> {
        self.respond(WorkflowAction::Approve, ids, respond).await
    }

    pub async fn reject_records(&self, ids: &[String], respond: &WorkflowRespond) -> Result<Value> {
        self.respond(WorkflowAction::Reject, ids, respond).await
    }

    pub async fn rework_records(&self, ids: &[String], respond: &WorkflowRespond) -> Result<Value> {
        self.respond(WorkflowAction::Rework, ids, respond).await
    }

    pub async fn approve_records_requested_by(
        &self,
        user: &str,
        respond: &WorkflowRespond,
    ) -> Result<Value> {
        let ids = self.pending_ids_of(user).await?;
        self.respond(WorkflowAction::Approve, &ids, respond).await
    }

    pub async fn reject_records_requested_by(
        &self,
        user: &str,
        respond: &WorkflowRespond,
    ) -> Result<Value> {
        let ids = self.pending_ids_of(user).await?;
        self.respond(WorkflowAction::Reject, &ids, respond).await
    }

    pub async fn rework_records_requested_by(
        &self,
        user: &str,
        respond: &WorkflowRespond,
    ) -> Result<Value> {
        let ids = self.pending_ids_of(user).await?;
        self.respond(WorkflowAction::Rework, &ids, respond).await
    }

    /// Ids of records `user` submitted that are still pending.
    #[instrument(skip(self))]
    pub async fn pending_ids_of(&self, user: &str) -> Result<Vec<String>> {
        let filter = Filter::new().with("requestedBy", user).with("status", "Pending");
        let mut query = self.query();
        query.push(("select", "_id".to_string()));
        query.push(("count", COUNT_ALL.to_string()));
        query.push(("filter", filter.to_query_value()));

        let items: Vec<PendingItem> = self.api.get(&self.path, &query).await?;
        Ok(items.into_iter().map(|item| item.id).collect())
    }

    /// The platform's response is returned as-is.
    #[instrument(skip(self, ids, respond), fields(count = ids.len()))]
    async fn respond(
        &self,
        action: WorkflowAction,
        ids: &[String],
        respond: &WorkflowRespond,
    ) -> Result<Value> {
        let payload = respond.create_payload(action, ids)?;
        let body: Value = self.api.put(&self.path, &self.query(), &payload).await?;
        info!(%action, count = ids.len(), "Workflow action applied");
        Ok(body)
    }
}
