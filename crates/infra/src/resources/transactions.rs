//! Batched multi-document transactions

use datastack_domain::{App, Document, Result, TransactionOperation};
use serde_json::Value;
use tracing::{info, instrument};

use super::app_query;
use crate::api::ApiClient;

const TXN_PATH: &str = "/api/common/txn";

/// Ordered queue of operations sent to `/api/common/txn` in one call
#[derive(Clone, Debug)]
pub struct TransactionApi {
    app: App,
    api: ApiClient,
    operations: Vec<TransactionOperation>,
}

impl TransactionApi {
    pub(crate) fn new(app: App, api: ApiClient) -> Self {
        Self { app, api, operations: Vec::new() }
    }

    pub fn operations(&self) -> &[TransactionOperation] {
        &self.operations
    }

    pub fn create_operation(&mut self, service: &str, data: Document) -> &mut Self {
        self.operations.push(TransactionOperation::create(self.app.id(), service, data));
        self
    }

    pub fn update_operation(&mut self, service: &str, data: Document, upsert: bool) -> &mut Self {
        self.operations.push(TransactionOperation::update(self.app.id(), service, data, upsert));
        self
    }

    pub fn delete_operation(&mut self, service: &str, data: Document) -> &mut Self {
        self.operations.push(TransactionOperation::delete(self.app.id(), service, data));
        self
    }

    /// Send the queued operations. The queue is empty afterwards whether or
    /// not the call succeeded.
    #[instrument(skip(self), fields(app = %self.app.id(), count = self.operations.len()))]
    pub async fn execute(&mut self) -> Result<Value> {
        let operations = std::mem::take(&mut self.operations);
        let body: Value = self.api.post(TXN_PATH, &app_query(self.app.id()), &operations).await?;
        info!(count = operations.len(), "Transaction executed");
        Ok(body)
    }
}
