//! Document CRUD under `/api/c/{app}{api}`

use std::path::Path;

use datastack_domain::{
    App, DataStackError, Document, ExpireOptions, FileUploadResponse, Filter, ListOptions,
    MathApi, Result, SuccessResponse,
};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::{info, instrument};

use super::{app_query, push_list_options};
use crate::api::{ApiClient, Query};

/// Record operations of one data service
#[derive(Clone, Debug)]
pub struct DataApi {
    app: App,
    path: String,
    api: ApiClient,
}

impl DataApi {
    pub(crate) fn new(app: App, service_api: String, api: ApiClient) -> Self {
        let path = format!("/api/c/{}{}", app.id(), service_api);
        Self { app, path, api }
    }

    /// Path of the records collection, e.g. `/api/c/Adam/employees`.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn record_path(&self, id: &str) -> String {
        format!("{}/{}", self.path, id)
    }

    fn query(&self) -> Query {
        app_query(self.app.id())
    }

    fn query_with_expiry(&self, expire: Option<&ExpireOptions>) -> Query {
        let mut query = self.query();
        if let Some(expire) = expire {
            query.extend(expire.query_pairs());
        }
        query
    }

    /// Local document; nothing is sent until it is created.
    pub fn new_document(&self, data: Option<Value>) -> Result<Document> {
        match data {
            Some(value) => Document::try_from(value),
            None => Ok(Document::new()),
        }
    }

    #[instrument(skip(self, filter), fields(path = %self.path))]
    pub async fn count_records(&self, filter: Option<&Filter>) -> Result<u64> {
        let mut query = vec![("countOnly", "true".to_string())];
        query.extend(self.query());
        if let Some(filter) = filter {
            query.push(("filter", filter.to_query_value()));
        }
        self.api.get(&self.path, &query).await
    }

    #[instrument(skip(self, options), fields(path = %self.path))]
    pub async fn list_records(&self, options: &ListOptions) -> Result<Vec<Document>> {
        let mut query = self.query();
        push_list_options(&mut query, options);
        if let Some(filter) = &options.filter {
            query.push(("filter", filter.to_query_value()));
        }
        self.api.get(&self.path, &query).await
    }

    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn get_record(&self, id: &str) -> Result<Document> {
        self.api.get(&self.record_path(id), &self.query()).await
    }

    /// Create a record; the result carries the server `_id` and `_metadata`.
    #[instrument(skip(self, document, expire), fields(path = %self.path))]
    pub async fn create_record(
        &self,
        document: &Document,
        expire: Option<&ExpireOptions>,
    ) -> Result<Document> {
        let query = self.query_with_expiry(expire);
        let created: Document = self.api.post(&self.path, &query, document).await?;
        info!(id = ?created.id(), "Record created");
        Ok(created)
    }

    #[instrument(skip(self, document, expire), fields(path = %self.path))]
    pub async fn update_record(
        &self,
        id: &str,
        document: &Document,
        expire: Option<&ExpireOptions>,
    ) -> Result<Document> {
        self.api.put(&self.record_path(id), &self.query_with_expiry(expire), document).await
    }

    /// Update the record, creating it when `id` does not exist.
    #[instrument(skip(self, document, expire), fields(path = %self.path))]
    pub async fn upsert_record(
        &self,
        id: &str,
        document: &Document,
        expire: Option<&ExpireOptions>,
    ) -> Result<Document> {
        let mut query = vec![("upsert", "true".to_string())];
        query.extend(self.query_with_expiry(expire));
        self.api.put(&self.record_path(id), &query, document).await
    }

    #[instrument(skip(self), fields(path = %self.path))]
    pub async fn delete_record(&self, id: &str) -> Result<SuccessResponse> {
        let body: Value = self.api.delete(&self.record_path(id), &self.query()).await?;
        Ok(SuccessResponse::from_body(body))
    }

    pub fn prepare_math(&self) -> MathApi {
        MathApi::new()
    }

    /// # Errors
    /// `Usage` when no operation was recorded.
    #[instrument(skip(self, math), fields(path = %self.path))]
    pub async fn apply_math(&self, id: &str, math: &MathApi) -> Result<Document> {
        if math.is_empty() {
            return Err(DataStackError::usage("math request has no operations"));
        }
        let path = format!("{}/math", self.record_path(id));
        self.api.put(&path, &self.query(), &math.create_payload()).await
    }

    /// Upload a local file as multipart field `file`.
    ///
    /// # Errors
    /// `Usage` when the file cannot be read.
    pub async fn upload_file_from_path(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<FileUploadResponse> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DataStackError::usage(format!("cannot read {}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "file".to_string());
        self.upload_file_as_stream(name, bytes).await
    }

    /// Upload in-memory content under the given file name.
    #[instrument(skip(self, file_name, bytes), fields(path = %self.path, size = bytes.len()))]
    pub async fn upload_file_as_stream(
        &self,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<FileUploadResponse> {
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.into()));
        let path = format!("{}/utils/file/upload", self.path);
        let uploaded: FileUploadResponse =
            self.api.post_multipart(&path, &self.query(), form).await?;
        info!(file = ?uploaded.filename, "File uploaded");
        Ok(uploaded)
    }
}
