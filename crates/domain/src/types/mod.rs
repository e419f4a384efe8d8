//! Wire models of the data.stack platform

pub mod app;
pub mod data_service;
pub mod document;
pub mod editors;
pub mod math;
pub mod query;
pub mod responses;
pub mod role;
pub mod schema;
pub mod session;
pub mod transaction;
pub mod workflow;

pub use app::{App, AppCenterStyle, Logo};
pub use data_service::{DataService, WebHook, WorkflowHooks, WorkflowPostHooks};
pub use document::{Document, Metadata, MetadataVersion};
pub use editors::{IntegrationEditor, RoleEditor, SchemaEditor};
pub use math::MathApi;
pub use query::{ExpireOptions, Filter, ListOptions};
pub use responses::{FileMetadata, FileUploadResponse, SuccessResponse};
pub use role::{RoleBlock, RoleConfig, RoleMethod, RoleOperation};
pub use schema::{SchemaField, SchemaFieldProperties, SchemaFieldType};
pub use session::{
    BasicDetails, Credentials, Identity, SessionPolicy, SessionSnapshot, UserDetails,
};
pub use transaction::{TransactionMethod, TransactionOperation, TransactionTarget};
pub use workflow::{WorkflowAction, WorkflowRespond};
