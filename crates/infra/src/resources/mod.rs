//! Resource clients
//!
//! Thin mappers from method calls to REST exchanges. None of them hold a
//! token; every call reads the current one from the session through
//! [`crate::api::ApiClient`].

pub mod app;
pub mod data_service;
pub mod datastack;
pub mod documents;
pub mod transactions;
pub mod workflow;

pub use app::AppClient;
pub use data_service::{DataServiceClient, ServiceAction};
pub use datastack::DataStack;
pub use documents::DataApi;
pub use transactions::TransactionApi;
pub use workflow::WorkflowApi;

use datastack_domain::ListOptions;

use crate::api::Query;

/// `app` parameter carried by nearly every call below an app.
pub(crate) fn app_query(app_id: &str) -> Query {
    vec![("app", app_id.to_string())]
}

/// Append the list options that are set, in the order the platform documents
/// them. `filter` is handled by the caller.
pub(crate) fn push_list_options(query: &mut Query, options: &ListOptions) {
    if let Some(select) = &options.select {
        query.push(("select", select.clone()));
    }
    if let Some(sort) = &options.sort {
        query.push(("sort", sort.clone()));
    }
    if let Some(count) = options.count {
        query.push(("count", count.to_string()));
    }
    if let Some(page) = options.page {
        query.push(("page", page.to_string()));
    }
    if options.expand {
        query.push(("expand", "true".to_string()));
    }
}
