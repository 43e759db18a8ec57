//! Microsoft 365 OData query client
//!
//! Acquires an application token with the OAuth2 client-credentials grant and
//! walks `@odata.nextLink` continuation chains, producing one page of records
//! per request.

pub mod api;
pub mod config;

pub use api::{ApiError, Credentials, M365Client, Pages, QueryRequest, query_api};
pub use config::Config;
