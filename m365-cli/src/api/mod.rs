//! Microsoft 365 Web API Module
//!
//! Thin client over the Microsoft identity platform and OData REST endpoints
//! (Dataverse Web API, Microsoft Graph). A query acquires one bearer token and
//! then lazily follows the continuation chain of the requested collection.

pub mod annotations;
pub mod auth;
pub mod client;
pub mod constants;
pub mod error;
pub mod models;
pub mod query;

pub use auth::TokenAcquirer;
pub use client::{M365Client, query_api};
pub use error::{ApiError, Result};
pub use models::{Credentials, PageResponse, TokenInfo, TokenResponse};
pub use query::{Pages, QueryRequest};
