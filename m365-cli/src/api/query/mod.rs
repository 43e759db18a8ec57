//! OData Collection Query Module
//!
//! `QueryRequest` describes what to fetch; `Pages` walks the continuation
//! chain one request at a time.

pub mod pages;
pub mod request;

pub use pages::Pages;
pub use request::{QueryRequest, build_headers};
