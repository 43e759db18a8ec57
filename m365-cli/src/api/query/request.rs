//! Query description and the fixed header set sent with every page request

use crate::api::constants::{DEFAULT_CHUNKSIZE, headers, prefer_header};
use crate::api::error::Result;
use crate::api::models::TokenInfo;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};

/// A collection query relative to the credentials' base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    /// API path, e.g. `api/data/v9.2/accounts`
    pub api_url: String,
    /// Query string appended verbatim, e.g. `?$select=name`
    pub query: String,
    /// Requested page size (`odata.maxpagesize`)
    pub chunksize: u32,
}

impl QueryRequest {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            query: String::new(),
            chunksize: DEFAULT_CHUNKSIZE,
        }
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn chunksize(mut self, chunksize: u32) -> Self {
        self.chunksize = chunksize;
        self
    }

    /// `{base_url}/{api_url}{query}`, no escaping applied
    pub fn initial_url(&self, base_url: &str) -> String {
        format!("{}/{}{}", base_url, self.api_url, self.query)
    }
}

/// Headers shared by every request of one query
pub fn build_headers(token: &TokenInfo, chunksize: u32) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();

    let mut authorization = HeaderValue::from_str(&token.bearer())?;
    authorization.set_sensitive(true);
    map.insert(AUTHORIZATION, authorization);

    map.insert(
        headers::ODATA_MAX_VERSION,
        HeaderValue::from_static(headers::ODATA_VERSION_VALUE),
    );
    map.insert(
        headers::ODATA_VERSION,
        HeaderValue::from_static(headers::ODATA_VERSION_VALUE),
    );
    map.insert(ACCEPT, HeaderValue::from_static(headers::ACCEPT_JSON));
    map.insert(CONTENT_TYPE, HeaderValue::from_static(headers::CONTENT_TYPE_JSON));
    map.insert(headers::PREFER, HeaderValue::from_str(&prefer_header(chunksize))?);

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_url_is_verbatim() {
        let request = QueryRequest::new("api/data/v9.2/accounts")
            .query("?$select=name&$filter=statecode eq 0")
            .chunksize(100);

        assert_eq!(
            request.initial_url("https://org.crm4.dynamics.com"),
            "https://org.crm4.dynamics.com/api/data/v9.2/accounts?$select=name&$filter=statecode eq 0"
        );
        assert_eq!(request.chunksize, 100);
    }

    #[test]
    fn test_default_chunksize() {
        let request = QueryRequest::new("v1.0/users");
        assert_eq!(request.chunksize, DEFAULT_CHUNKSIZE);
        assert_eq!(request.initial_url("https://graph.microsoft.com"), "https://graph.microsoft.com/v1.0/users");
    }

    #[test]
    fn test_build_headers() {
        let token = TokenInfo::from_response("tok".to_string(), None);
        let map = build_headers(&token, 500).unwrap();

        assert_eq!(map.get(AUTHORIZATION).unwrap(), "Bearer tok");
        assert!(map.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(map.get(&headers::ODATA_MAX_VERSION).unwrap(), "4.0");
        assert_eq!(map.get(&headers::ODATA_VERSION).unwrap(), "4.0");
        assert_eq!(map.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(map.get(CONTENT_TYPE).unwrap(), "application/json; charset=utf-8");
        // Wire names are matched case-insensitively
        assert_eq!(map.get("OData-MaxVersion").unwrap(), "4.0");
        assert_eq!(
            map.get(&headers::PREFER).unwrap(),
            "odata.maxpagesize=500, odata.include-annotations=OData.Community.Display.V1.FormattedValue"
        );
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        let token = TokenInfo::from_response("bad\ntoken".to_string(), None);
        assert!(build_headers(&token, 10).is_err());
    }
}
