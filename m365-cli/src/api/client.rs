//! Entry points tying token acquisition to paginated fetching

use super::auth::TokenAcquirer;
use super::constants::DEFAULT_AUTHORITY_HOST;
use super::error::Result;
use super::models::{Credentials, TokenInfo};
use super::query::{Pages, QueryRequest, build_headers};
use log::debug;
use reqwest::Client;

/// Microsoft 365 OData client
///
/// Holds the HTTP connection pool and the identity provider location. Each
/// call to [`M365Client::query`] acquires its own token.
#[derive(Debug, Clone)]
pub struct M365Client {
    http: Client,
    acquirer: TokenAcquirer,
}

impl M365Client {
    pub fn new() -> Self {
        Self::with_authority_host(DEFAULT_AUTHORITY_HOST)
    }

    /// Use a different identity provider host (sovereign clouds, tests)
    pub fn with_authority_host(authority_host: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), authority_host)
    }

    pub fn with_http_client(http: Client, authority_host: impl Into<String>) -> Self {
        Self {
            acquirer: TokenAcquirer::new(http.clone(), authority_host),
            http,
        }
    }

    pub async fn acquire_token(&self, credentials: &Credentials) -> Result<TokenInfo> {
        self.acquirer.acquire(credentials).await
    }

    /// Acquire a token and return a cursor positioned at the first page.
    ///
    /// No page is requested until the cursor is pulled.
    pub async fn query(&self, credentials: &Credentials, request: &QueryRequest) -> Result<Pages> {
        let token = self.acquirer.acquire(credentials).await?;
        let headers = build_headers(&token, request.chunksize)?;
        let url = request.initial_url(&credentials.base_url);
        debug!("Starting query at {} (page size {})", url, request.chunksize);

        Ok(Pages::new(self.http.clone(), headers, url))
    }
}

impl Default for M365Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Query a Microsoft 365 OData collection with client credentials.
///
/// Returns a lazy sequence of pages starting at `{base_url}/{api_url}{query}`.
pub async fn query_api(
    client_id: &str,
    client_secret: &str,
    tenant_id: &str,
    base_url: &str,
    api_url: &str,
    query: &str,
    chunksize: u32,
) -> Result<Pages> {
    let credentials = Credentials::new(client_id, client_secret, tenant_id, base_url);
    let request = QueryRequest::new(api_url).query(query).chunksize(chunksize);
    M365Client::new().query(&credentials, &request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TENANT: &str = "tenant-1";
    const COLLECTION: &str = "/api/data/v9.2/contacts";

    async fn mount_token(server: &MockServer, token: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path(format!("/{}/oauth2/v2.0/token", TENANT)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token_type": "Bearer",
                "expires_in": 3599,
                "access_token": token
            })))
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    async fn mount_page(server: &MockServer, page: usize, next: Option<usize>) {
        let mut body = json!({"value": [{"contactid": format!("c{}", page)}]});
        if let Some(next) = next {
            body["@odata.nextLink"] = json!(format!(
                "{}{}?$skiptoken={}",
                server.uri(),
                COLLECTION,
                next
            ));
        }
        Mock::given(method("GET"))
            .and(path(COLLECTION))
            .and(query_param("$skiptoken", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    fn credentials(server: &MockServer) -> Credentials {
        Credentials::new("app-id", "app-secret", TENANT, server.uri())
    }

    #[tokio::test]
    async fn test_query_sends_fixed_headers_on_every_page() {
        let server = MockServer::start().await;
        mount_token(&server, "token-abc", 1).await;
        mount_page(&server, 1, Some(2)).await;
        mount_page(&server, 2, Some(3)).await;
        mount_page(&server, 3, None).await;

        let client = M365Client::with_authority_host(server.uri());
        let request = QueryRequest::new("api/data/v9.2/contacts")
            .query("?$skiptoken=1")
            .chunksize(2);

        let records = client
            .query(&credentials(&server), &request)
            .await
            .unwrap()
            .collect_records()
            .await
            .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2]["contactid"], "c3");

        let gets: Vec<_> = server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.method.as_str() == "GET")
            .collect();
        assert_eq!(gets.len(), 3);

        for request in gets {
            let header = |name: &str| request.headers.get(name).unwrap().to_str().unwrap().to_string();
            assert_eq!(header("authorization"), "Bearer token-abc");
            assert_eq!(header("odata-maxversion"), "4.0");
            assert_eq!(header("odata-version"), "4.0");
            assert_eq!(header("accept"), "application/json");
            assert_eq!(header("content-type"), "application/json; charset=utf-8");
            assert_eq!(
                header("prefer"),
                "odata.maxpagesize=2, odata.include-annotations=OData.Community.Display.V1.FormattedValue"
            );
        }
    }

    #[tokio::test]
    async fn test_each_query_acquires_a_new_token() {
        let server = MockServer::start().await;
        mount_token(&server, "token-abc", 2).await;
        mount_page(&server, 1, None).await;

        let client = M365Client::with_authority_host(server.uri());
        let request = QueryRequest::new("api/data/v9.2/contacts").query("?$skiptoken=1");
        let creds = credentials(&server);

        for _ in 0..2 {
            let records = client
                .query(&creds, &request)
                .await
                .unwrap()
                .collect_records()
                .await
                .unwrap();
            assert_eq!(records.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_query_is_lazy() {
        let server = MockServer::start().await;
        mount_token(&server, "token-abc", 1).await;
        mount_page(&server, 1, None).await;

        let client = M365Client::with_authority_host(server.uri());
        let request = QueryRequest::new("api/data/v9.2/contacts").query("?$skiptoken=1");
        let pages = client.query(&credentials(&server), &request).await.unwrap();

        // Only the token request has been made so far
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
        assert_eq!(pages.pages_fetched(), 0);
    }

    #[tokio::test]
    async fn test_auth_failure_prevents_page_requests() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_request",
                "error_description": "AADSTS90002: Tenant not found."
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = M365Client::with_authority_host(server.uri());
        let err = client
            .query(&credentials(&server), &QueryRequest::new("api/data/v9.2/contacts"))
            .await
            .unwrap_err();

        assert!(err.is_auth());
        assert!(err.to_string().contains("AADSTS90002"));
    }

    #[tokio::test]
    async fn test_forbidden_first_page() {
        let server = MockServer::start().await;
        mount_token(&server, "token-abc", 1).await;

        Mock::given(method("GET"))
            .and(path(COLLECTION))
            .respond_with(ResponseTemplate::new(403).set_body_string("Principal user is missing prvReadContact"))
            .mount(&server)
            .await;

        let client = M365Client::with_authority_host(server.uri());
        let mut pages = client
            .query(&credentials(&server), &QueryRequest::new("api/data/v9.2/contacts"))
            .await
            .unwrap();

        let err = pages.next_page().await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
        assert!(err.to_string().contains("prvReadContact"));
        assert_eq!(pages.pages_fetched(), 0);
    }
}
