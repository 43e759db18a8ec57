use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Application credentials for one query. Never persisted by the library.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Azure AD application (client) id
    pub client_id: String,
    pub client_secret: String,
    /// Azure AD directory (tenant) id
    pub tenant_id: String,
    /// Resource root, e.g. `https://org.crm4.dynamics.com`
    pub base_url: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        tenant_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            tenant_id: tenant_id.into(),
            base_url: base_url.into(),
        }
    }

    /// Name of the first empty field, if any
    pub fn first_missing(&self) -> Option<&'static str> {
        [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("tenant_id", &self.tenant_id),
            ("base_url", &self.base_url),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
    }
}

/// Raw token endpoint payload
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
    /// Present on failures
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Token acquired for one query
#[derive(Debug, Clone, Serialize)]
pub struct TokenInfo {
    pub access_token: String,
    /// Expiry as reported by the identity provider. Informational only.
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenInfo {
    pub fn from_response(access_token: String, expires_in: Option<i64>) -> Self {
        Self {
            access_token,
            expires_at: expires_in
                .and_then(Duration::try_seconds)
                .and_then(|lifetime| Utc::now().checked_add_signed(lifetime)),
        }
    }

    /// `Bearer <token>`
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// One page of an OData collection response
#[derive(Debug, Clone, Deserialize)]
pub struct PageResponse {
    pub value: Vec<Value>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
    #[serde(rename = "@odata.count", default)]
    pub count: Option<u64>,
}
