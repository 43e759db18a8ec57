//! Client-credentials token acquisition against the Microsoft identity platform

use super::constants::{CLIENT_CREDENTIALS_GRANT, default_scope, token_endpoint};
use super::error::{ApiError, Result};
use super::models::{Credentials, TokenInfo, TokenResponse};
use log::{debug, info};
use reqwest::Client;

/// Obtains application tokens scoped to `{base_url}/.default`.
///
/// Every call is a fresh round trip to the token endpoint; tokens are not
/// cached between queries.
#[derive(Debug, Clone)]
pub struct TokenAcquirer {
    http: Client,
    authority_host: String,
}

impl TokenAcquirer {
    pub fn new(http: Client, authority_host: impl Into<String>) -> Self {
        Self {
            http,
            authority_host: authority_host.into(),
        }
    }

    /// Run the client-credentials grant for `credentials`
    pub async fn acquire(&self, credentials: &Credentials) -> Result<TokenInfo> {
        if let Some(field) = credentials.first_missing() {
            return Err(ApiError::auth(format!("{} must not be empty", field)));
        }

        let endpoint = token_endpoint(&self.authority_host, &credentials.tenant_id);
        let scope = default_scope(&credentials.base_url);
        debug!("Requesting client-credentials token from {} (scope {})", endpoint, scope);

        let params = [
            ("grant_type", CLIENT_CREDENTIALS_GRANT),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("scope", scope.as_str()),
        ];

        let response = self
            .http
            .post(&endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| ApiError::auth(format!("token endpoint {} unreachable: {}", endpoint, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::auth(format!("failed to read token response: {}", e)))?;
        let parsed = serde_json::from_str::<TokenResponse>(&body).ok();

        if !status.is_success() {
            let detail = parsed.as_ref().and_then(describe_error).unwrap_or(body);
            return Err(ApiError::auth(format!(
                "token request failed with status {}: {}",
                status, detail
            )));
        }

        let parsed =
            parsed.ok_or_else(|| ApiError::auth("token endpoint returned a non-JSON body"))?;
        let expires_in = parsed.expires_in;
        let access_token = match parsed.access_token {
            Some(token) if !token.is_empty() => token,
            _ => {
                let detail = describe_error(&parsed)
                    .unwrap_or_else(|| "response has no access_token".to_string());
                return Err(ApiError::auth(detail));
            }
        };

        info!(
            "Acquired access token for {} (expires in {}s)",
            credentials.base_url,
            expires_in.map_or_else(|| "?".to_string(), |s| s.to_string())
        );
        Ok(TokenInfo::from_response(access_token, expires_in))
    }
}

/// `error: error_description` from an identity provider failure payload
fn describe_error(response: &TokenResponse) -> Option<String> {
    match (&response.error, &response.error_description) {
        (Some(code), Some(description)) => Some(format!("{}: {}", code, description)),
        (Some(code), None) => Some(code.clone()),
        (None, Some(description)) => Some(description.clone()),
        (None, None) => None,
    }
}
