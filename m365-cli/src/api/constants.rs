//! Fixed protocol values for the identity provider and OData endpoints

/// Default Microsoft identity platform authority host
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Default page size requested through `Prefer: odata.maxpagesize`.
/// Dataverse caps pages at 5000 records.
pub const DEFAULT_CHUNKSIZE: u32 = 5000;

/// Scope suffix for application permissions on a resource
pub const DEFAULT_SCOPE_SUFFIX: &str = "/.default";

pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";

pub mod headers {
    use reqwest::header::HeaderName;

    pub const ODATA_MAX_VERSION: HeaderName = HeaderName::from_static("odata-maxversion");
    pub const ODATA_VERSION: HeaderName = HeaderName::from_static("odata-version");
    pub const PREFER: HeaderName = HeaderName::from_static("prefer");

    pub const ODATA_VERSION_VALUE: &str = "4.0";
    pub const ACCEPT_JSON: &str = "application/json";
    pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
}

pub mod odata {
    pub const INCLUDE_ANNOTATIONS: &str = "odata.include-annotations";
    pub const FORMATTED_VALUE: &str = "OData.Community.Display.V1.FormattedValue";
}

/// Token endpoint for a tenant under the given authority host
pub fn token_endpoint(authority_host: &str, tenant_id: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        authority_host.trim_end_matches('/'),
        tenant_id
    )
}

/// `{base_url}/.default`
pub fn default_scope(base_url: &str) -> String {
    format!("{}{}", base_url, DEFAULT_SCOPE_SUFFIX)
}

/// Value of the `Prefer` header for a page size
pub fn prefer_header(chunksize: u32) -> String {
    format!(
        "odata.maxpagesize={}, {}={}",
        chunksize,
        odata::INCLUDE_ANNOTATIONS,
        odata::FORMATTED_VALUE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_endpoint() {
        assert_eq!(
            token_endpoint("https://login.microsoftonline.com", "tenant-1"),
            "https://login.microsoftonline.com/tenant-1/oauth2/v2.0/token"
        );
        // Trailing slash on the host is tolerated
        assert_eq!(
            token_endpoint("http://127.0.0.1:8080/", "t"),
            "http://127.0.0.1:8080/t/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_default_scope() {
        assert_eq!(
            default_scope("https://org.crm4.dynamics.com"),
            "https://org.crm4.dynamics.com/.default"
        );
    }

    #[test]
    fn test_prefer_header() {
        assert_eq!(
            prefer_header(250),
            "odata.maxpagesize=250, odata.include-annotations=OData.Community.Display.V1.FormattedValue"
        );
    }
}
