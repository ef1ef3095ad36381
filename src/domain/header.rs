//! HTTP header name/value pairs produced for outbound requests

use std::fmt;

/// Header name for endpoint authorization
pub const AUTHORIZATION: &str = "Authorization";

/// Header name for proxy authorization
pub const PROXY_AUTHORIZATION: &str = "Proxy-Authorization";

/// Header carrying the connectivity location id of an on-premise target
pub const LOCATION_ID: &str = "SAP-Connectivity-SCC-Location_ID";

/// Header carrying the user token for principal propagation
pub const CONNECTIVITY_AUTHENTICATION: &str = "SAP-Connectivity-Authentication";

/// A single outbound header; names compare case-insensitively
#[derive(Clone, Debug, Eq)]
pub struct Header {
    name: String,
    value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Convert into `http` crate types for a transport
    pub fn to_http(&self) -> Result<(http::HeaderName, http::HeaderValue), http::Error> {
        let name = http::HeaderName::try_from(self.name.as_str())?;
        let value = http::HeaderValue::try_from(self.value.as_str())?;
        Ok((name, value))
    }
}

impl PartialEq for Header {
    fn eq(&self, other: &Self) -> bool {
        self.has_name(&other.name) && self.value == other.value
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Whether any header in `headers` is named `name`
pub fn contains_header(headers: &[Header], name: &str) -> bool {
    headers.iter().any(|h| h.has_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_compare_case_insensitively() {
        assert_eq!(Header::new("authorization", "x"), Header::new("Authorization", "x"));
        assert_ne!(Header::new("Authorization", "x"), Header::new("Authorization", "y"));
    }

    #[test]
    fn test_contains_header() {
        let headers = vec![Header::new("proxy-authorization", "Basic abc")];
        assert!(contains_header(&headers, PROXY_AUTHORIZATION));
        assert!(!contains_header(&headers, AUTHORIZATION));
    }

    #[test]
    fn test_to_http() {
        let (name, value) = Header::new("X-Custom", "v").to_http().unwrap();
        assert_eq!(name.as_str(), "x-custom");
        assert_eq!(value.to_str().unwrap(), "v");

        assert!(Header::new("bad name", "v").to_http().is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Header::new("A", "b").to_string(), "A: b");
    }
}
