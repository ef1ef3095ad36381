//! Credential value objects and proxy configuration

use crate::domain::property::MASKED_VALUE;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http::Uri;
use std::fmt;

/// Authorization scheme prefix for basic credentials
pub const BASIC_PREFIX: &str = "Basic ";

/// Authorization scheme prefix for bearer tokens
pub const BEARER_PREFIX: &str = "Bearer ";

/// Username and password pair
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BasicCredentials {
    username: String,
    password: String,
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Base64 of `user:pass`, without the scheme
    pub fn encoded(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.username, self.password))
    }

    /// Value for an `Authorization` style header
    pub fn http_header_value(&self) -> String {
        format!("{BASIC_PREFIX}{}", self.encoded())
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &format_args!("{MASKED_VALUE}"))
            .finish()
    }
}

/// Opaque bearer token
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BearerCredentials {
    token: String,
}

impl BearerCredentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn http_header_value(&self) -> String {
        format!("{BEARER_PREFIX}{}", self.token)
    }
}

impl fmt::Debug for BearerCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerCredentials({MASKED_VALUE})")
    }
}

/// Credentials presented to a proxy or endpoint
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Credentials {
    /// Explicitly no credentials
    None,
    Basic(BasicCredentials),
    Bearer(BearerCredentials),
}

impl Credentials {
    /// Header value to send, if these credentials produce one
    pub fn http_header_value(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Basic(basic) => Some(basic.http_header_value()),
            Self::Bearer(bearer) => Some(bearer.http_header_value()),
        }
    }
}

/// Where to send traffic and how to authenticate against the proxy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyConfiguration {
    uri: Uri,
    credentials: Option<Credentials>,
}

impl ProxyConfiguration {
    pub fn new(uri: Uri) -> Self {
        Self {
            uri,
            credentials: None,
        }
    }

    pub fn with_credentials(uri: Uri, credentials: Credentials) -> Self {
        Self {
            uri,
            credentials: Some(credentials),
        }
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}
