//! Pure derivations from a destination's raw properties
//!
//! These run once when an [`HttpDestination`](super::HttpDestination) is
//! built; their results are cached on the destination.

use crate::domain::credentials::{BasicCredentials, BearerCredentials, Credentials, ProxyConfiguration};
use crate::domain::header::{Header, PROXY_AUTHORIZATION};
use crate::domain::keys;
use crate::domain::property::{Properties, PropertyValue, MASKED_VALUE};
use crate::domain::types::{AuthenticationType, ProxyType};
use crate::error::{ConfigurationError, DestinationResult, PropertyError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http::Uri;
use tracing::{debug, info, warn};

const BASIC_SCHEME: &str = "basic ";
const BEARER_SCHEME: &str = "bearer ";
const DEFAULT_PROXY_SCHEME: &str = "http://";

/// Every value derived from the base properties at build time
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedProperties {
    pub proxy_configuration: Option<ProxyConfiguration>,
    pub proxy_type: ProxyType,
    pub basic_credentials: Option<BasicCredentials>,
    pub authentication_type: AuthenticationType,
    pub property_headers: Vec<Header>,
    pub proxy_authorization_headers: Vec<Header>,
}

impl DerivedProperties {
    pub fn derive(properties: &Properties) -> DestinationResult<Self> {
        let proxy_configuration = proxy_configuration(properties)?;
        let proxy_authorization_headers = proxy_authorization_headers(proxy_configuration.as_ref());

        Ok(Self {
            proxy_type: proxy_type(properties)?,
            basic_credentials: basic_credentials(properties)?,
            authentication_type: authentication_type(properties)?,
            property_headers: headers_from_properties(properties),
            proxy_configuration,
            proxy_authorization_headers,
        })
    }
}

/// Proxy from `Proxy`, or from `ProxyHost` + `ProxyPort`, with credentials
pub fn proxy_configuration(properties: &Properties) -> DestinationResult<Option<ProxyConfiguration>> {
    let uri = match proxy_uri(properties)? {
        Some(uri) => uri,
        None => match (
            properties.get(&keys::PROXY_HOST)?,
            properties.get(&keys::PROXY_PORT)?,
        ) {
            (Some(host), Some(port)) => proxy_uri_from_host_and_port(&host, port)?,
            _ => return Ok(None),
        },
    };

    Ok(Some(match proxy_credentials(properties)? {
        Some(credentials) => ProxyConfiguration::with_credentials(uri, credentials),
        None => ProxyConfiguration::new(uri),
    }))
}

fn proxy_uri(properties: &Properties) -> DestinationResult<Option<Uri>> {
    match properties.get_raw(keys::PROXY_URI.name()) {
        None => Ok(None),
        Some(PropertyValue::String(raw)) => parse_proxy_uri(raw).map(Some).map_err(Into::into),
        Some(_) => match properties.get(&keys::PROXY_URI)? {
            Some(uri) if uri.scheme().is_none() => {
                parse_proxy_uri(&uri.to_string()).map(Some).map_err(Into::into)
            }
            uri => Ok(uri),
        },
    }
}

fn parse_proxy_uri(raw: &str) -> Result<Uri, ConfigurationError> {
    let raw = raw.trim();
    let with_scheme = if raw.contains("://") {
        raw.to_string()
    } else {
        info!(proxy = raw, "Proxy URL has no scheme, using {DEFAULT_PROXY_SCHEME}");
        format!("{DEFAULT_PROXY_SCHEME}{raw}")
    };

    with_scheme
        .parse::<Uri>()
        .map_err(|e| ConfigurationError::InvalidProxyUri {
            value: raw.to_string(),
            reason: e.to_string(),
        })
}

fn proxy_uri_from_host_and_port(host: &str, port: i64) -> Result<Uri, ConfigurationError> {
    let port = u16::try_from(port).map_err(|_| ConfigurationError::InvalidProxyUri {
        value: format!("{host}:{port}"),
        reason: "port out of range".to_string(),
    })?;
    parse_proxy_uri(&format!("{DEFAULT_PROXY_SCHEME}{host}:{port}"))
}

/// Proxy credentials from `ProxyAuth`
///
/// `None` means no credentials could be derived, `Some(Credentials::None)`
/// that the destination explicitly declares none.
pub fn proxy_credentials(properties: &Properties) -> DestinationResult<Option<Credentials>> {
    let Some(value) = properties.get_raw(keys::PROXY_AUTH) else {
        return Ok(None);
    };
    if let Some(credentials) = value.downcast_ref::<Credentials>() {
        return Ok(Some(credentials.clone()));
    }
    match value {
        PropertyValue::String(raw) => Ok(parse_proxy_credentials(raw)?),
        other => Err(PropertyError::TypeMismatch {
            name: keys::PROXY_AUTH.to_string(),
            expected: "credentials",
            actual: other.kind(),
        }
        .into()),
    }
}

/// Parse a `Basic <base64 user:pass>` or `Bearer <token>` string
pub fn parse_proxy_credentials(raw: &str) -> Result<Option<Credentials>, ConfigurationError> {
    if raw.is_empty() {
        return Ok(Some(Credentials::None));
    }

    if let Some(encoded) = strip_prefix_ignore_case(raw, BASIC_SCHEME) {
        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ConfigurationError::MalformedProxyCredentials(e.to_string()))?;
        let decoded = String::from_utf8(decoded)
            .map_err(|e| ConfigurationError::MalformedProxyCredentials(e.to_string()))?;

        let parts: Vec<&str> = decoded.split(':').collect();
        return match parts.as_slice() {
            [user, password] => Ok(Some(Credentials::Basic(BasicCredentials::new(
                *user, *password,
            )))),
            _ => Err(ConfigurationError::MalformedProxyCredentials(format!(
                "expected 'user:password' but found {} part(s)",
                parts.len()
            ))),
        };
    }

    if let Some(token) = strip_prefix_ignore_case(raw, BEARER_SCHEME) {
        return Ok(Some(Credentials::Bearer(BearerCredentials::new(token))));
    }

    warn!(
        proxy_auth = %mask(raw),
        "Unsupported proxy credentials, continuing without proxy credentials"
    );
    Ok(None)
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

/// First four characters followed by the mask
pub(crate) fn mask(value: &str) -> String {
    let visible: String = value.chars().take(4).collect();
    format!("{visible}{MASKED_VALUE}")
}

/// `ProxyType`, `Internet` when absent
pub fn proxy_type(properties: &Properties) -> DestinationResult<ProxyType> {
    Ok(properties.get(&keys::PROXY_TYPE)?.unwrap_or_default())
}

/// Username (or its fallback name) and password; both or nothing
pub fn basic_credentials(properties: &Properties) -> DestinationResult<Option<BasicCredentials>> {
    let username = match properties.get(&keys::BASIC_AUTH_USERNAME)? {
        Some(username) => Some(username),
        None => properties.get(&keys::BASIC_AUTH_USERNAME_FALLBACK)?,
    };
    let password = properties.get(&keys::BASIC_AUTH_PASSWORD)?;

    Ok(username
        .zip(password)
        .map(|(username, password)| BasicCredentials::new(username, password)))
}

/// Declared authentication, upgraded from `NoAuthentication` when basic
/// credentials are present or token forwarding is switched on
pub fn authentication_type(properties: &Properties) -> DestinationResult<AuthenticationType> {
    let declared = match properties.get(&keys::AUTH_TYPE)? {
        Some(declared) => declared,
        None => properties
            .get(&keys::AUTH_TYPE_FALLBACK)?
            .unwrap_or(AuthenticationType::NoAuthentication),
    };

    if declared != AuthenticationType::NoAuthentication {
        return Ok(declared);
    }
    if basic_credentials(properties)?.is_some() {
        return Ok(AuthenticationType::BasicAuthentication);
    }
    if forwards_auth_token(properties)? {
        return Ok(AuthenticationType::TokenForwarding);
    }
    Ok(declared)
}

fn forwards_auth_token(properties: &Properties) -> DestinationResult<bool> {
    Ok(properties.get(&keys::FORWARD_AUTH_TOKEN)?.unwrap_or(false)
        || properties
            .get(&keys::FORWARD_AUTH_TOKEN_ALTERNATE)?
            .unwrap_or(false))
}

/// One header per `URL.headers.<name>` string property
pub fn headers_from_properties(properties: &Properties) -> Vec<Header> {
    prefixed_string_values(properties, keys::HEADER_PREFIX)
        .map(|(name, value)| Header::new(name, value))
        .collect()
}

/// One query parameter per `URL.queries.<name>` string property
pub fn query_parameters_from_properties(properties: &Properties) -> Vec<(String, String)> {
    prefixed_string_values(properties, keys::QUERY_PREFIX)
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn prefixed_string_values<'a>(
    properties: &'a Properties,
    prefix: &'a str,
) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    properties
        .with_prefix(prefix)
        .filter_map(move |(name, value)| match value.as_str() {
            Some(value) if !name.is_empty() => Some((name, value)),
            _ => {
                debug!(
                    property = %format!("{prefix}{name}"),
                    kind = value.kind(),
                    "Skipping property without a string value"
                );
                None
            }
        })
}

/// `Proxy-Authorization` for the proxy credentials, if they produce one
pub fn proxy_authorization_headers(proxy: Option<&ProxyConfiguration>) -> Vec<Header> {
    proxy
        .and_then(ProxyConfiguration::credentials)
        .and_then(Credentials::http_header_value)
        .map(|value| Header::new(PROXY_AUTHORIZATION, value))
        .into_iter()
        .collect()
}
