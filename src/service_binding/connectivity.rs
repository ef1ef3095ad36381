//! Routing destinations through the connectivity proxy

use super::error::ServiceBindingError;
use super::loader::{ServiceBindingDestinationLoader, ServiceBindingDestinationOptions};
use super::ServiceBinding;
use crate::destination::HttpDestination;
use crate::domain::credentials::{BearerCredentials, Credentials, ProxyConfiguration};
use crate::domain::identifiers::ServiceIdentifier;
use crate::domain::property::MASKED_VALUE;
use crate::domain::types::OnBehalfOf;
use crate::error::BoxError;
use http::Uri;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

const PROXY_HOST_CREDENTIAL: &str = "onpremise_proxy_host";
const PROXY_PORT_CREDENTIAL: &str = "onpremise_proxy_http_port";

/// Issues tokens that authorize calls through the connectivity proxy
pub trait ProxyTokenSource: Send + Sync {
    fn proxy_token(&self, binding: &ServiceBinding, on_behalf_of: OnBehalfOf) -> Result<String, BoxError>;
}

/// The same preconfigured token for every binding and caller
#[derive(Clone)]
pub struct StaticProxyToken(String);

impl StaticProxyToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl ProxyTokenSource for StaticProxyToken {
    fn proxy_token(&self, _binding: &ServiceBinding, _on_behalf_of: OnBehalfOf) -> Result<String, BoxError> {
        Ok(self.0.clone())
    }
}

impl fmt::Debug for StaticProxyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StaticProxyToken").field(&MASKED_VALUE).finish()
    }
}

/// Turns a connectivity binding and a destination to be proxied into a
/// destination that reaches its target through the binding's proxy
#[derive(Clone)]
pub struct ConnectivityProxyDestinationLoader {
    tokens: Arc<dyn ProxyTokenSource>,
}

impl ConnectivityProxyDestinationLoader {
    pub fn new(tokens: Arc<dyn ProxyTokenSource>) -> Self {
        Self { tokens }
    }
}

impl fmt::Debug for ConnectivityProxyDestinationLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectivityProxyDestinationLoader")
            .finish_non_exhaustive()
    }
}

impl ServiceBindingDestinationLoader for ConnectivityProxyDestinationLoader {
    fn get_destination(
        &self,
        options: &ServiceBindingDestinationOptions,
    ) -> Result<HttpDestination, ServiceBindingError> {
        let binding = options.service_binding();
        if !binding.is_bound_to(&ServiceIdentifier::connectivity()) {
            return Err(ServiceBindingError::not_found(format!(
                "binding {:?} is not a connectivity binding",
                binding.name().unwrap_or_default()
            )));
        }
        let Some(target) = options.proxied_destination() else {
            return Err(ServiceBindingError::not_found(
                "no destination to route through the connectivity proxy",
            ));
        };

        let proxy_uri = proxy_uri(binding)?;
        let token = self
            .tokens
            .proxy_token(binding, options.on_behalf_of())
            .map_err(|e| {
                ServiceBindingError::access_with_source("Failed to obtain a connectivity proxy token", e)
            })?;

        debug!(
            proxy = %proxy_uri,
            on_behalf_of = %options.on_behalf_of(),
            "Routing destination through the connectivity proxy"
        );

        target
            .to_builder()
            .proxy_configuration(ProxyConfiguration::with_credentials(
                proxy_uri,
                Credentials::Bearer(BearerCredentials::new(token)),
            ))
            .build()
            .map_err(|e| ServiceBindingError::access_with_source("Failed to build the proxied destination", e))
    }
}

fn proxy_uri(binding: &ServiceBinding) -> Result<Uri, ServiceBindingError> {
    let credentials = binding.credentials();

    let host = credentials
        .get(PROXY_HOST_CREDENTIAL)
        .and_then(Value::as_str)
        .ok_or_else(|| ServiceBindingError::access(format!("credential '{PROXY_HOST_CREDENTIAL}' is missing")))?;

    let port = match credentials.get(PROXY_PORT_CREDENTIAL) {
        Some(Value::Number(n)) => n.as_u64().and_then(|p| u16::try_from(p).ok()),
        Some(Value::String(s)) => s.trim().parse::<u16>().ok(),
        _ => None,
    }
    .ok_or_else(|| {
        ServiceBindingError::access(format!("credential '{PROXY_PORT_CREDENTIAL}' is missing or not a port"))
    })?;

    format!("http://{host}:{port}")
        .parse::<Uri>()
        .map_err(|e| ServiceBindingError::access_with_source("Connectivity proxy address is invalid", e))
}
