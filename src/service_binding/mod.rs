//! Destinations backed by bound services
//!
//! A service binding is the credentials block a platform injects for a
//! bound service instance. Service-binding loaders turn a binding into an
//! [`HttpDestination`](crate::destination::HttpDestination); the
//! on-premise proxy handler uses them to route on-premise destinations
//! through the connectivity service.

pub mod connectivity;
pub mod error;
pub mod loader;
pub mod on_premise;

use crate::domain::identifiers::ServiceIdentifier;
use crate::error::BoxError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use connectivity::{ConnectivityProxyDestinationLoader, ProxyTokenSource, StaticProxyToken};
pub use error::ServiceBindingError;
pub use loader::{
    ServiceBindingDestinationLoader, ServiceBindingDestinationLoaderChain,
    ServiceBindingDestinationOptions,
};
pub use on_premise::{on_behalf_of, OnBehalfOfDecision, OnPremiseProxyHandler};

/// Credentials and metadata of one bound service instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceBinding {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "label")]
    service_identifier: Option<ServiceIdentifier>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    credentials: Map<String, Value>,
}

impl ServiceBinding {
    pub fn new(service_identifier: ServiceIdentifier) -> Self {
        Self {
            name: None,
            service_identifier: Some(service_identifier),
            tags: Vec::new(),
            credentials: Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_credential(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.credentials.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn service_identifier(&self) -> Option<&ServiceIdentifier> {
        self.service_identifier.as_ref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn credentials(&self) -> &Map<String, Value> {
        &self.credentials
    }

    pub fn is_bound_to(&self, service: &ServiceIdentifier) -> bool {
        self.service_identifier.as_ref() == Some(service)
    }
}

/// Source of the service bindings visible to this process
pub trait ServiceBindingAccessor: Send + Sync {
    fn service_bindings(&self) -> Result<Vec<ServiceBinding>, BoxError>;
}

/// Fixed list of bindings, e.g. parsed from configuration
#[derive(Clone, Debug, Default)]
pub struct StaticServiceBindingAccessor {
    bindings: Vec<ServiceBinding>,
}

impl StaticServiceBindingAccessor {
    pub fn new(bindings: impl IntoIterator<Item = ServiceBinding>) -> Self {
        Self {
            bindings: bindings.into_iter().collect(),
        }
    }
}

impl ServiceBindingAccessor for StaticServiceBindingAccessor {
    fn service_bindings(&self) -> Result<Vec<ServiceBinding>, BoxError> {
        Ok(self.bindings.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_binding_deserializes_from_platform_json() {
        let binding: ServiceBinding = serde_json::from_value(json!({
            "name": "my-connectivity",
            "label": "Connectivity",
            "tags": ["connectivity"],
            "credentials": {
                "onpremise_proxy_host": "proxy.internal",
                "onpremise_proxy_http_port": "20003"
            }
        }))
        .unwrap();

        assert_eq!(binding.name(), Some("my-connectivity"));
        assert!(binding.is_bound_to(&ServiceIdentifier::connectivity()));
        assert_eq!(binding.tags(), ["connectivity".to_string()]);
        assert_eq!(binding.credentials()["onpremise_proxy_host"], "proxy.internal");
    }

    #[test]
    fn test_static_accessor_returns_bindings() {
        let accessor = StaticServiceBindingAccessor::new([
            ServiceBinding::new(ServiceIdentifier::connectivity()).with_name("a"),
        ]);
        let bindings = accessor.service_bindings().unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].name(), Some("a"));
    }
}
