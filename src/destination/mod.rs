//! Destinations: immutable property bags and their typed views
//!
//! A [`Destination`] is what loaders produce. It can be viewed as an
//! [`HttpDestination`] when it carries a URL, or as an [`RfcDestination`]
//! when it carries a name.

pub mod derivation;
pub mod http;
pub mod rfc;

use crate::domain::keys;
use crate::domain::property::{Properties, PropertyKey, PropertyValue};
use crate::error::{DestinationResult, PropertyError};

pub use self::http::{HttpDestination, HttpDestinationBuilder};
pub use derivation::DerivedProperties;
pub use rfc::RfcDestination;

/// Read access shared by every destination view
pub trait DestinationProperties {
    fn properties(&self) -> &Properties;

    fn get<T>(&self, key: &PropertyKey<T>) -> Result<Option<T>, PropertyError> {
        self.properties().get(key)
    }

    fn get_raw(&self, name: &str) -> Option<&PropertyValue> {
        self.properties().get_raw(name)
    }

    fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties().property_names()
    }
}

/// Read-only, loosely-typed description of a remote endpoint
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Destination {
    properties: Properties,
}

impl Destination {
    pub fn builder() -> DestinationBuilder {
        DestinationBuilder::default()
    }

    pub fn from_properties(properties: Properties) -> Self {
        Self { properties }
    }

    /// Builder pre-filled with a copy of these properties
    pub fn to_builder(&self) -> DestinationBuilder {
        DestinationBuilder {
            properties: self.properties.clone(),
        }
    }

    pub fn name(&self) -> Result<Option<String>, PropertyError> {
        self.properties.get(&keys::NAME)
    }

    /// Whether this destination carries a URL
    pub fn is_http(&self) -> bool {
        self.properties.contains(keys::URI.name())
    }

    pub fn as_http(&self) -> DestinationResult<HttpDestination> {
        HttpDestination::from_destination(self).build()
    }

    pub fn as_rfc(&self) -> DestinationResult<RfcDestination> {
        RfcDestination::from_destination(self)
    }
}

impl DestinationProperties for Destination {
    fn properties(&self) -> &Properties {
        &self.properties
    }
}

impl From<Properties> for Destination {
    fn from(properties: Properties) -> Self {
        Self::from_properties(properties)
    }
}

/// Accumulates properties for a new [`Destination`]
#[derive(Clone, Debug, Default)]
pub struct DestinationBuilder {
    properties: Properties,
}

impl DestinationBuilder {
    pub fn name(self, name: impl Into<String>) -> Self {
        self.property(&keys::NAME, name.into())
    }

    pub fn property<T: Into<PropertyValue>>(mut self, key: &PropertyKey<T>, value: T) -> Self {
        self.properties.insert(key.name(), value);
        self
    }

    pub fn property_raw(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name, value);
        self
    }

    pub fn properties(mut self, properties: &Properties) -> Self {
        self.properties.extend_from(properties);
        self
    }

    pub fn remove<T>(mut self, key: &PropertyKey<T>) -> Self {
        self.properties.remove(key.name());
        self
    }

    pub fn remove_raw(mut self, name: &str) -> Self {
        self.properties.remove(name);
        self
    }

    pub fn build(self) -> Destination {
        Destination {
            properties: self.properties,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::AuthenticationType;

    #[test]
    fn test_builder_sets_and_removes_properties() {
        let destination = Destination::builder()
            .name("backend")
            .property_raw("URL", "https://example.com")
            .property_raw("Temporary", "x")
            .remove_raw("temporary")
            .build();

        assert_eq!(destination.name().unwrap(), Some("backend".to_string()));
        assert!(destination.get_raw("Temporary").is_none());
        assert_eq!(destination.property_names().count(), 2);
    }

    #[test]
    fn test_typed_property_setter() {
        let destination = Destination::builder()
            .property(&keys::AUTH_TYPE, AuthenticationType::TokenForwarding)
            .build();
        assert_eq!(
            destination.get(&keys::AUTH_TYPE).unwrap(),
            Some(AuthenticationType::TokenForwarding)
        );

        let removed = destination.to_builder().remove(&keys::AUTH_TYPE).build();
        assert_eq!(removed.get(&keys::AUTH_TYPE).unwrap(), None);
    }

    #[test]
    fn test_to_builder_does_not_mutate_original() {
        let original = Destination::builder().name("a").build();
        let copy = original.to_builder().name("b").build();

        assert_eq!(original.name().unwrap(), Some("a".to_string()));
        assert_eq!(copy.name().unwrap(), Some("b".to_string()));
    }

    #[test]
    fn test_as_http_requires_url() {
        let without_url = Destination::builder().name("d").build();
        assert!(!without_url.is_http());
        assert!(without_url.as_http().is_err());

        let with_url = without_url
            .to_builder()
            .property_raw("url", "https://example.com/api")
            .build();
        assert!(with_url.is_http());
        assert_eq!(
            with_url.as_http().unwrap().uri().to_string(),
            "https://example.com/api"
        );
    }

    #[test]
    fn test_as_rfc_requires_name() {
        assert!(Destination::default().as_rfc().is_err());
        let rfc = Destination::builder().name("erp").build().as_rfc().unwrap();
        assert_eq!(rfc.name(), "erp");
    }
}
