//! HTTP view of a destination
//!
//! Everything that can be derived from the base properties is derived once
//! in [`HttpDestinationBuilder::build`] and cached. Only the header
//! providers run per request, in [`HttpDestination::headers`].

use super::derivation::{self, DerivedProperties};
use super::{Destination, DestinationProperties};
use crate::domain::context::RequestContext;
use crate::domain::credentials::{BasicCredentials, ProxyConfiguration};
use crate::domain::header::{contains_header, Header, AUTHORIZATION, PROXY_AUTHORIZATION};
use crate::domain::keys;
use crate::domain::keystore::KeyStore;
use crate::domain::property::{Properties, PropertyKey, PropertyValue};
use crate::domain::types::{AuthenticationType, ProxyType};
use crate::error::{ConfigurationError, DestinationResult, PropertyError};
use crate::headers::pipeline::provider_type;
use crate::headers::{
    refine, resolve_headers, DestinationHeaderProvider, DestinationRequestContext,
    HeaderProviderRegistry,
};
use crate::service_binding::OnPremiseProxyHandler;
use http::Uri;
use std::any::TypeId;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// A destination that is known to address an HTTP endpoint
#[derive(Clone)]
pub struct HttpDestination {
    properties: Properties,
    uri: Uri,
    custom_headers: Vec<Header>,
    custom_header_providers: Vec<Arc<dyn DestinationHeaderProvider>>,
    registered_header_providers: Vec<Arc<dyn DestinationHeaderProvider>>,
    key_store: Option<KeyStore>,
    trust_store: Option<KeyStore>,
    derived: DerivedProperties,
}

impl HttpDestination {
    pub fn builder(uri: impl Into<String>) -> HttpDestinationBuilder {
        HttpDestinationBuilder::new(uri)
    }

    /// Builder seeded with every property of a generic destination
    pub fn from_destination(destination: &Destination) -> HttpDestinationBuilder {
        HttpDestinationBuilder::from_properties(destination.properties().clone())
    }

    /// Builder carrying everything this destination was built from
    ///
    /// The on-premise handler is not carried over.
    pub fn to_builder(&self) -> HttpDestinationBuilder {
        HttpDestinationBuilder {
            properties: self.properties.clone(),
            headers: self.custom_headers.clone(),
            header_providers: self.custom_header_providers.clone(),
            registered_header_providers: self.registered_header_providers.clone(),
            key_store: self.key_store.clone(),
            trust_store: self.trust_store.clone(),
            on_premise_handler: None,
        }
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn name(&self) -> Option<&str> {
        self.properties
            .get_raw(keys::NAME.name())
            .and_then(PropertyValue::as_str)
    }

    pub fn authentication_type(&self) -> AuthenticationType {
        self.derived.authentication_type
    }

    pub fn proxy_configuration(&self) -> Option<&ProxyConfiguration> {
        self.derived.proxy_configuration.as_ref()
    }

    pub fn proxy_type(&self) -> ProxyType {
        self.derived.proxy_type
    }

    pub fn basic_credentials(&self) -> Option<&BasicCredentials> {
        self.derived.basic_credentials.as_ref()
    }

    pub fn is_trusting_all_certificates(&self) -> Result<bool, PropertyError> {
        Ok(self.properties.get(&keys::TRUST_ALL)?.unwrap_or(false))
    }

    pub fn tls_version(&self) -> Result<Option<String>, PropertyError> {
        self.properties.get(&keys::TLS_VERSION)
    }

    pub fn key_store(&self) -> Option<&KeyStore> {
        self.key_store.as_ref()
    }

    pub fn key_store_password(&self) -> Result<Option<String>, PropertyError> {
        self.properties.get(&keys::KEY_STORE_PASSWORD)
    }

    pub fn trust_store(&self) -> Option<&KeyStore> {
        self.trust_store.as_ref()
    }

    pub fn trust_store_password(&self) -> Result<Option<String>, PropertyError> {
        self.properties.get(&keys::TRUST_STORE_PASSWORD)
    }

    /// Query parameters from `URL.queries.*` properties
    pub fn query_parameters(&self) -> Vec<(String, String)> {
        derivation::query_parameters_from_properties(&self.properties)
    }

    /// Providers attached at build time followed by registered ones
    pub fn header_providers(&self) -> impl Iterator<Item = &Arc<dyn DestinationHeaderProvider>> {
        self.custom_header_providers
            .iter()
            .chain(self.registered_header_providers.iter())
    }

    /// Headers to send with a request to `request_uri`
    ///
    /// Composition order:
    /// 1. custom headers given to the builder
    /// 2. headers from the refined header providers
    /// 3. `URL.headers.*` properties whose name is not yet present
    /// 4. an `Authorization` header from the authentication type, unless present
    /// 5. the proxy authorization headers, unless `Proxy-Authorization` is present
    pub fn headers(&self, request_uri: &Uri, request: &RequestContext) -> DestinationResult<Vec<Header>> {
        let mut headers = self.custom_headers.clone();

        let providers = refine(self.header_providers().cloned());
        let context = DestinationRequestContext::new(self, request_uri, request);
        headers.extend(resolve_headers(&providers, &context)?);

        for header in &self.derived.property_headers {
            if !contains_header(&headers, header.name()) {
                headers.push(header.clone());
            }
        }

        if !contains_header(&headers, AUTHORIZATION) {
            headers.extend(self.authorization_headers(request));
        }

        if !contains_header(&headers, PROXY_AUTHORIZATION) {
            headers.extend(self.derived.proxy_authorization_headers.iter().cloned());
        }

        Ok(headers)
    }

    fn authorization_headers(&self, request: &RequestContext) -> Vec<Header> {
        match self.derived.authentication_type {
            AuthenticationType::BasicAuthentication => match self.basic_credentials() {
                Some(credentials) => vec![Header::new(AUTHORIZATION, credentials.http_header_value())],
                None => {
                    warn!(
                        destination = self.name().unwrap_or_default(),
                        "Basic authentication without username and password"
                    );
                    Vec::new()
                }
            },
            AuthenticationType::TokenForwarding => {
                let values = request.inbound_header_values(AUTHORIZATION);
                if values.is_empty() {
                    warn!(
                        destination = self.name().unwrap_or_default(),
                        "Token forwarding is enabled but the current request has no Authorization header"
                    );
                }
                values
                    .into_iter()
                    .map(|value| Header::new(AUTHORIZATION, value))
                    .collect()
            }
            _ => Vec::new(),
        }
    }
}

impl DestinationProperties for HttpDestination {
    fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Providers and the header values they produce are not compared
impl PartialEq for HttpDestination {
    fn eq(&self, other: &Self) -> bool {
        self.properties == other.properties
            && self.custom_headers == other.custom_headers
            && self.key_store == other.key_store
            && self.trust_store == other.trust_store
    }
}

impl fmt::Debug for HttpDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpDestination")
            .field("uri", &self.uri.to_string())
            .field("properties", &self.properties)
            .field(
                "custom_headers",
                &self.custom_headers.iter().map(Header::name).collect::<Vec<_>>(),
            )
            .field(
                "header_providers",
                &self.header_providers().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("key_store", &self.key_store)
            .field("trust_store", &self.trust_store)
            .finish()
    }
}

/// Accumulates configuration for an [`HttpDestination`]
#[derive(Clone)]
pub struct HttpDestinationBuilder {
    pub(crate) properties: Properties,
    headers: Vec<Header>,
    header_providers: Vec<Arc<dyn DestinationHeaderProvider>>,
    registered_header_providers: Vec<Arc<dyn DestinationHeaderProvider>>,
    key_store: Option<KeyStore>,
    trust_store: Option<KeyStore>,
    on_premise_handler: Option<Arc<OnPremiseProxyHandler>>,
}

impl HttpDestinationBuilder {
    pub fn new(uri: impl Into<String>) -> Self {
        let mut properties = Properties::new();
        properties.insert(keys::URI.name(), uri.into());
        Self::from_properties(properties)
    }

    fn from_properties(properties: Properties) -> Self {
        Self {
            properties,
            headers: Vec::new(),
            header_providers: Vec::new(),
            registered_header_providers: Vec::new(),
            key_store: None,
            trust_store: None,
            on_premise_handler: None,
        }
    }

    pub fn uri(self, uri: impl Into<String>) -> Self {
        self.property_raw(keys::URI.name(), uri.into())
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.property(&keys::NAME, name.into())
    }

    pub fn basic_credentials(self, credentials: BasicCredentials) -> Self {
        self.property(&keys::BASIC_AUTH_USERNAME, credentials.username().to_string())
            .property(&keys::BASIC_AUTH_PASSWORD, credentials.password().to_string())
    }

    pub fn authentication_type(self, authentication_type: AuthenticationType) -> Self {
        self.property(&keys::AUTH_TYPE, authentication_type)
    }

    pub fn proxy(self, uri: Uri) -> Self {
        self.property(&keys::PROXY_URI, uri)
    }

    /// Proxy address plus its credentials, replacing any previous ones
    pub fn proxy_configuration(mut self, proxy: ProxyConfiguration) -> Self {
        match proxy.credentials() {
            Some(credentials) => self
                .properties
                .insert(keys::PROXY_AUTH, PropertyValue::typed(credentials.clone())),
            None => {
                self.properties.remove(keys::PROXY_AUTH);
            }
        }
        self.proxy(proxy.uri().clone())
    }

    pub fn proxy_type(self, proxy_type: ProxyType) -> Self {
        self.property(&keys::PROXY_TYPE, proxy_type)
    }

    pub fn trust_all_certificates(self) -> Self {
        self.property(&keys::TRUST_ALL, true)
    }

    pub fn tls_version(self, version: impl Into<String>) -> Self {
        self.property(&keys::TLS_VERSION, version.into())
    }

    pub fn key_store(mut self, key_store: KeyStore) -> Self {
        self.key_store = Some(key_store);
        self
    }

    pub fn key_store_password(self, password: impl Into<String>) -> Self {
        self.property(&keys::KEY_STORE_PASSWORD, password.into())
    }

    pub fn trust_store(mut self, trust_store: KeyStore) -> Self {
        self.trust_store = Some(trust_store);
        self
    }

    pub fn trust_store_password(self, password: impl Into<String>) -> Self {
        self.property(&keys::TRUST_STORE_PASSWORD, password.into())
    }

    pub fn header(mut self, header: Header) -> Self {
        self.headers.push(header);
        self
    }

    pub fn headers(mut self, headers: impl IntoIterator<Item = Header>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn header_provider(mut self, provider: Arc<dyn DestinationHeaderProvider>) -> Self {
        self.header_providers.push(provider);
        self
    }

    pub fn header_providers(
        mut self,
        providers: impl IntoIterator<Item = Arc<dyn DestinationHeaderProvider>>,
    ) -> Self {
        self.header_providers.extend(providers);
        self
    }

    /// Attach the process-wide providers; they run after the custom ones
    pub fn header_provider_registry(mut self, registry: &HeaderProviderRegistry) -> Self {
        self.registered_header_providers = registry.providers().to_vec();
        self
    }

    /// Handler consulted by [`build`](Self::build) for on-premise destinations
    pub fn on_premise_proxy_handler(mut self, handler: Arc<OnPremiseProxyHandler>) -> Self {
        self.on_premise_handler = Some(handler);
        self
    }

    pub fn property<T: Into<PropertyValue>>(mut self, key: &PropertyKey<T>, value: T) -> Self {
        self.properties.insert(key.name(), value);
        self
    }

    pub fn property_raw(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name, value);
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

    /// Whether a custom provider of type `P` is already attached
    pub fn has_header_provider<P: DestinationHeaderProvider>(&self) -> bool {
        let wanted = TypeId::of::<P>();
        self.header_providers
            .iter()
            .any(|provider| provider_type(provider) == wanted)
    }

    /// Derive everything once; on-premise destinations go through the
    /// configured handler
    ///
    /// A handler failure is logged and the destination is built without the
    /// connectivity proxy.
    pub fn build(self) -> DestinationResult<HttpDestination> {
        if derivation::proxy_type(&self.properties)? == ProxyType::OnPremise {
            match self.on_premise_handler.clone() {
                Some(handler) if handler.applies_to(&self) => {
                    let fallback = self.clone();
                    match handler.handle(self) {
                        Ok(destination) => return Ok(destination),
                        Err(err) => {
                            warn!(
                                error = %err,
                                "On-premise proxy handling failed, using the destination without a connectivity proxy"
                            );
                            return fallback.build_direct();
                        }
                    }
                }
                Some(_) => debug!("On-premise proxy handling already applied"),
                None => debug!("No on-premise proxy handler configured"),
            }
        }
        self.build_direct()
    }

    /// Build without consulting the on-premise handler
    pub(crate) fn build_direct(self) -> DestinationResult<HttpDestination> {
        let uri = match self.properties.get(&keys::URI) {
            Ok(Some(uri)) => uri,
            Ok(None) => return Err(ConfigurationError::MissingUri.into()),
            Err(PropertyError::Unparsable { value, .. }) => {
                return Err(ConfigurationError::InvalidUri {
                    reason: format!("'{value}' is not a valid URI"),
                    value,
                }
                .into())
            }
            Err(err) => return Err(err.into()),
        };

        let derived = DerivedProperties::derive(&self.properties)?;

        Ok(HttpDestination {
            properties: self.properties,
            uri,
            custom_headers: self.headers,
            custom_header_providers: self.header_providers,
            registered_header_providers: self.registered_header_providers,
            key_store: self.key_store,
            trust_store: self.trust_store,
            derived,
        })
    }
}

impl fmt::Debug for HttpDestinationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpDestinationBuilder")
            .field("properties", &self.properties)
            .field("header_providers", &self.header_providers.len())
            .field("on_premise_handler", &self.on_premise_handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::context::StaticToken;
    use crate::domain::credentials::{BearerCredentials, Credentials};
    use crate::domain::header::LOCATION_ID;
    use crate::domain::keystore::Certificate;
    use crate::error::{BoxError, DestinationError};
    use crate::headers::{Cardinality, LocationIdHeaderProvider};
    use http::HeaderMap;

    fn request_uri() -> Uri {
        Uri::from_static("/sap/opu/odata")
    }

    struct Fixed(&'static str, &'static str);

    impl DestinationHeaderProvider for Fixed {
        fn headers(&self, _: &DestinationRequestContext<'_>) -> Result<Vec<Header>, BoxError> {
            Ok(vec![Header::new(self.0, self.1)])
        }
    }

    struct Single(&'static str);

    impl DestinationHeaderProvider for Single {
        fn headers(&self, _: &DestinationRequestContext<'_>) -> Result<Vec<Header>, BoxError> {
            Ok(vec![Header::new("X-Single", self.0)])
        }

        fn cardinality(&self) -> Cardinality {
            Cardinality::AtMost(1)
        }
    }

    #[test]
    fn test_build_requires_valid_uri() {
        let err = HttpDestination::builder("http://exa mple.com").build().unwrap_err();
        assert!(err.to_string().contains("is invalid"));

        let err = HttpDestination::builder("https://example.com")
            .remove(&keys::URI)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            DestinationError::Configuration(ConfigurationError::MissingUri)
        ));
    }

    #[test]
    fn test_basic_authentication_header() {
        let destination = HttpDestination::builder("https://example.com")
            .basic_credentials(BasicCredentials::new("user", "pass"))
            .build()
            .unwrap();

        assert_eq!(
            destination.authentication_type(),
            AuthenticationType::BasicAuthentication
        );
        let headers = destination
            .headers(&request_uri(), &RequestContext::empty())
            .unwrap();
        assert_eq!(
            headers,
            vec![Header::new(AUTHORIZATION, "Basic dXNlcjpwYXNz")]
        );
    }

    #[test]
    fn test_custom_authorization_header_wins() {
        let destination = HttpDestination::builder("https://example.com")
            .basic_credentials(BasicCredentials::new("user", "pass"))
            .header(Header::new("authorization", "Bearer custom"))
            .build()
            .unwrap();

        let headers = destination
            .headers(&request_uri(), &RequestContext::empty())
            .unwrap();
        assert_eq!(headers, vec![Header::new(AUTHORIZATION, "Bearer custom")]);
    }

    #[test]
    fn test_token_forwarding_copies_inbound_authorization() {
        let destination = HttpDestination::builder("https://example.com")
            .property_raw("forwardAuthToken", "true")
            .build()
            .unwrap();

        let mut inbound = HeaderMap::new();
        inbound.insert("authorization", "Bearer user-jwt".parse().unwrap());
        let request = RequestContext::empty().with_inbound_headers(Arc::new(inbound));

        let headers = destination.headers(&request_uri(), &request).unwrap();
        assert_eq!(headers, vec![Header::new(AUTHORIZATION, "Bearer user-jwt")]);

        let without_inbound = destination
            .headers(&request_uri(), &RequestContext::empty())
            .unwrap();
        assert!(without_inbound.is_empty());
    }

    #[test]
    fn test_header_composition_order() {
        let destination = HttpDestination::builder("https://example.com")
            .header(Header::new("X-Custom", "1"))
            .header_provider(Arc::new(Fixed("X-Provided", "2")))
            .property_raw("URL.headers.X-Property", "3")
            .property_raw("URL.headers.X-Custom", "ignored")
            .proxy_configuration(ProxyConfiguration::with_credentials(
                Uri::from_static("http://proxy:8080"),
                Credentials::Bearer(BearerCredentials::new("proxy-token")),
            ))
            .basic_credentials(BasicCredentials::new("u", "p"))
            .build()
            .unwrap();

        let headers = destination
            .headers(&request_uri(), &RequestContext::empty())
            .unwrap();
        let names: Vec<&str> = headers.iter().map(Header::name).collect();
        assert_eq!(
            names,
            vec!["X-Custom", "X-Provided", "X-Property", AUTHORIZATION, PROXY_AUTHORIZATION]
        );
        assert_eq!(headers[0].value(), "1");
        assert_eq!(headers[4].value(), "Bearer proxy-token");
    }

    #[test]
    fn test_provider_proxy_authorization_suppresses_derived_one() {
        let destination = HttpDestination::builder("https://example.com")
            .property_raw("Proxy", "http://proxy:8080")
            .property_raw("ProxyAuth", "Bearer derived")
            .header_provider(Arc::new(Fixed(PROXY_AUTHORIZATION, "Bearer provided")))
            .build()
            .unwrap();

        let headers = destination
            .headers(&request_uri(), &RequestContext::empty())
            .unwrap();
        assert_eq!(
            headers,
            vec![Header::new(PROXY_AUTHORIZATION, "Bearer provided")]
        );
    }

    #[test]
    fn test_custom_proxy_authorization_header_wins() {
        let destination = HttpDestination::builder("https://example.com")
            .property_raw("Proxy", "http://proxy:8080")
            .property_raw("ProxyAuth", "Basic dXNlcjpwYXNz")
            .header(Header::new("proxy-authorization", "Bearer custom"))
            .build()
            .unwrap();

        let headers = destination
            .headers(&request_uri(), &RequestContext::empty())
            .unwrap();
        let proxy_authorization: Vec<&Header> = headers
            .iter()
            .filter(|h| h.has_name(PROXY_AUTHORIZATION))
            .collect();
        assert_eq!(proxy_authorization.len(), 1);
        assert_eq!(proxy_authorization[0].value(), "Bearer custom");
    }

    #[test]
    fn test_registered_providers_run_after_custom_ones_and_are_refined() {
        let mut registry = HeaderProviderRegistry::new();
        registry.register(Arc::new(Single("registered")));

        let destination = HttpDestination::builder("https://example.com")
            .header_provider(Arc::new(Single("custom")))
            .header_provider_registry(&registry)
            .build()
            .unwrap();

        let headers = destination
            .headers(&request_uri(), &RequestContext::empty())
            .unwrap();
        assert_eq!(headers, vec![Header::new("X-Single", "registered")]);
    }

    #[test]
    fn test_provider_sees_destination_properties() {
        let destination = HttpDestination::builder("https://onprem.local")
            .property_raw("CloudConnectorLocationId", "loc")
            .header_provider(Arc::new(LocationIdHeaderProvider))
            .build()
            .unwrap();

        let headers = destination
            .headers(&request_uri(), &RequestContext::empty())
            .unwrap();
        assert_eq!(headers, vec![Header::new(LOCATION_ID, "loc")]);
    }

    #[test]
    fn test_has_header_provider_checks_concrete_type() {
        let builder = HttpDestination::builder("https://example.com")
            .header_provider(Arc::new(LocationIdHeaderProvider));
        assert!(builder.has_header_provider::<LocationIdHeaderProvider>());
        assert!(!builder.has_header_provider::<Single>());
    }

    #[test]
    fn test_equality_ignores_providers_but_not_key_stores() {
        let base = HttpDestination::builder("https://example.com").name("d");
        let plain = base.clone().build().unwrap();
        let with_provider = base
            .clone()
            .header_provider(Arc::new(Fixed("X", "y")))
            .build()
            .unwrap();
        let with_store = base
            .key_store(KeyStore::new([Certificate::from_der(vec![1, 2, 3])]))
            .build()
            .unwrap();

        assert_eq!(plain, with_provider);
        assert_ne!(plain, with_store);
    }

    #[test]
    fn test_on_premise_without_handler_builds_directly() {
        let destination = HttpDestination::builder("http://virtual-host:44300")
            .proxy_type(ProxyType::OnPremise)
            .build()
            .unwrap();
        assert_eq!(destination.proxy_type(), ProxyType::OnPremise);
        assert_eq!(destination.header_providers().count(), 0);
    }

    #[test]
    fn test_accessors_and_to_builder() {
        let destination = HttpDestination::builder("https://example.com")
            .name("backend")
            .trust_all_certificates()
            .tls_version("TLSv1.2")
            .key_store_password("secret")
            .property_raw("URL.queries.sap-client", "100")
            .build()
            .unwrap();

        assert_eq!(destination.name(), Some("backend"));
        assert!(destination.is_trusting_all_certificates().unwrap());
        assert_eq!(destination.tls_version().unwrap(), Some("TLSv1.2".to_string()));
        assert_eq!(destination.key_store_password().unwrap(), Some("secret".to_string()));
        assert_eq!(
            destination.query_parameters(),
            vec![("sap-client".to_string(), "100".to_string())]
        );

        let rebuilt = destination.to_builder().build().unwrap();
        assert_eq!(rebuilt, destination);
    }

    #[test]
    fn test_principal_token_is_not_required_without_providers() {
        let destination = HttpDestination::builder("https://example.com").build().unwrap();
        let request = RequestContext::empty().with_token_source(Arc::new(StaticToken::new("t")));
        assert!(destination.headers(&request_uri(), &request).unwrap().is_empty());
    }
}
