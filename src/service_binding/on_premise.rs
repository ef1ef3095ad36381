//! Handling of destinations whose proxy type is `OnPremise`
//!
//! Such destinations are reached through the connectivity service. The
//! handler attaches the on-premise header providers, works out on whose
//! behalf the call is made and lets the service-binding loaders produce
//! the destination that actually routes through the proxy.

use super::loader::{ServiceBindingDestinationLoader, ServiceBindingDestinationOptions};
use super::{ServiceBinding, ServiceBindingAccessor};
use crate::destination::derivation;
use crate::destination::{HttpDestination, HttpDestinationBuilder};
use crate::domain::identifiers::ServiceIdentifier;
use crate::domain::keys;
use crate::domain::types::{AuthenticationType, Identifiable, OnBehalfOf, PrincipalPropagationMode, ProxyType};
use crate::error::{ConfigurationError, DestinationError, DestinationResult};
use crate::headers::{LocationIdHeaderProvider, PrincipalPropagationHeaderProvider};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Outcome of the on-behalf-of derivation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OnBehalfOfDecision {
    pub on_behalf_of: OnBehalfOf,
    /// The current user token must be forwarded to the connectivity proxy
    pub forward_principal: bool,
}

impl OnBehalfOfDecision {
    fn new(on_behalf_of: OnBehalfOf) -> Self {
        Self {
            on_behalf_of,
            forward_principal: false,
        }
    }
}

/// Decide on whose behalf an on-premise call is made
///
/// Principal propagation defaults to token forwarding. For every other
/// authentication type an explicitly empty tenant id selects the provider
/// tenant.
pub fn on_behalf_of(
    authentication_type: AuthenticationType,
    tenant_id: Option<&str>,
    propagation_mode: Option<PrincipalPropagationMode>,
) -> Result<OnBehalfOfDecision, ConfigurationError> {
    if authentication_type == AuthenticationType::PrincipalPropagation {
        return match propagation_mode.unwrap_or(PrincipalPropagationMode::TokenForwarding) {
            PrincipalPropagationMode::TokenExchange => {
                Ok(OnBehalfOfDecision::new(OnBehalfOf::NamedUserCurrentTenant))
            }
            PrincipalPropagationMode::TokenForwarding => Ok(OnBehalfOfDecision {
                on_behalf_of: OnBehalfOf::TechnicalUserCurrentTenant,
                forward_principal: true,
            }),
            unknown @ PrincipalPropagationMode::Unknown => Err(
                ConfigurationError::UnsupportedPrincipalPropagationMode(unknown.identifier().to_string()),
            ),
        };
    }

    Ok(match tenant_id {
        Some("") => OnBehalfOfDecision::new(OnBehalfOf::TechnicalUserProvider),
        _ => OnBehalfOfDecision::new(OnBehalfOf::TechnicalUserCurrentTenant),
    })
}

/// Routes on-premise destinations through the connectivity service
pub struct OnPremiseProxyHandler {
    bindings: Arc<dyn ServiceBindingAccessor>,
    loader: Arc<dyn ServiceBindingDestinationLoader>,
}

impl OnPremiseProxyHandler {
    pub fn new(
        bindings: Arc<dyn ServiceBindingAccessor>,
        loader: Arc<dyn ServiceBindingDestinationLoader>,
    ) -> Self {
        Self { bindings, loader }
    }

    /// On-premise destinations that have not been handled yet
    pub fn applies_to(&self, builder: &HttpDestinationBuilder) -> bool {
        matches!(
            derivation::proxy_type(&builder.properties),
            Ok(ProxyType::OnPremise)
        ) && !builder.has_header_provider::<LocationIdHeaderProvider>()
    }

    #[instrument(skip_all)]
    pub fn handle(&self, builder: HttpDestinationBuilder) -> DestinationResult<HttpDestination> {
        let mut builder = builder.header_provider(Arc::new(LocationIdHeaderProvider));
        let binding = self.connectivity_binding()?;

        let properties = &builder.properties;
        let decision = on_behalf_of(
            derivation::authentication_type(properties)?,
            properties.get(&keys::TENANT_ID)?.as_deref(),
            properties.get(&keys::PRINCIPAL_PROPAGATION_MODE)?,
        )?;
        debug!(
            on_behalf_of = %decision.on_behalf_of,
            forward_principal = decision.forward_principal,
            "Derived on-behalf-of for on-premise destination"
        );

        if decision.forward_principal {
            builder = builder.header_provider(Arc::new(PrincipalPropagationHeaderProvider));
        }

        let options = ServiceBindingDestinationOptions::new(binding, decision.on_behalf_of)
            .with_proxied_destination(builder.build_direct()?);
        Ok(self.loader.get_destination(&options)?)
    }

    fn connectivity_binding(&self) -> DestinationResult<ServiceBinding> {
        let connectivity = ServiceIdentifier::connectivity();
        let mut matching: Vec<ServiceBinding> = self
            .bindings
            .service_bindings()
            .map_err(|e| DestinationError::access_with_source("Failed to read service bindings", e))?
            .into_iter()
            .filter(|binding| binding.is_bound_to(&connectivity))
            .collect();

        if matching.len() != 1 {
            return Err(ConfigurationError::ServiceBindingCount {
                service: connectivity.to_string(),
                found: matching.len(),
            }
            .into());
        }
        Ok(matching.remove(0))
    }
}

impl fmt::Debug for OnPremiseProxyHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnPremiseProxyHandler").finish_non_exhaustive()
    }
}
