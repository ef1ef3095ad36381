//! Header providers attached for on-premise destinations

use super::{Cardinality, DestinationHeaderProvider, DestinationRequestContext};
use crate::destination::DestinationProperties;
use crate::domain::credentials::BEARER_PREFIX;
use crate::domain::header::{Header, CONNECTIVITY_AUTHENTICATION, LOCATION_ID};
use crate::domain::keys;
use crate::error::BoxError;

/// Sends the destination's cloud connector location id, when it has one
#[derive(Clone, Copy, Debug, Default)]
pub struct LocationIdHeaderProvider;

impl DestinationHeaderProvider for LocationIdHeaderProvider {
    fn headers(&self, context: &DestinationRequestContext<'_>) -> Result<Vec<Header>, BoxError> {
        let location_id = context
            .destination()
            .properties()
            .get(&keys::CLOUD_CONNECTOR_LOCATION_ID)?;

        Ok(location_id
            .map(|id| Header::new(LOCATION_ID, id))
            .into_iter()
            .collect())
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::AtMost(1)
    }

    fn name(&self) -> &str {
        "LocationIdHeaderProvider"
    }
}

/// Forwards the current user token to the connectivity proxy
#[derive(Clone, Copy, Debug, Default)]
pub struct PrincipalPropagationHeaderProvider;

impl DestinationHeaderProvider for PrincipalPropagationHeaderProvider {
    fn headers(&self, context: &DestinationRequestContext<'_>) -> Result<Vec<Header>, BoxError> {
        let token = context.request().current_token()?;
        Ok(vec![Header::new(
            CONNECTIVITY_AUTHENTICATION,
            format!("{BEARER_PREFIX}{token}"),
        )])
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::AtMost(1)
    }

    fn name(&self) -> &str {
        "PrincipalPropagationHeaderProvider"
    }
}
