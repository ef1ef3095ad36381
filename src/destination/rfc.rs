//! RFC view of a destination

use super::{Destination, DestinationProperties};
use crate::domain::identifiers::DestinationName;
use crate::domain::keys;
use crate::domain::property::Properties;
use crate::domain::types::DestinationType;
use crate::error::{ConfigurationError, DestinationResult, PropertyError};

/// A destination used for remote function calls; identified by name only
#[derive(Clone, Debug, PartialEq)]
pub struct RfcDestination {
    name: DestinationName,
    properties: Properties,
}

impl RfcDestination {
    pub fn from_destination(destination: &Destination) -> DestinationResult<Self> {
        let name = destination
            .name()?
            .ok_or(ConfigurationError::MissingName)?;
        let name = DestinationName::try_new(name.clone())
            .map_err(|_| ConfigurationError::InvalidName(name))?;

        Ok(Self {
            name,
            properties: destination.properties().clone(),
        })
    }

    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    pub fn destination_type(&self) -> Result<Option<DestinationType>, PropertyError> {
        self.properties.get(&keys::TYPE)
    }
}

impl DestinationProperties for RfcDestination {
    fn properties(&self) -> &Properties {
        &self.properties
    }
}
