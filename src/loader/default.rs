use super::{DestinationLoader, DestinationOptions};
use crate::destination::Destination;
use crate::domain::identifiers::DestinationName;
use crate::error::{ConfigurationError, DestinationError, DestinationResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// In-memory destinations registered by name
#[derive(Debug, Default)]
pub struct DefaultDestinationLoader {
    destinations: RwLock<BTreeMap<DestinationName, Destination>>,
}

impl DefaultDestinationLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the destination's `Name`, replacing an earlier entry
    pub fn register(&self, destination: Destination) -> Result<(), ConfigurationError> {
        let raw = destination.name()?.ok_or(ConfigurationError::MissingName)?;
        let name = DestinationName::try_new(raw.clone()).map_err(|_| ConfigurationError::InvalidName(raw))?;

        info!(destination = %name, "Registering destination");
        self.destinations.write().insert(name, destination);
        Ok(())
    }

    pub fn with_destination(self, destination: Destination) -> Result<Self, ConfigurationError> {
        self.register(destination)?;
        Ok(self)
    }

    pub fn unregister(&self, name: &str) -> Option<Destination> {
        let name = DestinationName::try_new(name.to_string()).ok()?;
        self.destinations.write().remove(&name)
    }

    pub fn len(&self) -> usize {
        self.destinations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.read().is_empty()
    }
}

impl DestinationLoader for DefaultDestinationLoader {
    fn try_get_destination(&self, name: &str, _options: &DestinationOptions) -> DestinationResult<Destination> {
        let found = DestinationName::try_new(name.to_string())
            .ok()
            .and_then(|key| self.destinations.read().get(&key).cloned());

        found.ok_or_else(|| {
            debug!(destination = name, "No destination registered under this name");
            DestinationError::not_found(name)
        })
    }
}
