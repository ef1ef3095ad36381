use super::{DestinationLoader, DestinationOptions};
use crate::destination::Destination;
use crate::error::{ConfigurationError, DestinationError, DestinationResult};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Ordered loaders asked one after another
///
/// The chain holds at least one loader. A loader reporting not-found hands
/// over to the next one; any other failure ends the lookup.
#[derive(Clone)]
pub struct DestinationLoaderChain {
    delegates: Vec<Arc<dyn DestinationLoader>>,
}

impl DestinationLoaderChain {
    pub fn new(first: Arc<dyn DestinationLoader>) -> Self {
        Self {
            delegates: vec![first],
        }
    }

    pub fn try_from_loaders(
        loaders: impl IntoIterator<Item = Arc<dyn DestinationLoader>>,
    ) -> Result<Self, ConfigurationError> {
        let delegates: Vec<_> = loaders.into_iter().collect();
        if delegates.is_empty() {
            return Err(ConfigurationError::EmptyLoaderChain);
        }
        Ok(Self { delegates })
    }

    pub fn append(&mut self, loader: Arc<dyn DestinationLoader>) {
        self.delegates.push(loader);
    }

    pub fn prepend(&mut self, loader: Arc<dyn DestinationLoader>) {
        self.delegates.insert(0, loader);
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl DestinationLoaderChain {
    /// Looks the name up and keeps the not-found results of the loaders
    /// that were skipped on the way
    #[instrument(skip(self, options))]
    pub fn resolve(&self, name: &str, options: &DestinationOptions) -> DestinationResult<Resolved> {
        let mut suppressed = Vec::new();

        for (index, delegate) in self.delegates.iter().enumerate() {
            match delegate.try_get_destination(name, options) {
                Ok(destination) => {
                    if !suppressed.is_empty() {
                        debug!(
                            loader = index,
                            skipped = suppressed.len(),
                            "Destination found after earlier loaders reported not found"
                        );
                    }
                    return Ok(Resolved {
                        destination,
                        suppressed,
                    });
                }
                Err(err) if err.is_not_found() => {
                    debug!(loader = index, "Destination not found, trying next loader");
                    suppressed.push(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(DestinationError::NotFound {
            name: name.to_string(),
            suppressed,
        })
    }
}

impl DestinationLoader for DestinationLoaderChain {
    fn try_get_destination(&self, name: &str, options: &DestinationOptions) -> DestinationResult<Destination> {
        self.resolve(name, options).map(Resolved::into_destination)
    }
}

/// A successful chain lookup
#[derive(Debug)]
pub struct Resolved {
    destination: Destination,
    suppressed: Vec<DestinationError>,
}

impl Resolved {
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Not-found results of the loaders asked before the one that answered
    pub fn suppressed(&self) -> &[DestinationError] {
        &self.suppressed
    }

    pub fn into_destination(self) -> Destination {
        self.destination
    }
}

impl fmt::Debug for DestinationLoaderChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationLoaderChain")
            .field("loaders", &self.delegates.len())
            .finish()
    }
}
