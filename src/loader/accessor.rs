use super::{DestinationLoader, DestinationLoaderChain, DestinationOptions, Resolved};
use crate::destination::Destination;
use crate::error::DestinationResult;
use std::sync::Arc;
use tracing::instrument;

/// Entry point for resolving destinations by name
///
/// Owns the loader chain in use. Replacing or extending the chain needs
/// `&mut self`, so it cannot happen while a lookup borrows the accessor.
#[derive(Clone, Debug)]
pub struct DestinationAccessor {
    loader: DestinationLoaderChain,
}

impl DestinationAccessor {
    pub fn new(loader: DestinationLoaderChain) -> Self {
        Self { loader }
    }

    pub fn loader(&self) -> &DestinationLoaderChain {
        &self.loader
    }

    pub fn set_loader(&mut self, loader: DestinationLoaderChain) {
        self.loader = loader;
    }

    /// Consulted after the current loaders
    pub fn append_loader(&mut self, loader: Arc<dyn DestinationLoader>) {
        self.loader.append(loader);
    }

    /// Consulted before the current loaders
    pub fn prepend_loader(&mut self, loader: Arc<dyn DestinationLoader>) {
        self.loader.prepend(loader);
    }

    pub fn get_destination(&self, name: &str) -> DestinationResult<Destination> {
        self.try_get_destination(name, &DestinationOptions::default())
    }

    #[instrument(skip(self, options))]
    pub fn try_get_destination(&self, name: &str, options: &DestinationOptions) -> DestinationResult<Destination> {
        self.loader.try_get_destination(name, options)
    }

    /// Like [`Self::try_get_destination`], also reporting the loaders
    /// that did not know the name
    pub fn resolve(&self, name: &str, options: &DestinationOptions) -> DestinationResult<Resolved> {
        self.loader.resolve(name, options)
    }
}

impl From<DestinationLoaderChain> for DestinationAccessor {
    fn from(loader: DestinationLoaderChain) -> Self {
        Self::new(loader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::DefaultDestinationLoader;

    fn loader_with(name: &str, url: &str) -> Arc<DefaultDestinationLoader> {
        Arc::new(
            DefaultDestinationLoader::new()
                .with_destination(Destination::builder().name(name).property_raw("URL", url).build())
                .unwrap(),
        )
    }

    #[test]
    fn test_get_destination_through_chain() {
        let accessor = DestinationAccessor::new(DestinationLoaderChain::new(loader_with("a", "https://a")));
        assert!(accessor.get_destination("a").unwrap().is_http());
        assert!(accessor.get_destination("b").unwrap_err().is_not_found());
    }

    #[test]
    fn test_append_and_prepend_loaders() {
        let mut accessor = DestinationAccessor::new(DestinationLoaderChain::new(loader_with("a", "https://first")));
        accessor.append_loader(loader_with("b", "https://b"));
        accessor.prepend_loader(loader_with("a", "https://override"));

        assert_eq!(accessor.loader().len(), 3);
        assert_eq!(
            accessor.get_destination("a").unwrap().as_http().unwrap().uri().host(),
            Some("override")
        );
        assert!(accessor.get_destination("b").is_ok());
    }

    #[test]
    fn test_set_loader_replaces_chain() {
        let mut accessor = DestinationAccessor::new(DestinationLoaderChain::new(loader_with("a", "https://a")));
        accessor.set_loader(DestinationLoaderChain::new(loader_with("b", "https://b")));

        assert!(accessor.get_destination("a").unwrap_err().is_not_found());
        assert!(accessor.get_destination("b").is_ok());
    }
}
