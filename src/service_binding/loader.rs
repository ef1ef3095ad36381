//! Service-binding destination loaders and their chain

use super::error::ServiceBindingError;
use super::ServiceBinding;
use crate::destination::HttpDestination;
use crate::domain::types::OnBehalfOf;
use std::sync::Arc;
use tracing::{debug, instrument};

/// What a service-binding loader is asked to turn into a destination
#[derive(Clone, Debug)]
pub struct ServiceBindingDestinationOptions {
    service_binding: ServiceBinding,
    on_behalf_of: OnBehalfOf,
    proxied_destination: Option<HttpDestination>,
}

impl ServiceBindingDestinationOptions {
    pub fn new(service_binding: ServiceBinding, on_behalf_of: OnBehalfOf) -> Self {
        Self {
            service_binding,
            on_behalf_of,
            proxied_destination: None,
        }
    }

    /// Destination that should be reached through the bound service
    pub fn with_proxied_destination(mut self, destination: HttpDestination) -> Self {
        self.proxied_destination = Some(destination);
        self
    }

    pub fn service_binding(&self) -> &ServiceBinding {
        &self.service_binding
    }

    pub fn on_behalf_of(&self) -> OnBehalfOf {
        self.on_behalf_of
    }

    pub fn proxied_destination(&self) -> Option<&HttpDestination> {
        self.proxied_destination.as_ref()
    }
}

pub trait ServiceBindingDestinationLoader: Send + Sync {
    fn get_destination(
        &self,
        options: &ServiceBindingDestinationOptions,
    ) -> Result<HttpDestination, ServiceBindingError>;
}

/// Tries each delegate in order until one produces a destination
///
/// Not-found failures fall through to the next delegate; anything else
/// stops the chain.
#[derive(Clone, Default)]
pub struct ServiceBindingDestinationLoaderChain {
    delegates: Vec<Arc<dyn ServiceBindingDestinationLoader>>,
}

impl ServiceBindingDestinationLoaderChain {
    pub fn new(delegates: Vec<Arc<dyn ServiceBindingDestinationLoader>>) -> Self {
        Self { delegates }
    }

    pub fn append(&mut self, loader: Arc<dyn ServiceBindingDestinationLoader>) {
        self.delegates.push(loader);
    }

    pub fn prepend(&mut self, loader: Arc<dyn ServiceBindingDestinationLoader>) {
        self.delegates.insert(0, loader);
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

impl ServiceBindingDestinationLoader for ServiceBindingDestinationLoaderChain {
    #[instrument(skip_all, fields(binding = options.service_binding().name(), on_behalf_of = %options.on_behalf_of()))]
    fn get_destination(
        &self,
        options: &ServiceBindingDestinationOptions,
    ) -> Result<HttpDestination, ServiceBindingError> {
        if self.delegates.is_empty() {
            return Err(ServiceBindingError::access(
                "No service binding destination loaders are configured",
            ));
        }

        let mut suppressed = Vec::new();
        for (index, delegate) in self.delegates.iter().enumerate() {
            match delegate.get_destination(options) {
                Ok(destination) => return Ok(destination),
                Err(err) if err.is_not_found() => {
                    debug!(loader = index, error = %err, "Loader cannot handle binding, trying next");
                    suppressed.push(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(ServiceBindingError::NotFound {
            message: "No loader could create a destination for the service binding".to_string(),
            cause: None,
            suppressed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identifiers::ServiceIdentifier;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Outcome {
        NotFound,
        NestedAccess,
        Success,
    }

    struct Scripted {
        outcome: Outcome,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ServiceBindingDestinationLoader for Scripted {
        fn get_destination(
            &self,
            _: &ServiceBindingDestinationOptions,
        ) -> Result<HttpDestination, ServiceBindingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Outcome::NotFound => Err(ServiceBindingError::not_found("unsupported binding")),
                Outcome::NestedAccess => Err(ServiceBindingError::not_found_caused_by(
                    "wrapped",
                    ServiceBindingError::access("token fetch failed"),
                )),
                Outcome::Success => Ok(HttpDestination::builder("https://bound.example.com")
                    .build()
                    .unwrap()),
            }
        }
    }

    fn options() -> ServiceBindingDestinationOptions {
        ServiceBindingDestinationOptions::new(
            ServiceBinding::new(ServiceIdentifier::connectivity()),
            OnBehalfOf::TechnicalUserCurrentTenant,
        )
    }

    #[test]
    fn test_empty_chain_is_access_error() {
        let err = ServiceBindingDestinationLoaderChain::default()
            .get_destination(&options())
            .unwrap_err();
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_falls_through_to_success() {
        let first = Scripted::new(Outcome::NotFound);
        let second = Scripted::new(Outcome::Success);
        let chain = ServiceBindingDestinationLoaderChain::new(vec![
            first.clone() as Arc<dyn ServiceBindingDestinationLoader>,
            second.clone(),
        ]);

        let destination = chain.get_destination(&options()).unwrap();
        assert_eq!(destination.uri().host(), Some("bound.example.com"));
        assert_eq!((first.calls(), second.calls()), (1, 1));
    }

    #[test]
    fn test_access_error_in_cause_chain_short_circuits() {
        let first = Scripted::new(Outcome::NestedAccess);
        let second = Scripted::new(Outcome::Success);
        let chain = ServiceBindingDestinationLoaderChain::new(vec![
            first.clone() as Arc<dyn ServiceBindingDestinationLoader>,
            second.clone(),
        ]);

        let err = chain.get_destination(&options()).unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(second.calls(), 0);
    }

    #[test]
    fn test_exhausted_chain_collects_suppressed() {
        let mut chain = ServiceBindingDestinationLoaderChain::new(vec![
            Scripted::new(Outcome::NotFound) as Arc<dyn ServiceBindingDestinationLoader>,
        ]);
        chain.prepend(Scripted::new(Outcome::NotFound));

        let err = chain.get_destination(&options()).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.suppressed().len(), 2);
    }
}
