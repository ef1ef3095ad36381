//! Dynamic header providers evaluated for every outbound request
//!
//! Providers come from two places: those attached to a destination while
//! it is built, and those registered once at process start in a
//! [`HeaderProviderRegistry`]. Before a request, the combined list is
//! refined by each provider's [`Cardinality`] and then invoked in order.

pub mod pipeline;
pub mod providers;

use crate::destination::HttpDestination;
use crate::domain::context::RequestContext;
use crate::domain::header::Header;
use crate::error::BoxError;
use http::Uri;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub use pipeline::{refine, resolve_headers};
pub use providers::{LocationIdHeaderProvider, PrincipalPropagationHeaderProvider};

/// How many instances of one provider type may contribute headers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cardinality {
    /// Keep at most this many of the most recently added instances
    AtMost(usize),
    Unbounded,
}

/// Everything a provider may look at while computing headers
#[derive(Clone, Copy)]
pub struct DestinationRequestContext<'a> {
    destination: &'a HttpDestination,
    request_uri: &'a Uri,
    request: &'a RequestContext,
}

impl<'a> DestinationRequestContext<'a> {
    pub fn new(
        destination: &'a HttpDestination,
        request_uri: &'a Uri,
        request: &'a RequestContext,
    ) -> Self {
        Self {
            destination,
            request_uri,
            request,
        }
    }

    pub fn destination(&self) -> &'a HttpDestination {
        self.destination
    }

    pub fn request_uri(&self) -> &'a Uri {
        self.request_uri
    }

    pub fn request(&self) -> &'a RequestContext {
        self.request
    }
}

/// Computes extra headers for a destination and request
pub trait DestinationHeaderProvider: Any + Send + Sync {
    fn headers(&self, context: &DestinationRequestContext<'_>) -> Result<Vec<Header>, BoxError>;

    fn cardinality(&self) -> Cardinality {
        Cardinality::Unbounded
    }

    /// Name used when reporting failures
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Providers registered at process start and attached to every HTTP
/// destination built with this registry
#[derive(Clone, Default)]
pub struct HeaderProviderRegistry {
    providers: Vec<Arc<dyn DestinationHeaderProvider>>,
}

impl HeaderProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn DestinationHeaderProvider>) {
        self.providers.push(provider);
    }

    pub fn providers(&self) -> &[Arc<dyn DestinationHeaderProvider>] {
        &self.providers
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl fmt::Debug for HeaderProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}
