//! Cardinality refinement and invocation of header providers

use super::{Cardinality, DestinationHeaderProvider, DestinationRequestContext};
use crate::domain::header::Header;
use crate::error::{DestinationError, DestinationResult};
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::trace;

pub(crate) fn provider_type(provider: &Arc<dyn DestinationHeaderProvider>) -> TypeId {
    let any: &dyn Any = provider.as_ref();
    (*any).type_id()
}

/// Drop surplus providers of the same concrete type
///
/// Walks the input in order; whenever a provider with a finite cardinality
/// `n` is appended, only the `n` most recently appended instances of its
/// type are kept. Unbounded providers are never removed.
pub fn refine<I>(providers: I) -> Vec<Arc<dyn DestinationHeaderProvider>>
where
    I: IntoIterator<Item = Arc<dyn DestinationHeaderProvider>>,
{
    let mut refined: Vec<Arc<dyn DestinationHeaderProvider>> = Vec::new();

    for provider in providers {
        let cardinality = provider.cardinality();
        let appended_type = provider_type(&provider);
        refined.push(provider);

        let Cardinality::AtMost(limit) = cardinality else {
            continue;
        };

        let mut retained = 0;
        for index in (0..refined.len()).rev() {
            if provider_type(&refined[index]) != appended_type {
                continue;
            }
            if retained < limit {
                retained += 1;
            } else {
                let removed = refined.remove(index);
                trace!(provider = removed.name(), "Dropping header provider over its cardinality");
            }
        }
    }

    refined
}

/// Invoke providers in order and concatenate their headers
///
/// The first failing provider aborts resolution for the whole request.
pub fn resolve_headers(
    providers: &[Arc<dyn DestinationHeaderProvider>],
    context: &DestinationRequestContext<'_>,
) -> DestinationResult<Vec<Header>> {
    let mut headers = Vec::new();
    for provider in providers {
        let provided = provider
            .headers(context)
            .map_err(|source| DestinationError::HeaderProvider {
                provider: provider.name().to_string(),
                source,
            })?;
        headers.extend(provided);
    }
    Ok(headers)
}
