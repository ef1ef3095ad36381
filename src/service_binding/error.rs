use crate::error::{BoxError, DestinationError};
use thiserror::Error;

/// Failure of a service-binding destination loader
#[derive(Error, Debug)]
pub enum ServiceBindingError {
    /// The loader cannot handle this binding; the next loader is tried
    #[error("Service binding destination not found: {message}")]
    NotFound {
        message: String,
        #[source]
        cause: Option<Box<ServiceBindingError>>,
        suppressed: Vec<ServiceBindingError>,
    },

    #[error("Failed to access service binding destination: {message}")]
    Access {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl ServiceBindingError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            cause: None,
            suppressed: Vec::new(),
        }
    }

    pub fn not_found_caused_by(message: impl Into<String>, cause: ServiceBindingError) -> Self {
        Self::NotFound {
            message: message.into(),
            cause: Some(Box::new(cause)),
            suppressed: Vec::new(),
        }
    }

    pub fn access(message: impl Into<String>) -> Self {
        Self::Access {
            message: message.into(),
            source: None,
        }
    }

    pub fn access_with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Access {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Not-found only when no access error appears anywhere in the cause chain
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { cause, .. } => cause.as_deref().is_none_or(Self::is_not_found),
            Self::Access { .. } => false,
        }
    }

    pub fn suppressed(&self) -> &[ServiceBindingError] {
        match self {
            Self::NotFound { suppressed, .. } => suppressed,
            Self::Access { .. } => &[],
        }
    }
}

impl From<ServiceBindingError> for DestinationError {
    fn from(err: ServiceBindingError) -> Self {
        DestinationError::access_with_source("Service binding resolution failed", err)
    }
}
