use std::error::Error as StdError;
use thiserror::Error;

/// Boxed error used for failures raised by pluggable collaborators
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Failure to convert a stored property value into the type a key expects
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PropertyError {
    #[error("Property '{name}' holds a {actual} value, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Property '{name}' value '{value}' is not a valid {expected}")]
    Unparsable {
        name: String,
        value: String,
        expected: &'static str,
    },
}

/// Malformed destination input detected synchronously at the call that saw it
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Destination has no URL property")]
    MissingUri,

    #[error("Destination URL '{value}' is invalid: {reason}")]
    InvalidUri { value: String, reason: String },

    #[error("Proxy URL '{value}' is invalid: {reason}")]
    InvalidProxyUri { value: String, reason: String },

    #[error("Proxy credentials are malformed: {0}")]
    MalformedProxyCredentials(String),

    #[error("Principal propagation mode '{0}' is not supported")]
    UnsupportedPrincipalPropagationMode(String),

    #[error("Expected exactly one service binding for '{service}', found {found}")]
    ServiceBindingCount { service: String, found: usize },

    #[error("Destination has no name")]
    MissingName,

    #[error("Destination name '{0}' is invalid")]
    InvalidName(String),

    #[error("A loader chain needs at least one loader")]
    EmptyLoaderChain,

    #[error(transparent)]
    Property(#[from] PropertyError),
}

/// Failures surfaced to callers resolving or using a destination
#[derive(Error, Debug)]
pub enum DestinationError {
    /// Nothing is registered under this name; chains try the next loader
    #[error("Destination '{name}' not found")]
    NotFound {
        name: String,
        suppressed: Vec<DestinationError>,
    },

    /// Something matched but could not be turned into a usable destination
    #[error("Failed to access destination: {message}")]
    Access {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Destination configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Header provider '{provider}' failed: {source}")]
    HeaderProvider {
        provider: String,
        #[source]
        source: BoxError,
    },
}

impl DestinationError {
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound {
            name: name.into(),
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

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Header provider failures belong to the access-error class
    pub fn is_access_error(&self) -> bool {
        matches!(self, Self::Access { .. } | Self::HeaderProvider { .. })
    }

    /// Not-found causes collected while a chain fell through
    pub fn suppressed(&self) -> &[DestinationError] {
        match self {
            Self::NotFound { suppressed, .. } => suppressed,
            _ => &[],
        }
    }
}

impl From<PropertyError> for DestinationError {
    fn from(err: PropertyError) -> Self {
        Self::Configuration(ConfigurationError::Property(err))
    }
}

pub type DestinationResult<T> = std::result::Result<T, DestinationError>;
