//! Resolving destinations by name
//!
//! A [`DestinationLoader`] looks a destination up in one source. Loaders
//! are combined into a [`DestinationLoaderChain`], which callers usually
//! reach through a [`DestinationAccessor`].

pub mod accessor;
pub mod chain;
pub mod default;

use crate::destination::Destination;
use crate::domain::property::{Properties, PropertyKey, PropertyValue};
use crate::error::{DestinationResult, PropertyError};

pub use accessor::DestinationAccessor;
pub use chain::{DestinationLoaderChain, Resolved};
pub use default::DefaultDestinationLoader;

/// One source of destinations
pub trait DestinationLoader: Send + Sync {
    /// Look `name` up; a missing destination is reported as
    /// [`DestinationError::NotFound`](crate::error::DestinationError::NotFound)
    fn try_get_destination(&self, name: &str, options: &DestinationOptions) -> DestinationResult<Destination>;
}

/// Per-call options handed to every loader
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DestinationOptions {
    options: Properties,
}

impl DestinationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.options.insert(name, value);
        self
    }

    pub fn get<T>(&self, key: &PropertyKey<T>) -> Result<Option<T>, PropertyError> {
        self.options.get(key)
    }

    pub fn get_raw(&self, name: &str) -> Option<&PropertyValue> {
        self.options.get_raw(name)
    }

    pub fn option_names(&self) -> impl Iterator<Item = &str> {
        self.options.property_names()
    }
}
