//! Request-scoped context consulted while computing headers
//!
//! The inbound request headers and the current user token are supplied by
//! the caller for each logical request instead of being read from
//! thread-local state.

use crate::error::BoxError;
use std::fmt;
use std::sync::Arc;

/// Headers of the inbound request being served
pub trait InboundHeaders: Send + Sync {
    /// All values of `name`, compared case-insensitively
    fn header_values(&self, name: &str) -> Vec<String>;
}

impl InboundHeaders for http::HeaderMap {
    fn header_values(&self, name: &str) -> Vec<String> {
        self.get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect()
    }
}

/// Source of the current user's token
pub trait TokenSource: Send + Sync {
    fn current_token(&self) -> Result<String, BoxError>;
}

/// Fixed token, typically extracted by request middleware
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl TokenSource for StaticToken {
    fn current_token(&self) -> Result<String, BoxError> {
        Ok(self.0.clone())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(****)")
    }
}

/// Explicit ambient context for one logical request
#[derive(Clone, Default)]
pub struct RequestContext {
    inbound_headers: Option<Arc<dyn InboundHeaders>>,
    token: Option<Arc<dyn TokenSource>>,
}

impl RequestContext {
    /// Context with neither inbound headers nor a token
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_inbound_headers(mut self, headers: Arc<dyn InboundHeaders>) -> Self {
        self.inbound_headers = Some(headers);
        self
    }

    pub fn with_token_source(mut self, token: Arc<dyn TokenSource>) -> Self {
        self.token = Some(token);
        self
    }

    /// Values of `name` on the inbound request; empty without inbound headers
    pub fn inbound_header_values(&self, name: &str) -> Vec<String> {
        self.inbound_headers
            .as_ref()
            .map(|headers| headers.header_values(name))
            .unwrap_or_default()
    }

    pub fn current_token(&self) -> Result<String, BoxError> {
        match &self.token {
            Some(source) => source.current_token(),
            None => Err("no token source in request context".into()),
        }
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("inbound_headers", &self.inbound_headers.is_some())
            .field("token", &self.token.is_some())
            .finish()
    }
}
