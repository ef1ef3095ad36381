//! Opaque certificate material passed through to the transport

use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// A DER encoded certificate
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Certificate(Arc<[u8]>);

impl Certificate {
    pub fn from_der(der: impl Into<Vec<u8>>) -> Self {
        Self(Arc::from(der.into()))
    }

    pub fn der(&self) -> &[u8] {
        &self.0
    }

    /// Hex encoded SHA-256 of the DER bytes
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(self.der()))
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Certificate(sha256:{})", self.fingerprint())
    }
}

/// Key or trust store handed to the transport unparsed
///
/// Two stores are equal when they hold the same certificates in the same
/// order, independent of which allocation they live in.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct KeyStore {
    certificates: Vec<Certificate>,
}

impl KeyStore {
    pub fn new(certificates: impl IntoIterator<Item = Certificate>) -> Self {
        Self {
            certificates: certificates.into_iter().collect(),
        }
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.certificates).finish()
    }
}
