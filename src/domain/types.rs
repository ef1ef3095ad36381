//! Enumerations stored in destination properties
//!
//! Each enumeration has a stable textual identifier used when the value
//! arrives as a string from a destination source.

use crate::domain::property::PropertyValue;
use derive_more::Display;
use std::any::Any;
use std::fmt;

/// Enumerations that can be parsed from a destination property string
pub trait Identifiable: Any + Clone + fmt::Debug + PartialEq + Send + Sync {
    /// Name used in conversion errors
    const KIND: &'static str;

    fn identifier(&self) -> &'static str;

    /// Case-insensitive lookup by identifier
    fn of_identifier(identifier: &str) -> Option<Self>;
}

/// Strategy used to authenticate outbound calls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum AuthenticationType {
    NoAuthentication,
    BasicAuthentication,
    TokenForwarding,
    PrincipalPropagation,
    ClientCertificateAuthentication,
    OAuth2ClientCredentials,
    #[display("OAuth2SAMLBearerAssertion")]
    OAuth2SamlBearerAssertion,
    OAuth2UserTokenExchange,
    #[display("OAuth2JWTBearer")]
    OAuth2JwtBearer,
    OAuth2Password,
    OAuth2RefreshToken,
    #[display("SAPAssertionSSO")]
    SapAssertionSso,
}

impl AuthenticationType {
    pub const ALL: [AuthenticationType; 12] = [
        Self::NoAuthentication,
        Self::BasicAuthentication,
        Self::TokenForwarding,
        Self::PrincipalPropagation,
        Self::ClientCertificateAuthentication,
        Self::OAuth2ClientCredentials,
        Self::OAuth2SamlBearerAssertion,
        Self::OAuth2UserTokenExchange,
        Self::OAuth2JwtBearer,
        Self::OAuth2Password,
        Self::OAuth2RefreshToken,
        Self::SapAssertionSso,
    ];
}

impl Identifiable for AuthenticationType {
    const KIND: &'static str = "authentication type";

    fn identifier(&self) -> &'static str {
        match self {
            Self::NoAuthentication => "NoAuthentication",
            Self::BasicAuthentication => "BasicAuthentication",
            Self::TokenForwarding => "TokenForwarding",
            Self::PrincipalPropagation => "PrincipalPropagation",
            Self::ClientCertificateAuthentication => "ClientCertificateAuthentication",
            Self::OAuth2ClientCredentials => "OAuth2ClientCredentials",
            Self::OAuth2SamlBearerAssertion => "OAuth2SAMLBearerAssertion",
            Self::OAuth2UserTokenExchange => "OAuth2UserTokenExchange",
            Self::OAuth2JwtBearer => "OAuth2JWTBearer",
            Self::OAuth2Password => "OAuth2Password",
            Self::OAuth2RefreshToken => "OAuth2RefreshToken",
            Self::SapAssertionSso => "SAPAssertionSSO",
        }
    }

    fn of_identifier(identifier: &str) -> Option<Self> {
        let identifier = identifier.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.identifier().eq_ignore_ascii_case(identifier))
    }
}

/// How the target endpoint is reached
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
pub enum ProxyType {
    #[default]
    Internet,
    OnPremise,
    PrivateLink,
}

impl Identifiable for ProxyType {
    const KIND: &'static str = "proxy type";

    fn identifier(&self) -> &'static str {
        match self {
            Self::Internet => "Internet",
            Self::OnPremise => "OnPremise",
            Self::PrivateLink => "PrivateLink",
        }
    }

    fn of_identifier(identifier: &str) -> Option<Self> {
        let identifier = identifier.trim();
        [Self::Internet, Self::OnPremise, Self::PrivateLink]
            .into_iter()
            .find(|t| t.identifier().eq_ignore_ascii_case(identifier))
    }
}

/// How a principal-propagating destination conveys the user identity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum PrincipalPropagationMode {
    TokenForwarding,
    TokenExchange,
    Unknown,
}

impl Identifiable for PrincipalPropagationMode {
    const KIND: &'static str = "principal propagation mode";

    fn identifier(&self) -> &'static str {
        match self {
            Self::TokenForwarding => "TOKEN_FORWARDING",
            Self::TokenExchange => "TOKEN_EXCHANGE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Unrecognised identifiers map to `Unknown` rather than failing
    fn of_identifier(identifier: &str) -> Option<Self> {
        let identifier = identifier.trim();
        Some(
            [Self::TokenForwarding, Self::TokenExchange]
                .into_iter()
                .find(|m| m.identifier().eq_ignore_ascii_case(identifier))
                .unwrap_or(Self::Unknown),
        )
    }
}

/// Protocol family of a destination
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum DestinationType {
    #[display("HTTP")]
    Http,
    #[display("RFC")]
    Rfc,
    #[display("LDAP")]
    Ldap,
    #[display("MAIL")]
    Mail,
}

impl Identifiable for DestinationType {
    const KIND: &'static str = "destination type";

    fn identifier(&self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Rfc => "RFC",
            Self::Ldap => "LDAP",
            Self::Mail => "MAIL",
        }
    }

    fn of_identifier(identifier: &str) -> Option<Self> {
        let identifier = identifier.trim();
        [Self::Http, Self::Rfc, Self::Ldap, Self::Mail]
            .into_iter()
            .find(|t| t.identifier().eq_ignore_ascii_case(identifier))
    }
}

/// Identity an outbound call is made as
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
pub enum OnBehalfOf {
    /// Technical user of the platform provider
    TechnicalUserProvider,
    /// Technical user of the current tenant
    TechnicalUserCurrentTenant,
    /// Named end user of the current tenant
    NamedUserCurrentTenant,
}

macro_rules! typed_property_value {
    ($($ty:ty),* $(,)?) => {$(
        impl From<$ty> for PropertyValue {
            fn from(value: $ty) -> Self {
                PropertyValue::typed(value)
            }
        }
    )*};
}

typed_property_value!(
    AuthenticationType,
    ProxyType,
    PrincipalPropagationMode,
    DestinationType,
    OnBehalfOf,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_type_identifiers_round_trip() {
        for t in AuthenticationType::ALL {
            assert_eq!(AuthenticationType::of_identifier(t.identifier()), Some(t));
        }
    }

    #[test]
    fn test_authentication_type_displays_its_identifier() {
        for t in AuthenticationType::ALL {
            assert_eq!(t.to_string(), t.identifier());
        }
    }

    #[test]
    fn test_identifier_lookup_ignores_case() {
        assert_eq!(
            AuthenticationType::of_identifier("basicauthentication"),
            Some(AuthenticationType::BasicAuthentication)
        );
        assert_eq!(ProxyType::of_identifier("ONPREMISE"), Some(ProxyType::OnPremise));
        assert_eq!(DestinationType::of_identifier("rfc"), Some(DestinationType::Rfc));
    }

    #[test]
    fn test_unknown_identifiers() {
        assert_eq!(AuthenticationType::of_identifier("Digest"), None);
        assert_eq!(ProxyType::of_identifier("Satellite"), None);
    }

    #[test]
    fn test_principal_propagation_mode_defaults_to_unknown() {
        assert_eq!(
            PrincipalPropagationMode::of_identifier("token_exchange"),
            Some(PrincipalPropagationMode::TokenExchange)
        );
        assert_eq!(
            PrincipalPropagationMode::of_identifier("SOMETHING_ELSE"),
            Some(PrincipalPropagationMode::Unknown)
        );
    }

    #[test]
    fn test_proxy_type_defaults_to_internet() {
        assert_eq!(ProxyType::default(), ProxyType::Internet);
    }

    #[test]
    fn test_display() {
        assert_eq!(ProxyType::OnPremise.to_string(), "OnPremise");
        assert_eq!(DestinationType::Http.to_string(), "HTTP");
        assert_eq!(AuthenticationType::OAuth2JwtBearer.to_string(), "OAuth2JWTBearer");
        assert_eq!(
            OnBehalfOf::TechnicalUserProvider.to_string(),
            "TechnicalUserProvider"
        );
    }
}
