//! Property-based tests for derivation and header composition invariants

use destination_resolver::destination::{DerivedProperties, HttpDestination};
use destination_resolver::domain::header::AUTHORIZATION;
use destination_resolver::domain::{BasicCredentials, Header, Properties, PropertyValue, RequestContext};
use destination_resolver::error::BoxError;
use destination_resolver::headers::{refine, Cardinality, DestinationHeaderProvider, DestinationRequestContext};
use http::Uri;
use proptest::prelude::*;
use std::sync::Arc;

pub mod generators {
    use super::*;
    use proptest::collection::vec;
    use proptest::sample::select;

    /// Names the derivation functions look at, plus some noise
    const NAMES: &[&str] = &[
        "URL",
        "User",
        "Username",
        "Password",
        "Authentication",
        "authType",
        "forwardAuthToken",
        "Proxy",
        "ProxyHost",
        "ProxyAuth",
        "ProxyType",
        "URL.headers.X-A",
        "URL.headers.x-b",
        "URL.queries.q",
        "Description",
    ];

    pub fn property_value() -> impl Strategy<Value = PropertyValue> {
        prop_oneof![
            "[a-zA-Z0-9:/. _-]{0,24}".prop_map(PropertyValue::from),
            any::<bool>().prop_map(PropertyValue::from),
            (0_i64..100_000).prop_map(PropertyValue::from),
            select(vec![
                "true",
                "BasicAuthentication",
                "NoAuthentication",
                "OnPremise",
                "Internet",
                "Basic dXNlcjpwYXNz",
                "Bearer token",
                "proxy.local:3128",
            ])
            .prop_map(PropertyValue::from),
        ]
    }

    pub fn properties() -> impl Strategy<Value = Properties> {
        vec((select(NAMES.to_vec()), property_value()), 0..10).prop_map(|entries| entries.into_iter().collect::<Properties>())
    }

    /// Name with every ASCII letter's case chosen at random
    pub fn case_variant(name: &'static str) -> impl Strategy<Value = String> {
        vec(any::<bool>(), name.len()).prop_map(move |flips| {
            name.chars()
                .zip(flips)
                .map(|(c, upper)| if upper { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
                .collect()
        })
    }

    pub fn known_name() -> impl Strategy<Value = &'static str> {
        select(NAMES.to_vec())
    }
}

struct Limited;

impl DestinationHeaderProvider for Limited {
    fn headers(&self, _: &DestinationRequestContext<'_>) -> Result<Vec<Header>, BoxError> {
        Ok(vec![Header::new("X-Limited", "l")])
    }

    fn cardinality(&self) -> Cardinality {
        Cardinality::AtMost(2)
    }
}

struct Unlimited;

impl DestinationHeaderProvider for Unlimited {
    fn headers(&self, _: &DestinationRequestContext<'_>) -> Result<Vec<Header>, BoxError> {
        Ok(vec![Header::new("X-Unlimited", "u")])
    }
}

proptest! {
    #[test]
    fn test_derivation_is_deterministic(properties in generators::properties()) {
        let first = DerivedProperties::derive(&properties);
        let second = DerivedProperties::derive(&properties);

        match (first, second) {
            (Ok(first), Ok(second)) => prop_assert_eq!(first, second),
            (Err(first), Err(second)) => prop_assert_eq!(first.to_string(), second.to_string()),
            _ => prop_assert!(false, "derivation outcome changed between runs"),
        }
    }

    #[test]
    fn test_lookup_ignores_case(name in generators::known_name(), value in generators::property_value(), seed in any::<u64>()) {
        let mut properties = Properties::new();
        properties.insert(name, value.clone());

        let variant: String = name
            .chars()
            .enumerate()
            .map(|(i, c)| if (seed >> (i % 64)) & 1 == 1 { c.to_ascii_uppercase() } else { c.to_ascii_lowercase() })
            .collect();

        prop_assert_eq!(properties.get_raw(&variant), Some(&value));
        prop_assert!(properties.contains(&variant));
    }

    #[test]
    fn test_later_insert_replaces_any_case_variant(variant in generators::case_variant("ProxyHost")) {
        let mut properties = Properties::new();
        properties.insert("ProxyHost", "first");
        properties.insert(variant.clone(), "second");

        prop_assert_eq!(properties.len(), 1);
        prop_assert_eq!(properties.get_raw("proxyhost").and_then(PropertyValue::as_str), Some("second"));
        prop_assert_eq!(properties.property_names().collect::<Vec<_>>(), vec![variant.as_str()]);
    }

    #[test]
    fn test_refinement_respects_cardinality(kinds in proptest::collection::vec(any::<bool>(), 0..20)) {
        let providers: Vec<Arc<dyn DestinationHeaderProvider>> = kinds
            .iter()
            .map(|limited| if *limited {
                Arc::new(Limited) as Arc<dyn DestinationHeaderProvider>
            } else {
                Arc::new(Unlimited)
            })
            .collect();

        let refined = refine(providers);
        let limited = refined.iter().filter(|p| p.cardinality() == Cardinality::AtMost(2)).count();
        let unlimited = refined.len() - limited;

        prop_assert_eq!(limited, kinds.iter().filter(|k| **k).count().min(2));
        prop_assert_eq!(unlimited, kinds.iter().filter(|k| !**k).count());
    }

    #[test]
    fn test_custom_authorization_is_never_duplicated(user in "[a-z]{1,8}", password in "[a-z]{1,8}", custom in "[A-Za-z0-9]{1,16}") {
        let destination = HttpDestination::builder("https://example.com")
            .basic_credentials(BasicCredentials::new(user, password))
            .header(Header::new(AUTHORIZATION, format!("Bearer {custom}")))
            .build()
            .unwrap();

        let headers = destination.headers(&Uri::from_static("/"), &RequestContext::empty()).unwrap();
        let authorization: Vec<&Header> = headers.iter().filter(|h| h.has_name(AUTHORIZATION)).collect();
        prop_assert_eq!(authorization.len(), 1);
        prop_assert_eq!(authorization[0].value(), format!("Bearer {custom}"));
    }
}
