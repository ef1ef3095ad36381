//! Validated names used to look destinations and bindings up

use nutype::nutype;

/// Name a destination is registered and resolved under
///
/// Limited to 200 characters; surrounding whitespace is trimmed.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 200),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize,
        AsRef,
        Display
    )
)]
pub struct DestinationName(String);

/// Identifier of the service a binding belongs to (e.g. `connectivity`)
#[nutype(
    sanitize(trim, lowercase),
    validate(not_empty, regex = r"^[a-z][a-z0-9._-]*$"),
    derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, AsRef, Display)
)]
pub struct ServiceIdentifier(String);

impl ServiceIdentifier {
    pub const CONNECTIVITY: &'static str = "connectivity";

    /// Identifier of the connectivity service fronting on-premise systems
    pub fn connectivity() -> Self {
        Self::try_new(Self::CONNECTIVITY.to_string())
            .expect("connectivity is a valid service identifier")
    }
}
