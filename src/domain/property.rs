//! Untyped destination properties with typed, case-insensitive access
//!
//! A [`Properties`] bag stores loosely-typed [`PropertyValue`]s keyed by
//! name. Well-known settings are read through a [`PropertyKey`], which
//! carries the conversion into the expected Rust type: an already-typed
//! value is used as-is, a string is parsed as a fallback, anything else is
//! reported as a [`PropertyError`].

use crate::domain::types::Identifiable;
use crate::error::PropertyError;
use http::Uri;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Mask rendered in place of secret property values
pub const MASKED_VALUE: &str = "****";

/// Any value that can be stored as a typed property
///
/// Implemented for every `Debug + PartialEq + Send + Sync` type, so enums
/// and credential objects can be placed into a bag without a string round
/// trip and still compare by value.
pub trait TypedProperty: Any + fmt::Debug + Send + Sync {
    fn eq_property(&self, other: &dyn TypedProperty) -> bool;
}

impl<T> TypedProperty for T
where
    T: Any + fmt::Debug + PartialEq + Send + Sync,
{
    fn eq_property(&self, other: &dyn TypedProperty) -> bool {
        let other: &dyn Any = other;
        other.downcast_ref::<T>().is_some_and(|other| other == self)
    }
}

/// A single loosely-typed property value
#[derive(Clone)]
pub enum PropertyValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    List(Vec<PropertyValue>),
    Typed(Arc<dyn TypedProperty>),
}

impl PropertyValue {
    /// Wrap an arbitrary typed value
    pub fn typed<T: TypedProperty>(value: T) -> Self {
        Self::Typed(Arc::new(value))
    }

    /// Convert a JSON value; `null` has no property representation
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Boolean(b)),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => Self::String(n.to_string()),
            }),
            Value::String(s) => Some(Self::String(s)),
            Value::Array(items) => Some(Self::List(
                items.into_iter().filter_map(Self::from_json).collect(),
            )),
            object @ Value::Object(_) => Some(Self::String(object.to_string())),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Downcast a typed value
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Typed(typed) => {
                let any: &dyn Any = typed.as_ref();
                any.downcast_ref::<T>()
            }
            _ => None,
        }
    }

    /// Short name of the stored kind, used in conversion errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::List(_) => "list",
            Self::Typed(_) => "typed",
        }
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Typed(a), Self::Typed(b)) => a.eq_property(b.as_ref()),
            _ => false,
        }
    }
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{s:?}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::List(items) => f.debug_list().entries(items).finish(),
            Self::Typed(typed) => write!(f, "{typed:?}"),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            other => write!(f, "{other:?}"),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u16> for PropertyValue {
    fn from(value: u16) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<Uri> for PropertyValue {
    fn from(value: Uri) -> Self {
        Self::typed(value)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(value: Vec<PropertyValue>) -> Self {
        Self::List(value)
    }
}

type Converter<T> = fn(&str, &PropertyValue) -> Result<T, PropertyError>;

/// Identifies a single well-known setting and how to read it
pub struct PropertyKey<T> {
    name: &'static str,
    convert: Converter<T>,
}

impl<T> Clone for PropertyKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PropertyKey<T> {}

impl<T> fmt::Debug for PropertyKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyKey").field(&self.name).finish()
    }
}

impl<T> PropertyKey<T> {
    pub const fn new(name: &'static str, convert: Converter<T>) -> Self {
        Self { name, convert }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn convert(&self, value: &PropertyValue) -> Result<T, PropertyError> {
        (self.convert)(self.name, value)
    }
}

impl PropertyKey<String> {
    pub const fn string(name: &'static str) -> Self {
        Self::new(name, convert_string)
    }
}

impl PropertyKey<Uri> {
    pub const fn uri(name: &'static str) -> Self {
        Self::new(name, convert_uri)
    }
}

impl PropertyKey<bool> {
    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, convert_bool)
    }
}

impl PropertyKey<i64> {
    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, convert_integer)
    }
}

impl PropertyKey<Vec<PropertyValue>> {
    /// List keys never parse strings
    pub const fn list(name: &'static str) -> Self {
        Self::new(name, convert_list)
    }
}

impl<T: Identifiable> PropertyKey<T> {
    pub const fn enumeration(name: &'static str) -> Self {
        Self::new(name, convert_identifiable::<T>)
    }
}

fn mismatch(name: &str, expected: &'static str, value: &PropertyValue) -> PropertyError {
    PropertyError::TypeMismatch {
        name: name.to_string(),
        expected,
        actual: value.kind(),
    }
}

fn unparsable(name: &str, value: &str, expected: &'static str) -> PropertyError {
    PropertyError::Unparsable {
        name: name.to_string(),
        value: value.to_string(),
        expected,
    }
}

/// Typed value first, then the string parser
fn convert_typed_or_parse<T: Any + Clone>(
    name: &str,
    value: &PropertyValue,
    expected: &'static str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, PropertyError> {
    if let Some(typed) = value.downcast_ref::<T>() {
        return Ok(typed.clone());
    }
    match value {
        PropertyValue::String(s) => parse(s).ok_or_else(|| unparsable(name, s, expected)),
        other => Err(mismatch(name, expected, other)),
    }
}

fn convert_string(name: &str, value: &PropertyValue) -> Result<String, PropertyError> {
    convert_typed_or_parse(name, value, "string", |s| Some(s.to_string()))
}

fn convert_uri(name: &str, value: &PropertyValue) -> Result<Uri, PropertyError> {
    convert_typed_or_parse(name, value, "URI", |s| s.parse::<Uri>().ok())
}

fn convert_bool(name: &str, value: &PropertyValue) -> Result<bool, PropertyError> {
    match value {
        PropertyValue::Boolean(b) => Ok(*b),
        other => convert_typed_or_parse(name, other, "boolean", |s| {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Some(true)
            } else if s.eq_ignore_ascii_case("false") {
                Some(false)
            } else {
                None
            }
        }),
    }
}

fn convert_integer(name: &str, value: &PropertyValue) -> Result<i64, PropertyError> {
    match value {
        PropertyValue::Integer(i) => Ok(*i),
        other => convert_typed_or_parse(name, other, "integer", |s| s.trim().parse().ok()),
    }
}

fn convert_list(name: &str, value: &PropertyValue) -> Result<Vec<PropertyValue>, PropertyError> {
    match value {
        PropertyValue::List(items) => Ok(items.clone()),
        other => Err(mismatch(name, "list", other)),
    }
}

fn convert_identifiable<T: Identifiable>(
    name: &str,
    value: &PropertyValue,
) -> Result<T, PropertyError> {
    convert_typed_or_parse(name, value, T::KIND, T::of_identifier)
}

/// Case-insensitive, ordered property bag
///
/// Iteration follows the case-insensitive sort order of the names; the
/// spelling of the most recent insert is kept for display.
#[derive(Clone, Default, PartialEq)]
pub struct Properties {
    entries: BTreeMap<String, (String, PropertyValue)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a well-known property; absent keys are `Ok(None)`
    pub fn get<T>(&self, key: &PropertyKey<T>) -> Result<Option<T>, PropertyError> {
        self.get_raw(key.name()).map(|v| key.convert(v)).transpose()
    }

    pub fn get_raw(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_ascii_lowercase())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        self.entries
            .insert(name.to_ascii_lowercase(), (name, value.into()));
    }

    pub fn remove(&mut self, name: &str) -> Option<PropertyValue> {
        self.entries
            .remove(&name.to_ascii_lowercase())
            .map(|(_, value)| value)
    }

    /// Copy every entry of `other` over this bag
    pub fn extend_from(&mut self, other: &Properties) {
        for (name, value) in other.iter() {
            self.insert(name, value.clone());
        }
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Entries whose name starts with `prefix` (case-insensitive), paired
    /// with the remainder of the name
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a PropertyValue)> + 'a {
        self.iter().filter_map(move |(name, value)| {
            let head = name.get(..prefix.len())?;
            head.eq_ignore_ascii_case(prefix)
                .then(|| (&name[prefix.len()..], value))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub(crate) fn is_secret(name: &str) -> bool {
    name.to_ascii_lowercase().contains("password")
}

impl fmt::Debug for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in self.iter() {
            if is_secret(name) {
                map.entry(&name, &format_args!("{MASKED_VALUE}"));
            } else {
                map.entry(&name, value);
            }
        }
        map.finish()
    }
}

impl<N: Into<String>, V: Into<PropertyValue>> FromIterator<(N, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut properties = Self::new();
        for (name, value) in iter {
            properties.insert(name, value);
        }
        properties
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Properties {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter()
            .filter_map(|(name, value)| PropertyValue::from_json(value).map(|v| (name, v)))
            .collect()
    }
}
