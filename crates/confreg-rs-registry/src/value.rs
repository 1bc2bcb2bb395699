//! Config value model and primitive normalization.
//!
//! Every default stored in the registry is a [`ConfigValue`]. Host values are
//! brought into that closed set through the [`Primitive`] trait, which mirrors
//! the normalization rule applied on export: enumerations collapse to their
//! underlying value, scalars pass through, sequences and sets become ordered
//! sequences, mappings keep their keys, and anything else becomes a string.

use crate::RegistryError;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Number, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;
use std::hash::BuildHasher;
use std::path::{Path, PathBuf};

/// A normalized configuration value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConfigValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<ConfigValue>),
    Mapping(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// Normalize any value that serde can represent.
    ///
    /// Unit enum variants become their serialized name, so
    /// `#[serde(rename_all = "lowercase")]` enums export as lowercase strings.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, RegistryError> {
        Ok(serde_json::to_value(value)?.into())
    }

    /// Fall back to the string representation of a value.
    pub fn from_display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        ConfigValue::String(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Convert into a JSON-safe `serde_json::Value`.
    ///
    /// Non-finite floats have no JSON number form and are exported as strings.
    pub fn to_json(&self) -> Value {
        match self {
            ConfigValue::Null => Value::Null,
            ConfigValue::Bool(value) => Value::Bool(*value),
            ConfigValue::Int(value) => Value::Number((*value).into()),
            ConfigValue::Float(value) => Number::from_f64(*value)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(format!("{value:?}"))),
            ConfigValue::String(value) => Value::String(value.clone()),
            ConfigValue::Sequence(items) => {
                Value::Array(items.iter().map(ConfigValue::to_json).collect())
            }
            ConfigValue::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Env var string form: strings raw, containers as compact JSON.
impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => Ok(()),
            ConfigValue::Bool(value) => write!(f, "{value}"),
            ConfigValue::Int(value) => write!(f, "{value}"),
            // Debug keeps the fractional part ("1.0") that Display drops.
            ConfigValue::Float(value) => write!(f, "{value:?}"),
            ConfigValue::String(value) => f.write_str(value),
            ConfigValue::Sequence(_) | ConfigValue::Mapping(_) => {
                write!(f, "{}", self.to_json())
            }
        }
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::Bool(value) => serializer.serialize_bool(*value),
            ConfigValue::Int(value) => serializer.serialize_i64(*value),
            ConfigValue::Float(value) if value.is_finite() => serializer.serialize_f64(*value),
            ConfigValue::Float(value) => serializer.serialize_str(&format!("{value:?}")),
            ConfigValue::String(value) => serializer.serialize_str(value),
            ConfigValue::Sequence(items) => serializer.collect_seq(items),
            ConfigValue::Mapping(map) => serializer.collect_map(map),
        }
    }
}

impl<'de> Deserialize<'de> for ConfigValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ConfigValueVisitor)
    }
}

/// Visits self-describing input directly so non-finite floats (JSON5 `NaN`,
/// `Infinity`) survive as `Float` instead of collapsing to null.
struct ConfigValueVisitor;

impl<'de> Visitor<'de> for ConfigValueVisitor {
    type Value = ConfigValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a config value")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Int(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<ConfigValue, E> {
        Ok(value.to_primitive())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Float(value))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<ConfigValue, E> {
        Ok(ConfigValue::String(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<ConfigValue, E> {
        Ok(ConfigValue::String(value))
    }

    fn visit_unit<E: de::Error>(self) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<ConfigValue, E> {
        Ok(ConfigValue::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<ConfigValue, D::Error> {
        ConfigValue::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ConfigValue, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ConfigValue::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ConfigValue, A::Error> {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, ConfigValue>()? {
            entries.insert(key, value);
        }
        Ok(ConfigValue::Mapping(entries))
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(value) => ConfigValue::Bool(value),
            Value::Number(number) => {
                if let Some(value) = number.as_i64() {
                    ConfigValue::Int(value)
                } else if number.is_u64() {
                    // Out of i64 range; keep the exact digits.
                    ConfigValue::String(number.to_string())
                } else {
                    number
                        .as_f64()
                        .map(ConfigValue::Float)
                        .unwrap_or_else(|| ConfigValue::String(number.to_string()))
                }
            }
            Value::String(value) => ConfigValue::String(value),
            Value::Array(items) => {
                ConfigValue::Sequence(items.into_iter().map(ConfigValue::from).collect())
            }
            Value::Object(map) => ConfigValue::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, ConfigValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Int(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(items: Vec<ConfigValue>) -> Self {
        ConfigValue::Sequence(items)
    }
}

/// Conversion of host values into the closed [`ConfigValue`] set.
///
/// Implement this for domain enums to export their underlying value:
///
/// ```
/// use confreg_rs_registry::{ConfigValue, Primitive};
///
/// enum Mode { Fast, Safe }
///
/// impl Primitive for Mode {
///     fn to_primitive(&self) -> ConfigValue {
///         match self {
///             Mode::Fast => "fast".into(),
///             Mode::Safe => "safe".into(),
///         }
///     }
/// }
///
/// assert_eq!(Mode::Safe.to_primitive(), ConfigValue::from("safe"));
/// ```
pub trait Primitive {
    fn to_primitive(&self) -> ConfigValue;
}

/// Normalize a value into its primitive form.
pub fn primitive<T: Primitive + ?Sized>(value: &T) -> ConfigValue {
    value.to_primitive()
}

macro_rules! lossless_int {
    ($($ty:ty),*) => {
        $(
            impl Primitive for $ty {
                fn to_primitive(&self) -> ConfigValue {
                    ConfigValue::Int(i64::from(*self))
                }
            }
        )*
    };
}

macro_rules! wide_int {
    ($($ty:ty),*) => {
        $(
            impl Primitive for $ty {
                fn to_primitive(&self) -> ConfigValue {
                    i64::try_from(*self)
                        .map(ConfigValue::Int)
                        .unwrap_or_else(|_| ConfigValue::from_display(self))
                }
            }
        )*
    };
}

lossless_int!(i8, i16, i32, i64, u8, u16, u32);
wide_int!(i128, isize, u64, u128, usize);

impl Primitive for bool {
    fn to_primitive(&self) -> ConfigValue {
        ConfigValue::Bool(*self)
    }
}

impl Primitive for f32 {
    fn to_primitive(&self) -> ConfigValue {
        ConfigValue::Float(f64::from(*self))
    }
}

impl Primitive for f64 {
    fn to_primitive(&self) -> ConfigValue {
        ConfigValue::Float(*self)
    }
}

impl Primitive for str {
    fn to_primitive(&self) -> ConfigValue {
        ConfigValue::String(self.to_string())
    }
}

impl Primitive for String {
    fn to_primitive(&self) -> ConfigValue {
        ConfigValue::String(self.clone())
    }
}

impl Primitive for char {
    fn to_primitive(&self) -> ConfigValue {
        ConfigValue::from_display(self)
    }
}

impl Primitive for Path {
    fn to_primitive(&self) -> ConfigValue {
        ConfigValue::String(self.to_string_lossy().into_owned())
    }
}

impl Primitive for PathBuf {
    fn to_primitive(&self) -> ConfigValue {
        self.as_path().to_primitive()
    }
}

impl Primitive for ConfigValue {
    fn to_primitive(&self) -> ConfigValue {
        self.clone()
    }
}

impl Primitive for Value {
    fn to_primitive(&self) -> ConfigValue {
        ConfigValue::from(self.clone())
    }
}

impl<T: Primitive + ?Sized> Primitive for &T {
    fn to_primitive(&self) -> ConfigValue {
        (**self).to_primitive()
    }
}

impl<T: Primitive> Primitive for Option<T> {
    fn to_primitive(&self) -> ConfigValue {
        match self {
            Some(value) => value.to_primitive(),
            None => ConfigValue::Null,
        }
    }
}

impl<T: Primitive> Primitive for [T] {
    fn to_primitive(&self) -> ConfigValue {
        ConfigValue::Sequence(self.iter().map(Primitive::to_primitive).collect())
    }
}

impl<T: Primitive, const N: usize> Primitive for [T; N] {
    fn to_primitive(&self) -> ConfigValue {
        self.as_slice().to_primitive()
    }
}

impl<T: Primitive> Primitive for Vec<T> {
    fn to_primitive(&self) -> ConfigValue {
        self.as_slice().to_primitive()
    }
}

impl<T: Primitive> Primitive for VecDeque<T> {
    fn to_primitive(&self) -> ConfigValue {
        ConfigValue::Sequence(self.iter().map(Primitive::to_primitive).collect())
    }
}

impl<T: Primitive> Primitive for BTreeSet<T> {
    fn to_primitive(&self) -> ConfigValue {
        ConfigValue::Sequence(self.iter().map(Primitive::to_primitive).collect())
    }
}

impl<T: Primitive, S: BuildHasher> Primitive for HashSet<T, S> {
    fn to_primitive(&self) -> ConfigValue {
        ConfigValue::Sequence(self.iter().map(Primitive::to_primitive).collect())
    }
}

impl<K: AsRef<str>, V: Primitive> Primitive for BTreeMap<K, V> {
    fn to_primitive(&self) -> ConfigValue {
        ConfigValue::Mapping(
            self.iter()
                .map(|(key, value)| (key.as_ref().to_string(), value.to_primitive()))
                .collect(),
        )
    }
}

impl<K: AsRef<str>, V: Primitive, S: BuildHasher> Primitive for HashMap<K, V, S> {
    fn to_primitive(&self) -> ConfigValue {
        ConfigValue::Mapping(
            self.iter()
                .map(|(key, value)| (key.as_ref().to_string(), value.to_primitive()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(rename_all = "lowercase")]
    enum Level {
        Debug,
        #[allow(dead_code)]
        Info,
    }

    /// Serde-represented enums collapse to their underlying name.
    #[test]
    fn enum_normalizes_to_underlying_value() {
        let value = ConfigValue::from_serialize(&Level::Debug).expect("value");
        assert_eq!(value, ConfigValue::from("debug"));
    }

    /// Nested sequences of mappings are normalized at every level.
    #[test]
    fn nested_containers_normalize_recursively() {
        let mut inner = BTreeMap::new();
        inner.insert("ports", vec![80u16, 443]);
        let value = vec![inner].to_primitive();
        assert_eq!(value.to_json(), json!([{ "ports": [80, 443] }]));
    }

    /// Integers outside the i64 range fall back to their decimal string.
    #[test]
    fn oversized_unsigned_falls_back_to_string() {
        assert_eq!(u64::MAX.to_primitive(), ConfigValue::from(u64::MAX.to_string()));
        assert_eq!(7u64.to_primitive(), ConfigValue::Int(7));
    }

    /// Non-finite floats export as strings to stay JSON-safe.
    #[test]
    fn non_finite_float_exports_as_string() {
        assert_eq!(ConfigValue::Float(f64::NAN).to_json(), json!("NaN"));
        assert_eq!(
            serde_json::to_string(&ConfigValue::Float(f64::INFINITY)).expect("json"),
            "\"inf\""
        );
    }

    /// Env string form keeps floats fractional and strings unquoted.
    #[test]
    fn display_matches_env_string_form() {
        assert_eq!(ConfigValue::Float(1.0).to_string(), "1.0");
        assert_eq!(ConfigValue::Int(8080).to_string(), "8080");
        assert_eq!(ConfigValue::Bool(true).to_string(), "true");
        assert_eq!(ConfigValue::from("localhost").to_string(), "localhost");
        assert_eq!(vec!["a", "b"].to_primitive().to_string(), r#"["a","b"]"#);
    }

    /// JSON numbers keep their integer or float kind when converted.
    #[test]
    fn json_numbers_keep_their_kind() {
        let value = ConfigValue::from(json!({ "a": 1, "b": 1.5, "c": null }));
        let mut expected = BTreeMap::new();
        expected.insert("a".to_string(), ConfigValue::Int(1));
        expected.insert("b".to_string(), ConfigValue::Float(1.5));
        expected.insert("c".to_string(), ConfigValue::Null);
        assert_eq!(value, ConfigValue::Mapping(expected));
    }

    /// Options map `None` to null.
    #[test]
    fn option_none_is_null() {
        let missing: Option<i32> = None;
        assert!(missing.to_primitive().is_null());
        assert_eq!(Some(3).to_primitive(), ConfigValue::Int(3));
    }

    /// Ordered sets become sequences in sort order, whatever the build order.
    #[test]
    fn btree_set_normalizes_in_sorted_order() {
        let set: BTreeSet<i64> = [3, 1, 2].into_iter().collect();
        assert_eq!(
            set.to_primitive(),
            ConfigValue::from(vec![ConfigValue::Int(1), ConfigValue::Int(2), ConfigValue::Int(3)])
        );
    }

    /// Hash sets keep every member; only the order is unspecified.
    #[test]
    fn hash_set_normalizes_to_its_members() {
        let set: HashSet<&str> = ["alpha", "beta"].into_iter().collect();
        let ConfigValue::Sequence(items) = primitive(&set) else {
            panic!("expected a sequence");
        };
        let mut members: Vec<&str> = items.iter().filter_map(ConfigValue::as_str).collect();
        members.sort_unstable();
        assert_eq!(members, vec!["alpha", "beta"]);
    }

    /// Chars and paths have no native kind and fall back to strings.
    #[test]
    fn char_and_path_fall_back_to_string() {
        assert_eq!(primitive(&'x').as_str(), Some("x"));
        assert_eq!(
            PathBuf::from("/tmp/a").to_primitive(),
            ConfigValue::from("/tmp/a")
        );
        assert_eq!(primitive(Path::new("logs")).as_str(), Some("logs"));
    }

    /// Scalar accessors only answer for their own kind.
    #[test]
    fn scalar_accessors_match_kind() {
        assert_eq!(primitive(&8080u16).as_i64(), Some(8080));
        assert_eq!(primitive(&true).as_bool(), Some(true));
        assert_eq!(ConfigValue::Int(1).as_bool(), None);
        assert_eq!(ConfigValue::Bool(true).as_str(), None);
        assert_eq!(ConfigValue::from("1").as_i64(), None);
    }

    /// JSON5 non-finite literals deserialize as floats rather than null.
    #[test]
    fn json5_non_finite_literals_stay_floats() {
        let nan: ConfigValue = json5::from_str("NaN").expect("nan");
        assert!(matches!(nan, ConfigValue::Float(value) if value.is_nan()));
        let inf: ConfigValue = json5::from_str("-Infinity").expect("inf");
        assert_eq!(inf, ConfigValue::Float(f64::NEG_INFINITY));
        let nested: ConfigValue = json5::from_str("{ ratio: Infinity, n: 2 }").expect("map");
        let mut expected = BTreeMap::new();
        expected.insert("n".to_string(), ConfigValue::Int(2));
        expected.insert("ratio".to_string(), ConfigValue::Float(f64::INFINITY));
        assert_eq!(nested, ConfigValue::Mapping(expected));
    }
}
