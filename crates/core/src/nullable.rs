//! Three-state optional values.
//!
//! The remote API treats a field sent as `null` differently from a field that
//! is left out of the request body. `Nullable` keeps the two apart on both the
//! input side (tool arguments) and the output side (request bodies).
//!
//! Fields must be declared with
//! `#[serde(default, skip_serializing_if = "Nullable::is_missing")]`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nullable<T> {
    /// Key not present
    Missing,
    /// Key present with an explicit `null`
    Null,
    Value(T),
}

impl<T> Nullable<T> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Nullable<U> {
        match self {
            Self::Missing => Nullable::Missing,
            Self::Null => Nullable::Null,
            Self::Value(value) => Nullable::Value(f(value)),
        }
    }

    /// Returns the contained value, treating `null` and missing alike.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Missing | Self::Null => None,
        }
    }
}

impl<T> Default for Nullable<T> {
    fn default() -> Self {
        Self::Missing
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Value(value),
            None => Self::Null,
        }
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => value.serialize(serializer),
            // Missing only reaches here without skip_serializing_if
            Self::Missing | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Only called when the key is present; absent keys use Default.
        Option::<T>::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct Patch {
        #[serde(default, skip_serializing_if = "Nullable::is_missing")]
        name: Nullable<String>,
        #[serde(default, skip_serializing_if = "Nullable::is_missing")]
        timeout: Nullable<u32>,
    }

    #[test]
    fn test_missing_null_and_value_are_distinct() {
        let patch: Patch = serde_json::from_value(json!({"name": null, "timeout": 30})).unwrap();
        assert!(patch.name.is_null());
        assert_eq!(patch.timeout, Nullable::Value(30));

        let patch: Patch = serde_json::from_value(json!({})).unwrap();
        assert!(patch.name.is_missing());
        assert!(patch.timeout.is_missing());
    }

    #[test]
    fn test_serialization_preserves_null_and_omits_missing() {
        let patch = Patch {
            name: Nullable::Null,
            timeout: Nullable::Missing,
        };
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({"name": null}));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let result: Result<Patch, _> = serde_json::from_value(json!({"timeout": "soon"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_map_and_into_option() {
        let value = Nullable::Value(2).map(|v| v * 10);
        assert_eq!(value, Nullable::Value(20));
        assert_eq!(value.into_option(), Some(20));
        assert_eq!(Nullable::<u8>::Null.into_option(), None);
    }
}
