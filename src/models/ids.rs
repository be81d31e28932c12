//! Strongly-typed identifier wrappers
//!
//! Using newtype wrappers prevents accidentally mixing up a child id with a
//! class code or an import id at compile time. Run ids are generated UUIDs;
//! the others are keys supplied by the roster or derived from statements.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Macro to generate UUID-backed ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                if let Ok(uuid) = Uuid::parse_str(s) {
                    return Ok(Self(uuid));
                }
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

/// Macro to generate string-keyed newtype wrappers (trimmed on construction)
macro_rules! define_key {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a key, trimming surrounding whitespace
            pub fn new(value: impl AsRef<str>) -> Self {
                Self(value.as_ref().trim().to_string())
            }

            /// Borrow the key as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the key is blank
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

define_id!(RunId, "run-");

define_key!(ChildId);
define_key!(ClassId);
define_key!(ImportId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_display() {
        let id = RunId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("run-"));
        assert_eq!(display.len(), 12);
    }

    #[test]
    fn test_run_id_parse() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id: RunId = uuid_str.parse().unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);
    }

    #[test]
    fn test_keys_are_trimmed() {
        assert_eq!(ClassId::new(" A5 ").as_str(), "A5");
        assert_eq!(ChildId::from("  12").to_string(), "12");
        assert!(ChildId::new("   ").is_empty());
    }

    #[test]
    fn test_key_serialization() {
        let id = ClassId::new("B0");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"B0\"");
        let back: ClassId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
