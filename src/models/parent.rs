//! Parent identity
//!
//! A parent has no numeric id: the normalized display name is the key that
//! links roster rows and bank transfers. Two spellings that normalize to the
//! same key are the same parent; anything else is a different parent, so the
//! normalization here is correctness-critical.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A normalized parent name
#[derive(Debug, Clone)]
pub struct ParentName {
    display: String,
    key: String,
}

impl ParentName {
    /// Normalize a raw name: drop parenthesised notes, collapse whitespace
    ///
    /// Returns `None` when nothing meaningful remains.
    pub fn normalize(raw: &str) -> Option<Self> {
        let (name, _) = split_contact(raw);
        let display = name.split_whitespace().collect::<Vec<_>>().join(" ");
        if display.is_empty() {
            return None;
        }
        let key = display.to_lowercase();
        Some(Self { display, key })
    }

    /// Normalize a raw roster entry and pull out a parenthesised phone number
    ///
    /// "Karim Haddad (0612 345 678)" becomes ("Karim Haddad", "0612 345 678").
    pub fn with_contact(raw: &str) -> (Option<Self>, Option<String>) {
        let (_, contact) = split_contact(raw);
        (Self::normalize(raw), contact)
    }

    /// Name as shown to people
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Case-folded comparison key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Last word of the name (the family name in roster convention)
    pub fn last_word(&self) -> &str {
        self.display.split_whitespace().last().unwrap_or("")
    }
}

/// Split "Name (note) more" into ("Name  more", Some("note"))
fn split_contact(raw: &str) -> (String, Option<String>) {
    let mut name = String::with_capacity(raw.len());
    let mut contact: Option<String> = None;
    let mut depth = 0usize;
    let mut current = String::new();

    for ch in raw.chars() {
        match ch {
            '(' => {
                depth += 1;
                if depth == 1 {
                    current.clear();
                    continue;
                }
            }
            ')' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let note = current.trim();
                    if contact.is_none() && !note.is_empty() {
                        contact = Some(note.to_string());
                    }
                    name.push(' ');
                    continue;
                }
            }
            _ => {}
        }

        if depth > 0 {
            current.push(ch);
        } else {
            name.push(ch);
        }
    }

    (name, contact)
}

impl PartialEq for ParentName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ParentName {}

impl Hash for ParentName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for ParentName {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ParentName {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for ParentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl Serialize for ParentName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display)
    }
}

impl<'de> Deserialize<'de> for ParentName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::normalize(&raw).ok_or_else(|| serde::de::Error::custom("empty parent name"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_whitespace() {
        let name = ParentName::normalize("  Karim   Haddad ").unwrap();
        assert_eq!(name.as_str(), "Karim Haddad");
    }

    #[test]
    fn test_contact_is_split_off() {
        let (name, phone) = ParentName::with_contact("Karim Haddad (0612 345 678)");
        assert_eq!(name.unwrap().as_str(), "Karim Haddad");
        assert_eq!(phone.as_deref(), Some("0612 345 678"));
    }

    #[test]
    fn test_equality_ignores_case() {
        let a = ParentName::normalize("KARIM HADDAD").unwrap();
        let b = ParentName::normalize("Karim Haddad (06)").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_blank_names() {
        assert!(ParentName::normalize("   ").is_none());
        assert!(ParentName::normalize("(0612)").is_none());
    }

    #[test]
    fn test_last_word() {
        let name = ParentName::normalize("Sara El Amrani").unwrap();
        assert_eq!(name.last_word(), "Amrani");
    }
}
