//! Project keys and human-facing item keys (e.g. `PROJ-42`)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::TrackerError;

/// Maximum length of a project key
pub const MAX_KEY_LEN: usize = 10;

/// A validated, uppercase project key
///
/// One ASCII letter followed by 1 to 9 ASCII letters or digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectKey(String);

impl ProjectKey {
    /// Normalize (trim + uppercase) and validate a key
    pub fn parse(raw: &str) -> Result<Self, TrackerError> {
        let key = raw.trim().to_ascii_uppercase();
        if Self::is_valid(&key) {
            Ok(Self(key))
        } else {
            Err(TrackerError::validation(format!(
                "Invalid project key '{}': must start with a letter followed by 1-9 letters or digits",
                raw.trim()
            )))
        }
    }

    fn is_valid(key: &str) -> bool {
        let bytes = key.as_bytes();
        if bytes.len() < 2 || bytes.len() > MAX_KEY_LEN {
            return false;
        }
        bytes[0].is_ascii_uppercase()
            && bytes[1..]
                .iter()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Suggest a key from a project name
    ///
    /// Multi-word names use their initials ("New Web Project" → "NWP"),
    /// single words use their first four characters. Falls back to `PRJ`.
    pub fn suggest(name: &str) -> String {
        let upper = name.trim().to_uppercase();
        let words: Vec<String> = upper
            .split_whitespace()
            .map(|w| w.chars().filter(|c| c.is_ascii_alphanumeric()).collect())
            .filter(|w: &String| !w.is_empty())
            .collect();

        let candidate = match words.as_slice() {
            [] => String::new(),
            [single] => single.chars().take(4).collect(),
            many => many
                .iter()
                .filter_map(|w| w.chars().next())
                .take(4)
                .collect(),
        };

        if Self::is_valid(&candidate) {
            candidate
        } else {
            "PRJ".to_string()
        }
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProjectKey {
    type Error = TrackerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ProjectKey> for String {
    fn from(key: ProjectKey) -> Self {
        key.0
    }
}

/// External identifier of a work item: project key plus sequential number
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemKey {
    pub project_key: String,
    pub number: i64,
}

impl ItemKey {
    pub fn new(project_key: impl Into<String>, number: i64) -> Self {
        Self {
            project_key: project_key.into(),
            number,
        }
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.project_key, self.number)
    }
}

impl FromStr for ItemKey {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TrackerError::validation(format!("Invalid item key '{}'", s));
        let (key, number) = s.trim().rsplit_once('-').ok_or_else(invalid)?;
        let key = ProjectKey::parse(key).map_err(|_| invalid())?;
        let number: i64 = number.parse().map_err(|_| invalid())?;
        if number < 1 {
            return Err(invalid());
        }
        Ok(Self::new(key.as_str(), number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_uppercased_and_validated() {
        assert_eq!(ProjectKey::parse("AB12").unwrap().as_str(), "AB12");
        assert_eq!(ProjectKey::parse(" ab12 ").unwrap().as_str(), "AB12");
    }

    #[test]
    fn test_key_rejects_disallowed_characters() {
        let err = ProjectKey::parse("ab-c").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_key_length_bounds() {
        assert!(ProjectKey::parse("Z").is_err());
        assert!(ProjectKey::parse("ZX").is_ok());
        assert!(ProjectKey::parse("A123456789").is_ok());
        assert!(ProjectKey::parse("A1234567890").is_err());
    }

    #[test]
    fn test_key_must_start_with_letter() {
        assert!(ProjectKey::parse("1ABC").is_err());
        assert!(ProjectKey::parse("").is_err());
    }

    #[test]
    fn test_suggest_key() {
        assert_eq!(ProjectKey::suggest("New Web Project"), "NWP");
        assert_eq!(ProjectKey::suggest("Backend"), "BACK");
        assert_eq!(ProjectKey::suggest(""), "PRJ");
        assert_eq!(ProjectKey::suggest("x"), "PRJ");
        assert_eq!(ProjectKey::suggest("a b c d e f"), "ABCD");
    }

    #[test]
    fn test_item_key_display_and_parse() {
        let key = ItemKey::new("PROJ", 42);
        assert_eq!(key.to_string(), "PROJ-42");

        let parsed: ItemKey = "proj-42".parse().unwrap();
        assert_eq!(parsed, key);

        assert!("PROJ".parse::<ItemKey>().is_err());
        assert!("PROJ-0".parse::<ItemKey>().is_err());
        assert!("PROJ-x".parse::<ItemKey>().is_err());
    }
}
