//! Strongly-typed table name wrapper.
//!
//! Table names may carry the `{{%name}}` placeholder, which is replaced by the
//! configured table prefix when the name is rendered into SQL.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// Characters that wrap the prefix placeholder and are never part of a name.
pub const DELIMITER_CHARS: [char; 3] = ['{', '}', '%'];

/// Strongly-typed wrapper for table names as written in a migration.
///
/// Prevents accidental mixing of table names with column names, index names,
/// or other string types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    /// Create a new `TableName`.
    ///
    /// Empty names are accepted here and rejected when a migration runs. Use
    /// [`try_new`](Self::try_new) to reject them up front.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Try to create a new `TableName`, returning `None` if the name is empty.
    pub fn try_new(name: impl Into<String>) -> Option<Self> {
        let s = name.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Return the underlying name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name with placeholder delimiters trimmed from both ends.
    ///
    /// `{{%users}}` becomes `users`. Used when deriving index and foreign key
    /// names, which never carry the table prefix.
    pub fn bare(&self) -> &str {
        self.0.trim_matches(&DELIMITER_CHARS[..])
    }

    /// Whether the name uses the `{{%name}}` prefix placeholder.
    pub fn is_prefixed(&self) -> bool {
        self.0.starts_with("{{") && self.0.ends_with("}}")
    }

    /// The physical table name once `prefix` is applied.
    ///
    /// Only placeholder names are rewritten; plain names are returned as-is.
    pub fn physical(&self, prefix: &str) -> String {
        if !self.is_prefixed() {
            return self.0.clone();
        }
        let inner = &self.0[2..self.0.len() - 2];
        inner.replacen('%', prefix, 1)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for TableName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TableName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for TableName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TableName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for TableName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TableName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_strips_placeholder() {
        assert_eq!(TableName::new("{{%users}}").bare(), "users");
        assert_eq!(TableName::new("users").bare(), "users");
    }

    #[test]
    fn test_bare_keeps_inner_characters() {
        assert_eq!(TableName::new("{{%user_%log}}").bare(), "user_%log");
    }

    #[test]
    fn test_physical_applies_prefix() {
        assert_eq!(TableName::new("{{%users}}").physical("app_"), "app_users");
        assert_eq!(TableName::new("{{%users}}").physical(""), "users");
    }

    #[test]
    fn test_physical_plain_name_untouched() {
        assert_eq!(TableName::new("users").physical("app_"), "users");
    }

    #[test]
    fn test_new_accepts_empty() {
        let name = TableName::new("");
        assert_eq!(name.bare(), "");
        assert!(!name.is_prefixed());
    }

    #[test]
    fn test_try_new_rejects_empty() {
        assert!(TableName::try_new("").is_none());
        assert_eq!(TableName::try_new("posts").unwrap(), "posts");
    }
}
