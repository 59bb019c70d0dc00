//! Identifiers
//!
//! Users are identified by their e-mail address. Entity ids are lowercase
//! ULIDs so they sort by creation time.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Sentinel user id recorded for unauthenticated or anonymized respondents
pub const ANONYMOUS_USER: &str = "anonymous";

/// Generate a new entity id
#[inline]
#[must_use]
pub fn new_id() -> String {
    Ulid::new().to_string().to_lowercase()
}

/// Authenticated user identity (the user's e-mail address)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap an identity string
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The anonymous sentinel identity
    #[inline]
    #[must_use]
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_USER.to_string())
    }

    /// Whether this is the anonymous sentinel
    #[inline]
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_USER
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl PartialEq<str> for UserId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for UserId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique_and_lowercase() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert_eq!(a, a.to_lowercase());
        assert_eq!(a.len(), 26);
    }

    #[test]
    fn anonymous_sentinel() {
        assert!(UserId::anonymous().is_anonymous());
        assert!(!UserId::from("dev@example.com").is_anonymous());
        assert_eq!(UserId::anonymous(), "anonymous");
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&UserId::from("a@b.c")).unwrap();
        assert_eq!(json, "\"a@b.c\"");
    }
}
