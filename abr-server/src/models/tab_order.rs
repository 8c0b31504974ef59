//! Tab-order request newtypes
//!
//! User ids and page names become SQLite keys and URL segments, so both are
//! restricted to slug characters. Tab ids are free-form but bounded.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::ValidationError;

const MAX_KEY_LEN: usize = 64;

/// Most tabs a page may persist
pub const MAX_TABS: usize = 64;

const MAX_TAB_ID_LEN: usize = 128;

/// Matches DB-friendly keys: ^[A-Za-z0-9][A-Za-z0-9._@-]{0,63}$
static USER_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._@-]{0,63}$").expect("invalid user id regex")
});

/// Page slugs: lowercase alphanumeric with hyphens
static PAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]{0,63}$").expect("invalid page regex"));

/// Validated user id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// # Example
    /// ```
    /// use abr_server::models::UserId;
    ///
    /// assert!(UserId::new("user1").is_ok());
    /// assert!(UserId::new("maria.lopez@abr").is_ok());
    /// assert!(UserId::new("has space").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        validate_key(s, "user id", &USER_ID_RE, "must be alphanumeric with . _ @ -")?;
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated page name (slug)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageName(String);

impl PageName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        validate_key(
            s,
            "page",
            &PAGE_RE,
            "must be lowercase alphanumeric with hyphens, starting with alphanumeric",
        )?;
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated tab id sequence: non-empty, bounded, no duplicates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabOrder(Vec<String>);

impl TabOrder {
    pub fn new(ids: Vec<String>) -> Result<Self, ValidationError> {
        if ids.is_empty() {
            return Err(ValidationError::Empty { field: "order" });
        }
        if ids.len() > MAX_TABS {
            return Err(ValidationError::TooLong {
                field: "order",
                max: MAX_TABS,
            });
        }

        let mut seen = HashSet::with_capacity(ids.len());
        for id in &ids {
            if id.trim().is_empty() {
                return Err(ValidationError::Empty { field: "tab id" });
            }
            if id.chars().count() > MAX_TAB_ID_LEN {
                return Err(ValidationError::TooLong {
                    field: "tab id",
                    max: MAX_TAB_ID_LEN,
                });
            }
            if !seen.insert(id.as_str()) {
                return Err(ValidationError::Duplicate {
                    field: "order",
                    value: id.clone(),
                });
            }
        }

        Ok(Self(ids))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

fn validate_key(
    s: &str,
    field: &'static str,
    pattern: &Regex,
    reason: &'static str,
) -> Result<(), ValidationError> {
    if s.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if s.len() > MAX_KEY_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_KEY_LEN,
        });
    }
    if !pattern.is_match(s) {
        return Err(ValidationError::InvalidFormat { field, reason });
    }
    Ok(())
}
