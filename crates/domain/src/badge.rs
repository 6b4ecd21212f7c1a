//! Badge codes, role identifiers and the badge to role mapping table.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use badgebridge_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Opaque achievement identifier issued by the badge platform.
///
/// Any string is accepted: unknown codes are valid input and simply have no
/// mapped role.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BadgeCode(String);

impl BadgeCode {
    /// Creates a badge code from its transport value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for BadgeCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BadgeCode {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for BadgeCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Identifier of a role in the community directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoleId(String);

impl RoleId {
    /// Creates a validated role identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "role identifier must not be empty".to_owned(),
            ));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Immutable badge code to role identifier table.
///
/// Built once at process start and shared read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleMapping {
    entries: BTreeMap<BadgeCode, RoleId>,
}

impl RoleMapping {
    /// Creates a mapping from explicit badge and role pairs.
    #[must_use]
    pub fn new(entries: impl IntoIterator<Item = (BadgeCode, RoleId)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Parses a `CODE=ROLE_ID` list separated by commas.
    ///
    /// Blank segments are skipped. A code listed twice is rejected.
    pub fn parse(value: &str) -> AppResult<Self> {
        let mut entries = BTreeMap::new();

        for segment in value.split(',').map(str::trim) {
            if segment.is_empty() {
                continue;
            }

            let Some((code, role)) = segment.split_once('=') else {
                return Err(AppError::Validation(format!(
                    "badge role mapping entry '{segment}' must use CODE=ROLE_ID"
                )));
            };

            let code = code.trim();
            if code.is_empty() {
                return Err(AppError::Validation(format!(
                    "badge role mapping entry '{segment}' has an empty badge code"
                )));
            }

            let role = RoleId::new(role)?;
            if entries.insert(BadgeCode::new(code), role).is_some() {
                return Err(AppError::Validation(format!(
                    "badge code '{code}' is mapped more than once"
                )));
            }
        }

        Ok(Self { entries })
    }

    /// Returns the role mapped to the badge code, if any.
    #[must_use]
    pub fn lookup(&self, badge: &BadgeCode) -> Option<&RoleId> {
        self.entries.get(badge)
    }

    /// Returns the mapped badge codes in sorted order.
    pub fn badge_codes(&self) -> impl Iterator<Item = &BadgeCode> {
        self.entries.keys()
    }

    /// Returns the number of mapped badge codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no badge code is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{BadgeCode, RoleMapping};

    #[test]
    fn parse_reads_pairs_and_skips_blank_segments() {
        let mapping = RoleMapping::parse(" L1=100 , ,L2= 200,").unwrap_or_default();

        assert_eq!(mapping.len(), 2);
        assert_eq!(
            mapping.lookup(&BadgeCode::from("L2")).map(|role| role.as_str()),
            Some("200")
        );
    }

    #[test]
    fn parse_rejects_entries_without_separator() {
        assert!(RoleMapping::parse("L1").is_err());
    }

    #[test]
    fn parse_rejects_duplicate_codes() {
        assert!(RoleMapping::parse("L1=100,L1=200").is_err());
    }

    #[test]
    fn parse_rejects_empty_role() {
        assert!(RoleMapping::parse("L1= ").is_err());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let mapping = RoleMapping::parse("L1=100").unwrap_or_default();
        assert!(mapping.lookup(&BadgeCode::from("l1")).is_none());
    }
}
