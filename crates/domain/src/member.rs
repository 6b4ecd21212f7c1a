//! Community members and the identity hints used to find them.

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

use badgebridge_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::RoleId;

/// Stable identifier of a member in the community directory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(String);

impl MemberId {
    /// Creates a validated member identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "member identifier must not be empty".to_owned(),
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

impl Display for MemberId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Member of the community as last read from the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    id: MemberId,
    username: String,
    display_name: String,
    global_name: Option<String>,
    legacy_tag: Option<String>,
    roles: BTreeSet<RoleId>,
}

impl Member {
    /// Creates a member without roles or optional name fields.
    #[must_use]
    pub fn new(id: MemberId, username: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            display_name: display_name.into(),
            global_name: None,
            legacy_tag: None,
            roles: BTreeSet::new(),
        }
    }

    /// Sets the account-wide global name.
    #[must_use]
    pub fn with_global_name(mut self, global_name: Option<String>) -> Self {
        self.global_name = global_name;
        self
    }

    /// Sets the legacy `name#discriminator` tag.
    #[must_use]
    pub fn with_legacy_tag(mut self, legacy_tag: Option<String>) -> Self {
        self.legacy_tag = legacy_tag;
        self
    }

    /// Sets the roles currently held by the member.
    #[must_use]
    pub fn with_roles(mut self, roles: impl IntoIterator<Item = RoleId>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    /// Returns the stable member identifier.
    #[must_use]
    pub fn id(&self) -> &MemberId {
        &self.id
    }

    /// Returns the primary username.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Returns the name shown in the community.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the global name, when the account has one.
    #[must_use]
    pub fn global_name(&self) -> Option<&str> {
        self.global_name.as_deref()
    }

    /// Returns the legacy tag, when the account still has a discriminator.
    #[must_use]
    pub fn legacy_tag(&self) -> Option<&str> {
        self.legacy_tag.as_deref()
    }

    /// Returns the roles held when the member was read.
    #[must_use]
    pub fn roles(&self) -> &BTreeSet<RoleId> {
        &self.roles
    }

    /// Returns whether the member held the role when it was read.
    #[must_use]
    pub fn holds_role(&self, role: &RoleId) -> bool {
        self.roles.contains(role)
    }

    /// Returns every name field that name-based lookup compares against.
    pub fn name_fields(&self) -> impl Iterator<Item = &str> {
        [
            Some(self.username.as_str()),
            Some(self.display_name.as_str()),
            self.global_name.as_deref(),
            self.legacy_tag.as_deref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Returns whether any name field equals any of the variants exactly.
    #[must_use]
    pub fn matches_any_name(&self, variants: &[String]) -> bool {
        self.name_fields()
            .any(|field| variants.iter().any(|variant| variant == field))
    }
}

/// Loosely-specified reference to a member taken from an inbound event.
///
/// The stable identifier is authoritative; name variants are only consulted
/// when it is missing or does not resolve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityHint {
    stable_id: Option<String>,
    name_variants: Vec<String>,
}

impl IdentityHint {
    /// Creates a hint, dropping blank and repeated name variants.
    #[must_use]
    pub fn new(stable_id: Option<String>, name_variants: impl IntoIterator<Item = String>) -> Self {
        let mut unique_variants: Vec<String> = Vec::new();
        for variant in name_variants {
            if variant.trim().is_empty() || unique_variants.contains(&variant) {
                continue;
            }
            unique_variants.push(variant);
        }

        Self {
            stable_id,
            name_variants: unique_variants,
        }
    }

    /// Returns the stable identifier when one is present and non-empty.
    #[must_use]
    pub fn stable_id(&self) -> Option<MemberId> {
        self.stable_id
            .as_deref()
            .and_then(|value| MemberId::new(value).ok())
    }

    /// Returns the usable name variants in the order they were supplied.
    #[must_use]
    pub fn name_variants(&self) -> &[String] {
        self.name_variants.as_slice()
    }

    /// Returns whether the hint carries nothing to resolve with.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stable_id().is_none() && self.name_variants.is_empty()
    }
}
