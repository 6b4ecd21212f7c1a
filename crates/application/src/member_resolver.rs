use std::sync::Arc;

use badgebridge_core::{AppError, AppResult};
use badgebridge_domain::{IdentityHint, Member};
use tracing::{debug, warn};

use crate::MemberDirectory;

/// Member lookup strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// Direct fetch by the stable member identifier.
    StableId,
    /// Exact match of a name variant against the member listing.
    NameVariants,
}

impl ResolutionStrategy {
    /// Strategies in the order they are tried. The first success wins.
    pub const PRIORITY: [Self; 2] = [Self::StableId, Self::NameVariants];

    /// Returns a stable label for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StableId => "stable_id",
            Self::NameVariants => "name_variants",
        }
    }
}

/// Member found for an identity hint, with the strategy that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Resolved member.
    pub member: Member,
    /// Strategy that produced the match.
    pub strategy: ResolutionStrategy,
}

/// Resolves identity hints to at most one directory member.
#[derive(Clone)]
pub struct MemberResolver {
    directory: Arc<dyn MemberDirectory>,
}

impl MemberResolver {
    /// Creates a resolver over the directory handle.
    #[must_use]
    pub fn new(directory: Arc<dyn MemberDirectory>) -> Self {
        Self { directory }
    }

    /// Tries each strategy in [`ResolutionStrategy::PRIORITY`] order.
    ///
    /// `Ok(None)` means every strategy was exhausted. A failing member listing
    /// is reported as `Unavailable` whatever the directory answered; a failing
    /// fetch by id only ends that step.
    pub async fn resolve(&self, hint: &IdentityHint) -> AppResult<Option<Resolution>> {
        for strategy in ResolutionStrategy::PRIORITY {
            let found = match strategy {
                ResolutionStrategy::StableId => self.resolve_by_stable_id(hint).await,
                ResolutionStrategy::NameVariants => self.resolve_by_name(hint).await?,
            };

            if let Some(member) = found {
                return Ok(Some(Resolution { member, strategy }));
            }
        }

        Ok(None)
    }

    async fn resolve_by_stable_id(&self, hint: &IdentityHint) -> Option<Member> {
        let member_id = hint.stable_id()?;

        match self.directory.fetch_member(&member_id).await {
            Ok(Some(member)) => Some(member),
            Ok(None) => {
                debug!(member_id = %member_id, "no member with stable id");
                None
            }
            Err(error) => {
                warn!(
                    member_id = %member_id,
                    error = %error,
                    "member fetch by stable id failed"
                );
                None
            }
        }
    }

    async fn resolve_by_name(&self, hint: &IdentityHint) -> AppResult<Option<Member>> {
        let variants = hint.name_variants();
        if variants.is_empty() {
            return Ok(None);
        }

        let roster = self.directory.list_members().await.map_err(|error| {
            warn!(error = %error, "member listing failed");
            AppError::Unavailable(format!("member listing failed: {error}"))
        })?;
        let Some(listed) = roster
            .iter()
            .find(|member| member.matches_any_name(variants))
        else {
            return Ok(None);
        };

        // The listing may be a cached snapshot; read the member again for current roles.
        match self.directory.fetch_member(listed.id()).await {
            Ok(current) => Ok(current),
            Err(error) => {
                warn!(
                    member_id = %listed.id(),
                    error = %error,
                    "refresh of name-matched member failed, using roster snapshot"
                );
                Ok(Some(listed.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use badgebridge_core::AppError;
    use badgebridge_domain::IdentityHint;

    use super::{MemberResolver, ResolutionStrategy};
    use crate::fake_directory::{FakeMemberDirectory, member, role};

    fn hint(stable_id: Option<&str>, variants: &[&str]) -> IdentityHint {
        IdentityHint::new(
            stable_id.map(str::to_owned),
            variants.iter().map(|variant| (*variant).to_owned()),
        )
    }

    #[tokio::test]
    async fn stable_id_match_is_never_overridden_by_name_match() {
        let directory = Arc::new(FakeMemberDirectory::with_members(vec![
            member("1", "bob", "Bob"),
            member("2", "alice", "Alice"),
        ]));
        let resolver = MemberResolver::new(directory.clone());

        let resolution = resolver.resolve(&hint(Some("1"), &["alice"])).await;

        let Ok(Some(resolution)) = resolution else {
            panic!("member should resolve");
        };
        assert_eq!(resolution.member.id().as_str(), "1");
        assert_eq!(resolution.strategy, ResolutionStrategy::StableId);
        assert_eq!(directory.list_calls().await, 0);
    }

    #[tokio::test]
    async fn failing_fetch_falls_back_to_name_variants() {
        let directory = Arc::new(FakeMemberDirectory::with_members(vec![member(
            "456", "alice", "Alice",
        )]));
        directory.fail_fetch_for("123").await;
        let resolver = MemberResolver::new(directory);

        let resolution = resolver.resolve(&hint(Some("123"), &["alice"])).await;

        let Ok(Some(resolution)) = resolution else {
            panic!("fallback should resolve");
        };
        assert_eq!(resolution.member.id().as_str(), "456");
        assert_eq!(resolution.strategy, ResolutionStrategy::NameVariants);
    }

    #[tokio::test]
    async fn unknown_stable_id_falls_back_to_name_variants() {
        let directory = Arc::new(FakeMemberDirectory::with_members(vec![member(
            "9", "dana", "Dana",
        )]));
        let resolver = MemberResolver::new(directory);

        let resolution = resolver.resolve(&hint(Some("404"), &["Dana"])).await;

        assert!(matches!(
            resolution,
            Ok(Some(ref found)) if found.member.id().as_str() == "9"
        ));
    }

    #[tokio::test]
    async fn empty_hint_is_not_found_without_touching_the_roster() {
        let directory = Arc::new(FakeMemberDirectory::with_members(vec![member(
            "1", "bob", "Bob",
        )]));
        let resolver = MemberResolver::new(directory.clone());

        let resolution = resolver.resolve(&hint(None, &[])).await;

        assert!(matches!(resolution, Ok(None)));
        assert_eq!(directory.list_calls().await, 0);
    }

    #[tokio::test]
    async fn first_member_in_listing_order_wins() {
        let directory = Arc::new(FakeMemberDirectory::with_members(vec![
            member("1", "erin", "Erin"),
            member("2", "frank", "erin"),
        ]));
        let resolver = MemberResolver::new(directory);

        let resolution = resolver.resolve(&hint(None, &["frank", "erin"])).await;

        assert!(matches!(
            resolution,
            Ok(Some(ref found)) if found.member.id().as_str() == "1"
        ));
    }

    #[tokio::test]
    async fn name_match_is_refreshed_with_current_roles() {
        let directory = Arc::new(FakeMemberDirectory::with_members(vec![member(
            "5", "gina", "Gina",
        )]));
        directory.stale_listing().await;
        directory.add_role("R1").await;
        let _ = directory.grant_directly("5", "R1").await;
        let resolver = MemberResolver::new(directory);

        let resolution = resolver.resolve(&hint(None, &["gina"])).await;

        let Ok(Some(resolution)) = resolution else {
            panic!("member should resolve");
        };
        assert!(resolution.member.holds_role(&role("R1")));
    }

    #[tokio::test]
    async fn unmatched_names_resolve_to_none() {
        let directory = Arc::new(FakeMemberDirectory::with_members(vec![member(
            "1", "bob", "Bob",
        )]));
        let resolver = MemberResolver::new(directory);

        let resolution = resolver.resolve(&hint(None, &["nobody"])).await;

        assert!(matches!(resolution, Ok(None)));
    }

    #[tokio::test]
    async fn failing_listing_is_reported_as_unavailable() {
        let directory = Arc::new(FakeMemberDirectory::with_members(vec![member(
            "1", "alice", "Alice",
        )]));
        directory.fail_listing().await;
        let resolver = MemberResolver::new(directory);

        let resolution = resolver.resolve(&hint(None, &["alice"])).await;

        assert!(matches!(resolution, Err(AppError::Unavailable(_))));
    }
}
