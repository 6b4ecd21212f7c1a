use std::sync::Arc;

use badgebridge_core::AppError;
use badgebridge_domain::{BadgeCode, IdentityHint, OutcomeKind, RoleMapping};

use crate::fake_directory::{FakeMemberDirectory, member};
use crate::{BadgeSyncRequest, BadgeSyncService};

async fn build_service() -> (BadgeSyncService, Arc<FakeMemberDirectory>) {
    let directory = Arc::new(FakeMemberDirectory::with_members(vec![
        member("100", "alice", "Alice"),
        member("200", "bob", "Bobby"),
    ]));
    directory.add_role("R1").await;
    directory.add_role("R2").await;

    let mapping = RoleMapping::parse("L1=R1,L2=R2,L3=R3").unwrap_or_default();
    let service = BadgeSyncService::new(directory.clone(), Arc::new(mapping));
    (service, directory)
}

fn request(stable_id: Option<&str>, variants: &[&str], badges: &[&str]) -> BadgeSyncRequest {
    BadgeSyncRequest {
        hint: IdentityHint::new(
            stable_id.map(str::to_owned),
            variants.iter().map(|variant| (*variant).to_owned()),
        ),
        badges: badges.iter().map(|code| BadgeCode::from(*code)).collect(),
    }
}

#[tokio::test]
async fn sync_badges_grants_roles_and_reports_counts() {
    let (service, directory) = build_service().await;

    let summary = service
        .sync_badges(request(Some("100"), &[], &["L1", "L2", "L3", "nope"]))
        .await;

    let Ok(summary) = summary else {
        panic!("sync should succeed");
    };
    assert_eq!(summary.member().id, "100");
    assert_eq!(summary.member().username, "alice");
    let counts = summary.counts();
    assert_eq!(counts.added, 2);
    assert_eq!(counts.already_present, 0);
    assert_eq!(counts.missing_or_failed, 2);
    assert_eq!(counts.total_badges, 4);
    assert_eq!(summary.outcomes()[2].kind(), OutcomeKind::RoleNotFound);
    assert_eq!(directory.grant_calls().await.len(), 2);
}

#[tokio::test]
async fn sync_badges_is_idempotent_across_requests() {
    let (service, directory) = build_service().await;

    let first = service
        .sync_badges(request(None, &["Bobby"], &["L1"]))
        .await;
    let second = service
        .sync_badges(request(None, &["Bobby"], &["L1"]))
        .await;

    assert!(matches!(first, Ok(ref summary) if summary.counts().added == 1));
    assert!(matches!(second, Ok(ref summary) if summary.counts().already_present == 1));
    assert_eq!(directory.grant_calls().await.len(), 1);
}

#[tokio::test]
async fn unavailable_directory_short_circuits_before_resolution() {
    let (service, directory) = build_service().await;
    directory.set_ready(false).await;

    let result = service
        .sync_badges(request(None, &["alice"], &["L1"]))
        .await;

    assert!(matches!(result, Err(AppError::Unavailable(_))));
    assert_eq!(directory.list_calls().await, 0);
    assert!(directory.grant_calls().await.is_empty());
}

#[tokio::test]
async fn unresolved_member_is_reported_as_not_found() {
    let (service, directory) = build_service().await;

    let result = service
        .sync_badges(request(Some("999"), &["ghost"], &["L1"]))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(ref message)) if message.contains("ghost")));
    assert!(directory.grant_calls().await.is_empty());
}

#[tokio::test]
async fn empty_hint_is_not_found() {
    let (service, _) = build_service().await;

    let result = service.sync_badges(request(None, &[], &["L1"])).await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn failed_grant_is_isolated_in_the_summary() {
    let (service, directory) = build_service().await;
    directory.fail_grant_for("R1").await;

    let result = service
        .sync_badges(request(Some("100"), &[], &["L1", "L2"]))
        .await;

    let Ok(summary) = result else {
        panic!("per-badge failures must not fail the request");
    };
    assert_eq!(summary.outcomes()[0].kind(), OutcomeKind::GrantFailed);
    assert_eq!(summary.outcomes()[1].kind(), OutcomeKind::Granted);
}

#[tokio::test]
async fn sync_badges_reports_listing_failure_as_unavailable() {
    let (service, directory) = build_service().await;
    directory.fail_listing().await;

    let result = service
        .sync_badges(request(None, &["alice"], &["L1"]))
        .await;

    assert!(matches!(result, Err(AppError::Unavailable(_))));
    assert!(directory.grant_calls().await.is_empty());
}
