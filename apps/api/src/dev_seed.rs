use badgebridge_domain::{Member, MemberId, RoleMapping};
use badgebridge_infrastructure::InMemoryMemberDirectory;
use tracing::info;

const DEV_SEED_MEMBER_ID: &str = "100000000000000001";
const DEV_SEED_USERNAME: &str = "demo-member";
const DEV_SEED_DISPLAY_NAME: &str = "Demo Member";

/// Builds a local directory with one member and every mapped role.
pub fn seeded_directory(mapping: &RoleMapping) -> InMemoryMemberDirectory {
    let members = MemberId::new(DEV_SEED_MEMBER_ID)
        .map(|member_id| {
            Member::new(member_id, DEV_SEED_USERNAME, DEV_SEED_DISPLAY_NAME)
                .with_global_name(Some(DEV_SEED_DISPLAY_NAME.to_owned()))
        })
        .into_iter()
        .collect::<Vec<_>>();
    let roles = mapping
        .badge_codes()
        .filter_map(|badge| mapping.lookup(badge))
        .cloned()
        .collect::<Vec<_>>();

    info!(
        member_id = DEV_SEED_MEMBER_ID,
        username = DEV_SEED_USERNAME,
        role_count = roles.len(),
        "seeded in-memory directory"
    );

    InMemoryMemberDirectory::new(members, roles)
}

#[cfg(test)]
mod tests {
    use badgebridge_application::MemberDirectory;
    use badgebridge_domain::{BadgeCode, RoleMapping};

    use super::{DEV_SEED_MEMBER_ID, seeded_directory};

    #[tokio::test]
    async fn seeded_directory_knows_every_mapped_role() {
        let mapping = RoleMapping::parse("L1=10,L2=20").unwrap_or_default();
        let directory = seeded_directory(&mapping);

        for badge in ["L1", "L2"] {
            let Some(role) = mapping.lookup(&BadgeCode::from(badge)) else {
                panic!("{badge} should be mapped");
            };
            assert!(directory.role_exists(role).await.unwrap_or(false));
        }
        assert!(directory.member(DEV_SEED_MEMBER_ID).await.is_some());
    }
}
