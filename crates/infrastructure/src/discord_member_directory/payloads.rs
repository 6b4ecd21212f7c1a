use badgebridge_domain::{Member, MemberId, RoleId};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct DiscordGuildPayload {
    pub(super) id: String,
    pub(super) name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct DiscordRolePayload {
    pub(super) id: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct DiscordUserPayload {
    id: String,
    username: String,
    #[serde(default)]
    global_name: Option<String>,
    #[serde(default)]
    discriminator: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DiscordMemberPayload {
    #[serde(default)]
    user: Option<DiscordUserPayload>,
    #[serde(default)]
    nick: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

impl DiscordMemberPayload {
    pub(super) fn user_id(&self) -> Option<String> {
        self.user.as_ref().map(|user| user.id.clone())
    }

    /// Converts the guild member object. Members without a user object are skipped.
    pub(super) fn into_member(self) -> Option<Member> {
        let user = self.user?;
        let member_id = MemberId::new(user.id).ok()?;

        // Display name precedence follows the client: guild nick, global name, username.
        let display_name = self
            .nick
            .clone()
            .or_else(|| user.global_name.clone())
            .unwrap_or_else(|| user.username.clone());
        let legacy_tag = user
            .discriminator
            .filter(|discriminator| !discriminator.is_empty() && discriminator != "0")
            .map(|discriminator| format!("{}#{discriminator}", user.username));
        let roles = self
            .roles
            .into_iter()
            .filter_map(|role_id| RoleId::new(role_id).ok());

        Some(
            Member::new(member_id, user.username, display_name)
                .with_global_name(user.global_name)
                .with_legacy_tag(legacy_tag)
                .with_roles(roles),
        )
    }
}
