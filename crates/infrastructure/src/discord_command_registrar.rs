use badgebridge_core::AppResult;
use reqwest::Method;
use serde_json::{Value, json};
use tracing::info;

use crate::DiscordRestClient;
use crate::discord_rest_client::status_error;

/// Name of the account linking slash command.
const LINK_ACCOUNT_COMMAND: &str = "link-account";
/// Discord application command option type for strings.
const STRING_OPTION_TYPE: u8 = 3;

/// Registers the bot's guild slash commands.
pub struct DiscordCommandRegistrar {
    rest: DiscordRestClient,
}

impl DiscordCommandRegistrar {
    /// Creates a registrar over the shared REST client.
    #[must_use]
    pub fn new(rest: DiscordRestClient) -> Self {
        Self { rest }
    }

    /// Replaces the guild command set with the bot's commands.
    pub async fn register_guild_commands(
        &self,
        application_id: &str,
        guild_id: &str,
    ) -> AppResult<()> {
        let path = format!("/applications/{application_id}/guilds/{guild_id}/commands");
        let commands = guild_commands();
        let response = self
            .rest
            .send("register commands", |rest| {
                rest.request(Method::PUT, path.as_str()).json(&commands)
            })
            .await?;

        if !response.status().is_success() {
            return Err(status_error("register commands", response).await);
        }

        info!(guild_id, command = LINK_ACCOUNT_COMMAND, "slash commands registered");
        Ok(())
    }
}

fn guild_commands() -> Value {
    json!([
        {
            "name": LINK_ACCOUNT_COMMAND,
            "description": "Link your Discord account to your platform account",
            "options": [
                {
                    "type": STRING_OPTION_TYPE,
                    "name": "code",
                    "description": "Verification code shown on the platform",
                    "required": true
                }
            ]
        }
    ])
}
