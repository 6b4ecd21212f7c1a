use std::sync::Arc;

use badgebridge_application::MemberDirectory;
use badgebridge_core::AppError;
use badgebridge_infrastructure::{
    DiscordCommandRegistrar, DiscordDirectoryConfig, DiscordMemberDirectory, DiscordRestClient,
    DiscordRestConfig,
};
use tracing::{info, warn};

use crate::api_config::{ApiConfig, DirectoryProviderConfig};
use crate::dev_seed;

use super::build_http_client;

/// Slash-command registration to run once the server is up.
pub struct CommandRegistration {
    registrar: DiscordCommandRegistrar,
    application_id: String,
    guild_id: String,
}

impl CommandRegistration {
    /// Registers the guild commands; failures are logged, never returned.
    pub async fn run(self) {
        if let Err(error) = self
            .registrar
            .register_guild_commands(&self.application_id, &self.guild_id)
            .await
        {
            warn!(
                guild_id = %self.guild_id,
                error = %error,
                "slash command registration failed"
            );
        }
    }
}

pub struct DirectoryServices {
    pub directory: Arc<dyn MemberDirectory>,
    pub command_registration: Option<CommandRegistration>,
}

pub fn build_directory_services(config: &ApiConfig) -> Result<DirectoryServices, AppError> {
    match &config.directory_provider {
        DirectoryProviderConfig::Discord(discord) => {
            let rest = DiscordRestClient::new(
                build_http_client(config.directory_timeout)?,
                DiscordRestConfig {
                    api_base_url: discord.api_base_url.as_str().to_owned(),
                    bot_token: discord.bot_token.clone(),
                    max_attempts: config.directory_max_attempts,
                },
            );

            let command_registration =
                discord
                    .application_id
                    .clone()
                    .map(|application_id| CommandRegistration {
                        registrar: DiscordCommandRegistrar::new(rest.clone()),
                        application_id,
                        guild_id: config.guild_id.clone(),
                    });
            if command_registration.is_none() {
                info!("DISCORD_APPLICATION_ID not set; skipping slash command registration");
            }

            let directory = DiscordMemberDirectory::new(
                rest,
                DiscordDirectoryConfig {
                    guild_id: config.guild_id.clone(),
                    roster_ttl: config.roster_ttl,
                },
            );

            Ok(DirectoryServices {
                directory: Arc::new(directory),
                command_registration,
            })
        }
        DirectoryProviderConfig::Memory => {
            warn!("using the in-memory member directory; roles are not granted on Discord");
            Ok(DirectoryServices {
                directory: Arc::new(dev_seed::seeded_directory(&config.badge_role_mapping)),
                command_registration: None,
            })
        }
    }
}
