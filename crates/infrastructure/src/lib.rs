//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod discord_command_registrar;
mod discord_member_directory;
mod discord_rest_client;
mod http_verification_client;
mod in_memory_member_directory;
mod snapshot_cache;

#[cfg(test)]
mod fake_discord;

pub use discord_command_registrar::DiscordCommandRegistrar;
pub use discord_member_directory::{DiscordDirectoryConfig, DiscordMemberDirectory};
pub use discord_rest_client::{DiscordRestClient, DiscordRestConfig};
pub use http_verification_client::HttpVerificationClient;
pub use in_memory_member_directory::InMemoryMemberDirectory;
