use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use badgebridge_core::AppError;
use badgebridge_domain::RoleMapping;
use tracing_subscriber::EnvFilter;
use url::Url;

const DEFAULT_DISCORD_API_BASE_URL: &str = "https://discord.com/api/v10";
const DEFAULT_BADGE_ROLE_MAPPING: &str = "L1=1410210518534197321";
const LOCAL_GUILD_ID: &str = "local";

#[derive(Debug, Clone)]
pub struct DiscordRuntimeConfig {
    pub bot_token: String,
    pub application_id: Option<String>,
    pub api_base_url: Url,
}

#[derive(Debug, Clone)]
pub enum DirectoryProviderConfig {
    Discord(DiscordRuntimeConfig),
    Memory,
}

impl DirectoryProviderConfig {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discord(_) => "discord",
            Self::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct VerificationRuntimeConfig {
    pub endpoint: Url,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub guild_id: String,
    pub directory_provider: DirectoryProviderConfig,
    pub directory_timeout: Duration,
    pub directory_max_attempts: u8,
    pub roster_ttl: Duration,
    pub badge_role_mapping: RoleMapping,
    pub verification: Option<VerificationRuntimeConfig>,
    pub discord_public_key: Option<String>,
    pub webhook_secret: Option<String>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &str| {
            optional(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };

        let api_host = optional("API_HOST").unwrap_or_else(|| "0.0.0.0".to_owned());
        let api_port = parse_or("PORT", optional("PORT"), 3000_u16)?;

        let directory_provider = match optional("DIRECTORY_PROVIDER")
            .unwrap_or_else(|| "discord".to_owned())
            .as_str()
        {
            "discord" => {
                let api_base_url = optional("DISCORD_API_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_DISCORD_API_BASE_URL.to_owned());
                DirectoryProviderConfig::Discord(DiscordRuntimeConfig {
                    bot_token: required("DISCORD_TOKEN")?,
                    application_id: optional("DISCORD_APPLICATION_ID"),
                    api_base_url: Url::parse(&api_base_url).map_err(|error| {
                        AppError::Validation(format!("invalid DISCORD_API_BASE_URL: {error}"))
                    })?,
                })
            }
            "memory" => DirectoryProviderConfig::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "DIRECTORY_PROVIDER must be either 'discord' or 'memory', got '{other}'"
                )));
            }
        };

        let guild_id = match directory_provider {
            DirectoryProviderConfig::Discord(_) => required("DISCORD_GUILD_ID")?,
            DirectoryProviderConfig::Memory => {
                optional("DISCORD_GUILD_ID").unwrap_or_else(|| LOCAL_GUILD_ID.to_owned())
            }
        };

        let directory_timeout = Duration::from_secs(parse_or(
            "DIRECTORY_TIMEOUT_SECONDS",
            optional("DIRECTORY_TIMEOUT_SECONDS"),
            10_u64,
        )?);
        if directory_timeout.is_zero() {
            return Err(AppError::Validation(
                "DIRECTORY_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        let directory_max_attempts = parse_or(
            "DIRECTORY_MAX_ATTEMPTS",
            optional("DIRECTORY_MAX_ATTEMPTS"),
            2_u8,
        )?
        .max(1);
        let roster_ttl = Duration::from_secs(parse_or(
            "ROSTER_CACHE_TTL_SECONDS",
            optional("ROSTER_CACHE_TTL_SECONDS"),
            300_u64,
        )?);

        let badge_role_mapping = RoleMapping::parse(
            optional("BADGE_ROLE_MAPPING")
                .as_deref()
                .unwrap_or(DEFAULT_BADGE_ROLE_MAPPING),
        )
        .map_err(|error| AppError::Validation(format!("invalid BADGE_ROLE_MAPPING: {error}")))?;

        let verification = optional("VERIFICATION_API_URL")
            .map(|endpoint| {
                Url::parse(&endpoint)
                    .map(|endpoint| VerificationRuntimeConfig {
                        endpoint,
                        api_key: optional("VERIFICATION_API_KEY"),
                    })
                    .map_err(|error| {
                        AppError::Validation(format!("invalid VERIFICATION_API_URL: {error}"))
                    })
            })
            .transpose()?;

        Ok(Self {
            api_host,
            api_port,
            guild_id,
            directory_provider,
            directory_timeout,
            directory_max_attempts,
            roster_ttl,
            badge_role_mapping,
            verification,
            discord_public_key: optional("DISCORD_PUBLIC_KEY"),
            webhook_secret: optional("WEBHOOK_SECRET"),
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_or<T>(name: &str, value: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}
