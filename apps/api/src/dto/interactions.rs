//! Discord interaction wire types used by the `/interactions` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Interaction type sent by Discord to check the endpoint.
pub const INTERACTION_PING: u8 = 1;
/// Interaction type for slash-command invocations.
pub const INTERACTION_APPLICATION_COMMAND: u8 = 2;

const RESPONSE_PONG: u8 = 1;
const RESPONSE_CHANNEL_MESSAGE: u8 = 4;
const MESSAGE_FLAG_EPHEMERAL: u64 = 1 << 6;

#[derive(Debug, Deserialize)]
pub struct InteractionRequest {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub member: Option<InteractionMember>,
    #[serde(default)]
    pub user: Option<InteractionUser>,
}

impl InteractionRequest {
    /// Returns the invoking user, from the guild member in guilds or the user in DMs.
    pub fn invoking_user(&self) -> Option<&InteractionUser> {
        self.member
            .as_ref()
            .and_then(|member| member.user.as_ref())
            .or(self.user.as_ref())
    }
}

#[derive(Debug, Deserialize)]
pub struct InteractionData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<InteractionOption>,
}

impl InteractionData {
    /// Returns a string option value by name.
    pub fn string_option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|option| option.name == name)
            .and_then(|option| option.value.as_ref())
            .and_then(Value::as_str)
    }
}

#[derive(Debug, Deserialize)]
pub struct InteractionOption {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct InteractionMember {
    #[serde(default)]
    pub user: Option<InteractionUser>,
}

#[derive(Debug, Deserialize)]
pub struct InteractionUser {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<InteractionResponseData>,
}

#[derive(Debug, Serialize)]
pub struct InteractionResponseData {
    pub content: String,
    pub flags: u64,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: RESPONSE_PONG,
            data: None,
        }
    }

    /// Message visible only to the invoking user.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            kind: RESPONSE_CHANNEL_MESSAGE,
            data: Some(InteractionResponseData {
                content: content.into(),
                flags: MESSAGE_FLAG_EPHEMERAL,
            }),
        }
    }
}
