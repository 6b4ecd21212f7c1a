//! Local stand-in for the Discord REST API used by adapter tests.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use crate::{DiscordRestClient, DiscordRestConfig};

pub(crate) const GUILD_ID: &str = "111";
pub(crate) const GUILD_NAME: &str = "Fake Guild";
const API_PREFIX: &str = "/api/v10";

#[derive(Debug, Clone)]
pub(crate) struct FakeMember {
    pub(crate) id: u64,
    pub(crate) username: String,
    pub(crate) roles: Vec<String>,
}

impl FakeMember {
    pub(crate) fn new(id: u64, username: &str) -> Self {
        Self {
            id,
            username: username.to_owned(),
            roles: Vec::new(),
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "user": {
                "id": self.id.to_string(),
                "username": self.username,
                "global_name": null,
                "discriminator": "0"
            },
            "nick": null,
            "roles": self.roles
        })
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeDiscordState {
    pub(crate) members: Vec<FakeMember>,
    pub(crate) roles: Vec<String>,
    pub(crate) forbidden_roles: Vec<String>,
    pub(crate) rate_limited_responses: usize,
    pub(crate) requests: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageQuery {
    limit: Option<usize>,
    after: Option<u64>,
}

type SharedState = Arc<Mutex<FakeDiscordState>>;

pub(crate) struct FakeDiscord {
    base_url: String,
    pub(crate) state: SharedState,
}

impl FakeDiscord {
    /// Serves the fake API on an ephemeral local port.
    pub(crate) async fn start(state: FakeDiscordState) -> Self {
        let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
            panic!("fake discord listener should bind");
        };
        let Ok(address) = listener.local_addr() else {
            panic!("fake discord listener should have an address");
        };

        let state = Arc::new(Mutex::new(state));
        let router = Router::new()
            .fallback(handle_request)
            .with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Self {
            base_url: format!("http://{address}{API_PREFIX}"),
            state,
        }
    }

    pub(crate) fn rest_client(&self, max_attempts: u8) -> DiscordRestClient {
        DiscordRestClient::new(
            reqwest::Client::new(),
            DiscordRestConfig {
                api_base_url: self.base_url.clone(),
                bot_token: "test-token".to_owned(),
                max_attempts,
            },
        )
    }

    pub(crate) async fn requests(&self) -> Vec<String> {
        self.state.lock().await.requests.clone()
    }

    pub(crate) async fn member_roles(&self, member_id: u64) -> Vec<String> {
        self.state
            .lock()
            .await
            .members
            .iter()
            .find(|member| member.id == member_id)
            .map(|member| member.roles.clone())
            .unwrap_or_default()
    }
}

async fn handle_request(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    Query(page): Query<PageQuery>,
) -> Response {
    let mut state = state.lock().await;
    state.requests.push(format!("{method} {uri}"));

    if state.rate_limited_responses > 0 {
        state.rate_limited_responses -= 1;
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({"message": "You are being rate limited.", "retry_after": 0.01, "global": false})),
        )
            .into_response();
    }

    let path = uri.path().strip_prefix(API_PREFIX).unwrap_or_default();
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let is_get = method == Method::GET;

    match segments.as_slice() {
        ["guilds", guild] if is_get && *guild == GUILD_ID => {
            Json(json!({"id": GUILD_ID, "name": GUILD_NAME})).into_response()
        }
        ["guilds", guild, "members"] if is_get && *guild == GUILD_ID => {
            let after = page.after.unwrap_or(0);
            let limit = page.limit.unwrap_or(1);
            let mut members: Vec<&FakeMember> = state
                .members
                .iter()
                .filter(|member| member.id > after)
                .collect();
            members.sort_by_key(|member| member.id);
            let page: Vec<Value> = members
                .into_iter()
                .take(limit)
                .map(FakeMember::to_json)
                .collect();
            Json(Value::Array(page)).into_response()
        }
        ["guilds", guild, "members", member_id] if is_get && *guild == GUILD_ID => {
            match state
                .members
                .iter()
                .find(|member| member.id.to_string() == *member_id)
            {
                Some(member) => Json(member.to_json()).into_response(),
                None => unknown("Unknown Member", 10007),
            }
        }
        ["guilds", guild, "roles"] if is_get && *guild == GUILD_ID => {
            let roles: Vec<Value> = state
                .roles
                .iter()
                .map(|role| json!({"id": role, "name": format!("role {role}")}))
                .collect();
            Json(Value::Array(roles)).into_response()
        }
        ["guilds", guild, "members", member_id, "roles", role_id]
            if method == Method::PUT && *guild == GUILD_ID =>
        {
            let role_id = (*role_id).to_owned();
            if state.forbidden_roles.contains(&role_id) {
                return (
                    StatusCode::FORBIDDEN,
                    Json(json!({"message": "Missing Permissions", "code": 50013})),
                )
                    .into_response();
            }
            if !state.roles.contains(&role_id) {
                return unknown("Unknown Role", 10011);
            }
            match state
                .members
                .iter_mut()
                .find(|member| member.id.to_string() == *member_id)
            {
                Some(member) => {
                    if !member.roles.contains(&role_id) {
                        member.roles.push(role_id);
                    }
                    StatusCode::NO_CONTENT.into_response()
                }
                None => unknown("Unknown Member", 10007),
            }
        }
        _ => unknown("Unknown Guild", 10004),
    }
}

fn unknown(message: &str, code: u32) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": message, "code": code})),
    )
        .into_response()
}
