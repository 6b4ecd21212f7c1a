mod badges;
mod health;
mod interactions;

pub use badges::{BadgeObtainedRequest, SyncResponse};
pub use health::{HealthResponse, StatusResponse};
pub use interactions::{
    INTERACTION_APPLICATION_COMMAND, INTERACTION_PING, InteractionRequest, InteractionResponse,
};
