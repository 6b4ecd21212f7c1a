mod directory;
mod state_builder;

pub use directory::{CommandRegistration, DirectoryServices, build_directory_services};
pub use state_builder::build_app_state;

use std::time::Duration;

use badgebridge_core::AppError;

fn build_http_client(timeout: Duration) -> Result<reqwest::Client, AppError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))
}
