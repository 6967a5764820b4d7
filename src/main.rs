use std::sync::Arc;

use dotenvy::dotenv;
use token_relay::{
    auth::ShopifyAuth,
    config::EnvConfig,
    server::{self, AppState, AUTH_CALLBACK_PATH},
    storage::MemorySessionStorage,
    telemetry,
};
use tracing::error;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenv().ok();
    telemetry::init_tracing();

    let env = match EnvConfig::from_env() {
        Ok(env) => env,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return std::process::ExitCode::FAILURE;
        }
    };
    env.log_summary();

    let state = AppState::new(
        Arc::new(ShopifyAuth::new(env.clone(), AUTH_CALLBACK_PATH)),
        Arc::new(MemorySessionStorage::new()),
        env.app_name.clone(),
    )
    .with_token_lookup(env.token_lookup_enabled);

    if let Err(e) = server::serve(state, env.port).await {
        error!(error = %e, "Server error");
        return std::process::ExitCode::FAILURE;
    }

    std::process::ExitCode::SUCCESS
}
