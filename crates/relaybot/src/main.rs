use std::sync::Arc;

use relaybot_core::config::Config;

mod health;

#[tokio::main]
async fn main() -> Result<(), relaybot_core::Error> {
    relaybot_core::logging::init("relaybot")?;

    let cfg = Arc::new(Config::load()?);

    // Liveness probe runs independently of the bot and never touches the registry.
    let port = cfg.health_port;
    tokio::spawn(async move {
        if let Err(e) = health::serve(port).await {
            tracing::error!("health endpoint failed: {e}");
        }
    });

    relaybot_telegram::router::run_polling(cfg)
        .await
        .map_err(|e| relaybot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
