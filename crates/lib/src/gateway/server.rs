//! Gateway HTTP server: receives Telegram webhook updates and runs the bridge pipeline.
//!
//! The webhook handler is the single suppression point: every pipeline error
//! is logged and the caller still receives the success acknowledgment, so
//! Telegram does not retry the update.

use crate::channels::{TelegramClient, TelegramError, TelegramUpdate};
use crate::config::{self, Config};
use crate::llm::{ModelVariant, OpenAiClient, OpenAiError};
use crate::transform;
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

/// Failure of one webhook invocation. Every variant is logged and suppressed
/// at the handler; none reaches the inbound caller.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),
    #[error("attachment resolution failed: {0}")]
    Resolution(TelegramError),
    #[error("completion request failed: {0}")]
    Completion(#[from] OpenAiError),
    #[error("reply delivery failed: {0}")]
    Delivery(TelegramError),
}

#[derive(Clone)]
struct GatewayState {
    config: Config,
}

/// Run the webhook gateway until SIGINT/SIGTERM.
pub async fn run_gateway(config: Config) -> Result<()> {
    let bind = config.gateway.bind.clone();
    let port = config.gateway.port;
    let state = GatewayState { config };

    let app = Router::new()
        .route("/", get(health_http))
        .route("/telegram/webhook", post(telegram_webhook))
        .with_state(state);

    let bind_addr = format!("{}:{}", bind, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<serde_json::Value> {
    Json(json!({
        "runtime": "running",
        "port": state.config.gateway.port,
    }))
}

/// Fixed acknowledgment toward Telegram. Always success, even on internal
/// failure, so the platform does not retry the update.
fn ack() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

/// POST /telegram/webhook — parse the update, run the pipeline, acknowledge.
async fn telegram_webhook(
    State(state): State<GatewayState>,
    body: Bytes,
) -> Json<serde_json::Value> {
    let update: TelegramUpdate = match serde_json::from_slice(&body) {
        Ok(u) => u,
        Err(e) => {
            log::warn!("webhook: unparseable update payload: {}", e);
            return ack();
        }
    };
    if let Err(e) = handle_update(&state.config, update).await {
        log::error!("webhook: {}", e);
    }
    ack()
}

/// One inbound-update lifecycle: detect image, select the model variant,
/// normalize the message, request a completion, reply into the chat.
/// An update without a message is a no-op. Nothing survives the invocation;
/// clients are constructed fresh and the three outbound calls run in order.
pub async fn handle_update(config: &Config, update: TelegramUpdate) -> Result<(), BridgeError> {
    let Some(message) = update.message else {
        log::debug!("update {} has no message, ignoring", update.update_id);
        return Ok(());
    };

    let token = config::resolve_telegram_token(config)
        .ok_or(BridgeError::MissingConfig("telegram bot token"))?;
    let api_key = config::resolve_openai_api_key(config)
        .ok_or(BridgeError::MissingConfig("openai api key"))?;

    let telegram = TelegramClient::new(token, config::resolve_telegram_api_base(config));
    let openai = OpenAiClient::new(api_key, config::resolve_openai_api_base(config));

    let chat_id = message.chat.id;
    let message_id = message.message_id;

    let has_image = transform::has_image_attachment(&message);
    let model = ModelVariant::select(has_image);
    log::info!(
        "processing message {} in chat {} (image: {}, model: {})",
        message_id,
        chat_id,
        has_image,
        model.as_str()
    );

    let turn = transform::message_to_chat(&message, &telegram, has_image)
        .await
        .map_err(BridgeError::Resolution)?;

    let reply = openai.generate(vec![turn], model).await?;

    telegram
        .send_message(chat_id, &reply, Some(message_id))
        .await
        .map_err(BridgeError::Delivery)?;
    Ok(())
}
