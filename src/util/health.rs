//! Liveness endpoint for hosting platforms
//!
//! Runs beside the polling loop and shares no state with it.

use std::net::SocketAddr;

use anyhow::Result;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{error, info};

pub const SERVICE_NAME: &str = "ema5-trading-bot";

pub fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}

async fn index() -> &'static str {
    "EMA5 Trading Alert Bot is running!"
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}

pub async fn serve(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Health endpoint listening on http://{}", addr);
    axum::serve(listener, router()).await?;
    Ok(())
}

/// Starts the server in the background. Failures are logged only.
///
/// Only called when `PORT` is set; there is no default port.
pub fn spawn(port: u16) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = serve(port).await {
            error!(port, error = %e, "Health endpoint stopped");
        }
    })
}


#[cfg(test)]
mod tests {
    use super::testing::serve_local;
    use super::*;

    #[tokio::test]
    async fn test_health_payload() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "ema5-trading-bot");
    }

    #[tokio::test]
    async fn test_served_over_tcp() {
        let addr = serve_local(router()).await;

        let body: Value = reqwest::get(format!("http://{}/health", addr))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "healthy");

        let text = reqwest::get(format!("http://{}/", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(text, "EMA5 Trading Alert Bot is running!");
    }
}
