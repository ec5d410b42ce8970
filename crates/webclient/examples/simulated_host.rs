//! A publish session against an in-process host
//!
//! Run with
//!
//! ```not_rust
//! RUST_LOG=debug cargo run --example simulated_host
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use teleos_webclient::{HostWindow, MessageEvent, PublishQuery, Settings, WebClient, BASE_ORIGIN};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Window whose posted messages are forwarded to the host task
struct LoopbackWindow {
    to_host: mpsc::UnboundedSender<String>,
}

impl HostWindow for LoopbackWindow {
    fn post_message(&self, message: &str, _target_origin: &str) {
        let _ = self.to_host.send(message.to_owned());
    }

    fn location_search(&self) -> String {
        "?mode=publish".to_owned()
    }

    fn document_height(&self) -> u64 {
        720
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teleos_webclient=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let (to_host, mut host_inbox) = mpsc::unbounded_channel();
    let settings = Settings::new("demoApp", "demo-token")
        .debug(|message, meta| tracing::info!(?meta, "client: {message}"));
    let client = Arc::new(WebClient::publisher(
        settings,
        Arc::new(LoopbackWindow { to_host }),
    ));

    let host_client = client.clone();
    tokio::spawn(async move {
        while let Some(message) = host_inbox.recv().await {
            let message: Value = serde_json::from_str(&message).unwrap();
            tracing::info!(name = %message["name"], "host: received");

            let reply = match message["name"].as_str() {
                Some("appReady") => json!({
                    "message": "readyReceived",
                    "body": { "appId": "demoApp", "clientId": "demo-client", "jwt": "ready.jwt.token" },
                }),
                Some("publish") => {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    json!({
                        "message": "publishEntrySuccess",
                        "body": {
                            "appId": "demoApp",
                            "clientId": "demo-client",
                            "jwt": "publish.jwt.token",
                            "url": message["body"]["url"],
                            "entryId": "entry-42",
                        },
                    })
                }
                _ => continue,
            };

            let mut data = reply;
            data["source"] = json!("teleosHost");
            data["appId"] = json!("demoApp");
            host_client.handle_message(&MessageEvent::new(BASE_ORIGIN, data.to_string()));
        }
    });

    client
        .on_ready(|ticket| tracing::info!(client_id = %ticket.client_id, "app is ready"))
        .unwrap();

    client.show_loading();
    match client
        .publish(PublishQuery::new("https://example.com/article"))
        .unwrap()
        .await
    {
        Ok(response) => tracing::info!(entry_id = %response.entry_id, "published"),
        Err(e) => tracing::error!("publish failed: {e}"),
    }
    client.hide_loading();
    client.complete();
}
