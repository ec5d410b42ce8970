//! Accept entries published from the Teleos host
//!
//! Run with
//!
//! ```not_rust
//! cargo run --example axum
//! ```
//!
//! Then post the token handed out by the web client:
//!
//! ```not_rust
//! curl -X POST -H "Authorization: Bearer $TOKEN" http://127.0.0.1:4000/entries
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
    routing::post,
    Extension, Router,
};
use teleos_gateway::{Error, PublishToken, Verifier};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone)]
struct AppState {
    verifier: Arc<Verifier>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let verifier = Verifier::teleos().expect("embedded issuer key should parse");
    let state = AppState {
        verifier: Arc::new(verifier),
    };

    let app = Router::new()
        .route("/entries", post(publish))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            publish_token_middleware,
        ))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:4000")
        .await
        .unwrap();
    tracing::debug!("listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.unwrap();
}

async fn publish_token_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let auth_str = auth_header.to_str().map_err(|_| StatusCode::BAD_REQUEST)?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::BAD_REQUEST)?;

    tracing::debug!("Verifying publish token");

    let publish = state
        .verifier
        .verify_publish_token(token, None)
        .map_err(|e| {
            tracing::warn!("Publish token rejected: {e}");
            status_for(&e)
        })?;

    request.extensions_mut().insert(publish);

    Ok(next.run(request).await)
}

fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::InvalidJwt | Error::TokenTooLarge { .. } => StatusCode::BAD_REQUEST,
        Error::KeyInvalid(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNAUTHORIZED,
    }
}

async fn publish(Extension(publish): Extension<PublishToken>) -> String {
    tracing::info!(
        app_id = %publish.app_id,
        client_id = %publish.client_id,
        "Accepted entry"
    );

    format!(
        "Entry accepted for {} (token valid until {})",
        publish.client_id, publish.expiration_at
    )
}
