use std::path::Path;

use api::state::AppState;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use shared::models::game::Game;
use tokio::net::TcpListener;

pub const JWT_SECRET: &str = "test-secret-key";

pub fn halo() -> Game {
    Game::new("Halo Infinite", "Master Chief returns", "halo-infinite")
        .with_image_url("https://example.com/halo.jpg")
}

pub fn zelda() -> Game {
    Game::new("Zelda", "Breath of the Wild", "zelda")
}

pub fn seeded_state() -> AppState {
    AppState::in_memory(vec![halo(), zelda()], JWT_SECRET)
}

/// Router over seeded in-memory state, serving static files from `static_dir`.
pub fn test_app(static_dir: &Path) -> Router {
    api::create_app(seeded_state(), static_dir)
}

/// Registers `username` directly against the state and returns its bearer token.
pub async fn token_for(state: &AppState, username: &str) -> String {
    use shared::services::auth_service::AuthServiceTrait;

    state
        .auth_service
        .register_user(username, "password123")
        .await
        .unwrap()
        .token
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
