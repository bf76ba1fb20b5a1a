use axum::{
  extract::{Path, State, WebSocketUpgrade},
  http::Method,
  response::IntoResponse,
  routing::get,
  Json, Router,
};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

mod app;
mod game;
mod protocol;
mod transport;

use app::config::ServerConfig;
use app::room_name::sanitize_room_name;
use game::room::Room;

struct AppState {
  rooms: DashMap<String, Arc<Room>>,
}

#[derive(Debug, Serialize)]
struct OkResponse {
  ok: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = ServerConfig::from_env();
  let state = Arc::new(AppState {
    rooms: DashMap::new(),
  });

  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET])
    .allow_headers(Any);

  let app: Router = Router::new()
    .route("/api/health", get(health))
    .route("/api/room/:room", get(ws_handler))
    .layer(cors)
    .with_state(state);

  let address = config.socket_addr();
  tracing::info!("listening on {address}");

  let listener = tokio::net::TcpListener::bind(address).await?;
  axum::serve(listener, app).await?;

  Ok(())
}

impl AppState {
  fn room(&self, name: String) -> Arc<Room> {
    match self.rooms.entry(name) {
      dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
      dashmap::mapref::entry::Entry::Vacant(entry) => {
        tracing::info!(room = %entry.key(), "room created");
        let room = Arc::new(Room::new(entry.key().clone()));
        entry.insert(room.clone());
        room
      }
    }
  }
}

async fn health() -> impl IntoResponse {
  Json(OkResponse { ok: true })
}

async fn ws_handler(
  ws: WebSocketUpgrade,
  Path(room): Path<String>,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  let room = state.room(sanitize_room_name(&room));
  ws.on_upgrade(move |socket| transport::ws_session::handle_socket(socket, room))
}
