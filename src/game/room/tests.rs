use super::*;
use crate::game::constants::{COLOR_POOL, GRID_SIZE};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver};

fn seeded_room() -> Arc<Room> {
  Arc::new(Room::with_world("test", World::with_rng(StdRng::seed_from_u64(42))))
}

async fn connect(room: &Arc<Room>) -> (String, UnboundedReceiver<String>) {
  let (tx, rx) = mpsc::unbounded_channel::<String>();
  let session_id = room.add_session(tx).await;
  (session_id, rx)
}

fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<Value> {
  let mut messages = Vec::new();
  while let Ok(payload) = rx.try_recv() {
    messages.push(serde_json::from_str(&payload).expect("valid json"));
  }
  messages
}

fn of_type<'a>(messages: &'a [Value], kind: &str) -> Vec<&'a Value> {
  messages.iter().filter(|message| message["type"] == kind).collect()
}

async fn send(room: &Arc<Room>, session_id: &str, text: &str) {
  room.handle_text_message(session_id, text).await;
}

async fn start_duel(room: &Arc<Room>) -> ((String, UnboundedReceiver<String>), (String, UnboundedReceiver<String>)) {
  let (a, rx_a) = connect(room).await;
  let (b, rx_b) = connect(room).await;
  send(room, &a, &format!(r#"{{"type":"joinWithColor","color":"{}"}}"#, COLOR_POOL[0])).await;
  send(room, &b, &format!(r#"{{"type":"joinWithColor","color":"{}"}}"#, COLOR_POOL[1])).await;
  send(room, &a, r#"{"type":"ready"}"#).await;
  send(room, &b, r#"{"type":"ready"}"#).await;
  ((a, rx_a), (b, rx_b))
}

#[tokio::test]
async fn new_session_receives_grid_announcement() {
  let room = seeded_room();
  let (session_id, mut rx) = connect(&room).await;

  let messages = drain(&mut rx);
  let init = of_type(&messages, "init");
  assert_eq!(init.len(), 1);
  assert_eq!(init[0]["playerId"], session_id.as_str());
  assert_eq!(init[0]["gridSize"], GRID_SIZE);
  assert_eq!(init[0]["availableColors"].as_array().map(Vec::len), Some(COLOR_POOL.len()));
  assert_eq!(init[0]["portals"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn joining_broadcasts_lobby_and_claims_color() {
  let room = seeded_room();
  let (a, mut rx_a) = connect(&room).await;
  let (b, mut rx_b) = connect(&room).await;
  drain(&mut rx_a);
  drain(&mut rx_b);

  let join = format!(r#"{{"type":"joinWithColor","color":"{}"}}"#, COLOR_POOL[2]);
  send(&room, &a, &join).await;
  send(&room, &b, &join).await;

  let messages = drain(&mut rx_b);
  let lobby = of_type(&messages, "lobby");
  assert_eq!(lobby.len(), 1, "second claim of the same color is ignored");
  assert_eq!(lobby[0]["players"][0]["color"], COLOR_POOL[2]);
  let available = lobby[0]["availableColors"].as_array().expect("colors");
  assert!(!available.iter().any(|color| color == COLOR_POOL[2]));
}

#[tokio::test]
async fn all_ready_players_start_a_round_and_ticker() {
  let room = seeded_room();
  let ((_a, mut rx_a), (_b, _rx_b)) = start_duel(&room).await;

  let messages = drain(&mut rx_a);
  assert_eq!(of_type(&messages, "gameStarted").len(), 1);
  let state = of_type(&messages, "state");
  assert_eq!(state.last().expect("state")["snakes"].as_array().map(Vec::len), Some(2));
  assert_eq!(room.ticker_round().await, Some(1));
}

#[tokio::test]
async fn restart_returns_everyone_to_lobby_and_stops_ticker() {
  let room = seeded_room();
  let ((a, _rx_a), (_b, mut rx_b)) = start_duel(&room).await;
  drain(&mut rx_b);

  send(&room, &a, r#"{"type":"restart"}"#).await;

  let messages = drain(&mut rx_b);
  assert_eq!(of_type(&messages, "returnToLobby").len(), 1);
  let lobby = of_type(&messages, "lobby");
  assert_eq!(lobby.last().expect("lobby")["players"][0]["color"], COLOR_POOL[0]);
  assert_eq!(room.ticker_round().await, None);
  assert!(!room.with_world_mut(|world| world.is_running()).await);
}

#[tokio::test]
async fn disconnect_mid_game_crowns_the_survivor() {
  let room = seeded_room();
  let ((a, _rx_a), (_b, mut rx_b)) = start_duel(&room).await;
  drain(&mut rx_b);

  room.remove_session(&a).await;

  let messages = drain(&mut rx_b);
  let over = of_type(&messages, "gameOver");
  assert_eq!(over.len(), 1);
  assert_eq!(over[0]["winner"], COLOR_POOL[1]);
  assert_eq!(room.ticker_round().await, None);
}

#[tokio::test]
async fn fire_is_broadcast_immediately() {
  let room = seeded_room();
  let ((a, mut rx_a), (_b, _rx_b)) = start_duel(&room).await;
  drain(&mut rx_a);
  room
    .with_world_mut(|world| {
      if let Some(snake) = world.snake_mut(&a) {
        snake.has_bullet = true;
      }
    })
    .await;

  send(&room, &a, r#"{"type":"fire"}"#).await;

  let messages = drain(&mut rx_a);
  let fired = of_type(&messages, "state").into_iter().any(|state| {
    state["snakes"]
      .as_array()
      .and_then(|snakes| snakes.iter().find(|snake| snake["color"] == COLOR_POOL[0]))
      .map_or(false, |shooter| shooter["firingBullet"] == true && shooter["hasBullet"] == false)
  });
  assert!(fired, "fire must produce a snapshot without waiting for a tick");
}

#[tokio::test]
async fn malformed_and_unknown_session_messages_are_ignored() {
  let room = seeded_room();
  let (a, mut rx_a) = connect(&room).await;
  drain(&mut rx_a);

  send(&room, &a, "{not json").await;
  send(&room, "ghost", r#"{"type":"ready"}"#).await;

  assert!(drain(&mut rx_a).is_empty());
}
