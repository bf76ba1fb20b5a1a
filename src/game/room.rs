use super::constants::GAME_TICK_RATE_MS;
use super::world::World;
use crate::app::time::now_millis;
use crate::protocol::{self, ClientMessage, ServerMessage};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use uuid::Uuid;

#[cfg(test)]
mod tests;

#[derive(Debug)]
pub struct Room {
  name: String,
  state: Mutex<RoomState>,
}

#[derive(Debug)]
struct SessionEntry {
  sender: UnboundedSender<String>,
}

#[derive(Debug)]
struct Ticker {
  round: u64,
  handle: AbortHandle,
}

#[derive(Debug)]
struct RoomState {
  sessions: HashMap<String, SessionEntry>,
  world: World,
  ticker: Option<Ticker>,
}

/// Maps interval deadlines onto wall-clock millis so consecutive ticks are
/// exactly one period apart regardless of scheduler jitter.
struct TickClock {
  origin: Instant,
  origin_millis: i64,
}

impl TickClock {
  fn start() -> Self {
    Self {
      origin: Instant::now(),
      origin_millis: now_millis(),
    }
  }

  fn at(&self, deadline: Instant) -> i64 {
    self.origin_millis + deadline.saturating_duration_since(self.origin).as_millis() as i64
  }
}

impl Room {
  pub fn new(name: impl Into<String>) -> Self {
    Self::with_world(name, World::new())
  }

  pub fn with_world(name: impl Into<String>, mut world: World) -> Self {
    // Nobody is connected yet; the init message carries the portals.
    world.drain_events();
    Self {
      name: name.into(),
      state: Mutex::new(RoomState {
        sessions: HashMap::new(),
        world,
        ticker: None,
      }),
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub async fn add_session(&self, sender: UnboundedSender<String>) -> String {
    let session_id = Uuid::new_v4().to_string();
    let mut state = self.state.lock().await;
    let init = state.world.init_message(&session_id);
    state.sessions.insert(session_id.clone(), SessionEntry { sender });
    state.send_to(&session_id, &init);
    if state.world.is_running() {
      let snapshot = state.world.state_message();
      state.send_to(&session_id, &snapshot);
    }
    state.flush();
    tracing::debug!(room = %self.name, session_id, "session added");
    session_id
  }

  pub async fn remove_session(self: &Arc<Self>, session_id: &str) {
    let mut state = self.state.lock().await;
    state.sessions.remove(session_id);
    state.world.disconnect(session_id);
    state.flush();
    self.sync_ticker(&mut state);
    tracing::debug!(room = %self.name, session_id, "session removed");
  }

  pub async fn handle_text_message(self: &Arc<Self>, session_id: &str, text: &str) {
    let Some(message) = protocol::decode_client_message(text) else {
      tracing::debug!(room = %self.name, session_id, "malformed message dropped");
      return;
    };
    self.handle_client_message(session_id, message).await;
  }

  pub async fn handle_client_message(self: &Arc<Self>, session_id: &str, message: ClientMessage) {
    let mut state = self.state.lock().await;
    if !state.sessions.contains_key(session_id) {
      return;
    }
    match message {
      ClientMessage::JoinWithColor { color } => {
        state.world.join_with_color(session_id, &color);
      }
      ClientMessage::Ready => {
        if state.world.ready(session_id, now_millis()) {
          tracing::info!(room = %self.name, round = state.world.round(), "round started");
        }
      }
      ClientMessage::Restart => {
        state.world.restart(session_id);
      }
      ClientMessage::Direction { direction } => {
        state.world.queue_direction(session_id, direction);
      }
      ClientMessage::Fire => {
        state.world.fire(session_id);
      }
    }
    state.flush();
    self.sync_ticker(&mut state);
  }

  /// Keeps exactly one tick task alive per running round. Any change of round
  /// aborts the previous task before installing a new one.
  fn sync_ticker(self: &Arc<Self>, state: &mut RoomState) {
    let wanted = state.world.is_running().then(|| state.world.round());
    let current = state.ticker.as_ref().map(|ticker| ticker.round);
    match (current, wanted) {
      (Some(current), Some(round)) if current == round => {}
      (_, Some(round)) => {
        if let Some(old) = state.ticker.take() {
          old.handle.abort();
        }
        state.ticker = Some(Ticker {
          round,
          handle: self.spawn_ticker(round),
        });
      }
      (Some(_), None) => {
        if let Some(old) = state.ticker.take() {
          old.handle.abort();
        }
      }
      (None, None) => {}
    }
  }

  fn spawn_ticker(self: &Arc<Self>, round: u64) -> AbortHandle {
    let room = Arc::clone(self);
    let task = tokio::spawn(async move {
      let mut interval = tokio::time::interval(Duration::from_millis(GAME_TICK_RATE_MS));
      let clock = TickClock::start();
      // The first tick completes immediately.
      interval.tick().await;
      loop {
        let deadline = interval.tick().await;
        let mut state = room.state.lock().await;
        if !state.world.is_running() || state.world.round() != round {
          break;
        }
        state.world.tick(clock.at(deadline));
        state.flush();
        if !state.world.is_running() {
          state.ticker = None;
          break;
        }
      }
    });
    task.abort_handle()
  }

  #[cfg(test)]
  async fn with_world_mut<T>(&self, f: impl FnOnce(&mut World) -> T) -> T {
    let mut state = self.state.lock().await;
    f(&mut state.world)
  }

  #[cfg(test)]
  async fn ticker_round(&self) -> Option<u64> {
    self.state.lock().await.ticker.as_ref().map(|ticker| ticker.round)
  }
}

impl RoomState {
  fn send_to(&mut self, session_id: &str, message: &ServerMessage) {
    let Some(payload) = encode(message) else { return };
    let Some(session) = self.sessions.get(session_id) else { return };
    if session.sender.send(payload).is_err() {
      self.sessions.remove(session_id);
      self.world.disconnect(session_id);
    }
  }

  /// Broadcasts every pending world event. Sessions whose channel is gone are
  /// dropped and treated as disconnects, which may queue further events.
  fn flush(&mut self) {
    loop {
      let events = self.world.drain_events();
      if events.is_empty() {
        break;
      }
      let mut stale: Vec<String> = Vec::new();
      for event in &events {
        let Some(payload) = encode(event) else { continue };
        for (session_id, session) in &self.sessions {
          if session.sender.send(payload.clone()).is_err() && !stale.contains(session_id) {
            stale.push(session_id.clone());
          }
        }
      }
      for session_id in stale {
        self.sessions.remove(&session_id);
        self.world.disconnect(&session_id);
      }
    }
  }
}

fn encode(message: &ServerMessage) -> Option<String> {
  match serde_json::to_string(message) {
    Ok(payload) => Some(payload),
    Err(error) => {
      tracing::warn!(?error, "failed to encode server message");
      None
    }
  }
}
