use super::*;
use crate::game::constants::{MAX_SPAWN_ATTEMPTS, MIN_PLAYERS};
use crate::game::grid::random_cell;
use crate::game::snake::create_body;
use crate::game::types::Point;
use rand::seq::SliceRandom;

impl World {
  fn color_claimed(&self, color: &str, except: Option<&str>) -> bool {
    let by_waiting = self
      .waiting
      .iter()
      .any(|player| player.color == color && Some(player.id.as_str()) != except);
    let by_snake = self
      .snakes
      .values()
      .any(|snake| snake.active && snake.color == color && Some(snake.id.as_str()) != except);
    by_waiting || by_snake
  }

  pub fn available_colors(&self) -> Vec<String> {
    COLOR_POOL
      .iter()
      .filter(|color| !self.color_claimed(color, None))
      .map(|color| color.to_string())
      .collect()
  }

  /// Pre-game only; re-joining with another free color switches colors.
  pub fn join_with_color(&mut self, player_id: &str, color: &str) -> bool {
    if self.in_progress {
      tracing::debug!(player_id, "join ignored: game in progress");
      return false;
    }
    if !COLOR_POOL.contains(&color) || self.color_claimed(color, Some(player_id)) {
      tracing::debug!(player_id, color, "join ignored: color unavailable");
      return false;
    }
    match self.waiting.iter_mut().find(|player| player.id == player_id) {
      Some(player) => {
        player.color = color.to_string();
        player.ready = false;
      }
      None => self.waiting.push(WaitingPlayer {
        id: player_id.to_string(),
        color: color.to_string(),
        ready: false,
      }),
    }
    let lobby = self.lobby_message();
    self.emit(lobby);
    true
  }

  /// Returns true when this ready vote started a new round.
  pub fn ready(&mut self, player_id: &str, now: i64) -> bool {
    if self.in_progress {
      return false;
    }
    let Some(player) = self.waiting.iter_mut().find(|player| player.id == player_id) else {
      tracing::debug!(player_id, "ready ignored: not in lobby");
      return false;
    };
    player.ready = true;
    let lobby = self.lobby_message();
    self.emit(lobby);

    let all_ready = self.waiting.iter().all(|player| player.ready);
    if all_ready && self.waiting.len() >= MIN_PLAYERS {
      self.reset(now);
      return self.is_running();
    }
    false
  }

  /// Clears the previous round, regenerates portals and food and promotes
  /// ready lobby players into fresh snakes.
  pub fn reset(&mut self, now: i64) {
    self.round += 1;
    self.snakes.clear();
    self.scheduled.clear();
    self.pending_directions.clear();
    self.in_progress = false;
    self.paused = false;

    self.portals = Portals::generate(&mut self.rng);
    let portals = self.portals;
    self.emit(ServerMessage::Portals { portals });
    self.food.clear();

    let (ready, not_ready): (Vec<_>, Vec<_>) = std::mem::take(&mut self.waiting)
      .into_iter()
      .partition(|player| player.ready);
    self.waiting = not_ready;
    for player in ready {
      let (head, direction) = self.safe_spawn();
      let snake = Snake::spawn(player.id.clone(), player.color, head, direction, now);
      self.snakes.insert(player.id, snake);
    }

    self.food.replenish(&mut self.rng, &self.portals, self.snakes.values());
    let food = self.food.clone();
    self.emit(ServerMessage::Food { food });

    if self.active_count() >= MIN_PLAYERS {
      self.in_progress = true;
      tracing::info!(round = self.round, players = self.snakes.len(), "game started");
      self.emit(ServerMessage::GameStarted);
      let state = self.state_message();
      self.emit(state);
    }
    let lobby = self.lobby_message();
    self.emit(lobby);
  }

  /// Samples spawn cells whose whole starting body is clear; after the retry
  /// budget the last sample is used as-is.
  fn safe_spawn(&mut self) -> (Point, Direction) {
    let mut candidate = (Point::new(0, 0), Direction::Right);
    for _ in 0..MAX_SPAWN_ATTEMPTS {
      let head = random_cell(&mut self.rng);
      let direction = *Direction::ALL.choose(&mut self.rng).unwrap_or(&Direction::Right);
      candidate = (head, direction);
      let clear = create_body(head, direction).iter().all(|cell| {
        !self.portals.contains(*cell)
          && !self.food.contains(*cell)
          && !self.snakes.values().any(|snake| snake.body.contains(cell))
      });
      if clear {
        return candidate;
      }
    }
    tracing::debug!("spawn retry budget exhausted, using last sample");
    candidate
  }

  /// Sends the requester back to the lobby and tears the round down for
  /// everyone.
  pub fn restart(&mut self, player_id: &str) -> bool {
    let already_waiting = self.waiting.iter_mut().find(|player| player.id == player_id);
    if let Some(player) = already_waiting {
      player.ready = false;
    } else {
      let Some(snake) = self.snakes.get(player_id) else {
        tracing::debug!(player_id, "restart ignored: unknown player");
        return false;
      };
      let color = snake.color.clone();
      self.snakes.clear();
      let color = if self.color_claimed(&color, None) {
        self.available_colors().into_iter().next()
      } else {
        Some(color)
      };
      if let Some(color) = color {
        self.waiting.push(WaitingPlayer {
          id: player_id.to_string(),
          color,
          ready: false,
        });
      }
    }

    self.stop();
    self.emit(ServerMessage::ReturnToLobby);
    let lobby = self.lobby_message();
    self.emit(lobby);
    true
  }

  pub fn stop(&mut self) {
    self.in_progress = false;
    self.paused = false;
    self.snakes.clear();
    self.scheduled.clear();
    self.pending_directions.clear();
  }

  pub fn disconnect(&mut self, player_id: &str) {
    if let Some(index) = self.waiting.iter().position(|player| player.id == player_id) {
      self.waiting.remove(index);
      let lobby = self.lobby_message();
      self.emit(lobby);
      return;
    }
    let Some(snake) = self.snakes.get_mut(player_id) else { return };
    if !snake.active {
      return;
    }
    snake.eliminate();
    tracing::debug!(player_id, "snake removed on disconnect");
    if !self.check_win_condition() && self.is_running() {
      let state = self.state_message();
      self.emit(state);
    }
  }
}
