use super::bullet::advance_bullets;
use super::collision::resolve_collision;
use super::constants::{BASE_SPEED_MS, CELL_SIZE, COLOR_POOL, GRID_SIZE, SPEED_BOOST_DURATION_MS};
use super::food::FoodField;
use super::grid::{step, wrap};
use super::portal::Portals;
use super::types::{Bullet, Direction, FoodKind, LobbyEntry, Snake, WaitingPlayer};
use crate::protocol::ServerMessage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{BTreeMap, VecDeque};

mod lifecycle;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimedEffect {
  RestoreSpeed,
}

/// A delayed effect bound to a player and the round it was scheduled in, so
/// that a reset or elimination turns it into a no-op.
#[derive(Debug, Clone)]
struct ScheduledEffect {
  player_id: String,
  round: u64,
  due_at: i64,
  effect: TimedEffect,
}

#[derive(Debug)]
pub struct World {
  snakes: BTreeMap<String, Snake>,
  waiting: Vec<WaitingPlayer>,
  food: FoodField,
  portals: Portals,
  paused: bool,
  in_progress: bool,
  round: u64,
  pending_directions: VecDeque<(String, Direction)>,
  scheduled: Vec<ScheduledEffect>,
  events: Vec<ServerMessage>,
  rng: StdRng,
}

impl World {
  pub fn new() -> Self {
    Self::with_rng(StdRng::from_entropy())
  }

  pub fn with_rng(mut rng: StdRng) -> Self {
    let portals = Portals::generate(&mut rng);
    let mut world = Self {
      snakes: BTreeMap::new(),
      waiting: Vec::new(),
      food: FoodField::new(),
      portals,
      paused: false,
      in_progress: false,
      round: 0,
      pending_directions: VecDeque::new(),
      scheduled: Vec::new(),
      events: Vec::new(),
      rng,
    };
    world.emit(ServerMessage::Portals { portals });
    world
  }

  pub fn is_running(&self) -> bool {
    self.in_progress && !self.paused
  }

  pub fn round(&self) -> u64 {
    self.round
  }

  pub fn drain_events(&mut self) -> Vec<ServerMessage> {
    std::mem::take(&mut self.events)
  }

  fn emit(&mut self, message: ServerMessage) {
    self.events.push(message);
  }

  #[cfg(test)]
  pub(crate) fn snake_mut(&mut self, player_id: &str) -> Option<&mut Snake> {
    self.snakes.get_mut(player_id)
  }

  pub fn active_count(&self) -> usize {
    self.snakes.values().filter(|snake| snake.active).count()
  }

  /// Applied at the start of the next tick against the last executed move.
  pub fn queue_direction(&mut self, player_id: &str, direction: Direction) {
    if !self.is_running() || !self.snakes.contains_key(player_id) {
      tracing::debug!(player_id, "direction ignored: no running snake");
      return;
    }
    self.pending_directions.push_back((player_id.to_string(), direction));
  }

  /// Launches the held bullet immediately and broadcasts without waiting for
  /// the next tick.
  pub fn fire(&mut self, player_id: &str) -> bool {
    if !self.is_running() {
      return false;
    }
    let Some(snake) = self.snakes.get_mut(player_id) else { return false };
    if !snake.active || !snake.has_bullet || snake.firing_bullet() {
      tracing::debug!(player_id, "fire ignored");
      return false;
    }
    let Some(head) = snake.head() else { return false };
    snake.has_bullet = false;
    snake.bullet = Some(Bullet {
      position: step(head, snake.direction),
      direction: snake.direction,
      venom: snake.has_venom(),
    });
    let state = self.state_message();
    self.emit(state);
    true
  }

  pub fn tick(&mut self, now: i64) {
    if !self.is_running() {
      return;
    }

    let mut changed = self.apply_pending_directions();
    self.process_scheduled(now);
    changed |= advance_bullets(&mut self.snakes, &self.portals).changed;
    changed |= self.expire_venom(now);
    changed |= self.move_snakes(now);

    if self.check_win_condition() {
      return;
    }
    if changed {
      let state = self.state_message();
      self.emit(state);
    }
  }

  fn apply_pending_directions(&mut self) -> bool {
    let mut changed = false;
    while let Some((player_id, direction)) = self.pending_directions.pop_front() {
      if let Some(snake) = self.snakes.get_mut(&player_id) {
        changed |= snake.request_direction(direction);
      }
    }
    changed
  }

  fn schedule(&mut self, player_id: &str, due_at: i64, effect: TimedEffect) {
    self
      .scheduled
      .retain(|pending| !(pending.player_id == player_id && pending.effect == effect));
    self.scheduled.push(ScheduledEffect {
      player_id: player_id.to_string(),
      round: self.round,
      due_at,
      effect,
    });
  }

  fn process_scheduled(&mut self, now: i64) {
    let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.scheduled)
      .into_iter()
      .partition(|scheduled| scheduled.due_at <= now);
    self.scheduled = pending;

    for scheduled in due {
      if scheduled.round != self.round {
        continue;
      }
      let Some(snake) = self.snakes.get_mut(&scheduled.player_id) else { continue };
      if !snake.active {
        continue;
      }
      match scheduled.effect {
        TimedEffect::RestoreSpeed => snake.speed = BASE_SPEED_MS,
      }
      tracing::debug!(player_id = %scheduled.player_id, effect = ?scheduled.effect, "timed effect applied");
    }
  }

  fn expire_venom(&mut self, now: i64) -> bool {
    let mut changed = false;
    for snake in self.snakes.values_mut() {
      if matches!(snake.venom_until, Some(end) if end <= now) {
        snake.venom_until = None;
        changed = true;
      }
    }
    changed
  }

  fn move_snakes(&mut self, now: i64) -> bool {
    let due: Vec<String> = self
      .snakes
      .values()
      .filter(|snake| snake.active && now - snake.last_move_time >= snake.speed)
      .map(|snake| snake.id.clone())
      .collect();

    let mut changed = false;
    for id in due {
      let Some(snake) = self.snakes.get(&id) else { continue };
      if !snake.active {
        continue;
      }
      let Some(head) = snake.head() else { continue };
      let wrapped = wrap(step(head, snake.direction));
      let new_head = self.portals.transport(wrapped).unwrap_or(wrapped);

      let outcome = resolve_collision(&mut self.snakes, &id, new_head);
      if outcome.mover_collided() {
        tracing::debug!(player_id = %id, ?outcome, "snake collided");
      }

      let Some(snake) = self.snakes.get_mut(&id) else { continue };
      snake.body.push_front(new_head);
      snake.last_direction = snake.direction;
      snake.last_move_time = now;
      let food = self.food.apply_effects(snake, new_head, now);
      if !food.grew {
        snake.body.pop_back();
      }
      changed = true;

      if food.eaten == Some(FoodKind::Green) {
        self.schedule(&id, now + SPEED_BOOST_DURATION_MS, TimedEffect::RestoreSpeed);
      }
      if food.changed() {
        self.replenish_food();
      }
    }
    changed
  }

  fn replenish_food(&mut self) {
    let changed = self
      .food
      .replenish(&mut self.rng, &self.portals, self.snakes.values());
    if changed {
      let food = self.food.clone();
      self.emit(ServerMessage::Food { food });
    }
  }

  /// Ends the round once at most one snake is left standing. Fires once per
  /// round since it clears `in_progress`.
  pub fn check_win_condition(&mut self) -> bool {
    if !self.in_progress {
      return false;
    }
    let total = self.snakes.len();
    let mut survivors = self.snakes.values().filter(|snake| snake.active);
    let first = survivors.next();
    let winner = match (first, survivors.next()) {
      (Some(winner), None) if total > 1 => Some(winner.color.clone()),
      (None, _) if total > 0 => None,
      _ => return false,
    };

    self.in_progress = false;
    self.paused = true;
    self.pending_directions.clear();
    tracing::info!(round = self.round, winner = ?winner, "game over");
    self.emit(ServerMessage::GameOver { winner });
    true
  }

  pub fn state_message(&self) -> ServerMessage {
    ServerMessage::State {
      snakes: self
        .snakes
        .values()
        .filter(|snake| snake.active)
        .map(Snake::snapshot)
        .collect(),
    }
  }

  pub fn lobby_entries(&self) -> Vec<LobbyEntry> {
    self
      .waiting
      .iter()
      .map(|player| LobbyEntry {
        color: player.color.clone(),
        ready: player.ready,
      })
      .collect()
  }

  pub fn lobby_message(&self) -> ServerMessage {
    ServerMessage::Lobby {
      players: self.lobby_entries(),
      available_colors: self.available_colors(),
    }
  }

  pub fn init_message(&self, player_id: &str) -> ServerMessage {
    ServerMessage::Init {
      player_id: player_id.to_string(),
      grid_size: GRID_SIZE,
      cell_size: CELL_SIZE,
      colors: COLOR_POOL.iter().map(|color| color.to_string()).collect(),
      portals: self.portals,
      food: self.food.clone(),
      lobby: self.lobby_entries(),
      available_colors: self.available_colors(),
      in_progress: self.in_progress,
    }
  }
}

impl Default for World {
  fn default() -> Self {
    Self::new()
  }
}
