use super::constants::{BASE_SPEED_MS, STARTING_LENGTH, STARTING_LIVES};
use super::grid::{step, wrap};
use super::types::{Direction, Point, Snake, SnakeSnapshot};
use std::collections::VecDeque;

/// Lays out a starting body behind `head`, opposite to the initial heading.
pub fn create_body(head: Point, direction: Direction) -> VecDeque<Point> {
  let mut body = VecDeque::with_capacity(STARTING_LENGTH);
  let mut current = head;
  body.push_back(current);
  for _ in 1..STARTING_LENGTH {
    current = wrap(step(current, direction.opposite()));
    body.push_back(current);
  }
  body
}

impl Snake {
  pub fn spawn(id: String, color: String, head: Point, direction: Direction, now: i64) -> Self {
    Self {
      id,
      color,
      body: create_body(head, direction),
      direction,
      last_direction: direction,
      speed: BASE_SPEED_MS,
      lives: STARTING_LIVES,
      active: true,
      has_bullet: false,
      bullet: None,
      venom_until: None,
      last_move_time: now,
    }
  }

  pub fn head(&self) -> Option<Point> {
    self.body.front().copied()
  }

  pub fn has_venom(&self) -> bool {
    self.venom_until.is_some()
  }

  pub fn firing_bullet(&self) -> bool {
    self.bullet.is_some()
  }

  /// Rejects the exact reverse of the last executed move.
  pub fn request_direction(&mut self, direction: Direction) -> bool {
    if !self.active || direction == self.last_direction.opposite() {
      return false;
    }
    self.direction = direction;
    true
  }

  /// Returns true when this loss eliminated the snake.
  pub fn lose_life(&mut self) -> bool {
    if !self.active {
      return false;
    }
    if self.lives > 1 {
      self.lives -= 1;
      false
    } else {
      self.eliminate();
      true
    }
  }

  pub fn eliminate(&mut self) {
    self.active = false;
    self.lives = 0;
    self.bullet = None;
  }

  pub fn snapshot(&self) -> SnakeSnapshot {
    SnakeSnapshot {
      color: self.color.clone(),
      body: self.body.iter().copied().collect(),
      direction: self.direction,
      active: self.active,
      lives: self.lives,
      has_bullet: self.has_bullet,
      firing_bullet: self.firing_bullet(),
      bullet_position: self.bullet.map(|bullet| bullet.position),
      has_venom: self.has_venom(),
      venom_bullet: self.bullet.map_or(false, |bullet| bullet.venom),
    }
  }
}

#[cfg(test)]
pub(crate) fn test_snake(id: &str, body: &[(i32, i32)], direction: Direction) -> Snake {
  let mut snake = Snake::spawn(id.to_string(), format!("#{id}"), Point::new(0, 0), direction, 0);
  snake.body = body.iter().map(|(x, y)| Point::new(*x, *y)).collect();
  snake
}
