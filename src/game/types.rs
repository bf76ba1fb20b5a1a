use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
  pub x: i32,
  pub y: i32,
}

impl Point {
  pub const fn new(x: i32, y: i32) -> Self {
    Self { x, y }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Up,
  Down,
  Left,
  Right,
}

impl Direction {
  pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

  pub fn opposite(self) -> Self {
    match self {
      Direction::Up => Direction::Down,
      Direction::Down => Direction::Up,
      Direction::Left => Direction::Right,
      Direction::Right => Direction::Left,
    }
  }

  /// Unit step in cells; screen coordinates, so `Up` decreases `y`.
  pub fn delta(self) -> (i32, i32) {
    match self {
      Direction::Up => (0, -1),
      Direction::Down => (0, 1),
      Direction::Left => (-1, 0),
      Direction::Right => (1, 0),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodKind {
  Golden,
  Green,
  Red,
  White,
  Venom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bullet {
  pub position: Point,
  pub direction: Direction,
  pub venom: bool,
}

#[derive(Debug, Clone)]
pub struct Snake {
  pub id: String,
  pub color: String,
  pub body: VecDeque<Point>,
  pub direction: Direction,
  pub last_direction: Direction,
  pub speed: i64,
  pub lives: u8,
  pub active: bool,
  pub has_bullet: bool,
  pub bullet: Option<Bullet>,
  pub venom_until: Option<i64>,
  pub last_move_time: i64,
}

#[derive(Debug, Clone)]
pub struct WaitingPlayer {
  pub id: String,
  pub color: String,
  pub ready: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnakeSnapshot {
  pub color: String,
  pub body: Vec<Point>,
  pub direction: Direction,
  pub active: bool,
  pub lives: u8,
  pub has_bullet: bool,
  pub firing_bullet: bool,
  pub bullet_position: Option<Point>,
  pub has_venom: bool,
  pub venom_bullet: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyEntry {
  pub color: String,
  pub ready: bool,
}
