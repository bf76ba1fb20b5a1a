use super::constants::PORTAL_MIN_SEPARATION;
use super::grid::random_cell;
use super::types::Point;
use rand::Rng;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Portals {
  pair: [Point; 2],
}

impl Portals {
  pub fn new(first: Point, second: Point) -> Self {
    Self { pair: [first, second] }
  }

  /// Unbounded retry: on a 50x50 grid roughly half of all cells satisfy the
  /// separation, so the loop terminates almost immediately.
  pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
    let first = random_cell(rng);
    let mut second = random_cell(rng);
    while !far_enough(first, second) {
      second = random_cell(rng);
    }
    Self::new(first, second)
  }

  pub fn points(&self) -> [Point; 2] {
    self.pair
  }

  pub fn contains(&self, point: Point) -> bool {
    self.pair.contains(&point)
  }

  pub fn transport(&self, point: Point) -> Option<Point> {
    let [a, b] = self.pair;
    if point == a {
      Some(b)
    } else if point == b {
      Some(a)
    } else {
      None
    }
  }
}

fn far_enough(a: Point, b: Point) -> bool {
  (a.x - b.x).abs() >= PORTAL_MIN_SEPARATION || (a.y - b.y).abs() >= PORTAL_MIN_SEPARATION
}
