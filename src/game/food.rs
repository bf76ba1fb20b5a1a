use super::constants::{
  BASE_SPEED_MS, GOLDEN_FOOD_COUNT, GOLDEN_GROWTH, GREEN_FOOD_COUNT, GREEN_MAX_LENGTH, MAX_LIVES,
  RED_FOOD_COUNT, SPEED_BOOST_DIVISOR, VENOM_DURATION_MS, VENOM_FOOD_COUNT, WHITE_FOOD_COUNT,
};
use super::grid::{occupied_by_snakes, random_cell};
use super::portal::Portals;
use super::types::{FoodKind, Point, Snake};
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;

impl FoodKind {
  pub const ALL: [FoodKind; 5] = [
    FoodKind::Golden,
    FoodKind::Green,
    FoodKind::Red,
    FoodKind::White,
    FoodKind::Venom,
  ];

  pub fn target_count(self) -> usize {
    match self {
      FoodKind::Golden => GOLDEN_FOOD_COUNT,
      FoodKind::Green => GREEN_FOOD_COUNT,
      FoodKind::Red => RED_FOOD_COUNT,
      FoodKind::White => WHITE_FOOD_COUNT,
      FoodKind::Venom => VENOM_FOOD_COUNT,
    }
  }

  /// Applies the category effect and reports whether the body grew, which
  /// keeps the tail in place for this move.
  pub fn apply(self, snake: &mut Snake, now: i64) -> bool {
    match self {
      FoodKind::Golden => {
        if let Some(tail) = snake.body.back().copied() {
          snake.body.extend(std::iter::repeat(tail).take(GOLDEN_GROWTH));
        }
        true
      }
      FoodKind::Green => {
        snake.body.truncate(GREEN_MAX_LENGTH);
        snake.speed = BASE_SPEED_MS / SPEED_BOOST_DIVISOR;
        true
      }
      FoodKind::Red => {
        snake.lives = (snake.lives + 1).min(MAX_LIVES);
        false
      }
      FoodKind::White => {
        snake.has_bullet = true;
        false
      }
      FoodKind::Venom => {
        snake.venom_until = Some(now + VENOM_DURATION_MS);
        false
      }
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FoodOutcome {
  pub eaten: Option<FoodKind>,
  pub grew: bool,
}

impl FoodOutcome {
  pub fn changed(&self) -> bool {
    self.eaten.is_some()
  }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct FoodField {
  items: BTreeMap<FoodKind, Vec<Point>>,
}

impl FoodField {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn clear(&mut self) {
    self.items.clear();
  }

  pub fn count(&self, kind: FoodKind) -> usize {
    self.items.get(&kind).map_or(0, Vec::len)
  }

  pub fn points(&self, kind: FoodKind) -> &[Point] {
    self.items.get(&kind).map_or(&[], Vec::as_slice)
  }

  pub fn contains(&self, point: Point) -> bool {
    self.items.values().any(|points| points.contains(&point))
  }

  pub fn insert(&mut self, kind: FoodKind, point: Point) {
    self.items.entry(kind).or_default().push(point);
  }

  /// Tops every category up to its target count on cells free of portals,
  /// other food and live snakes. Placement retries without bound.
  pub fn replenish<'a, R: Rng + ?Sized>(
    &mut self,
    rng: &mut R,
    portals: &Portals,
    snakes: impl IntoIterator<Item = &'a Snake> + Clone,
  ) -> bool {
    let mut changed = false;
    for kind in FoodKind::ALL {
      while self.count(kind) < kind.target_count() {
        let candidate = random_cell(rng);
        if portals.contains(candidate)
          || self.contains(candidate)
          || occupied_by_snakes(candidate, snakes.clone())
        {
          continue;
        }
        self.insert(kind, candidate);
        changed = true;
      }
    }
    changed
  }

  fn take(&mut self, point: Point) -> Option<FoodKind> {
    for (kind, points) in self.items.iter_mut() {
      if let Some(index) = points.iter().position(|candidate| *candidate == point) {
        points.swap_remove(index);
        return Some(*kind);
      }
    }
    None
  }

  pub fn apply_effects(&mut self, snake: &mut Snake, point: Point, now: i64) -> FoodOutcome {
    let Some(kind) = self.take(point) else {
      return FoodOutcome::default();
    };
    let grew = kind.apply(snake, now);
    FoodOutcome {
      eaten: Some(kind),
      grew,
    }
  }
}
