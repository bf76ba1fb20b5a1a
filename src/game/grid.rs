use super::constants::{CELL_SIZE, GRID_SIZE};
use super::types::{Direction, Point, Snake};
use rand::Rng;

pub const CELLS_PER_SIDE: i32 = GRID_SIZE / CELL_SIZE;

pub fn random_cell<R: Rng + ?Sized>(rng: &mut R) -> Point {
  Point {
    x: rng.gen_range(0..CELLS_PER_SIDE) * CELL_SIZE,
    y: rng.gen_range(0..CELLS_PER_SIDE) * CELL_SIZE,
  }
}

pub fn step(point: Point, direction: Direction) -> Point {
  let (dx, dy) = direction.delta();
  Point {
    x: point.x + dx * CELL_SIZE,
    y: point.y + dy * CELL_SIZE,
  }
}

pub fn wrap(point: Point) -> Point {
  Point {
    x: point.x.rem_euclid(GRID_SIZE),
    y: point.y.rem_euclid(GRID_SIZE),
  }
}

pub fn in_bounds(point: Point) -> bool {
  (0..GRID_SIZE).contains(&point.x) && (0..GRID_SIZE).contains(&point.y)
}

pub fn chebyshev_cells(a: Point, b: Point) -> i32 {
  let dx = (a.x - b.x).abs();
  let dy = (a.y - b.y).abs();
  dx.max(dy) / CELL_SIZE
}

pub fn occupied_by_snakes<'a>(point: Point, snakes: impl IntoIterator<Item = &'a Snake>) -> bool {
  snakes
    .into_iter()
    .filter(|snake| snake.active)
    .any(|snake| snake.body.contains(&point))
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  #[test]
  fn random_cells_are_aligned_and_inside_grid() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
      let cell = random_cell(&mut rng);
      assert!(in_bounds(cell));
      assert_eq!(cell.x % CELL_SIZE, 0);
      assert_eq!(cell.y % CELL_SIZE, 0);
    }
  }

  #[test]
  fn wrap_is_modulo_grid_size_on_both_axes() {
    let left_edge = Point::new(0, 40);
    assert_eq!(wrap(step(left_edge, Direction::Left)), Point::new(GRID_SIZE - CELL_SIZE, 40));

    let bottom_edge = Point::new(120, GRID_SIZE - CELL_SIZE);
    assert_eq!(wrap(step(bottom_edge, Direction::Down)), Point::new(120, 0));

    let inner = Point::new(200, 200);
    assert_eq!(wrap(step(inner, Direction::Up)), Point::new(200, 190));
  }

  #[test]
  fn step_leaves_bounds_without_wrapping() {
    let top = Point::new(50, 0);
    let next = step(top, Direction::Up);
    assert_eq!(next, Point::new(50, -CELL_SIZE));
    assert!(!in_bounds(next));
  }

  #[test]
  fn chebyshev_distance_counts_cells_on_dominant_axis() {
    assert_eq!(chebyshev_cells(Point::new(0, 0), Point::new(30, 70)), 7);
    assert_eq!(chebyshev_cells(Point::new(100, 100), Point::new(100, 100)), 0);
  }
}
