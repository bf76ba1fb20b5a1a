use super::constants::MAX_BULLET_RANGE_CELLS;
use super::grid::{chebyshev_cells, in_bounds, step};
use super::portal::Portals;
use super::types::{Bullet, Point, Snake};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulletHit {
  pub shooter: String,
  pub target: String,
  pub eliminated: bool,
}

#[derive(Debug, Default)]
pub struct BulletReport {
  pub changed: bool,
  pub hits: Vec<BulletHit>,
}

enum Flight {
  Moved(Point),
  Gone,
  Hit { target: String },
}

/// Bullets never wrap: leaving the grid removes them.
fn fly(bullet: Bullet, shooter: &Snake, snakes: &BTreeMap<String, Snake>, portals: &Portals) -> Flight {
  let mut position = step(bullet.position, bullet.direction);
  if let Some(exit) = portals.transport(position) {
    position = exit;
  }
  if !in_bounds(position) {
    return Flight::Gone;
  }

  let target = snakes
    .values()
    .filter(|other| other.active && other.id != shooter.id)
    .find(|other| other.body.contains(&position));
  if let Some(target) = target {
    return Flight::Hit {
      target: target.id.clone(),
    };
  }

  match shooter.head() {
    Some(head) if within_range(position, head) => Flight::Moved(position),
    _ => Flight::Gone,
  }
}

fn within_range(position: Point, head: Point) -> bool {
  chebyshev_cells(position, head) <= MAX_BULLET_RANGE_CELLS
}

pub fn advance_bullets(snakes: &mut BTreeMap<String, Snake>, portals: &Portals) -> BulletReport {
  let mut report = BulletReport::default();
  let shooters: Vec<String> = snakes
    .values()
    .filter(|snake| snake.bullet.is_some())
    .map(|snake| snake.id.clone())
    .collect();

  for shooter_id in shooters {
    let Some(shooter) = snakes.get(&shooter_id) else { continue };
    let Some(bullet) = shooter.bullet else { continue };
    report.changed = true;

    let flight = if shooter.active {
      fly(bullet, shooter, snakes, portals)
    } else {
      Flight::Gone
    };

    match flight {
      Flight::Moved(position) => {
        if let Some(shooter) = snakes.get_mut(&shooter_id) {
          shooter.bullet = Some(Bullet { position, ..bullet });
        }
      }
      Flight::Gone => {
        if let Some(shooter) = snakes.get_mut(&shooter_id) {
          shooter.bullet = None;
        }
      }
      Flight::Hit { target } => {
        if let Some(shooter) = snakes.get_mut(&shooter_id) {
          shooter.bullet = None;
        }
        let Some(victim) = snakes.get_mut(&target) else { continue };
        let eliminated = if bullet.venom {
          victim.eliminate();
          true
        } else {
          victim.lose_life()
        };
        tracing::debug!(shooter = %shooter_id, target = %target, venom = bullet.venom, eliminated, "bullet hit");
        report.hits.push(BulletHit {
          shooter: shooter_id,
          target,
          eliminated,
        });
      }
    }
  }

  report
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::game::constants::{CELL_SIZE, GRID_SIZE};
  use crate::game::snake::test_snake;
  use crate::game::types::Direction;

  fn store(snakes: Vec<Snake>) -> BTreeMap<String, Snake> {
    snakes.into_iter().map(|snake| (snake.id.clone(), snake)).collect()
  }

  fn far_portals() -> Portals {
    Portals::new(Point::new(480, 480), Point::new(490, 490))
  }

  fn armed(id: &str, head: (i32, i32), bullet_at: (i32, i32), direction: Direction, venom: bool) -> Snake {
    let mut snake = test_snake(id, &[head], direction);
    snake.bullet = Some(Bullet {
      position: Point::new(bullet_at.0, bullet_at.1),
      direction,
      venom,
    });
    snake
  }

  #[test]
  fn bullet_advances_one_cell_per_tick() {
    let mut snakes = store(vec![armed("a", (100, 100), (110, 100), Direction::Right, false)]);

    let report = advance_bullets(&mut snakes, &far_portals());

    assert!(report.changed);
    assert_eq!(snakes["a"].bullet.map(|b| b.position), Some(Point::new(120, 100)));
  }

  #[test]
  fn bullet_leaving_the_grid_is_removed_without_wrapping() {
    let mut snakes = store(vec![
      armed("a", (GRID_SIZE - 2 * CELL_SIZE, 200), (GRID_SIZE - CELL_SIZE, 200), Direction::Right, false),
      test_snake("b", &[(0, 200), (0, 210)], Direction::Up),
    ]);

    advance_bullets(&mut snakes, &far_portals());

    assert!(snakes["a"].bullet.is_none());
    assert_eq!(snakes["b"].lives, 3);
  }

  #[test]
  fn plain_bullet_costs_one_life() {
    let mut snakes = store(vec![
      armed("a", (100, 100), (110, 100), Direction::Right, false),
      test_snake("b", &[(120, 90), (120, 100), (120, 110)], Direction::Up),
    ]);

    let report = advance_bullets(&mut snakes, &far_portals());

    assert_eq!(report.hits.len(), 1);
    assert!(!report.hits[0].eliminated);
    assert_eq!(snakes["b"].lives, 2);
    assert!(snakes["a"].bullet.is_none());
  }

  #[test]
  fn venom_bullet_eliminates_outright() {
    let mut snakes = store(vec![
      armed("a", (100, 100), (110, 100), Direction::Right, true),
      test_snake("b", &[(120, 100)], Direction::Up),
    ]);

    advance_bullets(&mut snakes, &far_portals());

    assert!(!snakes["b"].active);
    assert_eq!(snakes["b"].lives, 0);
  }

  #[test]
  fn bullet_is_redirected_through_portal() {
    let portals = Portals::new(Point::new(120, 100), Point::new(400, 300));
    let mut snakes = store(vec![armed("a", (100, 100), (110, 100), Direction::Right, false)]);

    advance_bullets(&mut snakes, &portals);

    assert_eq!(snakes["a"].bullet.map(|b| b.position), Some(Point::new(400, 300)));
  }

  #[test]
  fn range_is_measured_from_the_current_head() {
    let head = Point::new(0, 0);
    assert!(within_range(Point::new(MAX_BULLET_RANGE_CELLS * CELL_SIZE, 0), head));
    assert!(!within_range(Point::new((MAX_BULLET_RANGE_CELLS + 1) * CELL_SIZE, 30), head));
  }

  #[test]
  fn bullets_of_eliminated_shooters_are_dropped() {
    let mut shooter = armed("a", (100, 100), (110, 100), Direction::Right, false);
    shooter.active = false;
    let mut snakes = store(vec![shooter]);

    let report = advance_bullets(&mut snakes, &far_portals());

    assert!(report.changed);
    assert!(snakes["a"].bullet.is_none());
  }
}
