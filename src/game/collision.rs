use super::types::{Point, Snake};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollisionOutcome {
  Clear,
  SelfCollision,
  /// The mover ran into `other` and paid for it.
  Collided { other: String },
  /// A venomous mover ran into `victim`, who paid instead.
  Struck { victim: String },
}

impl CollisionOutcome {
  pub fn mover_collided(&self) -> bool {
    matches!(self, CollisionOutcome::SelfCollision | CollisionOutcome::Collided { .. })
  }
}

/// Body segments the head can hit: everything but the old head and the tail,
/// which vacates on this move.
fn hits_own_body(snake: &Snake, head: Point) -> bool {
  let len = snake.body.len();
  snake
    .body
    .iter()
    .take(len.saturating_sub(1))
    .skip(1)
    .any(|segment| *segment == head)
}

pub fn resolve_collision(
  snakes: &mut BTreeMap<String, Snake>,
  mover_id: &str,
  new_head: Point,
) -> CollisionOutcome {
  let Some(mover) = snakes.get(mover_id) else {
    return CollisionOutcome::Clear;
  };
  let mover_venom = mover.has_venom();

  if hits_own_body(mover, new_head) {
    if let Some(mover) = snakes.get_mut(mover_id) {
      mover.lose_life();
    }
    return CollisionOutcome::SelfCollision;
  }

  let hit = snakes
    .values()
    .filter(|other| other.active && other.id != mover_id)
    .find(|other| other.body.contains(&new_head))
    .map(|other| (other.id.clone(), other.has_venom()));
  let Some((other_id, other_venom)) = hit else {
    return CollisionOutcome::Clear;
  };

  if mover_venom && !other_venom {
    if let Some(other) = snakes.get_mut(&other_id) {
      other.lose_life();
    }
    return CollisionOutcome::Struck { victim: other_id };
  }

  if let Some(mover) = snakes.get_mut(mover_id) {
    mover.lose_life();
  }
  CollisionOutcome::Collided { other: other_id }
}
