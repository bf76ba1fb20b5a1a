pub const GRID_SIZE: i32 = 500;
pub const CELL_SIZE: i32 = 10;
pub const GAME_TICK_RATE_MS: u64 = 100;
pub const MIN_PLAYERS: usize = 2;

pub const BASE_SPEED_MS: i64 = 200;
pub const STARTING_LENGTH: usize = 3;
pub const STARTING_LIVES: u8 = 3;
pub const MAX_LIVES: u8 = 5;
pub const MAX_SPAWN_ATTEMPTS: usize = 32;

pub const GOLDEN_GROWTH: usize = 5;
pub const GREEN_MAX_LENGTH: usize = 3;
pub const SPEED_BOOST_DIVISOR: i64 = 4;
pub const SPEED_BOOST_DURATION_MS: i64 = 5_000;
pub const VENOM_DURATION_MS: i64 = 15_000;

pub const MAX_BULLET_RANGE_CELLS: i32 = 50;
pub const PORTAL_MIN_SEPARATION: i32 = GRID_SIZE / 3;

pub const GOLDEN_FOOD_COUNT: usize = 3;
pub const GREEN_FOOD_COUNT: usize = 3;
pub const RED_FOOD_COUNT: usize = 2;
pub const WHITE_FOOD_COUNT: usize = 2;
pub const VENOM_FOOD_COUNT: usize = 2;

pub const COLOR_POOL: [&str; 8] = [
  "#ff6b6b",
  "#ffd166",
  "#06d6a0",
  "#4dabf7",
  "#f06595",
  "#845ef7",
  "#20c997",
  "#fcc419",
];
