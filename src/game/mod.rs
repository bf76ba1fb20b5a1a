pub mod bullet;
pub mod collision;
pub mod constants;
pub mod food;
pub mod grid;
pub mod portal;
pub mod room;
pub mod snake;
pub mod types;
pub mod world;
