use crate::game::food::FoodField;
use crate::game::portal::Portals;
use crate::game::types::{Direction, LobbyEntry, SnakeSnapshot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
  JoinWithColor { color: String },
  Ready,
  Restart,
  Direction { direction: Direction },
  Fire,
}

pub fn decode_client_message(text: &str) -> Option<ClientMessage> {
  serde_json::from_str(text).ok()
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
  #[serde(rename_all = "camelCase")]
  Init {
    player_id: String,
    grid_size: i32,
    cell_size: i32,
    colors: Vec<String>,
    portals: Portals,
    food: FoodField,
    lobby: Vec<LobbyEntry>,
    available_colors: Vec<String>,
    in_progress: bool,
  },
  #[serde(rename_all = "camelCase")]
  Lobby {
    players: Vec<LobbyEntry>,
    available_colors: Vec<String>,
  },
  Portals { portals: Portals },
  Food { food: FoodField },
  State { snakes: Vec<SnakeSnapshot> },
  GameStarted,
  GameOver { winner: Option<String> },
  ReturnToLobby,
}
