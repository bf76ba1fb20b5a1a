pub const DEFAULT_ROOM: &str = "main";
const MAX_ROOM_NAME_LEN: usize = 64;

/// Keeps ASCII alphanumerics, `-` and `_`; anything that cleans down to
/// nothing lands in the default room.
pub fn sanitize_room_name(value: &str) -> String {
  let mut cleaned = String::with_capacity(value.len().min(MAX_ROOM_NAME_LEN));
  for ch in value.trim().chars() {
    if cleaned.len() >= MAX_ROOM_NAME_LEN {
      break;
    }
    if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
      cleaned.push(ch);
    }
  }
  if cleaned.is_empty() {
    DEFAULT_ROOM.to_string()
  } else {
    cleaned
  }
}
