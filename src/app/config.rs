use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

const DEFAULT_PORT: u16 = 8787;
const DEFAULT_BIND_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
  pub bind_address: IpAddr,
  pub port: u16,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      bind_address: DEFAULT_BIND_ADDRESS,
      port: DEFAULT_PORT,
    }
  }
}

impl ServerConfig {
  pub fn from_env() -> Self {
    Self::from_lookup(|key| env::var(key).ok())
  }

  /// Malformed values are logged and replaced by their defaults.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    Self {
      bind_address: parse_or("BIND_ADDRESS", lookup("BIND_ADDRESS"), DEFAULT_BIND_ADDRESS),
      port: parse_or("PORT", lookup("PORT"), DEFAULT_PORT),
    }
  }

  pub fn socket_addr(&self) -> SocketAddr {
    SocketAddr::new(self.bind_address, self.port)
  }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
  T: std::str::FromStr + std::fmt::Display,
{
  let Some(raw) = raw else { return default };
  match raw.trim().parse() {
    Ok(value) => value,
    Err(_) => {
      tracing::warn!(key, value = %raw, fallback = %default, "ignoring malformed setting");
      default
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
      .iter()
      .map(|(key, value)| (key.to_string(), value.to_string()))
      .collect();
    move |key| map.get(key).cloned()
  }

  #[test]
  fn defaults_when_unset() {
    let config = ServerConfig::from_lookup(lookup(&[]));
    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8787");
  }

  #[test]
  fn reads_port_and_address() {
    let config = ServerConfig::from_lookup(lookup(&[("PORT", " 9000 "), ("BIND_ADDRESS", "127.0.0.1")]));
    assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9000");
  }

  #[test]
  fn malformed_values_fall_back() {
    let config = ServerConfig::from_lookup(lookup(&[("PORT", "eighty"), ("BIND_ADDRESS", "nowhere")]));
    assert_eq!(config, ServerConfig::default());
  }
}
