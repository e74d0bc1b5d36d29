//! The Configuration Surface, spec.md §6. Mirrors the accessor-pair idiom
//! the teacher uses for its own `ServerConfig` (`ticketer`,
//! `client_auth_offer`/`client_auth_mandatory`, ...), scoped to the one
//! knob this driver's spec actually names.

#[derive(Debug, Clone)]
pub struct ServerConfig {
  verify_requests: bool,
}

impl ServerConfig {
  pub fn new() -> ServerConfig {
    ServerConfig { verify_requests: true }
  }

  pub fn get_verify_requests(&self) -> bool {
    self.verify_requests
  }

  pub fn set_verify_requests(&mut self, verify: bool) {
    self.verify_requests = verify;
  }
}

impl Default for ServerConfig {
  fn default() -> Self {
    ServerConfig::new()
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn defaults_to_verifying_requests() {
    assert!(ServerConfig::new().get_verify_requests());
  }

  #[test]
  fn set_verify_requests_roundtrips() {
    let mut cfg = ServerConfig::new();
    cfg.set_verify_requests(false);
    assert!(!cfg.get_verify_requests());
  }
}
