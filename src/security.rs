//! The per-connection state a handshake accumulates (spec.md §3).
//!
//! `SecurityParameters` and `ServerHandshakeState` are kept as plain data
//! -- mutated only by `server::hs`, never shared, never leaked past
//! `accept()` (spec.md §5, §9 "mutable shared state").  Sentinel `-1`
//! and `null` values from the source description become `Option<T>`,
//! per spec.md §9's redesign guidance.

use zeroize::Zeroize;

use msgs::base::CertificatePayload;
use msgs::enums::{CipherSuite, Compression, HashAlgorithm, ProtocolVersion};
use msgs::handshake::{CertificateRequestPayload, RawExtension};
use server::policy::KeyExchange;
use suites::SupportedCipherSuite;

/// `entity` is always `server` for this driver, so it isn't modeled as a
/// field -- there is nothing to branch on.
#[derive(Debug, Clone)]
pub struct SecurityParameters {
  pub client_random: [u8; 32],
  pub server_random: [u8; 32],
  pub prf_algorithm: Option<HashAlgorithm>,
  pub compression_algorithm: Option<Compression>,
  /// Fixed at 12 for every cipher suite this driver defines (spec.md §3).
  pub verify_data_length: usize,
  pub master_secret: Option<[u8; 48]>,
}

impl SecurityParameters {
  pub fn new() -> SecurityParameters {
    SecurityParameters {
      client_random: [0u8; 32],
      server_random: [0u8; 32],
      prf_algorithm: None,
      compression_algorithm: None,
      verify_data_length: 12,
      master_secret: None,
    }
  }
}

impl Default for SecurityParameters {
  fn default() -> Self {
    SecurityParameters::new()
  }
}

/// spec.md §5: "all buffers holding secrets must be overwritten or
/// dropped before the error is surfaced" -- `master_secret` and the two
/// randoms are the only secret-derived byte buffers this crate itself
/// owns (key material past the master secret lives in the record layer
/// adapter, out of scope here).
impl Drop for SecurityParameters {
  fn drop(&mut self) {
    self.client_random.zeroize();
    self.server_random.zeroize();
    if let Some(ref mut master_secret) = self.master_secret {
      master_secret.zeroize();
    }
  }
}

/// Lives for exactly one call to `accept()`. Not `Clone`, not `Send`+
/// shared: the driver owns it exclusively and discards it when `accept`
/// returns (spec.md §3 Lifecycle).
pub struct ServerHandshakeState {
  pub context: SecurityParameters,
  pub client_version: Option<ProtocolVersion>,
  pub server_version: Option<ProtocolVersion>,

  pub offered_cipher_suites: Vec<CipherSuite>,
  pub offered_compression_methods: Vec<Compression>,
  pub client_extensions: Vec<RawExtension>,
  pub server_extensions: Vec<RawExtension>,

  pub selected_cipher_suite: Option<&'static SupportedCipherSuite>,
  pub selected_compression_method: Option<Compression>,

  pub secure_renegotiation: bool,
  pub expect_session_ticket: bool,

  pub certificate_request: Option<CertificateRequestPayload>,
  pub doing_client_auth: bool,

  /// Non-null only while a client certificate chain is outstanding for
  /// verification (spec.md §4.1 `WaitClientFlight1'`/`handle_certificate`).
  pub client_cert_chain: Option<CertificatePayload>,

  /// Snapshot of the transcript hash taken immediately before the
  /// client's Finished is received (spec.md §4.1 `SnapshotHash`,
  /// §4.5). `None` until that point in the state machine.
  pub client_finished_hash: Option<Vec<u8>>,

  /// The algorithm-specific state the policy returned (spec.md §3);
  /// owned by the handshake for its duration, taken out of this slot for
  /// the stretch of the driver that uses it directly.
  pub key_exchange: Option<Box<dyn KeyExchange>>,
}

impl ServerHandshakeState {
  pub fn new() -> ServerHandshakeState {
    ServerHandshakeState {
      context: SecurityParameters::new(),
      client_version: None,
      server_version: None,
      offered_cipher_suites: Vec::new(),
      offered_compression_methods: Vec::new(),
      client_extensions: Vec::new(),
      server_extensions: Vec::new(),
      selected_cipher_suite: None,
      selected_compression_method: None,
      secure_renegotiation: false,
      expect_session_ticket: false,
      certificate_request: None,
      doing_client_auth: false,
      client_cert_chain: None,
      client_finished_hash: None,
      key_exchange: None,
    }
  }
}

impl Default for ServerHandshakeState {
  fn default() -> Self {
    ServerHandshakeState::new()
  }
}
