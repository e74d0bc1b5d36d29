//! The two pluggable collaborator interfaces spec.md §4.3/§4.4 name: the
//! server policy (version/suite/extension/credential decisions) and the
//! key-exchange algorithm. Modeled as traits per spec.md §9's "polymorphic
//! policy" guidance -- no inheritance, just capability records passed by
//! reference into the driver, the same role the teacher's `sign::Signer`
//! and `ResolvesServerCert` traits play for its own TLS driver.

use error::DTLSError;
use msgs::base::CertificatePayload;
use msgs::enums::{CipherSuite, Compression, ProtocolVersion, SignatureScheme};
use msgs::handshake::{
  CertificateRequestPayload, NewSessionTicketPayload, RawExtension, ServerKeyExchangePayload,
  SupplementalDataPayload,
};
use security::SecurityParameters;
use server::config::ServerConfig;

/// Signs handshake transcripts on behalf of a certificate's private key.
/// Kept as a trait, not a concrete RSA/ECDSA type: the actual signature
/// mechanics are certificate-validation machinery this crate treats as
/// external (spec.md §1 Non-goals).
pub trait Signer {
  fn sign(&self, message: &[u8]) -> Result<Vec<u8>, DTLSError>;
  fn scheme(&self) -> SignatureScheme;
}

/// A certificate chain plus the private key able to sign with it. Bundled
/// the way the teacher's cert_resolver hands back `(CertificatePayload,
/// Arc<Box<Signer>>)` pairs.
pub struct Credentials {
  pub cert_chain: CertificatePayload,
  pub signer: Box<dyn Signer>,
}

/// Verifies a client's CertificateVerify against the certificate chain it
/// presented. A separate capability from `Signer` because the server
/// authenticates itself but *verifies* the client -- different keys,
/// different failure handling (spec.md §9 Open Question (a)).
pub trait ClientAuthVerifier {
  fn verify(
    &self,
    cert_chain: &CertificatePayload,
    transcript: &[u8],
    scheme: SignatureScheme,
    signature: &[u8],
  ) -> Result<(), DTLSError>;
}

/// The Server Policy Interface, spec.md §4.3. Call order is fixed and
/// enforced by `server::hs`, not by this trait -- these are pure
/// callbacks, synchronous, never invoked concurrently (spec.md §4.3 "the
/// driver does not invoke these from multiple threads").
pub trait ServerPolicy {
  fn init(&mut self, context: &SecurityParameters);

  fn notify_client_version(&mut self, version: ProtocolVersion);
  fn notify_offered_cipher_suites(&mut self, suites: &[CipherSuite]);
  fn notify_offered_compression_methods(&mut self, methods: &[Compression]);
  fn notify_secure_renegotiation(&mut self, secure: bool);
  fn process_client_extensions(&mut self, extensions: &[RawExtension]);

  fn server_version(&self) -> ProtocolVersion;
  fn selected_cipher_suite(&self) -> CipherSuite;
  fn selected_compression_method(&self) -> Compression;
  fn server_extensions(&self) -> Vec<RawExtension>;
  fn server_supplemental_data(&self) -> Option<SupplementalDataPayload>;

  /// Returns the key-exchange algorithm object for this handshake, or
  /// `None` for an anonymous suite with no server key exchange message
  /// (spec.md §4.1 "emit ServerKeyExchange if the algorithm produces one").
  fn key_exchange(&mut self) -> Option<Box<dyn KeyExchange>>;

  /// Credentials to present, or `None` for an anonymous cipher suite.
  fn credentials(&self) -> Option<Credentials>;

  /// Only consulted when `credentials()` returned `Some` (spec.md §4.1
  /// "emit CertificateRequest if requested (only when credentials
  /// present)").
  fn certificate_request(&self) -> Option<CertificateRequestPayload>;

  /// `None` supplemental data is a legal input (spec.md §4.3
  /// "processClientSupplementalData (possibly with empty input)").
  fn process_client_supplemental_data(&mut self, data: Option<&SupplementalDataPayload>);

  /// Used to prepare the record layer's pending epoch once the master
  /// secret has been established (spec.md §4.1 `WaitClientKeyExchange`).
  fn cipher(&self) -> CipherSuite;

  /// Only consulted when `expect_session_ticket` is set.
  fn new_session_ticket(&mut self) -> NewSessionTicketPayload;

  fn notify_handshake_complete(&mut self);

  /// The verifier for an incoming client certificate, consulted only when
  /// `certificate_request()` returned `Some` and the client actually sent
  /// a non-empty chain (spec.md §9 Open Question (a)).
  fn client_auth_verifier(&self) -> Option<&dyn ClientAuthVerifier> {
    None
  }

  /// The Configuration Surface (spec.md §6): `verify_requests` governs
  /// whether an empty certificate chain is tolerated once a
  /// CertificateRequest has been sent. Defaults to the same
  /// verify-by-default stance as `ServerConfig::new()`.
  fn config(&self) -> ServerConfig {
    ServerConfig::new()
  }
}

/// The Key-Exchange Interface, spec.md §4.4.
pub trait KeyExchange {
  fn init(&mut self, context: &SecurityParameters);

  fn process_server_credentials(&mut self, creds: &Credentials) -> Result<(), DTLSError>;
  fn skip_server_credentials(&mut self);

  /// `None` means this algorithm has no ServerKeyExchange message (e.g.
  /// static RSA key exchange).
  fn generate_server_key_exchange(&mut self) -> Result<Option<ServerKeyExchangePayload>, DTLSError>;

  fn validate_certificate_request(&self, req: &CertificateRequestPayload) -> Result<(), DTLSError>;

  fn process_client_certificate(&mut self, cert_chain: &CertificatePayload) -> Result<(), DTLSError>;
  fn skip_client_credentials(&mut self);

  fn process_client_key_exchange(&mut self, buf: &[u8]) -> Result<(), DTLSError>;

  /// Mixes in the negotiated randoms and whatever key material this
  /// algorithm produced, returning the 48-byte master secret (spec.md §3
  /// `SecurityParameters.master_secret`).
  fn establish_master_secret(
    &mut self,
    client_random: &[u8; 32],
    server_random: &[u8; 32],
  ) -> Result<[u8; 48], DTLSError>;
}
