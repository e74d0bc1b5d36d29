//! Fake collaborators for exercising the driver without a real network,
//! record layer, or certificate stack -- mirrors the teacher's own
//! `msgs::handshake::test` / `key_schedule::test` fixture style: plain
//! structs, no mocking framework.

use std::collections::VecDeque;

use error::DTLSError;
use adapters::{RecordLayerAdapter, ReliableHandshakeAdapter};
use msgs::base::CertificatePayload;
use msgs::codec::Codec;
use msgs::enums::{AlertDescription, CipherSuite, Compression, HandshakeType, HashAlgorithm,
                   ProtocolVersion, SignatureAlgorithm, SignatureScheme};
use msgs::handshake::{CertificateRequestPayload, NewSessionTicketPayload, RawExtension,
                       ServerKeyExchangePayload, SupplementalDataPayload};
use security::SecurityParameters;
use server::config::ServerConfig;
use server::policy::{ClientAuthVerifier, Credentials, KeyExchange, ServerPolicy, Signer};

/// A `Signer` that always produces the same placeholder signature --
/// `FakeVerifier` never actually checks the bytes it's handed, so this
/// only needs to exist to give `credentials()` a `Box<dyn Signer>`.
pub struct FakeSigner {
  pub scheme: SignatureScheme,
}

impl Signer for FakeSigner {
  fn sign(&self, _message: &[u8]) -> Result<Vec<u8>, DTLSError> {
    Ok(vec![0u8; 4])
  }

  fn scheme(&self) -> SignatureScheme {
    self.scheme
  }
}

/// An in-memory queue of already-framed handshake messages, standing in
/// for a real reassembling transport. `push_incoming` primes what the
/// driver will receive; every message the driver sends is appended to
/// `sent` for assertions.
pub struct FakeHandshakeChannel {
  pub incoming: VecDeque<(HandshakeType, Vec<u8>)>,
  pub sent: Vec<(HandshakeType, Vec<u8>)>,
  pub hello_complete: bool,
  pub finished: bool,
  pub hash_calls: usize,
}

impl FakeHandshakeChannel {
  pub fn new() -> FakeHandshakeChannel {
    FakeHandshakeChannel {
      incoming: VecDeque::new(),
      sent: Vec::new(),
      hello_complete: false,
      finished: false,
      hash_calls: 0,
    }
  }

  pub fn push_incoming(&mut self, typ: HandshakeType, body: Vec<u8>) {
    self.incoming.push_back((typ, body));
  }
}

impl ReliableHandshakeAdapter for FakeHandshakeChannel {
  fn receive_message(&mut self) -> Result<(HandshakeType, Vec<u8>), DTLSError> {
    self.incoming.pop_front()
      .ok_or(DTLSError::TransportError("no more fake messages queued".to_string()))
  }

  fn send_message(&mut self, typ: HandshakeType, body: &[u8]) -> Result<(), DTLSError> {
    self.sent.push((typ, body.to_vec()));
    Ok(())
  }

  /// A fixed, deterministic stand-in transcript: a real reliable
  /// handshake adapter would hash every sent/received body in order,
  /// but for these tests only *which* value was used to derive
  /// `verify_data` matters, not its authenticity.
  fn current_hash(&self) -> Vec<u8> {
    vec![0x42; 32]
  }

  fn notify_hello_complete(&mut self) {
    self.hello_complete = true;
  }

  fn finish(&mut self) -> Result<(), DTLSError> {
    self.finished = true;
    Ok(())
  }
}

pub struct FakeRecordLayer {
  pub peer_version: ProtocolVersion,
  pub pending_epoch_cipher: Option<CipherSuite>,
  pub alert_sent: Option<AlertDescription>,
}

impl FakeRecordLayer {
  pub fn new(peer_version: ProtocolVersion) -> FakeRecordLayer {
    FakeRecordLayer { peer_version: peer_version, pending_epoch_cipher: None, alert_sent: None }
  }
}

impl RecordLayerAdapter for FakeRecordLayer {
  fn init_pending_epoch(&mut self, cipher: CipherSuite) -> Result<(), DTLSError> {
    self.pending_epoch_cipher = Some(cipher);
    Ok(())
  }

  fn discovered_peer_version(&self) -> ProtocolVersion {
    self.peer_version
  }

  fn send_fatal_alert(&mut self, description: AlertDescription) {
    self.alert_sent = Some(description);
  }
}

/// A policy that negotiates one fixed cipher suite/compression/version
/// and never requests client auth, unless told otherwise.
pub struct FakePolicy {
  pub server_version: ProtocolVersion,
  pub cipher_suite: CipherSuite,
  pub compression: Compression,
  pub extensions: Vec<RawExtension>,
  pub request_client_auth: bool,
  pub client_auth_verifier: Option<FakeVerifier>,
  /// When set, `credentials()` hands back a fresh `Credentials` wrapping
  /// a clone of this chain and a `FakeSigner` -- unset means an anonymous
  /// suite with no server certificate, per `ServerPolicy::credentials`'s
  /// contract.
  pub credentials_cert_chain: Option<CertificatePayload>,
  pub config: ServerConfig,

  pub saw_client_version: Option<ProtocolVersion>,
  pub saw_offered_suites: Vec<CipherSuite>,
  pub saw_secure_renegotiation: Option<bool>,
  pub handshake_complete: bool,
}

impl FakePolicy {
  pub fn new() -> FakePolicy {
    FakePolicy {
      server_version: ProtocolVersion::DTLSv1_2,
      cipher_suite: CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA,
      compression: Compression::Null,
      extensions: Vec::new(),
      request_client_auth: false,
      client_auth_verifier: None,
      credentials_cert_chain: None,
      config: ServerConfig::new(),
      saw_client_version: None,
      saw_offered_suites: Vec::new(),
      saw_secure_renegotiation: None,
      handshake_complete: false,
    }
  }
}

impl ServerPolicy for FakePolicy {
  fn init(&mut self, _context: &SecurityParameters) {}

  fn notify_client_version(&mut self, version: ProtocolVersion) {
    self.saw_client_version = Some(version);
  }

  fn notify_offered_cipher_suites(&mut self, suites: &[CipherSuite]) {
    self.saw_offered_suites = suites.to_vec();
  }

  fn notify_offered_compression_methods(&mut self, _methods: &[Compression]) {}

  fn notify_secure_renegotiation(&mut self, secure: bool) {
    self.saw_secure_renegotiation = Some(secure);
  }

  fn process_client_extensions(&mut self, _extensions: &[RawExtension]) {}

  fn server_version(&self) -> ProtocolVersion {
    self.server_version
  }

  fn selected_cipher_suite(&self) -> CipherSuite {
    self.cipher_suite
  }

  fn selected_compression_method(&self) -> Compression {
    self.compression
  }

  fn server_extensions(&self) -> Vec<RawExtension> {
    self.extensions.clone()
  }

  fn server_supplemental_data(&self) -> Option<SupplementalDataPayload> {
    None
  }

  fn key_exchange(&mut self) -> Option<Box<dyn KeyExchange>> {
    Some(Box::new(FakeKeyExchange::new()))
  }

  fn credentials(&self) -> Option<Credentials> {
    self.credentials_cert_chain.as_ref().map(|chain| Credentials {
      cert_chain: chain.clone(),
      signer: Box::new(FakeSigner { scheme: sig_scheme() }),
    })
  }

  fn certificate_request(&self) -> Option<CertificateRequestPayload> {
    if self.request_client_auth {
      Some(CertificateRequestPayload {
        certtypes: Vec::new(),
        sigschemes: Vec::new(),
        canames: Vec::new(),
      })
    } else {
      None
    }
  }

  fn process_client_supplemental_data(&mut self, _data: Option<&SupplementalDataPayload>) {}

  fn cipher(&self) -> CipherSuite {
    self.cipher_suite
  }

  fn new_session_ticket(&mut self) -> NewSessionTicketPayload {
    NewSessionTicketPayload::new(3600, vec![1, 2, 3])
  }

  fn notify_handshake_complete(&mut self) {
    self.handshake_complete = true;
  }

  fn client_auth_verifier(&self) -> Option<&dyn ClientAuthVerifier> {
    self.client_auth_verifier.as_ref().map(|v| v as &dyn ClientAuthVerifier)
  }

  fn config(&self) -> ServerConfig {
    self.config.clone()
  }
}

pub struct FakeKeyExchange {
  pub master_secret: [u8; 48],
}

impl FakeKeyExchange {
  pub fn new() -> FakeKeyExchange {
    FakeKeyExchange { master_secret: [0x11u8; 48] }
  }
}

impl KeyExchange for FakeKeyExchange {
  fn init(&mut self, _context: &SecurityParameters) {}

  fn process_server_credentials(&mut self, _creds: &Credentials) -> Result<(), DTLSError> {
    Ok(())
  }

  fn skip_server_credentials(&mut self) {}

  fn generate_server_key_exchange(&mut self) -> Result<Option<ServerKeyExchangePayload>, DTLSError> {
    Ok(None)
  }

  fn validate_certificate_request(&self, _req: &CertificateRequestPayload) -> Result<(), DTLSError> {
    Ok(())
  }

  fn process_client_certificate(&mut self, _cert_chain: &CertificatePayload) -> Result<(), DTLSError> {
    Ok(())
  }

  fn skip_client_credentials(&mut self) {}

  fn process_client_key_exchange(&mut self, _buf: &[u8]) -> Result<(), DTLSError> {
    Ok(())
  }

  fn establish_master_secret(
      &mut self,
      _client_random: &[u8; 32],
      _server_random: &[u8; 32]) -> Result<[u8; 48], DTLSError> {
    Ok(self.master_secret)
  }
}

pub struct FakeVerifier {
  pub accept: bool,
  /// The `transcript` slice the driver last called `verify` with --
  /// lets a test assert *which* hash snapshot the driver used (spec.md
  /// §4.1/§4.5: must be the pre-CertificateVerify snapshot, not
  /// whatever `current_hash()` returns after CV has already been read).
  pub seen_transcript: std::cell::RefCell<Option<Vec<u8>>>,
}

impl FakeVerifier {
  pub fn new(accept: bool) -> FakeVerifier {
    FakeVerifier { accept: accept, seen_transcript: std::cell::RefCell::new(None) }
  }
}

impl ClientAuthVerifier for FakeVerifier {
  fn verify(
      &self,
      _cert_chain: &CertificatePayload,
      transcript: &[u8],
      _scheme: SignatureScheme,
      _signature: &[u8]) -> Result<(), DTLSError> {
    *self.seen_transcript.borrow_mut() = Some(transcript.to_vec());
    if self.accept {
      Ok(())
    } else {
      Err(DTLSError::DecryptError)
    }
  }
}

/// Like `FakeHandshakeChannel`, but `current_hash()` returns a distinct
/// value on every call (a repeated byte equal to the call count) instead
/// of a fixed stand-in. Needed to exercise CertificateVerify processing,
/// where the driver must read the transcript hash at two genuinely
/// different points (before and after CertificateVerify is appended) and
/// a fixed fake hash can't distinguish "read the right snapshot" from
/// "read whatever's current."
pub struct CountingHandshakeChannel {
  pub incoming: VecDeque<(HandshakeType, Vec<u8>)>,
  pub sent: Vec<(HandshakeType, Vec<u8>)>,
  pub hello_complete: bool,
  pub finished: bool,
  pub hash_calls: std::cell::Cell<u8>,
}

impl CountingHandshakeChannel {
  pub fn new() -> CountingHandshakeChannel {
    CountingHandshakeChannel {
      incoming: VecDeque::new(),
      sent: Vec::new(),
      hello_complete: false,
      finished: false,
      hash_calls: std::cell::Cell::new(0),
    }
  }

  pub fn push_incoming(&mut self, typ: HandshakeType, body: Vec<u8>) {
    self.incoming.push_back((typ, body));
  }
}

impl ReliableHandshakeAdapter for CountingHandshakeChannel {
  fn receive_message(&mut self) -> Result<(HandshakeType, Vec<u8>), DTLSError> {
    self.incoming.pop_front()
      .ok_or(DTLSError::TransportError("no more fake messages queued".to_string()))
  }

  fn send_message(&mut self, typ: HandshakeType, body: &[u8]) -> Result<(), DTLSError> {
    self.sent.push((typ, body.to_vec()));
    Ok(())
  }

  fn current_hash(&self) -> Vec<u8> {
    let next = self.hash_calls.get() + 1;
    self.hash_calls.set(next);
    vec![next; 32]
  }

  fn notify_hello_complete(&mut self) {
    self.hello_complete = true;
  }

  fn finish(&mut self) -> Result<(), DTLSError> {
    self.finished = true;
    Ok(())
  }
}

pub fn sig_scheme() -> SignatureScheme {
  SignatureScheme::make(SignatureAlgorithm::RSA, HashAlgorithm::SHA256)
}
