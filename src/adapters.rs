//! Trait seams for the two external collaborators spec.md §2 names but
//! explicitly does not specify the implementation of: the record layer
//! (retransmission-unaware cryptographic record protection) and the
//! reliable handshake layer (message sequencing, fragmentation and
//! reassembly, retransmission). The driver in `server::hs` is written
//! entirely against these traits; nothing in this crate implements them.

use msgs::enums::{AlertDescription, CipherSuite, HandshakeType, ProtocolVersion};
use error::DTLSError;

/// The record-layer collaborator. Owns cryptographic record protection
/// and epoch bookkeeping; the driver only ever asks it to prepare the
/// next epoch's keys and to report what DTLS version the underlying
/// record layer actually negotiated.
pub trait RecordLayerAdapter {
  /// Derive and install the pending (not yet active) read/write epoch
  /// for `cipher`, keyed from whatever master secret the driver has
  /// already established. Spec.md §3 invariant 2: once this has run for
  /// a handshake, its parameters must not be re-derived before Finished
  /// completes.
  fn init_pending_epoch(&mut self, cipher: CipherSuite) -> Result<(), DTLSError>;

  /// The DTLS version the record layer discovered from the first
  /// datagram it received -- used as `client_version` in place of
  /// trusting the ClientHello's self-reported version (spec.md §9(c),
  /// RFC 6347 §4.1).
  fn discovered_peer_version(&self) -> ProtocolVersion;

  /// Best-effort: attempt to send a fatal alert before the handshake
  /// tears down (spec.md §7 propagation policy). Failure to send is not
  /// itself escalated -- the original error is what gets returned.
  fn send_fatal_alert(&mut self, description: AlertDescription);
}

/// The reliable-handshake collaborator. Defragments and reassembles
/// datagrams into whole handshake message bodies, retransmits flights as
/// needed, and maintains the running transcript hash the Finished
/// exchange is verified against.
pub trait ReliableHandshakeAdapter {
  /// Block until the next complete handshake message arrives, returning
  /// its type and raw body (header framing already stripped). May
  /// internally retransmit the last flight; the driver treats this as
  /// opaque (spec.md §5).
  fn receive_message(&mut self) -> Result<(HandshakeType, Vec<u8>), DTLSError>;

  /// Queue `body` (already encoded) as a message of type `typ` for the
  /// current flight. Does not necessarily flush to the wire immediately.
  fn send_message(&mut self, typ: HandshakeType, body: &[u8]) -> Result<(), DTLSError>;

  /// The running transcript hash of every handshake message body sent or
  /// received so far, in send/receive order (spec.md §3 invariant 3).
  fn current_hash(&self) -> Vec<u8>;

  /// Called once the server's first flight (ServerHello..ServerHelloDone)
  /// has been queued, so the adapter can start its retransmission timer.
  fn notify_hello_complete(&mut self);

  /// Flush any queued messages and release retransmission resources.
  /// Called once after the server's Finished has been queued.
  fn finish(&mut self) -> Result<(), DTLSError>;
}
