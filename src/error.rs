use std::fmt;
use std::error::Error;

use msgs::enums::{HandshakeType, AlertDescription};

/// Everything that can make the handshake driver give up.
///
/// Every variant is fatal (spec.md §7: "all errors are fatal for the
/// handshake"); `alert_description` gives the alert the driver should
/// attempt to send through the record layer adapter before closing the
/// pending epoch, or `None` when no alert can meaningfully be sent (a
/// transport failure, or failure that happened before any epoch existed).
#[derive(Debug)]
pub enum DTLSError {
  /// The peer sent a message type this state of the handshake does not
  /// accept (spec.md §4.1: "Unexpected messages fail with alert
  /// `unexpected_message`").
  InappropriateMessage {
    expect_types: Vec<HandshakeType>,
    got_type: HandshakeType
  },

  /// A structurally malformed message: short read, bad length, trailing
  /// bytes after `assertEmpty` (spec.md §4.2).
  CorruptMessage(&'static str),

  /// A field was present and well-formed but out of the range the
  /// protocol allows (bad session_id length, empty compression list,
  /// non-empty renegotiation_info, a selection outside the offered set).
  PeerMisbehavedError(String),

  /// The peer is running a variant of the protocol we don't implement
  /// (pre-DTLS-1.2 version, no ciphersuites in common).
  PeerIncompatibleError(String),

  /// Our own policy object returned something the driver's invariants
  /// forbid (server_version newer than client_version, a forbidden
  /// ciphersuite).
  InternalError(String),

  /// The received Finished verify_data did not match (spec.md §4.5).
  DecryptError,

  /// A fatal alert the peer sent us.
  AlertReceived(AlertDescription),

  /// Catch-all for conditions that don't fit the above but are still
  /// unambiguously fatal (e.g. a credentials/key-exchange callback
  /// failing for reasons opaque to the driver).
  General(String),

  /// The transport (or the adapters wrapping it) failed. No alert can be
  /// sent over a connection that is already broken.
  TransportError(String),

  /// `accept()` was called with a null/missing collaborator.
  InvalidArgument(&'static str),
}

impl DTLSError {
  /// The alert the driver should attempt to send for this error, per the
  /// mapping in spec.md §7. `None` means "don't bother" -- either no
  /// alert is defined (a transport error) or none can be trusted to
  /// arrive.
  pub fn alert_description(&self) -> Option<AlertDescription> {
    match *self {
      DTLSError::InappropriateMessage { .. } => Some(AlertDescription::UnexpectedMessage),
      DTLSError::CorruptMessage(_) => Some(AlertDescription::DecodeError),
      DTLSError::PeerMisbehavedError(_) => Some(AlertDescription::IllegalParameter),
      DTLSError::PeerIncompatibleError(_) => Some(AlertDescription::HandshakeFailure),
      DTLSError::InternalError(_) => Some(AlertDescription::InternalError),
      DTLSError::DecryptError => Some(AlertDescription::DecryptError),
      DTLSError::AlertReceived(_) => None,
      DTLSError::General(_) => Some(AlertDescription::InternalError),
      DTLSError::TransportError(_) => None,
      DTLSError::InvalidArgument(_) => None,
    }
  }
}

impl fmt::Display for DTLSError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      DTLSError::InappropriateMessage { ref expect_types, ref got_type } =>
        write!(f, "received unexpected handshake message {:?} (wanted one of {:?})", got_type, expect_types),
      DTLSError::CorruptMessage(what) => write!(f, "corrupt message: {}", what),
      DTLSError::PeerMisbehavedError(ref s) => write!(f, "peer misbehaved: {}", s),
      DTLSError::PeerIncompatibleError(ref s) => write!(f, "peer incompatible: {}", s),
      DTLSError::InternalError(ref s) => write!(f, "internal error: {}", s),
      DTLSError::DecryptError => write!(f, "decryption or verification failed"),
      DTLSError::AlertReceived(ref a) => write!(f, "peer sent fatal alert: {:?}", a),
      DTLSError::General(ref s) => write!(f, "{}", s),
      DTLSError::TransportError(ref s) => write!(f, "transport error: {}", s),
      DTLSError::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
    }
  }
}

impl Error for DTLSError {}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn alert_mapping_matches_spec_table() {
    assert_eq!(DTLSError::PeerMisbehavedError("x".into()).alert_description(),
               Some(AlertDescription::IllegalParameter));
    assert_eq!(DTLSError::CorruptMessage("short read").alert_description(),
               Some(AlertDescription::DecodeError));
    assert_eq!(DTLSError::InternalError("x".into()).alert_description(),
               Some(AlertDescription::InternalError));
    assert_eq!(DTLSError::DecryptError.alert_description(),
               Some(AlertDescription::DecryptError));
    assert_eq!(DTLSError::InappropriateMessage {
                 expect_types: vec![HandshakeType::ClientHello],
                 got_type: HandshakeType::Certificate
               }.alert_description(),
               Some(AlertDescription::UnexpectedMessage));
    assert_eq!(DTLSError::TransportError("io".into()).alert_description(), None);
  }
}
