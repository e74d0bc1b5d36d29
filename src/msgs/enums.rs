use msgs::codec::{Codec, Reader, encode_u8, encode_u16, read_u8, read_u16};

/// Declares a "closed but extensible" wire enumeration backed by `u8`:
/// named variants plus an `Unknown(u8)` catch-all, matching the RFC
/// style of `enum { a(1), b(2), (255) } Foo;`
macro_rules! enum_u8 {
  ($(#[$meta:meta])* pub enum $name:ident { $( $variant:ident = $value:expr ),* $(,)* }) => {
    $(#[$meta])*
    #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
    pub enum $name {
      $( $variant ),*,
      Unknown(u8)
    }

    impl $name {
      pub fn get_u8(&self) -> u8 {
        match *self {
          $( $name::$variant => $value ),*,
          $name::Unknown(x) => x
        }
      }

      pub fn from_u8(x: u8) -> $name {
        match x {
          $( $value => $name::$variant ),*,
          _ => $name::Unknown(x)
        }
      }
    }

    impl Codec for $name {
      fn encode(&self, bytes: &mut Vec<u8>) {
        encode_u8(self.get_u8(), bytes);
      }

      fn read(r: &mut Reader) -> Option<$name> {
        read_u8(r).map($name::from_u8)
      }
    }
  }
}

/// As `enum_u8!`, but backed by `u16`.
macro_rules! enum_u16 {
  ($(#[$meta:meta])* pub enum $name:ident { $( $variant:ident = $value:expr ),* $(,)* }) => {
    $(#[$meta])*
    #[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
    pub enum $name {
      $( $variant ),*,
      Unknown(u16)
    }

    impl $name {
      pub fn get_u16(&self) -> u16 {
        match *self {
          $( $name::$variant => $value ),*,
          $name::Unknown(x) => x
        }
      }

      pub fn from_u16(x: u16) -> $name {
        match x {
          $( $value => $name::$variant ),*,
          _ => $name::Unknown(x)
        }
      }
    }

    impl Codec for $name {
      fn encode(&self, bytes: &mut Vec<u8>) {
        encode_u16(self.get_u16(), bytes);
      }

      fn read(r: &mut Reader) -> Option<$name> {
        read_u16(r).map($name::from_u16)
      }
    }
  }
}

enum_u16! {
  /// RFC 6347 (DTLS) carries the same version space as TLS, with the
  /// version number one's-complemented, e.g. DTLS 1.2 is wire value
  /// 0xFEFD, DTLS 1.0 is 0xFEFF.
  pub enum ProtocolVersion {
    DTLSv1_0 = 0xfeff,
    DTLSv1_2 = 0xfefd,
  }
}

impl ProtocolVersion {
  /// True for the two DTLS versions this driver negotiates.
  pub fn is_dtls(&self) -> bool {
    matches!(*self, ProtocolVersion::DTLSv1_0 | ProtocolVersion::DTLSv1_2)
  }

  /// Protocol age, oldest first. DTLS's on-wire version numbers run
  /// backwards (1.2 is 0xfefd, 1.0 is 0xfeff), so comparing `get_u16()`
  /// directly gets "newer" backwards -- this is the ordinal to compare on
  /// instead. `None` for anything that isn't a DTLS version this driver
  /// recognises.
  pub fn dtls_ordinal(&self) -> Option<u8> {
    match *self {
      ProtocolVersion::DTLSv1_0 => Some(0),
      ProtocolVersion::DTLSv1_2 => Some(1),
      ProtocolVersion::Unknown(_) => None,
    }
  }

  /// True iff `self` is a strictly newer DTLS version than `other`.
  /// Unrecognised versions never compare newer than anything.
  pub fn is_newer_than(&self, other: &ProtocolVersion) -> bool {
    match (self.dtls_ordinal(), other.dtls_ordinal()) {
      (Some(a), Some(b)) => a > b,
      _ => false,
    }
  }
}

enum_u8! {
  pub enum ContentType {
    ChangeCipherSpec = 20,
    Alert = 21,
    Handshake = 22,
    ApplicationData = 23,
  }
}

enum_u8! {
  pub enum HandshakeType {
    HelloRequest = 0,
    ClientHello = 1,
    ServerHello = 2,
    HelloVerifyRequest = 3,
    Certificate = 11,
    ServerKeyExchange = 12,
    CertificateRequest = 13,
    ServerHelloDone = 14,
    CertificateVerify = 15,
    ClientKeyExchange = 16,
    Finished = 20,
    CertificateURL = 21,
    CertificateStatus = 22,
    SupplementalData = 23,
    NewSessionTicket = 4,
  }
}

enum_u8! {
  pub enum AlertLevel {
    Warning = 1,
    Fatal = 2,
  }
}

enum_u8! {
  /// Alert descriptions this driver is specified to raise (spec.md §6),
  /// plus the handful more needed to decode an arbitrary peer alert.
  pub enum AlertDescription {
    CloseNotify = 0,
    UnexpectedMessage = 10,
    BadRecordMac = 20,
    DecryptionFailed = 21,
    RecordOverflow = 22,
    DecompressionFailure = 30,
    HandshakeFailure = 40,
    NoCertificate = 41,
    BadCertificate = 42,
    UnsupportedCertificate = 43,
    CertificateRevoked = 44,
    CertificateExpired = 45,
    CertificateUnknown = 46,
    IllegalParameter = 47,
    UnknownCA = 48,
    AccessDenied = 49,
    DecodeError = 50,
    DecryptError = 51,
    ProtocolVersion = 70,
    InsufficientSecurity = 71,
    InternalError = 80,
    UserCanceled = 90,
    NoRenegotiation = 100,
  }
}

enum_u16! {
  /// A non-exhaustive selection of assigned cipher suites: enough static-RSA
  /// and ECDHE suites to exercise selection policy, plus the two pseudo
  /// suites the driver must special-case (`TLS_NULL_WITH_NULL_NULL` can
  /// never be selected; the SCSV signals secure renegotiation capability
  /// without naming a real cipher).
  pub enum CipherSuite {
    TLS_NULL_WITH_NULL_NULL = 0x0000,
    TLS_RSA_WITH_AES_128_CBC_SHA = 0x002f,
    TLS_RSA_WITH_AES_256_CBC_SHA = 0x0035,
    TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256 = 0xc02f,
    TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384 = 0xc030,
    TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256 = 0xc02b,
    TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384 = 0xc02c,
    TLS_EMPTY_RENEGOTIATION_INFO_SCSV = 0x00ff,
  }
}

enum_u8! {
  pub enum Compression {
    Null = 0,
  }
}

enum_u16! {
  pub enum ExtensionType {
    ServerName = 0,
    ECPointFormats = 11,
    SupportedGroups = 10,
    SignatureAlgorithms = 13,
    SessionTicket = 35,
    RenegotiationInfo = 0xff01,
  }
}

enum_u8! {
  pub enum ClientCertificateType {
    RSASign = 1,
    ECDSASign = 64,
  }
}

enum_u8! {
  pub enum HashAlgorithm {
    None = 0,
    MD5 = 1,
    SHA1 = 2,
    SHA224 = 3,
    SHA256 = 4,
    SHA384 = 5,
    SHA512 = 6,
  }
}

enum_u8! {
  pub enum SignatureAlgorithm {
    Anonymous = 0,
    RSA = 1,
    DSA = 2,
    ECDSA = 3,
  }
}

/// `(HashAlgorithm, SignatureAlgorithm)` packed into one `u16`, per the
/// `SignatureScheme` enumeration TLS 1.2 introduced (RFC 5246 §7.4.1.4.1).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct SignatureScheme(pub HashAlgorithm, pub SignatureAlgorithm);

impl SignatureScheme {
  pub fn make(sign: SignatureAlgorithm, hash: HashAlgorithm) -> SignatureScheme {
    SignatureScheme(hash, sign)
  }
}

impl Codec for SignatureScheme {
  fn encode(&self, bytes: &mut Vec<u8>) {
    self.0.encode(bytes);
    self.1.encode(bytes);
  }

  fn read(r: &mut Reader) -> Option<SignatureScheme> {
    let hash = try_ret!(HashAlgorithm::read(r));
    let sign = try_ret!(SignatureAlgorithm::read(r));
    Some(SignatureScheme(hash, sign))
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn protocol_version_roundtrip() {
    let enc = ProtocolVersion::DTLSv1_2.get_encoding();
    assert_eq!(enc, vec![0xfe, 0xfd]);
    let mut r = Reader::init(&enc);
    assert_eq!(ProtocolVersion::read(&mut r), Some(ProtocolVersion::DTLSv1_2));
  }

  #[test]
  fn unknown_cipher_suite_roundtrips() {
    let enc = CipherSuite::Unknown(0xdead).get_encoding();
    let mut r = Reader::init(&enc);
    assert_eq!(CipherSuite::read(&mut r), Some(CipherSuite::Unknown(0xdead)));
  }

  #[test]
  fn scsv_is_distinguishable_from_null_null() {
    assert_ne!(CipherSuite::TLS_EMPTY_RENEGOTIATION_INFO_SCSV,
               CipherSuite::TLS_NULL_WITH_NULL_NULL);
  }

  #[test]
  fn dtls_1_2_is_newer_than_dtls_1_0() {
    assert!(ProtocolVersion::DTLSv1_2.is_newer_than(&ProtocolVersion::DTLSv1_0));
    assert!(!ProtocolVersion::DTLSv1_0.is_newer_than(&ProtocolVersion::DTLSv1_2));
    assert!(ProtocolVersion::DTLSv1_2.get_u16() < ProtocolVersion::DTLSv1_0.get_u16());
  }
}
