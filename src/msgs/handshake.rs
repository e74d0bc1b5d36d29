//! Wire structures for the handshake messages this driver sends and
//! receives. Bodies only -- the DTLS handshake header (type, length,
//! message_seq, fragment_offset, fragment_length) is owned by the
//! reliable handshake adapter (spec.md §6) and never appears here.

use msgs::enums::{ProtocolVersion, CipherSuite, Compression, ExtensionType};
use msgs::enums::{ClientCertificateType, SignatureScheme};
use msgs::base::{Payload, PayloadU8, PayloadU16, CertificatePayload};
use msgs::codec::{self, Codec, Reader};

macro_rules! declare_u8_vec(
  ($name:ident, $itemtype:ty) => {
    pub type $name = Vec<$itemtype>;

    impl Codec for $name {
      fn encode(&self, bytes: &mut Vec<u8>) {
        codec::encode_vec_u8(bytes, self);
      }

      fn read(r: &mut Reader) -> Option<$name> {
        codec::read_vec_u8::<$itemtype>(r)
      }
    }
  }
);

macro_rules! declare_u16_vec(
  ($name:ident, $itemtype:ty) => {
    pub type $name = Vec<$itemtype>;

    impl Codec for $name {
      fn encode(&self, bytes: &mut Vec<u8>) {
        codec::encode_vec_u16(bytes, self);
      }

      fn read(r: &mut Reader) -> Option<$name> {
        codec::read_vec_u16::<$itemtype>(r)
      }
    }
  }
);

#[derive(Debug, Clone, PartialEq)]
pub struct Random {
  pub gmt_unix_time: u32,
  pub opaque: [u8; 28]
}

impl Codec for Random {
  fn encode(&self, bytes: &mut Vec<u8>) {
    codec::encode_u32(self.gmt_unix_time, bytes);
    bytes.extend_from_slice(&self.opaque);
  }

  fn read(r: &mut Reader) -> Option<Random> {
    let time = try_ret!(codec::read_u32(r));
    let bytes = try_ret!(r.take(28));
    let mut opaque = [0; 28];
    opaque.clone_from_slice(bytes);

    Some(Random { gmt_unix_time: time, opaque: opaque })
  }
}

impl Random {
  pub fn from_slice(bytes: &[u8; 32]) -> Random {
    let mut rd = Reader::init(bytes);
    Random::read(&mut rd).unwrap()
  }

  pub fn write_slice(&self, out: &mut [u8; 32]) {
    let buf = self.get_encoding();
    out.copy_from_slice(&buf);
  }
}

/// `opaque SessionID<0..32>`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionID {
  bytes: Vec<u8>
}

impl Codec for SessionID {
  fn encode(&self, bytes: &mut Vec<u8>) {
    debug_assert!(self.bytes.len() <= 32);
    bytes.push(self.bytes.len() as u8);
    bytes.extend_from_slice(&self.bytes);
  }

  fn read(r: &mut Reader) -> Option<SessionID> {
    let len = try_ret!(codec::read_u8(r)) as usize;
    let bytes = try_ret!(r.take(len));

    if len <= 32 {
      Some(SessionID { bytes: bytes.to_vec() })
    } else {
      None
    }
  }
}

impl SessionID {
  pub fn new(bytes: Vec<u8>) -> SessionID {
    SessionID { bytes: bytes }
  }

  pub fn empty() -> SessionID {
    SessionID { bytes: Vec::new() }
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// One TLS/DTLS extension: a 16-bit type and an opaque, length-prefixed
/// body. Per spec.md §9, iteration order is irrelevant to semantics but
/// on-wire order must be whatever the policy produced it in -- `Vec`
/// preserves that for free.
#[derive(Debug, Clone, PartialEq)]
pub struct RawExtension {
  pub typ: ExtensionType,
  pub body: PayloadU16
}

impl Codec for RawExtension {
  fn encode(&self, bytes: &mut Vec<u8>) {
    self.typ.encode(bytes);
    self.body.encode(bytes);
  }

  fn read(r: &mut Reader) -> Option<RawExtension> {
    let typ = try_ret!(ExtensionType::read(r));
    let body = try_ret!(PayloadU16::read(r));
    Some(RawExtension { typ: typ, body: body })
  }
}

impl RawExtension {
  pub fn new(typ: ExtensionType, body: Vec<u8>) -> RawExtension {
    RawExtension { typ: typ, body: PayloadU16::new(body) }
  }

  pub fn empty(typ: ExtensionType) -> RawExtension {
    RawExtension::new(typ, Vec::new())
  }
}

declare_u16_vec!(ExtensionMap, RawExtension);

/// Find an extension by type. Mirrors `ClientHelloPayload::find_extension`
/// in the teacher, generalized to both directions (client and server
/// extension maps are the same shape here).
pub fn find_extension(exts: &[RawExtension], typ: ExtensionType) -> Option<&RawExtension> {
  exts.iter().find(|x| x.typ == typ)
}

declare_u16_vec!(CipherSuites, CipherSuite);
declare_u8_vec!(CompressionMethods, Compression);

#[derive(Debug, Clone)]
pub struct ClientHelloPayload {
  pub client_version: ProtocolVersion,
  pub random: Random,
  pub session_id: SessionID,
  pub cookie: Vec<u8>,
  pub cipher_suites: Vec<CipherSuite>,
  pub compression_methods: Vec<Compression>,
  pub extensions: Vec<RawExtension>
}

impl ClientHelloPayload {
  /// Generic structural Codec parse -- the escape hatch used by
  /// `CertificateRequest`/`NewSessionTicket`-style round-trip tests.
  /// The driver does **not** call this for a real ClientHello: spec.md
  /// §4.2 requires each field's range violation to surface as a distinct
  /// alert (`illegal_parameter` vs `decode_error`), which a single
  /// `Option`-returning `Codec::read` can't express. See `parse`.
  pub fn encode(&self, bytes: &mut Vec<u8>) {
    self.client_version.encode(bytes);
    self.random.encode(bytes);
    self.session_id.encode(bytes);
    codec::encode_u8(self.cookie.len() as u8, bytes);
    bytes.extend_from_slice(&self.cookie);
    codec::encode_vec_u16(bytes, &self.cipher_suites);
    codec::encode_vec_u8(bytes, &self.compression_methods);

    if !self.extensions.is_empty() {
      codec::encode_vec_u16(bytes, &self.extensions);
    }
  }

  pub fn find_extension(&self, typ: ExtensionType) -> Option<&RawExtension> {
    find_extension(&self.extensions, typ)
  }
}

#[derive(Debug, Clone)]
pub struct ServerHelloPayload {
  pub server_version: ProtocolVersion,
  pub random: Random,
  pub session_id: SessionID,
  pub cipher_suite: CipherSuite,
  pub compression_method: Compression,
  pub extensions: Vec<RawExtension>
}

impl Codec for ServerHelloPayload {
  fn encode(&self, bytes: &mut Vec<u8>) {
    self.server_version.encode(bytes);
    self.random.encode(bytes);
    self.session_id.encode(bytes);
    self.cipher_suite.encode(bytes);
    self.compression_method.encode(bytes);

    if !self.extensions.is_empty() {
      codec::encode_vec_u16(bytes, &self.extensions);
    }
  }

  fn read(r: &mut Reader) -> Option<ServerHelloPayload> {
    let mut ret = ServerHelloPayload {
      server_version: try_ret!(ProtocolVersion::read(r)),
      random: try_ret!(Random::read(r)),
      session_id: try_ret!(SessionID::read(r)),
      cipher_suite: try_ret!(CipherSuite::read(r)),
      compression_method: try_ret!(Compression::read(r)),
      extensions: Vec::new()
    };

    if r.any_left() {
      ret.extensions = try_ret!(ExtensionMap::read(r));
    }

    Some(ret)
  }
}

declare_u8_vec!(ClientCertificateTypes, ClientCertificateType);
pub type DistinguishedName = PayloadU16;
declare_u16_vec!(DistinguishedNames, DistinguishedName);
declare_u16_vec!(SupportedSignatureSchemes, SignatureScheme);

#[derive(Debug, Clone)]
pub struct CertificateRequestPayload {
  pub certtypes: ClientCertificateTypes,
  pub sigschemes: SupportedSignatureSchemes,
  pub canames: DistinguishedNames
}

impl Codec for CertificateRequestPayload {
  fn encode(&self, bytes: &mut Vec<u8>) {
    self.certtypes.encode(bytes);
    self.sigschemes.encode(bytes);
    self.canames.encode(bytes);
  }

  fn read(r: &mut Reader) -> Option<CertificateRequestPayload> {
    Some(CertificateRequestPayload {
      certtypes: try_ret!(ClientCertificateTypes::read(r)),
      sigschemes: try_ret!(SupportedSignatureSchemes::read(r)),
      canames: try_ret!(DistinguishedNames::read(r))
    })
  }
}

#[derive(Debug, Clone)]
pub struct NewSessionTicketPayload {
  pub lifetime_hint: u32,
  pub ticket: PayloadU16
}

impl NewSessionTicketPayload {
  pub fn new(lifetime_hint: u32, ticket: Vec<u8>) -> NewSessionTicketPayload {
    NewSessionTicketPayload { lifetime_hint: lifetime_hint, ticket: PayloadU16::new(ticket) }
  }
}

impl Codec for NewSessionTicketPayload {
  fn encode(&self, bytes: &mut Vec<u8>) {
    codec::encode_u32(self.lifetime_hint, bytes);
    self.ticket.encode(bytes);
  }

  fn read(r: &mut Reader) -> Option<NewSessionTicketPayload> {
    Some(NewSessionTicketPayload {
      lifetime_hint: try_ret!(codec::read_u32(r)),
      ticket: try_ret!(PayloadU16::read(r))
    })
  }
}

/// RFC 4680 Supplemental Data -- a sequence of (type, opaque-body)
/// entries. The driver never interprets the contents (no supplemental
/// data type is defined by this spec); it only ferries them to/from the
/// policy object as an opaque blob.
#[derive(Debug, Clone)]
pub struct SupplementalDataEntry {
  pub typ: u16,
  pub data: PayloadU16
}

impl Codec for SupplementalDataEntry {
  fn encode(&self, bytes: &mut Vec<u8>) {
    codec::encode_u16(self.typ, bytes);
    self.data.encode(bytes);
  }

  fn read(r: &mut Reader) -> Option<SupplementalDataEntry> {
    Some(SupplementalDataEntry {
      typ: try_ret!(codec::read_u16(r)),
      data: try_ret!(PayloadU16::read(r))
    })
  }
}

declare_u16_vec!(SupplementalDataPayload, SupplementalDataEntry);

/// `ServerDHParams`/`ServerECDHParams` analogue: we only model the shape
/// the driver needs to frame a `ServerKeyExchange` it got from the
/// key-exchange collaborator -- the actual parameter encoding is an
/// algorithm concern owned by the `KeyExchange` trait (spec.md §4.4).
#[derive(Debug, Clone)]
pub struct ServerKeyExchangePayload(pub Payload);

impl Codec for ServerKeyExchangePayload {
  fn encode(&self, bytes: &mut Vec<u8>) {
    self.0.encode(bytes);
  }

  fn read(r: &mut Reader) -> Option<ServerKeyExchangePayload> {
    Some(ServerKeyExchangePayload(try_ret!(Payload::read(r))))
  }
}

#[derive(Debug, Clone)]
pub struct DigitallySignedStruct {
  pub scheme: SignatureScheme,
  pub sig: PayloadU16
}

impl DigitallySignedStruct {
  pub fn new(scheme: SignatureScheme, sig: Vec<u8>) -> DigitallySignedStruct {
    DigitallySignedStruct { scheme: scheme, sig: PayloadU16::new(sig) }
  }
}

impl Codec for DigitallySignedStruct {
  fn encode(&self, bytes: &mut Vec<u8>) {
    self.scheme.encode(bytes);
    self.sig.encode(bytes);
  }

  fn read(r: &mut Reader) -> Option<DigitallySignedStruct> {
    Some(DigitallySignedStruct {
      scheme: try_ret!(SignatureScheme::read(r)),
      sig: try_ret!(PayloadU16::read(r))
    })
  }
}

/// The tagged union of every handshake message body this driver parses
/// or emits. `ServerHelloDone` carries no body.
#[derive(Debug, Clone)]
pub enum HandshakePayload {
  ClientHello(ClientHelloPayload),
  ServerHello(ServerHelloPayload),
  Certificate(CertificatePayload),
  ServerKeyExchange(ServerKeyExchangePayload),
  CertificateRequest(CertificateRequestPayload),
  ServerHelloDone,
  CertificateVerify(DigitallySignedStruct),
  ClientKeyExchange(Payload),
  Finished(Payload),
  NewSessionTicket(NewSessionTicketPayload),
  SupplementalData(SupplementalDataPayload),
}

impl HandshakePayload {
  pub fn encode(&self, bytes: &mut Vec<u8>) {
    match *self {
      HandshakePayload::ClientHello(ref x) => x.encode(bytes),
      HandshakePayload::ServerHello(ref x) => x.encode(bytes),
      HandshakePayload::Certificate(ref x) => x.encode(bytes),
      HandshakePayload::ServerKeyExchange(ref x) => x.encode(bytes),
      HandshakePayload::CertificateRequest(ref x) => x.encode(bytes),
      HandshakePayload::ServerHelloDone => {},
      HandshakePayload::CertificateVerify(ref x) => x.encode(bytes),
      HandshakePayload::ClientKeyExchange(ref x) => x.encode(bytes),
      HandshakePayload::Finished(ref x) => x.encode(bytes),
      HandshakePayload::NewSessionTicket(ref x) => x.encode(bytes),
      HandshakePayload::SupplementalData(ref x) => x.encode(bytes),
    }
  }
}
