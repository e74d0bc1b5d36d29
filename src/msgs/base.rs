use msgs::codec::{Codec, Reader, encode_u8, encode_u16, encode_u24, read_u16, read_u24, read_vec_u8_bytes};

/// An opaque, unframed blob of bytes -- consumes the whole of whatever
/// reader it's handed. Used for message bodies whose interpretation the
/// codec layer deliberately defers (e.g. ClientKeyExchange, Finished).
#[derive(Debug, Clone, PartialEq)]
pub struct Payload(pub Vec<u8>);

impl Codec for Payload {
  fn encode(&self, bytes: &mut Vec<u8>) {
    bytes.extend_from_slice(&self.0);
  }

  fn read(r: &mut Reader) -> Option<Payload> {
    Some(Payload(r.rest().to_vec()))
  }
}

impl Payload {
  pub fn new(bytes: Vec<u8>) -> Payload {
    Payload(bytes)
  }

  pub fn empty() -> Payload {
    Payload(Vec::new())
  }
}

/// An opaque vector with a 1-byte length-of-contents prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadU8(pub Vec<u8>);

impl Codec for PayloadU8 {
  fn encode(&self, bytes: &mut Vec<u8>) {
    debug_assert!(self.0.len() <= 0xff);
    encode_u8(self.0.len() as u8, bytes);
    bytes.extend_from_slice(&self.0);
  }

  fn read(r: &mut Reader) -> Option<PayloadU8> {
    Some(PayloadU8(try_ret!(read_vec_u8_bytes(r))))
  }
}

impl PayloadU8 {
  pub fn new(bytes: Vec<u8>) -> PayloadU8 {
    PayloadU8(bytes)
  }
}

/// An opaque vector with a 2-byte length-of-contents prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadU16(pub Vec<u8>);

impl Codec for PayloadU16 {
  fn encode(&self, bytes: &mut Vec<u8>) {
    debug_assert!(self.0.len() <= 0xffff);
    encode_u16(self.0.len() as u16, bytes);
    bytes.extend_from_slice(&self.0);
  }

  fn read(r: &mut Reader) -> Option<PayloadU16> {
    let len = try_ret!(read_u16(r)) as usize;
    let bytes = try_ret!(r.take(len));
    Some(PayloadU16(bytes.to_vec()))
  }
}

impl PayloadU16 {
  pub fn new(bytes: Vec<u8>) -> PayloadU16 {
    PayloadU16(bytes)
  }
}

/// An opaque vector with a 3-byte length-of-contents prefix. Used for the
/// Certificate message's outer `ASN.1Cert certificate_list<0..2^24-1>`.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadU24(pub Vec<u8>);

impl Codec for PayloadU24 {
  fn encode(&self, bytes: &mut Vec<u8>) {
    debug_assert!(self.0.len() <= 0xff_ffff);
    encode_u24(self.0.len() as u32, bytes);
    bytes.extend_from_slice(&self.0);
  }

  fn read(r: &mut Reader) -> Option<PayloadU24> {
    let len = try_ret!(read_u24(r)) as usize;
    let bytes = try_ret!(r.take(len));
    Some(PayloadU24(bytes.to_vec()))
  }
}

/// A DER-encoded X.509 certificate, opaque to this crate (certificate
/// chain validation is out of scope; see spec.md Non-goals).
#[derive(Debug, Clone, PartialEq)]
pub struct Certificate(pub Vec<u8>);

impl Codec for Certificate {
  fn encode(&self, bytes: &mut Vec<u8>) {
    debug_assert!(self.0.len() <= 0xff_ffff);
    encode_u24(self.0.len() as u32, bytes);
    bytes.extend_from_slice(&self.0);
  }

  fn read(r: &mut Reader) -> Option<Certificate> {
    let len = try_ret!(read_u24(r)) as usize;
    let body = try_ret!(r.take(len));
    Some(Certificate(body.to_vec()))
  }
}

/// `ASN.1Cert certificate_list<0..2^24-1>` -- a chain, leaf first.
pub type CertificatePayload = Vec<Certificate>;

impl Codec for CertificatePayload {
  fn encode(&self, bytes: &mut Vec<u8>) {
    let mut sub = Vec::new();
    for cert in self {
      cert.encode(&mut sub);
    }
    debug_assert!(sub.len() <= 0xff_ffff);
    encode_u24(sub.len() as u32, bytes);
    bytes.append(&mut sub);
  }

  fn read(r: &mut Reader) -> Option<CertificatePayload> {
    let len = try_ret!(read_u24(r)) as usize;
    let mut sub = try_ret!(r.sub(len));
    let mut ret = Vec::new();

    while sub.any_left() {
      ret.push(try_ret!(Certificate::read(&mut sub)));
    }

    Some(ret)
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use msgs::codec::Reader;

  #[test]
  fn payload_u8_roundtrip() {
    let p = PayloadU8::new(vec![1, 2, 3]);
    let enc = p.get_encoding();
    assert_eq!(enc, vec![3, 1, 2, 3]);
    let mut r = Reader::init(&enc);
    assert_eq!(PayloadU8::read(&mut r).unwrap(), p);
  }

  #[test]
  fn payload_u16_roundtrip() {
    let p = PayloadU16::new(vec![9; 300]);
    let enc = p.get_encoding();
    let mut r = Reader::init(&enc);
    assert_eq!(PayloadU16::read(&mut r).unwrap(), p);
  }

  #[test]
  fn certificate_chain_roundtrip() {
    let chain: CertificatePayload = vec![Certificate(vec![1, 2, 3]), Certificate(vec![4, 5])];
    let enc = chain.get_encoding();
    let mut r = Reader::init(&enc);
    let back = CertificatePayload::read(&mut r).unwrap();
    assert_eq!(back, chain);
  }
}
