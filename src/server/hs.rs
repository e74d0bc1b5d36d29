//! The Handshake Driver (spec.md §4.1/§4.2): the orchestrating state
//! machine. Structured as one step function per state-table row, named
//! and shaped after the teacher's `emit_*`/`handle_*` pairs in
//! `server_hs.rs`, generalized from a single concrete TLS1.2 connection
//! type to the `ServerPolicy`/`RecordLayerAdapter`/`ReliableHandshakeAdapter`
//! collaborators spec.md names.

use ring::constant_time;
use ring::rand::{SecureRandom, SystemRandom};

use adapters::{RecordLayerAdapter, ReliableHandshakeAdapter};
use error::DTLSError;
use msgs::base::{CertificatePayload, Payload};
use msgs::codec::{self, Codec, Reader};
use msgs::enums::{CipherSuite, Compression, ExtensionType, HandshakeType, ProtocolVersion};
use msgs::handshake::{
  find_extension, ClientHelloPayload, DigitallySignedStruct, ExtensionMap, RawExtension, Random,
  ServerHelloPayload, SessionID, SupplementalDataPayload,
};
use prf;
use security::ServerHandshakeState;
use server::policy::ServerPolicy;
use suites;

/// Returned on success: the two collaborators, handed back ready to carry
/// application data (spec.md §6, "wrapped datagram channel").
pub struct DTLSTransport<R, H>
where
  R: RecordLayerAdapter,
  H: ReliableHandshakeAdapter,
{
  pub record: R,
  pub handshake: H,
}

/// spec.md §6: `accept(server_policy, datagram_transport) -> dtls_transport`.
///
/// `accept` is synchronous and returns only once the handshake has
/// completed or failed (spec.md §5). On failure, the driver attempts to
/// emit the corresponding fatal alert through `record` before returning
/// (spec.md §7).
pub fn accept<P, R, H>(
    policy: &mut P,
    mut record: R,
    mut hs: H) -> Result<DTLSTransport<R, H>, DTLSError>
where
  P: ServerPolicy,
  R: RecordLayerAdapter,
  H: ReliableHandshakeAdapter,
{
  let mut state = ServerHandshakeState::new();

  match drive(&mut state, policy, &mut record, &mut hs) {
    Ok(()) => {
      policy.notify_handshake_complete();
      Ok(DTLSTransport { record: record, handshake: hs })
    }
    Err(e) => {
      if let Some(alert) = e.alert_description() {
        record.send_fatal_alert(alert);
      }
      Err(e)
    }
  }
}

fn drive(
    state: &mut ServerHandshakeState,
    policy: &mut dyn ServerPolicy,
    record: &mut dyn RecordLayerAdapter,
    hs: &mut dyn ReliableHandshakeAdapter) -> Result<(), DTLSError> {
  handle_client_hello(state, policy, record, hs)?;
  send_server_hello_flight(state, policy, hs)?;

  let first = wait_client_flight1(policy, hs)?;

  let mut kx = state.key_exchange.take()
    .ok_or_else(|| DTLSError::InternalError("policy produced no key exchange object".to_string()))?;

  let kx_message = wait_client_flight1_prime(state, policy, kx.as_mut(), hs, first)?;
  wait_client_key_exchange(state, policy, kx.as_mut(), record, kx_message)?;

  state.client_finished_hash = Some(hs.current_hash());
  wait_cert_verify_or_finished(state, policy, hs)?;
  send_server_finished(state, policy, hs)?;

  Ok(())
}

/// Every handshake message body must be exactly consumed (spec.md §4.2
/// `assertEmpty`).
fn assert_empty(r: &Reader) -> Result<(), DTLSError> {
  if r.any_left() {
    Err(DTLSError::CorruptMessage("trailing bytes after handshake message body"))
  } else {
    Ok(())
  }
}

fn send_handshake_message<T: Codec>(
    hs: &mut dyn ReliableHandshakeAdapter,
    typ: HandshakeType,
    payload: &T) -> Result<(), DTLSError> {
  let body = payload.get_encoding();
  hs.send_message(typ, &body)
}

fn send_empty_handshake_message(
    hs: &mut dyn ReliableHandshakeAdapter,
    typ: HandshakeType) -> Result<(), DTLSError> {
  hs.send_message(typ, &[])
}

fn fresh_random() -> Result<[u8; 32], DTLSError> {
  let mut buf = [0u8; 32];
  SystemRandom::new().fill(&mut buf)
    .map_err(|_| DTLSError::InternalError("failed to generate server random".to_string()))?;
  Ok(buf)
}

/// spec.md §4.2 ClientHello parsing: every field-range violation surfaces
/// as the specific alert the table calls for, which is why this is a
/// dedicated parser rather than a generic `Codec::read`.
fn parse_client_hello(body: &[u8]) -> Result<ClientHelloPayload, DTLSError> {
  let mut r = Reader::init(body);

  let client_version = read_protocol_version(&mut r)?;
  if !client_version.is_dtls() {
    return Err(DTLSError::PeerMisbehavedError(
      format!("client offered non-DTLS version {:?}", client_version)));
  }

  let random_bytes = r.take(32)
    .ok_or(DTLSError::CorruptMessage("short read on client random"))?;
  let mut opaque = [0u8; 32];
  opaque.copy_from_slice(random_bytes);
  let random = Random::from_slice(&opaque);

  let session_id_len = codec::read_u8(&mut r)
    .ok_or(DTLSError::CorruptMessage("short read on session_id length"))? as usize;
  if session_id_len > 32 {
    return Err(DTLSError::PeerMisbehavedError(
      format!("session_id length {} exceeds 32", session_id_len)));
  }
  let session_id_bytes = r.take(session_id_len)
    .ok_or(DTLSError::CorruptMessage("short read on session_id"))?;
  let session_id = SessionID::new(session_id_bytes.to_vec());

  let cookie_len = codec::read_u8(&mut r)
    .ok_or(DTLSError::CorruptMessage("short read on cookie length"))? as usize;
  let cookie = r.take(cookie_len)
    .ok_or(DTLSError::CorruptMessage("short read on cookie"))?
    .to_vec();

  let cipher_suites_length = codec::read_u16(&mut r)
    .ok_or(DTLSError::CorruptMessage("short read on cipher_suites_length"))? as usize;
  if cipher_suites_length < 2 || cipher_suites_length % 2 != 0 {
    return Err(DTLSError::CorruptMessage("cipher_suites_length must be even and at least 2"));
  }
  let mut suite_reader = r.sub(cipher_suites_length)
    .ok_or(DTLSError::CorruptMessage("short read on cipher_suites"))?;
  let mut cipher_suites = Vec::with_capacity(cipher_suites_length / 2);
  while suite_reader.any_left() {
    cipher_suites.push(read_cipher_suite(&mut suite_reader)?);
  }

  let compression_methods_length = codec::read_u8(&mut r)
    .ok_or(DTLSError::CorruptMessage("short read on compression_methods_length"))? as usize;
  if compression_methods_length < 1 {
    return Err(DTLSError::PeerMisbehavedError(
      "compression_methods must not be empty".to_string()));
  }
  let mut comp_reader = r.sub(compression_methods_length)
    .ok_or(DTLSError::CorruptMessage("short read on compression_methods"))?;
  let mut compression_methods = Vec::with_capacity(compression_methods_length);
  while comp_reader.any_left() {
    compression_methods.push(read_compression(&mut comp_reader)?);
  }

  let mut extensions = Vec::new();
  if r.any_left() {
    extensions = ExtensionMap::read(&mut r)
      .ok_or(DTLSError::CorruptMessage("malformed extensions block"))?;
  }

  assert_empty(&r)?;

  Ok(ClientHelloPayload {
    client_version: client_version,
    random: random,
    session_id: session_id,
    cookie: cookie,
    cipher_suites: cipher_suites,
    compression_methods: compression_methods,
    extensions: extensions,
  })
}

/// RFC 5746 §3.6 secure-renegotiation detection. Constant-time, per
/// spec.md §9: the renegotiation_info value is secret-influenced enough
/// (an active attacker cares whether this check passes) to be worth the
/// discipline even though here it's comparing against a fixed empty value.
fn check_secure_renegotiation(client_hello: &ClientHelloPayload) -> Result<bool, DTLSError> {
  let scsv_offered = client_hello.cipher_suites
    .contains(&CipherSuite::TLS_EMPTY_RENEGOTIATION_INFO_SCSV);
  let reneg_ext = find_extension(&client_hello.extensions, ExtensionType::RenegotiationInfo);

  match reneg_ext {
    Some(ext) => {
      if constant_time::verify_slices_are_equal(&ext.body.0, &[0u8]).is_ok() {
        Ok(true)
      } else {
        Err(DTLSError::PeerIncompatibleError(
          "renegotiation_info was not empty on initial handshake".to_string()))
      }
    }
    None => Ok(scsv_offered),
  }
}

fn handle_client_hello(
    state: &mut ServerHandshakeState,
    policy: &mut dyn ServerPolicy,
    record: &mut dyn RecordLayerAdapter,
    hs: &mut dyn ReliableHandshakeAdapter) -> Result<(), DTLSError> {
  let (typ, body) = hs.receive_message()?;
  if typ != HandshakeType::ClientHello {
    return Err(DTLSError::InappropriateMessage {
      expect_types: vec![HandshakeType::ClientHello],
      got_type: typ,
    });
  }

  let client_hello = parse_client_hello(&body)?;
  debug!("received client hello offering {} cipher suites", client_hello.cipher_suites.len());

  // spec.md §9(c): trust the record layer's own version discovery, not
  // the ClientHello's self-reported version.
  state.client_version = Some(record.discovered_peer_version());
  client_hello.random.write_slice(&mut state.context.client_random);

  policy.init(&state.context);
  policy.notify_client_version(state.client_version.unwrap());
  policy.notify_offered_cipher_suites(&client_hello.cipher_suites);
  policy.notify_offered_compression_methods(&client_hello.compression_methods);

  let secure_renegotiation = check_secure_renegotiation(&client_hello)?;
  state.secure_renegotiation = secure_renegotiation;
  policy.notify_secure_renegotiation(secure_renegotiation);

  policy.process_client_extensions(&client_hello.extensions);

  state.offered_cipher_suites = client_hello.cipher_suites;
  state.offered_compression_methods = client_hello.compression_methods;
  state.client_extensions = client_hello.extensions;

  Ok(())
}

fn send_server_hello_flight(
    state: &mut ServerHandshakeState,
    policy: &mut dyn ServerPolicy,
    hs: &mut dyn ReliableHandshakeAdapter) -> Result<(), DTLSError> {
  let client_version = state.client_version
    .expect("handle_client_hello sets client_version before this runs");

  let server_version = policy.server_version();
  if server_version.is_newer_than(&client_version) {
    return Err(DTLSError::InternalError(format!(
      "policy chose server_version {:?} newer than client_version {:?}",
      server_version, client_version)));
  }
  state.server_version = Some(server_version);

  let selected_suite_id = policy.selected_cipher_suite();
  if !state.offered_cipher_suites.contains(&selected_suite_id)
      || selected_suite_id == CipherSuite::TLS_NULL_WITH_NULL_NULL
      || selected_suite_id == CipherSuite::TLS_EMPTY_RENEGOTIATION_INFO_SCSV {
    return Err(DTLSError::InternalError(format!(
      "policy selected cipher suite {:?} was not offered or is forbidden", selected_suite_id)));
  }
  if !suites::validate_selected_cipher_suite(selected_suite_id, server_version) {
    return Err(DTLSError::InternalError(format!(
      "cipher suite {:?} is inadmissible for {:?}", selected_suite_id, server_version)));
  }
  let selected_suite = suites::find_ciphersuite(selected_suite_id)
    .ok_or_else(|| DTLSError::InternalError(format!(
      "policy selected unrecognised cipher suite {:?}", selected_suite_id)))?;
  state.selected_cipher_suite = Some(selected_suite);
  state.context.prf_algorithm = Some(selected_suite.prf_algorithm());

  let selected_compression = policy.selected_compression_method();
  if !state.offered_compression_methods.contains(&selected_compression) {
    return Err(DTLSError::InternalError(format!(
      "policy selected compression method {:?} was not offered", selected_compression)));
  }
  state.selected_compression_method = Some(selected_compression);
  state.context.compression_algorithm = Some(selected_compression);

  let mut server_extensions = policy.server_extensions();
  if state.secure_renegotiation
      && find_extension(&server_extensions, ExtensionType::RenegotiationInfo).is_none() {
    server_extensions.push(RawExtension::new(ExtensionType::RenegotiationInfo, vec![0u8]));
  }
  if find_extension(&server_extensions, ExtensionType::SessionTicket).is_some() {
    state.expect_session_ticket = true;
  }
  state.server_extensions = server_extensions.clone();

  state.context.server_random = fresh_random()?;

  let sh = ServerHelloPayload {
    server_version: server_version,
    random: Random::from_slice(&state.context.server_random),
    session_id: SessionID::empty(),
    cipher_suite: selected_suite_id,
    compression_method: selected_compression,
    extensions: server_extensions,
  };

  info!("sending server hello: suite {:?}, compression {:?}", selected_suite_id, selected_compression);
  send_handshake_message(hs, HandshakeType::ServerHello, &sh)?;
  hs.notify_hello_complete();

  if let Some(supplemental) = policy.server_supplemental_data() {
    send_handshake_message(hs, HandshakeType::SupplementalData, &supplemental)?;
  }

  let mut kx = policy.key_exchange();
  if let Some(ref mut k) = kx {
    k.init(&state.context);
  }

  let credentials = policy.credentials();
  match (credentials.as_ref(), kx.as_mut()) {
    (Some(creds), Some(k)) => {
      k.process_server_credentials(creds)?;
      send_handshake_message(hs, HandshakeType::Certificate, &creds.cert_chain)?;
    }
    (Some(creds), None) => {
      send_handshake_message(hs, HandshakeType::Certificate, &creds.cert_chain)?;
    }
    (None, Some(k)) => k.skip_server_credentials(),
    (None, None) => {}
  }

  if let Some(ref mut k) = kx {
    if let Some(skx) = k.generate_server_key_exchange()? {
      send_handshake_message(hs, HandshakeType::ServerKeyExchange, &skx)?;
    }
  }

  if credentials.is_some() {
    if let Some(cert_req) = policy.certificate_request() {
      if let Some(ref k) = kx {
        k.validate_certificate_request(&cert_req)?;
      }
      debug!("sending certificate request");
      send_handshake_message(hs, HandshakeType::CertificateRequest, &cert_req)?;
      state.certificate_request = Some(cert_req);
      state.doing_client_auth = true;
    }
  }

  send_empty_handshake_message(hs, HandshakeType::ServerHelloDone)?;

  state.key_exchange = kx;
  Ok(())
}

fn wait_client_flight1(
    policy: &mut dyn ServerPolicy,
    hs: &mut dyn ReliableHandshakeAdapter) -> Result<(HandshakeType, Vec<u8>), DTLSError> {
  let (typ, body) = hs.receive_message()?;

  if typ == HandshakeType::SupplementalData {
    let mut r = Reader::init(&body);
    let supplemental = SupplementalDataPayload::read(&mut r)
      .ok_or(DTLSError::CorruptMessage("malformed SupplementalData"))?;
    assert_empty(&r)?;
    policy.process_client_supplemental_data(Some(&supplemental));
    hs.receive_message()
  } else {
    policy.process_client_supplemental_data(None);
    Ok((typ, body))
  }
}

fn wait_client_flight1_prime(
    state: &mut ServerHandshakeState,
    policy: &mut dyn ServerPolicy,
    kx: &mut dyn super::policy::KeyExchange,
    hs: &mut dyn ReliableHandshakeAdapter,
    first: (HandshakeType, Vec<u8>)) -> Result<(HandshakeType, Vec<u8>), DTLSError> {
  let (typ, body) = first;

  if typ == HandshakeType::Certificate {
    if state.certificate_request.is_none() {
      return Err(DTLSError::InappropriateMessage {
        expect_types: vec![HandshakeType::ClientKeyExchange],
        got_type: HandshakeType::Certificate,
      });
    }

    let mut r = Reader::init(&body);
    let cert_chain = CertificatePayload::read(&mut r)
      .ok_or(DTLSError::CorruptMessage("malformed Certificate"))?;
    assert_empty(&r)?;

    if cert_chain.is_empty() {
      // spec.md §6 Configuration Surface: `verify_requests` governs
      // whether a client may decline a CertificateRequest outright.
      if policy.config().get_verify_requests() {
        return Err(DTLSError::PeerIncompatibleError(
          "client declined to present a certificate after CertificateRequest".to_string()));
      }
      state.doing_client_auth = false;
      kx.skip_client_credentials();
    } else {
      debug!("client presented a {}-certificate chain", cert_chain.len());
      kx.process_client_certificate(&cert_chain)?;
      state.client_cert_chain = Some(cert_chain);
    }

    hs.receive_message()
  } else if state.certificate_request.is_some() && policy.config().get_verify_requests() {
    return Err(DTLSError::PeerIncompatibleError(
      "client skipped Certificate after CertificateRequest".to_string()));
  } else {
    kx.skip_client_credentials();
    Ok((typ, body))
  }
}

fn wait_client_key_exchange(
    state: &mut ServerHandshakeState,
    policy: &mut dyn ServerPolicy,
    kx: &mut dyn super::policy::KeyExchange,
    record: &mut dyn RecordLayerAdapter,
    message: (HandshakeType, Vec<u8>)) -> Result<(), DTLSError> {
  let (typ, body) = message;
  if typ != HandshakeType::ClientKeyExchange {
    return Err(DTLSError::InappropriateMessage {
      expect_types: vec![HandshakeType::ClientKeyExchange],
      got_type: typ,
    });
  }

  kx.process_client_key_exchange(&body)?;

  let master_secret = kx.establish_master_secret(
    &state.context.client_random, &state.context.server_random)?;
  state.context.master_secret = Some(master_secret);

  let cipher = policy.cipher();
  record.init_pending_epoch(cipher)?;

  Ok(())
}

fn wait_cert_verify_or_finished(
    state: &mut ServerHandshakeState,
    policy: &mut dyn ServerPolicy,
    hs: &mut dyn ReliableHandshakeAdapter) -> Result<(), DTLSError> {
  let (typ, body) = hs.receive_message()?;

  match typ {
    HandshakeType::CertificateVerify => {
      let mut r = Reader::init(&body);
      let sig = DigitallySignedStruct::read(&mut r)
        .ok_or(DTLSError::CorruptMessage("malformed CertificateVerify"))?;
      assert_empty(&r)?;

      let cert_chain = state.client_cert_chain.as_ref()
        .ok_or_else(|| DTLSError::InternalError(
          "CertificateVerify received with no client certificate on file".to_string()))?;
      let verifier = policy.client_auth_verifier()
        .ok_or_else(|| DTLSError::InternalError(
          "policy requested client auth but supplies no verifier".to_string()))?;

      // Verify over the transcript snapshotted at `SnapshotHash` (spec.md
      // §4.1), i.e. up to but not including CertificateVerify itself
      // (RFC 5246 §7.4.8) -- not `hs.current_hash()`, which by now already
      // includes CertificateVerify's own bytes.
      let transcript = state.client_finished_hash.as_ref()
        .ok_or_else(|| DTLSError::InternalError(
          "CertificateVerify received before the pre-CV transcript was snapshotted".to_string()))?;
      verifier.verify(cert_chain, transcript, sig.scheme, &sig.sig.0)?;
      debug!("client CertificateVerify ok");

      state.client_finished_hash = Some(hs.current_hash());

      let (typ2, body2) = hs.receive_message()?;
      if typ2 != HandshakeType::Finished {
        return Err(DTLSError::InappropriateMessage {
          expect_types: vec![HandshakeType::Finished],
          got_type: typ2,
        });
      }
      verify_client_finished(state, &body2)
    }
    HandshakeType::Finished => verify_client_finished(state, &body),
    other => Err(DTLSError::InappropriateMessage {
      expect_types: vec![HandshakeType::CertificateVerify, HandshakeType::Finished],
      got_type: other,
    }),
  }
}

fn verify_client_finished(state: &ServerHandshakeState, body: &[u8]) -> Result<(), DTLSError> {
  let mut r = Reader::init(body);
  let finished = Payload::read(&mut r)
    .ok_or(DTLSError::CorruptMessage("malformed Finished"))?;
  assert_empty(&r)?;

  let suite = state.selected_cipher_suite
    .ok_or_else(|| DTLSError::InternalError("Finished received before cipher suite selection".to_string()))?;
  let alg = prf::digest_for(suite.prf_algorithm())
    .ok_or_else(|| DTLSError::InternalError("unsupported PRF hash algorithm".to_string()))?;
  let master_secret = state.context.master_secret
    .ok_or_else(|| DTLSError::InternalError("Finished received before master secret established".to_string()))?;
  let transcript = state.client_finished_hash.as_ref()
    .ok_or_else(|| DTLSError::InternalError("Finished received before transcript snapshot".to_string()))?;

  let expected = prf::verify_data(
    &master_secret, b"client finished", transcript, alg, state.context.verify_data_length);

  constant_time::verify_slices_are_equal(&expected, &finished.0)
    .map_err(|_| { error!("client Finished verify_data mismatch"); DTLSError::DecryptError })?;

  Ok(())
}

fn send_server_finished(
    state: &mut ServerHandshakeState,
    policy: &mut dyn ServerPolicy,
    hs: &mut dyn ReliableHandshakeAdapter) -> Result<(), DTLSError> {
  if state.expect_session_ticket {
    let ticket = policy.new_session_ticket();
    send_handshake_message(hs, HandshakeType::NewSessionTicket, &ticket)?;
  }

  let suite = state.selected_cipher_suite
    .ok_or_else(|| DTLSError::InternalError("no cipher suite selected".to_string()))?;
  let alg = prf::digest_for(suite.prf_algorithm())
    .ok_or_else(|| DTLSError::InternalError("unsupported PRF hash algorithm".to_string()))?;
  let master_secret = state.context.master_secret
    .ok_or_else(|| DTLSError::InternalError("no master secret established".to_string()))?;

  let transcript = hs.current_hash();
  let verify_data = prf::verify_data(
    &master_secret, b"server finished", &transcript, alg, state.context.verify_data_length);

  debug!("sending server finished");
  send_handshake_message(hs, HandshakeType::Finished, &Payload::new(verify_data))?;

  hs.finish()?;
  Ok(())
}

// Thin local helpers so `parse_client_hello` reads as a straight field
// list without repeating `X::read(&mut r).ok_or(...)` at every line;
// each maps a structural short-read to `decode_error`.
fn read_protocol_version(r: &mut Reader) -> Result<ProtocolVersion, DTLSError> {
  ProtocolVersion::read(r).ok_or(DTLSError::CorruptMessage("short read on client_version"))
}

fn read_cipher_suite(r: &mut Reader) -> Result<CipherSuite, DTLSError> {
  CipherSuite::read(r).ok_or(DTLSError::CorruptMessage("short read inside cipher_suites"))
}

fn read_compression(r: &mut Reader) -> Result<Compression, DTLSError> {
  Compression::read(r).ok_or(DTLSError::CorruptMessage("short read inside compression_methods"))
}

#[cfg(test)]
pub mod test_support;
