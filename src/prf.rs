//! The TLS/DTLS pseudo-random function (RFC 5246 §5), used only to derive
//! Finished `verify_data` (spec.md §4.5). Master-secret derivation itself
//! is the key-exchange algorithm's job (spec.md §4.4
//! `establishMasterSecret`) and never touches this module.

use ring::{digest, hmac};

use msgs::enums::HashAlgorithm;

/// Maps a negotiated PRF hash to the `ring` digest algorithm it names.
/// `None` for any hash this driver's cipher suite table never selects.
pub fn digest_for(hash: HashAlgorithm) -> Option<&'static digest::Algorithm> {
  match hash {
    HashAlgorithm::SHA1 => Some(&digest::SHA1),
    HashAlgorithm::SHA256 => Some(&digest::SHA256),
    HashAlgorithm::SHA384 => Some(&digest::SHA384),
    HashAlgorithm::SHA512 => Some(&digest::SHA512),
    _ => None,
  }
}

fn concat_sign(key: &hmac::SigningKey, a: &[u8], b: &[u8]) -> hmac::Signature {
  let mut ctx = hmac::SigningContext::with_key(key);
  ctx.update(a);
  ctx.update(b);
  ctx.sign()
}

/// RFC 5246 §5 `P_hash`: `HMAC(secret, A(1) + seed) || HMAC(secret, A(2) + seed) || ...`
fn p(out: &mut [u8], secret: &[u8], seed: &[u8], alg: &'static digest::Algorithm) {
  let hmac_key = hmac::SigningKey::new(alg, secret);
  let mut a = hmac::sign(&hmac_key, seed);
  let mut offs = 0;

  while offs < out.len() {
    let block = concat_sign(&hmac_key, a.as_ref(), seed);
    let block = block.as_ref();
    let remaining = out.len() - offs;
    let take = if remaining < block.len() { remaining } else { block.len() };
    out[offs..offs + take].copy_from_slice(&block[..take]);
    offs += take;
    a = hmac::sign(&hmac_key, a.as_ref());
  }
}

/// `PRF(secret, label, seed)` truncated to `out.len()` bytes.
pub fn prf(out: &mut [u8], secret: &[u8], label: &[u8], seed: &[u8], alg: &'static digest::Algorithm) {
  let mut label_seed = Vec::with_capacity(label.len() + seed.len());
  label_seed.extend_from_slice(label);
  label_seed.extend_from_slice(seed);
  p(out, secret, &label_seed, alg);
}

/// `verify_data = PRF(master_secret, label, transcript_hash)` truncated to
/// `verify_data_length` (spec.md §4.5). `label` is `"client finished"` or
/// `"server finished"`.
pub fn verify_data(
    master_secret: &[u8],
    label: &[u8],
    transcript_hash: &[u8],
    alg: &'static digest::Algorithm,
    verify_data_length: usize) -> Vec<u8> {
  let mut out = vec![0u8; verify_data_length];
  prf(&mut out, master_secret, label, transcript_hash, alg);
  out
}
