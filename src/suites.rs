//! Cipher suite table and selection helpers.
//!
//! Adapted from the teacher's `suites.rs`: the table shape (`suite`,
//! `hash`) and the two `choose_ciphersuite_preferring_*` helpers are kept
//! almost verbatim. The concrete ECDHE/AEAD machinery the teacher carries
//! alongside them is dropped here -- spec.md §4.4 makes key exchange and
//! bulk cipher selection a pluggable `KeyExchange`/policy concern owned by
//! `server::policy`, not something this table computes.

use msgs::enums::{CipherSuite, HashAlgorithm, ProtocolVersion};

/// A cipher suite this driver knows the name and PRF hash of. Concrete
/// key exchange and record protection are the `KeyExchange` trait's and
/// the record layer adapter's job respectively (spec.md §1, §4.4).
#[derive(Debug, Clone, Copy)]
pub struct SupportedCipherSuite {
  pub suite: CipherSuite,
  pub hash: HashAlgorithm,
}

impl PartialEq for SupportedCipherSuite {
  fn eq(&self, other: &SupportedCipherSuite) -> bool {
    self.suite == other.suite
  }
}

impl SupportedCipherSuite {
  /// `SecurityParameters.prf_algorithm` is derived from the selected
  /// suite (spec.md §3); for every suite this driver names, the PRF hash
  /// is the suite's own hash.
  pub fn prf_algorithm(&self) -> HashAlgorithm {
    self.hash
  }
}

pub static TLS_RSA_WITH_AES_128_CBC_SHA: SupportedCipherSuite = SupportedCipherSuite {
  suite: CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA,
  hash: HashAlgorithm::SHA1,
};

pub static TLS_RSA_WITH_AES_256_CBC_SHA: SupportedCipherSuite = SupportedCipherSuite {
  suite: CipherSuite::TLS_RSA_WITH_AES_256_CBC_SHA,
  hash: HashAlgorithm::SHA1,
};

pub static TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256: SupportedCipherSuite = SupportedCipherSuite {
  suite: CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
  hash: HashAlgorithm::SHA256,
};

pub static TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384: SupportedCipherSuite = SupportedCipherSuite {
  suite: CipherSuite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
  hash: HashAlgorithm::SHA384,
};

pub static TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256: SupportedCipherSuite = SupportedCipherSuite {
  suite: CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
  hash: HashAlgorithm::SHA256,
};

pub static TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384: SupportedCipherSuite = SupportedCipherSuite {
  suite: CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
  hash: HashAlgorithm::SHA384,
};

/// Every cipher suite this driver can select. `TLS_NULL_WITH_NULL_NULL`
/// and the SCSV are deliberately absent: spec.md §3 forbids selecting
/// either, so they never belong in a "selectable" table.
pub static ALL_CIPHERSUITES: [&SupportedCipherSuite; 6] = [
  &TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
  &TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
  &TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
  &TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
  &TLS_RSA_WITH_AES_256_CBC_SHA,
  &TLS_RSA_WITH_AES_128_CBC_SHA,
];

pub fn find_ciphersuite(suite: CipherSuite) -> Option<&'static SupportedCipherSuite> {
  ALL_CIPHERSUITES.iter().find(|x| x.suite == suite).cloned()
}

/// Client preference order wins: pick the first of the client's offered
/// suites that we also support.
pub fn choose_ciphersuite_preferring_client(
    client_suites: &[CipherSuite],
    server_suites: &[&'static SupportedCipherSuite]) -> Option<&'static SupportedCipherSuite> {
  for client_suite in client_suites {
    if let Some(selected) = server_suites.iter().find(|x| *client_suite == x.suite) {
      return Some(*selected);
    }
  }

  None
}

/// Server preference order wins: pick our first supported suite that the
/// client also offered.
pub fn choose_ciphersuite_preferring_server(
    client_suites: &[CipherSuite],
    server_suites: &[&'static SupportedCipherSuite]) -> Option<&'static SupportedCipherSuite> {
  server_suites.iter()
    .find(|x| client_suites.contains(&x.suite))
    .cloned()
}

/// spec.md §4.2: "pass `validateSelectedCipherSuite` (suite must be
/// admissible for the DTLS version)". None of the suites this driver
/// names are version-restricted, so this always holds for a DTLS
/// version; it exists as the seam a richer suite table would hook into.
pub fn validate_selected_cipher_suite(_suite: CipherSuite, version: ProtocolVersion) -> bool {
  version.is_dtls()
}

#[cfg(test)]
mod test {
  use super::*;
  use msgs::enums::CipherSuite;

  #[test]
  fn test_client_pref() {
    let client = vec![
      CipherSuite::TLS_RSA_WITH_AES_256_CBC_SHA,
      CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA,
    ];
    let server = vec![&TLS_RSA_WITH_AES_128_CBC_SHA, &TLS_RSA_WITH_AES_256_CBC_SHA];
    let chosen = choose_ciphersuite_preferring_client(&client, &server);
    assert_eq!(chosen.unwrap(), &TLS_RSA_WITH_AES_256_CBC_SHA);
  }

  #[test]
  fn test_server_pref() {
    let client = vec![
      CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA,
      CipherSuite::TLS_RSA_WITH_AES_256_CBC_SHA,
    ];
    let server = vec![&TLS_RSA_WITH_AES_256_CBC_SHA, &TLS_RSA_WITH_AES_128_CBC_SHA];
    let chosen = choose_ciphersuite_preferring_server(&client, &server);
    assert_eq!(chosen.unwrap(), &TLS_RSA_WITH_AES_256_CBC_SHA);
  }

  #[test]
  fn no_overlap_is_none() {
    let client = vec![CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA];
    let server: Vec<&'static SupportedCipherSuite> = vec![&TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256];
    assert!(choose_ciphersuite_preferring_client(&client, &server).is_none());
  }
}
