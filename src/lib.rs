//! A server-side DTLS handshake driver.
//!
//! This crate drives the server half of a DTLS 1.2 handshake (RFC 6347)
//! to completion: it parses and validates the ClientHello, negotiates a
//! cipher suite, compression method and extension set through a
//! pluggable [`server::policy::ServerPolicy`], carries out a
//! pluggable [`server::policy::KeyExchange`] algorithm, and verifies
//! the client's Finished message, before handing back a ready-to-use
//! datagram transport.
//!
//! What this crate explicitly does **not** do: retransmission and
//! fragment reassembly (owned by the caller's
//! [`adapters::ReliableHandshakeAdapter`]), record-layer encryption and
//! epoch bookkeeping (owned by the caller's
//! [`adapters::RecordLayerAdapter`]), and X.509 certificate chain
//! validation (owned by whatever [`server::policy::ClientAuthVerifier`]
//! the caller supplies).

#[macro_use]
mod macros;

#[cfg(feature = "logging")]
#[macro_use]
extern crate log;

pub mod adapters;
pub mod error;
pub mod msgs;
pub mod prf;
pub mod security;
pub mod server;
pub mod suites;

pub use error::DTLSError;
pub use server::hs::{accept, DTLSTransport};
pub use server::policy::{ClientAuthVerifier, Credentials, KeyExchange, ServerPolicy, Signer};
pub use server::config::ServerConfig;
