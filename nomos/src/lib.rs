//! Rust-native transaction construction core for the Cardano ledger.
//!
//! Nomos is a small collection of crates that re-implements the
//! hash-sensitive parts of Cardano client tooling in native Rust: a
//! streaming CBOR codec for the ledger subset of RFC 8949, the ledger data
//! model with byte-preserving round-trips, and the deterministic fee
//! arithmetic. It provides no networking and no providers; it is a base
//! layer for wallets, builders and explorers to grow from.

#[doc(inline)]
pub use nomos_codec as codec;

#[doc(inline)]
pub use nomos_crypto as crypto;

#[doc(inline)]
pub use nomos_primitives as primitives;

#[doc(inline)]
pub use nomos_txbuilder as txbuilder;
