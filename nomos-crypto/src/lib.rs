//! Cryptographic hashing for the Cardano ledger data model.
//!
//! Two helper objects are exposed:
//!
//! * [`hash::Hasher`] streams bytes (or a CBOR encoding) into a keyless
//!   BLAKE2b digest without allocating an intermediate buffer
//! * [`hash::Hash`] is a strongly typed fixed-width digest
//!
//! The only digest widths the ledger uses are 224 bits (key and script
//! hashes) and 256 bits (transaction, datum and metadata hashes).

pub mod hash;
