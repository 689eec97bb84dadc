//! Deterministic fee arithmetic for Cardano transactions.
//!
//! This crate reproduces the ledger's fee formulas bit-exact: the linear
//! size fee, the execution-unit fee priced through exact rationals, the
//! reference-script fee and the minimum ada an output must carry. It never
//! talks to the network; the caller supplies the transaction, the resolved
//! UTXOs for its reference inputs and the protocol-parameter bundle.

mod fee;
mod params;

pub use fee::*;
pub use params::ProtocolParameters;

/// Failures surfaced by the fee engine.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Cbor(#[from] nomos_codec::Error),

    #[error("a utxo required by the transaction is missing from the resolved set")]
    RequiredUtxoMissing,

    #[error("arithmetic overflow while computing fees")]
    NumericOverflow,
}
