use nomos_primitives::{Coin, ExUnitPrices, RationalNumber};

/// The protocol parameters the fee engine consumes.
///
/// Field names follow the on-chain parameter-update keys; the bundle is
/// read-only for the duration of any fee computation.
#[derive(Debug, PartialEq, Clone)]
pub struct ProtocolParameters {
    /// Lovelace per byte of serialized transaction.
    pub min_fee_a: u64,

    /// Constant lovelace added to every fee.
    pub min_fee_b: u64,

    /// Prices of a memory unit and a cpu step.
    pub execution_costs: ExUnitPrices,

    /// Lovelace per byte of reference script.
    pub ref_script_cost_per_byte: RationalNumber,

    /// Lovelace per byte of utxo storage, for the min-ada rule.
    pub ada_per_utxo_byte: Coin,
}

impl Default for ProtocolParameters {
    fn default() -> Self {
        let zero = RationalNumber {
            numerator: 0,
            denominator: 1,
        };

        ProtocolParameters {
            min_fee_a: 0,
            min_fee_b: 0,
            execution_costs: ExUnitPrices {
                mem_price: zero,
                step_price: zero,
            },
            ref_script_cost_per_byte: zero,
            ada_per_utxo_byte: 0,
        }
    }
}
