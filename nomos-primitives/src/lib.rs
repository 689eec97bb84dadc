//! Cardano ledger primitives and their CBOR codec.
//!
//! Handcrafted, idiomatic Rust artifacts for the Conway-era ledger data
//! model: transactions, certificates, governance procedures, witnesses,
//! Plutus data and multi-assets. Every structure that affects a hash keeps
//! its original encoding on decode, so a decode/encode round-trip of a
//! signed transaction reproduces the wire bytes exactly.

#[macro_use]
mod macros;

mod auxiliary;
mod certs;
mod governance;
mod plutus;
mod pparams;
mod transaction;
mod value;
mod witness;

pub use auxiliary::*;
pub use certs::*;
pub use governance::*;
pub use plutus::*;
pub use pparams::*;
pub use transaction::*;
pub use value::*;
pub use witness::*;

pub use nomos_codec::utils::{
    Bytes, CborWrap, Int, KeepRaw, KeyValuePairs, MaybeIndefArray, NonEmptySet, Nullable, Set,
};
pub use nomos_crypto::hash::{Hash, Hasher};

use nomos_codec::{CborReader, CborWriter, Decode, Encode};

// ----- Common type definitions

pub type AddrKeyhash = Hash<28>;

/// Raw address bytes. The codec treats addresses as opaque: they are
/// emitted exactly as received and never re-parsed.
pub type Address = Bytes;

pub type Coin = u64;

pub type CostModel = Vec<i64>;

pub type DatumHash = Hash<32>;

pub type DnsName = String;

pub type Epoch = u64;

pub type GenesisDelegateHash = Hash<28>;

pub type Genesishash = Hash<28>;

pub type IPv4 = Bytes;

pub type IPv6 = Bytes;

pub type PolicyId = Hash<28>;

pub type PoolKeyhash = Hash<28>;

pub type PoolMetadataHash = Hash<32>;

pub type Port = u32;

pub type ProtocolVersion = (u64, u64);

pub type RewardAccount = Bytes;

pub type ScriptHash = Hash<28>;

pub type VrfKeyhash = Hash<32>;

/// Errors produced by the entity layer on top of the raw codec failures.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Cbor(#[from] nomos_codec::Error),

    #[error("error converting from/to bech32 {0}")]
    BadBech32(bech32::Error),

    #[error("unexpected bech32 prefix {0}")]
    UnexpectedBech32Prefix(String),

    #[error("invalid bech32 payload length {0}")]
    InvalidBech32PayloadLength(usize),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("no cost model for the requested plutus language")]
    InvalidPlutusCostModel,

    #[error("element not found")]
    ElementNotFound,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ExUnits {
    pub mem: u64,
    pub steps: u64,
}

impl Decode for ExUnits {
    fn decode(d: &mut CborReader) -> Result<Self, nomos_codec::Error> {
        expect_array(d, 2)?;
        let mem = d.u64()?;
        let steps = d.u64()?;
        d.end_array()?;

        Ok(ExUnits { mem, steps })
    }
}

impl Encode for ExUnits {
    fn encode(&self, e: &mut CborWriter) -> Result<(), nomos_codec::Error> {
        e.array(2)?.u64(self.mem)?.u64(self.steps)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub enum NetworkId {
    Testnet,
    Mainnet,
}

impl From<NetworkId> for u8 {
    fn from(network_id: NetworkId) -> u8 {
        match network_id {
            NetworkId::Testnet => 0,
            NetworkId::Mainnet => 1,
        }
    }
}

impl TryFrom<u8> for NetworkId {
    type Error = ();

    fn try_from(i: u8) -> Result<Self, Self::Error> {
        match i {
            0 => Ok(Self::Testnet),
            1 => Ok(Self::Mainnet),
            _ => Err(()),
        }
    }
}

impl Decode for NetworkId {
    fn decode(d: &mut CborReader) -> Result<Self, nomos_codec::Error> {
        match d.u64()? {
            0 => Ok(Self::Testnet),
            1 => Ok(Self::Mainnet),
            other => Err(nomos_codec::Error::message(format!(
                "invalid network id {other}"
            ))),
        }
    }
}

impl Encode for NetworkId {
    fn encode(&self, e: &mut CborWriter) -> Result<(), nomos_codec::Error> {
        e.u64(u8::from(*self) as u64)?;
        Ok(())
    }
}

/// A rational carried as tag 30 over `[numerator, denominator]`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RationalNumber {
    pub numerator: u64,
    pub denominator: u64,
}

pub type UnitInterval = RationalNumber;

pub type PositiveInterval = RationalNumber;

impl RationalNumber {
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, Error> {
        if denominator == 0 {
            return Err(Error::InvalidArgument("denominator must not be zero"));
        }

        Ok(RationalNumber {
            numerator,
            denominator,
        })
    }

    /// Rationalizes a double into `p/q` by scaling with powers of ten until
    /// the scaled value is integral, then reducing by the gcd.
    ///
    /// A candidate `p/10^k` is accepted only when dividing it back out
    /// reproduces the input within an absolute error of 1e-15, so the
    /// tolerance follows the scale factor instead of flattering small
    /// exponents. The exponent is capped at 18, which keeps the denominator
    /// within `u64` range.
    pub fn from_f64(value: f64) -> Result<Self, Error> {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidArgument(
                "unit interval requires a finite non-negative value",
            ));
        }

        const MAX_EXPONENT: u32 = 18;
        const ROUND_TRIP_TOLERANCE: f64 = 1e-15;

        let mut denominator = 1u64;
        let mut scaled = value;

        for _ in 0..=MAX_EXPONENT {
            let rounded = scaled.round();
            if rounded <= u64::MAX as f64
                && (rounded / denominator as f64 - value).abs() <= ROUND_TRIP_TOLERANCE
            {
                let numerator = rounded as u64;
                let divisor = gcd(numerator, denominator);
                return Ok(RationalNumber {
                    numerator: numerator / divisor,
                    denominator: denominator / divisor,
                });
            }

            scaled *= 10.0;
            denominator = denominator.saturating_mul(10);
        }

        Err(Error::InvalidArgument(
            "value cannot be rationalized within the exponent cap",
        ))
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

impl Decode for RationalNumber {
    fn decode(d: &mut CborReader) -> Result<Self, nomos_codec::Error> {
        let tag = d.tag()?;
        if tag != nomos_codec::Tag::RATIONAL {
            return Err(nomos_codec::Error::message(format!(
                "unexpected tag {tag} for rational number"
            )));
        }

        expect_array(d, 2)?;
        let numerator = d.u64()?;
        let denominator = d.u64()?;
        d.end_array()?;

        Ok(RationalNumber {
            numerator,
            denominator,
        })
    }
}

impl Encode for RationalNumber {
    fn encode(&self, e: &mut CborWriter) -> Result<(), nomos_codec::Error> {
        e.tag(nomos_codec::Tag::RATIONAL)?;
        e.array(2)?.u64(self.numerator)?.u64(self.denominator)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone, Hash)]
// The script variant comes first for historical reasons: the haskell ledger
// declares it first, and the derived ordering of maps keyed by credentials
// must match what the chain produces.
pub enum StakeCredential {
    ScriptHash(ScriptHash),
    AddrKeyhash(AddrKeyhash),
}

pub type DRepCredential = StakeCredential;

pub type CommitteeColdCredential = StakeCredential;

pub type CommitteeHotCredential = StakeCredential;

impl Decode for StakeCredential {
    fn decode(d: &mut CborReader) -> Result<Self, nomos_codec::Error> {
        expect_array(d, 2)?;
        let variant = d.u64()?;

        let credential = match variant {
            0 => StakeCredential::AddrKeyhash(Hash::decode(d)?),
            1 => StakeCredential::ScriptHash(Hash::decode(d)?),
            _ => {
                return Err(nomos_codec::Error::message(
                    "invalid variant id for stake credential",
                ))
            }
        };

        d.end_array()?;
        Ok(credential)
    }
}

impl Encode for StakeCredential {
    fn encode(&self, e: &mut CborWriter) -> Result<(), nomos_codec::Error> {
        e.array(2)?;
        match self {
            StakeCredential::AddrKeyhash(h) => {
                e.u64(0)?.encode(h)?;
            }
            StakeCredential::ScriptHash(h) => {
                e.u64(1)?.encode(h)?;
            }
        }
        Ok(())
    }
}

/// Opens an array expected to hold `expected` items. Definite lengths are
/// checked up front; indefinite arrays are accepted and validated by the
/// reads that follow plus the closing `end_array`.
pub(crate) fn expect_array(
    d: &mut CborReader,
    expected: u64,
) -> Result<(), nomos_codec::Error> {
    match d.array()? {
        Some(len) if len == expected => Ok(()),
        Some(found) => Err(nomos_codec::Error::InvalidArraySize { expected, found }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomos_codec::{from_hex, to_hex};
    use test_case::test_case;

    #[test_case(0.0577, 577, 10_000)]
    #[test_case(0.0000721, 721, 10_000_000)]
    #[test_case(15.0, 15, 1)]
    #[test_case(0.5, 1, 2)]
    #[test_case(0.0, 0, 1)]
    fn rationalizes_doubles(value: f64, numerator: u64, denominator: u64) {
        let rational = RationalNumber::from_f64(value).unwrap();
        assert_eq!(rational.numerator, numerator);
        assert_eq!(rational.denominator, denominator);
    }

    #[test]
    fn rejects_unrationalizable_doubles() {
        assert!(RationalNumber::from_f64(-1.0).is_err());
        assert!(RationalNumber::from_f64(f64::NAN).is_err());
        assert!(RationalNumber::from_f64(f64::INFINITY).is_err());
    }

    #[test]
    fn tolerance_tracks_the_scale_factor() {
        // the perturbation is tiny at the 10^4 scale but four orders of
        // magnitude above the round-trip bound, so it must not collapse
        // into the unperturbed fraction
        let value = 0.0577 + 1e-11;
        let rational = RationalNumber::from_f64(value).unwrap();
        assert_ne!(
            (rational.numerator, rational.denominator),
            (577, 10_000)
        );

        let round_trip = rational.numerator as f64 / rational.denominator as f64;
        assert!((round_trip - value).abs() <= 1e-15);
    }

    #[test]
    fn rational_number_cbor_round_trip() {
        let rational: RationalNumber = from_hex("d81e82190241192710").unwrap();
        assert_eq!(rational.numerator, 577);
        assert_eq!(rational.denominator, 10_000);
        assert_eq!(to_hex(&rational).unwrap(), "d81e82190241192710");
    }

    #[test]
    fn stake_credential_round_trip_and_ordering() {
        let key: StakeCredential =
            from_hex("8200581c13cf55d175ea848b87deb3e914febd7e028e2bf6534475d52fb9c3d0").unwrap();
        let script: StakeCredential =
            from_hex("8201581c13cf55d175ea848b87deb3e914febd7e028e2bf6534475d52fb9c3d0").unwrap();

        assert!(matches!(key, StakeCredential::AddrKeyhash(_)));
        assert!(matches!(script, StakeCredential::ScriptHash(_)));
        assert!(script < key);

        assert_eq!(
            to_hex(&key).unwrap(),
            "8200581c13cf55d175ea848b87deb3e914febd7e028e2bf6534475d52fb9c3d0"
        );
    }

    #[test]
    fn ex_units_checks_array_size() {
        let result = from_hex::<ExUnits>("831821182c00");
        assert_eq!(
            result,
            Err(nomos_codec::Error::InvalidArraySize {
                expected: 2,
                found: 3
            })
        );
    }
}
