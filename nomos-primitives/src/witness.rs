use nomos_codec::utils::{Bytes, KeepRaw, KeyValuePairs, MaybeIndefArray, NonEmptySet};
use nomos_codec::{CborReader, CborReaderState, CborWriter, Decode, Encode, Error};

use crate::{expect_array, AddrKeyhash, ExUnits, Hash, PlutusData};

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct VKeyWitness {
    pub vkey: Bytes,
    pub signature: Bytes,
}

impl Decode for VKeyWitness {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 2)?;
        let vkey = Bytes::decode(d)?;
        let signature = Bytes::decode(d)?;
        d.end_array()?;

        Ok(VKeyWitness { vkey, signature })
    }
}

impl Encode for VKeyWitness {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(2)?.encode(&self.vkey)?.encode(&self.signature)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BootstrapWitness {
    pub public_key: Bytes,
    pub signature: Bytes,
    pub chain_code: Bytes,
    pub attributes: Bytes,
}

impl Decode for BootstrapWitness {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 4)?;
        let witness = BootstrapWitness {
            public_key: Bytes::decode(d)?,
            signature: Bytes::decode(d)?,
            chain_code: Bytes::decode(d)?,
            attributes: Bytes::decode(d)?,
        };
        d.end_array()?;

        Ok(witness)
    }
}

impl Encode for BootstrapWitness {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(4)?
            .encode(&self.public_key)?
            .encode(&self.signature)?
            .encode(&self.chain_code)?
            .encode(&self.attributes)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum NativeScript {
    ScriptPubkey(AddrKeyhash),
    ScriptAll(MaybeIndefArray<NativeScript>),
    ScriptAny(MaybeIndefArray<NativeScript>),
    ScriptNOfK(u64, MaybeIndefArray<NativeScript>),
    InvalidBefore(u64),
    InvalidHereafter(u64),
}

impl Decode for NativeScript {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        d.array()?;
        let variant = d.u64()?;

        let script = match variant {
            0 => NativeScript::ScriptPubkey(Hash::decode(d)?),
            1 => NativeScript::ScriptAll(MaybeIndefArray::decode(d)?),
            2 => NativeScript::ScriptAny(MaybeIndefArray::decode(d)?),
            3 => NativeScript::ScriptNOfK(d.u64()?, MaybeIndefArray::decode(d)?),
            4 => NativeScript::InvalidBefore(d.u64()?),
            5 => NativeScript::InvalidHereafter(d.u64()?),
            _ => return Err(Error::message("invalid variant id for native script")),
        };

        d.end_array()?;
        Ok(script)
    }
}

impl Encode for NativeScript {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match self {
            NativeScript::ScriptPubkey(h) => {
                e.array(2)?.u64(0)?.encode(h)?;
            }
            NativeScript::ScriptAll(scripts) => {
                e.array(2)?.u64(1)?.encode(scripts)?;
            }
            NativeScript::ScriptAny(scripts) => {
                e.array(2)?.u64(2)?.encode(scripts)?;
            }
            NativeScript::ScriptNOfK(n, scripts) => {
                e.array(3)?.u64(3)?.u64(*n)?.encode(scripts)?;
            }
            NativeScript::InvalidBefore(slot) => {
                e.array(2)?.u64(4)?.u64(*slot)?;
            }
            NativeScript::InvalidHereafter(slot) => {
                e.array(2)?.u64(5)?.u64(*slot)?;
            }
        }

        Ok(())
    }
}

/// Compiled plutus code of the given language version, kept as the exact
/// on-chain bytes.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PlutusScript<const VERSION: usize>(pub Bytes);

impl<const VERSION: usize> AsRef<[u8]> for PlutusScript<VERSION> {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}

impl<const VERSION: usize> Decode for PlutusScript<VERSION> {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        Ok(PlutusScript(Bytes::decode(d)?))
    }
}

impl<const VERSION: usize> Encode for PlutusScript<VERSION> {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        self.0.encode(e)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub enum RedeemerTag {
    Spend,
    Mint,
    Cert,
    Reward,
    Vote,
    Propose,
}

impl Decode for RedeemerTag {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.u64()? {
            0 => Ok(Self::Spend),
            1 => Ok(Self::Mint),
            2 => Ok(Self::Cert),
            3 => Ok(Self::Reward),
            4 => Ok(Self::Vote),
            5 => Ok(Self::Propose),
            other => Err(Error::message(format!("invalid redeemer tag {other}"))),
        }
    }
}

impl Encode for RedeemerTag {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        let value = match self {
            Self::Spend => 0,
            Self::Mint => 1,
            Self::Cert => 2,
            Self::Reward => 3,
            Self::Vote => 4,
            Self::Propose => 5,
        };

        e.u64(value)?;
        Ok(())
    }
}

/// The legacy flat redeemer shape: `[tag, index, data, ex_units]`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Redeemer {
    pub tag: RedeemerTag,
    pub index: u64,
    pub data: PlutusData,
    pub ex_units: ExUnits,
}

impl Decode for Redeemer {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 4)?;
        let redeemer = Redeemer {
            tag: RedeemerTag::decode(d)?,
            index: d.u64()?,
            data: PlutusData::decode(d)?,
            ex_units: ExUnits::decode(d)?,
        };
        d.end_array()?;

        Ok(redeemer)
    }
}

impl Encode for Redeemer {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(4)?
            .encode(&self.tag)?
            .u64(self.index)?
            .encode(&self.data)?
            .encode(&self.ex_units)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone, PartialOrd, Ord)]
pub struct RedeemersKey {
    pub tag: RedeemerTag,
    pub index: u64,
}

impl Decode for RedeemersKey {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 2)?;
        let key = RedeemersKey {
            tag: RedeemerTag::decode(d)?,
            index: d.u64()?,
        };
        d.end_array()?;

        Ok(key)
    }
}

impl Encode for RedeemersKey {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(2)?.encode(&self.tag)?.u64(self.index)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct RedeemersValue {
    pub data: PlutusData,
    pub ex_units: ExUnits,
}

impl Decode for RedeemersValue {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 2)?;
        let value = RedeemersValue {
            data: PlutusData::decode(d)?,
            ex_units: ExUnits::decode(d)?,
        };
        d.end_array()?;

        Ok(value)
    }
}

impl Encode for RedeemersValue {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(2)?.encode(&self.data)?.encode(&self.ex_units)?;
        Ok(())
    }
}

/// The redeemer collection, logically a map from `(tag, index)` to
/// `(data, ex_units)`.
///
/// Two wire forms exist: the pre-Conway flat array of redeemers and the
/// Conway map. Decoding keeps the witnessed form; freshly built collections
/// use the map form, and map emission always sorts by `(tag, index)`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Redeemers {
    List(Vec<Redeemer>),
    Map(KeyValuePairs<RedeemersKey, RedeemersValue>),
}

impl Redeemers {
    pub fn len(&self) -> usize {
        match self {
            Redeemers::List(items) => items.len(),
            Redeemers::Map(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The execution budget of every redeemer, in no particular order.
    pub fn ex_units(&self) -> Vec<ExUnits> {
        match self {
            Redeemers::List(items) => items.iter().map(|r| r.ex_units).collect(),
            Redeemers::Map(entries) => entries.iter().map(|(_, v)| v.ex_units).collect(),
        }
    }

    /// Replaces the execution budget of the redeemer addressed by
    /// `(tag, index)`.
    pub fn set_ex_units(
        &mut self,
        tag: RedeemerTag,
        index: u64,
        ex_units: ExUnits,
    ) -> Result<(), crate::Error> {
        match self {
            Redeemers::List(items) => {
                for redeemer in items.iter_mut() {
                    if redeemer.tag == tag && redeemer.index == index {
                        redeemer.ex_units = ex_units;
                        return Ok(());
                    }
                }
            }
            Redeemers::Map(entries) => {
                let entries = match entries {
                    KeyValuePairs::Def(entries) => entries,
                    KeyValuePairs::Indef(entries) => entries,
                };

                for (key, value) in entries.iter_mut() {
                    if key.tag == tag && key.index == index {
                        value.ex_units = ex_units;
                        return Ok(());
                    }
                }
            }
        }

        Err(crate::Error::ElementNotFound)
    }
}

impl From<Vec<Redeemer>> for Redeemers {
    fn from(redeemers: Vec<Redeemer>) -> Self {
        let entries = redeemers
            .into_iter()
            .map(|r| {
                (
                    RedeemersKey {
                        tag: r.tag,
                        index: r.index,
                    },
                    RedeemersValue {
                        data: r.data,
                        ex_units: r.ex_units,
                    },
                )
            })
            .collect::<Vec<_>>();

        Redeemers::Map(entries.into())
    }
}

impl Decode for Redeemers {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.peek_state()? {
            CborReaderState::StartArray | CborReaderState::StartIndefiniteArray => {
                Ok(Redeemers::List(Vec::decode(d)?))
            }
            CborReaderState::StartMap | CborReaderState::StartIndefiniteMap => {
                Ok(Redeemers::Map(KeyValuePairs::decode(d)?))
            }
            found => Err(Error::TypeMismatch {
                expected: "redeemer list or map",
                found,
            }),
        }
    }
}

impl Encode for Redeemers {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match self {
            Redeemers::List(items) => items.encode(e),
            Redeemers::Map(entries) => entries.encode_canonical(e),
        }
    }
}

/// The transaction witness set, a map keyed by fixed field numbers.
///
/// Script data feeds the script-data hash, so the datums and the redeemer
/// collection keep their original bytes individually, on top of the cache
/// the enclosing transaction keeps for the whole set.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct WitnessSet {
    pub vkeywitness: Option<NonEmptySet<VKeyWitness>>,
    pub native_script: Option<NonEmptySet<KeepRaw<NativeScript>>>,
    pub bootstrap_witness: Option<NonEmptySet<BootstrapWitness>>,
    pub plutus_v1_script: Option<NonEmptySet<PlutusScript<1>>>,
    pub plutus_data: Option<KeepRaw<NonEmptySet<KeepRaw<PlutusData>>>>,
    pub redeemer: Option<KeepRaw<Redeemers>>,
    pub plutus_v2_script: Option<NonEmptySet<PlutusScript<2>>>,
    pub plutus_v3_script: Option<NonEmptySet<PlutusScript<3>>>,
}

cbor_map_struct!(WitnessSet {
    0 => vkeywitness,
    1 => native_script,
    2 => bootstrap_witness,
    3 => plutus_v1_script,
    4 => plutus_data,
    5 => redeemer,
    6 => plutus_v2_script,
    7 => plutus_v3_script,
});

impl WitnessSet {
    /// Drops every cached encoding in the set, forcing canonical
    /// re-serialization of the datums, the redeemers and the native
    /// scripts.
    pub fn clear_cbor_cache(&mut self) {
        if let Some(scripts) = &mut self.native_script {
            for script in scripts.iter_mut() {
                script.invalidate();
            }
        }

        if let Some(datums) = &mut self.plutus_data {
            for datum in datums.to_mut().iter_mut() {
                datum.invalidate();
            }
        }

        if let Some(redeemer) = &mut self.redeemer {
            redeemer.invalidate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomos_codec::{from_hex, to_hex};

    const REDEEMERS_MAP: &str = "a482000082d8799f0102030405ff821821182c82010182d8799f0102030405ff821821182c82030382d8799f0102030405ff821821182c82040482d8799f0102030405ff821821182c";
    const REDEEMERS_LEGACY: &str = "84840000d8799f0102030405ff821821182c840101d8799f0102030405ff821821182c840303d8799f0102030405ff821821182c840404d8799f0102030405ff821821182c";

    fn redeemer(tag: RedeemerTag, index: u64) -> Redeemer {
        Redeemer {
            tag,
            index,
            data: crate::PlutusData::constr(0, (1..=5).map(crate::PlutusData::int).collect()),
            ex_units: ExUnits {
                mem: 33,
                steps: 44,
            },
        }
    }

    #[test]
    fn redeemer_map_form_round_trips() {
        let redeemers: Redeemers = from_hex(REDEEMERS_MAP).unwrap();
        assert!(matches!(redeemers, Redeemers::Map(_)));
        assert_eq!(redeemers.len(), 4);
        assert_eq!(to_hex(&redeemers).unwrap(), REDEEMERS_MAP);
    }

    #[test]
    fn redeemer_legacy_form_round_trips() {
        let redeemers: Redeemers = from_hex(REDEEMERS_LEGACY).unwrap();
        assert!(matches!(redeemers, Redeemers::List(_)));
        assert_eq!(to_hex(&redeemers).unwrap(), REDEEMERS_LEGACY);
    }

    #[test]
    fn fresh_redeemers_emit_the_sorted_map_form() {
        let fresh = Redeemers::from(vec![
            redeemer(RedeemerTag::Spend, 0),
            redeemer(RedeemerTag::Vote, 4),
            redeemer(RedeemerTag::Reward, 3),
            redeemer(RedeemerTag::Mint, 1),
        ]);

        assert_eq!(to_hex(&fresh).unwrap(), REDEEMERS_MAP);
    }

    #[test]
    fn set_ex_units_addresses_by_tag_and_index() {
        let mut redeemers: Redeemers = from_hex(REDEEMERS_MAP).unwrap();

        redeemers
            .set_ex_units(
                RedeemerTag::Mint,
                1,
                ExUnits {
                    mem: 1,
                    steps: 2,
                },
            )
            .unwrap();

        let budgets = redeemers.ex_units();
        assert!(budgets.contains(&ExUnits { mem: 1, steps: 2 }));

        assert_eq!(
            redeemers.set_ex_units(
                RedeemerTag::Cert,
                9,
                ExUnits {
                    mem: 0,
                    steps: 0,
                }
            ),
            Err(crate::Error::ElementNotFound)
        );
    }

    #[test]
    fn witness_set_round_trips_with_caches() {
        // vkey witness plus a single-datum plutus data section
        let hex_str = "a2008182582061990000000000000000000000000000000000000000000000000000000000005840bdea000000000000000000000000000000000000000000000000000000000000bdea0000000000000000000000000000000000000000000000000000000000000481187b";
        let witness_set: WitnessSet = from_hex(hex_str).unwrap();
        assert!(witness_set.vkeywitness.is_some());
        assert!(witness_set.plutus_data.is_some());
        assert_eq!(to_hex(&witness_set).unwrap(), hex_str);
    }

    #[test]
    fn witness_set_rejects_duplicate_keys() {
        assert!(from_hex::<WitnessSet>("a20481187b0481187b").is_err());
    }

    #[test]
    fn native_script_round_trips() {
        // all-of wrapping a pubkey and a time lock
        let hex_str =
            "8201828200581cb5ae663aaea8e500157bdf4baafd6f5ba0ce5759f7cd4101fc132f5482051864";
        let script: NativeScript = from_hex(hex_str).unwrap();
        assert!(matches!(script, NativeScript::ScriptAll(_)));
        assert_eq!(to_hex(&script).unwrap(), hex_str);
    }
}
