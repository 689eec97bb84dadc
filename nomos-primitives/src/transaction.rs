use nomos_codec::utils::{CborWrap, KeepRaw, KeyValuePairs, NonEmptySet, Nullable, Set};
use nomos_codec::{CborReader, CborReaderState, CborWriter, Decode, Encode, Error};

use crate::{
    expect_array, Address, AddrKeyhash, AuxiliaryData, Certificate, Coin, DatumHash, Hash, Hasher,
    Mint, NativeScript, NetworkId, PlutusData, PlutusScript, ProposalProcedure, RewardAccount,
    Value, VotingProcedures, WitnessSet,
};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, std::hash::Hash)]
pub struct TransactionInput {
    pub transaction_id: Hash<32>,
    pub index: u64,
}

impl Decode for TransactionInput {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 2)?;
        let transaction_id = Hash::decode(d)?;
        let index = d.u64()?;
        d.end_array()?;

        Ok(TransactionInput {
            transaction_id,
            index,
        })
    }
}

impl Encode for TransactionInput {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(2)?.encode(&self.transaction_id)?.u64(self.index)?;
        Ok(())
    }
}

/// Datum attached to an output: either its hash or the datum itself,
/// wrapped as embedded CBOR.
#[derive(Debug, PartialEq, Clone)]
pub enum DatumOption {
    Hash(DatumHash),
    Data(CborWrap<PlutusData>),
}

impl Decode for DatumOption {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 2)?;
        let variant = d.u64()?;

        let datum = match variant {
            0 => DatumOption::Hash(Hash::decode(d)?),
            1 => DatumOption::Data(CborWrap::decode(d)?),
            _ => return Err(Error::message("invalid variant id for datum option")),
        };

        d.end_array()?;
        Ok(datum)
    }
}

impl Encode for DatumOption {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(2)?;
        match self {
            DatumOption::Hash(hash) => {
                e.u64(0)?.encode(hash)?;
            }
            DatumOption::Data(data) => {
                e.u64(1)?.encode(data)?;
            }
        }
        Ok(())
    }
}

// script = [0, native_script // 1, plutus_v1_script // 2, plutus_v2_script //
// 3, plutus_v3_script]
#[derive(Debug, PartialEq, Clone)]
pub enum Script {
    Native(KeepRaw<NativeScript>),
    PlutusV1(PlutusScript<1>),
    PlutusV2(PlutusScript<2>),
    PlutusV3(PlutusScript<3>),
}

impl Decode for Script {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 2)?;
        let variant = d.u64()?;

        let script = match variant {
            0 => Script::Native(KeepRaw::decode(d)?),
            1 => Script::PlutusV1(PlutusScript::decode(d)?),
            2 => Script::PlutusV2(PlutusScript::decode(d)?),
            3 => Script::PlutusV3(PlutusScript::decode(d)?),
            _ => return Err(Error::message("invalid variant id for script")),
        };

        d.end_array()?;
        Ok(script)
    }
}

impl Encode for Script {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(2)?;
        match self {
            Script::Native(script) => e.u64(0)?.encode(script)?,
            Script::PlutusV1(script) => e.u64(1)?.encode(script)?,
            Script::PlutusV2(script) => e.u64(2)?.encode(script)?,
            Script::PlutusV3(script) => e.u64(3)?.encode(script)?,
        };
        Ok(())
    }
}

pub type ScriptRef = CborWrap<Script>;

/// A transaction output.
///
/// Two encodings exist on the wire: the legacy 2/3-element array and the
/// post-alonzo map keyed 0..=3. Both are accepted; emission always uses the
/// map form, and a decoded legacy output only keeps its shape through the
/// byte cache of the enclosing body.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionOutput {
    pub address: Address,
    pub value: Value,
    pub datum_option: Option<DatumOption>,
    pub script_ref: Option<ScriptRef>,
}

impl TransactionOutput {
    pub fn new(address: Address, value: Value) -> Self {
        TransactionOutput {
            address,
            value,
            datum_option: None,
            script_ref: None,
        }
    }
}

impl Decode for TransactionOutput {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.peek_state()? {
            CborReaderState::StartArray | CborReaderState::StartIndefiniteArray => {
                let len = d.array()?;
                if let Some(found) = len {
                    if found != 2 && found != 3 {
                        return Err(Error::InvalidArraySize { expected: 2, found });
                    }
                }

                let address = Address::decode(d)?;
                let value = Value::decode(d)?;
                let datum_option = match d.peek_state()? {
                    CborReaderState::EndArray => None,
                    _ => Some(DatumOption::Hash(Hash::decode(d)?)),
                };
                d.end_array()?;

                Ok(TransactionOutput {
                    address,
                    value,
                    datum_option,
                    script_ref: None,
                })
            }
            CborReaderState::StartMap | CborReaderState::StartIndefiniteMap => {
                let mut address = None;
                let mut value = None;
                let mut datum_option = None;
                let mut script_ref = None;
                let mut seen = 0u8;

                let len = d.map()?;
                let mut remaining = len;
                loop {
                    match remaining {
                        Some(0) => break,
                        Some(ref mut n) => *n -= 1,
                        None => {
                            if d.peek_state()? == CborReaderState::EndMap {
                                break;
                            }
                        }
                    }

                    let key = d.u64()?;
                    if key < 8 && seen & (1 << key) != 0 {
                        return Err(Error::message(format!(
                            "duplicate key {key} in transaction output map"
                        )));
                    }

                    match key {
                        0 => address = Some(Address::decode(d)?),
                        1 => value = Some(Value::decode(d)?),
                        2 => datum_option = Some(DatumOption::decode(d)?),
                        3 => script_ref = Some(ScriptRef::decode(d)?),
                        _ => {
                            return Err(Error::message(format!(
                                "unknown key {key} in transaction output map"
                            )))
                        }
                    }

                    seen |= 1 << key;
                }
                d.end_map()?;

                Ok(TransactionOutput {
                    address: address
                        .ok_or_else(|| Error::message("transaction output without address"))?,
                    value: value
                        .ok_or_else(|| Error::message("transaction output without value"))?,
                    datum_option,
                    script_ref,
                })
            }
            found => Err(Error::TypeMismatch {
                expected: "transaction output",
                found,
            }),
        }
    }
}

impl Encode for TransactionOutput {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        let entries = 2
            + self.datum_option.is_some() as u64
            + self.script_ref.is_some() as u64;

        e.map(entries)?;
        e.u64(0)?.encode(&self.address)?;
        e.u64(1)?.encode(&self.value)?;

        if let Some(datum) = &self.datum_option {
            e.u64(2)?.encode(datum)?;
        }

        if let Some(script_ref) = &self.script_ref {
            e.u64(3)?.encode(script_ref)?;
        }

        Ok(())
    }
}

pub type RequiredSigners = NonEmptySet<AddrKeyhash>;

pub type Withdrawals = KeyValuePairs<RewardAccount, Coin>;

/// The transaction body: a map keyed by fixed field numbers.
///
/// The decoder takes the keys in any order but rejects duplicates and
/// unknown keys. Emission is canonical: ascending keys, absent optional
/// fields omitted, input-like sets sorted by `(transaction id, index)`,
/// withdrawals by reward account, required signers by key hash and voting
/// procedures by voter then action id.
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBody {
    pub inputs: Set<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub fee: Coin,
    pub ttl: Option<u64>,
    pub certificates: Option<NonEmptySet<Certificate>>,
    pub withdrawals: Option<Withdrawals>,
    pub auxiliary_data_hash: Option<Hash<32>>,
    pub validity_interval_start: Option<u64>,
    pub mint: Option<Mint>,
    pub script_data_hash: Option<Hash<32>>,
    pub collateral: Option<NonEmptySet<TransactionInput>>,
    pub required_signers: Option<RequiredSigners>,
    pub network_id: Option<NetworkId>,
    pub collateral_return: Option<TransactionOutput>,
    pub total_collateral: Option<Coin>,
    pub reference_inputs: Option<NonEmptySet<TransactionInput>>,
    pub voting_procedures: Option<VotingProcedures>,
    pub proposal_procedures: Option<NonEmptySet<ProposalProcedure>>,
    pub treasury_value: Option<Coin>,
    pub donation: Option<Coin>,
}

impl Decode for TransactionBody {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        let mut inputs = None;
        let mut outputs = None;
        let mut fee = None;
        let mut ttl = None;
        let mut certificates = None;
        let mut withdrawals = None;
        let mut auxiliary_data_hash = None;
        let mut validity_interval_start = None;
        let mut mint = None;
        let mut script_data_hash = None;
        let mut collateral = None;
        let mut required_signers = None;
        let mut network_id = None;
        let mut collateral_return = None;
        let mut total_collateral = None;
        let mut reference_inputs = None;
        let mut voting_procedures = None;
        let mut proposal_procedures = None;
        let mut treasury_value = None;
        let mut donation = None;

        let mut seen = 0u32;
        let len = d.map()?;
        let mut remaining = len;
        loop {
            match remaining {
                Some(0) => break,
                Some(ref mut n) => *n -= 1,
                None => {
                    if d.peek_state()? == CborReaderState::EndMap {
                        break;
                    }
                }
            }

            let key = d.u64()?;
            if key < 32 && seen & (1 << key) != 0 {
                return Err(Error::message(format!(
                    "duplicate key {key} in transaction body map"
                )));
            }

            match key {
                0 => inputs = Some(Set::decode(d)?),
                1 => outputs = Some(Vec::decode(d)?),
                2 => fee = Some(d.u64()?),
                3 => ttl = Some(d.u64()?),
                4 => certificates = Some(NonEmptySet::decode(d)?),
                5 => withdrawals = Some(Withdrawals::decode(d)?),
                7 => auxiliary_data_hash = Some(Hash::decode(d)?),
                8 => validity_interval_start = Some(d.u64()?),
                9 => mint = Some(Mint::decode(d)?),
                11 => script_data_hash = Some(Hash::decode(d)?),
                13 => collateral = Some(NonEmptySet::decode(d)?),
                14 => required_signers = Some(NonEmptySet::decode(d)?),
                15 => network_id = Some(NetworkId::decode(d)?),
                16 => collateral_return = Some(TransactionOutput::decode(d)?),
                17 => total_collateral = Some(d.u64()?),
                18 => reference_inputs = Some(NonEmptySet::decode(d)?),
                19 => voting_procedures = Some(VotingProcedures::decode(d)?),
                20 => proposal_procedures = Some(NonEmptySet::decode(d)?),
                21 => treasury_value = Some(d.u64()?),
                22 => {
                    let value = d.u64()?;
                    if value == 0 {
                        return Err(Error::message("donation must be a positive coin"));
                    }
                    donation = Some(value);
                }
                _ => {
                    return Err(Error::message(format!(
                        "unknown key {key} in transaction body map"
                    )))
                }
            }

            if key < 32 {
                seen |= 1 << key;
            }
        }
        d.end_map()?;

        let inputs: Set<TransactionInput> =
            inputs.ok_or_else(|| Error::message("transaction body without inputs"))?;
        if inputs.is_empty() {
            return Err(Error::message("transaction body with an empty input set"));
        }

        Ok(TransactionBody {
            inputs,
            outputs: outputs.ok_or_else(|| Error::message("transaction body without outputs"))?,
            fee: fee.ok_or_else(|| Error::message("transaction body without fee"))?,
            ttl,
            certificates,
            withdrawals,
            auxiliary_data_hash,
            validity_interval_start,
            mint,
            script_data_hash,
            collateral,
            required_signers,
            network_id,
            collateral_return,
            total_collateral,
            reference_inputs,
            voting_procedures,
            proposal_procedures,
            treasury_value,
            donation,
        })
    }
}

impl Encode for TransactionBody {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        let optionals = [
            self.ttl.is_some(),
            self.certificates.is_some(),
            self.withdrawals.is_some(),
            self.auxiliary_data_hash.is_some(),
            self.validity_interval_start.is_some(),
            self.mint.is_some(),
            self.script_data_hash.is_some(),
            self.collateral.is_some(),
            self.required_signers.is_some(),
            self.network_id.is_some(),
            self.collateral_return.is_some(),
            self.total_collateral.is_some(),
            self.reference_inputs.is_some(),
            self.voting_procedures.is_some(),
            self.proposal_procedures.is_some(),
            self.treasury_value.is_some(),
            self.donation.is_some(),
        ];
        let entries = 3 + optionals.iter().filter(|present| **present).count() as u64;

        e.map(entries)?;

        e.u64(0)?;
        self.inputs.encode_canonical(e)?;

        e.u64(1)?.encode(&self.outputs)?;
        e.u64(2)?.u64(self.fee)?;

        if let Some(ttl) = self.ttl {
            e.u64(3)?.u64(ttl)?;
        }

        if let Some(certificates) = &self.certificates {
            e.u64(4)?.encode(certificates)?;
        }

        if let Some(withdrawals) = &self.withdrawals {
            e.u64(5)?;
            withdrawals.encode_canonical(e)?;
        }

        if let Some(hash) = &self.auxiliary_data_hash {
            e.u64(7)?.encode(hash)?;
        }

        if let Some(start) = self.validity_interval_start {
            e.u64(8)?.u64(start)?;
        }

        if let Some(mint) = &self.mint {
            e.u64(9)?.encode(mint)?;
        }

        if let Some(hash) = &self.script_data_hash {
            e.u64(11)?.encode(hash)?;
        }

        if let Some(collateral) = &self.collateral {
            e.u64(13)?;
            collateral.encode_canonical(e)?;
        }

        if let Some(signers) = &self.required_signers {
            e.u64(14)?;
            signers.encode_canonical(e)?;
        }

        if let Some(network_id) = &self.network_id {
            e.u64(15)?.encode(network_id)?;
        }

        if let Some(collateral_return) = &self.collateral_return {
            e.u64(16)?.encode(collateral_return)?;
        }

        if let Some(total_collateral) = self.total_collateral {
            e.u64(17)?.u64(total_collateral)?;
        }

        if let Some(reference_inputs) = &self.reference_inputs {
            e.u64(18)?;
            reference_inputs.encode_canonical(e)?;
        }

        if let Some(voting_procedures) = &self.voting_procedures {
            e.u64(19)?;

            let mut voters: Vec<_> = voting_procedures.iter().collect();
            voters.sort_by(|a, b| a.0.cmp(&b.0));

            e.map(voters.len() as u64)?;
            for (voter, procedures) in voters {
                voter.encode(e)?;
                procedures.encode_canonical(e)?;
            }
        }

        if let Some(proposal_procedures) = &self.proposal_procedures {
            e.u64(20)?.encode(proposal_procedures)?;
        }

        if let Some(treasury_value) = self.treasury_value {
            e.u64(21)?.u64(treasury_value)?;
        }

        if let Some(donation) = self.donation {
            e.u64(22)?.u64(donation)?;
        }

        Ok(())
    }
}

/// A full transaction: body, witnesses, the phase-2 validity flag and the
/// optional auxiliary data.
///
/// The hash-bearing parts are wrapped in [`KeepRaw`] so that a decoded
/// transaction re-emits the exact wire bytes until something is mutated,
/// keeping existing signatures valid across a round-trip.
#[derive(Debug, PartialEq, Clone)]
pub struct Tx {
    pub transaction_body: KeepRaw<TransactionBody>,
    pub transaction_witness_set: KeepRaw<WitnessSet>,
    pub success: bool,
    pub auxiliary_data: Nullable<KeepRaw<AuxiliaryData>>,
}

impl Tx {
    /// The transaction id: Blake2b-256 over the body encoding, preferring
    /// the cached wire bytes when the body is clean.
    pub fn hash(&self) -> Result<Hash<32>, Error> {
        match self.transaction_body.raw_cbor() {
            Some(raw) => Ok(Hasher::<256>::hash(raw)),
            None => Hasher::<256>::hash_cbor(&*self.transaction_body),
        }
    }

    /// Drops every cached encoding in the transaction, so the next
    /// emission depends only on the parsed fields and the canonical
    /// serialization rules.
    pub fn clear_cbor_cache(&mut self) {
        let body = self.transaction_body.to_mut();
        for output in body.outputs.iter_mut() {
            clear_output_cache(output);
        }
        if let Some(collateral_return) = &mut body.collateral_return {
            clear_output_cache(collateral_return);
        }

        self.transaction_witness_set.to_mut().clear_cbor_cache();

        if let Nullable::Some(auxiliary_data) = &mut self.auxiliary_data {
            auxiliary_data.invalidate();
        }
    }
}

fn clear_output_cache(output: &mut TransactionOutput) {
    if let Some(script_ref) = &mut output.script_ref {
        if let Script::Native(native) = &mut script_ref.0 {
            native.invalidate();
        }
    }
}

impl Decode for Tx {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 4)?;
        let transaction_body = KeepRaw::decode(d)?;
        let transaction_witness_set = KeepRaw::decode(d)?;
        let success = d.bool()?;
        let auxiliary_data = Nullable::decode(d)?;
        d.end_array()?;

        Ok(Tx {
            transaction_body,
            transaction_witness_set,
            success,
            auxiliary_data,
        })
    }
}

impl Encode for Tx {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(4)?
            .encode(&self.transaction_body)?
            .encode(&self.transaction_witness_set)?
            .bool(self.success)?
            .encode(&self.auxiliary_data)?;
        Ok(())
    }
}

/// A resolved unspent output: the input that points at it plus the output
/// itself. This is the shape the fee engine consumes.
#[derive(Debug, PartialEq, Clone)]
pub struct Utxo {
    pub input: TransactionInput,
    pub output: TransactionOutput,
}

impl Decode for Utxo {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 2)?;
        let input = TransactionInput::decode(d)?;
        let output = TransactionOutput::decode(d)?;
        d.end_array()?;

        Ok(Utxo { input, output })
    }
}

impl Encode for Utxo {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(2)?.encode(&self.input)?.encode(&self.output)?;
        Ok(())
    }
}
