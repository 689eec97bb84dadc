use bech32::{FromBase32, ToBase32, Variant};

use nomos_codec::utils::{KeyValuePairs, Set};
use nomos_codec::{CborReader, CborReaderState, CborWriter, Decode, Encode};

use crate::{
    expect_array, AddrKeyhash, Coin, CommitteeColdCredential, Epoch, Error, Hash,
    ProtocolParamUpdate, ProtocolVersion, RewardAccount, ScriptHash, UnitInterval,
};

/// Bech32 human-readable prefix for governance action ids (CIP-0129).
const GOV_ACTION_HRP: &str = "gov_action";

/// The transaction that proposed a governance action, plus the index of the
/// proposal inside it.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct GovActionId {
    pub transaction_id: Hash<32>,
    pub action_index: u64,
}

impl GovActionId {
    /// CIP-0129 encoding: `gov_action` over the 32-byte transaction hash
    /// followed by a single index byte, so only indexes up to 255 have a
    /// canonical bech32 form.
    pub fn to_bech32(&self) -> Result<String, Error> {
        let index = u8::try_from(self.action_index)
            .map_err(|_| Error::InvalidArgument("action index does not fit a single byte"))?;

        let mut payload = self.transaction_id.to_vec();
        payload.push(index);

        bech32::encode(GOV_ACTION_HRP, payload.to_base32(), Variant::Bech32)
            .map_err(Error::BadBech32)
    }

    pub fn from_bech32(text: &str) -> Result<Self, Error> {
        let (hrp, base32, _variant) = bech32::decode(text).map_err(Error::BadBech32)?;

        if hrp != GOV_ACTION_HRP {
            return Err(Error::UnexpectedBech32Prefix(hrp));
        }

        let payload = Vec::<u8>::from_base32(&base32).map_err(Error::BadBech32)?;
        if payload.len() != 33 {
            return Err(Error::InvalidBech32PayloadLength(payload.len()));
        }

        Ok(GovActionId {
            transaction_id: Hash::try_from(&payload[..32])?,
            action_index: payload[32] as u64,
        })
    }
}

impl Decode for GovActionId {
    fn decode(d: &mut CborReader) -> Result<Self, nomos_codec::Error> {
        expect_array(d, 2)?;
        let transaction_id = Hash::decode(d)?;
        let action_index = d.u64()?;
        d.end_array()?;

        Ok(GovActionId {
            transaction_id,
            action_index,
        })
    }
}

impl Encode for GovActionId {
    fn encode(&self, e: &mut CborWriter) -> Result<(), nomos_codec::Error> {
        e.array(2)?.encode(&self.transaction_id)?.u64(self.action_index)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Vote {
    No,
    Yes,
    Abstain,
}

impl Decode for Vote {
    fn decode(d: &mut CborReader) -> Result<Self, nomos_codec::Error> {
        match d.u64()? {
            0 => Ok(Vote::No),
            1 => Ok(Vote::Yes),
            2 => Ok(Vote::Abstain),
            other => Err(nomos_codec::Error::message(format!(
                "invalid vote value {other}"
            ))),
        }
    }
}

impl Encode for Vote {
    fn encode(&self, e: &mut CborWriter) -> Result<(), nomos_codec::Error> {
        let value = match self {
            Vote::No => 0,
            Vote::Yes => 1,
            Vote::Abstain => 2,
        };

        e.u64(value)?;
        Ok(())
    }
}

// Ordering matches the haskell ledger: committee before dreps before pools,
// and script credentials before key credentials within a role.
#[derive(Debug, PartialEq, PartialOrd, Eq, Ord, Clone)]
pub enum Voter {
    ConstitutionalCommitteeScript(ScriptHash),
    ConstitutionalCommitteeKey(AddrKeyhash),
    DRepScript(ScriptHash),
    DRepKey(AddrKeyhash),
    StakePoolKey(AddrKeyhash),
}

impl Decode for Voter {
    fn decode(d: &mut CborReader) -> Result<Self, nomos_codec::Error> {
        expect_array(d, 2)?;
        let variant = d.u64()?;

        let voter = match variant {
            0 => Voter::ConstitutionalCommitteeKey(Hash::decode(d)?),
            1 => Voter::ConstitutionalCommitteeScript(Hash::decode(d)?),
            2 => Voter::DRepKey(Hash::decode(d)?),
            3 => Voter::DRepScript(Hash::decode(d)?),
            4 => Voter::StakePoolKey(Hash::decode(d)?),
            _ => return Err(nomos_codec::Error::message("invalid variant id for voter")),
        };

        d.end_array()?;
        Ok(voter)
    }
}

impl Encode for Voter {
    fn encode(&self, e: &mut CborWriter) -> Result<(), nomos_codec::Error> {
        e.array(2)?;
        match self {
            Voter::ConstitutionalCommitteeKey(h) => e.u64(0)?.encode(h)?,
            Voter::ConstitutionalCommitteeScript(h) => e.u64(1)?.encode(h)?,
            Voter::DRepKey(h) => e.u64(2)?.encode(h)?,
            Voter::DRepScript(h) => e.u64(3)?.encode(h)?,
            Voter::StakePoolKey(h) => e.u64(4)?.encode(h)?,
        };
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub struct Anchor {
    pub url: String,
    pub content_hash: Hash<32>,
}

impl Decode for Anchor {
    fn decode(d: &mut CborReader) -> Result<Self, nomos_codec::Error> {
        expect_array(d, 2)?;
        let url = d.text()?;
        let content_hash = Hash::decode(d)?;
        d.end_array()?;

        Ok(Anchor { url, content_hash })
    }
}

impl Encode for Anchor {
    fn encode(&self, e: &mut CborWriter) -> Result<(), nomos_codec::Error> {
        e.array(2)?.text(&self.url)?.encode(&self.content_hash)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct VotingProcedure {
    pub vote: Vote,
    pub anchor: Option<Anchor>,
}

impl Decode for VotingProcedure {
    fn decode(d: &mut CborReader) -> Result<Self, nomos_codec::Error> {
        expect_array(d, 2)?;
        let vote = Vote::decode(d)?;
        let anchor = match d.peek_state()? {
            CborReaderState::Null => {
                d.null()?;
                None
            }
            _ => Some(Anchor::decode(d)?),
        };
        d.end_array()?;

        Ok(VotingProcedure { vote, anchor })
    }
}

impl Encode for VotingProcedure {
    fn encode(&self, e: &mut CborWriter) -> Result<(), nomos_codec::Error> {
        e.array(2)?.encode(&self.vote)?;
        match &self.anchor {
            Some(anchor) => e.encode(anchor)?,
            None => e.null()?,
        };
        Ok(())
    }
}

/// Voter, then governance action id, then the vote itself: modeled as
/// nested ordered maps so no entity ever references its parent.
pub type VotingProcedures = KeyValuePairs<Voter, KeyValuePairs<GovActionId, VotingProcedure>>;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ProposalProcedure {
    pub deposit: Coin,
    pub reward_account: RewardAccount,
    pub gov_action: GovAction,
    pub anchor: Anchor,
}

impl Decode for ProposalProcedure {
    fn decode(d: &mut CborReader) -> Result<Self, nomos_codec::Error> {
        expect_array(d, 4)?;
        let deposit = d.u64()?;
        let reward_account = RewardAccount::decode(d)?;
        let gov_action = GovAction::decode(d)?;
        let anchor = Anchor::decode(d)?;
        d.end_array()?;

        Ok(ProposalProcedure {
            deposit,
            reward_account,
            gov_action,
            anchor,
        })
    }
}

impl Encode for ProposalProcedure {
    fn encode(&self, e: &mut CborWriter) -> Result<(), nomos_codec::Error> {
        e.array(4)?
            .u64(self.deposit)?
            .encode(&self.reward_account)?
            .encode(&self.gov_action)?
            .encode(&self.anchor)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum GovAction {
    ParameterChange(
        Option<GovActionId>,
        Box<ProtocolParamUpdate>,
        Option<ScriptHash>,
    ),
    HardForkInitiation(Option<GovActionId>, ProtocolVersion),
    TreasuryWithdrawals(KeyValuePairs<RewardAccount, Coin>, Option<ScriptHash>),
    NoConfidence(Option<GovActionId>),
    UpdateCommittee(
        Option<GovActionId>,
        Set<CommitteeColdCredential>,
        KeyValuePairs<CommitteeColdCredential, Epoch>,
        UnitInterval,
    ),
    NewConstitution(Option<GovActionId>, Constitution),
    Information,
}

fn nullable<T: Decode>(d: &mut CborReader) -> Result<Option<T>, nomos_codec::Error> {
    match d.peek_state()? {
        CborReaderState::Null => {
            d.null()?;
            Ok(None)
        }
        _ => Ok(Some(T::decode(d)?)),
    }
}

fn encode_nullable<T: Encode>(
    value: &Option<T>,
    e: &mut CborWriter,
) -> Result<(), nomos_codec::Error> {
    match value {
        Some(value) => value.encode(e),
        None => {
            e.null()?;
            Ok(())
        }
    }
}

impl Decode for GovAction {
    fn decode(d: &mut CborReader) -> Result<Self, nomos_codec::Error> {
        let len = d.array()?;
        let variant = d.u64()?;

        let expected = |items: u64| -> Result<(), nomos_codec::Error> {
            match len {
                Some(found) if found != items => Err(nomos_codec::Error::InvalidArraySize {
                    expected: items,
                    found,
                }),
                _ => Ok(()),
            }
        };

        let action = match variant {
            0 => {
                expected(4)?;
                GovAction::ParameterChange(
                    nullable(d)?,
                    Box::new(ProtocolParamUpdate::decode(d)?),
                    nullable(d)?,
                )
            }
            1 => {
                expected(3)?;
                let previous = nullable(d)?;
                expect_array(d, 2)?;
                let version = (d.u64()?, d.u64()?);
                d.end_array()?;
                GovAction::HardForkInitiation(previous, version)
            }
            2 => {
                expected(3)?;
                GovAction::TreasuryWithdrawals(KeyValuePairs::decode(d)?, nullable(d)?)
            }
            3 => {
                expected(2)?;
                GovAction::NoConfidence(nullable(d)?)
            }
            4 => {
                expected(5)?;
                GovAction::UpdateCommittee(
                    nullable(d)?,
                    Set::decode(d)?,
                    KeyValuePairs::decode(d)?,
                    UnitInterval::decode(d)?,
                )
            }
            5 => {
                expected(3)?;
                GovAction::NewConstitution(nullable(d)?, Constitution::decode(d)?)
            }
            6 => {
                expected(1)?;
                GovAction::Information
            }
            _ => {
                return Err(nomos_codec::Error::message(
                    "invalid variant id for governance action",
                ))
            }
        };

        d.end_array()?;
        Ok(action)
    }
}

impl Encode for GovAction {
    fn encode(&self, e: &mut CborWriter) -> Result<(), nomos_codec::Error> {
        match self {
            GovAction::ParameterChange(previous, update, policy) => {
                e.array(4)?.u64(0)?;
                encode_nullable(previous, e)?;
                update.encode(e)?;
                encode_nullable(policy, e)?;
            }
            GovAction::HardForkInitiation(previous, version) => {
                e.array(3)?.u64(1)?;
                encode_nullable(previous, e)?;
                e.array(2)?.u64(version.0)?.u64(version.1)?;
            }
            GovAction::TreasuryWithdrawals(withdrawals, policy) => {
                e.array(3)?.u64(2)?.encode(withdrawals)?;
                encode_nullable(policy, e)?;
            }
            GovAction::NoConfidence(previous) => {
                e.array(2)?.u64(3)?;
                encode_nullable(previous, e)?;
            }
            GovAction::UpdateCommittee(previous, removed, added, threshold) => {
                e.array(5)?.u64(4)?;
                encode_nullable(previous, e)?;
                e.encode(removed)?.encode(added)?.encode(threshold)?;
            }
            GovAction::NewConstitution(previous, constitution) => {
                e.array(3)?.u64(5)?;
                encode_nullable(previous, e)?;
                constitution.encode(e)?;
            }
            GovAction::Information => {
                e.array(1)?.u64(6)?;
            }
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Constitution {
    pub anchor: Anchor,
    pub guardrail_script: Option<ScriptHash>,
}

impl Decode for Constitution {
    fn decode(d: &mut CborReader) -> Result<Self, nomos_codec::Error> {
        expect_array(d, 2)?;
        let anchor = Anchor::decode(d)?;
        let guardrail_script = nullable(d)?;
        d.end_array()?;

        Ok(Constitution {
            anchor,
            guardrail_script,
        })
    }
}

impl Encode for Constitution {
    fn encode(&self, e: &mut CborWriter) -> Result<(), nomos_codec::Error> {
        e.array(2)?.encode(&self.anchor)?;
        encode_nullable(&self.guardrail_script, e)?;
        Ok(())
    }
}
