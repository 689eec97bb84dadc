use nomos_codec::utils::{KeyValuePairs, Nullable, Set};
use nomos_codec::{CborReader, CborReaderState, CborWriter, Decode, Encode, Error};

use crate::{
    expect_array, AddrKeyhash, Anchor, Coin, CommitteeColdCredential, CommitteeHotCredential,
    DRepCredential, DnsName, Epoch, GenesisDelegateHash, Genesishash, Hash, IPv4, IPv6,
    PoolKeyhash, PoolMetadataHash, Port, RewardAccount, ScriptHash, StakeCredential, UnitInterval,
    VrfKeyhash,
};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone)]
pub enum DRep {
    Key(AddrKeyhash),
    Script(ScriptHash),
    Abstain,
    NoConfidence,
}

impl Decode for DRep {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        let len = d.array()?;
        let variant = d.u64()?;

        let drep = match (variant, len) {
            (0, Some(2) | None) => DRep::Key(Hash::decode(d)?),
            (1, Some(2) | None) => DRep::Script(Hash::decode(d)?),
            (2, Some(1) | None) => DRep::Abstain,
            (3, Some(1) | None) => DRep::NoConfidence,
            _ => return Err(Error::message("invalid variant id for drep")),
        };

        d.end_array()?;
        Ok(drep)
    }
}

impl Encode for DRep {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match self {
            DRep::Key(h) => {
                e.array(2)?.u64(0)?.encode(h)?;
            }
            DRep::Script(h) => {
                e.array(2)?.u64(1)?.encode(h)?;
            }
            DRep::Abstain => {
                e.array(1)?.u64(2)?;
            }
            DRep::NoConfidence => {
                e.array(1)?.u64(3)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PoolMetadata {
    pub url: String,
    pub hash: PoolMetadataHash,
}

impl Decode for PoolMetadata {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 2)?;
        let url = d.text()?;
        let hash = Hash::decode(d)?;
        d.end_array()?;

        Ok(PoolMetadata { url, hash })
    }
}

impl Encode for PoolMetadata {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(2)?.text(&self.url)?.encode(&self.hash)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Relay {
    SingleHostAddr(Nullable<Port>, Nullable<IPv4>, Nullable<IPv6>),
    SingleHostName(Nullable<Port>, DnsName),
    MultiHostName(DnsName),
}

impl Decode for Relay {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        d.array()?;
        let variant = d.u64()?;

        let relay = match variant {
            0 => Relay::SingleHostAddr(
                Nullable::decode(d)?,
                Nullable::decode(d)?,
                Nullable::decode(d)?,
            ),
            1 => Relay::SingleHostName(Nullable::decode(d)?, d.text()?),
            2 => Relay::MultiHostName(d.text()?),
            _ => return Err(Error::message("invalid variant id for relay")),
        };

        d.end_array()?;
        Ok(relay)
    }
}

impl Encode for Relay {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match self {
            Relay::SingleHostAddr(port, ipv4, ipv6) => {
                e.array(4)?.u64(0)?.encode(port)?.encode(ipv4)?.encode(ipv6)?;
            }
            Relay::SingleHostName(port, dns) => {
                e.array(3)?.u64(1)?.encode(port)?.text(dns)?;
            }
            Relay::MultiHostName(dns) => {
                e.array(2)?.u64(2)?.text(dns)?;
            }
        }
        Ok(())
    }
}

/*
move_instantaneous_reward = [ 0 / 1, { * stake_credential => delta_coin } / coin ]
; 0 draws from the reserves, 1 from the treasury. A map moves funds to
; stake credentials, a plain coin moves them to the other accounting pot.
*/

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum InstantaneousRewardSource {
    Reserves,
    Treasury,
}

impl Decode for InstantaneousRewardSource {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.u64()? {
            0 => Ok(Self::Reserves),
            1 => Ok(Self::Treasury),
            other => Err(Error::message(format!("unknown accounting pot {other}"))),
        }
    }
}

impl Encode for InstantaneousRewardSource {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        let variant = match self {
            Self::Reserves => 0,
            Self::Treasury => 1,
        };

        e.u64(variant)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum InstantaneousRewardTarget {
    StakeCredentials(KeyValuePairs<StakeCredential, i64>),
    OtherAccountingPot(Coin),
}

impl Decode for InstantaneousRewardTarget {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.peek_state()? {
            CborReaderState::StartMap | CborReaderState::StartIndefiniteMap => {
                Ok(Self::StakeCredentials(KeyValuePairs::decode(d)?))
            }
            _ => Ok(Self::OtherAccountingPot(d.u64()?)),
        }
    }
}

impl Encode for InstantaneousRewardTarget {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match self {
            Self::StakeCredentials(deltas) => deltas.encode(e),
            Self::OtherAccountingPot(coin) => {
                e.u64(*coin)?;
                Ok(())
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MoveInstantaneousReward {
    pub source: InstantaneousRewardSource,
    pub target: InstantaneousRewardTarget,
}

impl Decode for MoveInstantaneousReward {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 2)?;
        let source = InstantaneousRewardSource::decode(d)?;
        let target = InstantaneousRewardTarget::decode(d)?;
        d.end_array()?;

        Ok(MoveInstantaneousReward { source, target })
    }
}

impl Encode for MoveInstantaneousReward {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(2)?.encode(&self.source)?.encode(&self.target)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Certificate {
    StakeRegistration(StakeCredential),
    StakeDeregistration(StakeCredential),
    StakeDelegation(StakeCredential, PoolKeyhash),
    PoolRegistration {
        operator: PoolKeyhash,
        vrf_keyhash: VrfKeyhash,
        pledge: Coin,
        cost: Coin,
        margin: UnitInterval,
        reward_account: RewardAccount,
        pool_owners: Set<AddrKeyhash>,
        relays: Vec<Relay>,
        pool_metadata: Option<PoolMetadata>,
    },
    PoolRetirement(PoolKeyhash, Epoch),
    GenesisKeyDelegation(Genesishash, GenesisDelegateHash, VrfKeyhash),
    MoveInstantaneousRewardsCert(MoveInstantaneousReward),

    Reg(StakeCredential, Coin),
    UnReg(StakeCredential, Coin),
    VoteDeleg(StakeCredential, DRep),
    StakeVoteDeleg(StakeCredential, PoolKeyhash, DRep),
    StakeRegDeleg(StakeCredential, PoolKeyhash, Coin),
    VoteRegDeleg(StakeCredential, DRep, Coin),
    StakeVoteRegDeleg(StakeCredential, PoolKeyhash, DRep, Coin),

    AuthCommitteeHot(CommitteeColdCredential, CommitteeHotCredential),
    ResignCommitteeCold(CommitteeColdCredential, Option<Anchor>),
    RegDRepCert(DRepCredential, Coin, Option<Anchor>),
    UnRegDRepCert(DRepCredential, Coin),
    UpdateDRepCert(DRepCredential, Option<Anchor>),
}

fn nullable_anchor(d: &mut CborReader) -> Result<Option<Anchor>, Error> {
    match d.peek_state()? {
        CborReaderState::Null => {
            d.null()?;
            Ok(None)
        }
        _ => Ok(Some(Anchor::decode(d)?)),
    }
}

fn encode_nullable_anchor(anchor: &Option<Anchor>, e: &mut CborWriter) -> Result<(), Error> {
    match anchor {
        Some(anchor) => anchor.encode(e),
        None => {
            e.null()?;
            Ok(())
        }
    }
}

impl Decode for Certificate {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        let len = d.array()?;
        let variant = d.u64()?;

        let expected = |items: u64| -> Result<(), Error> {
            match len {
                Some(found) if found != items => Err(Error::InvalidArraySize {
                    expected: items,
                    found,
                }),
                _ => Ok(()),
            }
        };

        let certificate = match variant {
            0 => {
                expected(2)?;
                Certificate::StakeRegistration(StakeCredential::decode(d)?)
            }
            1 => {
                expected(2)?;
                Certificate::StakeDeregistration(StakeCredential::decode(d)?)
            }
            2 => {
                expected(3)?;
                Certificate::StakeDelegation(StakeCredential::decode(d)?, Hash::decode(d)?)
            }
            3 => {
                expected(10)?;
                Certificate::PoolRegistration {
                    operator: Hash::decode(d)?,
                    vrf_keyhash: Hash::decode(d)?,
                    pledge: d.u64()?,
                    cost: d.u64()?,
                    margin: UnitInterval::decode(d)?,
                    reward_account: RewardAccount::decode(d)?,
                    pool_owners: Set::decode(d)?,
                    relays: Vec::decode(d)?,
                    pool_metadata: match d.peek_state()? {
                        CborReaderState::Null => {
                            d.null()?;
                            None
                        }
                        _ => Some(PoolMetadata::decode(d)?),
                    },
                }
            }
            4 => {
                expected(3)?;
                Certificate::PoolRetirement(Hash::decode(d)?, d.u64()?)
            }
            5 => {
                expected(4)?;
                Certificate::GenesisKeyDelegation(
                    Hash::decode(d)?,
                    Hash::decode(d)?,
                    Hash::decode(d)?,
                )
            }
            6 => {
                expected(2)?;
                Certificate::MoveInstantaneousRewardsCert(MoveInstantaneousReward::decode(d)?)
            }
            7 => {
                expected(3)?;
                Certificate::Reg(StakeCredential::decode(d)?, d.u64()?)
            }
            8 => {
                expected(3)?;
                Certificate::UnReg(StakeCredential::decode(d)?, d.u64()?)
            }
            9 => {
                expected(3)?;
                Certificate::VoteDeleg(StakeCredential::decode(d)?, DRep::decode(d)?)
            }
            10 => {
                expected(4)?;
                Certificate::StakeVoteDeleg(
                    StakeCredential::decode(d)?,
                    Hash::decode(d)?,
                    DRep::decode(d)?,
                )
            }
            11 => {
                expected(4)?;
                Certificate::StakeRegDeleg(
                    StakeCredential::decode(d)?,
                    Hash::decode(d)?,
                    d.u64()?,
                )
            }
            12 => {
                expected(4)?;
                Certificate::VoteRegDeleg(
                    StakeCredential::decode(d)?,
                    DRep::decode(d)?,
                    d.u64()?,
                )
            }
            13 => {
                expected(5)?;
                Certificate::StakeVoteRegDeleg(
                    StakeCredential::decode(d)?,
                    Hash::decode(d)?,
                    DRep::decode(d)?,
                    d.u64()?,
                )
            }
            14 => {
                expected(3)?;
                Certificate::AuthCommitteeHot(
                    StakeCredential::decode(d)?,
                    StakeCredential::decode(d)?,
                )
            }
            15 => {
                expected(3)?;
                Certificate::ResignCommitteeCold(StakeCredential::decode(d)?, nullable_anchor(d)?)
            }
            16 => {
                expected(4)?;
                Certificate::RegDRepCert(StakeCredential::decode(d)?, d.u64()?, nullable_anchor(d)?)
            }
            17 => {
                expected(3)?;
                Certificate::UnRegDRepCert(StakeCredential::decode(d)?, d.u64()?)
            }
            18 => {
                expected(3)?;
                Certificate::UpdateDRepCert(StakeCredential::decode(d)?, nullable_anchor(d)?)
            }
            _ => return Err(Error::message("unknown certificate kind")),
        };

        d.end_array()?;
        Ok(certificate)
    }
}

impl Encode for Certificate {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match self {
            Certificate::StakeRegistration(credential) => {
                e.array(2)?.u64(0)?.encode(credential)?;
            }
            Certificate::StakeDeregistration(credential) => {
                e.array(2)?.u64(1)?.encode(credential)?;
            }
            Certificate::StakeDelegation(credential, pool) => {
                e.array(3)?.u64(2)?.encode(credential)?.encode(pool)?;
            }
            Certificate::PoolRegistration {
                operator,
                vrf_keyhash,
                pledge,
                cost,
                margin,
                reward_account,
                pool_owners,
                relays,
                pool_metadata,
            } => {
                e.array(10)?.u64(3)?;
                e.encode(operator)?.encode(vrf_keyhash)?;
                e.u64(*pledge)?.u64(*cost)?;
                e.encode(margin)?.encode(reward_account)?;
                e.encode(pool_owners)?.encode(relays)?;
                match pool_metadata {
                    Some(metadata) => e.encode(metadata)?,
                    None => e.null()?,
                };
            }
            Certificate::PoolRetirement(pool, epoch) => {
                e.array(3)?.u64(4)?.encode(pool)?.u64(*epoch)?;
            }
            Certificate::GenesisKeyDelegation(genesis, delegate, vrf) => {
                e.array(4)?.u64(5)?.encode(genesis)?.encode(delegate)?.encode(vrf)?;
            }
            Certificate::MoveInstantaneousRewardsCert(mir) => {
                e.array(2)?.u64(6)?.encode(mir)?;
            }
            Certificate::Reg(credential, deposit) => {
                e.array(3)?.u64(7)?.encode(credential)?.u64(*deposit)?;
            }
            Certificate::UnReg(credential, deposit) => {
                e.array(3)?.u64(8)?.encode(credential)?.u64(*deposit)?;
            }
            Certificate::VoteDeleg(credential, drep) => {
                e.array(3)?.u64(9)?.encode(credential)?.encode(drep)?;
            }
            Certificate::StakeVoteDeleg(credential, pool, drep) => {
                e.array(4)?.u64(10)?.encode(credential)?.encode(pool)?.encode(drep)?;
            }
            Certificate::StakeRegDeleg(credential, pool, deposit) => {
                e.array(4)?.u64(11)?.encode(credential)?.encode(pool)?.u64(*deposit)?;
            }
            Certificate::VoteRegDeleg(credential, drep, deposit) => {
                e.array(4)?.u64(12)?.encode(credential)?.encode(drep)?.u64(*deposit)?;
            }
            Certificate::StakeVoteRegDeleg(credential, pool, drep, deposit) => {
                e.array(5)?
                    .u64(13)?
                    .encode(credential)?
                    .encode(pool)?
                    .encode(drep)?
                    .u64(*deposit)?;
            }
            Certificate::AuthCommitteeHot(cold, hot) => {
                e.array(3)?.u64(14)?.encode(cold)?.encode(hot)?;
            }
            Certificate::ResignCommitteeCold(cold, anchor) => {
                e.array(3)?.u64(15)?.encode(cold)?;
                encode_nullable_anchor(anchor, e)?;
            }
            Certificate::RegDRepCert(credential, deposit, anchor) => {
                e.array(4)?.u64(16)?.encode(credential)?.u64(*deposit)?;
                encode_nullable_anchor(anchor, e)?;
            }
            Certificate::UnRegDRepCert(credential, deposit) => {
                e.array(3)?.u64(17)?.encode(credential)?.u64(*deposit)?;
            }
            Certificate::UpdateDRepCert(credential, anchor) => {
                e.array(3)?.u64(18)?.encode(credential)?;
                encode_nullable_anchor(anchor, e)?;
            }
        }

        Ok(())
    }
}
