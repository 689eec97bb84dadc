use nomos_codec::utils::KeyValuePairs;
use nomos_codec::{CborReader, CborWriter, Decode, Encode, Error};

use crate::{
    expect_array, Coin, CostModel, Epoch, ExUnits, PositiveInterval, RationalNumber, UnitInterval,
};

#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub enum Language {
    PlutusV1,
    PlutusV2,
    PlutusV3,
}

/// Cost models per script language.
///
/// Unknown language keys are retained and re-emitted, so a parameter
/// bundle carrying a newer era's language survives a canonical round-trip;
/// the known languages are the only ones the fee layer can price.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct CostModels {
    pub plutus_v1: Option<CostModel>,
    pub plutus_v2: Option<CostModel>,
    pub plutus_v3: Option<CostModel>,

    pub unknown: Vec<(u64, CostModel)>,
}

impl CostModels {
    pub fn get(&self, language: Language) -> Result<&CostModel, crate::Error> {
        let model = match language {
            Language::PlutusV1 => &self.plutus_v1,
            Language::PlutusV2 => &self.plutus_v2,
            Language::PlutusV3 => &self.plutus_v3,
        };

        model.as_ref().ok_or(crate::Error::InvalidPlutusCostModel)
    }
}

impl Decode for CostModels {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        let models: KeyValuePairs<u64, CostModel> = KeyValuePairs::decode(d)?;

        let mut result = CostModels::default();
        for (language, model) in models.to_vec() {
            match language {
                0 => result.plutus_v1 = Some(model),
                1 => result.plutus_v2 = Some(model),
                2 => result.plutus_v3 = Some(model),
                _ => result.unknown.push((language, model)),
            }
        }

        Ok(result)
    }
}

impl Encode for CostModels {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        let known = [
            (0u64, &self.plutus_v1),
            (1, &self.plutus_v2),
            (2, &self.plutus_v3),
        ];

        let mut entries: Vec<(u64, &CostModel)> = known
            .into_iter()
            .filter_map(|(language, model)| model.as_ref().map(|model| (language, model)))
            .collect();
        entries.extend(
            self.unknown
                .iter()
                .map(|(language, model)| (*language, model)),
        );
        entries.sort_by_key(|(language, _)| *language);

        e.map(entries.len() as u64)?;
        for (language, model) in entries {
            e.u64(language)?.encode(model)?;
        }

        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ExUnitPrices {
    pub mem_price: PositiveInterval,
    pub step_price: PositiveInterval,
}

impl Decode for ExUnitPrices {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 2)?;
        let mem_price = PositiveInterval::decode(d)?;
        let step_price = PositiveInterval::decode(d)?;
        d.end_array()?;

        Ok(ExUnitPrices {
            mem_price,
            step_price,
        })
    }
}

impl Encode for ExUnitPrices {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(2)?.encode(&self.mem_price)?.encode(&self.step_price)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PoolVotingThresholds {
    pub motion_no_confidence: UnitInterval,
    pub committee_normal: UnitInterval,
    pub committee_no_confidence: UnitInterval,
    pub hard_fork_initiation: UnitInterval,
    pub security_voting_threshold: UnitInterval,
}

impl Decode for PoolVotingThresholds {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 5)?;
        let thresholds = PoolVotingThresholds {
            motion_no_confidence: UnitInterval::decode(d)?,
            committee_normal: UnitInterval::decode(d)?,
            committee_no_confidence: UnitInterval::decode(d)?,
            hard_fork_initiation: UnitInterval::decode(d)?,
            security_voting_threshold: UnitInterval::decode(d)?,
        };
        d.end_array()?;

        Ok(thresholds)
    }
}

impl Encode for PoolVotingThresholds {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(5)?
            .encode(&self.motion_no_confidence)?
            .encode(&self.committee_normal)?
            .encode(&self.committee_no_confidence)?
            .encode(&self.hard_fork_initiation)?
            .encode(&self.security_voting_threshold)?;
        Ok(())
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DRepVotingThresholds {
    pub motion_no_confidence: UnitInterval,
    pub committee_normal: UnitInterval,
    pub committee_no_confidence: UnitInterval,
    pub update_constitution: UnitInterval,
    pub hard_fork_initiation: UnitInterval,
    pub pp_network_group: UnitInterval,
    pub pp_economic_group: UnitInterval,
    pub pp_technical_group: UnitInterval,
    pub pp_governance_group: UnitInterval,
    pub treasury_withdrawal: UnitInterval,
}

impl Decode for DRepVotingThresholds {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        expect_array(d, 10)?;
        let thresholds = DRepVotingThresholds {
            motion_no_confidence: UnitInterval::decode(d)?,
            committee_normal: UnitInterval::decode(d)?,
            committee_no_confidence: UnitInterval::decode(d)?,
            update_constitution: UnitInterval::decode(d)?,
            hard_fork_initiation: UnitInterval::decode(d)?,
            pp_network_group: UnitInterval::decode(d)?,
            pp_economic_group: UnitInterval::decode(d)?,
            pp_technical_group: UnitInterval::decode(d)?,
            pp_governance_group: UnitInterval::decode(d)?,
            treasury_withdrawal: UnitInterval::decode(d)?,
        };
        d.end_array()?;

        Ok(thresholds)
    }
}

impl Encode for DRepVotingThresholds {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(10)?
            .encode(&self.motion_no_confidence)?
            .encode(&self.committee_normal)?
            .encode(&self.committee_no_confidence)?
            .encode(&self.update_constitution)?
            .encode(&self.hard_fork_initiation)?
            .encode(&self.pp_network_group)?
            .encode(&self.pp_economic_group)?
            .encode(&self.pp_technical_group)?
            .encode(&self.pp_governance_group)?
            .encode(&self.treasury_withdrawal)?;
        Ok(())
    }
}

/// The parameter-update payload carried by governance actions: every field
/// optional, keyed by the protocol parameter number.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct ProtocolParamUpdate {
    pub minfee_a: Option<u64>,
    pub minfee_b: Option<u64>,
    pub max_block_body_size: Option<u64>,
    pub max_transaction_size: Option<u64>,
    pub max_block_header_size: Option<u64>,
    pub key_deposit: Option<Coin>,
    pub pool_deposit: Option<Coin>,
    pub maximum_epoch: Option<Epoch>,
    pub desired_number_of_stake_pools: Option<u64>,
    pub pool_pledge_influence: Option<RationalNumber>,
    pub expansion_rate: Option<UnitInterval>,
    pub treasury_growth_rate: Option<UnitInterval>,

    pub min_pool_cost: Option<Coin>,
    pub ada_per_utxo_byte: Option<Coin>,
    pub cost_models_for_script_languages: Option<CostModels>,
    pub execution_costs: Option<ExUnitPrices>,
    pub max_tx_ex_units: Option<ExUnits>,
    pub max_block_ex_units: Option<ExUnits>,
    pub max_value_size: Option<u64>,
    pub collateral_percentage: Option<u64>,
    pub max_collateral_inputs: Option<u64>,

    pub pool_voting_thresholds: Option<PoolVotingThresholds>,
    pub drep_voting_thresholds: Option<DRepVotingThresholds>,
    pub min_committee_size: Option<u64>,
    pub committee_term_limit: Option<Epoch>,
    pub governance_action_validity_period: Option<Epoch>,
    pub governance_action_deposit: Option<Coin>,
    pub drep_deposit: Option<Coin>,
    pub drep_inactivity_period: Option<Epoch>,
    pub minfee_refscript_cost_per_byte: Option<UnitInterval>,
}

cbor_map_struct!(ProtocolParamUpdate {
    0 => minfee_a,
    1 => minfee_b,
    2 => max_block_body_size,
    3 => max_transaction_size,
    4 => max_block_header_size,
    5 => key_deposit,
    6 => pool_deposit,
    7 => maximum_epoch,
    8 => desired_number_of_stake_pools,
    9 => pool_pledge_influence,
    10 => expansion_rate,
    11 => treasury_growth_rate,
    16 => min_pool_cost,
    17 => ada_per_utxo_byte,
    18 => cost_models_for_script_languages,
    19 => execution_costs,
    20 => max_tx_ex_units,
    21 => max_block_ex_units,
    22 => max_value_size,
    23 => collateral_percentage,
    24 => max_collateral_inputs,
    25 => pool_voting_thresholds,
    26 => drep_voting_thresholds,
    27 => min_committee_size,
    28 => committee_term_limit,
    29 => governance_action_validity_period,
    30 => governance_action_deposit,
    31 => drep_deposit,
    32 => drep_inactivity_period,
    33 => minfee_refscript_cost_per_byte,
});
