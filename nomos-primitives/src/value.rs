use std::collections::BTreeMap;
use std::{fmt, ops};

use nomos_codec::utils::Bytes;
use nomos_codec::{CborReader, CborReaderState, CborWriter, Decode, Encode, Error};

use crate::{Coin, PolicyId};

/// A native-asset name: at most 32 bytes, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssetName(Bytes);

pub const MAX_ASSET_NAME_SIZE: usize = 32;

impl AssetName {
    pub fn new(bytes: Vec<u8>) -> Result<Self, crate::Error> {
        if bytes.len() > MAX_ASSET_NAME_SIZE {
            return Err(crate::Error::InvalidArgument(
                "asset name must not exceed 32 bytes",
            ));
        }

        Ok(AssetName(bytes.into()))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<Vec<u8>> for AssetName {
    type Error = crate::Error;

    fn try_from(bytes: Vec<u8>) -> Result<Self, Self::Error> {
        AssetName::new(bytes)
    }
}

impl fmt::Display for AssetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.as_slice()))
    }
}

impl Decode for AssetName {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        let bytes = d.bytes()?;
        if bytes.len() > MAX_ASSET_NAME_SIZE {
            return Err(Error::message("asset name longer than 32 bytes"));
        }

        Ok(AssetName(bytes.into()))
    }
}

impl Encode for AssetName {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        self.0.encode(e)
    }
}

/// Per-policy asset quantities.
///
/// Quantities are signed so the same structure serves output values
/// (strictly positive) and mint fields (negative meaning burn). Arithmetic
/// prunes zero quantities and empty policies, so no operation ever leaves
/// an empty inner map behind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultiAsset(BTreeMap<PolicyId, BTreeMap<AssetName, i64>>);

impl MultiAsset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn policy_count(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, policy: &PolicyId, name: &AssetName) -> Option<i64> {
        self.0.get(policy).and_then(|assets| assets.get(name)).copied()
    }

    /// Sets the quantity of one asset. A zero quantity removes the entry
    /// (and the policy, once its last asset is gone).
    pub fn set(&mut self, policy: PolicyId, name: AssetName, quantity: i64) {
        if quantity == 0 {
            if let Some(assets) = self.0.get_mut(&policy) {
                assets.remove(&name);
                if assets.is_empty() {
                    self.0.remove(&policy);
                }
            }
        } else {
            self.0.entry(policy).or_default().insert(name, quantity);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PolicyId, &BTreeMap<AssetName, i64>)> {
        self.0.iter()
    }

    /// The sub-bundle of entries with positive quantities.
    pub fn get_positive(&self) -> MultiAsset {
        self.filtered(|quantity| quantity > 0)
    }

    /// The sub-bundle of entries with negative quantities.
    pub fn get_negative(&self) -> MultiAsset {
        self.filtered(|quantity| quantity < 0)
    }

    fn filtered(&self, keep: impl Fn(i64) -> bool) -> MultiAsset {
        let mut result = MultiAsset::new();

        for (policy, assets) in &self.0 {
            for (name, quantity) in assets {
                if keep(*quantity) {
                    result.set(*policy, name.clone(), *quantity);
                }
            }
        }

        result
    }

    fn combined(&self, other: &MultiAsset, sign: i64) -> MultiAsset {
        let mut result = self.clone();

        for (policy, assets) in &other.0 {
            for (name, quantity) in assets {
                let current = result.get(policy, name).unwrap_or(0);
                result.set(*policy, name.clone(), current + sign * quantity);
            }
        }

        result
    }

    /// Checks every quantity against a predicate, for the decode contexts
    /// that restrict the sign (output values, mint fields).
    pub(crate) fn check_quantities(
        &self,
        valid: impl Fn(i64) -> bool,
        what: &'static str,
    ) -> Result<(), Error> {
        for (_, assets) in self.iter() {
            for quantity in assets.values() {
                if !valid(*quantity) {
                    return Err(Error::message(what));
                }
            }
        }

        Ok(())
    }
}

impl ops::Add for &MultiAsset {
    type Output = MultiAsset;

    fn add(self, other: &MultiAsset) -> MultiAsset {
        self.combined(other, 1)
    }
}

impl ops::Sub for &MultiAsset {
    type Output = MultiAsset;

    fn sub(self, other: &MultiAsset) -> MultiAsset {
        self.combined(other, -1)
    }
}

impl Decode for MultiAsset {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        let mut result = BTreeMap::new();

        let entries: Vec<(PolicyId, Vec<(AssetName, i64)>)> = decode_nested_map(d)?;
        for (policy, assets) in entries {
            result.insert(policy, assets.into_iter().collect());
        }

        Ok(MultiAsset(result))
    }
}

impl Encode for MultiAsset {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.map(self.0.len() as u64)?;

        for (policy, assets) in &self.0 {
            policy.encode(e)?;
            e.map(assets.len() as u64)?;
            for (name, quantity) in assets {
                name.encode(e)?;
                e.i64(*quantity)?;
            }
        }

        Ok(())
    }
}

fn decode_nested_map(
    d: &mut CborReader,
) -> Result<Vec<(PolicyId, Vec<(AssetName, i64)>)>, Error> {
    let mut outer = Vec::new();

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

        let policy = PolicyId::decode(d)?;

        let mut inner = Vec::new();
        let inner_len = d.map()?;
        let mut inner_remaining = inner_len;
        loop {
            match inner_remaining {
                Some(0) => break,
                Some(ref mut n) => *n -= 1,
                None => {
                    if d.peek_state()? == CborReaderState::EndMap {
                        break;
                    }
                }
            }

            let name = AssetName::decode(d)?;
            let quantity = d.i64()?;
            inner.push((name, quantity));
        }
        d.end_map()?;

        outer.push((policy, inner));
    }
    d.end_map()?;

    Ok(outer)
}

/// A coin amount plus the multi-assets riding along with it.
///
/// On the wire a pure-ada value is a bare unsigned integer; anything else
/// is the `[coin, multiasset]` pair. The encoder picks the form from the
/// content, so a value whose assets were all pruned away goes back to the
/// compact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Value {
    pub coin: Coin,
    pub assets: MultiAsset,
}

impl Value {
    pub fn new(coin: Coin) -> Self {
        Value {
            coin,
            assets: MultiAsset::new(),
        }
    }

    pub fn with_assets(coin: Coin, assets: MultiAsset) -> Self {
        Value { coin, assets }
    }
}

impl From<Coin> for Value {
    fn from(coin: Coin) -> Self {
        Value::new(coin)
    }
}

impl Decode for Value {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.peek_state()? {
            CborReaderState::UnsignedInteger => Ok(Value::new(d.u64()?)),
            CborReaderState::StartArray | CborReaderState::StartIndefiniteArray => {
                crate::expect_array(d, 2)?;
                let coin = d.u64()?;
                let assets = MultiAsset::decode(d)?;
                d.end_array()?;

                assets.check_quantities(
                    |quantity| quantity > 0,
                    "output value with a zero or negative asset quantity",
                )?;

                Ok(Value { coin, assets })
            }
            found => Err(Error::TypeMismatch {
                expected: "coin or [coin, multiasset]",
                found,
            }),
        }
    }
}

impl Encode for Value {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        if self.assets.is_empty() {
            e.u64(self.coin)?;
        } else {
            e.array(2)?.u64(self.coin)?.encode(&self.assets)?;
        }

        Ok(())
    }
}

/// The mint field: the same shape as [`MultiAsset`] but quantities must be
/// non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mint(pub MultiAsset);

impl Decode for Mint {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        let assets = MultiAsset::decode(d)?;
        assets.check_quantities(|quantity| quantity != 0, "mint with a zero quantity")?;
        Ok(Mint(assets))
    }
}

impl Encode for Mint {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        self.0.encode(e)
    }
}
