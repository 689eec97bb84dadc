use std::{fmt, ops::Deref, str::FromStr};

use crate::{CborReader, CborReaderState, CborWriter, Decode, Encode, Error, Tag};

/// Owned byte sequence with hex views, encoded as a CBOR byte string.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    pub fn to_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }
}

impl From<&[u8]> for Bytes {
    fn from(bytes: &[u8]) -> Self {
        Bytes(bytes.to_vec())
    }
}

impl From<Bytes> for Vec<u8> {
    fn from(bytes: Bytes) -> Self {
        bytes.0
    }
}

impl Deref for Bytes {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes({})", hex::encode(&self.0))
    }
}

impl fmt::Display for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0))
    }
}

impl FromStr for Bytes {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Bytes(hex::decode(s)?))
    }
}

impl Decode for Bytes {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        Ok(Bytes(d.bytes()?))
    }
}

impl Encode for Bytes {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.bytes(&self.0)?;
        Ok(())
    }
}

/// A native CBOR integer: any value of major type 0 or 1, which covers
/// `-2^64 ..= 2^64 - 1`. Values outside this range need the bignum tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Int(pub i128);

impl Int {
    /// Smallest value encodable as a native int.
    pub const MIN: i128 = -(1 << 64);

    /// Largest value encodable as a native int.
    pub const MAX: i128 = u64::MAX as i128;
}

impl From<i64> for Int {
    fn from(value: i64) -> Self {
        Int(value as i128)
    }
}

impl From<u64> for Int {
    fn from(value: u64) -> Self {
        Int(value as i128)
    }
}

impl From<Int> for i128 {
    fn from(value: Int) -> Self {
        value.0
    }
}

impl TryFrom<i128> for Int {
    type Error = Error;

    fn try_from(value: i128) -> Result<Self, Self::Error> {
        if (Int::MIN..=Int::MAX).contains(&value) {
            Ok(Int(value))
        } else {
            Err(Error::IntegerOverflow)
        }
    }
}

impl Decode for Int {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.peek_state()? {
            CborReaderState::UnsignedInteger => Ok(Int(d.u64()? as i128)),
            CborReaderState::NegativeInteger => {
                let value = d.bigint()?;
                // a native negative int always fits i128
                Ok(Int(i128::try_from(value).map_err(|_| Error::IntegerOverflow)?))
            }
            found => Err(Error::TypeMismatch {
                expected: "integer",
                found,
            }),
        }
    }
}

impl Encode for Int {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.bigint(&num_bigint::BigInt::from(self.0))?;
        Ok(())
    }
}

/// An array that remembers whether it was encoded definite or indefinite.
///
/// The ledger accepts both forms and hashes whatever bytes it received, so
/// an isomorphic codec has to reproduce the form it decoded.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum MaybeIndefArray<A> {
    Def(Vec<A>),
    Indef(Vec<A>),
}

impl<A> MaybeIndefArray<A> {
    pub fn to_vec(self) -> Vec<A> {
        self.into()
    }
}

impl<A> Deref for MaybeIndefArray<A> {
    type Target = Vec<A>;

    fn deref(&self) -> &Self::Target {
        match self {
            MaybeIndefArray::Def(x) => x,
            MaybeIndefArray::Indef(x) => x,
        }
    }
}

impl<A> From<MaybeIndefArray<A>> for Vec<A> {
    fn from(other: MaybeIndefArray<A>) -> Self {
        match other {
            MaybeIndefArray::Def(x) => x,
            MaybeIndefArray::Indef(x) => x,
        }
    }
}

impl<A: Decode> Decode for MaybeIndefArray<A> {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.array()? {
            Some(len) => {
                let mut items = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    items.push(A::decode(d)?);
                }
                d.end_array()?;
                Ok(MaybeIndefArray::Def(items))
            }
            None => {
                let mut items = Vec::new();
                while d.peek_state()? != CborReaderState::EndArray {
                    items.push(A::decode(d)?);
                }
                d.end_array()?;
                Ok(MaybeIndefArray::Indef(items))
            }
        }
    }
}

impl<A: Encode> Encode for MaybeIndefArray<A> {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match self {
            MaybeIndefArray::Def(items) => {
                e.array(items.len() as u64)?;
                for item in items {
                    item.encode(e)?;
                }
            }
            MaybeIndefArray::Indef(items) => {
                e.begin_array()?;
                for item in items {
                    item.encode(e)?;
                }
                e.end()?;
            }
        }

        Ok(())
    }
}

/// Order-preserving map representation.
///
/// On-chain maps do not necessarily follow the canonical key order, and the
/// entries are not deduplicated, so a `Vec` of pairs is the only storage
/// that keeps the decoded form intact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyValuePairs<K, V> {
    Def(Vec<(K, V)>),
    Indef(Vec<(K, V)>),
}

impl<K, V> KeyValuePairs<K, V> {
    pub fn to_vec(self) -> Vec<(K, V)> {
        self.into()
    }

    /// Writes the entries as a definite map in ascending key order,
    /// regardless of insertion order.
    pub fn encode_canonical(&self, e: &mut CborWriter) -> Result<(), Error>
    where
        K: Encode + Ord,
        V: Encode,
    {
        let mut entries: Vec<&(K, V)> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        e.map(entries.len() as u64)?;
        for (k, v) in entries {
            k.encode(e)?;
            v.encode(e)?;
        }

        Ok(())
    }
}

impl<K, V> Deref for KeyValuePairs<K, V> {
    type Target = Vec<(K, V)>;

    fn deref(&self) -> &Self::Target {
        match self {
            KeyValuePairs::Def(x) => x,
            KeyValuePairs::Indef(x) => x,
        }
    }
}

impl<K, V> From<KeyValuePairs<K, V>> for Vec<(K, V)> {
    fn from(other: KeyValuePairs<K, V>) -> Self {
        match other {
            KeyValuePairs::Def(x) => x,
            KeyValuePairs::Indef(x) => x,
        }
    }
}

impl<K, V> From<Vec<(K, V)>> for KeyValuePairs<K, V> {
    fn from(entries: Vec<(K, V)>) -> Self {
        KeyValuePairs::Def(entries)
    }
}

impl<K: Decode, V: Decode> Decode for KeyValuePairs<K, V> {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.map()? {
            Some(len) => {
                let mut entries = Vec::with_capacity(len as usize);
                for _ in 0..len {
                    entries.push((K::decode(d)?, V::decode(d)?));
                }
                d.end_map()?;
                Ok(KeyValuePairs::Def(entries))
            }
            None => {
                let mut entries = Vec::new();
                while d.peek_state()? != CborReaderState::EndMap {
                    entries.push((K::decode(d)?, V::decode(d)?));
                }
                d.end_map()?;
                Ok(KeyValuePairs::Indef(entries))
            }
        }
    }
}

impl<K: Encode, V: Encode> Encode for KeyValuePairs<K, V> {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match self {
            KeyValuePairs::Def(entries) => {
                e.map(entries.len() as u64)?;
                for (k, v) in entries {
                    k.encode(e)?;
                    v.encode(e)?;
                }
            }
            KeyValuePairs::Indef(entries) => {
                e.begin_map()?;
                for (k, v) in entries {
                    k.encode(e)?;
                    v.encode(e)?;
                }
                e.end()?;
            }
        }

        Ok(())
    }
}

/// Set-semantic array, optionally wrapped in CBOR tag 258.
///
/// The tag is optional on the wire until the era after Conway. The decoder
/// records whether it was present and the encoder reproduces that choice;
/// freshly built sets prefer the tagged form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Set<T> {
    items: Vec<T>,
    uses_tag: bool,
}

impl<T> Set<T> {
    pub fn to_vec(self) -> Vec<T> {
        self.items
    }

    pub fn uses_tag(&self) -> bool {
        self.uses_tag
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Writes the elements in ascending order regardless of insertion
    /// order, reproducing the witnessed tag form.
    pub fn encode_canonical(&self, e: &mut CborWriter) -> Result<(), Error>
    where
        T: Encode + Ord,
    {
        if self.uses_tag {
            e.tag(Tag::SET)?;
        }

        let mut items: Vec<&T> = self.items.iter().collect();
        items.sort();

        e.array(items.len() as u64)?;
        for item in items {
            item.encode(e)?;
        }

        Ok(())
    }
}

impl<T> Deref for Set<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T> From<Vec<T>> for Set<T> {
    fn from(items: Vec<T>) -> Self {
        Set {
            items,
            uses_tag: true,
        }
    }
}

impl<'a, T> IntoIterator for &'a Set<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn decode_set_items<T: Decode>(d: &mut CborReader) -> Result<(Vec<T>, bool), Error> {
    let uses_tag = d.peek_state()? == CborReaderState::Tag;

    if uses_tag {
        let tag = d.tag()?;
        if tag != Tag::SET {
            return Err(Error::message(format!("unrecognised tag {tag} for set")));
        }
    }

    Ok((Vec::<T>::decode(d)?, uses_tag))
}

impl<T: Decode> Decode for Set<T> {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        let (items, uses_tag) = decode_set_items(d)?;
        Ok(Set { items, uses_tag })
    }
}

impl<T: Encode> Encode for Set<T> {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        if self.uses_tag {
            e.tag(Tag::SET)?;
        }

        e.array(self.items.len() as u64)?;
        for item in &self.items {
            item.encode(e)?;
        }

        Ok(())
    }
}

/// A [`Set`] that rejects the empty case, as required for most of the
/// optional transaction body fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptySet<T> {
    items: Vec<T>,
    uses_tag: bool,
}

impl<T> NonEmptySet<T> {
    pub fn to_vec(self) -> Vec<T> {
        self.items
    }

    pub fn uses_tag(&self) -> bool {
        self.uses_tag
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn encode_canonical(&self, e: &mut CborWriter) -> Result<(), Error>
    where
        T: Encode + Ord,
    {
        if self.uses_tag {
            e.tag(Tag::SET)?;
        }

        let mut items: Vec<&T> = self.items.iter().collect();
        items.sort();

        e.array(items.len() as u64)?;
        for item in items {
            item.encode(e)?;
        }

        Ok(())
    }
}

impl<T> Deref for NonEmptySet<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T> TryFrom<Vec<T>> for NonEmptySet<T> {
    type Error = Vec<T>;

    fn try_from(items: Vec<T>) -> Result<Self, Self::Error> {
        if items.is_empty() {
            Err(items)
        } else {
            Ok(NonEmptySet {
                items,
                uses_tag: true,
            })
        }
    }
}

impl<'a, T> IntoIterator for &'a NonEmptySet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Decode> Decode for NonEmptySet<T> {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        let (items, uses_tag) = decode_set_items::<T>(d)?;

        if items.is_empty() {
            return Err(Error::message("decoding empty set as NonEmptySet"));
        }

        Ok(NonEmptySet { items, uses_tag })
    }
}

impl<T: Encode> Encode for NonEmptySet<T> {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        if self.uses_tag {
            e.tag(Tag::SET)?;
        }

        e.array(self.items.len() as u64)?;
        for item in &self.items {
            item.encode(e)?;
        }

        Ok(())
    }
}

/// A value that may be CBOR `null` or `undefined` on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nullable<T> {
    Some(T),
    Null,
    Undefined,
}

impl<T> Nullable<T> {
    pub fn map<F, O>(self, f: F) -> Nullable<O>
    where
        F: Fn(T) -> O,
    {
        match self {
            Nullable::Some(x) => Nullable::Some(f(x)),
            Nullable::Null => Nullable::Null,
            Nullable::Undefined => Nullable::Undefined,
        }
    }

    pub fn as_ref(&self) -> Option<&T> {
        match self {
            Nullable::Some(x) => Some(x),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(x) => Nullable::Some(x),
            None => Nullable::Null,
        }
    }
}

impl<T> From<Nullable<T>> for Option<T> {
    fn from(value: Nullable<T>) -> Self {
        match value {
            Nullable::Some(x) => Some(x),
            _ => None,
        }
    }
}

impl<T: Decode> Decode for Nullable<T> {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.peek_state()? {
            CborReaderState::Null => {
                d.null()?;
                Ok(Nullable::Null)
            }
            CborReaderState::Undefined => {
                d.undefined()?;
                Ok(Nullable::Undefined)
            }
            _ => Ok(Nullable::Some(T::decode(d)?)),
        }
    }
}

impl<T: Encode> Encode for Nullable<T> {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match self {
            Nullable::Some(x) => x.encode(e),
            Nullable::Null => {
                e.null()?;
                Ok(())
            }
            Nullable::Undefined => {
                e.undefined()?;
                Ok(())
            }
        }
    }
}

/// Wraps a value so that it is carried as a tag 24 embedded-CBOR byte
/// string (inline datums, script references).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CborWrap<T>(pub T);

impl<T> CborWrap<T> {
    pub fn unwrap(self) -> T {
        self.0
    }
}

impl<T> Deref for CborWrap<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T: Decode> Decode for CborWrap<T> {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        let tag = d.tag()?;
        if tag != Tag::ENCODED_CBOR {
            return Err(Error::message(format!(
                "unexpected tag {tag} for wrapped cbor"
            )));
        }

        let cbor = d.bytes()?;
        Ok(CborWrap(crate::from_bytes(&cbor)?))
    }
}

impl<T: Encode> Encode for CborWrap<T> {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        let cbor = crate::to_vec(&self.0)?;
        e.tag(Tag::ENCODED_CBOR)?;
        e.bytes(&cbor)?;
        Ok(())
    }
}

/// Decodes a value while retaining its original encoding.
///
/// CBOR admits several encodings of the same logical value; signatures are
/// computed over the literal bytes. As long as the wrapper has not been
/// mutated, encoding emits the captured bytes verbatim, so a decode/encode
/// round-trip preserves hashes. Every mutable access goes through
/// [`KeepRaw::to_mut`], which drops the cache; reaching a nested value
/// mutably requires `to_mut` on every enclosing wrapper, which is what
/// propagates the invalidation upward.
#[derive(Debug, Clone, Eq)]
pub struct KeepRaw<T> {
    inner: T,
    raw: Option<Vec<u8>>,
}

impl<T> KeepRaw<T> {
    /// The captured encoding, if the value is still clean.
    pub fn raw_cbor(&self) -> Option<&[u8]> {
        self.raw.as_deref()
    }

    /// Mutable access to the inner value. Drops the cached encoding.
    pub fn to_mut(&mut self) -> &mut T {
        self.raw = None;
        &mut self.inner
    }

    /// Drops the cached encoding so the next emission re-serializes the
    /// parsed fields canonically.
    pub fn invalidate(&mut self) {
        self.raw = None;
    }

    pub fn unwrap(self) -> T {
        self.inner
    }
}

impl<T> From<T> for KeepRaw<T> {
    fn from(inner: T) -> Self {
        KeepRaw { inner, raw: None }
    }
}

impl<T> Deref for KeepRaw<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T: PartialEq> PartialEq for KeepRaw<T> {
    fn eq(&self, other: &Self) -> bool {
        // the cache is a serialization detail, not part of the value
        self.inner == other.inner
    }
}

impl<T: Decode> Decode for KeepRaw<T> {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        let all = d.input();
        let start = d.position();
        let inner = T::decode(d)?;
        let end = d.position();

        Ok(KeepRaw {
            inner,
            raw: Some(all[start..end].to_vec()),
        })
    }
}

impl<T: Encode> Encode for KeepRaw<T> {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match &self.raw {
            Some(raw) => {
                e.raw_cbor(raw)?;
                Ok(())
            }
            None => self.inner.encode(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{from_bytes, from_hex, to_hex, to_vec};

    #[test]
    fn set_records_tag_presence() {
        let tagged: Set<u64> = from_hex("d9010283010203").unwrap();
        assert!(tagged.uses_tag());
        assert_eq!(to_hex(&tagged).unwrap(), "d9010283010203");

        let untagged: Set<u64> = from_hex("83010203").unwrap();
        assert!(!untagged.uses_tag());
        assert_eq!(to_hex(&untagged).unwrap(), "83010203");
    }

    #[test]
    fn fresh_sets_prefer_the_tagged_form() {
        let set = Set::from(vec![3u64, 1, 2]);
        assert_eq!(to_hex(&set).unwrap(), "d9010283030102");
    }

    #[test]
    fn canonical_set_emission_sorts_elements() {
        let set = Set::from(vec![3u64, 1, 2]);
        let mut e = CborWriter::new();
        set.encode_canonical(&mut e).unwrap();
        assert_eq!(e.hex(), "d9010283010203");
    }

    #[test]
    fn non_empty_set_rejects_empty_input() {
        assert!(from_hex::<NonEmptySet<u64>>("d9010280").is_err());
        assert!(NonEmptySet::<u64>::try_from(Vec::new()).is_err());
    }

    #[test]
    fn maybe_indef_array_preserves_form() {
        for hex_str in ["83010203", "9f010203ff", "80"] {
            let value: MaybeIndefArray<u64> = from_hex(hex_str).unwrap();
            assert_eq!(to_hex(&value).unwrap(), hex_str);
        }
    }

    #[test]
    fn key_value_pairs_preserve_form_and_order() {
        for hex_str in ["a202010403", "bf02010403ff"] {
            let value: KeyValuePairs<u64, u64> = from_hex(hex_str).unwrap();
            assert_eq!(to_hex(&value).unwrap(), hex_str);
        }

        let value: KeyValuePairs<u64, u64> = from_hex("a202010403").unwrap();
        let mut e = CborWriter::new();
        value.encode_canonical(&mut e).unwrap();
        assert_eq!(e.hex(), "a204030201");
    }

    #[test]
    fn keep_raw_replays_original_bytes_until_mutated() {
        // non-canonical: 1 encoded with a two-byte head
        let bytes = hex::decode("1801").unwrap();
        let mut value: KeepRaw<u64> = from_bytes(&bytes).unwrap();
        assert_eq!(*value, 1);
        assert_eq!(to_vec(&value).unwrap(), bytes);

        *value.to_mut() = 1;
        assert_eq!(to_hex(&value).unwrap(), "01");
    }

    #[test]
    fn keep_raw_invalidate_forces_canonical_emission() {
        let bytes = hex::decode("1801").unwrap();
        let mut value: KeepRaw<u64> = from_bytes(&bytes).unwrap();
        value.invalidate();
        assert_eq!(to_hex(&value).unwrap(), "01");
    }

    #[test]
    fn cbor_wrap_round_trip() {
        let wrapped: CborWrap<u64> = from_hex("d81842187b").unwrap();
        assert_eq!(*wrapped, 123);
        assert_eq!(to_hex(&wrapped).unwrap(), "d81842187b");
    }

    #[test]
    fn nullable_decodes_null_and_undefined() {
        assert_eq!(from_hex::<Nullable<u64>>("f6").unwrap(), Nullable::Null);
        assert_eq!(
            from_hex::<Nullable<u64>>("f7").unwrap(),
            Nullable::Undefined
        );
        assert_eq!(from_hex::<Nullable<u64>>("05").unwrap(), Nullable::Some(5));
    }

    #[test]
    fn bytes_hex_views() {
        let value = Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(value.to_string(), "deadbeef");
        assert_eq!("deadbeef".parse::<Bytes>().unwrap(), value);
        assert_eq!(to_hex(&value).unwrap(), "44deadbeef");
    }
}
