use std::{fmt, ops::Deref};

use nomos_codec::utils::{Int, KeyValuePairs, MaybeIndefArray};
use nomos_codec::{CborReader, CborReaderState, CborWriter, Decode, Encode, Error, Tag};

/// The untyped IR for on-chain script data: a sum over constructors, maps,
/// lists, integers and byte strings.
///
/// Script data feeds hashes, so every variant records the encoding choices
/// the wire made (definite vs indefinite containers, byte-string chunking,
/// native int vs bignum) and reproduces them on emission.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum PlutusData {
    Constr(Constr<PlutusData>),
    Map(KeyValuePairs<PlutusData, PlutusData>),
    BigInt(BigInt),
    BoundedBytes(BoundedBytes),
    Array(MaybeIndefArray<PlutusData>),
}

impl PlutusData {
    /// A fresh list, encoded the way the canonical plutus implementation
    /// does: indefinite when non-empty, a definite zero-length array when
    /// empty.
    pub fn list(items: Vec<PlutusData>) -> Self {
        PlutusData::Array(haskell_list(items))
    }

    pub fn int(value: i64) -> Self {
        PlutusData::BigInt(BigInt::Int(Int::from(value)))
    }

    pub fn bytes(value: Vec<u8>) -> Self {
        PlutusData::BoundedBytes(BoundedBytes::from(value))
    }

    pub fn constr(alternative: u64, fields: Vec<PlutusData>) -> Self {
        PlutusData::Constr(Constr::new(alternative, fields))
    }
}

impl Decode for PlutusData {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.peek_state()? {
            CborReaderState::Tag => {
                let tag = d.peek_tag()?;

                if tag == Tag::POS_BIGNUM || tag == Tag::NEG_BIGNUM {
                    Ok(Self::BigInt(BigInt::decode(d)?))
                } else {
                    match tag.as_u64() {
                        (121..=127) | (1280..=1400) | 102 => Ok(Self::Constr(Constr::decode(d)?)),
                        _ => Err(Error::message("unknown tag for plutus data")),
                    }
                }
            }
            CborReaderState::UnsignedInteger | CborReaderState::NegativeInteger => {
                Ok(Self::BigInt(BigInt::decode(d)?))
            }
            CborReaderState::StartMap | CborReaderState::StartIndefiniteMap => {
                Ok(Self::Map(KeyValuePairs::decode(d)?))
            }
            CborReaderState::ByteString | CborReaderState::StartIndefiniteByteString => {
                Ok(Self::BoundedBytes(BoundedBytes::decode(d)?))
            }
            CborReaderState::StartArray | CborReaderState::StartIndefiniteArray => {
                Ok(Self::Array(MaybeIndefArray::decode(d)?))
            }
            found => Err(Error::TypeMismatch {
                expected: "plutus data",
                found,
            }),
        }
    }
}

impl Encode for PlutusData {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match self {
            Self::Constr(x) => x.encode(e),
            Self::Map(x) => x.encode(e),
            Self::BigInt(x) => x.encode(e),
            Self::BoundedBytes(x) => x.encode(e),
            Self::Array(x) => x.encode(e),
        }
    }
}

/*
big_int = int / big_uint / big_nint
big_uint = #6.2(bounded_bytes)
big_nint = #6.3(bounded_bytes)
*/

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum BigInt {
    Int(Int),
    BigUInt(BoundedBytes),
    BigNInt(BoundedBytes),
}

impl From<i64> for BigInt {
    fn from(value: i64) -> Self {
        BigInt::Int(Int::from(value))
    }
}

impl From<&BigInt> for num_bigint::BigInt {
    fn from(value: &BigInt) -> Self {
        match value {
            BigInt::Int(x) => num_bigint::BigInt::from(x.0),
            BigInt::BigUInt(x) => num_bigint::BigInt::from_bytes_be(num_bigint::Sign::Plus, x),
            BigInt::BigNInt(x) => {
                -num_bigint::BigInt::from_bytes_be(num_bigint::Sign::Plus, x) - 1
            }
        }
    }
}

impl Decode for BigInt {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.peek_state()? {
            CborReaderState::UnsignedInteger | CborReaderState::NegativeInteger => {
                Ok(Self::Int(Int::decode(d)?))
            }
            CborReaderState::Tag => {
                let tag = d.tag()?;
                match tag {
                    Tag::POS_BIGNUM => Ok(Self::BigUInt(BoundedBytes::decode(d)?)),
                    Tag::NEG_BIGNUM => Ok(Self::BigNInt(BoundedBytes::decode(d)?)),
                    _ => Err(Error::message("invalid cbor tag for big int")),
                }
            }
            found => Err(Error::TypeMismatch {
                expected: "big int",
                found,
            }),
        }
    }
}

impl Encode for BigInt {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match self {
            BigInt::Int(x) => x.encode(e),
            BigInt::BigUInt(x) => {
                e.tag(Tag::POS_BIGNUM)?;
                x.encode(e)
            }
            BigInt::BigNInt(x) => {
                e.tag(Tag::NEG_BIGNUM)?;
                x.encode(e)
            }
        }
    }
}

/// A plutus data constructor.
///
/// `tag` is the raw CBOR tag that carried the constructor: 121..=127 for
/// alternatives 0..=6, 1280..=1400 for alternatives 7..=127, and 102 for
/// the general form, where the alternative travels inside the wrapper
/// array as `any_constructor`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Constr<A> {
    pub tag: u64,
    pub any_constructor: Option<u64>,
    /// whether the tag-102 `[alternative, fields]` wrapper was indefinite
    pub general_form_indef: bool,
    pub fields: MaybeIndefArray<A>,
}

impl<A> Constr<A> {
    pub fn new(alternative: u64, fields: Vec<A>) -> Self {
        let (tag, any_constructor) = match alternative {
            0..=6 => (121 + alternative, None),
            7..=127 => (1280 + alternative - 7, None),
            _ => (102, Some(alternative)),
        };

        Constr {
            tag,
            any_constructor,
            general_form_indef: false,
            fields: haskell_list(fields),
        }
    }

    /// The logical alternative, whatever tag form carried it.
    pub fn alternative(&self) -> u64 {
        match self.tag {
            121..=127 => self.tag - 121,
            1280..=1400 => self.tag - 1280 + 7,
            _ => self.any_constructor.unwrap_or_default(),
        }
    }
}

impl<A: Decode> Decode for Constr<A> {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        let tag = d.tag()?.as_u64();

        match tag {
            121..=127 | 1280..=1400 => Ok(Constr {
                tag,
                any_constructor: None,
                general_form_indef: false,
                fields: MaybeIndefArray::decode(d)?,
            }),
            102 => {
                let len = d.array()?;
                if let Some(found) = len {
                    if found != 2 {
                        return Err(Error::InvalidArraySize { expected: 2, found });
                    }
                }

                let any_constructor = d.u64()?;
                let fields = MaybeIndefArray::decode(d)?;
                d.end_array()?;

                Ok(Constr {
                    tag,
                    any_constructor: Some(any_constructor),
                    general_form_indef: len.is_none(),
                    fields,
                })
            }
            _ => Err(Error::message("bad tag code for plutus data constructor")),
        }
    }
}

impl<A: Encode> Encode for Constr<A> {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.tag(Tag::new(self.tag))?;

        if self.tag == 102 {
            if self.general_form_indef {
                e.begin_array()?;
                e.u64(self.any_constructor.unwrap_or_default())?;
                self.fields.encode(e)?;
                e.end()?;
            } else {
                e.array(2)?;
                e.u64(self.any_constructor.unwrap_or_default())?;
                self.fields.encode(e)?;
            }
            Ok(())
        } else {
            self.fields.encode(e)
        }
    }
}

/// Plutus byte strings, chunked the way the canonical plutus
/// implementation chunks them.
///
/// Strings longer than 64 bytes travel as an indefinite-length byte string
/// of segments of at most 64 bytes. The decoder records whether the wire
/// used the chunked form so a definite string stays definite on re-emission.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BoundedBytes {
    bytes: Vec<u8>,
    chunked: bool,
}

const CHUNK_SIZE: usize = 64;

impl From<Vec<u8>> for BoundedBytes {
    fn from(bytes: Vec<u8>) -> Self {
        let chunked = bytes.len() > CHUNK_SIZE;
        BoundedBytes { bytes, chunked }
    }
}

impl From<BoundedBytes> for Vec<u8> {
    fn from(value: BoundedBytes) -> Self {
        value.bytes
    }
}

impl Deref for BoundedBytes {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.bytes
    }
}

impl TryFrom<String> for BoundedBytes {
    type Error = hex::FromHexError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(BoundedBytes::from(hex::decode(value)?))
    }
}

impl From<BoundedBytes> for String {
    fn from(value: BoundedBytes) -> Self {
        hex::encode(value.deref())
    }
}

impl fmt::Display for BoundedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.bytes))
    }
}

impl Decode for BoundedBytes {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        let chunked = d.peek_state()? == CborReaderState::StartIndefiniteByteString;
        let bytes = d.bytes()?;
        Ok(BoundedBytes { bytes, chunked })
    }
}

impl Encode for BoundedBytes {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        if !self.chunked {
            e.bytes(&self.bytes)?;
        } else {
            e.begin_bytes()?;
            for chunk in self.bytes.chunks(CHUNK_SIZE) {
                e.bytes(chunk)?;
            }
            e.end()?;
        }
        Ok(())
    }
}

fn haskell_list<T>(items: Vec<T>) -> MaybeIndefArray<T> {
    // indefinite for non-empty lists, a definite 0-length array otherwise,
    // matching the cborg default encoder the on-chain data was built with
    if items.is_empty() {
        MaybeIndefArray::Def(items)
    } else {
        MaybeIndefArray::Indef(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomos_codec::{from_hex, to_hex};
    use test_case::test_case;

    #[test]
    fn empty_constr_round_trip() {
        let data: PlutusData = from_hex("d87980").unwrap();

        match &data {
            PlutusData::Constr(constr) => {
                assert_eq!(constr.alternative(), 0);
                assert!(constr.fields.is_empty());
            }
            other => panic!("unexpected variant {other:?}"),
        }

        assert_eq!(to_hex(&data).unwrap(), "d87980");
    }

    #[test]
    fn simple_constr_round_trip() {
        let data: PlutusData = from_hex("d8799f0102030405ff").unwrap();

        match &data {
            PlutusData::Constr(constr) => {
                assert_eq!(constr.alternative(), 0);
                assert_eq!(constr.fields.len(), 5);
            }
            other => panic!("unexpected variant {other:?}"),
        }

        assert_eq!(to_hex(&data).unwrap(), "d8799f0102030405ff");
    }

    #[test]
    fn fresh_constrs_use_the_compact_tags() {
        let fields: Vec<PlutusData> = (1..=5).map(PlutusData::int).collect();

        let data = PlutusData::constr(0, fields.clone());
        assert_eq!(to_hex(&data).unwrap(), "d8799f0102030405ff");

        let data = PlutusData::constr(0, Vec::new());
        assert_eq!(to_hex(&data).unwrap(), "d87980");

        let data = PlutusData::constr(150, fields);
        assert_eq!(to_hex(&data).unwrap(), "d8668218969f0102030405ff");
    }

    #[test_case(0, 121)]
    #[test_case(6, 127)]
    #[test_case(7, 1280)]
    #[test_case(127, 1400)]
    #[test_case(128, 102)]
    #[test_case(1000, 102)]
    fn alternative_to_tag_mapping(alternative: u64, tag: u64) {
        let constr: Constr<PlutusData> = Constr::new(alternative, Vec::new());
        assert_eq!(constr.tag, tag);
        assert_eq!(constr.alternative(), alternative);
    }

    #[test]
    fn general_form_accepts_both_wrapper_forms() {
        let definite: PlutusData = from_hex("d8668218969f0102030405ff").unwrap();
        assert_eq!(to_hex(&definite).unwrap(), "d8668218969f0102030405ff");

        let indefinite: PlutusData = from_hex("d8669f18969f0102030405ffff").unwrap();
        assert_eq!(to_hex(&indefinite).unwrap(), "d8669f18969f0102030405ffff");

        for data in [&definite, &indefinite] {
            match data {
                PlutusData::Constr(constr) => assert_eq!(constr.alternative(), 150),
                other => panic!("unexpected variant {other:?}"),
            }
        }
    }

    #[test]
    fn general_form_requires_a_two_element_wrapper() {
        assert!(from_hex::<PlutusData>("d8668318960102").is_err());
    }

    #[test]
    fn bignums_round_trip() {
        let data: PlutusData = from_hex("c249010000000000000000").unwrap();
        match &data {
            PlutusData::BigInt(big) => {
                assert_eq!(
                    num_bigint::BigInt::from(big),
                    num_bigint::BigInt::from(18446744073709551616u128)
                );
            }
            other => panic!("unexpected variant {other:?}"),
        }
        assert_eq!(to_hex(&data).unwrap(), "c249010000000000000000");

        let data: PlutusData = from_hex("c349010000000000000000").unwrap();
        assert_eq!(to_hex(&data).unwrap(), "c349010000000000000000");
    }

    #[test]
    fn long_byte_strings_chunk_at_64_bytes() {
        let data = PlutusData::bytes(vec![0xaa; 100]);

        let encoded = nomos_codec::to_vec(&data).unwrap();
        assert_eq!(encoded[0], 0x5f);
        assert_eq!(*encoded.last().unwrap(), 0xff);

        let decoded: PlutusData = nomos_codec::from_bytes(&encoded).unwrap();
        assert_eq!(decoded, data);
        assert_eq!(nomos_codec::to_vec(&decoded).unwrap(), encoded);
    }

    #[test]
    fn definite_byte_strings_stay_definite() {
        let hex_str = format!("5865{}", "ab".repeat(101));
        let data: PlutusData = from_hex(&hex_str).unwrap();
        assert_eq!(to_hex(&data).unwrap(), hex_str);
    }

    #[test]
    fn map_order_and_form_are_preserved() {
        // keys deliberately out of canonical order
        let hex_str = "a2020104d87980";
        let data: PlutusData = from_hex(hex_str).unwrap();
        assert_eq!(to_hex(&data).unwrap(), hex_str);

        let indef = "bf020104d87980ff";
        let data: PlutusData = from_hex(indef).unwrap();
        assert_eq!(to_hex(&data).unwrap(), indef);
    }

    #[test]
    fn equality_is_structural() {
        let a: PlutusData = from_hex("d8799f0102030405ff").unwrap();
        let b = PlutusData::constr(0, (1..=5).map(PlutusData::int).collect());
        assert_eq!(a, b);
    }

    #[test]
    fn triple_round_trip_is_stable() {
        for hex_str in [
            "d87980",
            "d8799f0102030405ff",
            "d8668218969f0102030405ff",
            "a2020104d87980",
            "c249010000000000000000",
            "9f0102ff",
            "80",
        ] {
            let once: PlutusData = from_hex(hex_str).unwrap();
            let bytes = nomos_codec::to_vec(&once).unwrap();
            let twice: PlutusData = nomos_codec::from_bytes(&bytes).unwrap();
            assert_eq!(once, twice);
            assert_eq!(nomos_codec::to_vec(&twice).unwrap(), bytes);
        }
    }
}
