use nomos_codec::utils::{KeyValuePairs, MaybeIndefArray};
use nomos_codec::{
    from_bytes, to_vec, CborReader, CborReaderState, CborWriter, Decode, Encode, Error, Tag,
};
use proptest::prelude::*;

/// A recursive model covering every shape the ledger subset uses, so the
/// reader and writer can be exercised against arbitrary nesting.
#[derive(Debug, Clone, PartialEq)]
enum Item {
    Uint(u64),
    Int(i64),
    Bytes(Vec<u8>),
    Text(String),
    Array(MaybeIndefArray<Item>),
    Map(KeyValuePairs<Item, Item>),
    Tagged(u64, Box<Item>),
}

impl Decode for Item {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.peek_state()? {
            CborReaderState::UnsignedInteger => Ok(Item::Uint(d.u64()?)),
            CborReaderState::NegativeInteger => Ok(Item::Int(d.i64()?)),
            CborReaderState::ByteString | CborReaderState::StartIndefiniteByteString => {
                Ok(Item::Bytes(d.bytes()?))
            }
            CborReaderState::TextString | CborReaderState::StartIndefiniteTextString => {
                Ok(Item::Text(d.text()?))
            }
            CborReaderState::StartArray | CborReaderState::StartIndefiniteArray => {
                Ok(Item::Array(MaybeIndefArray::decode(d)?))
            }
            CborReaderState::StartMap | CborReaderState::StartIndefiniteMap => {
                Ok(Item::Map(KeyValuePairs::decode(d)?))
            }
            CborReaderState::Tag => {
                let tag = d.tag()?;
                Ok(Item::Tagged(tag.as_u64(), Box::new(Item::decode(d)?)))
            }
            found => Err(Error::TypeMismatch {
                expected: "test item",
                found,
            }),
        }
    }
}

impl Encode for Item {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match self {
            Item::Uint(x) => {
                e.u64(*x)?;
            }
            Item::Int(x) => {
                e.i64(*x)?;
            }
            Item::Bytes(x) => {
                e.bytes(x)?;
            }
            Item::Text(x) => {
                e.text(x)?;
            }
            Item::Array(x) => x.encode(e)?,
            Item::Map(x) => x.encode(e)?,
            Item::Tagged(tag, inner) => {
                e.tag(Tag::new(*tag))?;
                inner.encode(e)?;
            }
        }

        Ok(())
    }
}

fn item_strategy() -> impl Strategy<Value = Item> {
    let leaf = prop_oneof![
        any::<u64>().prop_map(Item::Uint),
        (i64::MIN..0).prop_map(Item::Int),
        proptest::collection::vec(any::<u8>(), 0..24).prop_map(Item::Bytes),
        "[a-z0-9 ]{0,16}".prop_map(Item::Text),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (proptest::collection::vec(inner.clone(), 0..4), any::<bool>()).prop_map(
                |(items, indef)| {
                    Item::Array(if indef {
                        MaybeIndefArray::Indef(items)
                    } else {
                        MaybeIndefArray::Def(items)
                    })
                }
            ),
            (
                proptest::collection::vec((inner.clone(), inner.clone()), 0..3),
                any::<bool>()
            )
                .prop_map(|(entries, indef)| {
                    Item::Map(if indef {
                        KeyValuePairs::Indef(entries)
                    } else {
                        KeyValuePairs::Def(entries)
                    })
                }),
            (0u64..1000, inner).prop_map(|(tag, inner)| Item::Tagged(tag, Box::new(inner))),
        ]
    })
}

proptest! {
    #[test]
    fn items_round_trip(item in item_strategy()) {
        let bytes = to_vec(&item).unwrap();
        let decoded: Item = from_bytes(&bytes).unwrap();
        prop_assert_eq!(&decoded, &item);

        // a second round trip has to be byte-stable
        prop_assert_eq!(to_vec(&decoded).unwrap(), bytes);
    }

    #[test]
    fn skip_consumes_exactly_one_item(item in item_strategy()) {
        let mut e = CborWriter::new();
        e.array(2).unwrap();
        item.encode(&mut e).unwrap();
        e.u64(170).unwrap();

        let bytes = e.into_bytes();
        let mut d = CborReader::new(&bytes);
        d.array().unwrap();
        d.skip().unwrap();
        prop_assert_eq!(d.u64().unwrap(), 170);
        d.end_array().unwrap();
        prop_assert_eq!(d.peek_state().unwrap(), CborReaderState::Finished);
    }

    #[test]
    fn raw_value_matches_the_encoding(item in item_strategy()) {
        let bytes = to_vec(&item).unwrap();
        let mut d = CborReader::new(&bytes);
        let raw = d.raw_value().unwrap();
        prop_assert_eq!(raw, bytes.as_slice());
        prop_assert_eq!(d.bytes_remaining(), 0);
    }
}
