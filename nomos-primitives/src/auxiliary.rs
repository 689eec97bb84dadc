use nomos_codec::utils::{Bytes, Int, KeyValuePairs, MaybeIndefArray};
use nomos_codec::{CborReader, CborReaderState, CborWriter, Decode, Encode, Error, Tag};

use crate::{expect_array, NativeScript, PlutusScript};

pub type MetadatumLabel = u64;

pub type Metadata = KeyValuePairs<MetadatumLabel, Metadatum>;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Metadatum {
    Int(Int),
    Bytes(Bytes),
    Text(String),
    Array(MaybeIndefArray<Metadatum>),
    Map(KeyValuePairs<Metadatum, Metadatum>),
}

impl Decode for Metadatum {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.peek_state()? {
            CborReaderState::UnsignedInteger | CborReaderState::NegativeInteger => {
                Ok(Self::Int(Int::decode(d)?))
            }
            CborReaderState::ByteString | CborReaderState::StartIndefiniteByteString => {
                Ok(Self::Bytes(Bytes::decode(d)?))
            }
            CborReaderState::TextString | CborReaderState::StartIndefiniteTextString => {
                Ok(Self::Text(d.text()?))
            }
            CborReaderState::StartArray | CborReaderState::StartIndefiniteArray => {
                Ok(Self::Array(MaybeIndefArray::decode(d)?))
            }
            CborReaderState::StartMap | CborReaderState::StartIndefiniteMap => {
                Ok(Self::Map(KeyValuePairs::decode(d)?))
            }
            found => Err(Error::TypeMismatch {
                expected: "metadatum",
                found,
            }),
        }
    }
}

impl Encode for Metadatum {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match self {
            Self::Int(x) => x.encode(e),
            Self::Bytes(x) => x.encode(e),
            Self::Text(x) => {
                e.text(x)?;
                Ok(())
            }
            Self::Array(x) => x.encode(e),
            Self::Map(x) => x.encode(e),
        }
    }
}

/// The tag that marks the post-alonzo auxiliary data layout.
const AUX_DATA_TAG: Tag = Tag::new(259);

#[derive(Debug, PartialEq, Clone, Default)]
pub struct PostAlonzoAuxiliaryData {
    pub metadata: Option<Metadata>,
    pub native_scripts: Option<Vec<NativeScript>>,
    pub plutus_v1_scripts: Option<Vec<PlutusScript<1>>>,
    pub plutus_v2_scripts: Option<Vec<PlutusScript<2>>>,
    pub plutus_v3_scripts: Option<Vec<PlutusScript<3>>>,
}

cbor_map_struct!(PostAlonzoAuxiliaryData {
    0 => metadata,
    1 => native_scripts,
    2 => plutus_v1_scripts,
    3 => plutus_v2_scripts,
    4 => plutus_v3_scripts,
});

/// Auxiliary data in any of the three layouts seen on-chain: the shelley
/// plain metadata map, the shelley-ma `[metadata, scripts]` pair, and the
/// tagged post-alonzo map. The decoder distinguishes them by the leading
/// byte and re-emission keeps the decoded layout.
#[derive(Debug, PartialEq, Clone)]
pub enum AuxiliaryData {
    Shelley(Metadata),
    ShelleyMa {
        transaction_metadata: Metadata,
        auxiliary_scripts: MaybeIndefArray<NativeScript>,
    },
    PostAlonzo(PostAlonzoAuxiliaryData),
}

impl Decode for AuxiliaryData {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        match d.peek_state()? {
            CborReaderState::StartMap | CborReaderState::StartIndefiniteMap => {
                Ok(AuxiliaryData::Shelley(Metadata::decode(d)?))
            }
            CborReaderState::StartArray | CborReaderState::StartIndefiniteArray => {
                expect_array(d, 2)?;
                let transaction_metadata = Metadata::decode(d)?;
                let auxiliary_scripts = MaybeIndefArray::decode(d)?;
                d.end_array()?;

                Ok(AuxiliaryData::ShelleyMa {
                    transaction_metadata,
                    auxiliary_scripts,
                })
            }
            CborReaderState::Tag => {
                let tag = d.tag()?;
                if tag != AUX_DATA_TAG {
                    return Err(Error::message(format!(
                        "unexpected tag {tag} for auxiliary data"
                    )));
                }

                Ok(AuxiliaryData::PostAlonzo(PostAlonzoAuxiliaryData::decode(
                    d,
                )?))
            }
            found => Err(Error::TypeMismatch {
                expected: "auxiliary data",
                found,
            }),
        }
    }
}

impl Encode for AuxiliaryData {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        match self {
            AuxiliaryData::Shelley(metadata) => metadata.encode(e),
            AuxiliaryData::ShelleyMa {
                transaction_metadata,
                auxiliary_scripts,
            } => {
                e.array(2)?
                    .encode(transaction_metadata)?
                    .encode(auxiliary_scripts)?;
                Ok(())
            }
            AuxiliaryData::PostAlonzo(data) => {
                e.tag(AUX_DATA_TAG)?;
                data.encode(e)
            }
        }
    }
}
