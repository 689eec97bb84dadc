//! Streaming CBOR codec for the Cardano ledger subset of RFC 8949.
//!
//! The ledger computes hashes and signatures over literal wire bytes, so the
//! codec is built around two ideas: a reader/writer pair that exposes every
//! encoding choice the ledger makes (definite vs indefinite form, set tags,
//! bignum tags, canonical integer heads), and a set of round-trip friendly
//! helper structs (see [`utils`]) that remember those choices so decoded
//! values re-encode byte-for-byte.

mod error;
mod reader;
mod tag;
mod writer;

/// Round-trip friendly common helper structs
pub mod utils;

pub use error::Error;
pub use reader::{CborReader, CborReaderState};
pub use tag::Tag;
pub use writer::CborWriter;

/// A value that can be parsed from a CBOR stream.
pub trait Decode: Sized {
    fn decode(d: &mut CborReader) -> Result<Self, Error>;
}

/// A value that can be written to a CBOR stream.
pub trait Encode {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error>;
}

/// Decodes a value from the start of `bytes`. Trailing bytes are left to the
/// caller: transaction-level decoders consume exactly one data item.
pub fn from_bytes<T: Decode>(bytes: &[u8]) -> Result<T, Error> {
    let mut d = CborReader::new(bytes);
    T::decode(&mut d)
}

pub fn from_hex<T: Decode>(hex_str: &str) -> Result<T, Error> {
    let bytes =
        hex::decode(hex_str).map_err(|e| Error::message(format!("invalid hex input: {e}")))?;
    from_bytes(&bytes)
}

pub fn to_vec<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>, Error> {
    let mut e = CborWriter::new();
    value.encode(&mut e)?;
    Ok(e.into_bytes())
}

pub fn to_hex<T: Encode + ?Sized>(value: &T) -> Result<String, Error> {
    Ok(hex::encode(to_vec(value)?))
}

macro_rules! uint_codec {
    ($ty:ty) => {
        impl Decode for $ty {
            fn decode(d: &mut CborReader) -> Result<Self, Error> {
                <$ty>::try_from(d.u64()?).map_err(|_| Error::IntegerOverflow)
            }
        }

        impl Encode for $ty {
            fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
                e.u64(*self as u64)?;
                Ok(())
            }
        }
    };
}

uint_codec!(u8);
uint_codec!(u16);
uint_codec!(u32);

impl Decode for u64 {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        d.u64()
    }
}

impl Encode for u64 {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.u64(*self)?;
        Ok(())
    }
}

impl Decode for i64 {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        d.i64()
    }
}

impl Encode for i64 {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.i64(*self)?;
        Ok(())
    }
}

impl Decode for bool {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        d.bool()
    }
}

impl Encode for bool {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.bool(*self)?;
        Ok(())
    }
}

impl Decode for String {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        d.text()
    }
}

impl Encode for String {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.text(self)?;
        Ok(())
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        let mut items = Vec::new();

        match d.array()? {
            Some(len) => {
                for _ in 0..len {
                    items.push(T::decode(d)?);
                }
            }
            None => {
                while d.peek_state()? != CborReaderState::EndArray {
                    items.push(T::decode(d)?);
                }
            }
        }

        d.end_array()?;
        Ok(items)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.array(self.len() as u64)?;
        for item in self {
            item.encode(e)?;
        }
        Ok(())
    }
}
