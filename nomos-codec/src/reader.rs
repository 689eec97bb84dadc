use num_bigint::{BigInt, Sign};

use crate::{Error, Tag};

/// What the next call on a [`CborReader`] will find.
///
/// This is a superset of the raw major types: indefinite-length starts,
/// container ends and the end of the input are distinct states so that
/// decoders can branch without consuming anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CborReaderState {
    UnsignedInteger,
    NegativeInteger,
    ByteString,
    StartIndefiniteByteString,
    TextString,
    StartIndefiniteTextString,
    StartArray,
    StartIndefiniteArray,
    EndArray,
    StartMap,
    StartIndefiniteMap,
    EndMap,
    Tag,
    Boolean,
    Null,
    Undefined,
    Double,
    SimpleValue,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContainerKind {
    Array,
    Map,
}

/// One open container. `remaining` counts item slots for definite lengths
/// (map entries count twice); `None` marks an indefinite container that ends
/// at the break byte.
#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: ContainerKind,
    remaining: Option<u64>,
}

/// Streaming reader over a CBOR byte slice.
///
/// The reader keeps a cursor and a stack of open containers; every `read`
/// operation consumes exactly one data item (or one container boundary) and
/// validates it against the declared structure. Cloning the reader clones
/// cursor and stack, which is the supported way to look ahead.
#[derive(Debug, Clone)]
pub struct CborReader<'b> {
    input: &'b [u8],
    pos: usize,
    stack: Vec<Frame>,
}

impl<'b> CborReader<'b> {
    pub fn new(input: &'b [u8]) -> Self {
        Self {
            input,
            pos: 0,
            stack: Vec::new(),
        }
    }

    /// The full input slice this reader was created over.
    pub fn input(&self) -> &'b [u8] {
        self.input
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn bytes_remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// The unread tail of the input.
    pub fn remainder(&self) -> &'b [u8] {
        &self.input[self.pos..]
    }

    pub fn peek_state(&self) -> Result<CborReaderState, Error> {
        if let Some(frame) = self.stack.last() {
            if frame.remaining == Some(0) {
                return Ok(match frame.kind {
                    ContainerKind::Array => CborReaderState::EndArray,
                    ContainerKind::Map => CborReaderState::EndMap,
                });
            }
        }

        let initial = match self.input.get(self.pos) {
            Some(b) => *b,
            None if self.stack.is_empty() => return Ok(CborReaderState::Finished),
            None => return Err(Error::TruncatedInput),
        };

        if initial == 0xff {
            return match self.stack.last() {
                Some(Frame {
                    kind,
                    remaining: None,
                }) => Ok(match kind {
                    ContainerKind::Array => CborReaderState::EndArray,
                    ContainerKind::Map => CborReaderState::EndMap,
                }),
                _ => Err(Error::UnexpectedBreak),
            };
        }

        let info = initial & 0x1f;

        Ok(match initial >> 5 {
            0 => CborReaderState::UnsignedInteger,
            1 => CborReaderState::NegativeInteger,
            2 if info == 31 => CborReaderState::StartIndefiniteByteString,
            2 => CborReaderState::ByteString,
            3 if info == 31 => CborReaderState::StartIndefiniteTextString,
            3 => CborReaderState::TextString,
            4 if info == 31 => CborReaderState::StartIndefiniteArray,
            4 => CborReaderState::StartArray,
            5 if info == 31 => CborReaderState::StartIndefiniteMap,
            5 => CborReaderState::StartMap,
            6 => CborReaderState::Tag,
            _ => match info {
                20 | 21 => CborReaderState::Boolean,
                22 => CborReaderState::Null,
                23 => CborReaderState::Undefined,
                25 | 26 | 27 => CborReaderState::Double,
                _ => CborReaderState::SimpleValue,
            },
        })
    }

    fn byte_at(&self, at: usize) -> Result<u8, Error> {
        self.input.get(at).copied().ok_or(Error::TruncatedInput)
    }

    fn uint_at(&self, at: usize, width: usize) -> Result<u64, Error> {
        if at + width > self.input.len() {
            return Err(Error::TruncatedInput);
        }

        let mut value = 0u64;
        for byte in &self.input[at..at + width] {
            value = value << 8 | *byte as u64;
        }

        Ok(value)
    }

    /// Consumes an initial byte plus its argument. Returns the major type
    /// and the argument value (`None` for indefinite lengths).
    fn pull_head(&mut self) -> Result<(u8, Option<u64>), Error> {
        let initial = self.byte_at(self.pos)?;
        let major = initial >> 5;

        let (value, consumed) = match initial & 0x1f {
            info @ 0..=23 => (Some(info as u64), 1),
            24 => (Some(self.byte_at(self.pos + 1)? as u64), 2),
            25 => (Some(self.uint_at(self.pos + 1, 2)?), 3),
            26 => (Some(self.uint_at(self.pos + 1, 4)?), 5),
            27 => (Some(self.uint_at(self.pos + 1, 8)?), 9),
            31 => (None, 1),
            info => {
                return Err(Error::message(format!(
                    "reserved additional info {info} in cbor head"
                )))
            }
        };

        self.pos += consumed;
        Ok((major, value))
    }

    /// Marks one item slot of the enclosing container as consumed.
    fn complete_item(&mut self) {
        if let Some(frame) = self.stack.last_mut() {
            if let Some(remaining) = frame.remaining.as_mut() {
                *remaining -= 1;
            }
        }
    }

    fn take(&mut self, len: u64) -> Result<&'b [u8], Error> {
        let len = usize::try_from(len).map_err(|_| Error::TruncatedInput)?;
        if self.bytes_remaining() < len {
            return Err(Error::TruncatedInput);
        }

        let slice = &self.input[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn mismatch(expected: &'static str, found: CborReaderState) -> Error {
        Error::TypeMismatch { expected, found }
    }

    pub fn u64(&mut self) -> Result<u64, Error> {
        match self.peek_state()? {
            CborReaderState::UnsignedInteger => {
                let (_, value) = self.pull_head()?;
                let value = value.ok_or(Error::UnexpectedBreak)?;
                self.complete_item();
                Ok(value)
            }
            found => Err(Self::mismatch("unsigned integer", found)),
        }
    }

    pub fn i64(&mut self) -> Result<i64, Error> {
        match self.peek_state()? {
            CborReaderState::UnsignedInteger => {
                let value = self.u64()?;
                i64::try_from(value).map_err(|_| Error::IntegerOverflow)
            }
            CborReaderState::NegativeInteger => {
                let (_, value) = self.pull_head()?;
                let value = value.ok_or(Error::UnexpectedBreak)?;
                self.complete_item();
                if value > i64::MAX as u64 {
                    return Err(Error::IntegerOverflow);
                }
                Ok(-1 - value as i64)
            }
            found => Err(Self::mismatch("integer", found)),
        }
    }

    /// Reads an integer of arbitrary precision: either a native int or a
    /// tag 2/3 bignum (RFC 8949 §3.4.3).
    pub fn bigint(&mut self) -> Result<BigInt, Error> {
        match self.peek_state()? {
            CborReaderState::UnsignedInteger => Ok(BigInt::from(self.u64()?)),
            CborReaderState::NegativeInteger => {
                let (_, value) = self.pull_head()?;
                let value = value.ok_or(Error::UnexpectedBreak)?;
                self.complete_item();
                Ok(-BigInt::from(value) - 1)
            }
            CborReaderState::Tag => {
                let tag = self.tag()?;
                let magnitude = BigInt::from_bytes_be(Sign::Plus, &self.bytes()?);
                match tag {
                    Tag::POS_BIGNUM => Ok(magnitude),
                    Tag::NEG_BIGNUM => Ok(-magnitude - 1),
                    other => Err(Error::message(format!("invalid tag {other} for bignum"))),
                }
            }
            found => Err(Self::mismatch("integer or bignum", found)),
        }
    }

    pub fn bool(&mut self) -> Result<bool, Error> {
        match self.peek_state()? {
            CborReaderState::Boolean => {
                let value = self.byte_at(self.pos)? == 0xf5;
                self.pos += 1;
                self.complete_item();
                Ok(value)
            }
            found => Err(Self::mismatch("boolean", found)),
        }
    }

    pub fn null(&mut self) -> Result<(), Error> {
        match self.peek_state()? {
            CborReaderState::Null => {
                self.pos += 1;
                self.complete_item();
                Ok(())
            }
            found => Err(Self::mismatch("null", found)),
        }
    }

    pub fn undefined(&mut self) -> Result<(), Error> {
        match self.peek_state()? {
            CborReaderState::Undefined => {
                self.pos += 1;
                self.complete_item();
                Ok(())
            }
            found => Err(Self::mismatch("undefined", found)),
        }
    }

    /// Reads a simple value (major type 7 without float semantics).
    pub fn simple(&mut self) -> Result<u8, Error> {
        match self.peek_state()? {
            CborReaderState::SimpleValue
            | CborReaderState::Boolean
            | CborReaderState::Null
            | CborReaderState::Undefined => {
                let (_, value) = self.pull_head()?;
                let value = value.ok_or(Error::UnexpectedBreak)?;
                self.complete_item();
                u8::try_from(value).map_err(|_| Error::IntegerOverflow)
            }
            found => Err(Self::mismatch("simple value", found)),
        }
    }

    /// Reads a float of any width, widened to a double.
    pub fn f64(&mut self) -> Result<f64, Error> {
        match self.peek_state()? {
            CborReaderState::Double => {
                let info = self.byte_at(self.pos)? & 0x1f;
                let (_, value) = self.pull_head()?;
                let value = value.ok_or(Error::UnexpectedBreak)?;
                self.complete_item();
                Ok(match info {
                    25 => half_to_double(value as u16),
                    26 => f32::from_bits(value as u32) as f64,
                    _ => f64::from_bits(value),
                })
            }
            found => Err(Self::mismatch("float", found)),
        }
    }

    /// Reads a byte string. Indefinite-length strings are returned as the
    /// concatenation of their chunks; the chunk boundaries are lost unless
    /// the caller captured the raw bytes separately.
    pub fn bytes(&mut self) -> Result<Vec<u8>, Error> {
        match self.peek_state()? {
            CborReaderState::ByteString => {
                let (_, len) = self.pull_head()?;
                let len = len.ok_or(Error::UnexpectedBreak)?;
                let slice = self.take(len)?;
                self.complete_item();
                Ok(slice.to_vec())
            }
            CborReaderState::StartIndefiniteByteString => {
                self.pull_head()?;
                let mut full = Vec::new();

                loop {
                    let initial = self.byte_at(self.pos)?;
                    if initial == 0xff {
                        self.pos += 1;
                        break;
                    }
                    if initial >> 5 != 2 || initial & 0x1f == 31 {
                        return Err(Error::message(
                            "invalid chunk inside indefinite-length byte string",
                        ));
                    }
                    let (_, len) = self.pull_head()?;
                    let len = len.ok_or(Error::UnexpectedBreak)?;
                    full.extend_from_slice(self.take(len)?);
                }

                self.complete_item();
                Ok(full)
            }
            found => Err(Self::mismatch("byte string", found)),
        }
    }

    /// Reads a text string, concatenating indefinite-length chunks.
    pub fn text(&mut self) -> Result<String, Error> {
        let state = self.peek_state()?;
        let bytes = match state {
            CborReaderState::TextString => {
                let (_, len) = self.pull_head()?;
                let len = len.ok_or(Error::UnexpectedBreak)?;
                let slice = self.take(len)?;
                self.complete_item();
                slice.to_vec()
            }
            CborReaderState::StartIndefiniteTextString => {
                self.pull_head()?;
                let mut full = Vec::new();

                loop {
                    let initial = self.byte_at(self.pos)?;
                    if initial == 0xff {
                        self.pos += 1;
                        break;
                    }
                    if initial >> 5 != 3 || initial & 0x1f == 31 {
                        return Err(Error::message(
                            "invalid chunk inside indefinite-length text string",
                        ));
                    }
                    let (_, len) = self.pull_head()?;
                    let len = len.ok_or(Error::UnexpectedBreak)?;
                    full.extend_from_slice(self.take(len)?);
                }

                self.complete_item();
                full
            }
            found => return Err(Self::mismatch("text string", found)),
        };

        String::from_utf8(bytes).map_err(|_| Error::message("text string is not valid utf-8"))
    }

    /// Opens an array and returns its declared length (`None` for
    /// indefinite). Must be balanced with [`CborReader::end_array`].
    pub fn array(&mut self) -> Result<Option<u64>, Error> {
        match self.peek_state()? {
            CborReaderState::StartArray | CborReaderState::StartIndefiniteArray => {
                let (_, len) = self.pull_head()?;
                self.complete_item();
                self.stack.push(Frame {
                    kind: ContainerKind::Array,
                    remaining: len,
                });
                Ok(len)
            }
            found => Err(Self::mismatch("array", found)),
        }
    }

    /// Opens a map and returns its declared entry count (`None` for
    /// indefinite). Must be balanced with [`CborReader::end_map`].
    pub fn map(&mut self) -> Result<Option<u64>, Error> {
        match self.peek_state()? {
            CborReaderState::StartMap | CborReaderState::StartIndefiniteMap => {
                let (_, len) = self.pull_head()?;
                let slots = match len {
                    Some(entries) => {
                        Some(entries.checked_mul(2).ok_or(Error::IntegerOverflow)?)
                    }
                    None => None,
                };
                self.complete_item();
                self.stack.push(Frame {
                    kind: ContainerKind::Map,
                    remaining: slots,
                });
                Ok(len)
            }
            found => Err(Self::mismatch("map", found)),
        }
    }

    /// Closes the innermost array: consumes the break byte of an indefinite
    /// array, or checks that a definite array was fully read.
    pub fn end_array(&mut self) -> Result<(), Error> {
        match self.stack.last() {
            Some(Frame {
                kind: ContainerKind::Array,
                remaining,
            }) => match remaining {
                Some(0) => {
                    self.stack.pop();
                    Ok(())
                }
                Some(_) => Err(Error::IndefiniteLengthMismatch),
                None => {
                    if self.byte_at(self.pos)? != 0xff {
                        return Err(Error::IndefiniteLengthMismatch);
                    }
                    self.pos += 1;
                    self.stack.pop();
                    Ok(())
                }
            },
            _ => Err(Error::message("reader is not inside an array")),
        }
    }

    /// Closes the innermost map; see [`CborReader::end_array`].
    pub fn end_map(&mut self) -> Result<(), Error> {
        match self.stack.last() {
            Some(Frame {
                kind: ContainerKind::Map,
                remaining,
            }) => match remaining {
                Some(0) => {
                    self.stack.pop();
                    Ok(())
                }
                Some(_) => Err(Error::IndefiniteLengthMismatch),
                None => {
                    if self.byte_at(self.pos)? != 0xff {
                        return Err(Error::IndefiniteLengthMismatch);
                    }
                    self.pos += 1;
                    self.stack.pop();
                    Ok(())
                }
            },
            _ => Err(Error::message("reader is not inside a map")),
        }
    }

    /// Consumes a tag. Tags prefix the following data item and do not count
    /// as an item of the enclosing container on their own.
    pub fn tag(&mut self) -> Result<Tag, Error> {
        match self.peek_state()? {
            CborReaderState::Tag => {
                let (_, value) = self.pull_head()?;
                let value = value.ok_or(Error::UnexpectedBreak)?;
                Ok(Tag::new(value))
            }
            found => Err(Self::mismatch("tag", found)),
        }
    }

    /// Reads the next tag without advancing the cursor.
    pub fn peek_tag(&self) -> Result<Tag, Error> {
        match self.peek_state()? {
            CborReaderState::Tag => {
                let mut probe = self.clone();
                probe.tag()
            }
            found => Err(Self::mismatch("tag", found)),
        }
    }

    /// Skips the next data item whatever its structure, including any
    /// prefix tags and nested indefinite containers.
    pub fn skip(&mut self) -> Result<(), Error> {
        let base = self.stack.len();

        loop {
            match self.peek_state()? {
                CborReaderState::Tag => {
                    self.tag()?;
                    continue;
                }
                CborReaderState::StartArray | CborReaderState::StartIndefiniteArray => {
                    self.array()?;
                }
                CborReaderState::StartMap | CborReaderState::StartIndefiniteMap => {
                    self.map()?;
                }
                CborReaderState::EndArray if self.stack.len() > base => self.end_array()?,
                CborReaderState::EndMap if self.stack.len() > base => self.end_map()?,
                CborReaderState::ByteString | CborReaderState::StartIndefiniteByteString => {
                    self.bytes()?;
                }
                CborReaderState::TextString | CborReaderState::StartIndefiniteTextString => {
                    self.text()?;
                }
                CborReaderState::UnsignedInteger
                | CborReaderState::NegativeInteger
                | CborReaderState::Boolean
                | CborReaderState::Null
                | CborReaderState::Undefined
                | CborReaderState::Double
                | CborReaderState::SimpleValue => {
                    self.pull_head()?;
                    self.complete_item();
                }
                found => return Err(Self::mismatch("data item", found)),
            }

            if self.stack.len() == base {
                return Ok(());
            }
        }
    }

    /// Returns the exact encoding of the next data item, including leading
    /// tags and any trailing break byte, and advances past it.
    ///
    /// This is the primitive the original-bytes cache is built on.
    pub fn raw_value(&mut self) -> Result<&'b [u8], Error> {
        let start = self.pos;
        self.skip()?;
        Ok(&self.input[start..self.pos])
    }
}

/// Half-precision to double conversion per RFC 8949 appendix D.
fn half_to_double(half: u16) -> f64 {
    let exp = (half >> 10) & 0x1f;
    let mant = (half & 0x3ff) as f64;

    let value = match exp {
        0 => mant * 2f64.powi(-24),
        31 if mant == 0.0 => f64::INFINITY,
        31 => f64::NAN,
        _ => (mant + 1024.0) * 2f64.powi(exp as i32 - 25),
    };

    if half & 0x8000 != 0 {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(hex_str: &str) -> Vec<u8> {
        hex::decode(hex_str).unwrap()
    }

    #[test]
    fn reads_unsigned_integers_of_every_width() {
        for (hex_str, expected) in [
            ("00", 0),
            ("17", 23),
            ("1818", 24),
            ("18ff", 255),
            ("190100", 256),
            ("1a000f4240", 1_000_000),
            ("1bffffffffffffffff", u64::MAX),
        ] {
            let bytes = input(hex_str);
            let mut d = CborReader::new(&bytes);
            assert_eq!(d.u64().unwrap(), expected);
            assert_eq!(d.peek_state().unwrap(), CborReaderState::Finished);
        }
    }

    #[test]
    fn reads_negative_integers() {
        let bytes = input("3863");
        let mut d = CborReader::new(&bytes);
        assert_eq!(d.i64().unwrap(), -100);
    }

    #[test]
    fn reads_bignums() {
        let bytes = input("c249010000000000000000");
        let mut d = CborReader::new(&bytes);
        let expected: BigInt = BigInt::from(18446744073709551616u128);
        assert_eq!(d.bigint().unwrap(), expected);

        let bytes = input("c349010000000000000000");
        let mut d = CborReader::new(&bytes);
        assert_eq!(d.bigint().unwrap(), -expected.clone() - 1);
    }

    #[test]
    fn reads_definite_and_indefinite_arrays() {
        let bytes = input("83010203");
        let mut d = CborReader::new(&bytes);
        assert_eq!(d.array().unwrap(), Some(3));
        for expected in 1..=3 {
            assert_eq!(d.u64().unwrap(), expected);
        }
        d.end_array().unwrap();

        let bytes = input("9f010203ff");
        let mut d = CborReader::new(&bytes);
        assert_eq!(d.array().unwrap(), None);
        while d.peek_state().unwrap() != CborReaderState::EndArray {
            d.u64().unwrap();
        }
        d.end_array().unwrap();
        assert_eq!(d.peek_state().unwrap(), CborReaderState::Finished);
    }

    #[test]
    fn end_array_rejects_unread_items() {
        let bytes = input("83010203");
        let mut d = CborReader::new(&bytes);
        d.array().unwrap();
        d.u64().unwrap();
        assert_eq!(d.end_array(), Err(Error::IndefiniteLengthMismatch));
    }

    #[test]
    fn rejects_reads_past_a_definite_container() {
        let bytes = input("81010203");
        let mut d = CborReader::new(&bytes);
        d.array().unwrap();
        d.u64().unwrap();
        assert!(matches!(d.u64(), Err(Error::TypeMismatch { .. })));
    }

    #[test]
    fn concatenates_indefinite_byte_string_chunks() {
        let bytes = input("5f42010243030405ff");
        let mut d = CborReader::new(&bytes);
        assert_eq!(
            d.peek_state().unwrap(),
            CborReaderState::StartIndefiniteByteString
        );
        assert_eq!(d.bytes().unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn skips_nested_structures() {
        let bytes = input("82d87a9f0102a1616b9f0304ffff05");
        let mut d = CborReader::new(&bytes);
        d.array().unwrap();
        d.skip().unwrap();
        assert_eq!(d.u64().unwrap(), 5);
        d.end_array().unwrap();
    }

    #[test]
    fn raw_value_includes_tags_and_breaks() {
        let bytes = input("d8799f0102030405ff00");
        let mut d = CborReader::new(&bytes);
        let raw = d.raw_value().unwrap();
        assert_eq!(hex::encode(raw), "d8799f0102030405ff");
        assert_eq!(d.u64().unwrap(), 0);
    }

    #[test]
    fn peek_tag_does_not_advance() {
        let bytes = input("d9010280");
        let mut d = CborReader::new(&bytes);
        assert_eq!(d.peek_tag().unwrap(), Tag::SET);
        assert_eq!(d.peek_tag().unwrap(), Tag::SET);
        assert_eq!(d.tag().unwrap(), Tag::SET);
        assert_eq!(d.array().unwrap(), Some(0));
        d.end_array().unwrap();
    }

    #[test]
    fn truncated_input_is_reported() {
        let bytes = input("8301");
        let mut d = CborReader::new(&bytes);
        d.array().unwrap();
        d.u64().unwrap();
        assert_eq!(d.u64(), Err(Error::TruncatedInput));
    }

    #[test]
    fn stray_break_is_rejected() {
        let bytes = [0xffu8];
        let mut d = CborReader::new(&bytes);
        assert_eq!(d.peek_state(), Err(Error::UnexpectedBreak));
    }

    #[test]
    fn reads_doubles() {
        let bytes = input("fb3ff199999999999a");
        let mut d = CborReader::new(&bytes);
        assert_eq!(d.f64().unwrap(), 1.1);

        let bytes = input("f97e00");
        let mut d = CborReader::new(&bytes);
        assert!(d.f64().unwrap().is_nan());
    }

    #[test]
    fn reads_maps_with_slot_accounting() {
        let bytes = input("a201020304");
        let mut d = CborReader::new(&bytes);
        assert_eq!(d.map().unwrap(), Some(2));
        assert_eq!(d.u64().unwrap(), 1);
        assert_eq!(d.u64().unwrap(), 2);
        assert_eq!(d.u64().unwrap(), 3);
        assert_eq!(d.u64().unwrap(), 4);
        d.end_map().unwrap();
    }
}
