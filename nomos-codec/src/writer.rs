use num_bigint::{BigInt, Sign};

use crate::{Error, Tag};

/// Streaming CBOR writer over an owned buffer.
///
/// Integer heads always use the shortest encoding that fits (RFC 8949
/// §4.2.1). Definite-length containers are the default; the `begin_*`
/// variants open indefinite-length containers that must be closed with
/// [`CborWriter::end`], which is how decoded indefinite form is reproduced.
#[derive(Debug, Default, Clone)]
pub struct CborWriter {
    buf: Vec<u8>,
    open_breaks: usize,
}

impl CborWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn head(&mut self, major: u8, value: u64) {
        let major = major << 5;

        if value <= 23 {
            self.buf.push(major | value as u8);
        } else if value <= 0xff {
            self.buf.push(major | 24);
            self.buf.push(value as u8);
        } else if value <= 0xffff {
            self.buf.push(major | 25);
            self.buf.extend_from_slice(&(value as u16).to_be_bytes());
        } else if value <= 0xffff_ffff {
            self.buf.push(major | 26);
            self.buf.extend_from_slice(&(value as u32).to_be_bytes());
        } else {
            self.buf.push(major | 27);
            self.buf.extend_from_slice(&value.to_be_bytes());
        }
    }

    pub fn u64(&mut self, value: u64) -> Result<&mut Self, Error> {
        self.head(0, value);
        Ok(self)
    }

    pub fn i64(&mut self, value: i64) -> Result<&mut Self, Error> {
        if value >= 0 {
            self.head(0, value as u64);
        } else {
            self.head(1, !(value as u64));
        }
        Ok(self)
    }

    /// Writes an arbitrary-precision integer: a native int when the value
    /// fits 64 bits, a tag 2/3 bignum otherwise.
    pub fn bigint(&mut self, value: &BigInt) -> Result<&mut Self, Error> {
        if value.sign() != Sign::Minus {
            match u64::try_from(value) {
                Ok(v) => {
                    self.head(0, v);
                }
                Err(_) => {
                    self.tag(Tag::POS_BIGNUM)?;
                    self.bytes(&value.to_bytes_be().1)?;
                }
            }
        } else {
            let magnitude = -value - 1u8;
            match u64::try_from(&magnitude) {
                Ok(v) => {
                    self.head(1, v);
                }
                Err(_) => {
                    self.tag(Tag::NEG_BIGNUM)?;
                    self.bytes(&magnitude.to_bytes_be().1)?;
                }
            }
        }
        Ok(self)
    }

    pub fn bool(&mut self, value: bool) -> Result<&mut Self, Error> {
        self.buf.push(if value { 0xf5 } else { 0xf4 });
        Ok(self)
    }

    pub fn null(&mut self) -> Result<&mut Self, Error> {
        self.buf.push(0xf6);
        Ok(self)
    }

    pub fn undefined(&mut self) -> Result<&mut Self, Error> {
        self.buf.push(0xf7);
        Ok(self)
    }

    pub fn simple(&mut self, value: u8) -> Result<&mut Self, Error> {
        if value <= 23 {
            self.head(7, value as u64);
        } else {
            self.buf.push(0xf8);
            self.buf.push(value);
        }
        Ok(self)
    }

    /// Writes an IEEE-754 double (major type 7, additional info 27).
    pub fn f64(&mut self, value: f64) -> Result<&mut Self, Error> {
        self.buf.push(0xfb);
        self.buf.extend_from_slice(&value.to_bits().to_be_bytes());
        Ok(self)
    }

    pub fn bytes(&mut self, value: &[u8]) -> Result<&mut Self, Error> {
        self.head(2, value.len() as u64);
        self.buf.extend_from_slice(value);
        Ok(self)
    }

    /// Opens an indefinite-length byte string; chunks are written with
    /// [`CborWriter::bytes`] and the string is closed with
    /// [`CborWriter::end`].
    pub fn begin_bytes(&mut self) -> Result<&mut Self, Error> {
        self.buf.push(0x5f);
        self.open_breaks += 1;
        Ok(self)
    }

    pub fn text(&mut self, value: &str) -> Result<&mut Self, Error> {
        self.head(3, value.len() as u64);
        self.buf.extend_from_slice(value.as_bytes());
        Ok(self)
    }

    pub fn array(&mut self, len: u64) -> Result<&mut Self, Error> {
        self.head(4, len);
        Ok(self)
    }

    pub fn begin_array(&mut self) -> Result<&mut Self, Error> {
        self.buf.push(0x9f);
        self.open_breaks += 1;
        Ok(self)
    }

    pub fn map(&mut self, len: u64) -> Result<&mut Self, Error> {
        self.head(5, len);
        Ok(self)
    }

    pub fn begin_map(&mut self) -> Result<&mut Self, Error> {
        self.buf.push(0xbf);
        self.open_breaks += 1;
        Ok(self)
    }

    /// Closes the innermost indefinite-length container.
    pub fn end(&mut self) -> Result<&mut Self, Error> {
        if self.open_breaks == 0 {
            return Err(Error::message(
                "no indefinite-length container is open for this writer",
            ));
        }

        self.buf.push(0xff);
        self.open_breaks -= 1;
        Ok(self)
    }

    pub fn tag(&mut self, tag: Tag) -> Result<&mut Self, Error> {
        self.head(6, tag.as_u64());
        Ok(self)
    }

    /// Splices pre-encoded CBOR verbatim. This is the emission primitive of
    /// the original-bytes cache: the caller guarantees the bytes are one
    /// well-formed data item.
    pub fn raw_cbor(&mut self, cbor: &[u8]) -> Result<&mut Self, Error> {
        self.buf.extend_from_slice(cbor);
        Ok(self)
    }

    pub fn encode<T: crate::Encode + ?Sized>(&mut self, value: &T) -> Result<&mut Self, Error> {
        value.encode(self)?;
        Ok(self)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn hex(&self) -> String {
        hex::encode(&self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_shortest_integer_heads() {
        for (value, expected) in [
            (0u64, "00"),
            (23, "17"),
            (24, "1818"),
            (255, "18ff"),
            (256, "190100"),
            (65536, "1a00010000"),
            (4294967296, "1b0000000100000000"),
        ] {
            let mut e = CborWriter::new();
            e.u64(value).unwrap();
            assert_eq!(e.hex(), expected);
        }
    }

    #[test]
    fn writes_negative_integers() {
        let mut e = CborWriter::new();
        e.i64(-100).unwrap();
        assert_eq!(e.hex(), "3863");

        let mut e = CborWriter::new();
        e.i64(i64::MIN).unwrap();
        assert_eq!(e.hex(), "3b7fffffffffffffff");
    }

    #[test]
    fn writes_bignums_only_past_native_range() {
        let mut e = CborWriter::new();
        e.bigint(&BigInt::from(u64::MAX)).unwrap();
        assert_eq!(e.hex(), "1bffffffffffffffff");

        let mut e = CborWriter::new();
        e.bigint(&(BigInt::from(u64::MAX) + 1)).unwrap();
        assert_eq!(e.hex(), "c249010000000000000000");

        let mut e = CborWriter::new();
        e.bigint(&(-BigInt::from(u64::MAX) - 2)).unwrap();
        assert_eq!(e.hex(), "c349010000000000000000");
    }

    #[test]
    fn writes_indefinite_containers() {
        let mut e = CborWriter::new();
        e.begin_array().unwrap();
        e.u64(1).unwrap();
        e.u64(2).unwrap();
        e.end().unwrap();
        assert_eq!(e.hex(), "9f0102ff");
    }

    #[test]
    fn end_without_open_container_fails() {
        let mut e = CborWriter::new();
        assert!(e.end().is_err());
    }

    #[test]
    fn splices_raw_cbor() {
        let raw = hex::decode("d8799f0102ff").unwrap();
        let mut e = CborWriter::new();
        e.array(2).unwrap();
        e.raw_cbor(&raw).unwrap();
        e.u64(0).unwrap();
        assert_eq!(e.hex(), "82d8799f0102ff00");
    }

    #[test]
    fn writes_doubles() {
        let mut e = CborWriter::new();
        e.f64(1.1).unwrap();
        assert_eq!(e.hex(), "fb3ff199999999999a");
    }
}
