use std::{fmt, ops::Deref, str::FromStr};

use nomos_codec::{CborReader, CborWriter, Decode, Encode, Error};

/// A cryptographic digest of `BYTES` width.
///
/// The ledger uses 32 bytes for transaction, datum and block hashes and
/// 28 bytes for key and script hashes. Decoding checks the width, because a
/// hash of the wrong size is never valid in the context that declared it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash<const BYTES: usize>([u8; BYTES]);

impl<const BYTES: usize> Hash<BYTES> {
    #[inline]
    pub const fn new(bytes: [u8; BYTES]) -> Self {
        Self(bytes)
    }
}

impl<const BYTES: usize> From<[u8; BYTES]> for Hash<BYTES> {
    #[inline]
    fn from(bytes: [u8; BYTES]) -> Self {
        Self::new(bytes)
    }
}

impl<const BYTES: usize> TryFrom<&[u8]> for Hash<BYTES> {
    type Error = Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; BYTES] = value.try_into().map_err(|_| Error::InvalidHashSize {
            expected: BYTES,
            found: value.len(),
        })?;

        Ok(Self::new(bytes))
    }
}

impl<const BYTES: usize> AsRef<[u8]> for Hash<BYTES> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const BYTES: usize> Deref for Hash<BYTES> {
    type Target = [u8; BYTES];

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<const BYTES: usize> fmt::Debug for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(&format!("Hash<{size}>", size = BYTES))
            .field(&hex::encode(self))
            .finish()
    }
}

impl<const BYTES: usize> fmt::Display for Hash<BYTES> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self))
    }
}

impl<const BYTES: usize> FromStr for Hash<BYTES> {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; BYTES];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self::new(bytes))
    }
}

impl<const BYTES: usize> Decode for Hash<BYTES> {
    fn decode(d: &mut CborReader) -> Result<Self, Error> {
        Self::try_from(d.bytes()?.as_slice())
    }
}

impl<const BYTES: usize> Encode for Hash<BYTES> {
    fn encode(&self, e: &mut CborWriter) -> Result<(), Error> {
        e.bytes(&self.0)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_ledger_widths() {
        let _digest: Hash<28> = "276fd18711931e2c0e21430192dbeac0e458093cd9d1fcd7210f64b3"
            .parse()
            .unwrap();

        let _digest: Hash<32> = "0d8d00cdd4657ac84d82f0a56067634a7adfdf43da41cb534bcaa45060973d21"
            .parse()
            .unwrap();
    }

    #[test]
    fn rejects_the_wrong_width() {
        assert!("276fd187".parse::<Hash<28>>().is_err());

        let bytes = [0u8; 28];
        assert_eq!(
            Hash::<32>::try_from(&bytes[..]),
            Err(Error::InvalidHashSize {
                expected: 32,
                found: 28
            })
        );
    }

    #[test]
    fn cbor_round_trip() {
        let digest: Hash<28> = "276fd18711931e2c0e21430192dbeac0e458093cd9d1fcd7210f64b3"
            .parse()
            .unwrap();

        let bytes = nomos_codec::to_vec(&digest).unwrap();
        assert_eq!(
            hex::encode(&bytes),
            "581c276fd18711931e2c0e21430192dbeac0e458093cd9d1fcd7210f64b3"
        );
        assert_eq!(nomos_codec::from_bytes::<Hash<28>>(&bytes).unwrap(), digest);

        // a 28-byte string is not a 32-byte hash
        assert!(nomos_codec::from_bytes::<Hash<32>>(&bytes).is_err());
    }

    #[test]
    fn ordering_is_bytewise() {
        let a = Hash::<4>::new([0, 1, 2, 3]);
        let b = Hash::<4>::new([0, 1, 2, 4]);
        assert!(a < b);
    }
}
