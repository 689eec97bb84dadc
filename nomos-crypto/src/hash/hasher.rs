use cryptoxide::blake2b::Blake2b;

use crate::hash::Hash;
use nomos_codec::{CborWriter, Encode};

/// Keyless BLAKE2b hasher producing a digest of `BITS` size.
///
/// The two widths the ledger requires are `256` (transaction, datum and
/// metadata hashes) and `224` (key and script hashes).
///
/// ```
/// use nomos_crypto::hash::Hasher;
///
/// let mut hasher = Hasher::<256>::new();
/// hasher.input(b"My transaction");
///
/// let digest = hasher.finalize();
/// assert_eq!(
///     "0d8d00cdd4657ac84d82f0a56067634a7adfdf43da41cb534bcaa45060973d21",
///     hex::encode(digest)
/// );
/// ```
pub struct Hasher<const BITS: usize>(Blake2b);

impl<const BITS: usize> Hasher<BITS> {
    /// update the [`Hasher`] with the given input
    #[inline]
    pub fn input(&mut self, bytes: &[u8]) {
        use cryptoxide::digest::Digest as _;
        self.0.input(bytes);
    }
}

macro_rules! common_hasher {
    ($size:literal) => {
        impl Hasher<$size> {
            #[inline]
            pub fn new() -> Self {
                Self(Blake2b::new($size / 8))
            }

            /// convenient function to directly generate the digest of the
            /// given bytes
            #[inline]
            pub fn hash(bytes: &[u8]) -> Hash<{ $size / 8 }> {
                let mut hasher = Self::new();
                hasher.input(bytes);
                hasher.finalize()
            }

            /// hashes the CBOR encoding of the given value
            pub fn hash_cbor(
                data: &impl Encode,
            ) -> Result<Hash<{ $size / 8 }>, nomos_codec::Error> {
                let mut hasher = Self::new();
                let mut writer = CborWriter::new();
                data.encode(&mut writer)?;
                hasher.input(writer.as_slice());
                Ok(hasher.finalize())
            }

            /// consume the [`Hasher`] and return the computed digest
            pub fn finalize(mut self) -> Hash<{ $size / 8 }> {
                use cryptoxide::digest::Digest as _;
                let mut digest = [0; $size / 8];
                self.0.result(&mut digest);
                Hash::new(digest)
            }
        }

        impl Default for Hasher<$size> {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

common_hasher!(224);
common_hasher!(256);
