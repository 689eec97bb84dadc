/// Implements the codec for a struct carried as a CBOR map with fixed
/// numeric keys where every field is optional.
///
/// The decoder accepts keys in any order, rejects duplicate and unknown
/// keys, and accepts both definite and indefinite maps. The encoder emits a
/// definite map in ascending key order and omits absent fields, so the
/// fields must be listed in ascending key order.
macro_rules! cbor_map_struct {
    ($name:ident { $( $key:literal => $field:ident ),* $(,)? }) => {
        impl nomos_codec::Decode for $name {
            fn decode(
                d: &mut nomos_codec::CborReader,
            ) -> Result<Self, nomos_codec::Error> {
                let mut value = $name::default();
                let mut seen = 0u64;
                let len = d.map()?;

                let mut remaining = len;
                loop {
                    match remaining {
                        Some(0) => break,
                        Some(ref mut n) => *n -= 1,
                        None => {
                            if d.peek_state()? == nomos_codec::CborReaderState::EndMap {
                                break;
                            }
                        }
                    }

                    let key = d.u64()?;
                    if key < 64 && seen & (1 << key) != 0 {
                        return Err(nomos_codec::Error::message(format!(
                            "duplicate key {key} in {} map",
                            stringify!($name)
                        )));
                    }

                    match key {
                        $( $key => value.$field = Some(nomos_codec::Decode::decode(d)?), )*
                        _ => {
                            return Err(nomos_codec::Error::message(format!(
                                "unknown key {key} in {} map",
                                stringify!($name)
                            )))
                        }
                    }

                    if key < 64 {
                        seen |= 1 << key;
                    }
                }

                d.end_map()?;
                Ok(value)
            }
        }

        impl nomos_codec::Encode for $name {
            fn encode(
                &self,
                e: &mut nomos_codec::CborWriter,
            ) -> Result<(), nomos_codec::Error> {
                let mut entries = 0u64;
                $( if self.$field.is_some() { entries += 1; } )*
                e.map(entries)?;

                $(
                    if let Some(field) = &self.$field {
                        e.u64($key)?.encode(field)?;
                    }
                )*

                Ok(())
            }
        }
    };
}
