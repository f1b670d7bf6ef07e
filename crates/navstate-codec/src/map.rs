use crate::compact::{Reader, Writer};
use crate::CodecError;

/// Framing strategy for one map value type.
///
/// The map framing itself is fixed (size, then `key, value` pairs); only the
/// value encoding varies, so it is supplied as a pair of plain functions.
pub struct ElementCodec<T> {
    write: fn(&mut Writer, &T),
    read: fn(&mut Reader<'_>) -> Result<T, CodecError>,
}

impl<T> ElementCodec<T> {
    pub const fn new(
        write: fn(&mut Writer, &T),
        read: fn(&mut Reader<'_>) -> Result<T, CodecError>,
    ) -> Self {
        Self { write, read }
    }

    pub fn write_value(&self, out: &mut Writer, value: &T) {
        (self.write)(out, value)
    }

    pub fn read_value(&self, input: &mut Reader<'_>) -> Result<T, CodecError> {
        (self.read)(input)
    }

    /// Writes an optional map. `None` is framed as absent, distinct from an
    /// empty map.
    pub fn write_map<'a, K, I>(&self, out: &mut Writer, entries: Option<I>)
    where
        T: 'a,
        K: AsRef<str> + 'a,
        I: ExactSizeIterator<Item = (K, &'a T)>,
    {
        let Some(entries) = entries else {
            out.write_number(None);
            return;
        };
        out.write_number(Some(entries.len()));
        for (key, value) in entries {
            out.write_str(Some(key.as_ref()));
            (self.write)(out, value);
        }
    }

    /// Reads an optional map into any collection of `(key, value)` pairs.
    ///
    /// Keys must be present; an absent key is `UnexpectedNull`.
    pub fn read_map<C>(&self, input: &mut Reader<'_>) -> Result<Option<C>, CodecError>
    where
        C: FromIterator<(String, T)>,
    {
        let Some(size) = input.read_number()? else {
            return Ok(None);
        };
        (0..size)
            .map(|_| {
                let key = input.read_required_str("map key")?.to_owned();
                let value = (self.read)(input)?;
                Ok((key, value))
            })
            .collect::<Result<C, CodecError>>()
            .map(Some)
    }
}

impl<T> Clone for ElementCodec<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ElementCodec<T> {}

impl<T> core::fmt::Debug for ElementCodec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ElementCodec")
            .field("value", &core::any::type_name::<T>())
            .finish()
    }
}
