use crate::CodecError;

/// Sentinel written in place of a length when the framed value is absent.
pub const ABSENT: char = 'n';

/// Append-only sink for the compact framing.
///
/// ## Framing
/// Every length (string length, array size, map size) is written as one
/// format digit `d` followed by `d + 1` decimal digits, so `5` becomes `"05"`
/// and `12345` becomes `"412345"`. An absent value is the single char `'n'`.
/// Lengths count `char`s, not bytes.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: String,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity),
        }
    }

    /// Writes a self-describing length, or the absent sentinel.
    pub fn write_number(&mut self, number: Option<usize>) {
        let Some(number) = number else {
            self.buf.push(ABSENT);
            return;
        };
        let digits = number.to_string();
        // One format digit caps lengths at ten decimal digits.
        debug_assert!(digits.len() <= 10, "length {number} exceeds framing range");
        self.buf.push(char::from(b'0' + (digits.len() - 1) as u8));
        self.buf.push_str(&digits);
    }

    pub fn write_str(&mut self, value: Option<&str>) {
        match value {
            Some(s) => {
                self.write_number(Some(s.chars().count()));
                self.buf.push_str(s);
            }
            None => self.write_number(None),
        }
    }

    /// Writes an optional array of optional strings.
    ///
    /// `None` (array absent) and `Some` of an empty iterator are distinct on
    /// the wire: `"n"` versus `"00"`.
    pub fn write_str_array<'a, I>(&mut self, values: Option<I>)
    where
        I: ExactSizeIterator<Item = Option<&'a str>>,
    {
        let Some(values) = values else {
            self.write_number(None);
            return;
        };
        self.write_number(Some(values.len()));
        for value in values {
            self.write_str(value);
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_string(self) -> String {
        self.buf
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.into_bytes()
    }
}

/// Cursor over compact-framed text. The inverse of [`Writer`].
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    rest: &'a str,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { rest: input }
    }

    /// Wraps raw bytes, rejecting anything that is not UTF-8.
    pub fn from_bytes(input: &'a [u8]) -> Result<Self, CodecError> {
        let text = core::str::from_utf8(input).map_err(|_| CodecError::InvalidUtf8)?;
        Ok(Self::new(text))
    }

    /// Unread input, in bytes.
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.rest.is_empty()
    }

    /// Consumes exactly `count` chars or fails with `Truncated`.
    fn take_chars(&mut self, count: usize) -> Result<&'a str, CodecError> {
        let mut end = 0;
        let mut taken = 0;
        for ch in self.rest.chars() {
            if taken == count {
                break;
            }
            end += ch.len_utf8();
            taken += 1;
        }
        if taken < count {
            return Err(CodecError::Truncated {
                expected: count,
                available: taken,
            });
        }
        let (head, tail) = self.rest.split_at(end);
        self.rest = tail;
        Ok(head)
    }

    pub fn read_number(&mut self) -> Result<Option<usize>, CodecError> {
        let format = self.take_chars(1)?;
        if format.starts_with(ABSENT) {
            return Ok(None);
        }
        let width = format
            .chars()
            .next()
            .and_then(|c| c.to_digit(10))
            .ok_or_else(|| CodecError::InvalidLength(format.to_string()))?
            as usize
            + 1;
        let digits = self.take_chars(width)?;
        digits
            .parse::<usize>()
            .map(Some)
            .map_err(|_| CodecError::InvalidLength(digits.to_string()))
    }

    pub fn read_str(&mut self) -> Result<Option<&'a str>, CodecError> {
        match self.read_number()? {
            Some(len) => self.take_chars(len).map(Some),
            None => Ok(None),
        }
    }

    /// Reads a string that must be present; `what` names the field in the error.
    pub fn read_required_str(&mut self, what: &'static str) -> Result<&'a str, CodecError> {
        self.read_str()?.ok_or(CodecError::UnexpectedNull(what))
    }

    pub fn read_str_array(&mut self) -> Result<Option<Vec<Option<String>>>, CodecError> {
        let Some(size) = self.read_number()? else {
            return Ok(None);
        };
        let mut values = Vec::with_capacity(size.min(self.rest.len()));
        for _ in 0..size {
            values.push(self.read_str()?.map(str::to_owned));
        }
        Ok(Some(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framed(value: Option<&str>) -> String {
        let mut w = Writer::new();
        w.write_str(value);
        w.into_string()
    }

    #[test]
    fn single_digit_lengths_use_zero_format_digit() {
        assert_eq!(framed(Some("")), "00");
        assert_eq!(framed(Some("abc")), "03abc");
        assert_eq!(framed(Some("123456789")), "09123456789");
    }

    #[test]
    fn multi_digit_lengths_are_self_describing() {
        let ten = "x".repeat(10);
        assert_eq!(framed(Some(&ten)), format!("110{ten}"));

        let mut w = Writer::new();
        w.write_number(Some(12345));
        assert_eq!(w.as_str(), "412345");

        let long = "y".repeat(12345);
        let text = framed(Some(&long));
        assert!(text.starts_with("412345y"));
        let mut r = Reader::new(&text);
        assert_eq!(r.read_str().unwrap().map(str::len), Some(12345));
        assert!(r.is_exhausted());
    }

    #[test]
    fn absent_string_is_sentinel() {
        assert_eq!(framed(None), "n");
        let mut r = Reader::new("n");
        assert_eq!(r.read_str().unwrap(), None);
    }

    #[test]
    fn lengths_count_chars_not_bytes() {
        let text = framed(Some("Grüße"));
        assert!(text.starts_with("05"));
        let mut r = Reader::new(&text);
        assert_eq!(r.read_str().unwrap(), Some("Grüße"));
    }

    #[test]
    fn truncated_input_is_a_framing_error() {
        let mut r = Reader::new("05ab");
        assert_eq!(
            r.read_str(),
            Err(CodecError::Truncated {
                expected: 5,
                available: 2
            })
        );

        let mut r = Reader::new("");
        assert!(matches!(r.read_number(), Err(CodecError::Truncated { .. })));

        // Format digit promises three digits, only two follow.
        let mut r = Reader::new("212");
        assert!(matches!(r.read_number(), Err(CodecError::Truncated { .. })));
    }

    #[test]
    fn non_digit_format_is_rejected() {
        let mut r = Reader::new("x3abc");
        assert!(matches!(r.read_str(), Err(CodecError::InvalidLength(_))));
    }

    #[test]
    fn absent_array_differs_from_empty_array() {
        let mut w = Writer::new();
        w.write_str_array::<core::iter::Empty<Option<&str>>>(None);
        w.write_str_array(Some(core::iter::empty()));
        assert_eq!(w.as_str(), "n00");

        let mut r = Reader::new(w.as_str());
        assert_eq!(r.read_str_array().unwrap(), None);
        assert_eq!(r.read_str_array().unwrap(), Some(vec![]));
    }

    #[test]
    fn array_keeps_absent_elements() {
        let values = [None, Some("a"), Some("")];
        let mut w = Writer::new();
        w.write_str_array(Some(values.iter().copied()));
        assert_eq!(w.as_str(), "03n01a00");

        let mut r = Reader::new(w.as_str());
        assert_eq!(
            r.read_str_array().unwrap(),
            Some(vec![None, Some("a".to_string()), Some(String::new())])
        );
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert!(matches!(
            Reader::from_bytes(&[0x30, 0xff]),
            Err(CodecError::InvalidUtf8)
        ));
    }
}
