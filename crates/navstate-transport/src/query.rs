use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Bytes left unescaped in a query component: alphanumerics and `-_.*`.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'*');

pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, QUERY_COMPONENT).to_string()
}

/// Decodes a query or path component. `+` is a space; invalid UTF-8 is
/// replaced rather than rejected.
pub fn decode_component(encoded: &str) -> String {
    let spaced = encoded.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Splits `a=1&b=2` into decoded pairs. A bare `a` is `("a", "")`.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (decode_component(name), decode_component(value)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

/// Appends `name=value` pairs to a URL, opening the query with `?` once.
pub struct QueryWriter<'a> {
    url: &'a mut String,
    has_query: bool,
}

impl<'a> QueryWriter<'a> {
    pub fn new(url: &'a mut String) -> Self {
        let has_query = url.contains('?');
        Self { url, has_query }
    }

    fn separator(&mut self) {
        self.url.push(if self.has_query { '&' } else { '?' });
        self.has_query = true;
    }

    /// Appends a pair whose value is already URL-safe.
    pub fn push_encoded(&mut self, name: &str, value: &str) {
        self.separator();
        self.url.push_str(&encode_component(name));
        self.url.push('=');
        self.url.push_str(value);
    }

    pub fn push(&mut self, name: &str, value: &str) {
        self.separator();
        self.url.push_str(&encode_component(name));
        self.url.push('=');
        self.url.push_str(&encode_component(value));
    }
}
