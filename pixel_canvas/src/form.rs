//! Decoder for `application/x-www-form-urlencoded` bodies and query strings.

use log::*;

/// Body bytes kept for decoding. A full 16x16 grid is about 2.3 KiB and the
/// panel shows fewer than 100 glyphs, so nothing visible is lost past this.
pub const MAX_BODY_LEN: usize = 4096;

/// Reads a request body through `read` until it returns 0. At most `limit`
/// bytes are kept; the rest is read and dropped so the request is still
/// served.
pub fn read_body<F>(mut read: F, limit: usize) -> anyhow::Result<Vec<u8>>
where
    F: FnMut(&mut [u8]) -> anyhow::Result<usize>,
{
    let mut body = Vec::new();
    let mut chunk = [0u8; 512];
    let mut dropped = 0usize;
    loop {
        let n = read(&mut chunk)?;
        if n == 0 {
            break;
        }
        let keep = n.min(limit.saturating_sub(body.len()));
        body.extend_from_slice(&chunk[..keep]);
        dropped += n - keep;
    }
    if dropped > 0 {
        warn!("Request body cut to {} bytes, {} dropped", body.len(), dropped);
    }
    Ok(body)
}

/// Submitted form fields in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<(String, String)>,
}

impl Form {
    /// Parses `a=1&b=two+words`. A key without `=` is present with an empty
    /// value, empty pairs are skipped.
    pub fn parse(encoded: &str) -> Self {
        let fields = encoded
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_component(key), decode_component(value))
            })
            .collect();
        Self { fields }
    }

    /// Parses a raw request body. Invalid UTF-8 is replaced, not rejected.
    pub fn from_bytes(body: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(body))
    }

    /// Value of the first field named `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether the field was submitted at all. Checkboxes are only sent when
    /// checked, whatever their value.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(key, _)| key == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Appends the fields of `other`; existing fields keep precedence.
    pub fn merge(&mut self, other: Form) {
        self.fields.extend(other.fields);
    }
}

fn decode_component(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match (
                bytes.get(i + 1).and_then(hex_value),
                bytes.get(i + 2).and_then(hex_value),
            ) {
                (Some(hi), Some(lo)) => {
                    out.push((hi << 4) | lo);
                    i += 3;
                }
                // Malformed escape, keep it as typed.
                _ => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: &u8) -> Option<u8> {
    char::from(*b).to_digit(16).map(|d| d as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fields() {
        let form = Form::parse("text=Hello+World&btn-send=Write");
        assert_eq!(form.len(), 2);
        assert_eq!(form.get("text"), Some("Hello World"));
        assert_eq!(form.get("btn-send"), Some("Write"));
        assert_eq!(form.get("missing"), None);
    }

    #[test]
    fn test_percent_decoding() {
        let form = Form::parse("text=a%20b%2Dc%21&na%6De=%C3%A4");
        assert_eq!(form.get("text"), Some("a b-c!"));
        assert_eq!(form.get("name"), Some("ä"));
    }

    #[test]
    fn test_malformed_escapes_are_literal() {
        let form = Form::parse("text=100%&b=%zz&c=%4");
        assert_eq!(form.get("text"), Some("100%"));
        assert_eq!(form.get("b"), Some("%zz"));
        assert_eq!(form.get("c"), Some("%4"));
    }

    #[test]
    fn test_checkbox_presence() {
        let form = Form::parse("0-0=on&5-5&&15-15=&textColor=2");
        assert!(form.contains("0-0"));
        assert!(form.contains("5-5"));
        assert!(form.contains("15-15"));
        assert!(!form.contains("1-1"));
        assert_eq!(form.get("5-5"), Some(""));
        assert_eq!(form.len(), 4);
    }

    #[test]
    fn test_first_value_wins_and_merge() {
        let mut form = Form::parse("text=first");
        form.merge(Form::parse("text=second&other=1"));
        assert_eq!(form.get("text"), Some("first"));
        assert_eq!(form.get("other"), Some("1"));
    }

    /// Hands out `data` in pieces of at most `step` bytes, like a socket.
    fn chunked(data: &[u8], step: usize) -> impl FnMut(&mut [u8]) -> anyhow::Result<usize> + '_ {
        let mut pos = 0;
        move |buf: &mut [u8]| {
            let n = step.min(buf.len()).min(data.len() - pos);
            buf[..n].copy_from_slice(&data[pos..pos + n]);
            pos += n;
            Ok(n)
        }
    }

    #[test]
    fn test_read_body_keeps_small_bodies() {
        let data = b"0-0=on&15-15=on&textColor=2";
        let body = read_body(chunked(data, 7), MAX_BODY_LEN).unwrap();
        assert_eq!(body, data);
    }

    #[test]
    fn test_read_body_drains_oversized_bodies() {
        let mut data = b"text=".to_vec();
        data.extend(std::iter::repeat(b'A').take(5000));

        let mut consumed = 0;
        let mut source = chunked(&data, 300);
        let body = read_body(
            |buf: &mut [u8]| {
                let n = source(buf)?;
                consumed += n;
                Ok(n)
            },
            MAX_BODY_LEN,
        )
        .unwrap();

        assert_eq!(consumed, data.len());
        assert_eq!(body.len(), MAX_BODY_LEN);
        assert_eq!(body, &data[..MAX_BODY_LEN]);
        let text = Form::from_bytes(&body).get("text").unwrap().len();
        assert_eq!(text, MAX_BODY_LEN - "text=".len());
    }

    #[test]
    fn test_read_body_passes_errors() {
        let result = read_body(|_: &mut [u8]| Err(anyhow::anyhow!("connection reset")), MAX_BODY_LEN);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_and_lossy() {
        assert!(Form::parse("").is_empty());
        let form = Form::from_bytes(b"text=\xff");
        assert_eq!(form.get("text"), Some("\u{fffd}"));
    }
}
