//! Cookie value encoding, the session cookie set, and outbound cookie directives.

use std::collections::BTreeMap;

use cookie::{Cookie, Expiration};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Bytes percent-encoded in cookie values: everything except the URI-component
/// unreserved set and the delimiters that are legal inside a cookie value.
/// Non-ASCII is always encoded.
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b':')
    .remove(b'<')
    .remove(b'>')
    .remove(b'=')
    .remove(b'/')
    .remove(b'?')
    .remove(b'@')
    .remove(b'[')
    .remove(b']')
    .remove(b'^')
    .remove(b'`')
    .remove(b'{')
    .remove(b'}')
    .remove(b'|');

/// Encode a cookie value so it can be placed in a `Cookie`/`Set-Cookie` header.
///
/// `;`, `,`, `"`, `\`, `%`, whitespace and non-ASCII are percent-encoded as
/// UTF-8 with upper-case hex digits.
pub fn encode_cookie(value: &str) -> String {
    utf8_percent_encode(value, COOKIE_VALUE).to_string()
}

/// Inverse of [`encode_cookie`]. Values that are not valid percent-encoded
/// UTF-8 are returned unchanged.
pub fn decode_cookie(value: &str) -> String {
    percent_decode_str(value)
        .decode_utf8()
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

/// Parse a request `Cookie` header into decoded name/value pairs.
///
/// The first occurrence of a name wins; browsers send the most specific path first.
pub fn parse_cookie_header(header: &str) -> BTreeMap<String, String> {
    let mut cookies = BTreeMap::new();
    for cookie in Cookie::split_parse(header).filter_map(Result::ok) {
        cookies
            .entry(cookie.name().to_string())
            .or_insert_with(|| decode_cookie(cookie.value()));
    }
    cookies
}

/// Mapping from cookie name to *encoded* value exchanged with the backend API.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionCookieSet {
    cookies: BTreeMap<String, String>,
}

impl SessionCookieSet {
    /// Build the set from decoded request cookies, encoding every value.
    pub fn from_request(cookies: &BTreeMap<String, String>) -> Self {
        Self {
            cookies: cookies
                .iter()
                .map(|(name, value)| (name.clone(), encode_cookie(value)))
                .collect(),
        }
    }

    /// Insert or replace a cookie with a decoded value.
    pub fn insert(&mut self, name: impl Into<String>, value: &str) {
        self.cookies.insert(name.into(), encode_cookie(value));
    }

    /// The encoded value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// The decoded value for `name`.
    pub fn get_decoded(&self, name: &str) -> Option<String> {
        self.get(name).map(decode_cookie)
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as a `Cookie` request header value, or `None` when empty.
    pub fn to_header_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// A `Set-Cookie` directive for the outbound response.
///
/// Holds the decoded value; encoding is applied when the header is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub expires: Option<Expiration>,
}

impl ResponseCookie {
    /// A session cookie scoped to the whole site.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            expires: None,
        }
    }

    /// Parse a backend-issued `Set-Cookie` header value.
    ///
    /// The value is decoded so that it is encoded exactly once on re-emission.
    pub fn parse_set_cookie(header: &str) -> Option<Self> {
        let parsed = Cookie::parse(header.to_string()).ok()?;
        Some(Self {
            name: parsed.name().to_string(),
            value: decode_cookie(parsed.value()),
            path: parsed.path().unwrap_or("/").to_string(),
            expires: parsed.expires(),
        })
    }

    /// Render the `Set-Cookie` header value with the encoded cookie value.
    pub fn to_header_value(&self) -> String {
        let mut cookie = Cookie::new(self.name.clone(), encode_cookie(&self.value));
        cookie.set_path(self.path.clone());
        if let Some(expires) = self.expires {
            cookie.set_expires(expires);
        }
        cookie.to_string()
    }
}
