//! Cookie string scanning.
//!
//! A small parser: pairs are separated by `;`, names and values
//! by the first `=`. It reads both `Cookie` header strings (`a=1; b=2`) and
//! `Set-Cookie` values (`csrf_token=abc; Path=/; HttpOnly`). Anything that
//! does not look like `name=value` is skipped.

/// Iterate over the `name=value` pairs of a cookie string.
///
/// Bare attributes such as `HttpOnly` and pairs with an empty name are
/// skipped. Values keep any embedded `=`.
pub fn pairs(cookie_str: &str) -> impl Iterator<Item = (&str, &str)> {
    cookie_str.split(';').filter_map(|segment| {
        let (name, value) = segment.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name, value.trim()))
    })
}

/// Find the first non-empty value for `name`.
///
/// Names match exactly (cookie names are case-sensitive).
pub fn find_cookie<'a>(cookie_str: &'a str, name: &str) -> Option<&'a str> {
    pairs(cookie_str)
        .find(|(n, v)| *n == name && !v.is_empty())
        .map(|(_, v)| v)
}

/// Scan a sequence of `Set-Cookie` values and return the first token for
/// `name`.
pub fn token_from_set_cookie<'a, I>(values: I, name: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    values.into_iter().find_map(|v| find_cookie(v, name))
}

/// The parts of a `Set-Cookie` value that decide script visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCookie<'a> {
    /// Cookie name.
    pub name: &'a str,
    /// Raw value, not percent-decoded.
    pub value: &'a str,
    /// `Domain` attribute with any leading dot removed.
    pub domain: Option<&'a str>,
    /// `Path` attribute, when it is an absolute path.
    pub path: Option<&'a str>,
    /// Whether `HttpOnly` is set.
    pub http_only: bool,
}

/// Split a `Set-Cookie` value into its name, value and scoping attributes.
///
/// Attribute names are case-insensitive; the last occurrence wins.
pub fn parse_set_cookie(set_cookie: &str) -> Option<SetCookie<'_>> {
    let mut segments = set_cookie.split(';');
    let (name, value) = segments.next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    let mut parsed = SetCookie {
        name,
        value: value.trim(),
        domain: None,
        path: None,
        http_only: false,
    };
    for attr in segments {
        let (key, val) = match attr.split_once('=') {
            Some((k, v)) => (k.trim(), v.trim()),
            None => (attr.trim(), ""),
        };
        if key.eq_ignore_ascii_case("httponly") {
            parsed.http_only = true;
        } else if key.eq_ignore_ascii_case("domain") {
            let domain = val.trim_start_matches('.');
            parsed.domain = (!domain.is_empty()).then_some(domain);
        } else if key.eq_ignore_ascii_case("path") {
            parsed.path = val.starts_with('/').then_some(val);
        }
    }
    Some(parsed)
}
