//! Distinguished name syntax (RFC 4514)
//!
//! Only syntax is checked here: attribute types are not resolved against a
//! schema and values are not normalized beyond escape decoding.

use crate::error::{DecodeError, DecodeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Characters that may follow a backslash as-is
const ESCAPABLE: &[char] = &[' ', '"', '#', '+', ',', ';', '<', '=', '>', '\\'];

/// Attribute type and value assertion, e.g. `cn=John`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ava {
    attr_type: String,
    value: String,
}

impl Ava {
    /// Attribute type as written (descriptor or numeric OID)
    pub fn attr_type(&self) -> &str {
        &self.attr_type
    }

    /// Attribute value with escapes decoded
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Relative distinguished name: one or more AVAs joined by `+`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rdn {
    avas: Vec<Ava>,
}

impl Rdn {
    /// Get the AVAs of this RDN
    pub fn avas(&self) -> &[Ava] {
        &self.avas
    }

    /// Check if the RDN holds more than one AVA
    pub fn is_multi_valued(&self) -> bool {
        self.avas.len() > 1
    }
}

/// Distinguished name
///
/// Keeps the user provided form next to the parsed RDNs so that encoding
/// writes back exactly the bytes that were decoded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dn {
    upname: String,
    rdns: Vec<Rdn>,
}

impl Dn {
    /// The empty (root) DN
    pub fn root() -> Self {
        Self {
            upname: String::new(),
            rdns: Vec::new(),
        }
    }

    /// Parse a DN from its string representation
    ///
    /// # Returns
    ///
    /// Returns `Ok(Dn)` if the string is a syntactically valid DN,
    /// `Err(DecodeError::InvalidDnSyntax)` otherwise
    pub fn parse(s: &str) -> DecodeResult<Self> {
        if s.trim_matches(' ').is_empty() {
            return Ok(Self {
                upname: s.to_string(),
                rdns: Vec::new(),
            });
        }

        let mut rdns = Vec::new();
        for rdn in split_unescaped(s, &[',', ';'])? {
            let mut avas = Vec::new();
            for ava in split_unescaped(rdn, &['+'])? {
                avas.push(parse_ava(ava, s)?);
            }
            rdns.push(Rdn { avas });
        }

        Ok(Self {
            upname: s.to_string(),
            rdns,
        })
    }

    /// Check whether a string is a syntactically valid DN
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// Get the DN as provided by the user
    pub fn upname(&self) -> &str {
        &self.upname
    }

    /// Get the RDNs, leftmost (most specific) first
    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// Number of RDNs
    pub fn size(&self) -> usize {
        self.rdns.len()
    }

    /// Check if this is the root DN
    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Get the DN as UTF-8 bytes, the form carried on the wire
    pub fn as_bytes(&self) -> &[u8] {
        self.upname.as_bytes()
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.upname)
    }
}

impl FromStr for Dn {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn invalid(dn: &str, reason: impl fmt::Display) -> DecodeError {
    DecodeError::InvalidDnSyntax(format!("'{}': {}", dn, reason))
}

/// Split on any of `separators`, ignoring escaped and quoted occurrences
fn split_unescaped<'a>(s: &'a str, separators: &[char]) -> DecodeResult<Vec<&'a str>> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    let mut quoted = false;

    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => quoted = !quoted,
            c if !quoted && separators.contains(&c) => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }

    if escaped {
        return Err(invalid(s, "dangling escape"));
    }
    if quoted {
        return Err(invalid(s, "unterminated quoted value"));
    }
    parts.push(&s[start..]);
    Ok(parts)
}

fn parse_ava(ava: &str, dn: &str) -> DecodeResult<Ava> {
    let (attr_type, raw_value) = ava
        .split_once('=')
        .ok_or_else(|| invalid(dn, format!("missing '=' in '{}'", ava.trim())))?;

    let attr_type = attr_type.trim();
    if !is_valid_attribute_type(attr_type) {
        return Err(invalid(dn, format!("bad attribute type '{}'", attr_type)));
    }

    let raw_value = trim_value(raw_value);
    let value = decode_value(raw_value).map_err(|reason| invalid(dn, reason))?;
    Ok(Ava {
        attr_type: attr_type.to_string(),
        value,
    })
}

/// Strip the insignificant spaces around an attribute value
///
/// RFC 4514 only treats the ASCII space (U+0020) as insignificant around
/// `=`, `,` and `+`. Any other whitespace is part of the value and goes
/// through escape decoding like every other character.
///
/// A value may end with a significant space only when it is escaped
/// (`cn=a\ `). The backslash before the last space escapes it when the run
/// of backslashes ending the value is odd: in `cn=a\\ ` the two backslashes
/// encode one literal `\` and the space after them is dropped.
fn trim_value(raw: &str) -> &str {
    let raw = raw.trim_start_matches(' ');
    let trimmed = raw.trim_end_matches(' ');
    if trimmed.len() == raw.len() {
        return raw;
    }

    let backslashes = trimmed.bytes().rev().take_while(|&b| b == b'\\').count();
    if backslashes % 2 == 1 {
        &raw[..trimmed.len() + ' '.len_utf8()]
    } else {
        trimmed
    }
}

/// `descr` or `numericoid` (optionally prefixed by the legacy `oid.`)
fn is_valid_attribute_type(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            if let Some(oid) = s.strip_prefix("oid.").or_else(|| s.strip_prefix("OID.")) {
                return is_numeric_oid(oid);
            }
            chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
        }
        Some(c) if c.is_ascii_digit() => is_numeric_oid(s),
        _ => false,
    }
}

fn is_numeric_oid(s: &str) -> bool {
    let mut arcs = 0;
    for arc in s.split('.') {
        let valid = match arc.as_bytes() {
            [] => false,
            [b'0'] => true,
            [b'0', ..] => false,
            digits => digits.iter().all(u8::is_ascii_digit),
        };
        if !valid {
            return false;
        }
        arcs += 1;
    }
    arcs >= 2
}

fn decode_value(raw: &str) -> Result<String, String> {
    if let Some(hex) = raw.strip_prefix('#') {
        return decode_hex_value(hex);
    }

    let inner = match raw.strip_prefix('"') {
        Some(rest) => rest
            .strip_suffix('"')
            .ok_or_else(|| "unterminated quoted value".to_string())?,
        None => raw,
    };
    let quoted = inner.len() != raw.len();

    let mut bytes = Vec::with_capacity(inner.len());
    let mut chars = inner.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                let (_, next) = chars
                    .next()
                    .ok_or_else(|| "dangling escape".to_string())?;
                if ESCAPABLE.contains(&next) {
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(next.encode_utf8(&mut buf).as_bytes());
                } else {
                    let hi = next.to_digit(16);
                    let lo = chars.next().and_then(|(_, c)| c.to_digit(16));
                    match (hi, lo) {
                        (Some(hi), Some(lo)) => bytes.push((hi * 16 + lo) as u8),
                        _ => return Err(format!("bad escape sequence at offset {}", i)),
                    }
                }
            }
            '"' | '<' | '>' if !quoted => {
                return Err(format!("unescaped '{}' at offset {}", c, i));
            }
            c => {
                let mut buf = [0u8; 4];
                bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }

    String::from_utf8(bytes).map_err(|_| "escaped value is not valid UTF-8".to_string())
}

fn decode_hex_value(hex: &str) -> Result<String, String> {
    if hex.is_empty() || hex.len() % 2 != 0 {
        return Err("hexstring must hold an even, nonzero number of digits".to_string());
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("bad hexstring '#{}'", hex));
    }
    // BER encoded values are kept in their hex form
    Ok(format!("#{}", hex))
}
