//! 64-bit account names.
//!
//! A name packs up to 12 characters from `.12345abcdefghijklmnopqrstuvwxyz`
//! at 5 bits each, most significant first, plus an optional 13th character
//! in the low 4 bits (restricted to `.12345abcdefghij`).

use crate::error::ParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// Maximum printable length of a name.
pub const MAX_NAME_LEN: usize = 13;

/// An opaque account identifier.
///
/// Only equality and ordering are meaningful; there is no arithmetic.
///
/// Human-readable formats (JSON, TOML) carry the string form; binary
/// formats carry the raw `u64`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountName(u64);

const fn char_to_symbol(c: u8) -> u64 {
    if c >= b'a' && c <= b'z' {
        (c - b'a') as u64 + 6
    } else if c >= b'1' && c <= b'5' {
        (c - b'1') as u64 + 1
    } else {
        0
    }
}

impl AccountName {
    /// The empty name.
    pub const EMPTY: Self = Self(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Pack a compile-time literal. Characters outside the alphabet become dots.
    ///
    /// # Panics
    /// Panics (at compile time when used in a const) if the literal is longer than 13 bytes.
    pub const fn from_static(s: &str) -> Self {
        let bytes = s.as_bytes();
        assert!(bytes.len() <= MAX_NAME_LEN, "account name longer than 13 characters");
        let mut value: u64 = 0;
        let mut i = 0;
        while i < bytes.len() && i < 12 {
            value |= (char_to_symbol(bytes[i]) & 0x1f) << (64 - 5 * (i + 1));
            i += 1;
        }
        if bytes.len() == MAX_NAME_LEN {
            value |= char_to_symbol(bytes[12]) & 0x0f;
        }
        Self(value)
    }

    /// True when the 13th character slot is used.
    pub fn has_thirteenth_char(&self) -> bool {
        self.0 & 0x0f != 0
    }

    /// True when the name is exactly 12 characters long (and not 13).
    pub fn is_twelve_chars(&self) -> bool {
        !self.has_thirteenth_char() && self.0 & 0x1f0 != 0
    }

    /// The top-level suffix: the characters after the last non-leading dot.
    ///
    /// `"a.b.goc"` yields `"goc"`; a name without dots is its own suffix.
    pub fn suffix(&self) -> AccountName {
        let n = self.0;
        let mut remaining_bits_after_last_dot: u32 = 0;
        let mut tmp: u32 = 0;
        let mut remaining_bits: i32 = 59;
        while remaining_bits >= 4 {
            let c = (n >> remaining_bits) & 0x1f;
            if c == 0 {
                tmp = remaining_bits as u32;
            } else {
                remaining_bits_after_last_dot = tmp;
            }
            remaining_bits -= 5;
        }
        let thirteenth = n & 0x0f;
        if thirteenth != 0 {
            remaining_bits_after_last_dot = tmp;
        }
        if remaining_bits_after_last_dot == 0 {
            return *self;
        }
        let mask = (1u64 << remaining_bits_after_last_dot) - 16;
        let shift = 64 - remaining_bits_after_last_dot;
        AccountName(((n & mask) << shift) + (thirteenth << (shift - 1)))
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = [b'.'; MAX_NAME_LEN];
        let mut tmp = self.0;
        for i in 0..MAX_NAME_LEN {
            let mask = if i == 0 { 0x0f } else { 0x1f };
            out[12 - i] = CHARMAP[(tmp & mask) as usize];
            tmp >>= if i == 0 { 4 } else { 5 };
        }
        let end = out.iter().rposition(|&c| c != b'.').map_or(0, |p| p + 1);
        // CHARMAP is pure ASCII.
        f.write_str(std::str::from_utf8(&out[..end]).map_err(|_| fmt::Error)?)
    }
}

impl FromStr for AccountName {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() > MAX_NAME_LEN {
            return Err(ParseError::InvalidName(format!("{s:?} is longer than 13 characters")));
        }
        for (i, c) in s.bytes().enumerate() {
            let valid = match i {
                12 => c == b'.' || (b'1'..=b'5').contains(&c) || (b'a'..=b'j').contains(&c),
                _ => c == b'.' || (b'1'..=b'5').contains(&c) || c.is_ascii_lowercase(),
            };
            if !valid {
                return Err(ParseError::InvalidName(format!(
                    "{s:?} contains invalid character {:?} at position {i}",
                    c as char
                )));
            }
        }
        let name = AccountName::from_static(s);
        if name.to_string() != s {
            return Err(ParseError::InvalidName(format!("{s:?} is not in normal form")));
        }
        Ok(name)
    }
}

impl Serialize for AccountName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_u64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for AccountName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            u64::deserialize(deserializer).map(AccountName)
        }
    }
}

impl TryFrom<&str> for AccountName {
    type Error = ParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}
