//! Token quantities and their symbols.
//!
//! Amounts are fixed-point integers (`i64`) interpreted with the symbol's
//! precision, so `Asset { amount: 10000, symbol: 4,SYS }` reads `1.0000 SYS`.

use crate::error::ParseError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest magnitude an asset amount may hold.
pub const MAX_AMOUNT: i64 = (1i64 << 62) - 1;

/// A token symbol: precision in the low byte, up to 7 uppercase letters above it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u64);

impl Symbol {
    /// Build a symbol from a precision and an uppercase code.
    ///
    /// # Panics
    /// Panics if the code is empty, longer than 7 bytes or not `A-Z`.
    pub const fn from_static(precision: u8, code: &str) -> Self {
        let bytes = code.as_bytes();
        assert!(!bytes.is_empty() && bytes.len() <= 7, "symbol code must be 1-7 characters");
        let mut raw = precision as u64;
        let mut i = 0;
        while i < bytes.len() {
            assert!(bytes[i] >= b'A' && bytes[i] <= b'Z', "symbol code must be A-Z");
            raw |= (bytes[i] as u64) << (8 * (i + 1));
            i += 1;
        }
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    pub const fn precision(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// The symbol code, e.g. `"SYS"`.
    pub fn code(&self) -> String {
        let mut code = String::with_capacity(7);
        let mut tmp = self.0 >> 8;
        while tmp != 0 {
            code.push((tmp & 0xff) as u8 as char);
            tmp >>= 8;
        }
        code
    }

    /// `10^precision`, the raw amount of one whole unit.
    pub fn unit(&self) -> i64 {
        10i64.pow(self.precision() as u32)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.precision(), self.code())
    }
}

impl FromStr for Symbol {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (precision, code) = s
            .split_once(',')
            .ok_or_else(|| ParseError::InvalidSymbol(format!("{s:?} is not <precision>,<CODE>")))?;
        let precision: u8 = precision
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidSymbol(format!("bad precision in {s:?}")))?;
        if precision > 18 {
            return Err(ParseError::InvalidSymbol(format!("precision {precision} exceeds 18")));
        }
        let code = code.trim();
        if code.is_empty() || code.len() > 7 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ParseError::InvalidSymbol(format!("bad symbol code {code:?}")));
        }
        Ok(Symbol::from_static(precision, code))
    }
}

/// A signed token quantity.
///
/// Serialized as `"1.0000 SYS"` in human-readable formats and as
/// `(amount, symbol)` otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Asset {
    pub amount: i64,
    pub symbol: Symbol,
}

impl Asset {
    pub const fn new(amount: i64, symbol: Symbol) -> Self {
        Self { amount, symbol }
    }

    pub const fn zero(symbol: Symbol) -> Self {
        Self { amount: 0, symbol }
    }

    pub fn is_valid(&self) -> bool {
        (-MAX_AMOUNT..=MAX_AMOUNT).contains(&self.amount)
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Sum of two quantities; `None` on symbol mismatch or overflow.
    pub fn checked_add(self, other: Asset) -> Option<Asset> {
        if self.symbol != other.symbol {
            return None;
        }
        let amount = self.amount.checked_add(other.amount)?;
        let sum = Asset::new(amount, self.symbol);
        sum.is_valid().then_some(sum)
    }

    /// Difference of two quantities; `None` on symbol mismatch or overflow.
    pub fn checked_sub(self, other: Asset) -> Option<Asset> {
        if self.symbol != other.symbol {
            return None;
        }
        let amount = self.amount.checked_sub(other.amount)?;
        let diff = Asset::new(amount, self.symbol);
        diff.is_valid().then_some(diff)
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = self.symbol.precision() as u32;
        let sign = if self.amount < 0 { "-" } else { "" };
        let magnitude = self.amount.unsigned_abs();
        if precision == 0 {
            return write!(f, "{sign}{magnitude} {}", self.symbol.code());
        }
        let unit = 10u64.pow(precision);
        write!(
            f,
            "{sign}{}.{:0width$} {}",
            magnitude / unit,
            magnitude % unit,
            self.symbol.code(),
            width = precision as usize
        )
    }
}

impl FromStr for Asset {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (number, code) = s
            .trim()
            .split_once(' ')
            .ok_or_else(|| ParseError::InvalidAsset(format!("{s:?} is not <amount> <CODE>")))?;
        let (negative, digits) = match number.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, number),
        };
        let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
        if whole.is_empty() || !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidAsset(format!("bad amount {number:?}")));
        }
        let precision = fraction.len() as u8;
        let symbol: Symbol = format!("{precision},{}", code.trim()).parse()?;
        let magnitude: i64 = format!("{whole}{fraction}")
            .parse()
            .map_err(|_| ParseError::InvalidAsset(format!("amount {number:?} out of range")))?;
        let asset = Asset::new(if negative { -magnitude } else { magnitude }, symbol);
        if !asset.is_valid() {
            return Err(ParseError::InvalidAsset(format!("amount {number:?} out of range")));
        }
        Ok(asset)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            serializer.serialize_u64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            u64::deserialize(deserializer).map(Symbol)
        }
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            (self.amount, self.symbol).serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            let (amount, symbol) = <(i64, Symbol)>::deserialize(deserializer)?;
            Ok(Asset::new(amount, symbol))
        }
    }
}
