//! Entity schemas and the versioned state envelope.
//!
//! A schema lists an entity's fields in serialization order. Schemas only
//! ever grow by appending fields; [`Schema::extends`] checks that rule.

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;

const STATE_MAGIC: [u8; 4] = *b"GOCS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: &'static str,
}

impl Field {
    pub const fn new(name: &'static str, ty: &'static str) -> Self {
        Self { name, ty }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Schema {
    pub entity: &'static str,
    pub table: &'static str,
    pub version: u32,
    pub fields: &'static [Field],
}

impl Schema {
    /// True if `self` is `older` with zero or more fields appended.
    pub fn extends(&self, older: &Schema) -> bool {
        self.entity == older.entity
            && self.version >= older.version
            && self.fields.len() >= older.fields.len()
            && self.fields.iter().zip(older.fields).all(|(a, b)| a == b)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Implemented by every persisted record.
pub trait Persisted {
    const SCHEMA: Schema;
}

/// Encode `value` behind the state magic and a version number.
pub fn encode_versioned<T: Serialize>(version: u32, value: &T) -> Result<Vec<u8>, StoreError> {
    let body = bincode::serialize(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let mut out = Vec::with_capacity(8 + body.len());
    out.extend_from_slice(&STATE_MAGIC);
    out.extend_from_slice(&version.to_le_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decode an envelope produced by [`encode_versioned`].
///
/// Returns the stored version alongside the value. Versions newer than
/// `supported` are rejected; older ones are decoded as-is and left to the
/// caller to migrate.
pub fn decode_versioned<T: DeserializeOwned>(
    supported: u32,
    bytes: &[u8],
) -> Result<(u32, T), StoreError> {
    if bytes.len() < 8 || bytes[..4] != STATE_MAGIC {
        return Err(StoreError::Corruption("missing state header".into()));
    }
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[4..8]);
    let found = u32::from_le_bytes(raw);
    if found > supported {
        return Err(StoreError::UnsupportedVersion { found, supported });
    }
    let value =
        bincode::deserialize(&bytes[8..]).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok((found, value))
}
