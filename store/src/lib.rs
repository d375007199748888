//! Table storage for the GOC system contract.
//!
//! Every persisted entity lives in a [`Table`]: rows addressed by a stable
//! primary key, optionally ranked by one ordered secondary index. Tables keep
//! an undo journal while a transaction is open so that a failed action can be
//! rolled back without leaving partial writes behind.

pub mod error;
pub mod schema;
pub mod table;

pub use error::StoreError;
pub use schema::{decode_versioned, encode_versioned, Field, Persisted, Schema};
pub use table::{Descending, Journaled, NoIndex, OrdF64, Row, SecondaryKey, Table};
