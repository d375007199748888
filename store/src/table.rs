//! Journaled keyed tables.
//!
//! A [`Table`] owns its rows in a `BTreeMap` keyed by the row's primary key.
//! An optional [`SecondaryKey`] keeps a `BTreeSet<(secondary, primary)>` in
//! step with every write, so ranked iteration never needs a sort.
//!
//! While a transaction is open each write records the row it displaced.
//! `rollback` replays those records backwards; `commit` forgets them.

use crate::error::StoreError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;
use std::ops::RangeBounds;

/// A record stored in a [`Table`].
pub trait Row: Clone {
    type Key: Ord + Clone + fmt::Debug;

    /// Table name used in error messages and schemas.
    const TABLE: &'static str;

    fn primary_key(&self) -> Self::Key;
}

/// Derives the ordered secondary key of a row.
pub trait SecondaryKey<R: Row> {
    type Key: Ord + Clone + fmt::Debug;

    fn key(row: &R) -> Self::Key;
}

/// The absent secondary index.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIndex;

impl<R: Row> SecondaryKey<R> for NoIndex {
    type Key = ();

    fn key(_row: &R) -> Self::Key {}
}

/// An `f64` ordered by `total_cmp`, usable inside index keys.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrdF64(pub f64);

impl Eq for OrdF64 {}

impl PartialOrd for OrdF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Reverses the order of the wrapped key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descending<T>(pub T);

impl<T: Ord> PartialOrd for Descending<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> Ord for Descending<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.cmp(&self.0)
    }
}

/// Anything that can take part in an action-wide transaction.
pub trait Journaled {
    fn begin(&mut self);
    fn commit(&mut self);
    fn rollback(&mut self);
}

type Undo<R> = (<R as Row>::Key, Option<R>);

pub struct Table<R: Row, I: SecondaryKey<R> = NoIndex> {
    rows: BTreeMap<R::Key, R>,
    index: BTreeSet<(I::Key, R::Key)>,
    journal: Option<Vec<Undo<R>>>,
    _index: PhantomData<I>,
}

impl<R: Row, I: SecondaryKey<R>> Default for Table<R, I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Row, I: SecondaryKey<R>> Clone for Table<R, I> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            index: self.index.clone(),
            journal: None,
            _index: PhantomData,
        }
    }
}

impl<R: Row + fmt::Debug, I: SecondaryKey<R>> fmt::Debug for Table<R, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("table", &R::TABLE)
            .field("rows", &self.rows.len())
            .field("in_transaction", &self.journal.is_some())
            .finish()
    }
}

impl<R: Row, I: SecondaryKey<R>> Table<R, I> {
    pub fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            index: BTreeSet::new(),
            journal: None,
            _index: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &R::Key) -> Option<&R> {
        self.rows.get(key)
    }

    pub fn contains(&self, key: &R::Key) -> bool {
        self.rows.contains_key(key)
    }

    /// Fetch a row or fail with `NotFound`.
    pub fn require(&self, key: &R::Key) -> Result<&R, StoreError> {
        self.rows.get(key).ok_or_else(|| StoreError::NotFound {
            table: R::TABLE,
            key: format!("{key:?}"),
        })
    }

    /// Insert a new row; fails if the primary key is taken.
    pub fn emplace(&mut self, row: R) -> Result<(), StoreError> {
        let key = row.primary_key();
        if self.rows.contains_key(&key) {
            return Err(StoreError::Duplicate {
                table: R::TABLE,
                key: format!("{key:?}"),
            });
        }
        self.put(key, row);
        Ok(())
    }

    /// Insert or replace a row, returning the previous one.
    pub fn upsert(&mut self, row: R) -> Option<R> {
        let key = row.primary_key();
        self.put(key, row)
    }

    /// Apply `f` to an existing row and re-index it.
    ///
    /// The closure must not change the primary key.
    pub fn modify<T>(&mut self, key: &R::Key, f: impl FnOnce(&mut R) -> T) -> Result<T, StoreError> {
        let mut row = self.require(key)?.clone();
        let out = f(&mut row);
        if row.primary_key() != *key {
            return Err(StoreError::KeyChanged {
                table: R::TABLE,
                key: format!("{key:?}"),
            });
        }
        self.put(key.clone(), row);
        Ok(out)
    }

    pub fn remove(&mut self, key: &R::Key) -> Option<R> {
        let old = self.rows.remove(key)?;
        self.index.remove(&(I::key(&old), key.clone()));
        self.record(key.clone(), Some(old.clone()));
        Some(old)
    }

    /// Rows in primary-key order.
    pub fn iter(&self) -> impl Iterator<Item = &R> + '_ {
        self.rows.values()
    }

    /// Rows whose primary key falls in `range`, in key order.
    pub fn range<B: RangeBounds<R::Key>>(&self, range: B) -> impl Iterator<Item = &R> + '_ {
        self.rows.range(range).map(|(_, row)| row)
    }

    /// Rows in secondary-key order, ties broken by primary key.
    pub fn iter_by_index(&self) -> impl Iterator<Item = &R> + '_ {
        self.index.iter().filter_map(|(_, key)| self.rows.get(key))
    }

    /// Secondary keys paired with their primary keys, in index order.
    pub fn index_keys(&self) -> impl Iterator<Item = &(I::Key, R::Key)> + '_ {
        self.index.iter()
    }

    pub fn in_transaction(&self) -> bool {
        self.journal.is_some()
    }

    fn put(&mut self, key: R::Key, row: R) -> Option<R> {
        let secondary = I::key(&row);
        let old = self.rows.insert(key.clone(), row);
        if let Some(prev) = &old {
            self.index.remove(&(I::key(prev), key.clone()));
        }
        self.index.insert((secondary, key.clone()));
        self.record(key, old.clone());
        old
    }

    fn record(&mut self, key: R::Key, old: Option<R>) {
        if let Some(journal) = self.journal.as_mut() {
            journal.push((key, old));
        }
    }

    fn restore(&mut self, key: R::Key, old: Option<R>) {
        if let Some(current) = self.rows.remove(&key) {
            self.index.remove(&(I::key(&current), key.clone()));
        }
        if let Some(row) = old {
            self.index.insert((I::key(&row), key.clone()));
            self.rows.insert(key, row);
        }
    }
}

impl<R: Row<Key = u64>, I: SecondaryKey<R>> Table<R, I> {
    /// The next unused integer primary key.
    pub fn available_primary_key(&self) -> u64 {
        self.rows
            .keys()
            .next_back()
            .map(|k| k.saturating_add(1))
            .unwrap_or(0)
    }
}

impl<R: Row, I: SecondaryKey<R>> Journaled for Table<R, I> {
    fn begin(&mut self) {
        self.journal = Some(Vec::new());
    }

    fn commit(&mut self) {
        self.journal = None;
    }

    fn rollback(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        let undone = journal.len();
        for (key, old) in journal.into_iter().rev() {
            self.restore(key, old);
        }
        tracing::trace!(table = R::TABLE, undone, "rolled back table writes");
    }
}

impl<R: Row + Serialize, I: SecondaryKey<R>> Serialize for Table<R, I> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows.values())
    }
}

impl<'de, R, I> Deserialize<'de> for Table<R, I>
where
    R: Row + Deserialize<'de>,
    I: SecondaryKey<R>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rows = Vec::<R>::deserialize(deserializer)?;
        let mut table = Table::new();
        for row in rows {
            if table.upsert(row).is_some() {
                return Err(serde::de::Error::custom(format!(
                    "{}: duplicate primary key",
                    R::TABLE
                )));
            }
        }
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entry {
        id: u64,
        score: f64,
    }

    impl Row for Entry {
        type Key = u64;
        const TABLE: &'static str = "entries";

        fn primary_key(&self) -> u64 {
            self.id
        }
    }

    struct ByScoreDesc;

    impl SecondaryKey<Entry> for ByScoreDesc {
        type Key = Descending<OrdF64>;

        fn key(row: &Entry) -> Self::Key {
            Descending(OrdF64(row.score))
        }
    }

    fn entry(id: u64, score: f64) -> Entry {
        Entry { id, score }
    }

    fn ranked(t: &Table<Entry, ByScoreDesc>) -> Vec<u64> {
        t.iter_by_index().map(|e| e.id).collect()
    }

    #[test]
    fn secondary_index_tracks_modifications() {
        let mut t: Table<Entry, ByScoreDesc> = Table::new();
        t.emplace(entry(1, 10.0)).unwrap();
        t.emplace(entry(2, 30.0)).unwrap();
        t.emplace(entry(3, 20.0)).unwrap();
        assert_eq!(ranked(&t), vec![2, 3, 1]);

        t.modify(&1, |e| e.score = 50.0).unwrap();
        assert_eq!(ranked(&t), vec![1, 2, 3]);
        assert_eq!(t.index_keys().count(), 3);
    }

    #[test]
    fn ties_break_by_primary_key() {
        let mut t: Table<Entry, ByScoreDesc> = Table::new();
        t.emplace(entry(5, 1.0)).unwrap();
        t.emplace(entry(4, 1.0)).unwrap();
        assert_eq!(ranked(&t), vec![4, 5]);
    }

    #[test]
    fn emplace_rejects_duplicates() {
        let mut t: Table<Entry> = Table::new();
        t.emplace(entry(1, 1.0)).unwrap();
        assert!(matches!(
            t.emplace(entry(1, 2.0)),
            Err(StoreError::Duplicate { .. })
        ));
    }

    #[test]
    fn modify_missing_row_is_not_found() {
        let mut t: Table<Entry> = Table::new();
        let err = t.modify(&9, |e| e.score = 1.0).unwrap_err();
        assert_eq!(err.kind(), goc_types::ErrorKind::NotFound);
    }

    #[test]
    fn modify_cannot_change_primary_key() {
        let mut t: Table<Entry> = Table::new();
        t.emplace(entry(1, 1.0)).unwrap();
        assert!(t.modify(&1, |e| e.id = 2).is_err());
        assert!(t.contains(&1));
        assert!(!t.contains(&2));
    }

    #[test]
    fn rollback_restores_rows_and_index() {
        let mut t: Table<Entry, ByScoreDesc> = Table::new();
        t.emplace(entry(1, 10.0)).unwrap();
        t.emplace(entry(2, 5.0)).unwrap();

        t.begin();
        t.modify(&1, |e| e.score = 1.0).unwrap();
        t.modify(&1, |e| e.score = 2.0).unwrap();
        t.remove(&2);
        t.emplace(entry(3, 7.0)).unwrap();
        assert_eq!(ranked(&t), vec![3, 1]);
        t.rollback();

        assert_eq!(ranked(&t), vec![1, 2]);
        assert_eq!(t.get(&1), Some(&entry(1, 10.0)));
        assert!(!t.contains(&3));
        assert!(!t.in_transaction());
    }

    #[test]
    fn commit_keeps_writes() {
        let mut t: Table<Entry> = Table::new();
        t.begin();
        t.emplace(entry(1, 1.0)).unwrap();
        t.commit();
        t.rollback();
        assert!(t.contains(&1));
    }

    #[test]
    fn available_primary_key_follows_last() {
        let mut t: Table<Entry> = Table::new();
        assert_eq!(t.available_primary_key(), 0);
        t.emplace(entry(7, 1.0)).unwrap();
        assert_eq!(t.available_primary_key(), 8);
    }

    #[test]
    fn range_is_primary_key_bounded() {
        let mut t: Table<Entry> = Table::new();
        for id in [1, 4, 5, 9] {
            t.emplace(entry(id, 0.0)).unwrap();
        }
        let ids: Vec<u64> = t.range(4..=8).map(|e| e.id).collect();
        assert_eq!(ids, vec![4, 5]);
    }

    #[test]
    fn serde_rebuilds_index() {
        let mut t: Table<Entry, ByScoreDesc> = Table::new();
        t.emplace(entry(1, 1.0)).unwrap();
        t.emplace(entry(2, 2.0)).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let back: Table<Entry, ByScoreDesc> = serde_json::from_str(&json).unwrap();
        assert_eq!(ranked(&back), vec![2, 1]);
    }

    #[test]
    fn nan_weights_still_order() {
        let mut t: Table<Entry, ByScoreDesc> = Table::new();
        t.emplace(entry(1, f64::NAN)).unwrap();
        t.emplace(entry(2, 1.0)).unwrap();
        assert_eq!(t.iter_by_index().count(), 2);
    }
}
