//! Ordered video collection with an id → position index.
//!
//! The collection is an arena owned by the reducer. Structural changes
//! (wholesale replacement, removal) rebuild the index from scratch; in-place
//! updates never move a record, so the index stays valid without work.

use crate::models::{VideoId, VideoRecord};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoCollection {
    records: Vec<VideoRecord>,
    index: HashMap<VideoId, usize>,
}

impl VideoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection in the given order.
    ///
    /// When an id appears more than once, the index points at its last
    /// occurrence.
    pub fn from_records(records: Vec<VideoRecord>) -> Self {
        let mut collection = Self {
            records,
            index: HashMap::new(),
        };
        collection.rebuild_index();
        collection
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[VideoRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &VideoRecord> {
        self.records.iter()
    }

    pub fn position(&self, id: &VideoId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &VideoId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &VideoId) -> Option<&VideoRecord> {
        self.position(id).and_then(|pos| self.records.get(pos))
    }

    pub fn ids(&self) -> impl Iterator<Item = &VideoId> {
        self.records.iter().map(|r| &r.id)
    }

    /// Overwrite the record that has `record.id`. Returns false on a miss.
    pub(crate) fn replace(&mut self, record: VideoRecord) -> bool {
        let Some(slot) = self
            .position(&record.id)
            .and_then(|pos| self.records.get_mut(pos))
        else {
            return false;
        };
        *slot = record;
        true
    }

    /// Update the displayed path and dirty flag. Returns false on a miss.
    pub(crate) fn update_path(&mut self, id: &VideoId, relpath: String, dirty: bool) -> bool {
        let Some(slot) = self.position(id).and_then(|pos| self.records.get_mut(pos)) else {
            return false;
        };
        slot.relpath = relpath;
        slot.dirty = dirty;
        true
    }

    /// Remove the record with `id`; every later record shifts down by one.
    pub(crate) fn remove(&mut self, id: &VideoId) -> Option<VideoRecord> {
        let pos = self.position(id)?;
        let removed = self.records.remove(pos);
        self.rebuild_index();
        Some(removed)
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .records
            .iter()
            .enumerate()
            .map(|(pos, record)| (record.id.clone(), pos))
            .collect();
    }

    /// Check that every indexed id points at a record carrying that id and
    /// that every record's id is indexed.
    pub fn is_index_consistent(&self) -> bool {
        let entries_valid = self
            .index
            .iter()
            .all(|(id, &pos)| self.records.get(pos).is_some_and(|r| &r.id == id));
        let all_indexed = self.records.iter().all(|r| self.index.contains_key(&r.id));
        entries_valid && all_indexed
    }
}
