//! Normalized Slice
//!
//! Entities kept in an id-keyed map plus an ordered id list. Every operation
//! either succeeds completely or leaves the slice untouched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use crate::domain::{Entity, EntityPatch, FinanceError, FinanceResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Normalized<T> {
    pub by_id: HashMap<u32, T>,
    pub all_ids: Vec<u32>,
}

impl<T> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            all_ids: Vec::new(),
        }
    }
}

/// Mutation applied to one normalized slice
#[derive(Debug, Clone, PartialEq)]
pub enum EntityOp<T> {
    /// Bulk replace, rebuilding both maps from scratch
    Set(Vec<T>),
    /// Insert; rejected if the id is already present
    Add(T),
    /// Shallow merge; rejected if the id is absent
    Update(EntityPatch),
    /// Remove; rejected if the id is absent
    Delete(u32),
    /// Insert or replace, used for server pushes that may echo local creates
    Upsert(T),
}

/// Ids affected by a successful [`EntityOp`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Touched {
    /// The whole slice was rebuilt
    All,
    /// One entity was inserted or changed
    One(u32),
    /// One entity was removed
    Removed(u32),
}

/// Result of a successful [`EntityOp`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub message: String,
    pub touched: Touched,
}

impl<T: Entity> Normalized<T> {
    /// Apply one operation, producing the store message for it
    pub fn apply(&mut self, op: EntityOp<T>) -> FinanceResult<Applied> {
        let (message, touched) = match op {
            EntityOp::Set(items) => {
                self.replace_all(items);
                (format!("{} list updated", T::LABEL), Touched::All)
            }
            EntityOp::Add(item) => {
                let id = item.id();
                self.insert(item)?;
                (format!("{} added successfully", T::LABEL), Touched::One(id))
            }
            EntityOp::Update(patch) => {
                self.merge(&patch)?;
                (format!("{} updated successfully", T::LABEL), Touched::One(patch.id))
            }
            EntityOp::Delete(id) => {
                self.remove(id)?;
                (format!("{} deleted successfully", T::LABEL), Touched::Removed(id))
            }
            EntityOp::Upsert(item) => {
                let id = item.id();
                let verb = if self.upsert(item) { "added" } else { "updated" };
                (format!("{} {}", T::LABEL, verb), Touched::One(id))
            }
        };
        Ok(Applied { message, touched })
    }

    pub fn from_items(items: Vec<T>) -> Self {
        let mut slice = Self::default();
        slice.replace_all(items);
        slice
    }

    /// Later duplicates in `items` overwrite earlier ones; `all_ids` stays unique
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.by_id.clear();
        self.all_ids.clear();
        for item in items {
            let id = item.id();
            if self.by_id.insert(id, item).is_none() {
                self.all_ids.push(id);
            }
        }
    }

    pub fn insert(&mut self, item: T) -> FinanceResult<()> {
        let id = item.id();
        if self.by_id.contains_key(&id) {
            let message = format!("{} with id {} already exists", T::LABEL, id);
            return Err(FinanceError::Conflict(message));
        }
        self.by_id.insert(id, item);
        self.all_ids.push(id);
        Ok(())
    }

    pub fn merge(&mut self, patch: &EntityPatch) -> FinanceResult<&T> {
        let current = self
            .by_id
            .get(&patch.id)
            .ok_or_else(|| not_found::<T>(patch.id))?;
        let merged = patch.apply(current)?;
        self.by_id.insert(patch.id, merged);
        Ok(&self.by_id[&patch.id])
    }

    /// Returns true when the item was newly inserted
    pub fn upsert(&mut self, item: T) -> bool {
        let id = item.id();
        let inserted = self.by_id.insert(id, item).is_none();
        if inserted {
            self.all_ids.push(id);
        }
        inserted
    }

    pub fn remove(&mut self, id: u32) -> FinanceResult<T> {
        let removed = self.by_id.remove(&id).ok_or_else(|| not_found::<T>(id))?;
        self.all_ids.retain(|existing| *existing != id);
        Ok(removed)
    }

    /// Keep only items matching `keep`; returns the removed ids
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> Vec<u32> {
        let removed: Vec<u32> = self
            .all_ids
            .iter()
            .copied()
            .filter(|id| self.by_id.get(id).map(|item| !keep(item)).unwrap_or(true))
            .collect();
        for id in &removed {
            self.by_id.remove(id);
        }
        self.all_ids.retain(|id| !removed.contains(id));
        removed
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.by_id.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.by_id.contains_key(&id)
    }

    /// Items in `all_ids` order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.all_ids.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.all_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_ids.is_empty()
    }
}

fn not_found<T: Entity>(id: u32) -> FinanceError {
    FinanceError::NotFound(format!("{} with id {} not found", T::LABEL, id))
}
