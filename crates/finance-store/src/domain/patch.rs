//! Shallow-Merge Patches
//!
//! An update carries the id plus any subset of top-level fields. Fields present
//! in the patch overwrite the stored record; everything else is kept.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use super::entity::{Entity, FinanceError, FinanceResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityPatch {
    pub id: u32,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EntityPatch {
    pub fn new(id: u32) -> Self {
        Self { id, fields: Map::new() }
    }

    /// Builder-style field setter
    pub fn set(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// A patch carrying every field of `entity`
    pub fn from_entity<T: Entity>(entity: &T) -> FinanceResult<Self> {
        match serde_json::to_value(entity)? {
            Value::Object(mut fields) => {
                fields.remove("id");
                Ok(Self { id: entity.id(), fields })
            }
            _ => Err(FinanceError::Validation(format!("{} is not a JSON object", T::LABEL))),
        }
    }

    /// Merge onto `current`; fails if the merged record no longer fits `T`
    pub fn apply<T: Entity>(&self, current: &T) -> FinanceResult<T> {
        let mut merged = match serde_json::to_value(current)? {
            Value::Object(map) => map,
            _ => return Err(FinanceError::Validation(format!("{} is not a JSON object", T::LABEL))),
        };
        for (field, value) in &self.fields {
            if field != "id" {
                merged.insert(field.clone(), value.clone());
            }
        }
        serde_json::from_value(Value::Object(merged)).map_err(|e| {
            FinanceError::Validation(format!("Invalid update for {} {}: {}", T::LABEL, self.id, e))
        })
    }
}
