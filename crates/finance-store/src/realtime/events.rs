//! Server Push Events
//!
//! Named events `{entity}_{added|updated|deleted}` mapped onto the same store
//! mutations the effect layer uses.

use std::fmt;

use serde_json::Value;

use crate::domain::{
    Entity, EntityPatch, FinanceError, FinanceResult, GalleryCategory, GalleryMedia, Payment,
    Portfolio, Tender, Transaction,
};
use crate::store::{Action, CatalogAction, EntityOp, FinanceAction, Normalized, RootState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventEntity {
    Transaction,
    Tender,
    Payment,
    Portfolio,
    GalleryCategory,
    GalleryMedia,
}

impl EventEntity {
    pub const ALL: [EventEntity; 6] = [
        EventEntity::Transaction,
        EventEntity::Tender,
        EventEntity::Payment,
        EventEntity::Portfolio,
        EventEntity::GalleryCategory,
        EventEntity::GalleryMedia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventEntity::Transaction => "transaction",
            EventEntity::Tender => "tender",
            EventEntity::Payment => "payment",
            EventEntity::Portfolio => "portfolio",
            EventEntity::GalleryCategory => "gallery_category",
            EventEntity::GalleryMedia => "gallery_media",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Added,
    Updated,
    Deleted,
}

impl EventKind {
    pub const ALL: [EventKind; 3] = [EventKind::Added, EventKind::Updated, EventKind::Deleted];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Added => "added",
            EventKind::Updated => "updated",
            EventKind::Deleted => "deleted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealtimeEvent {
    pub entity: EventEntity,
    pub kind: EventKind,
}

impl RealtimeEvent {
    /// `None` for names outside the subscribed set
    pub fn parse(name: &str) -> Option<Self> {
        let (entity, kind) = name.rsplit_once('_')?;
        let kind = EventKind::ALL.into_iter().find(|k| k.as_str() == kind)?;
        Some(Self {
            entity: EventEntity::from_str(entity)?,
            kind,
        })
    }

    /// Every event name the middleware listens for
    pub fn subscribed_names() -> Vec<String> {
        EventEntity::ALL
            .into_iter()
            .flat_map(|entity| EventKind::ALL.into_iter().map(move |kind| Self { entity, kind }))
            .map(|event| event.to_string())
            .collect()
    }
}

impl fmt::Display for RealtimeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.entity.as_str(), self.kind.as_str())
    }
}

/// Absent or null `user_id` means a global record
pub fn is_owned_by(payload: &Value, session_user: Option<u32>) -> bool {
    let owner = match payload.get("user_id") {
        None | Some(Value::Null) => return true,
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.parse::<u64>().ok(),
        Some(_) => None,
    };
    match (owner, session_user) {
        (Some(owner), Some(user)) => owner == user as u64,
        _ => false,
    }
}

/// Store mutation plus snackbar text for an owned event.
/// `Ok(None)` when there is nothing to apply (delete of an unknown id).
pub fn to_action(
    event: RealtimeEvent,
    payload: &Value,
    state: &RootState,
) -> FinanceResult<Option<(Action, String)>> {
    let catalog = &state.catalog;
    let kind = event.kind;
    let action: Option<Action> = match event.entity {
        EventEntity::Transaction => entity_op(kind, payload, &state.finance.transactions)?
            .map(|op| FinanceAction::Transactions(op).into()),
        EventEntity::Tender => entity_op(kind, payload, &catalog.tenders)?
            .map(|op| CatalogAction::Tenders(op).into()),
        EventEntity::Payment => entity_op(kind, payload, &catalog.payments)?
            .map(|op| CatalogAction::Payments(op).into()),
        EventEntity::Portfolio => entity_op(kind, payload, &catalog.portfolios)?
            .map(|op| CatalogAction::Portfolios(op).into()),
        EventEntity::GalleryCategory => entity_op(kind, payload, &catalog.gallery_categories)?
            .map(|op| CatalogAction::GalleryCategories(op).into()),
        EventEntity::GalleryMedia => entity_op(kind, payload, &catalog.gallery_media)?
            .map(|op| CatalogAction::GalleryMedia(op).into()),
    };
    Ok(action.map(|action| (action, notification_text(event))))
}

fn notification_text(event: RealtimeEvent) -> String {
    let label = match event.entity {
        EventEntity::Transaction => Transaction::LABEL,
        EventEntity::Tender => Tender::LABEL,
        EventEntity::Payment => Payment::LABEL,
        EventEntity::Portfolio => Portfolio::LABEL,
        EventEntity::GalleryCategory => GalleryCategory::LABEL,
        EventEntity::GalleryMedia => GalleryMedia::LABEL,
    };
    match event.kind {
        EventKind::Added => format!("New {} received", label.to_lowercase()),
        EventKind::Updated => format!("{} updated", label),
        EventKind::Deleted => format!("{} removed", label),
    }
}

/// Added/updated upsert a full record; a partial update of a known record
/// becomes a shallow merge; deletes of unknown ids are dropped.
fn entity_op<T: Entity>(
    kind: EventKind,
    payload: &Value,
    slice: &Normalized<T>,
) -> FinanceResult<Option<EntityOp<T>>> {
    match kind {
        EventKind::Added | EventKind::Updated => match serde_json::from_value(payload.clone()) {
            Ok(item) => Ok(Some(EntityOp::Upsert(item))),
            Err(err) => {
                let id = payload_id(payload)?;
                if kind == EventKind::Updated && slice.contains(id) {
                    let patch: EntityPatch = serde_json::from_value(payload.clone())?;
                    Ok(Some(EntityOp::Update(patch)))
                } else {
                    let message = format!("Malformed {} payload: {}", T::LABEL, err);
                    Err(FinanceError::Validation(message))
                }
            }
        },
        EventKind::Deleted => {
            let id = payload_id(payload)?;
            Ok(slice.contains(id).then_some(EntityOp::Delete(id)))
        }
    }
}

/// Accepts `{"id": 5, ...}` or a bare `5`
fn payload_id(payload: &Value) -> FinanceResult<u32> {
    payload
        .get("id")
        .unwrap_or(payload)
        .as_u64()
        .and_then(|id| u32::try_from(id).ok())
        .ok_or_else(|| FinanceError::Validation(format!("Event payload has no id: {}", payload)))
}
