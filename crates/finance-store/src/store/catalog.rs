//! Admin Module Slices
//!
//! Tenders, payments, portfolios and gallery records mirrored from realtime
//! pushes. Same normalized shape and failure rules as the finance slice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{FinanceError, GalleryCategory, GalleryMedia, Payment, Portfolio, Tender};
use super::normalized::{Applied, EntityOp, Normalized, Touched};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogState {
    pub tenders: Normalized<Tender>,
    pub payments: Normalized<Payment>,
    pub portfolios: Normalized<Portfolio>,
    pub gallery_categories: Normalized<GalleryCategory>,
    pub gallery_media: Normalized<GalleryMedia>,
    pub error: Option<FinanceError>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogAction {
    Tenders(EntityOp<Tender>),
    Payments(EntityOp<Payment>),
    Portfolios(EntityOp<Portfolio>),
    GalleryCategories(EntityOp<GalleryCategory>),
    GalleryMedia(EntityOp<GalleryMedia>),
    Reset,
}

pub fn reduce_catalog(state: &mut CatalogState, action: CatalogAction, now: DateTime<Utc>) {
    let result = match action {
        CatalogAction::Tenders(op) => state.tenders.apply(op),
        CatalogAction::Payments(op) => state.payments.apply(op),
        CatalogAction::Portfolios(op) => state.portfolios.apply(op),
        CatalogAction::GalleryCategories(op) => {
            let result = state.gallery_categories.apply(op);
            if let Ok(Applied { touched: Touched::Removed(category_id), .. }) = &result {
                let category_id = *category_id;
                state.gallery_media.retain(|media| media.category_id != Some(category_id));
            }
            result
        }
        CatalogAction::GalleryMedia(op) => state.gallery_media.apply(op),
        CatalogAction::Reset => {
            *state = CatalogState::default();
            return;
        }
    };

    match result {
        Ok(_) => {
            state.error = None;
            state.last_updated = Some(now);
        }
        Err(err) => state.error = Some(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn tender(id: u32) -> Tender {
        Tender {
            id,
            title: format!("Tender {}", id),
            status: Some("open".to_string()),
            amount: Some(1500.0),
            deadline: None,
            user_id: Some(7),
            extra: Map::new(),
        }
    }

    #[test]
    fn test_catalog_add_and_reject() {
        let mut state = CatalogState::default();
        let now = Utc::now();
        reduce_catalog(&mut state, CatalogAction::Tenders(EntityOp::Add(tender(1))), now);
        assert_eq!(state.tenders.all_ids, vec![1]);
        assert_eq!(state.last_updated, Some(now));

        reduce_catalog(&mut state, CatalogAction::Tenders(EntityOp::Add(tender(1))), now);
        assert!(state.error.is_some());
        assert_eq!(state.tenders.len(), 1);

        reduce_catalog(&mut state, CatalogAction::Reset, now);
        assert_eq!(state, CatalogState::default());
    }

    #[test]
    fn test_category_delete_drops_its_media() {
        let mut state = CatalogState::default();
        let now = Utc::now();
        let category = GalleryCategory {
            id: 1,
            name: "Events".to_string(),
            user_id: None,
            extra: Map::new(),
        };
        let media = |id: u32, category_id: u32| GalleryMedia {
            id,
            category_id: Some(category_id),
            url: format!("/media/{}.jpg", id),
            title: None,
            user_id: None,
            extra: Map::new(),
        };
        reduce_catalog(&mut state, CatalogAction::GalleryCategories(EntityOp::Add(category)), now);
        let items = vec![media(1, 1), media(2, 3)];
        reduce_catalog(&mut state, CatalogAction::GalleryMedia(EntityOp::Set(items)), now);

        reduce_catalog(&mut state, CatalogAction::GalleryCategories(EntityOp::Delete(1)), now);
        assert!(state.gallery_categories.is_empty());
        assert_eq!(state.gallery_media.all_ids, vec![2]);
    }
}
