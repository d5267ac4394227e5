//! Admin Module Entities
//!
//! Tenders, payments, portfolios and gallery records. The client only mirrors
//! them from realtime pushes, so unknown server fields are kept in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tender {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub user_id: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: u32,
    pub amount: f64,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub user_id: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub user_id: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryCategory {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub user_id: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryMedia {
    pub id: u32,
    #[serde(default)]
    pub category_id: Option<u32>,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub user_id: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

macro_rules! impl_catalog_entity {
    ($ty:ty, $label:expr) => {
        impl Entity for $ty {
            const LABEL: &'static str = $label;

            fn id(&self) -> u32 {
                self.id
            }

            fn owner(&self) -> Option<u32> {
                self.user_id
            }
        }
    };
}

impl_catalog_entity!(Tender, "Tender");
impl_catalog_entity!(Payment, "Payment");
impl_catalog_entity!(Portfolio, "Portfolio");
impl_catalog_entity!(GalleryCategory, "Gallery category");
impl_catalog_entity!(GalleryMedia, "Gallery media");
