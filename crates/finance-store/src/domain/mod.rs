//! Domain Layer
//!
//! Finance entities, admin-module records and the error taxonomy.
//! This layer has NO platform dependencies (serde only).

mod entity;
mod account;
mod transaction;
mod debt;
mod paid;
mod catalog;
mod patch;
mod snapshot;

pub use entity::{Entity, ErrorKind, FinanceError, FinanceResult};
pub use account::{Account, AccountKind};
pub use transaction::{Transaction, TransactionKind};
pub use debt::{annuity_payment, Debt, Loan};
pub use paid::{PaidDebts, PaidKey, PaidKind};
pub use catalog::{GalleryCategory, GalleryMedia, Payment, Portfolio, Tender};
pub use patch::EntityPatch;
pub use snapshot::FinanceSnapshot;
