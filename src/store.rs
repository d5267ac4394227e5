//! Reactive View State
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. The core store
//! stays the source of truth; its subscriber copies the parts components
//! render into this mirror, touching only fields whose value changed.

use leptos::prelude::*;
use reactive_stores::Store;

use finance_store::domain::{Account, PaidKey, PaidKind};
use finance_store::store::{selectors, FinanceState, Snackbar};
use finance_store::{ConnectionStatus, RootState};

/// One row of the paid-debts checklist
#[derive(Clone, Debug, PartialEq)]
pub struct PaidRow {
    pub key: PaidKey,
    pub name: String,
    pub amount: f64,
    pub paid: bool,
}

/// Render-ready projection of the root state
#[derive(Clone, Debug, Default, Store)]
pub struct ViewState {
    pub user_id: Option<u32>,
    pub username: Option<String>,
    pub accounts: Vec<Account>,
    pub paid_rows: Vec<PaidRow>,
    pub total_balance: f64,
    pub outstanding: f64,
    pub loading: bool,
    pub error: Option<String>,
    pub snackbar: Option<Snackbar>,
    pub connection: ConnectionStatus,
}

/// Type alias for the store
pub type ViewStore = Store<ViewState>;

/// Get the view store from context
pub fn use_view_store() -> ViewStore {
    expect_context::<ViewStore>()
}

macro_rules! sync_field {
    ($view:expr, $field:ident, $value:expr) => {{
        let value = $value;
        if $view.$field().with_untracked(|current| *current != value) {
            $view.$field().set(value);
        }
    }};
}

/// Copy the root state into the view store
pub fn sync_view(view: &ViewStore, state: &RootState) {
    let finance = &state.finance;
    sync_field!(view, user_id, state.auth.user_id);
    sync_field!(view, username, state.auth.username.clone());
    sync_field!(view, accounts, finance.accounts.to_vec());
    sync_field!(view, paid_rows, paid_rows(finance));
    sync_field!(view, total_balance, selectors::total_balance(finance));
    sync_field!(view, outstanding, selectors::outstanding_total(finance));
    sync_field!(view, loading, finance.loading);
    sync_field!(view, error, finance.error.as_ref().map(|e| e.message().to_string()));
    sync_field!(view, snackbar, state.ui.snackbar.clone());
    sync_field!(view, connection, state.realtime.status);
}

/// Debts, loans and credit cards in list order
fn paid_rows(finance: &FinanceState) -> Vec<PaidRow> {
    let row = |kind: PaidKind, id: u32, name: &str, amount: f64| {
        let key = PaidKey::new(kind, id);
        PaidRow {
            key,
            name: name.to_string(),
            amount,
            paid: selectors::is_paid(finance, &key),
        }
    };

    let debts = finance.debts.iter().map(|d| row(PaidKind::Debt, d.id, &d.name, d.amount));
    let loans = finance
        .loans
        .iter()
        .map(|l| row(PaidKind::Loan, l.id, &l.name, l.monthly_payment));
    let cards = finance
        .accounts
        .iter()
        .filter(|a| a.is_credit())
        .map(|a| row(PaidKind::CreditCard, a.id, &a.name, a.outstanding_debt()));
    debts.chain(loans).chain(cards).collect()
}
