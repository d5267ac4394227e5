//! Finance Slice
//!
//! Accounts, transactions, debts and loans plus the paid-debts projection.
//! `reduce_finance` is the only code that mutates this state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Account, Debt, Entity, FinanceError, FinanceSnapshot, Loan, PaidDebts, PaidKey, PaidKind,
    Transaction,
};
use super::normalized::{Applied, EntityOp, Normalized, Touched};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceState {
    pub accounts: Normalized<Account>,
    pub transactions: Normalized<Transaction>,
    pub debts: Normalized<Debt>,
    pub loans: Normalized<Loan>,
    pub paid_debts: PaidDebts,
    pub loading: bool,
    pub error: Option<FinanceError>,
    pub success_message: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FinanceAction {
    Accounts(EntityOp<Account>),
    Transactions(EntityOp<Transaction>),
    Debts(EntityOp<Debt>),
    Loans(EntityOp<Loan>),
    /// Replace all four slices and the paid map in one step
    LoadSnapshot(FinanceSnapshot),
    /// Replace the paid map wholesale (rollback path)
    SetPaidDebts(PaidDebts),
    /// Flip one paid entry without touching entities (optimistic path)
    SetPaidDebt { key: PaidKey, paid: bool },
    /// A request started
    Pending,
    /// A request finished with nothing to write
    Settled,
    /// A request failed
    Rejected(FinanceError),
    ClearMessages,
    ResetFinance,
}

/// Entities whose paid flag is mirrored into `paid_debts`
pub trait PaidProjection: Entity {
    const PAID_KIND: PaidKind;

    /// `None` when the record does not take part in the projection
    fn paid_flag(&self) -> Option<bool>;
}

impl PaidProjection for Account {
    const PAID_KIND: PaidKind = PaidKind::CreditCard;

    fn paid_flag(&self) -> Option<bool> {
        self.paid_status()
    }
}

impl PaidProjection for Debt {
    const PAID_KIND: PaidKind = PaidKind::Debt;

    fn paid_flag(&self) -> Option<bool> {
        Some(self.is_paid)
    }
}

impl PaidProjection for Loan {
    const PAID_KIND: PaidKind = PaidKind::Loan;

    fn paid_flag(&self) -> Option<bool> {
        Some(self.is_paid)
    }
}

enum Outcome {
    Success(String),
    Failure(FinanceError),
    /// Bookkeeping only; no timestamp or message
    Meta,
}

pub fn reduce_finance(state: &mut FinanceState, action: FinanceAction, now: DateTime<Utc>) {
    let outcome = match action {
        FinanceAction::Accounts(op) => apply_accounts(state, op),
        FinanceAction::Transactions(op) => match state.transactions.apply(op) {
            Ok(applied) => Outcome::Success(applied.message),
            Err(err) => Outcome::Failure(err),
        },
        FinanceAction::Debts(op) => apply_projected(&mut state.debts, &mut state.paid_debts, op),
        FinanceAction::Loans(op) => apply_projected(&mut state.loans, &mut state.paid_debts, op),
        FinanceAction::LoadSnapshot(snapshot) => {
            load_snapshot(state, snapshot);
            Outcome::Success("Finance data loaded".to_string())
        }
        FinanceAction::SetPaidDebts(paid) => {
            state.paid_debts = paid;
            Outcome::Meta
        }
        FinanceAction::SetPaidDebt { key, paid } => {
            state.paid_debts.insert(key, paid);
            Outcome::Meta
        }
        FinanceAction::Pending => {
            state.loading = true;
            state.error = None;
            Outcome::Meta
        }
        FinanceAction::Settled => {
            state.loading = false;
            Outcome::Meta
        }
        FinanceAction::Rejected(err) => Outcome::Failure(err),
        FinanceAction::ClearMessages => {
            state.error = None;
            state.success_message = None;
            Outcome::Meta
        }
        FinanceAction::ResetFinance => {
            *state = FinanceState::default();
            Outcome::Meta
        }
    };

    match outcome {
        Outcome::Success(message) => {
            state.loading = false;
            state.error = None;
            state.success_message = Some(message);
            state.last_updated = Some(now);
        }
        Outcome::Failure(err) => {
            log::debug!("[STORE] finance mutation rejected: {}", err);
            state.loading = false;
            state.error = Some(err);
            state.success_message = None;
        }
        Outcome::Meta => {}
    }
}

fn apply_accounts(state: &mut FinanceState, op: EntityOp<Account>) -> Outcome {
    let applied = match state.accounts.apply(op) {
        Ok(applied) => applied,
        Err(err) => return Outcome::Failure(err),
    };
    if let Touched::Removed(account_id) = applied.touched {
        let cascaded = state.transactions.retain(|tx| !tx.references_account(account_id));
        if !cascaded.is_empty() {
            log::debug!(
                "[STORE] account {} removed with {} transactions",
                account_id,
                cascaded.len()
            );
        }
    }
    sync_paid(&state.accounts, &mut state.paid_debts, &applied);
    Outcome::Success(applied.message)
}

fn apply_projected<T: PaidProjection>(
    slice: &mut Normalized<T>,
    paid: &mut PaidDebts,
    op: EntityOp<T>,
) -> Outcome {
    match slice.apply(op) {
        Ok(applied) => {
            sync_paid(slice, paid, &applied);
            Outcome::Success(applied.message)
        }
        Err(err) => Outcome::Failure(err),
    }
}

/// Rewrite the projection entries touched by a successful operation
fn sync_paid<T: PaidProjection>(slice: &Normalized<T>, paid: &mut PaidDebts, applied: &Applied) {
    match applied.touched {
        Touched::All => {
            paid.retain(|key, _| key.kind != T::PAID_KIND);
            for item in slice.iter() {
                if let Some(flag) = item.paid_flag() {
                    paid.insert(PaidKey::new(T::PAID_KIND, item.id()), flag);
                }
            }
        }
        Touched::One(id) => {
            let key = PaidKey::new(T::PAID_KIND, id);
            match slice.get(id).and_then(|item| item.paid_flag()) {
                Some(flag) => {
                    paid.insert(key, flag);
                }
                None => {
                    paid.remove(&key);
                }
            }
        }
        Touched::Removed(id) => {
            paid.remove(&PaidKey::new(T::PAID_KIND, id));
        }
    }
}

/// Server map first, then every entity's own flag on top
fn load_snapshot(state: &mut FinanceState, snapshot: FinanceSnapshot) {
    state.accounts.replace_all(snapshot.accounts);
    state.transactions.replace_all(snapshot.transactions);
    state.debts.replace_all(snapshot.debts);
    state.loans.replace_all(snapshot.loans);
    state.paid_debts = snapshot.paid_debts;

    overlay_paid(&state.accounts, &mut state.paid_debts);
    overlay_paid(&state.debts, &mut state.paid_debts);
    overlay_paid(&state.loans, &mut state.paid_debts);
}

fn overlay_paid<T: PaidProjection>(slice: &Normalized<T>, paid: &mut PaidDebts) {
    for item in slice.iter() {
        if let Some(flag) = item.paid_flag() {
            paid.insert(PaidKey::new(T::PAID_KIND, item.id()), flag);
        }
    }
}
