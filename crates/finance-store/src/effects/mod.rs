//! Async Effect Layer
//!
//! Each operation calls the remote API and translates the outcome into store
//! mutations plus a snackbar. Failures come back as `Err(FinanceError)` after
//! being reported to the store; nothing here panics or leaves `loading` set.

mod api;
mod sequencer;

use std::future::Future;
use std::rc::Rc;

pub use api::FinanceApi;
pub use sequencer::{RequestKind, RequestSequencer, Ticket};

use crate::domain::{
    Account, Debt, Entity, EntityPatch, FinanceError, FinanceResult, FinanceSnapshot, Loan,
    PaidKey, PaidKind, Transaction,
};
use crate::store::{selectors, EntityOp, FinanceAction, FinanceState, Normalized, Snackbar, Store};

/// Ties an entity type to its finance slice
pub trait FinanceSlice: Entity {
    fn wrap(op: EntityOp<Self>) -> FinanceAction;

    fn slice(state: &FinanceState) -> &Normalized<Self>;
}

impl FinanceSlice for Account {
    fn wrap(op: EntityOp<Self>) -> FinanceAction {
        FinanceAction::Accounts(op)
    }

    fn slice(state: &FinanceState) -> &Normalized<Self> {
        &state.accounts
    }
}

impl FinanceSlice for Transaction {
    fn wrap(op: EntityOp<Self>) -> FinanceAction {
        FinanceAction::Transactions(op)
    }

    fn slice(state: &FinanceState) -> &Normalized<Self> {
        &state.transactions
    }
}

impl FinanceSlice for Debt {
    fn wrap(op: EntityOp<Self>) -> FinanceAction {
        FinanceAction::Debts(op)
    }

    fn slice(state: &FinanceState) -> &Normalized<Self> {
        &state.debts
    }
}

impl FinanceSlice for Loan {
    fn wrap(op: EntityOp<Self>) -> FinanceAction {
        FinanceAction::Loans(op)
    }

    fn slice(state: &FinanceState) -> &Normalized<Self> {
        &state.loans
    }
}

pub struct FinanceEffects<A> {
    api: Rc<A>,
    store: Store,
    sequencer: Rc<RequestSequencer>,
}

impl<A> Clone for FinanceEffects<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            store: self.store.clone(),
            sequencer: self.sequencer.clone(),
        }
    }
}

impl<A: FinanceApi> FinanceEffects<A> {
    pub fn new(api: A, store: Store) -> Self {
        Self {
            api: Rc::new(api),
            store,
            sequencer: Rc::new(RequestSequencer::new()),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    // ========================
    // Accounts
    // ========================

    pub async fn fetch_accounts(&self, user_id: u32) -> FinanceResult<Vec<Account>> {
        let request = self.api.get_accounts(user_id);
        self.load(RequestKind::Accounts, request, "Failed to fetch accounts").await
    }

    pub async fn create_account(&self, draft: &Account) -> FinanceResult<Account> {
        self.create(self.api.add_account(draft), "Failed to create account").await
    }

    pub async fn update_account(&self, patch: &EntityPatch) -> FinanceResult<Account> {
        self.update(self.api.update_account(patch), "Failed to update account").await
    }

    pub async fn delete_account(&self, id: u32) -> FinanceResult<u32> {
        self.remove::<Account, _>(id, self.api.delete_account(id), "Failed to delete account").await
    }

    // ========================
    // Transactions
    // ========================

    pub async fn fetch_transactions(&self, user_id: u32) -> FinanceResult<Vec<Transaction>> {
        self.load(
            RequestKind::Transactions,
            self.api.get_transactions(user_id),
            "Failed to fetch transactions",
        )
        .await
    }

    pub async fn create_transaction(&self, draft: &Transaction) -> FinanceResult<Transaction> {
        if draft.amount < 0.0 || !draft.amount.is_finite() {
            return self.fail(
                FinanceError::Validation("Amount must be a non-negative number".to_string()),
                "Failed to create transaction",
            );
        }
        self.create(self.api.add_transaction(draft), "Failed to create transaction").await
    }

    pub async fn update_transaction(&self, patch: &EntityPatch) -> FinanceResult<Transaction> {
        self.update(self.api.update_transaction(patch), "Failed to update transaction").await
    }

    pub async fn delete_transaction(&self, id: u32) -> FinanceResult<u32> {
        let request = self.api.delete_transaction(id);
        self.remove::<Transaction, _>(id, request, "Failed to delete transaction").await
    }

    // ========================
    // Debts
    // ========================

    pub async fn fetch_debts(&self, user_id: u32) -> FinanceResult<Vec<Debt>> {
        self.load(RequestKind::Debts, self.api.get_debts(user_id), "Failed to fetch debts").await
    }

    pub async fn create_debt(&self, draft: &Debt) -> FinanceResult<Debt> {
        self.create(self.api.add_debt(draft), "Failed to create debt").await
    }

    pub async fn update_debt(&self, patch: &EntityPatch) -> FinanceResult<Debt> {
        self.update(self.api.update_debt(patch), "Failed to update debt").await
    }

    pub async fn delete_debt(&self, id: u32) -> FinanceResult<u32> {
        self.remove::<Debt, _>(id, self.api.delete_debt(id), "Failed to delete debt").await
    }

    // ========================
    // Loans
    // ========================

    pub async fn fetch_loans(&self, user_id: u32) -> FinanceResult<Vec<Loan>> {
        self.load(RequestKind::Loans, self.api.get_loans(user_id), "Failed to fetch loans").await
    }

    pub async fn create_loan(&self, draft: &Loan) -> FinanceResult<Loan> {
        self.create(self.api.add_loan(draft), "Failed to create loan").await
    }

    pub async fn update_loan(&self, patch: &EntityPatch) -> FinanceResult<Loan> {
        self.update(self.api.update_loan(patch), "Failed to update loan").await
    }

    pub async fn delete_loan(&self, id: u32) -> FinanceResult<u32> {
        self.remove::<Loan, _>(id, self.api.delete_loan(id), "Failed to delete loan").await
    }

    // ========================
    // Composite operations
    // ========================

    /// Replace all four slices and the paid map from one response
    pub async fn fetch_initial_data(&self, user_id: u32) -> FinanceResult<FinanceSnapshot> {
        let ticket = self.issue(&RequestKind::SNAPSHOT);
        self.store.dispatch(FinanceAction::Pending);
        let result = self.api.get_all_finance_data(user_id).await;
        if !self.is_current(RequestKind::InitialData, ticket) {
            log::debug!("[EFFECTS] dropping stale initial data response");
            return result;
        }
        match result {
            Ok(snapshot) => {
                log::info!(
                    "[EFFECTS] loaded {} accounts, {} transactions, {} debts, {} loans",
                    snapshot.accounts.len(),
                    snapshot.transactions.len(),
                    snapshot.debts.len(),
                    snapshot.loans.len()
                );
                self.store.dispatch(FinanceAction::LoadSnapshot(snapshot.clone()));
                Ok(snapshot)
            }
            Err(err) => self.fail(err, "Failed to load finance data"),
        }
    }

    /// Flip the paid status behind `key`. The paid map is updated before the
    /// call and restored wholesale if it fails. Returns the new status.
    pub async fn toggle_paid_debt(&self, key: PaidKey) -> FinanceResult<bool> {
        let found = self.store.select(|s| {
            let finance = &s.finance;
            has_paid_target(finance, &key)
                .then(|| (finance.paid_debts.clone(), selectors::is_paid(finance, &key)))
        });
        let Some((previous, current)) = found else {
            return self.fail(missing_paid_target(&key), "Failed to update paid status");
        };

        let epoch = self.epoch();
        let new_status = !current;
        self.store.dispatch(FinanceAction::SetPaidDebt { key, paid: new_status });
        self.store.dispatch(FinanceAction::Pending);

        let result = match key.kind {
            PaidKind::Debt => {
                self.api.toggle_debt_paid(key.id, new_status).await.and_then(|debt| {
                    let paid = debt.is_paid;
                    Ok((Debt::wrap(EntityOp::Update(EntityPatch::from_entity(&debt)?)), paid))
                })
            }
            PaidKind::Loan => {
                self.api.toggle_loan_paid(key.id, new_status).await.and_then(|loan| {
                    let paid = loan.is_paid;
                    Ok((Loan::wrap(EntityOp::Update(EntityPatch::from_entity(&loan)?)), paid))
                })
            }
            PaidKind::CreditCard => {
                let response = self.api.toggle_credit_card_paid(key.id, new_status).await;
                response.and_then(|account| {
                    let paid = account.paid_status().unwrap_or(new_status);
                    Ok((Account::wrap(EntityOp::Update(EntityPatch::from_entity(&account)?)), paid))
                })
            }
        };

        if epoch != self.epoch() {
            log::debug!("[EFFECTS] dropping paid status for {} from a previous session", key);
            return result.map(|(_, paid)| paid);
        }

        match result {
            Ok((action, paid)) => {
                // A realtime delete may have landed while the call was in flight
                if !self.store.select(|s| has_paid_target(&s.finance, &key)) {
                    log::debug!("[EFFECTS] {} was removed before its paid status was saved", key);
                    self.store.dispatch(FinanceAction::Settled);
                    return Err(missing_paid_target(&key));
                }
                self.store.dispatch(action);
                self.store.dispatch(FinanceAction::SetPaidDebt { key, paid });
                let message = if paid { "Marked as paid" } else { "Marked as unpaid" };
                self.store.dispatch(Snackbar::success(message));
                Ok(paid)
            }
            Err(err) => {
                log::debug!("[EFFECTS] rolling back paid status for {}", key);
                self.store.dispatch(FinanceAction::SetPaidDebts(previous));
                self.fail(err, "Failed to update paid status")
            }
        }
    }

    // ========================
    // Shared plumbing
    // ========================

    async fn load<T: FinanceSlice>(
        &self,
        kind: RequestKind,
        request: impl Future<Output = FinanceResult<Vec<T>>>,
        fallback: &str,
    ) -> FinanceResult<Vec<T>> {
        let ticket = self.issue(&[kind]);
        self.store.dispatch(FinanceAction::Pending);
        let result = request.await;
        if !self.is_current(kind, ticket) {
            log::debug!("[EFFECTS] dropping stale {:?} response", kind);
            return result;
        }
        match result {
            Ok(items) => {
                self.store.dispatch(T::wrap(EntityOp::Set(items.clone())));
                self.store.dispatch(Snackbar::success(format!("{} list loaded", T::LABEL)));
                Ok(items)
            }
            Err(err) => self.fail(err, fallback),
        }
    }

    async fn create<T: FinanceSlice>(
        &self,
        request: impl Future<Output = FinanceResult<T>>,
        fallback: &str,
    ) -> FinanceResult<T> {
        let epoch = self.epoch();
        self.store.dispatch(FinanceAction::Pending);
        let result = request.await;
        if epoch != self.epoch() {
            log::debug!("[EFFECTS] dropping created {} from a previous session", T::LABEL);
            return result;
        }
        match result {
            Ok(created) => {
                // A realtime push may already have inserted the same record
                let echoed = self.store.select(|s| T::slice(&s.finance).contains(created.id()));
                let op = if echoed {
                    EntityOp::Upsert(created.clone())
                } else {
                    EntityOp::Add(created.clone())
                };
                self.store.dispatch(T::wrap(op));
                self.store.dispatch(Snackbar::success(format!("{} created", T::LABEL)));
                Ok(created)
            }
            Err(err) => self.fail(err, fallback),
        }
    }

    async fn update<T: FinanceSlice>(
        &self,
        request: impl Future<Output = FinanceResult<T>>,
        fallback: &str,
    ) -> FinanceResult<T> {
        let epoch = self.epoch();
        self.store.dispatch(FinanceAction::Pending);
        let result = request.await;
        if epoch != self.epoch() {
            log::debug!("[EFFECTS] dropping updated {} from a previous session", T::LABEL);
            return result;
        }
        let updated = match result {
            Ok(updated) => updated,
            Err(err) => return self.fail(err, fallback),
        };
        let id = updated.id();
        if !self.store.select(|s| T::slice(&s.finance).contains(id)) {
            log::debug!("[EFFECTS] {} {} was removed before the update landed", T::LABEL, id);
            self.store.dispatch(FinanceAction::Settled);
            return Err(FinanceError::NotFound(format!("{} with id {} not found", T::LABEL, id)));
        }
        let patch = match EntityPatch::from_entity(&updated) {
            Ok(patch) => patch,
            Err(err) => return self.fail(err, fallback),
        };
        self.store.dispatch(T::wrap(EntityOp::Update(patch)));
        self.store.dispatch(Snackbar::success(format!("{} updated", T::LABEL)));
        Ok(updated)
    }

    async fn remove<T: FinanceSlice, F: Future<Output = FinanceResult<()>>>(
        &self,
        id: u32,
        request: F,
        fallback: &str,
    ) -> FinanceResult<u32> {
        let epoch = self.epoch();
        self.store.dispatch(FinanceAction::Pending);
        let result = request.await;
        if epoch != self.epoch() {
            log::debug!("[EFFECTS] dropping deleted {} from a previous session", T::LABEL);
            return result.map(|()| id);
        }
        if let Err(err) = result {
            return self.fail(err, fallback);
        }
        if self.store.select(|s| T::slice(&s.finance).contains(id)) {
            self.store.dispatch(T::wrap(EntityOp::Delete(id)));
        } else {
            // Already removed by a realtime push
            self.store.dispatch(FinanceAction::Settled);
        }
        self.store.dispatch(Snackbar::success(format!("{} deleted", T::LABEL)));
        Ok(id)
    }

    fn epoch(&self) -> u64 {
        self.store.select(|s| s.session_epoch)
    }

    fn issue(&self, kinds: &[RequestKind]) -> Ticket {
        self.sequencer.issue(kinds, self.epoch())
    }

    fn is_current(&self, kind: RequestKind, ticket: Ticket) -> bool {
        self.sequencer.is_current(kind, ticket, self.epoch())
    }

    fn fail<R>(&self, err: FinanceError, fallback: &str) -> FinanceResult<R> {
        let err = err.or_fallback(fallback);
        log::warn!("[EFFECTS] {}", err);
        self.store.dispatch(FinanceAction::Rejected(err.clone()));
        self.store.dispatch(Snackbar::error(err.message()));
        Err(err)
    }
}

fn has_paid_target(finance: &FinanceState, key: &PaidKey) -> bool {
    match key.kind {
        PaidKind::Debt => finance.debts.contains(key.id),
        PaidKind::Loan => finance.loans.contains(key.id),
        PaidKind::CreditCard => finance.accounts.get(key.id).is_some_and(Account::is_credit),
    }
}

fn missing_paid_target(key: &PaidKey) -> FinanceError {
    FinanceError::NotFound(format!("No {} entry for {}", key.kind.as_str(), key))
}
