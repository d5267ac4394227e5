//! Remote API Contract
//!
//! The backend is an external collaborator. Each call resolves to the full
//! server record (or list) on success and to a `FinanceError` on failure.
//! Implementations run on a single-threaded executor, so futures need not be `Send`.

use async_trait::async_trait;
use crate::domain::{Account, Debt, EntityPatch, FinanceResult, FinanceSnapshot, Loan, Transaction};

#[async_trait(?Send)]
pub trait FinanceApi {
    async fn get_accounts(&self, user_id: u32) -> FinanceResult<Vec<Account>>;
    /// `draft.id` is ignored; the server assigns one
    async fn add_account(&self, draft: &Account) -> FinanceResult<Account>;
    async fn update_account(&self, patch: &EntityPatch) -> FinanceResult<Account>;
    async fn delete_account(&self, id: u32) -> FinanceResult<()>;

    async fn get_transactions(&self, user_id: u32) -> FinanceResult<Vec<Transaction>>;
    async fn add_transaction(&self, draft: &Transaction) -> FinanceResult<Transaction>;
    async fn update_transaction(&self, patch: &EntityPatch) -> FinanceResult<Transaction>;
    async fn delete_transaction(&self, id: u32) -> FinanceResult<()>;

    async fn get_debts(&self, user_id: u32) -> FinanceResult<Vec<Debt>>;
    async fn add_debt(&self, draft: &Debt) -> FinanceResult<Debt>;
    async fn update_debt(&self, patch: &EntityPatch) -> FinanceResult<Debt>;
    async fn delete_debt(&self, id: u32) -> FinanceResult<()>;

    async fn get_loans(&self, user_id: u32) -> FinanceResult<Vec<Loan>>;
    async fn add_loan(&self, draft: &Loan) -> FinanceResult<Loan>;
    async fn update_loan(&self, patch: &EntityPatch) -> FinanceResult<Loan>;
    async fn delete_loan(&self, id: u32) -> FinanceResult<()>;

    /// Accounts, transactions, debts, loans and the paid map in one call
    async fn get_all_finance_data(&self, user_id: u32) -> FinanceResult<FinanceSnapshot>;

    async fn toggle_debt_paid(&self, id: u32, paid: bool) -> FinanceResult<Debt>;
    async fn toggle_credit_card_paid(&self, id: u32, paid: bool) -> FinanceResult<Account>;
    async fn toggle_loan_paid(&self, id: u32, paid: bool) -> FinanceResult<Loan>;
}
