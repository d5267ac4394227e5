//! Finance Commands
//!
//! Endpoint paths for accounts, transactions, debts and loans.

use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use finance_store::domain::{Account, Debt, EntityPatch, FinanceSnapshot, Loan, Transaction};
use finance_store::{FinanceApi, FinanceResult};

use super::HttpFinanceApi;

// ========================
// Argument Structs
// ========================

#[derive(Serialize)]
struct PaidArgs {
    is_paid: bool,
}

fn list_path(resource: &str, user_id: u32) -> String {
    format!("{}?user_id={}", resource, user_id)
}

fn item_path(resource: &str, id: u32) -> String {
    format!("{}/{}", resource, id)
}

// ========================
// Commands
// ========================

#[async_trait(?Send)]
impl FinanceApi for HttpFinanceApi {
    async fn get_accounts(&self, user_id: u32) -> FinanceResult<Vec<Account>> {
        self.get(&list_path("accounts", user_id)).await
    }

    async fn add_account(&self, draft: &Account) -> FinanceResult<Account> {
        self.send(Method::POST, "accounts", draft).await
    }

    async fn update_account(&self, patch: &EntityPatch) -> FinanceResult<Account> {
        self.send(Method::PUT, &item_path("accounts", patch.id), patch).await
    }

    async fn delete_account(&self, id: u32) -> FinanceResult<()> {
        self.delete(&item_path("accounts", id)).await
    }

    async fn get_transactions(&self, user_id: u32) -> FinanceResult<Vec<Transaction>> {
        self.get(&list_path("transactions", user_id)).await
    }

    async fn add_transaction(&self, draft: &Transaction) -> FinanceResult<Transaction> {
        self.send(Method::POST, "transactions", draft).await
    }

    async fn update_transaction(&self, patch: &EntityPatch) -> FinanceResult<Transaction> {
        self.send(Method::PUT, &item_path("transactions", patch.id), patch).await
    }

    async fn delete_transaction(&self, id: u32) -> FinanceResult<()> {
        self.delete(&item_path("transactions", id)).await
    }

    async fn get_debts(&self, user_id: u32) -> FinanceResult<Vec<Debt>> {
        self.get(&list_path("debts", user_id)).await
    }

    async fn add_debt(&self, draft: &Debt) -> FinanceResult<Debt> {
        self.send(Method::POST, "debts", draft).await
    }

    async fn update_debt(&self, patch: &EntityPatch) -> FinanceResult<Debt> {
        self.send(Method::PUT, &item_path("debts", patch.id), patch).await
    }

    async fn delete_debt(&self, id: u32) -> FinanceResult<()> {
        self.delete(&item_path("debts", id)).await
    }

    async fn get_loans(&self, user_id: u32) -> FinanceResult<Vec<Loan>> {
        self.get(&list_path("loans", user_id)).await
    }

    async fn add_loan(&self, draft: &Loan) -> FinanceResult<Loan> {
        self.send(Method::POST, "loans", draft).await
    }

    async fn update_loan(&self, patch: &EntityPatch) -> FinanceResult<Loan> {
        self.send(Method::PUT, &item_path("loans", patch.id), patch).await
    }

    async fn delete_loan(&self, id: u32) -> FinanceResult<()> {
        self.delete(&item_path("loans", id)).await
    }

    async fn get_all_finance_data(&self, user_id: u32) -> FinanceResult<FinanceSnapshot> {
        self.get(&list_path("finance/all", user_id)).await
    }

    async fn toggle_debt_paid(&self, id: u32, paid: bool) -> FinanceResult<Debt> {
        let path = format!("{}/paid", item_path("debts", id));
        self.send(Method::PATCH, &path, &PaidArgs { is_paid: paid }).await
    }

    async fn toggle_credit_card_paid(&self, id: u32, paid: bool) -> FinanceResult<Account> {
        let path = format!("{}/paid", item_path("credit-cards", id));
        self.send(Method::PATCH, &path, &PaidArgs { is_paid: paid }).await
    }

    async fn toggle_loan_paid(&self, id: u32, paid: bool) -> FinanceResult<Loan> {
        let path = format!("{}/paid", item_path("loans", id));
        self.send(Method::PATCH, &path, &PaidArgs { is_paid: paid }).await
    }
}
