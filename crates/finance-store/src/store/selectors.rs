//! Derived views over the finance slice for dashboards.

use crate::domain::{Account, AccountKind, Debt, Loan, PaidKey, PaidKind, Transaction};
use super::finance::FinanceState;

pub fn accounts_of_kind(state: &FinanceState, kind: AccountKind) -> Vec<&Account> {
    state.accounts.iter().filter(|a| a.kind == kind).collect()
}

/// Sum of debit balances
pub fn total_balance(state: &FinanceState) -> f64 {
    state
        .accounts
        .iter()
        .filter(|a| !a.is_credit())
        .map(|a| a.balance)
        .sum()
}

pub fn total_credit_debt(state: &FinanceState) -> f64 {
    state.accounts.iter().map(Account::outstanding_debt).sum()
}

/// Newest first, by ISO date string
pub fn transactions_for_account(state: &FinanceState, account_id: u32) -> Vec<&Transaction> {
    let mut txs: Vec<&Transaction> = state
        .transactions
        .iter()
        .filter(|tx| tx.references_account(account_id))
        .collect();
    txs.sort_by(|a, b| b.date.cmp(&a.date));
    txs
}

pub fn unpaid_debts(state: &FinanceState) -> Vec<&Debt> {
    state.debts.iter().filter(|d| !d.is_paid).collect()
}

pub fn unpaid_loans(state: &FinanceState) -> Vec<&Loan> {
    state.loans.iter().filter(|l| !l.is_paid).collect()
}

/// Entity flag first; the projection only answers for records not loaded
pub fn is_paid(state: &FinanceState, key: &PaidKey) -> bool {
    let from_entity = match key.kind {
        PaidKind::Debt => state.debts.get(key.id).map(|d| d.is_paid),
        PaidKind::Loan => state.loans.get(key.id).map(|l| l.is_paid),
        PaidKind::CreditCard => state.accounts.get(key.id).and_then(Account::paid_status),
    };
    from_entity
        .or_else(|| state.paid_debts.get(key).copied())
        .unwrap_or(false)
}

/// Unpaid debt amounts, unpaid credit card debt and unpaid monthly loan payments
pub fn outstanding_total(state: &FinanceState) -> f64 {
    let debts: f64 = unpaid_debts(state).iter().map(|d| d.amount).sum();
    let cards: f64 = state
        .accounts
        .iter()
        .filter(|a| a.paid_status() == Some(false))
        .map(Account::outstanding_debt)
        .sum();
    let loans: f64 = unpaid_loans(state).iter().map(|l| l.monthly_payment).sum();
    debts + cards + loans
}
