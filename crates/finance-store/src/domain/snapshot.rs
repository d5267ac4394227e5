//! Bulk payload returned by the all-finance-data endpoint.

use serde::{Deserialize, Serialize};
use super::{Account, Debt, Loan, PaidDebts, Transaction};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSnapshot {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub loans: Vec<Loan>,
    #[serde(default)]
    pub paid_debts: PaidDebts,
}
