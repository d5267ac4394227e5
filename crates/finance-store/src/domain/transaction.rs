//! Transaction Entity
//!
//! A money movement owned by exactly one account or loan reference.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    #[default]
    Expense,
    TransferIn,
    TransferOut,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::TransferIn => "transfer_in",
            TransactionKind::TransferOut => "transfer_out",
        }
    }

    /// Sign applied to `amount` when computing an account's net flow
    pub fn sign(&self) -> f64 {
        match self {
            TransactionKind::Income | TransactionKind::TransferIn => 1.0,
            TransactionKind::Expense | TransactionKind::TransferOut => -1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debit_card_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_card_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_to_debit_card_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_to_credit_card_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_id: Option<u32>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Non-negative; direction comes from `kind`
    pub amount: f64,
    /// ISO date string
    pub date: String,
    pub user_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Transaction {
    /// Create a transaction with no owning reference yet
    pub fn new(
        id: u32,
        kind: TransactionKind,
        amount: f64,
        date: impl Into<String>,
        user_id: u32,
    ) -> Self {
        Self {
            id,
            debit_card_id: None,
            credit_card_id: None,
            transfer_to_debit_card_id: None,
            transfer_to_credit_card_id: None,
            loan_id: None,
            kind,
            amount,
            date: date.into(),
            user_id,
            category: None,
            description: None,
        }
    }

    /// True when any account-reference field points at `account_id`
    pub fn references_account(&self, account_id: u32) -> bool {
        [
            self.debit_card_id,
            self.credit_card_id,
            self.transfer_to_debit_card_id,
            self.transfer_to_credit_card_id,
        ]
        .contains(&Some(account_id))
    }

    /// Signed amount for balance summaries
    pub fn signed_amount(&self) -> f64 {
        self.kind.sign() * self.amount
    }
}

impl Entity for Transaction {
    const LABEL: &'static str = "Transaction";

    fn id(&self) -> u32 {
        self.id
    }

    fn owner(&self) -> Option<u32> {
        Some(self.user_id)
    }
}
