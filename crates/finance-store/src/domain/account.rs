//! Account Entity
//!
//! A debit card or a credit card. Credit-only fields are ignored for debit accounts.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Account type determines which optional fields are meaningful
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    #[default]
    Debit,
    Credit,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Debit => "debit",
            AccountKind::Credit => "credit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountKind,
    pub balance: f64,
    pub user_id: u32,

    // Credit-only fields:
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt: Option<f64>,
    /// Grace period in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grace_period: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_payment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_due_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
}

impl Account {
    /// Create a debit account with no credit fields
    pub fn debit(id: u32, name: impl Into<String>, balance: f64, user_id: u32) -> Self {
        Self {
            id,
            name: name.into(),
            kind: AccountKind::Debit,
            balance,
            user_id,
            credit_limit: None,
            debt: None,
            grace_period: None,
            min_payment: None,
            payment_due_date: None,
            is_paid: None,
        }
    }

    /// Create a credit account with a limit and no outstanding debt
    pub fn credit(id: u32, name: impl Into<String>, credit_limit: f64, user_id: u32) -> Self {
        Self {
            kind: AccountKind::Credit,
            credit_limit: Some(credit_limit),
            debt: Some(0.0),
            is_paid: Some(false),
            ..Self::debit(id, name, 0.0, user_id)
        }
    }

    pub fn is_credit(&self) -> bool {
        self.kind == AccountKind::Credit
    }

    /// Paid flag as consumers see it: always `None` for debit accounts
    pub fn paid_status(&self) -> Option<bool> {
        if self.is_credit() {
            Some(self.is_paid.unwrap_or(false))
        } else {
            None
        }
    }

    /// Outstanding credit debt, zero for debit accounts
    pub fn outstanding_debt(&self) -> f64 {
        if self.is_credit() {
            self.debt.unwrap_or(0.0)
        } else {
            0.0
        }
    }
}

impl Entity for Account {
    const LABEL: &'static str = "Account";

    fn id(&self) -> u32 {
        self.id
    }

    fn owner(&self) -> Option<u32> {
        Some(self.user_id)
    }
}
