//! Paid-Debts Projection
//!
//! Keys of the form `"{kind}-{id}"` mapped to the paid flag of a debt,
//! a credit card or a loan.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use super::entity::FinanceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaidKind {
    Debt,
    CreditCard,
    Loan,
}

impl PaidKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaidKind::Debt => "debt",
            PaidKind::CreditCard => "credit_card",
            PaidKind::Loan => "loan",
        }
    }
}

impl FromStr for PaidKind {
    type Err = FinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debt" => Ok(PaidKind::Debt),
            "credit_card" => Ok(PaidKind::CreditCard),
            "loan" => Ok(PaidKind::Loan),
            other => Err(FinanceError::Validation(format!("Unknown paid type '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PaidKey {
    pub kind: PaidKind,
    pub id: u32,
}

impl PaidKey {
    pub fn new(kind: PaidKind, id: u32) -> Self {
        Self { kind, id }
    }

    pub fn debt(id: u32) -> Self {
        Self::new(PaidKind::Debt, id)
    }

    pub fn credit_card(id: u32) -> Self {
        Self::new(PaidKind::CreditCard, id)
    }

    pub fn loan(id: u32) -> Self {
        Self::new(PaidKind::Loan, id)
    }
}

impl fmt::Display for PaidKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.as_str(), self.id)
    }
}

impl FromStr for PaidKey {
    type Err = FinanceError;

    /// The id follows the last '-', so "credit_card-12" splits correctly
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .rsplit_once('-')
            .ok_or_else(|| FinanceError::Validation(format!("Malformed paid key '{}'", s)))?;
        let id = id
            .parse::<u32>()
            .map_err(|_| FinanceError::Validation(format!("Malformed id in paid key '{}'", s)))?;
        Ok(Self::new(kind.parse()?, id))
    }
}

impl From<PaidKey> for String {
    fn from(key: PaidKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PaidKey {
    type Error = FinanceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Paid flag per debt-like entity
pub type PaidDebts = BTreeMap<PaidKey, bool>;
