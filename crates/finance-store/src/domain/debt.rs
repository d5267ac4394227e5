//! Debt and Loan Entities
//!
//! Both carry an `is_paid` flag projected into the paid-debts map.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: u32,
    pub name: String,
    /// Amount currently due
    pub amount: f64,
    /// Original/total amount
    pub total_debt: f64,
    pub due_date: String,
    pub user_id: u32,
    #[serde(default)]
    pub is_paid: bool,
}

impl Debt {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        amount: f64,
        due_date: impl Into<String>,
        user_id: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            amount,
            total_debt: amount,
            due_date: due_date.into(),
            user_id,
            is_paid: false,
        }
    }
}

impl Entity for Debt {
    const LABEL: &'static str = "Debt";

    fn id(&self) -> u32 {
        self.id
    }

    fn owner(&self) -> Option<u32> {
        Some(self.user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: u32,
    pub name: String,
    pub amount: f64,
    /// Annual rate in percent
    pub interest_rate: f64,
    /// Term in months
    pub term: u32,
    pub monthly_payment: f64,
    /// Day of month the payment is due
    pub payment_due_day: u8,
    pub user_id: u32,
    #[serde(default)]
    pub is_paid: bool,
}

impl Loan {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        amount: f64,
        interest_rate: f64,
        term: u32,
        user_id: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            amount,
            interest_rate,
            term,
            monthly_payment: annuity_payment(amount, interest_rate, term),
            payment_due_day: 1,
            user_id,
            is_paid: false,
        }
    }
}

impl Entity for Loan {
    const LABEL: &'static str = "Loan";

    fn id(&self) -> u32 {
        self.id
    }

    fn owner(&self) -> Option<u32> {
        Some(self.user_id)
    }
}

/// Fixed monthly payment for an annuity loan, rounded to cents
pub fn annuity_payment(principal: f64, annual_rate_percent: f64, term_months: u32) -> f64 {
    if term_months == 0 {
        return principal;
    }
    let n = term_months as f64;
    let r = annual_rate_percent / 100.0 / 12.0;
    let payment = if r == 0.0 {
        principal / n
    } else {
        principal * r / (1.0 - (1.0 + r).powf(-n))
    };
    (payment * 100.0).round() / 100.0
}
