//! UI Components
//!
//! Reusable Leptos components.

mod delete_confirm_button;
mod snackbar_host;
mod connection_badge;
mod session_bar;
mod accounts_list;
mod paid_debts_list;

pub use delete_confirm_button::DeleteConfirmButton;
pub use snackbar_host::SnackbarHost;
pub use connection_badge::ConnectionBadge;
pub use session_bar::SessionBar;
pub use accounts_list::AccountsList;
pub use paid_debts_list::PaidDebtsList;
