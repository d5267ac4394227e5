//! Accounts List Component
//!
//! Debit and credit accounts with balances and inline delete.

use leptos::prelude::*;

use crate::components::DeleteConfirmButton;
use crate::context::use_app_context;
use crate::store::{use_view_store, ViewStateStoreFields};

#[component]
pub fn AccountsList() -> impl IntoView {
    let ctx = use_app_context();
    let view = use_view_store();

    view! {
        <section class="accounts-list">
            <h2>"Accounts"</h2>
            <Show
                when=move || !view.accounts().get().is_empty()
                fallback=|| view! { <p class="empty">"No accounts yet"</p> }
            >
                <ul>
                    <For
                        each=move || view.accounts().get()
                        key=|account| (account.id, account.name.clone(), account.balance.to_bits())
                        children=move |account| {
                            let id = account.id;
                            let detail = if account.is_credit() {
                                let debt = account.outstanding_debt();
                                let limit = account.credit_limit.unwrap_or(0.0);
                                format!("debt {:.2} / limit {:.2}", debt, limit)
                            } else {
                                format!("{:.2}", account.balance)
                            };
                            view! {
                                <li class="account-row">
                                    <span class="account-name">{account.name.clone()}</span>
                                    <span class="account-kind">{account.kind.as_str()}</span>
                                    <span class="account-amount">{detail}</span>
                                    <DeleteConfirmButton
                                        button_class="delete-btn"
                                        on_confirm=move |_| ctx.delete_account(id)
                                    />
                                </li>
                            }
                        }
                    />
                </ul>
            </Show>
            <p class="total">
                {move || format!("Total balance: {:.2}", view.total_balance().get())}
            </p>
        </section>
    }
}
