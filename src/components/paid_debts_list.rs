//! Paid Debts List Component
//!
//! Checklist of debts, loan payments and credit cards for the month.

use leptos::prelude::*;

use crate::context::use_app_context;
use crate::store::{use_view_store, ViewStateStoreFields};

#[component]
pub fn PaidDebtsList() -> impl IntoView {
    let ctx = use_app_context();
    let view = use_view_store();

    view! {
        <section class="paid-debts">
            <h2>"Payments this month"</h2>
            <ul>
                <For
                    each=move || view.paid_rows().get()
                    key=|row| (row.key, row.paid)
                    children=move |row| {
                        let key = row.key;
                        view! {
                            <li class=if row.paid { "paid-row paid" } else { "paid-row" }>
                                <label>
                                    <input
                                        type="checkbox"
                                        prop:checked=row.paid
                                        prop:disabled=move || view.loading().get()
                                        on:change=move |_| ctx.toggle_paid(key)
                                    />
                                    <span class="paid-name">{row.name.clone()}</span>
                                    <span class="paid-amount">{format!("{:.2}", row.amount)}</span>
                                </label>
                            </li>
                        }
                    }
                />
            </ul>
            <p class="total">{move || format!("Outstanding: {:.2}", view.outstanding().get())}</p>
        </section>
    }
}
