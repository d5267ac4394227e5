//! Finance Dashboard Frontend Entry Point

mod logging;
mod config;
mod commands;
mod realtime;
mod storage;
mod context;
mod store;
mod components;
mod app;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Debug);
    mount_to_body(App);
}
