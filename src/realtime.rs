//! Browser WebSocket Transport
//!
//! Frames are JSON envelopes `{"event": name, "data": payload}` in both
//! directions. Reconnect timers run on `gloo_timers` callbacks.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Timeout;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use finance_store::realtime::{
    Connection, DisconnectReason, EventSink, Scheduler, Transport, TransportEvent,
};
use finance_store::{FinanceError, FinanceResult};

#[derive(Serialize, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

pub struct WebSocketTransport;

pub struct WebSocketConnection {
    socket: WebSocket,
    id: String,
}

impl Transport for WebSocketTransport {
    type Conn = WebSocketConnection;

    fn open(&self, url: &str, token: &str, sink: EventSink) -> FinanceResult<WebSocketConnection> {
        let token = String::from(js_sys::encode_uri_component(token));
        let socket = WebSocket::new(&format!("{}?token={}", url, token))
            .map_err(|e| FinanceError::Network(format!("WebSocket open failed: {:?}", e)))?;
        let id = format!("ws-{}", js_sys::Date::now() as u64);
        let opened = Rc::new(Cell::new(false));

        let on_open = {
            let sink = sink.clone();
            let opened = opened.clone();
            let id = id.clone();
            Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                opened.set(true);
                sink(TransportEvent::Connect { id: Some(id.clone()) });
            })
        };

        let on_message = {
            let sink = sink.clone();
            Closure::<dyn FnMut(MessageEvent)>::new(move |e: MessageEvent| {
                let Some(text) = e.data().as_string() else {
                    log::debug!("[WS] ignoring non-text frame");
                    return;
                };
                match serde_json::from_str::<Envelope>(&text) {
                    Ok(envelope) => sink(TransportEvent::Message {
                        event: envelope.event,
                        payload: envelope.data,
                    }),
                    Err(err) => log::warn!("[WS] malformed frame: {}", err),
                }
            })
        };

        // Errors after open are always followed by a close event
        let on_error = {
            let sink = sink.clone();
            let opened = opened.clone();
            Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                if !opened.get() {
                    sink(TransportEvent::ConnectError("WebSocket error".to_string()));
                }
            })
        };

        let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |e: CloseEvent| {
            if opened.get() {
                sink(TransportEvent::Disconnect(close_reason(&e)));
            } else {
                sink(TransportEvent::ConnectError(format!("closed with code {}", e.code())));
            }
        });

        // Handlers are owned by the JS side; a handler may tear down its
        // own connection while it runs
        socket.set_onopen(Some(on_open.into_js_value().unchecked_ref()));
        socket.set_onmessage(Some(on_message.into_js_value().unchecked_ref()));
        socket.set_onerror(Some(on_error.into_js_value().unchecked_ref()));
        socket.set_onclose(Some(on_close.into_js_value().unchecked_ref()));

        Ok(WebSocketConnection { socket, id })
    }
}

/// Explicit reason text wins; otherwise the close code decides
fn close_reason(e: &CloseEvent) -> DisconnectReason {
    let reason = e.reason();
    if !reason.is_empty() {
        return DisconnectReason::from_wire(&reason);
    }
    match e.code() {
        1000 => DisconnectReason::ServerDisconnect,
        1001 | 1006 => DisconnectReason::TransportClose,
        1011 => DisconnectReason::TransportError,
        code => DisconnectReason::Other(format!("close code {}", code)),
    }
}

impl Connection for WebSocketConnection {
    fn emit(&self, event: &str, payload: Value) {
        let envelope = Envelope {
            event: event.to_string(),
            data: payload,
        };
        let result = serde_json::to_string(&envelope)
            .map_err(|e| e.to_string())
            .and_then(|frame| self.socket.send_with_str(&frame).map_err(|e| format!("{:?}", e)));
        if let Err(err) = result {
            log::warn!("[WS] failed to send '{}': {}", event, err);
        }
    }

    fn is_connected(&self) -> bool {
        self.socket.ready_state() == WebSocket::OPEN
    }

    fn id(&self) -> Option<String> {
        self.is_connected().then(|| self.id.clone())
    }

    fn close(&self) {
        self.socket.set_onopen(None);
        self.socket.set_onmessage(None);
        self.socket.set_onerror(None);
        self.socket.set_onclose(None);
        if let Err(err) = self.socket.close() {
            log::debug!("[WS] close failed: {:?}", err);
        }
    }
}

/// Reconnect timers on the browser event loop
pub struct TimerScheduler;

impl Scheduler for TimerScheduler {
    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        Timeout::new(delay.as_millis() as u32, task).forget();
    }
}
