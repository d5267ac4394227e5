//! Request Generations
//!
//! Each fetch takes a ticket covering the slices it will replace. A response
//! may write to the store only while its ticket is still the newest for that
//! slice and the session it was issued in is still current.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Accounts,
    Transactions,
    Debts,
    Loans,
    InitialData,
}

impl RequestKind {
    /// Everything a bulk snapshot replaces
    pub const SNAPSHOT: [RequestKind; 5] = [
        RequestKind::InitialData,
        RequestKind::Accounts,
        RequestKind::Transactions,
        RequestKind::Debts,
        RequestKind::Loans,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    epoch: u64,
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    next: Cell<u64>,
    latest: RefCell<HashMap<RequestKind, u64>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a ticket that supersedes every in-flight request of `kinds`
    pub fn issue(&self, kinds: &[RequestKind], epoch: u64) -> Ticket {
        let seq = self.next.get() + 1;
        self.next.set(seq);
        let mut latest = self.latest.borrow_mut();
        for kind in kinds {
            latest.insert(*kind, seq);
        }
        Ticket { seq, epoch }
    }

    pub fn is_current(&self, kind: RequestKind, ticket: Ticket, epoch: u64) -> bool {
        ticket.epoch == epoch && self.latest.borrow().get(&kind) == Some(&ticket.seq)
    }
}
