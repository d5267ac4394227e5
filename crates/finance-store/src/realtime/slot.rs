//! Connection Slot
//!
//! Owner of the single connection handle. Each open/close bumps a generation
//! so events from a handle that has since been replaced can be told apart.

use super::transport::Connection;

pub struct ConnectionSlot<C> {
    handle: Option<C>,
    generation: u64,
}

impl<C: Connection> ConnectionSlot<C> {
    pub fn new() -> Self {
        Self {
            handle: None,
            generation: 0,
        }
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a new generation for a connection about to be opened
    pub fn reserve(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Store the handle opened for `generation`. If the slot moved on in the
    /// meantime the handle is closed instead and false is returned.
    pub fn attach(&mut self, generation: u64, handle: C) -> bool {
        if generation != self.generation || self.handle.is_some() {
            handle.close();
            return false;
        }
        self.handle = Some(handle);
        true
    }

    /// Close and drop the handle; returns false if none was open
    pub fn close(&mut self) -> bool {
        self.generation += 1;
        match self.handle.take() {
            Some(handle) => {
                handle.close();
                true
            }
            None => false,
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        self.handle.as_ref().map(f)
    }
}

impl<C: Connection> Default for ConnectionSlot<C> {
    fn default() -> Self {
        Self::new()
    }
}
