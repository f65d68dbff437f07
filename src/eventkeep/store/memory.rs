use super::SlotStore;
use crate::error::{EventKeepError, Result};
use std::cell::RefCell;
use std::collections::HashMap;

/// In-memory slots for testing.
///
/// Uses `RefCell` for interior mutability since the store has a single owner
/// thread. This lets `SlotStore` take `&self` everywhere.
#[derive(Default)]
pub struct MemSlotStore {
    slots: RefCell<HashMap<String, Vec<u8>>>,
    simulate_write_error: RefCell<bool>,
    simulate_read_error: RefCell<bool>,
    failing_writes: RefCell<HashMap<String, usize>>,
    writes: RefCell<Vec<String>>,
}

impl MemSlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail until turned off.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Make every read fail until turned off.
    pub fn set_simulate_read_error(&self, simulate: bool) {
        *self.simulate_read_error.borrow_mut() = simulate;
    }

    /// Make the next `count` writes to `key` fail.
    pub fn fail_next_writes(&self, key: &str, count: usize) {
        self.failing_writes
            .borrow_mut()
            .insert(key.to_string(), count);
    }

    /// Keys of successful writes, in order.
    pub fn write_log(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }

    /// Test helper to put bytes in a slot without going through `write`.
    pub fn put_raw(&self, key: &str, bytes: &[u8]) {
        self.slots
            .borrow_mut()
            .insert(key.to_string(), bytes.to_vec());
    }

    pub fn get_raw(&self, key: &str) -> Option<Vec<u8>> {
        self.slots.borrow().get(key).cloned()
    }
}

impl SlotStore for MemSlotStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if *self.simulate_read_error.borrow() {
            return Err(EventKeepError::read(key, "Simulated read error"));
        }
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(EventKeepError::write(key, "Simulated write error"));
        }
        if let Some(remaining) = self.failing_writes.borrow_mut().get_mut(key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(EventKeepError::write(key, "Simulated write error"));
            }
        }

        self.slots
            .borrow_mut()
            .insert(key.to_string(), bytes.to_vec());
        self.writes.borrow_mut().push(key.to_string());
        Ok(())
    }
}
