//! Register file: 32 signed integer registers.
//!
//! Register indices come out of the 5-bit register field, so every decoded
//! index is in range.

use serde::{Deserialize, Serialize};

/// The number of registers.
pub const REGISTER_COUNT: usize = 32;

/// The register file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    values: [i32; REGISTER_COUNT],
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self {
            values: [0; REGISTER_COUNT],
        }
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        self.values = [0; REGISTER_COUNT];
    }

    /// Read register `reg` (0-31).
    ///
    /// # Panics
    /// Panics if `reg` is out of range.
    #[inline]
    pub fn get(&self, reg: u8) -> i32 {
        self.values[Self::slot(reg)]
    }

    /// Write register `reg` (0-31).
    ///
    /// # Panics
    /// Panics if `reg` is out of range.
    #[inline]
    pub fn set(&mut self, reg: u8, value: i32) {
        self.values[Self::slot(reg)] = value;
    }

    #[inline]
    fn slot(reg: u8) -> usize {
        let slot = reg as usize;
        assert!(slot < REGISTER_COUNT, "Register {} out of range (0-{})", reg, REGISTER_COUNT - 1);
        slot
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.values
    }
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}
