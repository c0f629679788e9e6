//! Data memory: 128 signed integer cells.
//!
//! The operand field can name about a million addresses; only the first
//! [`MEMORY_SIZE`] exist. Anything above is an error, never a wraparound.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// The number of memory cells.
pub const MEMORY_SIZE: usize = 128;

/// Machine memory.
///
/// Always holds exactly [`MEMORY_SIZE`] cells; deserialization rejects any
/// other length.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMemory")]
pub struct Memory {
    cells: Vec<i32>,
}

/// Unchecked wire form of [`Memory`].
#[derive(Deserialize)]
struct RawMemory {
    cells: Vec<i32>,
}

impl TryFrom<RawMemory> for Memory {
    type Error = MemoryError;

    fn try_from(raw: RawMemory) -> Result<Self, Self::Error> {
        if raw.cells.len() != MEMORY_SIZE {
            return Err(MemoryError::WrongSize(raw.cells.len()));
        }
        Ok(Self { cells: raw.cells })
    }
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![0; MEMORY_SIZE],
        }
    }

    /// Read the cell at `addr`.
    pub fn read(&self, addr: u32) -> Result<i32, MemoryError> {
        let index = Self::index(addr)?;
        Ok(self.cells[index])
    }

    /// Write `value` into the cell at `addr`.
    pub fn write(&mut self, addr: u32, value: i32) -> Result<(), MemoryError> {
        let index = Self::index(addr)?;
        self.cells[index] = value;
        Ok(())
    }

    fn index(addr: u32) -> Result<usize, MemoryError> {
        let index = addr as usize;
        if index >= MEMORY_SIZE {
            return Err(MemoryError::AddressOutOfRange(addr));
        }
        Ok(index)
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// All cells in address order.
    pub fn cells(&self) -> &[i32] {
        &self.cells
    }

    /// Capture every cell, written or not.
    pub fn snapshot(&self) -> MemoryDump {
        MemoryDump(self.cells.clone())
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Only count non-zero cells
        let non_zero = self.cells.iter().filter(|&&cell| cell != 0).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// A full copy of memory, one value per address.
///
/// Serializes as a map `{"address_0": v, "address_1": v, ...}` in address
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDump(Vec<i32>);

impl MemoryDump {
    /// Value at `addr`, if the address exists.
    pub fn get(&self, addr: usize) -> Option<i32> {
        self.0.get(addr).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(address, value)` pairs in address order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, i32)> + '_ {
        self.0.iter().copied().enumerate()
    }
}

impl Serialize for MemoryDump {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (addr, value) in self.iter() {
            map.serialize_entry(&format!("address_{}", addr), &value)?;
        }
        map.end()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// Address is outside valid memory range.
    #[error("memory address {0} out of range (0 to {max})", max = MEMORY_SIZE - 1)]
    AddressOutOfRange(u32),
    /// Saved memory does not have exactly [`MEMORY_SIZE`] cells.
    #[error("memory holds {0} cells, expected {size}", size = MEMORY_SIZE)]
    WrongSize(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_read_write() {
        let mut mem = Memory::new();

        mem.write(10, -42).unwrap();
        assert_eq!(mem.read(10).unwrap(), -42);
        assert_eq!(mem.read(11).unwrap(), 0);
    }

    #[test]
    fn test_memory_bounds() {
        let mut mem = Memory::new();

        assert!(mem.read(0).is_ok());
        assert!(mem.read(127).is_ok());

        assert_eq!(mem.read(128), Err(MemoryError::AddressOutOfRange(128)));
        assert_eq!(mem.write(200, 1), Err(MemoryError::AddressOutOfRange(200)));
        assert!(mem.cells().iter().all(|&c| c == 0));
    }

    #[test]
    fn test_deserialize_checks_size() {
        let err = serde_json::from_str::<Memory>(r#"{"cells":[0,0]}"#).unwrap_err();
        assert!(err.to_string().contains("memory holds 2 cells, expected 128"));

        let mut mem = Memory::new();
        mem.write(127, -3).unwrap();
        let json = serde_json::to_string(&mem).unwrap();
        let restored: Memory = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.read(127).unwrap(), -3);
        assert_eq!(restored.read(128), Err(MemoryError::AddressOutOfRange(128)));
    }

    #[test]
    fn test_clear() {
        let mut mem = Memory::new();
        mem.write(3, 9).unwrap();
        mem.clear();
        assert_eq!(mem, Memory::new());
    }

    #[test]
    fn test_snapshot_covers_every_address() {
        let mut mem = Memory::new();
        mem.write(100, -10).unwrap();

        let dump = mem.snapshot();
        assert_eq!(dump.len(), MEMORY_SIZE);
        assert_eq!(dump.get(100), Some(-10));
        assert_eq!(dump.get(MEMORY_SIZE), None);
        assert_eq!(dump.iter().filter(|&(_, v)| v != 0).count(), 1);
    }

    #[test]
    fn test_snapshot_json_keys_in_order() {
        let mut mem = Memory::new();
        mem.write(2, 7).unwrap();

        let json = serde_json::to_string(&mem.snapshot()).unwrap();
        assert!(json.starts_with(r#"{"address_0":0,"address_1":0,"address_2":7,"address_3":0"#));
        assert!(json.ends_with(r#""address_127":0}"#));
    }
}
