//! CPU emulation.
//!
//! This module implements the complete machine:
//! - 32 signed integer registers
//! - 128 signed integer memory cells
//! - 4-instruction set, one 32-bit word per instruction, no branches

pub mod memory;
pub mod registers;
pub mod decode;
pub mod execute;

pub use memory::{Memory, MemoryDump, MemoryError, MEMORY_SIZE};
pub use registers::{Registers, REGISTER_COUNT};
pub use decode::{decode, encode, DecodeError, EncodeError, Instruction, Opcode};
pub use execute::{Cpu, CpuError, CpuState, TraceEntry};
