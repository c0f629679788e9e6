//! # quad
//!
//! A two-stage toolchain for a tiny register/memory machine.
//!
//! The assembler turns a line-oriented source language with four
//! instructions into 32-bit machine words. The CPU runs those words against
//! 32 registers and 128 memory cells and records what each instruction did.
//! The two halves share nothing but the instruction set in [`cpu::decode`].

pub mod cpu;
pub mod asm;
pub mod report;

// Re-export commonly used types
pub use cpu::{Cpu, CpuError, CpuState, Instruction, Memory, MemoryDump, Opcode, Registers, TraceEntry};
pub use asm::{assemble, disassemble, AsmLogEntry, Assembly, AssemblerError, load_image, save_image};
