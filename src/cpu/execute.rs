//! CPU execution engine.
//!
//! Implements the fetch-decode-execute cycle over a straight-line program.
//! There are no jumps: the program counter is the index into the word slice.

use crate::cpu::decode::{self, DecodeError, Instruction, Opcode};
use crate::cpu::memory::{MemoryDump, MemoryError};
use crate::cpu::{Memory, Registers};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// CPU execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CpuState {
    /// Fresh or reset; no program has finished yet.
    Ready,
    /// The last program ran to its end.
    Completed,
    /// An instruction failed. Cleared only by [`Cpu::reset`].
    Faulted,
}

/// One execution log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Position of the instruction in the program.
    pub index: usize,
    pub opcode: Opcode,
    /// What the instruction did, in words.
    pub description: String,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.index, self.opcode, self.description)
    }
}

/// The interpreter. Owns its registers, memory and execution log.
#[derive(Clone, Serialize, Deserialize)]
pub struct Cpu {
    /// CPU registers.
    pub regs: Registers,
    /// Data memory.
    pub mem: Memory,
    /// Current execution state.
    pub state: CpuState,
    /// Successfully executed instructions since the last reset.
    pub cycles: u64,
    log: Vec<TraceEntry>,
}

impl Cpu {
    /// Create a new CPU with zeroed state.
    pub fn new() -> Self {
        Self {
            regs: Registers::new(),
            mem: Memory::new(),
            state: CpuState::Ready,
            cycles: 0,
            log: Vec::new(),
        }
    }

    /// Reset the CPU to initial state, discarding the log.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.mem.clear();
        self.state = CpuState::Ready;
        self.cycles = 0;
        self.log.clear();
    }

    /// Run a whole program, index 0 first.
    ///
    /// Stops at the first failing instruction. Everything done before it
    /// stays in registers, memory and the log.
    ///
    /// Returns the number of instructions executed.
    pub fn run(&mut self, program: &[u32]) -> Result<u64, CpuError> {
        let start_cycles = self.cycles;

        for (index, &word) in program.iter().enumerate() {
            self.step(index, word)?;
        }

        self.state = CpuState::Completed;
        let executed = self.cycles - start_cycles;
        info!(executed, "program completed");
        Ok(executed)
    }

    /// Execute a single word found at `index` of the program.
    ///
    /// Returns the instruction that was executed, or an error.
    pub fn step(&mut self, index: usize, word: u32) -> Result<Instruction, CpuError> {
        if self.state == CpuState::Faulted {
            return Err(CpuError::Faulted);
        }

        let instr = match decode::decode(word) {
            Ok(instr) => instr,
            Err(DecodeError::InvalidOpcode(opcode)) => {
                return Err(self.fault(CpuError::UnknownOpcode { index, opcode }));
            }
        };

        let description = match self.execute(instr) {
            Ok(description) => description,
            Err(source) => {
                return Err(self.fault(CpuError::AddressOutOfRange {
                    index,
                    opcode: instr.opcode(),
                    source,
                }));
            }
        };

        debug!(index, opcode = %instr.opcode(), "{}", description);
        self.log.push(TraceEntry {
            index,
            opcode: instr.opcode(),
            description,
        });
        self.cycles += 1;

        Ok(instr)
    }

    /// Apply an instruction and describe what it did.
    fn execute(&mut self, instr: Instruction) -> Result<String, MemoryError> {
        let description = match instr {
            Instruction::LoadConstant { reg, value } => {
                // The operand field is 20 bits wide, so it always fits.
                self.regs.set(reg, value as i32);
                format!("Loaded {} into register[{}].", value, reg)
            }

            Instruction::LoadMemory { reg, addr } => {
                let value = self.mem.read(addr)?;
                self.regs.set(reg, value);
                format!("Loaded memory[{}] = {} into register[{}].", addr, value, reg)
            }

            Instruction::StoreToMemory { reg, addr } => {
                let value = self.regs.get(reg);
                self.mem.write(addr, value)?;
                format!("Stored register[{}] = {} into memory[{}].", reg, value, addr)
            }

            Instruction::UnaryMinus { addr, .. } => {
                let original = self.mem.read(addr)?;
                let negated = original.wrapping_neg();
                self.mem.write(addr, negated)?;
                format!(
                    "Negated memory[{}] (original value: {}) -> {}.",
                    addr, original, negated
                )
            }
        };

        Ok(description)
    }

    fn fault(&mut self, err: CpuError) -> CpuError {
        warn!(error = %err, "execution failed");
        self.state = CpuState::Faulted;
        err
    }

    /// Execution log, oldest first.
    pub fn log(&self) -> &[TraceEntry] {
        &self.log
    }

    /// Move the execution log out, leaving it empty.
    pub fn take_log(&mut self) -> Vec<TraceEntry> {
        std::mem::take(&mut self.log)
    }

    /// Every memory cell, in address order.
    pub fn snapshot(&self) -> MemoryDump {
        self.mem.snapshot()
    }

    pub fn is_completed(&self) -> bool {
        self.state == CpuState::Completed
    }

    pub fn is_faulted(&self) -> bool {
        self.state == CpuState::Faulted
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Cpu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cpu")
            .field("state", &self.state)
            .field("cycles", &self.cycles)
            .field("mem", &self.mem)
            .finish()
    }
}

/// Errors that can occur during CPU execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("{opcode} failed at index {index}: {source}")]
    AddressOutOfRange {
        index: usize,
        opcode: Opcode,
        #[source]
        source: MemoryError,
    },

    #[error("unknown opcode {opcode} at index {index}")]
    UnknownOpcode { index: usize, opcode: u8 },

    #[error("CPU is faulted; reset it before running again")]
    Faulted,
}

impl CpuError {
    /// Program index of the failing instruction, if there was one.
    pub fn index(&self) -> Option<usize> {
        match self {
            CpuError::AddressOutOfRange { index, .. } | CpuError::UnknownOpcode { index, .. } => {
                Some(*index)
            }
            CpuError::Faulted => None,
        }
    }
}
