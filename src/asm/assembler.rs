//! Assembler: source text to 32-bit machine words.
//!
//! Syntax:
//! ```text
//! ; Comment
//! LOAD_CONSTANT 10 5
//! STORE_TO_MEMORY 5 100
//! LOAD_MEMORY 6 100
//! UNARY_MINUS 5 100
//! ```
//!
//! `LOAD_CONSTANT` takes `value register`; the other three take
//! `register address`. `UNARY_MINUS` encodes its register but ignores it.
//!
//! Only whole-line comments are recognized; text after the operands makes the
//! argument count wrong.

use crate::cpu::decode::{
    encode, EncodeError, Instruction, Opcode, ADDRESS_LIMIT, CONSTANT_LIMIT, REG_LIMIT,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::{IntErrorKind, ParseIntError};
use thiserror::Error;
use tracing::{debug, info};

/// Marker that starts a comment line.
pub const COMMENT_MARKER: char = ';';

/// Assemble source code to machine words and their log.
pub fn assemble(source: &str) -> Result<Assembly, AssemblerError> {
    let mut asm = Assembler::new();
    for (line_num, line) in source.lines().enumerate() {
        asm.process_line(line, line_num + 1)?;
    }
    info!(words = asm.output.words.len(), "assembly finished");
    Ok(asm.output)
}

/// Output of a successful assembly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assembly {
    /// Machine words in program order.
    pub words: Vec<u32>,
    /// One entry per word, same order.
    pub log: Vec<AsmLogEntry>,
}

impl Assembly {
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// One assembled source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsmLogEntry {
    /// 1-based source line number.
    pub line: usize,
    /// The trimmed source text.
    pub instruction: String,
    /// The word as 8 uppercase hex digits.
    pub binary: String,
}

/// Operand slot named in range errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Constant,
    Register,
    Address,
}

impl Operand {
    fn limit(self) -> u32 {
        match self {
            Operand::Constant => CONSTANT_LIMIT,
            Operand::Register => REG_LIMIT,
            Operand::Address => ADDRESS_LIMIT,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operand::Constant => "constant value",
            Operand::Register => "register number",
            Operand::Address => "memory address",
        })
    }
}

/// The assembler state.
struct Assembler {
    output: Assembly,
}

impl Assembler {
    fn new() -> Self {
        Self {
            output: Assembly::default(),
        }
    }

    fn process_line(&mut self, line: &str, line_num: usize) -> Result<(), AssemblerError> {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            return Ok(());
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let opcode = Opcode::from_mnemonic(parts[0]).ok_or_else(|| {
            AssemblerError::UnknownInstruction {
                line: line_num,
                mnemonic: parts[0].to_string(),
            }
        })?;

        if parts.len() != 3 {
            return Err(AssemblerError::InvalidArgumentCount {
                line: line_num,
                text: line.to_string(),
            });
        }

        let instr = match opcode {
            Opcode::LoadConstant => {
                let value = parse_operand(parts[1], Operand::Constant, line_num)?;
                let reg = parse_operand(parts[2], Operand::Register, line_num)?;
                Instruction::new(opcode, reg as u8, value)
            }
            Opcode::LoadMemory | Opcode::StoreToMemory | Opcode::UnaryMinus => {
                let reg = parse_operand(parts[1], Operand::Register, line_num)?;
                let addr = parse_operand(parts[2], Operand::Address, line_num)?;
                Instruction::new(opcode, reg as u8, addr)
            }
        };

        let word = encode(&instr).map_err(|e| AssemblerError::from_encode(line_num, e))?;
        self.emit(word, line, line_num);
        Ok(())
    }

    fn emit(&mut self, word: u32, line: &str, line_num: usize) {
        let binary = format!("{:08X}", word);
        debug!(line = line_num, %binary, "{}", line);
        self.output.words.push(word);
        self.output.log.push(AsmLogEntry {
            line: line_num,
            instruction: line.to_string(),
            binary,
        });
    }
}

/// Parse a signed decimal token and check it against the slot's range.
fn parse_operand(token: &str, operand: Operand, line_num: usize) -> Result<u32, AssemblerError> {
    let limit = operand.limit();
    let out_of_range = || AssemblerError::ValueOutOfRange {
        line: line_num,
        operand,
        value: token.to_string(),
        limit,
    };

    let value: i64 = token.parse().map_err(|e: ParseIntError| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => out_of_range(),
        _ => AssemblerError::InvalidNumber {
            line: line_num,
            token: token.to_string(),
        },
    })?;

    if value < 0 || value >= i64::from(limit) {
        return Err(out_of_range());
    }
    Ok(value as u32)
}

/// Errors that can occur during assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblerError {
    #[error("unknown instruction '{mnemonic}' on line {line}")]
    UnknownInstruction { line: usize, mnemonic: String },

    #[error("invalid number of arguments on line {line}: {text}")]
    InvalidArgumentCount { line: usize, text: String },

    #[error("invalid number '{token}' on line {line}")]
    InvalidNumber { line: usize, token: String },

    #[error("invalid {operand} on line {line}: {value} (expected 0 to {max})", max = .limit - 1)]
    ValueOutOfRange {
        line: usize,
        operand: Operand,
        /// The operand as written in the source.
        value: String,
        limit: u32,
    },
}

impl AssemblerError {
    /// 1-based source line the error refers to.
    pub fn line(&self) -> usize {
        match self {
            AssemblerError::UnknownInstruction { line, .. }
            | AssemblerError::InvalidArgumentCount { line, .. }
            | AssemblerError::InvalidNumber { line, .. }
            | AssemblerError::ValueOutOfRange { line, .. } => *line,
        }
    }

    /// Report a field the encoder refused as the operand that overflowed.
    ///
    /// `parse_operand` bounds every field by the same limits `encode` checks,
    /// so this only fires if the two ever disagree.
    fn from_encode(line: usize, err: EncodeError) -> Self {
        let (operand, value, limit) = match err {
            EncodeError::RegisterOverflow(reg) => (Operand::Register, reg.to_string(), REG_LIMIT),
            EncodeError::OperandOverflow(operand) => {
                (Operand::Address, operand.to_string(), ADDRESS_LIMIT)
            }
        };
        AssemblerError::ValueOutOfRange {
            line,
            operand,
            value,
            limit,
        }
    }
}
