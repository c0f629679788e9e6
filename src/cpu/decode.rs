//! Instruction set: opcodes, word layout, encoder and decoder.
//!
//! Every instruction is one 32-bit word:
//!
//! ```text
//!  31        25 24    20 19                    0
//! +------------+--------+-----------------------+
//! |  opcode(7) | reg(5) |      operand(20)      |
//! +------------+--------+-----------------------+
//! ```
//!
//! The operand is an immediate for `LOAD_CONSTANT` and a memory address for
//! the other three instructions. Both the assembler and the CPU go through
//! [`Opcode`], [`encode`] and [`decode`]; nothing else knows the numbers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bit position of the opcode field.
pub const OPCODE_SHIFT: u32 = 25;
/// Width mask of the opcode field (7 bits).
pub const OPCODE_MASK: u32 = 0x7F;
/// Bit position of the register field.
pub const REG_SHIFT: u32 = 20;
/// Width mask of the register field (5 bits).
pub const REG_MASK: u32 = 0x1F;
/// Width mask of the operand field (20 bits).
pub const OPERAND_MASK: u32 = 0xF_FFFF;

/// Exclusive upper bound of a register index.
pub const REG_LIMIT: u32 = REG_MASK + 1;
/// Exclusive upper bound of an address operand.
pub const ADDRESS_LIMIT: u32 = OPERAND_MASK + 1;
/// Exclusive upper bound of a `LOAD_CONSTANT` immediate.
pub const CONSTANT_LIMIT: u32 = 1 << 16;

/// The four operations of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Opcode {
    /// `registers[reg] = operand`
    LoadConstant = 13,
    /// `registers[reg] = memory[operand]`
    LoadMemory = 11,
    /// `memory[operand] = registers[reg]`
    StoreToMemory = 21,
    /// `memory[operand] = -memory[operand]`
    UnaryMinus = 31,
}

impl Opcode {
    pub const ALL: [Opcode; 4] = [
        Opcode::LoadConstant,
        Opcode::LoadMemory,
        Opcode::StoreToMemory,
        Opcode::UnaryMinus,
    ];

    /// Numeric code stored in the opcode field.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Source-text spelling.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::LoadConstant => "LOAD_CONSTANT",
            Opcode::LoadMemory => "LOAD_MEMORY",
            Opcode::StoreToMemory => "STORE_TO_MEMORY",
            Opcode::UnaryMinus => "UNARY_MINUS",
        }
    }

    /// Look up an opcode by its exact (case-sensitive) mnemonic.
    pub fn from_mnemonic(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == text)
    }
}

impl TryFrom<u8> for Opcode {
    type Error = DecodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|op| op.code() == code)
            .ok_or(DecodeError::InvalidOpcode(code))
    }
}

impl FromStr for Opcode {
    type Err = UnknownMnemonic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_mnemonic(s).ok_or_else(|| UnknownMnemonic(s.to_string()))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// A mnemonic that names no [`Opcode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown mnemonic: {0}")]
pub struct UnknownMnemonic(pub String);

/// Decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instruction {
    /// Load an immediate into a register.
    LoadConstant { reg: u8, value: u32 },
    /// Load a memory cell into a register.
    LoadMemory { reg: u8, addr: u32 },
    /// Store a register into a memory cell.
    StoreToMemory { reg: u8, addr: u32 },
    /// Negate a memory cell in place. The register field is carried but unused.
    UnaryMinus { reg: u8, addr: u32 },
}

impl Instruction {
    /// Build an instruction from its opcode and raw fields.
    pub fn new(opcode: Opcode, reg: u8, operand: u32) -> Self {
        match opcode {
            Opcode::LoadConstant => Instruction::LoadConstant { reg, value: operand },
            Opcode::LoadMemory => Instruction::LoadMemory { reg, addr: operand },
            Opcode::StoreToMemory => Instruction::StoreToMemory { reg, addr: operand },
            Opcode::UnaryMinus => Instruction::UnaryMinus { reg, addr: operand },
        }
    }

    pub fn opcode(&self) -> Opcode {
        match self {
            Instruction::LoadConstant { .. } => Opcode::LoadConstant,
            Instruction::LoadMemory { .. } => Opcode::LoadMemory,
            Instruction::StoreToMemory { .. } => Opcode::StoreToMemory,
            Instruction::UnaryMinus { .. } => Opcode::UnaryMinus,
        }
    }

    pub fn reg(&self) -> u8 {
        match *self {
            Instruction::LoadConstant { reg, .. }
            | Instruction::LoadMemory { reg, .. }
            | Instruction::StoreToMemory { reg, .. }
            | Instruction::UnaryMinus { reg, .. } => reg,
        }
    }

    /// The 20-bit operand: immediate or address.
    pub fn operand(&self) -> u32 {
        match *self {
            Instruction::LoadConstant { value, .. } => value,
            Instruction::LoadMemory { addr, .. }
            | Instruction::StoreToMemory { addr, .. }
            | Instruction::UnaryMinus { addr, .. } => addr,
        }
    }
}

/// Decode a 32-bit instruction word.
///
/// Register and operand fields are masked to their widths, so any word with a
/// known opcode decodes.
pub fn decode(word: u32) -> Result<Instruction, DecodeError> {
    let code = ((word >> OPCODE_SHIFT) & OPCODE_MASK) as u8;
    let reg = ((word >> REG_SHIFT) & REG_MASK) as u8;
    let operand = word & OPERAND_MASK;

    let opcode = Opcode::try_from(code)?;
    Ok(Instruction::new(opcode, reg, operand))
}

/// Encode an instruction into a 32-bit word.
///
/// Fields that do not fit their bit width are rejected rather than truncated.
pub fn encode(instr: &Instruction) -> Result<u32, EncodeError> {
    let reg = u32::from(instr.reg());
    if reg >= REG_LIMIT {
        return Err(EncodeError::RegisterOverflow(instr.reg()));
    }
    let operand = instr.operand();
    if operand > OPERAND_MASK {
        return Err(EncodeError::OperandOverflow(operand));
    }

    Ok((u32::from(instr.opcode().code()) << OPCODE_SHIFT) | (reg << REG_SHIFT) | operand)
}

/// Errors that can occur during instruction decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("invalid opcode: {0}")]
    InvalidOpcode(u8),
}

/// Errors that can occur during instruction encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("register index {0} does not fit the 5-bit register field")]
    RegisterOverflow(u8),

    #[error("operand {0} does not fit the 20-bit operand field")]
    OperandOverflow(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_codes() {
        assert_eq!(Opcode::LoadConstant.code(), 13);
        assert_eq!(Opcode::LoadMemory.code(), 11);
        assert_eq!(Opcode::StoreToMemory.code(), 21);
        assert_eq!(Opcode::UnaryMinus.code(), 31);
    }

    #[test]
    fn test_mnemonic_lookup() {
        for op in Opcode::ALL {
            assert_eq!(op.mnemonic().parse::<Opcode>().unwrap(), op);
            assert_eq!(Opcode::try_from(op.code()).unwrap(), op);
        }
        assert!("load_constant".parse::<Opcode>().is_err());
        assert_eq!(Opcode::try_from(12), Err(DecodeError::InvalidOpcode(12)));
    }

    #[test]
    fn test_encode_layout() {
        let word = encode(&Instruction::LoadConstant { reg: 5, value: 10 }).unwrap();
        assert_eq!(word, (13 << 25) | (5 << 20) | 10);
        assert_eq!(format!("{:08X}", word), "1A50000A");
    }

    #[test]
    fn test_high_register_does_not_touch_opcode() {
        let word = encode(&Instruction::StoreToMemory { reg: 31, addr: 0 }).unwrap();
        assert_eq!(word >> 25, 21);
        assert_eq!(decode(word).unwrap(), Instruction::StoreToMemory { reg: 31, addr: 0 });
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let test_cases = [
            Instruction::LoadConstant { reg: 0, value: 0 },
            Instruction::LoadConstant { reg: 31, value: 65535 },
            Instruction::LoadMemory { reg: 7, addr: 127 },
            Instruction::StoreToMemory { reg: 16, addr: OPERAND_MASK },
            Instruction::UnaryMinus { reg: 15, addr: 100 },
        ];

        for instr in test_cases {
            let word = encode(&instr).unwrap();
            assert_eq!(decode(word).unwrap(), instr);
        }
    }

    #[test]
    fn test_encode_rejects_wide_fields() {
        assert_eq!(
            encode(&Instruction::LoadMemory { reg: 32, addr: 0 }),
            Err(EncodeError::RegisterOverflow(32))
        );
        assert_eq!(
            encode(&Instruction::UnaryMinus { reg: 0, addr: 1 << 20 }),
            Err(EncodeError::OperandOverflow(1 << 20))
        );
    }

    #[test]
    fn test_decode_unknown_opcode() {
        assert_eq!(decode(0), Err(DecodeError::InvalidOpcode(0)));
        assert_eq!(decode(12 << 25), Err(DecodeError::InvalidOpcode(12)));
    }

    #[test]
    fn test_decode_masks_operand() {
        let word = (13 << 25) | (3 << 20) | OPERAND_MASK;
        assert_eq!(
            decode(word).unwrap(),
            Instruction::LoadConstant { reg: 3, value: 0xF_FFFF }
        );
    }
}
