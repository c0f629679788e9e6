//! Disassembler.
//!
//! Converts machine words back to source text the assembler accepts.

use crate::cpu::decode::{decode, Instruction};

/// Disassemble a single word to text.
pub fn disassemble_word(word: u32) -> String {
    match decode(word) {
        Ok(decoded) => format_instruction(&decoded),
        Err(_) => format!("??? ; {:08X}", word),
    }
}

/// Disassemble a program into a listing.
pub fn disassemble(words: &[u32]) -> String {
    let mut output = String::new();
    output.push_str("; Disassembly\n");
    output.push_str("; -----------\n\n");

    for (index, &word) in words.iter().enumerate() {
        let line = disassemble_word(word);
        output.push_str(&format!("{:03}: {}  ; {:08X}\n", index, line, word));
    }

    output
}

/// Format a decoded instruction in assembler operand order.
fn format_instruction(instr: &Instruction) -> String {
    match *instr {
        Instruction::LoadConstant { reg, value } => {
            format!("{} {} {}", instr.opcode(), value, reg)
        }
        Instruction::LoadMemory { reg, addr }
        | Instruction::StoreToMemory { reg, addr }
        | Instruction::UnaryMinus { reg, addr } => {
            format!("{} {} {}", instr.opcode(), reg, addr)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::assembler::assemble;
    use crate::cpu::decode::encode;

    #[test]
    fn test_load_constant_operand_order() {
        let word = encode(&Instruction::LoadConstant { reg: 5, value: 10 }).unwrap();
        assert_eq!(disassemble_word(word), "LOAD_CONSTANT 10 5");
    }

    #[test]
    fn test_memory_operand_order() {
        let word = encode(&Instruction::StoreToMemory { reg: 5, addr: 100 }).unwrap();
        assert_eq!(disassemble_word(word), "STORE_TO_MEMORY 5 100");
    }

    #[test]
    fn test_unknown_word() {
        assert_eq!(disassemble_word(0xDEAD_BEEF), "??? ; DEADBEEF");
    }

    #[test]
    fn test_listing() {
        let program = assemble("LOAD_CONSTANT 1 2\nUNARY_MINUS 0 3").unwrap();
        let listing = disassemble(&program.words);

        assert!(listing.contains("000: LOAD_CONSTANT 1 2  ; 1A200001"));
        assert!(listing.contains("001: UNARY_MINUS 0 3  ; 3E000003"));
    }

    #[test]
    fn test_disassembly_reassembles() {
        let source = "LOAD_CONSTANT 65535 31\nLOAD_MEMORY 16 127\nSTORE_TO_MEMORY 0 1048575\nUNARY_MINUS 9 0";
        let first = assemble(source).unwrap();

        let text: Vec<String> = first.words.iter().map(|&w| disassemble_word(w)).collect();
        let second = assemble(&text.join("\n")).unwrap();

        assert_eq!(first.words, second.words);
    }
}
