//! Assembler, disassembler and binary images.
//!
//! This module provides:
//! - A single-pass assembler (text → machine words + assembly log)
//! - A disassembler (machine words → readable text)
//! - The big-endian binary image format

pub mod assembler;
pub mod disasm;
pub mod image;

pub use assembler::{assemble, AsmLogEntry, Assembly, AssemblerError};
pub use disasm::{disassemble, disassemble_word};
pub use image::{load_image, save_image, ImageError};
