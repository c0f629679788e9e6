//! JSON reports: assembly log, execution trace and memory dump.

use crate::asm::AsmLogEntry;
use crate::cpu::{MemoryDump, TraceEntry};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Render any report as JSON indented by four spaces.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ReportError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut ser)
        .map_err(|e| ReportError::Json(e.to_string()))?;
    String::from_utf8(buf).map_err(|e| ReportError::Json(e.to_string()))
}

fn write_json<T: Serialize + ?Sized, P: AsRef<Path>>(path: P, value: &T) -> Result<(), ReportError> {
    let json = to_json(value)?;
    let mut file =
        std::fs::File::create(path.as_ref()).map_err(|e| ReportError::IoError(e.to_string()))?;
    file.write_all(json.as_bytes())
        .map_err(|e| ReportError::IoError(e.to_string()))
}

/// Write the assembly log.
pub fn write_assembly_log<P: AsRef<Path>>(path: P, log: &[AsmLogEntry]) -> Result<(), ReportError> {
    write_json(path, log)
}

/// Write the execution trace.
pub fn write_trace<P: AsRef<Path>>(path: P, trace: &[TraceEntry]) -> Result<(), ReportError> {
    write_json(path, trace)
}

/// Write the memory dump.
pub fn write_memory_dump<P: AsRef<Path>>(path: P, dump: &MemoryDump) -> Result<(), ReportError> {
    write_json(path, dump)
}

/// Errors that can occur while writing reports.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    IoError(String),

    #[error("JSON error: {0}")]
    Json(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::assemble;
    use crate::cpu::{Cpu, Opcode};

    #[test]
    fn test_assembly_log_json() {
        let program = assemble("LOAD_CONSTANT 10 5").unwrap();
        let json = to_json(&program.log).unwrap();

        assert_eq!(
            json,
            "[\n    {\n        \"line\": 1,\n        \"instruction\": \"LOAD_CONSTANT 10 5\",\n        \"binary\": \"1A50000A\"\n    }\n]"
        );
    }

    #[test]
    fn test_trace_json_uses_mnemonics() {
        let trace = vec![TraceEntry {
            index: 0,
            opcode: Opcode::StoreToMemory,
            description: "Stored register[1] = 0 into memory[2].".into(),
        }];

        let value: serde_json::Value = serde_json::from_str(&to_json(&trace).unwrap()).unwrap();
        assert_eq!(value[0]["opcode"], "STORE_TO_MEMORY");
        assert_eq!(value[0]["index"], 0);
    }

    #[test]
    fn test_memory_dump_json() {
        let mut cpu = Cpu::new();
        cpu.run(&assemble("LOAD_CONSTANT 10 5\nSTORE_TO_MEMORY 5 100").unwrap().words)
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&to_json(&cpu.snapshot()).unwrap()).unwrap();
        let map = value.as_object().unwrap();

        assert_eq!(map.len(), 128);
        assert_eq!(map["address_100"], 10);
        assert_eq!(map["address_0"], 0);
    }

    #[test]
    fn test_write_files() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("quad-dump-{}.json", std::process::id()));

        write_memory_dump(&path, &Cpu::new().snapshot()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(text.starts_with("{\n    \"address_0\": 0,"));
    }
}
