//! Program text parser.
//!
//! One instruction per line, comma-separated:
//! `OPCODE,ARG1[,ARG2[,ARG3]]`. Registers are written `R` followed by a
//! decimal index, literals `#` followed by a signed decimal. Trailing `\r`
//! and `\n` are stripped, blank lines are skipped, and an unknown mnemonic
//! is coerced to NOP with a diagnostic.

use std::fs;
use std::path::Path;

use crate::common::error::{Fault, SimError};
use crate::isa::{Instruction, Opcode, Program};

/// Loads and parses a program file.
pub fn load_program(path: &Path) -> Result<Program, SimError> {
    let text = fs::read_to_string(path).map_err(|source| SimError::ProgramRead {
        path: path.to_path_buf(),
        source,
    })?;

    let insts: Vec<Instruction> = text.lines().filter_map(parse_line).collect();
    if insts.is_empty() {
        return Err(SimError::EmptyProgram {
            path: path.to_path_buf(),
        });
    }
    Ok(Program::new(insts))
}

/// Parses one program line. Returns `None` for blank lines.
pub fn parse_line(line: &str) -> Option<Instruction> {
    let line = line.trim_end_matches(['\r', '\n']).trim();
    if line.is_empty() {
        return None;
    }

    let mut tokens = line.split(',').map(str::trim);
    let mnemonic = tokens.next()?;
    let mut args = tokens;

    let kind = match mnemonic {
        "STORE" => Opcode::Store,
        "STR" => Opcode::Str,
        "LOAD" => Opcode::Load,
        "LDR" => Opcode::Ldr,
        "MOVC" => Opcode::Movc,
        "MOV" => Opcode::Mov,
        "ADD" => Opcode::Add,
        "ADDL" => Opcode::Addl,
        "SUB" => Opcode::Sub,
        "SUBL" => Opcode::Subl,
        "MUL" => Opcode::Mul,
        "DIV" => Opcode::Div,
        "AND" => Opcode::And,
        "OR" => Opcode::Or,
        "EX-OR" => Opcode::Exor,
        "BZ" => Opcode::Bz,
        "BNZ" => Opcode::Bnz,
        "JUMP" => Opcode::Jump,
        "HALT" => Opcode::Halt,
        "NOP" => Opcode::Nop,
        other => {
            Fault::UnknownOpcode(other.to_string()).report();
            return Some(Instruction {
                kind: Opcode::Nop,
                ..Instruction::default()
            });
        }
    };

    let mut inst = Instruction {
        kind,
        ..Instruction::default()
    };
    match kind {
        Opcode::Store | Opcode::Load => {
            inst.rd = reg(args.next());
            inst.rs1 = reg(args.next());
            inst.imm = literal(args.next());
        }
        Opcode::Str | Opcode::Ldr
        | Opcode::Add
        | Opcode::Sub
        | Opcode::Mul
        | Opcode::Div
        | Opcode::And
        | Opcode::Or
        | Opcode::Exor => {
            inst.rd = reg(args.next());
            inst.rs1 = reg(args.next());
            inst.rs2 = reg(args.next());
        }
        Opcode::Movc => {
            inst.rd = reg(args.next());
            inst.imm = literal(args.next());
        }
        Opcode::Mov => {
            inst.rd = reg(args.next());
            inst.rs1 = reg(args.next());
        }
        Opcode::Addl | Opcode::Subl => {
            inst.rd = reg(args.next());
            inst.rs1 = reg(args.next());
            inst.imm = literal(args.next());
        }
        Opcode::Bz | Opcode::Bnz => {
            inst.imm = literal(args.next());
        }
        Opcode::Jump => {
            inst.rs1 = reg(args.next());
            inst.imm = literal(args.next());
        }
        Opcode::Halt | Opcode::Nop => {}
    }
    Some(inst)
}

/// Parses `R<index>`; anything else reads as register zero.
fn reg(token: Option<&str>) -> usize {
    token
        .and_then(|t| t.strip_prefix('R'))
        .and_then(|t| t.parse().ok())
        .unwrap_or(0)
}

/// Parses `#<signed decimal>`; anything else reads as zero.
fn literal(token: Option<&str>) -> i32 {
    token
        .and_then(|t| t.strip_prefix('#'))
        .and_then(|t| t.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn parses_operand_shapes() {
        assert_eq!(
            parse_line("STORE,R1,R2,#16"),
            Some(Instruction {
                kind: Opcode::Store,
                rd: 1,
                rs1: 2,
                rs2: 0,
                imm: 16
            })
        );
        assert_eq!(
            parse_line("ADD,R3,R1,R2"),
            Some(Instruction {
                kind: Opcode::Add,
                rd: 3,
                rs1: 1,
                rs2: 2,
                imm: 0
            })
        );
        assert_eq!(
            parse_line("MOVC,R1,#-5"),
            Some(Instruction {
                kind: Opcode::Movc,
                rd: 1,
                rs1: 0,
                rs2: 0,
                imm: -5
            })
        );
        assert_eq!(
            parse_line("BZ,#8"),
            Some(Instruction {
                kind: Opcode::Bz,
                rd: 0,
                rs1: 0,
                rs2: 0,
                imm: 8
            })
        );
        assert_eq!(
            parse_line("JUMP,R4,#12"),
            Some(Instruction {
                kind: Opcode::Jump,
                rd: 0,
                rs1: 4,
                rs2: 0,
                imm: 12
            })
        );
        assert_eq!(
            parse_line("EX-OR,R5,R6,R7").map(|i| i.kind),
            Some(Opcode::Exor)
        );
    }

    #[test]
    fn strips_line_endings_and_blanks() {
        assert_eq!(parse_line("HALT\r\n").map(|i| i.kind), Some(Opcode::Halt));
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line(""), None);
    }

    #[test]
    fn unknown_opcode_becomes_nop() {
        assert_eq!(
            parse_line("FROB,R1,R2").map(|i| i.kind),
            Some(Opcode::Nop)
        );
    }

    #[test]
    fn loads_a_program_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "MOVC,R1,#5").unwrap();
        writeln!(file, "MOVC,R2,#7").unwrap();
        writeln!(file, "ADD,R3,R1,R2").unwrap();
        writeln!(file, "HALT").unwrap();

        let program = load_program(file.path()).unwrap();
        assert_eq!(program.len(), 4);
        assert_eq!(program.fetch(4008).map(|i| i.kind), Some(Opcode::Add));
    }

    #[test]
    fn empty_file_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            load_program(file.path()),
            Err(SimError::EmptyProgram { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(matches!(
            load_program(Path::new("/nonexistent/prog.asm")),
            Err(SimError::ProgramRead { .. })
        ));
    }
}
