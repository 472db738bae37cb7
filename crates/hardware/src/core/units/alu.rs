//! Integer ALU semantics shared by the execution pipelines.
//!
//! One parameterized path covers every integer-arithmetic kind; the flag
//! rules are:
//! - ADD/ADDL set Overflow on signed overflow (the destination receives the
//!   wrapping sum) and Zero from the result.
//! - SUB/SUBL set Carry when the subtrahend exceeds the minuend and Zero
//!   from the result.
//! - DIV forces a zero result on division by zero (reported, non-fatal) and
//!   sets Zero from the result.
//! - MOVC/MOV and the bitwise kinds leave the flags untouched.

use crate::common::error::Fault;
use crate::core::arch::Flags;
use crate::isa::Opcode;

/// Executes a non-memory integer operation, updating flags per the rules
/// above. Returns the result and any fault to report.
pub fn execute(
    kind: Opcode,
    src1: i32,
    src2: i32,
    imm: i32,
    pc: u32,
    flags: &mut Flags,
) -> (i32, Option<Fault>) {
    match kind {
        Opcode::Movc => (imm, None),
        Opcode::Mov => (src1, None),
        Opcode::Add | Opcode::Addl => {
            let b = if kind == Opcode::Add { src2 } else { imm };
            let (result, overflow) = src1.overflowing_add(b);
            flags.overflow = overflow;
            flags.set_zero_from(result);
            (result, None)
        }
        Opcode::Sub | Opcode::Subl => {
            let b = if kind == Opcode::Sub { src2 } else { imm };
            let result = src1.wrapping_sub(b);
            flags.carry = b > src1;
            flags.set_zero_from(result);
            (result, None)
        }
        Opcode::Div => {
            if src2 == 0 {
                flags.set_zero_from(0);
                (0, Some(Fault::DivideByZero(pc)))
            } else {
                let result = src1.wrapping_div(src2);
                flags.set_zero_from(result);
                (result, None)
            }
        }
        Opcode::And => (src1 & src2, None),
        Opcode::Or => (src1 | src2, None),
        Opcode::Exor => (src1 ^ src2, None),
        _ => (0, None),
    }
}

/// Computes the effective address of a memory operation:
/// `rs1 + imm` for STORE/LOAD, `rs1 + rs2` for STR/LDR.
pub fn effective_address(kind: Opcode, src1: i32, src2: i32, imm: i32) -> i32 {
    match kind {
        Opcode::Store | Opcode::Load => src1.wrapping_add(imm),
        Opcode::Str | Opcode::Ldr => src1.wrapping_add(src2),
        _ => 0,
    }
}

/// Executes a multiply, updating the Zero flag from the result.
pub fn multiply(src1: i32, src2: i32, flags: &mut Flags) -> i32 {
    let result = src1.wrapping_mul(src2);
    flags.set_zero_from(result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Opcode::Add, 5, 7, 0, 12)]
    #[case(Opcode::Addl, 5, 0, 7, 12)]
    #[case(Opcode::Sub, 10, 4, 0, 6)]
    #[case(Opcode::Subl, 10, 0, 4, 6)]
    #[case(Opcode::And, 0b1100, 0b1010, 0, 0b1000)]
    #[case(Opcode::Or, 0b1100, 0b1010, 0, 0b1110)]
    #[case(Opcode::Exor, 0b1100, 0b1010, 0, 0b0110)]
    #[case(Opcode::Div, 15, 4, 0, 3)]
    #[case(Opcode::Movc, 0, 0, 99, 99)]
    #[case(Opcode::Mov, 41, 0, 0, 41)]
    fn results(
        #[case] kind: Opcode,
        #[case] a: i32,
        #[case] b: i32,
        #[case] imm: i32,
        #[case] expect: i32,
    ) {
        let mut flags = Flags::default();
        let (result, fault) = execute(kind, a, b, imm, 4000, &mut flags);
        assert_eq!(result, expect);
        assert!(fault.is_none());
    }

    #[test]
    fn add_overflow_sets_flag_and_wraps() {
        let mut flags = Flags::default();
        let (result, _) = execute(Opcode::Addl, i32::MAX, 0, 1, 4004, &mut flags);
        assert!(flags.overflow);
        assert_eq!(result, i32::MIN);
    }

    #[test]
    fn sub_carry_when_subtrahend_larger() {
        let mut flags = Flags::default();
        let (result, _) = execute(Opcode::Sub, 3, 5, 0, 4000, &mut flags);
        assert!(flags.carry);
        assert_eq!(result, -2);

        let (_, _) = execute(Opcode::Sub, 5, 3, 0, 4000, &mut flags);
        assert!(!flags.carry);
    }

    #[test]
    fn zero_flag_tracks_arithmetic_results() {
        let mut flags = Flags::default();
        let (_, _) = execute(Opcode::Add, 2, -2, 0, 4000, &mut flags);
        assert!(flags.zero);
        let (_, _) = execute(Opcode::Add, 2, 3, 0, 4000, &mut flags);
        assert!(!flags.zero);
    }

    #[test]
    fn bitwise_leaves_flags_alone() {
        let mut flags = Flags {
            zero: true,
            carry: true,
            overflow: true,
            interrupt: false,
        };
        let before = flags;
        let (_, _) = execute(Opcode::And, 0, 0, 0, 4000, &mut flags);
        assert_eq!(flags, before);
    }

    #[test]
    fn divide_by_zero_forces_zero_result() {
        let mut flags = Flags::default();
        let (result, fault) = execute(Opcode::Div, 10, 0, 0, 4008, &mut flags);
        assert_eq!(result, 0);
        assert_eq!(fault, Some(Fault::DivideByZero(4008)));
        assert!(flags.zero);
    }

    #[test]
    fn effective_addresses() {
        assert_eq!(effective_address(Opcode::Store, 8, 0, 16), 24);
        assert_eq!(effective_address(Opcode::Ldr, 8, 12, 0), 20);
    }

    #[test]
    fn multiply_updates_zero() {
        let mut flags = Flags::default();
        assert_eq!(multiply(6, 7, &mut flags), 42);
        assert!(!flags.zero);
        assert_eq!(multiply(6, 0, &mut flags), 0);
        assert!(flags.zero);
    }
}
