//! Human-readable per-cycle trace and state dumps.
//!
//! One block per cycle: a header, one line per pipeline latch, and the
//! issue queue, load/store queue, reorder buffer, and rename table. The
//! final state dump (display mode) adds the flags, the register file with
//! its in-flight writer counts, and the first 100 memory words.

use crate::common::constants::MEMORY_DUMP_WORDS;
use crate::core::Machine;
use crate::core::units::FuOp;
use crate::isa::{Instruction, Program};

/// Prints the code memory listing once at load.
pub fn print_program(program: &Program) {
    eprintln!("Loaded {} instructions", program.len());
    println!("{:<9} {:<9} {:<9} {:<9} {:<9}", "opcode", "rd", "rs1", "rs2", "imm");
    for inst in program.iter() {
        println!(
            "{:<9} {:<9} {:<9} {:<9} {:<9}",
            inst.kind.mnemonic(),
            inst.rd,
            inst.rs1,
            inst.rs2,
            inst.imm
        );
    }
}

/// Prints one per-cycle trace block.
pub fn print_cycle(m: &Machine) {
    println!("\n--------------------------------");
    println!("Clock Cycle #: {}", m.clock);
    println!("{:<15}: Executed: Instruction", "Stage");
    println!("--------------------------------");

    let fetch = m.frontend.fetch.as_ref().map(|f| (f.pc, f.inst, true));
    print_stage("Fetch", fetch, m.frontend.fetch_stalled);

    let decode = m
        .frontend
        .decode
        .as_ref()
        .map(|d| (d.pc, d.inst, d.renamed));
    print_stage("Decode/RF", decode, m.frontend.decode_stalled);

    print_stage("Int FU One", fu_view(m.int_fu.stage(0)), false);
    print_stage("Int FU Two", fu_view(m.int_fu.stage(1)), false);
    print_stage("Mul FU One", fu_view(m.mul_fu.stage(0)), false);
    print_stage("Mul FU Two", fu_view(m.mul_fu.stage(1)), false);
    print_stage("Mul FU Three", fu_view(m.mul_fu.stage(2)), false);
    print_stage("Branch FU", fu_view(m.branch_fu.stage()), false);

    let mem = m
        .mem_fu
        .in_flight()
        .map(|(op, _)| (op.pc, op.inst, true));
    print_stage("Mem FU", mem, false);

    print_iq(m);
    print_lsq(m);
    print_rob(m);
    print_rename(m);
}

/// Prints the final architectural state (display mode).
pub fn print_state(m: &Machine) {
    println!("\n============ STATE OF CPU FLAGS ============");
    println!("Flags::  ZeroFlag, CarryFlag, OverflowFlag, InterruptFlag");
    println!(
        "Values:: {}\t|\t{}\t|\t{}\t|\t{}",
        i32::from(m.flags.zero),
        i32::from(m.flags.carry),
        i32::from(m.flags.overflow),
        i32::from(m.flags.interrupt)
    );

    println!("\n============ STATE OF ARCHITECTURAL REGISTER FILE ============");
    println!("NOTE :: 0 Means Valid & >0 Means In-Flight Writers");
    println!("Registers, Values, Invalid");
    for i in 0..32 {
        println!(
            "R{i:02}\t|\t{:02}\t|\t{}",
            m.regs.read(i),
            m.regs.pending_writers(i)
        );
    }

    println!("\n============ STATE OF DATA MEMORY ============");
    println!("Mem Location, Values");
    for i in 0..MEMORY_DUMP_WORDS.min(m.dmem.len()) {
        println!("M{i:02}\t|\t{:02}", m.dmem.word(i));
    }
    println!();
}

fn fu_view(op: Option<&FuOp>) -> Option<(u32, Instruction, bool)> {
    op.map(|op| (op.pc, op.inst, true))
}

fn print_stage(name: &str, content: Option<(u32, Instruction, bool)>, stalled: bool) {
    match content {
        Some((pc, inst, executed)) => {
            let status = if stalled { " ---> STALLED" } else { "" };
            println!("{name:<15}: {}: pc({pc}) {inst}{status}", i32::from(executed));
        }
        None => println!("{name:<15}: 0: pc(0)  ---> EMPTY"),
    }
}

fn print_iq(m: &Machine) {
    println!("\n============ STATE OF ISSUE QUEUE ============");
    println!("Index, Status, OpCode, Rd-tag, StoreData-value-ready, Rs1-value-ready, Rs2-value-ready, Literal, LSQ Index, Age");
    for i in 0..m.iq.capacity() {
        match m.iq.slot(i) {
            Some(e) => {
                let tag = e.dest_tag.map_or(-1, |t| t.0 as i64);
                let lsq = e.lsq_index.map_or(-1, |x| x as i64);
                println!(
                    "{i:02}\t|\t1\t|\t{:<5}\t|\tP{tag}\t|\t{}-{}\t|\tR{:02}-{}-{}\t|\tR{:02}-{}-{}\t|\t#{}\t|\t{lsq}\t|\t{}",
                    e.inst.kind.mnemonic(),
                    e.store_src.value,
                    i32::from(e.store_src.ready),
                    e.src1.reg,
                    e.src1.value,
                    i32::from(e.src1.ready),
                    e.src2.reg,
                    e.src2.value,
                    i32::from(e.src2.ready),
                    e.inst.imm,
                    e.age
                );
            }
            None => println!("{i:02}\t|\t0\t|"),
        }
    }
}

fn print_lsq(m: &Machine) {
    println!("\n============ STATE OF LOAD STORE QUEUE ============");
    println!("Index, Status, OpCode, Mem Valid, Mem Addr, Data Ready, Data, Age");
    for i in 0..m.lsq.capacity() {
        match m.lsq.slot(i) {
            Some(e) => {
                println!(
                    "{i:02}\t|\t1\t|\t{:<5}\t|\t{}\t|\t{}\t|\t{}\t|\t{}\t|\t{}",
                    e.inst.kind.mnemonic(),
                    i32::from(e.addr.is_some()),
                    e.addr.unwrap_or(-1),
                    i32::from(e.data.ready),
                    e.data.value,
                    e.age
                );
            }
            None => println!("{i:02}\t|\t0\t|"),
        }
    }
}

fn print_rob(m: &Machine) {
    println!("\n============ STATE OF REORDER BUFFER ============");
    println!(
        "head({}) tail({}) length({})",
        m.rob.head_index(),
        m.rob.tail_index(),
        m.rob.len()
    );
    println!("Index, Status, OpCode, PC, Rd, Rd-value, Ready, Exception");
    for i in 0..m.rob.capacity() {
        let e = m.rob.entry_at(i);
        if e.valid {
            println!(
                "{i:02}\t|\t1\t|\t{:<5}\t|\tpc({})\t|\tR{:02}\t|\t{}\t|\t{}\t|\t{}",
                e.kind.mnemonic(),
                e.pc,
                e.dest_arch,
                e.value,
                i32::from(e.ready),
                i32::from(e.taken)
            );
        } else {
            println!("{i:02}\t|\t0\t|");
        }
    }
}

fn print_rename(m: &Machine) {
    println!("\n============ STATE OF RENAME TABLE ============");
    println!("Index, Valid, Arch Reg");
    for i in 0..m.rename.capacity() {
        match m.rename.slot(i) {
            Some(arch) => println!("{i:02}\t|\t1\t|\tR{arch:02}"),
            None => println!("{i:02}\t|\t0\t|"),
        }
    }
}
