//! Pure-data opcode descriptor tables: the sub-code-to-operation-kind
//! mappings used by the BRU and ALU decoders.
//!
//! Indices 10..16 of the comparator table and 13..16 of each ALU table
//! are reserved and decode as illegal.

use crate::core::operation::{AluOp, Comparator};

/// Branch comparator table, indexed by the 4-bit comparator field of a
/// `Bcc` instruction. `None` marks a reserved, illegal index.
pub const COMPARATORS: [Option<Comparator>; 16] = [
    Some(Comparator::Bne),
    Some(Comparator::Beq),
    Some(Comparator::Bl),
    Some(Comparator::Ble),
    Some(Comparator::Bg),
    Some(Comparator::Bge),
    Some(Comparator::Bls),
    Some(Comparator::Bles),
    Some(Comparator::Bgs),
    Some(Comparator::Bges),
    None,
    None,
    None,
    None,
    None,
    None,
];

/// ALU reg-reg-reg opcode table (the `category == 0, type == 0` ALU
/// sub-family).
pub const ALU_REG_REG_REG: [Option<AluOp>; 16] = alu_table();

/// ALU reg-reg-imm opcode table (`category == 1`). Shares the same
/// `AluOp` enumeration and reserved tail as [`ALU_REG_REG_REG`].
pub const ALU_REG_REG_IMM: [Option<AluOp>; 16] = alu_table();

/// ALU reg-imm (quick-immediate) opcode table (`category == 2`).
pub const ALU_REG_IMM: [Option<AluOp>; 16] = alu_table();

const fn alu_table() -> [Option<AluOp>; 16] {
    [
        Some(AluOp::Add),
        Some(AluOp::Sub),
        Some(AluOp::Muls),
        Some(AluOp::Mulu),
        Some(AluOp::Divs),
        Some(AluOp::Divu),
        Some(AluOp::And),
        Some(AluOp::Or),
        Some(AluOp::Xor),
        Some(AluOp::Asl),
        Some(AluOp::Lsl),
        Some(AluOp::Asr),
        Some(AluOp::Lsr),
        None,
        None,
        None,
    ]
}
