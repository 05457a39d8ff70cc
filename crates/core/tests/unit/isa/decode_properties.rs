//! Assemble-then-decode round trips across the opcode families (§8):
//! for every family, encoding arbitrary-but-legal field values and
//! decoding the resulting word must reproduce exactly those fields in
//! the canonical [`Operation`], no matter which legal values were
//! chosen.

use altair_core::isa::sign_extend;
use altair_core::isa::tables::ALU_REG_REG_REG;
use altair_core::{Comparator, Operation, Width};
use proptest::prelude::*;

use crate::common::builders::{alu_rrr, bcc, cmp, ldm, movei};

/// A 6-bit register index.
fn reg() -> impl Strategy<Value = u32> {
    0u32..64
}

/// A 2-bit width selector.
fn width() -> impl Strategy<Value = u32> {
    0u32..4
}

proptest! {
    #[test]
    fn movei_round_trips_dest_and_immediate(dest in reg(), imm in 0u32..(1 << 22)) {
        let word = movei(dest, imm);
        let op = altair_core::core::decode::decode_slot(0, 0, word).unwrap();
        prop_assert_eq!(op, Operation::Movei { imm, dest });
    }

    #[test]
    fn cmp_round_trips_operands_and_width(size in width(), right in reg(), left in reg()) {
        let word = cmp(size, right, left);
        let op = altair_core::core::decode::decode_slot(0, 0, word).unwrap();
        prop_assert_eq!(op, Operation::Cmp { size: Width::from_field(size), right, left });
    }

    #[test]
    fn ldm_round_trips_displacement_and_registers(
        incr in 0u32..2,
        size in width(),
        disp in 0u32..(1 << 12),
        base in reg(),
        dest in reg(),
    ) {
        let word = ldm(incr, size, disp, base, dest);
        let op = altair_core::core::decode::decode_slot(1, 0, word).unwrap();
        prop_assert_eq!(
            op,
            Operation::Ldm { size: Width::from_field(size), disp, base, reg: dest, incr }
        );
    }

    #[test]
    fn alu_reg_reg_reg_round_trips_every_legal_op_index(
        op_idx in 0u32..13,
        size in width(),
        src1 in reg(),
        src2 in reg(),
        dest in reg(),
    ) {
        let word = alu_rrr(op_idx, size, src1, src2, dest);
        let op = altair_core::core::decode::decode_slot(2, 0, word).unwrap();
        let expected_op = ALU_REG_REG_REG[op_idx as usize].expect("index < 13 is always legal");
        prop_assert_eq!(op, Operation::Alu { op: expected_op, size: Width::from_field(size), src1, src2, dest });
    }

    /// The 14-bit signed label round-trips through the prescribed
    /// sign-extension rule (§3) for every legal comparator index:
    /// `target == pc + sext14(label) * 2`.
    #[test]
    fn bcc_target_matches_the_prescribed_sign_extension(
        comparator_idx in 0u32..10,
        label in -8192i32..8192i32,
        pc in 0u32..4096,
    ) {
        let raw_label = (label as u32) & 0x3FFF;
        let word = bcc(comparator_idx, raw_label);
        let op = altair_core::core::decode::decode_slot(0, pc, word).unwrap();
        let expected_target = (pc as i64 + i64::from(sign_extend(raw_label, 14)) * 2) as u32;
        let Operation::Branch { target, .. } = op else {
            panic!("expected a Branch operation, got {op:?}");
        };
        prop_assert_eq!(target, expected_target);
    }
}

/// Reserved ALU reg-reg-reg indices (13..16) are illegal for every
/// register/size combination, not just the hand-picked E6 case.
proptest! {
    #[test]
    fn alu_reg_reg_reg_reserved_indices_are_always_illegal(
        op_idx in 13u32..16,
        size in width(),
        src1 in reg(),
        src2 in reg(),
        dest in reg(),
    ) {
        let word = alu_rrr(op_idx, size, src1, src2, dest);
        prop_assert!(altair_core::core::decode::decode_slot(2, 0, word).is_err());
    }
}

#[test]
fn comparator_table_round_trips_every_legal_mnemonic() {
    let pairs = [
        (0u32, Comparator::Bne),
        (1, Comparator::Beq),
        (2, Comparator::Bl),
        (3, Comparator::Ble),
        (4, Comparator::Bg),
        (5, Comparator::Bge),
        (6, Comparator::Bls),
        (7, Comparator::Bles),
        (8, Comparator::Bgs),
        (9, Comparator::Bges),
    ];
    for (idx, expected) in pairs {
        let word = bcc(idx, 0);
        let op = altair_core::core::decode::decode_slot(0, 0, word).unwrap();
        let Operation::Branch { cmp, target } = op else {
            panic!("expected a Branch operation, got {op:?}");
        };
        // `pretty_assertions` gives a field-by-field diff on the (rare,
        // but real) day this drifts, rather than two opaque Debug dumps.
        pretty_assertions::assert_eq!(Operation::Branch { cmp, target }, Operation::Branch { cmp: expected, target });
    }
}
