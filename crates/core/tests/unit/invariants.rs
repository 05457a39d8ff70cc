//! The quantified architectural invariants, each driven through
//! [`crate::common::Harness`] rather than the isolated per-module unit
//! tests scattered through `src/` (those cover the same rules in
//! miniature; these exercise them through the full decode/execute
//! cycle).

use altair_core::common::StepOutcome;

use crate::common::builders::{alu_ri, bcc, cmp, movei, nop, xchg};
use crate::common::Harness;

/// PC advances by exactly the bundle size fetched, not by a fixed
/// constant: two normal (2-word) bundles land the PC at word 4.
#[test]
fn pc_advances_by_the_fetched_bundle_size() {
    let mut h = Harness::new(&[movei(0, 1), nop(false), movei(1, 2), nop(true)]);
    h.vm.decode_instruction(h.proc).unwrap();
    assert_eq!(h.vm.processor(h.proc).unwrap().pc(), 2);
    h.vm.execute_instruction(h.proc).unwrap();
    h.vm.decode_instruction(h.proc).unwrap();
    assert_eq!(h.vm.processor(h.proc).unwrap().pc(), 4);
}

/// An ALU result is masked to its operand size before being written
/// back; bits above that width never reach the destination register.
#[test]
fn alu_quick_result_is_masked_to_the_destination_size() {
    let mut h = Harness::new(&[
        alu_ri(0 /* Add */, 0 /* Byte */, 300, 0),
        nop(true),
    ]);
    h.step();
    // 300 (0x12C) masked to one byte is 0x2C == 44, not 300.
    assert_eq!(h.ireg(0), 44);
}

/// A taken branch clears Z/S/U just the same as one that falls
/// through: the comparator's verdict is consumed exactly once.
#[test]
fn branch_clears_zsu_whether_or_not_it_is_taken() {
    // CMP.w r0,r1 with r0==r1==0 -> equal -> BEQ taken. CMP and BCC are
    // both BRU ops, so each needs its own bundle with a non-BRU filler in
    // slot 1 (BRU is only ever legal in slot 0).
    let mut taken = Harness::new(&[
        cmp(2, 1, 0),
        nop(false),
        bcc(1 /* Beq */, 1),
        nop(false),
        nop(true),
        nop(false),
    ]);
    taken.run_to_completion(None, 6);
    let flags = taken.vm.processor(taken.proc).unwrap().flags();
    assert!(!flags.z());
    assert!(!flags.s());
    assert!(!flags.u());

    // CMP.w r0,r1 with r0=1,r1=0 -> not equal -> BEQ falls through.
    let mut not_taken = Harness::new(&[
        movei(0, 1),
        nop(false),
        cmp(2, 1, 0),
        nop(false),
        bcc(1, 1),
        nop(false),
        nop(true),
        nop(false),
    ]);
    not_taken.run_to_completion(None, 8);
    let flags = not_taken.vm.processor(not_taken.proc).unwrap().flags();
    assert!(!flags.z());
    assert!(!flags.s());
    assert!(!flags.u());
}

/// Regression pin for the delayed-slot-scan fix in `processor.rs`:
/// `delayed_bits` indexes the *previous* bundle's slots, which can be
/// wider than the bundle currently being executed. A 4-word XCHG-mode
/// bundle stages an `XCHG` in slot 3 (the only staged control-flow op
/// legal there; BRU ops are illegal in slots 2/3, so a branch/call/jmp
/// can't stand in for it); the very next bundle decodes back down to 2
/// words before that `XCHG` is drained. It must still fire.
#[test]
fn delayed_bits_scan_spans_all_four_slots_even_when_the_current_bundle_shrinks() {
    // A toggle staged by one bundle only takes effect while draining the
    // *next* one, so two leading XCHGs, one bundle apart, are needed to
    // get flags.xchg() reading true exactly while bundle2 (words 4-7)
    // decodes, and false again by the time bundle3 (words 8-9) decodes.
    let mut h = Harness::new(&[
        xchg(),        // 0: bundle0 (size 2) - staged; drained during bundle1's execute
        nop(false),    // 1
        xchg(),        // 2: bundle1 (size 2) - staged; drained during bundle2's execute
        nop(false),    // 3
        nop(false),    // 4: bundle2 (size 4, since XCHG reads as on by now) - slot 0
        nop(false),    // 5: slot 1
        nop(false),    // 6: slot 2
        xchg(),        // 7: slot 3 - staged; must survive into a narrower next bundle
        movei(9, 2),   // 8: bundle3 (size 2, since bundle1's XCHG already flipped it back off)
        nop(false),    // 9
    ]);

    for _ in 0..4 {
        h.step();
    }

    assert_eq!(h.ireg(9), 2, "the delay-slot bundle after the 4-word bundle always runs");
    assert!(
        h.vm.processor(h.proc).unwrap().flags().xchg(),
        "the XCHG staged in slot 3 of a 4-word bundle must still fire even though the \
         next bundle it's drained alongside is only 2 words wide"
    );
}

/// A driver call reports `Continue` for every ordinary bundle and
/// `EndOfCode` only once the terminal `NOP.e` is actually drained, not
/// as soon as it is decoded or staged.
#[test]
fn step_outcome_is_continue_until_the_terminal_nop() {
    let mut h = Harness::new(&[movei(0, 1), nop(false), movei(1, 2), nop(true)]);
    assert_eq!(h.step(), StepOutcome::Continue);
    assert_eq!(h.step(), StepOutcome::Continue);
    assert_eq!(h.step(), StepOutcome::EndOfCode);
}
