//! The delayed executor (§4.5): resolves the control-flow operation
//! staged by the *previous* bundle's immediate phase — branches,
//! unconditional jumps, calls, return, `XCHG`, and the terminal `NOP`.
//!
//! Structured as a `match` over [`Operation`] rather than a flat
//! opcode switch.

use crate::common::{EngineError, StepOutcome, StepResult};
use crate::core::operation::{Comparator, Operation};
use crate::core::processor::Processor;

/// Resolves one staged delayed operation.
///
/// # Errors
///
/// [`EngineError::IllegalInstruction`] if `op` is not one of the
/// control-flow kinds [`Operation::is_staged_control_flow`] stages.
pub fn execute(proc: &mut Processor, op: Operation) -> StepResult {
    match op {
        Operation::Branch { cmp, target } => {
            if taken(proc, cmp) {
                proc.pc = target;
            }
            proc.flags.clear_zsu();
            Ok(StepOutcome::Continue)
        }
        Operation::Jmp { target } | Operation::Jmpr { target } => {
            proc.pc = target;
            Ok(StepOutcome::Continue)
        }
        Operation::Call { target } | Operation::Callr { target } => {
            proc.flags.save_return_pc(proc.pc);
            proc.pc = target;
            Ok(StepOutcome::Continue)
        }
        Operation::Ret => {
            proc.pc = proc.flags.saved_return_pc();
            Ok(StepOutcome::Continue)
        }
        Operation::Xchg => {
            proc.flags.toggle_xchg();
            Ok(StepOutcome::Continue)
        }
        Operation::Nop { end } => {
            if end {
                Ok(StepOutcome::EndOfCode)
            } else {
                Ok(StepOutcome::Continue)
            }
        }
        _ => Err(EngineError::IllegalInstruction),
    }
}

/// The 10-entry comparator truth table from data-model §3, evaluated
/// against the flag bits the *previous* compare left behind.
fn taken(proc: &Processor, cmp: Comparator) -> bool {
    let flags = proc.flags();
    let (z, s, u) = (flags.z(), flags.s(), flags.u());
    match cmp {
        Comparator::Bne => z,
        Comparator::Beq => !z,
        Comparator::Bl => u,
        Comparator::Ble => u || !z,
        Comparator::Bg => !u,
        Comparator::Bge => !u || !z,
        Comparator::Bls => s,
        Comparator::Bles => s || !z,
        Comparator::Bgs => !s,
        Comparator::Bges => !s || !z,
    }
}
