//! The DMA engine (§4.6): completes the pending transfer an AGU
//! operation staged, moving bytes between `dsram`/`cache` and an
//! attached physical memory device.
//!
//! Takes the physical memory it reaches as an explicit argument rather
//! than climbing a `parent` back-reference —
//! [`crate::vm::VirtualMachine::execute_dma`] is the only caller, and it
//! holds both the processor and the memory device directly.

use crate::common::{EngineError, StepOutcome, StepResult, DMA_UNIT_BYTES};
use crate::core::operation::Operation;
use crate::core::processor::Processor;

/// Completes `proc`'s pending DMA operation against `physical_memory`,
/// clearing the pending flag whether the transfer succeeds or fails.
///
/// The host calls this after every `execute_instruction` step, whether
/// or not that bundle staged a DMA request (§4.6: "If no DMA is
/// pending, no-op"), so the no-pending case is not an error.
///
/// # Errors
///
/// - [`EngineError::IllegalInstruction`] if a DMA is pending and the
///   operation needs a physical memory device but none is attached.
/// - [`EngineError::PhysicalMemoryOutOfRange`] if the RAM-side address
///   range exceeds `physical_memory`'s length.
/// - [`EngineError::MemoryOutOfRange`] if the SRAM-side address range
///   exceeds `dsram`'s length.
pub fn execute(proc: &mut Processor, physical_memory: Option<&mut [u8]>) -> StepResult {
    let Some(op) = proc.dma_operation.take() else {
        return Ok(StepOutcome::Continue);
    };
    proc.dma_pending = false;

    match op {
        Operation::Wait => Ok(StepOutcome::Continue),

        // `(size.bytes()) * 32`: size.bytes() is 1 for the 1-bit field's
        // 0 value, 2 for its 1 value, i.e. exactly `(raw_bit + 1)`, so
        // this already matches the prescribed `(op.size+1)*32` (§4.6).
        Operation::Lddma { size, sram_reg, ram_reg, sram_off, ram_off } => {
            let ram = physical_memory.ok_or(EngineError::IllegalInstruction)?;
            transfer(proc, ram, u64::from(size.bytes()) * DMA_UNIT_BYTES, sram_reg, sram_off, ram_reg, ram_off, Target::Dsram, Direction::RamToSram)?;
            Ok(StepOutcome::Continue)
        }
        Operation::Stdma { size, sram_reg, ram_reg, sram_off, ram_off } => {
            let ram = physical_memory.ok_or(EngineError::IllegalInstruction)?;
            transfer(proc, ram, u64::from(size.bytes()) * DMA_UNIT_BYTES, sram_reg, sram_off, ram_reg, ram_off, Target::Dsram, Direction::SramToRam)?;
            Ok(StepOutcome::Continue)
        }

        Operation::Lddmar { size, sram_reg, ram_reg } => {
            let ram = physical_memory.ok_or(EngineError::IllegalInstruction)?;
            transfer(proc, ram, u64::from(size) * DMA_UNIT_BYTES, sram_reg, 0, ram_reg, 0, Target::Dsram, Direction::RamToSram)?;
            Ok(StepOutcome::Continue)
        }
        Operation::Stdmar { size, sram_reg, ram_reg } => {
            let ram = physical_memory.ok_or(EngineError::IllegalInstruction)?;
            transfer(proc, ram, u64::from(size) * DMA_UNIT_BYTES, sram_reg, 0, ram_reg, 0, Target::Dsram, Direction::SramToRam)?;
            Ok(StepOutcome::Continue)
        }
        // DMAIR targets instruction SRAM, not data SRAM (§4.6).
        Operation::Dmair { size, sram_reg, ram_reg } => {
            let ram = physical_memory.ok_or(EngineError::IllegalInstruction)?;
            transfer(proc, ram, u64::from(size) * DMA_UNIT_BYTES, sram_reg, 0, ram_reg, 0, Target::Isram, Direction::RamToSram)?;
            Ok(StepOutcome::Continue)
        }

        _ => Err(EngineError::IllegalInstruction),
    }
}

#[derive(Clone, Copy)]
enum Direction {
    RamToSram,
    SramToRam,
}

/// Which on-processor buffer a DMA transfer's SRAM side addresses.
#[derive(Clone, Copy)]
enum Target {
    Dsram,
    Isram,
}

#[allow(clippy::too_many_arguments)]
fn transfer(
    proc: &mut Processor,
    ram: &mut [u8],
    len: u64,
    sram_reg: u32,
    sram_off: u32,
    ram_reg: u32,
    ram_off: u32,
    target: Target,
    direction: Direction,
) -> Result<(), EngineError> {
    let len = len as usize;
    // Addresses are in 32-byte block units: `(ireg[reg] + offset) * 32`.
    let sram_addr = ((proc.ireg.read(sram_reg) as u32 + sram_off) as u64 * DMA_UNIT_BYTES) as usize;
    let ram_addr = ((proc.ireg.read(ram_reg) as u32 + ram_off) as u64 * DMA_UNIT_BYTES) as usize;

    let sram_buf = match target {
        Target::Dsram => &mut proc.dsram,
        Target::Isram => &mut proc.isram,
    };

    let sram_end = sram_addr.checked_add(len).ok_or(EngineError::MemoryOutOfRange)?;
    if sram_end > sram_buf.len() {
        return Err(EngineError::MemoryOutOfRange);
    }
    let ram_end = ram_addr.checked_add(len).ok_or(EngineError::PhysicalMemoryOutOfRange)?;
    if ram_end > ram.len() {
        return Err(EngineError::PhysicalMemoryOutOfRange);
    }

    match direction {
        Direction::RamToSram => {
            sram_buf[sram_addr..sram_end].copy_from_slice(&ram[ram_addr..ram_end]);
        }
        Direction::SramToRam => {
            ram[ram_addr..ram_end].copy_from_slice(&sram_buf[sram_addr..sram_end]);
        }
    }
    Ok(())
}
