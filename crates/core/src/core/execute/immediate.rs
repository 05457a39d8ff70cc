//! The immediate executor (§4.4): applies the non-control-flow effects
//! of a decoded operation. Control flow, `XCHG`, the terminal `NOP`, and
//! DMA-issuing AGU operations are staged instead of acted on here.
//!
//! `MULS`/`DIVS`/`ASL`/`ASR` write their signed 64-bit result directly
//! into the destination register; `DCMPI` tags `CMPT` as `Double` (2),
//! not `Float` (1), matching every other double-precision compare.

use crate::common::EngineError;
use crate::core::arch::CompareTag;
use crate::core::operation::{AluOp, Operation, Width};
use crate::core::processor::Processor;

/// Applies one decoded slot's immediate effects.
///
/// # Errors
///
/// [`EngineError::IllegalInstruction`] if a second DMA request arrives
/// while one is still pending.
pub fn execute(proc: &mut Processor, slot: usize, op: Operation) -> Result<(), EngineError> {
    if op.is_dma_request() {
        return proc.stage_dma(op);
    }
    if op.is_staged_control_flow() {
        proc.stage_delayed(slot, op);
        return Ok(());
    }

    match op {
        Operation::Movei { imm, dest } => {
            proc.ireg.write(dest, u64::from(imm));
        }

        Operation::Alu { op, size, src1, src2, dest } => {
            // Non-commutative reg-reg-reg ops (SUB, DIVS, DIVU, the shifts)
            // compute `src2 OP src1`, not `src1 OP src2`: the source's own
            // SUB case is `ireg[dest] = ireg[src2] - ireg[src1]`, and the
            // shifts read their amount from src1 and their shiftee from
            // src2, consistently. Commutative ops (ADD/MUL*/AND/OR/XOR) are
            // unaffected by the swap.
            let a = proc.ireg.read(src2);
            let b = proc.ireg.read(src1);
            let result = apply_alu(op, a, b);
            proc.ireg.write(dest, result & size.sizemask());
        }
        Operation::AluImm { op, size, imm, src, dest } => {
            let a = proc.ireg.read(src);
            let result = apply_alu(op, a, u64::from(imm));
            proc.ireg.write(dest, result & size.sizemask());
        }
        Operation::AluQuick { op, size, imm, dest } => {
            let a = proc.ireg.read(dest);
            let result = apply_alu(op, a, u64::from(imm));
            proc.ireg.write(dest, result & size.sizemask());
        }

        Operation::Cmp { size, right, left } => {
            let r = proc.ireg.read(right) & size.sizemask();
            let l = proc.ireg.read(left) & size.sizemask();
            integer_compare(proc, l, r);
        }
        Operation::Cmpi { size, imm, reg } => {
            let r = u64::from(imm) & size.sizemask();
            let l = proc.ireg.read(reg) & size.sizemask();
            integer_compare(proc, l, r);
        }
        Operation::Fcmp { right, left } => {
            let r = proc.freg.read_f32(right);
            let l = proc.freg.read_f32(left);
            proc.flags.set_float_compare(l != r, l < r, CompareTag::Float);
        }
        Operation::Fcmpi { imm, reg } => {
            let r = f32::from_bits(imm << 11);
            let l = proc.freg.read_f32(reg);
            proc.flags.set_float_compare(l != r, l < r, CompareTag::Float);
        }
        Operation::Dcmp { right, left } => {
            let r = proc.freg.read_f64(right);
            let l = proc.freg.read_f64(left);
            proc.flags.set_float_compare(l != r, l < r, CompareTag::Double);
        }
        Operation::Dcmpi { imm, reg } => {
            // Tags CMPT as Double (2), consistent with the non-immediate DCMP above.
            let r = f64::from_bits(u64::from(imm) << 42);
            let l = proc.freg.read_f64(reg);
            proc.flags.set_float_compare(l != r, l < r, CompareTag::Double);
        }

        Operation::Ldm { size, disp, base, reg, incr } => {
            let addr = (disp + proc.ireg.read(base) as u32) as usize;
            let bytes = size.bytes() as usize;
            let value = read_le(&proc.dsram, addr, bytes)?;
            proc.ireg.write(reg, value);
            proc.ireg.write(base, proc.ireg.read(base) + u64::from(incr));
        }
        Operation::Stm { size, disp, base, reg, incr } => {
            let addr = (disp + proc.ireg.read(base) as u32) as usize;
            let bytes = size.bytes() as usize;
            write_le(&mut proc.dsram, addr, proc.ireg.read(reg), bytes)?;
            proc.ireg.write(base, proc.ireg.read(base) + u64::from(incr));
        }
        Operation::Ldc { size, disp, base, reg, incr } => {
            let addr = (disp + proc.ireg.read(base) as u32) as usize;
            let bytes = size.bytes() as usize;
            let value = read_le(&proc.cache, addr, bytes)?;
            proc.ireg.write(reg, value);
            proc.ireg.write(base, proc.ireg.read(base) + u64::from(incr));
        }
        Operation::Stc { size, disp, base, reg, incr } => {
            let addr = (disp + proc.ireg.read(base) as u32) as usize;
            let bytes = size.bytes() as usize;
            write_le(&mut proc.cache, addr, proc.ireg.read(reg), bytes)?;
            proc.ireg.write(base, proc.ireg.read(base) + u64::from(incr));
        }
        Operation::Ldmx { size, disp, base, reg } => {
            let addr = (disp + proc.ireg.read(base) as u32) as usize;
            let bytes = size.bytes() as usize;
            let value = read_le(&proc.dsram, addr, bytes)?;
            proc.ireg.write(reg, value);
            // LDMX/STMX never post-increment their base register.
        }
        Operation::Stmx { size, disp, base, reg } => {
            let addr = (disp + proc.ireg.read(base) as u32) as usize;
            let bytes = size.bytes() as usize;
            write_le(&mut proc.dsram, addr, proc.ireg.read(reg), bytes)?;
        }

        Operation::In { port, size, reg } => {
            let value = read_le(&proc.iosram, port as usize, size.bytes() as usize)?;
            proc.ireg.write(reg, value);
        }
        Operation::Out { port, size, reg } | Operation::Outi { port, size, reg } => {
            write_le(&mut proc.iosram, port as usize, proc.ireg.read(reg), size.bytes() as usize)?;
        }

        Operation::Ldmv { disp, base, reg, incr } => {
            vector_load(proc, false, disp, base, reg, incr)?;
        }
        Operation::Stmv { disp, base, reg, incr } => {
            vector_store(proc, false, disp, base, reg, incr)?;
        }
        Operation::Ldcv { disp, base, reg, incr } => {
            vector_load(proc, true, disp, base, reg, incr)?;
        }
        Operation::Stcv { disp, base, reg, incr } => {
            vector_store(proc, true, disp, base, reg, incr)?;
        }

        Operation::Ldmf { disp, base, reg, incr } => {
            float_load(proc, false, disp, base, reg, incr)?;
        }
        Operation::Stmf { disp, base, reg, incr } => {
            float_store(proc, false, disp, base, reg, incr)?;
        }
        Operation::Ldcf { disp, base, reg, incr } => {
            float_load(proc, true, disp, base, reg, incr)?;
        }
        Operation::Stcf { disp, base, reg, incr } => {
            float_store(proc, true, disp, base, reg, incr)?;
        }

        Operation::Ldmd { disp, base, reg, incr } => {
            double_load(proc, false, disp, base, reg, incr)?;
        }
        Operation::Stmd { disp, base, reg, incr } => {
            double_store(proc, false, disp, base, reg, incr)?;
        }
        Operation::Ldcd { disp, base, reg, incr } => {
            double_load(proc, true, disp, base, reg, incr)?;
        }
        Operation::Stcd { disp, base, reg, incr } => {
            double_store(proc, true, disp, base, reg, incr)?;
        }

        Operation::VfpuNoOp => {}

        // Staged control flow / DMA are handled above before this match.
        Operation::Xchg
        | Operation::Nop { .. }
        | Operation::Branch { .. }
        | Operation::Jmp { .. }
        | Operation::Call { .. }
        | Operation::Jmpr { .. }
        | Operation::Callr { .. }
        | Operation::Ret
        | Operation::Lddma { .. }
        | Operation::Stdma { .. }
        | Operation::Lddmar { .. }
        | Operation::Stdmar { .. }
        | Operation::Dmair { .. }
        | Operation::Wait => unreachable!("staged above"),
    }

    Ok(())
}

// `left`/`right` arrive already masked to the compare's size (zero-extended,
// not sign-extended) by both callers below, matching `processor.c`'s
// `sizemask[size]`-then-`(int64_t)` cast: a sub-word value with its high bit
// set compares as a large positive number, not a negative one.
fn integer_compare(proc: &mut Processor, left: u64, right: u64) {
    proc.flags.set_integer_compare(left != right, (left as i64) < (right as i64), left < right);
}

fn apply_alu(op: AluOp, a: u64, b: u64) -> u64 {
    // MULS/DIVS/ASL/ASR write their signed 64-bit result directly into
    // the destination register, same as every other ALU opcode.
    match op {
        AluOp::Add => a.wrapping_add(b),
        AluOp::Sub => a.wrapping_sub(b),
        AluOp::Muls => ((a as i64).wrapping_mul(b as i64)) as u64,
        AluOp::Mulu => a.wrapping_mul(b),
        AluOp::Divs => {
            if b == 0 {
                0
            } else {
                ((a as i64).wrapping_div(b as i64)) as u64
            }
        }
        AluOp::Divu => {
            if b == 0 {
                0
            } else {
                a.wrapping_div(b)
            }
        }
        AluOp::And => a & b,
        AluOp::Or => a | b,
        AluOp::Xor => a ^ b,
        AluOp::Asl => ((a as i64).wrapping_shl(b as u32)) as u64,
        AluOp::Lsl => a.wrapping_shl(b as u32),
        AluOp::Asr => ((a as i64).wrapping_shr(b as u32)) as u64,
        AluOp::Lsr => a.wrapping_shr(b as u32),
    }
}

fn read_le(buf: &[u8], addr: usize, len: usize) -> Result<u64, EngineError> {
    let end = addr.checked_add(len).ok_or(EngineError::MemoryOutOfRange)?;
    if end > buf.len() {
        return Err(EngineError::MemoryOutOfRange);
    }
    let mut bytes = [0u8; 8];
    bytes[..len].copy_from_slice(&buf[addr..end]);
    Ok(u64::from_le_bytes(bytes))
}

fn write_le(buf: &mut [u8], addr: usize, value: u64, len: usize) -> Result<(), EngineError> {
    let end = addr.checked_add(len).ok_or(EngineError::MemoryOutOfRange)?;
    if end > buf.len() {
        return Err(EngineError::MemoryOutOfRange);
    }
    let bytes = value.to_le_bytes();
    buf[addr..end].copy_from_slice(&bytes[..len]);
    Ok(())
}

fn vector_load(proc: &mut Processor, cache: bool, disp: u32, base: u32, reg: u32, incr: u32) -> Result<(), EngineError> {
    let addr = (disp + proc.ireg.read(base) as u32) as usize;
    let buf = if cache { &proc.cache } else { &proc.dsram };
    let end = addr.checked_add(16).ok_or(EngineError::MemoryOutOfRange)?;
    if end > buf.len() {
        return Err(EngineError::MemoryOutOfRange);
    }
    let mut lanes = [0f32; 4];
    for (i, chunk) in buf[addr..end].chunks_exact(4).enumerate() {
        lanes[i] = f32::from_le_bytes(chunk.try_into().unwrap());
    }
    proc.freg.write_vector4f(reg, crate::core::arch::Vector4f(lanes));
    proc.ireg.write(base, proc.ireg.read(base) + u64::from(incr));
    Ok(())
}

fn vector_store(proc: &mut Processor, cache: bool, disp: u32, base: u32, reg: u32, incr: u32) -> Result<(), EngineError> {
    let addr = (disp + proc.ireg.read(base) as u32) as usize;
    let value = proc.freg.read_vector4f(reg);
    let buf = if cache { &mut proc.cache } else { &mut proc.dsram };
    let end = addr.checked_add(16).ok_or(EngineError::MemoryOutOfRange)?;
    if end > buf.len() {
        return Err(EngineError::MemoryOutOfRange);
    }
    for (i, lane) in value.0.iter().enumerate() {
        buf[addr + i * 4..addr + i * 4 + 4].copy_from_slice(&lane.to_le_bytes());
    }
    proc.ireg.write(base, proc.ireg.read(base) + u64::from(incr));
    Ok(())
}

fn float_load(proc: &mut Processor, cache: bool, disp: u32, base: u32, reg: u32, incr: u32) -> Result<(), EngineError> {
    let addr = (disp + proc.ireg.read(base) as u32) as usize;
    let buf = if cache { &proc.cache } else { &proc.dsram };
    let value = read_le(buf, addr, 4)?;
    proc.freg.write_f32(reg, f32::from_bits(value as u32));
    proc.ireg.write(base, proc.ireg.read(base) + u64::from(incr));
    Ok(())
}

fn float_store(proc: &mut Processor, cache: bool, disp: u32, base: u32, reg: u32, incr: u32) -> Result<(), EngineError> {
    let addr = (disp + proc.ireg.read(base) as u32) as usize;
    let value = u64::from(proc.freg.read_f32(reg).to_bits());
    let buf = if cache { &mut proc.cache } else { &mut proc.dsram };
    write_le(buf, addr, value, 4)?;
    proc.ireg.write(base, proc.ireg.read(base) + u64::from(incr));
    Ok(())
}

fn double_load(proc: &mut Processor, cache: bool, disp: u32, base: u32, reg: u32, incr: u32) -> Result<(), EngineError> {
    let addr = (disp + proc.ireg.read(base) as u32) as usize;
    let buf = if cache { &proc.cache } else { &proc.dsram };
    let value = read_le(buf, addr, 8)?;
    proc.freg.write_f64(reg, f64::from_bits(value));
    proc.ireg.write(base, proc.ireg.read(base) + u64::from(incr));
    Ok(())
}

fn double_store(proc: &mut Processor, cache: bool, disp: u32, base: u32, reg: u32, incr: u32) -> Result<(), EngineError> {
    let addr = (disp + proc.ireg.read(base) as u32) as usize;
    let value = proc.freg.read_f64(reg).to_bits();
    let buf = if cache { &mut proc.cache } else { &mut proc.dsram };
    write_le(buf, addr, value, 8)?;
    proc.ireg.write(base, proc.ireg.read(base) + u64::from(incr));
    Ok(())
}
