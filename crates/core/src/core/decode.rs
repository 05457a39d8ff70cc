//! The bundle decoder: stateless translation from (slot index, pc,
//! opcode word) to a decoded [`Operation`]. Four mutually exclusive
//! per-unit decoders (BRU, LSU, ALU, AGU); slot index constrains which
//! units are legal per slot (§4.2).

use crate::common::{
    EngineError, BUNDLE_SIZE_NORMAL, BUNDLE_SIZE_XCHG, DMA_RAM_BIAS, DMA_SRAM_BIAS, FLOAT_SRC_BIAS,
    LABEL_BITS, LDMX_SRC_BIAS, VECTOR_SRC_BIAS,
};
use crate::isa::tables::{ALU_REG_IMM, ALU_REG_REG_IMM, ALU_REG_REG_REG, COMPARATORS};
use crate::isa::{field, sign_extend};

use super::operation::{AluOp, Comparator, Operation, Width};

/// Number of 32-bit words to fetch for this bundle, per §4.1.
///
/// `ISRAM_SIZE/4 - pc` is the remaining word budget, clamped so a
/// 4-word `XCHG`-mode bundle near the end of `isram` never overruns it.
#[must_use]
pub fn opcode_set_size(xchg: bool, pc: u32, isram_words: u32) -> u32 {
    if xchg {
        let available = isram_words.saturating_sub(pc);
        available.min(BUNDLE_SIZE_XCHG)
    } else {
        BUNDLE_SIZE_NORMAL
    }
}

/// The functional unit legal for a given slot and unit-selector value
/// (the word's low 2 bits), per the table in §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Bru,
    Lsu,
    Alu,
    Agu,
    Vfpu,
    Illegal,
}

fn select_unit(slot: usize, selector: u32) -> Unit {
    match (slot, selector) {
        (0, 0) => Unit::Bru,
        (0, 1) | (1, 1) => Unit::Lsu,
        (1, 0) => Unit::Agu,
        (_, 2) => Unit::Alu,
        (_, 3) => Unit::Vfpu,
        _ => Unit::Illegal,
    }
}

/// Decodes a single bundle slot.
///
/// # Errors
///
/// Returns [`EngineError::IllegalInstruction`] for any reserved bit
/// pattern, out-of-range sub-opcode index, or unit selection not legal
/// in this slot (§4.2).
pub fn decode_slot(slot: usize, pc: u32, word: u32) -> Result<Operation, EngineError> {
    let selector = word & 0x3;
    match select_unit(slot, selector) {
        Unit::Bru => decode_bru(pc, word),
        Unit::Lsu => decode_lsu(word),
        Unit::Alu => decode_alu(word),
        Unit::Agu => decode_agu(word),
        Unit::Vfpu => Ok(Operation::VfpuNoOp),
        Unit::Illegal => Err(EngineError::IllegalInstruction),
    }
}

fn decode_bru(pc: u32, word: u32) -> Result<Operation, EngineError> {
    match field(word, 2, 2) {
        0 => decode_bru_reg_reg_or_branch(pc, word),
        1 => {
            let size = Width::from_field(field(word, 4, 2));
            let imm = field(word, 6, 20);
            let reg = field(word, 26, 6);
            Ok(Operation::Cmpi { size, imm, reg })
        }
        2 => {
            let imm = field(word, 4, 21);
            let reg = field(word, 25, 7);
            Ok(Operation::Fcmpi { imm, reg })
        }
        _ => {
            let imm = field(word, 4, 22);
            let reg = field(word, 26, 6);
            Ok(Operation::Dcmpi { imm, reg })
        }
    }
}

fn decode_bru_reg_reg_or_branch(pc: u32, word: u32) -> Result<Operation, EngineError> {
    match field(word, 4, 2) {
        0 => {
            let size = Width::from_field(field(word, 8, 2));
            let right = field(word, 20, 6);
            let left = field(word, 26, 6);
            Ok(Operation::Cmp { size, right, left })
        }
        1 => {
            let right = field(word, 18, 7);
            let left = field(word, 25, 7);
            Ok(Operation::Fcmp { right, left })
        }
        2 => {
            let right = field(word, 20, 6);
            let left = field(word, 26, 6);
            Ok(Operation::Dcmp { right, left })
        }
        _ => decode_bru_branching(pc, word),
    }
}

fn decode_bru_branching(pc: u32, word: u32) -> Result<Operation, EngineError> {
    match field(word, 6, 2) {
        0 => {
            let comp = field(word, 8, 4) as usize;
            let label = field(word, 12, LABEL_BITS);
            let target = (pc as i64 + i64::from(sign_extend(label, LABEL_BITS)) * 2) as u32;
            let cmp = COMPARATORS[comp].ok_or(EngineError::IllegalInstruction)?;
            Ok(Operation::Branch { cmp, target })
        }
        1 => Err(EngineError::IllegalInstruction),
        2 => {
            let subtype = field(word, 8, 2);
            let label = field(word, 12, LABEL_BITS);
            let relative_target = || (pc as i64 + i64::from(sign_extend(label, LABEL_BITS)) * 2) as u32;
            let absolute_target = label * 2;
            match subtype {
                0 => Ok(Operation::Call { target: absolute_target }),
                1 => Ok(Operation::Jmp { target: absolute_target }),
                2 => Ok(Operation::Callr { target: relative_target() }),
                _ => Ok(Operation::Jmpr { target: relative_target() }),
            }
        }
        _ => Ok(Operation::Ret),
    }
}

fn decode_lsu(word: u32) -> Result<Operation, EngineError> {
    match field(word, 2, 2) {
        0 => decode_ldm_stm(word),
        1 => decode_lsu_subfamily(word),
        2 => decode_ldc_stc(word),
        _ => decode_lsu_float_double(word),
    }
}

fn decode_ldm_stm(word: u32) -> Result<Operation, EngineError> {
    let incr = field(word, 4, 1);
    let store = field(word, 5, 1) != 0;
    let size = Width::from_field(field(word, 6, 2));
    let disp = field(word, 8, 12);
    let base = field(word, 20, 6);
    let reg = field(word, 26, 6);
    Ok(if store {
        Operation::Stm { size, disp, base, reg, incr }
    } else {
        Operation::Ldm { size, disp, base, reg, incr }
    })
}

fn decode_ldc_stc(word: u32) -> Result<Operation, EngineError> {
    let incr = field(word, 4, 1);
    let store = field(word, 5, 1) != 0;
    let size = Width::from_field(field(word, 6, 2));
    let disp = field(word, 8, 12);
    let base = field(word, 20, 6);
    let reg = field(word, 26, 6);
    Ok(if store {
        Operation::Stc { size, disp, base, reg, incr }
    } else {
        Operation::Ldc { size, disp, base, reg, incr }
    })
}

fn decode_lsu_subfamily(word: u32) -> Result<Operation, EngineError> {
    match field(word, 4, 2) {
        0 => {
            let store = field(word, 6, 1) != 0;
            let size = Width::from_field(field(word, 7, 2));
            let disp = field(word, 9, 16);
            let base = field(word, 25, 1) + LDMX_SRC_BIAS;
            let reg = field(word, 26, 6);
            Ok(if store {
                Operation::Stmx { size, disp, base, reg }
            } else {
                Operation::Ldmx { size, disp, base, reg }
            })
        }
        1 => {
            let store = field(word, 6, 1) != 0;
            let size = Width::from_field(field(word, 7, 2));
            let port = field(word, 16, 8);
            let reg = field(word, 26, 6);
            Ok(if store {
                Operation::Out { port, size, reg }
            } else {
                Operation::In { port, size, reg }
            })
        }
        2 => {
            let size = Width::from_field(field(word, 7, 1));
            let port = field(word, 16, 16);
            let reg = field(word, 26, 6);
            Ok(Operation::Outi { port, size, reg })
        }
        _ => {
            let store = field(word, 6, 1) != 0;
            let cache = field(word, 7, 1) != 0;
            let incr = field(word, 8, 1);
            let disp = field(word, 9, 15);
            let base = field(word, 25, 3) + VECTOR_SRC_BIAS;
            let reg = field(word, 26, 6);
            Ok(match (cache, store) {
                (true, true) => Operation::Stcv { disp, base, reg, incr },
                (true, false) => Operation::Ldcv { disp, base, reg, incr },
                (false, true) => Operation::Stmv { disp, base, reg, incr },
                (false, false) => Operation::Ldmv { disp, base, reg, incr },
            })
        }
    }
}

fn decode_lsu_float_double(word: u32) -> Result<Operation, EngineError> {
    let is_double = field(word, 4, 1) != 0;
    let cache = field(word, 5, 1) != 0;
    let store = field(word, 6, 1) != 0;
    let incr = field(word, 7, 1);

    if is_double {
        let disp = field(word, 8, 16);
        let base = field(word, 24, 2) + FLOAT_SRC_BIAS;
        let reg = field(word, 26, 6);
        Ok(match (cache, store) {
            (true, true) => Operation::Stcd { disp, base, reg, incr },
            (true, false) => Operation::Ldcd { disp, base, reg, incr },
            (false, true) => Operation::Stmd { disp, base, reg, incr },
            (false, false) => Operation::Ldmd { disp, base, reg, incr },
        })
    } else {
        let disp = field(word, 8, 15);
        let base = field(word, 23, 2) + FLOAT_SRC_BIAS;
        let reg = field(word, 25, 7);
        Ok(match (cache, store) {
            (true, true) => Operation::Stcf { disp, base, reg, incr },
            (true, false) => Operation::Ldcf { disp, base, reg, incr },
            (false, true) => Operation::Stmf { disp, base, reg, incr },
            (false, false) => Operation::Ldmf { disp, base, reg, incr },
        })
    }
}

fn decode_alu(word: u32) -> Result<Operation, EngineError> {
    match field(word, 2, 2) {
        0 => decode_alu_reg_reg_reg_or_structural(word),
        1 => {
            let op_idx = field(word, 4, 4) as usize;
            let size = Width::from_field(field(word, 8, 2));
            let imm = field(word, 10, 10);
            let src = field(word, 20, 6);
            let dest = field(word, 26, 6);
            let op = ALU_REG_REG_IMM[op_idx].ok_or(EngineError::IllegalInstruction)?;
            Ok(Operation::AluImm { op, size, imm, src, dest })
        }
        2 => {
            let op_idx = field(word, 4, 4) as usize;
            let size = Width::from_field(field(word, 8, 2));
            let imm = field(word, 10, 16);
            let dest = field(word, 26, 6);
            let op = ALU_REG_IMM[op_idx].ok_or(EngineError::IllegalInstruction)?;
            Ok(Operation::AluQuick { op, size, imm, dest })
        }
        _ => {
            let imm = field(word, 4, 22);
            let dest = field(word, 26, 6);
            Ok(Operation::Movei { imm, dest })
        }
    }
}

fn decode_alu_reg_reg_reg_or_structural(word: u32) -> Result<Operation, EngineError> {
    match field(word, 4, 3) {
        0 => {
            let op_idx = field(word, 8, 4) as usize;
            let size = Width::from_field(field(word, 12, 2));
            let src1 = field(word, 14, 6);
            let src2 = field(word, 20, 6);
            let dest = field(word, 26, 6);
            let op = ALU_REG_REG_REG[op_idx].ok_or(EngineError::IllegalInstruction)?;
            Ok(Operation::Alu { op, size, src1, src2, dest })
        }
        2 => Ok(Operation::Xchg),
        6 => {
            let end = field(word, 7, 1) != 0;
            Ok(Operation::Nop { end })
        }
        _ => Err(EngineError::IllegalInstruction),
    }
}

fn decode_agu(word: u32) -> Result<Operation, EngineError> {
    if field(word, 2, 1) == 0 {
        let store = field(word, 3, 1) != 0;
        let size = Width::from_field(field(word, 4, 1));
        let sram_reg = field(word, 5, 2) + DMA_SRAM_BIAS;
        let ram_reg = field(word, 7, 1) + DMA_RAM_BIAS;
        let sram_off = field(word, 8, 12);
        let ram_off = field(word, 20, 12);
        Ok(if store {
            Operation::Stdma { size, sram_reg, ram_reg, sram_off, ram_off }
        } else {
            Operation::Lddma { size, sram_reg, ram_reg, sram_off, ram_off }
        })
    } else {
        let store = field(word, 3, 1) != 0;
        match field(word, 4, 4) {
            0 => {
                let sram_reg = field(word, 8, 6);
                let size = field(word, 14, 6);
                let ram_reg = field(word, 20, 6);
                Ok(if store {
                    Operation::Stdmar { size, sram_reg, ram_reg }
                } else {
                    Operation::Lddmar { size, sram_reg, ram_reg }
                })
            }
            1 => {
                let sram_reg = field(word, 8, 6);
                let size = field(word, 14, 6);
                let ram_reg = field(word, 20, 6);
                Ok(Operation::Dmair { size, sram_reg, ram_reg })
            }
            15 => Ok(Operation::Wait),
            _ => Err(EngineError::IllegalInstruction),
        }
    }
}
