//! Bundle-word encoders, one per instruction family, mirroring the bit
//! layout `core::decode` extracts (§4.3). Kept deliberately close to the
//! decoder's own field offsets so scenario tests read as "assemble this
//! instruction" rather than "poke these bits".

/// `selector` occupies bits 0..1 of every word; slot 0's BRU/LSU/ALU and
/// slot 1's AGU/LSU/ALU share these same values (§4.2).
const SEL_BRU_OR_AGU: u32 = 0;
const SEL_LSU: u32 = 1;
const SEL_ALU: u32 = 2;

/// `MOVEI dest, imm` (ALU category 3).
pub fn movei(dest: u32, imm: u32) -> u32 {
    SEL_ALU | (0b11 << 2) | (imm << 4) | (dest << 26)
}

/// `op.size dest, src1, src2` (ALU category 0, arithmetic table).
pub fn alu_rrr(op_idx: u32, size: u32, src1: u32, src2: u32, dest: u32) -> u32 {
    SEL_ALU | (op_idx << 8) | (size << 12) | (src1 << 14) | (src2 << 20) | (dest << 26)
}

/// `op.size dest, src, imm10` (ALU category 1, reg-reg-imm).
pub fn alu_rri(op_idx: u32, size: u32, imm10: u32, src: u32, dest: u32) -> u32 {
    SEL_ALU | (0b01 << 2) | (op_idx << 4) | (size << 8) | (imm10 << 10) | (src << 20) | (dest << 26)
}

/// `op.size dest, imm16` (ALU category 2, quick-immediate).
pub fn alu_ri(op_idx: u32, size: u32, imm16: u32, dest: u32) -> u32 {
    SEL_ALU | (0b10 << 2) | (op_idx << 4) | (size << 8) | (imm16 << 10) | (dest << 26)
}

/// `NOP` (ALU category 0, type 6); `end` sets the end-of-code flag.
pub fn nop(end: bool) -> u32 {
    SEL_ALU | (6 << 4) | (u32::from(end) << 7)
}

/// `XCHG` (ALU category 0, type 2).
pub fn xchg() -> u32 {
    SEL_ALU | (2 << 4)
}

/// `CMP.size left, right` (BRU, reg-reg compare).
pub fn cmp(size: u32, right: u32, left: u32) -> u32 {
    SEL_BRU_OR_AGU | (size << 8) | (right << 20) | (left << 26)
}

/// `CMPI.size reg, imm20` (BRU, outer type 1).
pub fn cmpi(size: u32, imm20: u32, reg: u32) -> u32 {
    SEL_BRU_OR_AGU | (0b01 << 2) | (size << 4) | (imm20 << 6) | (reg << 26)
}

/// `Bcc label` (BRU branching, sub-type 0), `label` a 14-bit raw field
/// (caller pre-computes two's-complement for negative displacements).
pub fn bcc(comparator: u32, label: u32) -> u32 {
    SEL_BRU_OR_AGU | (0b11 << 4) | (0b00 << 6) | (comparator << 8) | (label << 12)
}

/// `CALL label` (BRU branching, sub-type 2, jump/call sub-kind 0),
/// absolute target `label * 2`.
pub fn call(label: u32) -> u32 {
    SEL_BRU_OR_AGU | (0b11 << 4) | (0b10 << 6) | (0 << 8) | (label << 12)
}

/// `RET` (BRU branching, sub-type 3).
pub fn ret() -> u32 {
    SEL_BRU_OR_AGU | (0b11 << 4) | (0b11 << 6)
}

/// `JMP label` (BRU branching, sub-type 2, jump/call sub-kind 1),
/// absolute target `label * 2`.
pub fn jmp(label: u32) -> u32 {
    SEL_BRU_OR_AGU | (0b11 << 4) | (0b10 << 6) | (1 << 8) | (label << 12)
}

/// `LDM.size dest, [base+disp]`; `incr` is 0 or 1.
pub fn ldm(incr: u32, size: u32, disp: u32, base: u32, dest: u32) -> u32 {
    SEL_LSU | (incr << 4) | (0 << 5) | (size << 6) | (disp << 8) | (base << 20) | (dest << 26)
}

/// `STM.size src, [base+disp]`; `incr` is 0 or 1.
pub fn stm(incr: u32, size: u32, disp: u32, base: u32, src: u32) -> u32 {
    SEL_LSU | (incr << 4) | (1 << 5) | (size << 6) | (disp << 8) | (base << 20) | (src << 26)
}

/// `LDDMAR sram_reg, ram_reg, size6` (AGU, list sub-family, type 0).
pub fn lddmar(sram_reg: u32, ram_reg: u32, size6: u32) -> u32 {
    SEL_BRU_OR_AGU | (1 << 2) | (0 << 3) | (0 << 4) | (sram_reg << 8) | (size6 << 14) | (ram_reg << 20)
}

/// `STDMAR sram_reg, ram_reg, size6` (AGU, list sub-family, type 0, store bit set).
pub fn stdmar(sram_reg: u32, ram_reg: u32, size6: u32) -> u32 {
    SEL_BRU_OR_AGU | (1 << 2) | (1 << 3) | (0 << 4) | (sram_reg << 8) | (size6 << 14) | (ram_reg << 20)
}

/// A 14-bit raw field encoding a signed PC-relative word displacement
/// (`disp` may be negative), per the sign-extension rule in §3.
pub fn signed_label14(disp: i32) -> u32 {
    (disp as u32) & 0x3FFF
}
