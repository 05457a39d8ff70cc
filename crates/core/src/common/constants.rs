//! Architectural constants referenced across the decoder, executor, and
//! register files.

/// Number of general-purpose integer registers (`ireg`).
pub const IREG_COUNT: usize = 64;

/// Byte width of the aliased float register file (`freg`): 128 single-
/// precision lanes, shared with the 64 double-precision and 32
/// `Vector4f` views.
pub const FREG_BYTES: usize = 128 * 4;

/// Number of single-precision lanes in the float register file.
pub const FREG_F32_LANES: usize = 128;

/// Number of double-precision lanes in the float register file.
pub const FREG_F64_LANES: usize = 64;

/// Number of four-lane vector views in the float register file.
pub const FREG_VEC4_LANES: usize = 32;

/// Bias added to the decoded 3-bit `LDMV`/`STMV`/`LDCV`/`STCV` source
/// field to land on registers `ireg[56..=63]`.
pub const VECTOR_SRC_BIAS: u32 = 56;

/// Bias added to the decoded 2-bit `LDMF`/`STMF`/`LDCF`/`STCF`/`LDMD`/
/// `STMD`/`LDCD`/`STCD` source field.
pub const FLOAT_SRC_BIAS: u32 = 60;

/// Bias added to the decoded 1-bit `LDMX`/`STMX` source field.
pub const LDMX_SRC_BIAS: u32 = 62;

/// Bias added to the decoded `LDDMA`/`STDMA` SRAM-side register field.
pub const DMA_SRAM_BIAS: u32 = 60;

/// Bias added to the decoded `LDDMA`/`STDMA` RAM-side register field.
pub const DMA_RAM_BIAS: u32 = 58;

/// Width, in bits, of the signed label field on branch and jump/call
/// instructions.
pub const LABEL_BITS: u32 = 14;

/// Fixed bundle size, in words, outside XCHG mode.
pub const BUNDLE_SIZE_NORMAL: u32 = 2;

/// Maximum bundle size, in words, inside XCHG mode.
pub const BUNDLE_SIZE_XCHG: u32 = 4;

/// DMA transfer unit: every DMA offset and size is expressed in units of
/// 32 bytes.
pub const DMA_UNIT_BYTES: u64 = 32;

pub(crate) mod defaults {
    /// Default instruction-SRAM size in bytes. Must be a multiple of 16.
    pub const ISRAM_SIZE: usize = 64 * 1024;
    /// Default data-SRAM size in bytes.
    pub const DSRAM_SIZE: usize = 64 * 1024;
    /// Default I/O-SRAM size in bytes.
    pub const IOSRAM_SIZE: usize = 4 * 1024;
    /// Default cache-region size in bytes.
    pub const CACHE_SIZE: usize = 32 * 1024;
    /// Default processor capacity of a [`crate::vm::VirtualMachine`].
    pub const MAX_PROCESSORS: usize = 16;
    /// Default physical-memory-device capacity of a
    /// [`crate::vm::VirtualMachine`].
    pub const MAX_PHYSICAL_MEMORIES: usize = 1;
}

pub use defaults::{
    CACHE_SIZE, DSRAM_SIZE, IOSRAM_SIZE, ISRAM_SIZE, MAX_PHYSICAL_MEMORIES, MAX_PROCESSORS,
};
