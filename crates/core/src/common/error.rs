//! Engine error types and the wire-stable result-code mapping used by
//! the handle-based driver calls.

use thiserror::Error;

/// Everything that can go wrong inside a single `decode`, `execute`, or
/// `execute_dma` driver call.
///
/// Every variant maps to exactly one [`ResultCode`] via [`EngineError::result_code`].
/// Nothing here is recovered internally: a driver call either succeeds
/// or returns one of these, and the caller decides whether to keep
/// driving the processor.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    /// Decode hit an unknown sub-opcode, a reserved bit pattern, a
    /// non-ALU/VFPU selection in slots 2/3, an illegal branch
    /// comparator, an illegal AGU list type, or execute found a live
    /// delayed slot holding anything other than a control-flow op.
    #[error("illegal instruction")]
    IllegalInstruction,

    /// `create_processor` was called with empty or mis-sized boot code.
    #[error("invalid boot code")]
    InvalidCode,

    /// An SRAM, ISRAM, or cache transfer would exceed the target
    /// buffer's length.
    #[error("memory access out of range")]
    MemoryOutOfRange,

    /// A DMA transfer's RAM-side address and size exceed the attached
    /// physical memory device's declared size.
    #[error("physical memory access out of range")]
    PhysicalMemoryOutOfRange,

    /// A host-side allocation (e.g. growing the virtual machine's
    /// handle table) failed.
    #[error("host out of memory")]
    HostOutOfMemory,
}

impl EngineError {
    /// The wire-stable integer this error surfaces as across the
    /// handle-based external interface (§6).
    #[must_use]
    pub const fn result_code(self) -> i32 {
        match self {
            Self::IllegalInstruction => ResultCode::ILLEGAL_INSTRUCTION,
            Self::InvalidCode => ResultCode::INVALID_CODE,
            Self::MemoryOutOfRange => ResultCode::MEMORY_OUT_OF_RANGE,
            Self::PhysicalMemoryOutOfRange => ResultCode::PHYSICAL_MEMORY_OUT_OF_RANGE,
            Self::HostOutOfMemory => ResultCode::HOST_OUT_OF_MEMORY,
        }
    }
}

/// Wire-stable integer result codes, exactly as named in §6.
/// Implementations may add further negative codes; `SUCCESS`
/// and `END_OF_CODE` are the only non-negative values.
#[allow(non_snake_case, reason = "mirrors the wire contract's naming exactly")]
pub struct ResultCode;

impl ResultCode {
    pub const SUCCESS: i32 = 0;
    pub const END_OF_CODE: i32 = 1;
    pub const ILLEGAL_INSTRUCTION: i32 = -1;
    pub const INVALID_CODE: i32 = -2;
    pub const MEMORY_OUT_OF_RANGE: i32 = -3;
    pub const PHYSICAL_MEMORY_OUT_OF_RANGE: i32 = -4;
    pub const HOST_OUT_OF_MEMORY: i32 = -256;
}

/// The non-error outcome of a driver call: either the step completed
/// normally, or it ran a terminal `NOP.e` and the caller should stop
/// driving this processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step completed; the processor may be driven again.
    Continue,
    /// A terminal `NOP` with the end-of-code flag set was consumed.
    EndOfCode,
}

impl StepOutcome {
    /// The wire-stable integer for this outcome.
    #[must_use]
    pub const fn result_code(self) -> i32 {
        match self {
            Self::Continue => ResultCode::SUCCESS,
            Self::EndOfCode => ResultCode::END_OF_CODE,
        }
    }
}

/// Result type returned by every driver call.
pub type StepResult = Result<StepOutcome, EngineError>;
