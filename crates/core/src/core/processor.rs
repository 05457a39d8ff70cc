//! The `Processor`: all per-processor architectural state and the three
//! driver calls (decode / execute / DMA) that operate on it.
//!
//! A flat field set per §3, documented field by field. This struct
//! holds no back-reference to its owning virtual machine: DMA dispatch
//! is performed by [`crate::vm::VirtualMachine::execute_dma`], which
//! holds both the processor and the physical memory it may reach,
//! instead of the processor holding a raw pointer back to its parent.
//! This keeps the "weak relation, never an ownership cycle" guidance
//! from §9 without introducing unsafe back-pointers.

use tracing::{debug, instrument, trace};

use crate::common::{EngineError, StepOutcome, StepResult};
use crate::config::MemoryConfig;

use super::arch::{Flags, FloatRegisterFile, IntegerRegisterFile};
use super::decode::{decode_slot, opcode_set_size};
use super::execute::{delayed, immediate};
use super::operation::Operation;

/// Boot-time configuration for a single processor.
#[derive(Debug, Clone)]
pub struct ProcessorInit<'a> {
    /// Words copied into `isram` starting at offset 0. Must be
    /// non-empty; remaining ISRAM is zeroed.
    pub boot_code: &'a [u32],
    pub memory: MemoryConfig,
}

#[derive(Debug, Clone)]
pub struct Processor {
    pub(crate) ireg: IntegerRegisterFile,
    pub(crate) freg: FloatRegisterFile,
    pub(crate) flags: Flags,
    pub(crate) pc: u32,

    pub(crate) isram: Vec<u8>,
    pub(crate) dsram: Vec<u8>,
    pub(crate) iosram: Vec<u8>,
    pub(crate) cache: Vec<u8>,

    pub(crate) operations: [Option<Operation>; 4],
    pub(crate) bundle_size: u32,

    pub(crate) delayed: [Option<Operation>; 4],
    pub(crate) delayed_bits: u8,

    pub(crate) dma_pending: bool,
    pub(crate) dma_operation: Option<Operation>,
}

impl Processor {
    /// Builds a freshly booted processor: `boot_code` copied into
    /// `isram[0..]`, the rest zeroed, `pc`/`flags`/`delayed_bits`/
    /// `dma_pending` all reset, register files zeroed — exactly the
    /// `create_processor` contract in §6.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCode`] if `boot_code` is empty, or
    /// if `init.memory` fails its own validation (§3's `ISRAM_SIZE`
    /// multiple-of-16 invariant, chiefly).
    pub fn new(init: ProcessorInit<'_>) -> Result<Self, EngineError> {
        if init.boot_code.is_empty() {
            return Err(EngineError::InvalidCode);
        }
        init.memory.validate().map_err(|_| EngineError::InvalidCode)?;

        let mem = init.memory;
        let mut isram = vec![0u8; mem.isram_size];
        for (i, word) in init.boot_code.iter().enumerate() {
            let offset = i * 4;
            if offset + 4 > isram.len() {
                break;
            }
            isram[offset..offset + 4].copy_from_slice(&word.to_le_bytes());
        }

        Ok(Self {
            ireg: IntegerRegisterFile::new(),
            freg: FloatRegisterFile::new(),
            flags: Flags::new(),
            pc: 0,
            isram,
            dsram: vec![0u8; mem.dsram_size],
            iosram: vec![0u8; mem.iosram_size],
            cache: vec![0u8; mem.cache_size],
            operations: [None, None, None, None],
            bundle_size: 0,
            delayed: [None, None, None, None],
            delayed_bits: 0,
            dma_pending: false,
            dma_operation: None,
        })
    }

    #[must_use]
    pub fn ireg(&self) -> &IntegerRegisterFile {
        &self.ireg
    }

    #[must_use]
    pub fn freg(&self) -> &FloatRegisterFile {
        &self.freg
    }

    #[must_use]
    pub const fn flags(&self) -> Flags {
        self.flags
    }

    #[must_use]
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    #[must_use]
    pub fn dsram(&self) -> &[u8] {
        &self.dsram
    }

    #[must_use]
    pub fn dsram_mut(&mut self) -> &mut [u8] {
        &mut self.dsram
    }

    #[must_use]
    pub fn isram(&self) -> &[u8] {
        &self.isram
    }

    #[must_use]
    pub const fn dma_pending(&self) -> bool {
        self.dma_pending
    }

    /// §4.1: fetches and decodes this bundle's slots, advances `pc` by
    /// the bundle size.
    ///
    /// # Errors
    ///
    /// [`EngineError::IllegalInstruction`] if any slot fails to decode.
    #[instrument(level = "trace", skip(self))]
    pub fn decode_instruction(&mut self) -> Result<(), EngineError> {
        let isram_words = (self.isram.len() / 4) as u32;
        let size = opcode_set_size(self.flags.xchg(), self.pc, isram_words);
        trace!(pc = self.pc, size, "decoding bundle");

        let mut operations: [Option<Operation>; 4] = [None, None, None, None];
        for slot in 0..size as usize {
            let byte_offset = (self.pc as usize + slot) * 4;
            // A malformed jump target can point `pc` anywhere; guard the
            // fetch with `get` instead of indexing so an out-of-range
            // bundle surfaces as `MemoryOutOfRange` rather than a panic.
            let word_bytes = self
                .isram
                .get(byte_offset..byte_offset + 4)
                .ok_or(EngineError::MemoryOutOfRange)?;
            let word = u32::from_le_bytes([word_bytes[0], word_bytes[1], word_bytes[2], word_bytes[3]]);
            operations[slot] = Some(decode_slot(slot, self.pc, word)?);
        }

        self.operations = operations;
        self.bundle_size = size;
        self.pc += size;

        Ok(())
    }

    /// §4.4–§4.5: drains last bundle's delayed operations, then applies
    /// this bundle's immediate effects.
    ///
    /// # Errors
    ///
    /// Surfaces [`EngineError::IllegalInstruction`] from either phase.
    #[instrument(level = "trace", skip(self))]
    pub fn execute_instruction(&mut self) -> StepResult {
        // `delayed_bits` indexes the *previous* bundle's slots, which may
        // have been wider than this bundle (e.g. an XCHG-mode 4-word
        // bundle followed by a normal 2-word one): always scan all 4,
        // never just `0..self.bundle_size`.
        for slot in 0..4 {
            if self.delayed_bits & (1 << slot) == 0 {
                continue;
            }
            let Some(op) = self.delayed[slot].take() else {
                self.delayed_bits &= !(1 << slot);
                continue;
            };
            let outcome = delayed::execute(self, op)?;
            self.delayed_bits &= !(1 << slot);
            if matches!(outcome, StepOutcome::EndOfCode) {
                return Ok(StepOutcome::EndOfCode);
            }
        }

        for slot in 0..self.bundle_size as usize {
            let Some(op) = self.operations[slot] else {
                continue;
            };
            immediate::execute(self, slot, op)?;
        }

        debug!(pc = self.pc, "bundle executed");
        Ok(StepOutcome::Continue)
    }

    /// Stages a delayed (control-flow) operation into `delayed[slot]`.
    pub(crate) fn stage_delayed(&mut self, slot: usize, op: Operation) {
        self.delayed[slot] = Some(op);
        self.delayed_bits |= 1 << slot;
    }

    /// Stages a DMA request from the immediate executor (§4.4).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::IllegalInstruction`] if a DMA is already
    /// pending, rather than letting a second request silently overwrite
    /// the first (§9).
    pub(crate) fn stage_dma(&mut self, op: Operation) -> Result<(), EngineError> {
        if self.dma_pending {
            return Err(EngineError::IllegalInstruction);
        }
        self.dma_pending = true;
        self.dma_operation = Some(op);
        Ok(())
    }
}
