//! The virtual machine: a fixed-capacity handle table over processors
//! and physical memory devices, and the driver calls (§6) that operate
//! on them by handle.
//!
//! A fixed-size, slot-indexed table: free slots are reused, capacity is
//! bounded at construction time, and a handle is simply that slot's
//! index, typed by what it indexes so a processor handle can never be
//! passed where a memory handle is expected.

pub mod memory;

use std::marker::PhantomData;

use crate::common::{EngineError, StepOutcome, StepResult};
use crate::config::Config;
use crate::core::{Processor, ProcessorInit};

pub use memory::PhysicalMemory;

/// A typed index into one of [`VirtualMachine`]'s handle tables.
#[derive(Debug)]
pub struct Handle<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    const fn new(index: u32) -> Self {
        Self { index, _marker: PhantomData }
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for Handle<T> {}
impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}
impl<T> Eq for Handle<T> {}

pub type ProcessorHandle = Handle<Processor>;
pub type MemoryHandle = Handle<PhysicalMemory>;

/// Owns every processor and physical memory device created against one
/// configuration, and is the sole caller of the DMA engine — it is the
/// one place that can see both a `Processor` and the `PhysicalMemory`
/// its pending DMA request reaches, so `Processor` itself never needs a
/// back-reference to its owner (§9).
#[derive(Debug)]
pub struct VirtualMachine {
    config: Config,
    processors: Vec<Option<Processor>>,
    memories: Vec<Option<PhysicalMemory>>,
}

impl VirtualMachine {
    /// Builds an empty virtual machine with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCode`] if `config` fails
    /// validation.
    pub fn new(config: Config) -> Result<Self, EngineError> {
        config.validate().map_err(|_| EngineError::InvalidCode)?;
        Ok(Self {
            config,
            processors: Vec::new(),
            memories: Vec::new(),
        })
    }

    /// Creates a processor booted with `boot_code`, per §6
    /// `create_processor`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidCode`] if `boot_code` is empty.
    /// - [`EngineError::HostOutOfMemory`] if the handle table is already
    ///   at `max_processors` capacity.
    pub fn create_processor(&mut self, boot_code: &[u32]) -> Result<ProcessorHandle, EngineError> {
        let processor = Processor::new(ProcessorInit { boot_code, memory: self.config.memory })?;
        insert(&mut self.processors, processor, self.config.max_processors)
    }

    /// Creates a physical memory device of `size` bytes, per §6
    /// `create_physical_memory`.
    ///
    /// # Errors
    ///
    /// [`EngineError::HostOutOfMemory`] if the handle table is already
    /// at `max_physical_memories` capacity.
    pub fn create_physical_memory(&mut self, size: usize) -> Result<MemoryHandle, EngineError> {
        insert(&mut self.memories, PhysicalMemory::new(size), self.config.max_physical_memories)
    }

    #[must_use]
    pub fn processor(&self, handle: ProcessorHandle) -> Option<&Processor> {
        self.processors.get(handle.index as usize)?.as_ref()
    }

    pub fn processor_mut(&mut self, handle: ProcessorHandle) -> Option<&mut Processor> {
        self.processors.get_mut(handle.index as usize)?.as_mut()
    }

    #[must_use]
    pub fn physical_memory(&self, handle: MemoryHandle) -> Option<&PhysicalMemory> {
        self.memories.get(handle.index as usize)?.as_ref()
    }

    pub fn physical_memory_mut(&mut self, handle: MemoryHandle) -> Option<&mut PhysicalMemory> {
        self.memories.get_mut(handle.index as usize)?.as_mut()
    }

    /// Drops the processor at `handle`, freeing its slot for reuse.
    pub fn destroy_processor(&mut self, handle: ProcessorHandle) {
        if let Some(slot) = self.processors.get_mut(handle.index as usize) {
            *slot = None;
        }
    }

    /// Drops the physical memory at `handle`, freeing its slot for
    /// reuse.
    pub fn destroy_physical_memory(&mut self, handle: MemoryHandle) {
        if let Some(slot) = self.memories.get_mut(handle.index as usize) {
            *slot = None;
        }
    }

    /// §4.1: decodes the processor at `handle`'s next bundle.
    ///
    /// # Errors
    ///
    /// [`EngineError::IllegalInstruction`] if `handle` names no live
    /// processor, or is surfaced from the decoder itself.
    pub fn decode_instruction(&mut self, handle: ProcessorHandle) -> Result<(), EngineError> {
        self.processor_mut(handle).ok_or(EngineError::IllegalInstruction)?.decode_instruction()
    }

    /// §4.4–§4.5: executes the processor at `handle`'s current bundle.
    ///
    /// # Errors
    ///
    /// [`EngineError::IllegalInstruction`] if `handle` names no live
    /// processor, or is surfaced from the executor.
    pub fn execute_instruction(&mut self, handle: ProcessorHandle) -> StepResult {
        self.processor_mut(handle).ok_or(EngineError::IllegalInstruction)?.execute_instruction()
    }

    /// §4.6: completes `handle`'s pending DMA request against
    /// `memory`, the physical memory device named by `memory` if any.
    /// Called by the host after every `execute_instruction` step,
    /// whether or not that bundle staged a request — a no-op when none
    /// is pending.
    ///
    /// # Errors
    ///
    /// - [`EngineError::IllegalInstruction`] if `handle` names no live
    ///   processor, or a DMA is pending that needs a physical memory
    ///   device and none is attached.
    /// - [`EngineError::PhysicalMemoryOutOfRange`] if `memory` names no
    ///   live device while the pending request needs one, or the
    ///   transfer would run past its end.
    /// - [`EngineError::MemoryOutOfRange`] if the SRAM-side transfer
    ///   would run past `dsram`'s end.
    pub fn execute_dma(&mut self, handle: ProcessorHandle, memory: Option<MemoryHandle>) -> StepResult {
        // Check the pending flag before resolving `memory`, so a step that
        // staged no DMA request stays a no-op even if `memory` names a
        // since-destroyed handle — the host calls this every step, not
        // only when it knows a DMA is pending.
        if !self.processor(handle).ok_or(EngineError::IllegalInstruction)?.dma_pending() {
            return Ok(StepOutcome::Continue);
        }
        let memory_slice = match memory {
            Some(h) => Some(self.memories.get_mut(h.index as usize).and_then(Option::as_mut).ok_or(EngineError::PhysicalMemoryOutOfRange)?.as_mut_slice()),
            None => None,
        };
        let processor = self.processor_mut(handle).ok_or(EngineError::IllegalInstruction)?;
        crate::core::execute::dma::execute(processor, memory_slice)
    }
}

fn insert<T>(slots: &mut Vec<Option<T>>, value: T, capacity: usize) -> Result<Handle<T>, EngineError> {
    if let Some(index) = slots.iter().position(Option::is_none) {
        slots[index] = Some(value);
        return Ok(Handle::new(index as u32));
    }
    if slots.len() >= capacity {
        return Err(EngineError::HostOutOfMemory);
    }
    slots.push(Some(value));
    Ok(Handle::new((slots.len() - 1) as u32))
}
