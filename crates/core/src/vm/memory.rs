//! Physical memory devices reachable by a processor's DMA engine.
//!
//! A plain `Vec<u8>` backing store: Altair Relaxed's memories are small
//! and short-lived, so there is no need for lazy `mmap`-backed paging,
//! shared ownership through an `Arc`, or a raw-pointer escape hatch.

use crate::common::EngineError;

/// A byte-addressable physical memory device a processor's AGU can
/// reach via `LDDMA`/`STDMA`/`LDDMAR`/`STDMAR`/`DMAIR` (§4.6).
#[derive(Debug, Clone)]
pub struct PhysicalMemory {
    bytes: Vec<u8>,
}

impl PhysicalMemory {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self { bytes: vec![0u8; size] }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Loads `data` at `offset`, for staging a boot image ahead of the
    /// first `execute_dma` call.
    ///
    /// # Errors
    ///
    /// [`EngineError::PhysicalMemoryOutOfRange`] if `data` would run
    /// past the end of this device.
    pub fn load(&mut self, data: &[u8], offset: usize) -> Result<(), EngineError> {
        let end = offset.checked_add(data.len()).ok_or(EngineError::PhysicalMemoryOutOfRange)?;
        if end > self.bytes.len() {
            return Err(EngineError::PhysicalMemoryOutOfRange);
        }
        self.bytes[offset..end].copy_from_slice(data);
        Ok(())
    }
}
