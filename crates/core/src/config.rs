//! Construction-time configuration for processors and the virtual
//! machine that owns them.
//!
//! This module performs:
//! 1. Definition of [`MemoryConfig`], the per-processor buffer sizes.
//! 2. Definition of [`Config`], the top-level construction parameters.
//! 3. Validation that the configured sizes satisfy the data model's
//!    invariants (§3: `ISRAM_SIZE` a multiple of 16).

use serde::Deserialize;

use crate::common::{CACHE_SIZE, DSRAM_SIZE, IOSRAM_SIZE, ISRAM_SIZE, MAX_PHYSICAL_MEMORIES, MAX_PROCESSORS};

/// Per-processor buffer sizes.
///
/// All sizes are in bytes. `isram_size` must be a multiple of 16 (the
/// data model's stated invariant, needed so that a 4-word XCHG-mode
/// bundle fetch never straddles a half-word boundary at the buffer's
/// edge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub isram_size: usize,
    pub dsram_size: usize,
    pub iosram_size: usize,
    pub cache_size: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            isram_size: ISRAM_SIZE,
            dsram_size: DSRAM_SIZE,
            iosram_size: IOSRAM_SIZE,
            cache_size: CACHE_SIZE,
        }
    }
}

impl MemoryConfig {
    /// Checks the invariants the data model (§3) requires of these
    /// sizes.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invariant violated.
    pub fn validate(&self) -> Result<(), String> {
        if self.isram_size == 0 {
            return Err("isram_size must be non-zero".to_owned());
        }
        if self.isram_size % 16 != 0 {
            return Err(format!(
                "isram_size ({}) must be a multiple of 16",
                self.isram_size
            ));
        }
        if self.dsram_size == 0 {
            return Err("dsram_size must be non-zero".to_owned());
        }
        if self.iosram_size == 0 {
            return Err("iosram_size must be non-zero".to_owned());
        }
        if self.cache_size == 0 {
            return Err("cache_size must be non-zero".to_owned());
        }
        Ok(())
    }
}

/// Top-level engine configuration: buffer sizes plus the capacity of
/// the owning virtual machine's handle table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub memory: MemoryConfig,
    pub max_processors: usize,
    pub max_physical_memories: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memory: MemoryConfig::default(),
            max_processors: MAX_PROCESSORS,
            max_physical_memories: MAX_PHYSICAL_MEMORIES,
        }
    }
}

impl Config {
    /// Validates the embedded [`MemoryConfig`] and the handle-table
    /// capacities.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invariant violated.
    pub fn validate(&self) -> Result<(), String> {
        self.memory.validate()?;
        if self.max_processors == 0 {
            return Err("max_processors must be non-zero".to_owned());
        }
        Ok(())
    }
}
