//! Unit/integration test groups.
//!
//! This module performs:
//! 1. The six named end-to-end scenarios E1-E6 ([`scenarios`]).
//! 2. The quantified architectural invariants ([`invariants`]).
//! 3. Assemble-then-decode round-trip properties per opcode family
//!    ([`isa`]).
//! 4. The ten-entry branch comparator truth table, parameterized over
//!    both the comparator and representative operand pairs
//!    ([`branch_truth_table`]).

pub mod invariants;
pub mod isa;
