// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Memory access structure generation for MMU test generation.
//!
//! A test template names N abstract memory accesses. This crate turns such a
//! template into *structures*: N concrete accesses, each with a path through
//! the buffers of the memory subsystem (TLBs, caches, page tables), plus for
//! every pair of accesses a set of hazards saying how their buffer lookups
//! interact (same tag, same set, entry replaced, ...). A downstream solver
//! later picks addresses that realize a structure.
//!
//! # Architecture
//!
//! Leaves first:
//!
//! - [`model`]: buffers, buffer accesses, paths and memory accesses
//! - [`hazard`]: hazard kinds, the per-buffer catalog, dependencies
//! - [`structure`]: accesses plus the upper-triangular dependency matrix
//! - [`filter`]: consistency filters, composed level by level
//! - [`source`]: the boundary with path classification
//! - [`engine`]: the cursors that enumerate structures
//!
//! # Enumeration
//!
//! [`engine::StructureIterator`] is a pull cursor. In
//! [`engine::Mode::Exhaustive`] it yields every structure that passes the
//! filters, in a deterministic order; in [`engine::Mode::Random`] it samples
//! one structure per randomly drawn access sequence, for as long as the
//! caller keeps asking.
//!
//! Filtering happens twice. While the possible dependencies of a pair are
//! enumerated, partial candidates are checked as two-access structures so
//! hopeless combinations are cut early. Complete candidates are then checked
//! as a whole, with the filters that only make sense for full structures
//! added.

pub mod config;
pub mod engine;
pub mod error;
pub mod filter;
pub mod hazard;
pub mod model;
pub mod source;
pub mod structure;

// Re-export commonly used types
pub use config::GeneratorSettings;
pub use engine::{Cursor, FeasibilityOracle, Mode, StructureIterator};
pub use error::{GeneratorError, Result};
pub use filter::FilterBuilder;
pub use hazard::{BufferDependency, Hazard, HazardKind};
pub use structure::MemoryAccessStructure;
