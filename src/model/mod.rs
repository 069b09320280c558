// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Static memory-subsystem model and the accesses that flow through it.

pub mod access;
pub mod buffer;
pub mod context;
pub mod path;

pub use access::{MemoryAccess, MemoryAccessType, MemoryOperation};
pub use buffer::{Buffer, MemoryTopology};
pub use context::{AccessContext, ContextFrame};
pub use path::{AccessPath, BufferAccess, BufferAccessEvent};
