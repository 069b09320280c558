// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Buffers (caches, TLBs, page tables, memory) and the topology that holds them.

use std::fmt;

/// A storage level of the memory subsystem.
///
/// Only the static properties that matter for hazard generation are kept:
/// geometry (`ways`, `sets`), whether entries carry a tag, whether the buffer
/// evicts entries on its own, and whether the buffer is a pass-through view
/// (`fake`) or the backing memory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Buffer {
    name: String,
    address_space: String,
    ways: usize,
    sets: usize,
    tagged: bool,
    replaceable: bool,
    fake: bool,
    memory: bool,
}

impl Buffer {
    /// A tagged, set-associative buffer (cache or TLB).
    ///
    /// The buffer is replaceable iff it has more than one way; use
    /// [`Buffer::with_replaceable`] for software-managed structures.
    pub fn cache(name: &str, address_space: &str, ways: usize, sets: usize) -> Self {
        assert!(ways > 0, "Buffer {} must have at least one way", name);
        assert!(sets > 0, "Buffer {} must have at least one set", name);
        Self {
            name: String::from(name),
            address_space: String::from(address_space),
            ways,
            sets,
            tagged: true,
            replaceable: ways > 1,
            fake: false,
            memory: false,
        }
    }

    /// The backing-memory level. Never takes part in cross hazards.
    pub fn memory(name: &str, address_space: &str) -> Self {
        Self {
            name: String::from(name),
            address_space: String::from(address_space),
            ways: 1,
            sets: 1,
            tagged: false,
            replaceable: false,
            fake: false,
            memory: true,
        }
    }

    /// Mark the buffer as a pass-through view of another buffer.
    pub fn as_fake(mut self) -> Self {
        self.fake = true;
        self
    }

    /// Drop the tag: entries are selected by index alone.
    pub fn untagged(mut self) -> Self {
        self.tagged = false;
        self
    }

    pub fn with_replaceable(mut self, replaceable: bool) -> Self {
        self.replaceable = replaceable;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address_space(&self) -> &str {
        &self.address_space
    }

    /// Associativity: the number of accesses needed to force an eviction.
    pub fn ways(&self) -> usize {
        self.ways
    }

    pub fn sets(&self) -> usize {
        self.sets
    }

    pub fn is_tagged(&self) -> bool {
        self.tagged
    }

    pub fn is_replaceable(&self) -> bool {
        self.replaceable
    }

    pub fn is_fake(&self) -> bool {
        self.fake
    }

    pub fn is_memory(&self) -> bool {
        self.memory
    }

    /// Whether two accesses to this buffer may be linked by a hazard at all.
    pub fn is_hazard_eligible(&self) -> bool {
        !self.fake && !self.memory
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The buffer graph of a memory subsystem, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct MemoryTopology {
    buffers: Vec<Buffer>,
}

impl MemoryTopology {
    pub fn new(buffers: Vec<Buffer>) -> Self {
        Self { buffers }
    }

    pub fn buffers(&self) -> &[Buffer] {
        &self.buffers
    }

    /// Look up a buffer by name.
    pub fn buffer(&self, name: &str) -> Option<&Buffer> {
        self.buffers.iter().find(|b| b.name == name)
    }

    /// All buffers indexed by the given address space.
    pub fn buffers_in<'a>(
        &'a self,
        address_space: &'a str,
    ) -> impl Iterator<Item = &'a Buffer> + 'a {
        self.buffers
            .iter()
            .filter(move |b| b.address_space == address_space)
    }
}
