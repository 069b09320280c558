// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Hazards: typed relations between two accesses to the same buffer, or to
//! the same address space.
//!
//! A hazard is a combinatorial placeholder. `TAG_EQUAL` on `L1` between
//! accesses `i` and `j` says "the solver must pick addresses whose L1 tags
//! coincide"; whether that is numerically possible is decided later.
//! `PA.ADDR_EQUAL` says the two physical addresses coincide.
//!
//! The module is split into:
//! - [`catalog`]: which kinds a buffer admits
//! - [`dependency`]: immutable hazard sets between two accesses
//! - [`united`]: per-access aggregation over all earlier partners

pub mod catalog;
pub mod dependency;
pub mod united;

pub use catalog::{address_hazard_kinds, hazard_kinds, possible_address_hazards, possible_hazards};
pub use dependency::BufferDependency;
pub use united::{UnitedDependency, UnitedHazard};

use std::fmt;
use strum_macros::{Display, EnumIter};

use crate::model::{Buffer, BufferAccess};

/// The relation a hazard asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum HazardKind {
    AddrEqual,
    AddrNotEqual,
    IndexEqual,
    IndexNotEqual,
    TagEqual,
    TagNotEqual,
    TagReplaced,
    TagNotReplaced,
}

impl HazardKind {
    /// Equality relations must be transitively closed across a structure.
    pub fn is_equality(self) -> bool {
        matches!(
            self,
            HazardKind::AddrEqual | HazardKind::IndexEqual | HazardKind::TagEqual
        )
    }

    /// Kinds that imply the two accesses land in the same set.
    pub fn implies_index_equal(self) -> bool {
        matches!(
            self,
            HazardKind::IndexEqual
                | HazardKind::TagEqual
                | HazardKind::TagNotEqual
                | HazardKind::TagReplaced
                | HazardKind::TagNotReplaced
        )
    }
}

/// What a hazard relates: the entries of one buffer, or the whole addresses
/// of the buffer's address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HazardScope {
    Buffer,
    Address,
}

/// One hazard between `primary` (the earlier access) and `secondary`.
///
/// Address hazards keep the first shared buffer access of their address
/// space as `primary`/`secondary`, so they stay anchored to both paths.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hazard {
    scope: HazardScope,
    kind: HazardKind,
    primary: BufferAccess,
    secondary: BufferAccess,
}

impl Hazard {
    /// # Panics
    ///
    /// Panics if the two buffer accesses are not on the same buffer.
    pub fn new(kind: HazardKind, primary: BufferAccess, secondary: BufferAccess) -> Self {
        assert!(
            primary.same_buffer(&secondary),
            "Hazard {} links different buffers: {} and {}",
            kind,
            primary.buffer(),
            secondary.buffer()
        );
        Self {
            scope: HazardScope::Buffer,
            kind,
            primary,
            secondary,
        }
    }

    /// A hazard on the addresses of the space `primary`'s buffer indexes.
    ///
    /// # Panics
    ///
    /// Panics if the two buffer accesses are not on the same buffer.
    pub fn address(kind: HazardKind, primary: BufferAccess, secondary: BufferAccess) -> Self {
        Self {
            scope: HazardScope::Address,
            ..Self::new(kind, primary, secondary)
        }
    }

    pub fn scope(&self) -> HazardScope {
        self.scope
    }

    pub fn is_address(&self) -> bool {
        self.scope == HazardScope::Address
    }

    pub fn kind(&self) -> HazardKind {
        self.kind
    }

    pub fn primary(&self) -> &BufferAccess {
        &self.primary
    }

    pub fn secondary(&self) -> &BufferAccess {
        &self.secondary
    }

    pub fn buffer(&self) -> &Buffer {
        self.primary.buffer()
    }

    pub fn address_space(&self) -> &str {
        self.buffer().address_space()
    }

    /// Relation name, e.g. `L1.TAG_EQUAL` or `PA.ADDR_EQUAL`.
    pub fn full_name(&self) -> String {
        match self.scope {
            HazardScope::Buffer => format!("{}.{}", self.buffer().name(), self.kind),
            HazardScope::Address => format!("{}.{}", self.address_space(), self.kind),
        }
    }
}

impl fmt::Display for Hazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}
