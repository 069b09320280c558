// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Aggregation of all dependencies of one access on its earlier partners.
//!
//! For access `j`, the united dependency answers questions such as "which
//! earlier accesses share the L1 tag with `j`?" without walking the
//! dependency matrix. Relations are sets of partner indices.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::{BufferDependency, HazardKind};
use crate::model::Buffer;

/// Every hazard on one buffer linking an access to its earlier partners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitedHazard {
    buffer: Buffer,
    relations: BTreeMap<HazardKind, BTreeSet<usize>>,
}

impl UnitedHazard {
    fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            relations: BTreeMap::new(),
        }
    }

    fn add(&mut self, kind: HazardKind, partner: usize) {
        self.relations.entry(kind).or_default().insert(partner);
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    /// Partners linked by `kind`; empty if none.
    pub fn relation(&self, kind: HazardKind) -> BTreeSet<usize> {
        self.relations.get(&kind).cloned().unwrap_or_default()
    }

    pub fn tag_equal_relation(&self) -> BTreeSet<usize> {
        self.relation(HazardKind::TagEqual)
    }

    pub fn tag_replaced_relation(&self) -> BTreeSet<usize> {
        self.relation(HazardKind::TagReplaced)
    }

    /// Partners in the same set: index equality or any tag relation.
    pub fn index_equal_relation(&self) -> BTreeSet<usize> {
        self.relations
            .iter()
            .filter(|(kind, _)| kind.implies_index_equal())
            .flat_map(|(_, partners)| partners.iter().copied())
            .collect()
    }
}

impl fmt::Display for UnitedHazard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .relations
            .iter()
            .map(|(kind, partners)| format!("{}.{}={:?}", self.buffer, kind, partners))
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

type Relations = BTreeMap<HazardKind, BTreeSet<usize>>;

/// Per-buffer united hazards of one access, in first-seen buffer order, plus
/// the address relations per address space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitedDependency {
    hazards: Vec<UnitedHazard>,
    addresses: BTreeMap<String, Relations>,
}

impl UnitedDependency {
    /// Unite `(partner index, dependency)` pairs.
    pub fn new<'a, I>(row: I) -> Self
    where
        I: IntoIterator<Item = (usize, &'a BufferDependency)>,
    {
        let mut united = Self::default();
        for (partner, dependency) in row {
            for hazard in dependency.hazards() {
                if hazard.is_address() {
                    united
                        .addresses
                        .entry(String::from(hazard.address_space()))
                        .or_default()
                        .entry(hazard.kind())
                        .or_default()
                        .insert(partner);
                } else {
                    united.entry(hazard.buffer()).add(hazard.kind(), partner);
                }
            }
        }
        united
    }

    fn entry(&mut self, buffer: &Buffer) -> &mut UnitedHazard {
        let position = match self
            .hazards
            .iter()
            .position(|h| h.buffer.name() == buffer.name())
        {
            Some(position) => position,
            None => {
                self.hazards.push(UnitedHazard::new(buffer.clone()));
                self.hazards.len() - 1
            }
        };
        &mut self.hazards[position]
    }

    pub fn hazards(&self) -> &[UnitedHazard] {
        &self.hazards
    }

    pub fn hazard(&self, buffer: &str) -> Option<&UnitedHazard> {
        self.hazards.iter().find(|h| h.buffer.name() == buffer)
    }

    /// United hazards of the buffers indexed by `address_space`.
    pub fn hazards_in<'a>(
        &'a self,
        address_space: &'a str,
    ) -> impl Iterator<Item = &'a UnitedHazard> + 'a {
        self.hazards
            .iter()
            .filter(move |h| h.buffer.address_space() == address_space)
    }

    pub fn relation(&self, buffer: &str, kind: HazardKind) -> BTreeSet<usize> {
        self.hazard(buffer)
            .map(|h| h.relation(kind))
            .unwrap_or_default()
    }

    /// Partners whose `address_space` addresses are linked to this access
    /// by `kind`.
    pub fn address_relation(&self, address_space: &str, kind: HazardKind) -> BTreeSet<usize> {
        self.addresses
            .get(address_space)
            .and_then(|relations| relations.get(&kind))
            .cloned()
            .unwrap_or_default()
    }

    pub fn address_equal_relation(&self, address_space: &str) -> BTreeSet<usize> {
        self.address_relation(address_space, HazardKind::AddrEqual)
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty() && self.addresses.is_empty()
    }
}

impl fmt::Display for UnitedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        for (space, relations) in &self.addresses {
            for (kind, partners) in relations {
                parts.push(format!("{}.{}={:?}", space, kind, partners));
            }
        }
        parts.extend(self.hazards.iter().map(|h| h.to_string()));
        write!(f, "[{}]", parts.join("; "))
    }
}
