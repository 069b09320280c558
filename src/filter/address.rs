// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Filters on address hazards.

use log::trace;

use crate::hazard::{BufferDependency, HazardKind, UnitedDependency};
use crate::model::MemoryAccess;

/// Address space of virtual addresses.
pub const VIRTUAL_ADDRESS: &str = "VA";
/// Address space of physical addresses.
pub const PHYSICAL_ADDRESS: &str = "PA";

/// Equal addresses select the same entry in every buffer they index.
pub fn address_equal_buffer_not_equal(
    _first: &MemoryAccess,
    _second: &MemoryAccess,
    dependency: &BufferDependency,
) -> bool {
    for address in dependency.hazards().iter().filter(|h| h.is_address()) {
        if address.kind() != HazardKind::AddrEqual {
            continue;
        }
        let unequal = dependency.hazards().iter().find(|h| {
            !h.is_address()
                && h.address_space() == address.address_space()
                && !h.kind().is_equality()
        });
        if let Some(hazard) = unequal {
            trace!("{} contradicts {}", address, hazard);
            return false;
        }
    }
    true
}

/// One virtual address maps to one physical address.
pub fn va_equal_pa_not_equal(_access: &MemoryAccess, united: &UnitedDependency) -> bool {
    let va_equal = united.address_equal_relation(VIRTUAL_ADDRESS);
    if va_equal.is_empty() {
        return true;
    }
    let pa_not_equal = united.address_relation(PHYSICAL_ADDRESS, HazardKind::AddrNotEqual);
    if let Some(partner) = va_equal.intersection(&pa_not_equal).next() {
        trace!("VA equal but PA not equal to {}", partner);
        return false;
    }
    true
}
