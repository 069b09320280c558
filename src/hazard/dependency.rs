// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use std::fmt;

use super::Hazard;

/// An immutable set of hazards between two accesses, at most one per pair
/// of buffer accesses and scope.
///
/// Adding a hazard produces a new dependency; the enumerator extends partial
/// candidates this way without disturbing the ones it has already kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BufferDependency {
    hazards: Vec<Hazard>,
}

impl BufferDependency {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy with `hazard` added, replacing any hazard of the same scope on
    /// the same pair of buffer accesses.
    pub fn with(&self, hazard: Hazard) -> Self {
        let mut hazards: Vec<Hazard> = self
            .hazards
            .iter()
            .filter(|h| {
                h.scope() != hazard.scope()
                    || h.primary() != hazard.primary()
                    || h.secondary() != hazard.secondary()
            })
            .cloned()
            .collect();
        hazards.push(hazard);
        Self { hazards }
    }

    pub fn hazards(&self) -> &[Hazard] {
        &self.hazards
    }

    /// The first hazard on `buffer`.
    pub fn hazard_for(&self, buffer: &str) -> Option<&Hazard> {
        self.hazards
            .iter()
            .find(|h| !h.is_address() && h.buffer().name() == buffer)
    }

    /// The hazard on the addresses of `address_space`.
    pub fn address_hazard(&self, address_space: &str) -> Option<&Hazard> {
        self.hazards
            .iter()
            .find(|h| h.is_address() && h.address_space() == address_space)
    }

    pub fn len(&self) -> usize {
        self.hazards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty()
    }
}

impl fmt::Display for BufferDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.hazards.iter().map(|h| h.full_name()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hazard::HazardKind;
    use crate::model::{Buffer, BufferAccess, BufferAccessEvent};

    fn hazard(buffer: &Buffer, kind: HazardKind) -> Hazard {
        Hazard::new(
            kind,
            BufferAccess::new(buffer.clone(), BufferAccessEvent::Hit),
            BufferAccess::new(buffer.clone(), BufferAccessEvent::Hit),
        )
    }

    #[test]
    fn test_with_is_persistent() {
        let l1 = Buffer::cache("L1", "PA", 4, 128);
        let l2 = Buffer::cache("L2", "PA", 8, 1024);
        let empty = BufferDependency::new();
        let one = empty.with(hazard(&l1, HazardKind::TagEqual));
        let two = one.with(hazard(&l2, HazardKind::IndexNotEqual));

        assert!(empty.is_empty());
        assert_eq!(one.len(), 1);
        assert_eq!(two.to_string(), "{L1.TAG_EQUAL, L2.INDEX_NOT_EQUAL}");
        assert_eq!(
            two.hazard_for("L2").map(|h| h.kind()),
            Some(HazardKind::IndexNotEqual)
        );
        assert!(one.hazard_for("L2").is_none());
    }

    #[test]
    fn test_one_hazard_per_access_pair() {
        let l1 = Buffer::cache("L1", "PA", 4, 128);
        let dependency = BufferDependency::new()
            .with(hazard(&l1, HazardKind::TagEqual))
            .with(hazard(&l1, HazardKind::TagReplaced));
        assert_eq!(dependency.len(), 1);
        assert_eq!(dependency.hazards()[0].kind(), HazardKind::TagReplaced);

        // A second line of the same buffer on the later path is a distinct pair.
        let second_line = Hazard::new(
            HazardKind::TagEqual,
            BufferAccess::new(l1.clone(), BufferAccessEvent::Hit),
            BufferAccess::new(l1.clone(), BufferAccessEvent::Hit)
                .with_expressions("t2", "i2", "o2"),
        );
        let dependency = dependency.with(second_line);
        assert_eq!(dependency.len(), 2);
        assert_eq!(
            dependency.hazard_for("L1").map(|h| h.kind()),
            Some(HazardKind::TagReplaced)
        );
    }

    #[test]
    fn test_address_and_buffer_hazards_coexist() {
        let l1 = Buffer::cache("L1", "PA", 4, 128);
        let entry = BufferAccess::new(l1.clone(), BufferAccessEvent::Hit);
        let dependency = BufferDependency::new()
            .with(Hazard::address(HazardKind::AddrEqual, entry.clone(), entry.clone()))
            .with(hazard(&l1, HazardKind::TagEqual));

        assert_eq!(dependency.to_string(), "{PA.ADDR_EQUAL, L1.TAG_EQUAL}");
        assert_eq!(dependency.hazard_for("L1").map(|h| h.kind()), Some(HazardKind::TagEqual));
        assert_eq!(
            dependency.address_hazard("PA").map(|h| h.kind()),
            Some(HazardKind::AddrEqual)
        );
        assert!(dependency.address_hazard("VA").is_none());
    }
}
