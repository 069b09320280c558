// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Transitive closure of equality relations.
//!
//! If accesses 0 and 1 share the L1 tag, and 1 and 2 do too, then 0 and 2
//! must share it as well. A structure that omits the implied hazard (or
//! asserts an inequality instead) is either redundant or unsatisfiable.
//!
//! `TAG_REPLACED(i, j)` also contributes to the `TAG_EQUAL` relation: the tag
//! that `j` looks up equals the one `i` loaded before it was evicted. That
//! evicted copy gets node `-(i + 1)` so that it stays distinct from `i`
//! itself (and from access 0).

use std::collections::{BTreeMap, BTreeSet};

use log::trace;

use crate::hazard::HazardKind;
use crate::structure::MemoryAccessStructure;

type Relation = BTreeMap<i64, BTreeSet<i64>>;

fn link(relation: &mut Relation, a: i64, b: i64) {
    relation.entry(a).or_default().insert(b);
    relation.entry(b).or_default().insert(a);
}

/// Equality relations of a structure, keyed by `<buffer>.<KIND>`.
pub fn equal_relations(structure: &MemoryAccessStructure) -> BTreeMap<String, Relation> {
    let mut relations: BTreeMap<String, Relation> = BTreeMap::new();

    for j in 0..structure.size() {
        for i in 0..j {
            let Some(dependency) = structure.dependency(i, j) else {
                continue;
            };
            for hazard in dependency.hazards() {
                let (a, b) = (i as i64, j as i64);
                if hazard.kind().is_equality() {
                    link(relations.entry(hazard.full_name()).or_default(), a, b);
                } else if hazard.kind() == HazardKind::TagReplaced {
                    let name = format!("{}.{}", hazard.buffer().name(), HazardKind::TagEqual);
                    link(relations.entry(name).or_default(), -(a + 1), b);
                }
            }
        }
    }

    relations
}

fn is_closed(relation: &Relation) -> bool {
    relation.iter().all(|(_, neighbours)| {
        neighbours.iter().all(|a| {
            neighbours
                .iter()
                .filter(|c| *c != a)
                .all(|c| relation.get(a).is_some_and(|linked| linked.contains(c)))
        })
    })
}

/// Reject structures whose equality relations are not transitively closed.
pub fn unclosed_equal_relations(structure: &MemoryAccessStructure) -> bool {
    for (name, relation) in equal_relations(structure) {
        if !is_closed(&relation) {
            trace!("{} is not transitively closed", name);
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hazard::{BufferDependency, Hazard};
    use crate::model::{
        AccessPath, Buffer, BufferAccess, BufferAccessEvent, MemoryAccess, MemoryAccessType,
    };

    fn structure(n: usize, hazards: &[(usize, usize, HazardKind)]) -> MemoryAccessStructure {
        let l1 = Buffer::cache("L1", "PA", 4, 128);
        let entry = BufferAccess::new(l1, BufferAccessEvent::Hit);
        let path = AccessPath::new(vec![entry.clone()]);
        let accesses = (0..n)
            .map(|_| MemoryAccess::new(MemoryAccessType::load(8), path.clone()))
            .collect();
        let mut matrix = vec![vec![None; n]; n];
        for (i, j, kind) in hazards {
            let hazard = Hazard::new(*kind, entry.clone(), entry.clone());
            matrix[*i][*j] = Some(BufferDependency::new().with(hazard));
        }
        MemoryAccessStructure::new(accesses, matrix)
    }

    #[test]
    fn test_open_chain_rejected() {
        use HazardKind::*;
        let open = structure(3, &[(0, 1, TagEqual), (1, 2, TagEqual), (0, 2, TagNotEqual)]);
        assert!(!unclosed_equal_relations(&open));

        let closed = structure(3, &[(0, 1, TagEqual), (1, 2, TagEqual), (0, 2, TagEqual)]);
        assert!(unclosed_equal_relations(&closed));
    }

    #[test]
    fn test_replaced_uses_negated_node() {
        use HazardKind::*;
        let s = structure(3, &[(0, 1, TagReplaced), (0, 2, IndexEqual), (1, 2, TagEqual)]);
        let relations = equal_relations(&s);
        let tag_equal = &relations["L1.TAG_EQUAL"];
        assert_eq!(tag_equal[&-1], BTreeSet::from([1]));
        assert_eq!(tag_equal[&1], BTreeSet::from([-1, 2]));
        // -1 ~ 1 ~ 2 without -1 ~ 2.
        assert!(!unclosed_equal_relations(&s));

        let s = structure(2, &[(0, 1, TagReplaced)]);
        assert!(unclosed_equal_relations(&s));
    }

    #[test]
    fn test_inequalities_ignored() {
        use HazardKind::*;
        let s = structure(3, &[(0, 1, TagNotEqual), (1, 2, IndexNotEqual)]);
        assert!(equal_relations(&s).is_empty());
        assert!(unclosed_equal_relations(&s));
    }
}
