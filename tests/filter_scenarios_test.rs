// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Hand-built structures against the composed filter pipeline.

mod common;

use std::collections::BTreeSet;

use common::*;
use mmu_structure_gen::filter::builtin::tag_equal_and_tag_replaced;
use mmu_structure_gen::filter::closure::equal_relations;
use mmu_structure_gen::filter::FilterBuilder;
use mmu_structure_gen::hazard::HazardKind::*;
use mmu_structure_gen::hazard::{BufferDependency, Hazard, HazardKind};
use mmu_structure_gen::model::{
    AccessPath, Buffer, BufferAccess, BufferAccessEvent::*, MemoryAccess,
};
use mmu_structure_gen::MemoryAccessStructure;

fn everything(structure: &MemoryAccessStructure) -> bool {
    let mut builder = FilterBuilder::basic();
    builder.add_builder(&FilterBuilder::advanced());
    builder.build()(structure)
}

fn basic(structure: &MemoryAccessStructure) -> bool {
    FilterBuilder::basic().build()(structure)
}

fn tlb() -> Buffer {
    Buffer::cache("TLB", "VA", 2, 16)
}

#[test]
fn test_miss_needs_enough_evictions() {
    let tlb = tlb();
    let hit = || load(path(&[(&tlb, Hit)]));
    let miss = || load(path(&[(&tlb, Miss)]));

    // One access in the same set before the miss; the TLB has two ways.
    let short = structure(
        vec![hit(), miss(), miss()],
        &[(0, 1, "TLB", TagNotEqual), (0, 2, "TLB", TagEqual)],
    );
    assert!(basic(&short));
    assert!(!everything(&short));

    let long = structure(
        vec![hit(), miss(), miss(), miss()],
        &[
            (0, 1, "TLB", TagNotEqual),
            (0, 2, "TLB", TagNotEqual),
            (0, 3, "TLB", TagEqual),
        ],
    );
    assert!(everything(&long));
}

#[test]
fn test_index_equal_access_is_not_enough() {
    let tlb = tlb();
    let s = structure(
        vec![
            load(path(&[(&tlb, Hit)])),
            load(path(&[(&tlb, Hit)])),
            load(path(&[(&tlb, Miss)])),
        ],
        &[(0, 2, "TLB", TagEqual), (0, 1, "TLB", IndexEqual)],
    );
    assert!(basic(&s));
    assert!(!everything(&s));
}

#[test]
fn test_tag_equality_must_be_closed() {
    let l1 = l1();
    let hits = || (0..3).map(|_| load(path(&[(&l1, Hit)]))).collect::<Vec<_>>();

    let open = structure(hits(), &[(0, 1, "L1", TagEqual), (1, 2, "L1", TagEqual)]);
    assert!(!everything(&open));

    let closed = structure(
        hits(),
        &[
            (0, 1, "L1", TagEqual),
            (1, 2, "L1", TagEqual),
            (0, 2, "L1", TagEqual),
        ],
    );
    assert!(everything(&closed));
}

#[test]
fn test_evictions_must_share_the_set() {
    let tlb = tlb();
    let hit = || load(path(&[(&tlb, Hit)]));
    let miss = || load(path(&[(&tlb, Miss)]));

    let elsewhere = structure(
        vec![hit(), miss(), miss(), miss()],
        &[
            (0, 1, "TLB", IndexNotEqual),
            (0, 2, "TLB", IndexNotEqual),
            (0, 3, "TLB", TagEqual),
        ],
    );
    assert!(!everything(&elsewhere));
}

#[test]
fn test_tag_equal_and_replaced_contradict() {
    let l1 = l1();
    // Two top-level lookups of L1 on each path, with different expressions.
    let two_lookups = |event| {
        load(AccessPath::new(vec![
            BufferAccess::new(l1.clone(), event),
            BufferAccess::new(l1.clone(), event).with_expressions(
                "pte.tag",
                "pte.index",
                "pte.offset",
            ),
        ]))
    };
    let first = two_lookups(Hit);
    let second = two_lookups(Miss);

    let entry = |access: &MemoryAccess, n: usize| access.path().entries()[n].clone();
    let dependency = BufferDependency::new()
        .with(Hazard::new(TagEqual, entry(&first, 0), entry(&second, 0)))
        .with(Hazard::new(TagReplaced, entry(&first, 1), entry(&second, 1)));
    assert_eq!(dependency.len(), 2);

    let contradiction = MemoryAccessStructure::pair(first, second, Some(dependency));
    let united = contradiction.united_dependency(1).hazard("L1").unwrap();
    assert_eq!(united.tag_equal_relation(), BTreeSet::from([0]));
    assert_eq!(united.tag_replaced_relation(), BTreeSet::from([0]));
    assert!(!tag_equal_and_tag_replaced(contradiction.access(1), united));
    assert!(!basic(&contradiction));
}

#[test]
fn test_replaced_entry_cannot_be_tag_equal_later() {
    let l1 = l1();
    let hit = || load(path(&[(&l1, Hit)]));
    let miss = || load(path(&[(&l1, Miss)]));

    // 1 replaced the tag 0 had, 2 matches 1: the replaced tag stands apart.
    let s = structure(
        vec![hit(), miss(), hit()],
        &[
            (0, 1, "L1", TagReplaced),
            (0, 2, "L1", TagNotEqual),
            (1, 2, "L1", TagEqual),
        ],
    );
    let relations = equal_relations(&s);
    assert_eq!(relations["L1.TAG_EQUAL"][&1], BTreeSet::from([-1, 2]));
    assert!(!basic(&s));
}

#[test]
fn test_hit_after_replacement_rejected() {
    let l1 = l1();
    let s = structure(
        vec![load(path(&[(&l1, Hit)])), load(path(&[(&l1, Hit)]))],
        &[(0, 1, "L1", TagReplaced)],
    );
    assert!(!basic(&s));

    let s = structure(
        vec![load(path(&[(&l1, Hit)])), load(path(&[(&l1, Hit)]))],
        &[(0, 1, "L1", TagNotReplaced)],
    );
    assert!(everything(&s));
}

#[test]
fn test_replacement_hit_elsewhere_rejected() {
    let l1 = l1();
    let l2 = Buffer::cache("L2", "PA", 8, 1024);
    let s = structure(
        vec![
            load(path(&[(&l1, Miss), (&l2, Hit)])),
            load(path(&[(&l1, Miss), (&l2, Hit)])),
        ],
        &[(0, 1, "L1", TagReplaced), (0, 1, "L2", TagEqual)],
    );
    assert!(!basic(&s));

    // Same pair, but L2 misses too.
    let s = structure(
        vec![
            load(path(&[(&l1, Miss), (&l2, Miss)])),
            load(path(&[(&l1, Miss), (&l2, Miss)])),
        ],
        &[(0, 1, "L1", TagReplaced), (0, 1, "L2", TagNotEqual)],
    );
    assert!(everything(&s));
}

#[test]
fn test_pair_and_structure_filters_agree_on_pairs() {
    let l0 = l0();
    let s = structure(
        vec![load(path(&[(&l0, Hit)])), load(path(&[(&l0, Miss)]))],
        &[(0, 1, "L0", TagEqual)],
    );
    // A miss on a tag known to be present in a direct-mapped buffer.
    assert!(!basic(&s));
    assert!(!everything(&s));
}

/// Both accesses look up the DTLB (VA) and L1 (PA); the dependency sets
/// the address relation of each space and a matching buffer hazard.
fn translated(
    va: HazardKind,
    dtlb_kind: HazardKind,
    pa: HazardKind,
    l1_kind: HazardKind,
) -> MemoryAccessStructure {
    let dtlb = Buffer::cache("DTLB", "VA", 4, 16);
    let l1 = l1();
    let access = || load(path(&[(&dtlb, Hit), (&l1, Hit)]));
    let (first, second) = (access(), access());
    let entry = |access: &MemoryAccess, n: usize| access.path().entries()[n].clone();
    let dependency = BufferDependency::new()
        .with(Hazard::address(va, entry(&first, 0), entry(&second, 0)))
        .with(Hazard::address(pa, entry(&first, 1), entry(&second, 1)))
        .with(Hazard::new(dtlb_kind, entry(&first, 0), entry(&second, 0)))
        .with(Hazard::new(l1_kind, entry(&first, 1), entry(&second, 1)));
    MemoryAccessStructure::pair(first, second, Some(dependency))
}

#[test]
fn test_virtual_address_translates_once() {
    let consistent = translated(AddrEqual, TagEqual, AddrEqual, TagEqual);
    assert!(everything(&consistent));

    let aliased = translated(AddrNotEqual, TagNotEqual, AddrEqual, TagEqual);
    assert!(everything(&aliased));

    let split = translated(AddrEqual, TagEqual, AddrNotEqual, TagNotEqual);
    assert!(!basic(&split));
}

#[test]
fn test_equal_addresses_need_equal_entries() {
    let contradiction = translated(AddrNotEqual, TagNotEqual, AddrEqual, IndexNotEqual);
    assert!(!basic(&contradiction));

    let contradiction = translated(AddrEqual, TagNotEqual, AddrEqual, TagEqual);
    assert!(!basic(&contradiction));
}
