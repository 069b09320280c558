// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Consistency filters over memory access structures.
//!
//! Filters are plain closures kept in six lists, one per level:
//!
//! | level | arguments |
//! |---|---|
//! | access | one access |
//! | hazard | two accesses and one hazard between them |
//! | dependency | two accesses and their whole dependency |
//! | united hazard | one access and its united hazard on one buffer |
//! | united dependency | one access and its united dependency |
//! | structure | the whole structure |
//!
//! [`FilterBuilder::build`] folds the hazard list into one dependency
//! filter and the united-hazard list into one united-dependency filter, then
//! wraps access, dependency and united-dependency filters into a single
//! structure filter. Every fold is a logical AND that stops at the first
//! rejection.

pub mod address;
pub mod builtin;
pub mod closure;
pub mod constraints;
pub mod eviction;

use std::rc::Rc;

use log::trace;

use crate::hazard::{BufferDependency, Hazard, UnitedDependency, UnitedHazard};
use crate::model::MemoryAccess;
use crate::structure::MemoryAccessStructure;

pub type AccessFilter = Rc<dyn Fn(&MemoryAccess) -> bool>;
pub type HazardFilter = Rc<dyn Fn(&MemoryAccess, &MemoryAccess, &Hazard) -> bool>;
pub type DependencyFilter = Rc<dyn Fn(&MemoryAccess, &MemoryAccess, &BufferDependency) -> bool>;
pub type UnitedHazardFilter = Rc<dyn Fn(&MemoryAccess, &UnitedHazard) -> bool>;
pub type UnitedDependencyFilter = Rc<dyn Fn(&MemoryAccess, &UnitedDependency) -> bool>;
pub type StructureFilter = Rc<dyn Fn(&MemoryAccessStructure) -> bool>;

/// Collects filters at every level and composes them.
#[derive(Clone, Default)]
pub struct FilterBuilder {
    access_filters: Vec<AccessFilter>,
    hazard_filters: Vec<HazardFilter>,
    dependency_filters: Vec<DependencyFilter>,
    united_hazard_filters: Vec<UnitedHazardFilter>,
    united_dependency_filters: Vec<UnitedDependencyFilter>,
    structure_filters: Vec<StructureFilter>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters that hold for pairs of accesses as well as whole structures.
    pub fn basic() -> Self {
        let mut builder = Self::new();
        builder.add_access_filter(constraints::buffer_event_constraints);
        builder.add_hazard_filter(builtin::non_replaceable_tag_equal);
        builder.add_dependency_filter(address::address_equal_buffer_not_equal);
        builder.add_united_hazard_filter(builtin::hit_and_tag_replaced);
        builder.add_united_hazard_filter(builtin::tag_equal_and_tag_replaced);
        builder.add_united_hazard_filter(builtin::multiple_tag_replaced);
        builder.add_united_dependency_filter(builtin::hit_and_tag_replaced_across_buffers);
        builder.add_united_dependency_filter(builtin::multiple_tag_replaced_across_buffers);
        builder.add_united_dependency_filter(address::va_equal_pa_not_equal);
        builder.add_structure_filter(closure::unclosed_equal_relations);
        builder
    }

    /// Filters that only make sense for whole structures.
    pub fn advanced() -> Self {
        let mut builder = Self::new();
        builder.add_structure_filter(eviction::access_then_miss);
        builder
    }

    pub fn add_access_filter<F>(&mut self, filter: F)
    where
        F: Fn(&MemoryAccess) -> bool + 'static,
    {
        self.access_filters.push(Rc::new(filter));
    }

    pub fn add_hazard_filter<F>(&mut self, filter: F)
    where
        F: Fn(&MemoryAccess, &MemoryAccess, &Hazard) -> bool + 'static,
    {
        self.hazard_filters.push(Rc::new(filter));
    }

    pub fn add_dependency_filter<F>(&mut self, filter: F)
    where
        F: Fn(&MemoryAccess, &MemoryAccess, &BufferDependency) -> bool + 'static,
    {
        self.dependency_filters.push(Rc::new(filter));
    }

    pub fn add_united_hazard_filter<F>(&mut self, filter: F)
    where
        F: Fn(&MemoryAccess, &UnitedHazard) -> bool + 'static,
    {
        self.united_hazard_filters.push(Rc::new(filter));
    }

    pub fn add_united_dependency_filter<F>(&mut self, filter: F)
    where
        F: Fn(&MemoryAccess, &UnitedDependency) -> bool + 'static,
    {
        self.united_dependency_filters.push(Rc::new(filter));
    }

    pub fn add_structure_filter<F>(&mut self, filter: F)
    where
        F: Fn(&MemoryAccessStructure) -> bool + 'static,
    {
        self.structure_filters.push(Rc::new(filter));
    }

    /// Append every filter of `other`.
    pub fn add_builder(&mut self, other: &FilterBuilder) {
        self.access_filters.extend(other.access_filters.iter().cloned());
        self.hazard_filters.extend(other.hazard_filters.iter().cloned());
        self.dependency_filters.extend(other.dependency_filters.iter().cloned());
        self.united_hazard_filters
            .extend(other.united_hazard_filters.iter().cloned());
        self.united_dependency_filters
            .extend(other.united_dependency_filters.iter().cloned());
        self.structure_filters.extend(other.structure_filters.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.access_filters.len()
            + self.hazard_filters.len()
            + self.dependency_filters.len()
            + self.united_hazard_filters.len()
            + self.united_dependency_filters.len()
            + self.structure_filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The access filters alone, for checking a sequence before any
    /// dependency is enumerated.
    pub fn build_access_filter(&self) -> AccessFilter {
        let access_filters = self.access_filters.clone();
        Rc::new(move |access: &MemoryAccess| access_filters.iter().all(|f| f(access)))
    }

    /// Compose everything into one structure filter.
    pub fn build(&self) -> StructureFilter {
        let hazard_filters = self.hazard_filters.clone();
        let mut dependency_filters = self.dependency_filters.clone();
        dependency_filters.push(Rc::new(
            move |a1: &MemoryAccess, a2: &MemoryAccess, dep: &BufferDependency| {
                dep.hazards()
                    .iter()
                    .all(|hazard| hazard_filters.iter().all(|f| f(a1, a2, hazard)))
            },
        ));

        let united_hazard_filters = self.united_hazard_filters.clone();
        let mut united_dependency_filters = self.united_dependency_filters.clone();
        united_dependency_filters.push(Rc::new(
            move |access: &MemoryAccess, united: &UnitedDependency| {
                united
                    .hazards()
                    .iter()
                    .all(|hazard| united_hazard_filters.iter().all(|f| f(access, hazard)))
            },
        ));

        let access_filters = self.access_filters.clone();
        let mut structure_filters = self.structure_filters.clone();
        structure_filters.push(Rc::new(move |structure: &MemoryAccessStructure| {
            check_levels(
                structure,
                &access_filters,
                &dependency_filters,
                &united_dependency_filters,
            )
        }));

        Rc::new(move |structure: &MemoryAccessStructure| {
            structure_filters.iter().all(|f| f(structure))
        })
    }
}

fn check_levels(
    structure: &MemoryAccessStructure,
    access_filters: &[AccessFilter],
    dependency_filters: &[DependencyFilter],
    united_dependency_filters: &[UnitedDependencyFilter],
) -> bool {
    let accesses = structure.accesses();

    for (i, access) in accesses.iter().enumerate() {
        if !access_filters.iter().all(|f| f(access)) {
            trace!("access {} rejected: {}", i, access);
            return false;
        }
    }

    for j in 0..accesses.len() {
        for i in 0..j {
            if let Some(dependency) = structure.dependency(i, j) {
                if !dependency_filters
                    .iter()
                    .all(|f| f(&accesses[i], &accesses[j], dependency))
                {
                    trace!("dependency {} -> {} rejected: {}", i, j, dependency);
                    return false;
                }
            }
        }
    }

    for (j, access) in accesses.iter().enumerate() {
        let united = structure.united_dependency(j);
        if !united_dependency_filters.iter().all(|f| f(access, united)) {
            trace!("united dependency of {} rejected: {}", j, united);
            return false;
        }
    }

    true
}
