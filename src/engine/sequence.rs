// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Access-sequence iterators: one concrete access per template position.

use std::rc::Rc;

use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::cursor::{Cursor, CursorState};
use super::Sampling;
use crate::model::MemoryAccess;
use crate::source::AccessChooser;

/// Choosers per template position.
pub type Choosers = Vec<Vec<Rc<dyn AccessChooser>>>;

/// Cross product of the chooser sets, rightmost position fastest.
///
/// Combinations where some chooser yields nothing are skipped.
pub struct ExhaustiveSequence {
    choosers: Choosers,
    indices: Vec<usize>,
    current: Vec<MemoryAccess>,
    state: CursorState,
}

impl ExhaustiveSequence {
    pub fn new(choosers: Choosers) -> Self {
        let positions = choosers.len();
        Self {
            choosers,
            indices: vec![0; positions],
            current: Vec::new(),
            state: CursorState::Fresh,
        }
    }

    /// Step the odometer; false once it wraps around.
    fn advance(&mut self) -> bool {
        for position in (0..self.indices.len()).rev() {
            self.indices[position] += 1;
            if self.indices[position] < self.choosers[position].len() {
                return true;
            }
            self.indices[position] = 0;
        }
        false
    }

    fn realize(&self) -> Option<Vec<MemoryAccess>> {
        self.indices
            .iter()
            .zip(&self.choosers)
            .map(|(&index, choosers)| choosers[index].choose())
            .collect()
    }

    fn settle(&mut self) {
        loop {
            if let Some(accesses) = self.realize() {
                self.current = accesses;
                self.state = CursorState::HasValue;
                return;
            }
            if !self.advance() {
                self.state = CursorState::Exhausted;
                return;
            }
        }
    }
}

impl Cursor for ExhaustiveSequence {
    type Item = Vec<MemoryAccess>;

    fn init(&mut self) {
        self.indices.iter_mut().for_each(|i| *i = 0);
        if self.choosers.is_empty() || self.choosers.iter().any(|c| c.is_empty()) {
            self.state = CursorState::Exhausted;
            return;
        }
        self.settle();
    }

    fn has_value(&self) -> bool {
        self.state == CursorState::HasValue
    }

    fn value(&self) -> Option<Vec<MemoryAccess>> {
        self.has_value().then(|| self.current.clone())
    }

    fn next(&mut self) {
        if !self.has_value() {
            return;
        }
        if self.advance() {
            self.settle();
        } else {
            self.state = CursorState::Exhausted;
        }
    }

    fn stop(&mut self) {
        self.state = CursorState::Exhausted;
    }
}

/// Independent random draws per position, without end.
///
/// A failed draw is retried for that position only. After
/// `retry_limit` consecutive failures the cursor gives up.
pub struct RandomSequence {
    choosers: Choosers,
    seed: u64,
    retry_limit: usize,
    rng: StdRng,
    current: Vec<MemoryAccess>,
    state: CursorState,
}

impl RandomSequence {
    pub fn new(choosers: Choosers, sampling: &Sampling) -> Self {
        Self {
            choosers,
            seed: sampling.seed,
            retry_limit: sampling.retry_limit,
            rng: StdRng::seed_from_u64(sampling.seed),
            current: Vec::new(),
            state: CursorState::Fresh,
        }
    }

    fn draw_position(&mut self, position: usize) -> Option<MemoryAccess> {
        let choosers = &self.choosers[position];
        for _ in 0..self.retry_limit {
            let chooser = &choosers[self.rng.gen_range(0..choosers.len())];
            if let Some(access) = chooser.choose() {
                return Some(access);
            }
        }
        debug!(
            "giving up on position {} after {} failed draws",
            position, self.retry_limit
        );
        None
    }

    fn draw(&mut self) {
        let mut accesses = Vec::with_capacity(self.choosers.len());
        for position in 0..self.choosers.len() {
            match self.draw_position(position) {
                Some(access) => accesses.push(access),
                None => {
                    self.state = CursorState::Exhausted;
                    return;
                }
            }
        }
        self.current = accesses;
        self.state = CursorState::HasValue;
    }
}

impl Cursor for RandomSequence {
    type Item = Vec<MemoryAccess>;

    fn init(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
        if self.choosers.is_empty() || self.choosers.iter().any(|c| c.is_empty()) {
            self.state = CursorState::Exhausted;
            return;
        }
        self.draw();
    }

    fn has_value(&self) -> bool {
        self.state == CursorState::HasValue
    }

    fn value(&self) -> Option<Vec<MemoryAccess>> {
        self.has_value().then(|| self.current.clone())
    }

    fn next(&mut self) {
        if self.has_value() {
            self.draw();
        }
    }

    fn stop(&mut self) {
        self.state = CursorState::Exhausted;
    }
}
