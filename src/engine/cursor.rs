// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The pull-cursor protocol shared by every iterator of the engine.
//!
//! A cursor is finite and cannot be rewound mid-stream, but it can always be
//! restarted from the first value with [`Cursor::init`]:
//!
//! ```text
//!            init()              next() (more values)
//!   Fresh ----------> HasValue <----------------------+
//!     ^                  |   \________________________/
//!     |                  | next() (no more) / stop()
//!     | init()           v
//!     +------------- Exhausted
//! ```
//!
//! # Example
//!
//! ```
//! use mmu_structure_gen::engine::{Cursor, CursorState};
//!
//! struct Countdown {
//!     from: u32,
//!     current: u32,
//!     state: CursorState,
//! }
//!
//! impl Cursor for Countdown {
//!     type Item = u32;
//!
//!     fn init(&mut self) {
//!         self.current = self.from;
//!         self.state = CursorState::HasValue;
//!     }
//!
//!     fn has_value(&self) -> bool {
//!         self.state == CursorState::HasValue
//!     }
//!
//!     fn value(&self) -> Option<u32> {
//!         self.has_value().then_some(self.current)
//!     }
//!
//!     fn next(&mut self) {
//!         if self.current == 0 {
//!             self.state = CursorState::Exhausted;
//!         } else {
//!             self.current -= 1;
//!         }
//!     }
//!
//!     fn stop(&mut self) {
//!         self.state = CursorState::Exhausted;
//!     }
//! }
//!
//! let mut cursor = Countdown { from: 2, current: 0, state: CursorState::Fresh };
//! let mut seen = Vec::new();
//! cursor.init();
//! while let Some(value) = cursor.value() {
//!     seen.push(value);
//!     cursor.next();
//! }
//! assert_eq!(seen, vec![2, 1, 0]);
//! assert!(cursor.try_clone().is_err());
//! ```

use crate::error::{GeneratorError, Result};

/// Where a cursor is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorState {
    /// Constructed, `init()` not called yet.
    #[default]
    Fresh,
    HasValue,
    Exhausted,
}

pub trait Cursor {
    type Item;

    /// (Re)start from the first value.
    fn init(&mut self);

    fn has_value(&self) -> bool;

    /// The current value, or `None` unless the cursor has one.
    fn value(&self) -> Option<Self::Item>;

    /// Move to the next value; a no-op once exhausted.
    fn next(&mut self);

    /// Force the cursor into the exhausted state.
    fn stop(&mut self);

    /// Cursors are not duplicable.
    fn try_clone(&self) -> Result<Self>
    where
        Self: Sized,
    {
        Err(GeneratorError::Unsupported {
            operation: "clone",
            cursor: self.name(),
        })
    }

    /// Name used in diagnostics. Defaults to the type name.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
