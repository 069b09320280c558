// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Recursion context of a buffer access.
//!
//! A TLB miss may trigger a page-table read, which is itself a memory access
//! with its own path. Buffer accesses made on behalf of such a nested walk
//! carry a non-empty context. The context is an owned value: descending copies
//! it, so no two accesses ever share (or cycle through) the same stack.

use std::fmt;

/// One level of nested access: the buffer whose handling started the walk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextFrame {
    pub buffer: String,
    pub depth: usize,
}

/// Stack of frames; empty for top-level accesses.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccessContext {
    stack: Vec<ContextFrame>,
}

impl AccessContext {
    /// The top-level context.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn frames(&self) -> &[ContextFrame] {
        &self.stack
    }

    /// A copy of this context one level deeper, entered from `buffer`.
    pub fn descend(&self, buffer: &str) -> Self {
        let mut stack = self.stack.clone();
        stack.push(ContextFrame {
            buffer: String::from(buffer),
            depth: self.stack.len() + 1,
        });
        Self { stack }
    }
}

impl fmt::Display for AccessContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.stack.iter().map(|frame| frame.buffer.as_str()).collect();
        write!(f, "[{}]", names.join("/"))
    }
}
