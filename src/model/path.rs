// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Buffer accesses and the path a memory access takes through the buffers.

use std::fmt;
use strum_macros::{Display, EnumIter};

use super::buffer::Buffer;
use super::context::AccessContext;

/// What happened when a buffer was consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum BufferAccessEvent {
    Hit,
    Miss,
    Read,
    Write,
}

/// One step of a path: a buffer, the event, and the symbolic
/// tag/index/offset expressions the solver will later make concrete.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferAccess {
    buffer: Buffer,
    event: BufferAccessEvent,
    tag: String,
    index: String,
    offset: String,
    context: AccessContext,
}

impl BufferAccess {
    /// A top-level access with expressions named after the buffer.
    pub fn new(buffer: Buffer, event: BufferAccessEvent) -> Self {
        let name = buffer.name().to_string();
        Self {
            tag: format!("{}.tag", name),
            index: format!("{}.index", name),
            offset: format!("{}.offset", name),
            buffer,
            event,
            context: AccessContext::empty(),
        }
    }

    pub fn with_expressions(mut self, tag: &str, index: &str, offset: &str) -> Self {
        self.tag = String::from(tag);
        self.index = String::from(index);
        self.offset = String::from(offset);
        self
    }

    pub fn with_context(mut self, context: AccessContext) -> Self {
        self.context = context;
        self
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn event(&self) -> BufferAccessEvent {
        self.event
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn offset(&self) -> &str {
        &self.offset
    }

    pub fn context(&self) -> &AccessContext {
        &self.context
    }

    /// Top-level accesses are the only ones that take part in cross hazards.
    pub fn is_top_level(&self) -> bool {
        self.context.is_empty()
    }

    pub fn same_buffer(&self, other: &BufferAccess) -> bool {
        self.buffer.name() == other.buffer.name()
    }
}

impl fmt::Display for BufferAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context.is_empty() {
            write!(f, "{}:{}", self.buffer, self.event)
        } else {
            write!(f, "{}:{}{}", self.buffer, self.event, self.context)
        }
    }
}

/// The ordered buffer accesses of one memory access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AccessPath {
    entries: Vec<BufferAccess>,
}

impl AccessPath {
    pub fn new(entries: Vec<BufferAccess>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[BufferAccess] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entry: &BufferAccess) -> bool {
        self.entries.contains(entry)
    }

    /// Distinct buffers in path order.
    pub fn buffers(&self) -> Vec<&Buffer> {
        let mut buffers: Vec<&Buffer> = Vec::new();
        for entry in &self.entries {
            if !buffers.iter().any(|b| b.name() == entry.buffer().name()) {
                buffers.push(entry.buffer());
            }
        }
        buffers
    }

    /// Every event the path induces on the buffer, nested walks included.
    pub fn events(&self, buffer: &str) -> Vec<BufferAccessEvent> {
        let mut events = Vec::new();
        for entry in self.entries.iter().filter(|e| e.buffer().name() == buffer) {
            if !events.contains(&entry.event()) {
                events.push(entry.event());
            }
        }
        events
    }

    /// The top-level event on the buffer, if the path consults it directly.
    pub fn event(&self, buffer: &str) -> Option<BufferAccessEvent> {
        self.top_level(buffer).map(|entry| entry.event())
    }

    /// The first top-level access to the buffer.
    pub fn top_level(&self, buffer: &str) -> Option<&BufferAccess> {
        self.entries
            .iter()
            .find(|e| e.is_top_level() && e.buffer().name() == buffer)
    }
}

impl fmt::Display for AccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.entries.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", parts.join(" -> "))
    }
}
