// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use log::trace;

use crate::model::MemoryAccess;

/// Reject an access whose path breaks the buffer-event constraints attached
/// to it.
pub fn buffer_event_constraints(access: &MemoryAccess) -> bool {
    for constraint in access.constraints().buffer_events() {
        if !constraint.admits(access.path()) {
            trace!(
                "{}: events {:?} outside {:?}",
                constraint.buffer,
                access.path().events(&constraint.buffer),
                constraint.events
            );
            return false;
        }
    }
    true
}
