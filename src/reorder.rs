// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright (C) 2025 Shahzad A. Bhatti <bhatti@plexobject.com>
//
// This file is part of PlexPdf.
//
// PlexPdf is free software: you can redistribute it and/or modify
// it under the terms of the GNU Lesser General Public License as published by
// the Free Software Foundation, either version 2.1 of the License, or
// (at your option) any later version.
//
// PlexPdf is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License
// along with PlexPdf. If not, see <https://www.gnu.org/licenses/>.

//! Reorder engine: shift-and-renumber position moves.
//!
//! Moving a file works like moving an array element: every file between the
//! old and new position shifts by one, then the moved file takes the target
//! position. The whole move is computed up front as a plan of rename steps
//! against the current index, then executed in order. Each step is
//! idempotent (see [`backend::rename`]), so a sequence interrupted by a
//! backend failure can be re-planned and re-run from current state.
//! Completed steps are not rolled back on failure.

use crate::backend;
use crate::error::{FileError, FileResult};
use crate::index::{parse_physical_name, physical_name, OrderingIndex};
use object_store::ObjectStore;
use tracing::{debug, error};

/// A single rename in a reorder plan, in physical names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameStep {
    pub from: String,
    pub to: String,
}

impl RenameStep {
    fn shift(physical: &str, to_position: u64) -> Self {
        let logical = parse_physical_name(physical).map_or(physical, |(_, l)| l);
        Self {
            from: physical.to_string(),
            to: physical_name(to_position, logical),
        }
    }
}

/// Compute the rename plan that moves `logical` to `target`.
///
/// Shift steps come first, in increasing position order; the moved file's
/// own rename is last. Vacant positions in the shifted range produce no
/// step. The caller clamps `target` to the existing maximum; `target` and
/// the file's current position are assumed positive.
pub fn plan_reorder(
    index: &OrderingIndex,
    logical: &str,
    target: u64,
) -> FileResult<Vec<RenameStep>> {
    let current = index
        .position_of(logical)
        .ok_or_else(|| FileError::NotFound(logical.to_string()))?;

    if target == current {
        return Ok(Vec::new());
    }

    let mut steps = Vec::new();

    if current > target {
        // Everything in [target, current) moves up one
        for position in target..current {
            if let Some(physical) = index.physical_at(position) {
                steps.push(RenameStep::shift(physical, position + 1));
            }
        }
    } else {
        // Everything in (current, target] moves down one
        for position in (current + 1)..=target {
            if let Some(physical) = index.physical_at(position) {
                steps.push(RenameStep::shift(physical, position - 1));
            }
        }
    }

    let moved = index
        .physical_at(current)
        .ok_or_else(|| FileError::NotFound(logical.to_string()))?;
    steps.push(RenameStep {
        from: moved.to_string(),
        to: physical_name(target, logical),
    });

    Ok(steps)
}

/// Execute a reorder plan against the backend.
///
/// Steps already applied (by an earlier interrupted run) are skipped. An
/// error aborts the remaining steps; progress up to that point stays
/// committed and is visible in the logs.
pub async fn execute(
    store: &dyn ObjectStore,
    prefix: &str,
    plan: &[RenameStep],
) -> FileResult<()> {
    for (step_index, step) in plan.iter().enumerate() {
        let from = backend::object_path(prefix, &step.from);
        let to = backend::object_path(prefix, &step.to);

        let performed = backend::rename(store, &from, &to).await.map_err(|e| {
            error!(
                step = step_index,
                from = %step.from,
                to = %step.to,
                error = %e,
                "rename step failed, aborting reorder"
            );
            e
        })?;

        if performed {
            debug!(step = step_index, from = %step.from, to = %step.to, "rename step applied");
        }
    }

    Ok(())
}
