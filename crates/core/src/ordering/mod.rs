// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

//! Positioning algorithm for ordered collections.
//!
//! All members of a collection occupy a dense, zero-based position range:
//! with `N` members the occupied positions are exactly `0..N`. The
//! planning functions in this module compute how an insertion, removal or
//! move redistributes positions without touching any storage substrate.
//! Adapters execute the returned plans either against an in-memory
//! sequence (see the `apply_*` functions) or against stored rows.
//!
//! For macro containers the position space spans two member kinds. The
//! ledger therefore always contains the merged occupancy of the whole
//! collection, never a single-kind subset.

use std::ops::Range;

use thiserror::Error;

use crate::member::{InsertOutcome, Item, Member, PatchOperation};

/// Zero-based position of a member within its collection.
pub type Position = usize;

#[derive(Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum OrderingError {
    #[error("position {position} exceeds member count {count}")]
    PositionOutOfBounds { position: Position, count: usize },

    #[error("invalid source range [{start}, {end}]")]
    InvalidSourceRange { start: Position, end: Position },

    #[error("target position {target} within moved range [{start}, {end}]")]
    TargetWithinSourceRange {
        target: Position,
        start: Position,
        end: Position,
    },

    #[error("unknown member")]
    UnknownMember,
}

pub type OrderingResult<T> = Result<T, OrderingError>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LedgerEntry {
    pub item: Item,
    pub position: Position,
}

/// Sorted, dense occupancy of a single collection.
///
/// The snapshot that planning operates on, merged across both member
/// kinds of a macro container.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionLedger(Vec<LedgerEntry>);

impl PositionLedger {
    /// Build from entries sorted by position.
    ///
    /// The entries must satisfy the density invariant, i.e. the position
    /// of each entry equals its index.
    #[must_use]
    pub fn from_sorted(entries: Vec<LedgerEntry>) -> Self {
        debug_assert!(
            entries
                .iter()
                .enumerate()
                .all(|(index, entry)| entry.position == index)
        );
        Self(entries)
    }

    /// Build from an in-memory member sequence where index = position.
    #[must_use]
    pub fn from_members(members: &[Member]) -> Self {
        Self(
            members
                .iter()
                .enumerate()
                .map(|(position, member)| LedgerEntry {
                    item: member.item,
                    position,
                })
                .collect(),
        )
    }

    #[must_use]
    pub fn len(&self) -> usize {
        let Self(entries) = self;
        entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        let Self(entries) = self;
        entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[LedgerEntry] {
        let Self(entries) = self;
        entries
    }

    #[must_use]
    pub fn position_of(&self, item: &Item) -> Option<Position> {
        let Self(entries) = self;
        entries
            .iter()
            .find(|entry| entry.item == *item)
            .map(|entry| entry.position)
    }

    #[must_use]
    pub fn contains(&self, item: &Item) -> bool {
        self.position_of(item).is_some()
    }
}

/// A half-open range of positions whose occupants move by `delta`.
///
/// Under a unique position constraint the occupants must be rewritten in
/// an order that never produces a transient collision: descending
/// position order for a positive delta, ascending order for a negative
/// delta. In-memory appliers are free to ignore the direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionShift {
    pub range: Range<Position>,
    pub delta: i64,
}

impl PositionShift {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty() || self.delta == 0
    }

    /// Whether occupants must be rewritten in descending position order.
    #[must_use]
    pub fn descending(&self) -> bool {
        self.delta > 0
    }
}

fn non_empty_shift(range: Range<Position>, delta: i64) -> Option<PositionShift> {
    let shift = PositionShift { range, delta };
    (!shift.is_empty()).then_some(shift)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsertPlan {
    /// Position of the first inserted member.
    pub insert_at: Position,

    /// Items to insert, batch order preserved, duplicates excluded.
    pub inserted: Vec<Item>,

    /// Items excluded from the batch because they are already members.
    pub duplicates: Vec<Item>,

    /// Tail shift making room for the inserted items.
    pub shift: Option<PositionShift>,
}

impl InsertPlan {
    #[must_use]
    pub fn new_positions(&self) -> Range<Position> {
        self.insert_at..self.insert_at + self.inserted.len()
    }

    #[must_use]
    pub fn outcome(&self) -> InsertOutcome {
        InsertOutcome {
            inserted: self.inserted.len(),
            duplicates: self.duplicates.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemovePlan {
    /// Positions of the removed members, ascending.
    pub removals: Vec<Position>,

    /// Gap-closing shifts, ascending ranges with negative deltas.
    pub shifts: Vec<PositionShift>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovePlan {
    pub from: Position,

    /// Final position of the moved member.
    pub to: Position,

    pub shift: Option<PositionShift>,
}

impl MovePlan {
    #[must_use]
    pub fn is_no_op(&self) -> bool {
        self.from == self.to
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeMovePlan {
    /// The moved block as a half-open position range.
    pub source: Range<Position>,

    /// Final position of the first member of the moved block.
    pub to: Position,

    pub shift: Option<PositionShift>,
}

impl RangeMovePlan {
    #[must_use]
    pub fn is_no_op(&self) -> bool {
        self.source.start == self.to
    }

    #[must_use]
    pub fn block_len(&self) -> usize {
        self.source.len()
    }
}

/// Plan the insertion of a batch of items before the given position.
///
/// Appends when `before` is absent. Items that are already members of the
/// collection (or occur more than once within the batch) are excluded and
/// reported as duplicates; only the remaining items reserve position
/// slots.
pub fn plan_insert(
    ledger: &PositionLedger,
    new_items: &[Item],
    before: Option<Position>,
) -> OrderingResult<InsertPlan> {
    let count = ledger.len();
    let insert_at = before.unwrap_or(count);
    if insert_at > count {
        return Err(OrderingError::PositionOutOfBounds {
            position: insert_at,
            count,
        });
    }
    let mut inserted = Vec::with_capacity(new_items.len());
    let mut duplicates = Vec::new();
    for item in new_items {
        if ledger.contains(item) || inserted.contains(item) {
            duplicates.push(*item);
        } else {
            inserted.push(*item);
        }
    }
    let shift = non_empty_shift(insert_at..count, inserted.len() as i64);
    Ok(InsertPlan {
        insert_at,
        inserted,
        duplicates,
        shift,
    })
}

/// Plan the removal of the given items.
///
/// Items that are not members are ignored. Survivors above each removed
/// position close the gaps: the segment between the i-th and the next
/// removed position shifts down by i + 1.
#[must_use]
pub fn plan_remove(ledger: &PositionLedger, items: &[Item]) -> RemovePlan {
    let mut removals: Vec<Position> = items
        .iter()
        .filter_map(|item| ledger.position_of(item))
        .collect();
    removals.sort_unstable();
    removals.dedup();
    let count = ledger.len();
    let mut shifts = Vec::with_capacity(removals.len());
    for (index, &position) in removals.iter().enumerate() {
        let segment_end = removals.get(index + 1).copied().unwrap_or(count);
        let delta = -((index + 1) as i64);
        if let Some(shift) = non_empty_shift(position + 1..segment_end, delta) {
            shifts.push(shift);
        }
    }
    RemovePlan { removals, shifts }
}

/// Plan moving a single member to the target position.
///
/// The target addresses the gap before the member currently occupying
/// that position, so both `target == from` and `target == from + 1`
/// denote the member's current location and plan a no-op. Targets up to
/// and including the member count are valid; `count` moves to the end.
pub fn plan_move(ledger: &PositionLedger, item: &Item, target: Position) -> OrderingResult<MovePlan> {
    let count = ledger.len();
    let from = ledger
        .position_of(item)
        .ok_or(OrderingError::UnknownMember)?;
    if target > count {
        return Err(OrderingError::PositionOutOfBounds {
            position: target,
            count,
        });
    }
    let plan = if target <= from {
        MovePlan {
            from,
            to: target,
            shift: non_empty_shift(target..from, 1),
        }
    } else {
        // Closing the vacated slot collapses the sequence below the
        // target before the member lands, hence the -1 on this branch.
        MovePlan {
            from,
            to: target - 1,
            shift: non_empty_shift(from + 1..target, -1),
        }
    };
    Ok(plan)
}

/// Plan moving the contiguous block `[start, end]` to the target position.
///
/// Targets strictly inside the moved block are rejected; `start` and
/// `start + block length` denote the block's current location and plan a
/// no-op. The block's internal order is preserved.
pub fn plan_move_range(
    ledger: &PositionLedger,
    start: Position,
    end: Position,
    target: Position,
) -> OrderingResult<RangeMovePlan> {
    let count = ledger.len();
    if start > end {
        return Err(OrderingError::InvalidSourceRange { start, end });
    }
    if end >= count {
        return Err(OrderingError::PositionOutOfBounds {
            position: end,
            count,
        });
    }
    if target > count {
        return Err(OrderingError::PositionOutOfBounds {
            position: target,
            count,
        });
    }
    let block_len = end - start + 1;
    if target > start && target < start + block_len {
        return Err(OrderingError::TargetWithinSourceRange { target, start, end });
    }
    let source = start..end + 1;
    let plan = if target <= start {
        RangeMovePlan {
            source,
            to: target,
            shift: non_empty_shift(target..start, block_len as i64),
        }
    } else {
        // target >= start + block_len; equality plans the trailing no-op.
        RangeMovePlan {
            source,
            to: target - block_len,
            shift: non_empty_shift(end + 1..target, -(block_len as i64)),
        }
    };
    Ok(plan)
}

/// Execute an insert plan against an in-memory sequence.
///
/// `new_members` must correspond to `plan.inserted`, i.e. duplicates must
/// already be excluded.
pub fn apply_insert<T>(
    members: &mut Vec<T>,
    plan: &InsertPlan,
    new_members: impl IntoIterator<Item = T>,
) {
    let new_members: Vec<_> = new_members.into_iter().collect();
    debug_assert_eq!(new_members.len(), plan.inserted.len());
    members.splice(plan.insert_at..plan.insert_at, new_members);
}

/// Execute a remove plan against an in-memory sequence.
pub fn apply_remove<T>(members: &mut Vec<T>, plan: &RemovePlan) {
    for &position in plan.removals.iter().rev() {
        members.remove(position);
    }
}

/// Execute a single-member move plan against an in-memory sequence.
pub fn apply_move<T>(members: &mut Vec<T>, plan: &MovePlan) {
    if plan.is_no_op() {
        return;
    }
    let moved = members.remove(plan.from);
    members.insert(plan.to, moved);
}

/// Execute a range move plan against an in-memory sequence.
pub fn apply_move_range<T>(members: &mut Vec<T>, plan: &RangeMovePlan) {
    if plan.is_no_op() {
        return;
    }
    let block: Vec<T> = members.drain(plan.source.clone()).collect();
    // After draining the block the member that occupied the target
    // position resides at the plan's final position for both directions.
    members.splice(plan.to..plan.to, block);
}

/// Outcome of [`apply_patch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatchOutcome {
    Inserted(InsertOutcome),
    Removed { count: usize },
    Moved,
    MovedRange,
    RemovedAll { count: usize },
}

/// Plan and apply one patch operation against an in-memory sequence.
///
/// This is the speculative code path: validation and planning run against
/// the current sequence, then the plan is executed synchronously. The
/// durable code path executes the identical plans against stored rows.
pub fn apply_patch(
    members: &mut Vec<Member>,
    operation: &PatchOperation,
) -> OrderingResult<PatchOutcome> {
    let ledger = PositionLedger::from_members(members);
    match operation {
        PatchOperation::Insert {
            before,
            members: new_members,
        } => {
            let new_items: Vec<_> = new_members.iter().map(|member| member.item).collect();
            let plan = plan_insert(&ledger, &new_items, *before)?;
            // Retain the first occurrence of each planned item, preserving
            // the batch order.
            let mut pending = plan.inserted.as_slice();
            let mut retained = Vec::with_capacity(pending.len());
            for member in new_members {
                if pending.first() == Some(&member.item) {
                    retained.push(member.clone());
                    pending = &pending[1..];
                }
            }
            apply_insert(members, &plan, retained);
            Ok(PatchOutcome::Inserted(plan.outcome()))
        }
        PatchOperation::Remove { items } => {
            let plan = plan_remove(&ledger, items);
            let count = plan.removals.len();
            apply_remove(members, &plan);
            Ok(PatchOutcome::Removed { count })
        }
        PatchOperation::Move { item, target } => {
            let plan = plan_move(&ledger, item, *target)?;
            apply_move(members, &plan);
            Ok(PatchOutcome::Moved)
        }
        PatchOperation::MoveRange { start, end, target } => {
            let plan = plan_move_range(&ledger, *start, *end, *target)?;
            apply_move_range(members, &plan);
            Ok(PatchOutcome::MovedRange)
        }
        PatchOperation::RemoveAll => {
            let count = members.len();
            members.clear();
            Ok(PatchOutcome::RemovedAll { count })
        }
    }
}

///////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////
