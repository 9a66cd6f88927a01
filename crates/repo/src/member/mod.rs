// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use cuebox_core::{
    member::{InsertOutcome, Item, Member, PatchOperation},
    ordering::{PatchOutcome, Position, PositionLedger},
    util::clock::UtcDateTimeMs,
};

use crate::{collection::RecordId as CollectionId, prelude::*};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MembersSummary {
    pub total_count: usize,
    pub file_count: usize,
    pub macro_count: usize,
    pub added_at_minmax: Option<(UtcDateTimeMs, UtcDateTimeMs)>,
}

/// Dispatch a patch operation to the corresponding repository operation.
///
/// This default implementation works but performs the operations one by
/// one without batching.
fn patch_members_default<R: MemberRepo + ?Sized>(
    member_repo: &mut R,
    collection_id: CollectionId,
    operation: &PatchOperation,
) -> RepoResult<PatchOutcome> {
    match operation {
        PatchOperation::Insert { before, members } => member_repo
            .insert_members(collection_id, *before, members)
            .map(PatchOutcome::Inserted),
        PatchOperation::Remove { items } => member_repo
            .remove_members(collection_id, items)
            .map(|count| PatchOutcome::Removed { count }),
        PatchOperation::Move { item, target } => member_repo
            .move_member(collection_id, item, *target)
            .map(|()| PatchOutcome::Moved),
        PatchOperation::MoveRange { start, end, target } => member_repo
            .move_member_range(collection_id, *start, *end, *target)
            .map(|()| PatchOutcome::MovedRange),
        PatchOperation::RemoveAll => member_repo
            .remove_all_members(collection_id)
            .map(|count| PatchOutcome::RemovedAll { count }),
    }
}

pub trait MemberRepo {
    /// Load the merged position occupancy of the collection.
    ///
    /// Spans both member kinds of a macro container.
    fn load_position_ledger(&mut self, collection_id: CollectionId)
    -> RepoResult<PositionLedger>;

    fn load_all_members(&mut self, collection_id: CollectionId) -> RepoResult<Vec<Member>>;

    fn count_members(&mut self, collection_id: CollectionId) -> RepoResult<usize>;

    fn load_members_summary(&mut self, collection_id: CollectionId)
    -> RepoResult<MembersSummary>;

    /// Insert new members before the given position, appending when the
    /// position is absent.
    ///
    /// Items that are already members are excluded from the batch and
    /// reported in the outcome.
    fn insert_members(
        &mut self,
        collection_id: CollectionId,
        before: Option<Position>,
        new_members: &[Member],
    ) -> RepoResult<InsertOutcome>;

    /// Remove the given members, ignoring items that are not members.
    ///
    /// Returns the number of members that have actually been removed.
    fn remove_members(&mut self, collection_id: CollectionId, items: &[Item])
    -> RepoResult<usize>;

    fn move_member(
        &mut self,
        collection_id: CollectionId,
        item: &Item,
        target: Position,
    ) -> RepoResult<()>;

    fn move_member_range(
        &mut self,
        collection_id: CollectionId,
        start: Position,
        end: Position,
        target: Position,
    ) -> RepoResult<()>;

    fn remove_all_members(&mut self, collection_id: CollectionId) -> RepoResult<usize>;

    fn append_members(
        &mut self,
        collection_id: CollectionId,
        new_members: &[Member],
    ) -> RepoResult<InsertOutcome> {
        self.insert_members(collection_id, None, new_members)
    }

    fn prepend_members(
        &mut self,
        collection_id: CollectionId,
        new_members: &[Member],
    ) -> RepoResult<InsertOutcome> {
        self.insert_members(collection_id, Some(0), new_members)
    }

    fn patch_members(
        &mut self,
        collection_id: CollectionId,
        operation: &PatchOperation,
    ) -> RepoResult<PatchOutcome> {
        patch_members_default(self, collection_id, operation)
    }
}
