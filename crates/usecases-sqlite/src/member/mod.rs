// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use diesel::Connection as _;

use cuebox_core::{
    EntityHeader,
    member::{InsertOutcome, Item, Member, validate_item_kinds},
    ordering::Position,
    util::clock::UtcDateTimeMs,
};
use cuebox_repo::{
    collection::{EntityRepo as _, RecordHeader},
    member::{MemberRepo as _, MembersSummary},
};
use cuebox_repo_sqlite::DbConnection;

use crate::{RepoConnection, Result, TransactionError, transaction_error};

/// Insert new members before the given position, appending when the
/// position is absent.
///
/// Items that are already members are excluded from the batch and
/// reported in the outcome; the operation succeeds for the remaining
/// items.
pub fn insert_members(
    connection: &mut DbConnection,
    entity_header: &EntityHeader,
    before: Option<Position>,
    new_members: Vec<Member>,
) -> Result<(RecordHeader, InsertOutcome)> {
    let updated_at = UtcDateTimeMs::now();
    connection
        .transaction::<_, TransactionError, _>(|connection| {
            let mut repo = RepoConnection::new(connection);
            let (record_header, _next_rev) = repo
                .touch_collection_entity_revision(entity_header, updated_at)
                .map_err(transaction_error)?;
            let (_, entity) = repo
                .load_collection_entity(record_header.id)
                .map_err(transaction_error)?;
            validate_item_kinds(
                entity.body.kind,
                new_members.iter().map(|member| &member.item),
            )
            .map_err(transaction_error)?;
            let outcome = repo
                .insert_members(record_header.id, before, &new_members)
                .map_err(transaction_error)?;
            Ok((record_header, outcome))
        })
        .map_err(Into::into)
}

/// Remove the given members, ignoring items that are not members.
pub fn remove_members(
    connection: &mut DbConnection,
    entity_header: &EntityHeader,
    items: &[Item],
) -> Result<(RecordHeader, usize)> {
    let updated_at = UtcDateTimeMs::now();
    connection
        .transaction::<_, TransactionError, _>(|connection| {
            let mut repo = RepoConnection::new(connection);
            let (record_header, _next_rev) = repo
                .touch_collection_entity_revision(entity_header, updated_at)
                .map_err(transaction_error)?;
            let count = repo
                .remove_members(record_header.id, items)
                .map_err(transaction_error)?;
            Ok((record_header, count))
        })
        .map_err(Into::into)
}

pub fn move_member(
    connection: &mut DbConnection,
    entity_header: &EntityHeader,
    item: &Item,
    target: Position,
) -> Result<RecordHeader> {
    let updated_at = UtcDateTimeMs::now();
    connection
        .transaction::<_, TransactionError, _>(|connection| {
            let mut repo = RepoConnection::new(connection);
            let (record_header, _next_rev) = repo
                .touch_collection_entity_revision(entity_header, updated_at)
                .map_err(transaction_error)?;
            repo.move_member(record_header.id, item, target)
                .map_err(transaction_error)?;
            Ok(record_header)
        })
        .map_err(Into::into)
}

pub fn move_member_range(
    connection: &mut DbConnection,
    entity_header: &EntityHeader,
    start: Position,
    end: Position,
    target: Position,
) -> Result<RecordHeader> {
    let updated_at = UtcDateTimeMs::now();
    connection
        .transaction::<_, TransactionError, _>(|connection| {
            let mut repo = RepoConnection::new(connection);
            let (record_header, _next_rev) = repo
                .touch_collection_entity_revision(entity_header, updated_at)
                .map_err(transaction_error)?;
            repo.move_member_range(record_header.id, start, end, target)
                .map_err(transaction_error)?;
            Ok(record_header)
        })
        .map_err(Into::into)
}

pub fn remove_all_members(
    connection: &mut DbConnection,
    entity_header: &EntityHeader,
) -> Result<(RecordHeader, usize)> {
    let updated_at = UtcDateTimeMs::now();
    connection
        .transaction::<_, TransactionError, _>(|connection| {
            let mut repo = RepoConnection::new(connection);
            let (record_header, _next_rev) = repo
                .touch_collection_entity_revision(entity_header, updated_at)
                .map_err(transaction_error)?;
            let count = repo
                .remove_all_members(record_header.id)
                .map_err(transaction_error)?;
            Ok((record_header, count))
        })
        .map_err(Into::into)
}

/// Load the current member sequence, e.g. for refreshing a client-side
/// projection after a committed mutation.
pub fn load_members(
    connection: &mut DbConnection,
    entity_header: &EntityHeader,
) -> Result<(RecordHeader, Vec<Member>)> {
    let mut repo = RepoConnection::new(connection);
    let (record_header, _rev) = repo.resolve_collection_entity_revision(&entity_header.uid)?;
    let members = repo.load_all_members(record_header.id)?;
    Ok((record_header, members))
}

pub fn load_members_summary(
    connection: &mut DbConnection,
    entity_header: &EntityHeader,
) -> Result<(RecordHeader, MembersSummary)> {
    let mut repo = RepoConnection::new(connection);
    let (record_header, _rev) = repo.resolve_collection_entity_revision(&entity_header.uid)?;
    let summary = repo.load_members_summary(record_header.id)?;
    Ok((record_header, summary))
}

///////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests;
