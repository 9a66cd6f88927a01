// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use diesel::Connection as _;

use cuebox_core::{
    CollectionKind, CollectionUid, EntityHeader,
    collection::{Collection, Entity, EntityWithMembers},
    util::clock::UtcDateTimeMs,
};
use cuebox_repo::{
    collection::{EntityRepo as _, EntityWithMembersSummary, RecordHeader},
    prelude::{Pagination, ReservableRecordCollector},
};
use cuebox_repo_sqlite::DbConnection;

use crate::{Result, RepoConnection, TransactionError, transaction_error};

pub fn create(connection: &mut DbConnection, new_collection: Collection) -> Result<Entity> {
    let created_at = UtcDateTimeMs::now();
    let created_entity = Entity::new(EntityHeader::initial_random(), new_collection);
    connection.transaction::<_, TransactionError, _>(|connection| {
        let mut repo = RepoConnection::new(connection);
        repo.insert_collection_entity(created_at, &created_entity)
            .map_err(transaction_error)?;
        Ok(())
    })?;
    Ok(created_entity)
}

pub fn update(
    connection: &mut DbConnection,
    entity_header: EntityHeader,
    modified_collection: Collection,
) -> Result<Entity> {
    let updated_at = UtcDateTimeMs::now();
    let updated_entity = connection.transaction::<_, TransactionError, _>(|connection| {
        let mut repo = RepoConnection::new(connection);
        let (record_header, next_rev) = repo
            .touch_collection_entity_revision(&entity_header, updated_at)
            .map_err(transaction_error)?;
        let updated_entity = Entity::new(
            EntityHeader {
                uid: entity_header.uid,
                rev: next_rev,
            },
            modified_collection,
        );
        repo.update_collection_entity(record_header.id, updated_at, &updated_entity)
            .map_err(transaction_error)?;
        Ok(updated_entity)
    })?;
    Ok(updated_entity)
}

pub fn load_one_with_members(
    connection: &mut DbConnection,
    uid: &CollectionUid,
) -> Result<(RecordHeader, EntityWithMembers)> {
    let mut repo = RepoConnection::new(connection);
    let (record_header, _rev) = repo.resolve_collection_entity_revision(uid)?;
    let entity_with_members = repo.load_collection_entity_with_members(record_header.id)?;
    Ok((record_header, entity_with_members))
}

pub fn load_all(
    connection: &mut DbConnection,
    kind: Option<CollectionKind>,
    pagination: Option<&Pagination>,
    collector: &mut dyn ReservableRecordCollector<
        Header = RecordHeader,
        Record = EntityWithMembersSummary,
    >,
) -> Result<()> {
    let mut repo = RepoConnection::new(connection);
    repo.load_collection_entities(kind, pagination, collector)
        .map_err(Into::into)
}

pub fn purge(connection: &mut DbConnection, uid: &CollectionUid) -> Result<()> {
    connection.transaction::<_, TransactionError, _>(|connection| {
        let mut repo = RepoConnection::new(connection);
        let record_id = repo.resolve_collection_id(uid).map_err(transaction_error)?;
        repo.purge_collection_entity(record_id)
            .map_err(transaction_error)?;
        Ok(())
    })?;
    log::debug!("Purged collection {uid}");
    Ok(())
}
