// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use cuebox_core::{
    CollectionKind, CollectionUid, EntityHeader, EntityRevision, collection::{Entity, EntityWithMembers},
};
use cuebox_repo::{
    collection::{EntityRepo, EntityWithMembersSummary, RecordHeader, RecordId},
    member::MemberRepo as _,
    prelude::*,
};

use crate::{
    db::collection::{models::*, schema::*},
    prelude::*,
};

impl EntityRepo for crate::Connection<'_> {
    fn resolve_collection_entity_revision(
        &mut self,
        uid: &CollectionUid,
    ) -> RepoResult<(RecordHeader, EntityRevision)> {
        collection::table
            .select((
                collection::row_id,
                collection::row_created_ms,
                collection::row_updated_ms,
                collection::entity_rev,
            ))
            .filter(collection::entity_uid.eq(encode_entity_uid(uid)))
            .first::<(RowId, TimestampMillis, TimestampMillis, i64)>(self.as_mut())
            .map_err(repo_error)
            .map(|(row_id, row_created_ms, row_updated_ms, entity_rev)| {
                let header = RecordHeader {
                    id: row_id.into(),
                    created_at: parse_timestamp_millis(row_created_ms),
                    updated_at: parse_timestamp_millis(row_updated_ms),
                };
                (header, decode_entity_revision(entity_rev))
            })
    }

    fn touch_collection_entity_revision(
        &mut self,
        entity_header: &EntityHeader,
        updated_at: UtcDateTimeMs,
    ) -> RepoResult<(RecordHeader, EntityRevision)> {
        let EntityHeader { uid, rev } = entity_header;
        let next_rev = rev
            .next()
            .ok_or_else(|| anyhow::anyhow!("no next revision"))?;
        let touchable = TouchableRecord::bind(updated_at, next_rev);
        let target = collection::table
            .filter(collection::entity_uid.eq(encode_entity_uid(uid)))
            .filter(collection::entity_rev.eq(encode_entity_revision(*rev)));
        let query = diesel::update(target).set(&touchable);
        let rows_affected: usize = query.execute(self.as_mut()).map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        let resolved = self.resolve_collection_entity_revision(uid)?;
        if rows_affected < 1 {
            // Successfully resolved by UID, but not touched due to revision conflict
            return Err(RepoError::Conflict);
        }
        Ok(resolved)
    }

    fn insert_collection_entity(
        &mut self,
        created_at: UtcDateTimeMs,
        created_entity: &Entity,
    ) -> RepoResult<RecordId> {
        let insertable = InsertableRecord::bind(created_at, created_entity);
        let query = diesel::insert_into(collection::table).values(&insertable);
        let rows_affected = query.execute(self.as_mut()).map_err(repo_error)?;
        debug_assert_eq!(1, rows_affected);
        self.resolve_collection_id(&created_entity.hdr.uid)
    }

    fn update_collection_entity(
        &mut self,
        id: RecordId,
        updated_at: UtcDateTimeMs,
        updated_entity: &Entity,
    ) -> RepoResult<()> {
        let updatable =
            UpdatableRecord::bind(updated_at, updated_entity.hdr.rev, &updated_entity.body);
        let target = collection::table.filter(collection::row_id.eq(RowId::from(id)));
        let query = diesel::update(target).set(&updatable);
        let rows_affected: usize = query.execute(self.as_mut()).map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn load_collection_entity(&mut self, id: RecordId) -> RepoResult<(RecordHeader, Entity)> {
        let record = collection::table
            .filter(collection::row_id.eq(RowId::from(id)))
            .first::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?;
        Ok(record.into())
    }

    fn load_collection_entity_with_members(
        &mut self,
        id: RecordId,
    ) -> RepoResult<EntityWithMembers> {
        let (_, entity) = self.load_collection_entity(id)?;
        let members = self.load_all_members(id)?;
        Ok((entity, members).into())
    }

    fn purge_collection_entity(&mut self, id: RecordId) -> RepoResult<()> {
        let target = collection::table.filter(collection::row_id.eq(RowId::from(id)));
        let query = diesel::delete(target);
        let rows_affected: usize = query.execute(self.as_mut()).map_err(repo_error)?;
        debug_assert!(rows_affected <= 1);
        if rows_affected < 1 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    fn load_collection_entities(
        &mut self,
        kind: Option<CollectionKind>,
        pagination: Option<&Pagination>,
        collector: &mut dyn ReservableRecordCollector<
            Header = RecordHeader,
            Record = EntityWithMembersSummary,
        >,
    ) -> RepoResult<()> {
        let mut target = collection::table
            .order_by(collection::row_updated_ms.desc())
            .into_boxed();

        // Kind
        if let Some(kind) = kind {
            let kind: &'static str = kind.into();
            target = target.filter(collection::kind.eq(kind));
        }

        // Pagination
        if let Some(pagination) = pagination {
            target = apply_pagination(target, pagination);
        }

        let records = target
            .load::<QueryableRecord>(self.as_mut())
            .map_err(repo_error)?;

        collector.reserve(records.len());
        for record in records {
            let (record_header, entity) = record.into();
            let members = self.load_members_summary(record_header.id)?;
            collector.collect(record_header, EntityWithMembersSummary { entity, members });
        }
        Ok(())
    }
}

///////////////////////////////////////////////////////////////////////
// Tests
///////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests;
