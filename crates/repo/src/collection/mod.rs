// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use cuebox_core::{
    CollectionKind, CollectionUid, EntityHeader, EntityRevision,
    collection::{Entity, EntityWithMembers},
    util::clock::UtcDateTimeMs,
};

use crate::{member::MembersSummary, prelude::*};

record_id_newtype!(RecordId);

pub type RecordHeader = crate::RecordHeader<RecordId>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityWithMembersSummary {
    pub entity: Entity,
    pub members: MembersSummary,
}

pub trait EntityRepo {
    fn resolve_collection_id(&mut self, uid: &CollectionUid) -> RepoResult<RecordId> {
        self.resolve_collection_entity_revision(uid)
            .map(|(hdr, _rev)| hdr.id)
    }

    fn resolve_collection_entity_revision(
        &mut self,
        uid: &CollectionUid,
    ) -> RepoResult<(RecordHeader, EntityRevision)>;

    /// Bump the entity revision as part of a membership mutation.
    ///
    /// Fails with [`RepoError::Conflict`] if the given header carries an
    /// outdated revision.
    fn touch_collection_entity_revision(
        &mut self,
        entity_header: &EntityHeader,
        updated_at: UtcDateTimeMs,
    ) -> RepoResult<(RecordHeader, EntityRevision)>;

    fn insert_collection_entity(
        &mut self,
        created_at: UtcDateTimeMs,
        created_entity: &Entity,
    ) -> RepoResult<RecordId>;

    fn update_collection_entity(
        &mut self,
        id: RecordId,
        updated_at: UtcDateTimeMs,
        updated_entity: &Entity,
    ) -> RepoResult<()>;

    fn load_collection_entity(&mut self, id: RecordId) -> RepoResult<(RecordHeader, Entity)>;

    fn load_collection_entity_with_members(&mut self, id: RecordId)
    -> RepoResult<EntityWithMembers>;

    /// Purge the entity
    ///
    /// Purging is recursive and affects all relationships, i.e. all
    /// member records that belong to this collection must be deleted.
    /// This could either be implemented implicitly using ON DELETE
    /// CASCADE constraints for foreign key (FK) relationships in an SQL
    /// database or programmatically.
    fn purge_collection_entity(&mut self, id: RecordId) -> RepoResult<()>;

    fn load_collection_entities(
        &mut self,
        kind: Option<CollectionKind>,
        pagination: Option<&Pagination>,
        collector: &mut dyn ReservableRecordCollector<
            Header = RecordHeader,
            Record = EntityWithMembersSummary,
        >,
    ) -> RepoResult<()>;
}

#[derive(Debug, Default)]
pub struct EntityWithMembersSummaryCollector(Vec<EntityWithMembersSummary>);

impl EntityWithMembersSummaryCollector {
    #[must_use]
    pub const fn new(inner: Vec<EntityWithMembersSummary>) -> Self {
        Self(inner)
    }

    #[must_use]
    pub fn finish(self) -> Vec<EntityWithMembersSummary> {
        let Self(inner) = self;
        inner
    }
}

impl RecordCollector for EntityWithMembersSummaryCollector {
    type Header = RecordHeader;
    type Record = EntityWithMembersSummary;

    fn collect(&mut self, _header: RecordHeader, record: EntityWithMembersSummary) {
        let Self(inner) = self;
        inner.push(record);
    }
}

impl ReservableRecordCollector for EntityWithMembersSummaryCollector {
    fn reserve(&mut self, additional: usize) {
        let Self(inner) = self;
        inner.reserve(additional);
    }
}
