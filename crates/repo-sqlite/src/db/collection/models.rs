// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use diesel::prelude::*;

use cuebox_core::{
    CollectionKind,
    collection::{Collection, Entity},
};
use cuebox_repo::collection::{RecordHeader, RecordId};

use super::schema::*;
use crate::prelude::*;

#[derive(Debug, Queryable)]
pub(crate) struct QueryableRecord {
    pub(crate) row_id: RowId,
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) entity_uid: String,
    pub(crate) entity_rev: i64,
    pub(crate) kind: String,
    pub(crate) title: String,
    pub(crate) notes: Option<String>,
}

impl From<QueryableRecord> for (RecordHeader, Entity) {
    fn from(from: QueryableRecord) -> Self {
        let QueryableRecord {
            row_id,
            row_created_ms,
            row_updated_ms,
            entity_uid,
            entity_rev,
            kind,
            title,
            notes,
        } = from;
        let record_header = RecordHeader {
            id: RecordId::new(row_id),
            created_at: parse_timestamp_millis(row_created_ms),
            updated_at: parse_timestamp_millis(row_updated_ms),
        };
        let kind = kind.parse::<CollectionKind>().expect("valid collection kind");
        let entity = Entity::new(
            decode_entity_header(&entity_uid, entity_rev),
            Collection { title, kind, notes },
        );
        (record_header, entity)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = collection)]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) entity_uid: String,
    pub(crate) entity_rev: i64,
    pub(crate) kind: &'a str,
    pub(crate) title: &'a str,
    pub(crate) notes: Option<&'a str>,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn bind(created_at: UtcDateTimeMs, created_entity: &'a Entity) -> Self {
        let row_created_updated_ms = timestamp_millis(created_at);
        let Entity { hdr, body } = created_entity;
        let Collection { title, kind, notes } = body;
        Self {
            row_created_ms: row_created_updated_ms,
            row_updated_ms: row_created_updated_ms,
            entity_uid: encode_entity_uid(&hdr.uid),
            entity_rev: encode_entity_revision(hdr.rev),
            kind: (*kind).into(),
            title,
            notes: notes.as_deref(),
        }
    }
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = collection, treat_none_as_null = true)]
pub(crate) struct UpdatableRecord<'a> {
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) entity_rev: i64,
    pub(crate) kind: &'a str,
    pub(crate) title: &'a str,
    pub(crate) notes: Option<&'a str>,
}

impl<'a> UpdatableRecord<'a> {
    pub(crate) fn bind(
        updated_at: UtcDateTimeMs,
        next_rev: cuebox_core::EntityRevision,
        updated_body: &'a Collection,
    ) -> Self {
        let Collection { title, kind, notes } = updated_body;
        Self {
            row_updated_ms: timestamp_millis(updated_at),
            entity_rev: encode_entity_revision(next_rev),
            kind: (*kind).into(),
            title,
            notes: notes.as_deref(),
        }
    }
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = collection)]
pub(crate) struct TouchableRecord {
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) entity_rev: i64,
}

impl TouchableRecord {
    pub(crate) fn bind(updated_at: UtcDateTimeMs, next_rev: cuebox_core::EntityRevision) -> Self {
        Self {
            row_updated_ms: timestamp_millis(updated_at),
            entity_rev: encode_entity_revision(next_rev),
        }
    }
}
