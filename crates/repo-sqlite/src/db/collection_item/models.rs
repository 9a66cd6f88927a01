// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use diesel::prelude::*;

use cuebox_core::member::{Item, Member};
use cuebox_repo::collection::RecordId as CollectionId;

use super::schema::*;
use crate::prelude::*;

#[derive(Debug, Queryable)]
pub(crate) struct QueryableRecord {
    pub(crate) collection_id: RowId,
    pub(crate) item_uid: String,
    pub(crate) position: i64,
    pub(crate) added_ms: TimestampMillis,
    pub(crate) title: Option<String>,
}

impl From<QueryableRecord> for (CollectionId, i64, Member) {
    fn from(from: QueryableRecord) -> Self {
        let QueryableRecord {
            collection_id,
            item_uid,
            position,
            added_ms,
            title,
        } = from;
        let member = Member {
            added_at: parse_timestamp_millis(added_ms),
            title,
            item: Item::File {
                uid: decode_entity_uid(&item_uid),
            },
        };
        (collection_id.into(), position, member)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = collection_item)]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) collection_id: RowId,
    pub(crate) item_uid: String,
    pub(crate) position: i64,
    pub(crate) added_ms: TimestampMillis,
    pub(crate) title: Option<&'a str>,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn bind(
        collection_id: CollectionId,
        uid: cuebox_core::ItemUid,
        position: i64,
        created_at: UtcDateTimeMs,
        created_member: &'a Member,
    ) -> Self {
        let row_created_updated_ms = timestamp_millis(created_at);
        let Member {
            added_at,
            title,
            item: _,
        } = created_member;
        Self {
            row_created_ms: row_created_updated_ms,
            row_updated_ms: row_created_updated_ms,
            collection_id: collection_id.into(),
            item_uid: encode_entity_uid(&uid),
            position,
            added_ms: timestamp_millis(*added_at),
            title: title.as_deref(),
        }
    }
}
