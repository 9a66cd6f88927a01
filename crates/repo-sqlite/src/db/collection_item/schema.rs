// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use crate::db::collection::schema::*;

diesel::table! {
    collection_item (row_id) {
        row_id -> BigInt,
        row_created_ms -> BigInt,
        row_updated_ms -> BigInt,
        collection_id -> BigInt,
        item_uid -> Text,
        position -> BigInt,
        added_ms -> BigInt,
        title -> Nullable<Text>,
    }
}

diesel::joinable!(collection_item -> collection (collection_id));
diesel::allow_tables_to_appear_in_same_query!(collection_item, collection);
