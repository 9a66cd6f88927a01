// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

diesel::table! {
    collection (row_id) {
        row_id -> BigInt,
        row_created_ms -> BigInt,
        row_updated_ms -> BigInt,
        entity_uid -> Text,
        entity_rev -> BigInt,
        kind -> Text,
        title -> Text,
        notes -> Nullable<Text>,
    }
}
