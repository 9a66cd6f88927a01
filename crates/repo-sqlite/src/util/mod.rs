// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use crate::prelude::*;

pub(crate) mod clock;
pub(crate) mod entity;

pub(crate) fn apply_pagination<T>(source: T, pagination: &Pagination) -> T
where
    T: diesel::query_dsl::methods::LimitDsl<Output = T>
        + diesel::query_dsl::methods::OffsetDsl<Output = T>,
{
    if !pagination.is_paginated() {
        return source;
    }
    let mut target = source;
    // SQLite: OFFSET can only be used in conjunction with LIMIT
    let limit = pagination
        .limit
        .map_or(i64::MAX, |limit| limit.try_into().unwrap_or(i64::MAX));
    target = target.limit(limit);
    if let Some(offset) = pagination.offset {
        let offset = offset.try_into().unwrap_or(i64::MAX);
        target = target.offset(offset);
    }
    target
}
