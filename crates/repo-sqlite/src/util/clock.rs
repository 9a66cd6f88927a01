// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

pub(crate) use cuebox_core::util::clock::{TimestampMillis, UtcDateTimeMs};

pub(crate) const fn timestamp_millis(timestamp: UtcDateTimeMs) -> TimestampMillis {
    timestamp.unix_timestamp_millis()
}

pub(crate) const fn parse_timestamp_millis(millis: TimestampMillis) -> UtcDateTimeMs {
    UtcDateTimeMs::from_unix_timestamp_millis(millis)
}
