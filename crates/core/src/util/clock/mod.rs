// SPDX-FileCopyrightText: Copyright (C) 2024-2026 cuebox contributors
// SPDX-License-Identifier: MPL-2.0

use std::fmt;

use jiff::Timestamp;

pub type TimestampMillis = i64;

/// An UTC timestamp with truncated millisecond precision.
#[derive(Clone, Debug, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTimeMs {
    unix_timestamp_millis: TimestampMillis,
}

impl UtcDateTimeMs {
    #[must_use]
    pub const fn from_unix_timestamp_millis(unix_timestamp_millis: TimestampMillis) -> Self {
        Self {
            unix_timestamp_millis,
        }
    }

    #[must_use]
    pub const fn unix_timestamp_millis(&self) -> TimestampMillis {
        self.unix_timestamp_millis
    }

    #[must_use]
    pub fn from_timestamp(timestamp: &Timestamp) -> Self {
        Self::from_unix_timestamp_millis(timestamp.as_millisecond())
    }

    #[must_use]
    #[expect(clippy::missing_panics_doc, reason = "should never panic")]
    pub fn to_timestamp(&self) -> Timestamp {
        Timestamp::from_millisecond(self.unix_timestamp_millis).expect("valid timestamp")
    }

    #[must_use]
    pub fn now() -> Self {
        Self::from_unix_timestamp_millis(Timestamp::now().as_millisecond())
    }
}

impl From<Timestamp> for UtcDateTimeMs {
    fn from(from: Timestamp) -> Self {
        Self::from_timestamp(&from)
    }
}

impl From<UtcDateTimeMs> for Timestamp {
    fn from(from: UtcDateTimeMs) -> Self {
        from.to_timestamp()
    }
}

impl fmt::Display for UtcDateTimeMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_timestamp().fmt(f)
    }
}
